use chrono::{NaiveDate, Utc};
use lifealign_core::{
    find_conflicts, has_conflict, AlertType, Candidate, Category, ClockTime, ConflictScope,
    NewTask, Task, TimeRange,
};

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::new(ClockTime::parse(start).unwrap(), ClockTime::parse(end).unwrap()).unwrap()
}

fn task(date: &str, start: &str, end: &str) -> Task {
    let request = NewTask {
        title: "Block".to_string(),
        category: Category::Home,
        date: day(date),
        start_time: ClockTime::parse(start).unwrap(),
        end_time: ClockTime::parse(end).unwrap(),
        alert_type: AlertType::None,
        repeat: None,
    };
    Task::from_new(&request, Utc::now())
}

fn conflicts(candidate: &Task, existing: &Task) -> bool {
    has_conflict(
        &Candidate::of(candidate),
        std::slice::from_ref(existing),
        None,
        ConflictScope::SameDay,
    )
}

#[test]
fn back_to_back_ranges_do_not_conflict() {
    let morning = task("2024-06-01", "08:00", "09:00");
    let later = task("2024-06-01", "09:00", "10:00");

    assert!(!conflicts(&morning, &later));
    assert!(!conflicts(&later, &morning));
}

#[test]
fn contained_range_conflicts() {
    let outer = task("2024-06-01", "09:00", "10:00");
    let inner = task("2024-06-01", "09:30", "09:45");

    assert!(conflicts(&inner, &outer));
    assert!(conflicts(&outer, &inner));
}

#[test]
fn conflict_is_symmetric_over_a_grid_of_ranges() {
    let bounds = ["08:00", "08:30", "09:00", "09:30", "10:00", "11:00"];
    let mut ranges = Vec::new();
    for (i, start) in bounds.iter().enumerate() {
        for end in &bounds[i..] {
            ranges.push(task("2024-06-01", start, end));
        }
    }

    for a in &ranges {
        for b in &ranges {
            assert_eq!(
                conflicts(a, b),
                conflicts(b, a),
                "asymmetric for {}-{} vs {}-{}",
                a.start_time,
                a.end_time,
                b.start_time,
                b.end_time
            );
        }
    }
}

#[test]
fn partial_overlap_conflicts() {
    let first = task("2024-06-01", "09:00", "10:00");
    let second = task("2024-06-01", "09:30", "10:30");
    assert!(conflicts(&first, &second));
}

#[test]
fn edited_task_is_excluded_from_its_own_check() {
    let existing = task("2024-06-01", "09:00", "10:00");
    let candidate = Candidate {
        date: existing.date,
        range: range("09:15", "09:45"),
    };
    let slice = std::slice::from_ref(&existing);

    assert!(has_conflict(&candidate, slice, None, ConflictScope::SameDay));
    assert!(!has_conflict(
        &candidate,
        slice,
        Some(existing.id),
        ConflictScope::SameDay
    ));
}

#[test]
fn same_day_scope_ignores_other_dates() {
    let saturday = task("2024-06-01", "09:00", "10:00");
    let candidate = Candidate {
        date: day("2024-06-02"),
        range: range("09:00", "10:00"),
    };

    assert!(!has_conflict(
        &candidate,
        std::slice::from_ref(&saturday),
        None,
        ConflictScope::SameDay
    ));
}

#[test]
fn any_date_scope_compares_across_dates() {
    let saturday = task("2024-06-01", "09:00", "10:00");
    let monday = task("2024-06-03", "14:00", "15:00");
    let candidate = Candidate {
        date: day("2024-06-02"),
        range: range("09:30", "09:45"),
    };

    let found = find_conflicts(
        &candidate,
        &[saturday.clone(), monday],
        None,
        ConflictScope::AnyDate,
    );
    assert_eq!(found, vec![saturday.id]);
}

#[test]
fn find_conflicts_preserves_input_order() {
    let a = task("2024-06-01", "09:00", "10:00");
    let b = task("2024-06-01", "12:00", "13:00");
    let c = task("2024-06-01", "09:30", "12:30");
    let candidate = Candidate::of(&c);

    let found = find_conflicts(&candidate, &[a.clone(), b.clone()], None, ConflictScope::SameDay);
    assert_eq!(found, vec![a.id, b.id]);
}
