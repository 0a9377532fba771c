use chrono::{NaiveDate, NaiveDateTime};
use lifealign_core::{plan, AlertType, ClockTime};

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
}

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn nine() -> ClockTime {
    ClockTime::parse("09:00").unwrap()
}

#[test]
fn alert_none_plans_nothing() {
    let now = at("2024-05-01", "08:00");
    assert!(plan("Dentist", day("2024-06-01"), nine(), AlertType::None, now).is_empty());
    assert!(plan("Dentist", day("2030-01-01"), nine(), AlertType::None, now).is_empty());
}

#[test]
fn standard_plans_single_due_instant() {
    let now = at("2024-05-01", "08:00");
    let instants = plan("Dentist", day("2024-06-01"), nine(), AlertType::Standard, now);

    assert_eq!(instants.len(), 1);
    assert_eq!(instants[0].fire_at, at("2024-06-01", "09:00"));
    assert_eq!(instants[0].message, "Dentist is due now!");
}

#[test]
fn standard_in_the_past_plans_nothing() {
    let now = at("2024-06-01", "09:00");
    assert!(plan("Dentist", day("2024-06-01"), nine(), AlertType::Standard, now).is_empty());
}

#[test]
fn gradual_far_ahead_plans_all_ten_instants_in_order() {
    let now = at("2024-01-01", "00:00");
    let instants = plan("Oil change", day("2024-06-01"), nine(), AlertType::Gradual, now);

    let fire_ats: Vec<NaiveDateTime> = instants.iter().map(|i| i.fire_at).collect();
    assert_eq!(
        fire_ats,
        vec![
            at("2024-06-01", "09:00"),
            at("2024-06-01", "08:30"),
            at("2024-06-01", "08:00"),
            at("2024-06-01", "06:00"),
            at("2024-05-31", "09:00"),
            at("2024-05-29", "09:00"),
            at("2024-05-25", "09:00"),
            at("2024-05-18", "09:00"),
            at("2024-05-01", "09:00"),
            at("2024-04-01", "09:00"),
        ]
    );

    let messages: Vec<&str> = instants.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Oil change is due now!",
            "Oil change is due in 30 minutes!",
            "Oil change is due in 1 hour!",
            "Oil change is due in 3 hours!",
            "Oil change is due in 1 day!",
            "Oil change is due in 3 days!",
            "Oil change is due in 1 week!",
            "Oil change is due in 2 weeks!",
            "Oil change is due in 1 month!",
            "Oil change is due in 2 months!",
        ]
    );
}

#[test]
fn gradual_drops_leads_that_are_not_strictly_future() {
    // Two days out: due, 30m, 1h, 3h and 1d remain; 3d and longer are past.
    let now = at("2024-05-30", "09:00");
    let instants = plan("Oil change", day("2024-06-01"), nine(), AlertType::Gradual, now);

    assert_eq!(instants.len(), 5);
    assert!(instants.iter().all(|instant| instant.fire_at > now));
    assert_eq!(instants[4].fire_at, at("2024-05-31", "09:00"));
}

#[test]
fn gradual_lead_equal_to_now_is_excluded() {
    let now = at("2024-06-01", "08:30");
    let instants = plan("Walk", day("2024-06-01"), nine(), AlertType::Gradual, now);

    assert_eq!(instants.len(), 1);
    assert_eq!(instants[0].fire_at, at("2024-06-01", "09:00"));
}

#[test]
fn gradual_count_matches_future_offsets_for_any_now() {
    let every_offset = [
        at("2024-06-01", "09:00"),
        at("2024-06-01", "08:30"),
        at("2024-06-01", "08:00"),
        at("2024-06-01", "06:00"),
        at("2024-05-31", "09:00"),
        at("2024-05-29", "09:00"),
        at("2024-05-25", "09:00"),
        at("2024-05-18", "09:00"),
        at("2024-05-01", "09:00"),
        at("2024-04-01", "09:00"),
    ];
    let moments = [
        at("2024-03-01", "00:00"),
        at("2024-04-15", "12:00"),
        at("2024-05-20", "09:00"),
        at("2024-05-31", "23:59"),
        at("2024-06-01", "08:59"),
        at("2024-06-01", "10:00"),
    ];

    for now in moments {
        let instants = plan("Walk", day("2024-06-01"), nine(), AlertType::Gradual, now);
        let expected: Vec<NaiveDateTime> = every_offset
            .iter()
            .copied()
            .filter(|fire_at| *fire_at > now)
            .collect();
        let actual: Vec<NaiveDateTime> = instants.iter().map(|i| i.fire_at).collect();
        assert_eq!(actual, expected, "now={now}");
    }
}
