//! Command handlers.

use crate::cli::{Cli, Commands};
use chrono::{Local, NaiveDateTime};
use lifealign_core::model::task::parse_date;
use lifealign_core::{
    init_logging_with_config, open_db, plan, AlertType, Category, Clock, ClockTime,
    ConfigError, ConflictResolution, CoreConfig, DbError, FacilityError, HistoryOrder,
    LoggingError, NewTask, Recurrence, ReminderAction, ReminderActionOutcome, ReminderHandle,
    ReminderScheduler, RepeatPeriod, SqliteKeyValueStore, SqliteReminderOutbox, SystemClock,
    Task, TaskError, TaskId, TaskLifecycleController, TaskPatch, TaskStore,
    TaskValidationError,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Task(TaskError),
    Facility(FacilityError),
    InvalidArgument(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Task(TaskError::ConflictDetected { conflicting }) => {
                let ids: Vec<String> = conflicting.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "time slot overlaps {}; rerun with --force to keep it anyway",
                    ids.join(", ")
                )
            }
            Self::Task(err) => write!(f, "{err} [{}]", err.code()),
            Self::Facility(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Task(err) => Some(err),
            Self::Facility(err) => Some(err),
            Self::InvalidArgument(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<TaskError> for CliError {
    fn from(value: TaskError) -> Self {
        Self::Task(value)
    }
}

impl From<FacilityError> for CliError {
    fn from(value: FacilityError) -> Self {
        Self::Facility(value)
    }
}

impl From<TaskValidationError> for CliError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        init_logging_with_config(&config, absolute(log_dir)?)?;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    if let Commands::Plan {
        title,
        date,
        start,
        alert,
    } = &cli.command
    {
        return plan_preview(title, date, start, alert, clock.now_local());
    }

    let store = TaskStore::new(Arc::new(SqliteKeyValueStore::new(open_db(&cli.db)?)));
    let outbox = Arc::new(SqliteReminderOutbox::new(open_db(&cli.db)?));
    let scheduler = ReminderScheduler::new(outbox.clone(), clock.clone());
    let controller = TaskLifecycleController::new(store, scheduler, clock.clone(), &config);
    info!(
        "event=cli_command module=cli status=start db={}",
        cli.db.display()
    );

    match cli.command {
        Commands::Add {
            title,
            date,
            start,
            end,
            category,
            alert,
            repeat_num,
            repeat_period,
            force,
        } => {
            let start_time = ClockTime::parse(&start)?;
            let end_time = match end {
                Some(end) => ClockTime::parse(&end)?,
                None => start_time,
            };
            let repeat = match (repeat_num, repeat_period) {
                (Some(count), Some(period)) if count > 0 => Some(Recurrence {
                    count,
                    period: parse_period(&period)?,
                }),
                _ => None,
            };
            let request = NewTask {
                title,
                category: parse_category(&category)?,
                date: parse_date(&date)?,
                start_time,
                end_time,
                alert_type: AlertType::from_tag(&alert),
                repeat,
            };
            let task = controller.create(request, resolution(force)).await?;
            println!("created {}", render(&task));
        }
        Commands::List { date } => {
            let tasks = match date {
                Some(date) => controller.tasks_on(parse_date(&date)?).await?,
                None => {
                    let mut tasks = controller.list().await?;
                    tasks.sort_by_key(Task::due_at);
                    tasks
                }
            };
            print_tasks(&tasks);
        }
        Commands::Edit {
            id,
            title,
            date,
            start,
            end,
            category,
            alert,
            no_repeat,
            force,
        } => {
            let patch = TaskPatch {
                title,
                category: category.as_deref().map(parse_category).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                start_time: start.as_deref().map(ClockTime::parse).transpose()?,
                end_time: end.as_deref().map(ClockTime::parse).transpose()?,
                alert_type: alert.as_deref().map(AlertType::from_tag),
                repeat: no_repeat.then_some(None),
                completed: None,
            };
            let task = controller
                .update(parse_id(&id)?, patch, resolution(force))
                .await?;
            println!("updated {}", render(&task));
        }
        Commands::Done { id } => {
            let task = controller.toggle_complete(parse_id(&id)?).await?;
            println!("updated {}", render(&task));
        }
        Commands::Tomorrow { id } => {
            let task = controller.push_to_tomorrow(parse_id(&id)?).await?;
            println!("moved {}", render(&task));
        }
        Commands::Delete { id } => {
            let id = controller.delete(parse_id(&id)?).await?;
            println!("deleted {id}");
        }
        Commands::History { asc } => {
            let order = if asc {
                HistoryOrder::Ascending
            } else {
                HistoryOrder::default()
            };
            print_tasks(&controller.completed_history(order).await?);
        }
        Commands::Deleted => {
            for task in controller.deleted_tasks().await? {
                let deleted_at = task
                    .deleted_at
                    .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}  deleted={deleted_at}", render(&task));
            }
        }
        Commands::Due { at, peek } => {
            let now = match at {
                Some(at) => parse_moment(&at)?,
                None => clock.now_local(),
            };
            let tasks = controller.list().await?;
            let due = if peek {
                outbox.due(now)?
            } else {
                outbox.take_due(now)?
            };
            for (handle, instant) in due {
                let owner = tasks
                    .iter()
                    .find(|task| task.holds_handle(&handle))
                    .map_or_else(|| "-".to_string(), |task| task.id.to_string());
                println!(
                    "{handle}  {}  task={owner}  {}",
                    instant.fire_at.format("%Y-%m-%d %H:%M"),
                    instant.message
                );
            }
        }
        Commands::Act { handle, action } => {
            let action = ReminderAction::from_identifier(&action).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "unknown action `{action}`; expected complete|tomorrow|delete|edit"
                ))
            })?;
            match controller
                .on_reminder_action(&ReminderHandle::new(handle), action)
                .await?
            {
                ReminderActionOutcome::Updated(task) => println!("updated {}", render(&task)),
                ReminderActionOutcome::Deleted(id) => println!("deleted {id}"),
                ReminderActionOutcome::OpenEditor(id) => {
                    println!("edit with: lifealign edit {id} --title ... --date ... --start ...")
                }
            }
        }
        Commands::Dates => {
            for date in controller.dates_with_tasks().await? {
                println!("{date}");
            }
        }
        Commands::Plan { .. } => {}
    }
    Ok(())
}

fn plan_preview(
    title: &str,
    date: &str,
    start: &str,
    alert: &str,
    now: NaiveDateTime,
) -> Result<(), CliError> {
    let instants = plan(
        title,
        parse_date(date)?,
        ClockTime::parse(start)?,
        AlertType::from_tag(alert),
        now,
    );
    if instants.is_empty() {
        println!("no reminders");
    }
    for instant in instants {
        println!(
            "{}  {}",
            instant.fire_at.format("%Y-%m-%d %H:%M"),
            instant.message
        );
    }
    Ok(())
}

fn resolution(force: bool) -> ConflictResolution {
    if force {
        ConflictResolution::Proceed
    } else {
        ConflictResolution::Ask
    }
}

fn parse_id(value: &str) -> Result<TaskId, CliError> {
    TaskId::parse_str(value.trim())
        .map_err(|_| CliError::InvalidArgument(format!("invalid task id `{value}`")))
}

fn parse_category(value: &str) -> Result<Category, CliError> {
    Category::from_tag(value).ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "unknown category `{value}`; expected wellness|grocery|home|car"
        ))
    })
}

fn parse_period(value: &str) -> Result<RepeatPeriod, CliError> {
    RepeatPeriod::from_tag(value).ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "unknown repeat period `{value}`; expected days|weeks|months|years"
        ))
    })
}

fn parse_moment(value: &str) -> Result<NaiveDateTime, CliError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M").map_err(|_| {
        CliError::InvalidArgument(format!("invalid moment `{value}`; expected YYYY-MM-DD HH:mm"))
    })
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| CliError::InvalidArgument(format!("cannot resolve `{}`: {err}", path.display())))
}

fn render(task: &Task) -> String {
    format!(
        "{}  {} {}-{}  [{}] {}  alert={} reminders={}{}",
        task.id,
        task.date,
        task.start_time,
        task.end_time,
        task.category.label(),
        task.title,
        task.alert_type.as_tag(),
        task.notif_id.len(),
        if task.completed { "  done" } else { "" }
    )
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("no tasks");
    }
    for task in tasks {
        println!("{}", render(task));
    }
}
