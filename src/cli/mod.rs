pub mod render;

use std::{fmt::Display, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use now::DateTimeNow;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    auth::StaticCredential,
    history::{selection::HistoryKey, HistoryRangeFetcher},
    session::DaySession,
    storage::json_storage::JsonDayStorage,
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        shutdown::detect_shutdown,
    },
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "Missioncraft", version, long_about = None)]
#[command(about = "Track time spent on daily tasks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "MISSIONCRAFT_TOKEN",
        hide_env_values = true,
        help = "Bearer token passed to storage. Required for saving"
    )]
    token: Option<String>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show tasks and summary of a day")]
    Show {
        #[arg(help = "Day to show. Examples are \"today\", \"yesterday\", \"15/03/2025\"")]
        date: Option<String>,
        #[arg(long, help = "Print as json")]
        json: bool,
    },
    #[command(about = "Add a task to today")]
    Add { name: String },
    #[command(about = "Remove a task from today")]
    Remove { name: String },
    #[command(about = "Overwrite the time of a task of today")]
    SetTime {
        name: String,
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },
    #[command(about = "Mark a task of today as completed or not completed")]
    Toggle { name: String },
    #[command(about = "Run the timer on a task until Ctrl-C, then save")]
    Track {
        name: String,
        #[arg(long, help = "Stop after this many minutes")]
        minutes: Option<u64>,
    },
    #[command(about = "Show a past day")]
    History {
        date: String,
        #[arg(long, help = "Print as json")]
        json: bool,
    },
    #[command(about = "Show the summary of 7 days starting at a date")]
    Week {
        #[arg(help = "First day of the week. Defaults to the beginning of the current week")]
        start: Option<String>,
        #[arg(long, help = "Print as json")]
        json: bool,
    },
    #[command(about = "Compare two weeks")]
    Compare {
        first: String,
        second: String,
        #[arg(long, help = "Print as json")]
        json: bool,
    },
}

/// Everything a command needs. Built once from the arguments.
struct Context {
    storage: Arc<JsonDayStorage>,
    credentials: StaticCredential,
    clock: Arc<dyn Clock>,
    date_style: DateStyle,
}

impl Context {
    fn session(&self, date: NaiveDate) -> DaySession<Arc<JsonDayStorage>, StaticCredential> {
        DaySession::new(
            date,
            self.storage.clone(),
            self.credentials.clone(),
            self.clock.clone(),
        )
    }

    fn history(&self) -> HistoryRangeFetcher<Arc<JsonDayStorage>, StaticCredential> {
        HistoryRangeFetcher::new(self.storage.clone(), self.credentials.clone())
    }

    fn parse_date(&self, value: &str) -> Result<NaiveDate> {
        parse_date_string(value, Local::now(), self.date_style.into())
            .map(|v| v.date_naive())
            .map_err(|e| {
                Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        format!("Failed to validate date {value:?}: {e}"),
                    )
                    .into()
            })
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let context = Context {
        storage: Arc::new(JsonDayStorage::new(app_dir.join("days"))?),
        credentials: StaticCredential::new(args.token),
        clock: Arc::new(DefaultClock),
        date_style: args.date_style,
    };

    match args.commands {
        Commands::Show { date, json } => {
            let date = match date {
                Some(date) => context.parse_date(&date)?,
                None => context.clock.today(),
            };
            let mut session = context.session(date);
            session.load().await;
            render::print_session(&session, json)
        }
        Commands::Add { name } => {
            edit_today(&context, |session| Ok(session.add_task(&name)?)).await
        }
        Commands::Remove { name } => {
            edit_today(&context, |session| {
                session.remove_task(&name)?;
                Ok(())
            })
            .await
        }
        Commands::SetTime { name, seconds } => {
            edit_today(&context, |session| {
                session.set_time(&name, seconds)?;
                Ok(())
            })
            .await
        }
        Commands::Toggle { name } => {
            edit_today(&context, |session| {
                session.toggle_completion(&name)?;
                Ok(())
            })
            .await
        }
        Commands::Track { name, minutes } => track(&context, &name, minutes).await,
        Commands::History { date, json } => {
            let date = context.parse_date(&date)?;
            let view = context.history().fetch(HistoryKey::Day(date)).await;
            render::print_history(&view, json)
        }
        Commands::Week { start, json } => {
            let start = match start {
                Some(start) => context.parse_date(&start)?,
                None => Local::now().beginning_of_week().date_naive(),
            };
            let report = context.history().week(start).await;
            render::print_week(&report, json)
        }
        Commands::Compare {
            first,
            second,
            json,
        } => {
            let key = HistoryKey::Weeks {
                first: context.parse_date(&first)?,
                second: context.parse_date(&second)?,
            };
            let view = context.history().fetch(key).await;
            render::print_history(&view, json)
        }
    }
}

/// Loads today, applies `edit` and saves the whole day back. Nothing is edited when the day
/// couldn't be loaded.
async fn edit_today(
    context: &Context,
    edit: impl FnOnce(&mut DaySession<Arc<JsonDayStorage>, StaticCredential>) -> Result<()>,
) -> Result<()> {
    let mut session = context.session(context.clock.today());
    session.load().await;
    session.ensure_loaded()?;
    edit(&mut session)?;
    let message = session.save().await?;
    println!("{message}");
    render::print_session(&session, false)
}

async fn track(context: &Context, name: &str, minutes: Option<u64>) -> Result<()> {
    let mut session = context.session(context.clock.today());
    session.load().await;
    session.ensure_loaded()?;
    session.start(name)?;
    println!("Tracking {name}. Press Ctrl-C to stop.");

    let cancel = CancellationToken::new();
    tokio::spawn(detect_shutdown(cancel.clone()));
    if let Some(minutes) = minutes {
        let cancel = cancel.clone();
        let clock = context.clock.clone();
        tokio::spawn(async move {
            clock.sleep(Duration::from_secs(minutes * 60)).await;
            cancel.cancel();
        });
    }

    let applied = session.run_until(cancel.clone()).await?;
    session.stop();
    // Lets the Ctrl-C listener finish if the timer ran out on its own.
    cancel.cancel();
    info!("Tracked {applied} seconds of {name}");

    let message = session.save().await?;
    println!("{message}");
    render::print_session(&session, false)
}
