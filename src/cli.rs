use std::path::PathBuf;

use anyhow::Context;

use syllacal::extract::{GeminiClient, SyllabusAnalyzer, SyllabusDocument};
use syllacal::storage::Config;
use syllacal::sync::{CalendarSyncGateway, CredentialStore};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Analyze {
        path: PathBuf,
        categories: Vec<String>,
        color_id: Option<String>,
        push: bool,
    },
    List {
        max: Option<u32>,
    },
    Delete {
        ids: Vec<String>,
    },
}

pub const USAGE: &str = "Usage: syllacal analyze <file> [--category NAME]... [--color-id N] [--push]
       syllacal list [--max N]
       syllacal delete <event-id>...";

pub fn parse_command(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    match args.next().as_deref() {
        Some("analyze") => {
            let path = args
                .next()
                .filter(|arg| !arg.starts_with("--"))
                .ok_or_else(|| "analyze requires a syllabus file".to_string())?;

            let mut categories = Vec::new();
            let mut color_id = None;
            let mut push = false;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--category" => {
                        let value = args
                            .next()
                            .ok_or_else(|| "--category requires a value".to_string())?;
                        categories.push(value);
                    }
                    "--color-id" => {
                        color_id = Some(
                            args.next()
                                .ok_or_else(|| "--color-id requires a value".to_string())?,
                        );
                    }
                    "--push" => push = true,
                    other => return Err(format!("Unknown argument '{}'", other)),
                }
            }

            Ok(Command::Analyze {
                path: PathBuf::from(path),
                categories,
                color_id,
                push,
            })
        }
        Some("list") => {
            let mut max = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--max" => {
                        let value = args
                            .next()
                            .ok_or_else(|| "--max requires a value".to_string())?;
                        max = Some(
                            value
                                .parse::<u32>()
                                .map_err(|_| format!("Invalid count '{}'", value))?,
                        );
                    }
                    other => return Err(format!("Unknown argument '{}'", other)),
                }
            }
            Ok(Command::List { max })
        }
        Some("delete") => {
            let ids: Vec<String> = args.collect();
            if ids.is_empty() {
                return Err("delete requires at least one event id".to_string());
            }
            Ok(Command::Delete { ids })
        }
        Some(other) => Err(format!("Unknown command '{}'", other)),
        None => Err("No command given".to_string()),
    }
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze {
            path,
            categories,
            color_id,
            push,
        } => run_analyze(path, categories, color_id, push).await,
        Command::List { max } => run_list(max).await,
        Command::Delete { ids } => run_delete(ids).await,
    }
}

async fn run_analyze(
    path: PathBuf,
    categories: Vec<String>,
    color_id: Option<String>,
    push: bool,
) -> anyhow::Result<()> {
    let config = Config::load().context("Could not load configuration")?;

    let document = SyllabusDocument::from_path(&path)
        .with_context(|| format!("Could not read syllabus '{}'", path.display()))?;

    let categories = if categories.is_empty() {
        config.extract.categories.clone()
    } else {
        categories
    };
    let color_id = color_id.unwrap_or_else(|| config.extract.color_id.clone());

    let analyzer = SyllabusAnalyzer::new(
        GeminiClient::new(),
        config.gemini.api_keys.clone(),
        config.gemini.models.clone(),
    );

    let events = analyzer.analyze(&document, &categories, &color_id).await;

    println!("{}", serde_json::to_string_pretty(&events)?);

    if events.is_empty() {
        eprintln!("No upcoming events extracted.");
        return Ok(());
    }

    if push {
        let gateway = open_gateway(&config).await?;
        let added = gateway.add_events(&events).await;
        println!("Added {} of {} events to the calendar.", added.len(), events.len());
    }

    Ok(())
}

async fn run_list(max: Option<u32>) -> anyhow::Result<()> {
    let config = Config::load().context("Could not load configuration")?;
    let gateway = open_gateway(&config).await?;

    let events = gateway
        .fetch_events(max.or(Some(config.calendar.fetch_limit)))
        .await
        .context("Could not fetch calendar events")?;

    for event in &events {
        let start = event
            .start
            .as_ref()
            .map(|time| match time {
                syllacal::EventTime::AllDay { date } => date.clone(),
                syllacal::EventTime::Timed { date_time } => date_time.clone(),
            })
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {}",
            event.id.as_deref().unwrap_or("-"),
            start,
            event.summary.as_deref().unwrap_or("(no title)")
        );
    }
    println!("{} upcoming events.", events.len());

    Ok(())
}

async fn run_delete(ids: Vec<String>) -> anyhow::Result<()> {
    let config = Config::load().context("Could not load configuration")?;
    let gateway = open_gateway(&config).await?;

    let count = gateway.delete_events(&ids).await;
    println!("Deleted {} of {} events.", count, ids.len());

    Ok(())
}

/// Build a gateway from the cached credential bundle, refreshing it first if
/// it is about to expire. A missing bundle means the user never logged in.
async fn open_gateway(config: &Config) -> anyhow::Result<CalendarSyncGateway> {
    let store = CredentialStore::new(config.google.credential_cache.clone());
    let mut bundle = store
        .load()
        .context("Not logged in: no cached credentials found")?;

    if bundle.needs_refresh() {
        bundle = bundle
            .refresh()
            .await
            .context("Could not refresh access token")?;
        store.save(&bundle)?;
    }

    Ok(CalendarSyncGateway::new(bundle).with_calendar_id(config.calendar.default.clone()))
}
