// src/bin/commands/jobs.rs
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::ArgMatches;
use colored::*;
use serde::Serialize;
use tokio::signal;

use jobdb::runner::start_persist_worker;
use jobdb::{Job, JobStore, MemoryJobCache, Schedule, SqliteJobStore, StoreConfig};

/// Flat view of a job for tabular output.
#[derive(Serialize, Debug)]
struct JobRow<'a> {
    id: &'a str,
    name: &'a str,
    owner: &'a str,
    command: &'a str,
    schedule: String,
    next_run_at: Option<String>,
    success_count: u64,
    error_count: u64,
    disabled: bool,
}

impl<'a> From<&'a Job> for JobRow<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            id: job.id(),
            name: &job.name,
            owner: &job.owner,
            command: &job.command,
            schedule: job.schedule.to_string(),
            next_run_at: job.next_run_at.map(|t| t.to_rfc3339()),
            success_count: job.metadata.success_count,
            error_count: job.metadata.error_count,
            disabled: job.is_disabled(),
        }
    }
}

fn open_store(config: &StoreConfig) -> Result<SqliteJobStore> {
    SqliteJobStore::open(config)
        .with_context(|| format!("Failed to open job store at {:?}", config.store_path()))
}

fn job_id(matches: &ArgMatches) -> Result<&str> {
    matches
        .get_one::<String>("job_id")
        .map(String::as_str)
        .context("job_id is required")
}

pub fn list_command(config: &StoreConfig, matches: &ArgMatches) -> Result<()> {
    let store = open_store(config)?;
    let jobs = store.get_all().context("Failed to load jobs")?;
    store.close()?;

    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if matches.get_flag("csv") {
        let mut writer = csv::Writer::from_writer(io::stdout());
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        return Ok(());
    }

    if rows.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Jobs ({})", rows.len()).blue().bold());
    println!("{}", "=".repeat(50).blue());
    for row in rows {
        let state = if row.disabled {
            "disabled".red()
        } else {
            "enabled".green()
        };
        println!("  • {} {} [{}]", row.id.bold(), row.name, state);
        println!("    Schedule: {}", row.schedule.cyan());
        println!("    Next run: {}", row.next_run_at.as_deref().unwrap_or("-"));
        println!("    Owner: {}  Command: {}", row.owner, row.command);
        println!(
            "    Runs: {} ok, {} failed",
            row.success_count.to_string().green(),
            row.error_count.to_string().red()
        );
    }
    Ok(())
}

pub fn show_command(config: &StoreConfig, matches: &ArgMatches) -> Result<()> {
    let id = job_id(matches)?;
    let store = open_store(config)?;
    let job = store.get(id);
    store.close()?;

    match job {
        Ok(job) => {
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(())
        }
        Err(e) if e.is_not_found() => bail!("No job with id {id}"),
        Err(e) => Err(e).with_context(|| format!("Stored record for {id} could not be read")),
    }
}

pub fn add_command(config: &StoreConfig, matches: &ArgMatches) -> Result<()> {
    let arg = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .cloned()
            .with_context(|| format!("--{name} is required"))
    };

    let mut schedule = Schedule::new(arg("schedule")?);
    if let Some(raw) = matches.get_one::<String>("starts_at") {
        let starts_at = DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --starts-at value: {raw}"))?;
        schedule = schedule.starting_at(starts_at.with_timezone(&Utc));
    }
    schedule.validate()?;

    let mut job = Job::new(arg("name")?, arg("command")?, arg("owner")?, schedule);
    job.init_delay_duration(Utc::now())?;
    if matches.get_flag("disabled") {
        job.disable();
    }

    let store = open_store(config)?;
    job.save(&store)?;
    store.close()?;

    println!("{} {}", "✅ Saved job ID:".green(), job.id().bold());
    if let Some(next) = job.next_run_at {
        println!("Next run at {}", next.to_rfc3339());
    }
    Ok(())
}

pub fn toggle_command(config: &StoreConfig, matches: &ArgMatches, enabled: bool) -> Result<()> {
    let id = job_id(matches)?;
    let store = open_store(config)?;
    let job = store.get(id).with_context(|| format!("Cannot load job {id}"))?;

    if enabled {
        job.enable();
    } else {
        job.disable();
    }
    job.save(&store)?;
    store.close()?;

    let state = if enabled { "enabled".green() } else { "disabled".red() };
    println!("Job {} {}", id.bold(), state);
    Ok(())
}

pub fn delete_command(config: &StoreConfig, matches: &ArgMatches) -> Result<()> {
    let id = job_id(matches)?;
    let store = open_store(config)?;

    let job = match store.get(id) {
        Ok(job) => job,
        Err(e) if e.is_not_found() => {
            println!("{}", format!("ℹ️  No job with id {id}, nothing to delete.").blue());
            return store.close().map_err(Into::into);
        }
        Err(e) => {
            // Unreadable record: remove it by key anyway.
            tracing::warn!("Record {} is unreadable ({}), deleting by key", id, e);
            store.delete(id)?;
            store.close()?;
            println!("{} {}", "🗑️  Deleted unreadable record".yellow(), id.bold());
            return Ok(());
        }
    };

    let cache = MemoryJobCache::new();
    job.delete(&cache, &store)?;
    store.close()?;

    println!("{} {}", "🗑️  Deleted job".green(), id.bold());
    Ok(())
}

pub async fn watch_command(config: &StoreConfig, matches: &ArgMatches) -> Result<()> {
    let interval = match matches.get_one::<String>("interval") {
        Some(raw) => Duration::from_secs(
            raw.parse()
                .with_context(|| format!("Invalid --interval value: {raw}"))?,
        ),
        None => config.persist_interval,
    };
    if interval.is_zero() {
        bail!("--interval must be at least one second");
    }

    let store = Arc::new(open_store(config)?);
    let cache = Arc::new(MemoryJobCache::new());
    let cached = cache.warm_up(store.as_ref())?;

    println!("{}", "🚀 Job cache loaded. Press Ctrl+C to stop.".green().bold());
    println!("Cached jobs: {}", cached.to_string().green());
    println!("Persist interval: {:?}", interval);

    let worker = start_persist_worker(cache.clone(), store.clone(), interval);

    signal::ctrl_c().await.context("Failed to install Ctrl+C handler")?;
    println!("\n{}", "🛑 Shutting down...".yellow());

    worker.abort();
    let saved = cache.persist(store.as_ref())?;
    store.close()?;

    println!("{} ({} jobs saved)", "✅ Stopped.".green(), saved);
    Ok(())
}
