// src/bin/jobdb.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobdb::StoreConfig;

mod commands;
use commands::*;

fn job_id_arg() -> Arg {
    Arg::new("job_id").help("Job ID").required(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = Command::new("jobdb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and maintain a jobdb job store")
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("PATH")
                .global(true)
                .help("Directory holding jobdb.db (defaults to $JOBDB_DIR or the working directory)"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List every stored job")
                .arg(Arg::new("json")
                    .long("json")
                    .help("Print as JSON")
                    .action(ArgAction::SetTrue))
                .arg(Arg::new("csv")
                    .long("csv")
                    .help("Print as CSV")
                    .conflicts_with("json")
                    .action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("show").about("Show one job as JSON").arg(job_id_arg()))
        .subcommand(
            Command::new("add")
                .about("Create and save a job")
                .arg(Arg::new("name").short('n').long("name").value_name("NAME").required(true))
                .arg(Arg::new("command")
                    .short('c')
                    .long("command")
                    .value_name("COMMAND")
                    .required(true))
                .arg(Arg::new("owner").short('o').long("owner").value_name("OWNER").required(true))
                .arg(Arg::new("schedule")
                    .short('s')
                    .long("schedule")
                    .value_name("CRON")
                    .help("Cron expression with seconds, e.g. \"0 */5 * * * *\"")
                    .required(true))
                .arg(Arg::new("starts_at")
                    .long("starts-at")
                    .value_name("RFC3339")
                    .help("Do not run before this instant"))
                .arg(Arg::new("disabled")
                    .long("disabled")
                    .help("Store the job disabled")
                    .action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("disable").about("Disable a job").arg(job_id_arg()))
        .subcommand(Command::new("enable").about("Re-enable a disabled job").arg(job_id_arg()))
        .subcommand(Command::new("delete").about("Delete a job").arg(job_id_arg()))
        .subcommand(
            Command::new("watch")
                .about("Load jobs into a cache and persist it periodically until Ctrl+C")
                .arg(Arg::new("interval")
                    .short('i')
                    .long("interval")
                    .value_name("SECONDS")
                    .help("Persist interval (defaults to $JOBDB_PERSIST_INTERVAL_SECS or 5)")),
        );

    let matches = app.get_matches();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let config = store_config(&matches)?;

    match matches.subcommand() {
        Some(("list", sub)) => list_command(&config, sub),
        Some(("show", sub)) => show_command(&config, sub),
        Some(("add", sub)) => add_command(&config, sub),
        Some(("disable", sub)) => toggle_command(&config, sub, false),
        Some(("enable", sub)) => toggle_command(&config, sub, true),
        Some(("delete", sub)) => delete_command(&config, sub),
        Some(("watch", sub)) => watch_command(&config, sub).await,
        _ => unreachable!("subcommand_required is set"),
    }
}

fn store_config(matches: &ArgMatches) -> Result<StoreConfig> {
    let mut config = StoreConfig::from_env()?;
    if let Some(dir) = matches.get_one::<String>("dir") {
        config.dir = dir.into();
    }
    Ok(config)
}
