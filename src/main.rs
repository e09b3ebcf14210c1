use clap::Parser;
use finance_tracker::args::{Args, Command};
use finance_tracker::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{e:#}");
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().fin_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.backend(), init_args.base_url().cloned())
                .await?
                .print()
        }

        Command::Months => commands::months().print(),

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(&config, list_args.month(), list_args.page())
                .await?
                .print()
        }

        Command::Summary(month_args) => {
            let config = Config::load(home).await?;
            commands::summary(&config, month_args.month())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(&config, add_args).await?.print()
        }

        Command::Remove(remove_args) => {
            let config = Config::load(home).await?;
            commands::remove(&config, remove_args.id(), remove_args.month())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => {
            // Without RUST_LOG, only this crate logs, at the requested level.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "finance_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
