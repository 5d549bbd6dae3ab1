use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, level_filters::LevelFilter};

use effortlog::{
    app::{run_app, shutdown::armed_shutdown_token, surface::stdio_surface},
    sink::sheets::SheetsSink,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, resolve_credentials_path},
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Effortlog", version)]
#[command(about = "Focus-session timer that logs finished sessions to a spreadsheet", long_about = None)]
struct Args {
    #[arg(long, help = "Echo logs to stdout")]
    log: bool,
    #[arg(
        long,
        help = "Path to the service credential file. Defaults to service_account.json next to the executable"
    )]
    credentials: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&create_application_default_path()?, logging_level, args.log)?;

    let sink = SheetsSink::new(resolve_credentials_path(args.credentials));
    let mut surface = stdio_surface(armed_shutdown_token());

    run_app(&mut surface, &sink, &DefaultClock)
        .await
        .inspect_err(|e| {
            error!("Error running session loop {e:?}");
        })?;
    Ok(())
}
