use clap::Parser;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::process::ExitCode;
use token_dump::{components::dump::dump_tokens, config::settings::Settings};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = SimpleLogger::new()
        .with_colors(true)
        .with_level(LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("logger init failed: {e}");

        return ExitCode::FAILURE;
    }

    let settings = Settings::parse();

    info!("Running token dump for {} tokens...", settings.platform);

    match dump_tokens(&settings).await {
        Ok(summary) => {
            info!(
                "done: {} of {} listings written to {:?} ({} rejected)",
                summary.kept, summary.fetched, summary.output, summary.rejected
            );

            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("token dump failed: {}", e);

            ExitCode::FAILURE
        }
    }
}
