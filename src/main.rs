//! rss_reader — fetch an RSS 2.0 feed and print its items as text or JSON.

use clap::Parser;
use std::process::ExitCode;

use rss_reader::cli::{self, Cli};
use rss_reader::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; missing file is fine.
    let _ = dotenvy::dotenv();

    // Exits with status 2 on bad arguments, before any network call.
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let mut stdout = std::io::stdout().lock();
    match cli::run(&cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            let code = e.exit_code();
            eprintln!("error: {}", e.report());
            ExitCode::from(code)
        }
    }
}
