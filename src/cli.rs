// src/cli.rs
//! Argument parsing and the fetch → parse → truncate → render pipeline.

use clap::Parser;
use std::io::Write;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::RssError;
use crate::feed::parse_feed;
use crate::fetch::{FeedSource, HttpSource};
use crate::format::{render, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "rss_reader", version, about = "Command-line RSS 2.0 reader.")]
pub struct Cli {
    /// RSS feed URL
    pub source: String,

    /// Print result as JSON in stdout
    #[arg(long)]
    pub json: bool,

    /// Limit news topics if this parameter provided
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Request timeout in seconds (overrides RSS_READER_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User-Agent header sent with the request
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Resolve fetch settings from file/env and apply this invocation's flags.
    pub fn fetch_config(&self) -> Result<FetchConfig, RssError> {
        let cfg = FetchConfig::from_env()
            .map_err(usage)?
            .with_overrides(self.timeout, self.user_agent.clone());
        cfg.validate().map_err(usage)?;
        Ok(cfg)
    }
}

fn usage(e: anyhow::Error) -> RssError {
    RssError::Usage(format!("{e:#}"))
}

/// Fetch over HTTP and write the rendered feed to `out`.
pub async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), RssError> {
    let cfg = cli.fetch_config()?;
    let source = HttpSource::new(&cli.source, &cfg)?;
    run_with_source(cli, &source, out).await
}

/// Pipeline over any [`FeedSource`]. Output is rendered in full before the
/// first byte is written, so a failure never leaves partial output.
pub async fn run_with_source<W: Write>(
    cli: &Cli,
    source: &dyn FeedSource,
    out: &mut W,
) -> Result<(), RssError> {
    let body = source.fetch().await?;
    let mut feed = parse_feed(&body)?;

    let total = feed.items.len();
    feed.truncate(cli.limit);
    debug!(
        source = %source.describe(),
        total,
        shown = feed.items.len(),
        "feed ready"
    );

    let rendered = render(&feed, cli.format())?;
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(())
}
