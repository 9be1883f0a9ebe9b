use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use showcase::client::HttpFeedClient;
use showcase::config;
use showcase::feed::{FeedController, FeedStatus, FetchOutcome};

#[derive(Debug, Parser)]
#[command(about = "Walk the project feed of a running server page by page and print each project.")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Category filter; omit or pass "All" for every category
    #[arg(long)]
    category: Option<String>,

    /// Stop after this many pages
    #[arg(long, default_value_t = 3)]
    pages: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    let client = HttpFeedClient::from_config(&cfg)?;
    let mut feed = FeedController::new(cfg.app.page_size);

    let mut pending = Some(feed.select_category(args.category.as_deref()));
    let mut page = 0;
    while let Some(fetch) = pending.take() {
        page += 1;
        let shown = feed.projects().len();
        match feed.run(&client, fetch).await {
            FetchOutcome::Applied { appended } => {
                println!("-- page {page}: {appended} new --");
                for p in &feed.projects()[shown..] {
                    println!(
                        "{:>6}  {:<12} {}  (by {})",
                        p.id, p.category, p.title, p.created_by.name
                    );
                }
            }
            FetchOutcome::Failed => {
                let msg = feed.error_message().unwrap_or_default();
                bail!("{msg}");
            }
            FetchOutcome::Stale => {}
        }
        if page >= args.pages {
            break;
        }
        pending = feed.load_more();
    }

    if feed.status() == FeedStatus::LoadedExhausted {
        println!("-- end of feed, {} projects --", feed.projects().len());
    } else {
        println!("-- stopped after {page} pages, cursor {:?} --", feed.cursor());
    }
    Ok(())
}
