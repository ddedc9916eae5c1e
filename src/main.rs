use tracing_subscriber::EnvFilter;

pub mod catalog;
use catalog::search_catalog;
pub mod http_probe;
use http_probe::prelude::*;
pub mod config;
use config::app_config::{load_config, setup_client};
pub mod error;
pub mod report;
use report::{render_catalog, render_report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app_config = load_config()?;
    let config = &app_config.config;
    let client = setup_client()?;
    let timeout = config.settings().validate()?;

    println!("🔍 Probing {} candidate endpoints", config.candidates.len());
    println!(
        "Using config: {}, limit: {}, timeout: {}s",
        app_config.source, config.record_limit, config.timeout_seconds
    );
    println!("{}", "=".repeat(60));

    let report = probe(&client, &config.candidates, &config.settings()).await?;
    print!("{}", render_report(&report, app_config.max_name_width));
    tracing::info!(
        "Run started at {} finished with {}/{} working endpoints",
        report.started_at.to_rfc3339(),
        report.working().len(),
        report.len()
    );

    if report.working().is_empty() && config.catalog.enabled {
        println!("\n🔎 Searching catalog for \"{}\"", config.catalog.keywords);
        println!("{}", "=".repeat(50));

        let entries = search_catalog(
            &client,
            &config.catalog.base_url,
            &config.catalog.keywords,
            config.catalog.limit,
            timeout,
        )
        .await?;
        print!("{}", render_catalog(&entries));
    }

    Ok(())
}
