//! Runs one analysis batch from the command line and prints the response.
//!
//! Usage: `analyze-domains linkedin.com github.com medium.com`

use rust_similarweb_api::config::Config;
use rust_similarweb_api::models::BatchResponse;
use rust_similarweb_api::orchestrator::{AnalyzeOptions, Orchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_similarweb_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let websites: Vec<String> = std::env::args().skip(1).collect();
    if websites.is_empty() {
        anyhow::bail!("usage: analyze-domains <domain> [domain...]");
    }

    let config = Config::from_env()?;
    let orchestrator = Orchestrator::from_config(&config)?;

    let total = websites.len();
    eprintln!("=== Analyzing {} website(s) ===", total);

    let response = orchestrator
        .analyze(&websites, &AnalyzeOptions::default())
        .await?;

    for line in progress_lines(&response, total) {
        eprintln!("{}", line);
    }
    if let Some(note) = &response.note {
        eprintln!("⚠️ {}", note);
    }

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

/// One line per returned record, numbered against `count`, plus a summary
/// line when domains were omitted.
fn progress_lines(response: &BatchResponse, requested: usize) -> Vec<String> {
    let mut lines: Vec<String> = response
        .data
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            format!(
                "[{}/{}] {} - visits: {}, bounce rate: {:.2}%",
                idx + 1,
                response.count,
                record.name,
                record.total_visits,
                record.bounce_rate * 100.0
            )
        })
        .collect();
    if response.count < requested {
        lines.push(format!(
            "{} of {} requested domain(s) omitted",
            requested - response.count,
            requested
        ));
    }
    lines
}
