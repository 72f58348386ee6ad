use std::io::Write;
use std::sync::Arc;

use kafka_sentiment::config::HandlerConfig;
use kafka_sentiment::host::{self, EventSource, FileSource, StdinSource};
use kafka_sentiment::pipeline::EventHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries one JSON result per record.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = HandlerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  SENTIMENT_POLICY=two_way|three_way");
        eprintln!("  SENTIMENT_NEUTRAL_BAND=<0.0..=1.0>");
        std::process::exit(2);
    });

    eprintln!("Kafka Sentiment v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Policy: {}", config.policy.label());

    let source: Box<dyn EventSource> = match &config.input {
        Some(path) => {
            eprintln!("   Input: {}", path.display());
            Box::new(FileSource::new(path.clone()))
        }
        None => {
            eprintln!("   Input: stdin");
            Box::new(StdinSource::new())
        }
    };

    let handler = Arc::new(EventHandler::with_defaults(config.policy));
    let records = source.start().await?;

    let stdout = std::io::stdout();
    let run = host::run(handler, records, |line| {
        let json = match serde_json::to_string(line) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize output line");
                return Ok(());
            }
        };
        let mut out = stdout.lock();
        writeln!(out, "{}", json)?;
        Ok(())
    })
    .await;

    // A stdout write error (e.g. a closed pipe) ends the run.
    let summary = match run {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            std::process::exit(1);
        }
    };

    eprintln!(
        "   Done: {} handled, {} failed",
        summary.handled, summary.failed
    );

    if summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
