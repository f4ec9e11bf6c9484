use anyhow::Context;
use chrono::Local;
use tracing_subscriber::EnvFilter;

use fare_scanner::{
    report, DuffelClient, GridSearch, ResultReporter, ScanConfig, SearchWindow, SlackNotifier,
    TripLengthBounds,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ScanConfig::from_env()?;
    let today = Local::now().date_naive();
    let window = SearchWindow::days_out(today, config.start_days_out, config.end_days_out);
    let bounds = TripLengthBounds {
        min_days: config.min_trip_days,
        max_days: config.max_trip_days,
    };

    tracing::info!(
        origin = %config.origin,
        destination = %config.destination,
        window_start = %window.start,
        window_end = %window.end,
        threshold = config.threshold,
        currency = %config.currency,
        "starting fare scan"
    );

    let client = DuffelClient::new(&config)?;
    let mut search = GridSearch::new(&config, client);
    let results = search.run(window, bounds).await?;

    let stats = search.cache_stats();
    tracing::info!(
        rows = results.rows.len(),
        alerts = results.alerts.len(),
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        "scan complete"
    );

    let reporter = ResultReporter::new(&config);
    let run_report = reporter.summarize(results, today);

    println!("{}", run_report.text_report);

    // The snapshot is a primary output: persist it before attempting any
    // notification so a delivery failure cannot lose the run's results.
    report::write_snapshot(&config.results_path, &run_report.snapshot)
        .with_context(|| format!("writing snapshot to {}", config.results_path.display()))?;
    tracing::info!(path = %config.results_path.display(), "snapshot written");

    if let Some(message) = &run_report.alert_message {
        println!("{message}");
        let notifier = SlackNotifier::from_config(&config);
        match notifier.send(message).await {
            Ok(true) => tracing::info!("alert notification delivered"),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(error = %err, "alert delivery failed; snapshot already written");
            }
        }
    }

    Ok(())
}
