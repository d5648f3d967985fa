use anyhow::Context;
use chrono::{Duration as ChronoDuration, Local};
use onec_api_client::api::{OneCApiClient, ReportRequest, ReportResponse};
use onec_api_client::cli::{parse_args, print_usage, Cli, Command};
use onec_api_client::config::ClientConfig;
use onec_api_client::report::{render_slow_queries, render_top_products, top_products_chart};
use std::path::Path;

/// Days covered by the demo report
const DEMO_REPORT_DAYS: i64 = 30;

/// Slow queries listed by the demo
const DEMO_SLOW_QUERY_LIMIT: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if cli.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client = build_client(&cli)?;
    tracing::info!(
        base_url = %client.base_url(),
        token = %client.credentials().token(),
        "Client ready"
    );

    match cli.command {
        Command::Demo => run_demo(&client).await?,
        Command::TopProducts {
            start,
            end,
            detail,
            limit,
            csv,
            chart,
        } => {
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            let start = start.unwrap_or(end - ChronoDuration::days(DEMO_REPORT_DAYS));
            let request = ReportRequest::new(start, end).detail(detail).limit(limit);

            let report = client.get_top_products(&request).await?;
            print!("{}", render_top_products(&report));

            if report.success && chart {
                println!("{}", top_products_chart(&report.data));
            }
            if let Some(path) = csv {
                export_csv(&report, &path)?;
            }
        }
        Command::SlowQueries { limit } => {
            let queries = client.get_slow_queries(limit).await?;
            println!("Top {} slow queries:", limit);
            print!("{}", render_slow_queries(&queries));
        }
        Command::GenerateData(request) => {
            let result = client.generate_test_data(&request).await?;
            if result.success {
                println!(
                    "Generated: {}",
                    result.message.as_deref().unwrap_or("test data generation started")
                );
            } else {
                let error = result.error.map(|e| e.to_string()).unwrap_or_default();
                println!("Error: {}", error);
            }
        }
        Command::InvalidateCache { date } => {
            let success = client.invalidate_cache(date).await?;
            let target = date.map(|d| d.to_string()).unwrap_or_else(|| "all".to_string());
            println!("Cache invalidation for {}: {}", target, if success { "ok" } else { "failed" });
        }
        Command::Metrics { range } => {
            let metrics = client.get_performance_metrics(range).await?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Command::Stream { seconds } => run_stream(&client, seconds).await?,
        Command::Help => print_usage(),
    }

    Ok(())
}

/// Command-line values take precedence over the environment
fn build_client(cli: &Cli) -> anyhow::Result<OneCApiClient> {
    let config = ClientConfig::from_lookup(|key| {
        let flag = match key {
            "ONEC_API_BASE_URL" => cli.base_url.clone(),
            "ONEC_API_TOKEN" => cli.token.clone(),
            _ => None,
        };
        flag.or_else(|| std::env::var(key).ok())
    })
    .context("Failed to load client configuration")?;

    Ok(OneCApiClient::with_config(config)?)
}

async fn run_demo(client: &OneCApiClient) -> anyhow::Result<()> {
    println!("=== 1C Optimization Project API example ===\n");

    let today = Local::now().date_naive();
    println!("Fetching top products for the last {} days...", DEMO_REPORT_DAYS);
    match client
        .get_top_products(&ReportRequest::last_days(today, DEMO_REPORT_DAYS))
        .await
    {
        Ok(report) => {
            print!("{}", render_top_products(&report));
            if report.success {
                export_csv(&report, Path::new("top_products.csv"))?;
            }
        }
        Err(e) => println!("Request error: {}", e),
    }

    println!("\n{}\n", "=".repeat(50));
    println!("Fetching top {} slow queries...", DEMO_SLOW_QUERY_LIMIT);
    match client.get_slow_queries(DEMO_SLOW_QUERY_LIMIT).await {
        Ok(queries) => print!("{}", render_slow_queries(&queries)),
        Err(e) => println!("Failed to fetch slow queries: {}", e),
    }

    println!("\n{}\n", "=".repeat(50));
    run_stream(client, onec_api_client::cli::DEFAULT_STREAM_SECONDS).await?;

    println!("\n=== Example finished ===");
    Ok(())
}

#[cfg(feature = "export")]
fn export_csv(report: &ReportResponse, path: &Path) -> anyhow::Result<()> {
    let rows = onec_api_client::report::export_to_csv(report, path)?;
    if rows > 0 {
        println!("Data exported to {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "export"))]
fn export_csv(_report: &ReportResponse, _path: &Path) -> anyhow::Result<()> {
    tracing::warn!("CSV export not available - compile with 'export' feature");
    Ok(())
}

#[cfg(feature = "websocket")]
async fn run_stream(client: &OneCApiClient, seconds: u64) -> anyhow::Result<()> {
    use onec_api_client::api::{StreamEvent, Update};

    fn print_update(event: StreamEvent) {
        println!("\nUpdate received: {}", event.kind());
        match event.update() {
            Some(Update::CacheInvalidated(c)) => {
                println!("Cache invalidated for date: {}", c.date.as_deref().unwrap_or("all"))
            }
            Some(Update::NewSales(s)) => println!("New sales: {} records", s.count),
            Some(Update::PerformanceAlert(a)) => {
                println!("Performance alert: {} ({} s)", a.query, a.duration)
            }
            None => {}
        }
    }

    println!("Connecting to the update stream...");
    let subscription = client.subscribe_updates(print_update)?;
    println!("Waiting for updates for {} seconds...", seconds);

    tokio::select! {
        _ = tokio::time::sleep(std::time::Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal (Ctrl+C)");
        }
    }

    subscription.abort();
    Ok(())
}

#[cfg(not(feature = "websocket"))]
async fn run_stream(_client: &OneCApiClient, _seconds: u64) -> anyhow::Result<()> {
    tracing::error!("Update stream not available - compile with 'websocket' feature");
    Err(anyhow::anyhow!("Update stream not available"))
}
