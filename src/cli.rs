//! Command-line parsing for the demo binary

use crate::api::{Detail, GenerateDataRequest, MetricsRange, DEFAULT_SLOW_QUERY_LIMIT};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Default number of seconds the `stream` command listens for updates
pub const DEFAULT_STREAM_SECONDS: u64 = 30;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    /// Overrides `ONEC_API_BASE_URL`
    pub base_url: Option<String>,
    /// Overrides `ONEC_API_TOKEN`
    pub token: Option<String>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TopProducts {
        /// Defaults to 30 days before `end`
        start: Option<NaiveDate>,
        /// Defaults to today
        end: Option<NaiveDate>,
        detail: Detail,
        limit: u32,
        csv: Option<PathBuf>,
        chart: bool,
    },
    SlowQueries {
        limit: u32,
    },
    GenerateData(GenerateDataRequest),
    InvalidateCache {
        date: Option<NaiveDate>,
    },
    Metrics {
        range: MetricsRange,
    },
    Stream {
        seconds: u64,
    },
    /// Walk through reports, slow queries and the update stream
    Demo,
    Help,
}

/// Parse command-line arguments (`args[0]` is the program name)
pub fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut base_url = None;
    let mut token = None;
    let mut rest = args.iter().skip(1).map(String::as_str);
    let mut command_name = None;

    while let Some(arg) = rest.next() {
        match arg {
            "--base-url" => base_url = Some(value(&mut rest, arg)?.to_string()),
            "--token" => token = Some(value(&mut rest, arg)?.to_string()),
            "--help" | "-h" => {
                return Ok(Cli {
                    base_url,
                    token,
                    command: Command::Help,
                })
            }
            other if other.starts_with('-') => return Err(format!("Unknown argument: {}", other)),
            other => {
                command_name = Some(other);
                break;
            }
        }
    }

    let command = match command_name.unwrap_or("demo") {
        "demo" => no_options(&mut rest, Command::Demo)?,
        "top-products" => parse_top_products(&mut rest)?,
        "slow-queries" => {
            let mut limit = DEFAULT_SLOW_QUERY_LIMIT;
            while let Some(arg) = rest.next() {
                match arg {
                    "--limit" => limit = parse_value(&mut rest, arg)?,
                    other => return Err(format!("Unknown argument: {}", other)),
                }
            }
            Command::SlowQueries { limit }
        }
        "generate-data" => {
            let mut request = GenerateDataRequest::default();
            while let Some(arg) = rest.next() {
                match arg {
                    "--days" => request.days_count = parse_value(&mut rest, arg)?,
                    "--sales-per-day" => request.sales_per_day = parse_value(&mut rest, arg)?,
                    "--products" => request.products_count = parse_value(&mut rest, arg)?,
                    other => return Err(format!("Unknown argument: {}", other)),
                }
            }
            Command::GenerateData(request)
        }
        "invalidate-cache" => {
            let mut date = None;
            while let Some(arg) = rest.next() {
                match arg {
                    "--date" => date = Some(parse_value(&mut rest, arg)?),
                    other => return Err(format!("Unknown argument: {}", other)),
                }
            }
            Command::InvalidateCache { date }
        }
        "metrics" => {
            let mut range = MetricsRange::default();
            while let Some(arg) = rest.next() {
                match arg {
                    "--range" => range = parse_value(&mut rest, arg)?,
                    other => return Err(format!("Unknown argument: {}", other)),
                }
            }
            Command::Metrics { range }
        }
        "stream" => {
            let mut seconds = DEFAULT_STREAM_SECONDS;
            while let Some(arg) = rest.next() {
                match arg {
                    "--seconds" => seconds = parse_value(&mut rest, arg)?,
                    other => return Err(format!("Unknown argument: {}", other)),
                }
            }
            Command::Stream { seconds }
        }
        "help" => Command::Help,
        other => return Err(format!("Unknown command: {}", other)),
    };

    Ok(Cli {
        base_url,
        token,
        command,
    })
}

fn parse_top_products<'a>(rest: &mut impl Iterator<Item = &'a str>) -> Result<Command, String> {
    let mut start = None;
    let mut end = None;
    let mut detail = Detail::default();
    let mut limit = crate::api::ReportRequest::DEFAULT_LIMIT;
    let mut csv = None;
    let mut chart = false;

    while let Some(arg) = rest.next() {
        match arg {
            "--start" => start = Some(parse_value(rest, arg)?),
            "--end" => end = Some(parse_value(rest, arg)?),
            "--detail" => detail = parse_value(rest, arg)?,
            "--limit" => limit = parse_value(rest, arg)?,
            "--csv" => csv = Some(PathBuf::from(value(rest, arg)?)),
            "--chart" => chart = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(Command::TopProducts {
        start,
        end,
        detail,
        limit,
        csv,
        chart,
    })
}

fn no_options<'a>(
    rest: &mut impl Iterator<Item = &'a str>,
    command: Command,
) -> Result<Command, String> {
    match rest.next() {
        Some(other) => Err(format!("Unknown argument: {}", other)),
        None => Ok(command),
    }
}

fn value<'a>(rest: &mut impl Iterator<Item = &'a str>, flag: &str) -> Result<&'a str, String> {
    rest.next()
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_value<'a, T>(rest: &mut impl Iterator<Item = &'a str>, flag: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value(rest, flag)?;
    raw.parse::<T>()
        .map_err(|e| format!("Invalid value '{}' for {}: {}", raw, flag, e))
}

/// Print usage information
pub fn print_usage() {
    println!("onec-api-client - client for the 1C Optimization Project API");
    println!();
    println!("USAGE:");
    println!("    onec-api-client [OPTIONS] [COMMAND] [COMMAND OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --base-url <URL>    API base URL (overrides ONEC_API_BASE_URL)");
    println!("    --token <TOKEN>     JWT bearer token (overrides ONEC_API_TOKEN)");
    println!("    --help, -h          Print this help message");
    println!();
    println!("COMMANDS:");
    println!("    demo                Top products, CSV export, slow queries, 30 s of updates (default)");
    println!("    top-products        [--start YYYY-MM-DD] [--end YYYY-MM-DD] [--detail day|month|quarter]");
    println!("                        [--limit N] [--csv FILE] [--chart]");
    println!("    slow-queries        [--limit N]  (default: 20)");
    println!("    generate-data       [--days N] [--sales-per-day N] [--products N]");
    println!("    invalidate-cache    [--date YYYY-MM-DD]  (no date: whole cache)");
    println!("    metrics             [--range 1h|24h|7d]");
    println!("    stream              [--seconds N]  (default: 30)");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    ONEC_API_BASE_URL       API base URL (default: https://api.1c-project.example.com/v1)");
    println!("    ONEC_API_TOKEN          JWT bearer token (required)");
    println!("    ONEC_API_TIMEOUT_SECS   Request timeout in seconds (default: 30)");
    println!("    RUST_LOG                Logging level (default: info)");
}
