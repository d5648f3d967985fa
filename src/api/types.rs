//! 1C API Type Definitions
//!
//! Request parameters, the response envelope and the push events of the
//! 1C Optimization Project API.

use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Time bucketing of a top-products report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    Day,
    #[default]
    Month,
    Quarter,
}

impl Detail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Detail::Day => "day",
            Detail::Month => "month",
            Detail::Quarter => "quarter",
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Detail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Detail::Day),
            "month" => Ok(Detail::Month),
            "quarter" => Ok(Detail::Quarter),
            other => Err(format!("Unknown detail '{}', expected day, month or quarter", other)),
        }
    }
}

/// Query parameters of `GET /reports/top-products`
///
/// Serializes to exactly `start_date`, `end_date`, `detail` and `limit`.
/// Range and limit are validated by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub detail: Detail,
    pub limit: u32,
}

impl ReportRequest {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            detail: Detail::default(),
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Report covering the `days` days that end on `end_date`
    pub fn last_days(end_date: NaiveDate, days: i64) -> Self {
        Self::new(end_date - Duration::days(days), end_date)
    }

    pub fn detail(mut self, detail: Detail) -> Self {
        self.detail = detail;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// JSON body of `POST /test/generate-data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateDataRequest {
    pub days_count: u32,
    pub sales_per_day: u32,
    pub products_count: u32,
}

impl Default for GenerateDataRequest {
    fn default() -> Self {
        Self {
            days_count: 365,
            sales_per_day: 100,
            products_count: 1000,
        }
    }
}

/// Range token of `GET /monitoring/metrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetricsRange {
    #[default]
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    LastWeek,
}

impl MetricsRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricsRange::LastHour => "1h",
            MetricsRange::LastDay => "24h",
            MetricsRange::LastWeek => "7d",
        }
    }
}

impl fmt::Display for MetricsRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricsRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(MetricsRange::LastHour),
            "24h" => Ok(MetricsRange::LastDay),
            "7d" => Ok(MetricsRange::LastWeek),
            other => Err(format!("Unknown time range '{}', expected 1h, 24h or 7d", other)),
        }
    }
}

/// Logical error reported inside a 2xx envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Server error code; numeric codes are kept as their decimal text
    #[serde(default, deserialize_with = "scalar_string")]
    pub code: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub message: String,
}

/// Text of a JSON scalar: strings verbatim, `null` as empty, anything else as JSON
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| scalar_text(&v))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Report generation metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Generation time in seconds
    #[serde(default)]
    pub generated_in: f64,
    /// Whether the server answered from its cache
    #[serde(default)]
    pub cached: bool,
}

/// Response envelope shared by every endpoint
///
/// # Example Response
/// ```json
/// {
///   "success": true,
///   "data": [{"product": "Widget", "sales_count": 42, "sales_amount": 1250.5, "period": "2024-01"}],
///   "metadata": {"generated_in": 0.153, "cached": false}
/// }
/// ```
///
/// A logical failure still arrives with HTTP 2xx:
/// ```json
/// {"success": false, "error": {"code": "INVALID_PERIOD", "message": "start_date is after end_date"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    /// Payload; missing or `null` yields `T::default()`
    #[serde(
        default,
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de> + Default")
    )]
    pub data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,

    /// Human readable status, set by data generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Converts the envelope into a `Result`, trusting the `success` flag only
    pub fn into_result(self) -> Result<T, ApiErrorBody> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| ApiErrorBody {
                code: String::new(),
                message: self.message.unwrap_or_default(),
            }))
        }
    }
}

/// One row of the top-products report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product: String,
    pub sales_count: u64,
    pub sales_amount: f64,
    pub period: String,

    /// Columns the server sends beyond the four above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TopProduct {
    pub const COLUMNS: [&'static str; 4] = ["product", "sales_count", "sales_amount", "period"];

    /// Extra column names across `rows`, in first-seen order
    pub fn extra_columns(rows: &[TopProduct]) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for key in rows.iter().flat_map(|row| row.extra.keys()) {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
        columns
    }

    /// Text of an extra column; empty when this row lacks it
    pub fn extra_text(&self, column: &str) -> String {
        self.extra.get(column).map(scalar_text).unwrap_or_default()
    }
}

pub type ReportResponse = ApiResponse<Vec<TopProduct>>;

/// Slow-query diagnostic record from `GET /monitoring/slow-queries`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowQuery {
    pub query_name: String,
    /// Average duration in seconds
    pub avg_duration: f64,
    pub call_count: u64,
}

/// Status of `POST /test/generate-data`
pub type GenerateDataResponse = ApiResponse<Value>;

/// Payload of `GET /monitoring/metrics`; its shape is owned by the server
pub type MetricsResponse = ApiResponse<Value>;

/// Push notification received on the update stream
///
/// The `type` discriminator is kept verbatim and every other field is
/// preserved, so kinds this crate does not know about are still delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StreamEvent {
    pub const CACHE_INVALIDATED: &'static str = "cache_invalidated";
    pub const NEW_SALES: &'static str = "new_sales";
    pub const PERFORMANCE_ALERT: &'static str = "performance_alert";

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Typed view of the known event kinds
    ///
    /// Returns `None` for unknown kinds or when the fields don't match.
    pub fn update(&self) -> Option<Update> {
        match self.kind.as_str() {
            Self::CACHE_INVALIDATED => self.decode().map(Update::CacheInvalidated),
            Self::NEW_SALES => self.decode().map(Update::NewSales),
            Self::PERFORMANCE_ALERT => self.decode().map(Update::PerformanceAlert),
            _ => None,
        }
    }

    fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).ok()
    }
}

/// Known update kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    CacheInvalidated(CacheInvalidated),
    NewSales(NewSales),
    PerformanceAlert(PerformanceAlert),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheInvalidated {
    /// Invalidated date; absent when the whole cache was dropped
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSales {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerformanceAlert {
    pub query: String,
    /// Duration in seconds
    pub duration: f64,
}
