//! 1C API HTTP Client
//!
//! HTTP client wrapper for the 1C Optimization Project REST API.
//! Every call performs exactly one round trip: no retry, no backoff, no caching.

use crate::api::types::{
    ApiResponse, GenerateDataRequest, GenerateDataResponse, MetricsRange, MetricsResponse,
    ReportRequest, ReportResponse, SlowQuery, scalar_text,
};
use crate::config::{ClientConfig, Credentials};
use crate::error::RequestError;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Default number of slow queries requested
pub const DEFAULT_SLOW_QUERY_LIMIT: u32 = 20;

#[derive(Serialize)]
struct LimitQuery {
    limit: u32,
}

#[derive(Serialize)]
struct RangeQuery {
    range: MetricsRange,
}

#[derive(Serialize)]
struct InvalidateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

/// 1C REST API client
///
/// Owns its configuration explicitly: base URL, bearer token and the default
/// headers live on the instance, never in process-wide state. Cloning is cheap
/// and clones share the underlying connection pool.
#[derive(Clone)]
pub struct OneCApiClient {
    pub(crate) client: Client,
    pub(crate) credentials: Credentials,
}

impl std::fmt::Debug for OneCApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneCApiClient")
            .field("base_url", &self.credentials.base_url())
            .field("token", &"***")
            .finish()
    }
}

impl OneCApiClient {
    /// Creates a client with default settings (30 s timeout)
    ///
    /// # Example
    /// ```no_run
    /// use onec_api_client::api::OneCApiClient;
    ///
    /// let client = OneCApiClient::new("https://api.1c-project.example.com/v1", "your_jwt_token_here")?;
    /// # Ok::<(), onec_api_client::error::RequestError>(())
    /// ```
    pub fn new(base_url: &str, token: &str) -> Result<Self, RequestError> {
        let credentials = Credentials::new(base_url, token)?;
        Self::with_config(ClientConfig::new(credentials))
    }

    /// Creates a client from environment configuration
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, RequestError> {
        Self::with_config(ClientConfig::from_env()?)
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, RequestError> {
        let mut auth = HeaderValue::from_str(&config.credentials.bearer())
            .map_err(|e| RequestError::Config(format!("Token is not a valid header value: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| RequestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials: config.credentials,
        })
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        self.credentials.base_url()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get top products for a period
    ///
    /// Calls GET /reports/top-products
    ///
    /// # Returns
    /// * `Ok(ReportResponse)` - The envelope as sent by the server. Check
    ///   `success` before using `data`.
    /// * `Err(RequestError)` - Non-2xx status or network error
    ///
    /// # Example
    /// ```no_run
    /// use onec_api_client::api::{OneCApiClient, ReportRequest};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = OneCApiClient::new("https://api.1c-project.example.com/v1", "token")?;
    /// let today = chrono::Local::now().date_naive();
    /// let report = client.get_top_products(&ReportRequest::last_days(today, 30)).await?;
    /// if report.success {
    ///     for row in &report.data {
    ///         println!("{}: {}", row.product, row.sales_count);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_top_products(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportResponse, RequestError> {
        let builder = self.request(Method::GET, "/reports/top-products").query(request);
        self.send(builder).await
    }

    /// Trigger synthetic test-data generation
    ///
    /// Calls POST /test/generate-data with a JSON body. The server replaces
    /// its sales data; use against test installations only.
    pub async fn generate_test_data(
        &self,
        request: &GenerateDataRequest,
    ) -> Result<GenerateDataResponse, RequestError> {
        let builder = self.request(Method::POST, "/test/generate-data").json(request);
        self.send(builder).await
    }

    /// Get the slowest queries recorded by the server
    ///
    /// Calls GET /monitoring/slow-queries and unwraps the envelope's `data`.
    /// A logical failure yields an empty list and a warning in the log.
    pub async fn get_slow_queries(&self, limit: u32) -> Result<Vec<SlowQuery>, RequestError> {
        let builder = self
            .request(Method::GET, "/monitoring/slow-queries")
            .query(&LimitQuery { limit });
        let envelope: ApiResponse<Vec<SlowQuery>> = self.send(builder).await?;

        if !envelope.success {
            if let Some(error) = &envelope.error {
                tracing::warn!(code = %error.code, message = %error.message, "Slow query listing failed");
            }
        }

        Ok(envelope.data)
    }

    /// Invalidate the server cache
    ///
    /// Calls DELETE /cache/invalidate. With `None` the `date` parameter is
    /// omitted and the whole cache is dropped.
    ///
    /// # Returns
    /// The envelope's `success` flag
    pub async fn invalidate_cache(&self, date: Option<NaiveDate>) -> Result<bool, RequestError> {
        let builder = self
            .request(Method::DELETE, "/cache/invalidate")
            .query(&InvalidateQuery { date });
        let envelope: ApiResponse<Value> = self.send(builder).await?;

        tracing::info!(
            date = %date.map(|d| d.to_string()).unwrap_or_else(|| "all".to_string()),
            success = envelope.success,
            "Cache invalidation requested"
        );

        Ok(envelope.success)
    }

    /// Get performance metrics for a time range
    ///
    /// Calls GET /monitoring/metrics
    pub async fn get_performance_metrics(
        &self,
        range: MetricsRange,
    ) -> Result<MetricsResponse, RequestError> {
        let builder = self
            .request(Method::GET, "/monitoring/metrics")
            .query(&RangeQuery { range });
        self.send(builder).await
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.credentials.base_url(), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.endpoint(path))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RequestError> {
        let response = builder.send().await.map_err(|err| {
            tracing::error!(error = %err, "Network error: no response received");
            RequestError::from(err)
        })?;

        let status = response.status();
        let url = response.url().to_string();
        tracing::debug!(url = %url, status = %status, "Received response");

        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RequestError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}

/// Turns a non-2xx response into `RequestError::Status`
///
/// The body is inspected only to enrich the message; any body, JSON or not,
/// yields the same variant.
async fn status_error(response: Response) -> RequestError {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();

    let error = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").cloned());
    let code = error
        .as_ref()
        .and_then(|e| e.get("code"))
        .map(scalar_text);
    let message = error
        .as_ref()
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    tracing::error!(status = %status, url = %url, body = %body, "API Error");

    RequestError::Status {
        status,
        url,
        code,
        message,
    }
}
