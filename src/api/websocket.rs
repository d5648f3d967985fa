//! Update stream listener
//!
//! Subscribes to the server's push channel over WebSocket. The listener runs
//! on its own tokio task, owns the socket and hands every decoded event to a
//! caller-supplied handler or channel.
//!
//! ## Behavior
//! - One connection per subscription, bearer token sent on the handshake
//! - Handler invoked once per JSON frame, in receipt order
//! - Malformed frames are logged and skipped
//! - Errors and disconnects are logged, never returned; there is no reconnect

use crate::api::client::OneCApiClient;
use crate::api::types::StreamEvent;
use crate::error::{RequestError, StreamError};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Path segment that replaces the API version prefix
const STREAM_SEGMENT: &str = "ws";

/// Derives the stream endpoint from the REST base URL
///
/// `https` becomes `wss`, `http` becomes `ws`, and the first version segment
/// (`v1`, `v2`, ...) is replaced by `ws`. A base URL without a version
/// segment gets `/ws` appended.
///
/// ```
/// use onec_api_client::api::websocket::stream_url;
///
/// let url = stream_url("https://api.1c-project.example.com/v1").unwrap();
/// assert_eq!(url.as_str(), "wss://api.1c-project.example.com/ws");
/// ```
pub fn stream_url(base_url: &str) -> Result<Url, RequestError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RequestError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(RequestError::Config(format!(
                "Cannot derive stream URL from scheme '{}'",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| RequestError::Config(format!("Cannot switch {} to {}", base_url, scheme)))?;

    let mut segments: Vec<String> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();

    match segments.iter().position(|seg| is_version_segment(seg)) {
        Some(idx) => segments[idx] = STREAM_SEGMENT.to_string(),
        None => segments.push(STREAM_SEGMENT.to_string()),
    }

    url.set_path(&format!("/{}", segments.join("/")));
    Ok(url)
}

fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') && {
        let rest = chars.as_str();
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
    }
}

/// Handle to a running update subscription
///
/// Dropping the handle does not stop the listener; it runs until the server
/// closes the connection, the transport fails, or [`abort`](Self::abort) is called.
#[derive(Debug)]
pub struct StreamSubscription {
    url: Url,
    handle: JoinHandle<()>,
}

impl StreamSubscription {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the listener and drops the socket
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Waits until the listener ends
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                error!(error = %e, "Stream listener task panicked");
            }
        }
    }
}

impl OneCApiClient {
    /// Subscribe to live updates
    ///
    /// Spawns a background task that connects to the stream endpoint and calls
    /// `handler` once per received event. Must be called from within a Tokio
    /// runtime.
    ///
    /// # Errors
    /// Only configuration problems (stream URL cannot be derived, no runtime).
    /// Connection and read failures are logged by the listener.
    ///
    /// # Example
    /// ```no_run
    /// use onec_api_client::api::{OneCApiClient, Update};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = OneCApiClient::new("https://api.1c-project.example.com/v1", "token")?;
    /// let _subscription = client.subscribe_updates(|event| match event.update() {
    ///     Some(Update::NewSales(sales)) => println!("New sales: {} records", sales.count),
    ///     _ => println!("Update received: {}", event.kind()),
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe_updates<F>(&self, mut handler: F) -> Result<StreamSubscription, RequestError>
    where
        F: FnMut(StreamEvent) + Send + 'static,
    {
        self.spawn_listener(move |event| {
            handler(event);
            true
        })
    }

    /// Subscribe to live updates through a channel
    ///
    /// The listener closes the socket once the receiver is dropped.
    pub fn subscribe_channel(
        &self,
    ) -> Result<(StreamSubscription, mpsc::UnboundedReceiver<StreamEvent>), RequestError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.spawn_listener(move |event| tx.send(event).is_ok())?;
        Ok((subscription, rx))
    }

    fn spawn_listener<F>(&self, deliver: F) -> Result<StreamSubscription, RequestError>
    where
        F: FnMut(StreamEvent) -> bool + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            RequestError::Config("Update stream requires a running Tokio runtime".to_string())
        })?;

        let url = stream_url(self.base_url())?;
        let request = self.handshake_request(&url)?;

        let task_url = url.clone();
        let handle = runtime.spawn(async move {
            match listen(request, deliver).await {
                Ok(()) => info!(url = %task_url, "WebSocket connection closed"),
                Err(StreamError::ReceiverDropped) => {
                    info!(url = %task_url, "Update receiver dropped, WebSocket closed")
                }
                Err(StreamError::Closed) => {
                    warn!(url = %task_url, "WebSocket connection closed without close frame")
                }
                Err(e) => error!(url = %task_url, error = %e, "WebSocket error"),
            }
        });

        Ok(StreamSubscription { url, handle })
    }

    fn handshake_request(&self, url: &Url) -> Result<Request, RequestError> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| RequestError::Config(format!("Invalid stream URL {}: {}", url, e)))?;

        let mut auth = HeaderValue::from_str(&self.credentials.bearer())
            .map_err(|e| RequestError::Config(format!("Token is not a valid header value: {}", e)))?;
        auth.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, auth);

        Ok(request)
    }
}

/// Connect and pump messages until the server closes or `deliver` refuses
async fn listen<F>(request: Request, mut deliver: F) -> Result<(), StreamError>
where
    F: FnMut(StreamEvent) -> bool,
{
    info!(uri = %request.uri(), "Connecting to update stream");

    let (ws_stream, _) = connect_async(request).await?;
    info!("WebSocket connection established");

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let parsed = match msg {
            Ok(Message::Text(text)) => serde_json::from_str::<StreamEvent>(&text),
            Ok(Message::Binary(data)) => serde_json::from_slice::<StreamEvent>(&data),
            Ok(Message::Ping(data)) => {
                debug!("Received ping, sending pong");
                if write.send(Message::Pong(data)).await.is_err() {
                    warn!("Failed to send pong");
                }
                continue;
            }
            Ok(Message::Pong(_)) => {
                debug!("Received pong");
                continue;
            }
            Ok(Message::Close(frame)) => {
                info!(frame = ?frame, "WebSocket close frame received");
                return Ok(());
            }
            Ok(Message::Frame(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        match parsed {
            Ok(event) => {
                debug!(kind = %event.kind(), "Received update");
                if !deliver(event) {
                    let _ = write.send(Message::Close(None)).await;
                    return Err(StreamError::ReceiverDropped);
                }
            }
            Err(e) => warn!(error = %e, "Error parsing WebSocket message"),
        }
    }

    Err(StreamError::Closed)
}
