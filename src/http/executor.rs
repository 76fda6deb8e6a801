use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::config::RunConfig;
use crate::error::AppResult;
use crate::metrics::{FailureKind, RequestOutcome};

use super::client::{RequestTemplate, build_client};

/// Performs one request per call. The dispatcher runs many calls
/// concurrently, so implementations must be shareable across tasks.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn execute(&self) -> RequestOutcome;
}

/// Issues the configured GET and times it end to end, body included.
#[derive(Debug)]
pub struct HttpExecutor {
    client: Client,
    template: RequestTemplate,
}

impl HttpExecutor {
    /// Builds the shared client and the request template.
    ///
    /// # Errors
    ///
    /// Returns an error when the client or the request cannot be built; the
    /// run must not start in that case.
    pub fn new(config: &RunConfig) -> AppResult<Self> {
        let client = build_client(config)?;
        let template = RequestTemplate::new(&client, config)?;
        Ok(Self { client, template })
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self) -> RequestOutcome {
        let Some(request) = self.template.instantiate() else {
            error!(
                "Failed to clone request template for {}.",
                self.template.request().url()
            );
            return RequestOutcome::Failure {
                kind: FailureKind::Transport,
            };
        };

        let start = Instant::now();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => return failure(&err, start),
        };
        let status = response.status();
        let body_bytes = match drain_response_body(response).await {
            Ok(body_bytes) => body_bytes,
            Err(err) => return failure(&err, start),
        };
        let latency = start.elapsed();

        if status.is_success() {
            debug!(
                "Request returned {} with {} body bytes in {:?}.",
                status, body_bytes, latency
            );
        } else {
            warn!(
                "Request returned non-success status {} after {:?}.",
                status, latency
            );
        }
        RequestOutcome::Response {
            status: status.as_u16(),
            latency,
            body_bytes,
        }
    }
}

fn failure(err: &reqwest::Error, start: Instant) -> RequestOutcome {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Transport
    };
    warn!("Request failed after {:?}: {}", start.elapsed(), err);
    RequestOutcome::Failure { kind }
}

async fn drain_response_body(response: Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
