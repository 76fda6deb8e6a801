use std::collections::BTreeMap;

use reqwest::{
    Client, Request,
    header::{HeaderMap, HeaderName, HeaderValue},
};

use crate::args::DEFAULT_USER_AGENT;
use crate::config::RunConfig;
use crate::error::{AppError, AppResult, HttpError};

/// Builds the client shared by every executor of a run.
///
/// # Errors
///
/// Returns an error when the TLS backend or connection pool cannot be set up.
pub(crate) fn build_client(config: &RunConfig) -> AppResult<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .pool_max_idle_per_host(config.concurrency.get())
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

fn build_headers(headers: &BTreeMap<String, String>) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderName {
                name: name.clone(),
                source: err,
            })
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderValue {
                name: name.clone(),
                source: err,
            })
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// A GET request built and validated once, cloned for every iteration.
#[derive(Debug)]
pub(crate) struct RequestTemplate {
    request: Request,
}

impl RequestTemplate {
    /// # Errors
    ///
    /// Returns an error when a header is not a valid HTTP header or the
    /// request cannot be built for the configured URL.
    pub(crate) fn new(client: &Client, config: &RunConfig) -> AppResult<Self> {
        let headers = build_headers(&config.headers)?;
        let request = client
            .get(config.target_url.clone())
            .headers(headers)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildRequestFailed { source: err }))?;
        if request.try_clone().is_none() {
            return Err(AppError::http(HttpError::TemplateNotCloneable {
                url: config.target_url.to_string(),
            }));
        }
        Ok(Self { request })
    }

    pub(crate) fn instantiate(&self) -> Option<Request> {
        self.request.try_clone()
    }

    pub(crate) const fn request(&self) -> &Request {
        &self.request
    }
}
