//! Shared reqwest client construction and JSON request helpers.

use std::time::{Duration, Instant};

use koi_core::config::BackendConfig;
use koi_core::errors::{ConfigError, KoiResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::status;

/// Configuration for one backend's HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout. The resilience shell enforces its own
    /// deadline on top of this.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("koi/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn for_dependency(backends: &BackendConfig, dependency: &str) -> Self {
        let timeout = backends.timeout_for(dependency);
        Self {
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(5)),
            ..Self::default()
        }
    }
}

pub fn build_client(config: &HttpClientConfig) -> KoiResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .build()
        .map_err(|e| {
            ConfigError::ValidationFailed {
                field: "backends".to_string(),
                message: format!("cannot build HTTP client: {e}"),
            }
            .into()
        })
}

/// `base` + `/` + `path`, without doubling slashes.
pub(crate) fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) async fn post_json<B, R>(
    client: &Client,
    dependency: &str,
    url: &str,
    body: &B,
) -> KoiResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let started = Instant::now();
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| status::from_request_error(dependency, &e))?;
    read_json(dependency, response, started).await
}

pub(crate) async fn get_json<R: DeserializeOwned>(
    client: &Client,
    dependency: &str,
    url: &str,
) -> KoiResult<R> {
    let started = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| status::from_request_error(dependency, &e))?;
    read_json(dependency, response, started).await
}

async fn read_json<R: DeserializeOwned>(
    dependency: &str,
    response: reqwest::Response,
    started: Instant,
) -> KoiResult<R> {
    let code = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| status::from_request_error(dependency, &e))?;
    tracing::debug!(
        dependency,
        status = code.as_u16(),
        bytes = body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "backend response"
    );
    if let Some(err) = status::from_status(dependency, code, &body) {
        return Err(err.into());
    }
    serde_json::from_str(&body).map_err(|e| status::decode_error(dependency, &e).into())
}
