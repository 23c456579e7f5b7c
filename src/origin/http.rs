use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::Origin;
use super::types::ProbeInfo;
use crate::utils::{CacheError, Result};

/// Origin backed by an HTTP(S) archive
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: reqwest::Client,
}

impl HttpOrigin {
    /// Build a client; a request exceeding `timeout` counts as a failure
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CacheError::ConfigError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn probe(&self, uri: &str) -> Result<ProbeInfo> {
        let unavailable = |reason: String| CacheError::OriginUnavailable {
            uri: uri.to_string(),
            reason,
        };

        let resp = self
            .client
            .head(uri)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!("HTTP {}", resp.status())));
        }

        let info = ProbeInfo::from_headers(resp.headers());
        debug!("probed {}: modified {:?}, length {:?}", uri, info.modified, info.length);
        Ok(info)
    }

    async fn retrieve(&self, uri: &str) -> Option<Bytes> {
        let resp = match self.client.get(uri).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("retrieve {} failed: {}", uri, e);
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!("retrieve {} returned HTTP {}", uri, resp.status());
            return None;
        }

        match resp.bytes().await {
            Ok(body) if body.is_empty() => {
                debug!("retrieve {} returned an empty body", uri);
                None
            }
            Ok(body) => Some(body),
            Err(e) => {
                warn!("reading body of {} failed: {}", uri, e);
                None
            }
        }
    }
}
