use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use mystic_core::{ArtworkLoadFailure, ArtworkProbe, ImageTier};

use crate::error::RemoteResult;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Checks artwork locators with a plain GET.
#[derive(Debug, Clone)]
pub struct HttpArtworkProbe {
    client: Client,
}

impl HttpArtworkProbe {
    /// Probe with a ten second per-request timeout.
    pub fn new() -> RemoteResult<Self> {
        Self::with_timeout(DEFAULT_PROBE_TIMEOUT)
    }

    /// Probe with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> RemoteResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ArtworkProbe for HttpArtworkProbe {
    async fn load(&self, source: &str, tier: ImageTier) -> Result<(), ArtworkLoadFailure> {
        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|err| ArtworkLoadFailure::new(tier, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkLoadFailure::new(tier, format!("HTTP {status}")));
        }

        // Drain the body so a truncated download also counts as a failure.
        response
            .bytes()
            .await
            .map_err(|err| ArtworkLoadFailure::new(tier, err.to_string()))?;
        tracing::debug!(source, %tier, "artwork loaded");
        Ok(())
    }
}
