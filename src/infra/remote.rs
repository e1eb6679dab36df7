// src/infra/remote.rs — Optional remote key-value configuration
//
// The service returns a flat JSON object. Only three keys are read:
// `outfit_prompt_text`, `initial_snaps_count` and `oaikey`. Anything else is
// ignored. A failed fetch never blocks startup: local values stay in effect.

use serde::Deserialize;
use std::time::Duration;

use crate::infra::config::RemoteConfig;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RemoteValues {
    #[serde(default)]
    pub outfit_prompt_text: Option<String>,
    #[serde(default)]
    pub initial_snaps_count: Option<u32>,
    #[serde(default)]
    pub oaikey: Option<String>,
}

/// Fetch and decode remote values. Errors are logged and mapped to `None`.
pub async fn fetch_remote_values(remote: &RemoteConfig) -> Option<RemoteValues> {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(remote.timeout_seconds))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Remote config client unavailable: {}", e);
            return None;
        }
    };

    let response = match client.get(&remote.url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Error fetching remote config: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::warn!("Remote config returned HTTP {}", response.status());
        return None;
    }

    match response.json::<RemoteValues>().await {
        Ok(values) => {
            tracing::debug!(
                prompt = values.outfit_prompt_text.is_some(),
                initial_snaps = ?values.initial_snaps_count,
                "Remote config fetched"
            );
            Some(values)
        }
        Err(e) => {
            tracing::warn!("Remote config is not valid JSON: {}", e);
            None
        }
    }
}
