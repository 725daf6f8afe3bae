//! Paste service client
//!
//! Posts the export as a private paste and returns the first line of the
//! response body, which the service sets to the paste URL.

use std::time::Duration;

use crate::config::PublishConfig;
use crate::error::{ModerationError, Result};
use crate::publish::Publisher;

/// Blocking client for a pastebin-style `api_post.php` endpoint
#[derive(Debug)]
pub struct PastebinPublisher {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl PastebinPublisher {
    pub fn new(config: &PublishConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModerationError::publication(format!("client setup: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Form fields for one paste request
    pub fn form<'a>(&'a self, title: &'a str, text: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("api_option", "paste"),
            ("api_paste_name", title),
            ("api_paste_private", "1"),
            ("api_dev_key", self.api_key.as_str()),
            ("api_paste_code", text),
        ]
    }
}

impl Publisher for PastebinPublisher {
    fn publish(&self, title: &str, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&self.form(title, text))
            .send()
            .map_err(|e| ModerationError::publication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModerationError::publication(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|e| ModerationError::publication(e.to_string()))?;
        first_line(&body)
    }
}

/// The reference is the first line; an empty one means the paste failed
fn first_line(body: &str) -> Result<String> {
    match body.lines().next().map(str::trim) {
        Some(line) if !line.is_empty() => Ok(line.to_string()),
        _ => Err(ModerationError::publication("empty response")),
    }
}
