use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::ETAG;
use reqwest::StatusCode;
use std::thread;
use std::time::Duration;

/// Body of an ICS feed together with the server's entity tag, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedIcs {
    pub content: String,
    pub etag: Option<String>,
}

pub struct IcsFetcher {
    client: Client,
    max_response_bytes: usize,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl IcsFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build ICS fetch HTTP client")?;

        Ok(Self {
            client,
            max_response_bytes: 5 * 1024 * 1024,
            max_retries: 2,
            retry_delay_ms: 400,
        })
    }

    pub fn fetch_ics(&self, url: &str) -> Result<FetchedIcs> {
        Self::check_url(url)?;
        let redacted = redact_url(url);
        self.with_retries(&redacted, || self.fetch_once(url))
    }

    /// Entity tag from a HEAD request; `None` when the server sends none.
    pub fn fetch_etag(&self, url: &str) -> Result<Option<String>> {
        Self::check_url(url)?;
        let redacted = redact_url(url);
        self.with_retries(&redacted, || {
            let response = self
                .client
                .head(url)
                .send()
                .context("Network error during ICS HEAD request")?;
            if response.status() != StatusCode::OK {
                return Err(anyhow!("ICS HEAD failed with HTTP status {}", response.status()));
            }
            Ok(header_etag(&response))
        })
    }

    fn check_url(url: &str) -> Result<()> {
        if !url.starts_with("https://") {
            return Err(anyhow!("ICS URL must use HTTPS"));
        }
        Ok(())
    }

    fn with_retries<T>(&self, redacted: &str, mut attempt_fn: impl FnMut() -> Result<T>) -> Result<T> {
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..=self.max_retries {
            match attempt_fn() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let is_last_attempt = attempt == self.max_retries;
                    if is_last_attempt {
                        last_error = Some(err.context(format!(
                            "Failed to fetch ICS from {} after {} attempts",
                            redacted,
                            attempt + 1
                        )));
                    } else {
                        log::warn!(
                            "ICS fetch attempt {} failed for {}: {}",
                            attempt + 1,
                            redacted,
                            err
                        );
                        thread::sleep(Duration::from_millis(self.retry_delay_ms));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown ICS fetch error")))
    }

    fn fetch_once(&self, url: &str) -> Result<FetchedIcs> {
        let response = self
            .client
            .get(url)
            .send()
            .context("Network error during ICS fetch")?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(anyhow!("ICS fetch failed with HTTP status {}", status));
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_bytes {
                return Err(anyhow!(
                    "ICS response too large ({} bytes > {} bytes)",
                    content_length,
                    self.max_response_bytes
                ));
            }
        }

        let etag = header_etag(&response);
        let bytes = response
            .bytes()
            .context("Failed to read ICS response body")?;

        if bytes.len() > self.max_response_bytes {
            return Err(anyhow!(
                "ICS response too large ({} bytes > {} bytes)",
                bytes.len(),
                self.max_response_bytes
            ));
        }

        let content = String::from_utf8(bytes.to_vec()).context("ICS response is not valid UTF-8")?;
        check_ics_content(&content)?;

        Ok(FetchedIcs { content, etag })
    }
}

fn header_etag(response: &reqwest::blocking::Response) -> Option<String> {
    response
        .headers()
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

pub(super) fn check_ics_content(content: &str) -> Result<()> {
    if !(content.contains("BEGIN:VCALENDAR") || content.contains("BEGIN:VEVENT")) {
        return Err(anyhow!("Response does not appear to be valid ICS content"));
    }
    Ok(())
}

/// Hide the secret part of a calendar feed URL before it reaches the logs
pub fn redact_url(url: &str) -> String {
    if let Some(index) = url.find("/calendar/ical/") {
        let prefix_end = index + "/calendar/ical/".len();
        let prefix = &url[..prefix_end];
        return format!("{}***redacted***", prefix);
    }

    "***redacted-url***".to_string()
}
