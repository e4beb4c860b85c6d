use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, StatusCode,
};

use crate::domain::scrape_url::ScrapeUrl;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("timed out fetching {0}")]
    Timeout(String),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn from_reqwest(url: &ScrapeUrl, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout(url.as_str().to_string());
        }
        match e.status() {
            Some(status) => FetchError::Status {
                url: url.as_str().to_string(),
                status,
            },
            None => FetchError::Request {
                url: url.as_str().to_string(),
                source: e,
            },
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &ScrapeUrl) -> Result<String, FetchError>;
}

/// Plain GET with a browser user agent; anything but a 2xx is an error.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = Client::builder()
            .user_agent(fake_user_agent::get_rua())
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &ScrapeUrl) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        log::info!("Fetched {} characters from {}", html.len(), url.as_str());

        Ok(html)
    }
}
