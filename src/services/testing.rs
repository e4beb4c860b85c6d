//! In-memory stand-ins for the network seams, used by unit and route tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::domain::scrape_url::ScrapeUrl;

use super::{
    openai_client::{ChatModel, CompletionError},
    orchestrator::Sleeper,
    page_fetcher::{FetchError, PageFetcher},
};

/// Serves the same HTML for every URL and counts calls.
pub struct CountingFetcher {
    html: String,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(html: &str) -> Self {
        CountingFetcher {
            html: html.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for CountingFetcher {
    async fn fetch(&self, _url: &ScrapeUrl) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}

pub struct FailingFetcher;

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch(&self, url: &ScrapeUrl) -> Result<String, FetchError> {
        Err(FetchError::Status {
            url: url.as_str().to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        })
    }
}

/// Never answers, for exercising request timeouts.
pub struct StallingFetcher;

#[async_trait]
impl PageFetcher for StallingFetcher {
    async fn fetch(&self, _url: &ScrapeUrl) -> Result<String, FetchError> {
        std::future::pending().await
    }
}

/// Replays scripted replies in order; the last reply repeats once the script runs out.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicUsize,
    last_text: Mutex<Option<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        ScriptedModel {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn replying(raw: &str) -> Self {
        Self::new(vec![Ok(raw.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

fn replay(reply: &Result<String, CompletionError>) -> Result<String, CompletionError> {
    match reply {
        Ok(raw) => Ok(raw.clone()),
        Err(CompletionError::RateLimited(msg)) => Err(CompletionError::RateLimited(msg.clone())),
        Err(CompletionError::Provider(e)) => {
            Err(CompletionError::Provider(anyhow::anyhow!("{}", e)))
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _instruction: &str, text: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());

        let mut replies = self.replies.lock().unwrap();
        match replies.len() {
            0 => Ok("[]".to_string()),
            1 => replay(&replies[0]),
            _ => replies.pop_front().unwrap_or_else(|| Ok("[]".to_string())),
        }
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
