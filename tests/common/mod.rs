#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reelscrap::merge::CompletionPolicy;
use reelscrap::request::Fetcher;
use reelscrap::rule::ExtractionRule;
use reelscrap::source::Source;
use reelscrap::FetchError;
use tokio::sync::oneshot;
use tokio::time::Instant;
use url::Url;

pub const WIKI: &str = "https://en.wikipedia.org";

/// Serves canned pages by url and records every request.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    calls: Mutex<Vec<(String, Instant)>>,
    stop_on_call: Mutex<Option<(usize, oneshot::Sender<()>)>>,
    hang: bool,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, err: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(err));
        self
    }

    /// Fires `stop` while request number `call` (1-based) is in flight.
    pub fn stop_on_call(self, call: usize, stop: oneshot::Sender<()>) -> Self {
        *self.stop_on_call.lock().unwrap() = Some((call, stop));
        self
    }

    /// Every request stays in flight forever.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((url.to_string(), Instant::now()));
            calls.len()
        };
        {
            let mut stop_on_call = self.stop_on_call.lock().unwrap();
            if stop_on_call.as_ref().is_some_and(|(call, _)| *call == count) {
                if let Some((_, stop)) = stop_on_call.take() {
                    let _ = stop.send(());
                }
            }
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.pages
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(format!("{url} (404)"))))
    }
}

pub fn wikipedia() -> Source {
    Source::new(
        "wikipedia",
        Url::parse(WIKI).unwrap(),
        ExtractionRule::infobox("table.infobox").unwrap(),
        CompletionPolicy::new(["Release date"]),
    )
}

pub fn imdb() -> Source {
    Source::new(
        "imdb",
        Url::parse("https://www.imdb.com").unwrap(),
        ExtractionRule::text("span.rating", "Rating", Some(r"^\d+(\.\d+)?$")).unwrap(),
        CompletionPolicy::new(["Rating"]),
    )
}

pub fn infobox_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(k, v)| format!("<tr><th>{k}</th><td>{v}</td></tr>"))
        .collect();
    format!("<html><body><table class=\"infobox\">{rows}</table></body></html>")
}
