use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::settings::HttpSettings;
use crate::{FetchError, Result};

/// Turns a resolved url into a raw document, or a classified failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> core::result::Result<String, FetchError>;
}

/// The real fetcher: one shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> core::result::Result<String, FetchError> {
        request_page_html(&self.client, url).await
    }
}

/// Requests a page and returns its HTML.
async fn request_page_html(client: &Client, url: &Url) -> core::result::Result<String, FetchError> {
    let res = client
        .get(url.clone())
        .send()
        .await
        .map_err(|err| classify_transport(url, err))?;

    let status = res.status();
    if let Some(err) = classify_status(url, status) {
        return Err(err);
    }
    res.text()
        .await
        .map_err(|err| FetchError::Transient(format!("{url}: couldn't read body: {err}")))
}

fn classify_status(url: &Url, status: StatusCode) -> Option<FetchError> {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            Some(FetchError::NotFound(format!("{url} ({status})")))
        }
        s if s.is_success() => None,
        s => Some(FetchError::Transient(format!("{url} ({s})"))),
    }
}

/// Connection and DNS failures mean the page can't be reached at all;
/// timeouts and the rest are worth another try.
fn classify_transport(url: &Url, err: reqwest::Error) -> FetchError {
    if err.is_connect() && !err.is_timeout() {
        FetchError::NotFound(format!("{url}: {err}"))
    } else {
        FetchError::Transient(format!("{url}: {err}"))
    }
}
