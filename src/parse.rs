use std::sync::Arc;

use scraper::Html;
use tokio::task::spawn_blocking;
use url::Url;

use crate::locator::resolve;
use crate::merge::Outcome;
use crate::request::Fetcher;
use crate::rule::ExtractionRule;
use crate::source::Source;
use crate::FetchError;

/// Resolves `locator` against the source, fetches the page and applies the
/// source's rule.
///
/// Never touches the worklist; the caller decides what to do with the
/// outcome. A locator that can't be turned into an http(s) url is reported
/// as [`FetchError::NotFound`], since no retry will ever find it.
pub async fn fetch_and_extract<F>(fetcher: &F, source: &Source, locator: &str) -> Outcome
where
    F: Fetcher + ?Sized,
{
    let url = resolve(source.base_url(), locator)
        .map_err(|err| FetchError::NotFound(format!("bad locator '{locator}': {err}")))?;
    let html = fetcher.fetch(&url).await?;
    parse_html(html, Arc::clone(source.rule()), url).await
}

/// Parses the page on the blocking pool and applies `rule`.
async fn parse_html(html: String, rule: Arc<ExtractionRule>, url: Url) -> Outcome {
    spawn_blocking(move || {
        let doc = Html::parse_document(&html);
        rule.extract(&doc)
            .ok_or_else(|| FetchError::NoData(format!("{url} (no match for '{}')", rule.selector())))
    })
    .await
    .map_err(|err| FetchError::Transient(format!("parser task failed: {err}")))?
}
