mod common;

use common::{imdb, infobox_page, wikipedia, StubFetcher, WIKI};
use pretty_assertions::assert_eq;
use reelscrap::item::FieldValue;
use reelscrap::parse::fetch_and_extract;
use reelscrap::FetchError;

#[tokio::test]
async fn page_with_element_yields_fields() {
    let url = format!("{WIKI}/wiki/Airborne_(1993_film)");
    let fetcher = StubFetcher::new().page(
        &url,
        &infobox_page(&[("Release date", "1993"), ("Budget", "$1,000,000")]),
    );

    let fields = fetch_and_extract(&fetcher, &wikipedia(), "/wiki/Airborne_(1993_film)")
        .await
        .unwrap();
    assert_eq!(fields.get("Release date"), Some(&FieldValue::Present("1993".into())));
    assert_eq!(fields.get("Budget"), Some(&FieldValue::Present("$1,000,000".into())));
    assert_eq!(fetcher.calls(), vec![url]);
}

#[tokio::test]
async fn page_without_element_is_no_data() {
    let url = format!("{WIKI}/wiki/Airborne");
    let fetcher = StubFetcher::new().page(&url, "<html><body><p>may refer to:</p></body></html>");

    let err = fetch_and_extract(&fetcher, &wikipedia(), "/wiki/Airborne")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NoData(_)), "{err:?}");
}

#[tokio::test]
async fn missing_page_is_not_found() {
    let fetcher = StubFetcher::new();
    let err = fetch_and_extract(&fetcher, &wikipedia(), "/wiki/Nope")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn malformed_value_is_recorded_as_missing() {
    let url = "https://www.imdb.com/title/tt0106233/";
    let fetcher = StubFetcher::new().page(url, r#"<span class="rating">-</span>"#);

    let fields = fetch_and_extract(&fetcher, &imdb(), "/title/tt0106233/")
        .await
        .unwrap();
    assert_eq!(fields.get("Rating"), Some(&FieldValue::Missing));
}

#[tokio::test]
async fn transient_failures_pass_through() {
    let url = format!("{WIKI}/wiki/Hackers");
    let fetcher =
        StubFetcher::new().failing(&url, FetchError::Transient("503 Service Unavailable".into()));

    let err = fetch_and_extract(&fetcher, &wikipedia(), "/wiki/Hackers")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transient(_)));
}

#[tokio::test]
async fn spaces_are_encoded_and_bad_locators_never_dispatch() {
    let fetcher = StubFetcher::new();
    let _ = fetch_and_extract(&fetcher, &wikipedia(), "/wiki/Blade Runner").await;
    assert_eq!(fetcher.calls(), vec![format!("{WIKI}/wiki/Blade%20Runner")]);

    let fetcher = StubFetcher::new();
    let err = fetch_and_extract(&fetcher, &wikipedia(), "  ").await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
    assert!(fetcher.calls().is_empty());
}
