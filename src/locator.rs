use url::Url;

/// Resolves an item locator against a source's base url.
///
/// Absolute locators are used as given. Spaces are percent-encoded before
/// parsing so titles copied from a table still resolve.
pub fn resolve(base: &Url, locator: &str) -> Result<Url, url::ParseError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(url::ParseError::EmptyHost);
    }
    let encoded = locator.replace(' ', "%20");
    let url = base.join(&encoded)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(url::ParseError::RelativeUrlWithoutBase),
    }
}
