//! Site-specific extraction rules.
//!
//! A rule only ever looks at an already parsed document; fetching and
//! classification of transport failures happen elsewhere.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::item::{FieldSet, FieldValue};
use crate::{Error, Result};

/// Compiled extraction rule for one source's page layout.
#[derive(Debug)]
pub enum ExtractionRule {
    /// Label/value table such as a Wikipedia infobox. Every row with a header
    /// cell and a data cell becomes one field.
    Infobox {
        selector: String,
        container: Selector,
        row: Selector,
        label: Selector,
        data: Selector,
        citation: Regex,
    },
    /// A single block of text (a rating, a script body) kept under `field`.
    Text {
        selector: String,
        container: Selector,
        field: String,
        pattern: Option<Regex>,
    },
}

impl ExtractionRule {
    pub fn infobox(selector: &str) -> Result<Self> {
        Ok(ExtractionRule::Infobox {
            selector: selector.to_string(),
            container: create_selector(selector)?,
            row: create_selector("tr")?,
            label: create_selector("th")?,
            data: create_selector("td")?,
            citation: Regex::new(r"\[(\d{1,3}|[a-z]|note \d+|citation needed)\]")?,
        })
    }

    /// `pattern`, when given, must match the whole trimmed value; anything
    /// else is treated as malformed and recorded as missing.
    pub fn text(selector: &str, field: &str, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern.map(Regex::new).transpose()?;
        Ok(ExtractionRule::Text {
            selector: selector.to_string(),
            container: create_selector(selector)?,
            field: field.to_string(),
            pattern,
        })
    }

    pub fn selector(&self) -> &str {
        match self {
            ExtractionRule::Infobox { selector, .. } | ExtractionRule::Text { selector, .. } => {
                selector
            }
        }
    }

    /// Applies the rule. `None` means the expected element isn't on the page.
    pub fn extract(&self, doc: &Html) -> Option<FieldSet> {
        match self {
            ExtractionRule::Infobox {
                container,
                row,
                label,
                data,
                citation,
                ..
            } => {
                let table = doc.select(container).next()?;
                let mut fields = FieldSet::new();
                for tr in table.select(row) {
                    let (Some(th), Some(td)) = (tr.select(label).next(), tr.select(data).next())
                    else {
                        continue;
                    };
                    let name = clean_text(th, citation);
                    if name.is_empty() || fields.contains_key(&name) {
                        continue;
                    }
                    let value = FieldValue::new(&clean_text(td, citation));
                    if !value.is_present() {
                        warn!(field = %name, "empty infobox value, recording as missing");
                    }
                    fields.insert(name, value);
                }
                Some(fields)
            }
            ExtractionRule::Text {
                container,
                field,
                pattern,
                ..
            } => {
                let node = doc.select(container).next()?;
                let raw = node.text().collect::<String>();
                let value = match (pattern, FieldValue::new(&raw)) {
                    (Some(pattern), FieldValue::Present(text)) if !pattern.is_match(&text) => {
                        warn!(field = %field, value = %text, "malformed value, recording as missing");
                        FieldValue::Missing
                    }
                    (_, value) => value,
                };
                Some(FieldSet::from([(field.clone(), value)]))
            }
        }
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

/// Visible text of a cell with citation markers removed and whitespace
/// collapsed to single spaces. Text nodes are space separated so `<br>` and
/// list items don't run together.
fn clean_text(el: ElementRef<'_>, citation: &Regex) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    let stripped = citation.replace_all(&joined, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
