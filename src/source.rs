use std::sync::Arc;

use url::Url;

use crate::merge::CompletionPolicy;
use crate::rule::ExtractionRule;
use crate::settings::{RuleKind, SourceSettings};
use crate::{Error, Result};

/// A target site: where relative locators point, how its pages are read and
/// when an item counts as done.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    base_url: Url,
    rule: Arc<ExtractionRule>,
    policy: CompletionPolicy,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        base_url: Url,
        rule: ExtractionRule,
        policy: CompletionPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            base_url,
            rule: Arc::new(rule),
            policy,
        }
    }

    pub fn from_settings(name: &str, settings: &SourceSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|err| Error::InvalidBaseUrl {
            name: name.to_string(),
            err,
        })?;
        let rule = match settings.kind {
            RuleKind::Infobox => ExtractionRule::infobox(&settings.selector)?,
            RuleKind::Text => {
                let field = settings.field.as_deref().ok_or_else(|| Error::IncompleteSource {
                    name: name.to_string(),
                    key: "field",
                })?;
                ExtractionRule::text(&settings.selector, field, settings.pattern.as_deref())?
            }
        };
        let policy = CompletionPolicy::new(settings.anchor_fields.iter().cloned());
        Ok(Self::new(name, base_url, rule, policy))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn rule(&self) -> &Arc<ExtractionRule> {
        &self.rule
    }

    pub fn policy(&self) -> &CompletionPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_settings() -> SourceSettings {
        SourceSettings {
            base_url: "https://imsdb.com".into(),
            kind: RuleKind::Text,
            selector: "td.scrtext > pre".into(),
            field: None,
            pattern: None,
            anchor_fields: vec![],
        }
    }

    #[test]
    fn text_source_needs_a_field() {
        let err = Source::from_settings("imsdb", &text_settings()).unwrap_err();
        assert!(matches!(err, Error::IncompleteSource { key: "field", .. }));

        let mut settings = text_settings();
        settings.field = Some("Script".into());
        let source = Source::from_settings("imsdb", &settings).unwrap();
        assert_eq!(source.rule().selector(), "td.scrtext > pre");
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let mut settings = text_settings();
        settings.field = Some("Script".into());
        settings.base_url = "imsdb dot com".into();
        assert!(matches!(
            Source::from_settings("imsdb", &settings),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }
}
