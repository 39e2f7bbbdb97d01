use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::source::Source;
use crate::{
    Error, Result, DEFAULT_BATCH_SIZE, DEFAULT_CONFIG_FILE, DEFAULT_DELAY_MS,
    DEFAULT_TIMEOUT_SECS, USER_AGENT,
};

/// Everything the binary reads from the config file and `REELSCRAP__*`
/// environment variables. Every key has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub http: HttpSettings,
    /// Configured sources are added to, or replace, the built-in ones.
    pub sources: BTreeMap<String, SourceSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Pause between two consecutive items.
    pub delay_ms: u64,
    /// Items processed between two saves of the store.
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Infobox,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub base_url: String,
    pub kind: RuleKind,
    pub selector: String,
    /// Field name for `text` rules.
    #[serde(default)]
    pub field: Option<String>,
    /// Regex a `text` value has to match.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Fields that must be present before an item is complete.
    #[serde(default)]
    pub anchor_fields: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pipeline: PipelineSettings::default(),
            http: HttpSettings::default(),
            sources: builtin_sources(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Reads `path` (or `reelscrap.toml` when present), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let mut settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("REELSCRAP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        for (name, source) in builtin_sources() {
            settings.sources.entry(name).or_insert(source);
        }
        Ok(settings)
    }

    pub fn source(&self, name: &str) -> Result<Source> {
        let settings = self
            .sources
            .get(name)
            .ok_or_else(|| Error::UnknownSource(name.to_string()))?;
        Source::from_settings(name, settings)
    }
}

/// Wikipedia infobox, IMDB rating and IMSDb script body.
pub fn builtin_sources() -> BTreeMap<String, SourceSettings> {
    BTreeMap::from([
        (
            "wikipedia".to_string(),
            SourceSettings {
                base_url: "https://en.wikipedia.org".into(),
                kind: RuleKind::Infobox,
                selector: "table.infobox".into(),
                field: None,
                pattern: None,
                anchor_fields: vec!["Release date".into()],
            },
        ),
        (
            "imdb".to_string(),
            SourceSettings {
                base_url: "https://www.imdb.com".into(),
                kind: RuleKind::Text,
                selector:
                    r#"div[data-testid="hero-rating-bar__aggregate-rating__score"] > span:first-child"#
                        .into(),
                field: Some("Rating".into()),
                pattern: Some(r"^\d+(\.\d+)?$".into()),
                anchor_fields: vec!["Rating".into()],
            },
        ),
        (
            "imsdb".to_string(),
            SourceSettings {
                base_url: "https://imsdb.com".into(),
                kind: RuleKind::Text,
                selector: "td.scrtext > pre".into(),
                field: Some("Script".into()),
                pattern: None,
                anchor_fields: vec!["Script".into()],
            },
        ),
    ])
}
