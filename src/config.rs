//! Configuration file support
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! # Example TOML configuration:
//! ```toml
//! [data]
//! path = "data/without_content.tsv"
//! delimiter = "\t"
//! list_format = "literal"     # or "delimited"
//! list_separator = "|"
//!
//! [filter]
//! all_sentinel = "all"
//! all_aliases = ["Alle"]
//!
//! [aggregate]
//! top_n = 20
//! topic_field = "entities"
//! country_pair_threshold = 5
//! people_pair_threshold = 1
//! sentiment_buckets = [-1.0, -0.6, -0.2, 0.2, 0.6, 1.0]
//!
//! [server]
//! bind = "127.0.0.1"
//! port = 3000
//! ```

use crate::aggregate::{Buckets, Granularity, ListField};
use crate::error::{BucketError, ConfigError};
use crate::list_codec::ListFormat;
use crate::store::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub filter: FilterConfig,
    pub aggregate: AggregateConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.data.validate()?;
        config.aggregate.validate()?;
        Ok(config)
    }
}

// ============================================================================
// DATA
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormatKind {
    #[default]
    Literal,
    Delimited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Dataset file
    pub path: Option<PathBuf>,

    /// Field delimiter (single ASCII character)
    pub delimiter: char,

    /// Encoding of list-valued columns
    pub list_format: ListFormatKind,

    /// Separator for the delimited list format
    pub list_separator: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: '\t',
            list_format: ListFormatKind::Literal,
            list_separator: '|',
        }
    }
}

impl DataConfig {
    pub fn list_format(&self) -> ListFormat {
        match self.list_format {
            ListFormatKind::Literal => ListFormat::Literal,
            ListFormatKind::Delimited => ListFormat::Delimited {
                separator: self.list_separator,
            },
        }
    }

    /// Reader options. `AppConfig::from_toml` has already rejected non-ASCII delimiters.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: if self.delimiter.is_ascii() {
                self.delimiter as u8
            } else {
                b'\t'
            },
            list_format: self.list_format(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::Delimiter {
                value: self.delimiter,
            });
        }
        Ok(())
    }
}

// ============================================================================
// FILTER
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Selection entry meaning "no restriction" (matched case-insensitively)
    pub all_sentinel: String,

    /// Further spellings accepted for `all_sentinel`
    pub all_aliases: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            all_sentinel: "all".to_string(),
            all_aliases: vec!["Alle".to_string()],
        }
    }
}

impl FilterConfig {
    /// The sentinel followed by its aliases
    pub fn sentinels(&self) -> Vec<String> {
        std::iter::once(self.all_sentinel.clone())
            .chain(self.all_aliases.iter().cloned())
            .collect()
    }
}

// ============================================================================
// AGGREGATE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Tokens kept by the topic panel
    pub top_n: usize,

    /// List field the topic panel counts
    pub topic_field: ListField,

    /// Step of the multi-day trend panels
    pub granularity: Granularity,

    pub country_pair_threshold: usize,
    pub people_pair_threshold: usize,

    pub sentiment_buckets: Vec<f64>,
    pub subjectivity_buckets: Vec<f64>,

    /// Rows in the article table panel
    pub article_limit: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            topic_field: ListField::Entities,
            granularity: Granularity::Day,
            country_pair_threshold: 5,
            people_pair_threshold: 1,
            sentiment_buckets: steps(-1.0, 1.0, 10),
            subjectivity_buckets: steps(0.0, 1.0, 10),
            article_limit: 100,
        }
    }
}

fn steps(min: f64, max: f64, count: usize) -> Vec<f64> {
    Buckets::uniform(min, max, count)
        .map(|b| b.boundaries().to_vec())
        .unwrap_or_else(|_| vec![min, max])
}

impl AggregateConfig {
    pub fn sentiment_buckets(&self) -> Result<Buckets, BucketError> {
        Buckets::new(self.sentiment_buckets.clone())
    }

    pub fn subjectivity_buckets(&self) -> Result<Buckets, BucketError> {
        Buckets::new(self.subjectivity_buckets.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.sentiment_buckets()
            .map_err(|source| ConfigError::Buckets {
                field: "sentiment_buckets".to_string(),
                source,
            })?;
        self.subjectivity_buckets()
            .map_err(|source| ConfigError::Buckets {
                field: "subjectivity_buckets".to_string(),
                source,
            })?;
        Ok(())
    }
}

// ============================================================================
// SERVER
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.aggregate.top_n, 20);
        assert_eq!(config.aggregate.country_pair_threshold, 5);
        assert_eq!(config.aggregate.people_pair_threshold, 1);
        assert_eq!(config.aggregate.sentiment_buckets().unwrap().len(), 10);
        assert_eq!(config.data.load_options().delimiter, b'\t');
        assert_eq!(config.filter.all_sentinel, "all");
        assert_eq!(config.server.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [data]
            list_format = "delimited"
            list_separator = ";"

            [aggregate]
            top_n = 5
            topic_field = "people"
            granularity = "week"
            "#,
        )
        .unwrap();

        assert_eq!(config.aggregate.top_n, 5);
        assert_eq!(config.aggregate.topic_field, ListField::People);
        assert_eq!(config.aggregate.granularity, Granularity::Week);
        assert_eq!(
            config.data.list_format(),
            ListFormat::Delimited { separator: ';' }
        );
        assert_eq!(config.aggregate.people_pair_threshold, 1);
    }

    #[test]
    fn test_invalid_buckets_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [aggregate]
            sentiment_buckets = [0.5, 0.1]
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Buckets { .. }));
    }

    #[test]
    fn test_default_buckets_split_on_literals() {
        let config = AggregateConfig::default();
        let sentiment = config.sentiment_buckets().unwrap();
        let subjectivity = config.subjectivity_buckets().unwrap();

        assert_eq!(subjectivity.locate(0.3), (3, false));
        assert_eq!(subjectivity.locate(0.7), (7, false));
        assert_eq!(sentiment.locate(-0.4), (3, false));
        assert_eq!(sentiment.locate(1.0), (9, false));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [data]
            delimiter = "§"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Delimiter { value: '§' }));

        let config = AppConfig::from_toml("[data]\ndelimiter = \";\"").unwrap();
        assert_eq!(config.data.load_options().delimiter, b';');
    }

    #[test]
    fn test_sentinel_aliases() {
        assert_eq!(FilterConfig::default().sentinels(), vec!["all", "Alle"]);

        let config = AppConfig::from_toml(
            r#"
            [filter]
            all_sentinel = "*"
            all_aliases = []
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.sentinels(), vec!["*"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8080").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);

        let missing = AppConfig::from_file(Path::new("/nonexistent/media.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
