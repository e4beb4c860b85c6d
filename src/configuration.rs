use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::services::{ReductionLimits, RetryPolicy, ScoringRules};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub openai: OpenaiSettings,
    pub scraper: ScraperSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub debug: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OpenaiSettings {
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ScraperSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_chars: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_fragments: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub fetch_timeout_secs: u64,
    pub keywords: Option<Vec<String>>,
}

impl ScraperSettings {
    pub fn limits(&self) -> ReductionLimits {
        ReductionLimits {
            max_chars: self.max_chars,
            max_fragments: self.max_fragments,
            ..ReductionLimits::default()
        }
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        match &self.keywords {
            Some(keywords) if !keywords.is_empty() => ScoringRules {
                keywords: keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
                ..ScoringRules::default()
            },
            _ => ScoringRules::default(),
        }
    }
}

impl OpenaiSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }
}

/// Reads settings from `APP_`-prefixed environment variables, e.g.
/// `APP_APPLICATION__PORT=8080` or `APP_SCRAPER__KEYWORDS=coupon,promo`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 3001)?
        .set_default("application.debug", false)?
        .set_default("application.request_timeout_secs", 60)?
        .set_default("openai.model", "gpt-4o-mini")?
        .set_default("openai.max_retries", 3)?
        .set_default("scraper.max_chars", 4000)?
        .set_default("scraper.max_fragments", 50)?
        .set_default("scraper.fetch_timeout_secs", 15)?
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scraper.keywords"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
