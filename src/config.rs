use serde::Deserialize;
use validator::{Validate, ValidationError};
use validator_derive::Validate;

use std::path::{Path, PathBuf};

use crate::Error;

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    #[serde(default = "default_debug")]
    pub debug: bool,

    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_comment_column")]
    #[validate(length(min = 1))]
    pub comment_column: String,

    #[serde(default = "default_sentiment_column")]
    #[validate(length(min = 1))]
    pub sentiment_column: String,

    #[serde(default)]
    #[validate]
    pub wordcloud: WordCloudConfig,
}

impl Config {
    /// Reads the config at `path`, or the defaults when there is no such file
    pub fn load(path: &Path) -> Result<Self, Error> {
        let config_str = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };
        Ok(toml::from_str(&config_str)?)
    }
}

fn default_debug() -> bool {
    false
}

fn default_results_path() -> PathBuf {
    PathBuf::from("data/sentiment_results.csv")
}

fn default_summary_path() -> PathBuf {
    PathBuf::from("data/summaries.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_comment_column() -> String {
    "comment_text".to_string()
}

fn default_sentiment_column() -> String {
    "predicted_sentiment".to_string()
}

#[derive(Debug, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = "ensure_font_range"))]
pub struct WordCloudConfig {
    #[serde(default = "default_width")]
    #[validate(range(min = 16, max = 8192))]
    pub width: u32,

    #[serde(default = "default_height")]
    #[validate(range(min = 16, max = 8192))]
    pub height: u32,

    #[serde(default = "default_max_words")]
    #[validate(range(min = 1))]
    pub max_words: usize,

    #[serde(default = "default_min_font_size")]
    #[validate(range(min = 1))]
    pub min_font_size: u32,

    /// Defaults to half the canvas height
    #[serde(default)]
    pub max_font_size: Option<u32>,

    /// Fixed layout seed, random per render when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            max_words: default_max_words(),
            min_font_size: default_min_font_size(),
            max_font_size: None,
            seed: None,
        }
    }
}

impl WordCloudConfig {
    pub fn effective_max_font_size(&self) -> u32 {
        self.max_font_size.unwrap_or(self.height / 2)
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    400
}

fn default_max_words() -> usize {
    200
}

fn default_min_font_size() -> u32 {
    4
}

fn ensure_font_range(config: &WordCloudConfig) -> Result<(), ValidationError> {
    if config.min_font_size > config.effective_max_font_size() {
        Err(ValidationError::new("min_font_size exceeds max_font_size"))
    } else {
        Ok(())
    }
}
