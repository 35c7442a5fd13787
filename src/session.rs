use indexmap::IndexMap;
use plotters::style::RGBColor;
use uuid::Uuid;

use std::fmt;

use log::*;

use crate::config::Config;
use crate::records::{normalize_sentiment, ResultRecord, ResultTable};
use crate::summary::SummaryDocument;
use crate::wordcloud::Coloring;
use crate::Error;

const SENTIMENT_COLORS: [(&str, RGBColor); 3] = [
    ("positive", RGBColor(0, 128, 0)),
    ("negative", RGBColor(255, 0, 0)),
    ("neutral", RGBColor(128, 128, 128)),
];
const FALLBACK_COLOR: RGBColor = RGBColor(0, 0, 255);

/// Flat word cloud colour for a sentiment
pub fn sentiment_color(sentiment: &str) -> RGBColor {
    SENTIMENT_COLORS
        .iter()
        .find(|(label, _)| *label == sentiment)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Which comments feed a word cloud
#[derive(Debug, Clone, PartialEq)]
pub enum CloudScope {
    All,
    Sentiment(String),
}

impl CloudScope {
    pub fn parse(selection: &str) -> Self {
        if selection.trim().eq_ignore_ascii_case("all") {
            CloudScope::All
        } else {
            CloudScope::Sentiment(normalize_sentiment(selection))
        }
    }

    pub fn coloring(&self) -> Coloring {
        match self {
            CloudScope::All => Coloring::Palette,
            CloudScope::Sentiment(sentiment) => Coloring::Flat(sentiment_color(sentiment)),
        }
    }

    pub fn file_name(&self) -> String {
        let tag: String = self
            .to_string()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("wordcloud_{}.svg", tag)
    }
}

impl fmt::Display for CloudScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudScope::All => write!(f, "All"),
            CloudScope::Sentiment(sentiment) => write!(f, "{}", sentiment),
        }
    }
}

/// Everything one dashboard session reads, loaded once and never changed
pub struct Session {
    id: Uuid,
    table: ResultTable,
    summaries: SummaryDocument,
}

impl Session {
    pub fn new(table: ResultTable, summaries: SummaryDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            table,
            summaries,
        }
    }

    pub fn open(config: &Config) -> Result<Self, Error> {
        let table = ResultTable::load(
            &config.results_path,
            &config.comment_column,
            &config.sentiment_column,
        )?;
        let summaries = SummaryDocument::load(&config.summary_path)?;
        let session = Self::new(table, summaries);
        info!(
            "Session {}: {} results, {} sentiment summaries",
            session.id,
            session.table.len(),
            session.summaries.emotion_summaries.len()
        );
        Ok(session)
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn summaries(&self) -> &SummaryDocument {
        &self.summaries
    }

    /// Distinct labels in the order they first appear
    pub fn sentiments(&self) -> Vec<&str> {
        self.counts().into_iter().map(|(label, _)| label).collect()
    }

    fn counts(&self) -> IndexMap<&str, usize> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for record in self.table.records() {
            *counts.entry(record.sentiment()).or_insert(0) += 1;
        }
        counts
    }

    /// Records per label, by first appearance
    pub fn chart_counts(&self) -> Vec<(&str, usize)> {
        self.counts().into_iter().collect()
    }

    /// Records per label, largest first; ties keep first appearance
    pub fn distribution(&self) -> Vec<(&str, usize)> {
        let mut counts = self.chart_counts();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn filter(&self, sentiment: &str) -> Vec<&ResultRecord> {
        self.table
            .records()
            .iter()
            .filter(|record| record.sentiment() == sentiment)
            .collect()
    }

    pub fn summary_for(&self, sentiment: &str) -> Result<&str, Error> {
        self.summaries.summary_for(sentiment)
    }

    pub fn cloud_scopes(&self) -> Vec<CloudScope> {
        std::iter::once(CloudScope::All)
            .chain(
                self.sentiments()
                    .into_iter()
                    .map(|label| CloudScope::Sentiment(label.to_string())),
            )
            .collect()
    }

    /// Comments in scope joined by single spaces, missing comments skipped
    pub fn cloud_text(&self, scope: &CloudScope) -> String {
        self.table
            .records()
            .iter()
            .filter(|record| match scope {
                CloudScope::All => true,
                CloudScope::Sentiment(sentiment) => record.sentiment() == sentiment,
            })
            .filter_map(ResultRecord::comment)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
