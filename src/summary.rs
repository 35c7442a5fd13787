use indexmap::IndexMap;
use serde::Deserialize;

use std::path::Path;

use log::*;

use crate::Error;

/// Pipeline-written summaries, one overall and one per sentiment
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SummaryDocument {
    pub overall_summary: String,
    pub emotion_summaries: IndexMap<String, String>,
}

impl SummaryDocument {
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Summaries: Reading {}", path.display());
        let summary_str =
            std::fs::read_to_string(path).map_err(|source| Error::ArtifactUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&summary_str)
    }

    pub fn from_json(summary_str: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(summary_str)?)
    }

    /// Sentiments with a summary, in document order
    pub fn sentiments(&self) -> impl Iterator<Item = &str> {
        self.emotion_summaries.keys().map(String::as_str)
    }

    pub fn summary_for(&self, sentiment: &str) -> Result<&str, Error> {
        self.emotion_summaries
            .get(sentiment)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownSummary(sentiment.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    pub(crate) const SCENARIO_JSON: &str = r#"{
        "overall_summary": "Mostly mixed feelings.",
        "emotion_summaries": {
            "positive": "Users are happy",
            "neutral": "Nothing stands out",
            "negative": "Some complaints about speed"
        }
    }"#;

    #[test]
    fn test_keeps_document_order() -> Result<()> {
        let doc = SummaryDocument::from_json(SCENARIO_JSON)?;
        assert_eq!(doc.overall_summary, "Mostly mixed feelings.");
        assert_eq!(
            doc.sentiments().collect::<Vec<_>>(),
            vec!["positive", "neutral", "negative"]
        );
        Ok(())
    }

    #[test]
    fn test_summary_lookup() -> Result<()> {
        let doc = SummaryDocument::from_json(SCENARIO_JSON)?;
        assert_eq!(doc.summary_for("neutral")?, "Nothing stands out");
        Ok(())
    }

    #[test]
    fn test_unknown_sentiment() -> Result<()> {
        let doc = SummaryDocument::from_json(
            r#"{"overall_summary": "", "emotion_summaries": {"positive": "Users are happy"}}"#,
        )?;
        assert!(matches!(
            doc.summary_for("negative"),
            Err(Error::UnknownSummary(ref s)) if s == "negative"
        ));
        Ok(())
    }

    #[test]
    fn test_missing_fields() {
        let result = SummaryDocument::from_json(r#"{"overall_summary": "ok"}"#);
        assert!(matches!(result, Err(Error::JsonError(_))));

        let result = SummaryDocument::from_json(r#"{"emotion_summaries": {}}"#);
        assert!(matches!(result, Err(Error::JsonError(_))));
    }

    #[test]
    fn test_malformed_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("summaries.json");
        std::fs::write(&path, "{ not json")?;

        assert!(matches!(SummaryDocument::load(&path), Err(Error::JsonError(_))));
        assert!(matches!(
            SummaryDocument::load(&dir.path().join("absent.json")),
            Err(Error::ArtifactUnreadable { .. })
        ));
        Ok(())
    }
}
