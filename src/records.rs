use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::*;

use crate::Error;

/// Canonical form of a sentiment label, surrounding whitespace is kept
pub fn normalize_sentiment(label: &str) -> String {
    label.to_lowercase()
}

/// One analysed comment, with every column the pipeline produced
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    fields: Vec<String>,
    comment: Option<String>,
    sentiment: String,
}

impl ResultRecord {
    /// Empty comment cells count as missing
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn sentiment(&self) -> &str {
        &self.sentiment
    }

    /// Raw fields in header order, sentiment already normalized
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    headers: Vec<String>,
    sentiment_idx: usize,
    records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn load(path: &Path, comment_column: &str, sentiment_column: &str) -> Result<Self, Error> {
        debug!("Results: Reading {}", path.display());
        let file = File::open(path).map_err(|source| Error::ArtifactUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, comment_column, sentiment_column)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        comment_column: &str,
        sentiment_column: &str,
    ) -> Result<Self, Error> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let column = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        let comment_idx = column(comment_column)?;
        let sentiment_idx = column(sentiment_column)?;

        let mut records = vec![];
        for result in reader.records() {
            let mut fields: Vec<String> = result?.iter().map(String::from).collect();

            // A blank label is kept as its own category
            let sentiment = normalize_sentiment(&fields[sentiment_idx]);
            fields[sentiment_idx] = sentiment.clone();

            let comment = Some(fields[comment_idx].clone()).filter(|comment| !comment.is_empty());

            records.push(ResultRecord {
                fields,
                comment,
                sentiment,
            });
        }
        debug!("Results: {} rows", records.len());

        Ok(Self {
            headers,
            sentiment_idx,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn sentiment_header(&self) -> &str {
        &self.headers[self.sentiment_idx]
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
