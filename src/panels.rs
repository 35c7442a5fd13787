use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use std::fmt;
use std::path::{Path, PathBuf};

use log::*;

use crate::chart::save_counts;
use crate::config::{Config, WordCloudConfig};
use crate::records::ResultRecord;
use crate::session::{CloudScope, Session};
use crate::wordcloud::WordCloud;

pub const DASHBOARD_TITLE: &str = "Analysis Dashboard";
pub const NO_COMMENTS: &str = "No comments available for this sentiment.";
pub const NO_OPTIONS: &str = "Nothing to choose from.";
pub const CHART_FILE: &str = "sentiment_distribution.svg";

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    fn from_records<'a>(headers: &[String], records: impl IntoIterator<Item = &'a ResultRecord>) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: records.into_iter().map(|record| record.fields().to_vec()).collect(),
        }
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(self.headers.clone());
        for row in &self.rows {
            table.add_row(row.clone());
        }
        write!(f, "{}", table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table(TableView),
    Info(String),
    Success(String),
    Warning(String),
    Failure(String),
    Image(PathBuf),
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Table(table) => write!(f, "{}", table),
            Block::Info(text) => write!(f, "{}", text.blue()),
            Block::Success(text) => write!(f, "{}", text.green()),
            Block::Warning(text) => write!(f, "{}", text.yellow()),
            Block::Failure(text) => write!(f, "{}", text.red().bold()),
            Block::Image(path) => write!(f, "{} {}", "Image:".dimmed(), path.display()),
        }
    }
}

/// One titled section of the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub selection: Option<String>,
    pub blocks: Vec<Block>,
}

impl Panel {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            selection: None,
            blocks: vec![],
        }
    }

    fn selected(mut self, selection: &str) -> Self {
        self.selection = Some(selection.to_string());
        self
    }

    fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title.bold().underline())?;
        if let Some(selection) = &self.selection {
            write!(f, " {}", format!("[{}]", selection).cyan())?;
        }
        writeln!(f)?;
        for block in &self.blocks {
            writeln!(f, "{}", block)?;
        }
        Ok(())
    }
}

/// Page heading printed once above the panels
pub fn heading() -> String {
    format!(
        "{}\n{}",
        DASHBOARD_TITLE.bold(),
        "=".repeat(DASHBOARD_TITLE.len())
    )
}

pub fn raw_data(session: &Session) -> Panel {
    let table = session.table();
    Panel::new("Raw Data").with(Block::Table(TableView::from_records(
        table.headers(),
        table.records(),
    )))
}

pub fn distribution(session: &Session, output_dir: &Path) -> Panel {
    let header = session.table().sentiment_header().to_string();
    let panel = Panel::new("Sentiment Distribution").with(Block::Table(TableView {
        headers: vec![header.clone(), "count".to_string()],
        rows: session
            .distribution()
            .into_iter()
            .map(|(label, count)| vec![label.to_string(), count.to_string()])
            .collect(),
    }));

    if session.table().is_empty() {
        return panel.with(Block::Warning("No results to chart.".to_string()));
    }
    let counts = session.chart_counts();
    let path = output_dir.join(CHART_FILE);
    match save_counts(&path, &header, &counts) {
        Ok(()) => panel.with(Block::Image(path)),
        Err(e) => {
            error!("Chart: {}", e);
            panel.with(Block::Failure(e.to_string()))
        }
    }
}

pub fn filter_by_sentiment(session: &Session, sentiment: &str) -> Panel {
    let filtered = session.filter(sentiment);
    debug!("Filter: {} rows for {:?}", filtered.len(), sentiment);
    Panel::new("Filter by Sentiment")
        .selected(sentiment)
        .with(Block::Table(TableView::from_records(
            session.table().headers(),
            filtered,
        )))
}

pub fn overall_summary(session: &Session) -> Panel {
    Panel::new("Overall Summary").with(Block::Info(session.summaries().overall_summary.clone()))
}

pub fn sentiment_summary(session: &Session, sentiment: &str) -> Panel {
    let panel = Panel::new("Sentiment-wise Summary").selected(sentiment);
    match session.summary_for(sentiment) {
        Ok(summary) => panel.with(Block::Success(summary.to_string())),
        Err(e) => {
            warn!("Summary: {}", e);
            panel.with(Block::Failure(e.to_string()))
        }
    }
}

pub fn word_cloud(
    session: &Session,
    scope: &CloudScope,
    settings: &WordCloudConfig,
    output_dir: &Path,
) -> Panel {
    let panel = Panel::new("Word Cloud by Sentiment").selected(&scope.to_string());
    let text = session.cloud_text(scope);
    if text.trim().is_empty() {
        return panel.with(Block::Warning(NO_COMMENTS.to_string()));
    }

    let layout = match WordCloud::new(settings)
        .with_coloring(scope.coloring())
        .generate(&text)
    {
        Some(layout) => layout,
        None => return panel.with(Block::Warning(NO_COMMENTS.to_string())),
    };
    let path = output_dir.join(scope.file_name());
    match layout.save(&path) {
        Ok(()) => panel.with(Block::Image(path)),
        Err(e) => {
            error!("Wordcloud: {}", e);
            panel.with(Block::Failure(e.to_string()))
        }
    }
}

/// Every panel with each selector on its first option
pub fn default_page(session: &Session, config: &Config) -> Vec<Panel> {
    let first_sentiment = session.sentiments().first().map(|s| s.to_string());
    let first_summary = session.summaries().sentiments().next().map(String::from);

    vec![
        raw_data(session),
        distribution(session, &config.output_dir),
        match first_sentiment {
            Some(sentiment) => filter_by_sentiment(session, &sentiment),
            None => Panel::new("Filter by Sentiment").with(Block::Warning(NO_OPTIONS.to_string())),
        },
        overall_summary(session),
        match first_summary {
            Some(sentiment) => sentiment_summary(session, &sentiment),
            None => {
                Panel::new("Sentiment-wise Summary").with(Block::Warning(NO_OPTIONS.to_string()))
            }
        },
        word_cloud(
            session,
            &CloudScope::All,
            &config.wordcloud,
            &config.output_dir,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::scenario_session;
    use anyhow::Result;
    use tempfile::tempdir;

    fn test_config(output_dir: &Path) -> Result<Config> {
        let mut config = Config::load(&output_dir.join("absent.toml"))?;
        config.output_dir = output_dir.to_path_buf();
        config.wordcloud.seed = Some(9);
        Ok(config)
    }

    fn table_of(panel: &Panel) -> &TableView {
        match &panel.blocks[0] {
            Block::Table(table) => table,
            other => panic!("expected a table, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_data_is_unfiltered() {
        let panel = raw_data(&scenario_session());
        let table = table_of(&panel);
        assert_eq!(table.headers, vec!["comment_text", "predicted_sentiment"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["great!", "positive"],
                vec!["bad.", "negative"],
                vec!["", "neutral"],
            ]
        );
    }

    #[test]
    fn test_distribution_panel() -> Result<()> {
        let dir = tempdir()?;
        let panel = distribution(&scenario_session(), dir.path());

        let table = table_of(&panel);
        assert_eq!(table.headers, vec!["predicted_sentiment", "count"]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|row| row[1] == "1"));

        let chart = dir.path().join(CHART_FILE);
        assert_eq!(panel.blocks[1], Block::Image(chart.clone()));
        assert!(chart.exists());
        Ok(())
    }

    #[test]
    fn test_filter_panel() {
        let panel = filter_by_sentiment(&scenario_session(), "negative");
        assert_eq!(panel.selection.as_deref(), Some("negative"));
        assert_eq!(table_of(&panel).rows, vec![vec!["bad.", "negative"]]);
    }

    #[test]
    fn test_summary_panels() {
        let session = scenario_session();
        assert_eq!(
            overall_summary(&session).blocks,
            vec![Block::Info("Mostly mixed feelings.".to_string())]
        );
        assert_eq!(
            sentiment_summary(&session, "positive").blocks,
            vec![Block::Success("Users are happy".to_string())]
        );
    }

    #[test]
    fn test_missing_summary_fails_only_its_panel() {
        let panel = sentiment_summary(&scenario_session(), "angry");
        assert!(matches!(panel.blocks.as_slice(), [Block::Failure(_)]));
    }

    #[test]
    fn test_empty_cloud_warns() -> Result<()> {
        let dir = tempdir()?;
        let config = test_config(dir.path())?;
        let scope = CloudScope::parse("neutral");
        let panel = word_cloud(&scenario_session(), &scope, &config.wordcloud, dir.path());

        assert_eq!(panel.blocks, vec![Block::Warning(NO_COMMENTS.to_string())]);
        assert!(!dir.path().join(scope.file_name()).exists());
        Ok(())
    }

    #[test]
    fn test_cloud_image() -> Result<()> {
        let dir = tempdir()?;
        let config = test_config(dir.path())?;
        let panel = word_cloud(
            &scenario_session(),
            &CloudScope::parse("positive"),
            &config.wordcloud,
            dir.path(),
        );

        let path = dir.path().join("wordcloud_positive.svg");
        assert_eq!(panel.blocks, vec![Block::Image(path.clone())]);
        assert!(std::fs::read_to_string(&path)?.contains("great"));
        Ok(())
    }

    #[test]
    fn test_default_page() -> Result<()> {
        let dir = tempdir()?;
        let config = test_config(dir.path())?;
        let page = default_page(&scenario_session(), &config);

        let titles: Vec<_> = page.iter().map(|panel| panel.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Raw Data",
                "Sentiment Distribution",
                "Filter by Sentiment",
                "Overall Summary",
                "Sentiment-wise Summary",
                "Word Cloud by Sentiment",
            ]
        );
        assert_eq!(page[2].selection.as_deref(), Some("positive"));
        assert_eq!(page[4].selection.as_deref(), Some("positive"));
        assert_eq!(page[5].selection.as_deref(), Some("All"));
        assert!(dir.path().join("wordcloud_all.svg").exists());
        Ok(())
    }

    #[test]
    fn test_panel_display() {
        colored::control::set_override(false);
        let rendered = filter_by_sentiment(&scenario_session(), "negative").to_string();
        assert!(rendered.starts_with("Filter by Sentiment [negative]"));
        assert!(rendered.contains("bad."));
    }

    #[test]
    fn test_selection_shown_verbatim() {
        colored::control::set_override(false);
        let panel = Panel::new("Filter by Sentiment").selected("very_negative");
        assert!(panel
            .to_string()
            .starts_with("Filter by Sentiment [very_negative]"));
    }

    #[test]
    fn test_heading() {
        colored::control::set_override(false);
        assert_eq!(heading(), "Analysis Dashboard\n==================");
    }
}
