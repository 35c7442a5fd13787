use colored::Colorize;
use scopeguard::defer_on_unwind;

use std::io;
use std::io::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use log::*;

use crate::config::Config;
use crate::panels::{self, Block, Panel};
use crate::records::normalize_sentiment;
use crate::session::{CloudScope, Session};
use crate::Error;

const HELP: &str = "\
table              raw results
dist               sentiment distribution and bar chart
filter <label>     results with one sentiment
overall            overall summary
summary <label>    summary for one sentiment
cloud <All|label>  word cloud
options            what each selector accepts
quit               leave (so does an empty line)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Table,
    Distribution,
    Filter(String),
    Overall,
    Summary(String),
    Cloud(CloudScope),
    Options,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (verb, arg) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };
        match (verb.to_lowercase().as_str(), arg) {
            ("", _) | ("quit", _) | ("exit", _) => Command::Quit,
            ("table", _) => Command::Table,
            ("dist", _) => Command::Distribution,
            ("overall", _) => Command::Overall,
            ("options", _) => Command::Options,
            ("help", _) => Command::Help,
            ("filter", arg) if !arg.is_empty() => Command::Filter(normalize_sentiment(arg)),
            ("cloud", arg) if !arg.is_empty() => Command::Cloud(CloudScope::parse(arg)),
            // Summary keys are looked up exactly as written in the document
            ("summary", arg) if !arg.is_empty() => Command::Summary(arg.to_string()),
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Panels a command renders, none for `Quit`
pub fn dispatch(session: &Session, config: &Config, command: &Command) -> Vec<Panel> {
    match command {
        Command::Table => vec![panels::raw_data(session)],
        Command::Distribution => vec![panels::distribution(session, &config.output_dir)],
        Command::Filter(sentiment) => vec![panels::filter_by_sentiment(session, sentiment)],
        Command::Overall => vec![panels::overall_summary(session)],
        Command::Summary(sentiment) => vec![panels::sentiment_summary(session, sentiment)],
        Command::Cloud(scope) => vec![panels::word_cloud(
            session,
            scope,
            &config.wordcloud,
            &config.output_dir,
        )],
        Command::Options => vec![options(session)],
        Command::Help => vec![help()],
        Command::Quit => vec![],
        Command::Unknown(line) => vec![help().with_first(Block::Warning(format!(
            "Unknown command {:?}",
            line
        )))],
    }
}

fn options(session: &Session) -> Panel {
    let join = |options: Vec<String>| options.join(", ");
    let sentiments: Vec<String> = session.sentiments().iter().map(|s| s.to_string()).collect();
    Panel {
        title: "Options".to_string(),
        selection: None,
        blocks: vec![
            Block::Info(format!("filter: {}", join(sentiments))),
            Block::Info(format!(
                "summary: {}",
                join(session.summaries().sentiments().map(String::from).collect())
            )),
            Block::Info(format!(
                "cloud: {}",
                join(session.cloud_scopes().iter().map(|s| s.to_string()).collect())
            )),
        ],
    }
}

fn help() -> Panel {
    Panel {
        title: "Commands".to_string(),
        selection: None,
        blocks: vec![Block::Info(HELP.to_string())],
    }
}

impl Panel {
    fn with_first(mut self, block: Block) -> Self {
        self.blocks.insert(0, block);
        self
    }
}

/// Reads commands until asked to quit, stdin closes or Ctrl-C
pub fn run(session: &Session, config: &Config, keep_running: &AtomicBool) -> Result<(), Error> {
    defer_on_unwind! { keep_running.store(false, Ordering::Relaxed); }
    debug!("Session {}: Waiting for commands", session.id());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while keep_running.load(Ordering::Relaxed) {
        print!("{} ", ">".bold());
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if !keep_running.load(Ordering::Relaxed) {
            break;
        }

        let command = Command::parse(&line);
        debug!("Session {}: {:?}", session.id(), command);
        if command == Command::Quit {
            break;
        }
        for panel in dispatch(session, config, &command) {
            println!("{}", panel);
        }
    }

    info!("Session {}: Closed", session.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::scenario_session;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("table"), Command::Table);
        assert_eq!(Command::parse("  DIST "), Command::Distribution);
        assert_eq!(
            Command::parse("filter NEGATIVE"),
            Command::Filter("negative".to_string())
        );
        assert_eq!(
            Command::parse("summary Positive"),
            Command::Summary("Positive".to_string())
        );
        assert_eq!(Command::parse("cloud All"), Command::Cloud(CloudScope::All));
        assert_eq!(
            Command::parse("cloud neutral"),
            Command::Cloud(CloudScope::Sentiment("neutral".to_string()))
        );
        assert_eq!(Command::parse(""), Command::Quit);
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(
            Command::parse("filter"),
            Command::Unknown("filter".to_string())
        );
    }

    #[test]
    fn test_dispatch() -> Result<()> {
        let dir = tempdir()?;
        let mut config = Config::load(&dir.path().join("absent.toml"))?;
        config.output_dir = dir.path().to_path_buf();
        let session = scenario_session();

        let rendered = dispatch(&session, &config, &Command::parse("filter negative"));
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].title, "Filter by Sentiment");

        let rendered = dispatch(&session, &config, &Command::parse("cloud neutral"));
        assert_eq!(
            rendered[0].blocks,
            vec![Block::Warning(panels::NO_COMMENTS.to_string())]
        );

        assert!(dispatch(&session, &config, &Command::Quit).is_empty());

        let rendered = dispatch(&session, &config, &Command::parse("bogus"));
        assert!(matches!(rendered[0].blocks[0], Block::Warning(_)));
        Ok(())
    }

    #[test]
    fn test_options() {
        let panel = options(&scenario_session());
        assert_eq!(
            panel.blocks,
            vec![
                Block::Info("filter: positive, negative, neutral".to_string()),
                Block::Info("summary: positive, neutral, negative".to_string()),
                Block::Info("cloud: All, positive, negative, neutral".to_string()),
            ]
        );
    }
}
