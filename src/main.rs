use clap::Parser;

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use err_derive::Error;
use log::*;
use validator::Validate;

mod chart;
mod config;
mod console;
mod panels;
mod records;
mod session;
mod stopwords;
mod summary;
mod wordcloud;

use self::config::Config;
use self::session::Session;

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "Config file invalid")]
    ValidationError(#[error(source)] validator::ValidationErrors),
    #[error(display = "Config syntax invalid")]
    ConfigError(#[error(source)] toml::de::Error),
    #[error(display = "Cannot read or write file")]
    IoError(#[error(source)] std::io::Error),
    #[error(display = "Cannot read {:?}", path)]
    ArtifactUnreadable {
        path: PathBuf,
        #[error(source)]
        source: std::io::Error,
    },
    #[error(display = "Results table malformed")]
    CsvError(#[error(source)] csv::Error),
    #[error(display = "Summary document malformed")]
    JsonError(#[error(source)] serde_json::Error),
    #[error(display = "Results table has no {:?} column", _0)]
    MissingColumn(String),
    #[error(display = "No summary for sentiment {:?}", _0)]
    UnknownSummary(String),
    #[error(display = "Unable to draw: {}", _0)]
    RenderError(String),
    #[error(display = "Can't listen for Ctrl-C")]
    SignalError(#[error(source)] ctrlc::Error),
}

#[derive(Parser, Debug)]
#[command(about = "Browse sentiment analysis results and summaries")]
struct Args {
    /// Dashboard config, defaults apply when the file is absent
    #[arg(short, long, default_value = "sentidash.toml")]
    config: PathBuf,

    /// Render the first page and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    if config.debug {
        std::env::set_var("RUST_LOG", "sentidash=debug");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "sentidash=info");
    }
    pretty_env_logger::init();

    if let Err(e) = config.validate() {
        error!("Config file {:?} invalid: {}", args.config, e);
        return Err(e.into());
    }

    info!("Opening dashboard");
    let session = match Session::open(&config) {
        Ok(session) => session,
        Err(e) => {
            error!("Unable to load artifacts: {}", e);
            return Err(e);
        }
    };

    println!("{}", panels::heading());
    for panel in panels::default_page(&session, &config) {
        println!("{}", panel);
    }
    if args.once {
        return Ok(());
    }

    let keep_running_arc = Arc::new(AtomicBool::new(true));
    debug!("Setting up stop signals");
    let keep_running_signal = keep_running_arc.clone();
    let mut signal_count = 0;
    ctrlc::set_handler(move || {
        if signal_count > 0 {
            std::process::exit(1);
        } else {
            (*keep_running_signal).store(false, Ordering::Relaxed);
            signal_count += 1;
        }
    })?;

    console::run(&session, &config, &keep_running_arc)
}
