//! Command-line driver for the paper generation session.
//!
//! Loads a manuscript, runs the requested generation actions against the
//! backend one at a time, and writes the results back to disk.

mod driver;
mod logging;
mod manuscript;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use client_logging::client_info;
use scribe_client::{ClientHandle, ClientSettings};
use scribe_core::{ActionKind, AppState, Msg};
use url::Url;

use crate::driver::Driver;
use crate::logging::LogDestination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ActionArg {
    AbstractCn,
    KeywordsCn,
    AbstractEn,
    KeywordsEn,
    Body,
    References,
    Acknowledgement,
}

impl From<ActionArg> for ActionKind {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::AbstractCn => ActionKind::AbstractCn,
            ActionArg::KeywordsCn => ActionKind::KeywordsCn,
            ActionArg::AbstractEn => ActionKind::AbstractEn,
            ActionArg::KeywordsEn => ActionKind::KeywordsEn,
            ActionArg::Body => ActionKind::Body,
            ActionArg::References => ActionKind::References,
            ActionArg::Acknowledgement => ActionKind::Acknowledgement,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "scribe", about = "Drive paper generation sessions from a manuscript file")]
struct Args {
    /// Manuscript file (RON) holding the draft inputs and generated sections.
    manuscript: PathBuf,

    /// Base URL of the generation backend.
    #[arg(long, default_value = "http://127.0.0.1:5000/")]
    server: Url,

    /// CSRF token sent with every mutating request.
    #[arg(long, default_value = "")]
    csrf_token: String,

    /// Actions to run, in order.
    #[arg(long = "generate", value_enum)]
    generate: Vec<ActionArg>,

    /// Parse the outline and report its leaf section count before generating.
    #[arg(long)]
    parse_outline: bool,

    /// How long to wait for a single action before stopping it.
    #[arg(long, default_value_t = 600)]
    action_timeout: u64,

    /// Where log output goes.
    #[arg(long, value_enum, default_value = "file")]
    log: LogDestination,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log);
    client_info!("scribe starting, server {}", args.server);

    let mut document = manuscript::load(&args.manuscript)?;

    let settings = ClientSettings::new(args.server.clone(), args.csrf_token.clone());
    let client = ClientHandle::new(settings)
        .with_context(|| format!("failed to create client for {}", args.server))?;
    let mut driver = Driver::new(AppState::new(), client);

    for msg in manuscript::seed_messages(&document) {
        driver.apply(msg);
    }
    // Seeding marks the view dirty; the first render happens on the first
    // dispatched message instead.
    driver.consume_seed_render();

    if args.parse_outline {
        driver.dispatch(Msg::OutlineParseClicked);
        // An empty outline is rejected locally and no request goes out.
        if !document.outline.trim().is_empty() && !driver.pump_one(Duration::from_secs(30)) {
            bail!("outline parsing timed out");
        }
    }

    let timeout = Duration::from_secs(args.action_timeout);
    for arg in &args.generate {
        let action = ActionKind::from(*arg);
        driver.dispatch(Msg::GenerateClicked(action));
        if !driver.run_until_idle(timeout) {
            driver.dispatch(Msg::StopClicked);
            driver.run_until_idle(Duration::from_secs(10));
            manuscript::absorb_outputs(&mut document, driver.state());
            manuscript::save(&args.manuscript, &document)?;
            bail!(
                "{} timed out after {} seconds",
                action.display_name(),
                args.action_timeout
            );
        }
    }

    manuscript::absorb_outputs(&mut document, driver.state());
    manuscript::save(&args.manuscript, &document)?;
    render::summary(&driver.state().view());
    Ok(())
}
