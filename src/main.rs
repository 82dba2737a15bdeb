use anyhow::Context;
use clap::Parser;
use fs_err as fs;
use std::io::{self, IsTerminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod clipboard;
mod config;
mod draft;
mod errors;
mod generation;
mod prompt;
mod provider;
mod session;
mod transcript;
mod ux;
mod wizard;

use clipboard::SystemClipboard;
use generation::GenerationClient;
use session::Session;
use transcript::Transcript;
use wizard::WizardController;

fn init_tracing(debug: bool) {
    let default = if debug { "promptgen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.debug);

    let cfg = config::Config::load(args.config.as_deref())?.with_args(&args);
    let credential = cfg.credential()?;
    debug!(provider = cfg.provider.as_str(), model = cfg.model(), "configuration loaded");

    let prov = provider::make_provider(&cfg, credential)?;
    let transcript = match &cfg.save_dir {
        Some(dir) => {
            let t = Transcript::create(dir).context("creating transcript directory")?;
            info!(session = %t.session(), dir = %t.dir().display(), "recording exchanges");
            Some(t)
        }
        None => None,
    };
    let client = GenerationClient::new(prov).with_transcript(transcript);
    info!(provider = client.provider_name(), model = client.model(), "generation client ready");
    let mut controller = WizardController::new(client);
    let prefill = args.draft_update();
    if !prefill.is_empty() {
        debug!("draft prefilled from flags");
        controller.update_draft(prefill);
    }

    if args.auto_approve {
        let text = session::run_unattended(&mut controller).await?;
        if let Some(path) = &cfg.out {
            fs::write(path, &text)?;
            info!(path = %path.display(), "final prompt written");
        }
        println!("{}", text);
        return Ok(());
    }

    let progress = cfg.progress && io::stderr().is_terminal();
    let stdin = io::stdin();
    let mut session = Session::new(controller, stdin.lock(), io::stdout(), SystemClipboard::new())
        .with_progress(progress)
        .with_out_file(cfg.out.clone());
    session.run().await
}
