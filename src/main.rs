// Entrypoint for the archiver CLI.
// - Keeps `main` small: parse flags, then fetch, authenticate, submit.
// - Returns `anyhow::Result`; a failed fetch is reported and ends the run
//   without submitting anything.

use anyhow::Result;
use channel_archiver::api::{ApiClient, Authenticator};
use channel_archiver::cli::{Args, Config};
use channel_archiver::fetch::{fetch_all_videos, report_failure};
use channel_archiver::submit::{print_summary, send_all_entries};
use clap::Parser;
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::from(Args::parse());

    // Logs go to stderr; stdout carries dry run payloads and the summary.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(notice) = config.startup_notice() {
        println!("{}", notice);
    }

    let api = ApiClient::new(&config.search_url, &config.auth_url)?;

    let links = match fetch_all_videos(&api.channel(&config.channel_id, &config.api_key)) {
        Ok(links) => links,
        Err(e) => {
            report_failure(&e, &mut io::stderr().lock())?;
            return Ok(());
        }
    };

    let token = api.login(&config.credentials)?;

    let failed = send_all_entries(
        links,
        &api,
        &config.destination(),
        &token,
        &mut rand::thread_rng(),
        &mut io::stdout().lock(),
    )?;
    print_summary(&failed, &mut io::stdout().lock())?;
    Ok(())
}
