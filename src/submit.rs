// Submitter: forwards every fetched link to the archive server in random
// order and keeps track of the submissions the server did not accept.

use crate::api::{ArchiveEntry, ArchiveSink, AuthToken, VideoLink};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::StatusCode;
use std::fmt;
use std::io::Write;
use tracing::debug;

/// Address reported when no archive server was configured.
pub const PLACEHOLDER_SERVER: &str = "0.0.0.0";

/// Where entries go, and whether they are really sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination<'a> {
    pub server: &'a str,
    pub dry_run: bool,
}

impl<'a> Destination<'a> {
    /// Without a server address there is nowhere to send to, so the run is
    /// forced into dry-run mode whatever was asked for.
    pub fn resolve(server: Option<&'a str>, dry_run: bool) -> Self {
        match server.filter(|s| !s.is_empty()) {
            Some(server) => Destination { server, dry_run },
            None => Destination {
                server: PLACEHOLDER_SERVER,
                dry_run: true,
            },
        }
    }
}

/// An entry the archive server did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub entry: ArchiveEntry,
    pub status: StatusCode,
}

impl fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.entry.archive_url)
    }
}

/// 200 and 201 are the only answers that count as archived.
pub fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

/// Shuffle `links` and submit each one. Dry runs print the payload to `out`
/// instead of sending it and count as accepted.
///
/// A live run needs an `access_token` in `token`; without one nothing is
/// sent and an error is returned. Transport errors stop the run.
pub fn send_all_entries<S, R, W>(
    mut links: Vec<VideoLink>,
    sink: &S,
    dest: &Destination<'_>,
    token: &AuthToken,
    rng: &mut R,
    out: &mut W,
) -> Result<Vec<SubmissionResult>>
where
    S: ArchiveSink + ?Sized,
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    links.shuffle(rng);

    let access_token = if dest.dry_run || links.is_empty() {
        None
    } else {
        Some(
            token
                .access_token()
                .context("Authentication response carried no access_token")?,
        )
    };

    let mut failed = Vec::new();
    for link in &links {
        let entry = ArchiveEntry::new(link);
        let status = match access_token {
            Some(access_token) => sink.submit(dest.server, &entry, access_token)?,
            None => {
                let payload =
                    serde_json::to_string(&entry).context("Serializing archive entry")?;
                writeln!(out, "{}", payload).context("Writing dry run output")?;
                StatusCode::OK
            }
        };
        if !is_accepted(status) {
            debug!(%status, video = %link.watch_url(), "entry not accepted");
            failed.push(SubmissionResult { entry, status });
        }
    }
    Ok(failed)
}

/// Report failed submissions. Prints nothing when everything went through.
pub fn print_summary<W: Write + ?Sized>(failed: &[SubmissionResult], out: &mut W) -> Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "\nTHERE WERE {} ENTRIES THAT FAILED TO BE PROCESSED.\n",
        failed.len()
    )?;
    for result in failed {
        writeln!(out, "{}", result)?;
    }
    Ok(())
}
