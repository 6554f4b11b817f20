// Command-line surface. Everything the run needs comes from flags; there is
// no config file.

use crate::api::{AuthRequest, DEFAULT_SEARCH_URL};
use crate::submit::Destination;
use clap::Parser;

/// Pull video links from a channel and submit them to an archive server
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// the channel id
    #[arg(long = "channel-id", short = 'c')]
    pub channel_id: String,

    /// performs a dry run locally when provided with a server address
    #[arg(long = "dry_run", short = 'd')]
    pub dry_run: bool,

    /// the server address for the results to be uploaded
    #[arg(long = "server", short = 's')]
    pub server_address: Option<String>,

    /// the username to log in to the api with
    #[arg(long = "user", short = 'u')]
    pub auth_username: String,

    /// the password to log in to the api with
    #[arg(long = "pass", short = 'p')]
    pub auth_password: String,

    /// the auth api
    #[arg(long = "auth", short = 'a')]
    pub auth_api: String,

    /// the youtube API key
    #[arg(long = "youtube-api", short = 'y')]
    pub api_key: String,

    #[arg(long, hide = true, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub channel_id: String,
    pub api_key: String,
    pub search_url: String,
    pub auth_url: String,
    pub credentials: AuthRequest,
    /// `None` when the flag was missing or empty.
    pub server: Option<String>,
    /// Dry run as requested on the command line. See [`Config::destination`]
    /// for the effective value.
    pub dry_run: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            channel_id: args.channel_id,
            api_key: args.api_key,
            search_url: args.search_url,
            auth_url: args.auth_api,
            credentials: AuthRequest {
                username: args.auth_username,
                password: args.auth_password,
            },
            server: args.server_address.filter(|s| !s.is_empty()),
            dry_run: args.dry_run,
        }
    }
}

impl Config {
    pub fn destination(&self) -> Destination<'_> {
        Destination::resolve(self.server.as_deref(), self.dry_run)
    }

    /// Banner shown before the run starts, if any.
    pub fn startup_notice(&self) -> Option<&'static str> {
        if self.dry_run {
            Some(
                "\nThis is a dry run. No data will be loaded to server whether \
                 a server_address has been provided or not.\n",
            )
        } else if self.server.is_none() {
            Some(
                "\nWARNING: A server address was not provided in args. \
                 Only printing results locally. Use the -h arg if you don't \
                 know what this means.\n",
            )
        } else {
            None
        }
    }
}
