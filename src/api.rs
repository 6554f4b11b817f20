// API client module: contains a small blocking HTTP client that talks to
// the channel search API, the auth endpoint and the archive server. It is
// intentionally synchronous: every call blocks until a response arrives.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Number of results requested per search page.
pub const PAGE_SIZE: u32 = 25;

/// Item kind the search API uses for uploaded videos.
pub const VIDEO_KIND: &str = "youtube#video";

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

// Links keep at most this many characters of the video id.
const VIDEO_ID_LEN: usize = 13;

/// One page of channel search results.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchItem {
    pub id: SearchId,
}

/// Identifies what a search result points at. Only video results carry a
/// `videoId`; channels and playlists carry their own id fields instead.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchId {
    pub kind: String,
    pub video_id: Option<String>,
}

/// Identifier of a single video, as forwarded to the archive server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoLink(String);

impl VideoLink {
    pub fn new(video_id: &str) -> Self {
        VideoLink(video_id.chars().take(VIDEO_ID_LEN).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full watch page URL for this video.
    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL, self.0)
    }
}

impl fmt::Display for VideoLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Login request payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Raw response of the auth endpoint. Nothing is assumed about its shape
/// beyond an optional `access_token` string field.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct AuthToken(serde_json::Value);

impl AuthToken {
    pub fn new(value: serde_json::Value) -> Self {
        AuthToken(value)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.0.get("access_token").and_then(|v| v.as_str())
    }
}

/// Payload submitted to the archive server for every video.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    #[serde(rename = "archiveURL")]
    pub archive_url: String,
}

impl ArchiveEntry {
    pub fn new(link: &VideoLink) -> Self {
        ArchiveEntry {
            archive_url: link.as_str().to_string(),
        }
    }
}

/// Anything that can serve pages of a channel's search results.
pub trait VideoSource {
    /// Fetch one page. `page_token` is `None` for the first page.
    fn search_page(&self, page_token: Option<&str>) -> Result<SearchListResponse>;
}

/// Exchanges credentials for a token.
pub trait Authenticator {
    fn login(&self, req: &AuthRequest) -> Result<AuthToken>;
}

/// Receives archive entries. Returns whatever status the server answered
/// with; only transport failures are errors.
pub trait ArchiveSink {
    fn submit(&self, server: &str, entry: &ArchiveEntry, access_token: &str) -> Result<StatusCode>;
}

/// Blocking client for the search API, the auth endpoint and archive
/// servers. One instance is shared by the whole run.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    search_url: String,
    auth_url: String,
}

impl ApiClient {
    pub fn new(search_url: &str, auth_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            search_url: search_url.to_string(),
            auth_url: auth_url.to_string(),
        })
    }

    /// Search results for one channel, ordered by date.
    pub fn channel<'a>(&'a self, channel_id: &'a str, api_key: &'a str) -> ChannelSearch<'a> {
        ChannelSearch {
            api: self,
            channel_id,
            api_key,
        }
    }
}

impl Authenticator for ApiClient {
    fn login(&self, req: &AuthRequest) -> Result<AuthToken> {
        info!(username = %req.username, "authenticating");
        let res = self
            .client
            .post(&self.auth_url)
            .json(req)
            .send()
            .context("Failed to send auth request")?;
        let status = res.status();
        let body = res.text().context("Reading auth response body")?;
        debug!(%status, %body, "auth response");
        if !status.is_success() {
            warn!(%status, "auth endpoint returned a non-success status");
        }
        let token: AuthToken =
            serde_json::from_str(&body).context("Parsing auth response json")?;
        Ok(token)
    }
}

impl ArchiveSink for ApiClient {
    fn submit(&self, server: &str, entry: &ArchiveEntry, access_token: &str) -> Result<StatusCode> {
        let res = self
            .client
            .post(server)
            .headers(jwt_headers(access_token)?)
            .json(entry)
            .send()
            .with_context(|| format!("Failed to send archive entry {}", entry.archive_url))?;
        let status = res.status();
        info!(%status, archive_url = %entry.archive_url, "submitted archive entry");
        Ok(status)
    }
}

/// Build the `Authorization: JWT <token>` header the archive server expects.
fn jwt_headers(access_token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let val = format!("JWT {}", access_token);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&val).context("Access token is not a valid header value")?,
    );
    Ok(headers)
}

/// A channel's search results, backed by the real search endpoint.
pub struct ChannelSearch<'a> {
    api: &'a ApiClient,
    channel_id: &'a str,
    api_key: &'a str,
}

impl ChannelSearch<'_> {
    fn query(&self, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("key", self.api_key.to_string()),
            ("channelId", self.channel_id.to_string()),
            ("part", "snippet,id".to_string()),
            ("order", "date".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        query
    }
}

impl VideoSource for ChannelSearch<'_> {
    fn search_page(&self, page_token: Option<&str>) -> Result<SearchListResponse> {
        let res = self
            .api
            .client
            .get(&self.api.search_url)
            .query(&self.query(page_token))
            .send()
            .context("Failed to send search request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Search failed: {} - {}", status, txt);
        }
        let page: SearchListResponse = res.json().context("Parsing search response json")?;
        Ok(page)
    }
}
