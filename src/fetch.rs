// Fetcher: walks a channel's search results page by page and collects the
// video links. Any failure aborts the walk; partial results are discarded.

use crate::api::{SearchListResponse, VideoLink, VideoSource, VIDEO_KIND};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Video links on a single page, in response order. Results that are not
/// videos (channels, playlists) are skipped.
pub fn video_links(page: &SearchListResponse) -> Vec<VideoLink> {
    page.items
        .iter()
        .filter(|item| item.id.kind == VIDEO_KIND)
        .filter_map(|item| match &item.id.video_id {
            Some(id) => Some(VideoLink::new(id)),
            None => {
                warn!("video result without a videoId, skipping");
                None
            }
        })
        .collect()
}

/// Fetch every video link the source has to offer, following
/// `nextPageToken` until a page comes back without one.
pub fn fetch_all_videos<S: VideoSource + ?Sized>(source: &S) -> Result<Vec<VideoLink>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").context("Building spinner style")?,
    );

    let result = walk_pages(source, &spinner);
    spinner.finish_and_clear();

    let links = result?;
    info!(count = links.len(), "fetched channel videos");
    Ok(links)
}

/// Report a failed fetch. The message is logged and also written to `out`
/// so it shows up even with logging filtered off.
pub fn report_failure<W: Write + ?Sized>(err: &anyhow::Error, out: &mut W) -> Result<()> {
    error!("{:#}", err);
    writeln!(out, "{:#}", err).context("Writing fetch failure")?;
    Ok(())
}

fn walk_pages<S: VideoSource + ?Sized>(source: &S, spinner: &ProgressBar) -> Result<Vec<VideoLink>> {
    let mut links = Vec::new();
    let mut page_token: Option<String> = None;
    for page_no in 1.. {
        spinner.set_message(format!("Fetching page {}...", page_no));
        spinner.tick();

        let page = source
            .search_page(page_token.as_deref())
            .with_context(|| format!("Fetching search page {}", page_no))?;
        let found = video_links(&page);
        debug!(
            page = page_no,
            items = page.items.len(),
            videos = found.len(),
            has_next = page.next_page_token.is_some(),
            "fetched search page"
        );
        links.extend(found);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// Serves canned pages in order and records the tokens it was asked for.
    struct CannedPages {
        pages: RefCell<Vec<serde_json::Value>>,
        requested: RefCell<Vec<Option<String>>>,
    }

    impl CannedPages {
        fn new(pages: Vec<serde_json::Value>) -> Self {
            CannedPages {
                pages: RefCell::new(pages.into_iter().rev().collect()),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl VideoSource for CannedPages {
        fn search_page(&self, page_token: Option<&str>) -> Result<SearchListResponse> {
            self.requested.borrow_mut().push(page_token.map(String::from));
            let page = self
                .pages
                .borrow_mut()
                .pop()
                .context("no more pages")?;
            Ok(serde_json::from_value(page)?)
        }
    }

    fn video(id: &str) -> serde_json::Value {
        json!({ "kind": "youtube#searchResult", "id": { "kind": "youtube#video", "videoId": id } })
    }

    fn playlist(id: &str) -> serde_json::Value {
        json!({ "kind": "youtube#searchResult", "id": { "kind": "youtube#playlist", "playlistId": id } })
    }

    fn ids(links: &[VideoLink]) -> Vec<&str> {
        links.iter().map(|l| l.as_str()).collect()
    }

    #[test]
    fn test_single_page() {
        let source = CannedPages::new(vec![json!({
            "items": [video("aaaaaaaaaaa"), video("bbbbbbbbbbb")]
        })]);
        let links = fetch_all_videos(&source).unwrap();
        assert_eq!(ids(&links), vec!["aaaaaaaaaaa", "bbbbbbbbbbb"]);
        assert_eq!(*source.requested.borrow(), vec![None]);
    }

    #[test]
    fn test_pages_are_concatenated_in_order() {
        let source = CannedPages::new(vec![
            json!({ "items": [video("p1v1"), video("p1v2")], "nextPageToken": "T2" }),
            json!({ "items": [video("p2v1")], "nextPageToken": "T3" }),
            json!({ "items": [video("p3v1")] }),
        ]);
        let links = fetch_all_videos(&source).unwrap();
        assert_eq!(ids(&links), vec!["p1v1", "p1v2", "p2v1", "p3v1"]);
        assert_eq!(
            *source.requested.borrow(),
            vec![None, Some("T2".to_string()), Some("T3".to_string())]
        );
    }

    #[test]
    fn test_non_video_items_are_excluded() {
        let source = CannedPages::new(vec![json!({
            "items": [playlist("PL1"), video("v1"), playlist("PL2"), video("v2")]
        })]);
        let links = fetch_all_videos(&source).unwrap();
        assert_eq!(ids(&links), vec!["v1", "v2"]);
    }

    #[test]
    fn test_video_without_id_is_skipped() {
        let page: SearchListResponse = serde_json::from_value(json!({
            "items": [{ "id": { "kind": "youtube#video" } }, video("v1")]
        }))
        .unwrap();
        assert_eq!(ids(&video_links(&page)), vec!["v1"]);
    }

    #[test]
    fn test_empty_token_ends_pagination() {
        let source = CannedPages::new(vec![json!({ "items": [video("v1")], "nextPageToken": "" })]);
        let links = fetch_all_videos(&source).unwrap();
        assert_eq!(ids(&links), vec!["v1"]);
        assert_eq!(source.requested.borrow().len(), 1);
    }

    #[test]
    fn test_failure_discards_partial_results() {
        // Second page is missing, so the source errors after one good page.
        let source = CannedPages::new(vec![
            json!({ "items": [video("v1")], "nextPageToken": "T2" }),
        ]);
        let err = fetch_all_videos(&source).unwrap_err();
        assert!(format!("{:#}", err).contains("Fetching search page 2"));
    }

    #[test]
    fn test_report_failure_writes_full_chain() {
        let err = anyhow::anyhow!("Search failed: 403 Forbidden").context("Fetching search page 1");
        let mut out = Vec::new();
        report_failure(&err, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Fetching search page 1: Search failed: 403 Forbidden\n"
        );
    }
}
