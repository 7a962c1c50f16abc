use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::time::Duration;

use crate::spotify::playlist::NameSource;

/// Bound on the public page fetch.
const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(12);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; spotdl-sync/0.1)";

/// Playlist-name lookup by scraping the public playlist page. Works for
/// public playlists without any credentials.
pub struct PublicPageNameSource;

impl PublicPageNameSource {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_page(&self, playlist_id: &str) -> Option<String> {
        let url = format!("https://open.spotify.com/playlist/{}", playlist_id);
        let client = reqwest::Client::builder()
            .timeout(PAGE_FETCH_TIMEOUT)
            .build()
            .ok()?;
        let response = client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }
}

#[async_trait]
impl NameSource for PublicPageNameSource {
    fn is_available(&self) -> bool {
        true
    }

    async fn playlist_name(&self, playlist_id: &str) -> Option<String> {
        let body = self.fetch_page(playlist_id).await?;
        extract_page_title(&body)
    }
}

/// Pulls the og:title meta tag out of the page, falling back to the
/// document title.
fn extract_page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let meta_selector = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    for element in document.select(&meta_selector) {
        if let Some(content) = element.value().attr("content") {
            if !content.trim().is_empty() {
                return Some(content.to_string());
            }
        }
    }

    let title_selector = Selector::parse("title").ok()?;
    for element in document.select(&title_selector) {
        let title = element.text().collect::<String>().trim().to_string();
        if !title.is_empty() {
            return Some(title);
        }
    }

    None
}
