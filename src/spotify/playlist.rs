use async_trait::async_trait;
use lazy_regex::regex;

use crate::spotify::api::SpotifyApiNameSource;
use crate::spotify::scraper::PublicPageNameSource;

/// Length bound on a resolved playlist name.
const MAX_NAME_LEN: usize = 200;
/// Fallback when sanitizing leaves nothing usable.
const EMPTY_NAME_PLACEHOLDER: &str = "Playlist";

/// One tier in the playlist-name fallback chain. Tiers are consulted in
/// order and the first name wins; a tier that is not available or cannot
/// produce a name is silently skipped.
#[async_trait]
pub trait NameSource: Send + Sync {
    fn is_available(&self) -> bool;
    async fn playlist_name(&self, playlist_id: &str) -> Option<String>;
}

/// Resolves a human-readable, filesystem-safe folder name for a playlist
/// reference. Falls back to the extracted playlist id, so it always
/// produces a usable name.
pub struct PlaylistNameResolver {
    sources: Vec<Box<dyn NameSource>>,
}

impl PlaylistNameResolver {
    /// Production chain: Spotify API first (private playlists possible),
    /// then the public playlist page, then the id itself.
    pub fn new() -> Self {
        Self {
            sources: vec![
                Box::new(SpotifyApiNameSource::from_env()),
                Box::new(PublicPageNameSource::new()),
            ],
        }
    }

    pub fn with_sources(sources: Vec<Box<dyn NameSource>>) -> Self {
        Self { sources }
    }

    pub async fn resolve(&self, reference: &str) -> String {
        let playlist_id = extract_playlist_id(reference);
        for source in &self.sources {
            if !source.is_available() {
                continue;
            }
            if let Some(name) = source.playlist_name(&playlist_id).await {
                if !name.trim().is_empty() {
                    return sanitize_file_name(&name);
                }
            }
        }
        sanitize_file_name(&playlist_id)
    }
}

/// Pulls the playlist id out of a reference. Accepts
/// `open.spotify.com/playlist/<id>`, `spotify:playlist:<id>` and raw ids;
/// anything else comes back unchanged as a degraded identifier.
pub fn extract_playlist_id(reference: &str) -> String {
    if let Some(captures) = regex!(r"playlist[/:]([A-Za-z0-9]+)").captures(reference) {
        return captures[1].to_string();
    }
    if regex!(r"^[A-Za-z0-9]+$").is_match(reference) {
        return reference.to_string();
    }
    reference.to_string()
}

/// Makes a string safe to use as a folder or file name: reserved and
/// control characters removed, whitespace runs collapsed, trimmed, bounded
/// to 200 characters, never empty.
pub fn sanitize_file_name(name: &str) -> String {
    let stripped = regex!(r#"[<>:"/\\|?*\x00-\x1f]"#).replace_all(name, "");
    let collapsed = regex!(r"\s+").replace_all(&stripped, " ");
    let bounded: String = collapsed.trim().chars().take(MAX_NAME_LEN).collect();
    let trimmed = bounded.trim_end();
    if trimmed.is_empty() {
        EMPTY_NAME_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        available: bool,
        name: Option<&'static str>,
    }

    #[async_trait]
    impl NameSource for FixedSource {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn playlist_name(&self, _playlist_id: &str) -> Option<String> {
            self.name.map(String::from)
        }
    }

    #[test]
    fn test_extract_id_from_share_url() {
        assert_eq!(
            extract_playlist_id("https://open.spotify.com/playlist/ABC123?si=xyz"),
            "ABC123"
        );
    }

    #[test]
    fn test_extract_id_from_uri() {
        assert_eq!(extract_playlist_id("spotify:playlist:37i9dQZF1DX4WY"), "37i9dQZF1DX4WY");
    }

    #[test]
    fn test_extract_id_from_raw_id() {
        assert_eq!(extract_playlist_id("ABC123"), "ABC123");
    }

    #[test]
    fn test_extract_id_degrades_to_input() {
        assert_eq!(extract_playlist_id("not a playlist ref!"), "not a playlist ref!");
        assert_eq!(extract_playlist_id(""), "");
    }

    #[test]
    fn test_sanitize_removes_reserved_characters() {
        let sanitized = sanitize_file_name("My<Play>list: Vol/1 \\ *?|\"");
        for forbidden in ['<', '>', ':', '"', '/', '\\', '|', '?', '*'] {
            assert!(!sanitized.contains(forbidden), "found {:?}", forbidden);
        }
        assert_eq!(sanitized, "MyPlaylist Vol1");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_file_name("  Deep\t\tHouse \n Mix  "), "Deep House Mix");
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_file_name(&long).chars().count(), 200);
    }

    #[test]
    fn test_sanitize_empty_input_yields_placeholder() {
        assert_eq!(sanitize_file_name(""), "Playlist");
        assert_eq!(sanitize_file_name("   \t  "), "Playlist");
        assert_eq!(sanitize_file_name("///???"), "Playlist");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "Plain Name",
            "  My / Play:list  ",
            "a b",
            &"x y ".repeat(100),
            "\u{0}\u{1}control",
        ];
        for input in inputs {
            let once = sanitize_file_name(input);
            assert_eq!(sanitize_file_name(&once), once, "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_first_available_tier_wins() {
        let resolver = PlaylistNameResolver::with_sources(vec![
            Box::new(FixedSource { available: true, name: Some("From Api") }),
            Box::new(FixedSource { available: true, name: Some("From Page") }),
        ]);
        let name = resolver
            .resolve("https://open.spotify.com/playlist/ABC123")
            .await;
        assert_eq!(name, "From Api");
    }

    #[tokio::test]
    async fn test_unavailable_tier_is_skipped() {
        let resolver = PlaylistNameResolver::with_sources(vec![
            Box::new(FixedSource { available: false, name: Some("From Api") }),
            Box::new(FixedSource { available: true, name: Some("From Page") }),
        ]);
        assert_eq!(resolver.resolve("ABC123").await, "From Page");
    }

    #[tokio::test]
    async fn test_empty_tier_result_falls_through() {
        let resolver = PlaylistNameResolver::with_sources(vec![
            Box::new(FixedSource { available: true, name: None }),
            Box::new(FixedSource { available: true, name: Some("  ") }),
        ]);
        assert_eq!(
            resolver
                .resolve("https://open.spotify.com/playlist/ABC123?si=xyz")
                .await,
            "ABC123"
        );
    }

    #[tokio::test]
    async fn test_no_tiers_falls_back_to_sanitized_id() {
        let resolver = PlaylistNameResolver::with_sources(vec![]);
        assert_eq!(resolver.resolve("spotify:playlist:XYZ9").await, "XYZ9");
        // Degraded references still come out filesystem-safe and non-empty.
        assert_eq!(resolver.resolve("???").await, "Playlist");
    }

    #[tokio::test]
    async fn test_tier_result_is_sanitized() {
        let resolver = PlaylistNameResolver::with_sources(vec![Box::new(FixedSource {
            available: true,
            name: Some("My<Play>list: Vol/1 "),
        })]);
        assert_eq!(resolver.resolve("ABC123").await, "MyPlaylist Vol1");
    }
}
