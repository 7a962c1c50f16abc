use std::env;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use dotenvy::dotenv;
use error_stack::{IntoReport, Report, ResultExt};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::spotify::playlist::NameSource;
use crate::spotify::{SpotifyError, SpotifyResult};

#[derive(Serialize, Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct ApiPlaylist {
    name: String,
}

/// Playlist-name lookup through the Spotify Web API using the Client
/// Credentials Flow, which also covers private playlists. Available only
/// when both credentials are present in the environment; every lookup
/// failure degrades to `None` so the next tier gets its turn.
pub struct SpotifyApiNameSource {
    credentials: Option<(String, String)>,
}

impl SpotifyApiNameSource {
    /// Reads `SPOTIPY_CLIENT_ID` and `SPOTIPY_CLIENT_SECRET`, honoring a
    /// `.env` file when one is present.
    pub fn from_env() -> Self {
        dotenv().ok();
        let client_id = env::var(AppConfig::SPOTIFY_CLIENT_ID_ENV).ok();
        let client_secret = env::var(AppConfig::SPOTIFY_CLIENT_SECRET_ENV).ok();
        let credentials = match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        };
        Self { credentials }
    }

    async fn fetch_name(&self, playlist_id: &str) -> SpotifyResult<String> {
        let (client_id, client_secret) = match &self.credentials {
            Some(credentials) => credentials,
            None => {
                return Err(Report::new(SpotifyError)
                    .attach_printable("Spotify credentials are not configured"))
            }
        };

        // --- Get Access Token ---
        let client = reqwest::Client::new();
        let auth_string = format!("{}:{}", client_id, client_secret);
        let encoded_auth = general_purpose::STANDARD.encode(auth_string);

        let token_response = client
            .post("https://accounts.spotify.com/api/token")
            .header("Authorization", format!("Basic {}", encoded_auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)?
            .json::<TokenResponse>()
            .await
            .into_report()
            .change_context(SpotifyError)?;

        // --- Get the playlist name ---
        let playlist_url = format!(
            "https://api.spotify.com/v1/playlists/{}?fields=name",
            playlist_id
        );
        let api_playlist = client
            .get(&playlist_url)
            .bearer_auth(&token_response.access_token)
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)?
            .json::<ApiPlaylist>()
            .await
            .into_report()
            .change_context(SpotifyError)?;

        Ok(api_playlist.name)
    }
}

#[async_trait]
impl NameSource for SpotifyApiNameSource {
    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn playlist_name(&self, playlist_id: &str) -> Option<String> {
        self.fetch_name(playlist_id).await.ok()
    }
}
