use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work an item refers to. Shared by both services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
    Episode,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Episode => "episode",
        }
    }

    /// Bucket name used by Trakt payloads and history URLs
    pub fn plural(&self) -> &'static str {
        match self {
            MediaType::Movie => "movies",
            MediaType::Show => "shows",
            MediaType::Episode => "episodes",
        }
    }

    /// Map an IMDb "Title Type" column value.
    ///
    /// Accepts both the human labels ("TV Series") and the camel-case
    /// identifiers ("tvSeries") IMDb has used in its exports. Returns `None`
    /// for types the mirror cannot hold (video games, podcasts, ...).
    pub fn from_imdb_title_type(title_type: &str) -> Option<Self> {
        match title_type.trim() {
            "Movie" | "TV Movie" | "TV Special" | "TV Short" | "Short" | "Video" | "movie"
            | "tvMovie" | "tvSpecial" | "tvShort" | "short" | "video" => Some(MediaType::Movie),
            "TV Series" | "TV Mini Series" | "tvSeries" | "tvMiniSeries" => Some(MediaType::Show),
            "TV Episode" | "tvEpisode" => Some(MediaType::Episode),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
