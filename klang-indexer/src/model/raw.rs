//! Raw record types and grouping keys
//!
//! [`RawSong`] is the transient input record handed over by a record source.
//! It is consumed entirely during one pipeline pass; nothing here survives
//! into the published library.
//!
//! The key types implement the grouping equivalence rules: a MusicBrainz ID
//! groups by itself alone (so identically-named albums stay apart in
//! well-tagged libraries), while everything else groups by case-folded
//! names (so "RAMMSTEIN" and "Rammstein" merge).

use crate::tag::Date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Raw information about a song obtained from a record source.
///
/// All fields are optional or defaultable; interpretation decides which
/// absences make a record unusable. Multi-valued fields may arrive
/// pre-split (several entries) or as a single separator-delimited entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSong {
    /// Source-assigned id for URI resolution. Unstable across sessions and
    /// only meaningful to the source that produced this record.
    pub external_id: Option<u64>,
    /// When the song was added to the collection.
    pub date_added: Option<DateTime<Utc>>,
    /// Path to the audio file.
    pub path: Option<PathBuf>,
    /// Size of the audio file, in bytes.
    pub size: Option<u64>,
    /// Duration of the audio, in milliseconds.
    pub duration_ms: Option<u64>,
    /// MIME type of the audio file.
    pub mime_type: Option<String>,

    /// MusicBrainz recording ID, if tagged.
    pub musicbrainz_id: Option<String>,
    /// Song title.
    pub name: Option<String>,
    /// Song sort title.
    pub sort_name: Option<String>,
    /// Track number on its disc.
    pub track: Option<u32>,
    /// Disc number.
    pub disc: Option<u32>,
    /// Disc subtitle.
    pub subtitle: Option<String>,
    /// Release date.
    pub date: Option<Date>,

    /// MusicBrainz release ID, if tagged.
    pub album_musicbrainz_id: Option<String>,
    /// Album name.
    pub album_name: Option<String>,
    /// Album sort name.
    pub album_sort_name: Option<String>,
    /// Release type tags, primary type first.
    pub release_types: Vec<String>,

    /// MusicBrainz artist IDs, aligned with `artist_names`.
    pub artist_musicbrainz_ids: Vec<String>,
    /// Artist names, in tag order.
    pub artist_names: Vec<String>,
    /// Artist sort names, aligned with `artist_names`.
    pub artist_sort_names: Vec<String>,

    /// MusicBrainz album artist IDs, aligned with `album_artist_names`.
    pub album_artist_musicbrainz_ids: Vec<String>,
    /// Album artist names, in tag order.
    pub album_artist_names: Vec<String>,
    /// Album artist sort names, aligned with `album_artist_names`.
    pub album_artist_sort_names: Vec<String>,

    /// Genre names, in tag order.
    pub genre_names: Vec<String>,
}

/// Grouping key for artists.
///
/// With a MusicBrainz ID, the ID alone decides equivalence. Without one,
/// the case-folded name decides, and two missing names are equivalent (all
/// untagged songs share one unknown artist).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtistKey {
    MusicBrainz(Uuid),
    Named(Option<String>),
}

impl ArtistKey {
    pub fn new(musicbrainz_id: Option<Uuid>, name: Option<&str>) -> ArtistKey {
        match musicbrainz_id {
            Some(mbid) => ArtistKey::MusicBrainz(mbid),
            None => ArtistKey::Named(name.map(|n| n.to_lowercase())),
        }
    }
}

/// Grouping key for albums.
///
/// Without a MusicBrainz ID, an album groups by its case-folded name plus
/// its attributed artist list, so same-named albums by different artists
/// stay separate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlbumKey {
    MusicBrainz(Uuid),
    Named {
        name: String,
        artists: Vec<ArtistKey>,
    },
}

impl AlbumKey {
    pub fn new(musicbrainz_id: Option<Uuid>, name: &str, artists: Vec<ArtistKey>) -> AlbumKey {
        match musicbrainz_id {
            Some(mbid) => AlbumKey::MusicBrainz(mbid),
            None => AlbumKey::Named {
                name: name.to_lowercase(),
                artists,
            },
        }
    }
}

/// Grouping key for genres. Only the case-folded, ID3-resolved name; there
/// is no MusicBrainz path for genres.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenreKey(pub Option<String>);

impl GenreKey {
    pub fn new(name: Option<&str>) -> GenreKey {
        GenreKey(name.map(|n| n.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_key_case_insensitive() {
        assert_eq!(
            ArtistKey::new(None, Some("RAMMSTEIN")),
            ArtistKey::new(None, Some("Rammstein"))
        );
    }

    #[test]
    fn test_artist_key_unknown_merges() {
        assert_eq!(ArtistKey::new(None, None), ArtistKey::new(None, None));
    }

    #[test]
    fn test_artist_key_mbid_breaks_name_merge() {
        let mbid = Uuid::parse_str("b1a9c0e9-d987-4042-ae91-78d6a3267d69").unwrap();
        assert_ne!(
            ArtistKey::new(Some(mbid), Some("Rammstein")),
            ArtistKey::new(None, Some("Rammstein"))
        );
    }

    #[test]
    fn test_album_key_includes_artists() {
        let by = |artist: &str| {
            AlbumKey::new(None, "Greatest Hits", vec![ArtistKey::new(None, Some(artist))])
        };
        assert_eq!(by("Queen"), by("QUEEN"));
        assert_ne!(by("Queen"), by("ABBA"));
    }

    #[test]
    fn test_genre_key() {
        assert_eq!(GenreKey::new(Some("Post-Rock")), GenreKey::new(Some("post-rock")));
        assert_ne!(GenreKey::new(Some("Post-Rock")), GenreKey::new(None));
    }
}
