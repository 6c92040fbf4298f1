//! Raw record interpretation
//!
//! Turns one [`RawSong`] into a [`PreSong`]: tags normalized, identity
//! hashed, and grouping keys derivable. Records missing the bare essentials
//! (a title, and an album name with no folder to fall back to) are rejected
//! here; partial or sloppy tags are expected at scale and never fail a
//! record.

use crate::model::music::Disc;
use crate::model::raw::{AlbumKey, ArtistKey, GenreKey, RawSong};
use crate::model::uid::{ItemKind, Uid};
use crate::tag::id3::parse_id3_genre_names;
use crate::tag::util::{correct_whitespace_one, parse_multi_value};
use crate::tag::{Date, Name, ReleaseType};
use chrono::{DateTime, Utc};
use klang_common::config::KlangConfig;
use klang_common::uuid_utils;
use std::path::PathBuf;
use uuid::Uuid;

/// A raw artist credit collated from a song's tags.
#[derive(Debug, Clone, PartialEq)]
pub struct PreArtist {
    pub musicbrainz_id: Option<Uuid>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
}

impl PreArtist {
    /// The "unknown artist" placeholder credit.
    pub fn unknown() -> PreArtist {
        PreArtist {
            musicbrainz_id: None,
            name: None,
            sort_name: None,
        }
    }

    pub fn key(&self) -> ArtistKey {
        ArtistKey::new(self.musicbrainz_id, self.name.as_deref())
    }
}

/// The raw album information collated from a song's tags.
#[derive(Debug, Clone, PartialEq)]
pub struct PreAlbum {
    pub musicbrainz_id: Option<Uuid>,
    pub name: String,
    pub sort_name: Option<String>,
    pub release_type: Option<ReleaseType>,
    /// Artist attribution for the album: album artist tags if present, else
    /// the song's own artists, else a single unknown credit.
    pub artists: Vec<PreArtist>,
}

impl PreAlbum {
    pub fn key(&self) -> AlbumKey {
        AlbumKey::new(
            self.musicbrainz_id,
            &self.name,
            self.artists.iter().map(PreArtist::key).collect(),
        )
    }
}

/// A raw genre collated from a song's tags, post-ID3-resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PreGenre {
    pub name: Option<String>,
}

impl PreGenre {
    pub fn key(&self) -> GenreKey {
        GenreKey::new(self.name.as_deref())
    }
}

/// A fully interpreted song record, ready for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct PreSong {
    pub uid: Uid,
    pub name: Name,
    pub track: Option<u32>,
    pub disc: Option<Disc>,
    pub date: Option<Date>,
    pub path: Option<PathBuf>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub duration_ms: u64,
    pub external_id: Option<u64>,
    pub date_added: DateTime<Utc>,

    pub album: PreAlbum,
    /// Artist credits for the song itself, in tag order. The song's own
    /// artist tags are preferred over album artist tags.
    pub artists: Vec<PreArtist>,
    /// Genres, in tag order. Never empty.
    pub genres: Vec<PreGenre>,
}

/// Interprets raw records against one configuration snapshot.
pub struct Interpreter<'a> {
    config: &'a KlangConfig,
}

impl<'a> Interpreter<'a> {
    pub fn new(config: &'a KlangConfig) -> Interpreter<'a> {
        Interpreter { config }
    }

    /// Interpret a raw record, or None if the record is unusable.
    pub fn interpret(&self, raw: &RawSong) -> Option<PreSong> {
        let name = correct_whitespace_one(raw.name.as_deref()?)?;

        // If the metadata did not specify an album, the song's parent
        // folder stands in. A record with neither is unusable.
        let album_name = raw
            .album_name
            .as_deref()
            .and_then(correct_whitespace_one)
            .or_else(|| folder_name(raw.path.as_deref()))?;

        // The UID is computed from the raw tags without any separator
        // parsing, so a song's identity survives configuration changes.
        // Parents are not held to the same standard, since grouping is
        // already inherently tied to the configuration.
        let uid = song_uid(raw, &album_name);

        let individual_artists = self.collate_artists(
            &raw.artist_names,
            &raw.artist_musicbrainz_ids,
            &raw.artist_sort_names,
        );
        let album_artists = self.collate_artists(
            &raw.album_artist_names,
            &raw.album_artist_musicbrainz_ids,
            &raw.album_artist_sort_names,
        );

        // Albums prefer the album artist tags; songs prefer their own
        // artist tags. Both fall back to the other, then to a single
        // unknown credit.
        let album_credit = pick_credits(&album_artists, &individual_artists);
        let song_credit = pick_credits(&individual_artists, &album_artists);

        let release_type =
            ReleaseType::parse(&parse_multi_value(&raw.release_types, self.config));

        let album = PreAlbum {
            musicbrainz_id: raw
                .album_musicbrainz_id
                .as_deref()
                .and_then(uuid_utils::parse_mbid),
            name: album_name,
            sort_name: raw
                .album_sort_name
                .as_deref()
                .and_then(correct_whitespace_one),
            release_type,
            artists: album_credit,
        };

        let genres = self.collate_genres(&raw.genre_names);

        let disc = raw.disc.map(|number| Disc {
            number,
            name: raw.subtitle.as_deref().and_then(correct_whitespace_one),
        });

        Some(PreSong {
            uid,
            name: Name::known(&name, raw.sort_name.as_deref(), self.config),
            track: raw.track,
            disc,
            date: raw.date.clone(),
            path: raw.path.clone(),
            mime_type: raw.mime_type.clone(),
            size: raw.size,
            duration_ms: raw.duration_ms.unwrap_or(0),
            external_id: raw.external_id,
            date_added: raw.date_added.unwrap_or(DateTime::UNIX_EPOCH),
            album,
            artists: song_credit,
            genres,
        })
    }

    /// Build the artist credit list from aligned name/ID/sort-name tags.
    /// Credits that collapse to the same grouping key are deduplicated,
    /// keeping the first occurrence.
    fn collate_artists(
        &self,
        names: &[String],
        musicbrainz_ids: &[String],
        sort_names: &[String],
    ) -> Vec<PreArtist> {
        let names = parse_multi_value(names, self.config);
        let ids = parse_multi_value(musicbrainz_ids, self.config);
        let sorts = parse_multi_value(sort_names, self.config);

        let mut seen = Vec::new();
        let mut artists = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let artist = PreArtist {
                musicbrainz_id: ids.get(i).and_then(|id| uuid_utils::parse_mbid(id)),
                name: Some(name.clone()),
                sort_name: sorts.get(i).cloned(),
            };
            let key = artist.key();
            if !seen.contains(&key) {
                seen.push(key);
                artists.push(artist);
            }
        }
        artists
    }

    /// Build the genre list, resolving ID3 integer forms and deduplicating
    /// equivalent names. Songs without genre tags get the unknown genre.
    fn collate_genres(&self, names: &[String]) -> Vec<PreGenre> {
        let mut seen = Vec::new();
        let mut genres = Vec::new();
        for name in parse_id3_genre_names(names, self.config) {
            let Some(name) = correct_whitespace_one(&name) else {
                continue;
            };
            let genre = PreGenre { name: Some(name) };
            let key = genre.key();
            if !seen.contains(&key) {
                seen.push(key);
                genres.push(genre);
            }
        }
        if genres.is_empty() {
            genres.push(PreGenre { name: None });
        }
        genres
    }
}

/// Compute a song's UID from its raw tags.
fn song_uid(raw: &RawSong, album_name: &str) -> Uid {
    if let Some(mbid) = raw.musicbrainz_id.as_deref().and_then(uuid_utils::parse_mbid) {
        return Uid::musicbrainz(ItemKind::Song, mbid);
    }
    Uid::hashed(ItemKind::Song, |d| {
        d.string(raw.name.as_deref());
        d.string(Some(album_name));
        d.display(raw.date.as_ref().map(|date| date as &dyn std::fmt::Display));
        d.u32(raw.track);
        d.u32(raw.disc);
        d.string_list(&raw.artist_names);
        d.string_list(&raw.album_artist_names);
    })
}

/// Prefer the first non-empty credit list, falling back to a single
/// unknown credit.
fn pick_credits(preferred: &[PreArtist], fallback: &[PreArtist]) -> Vec<PreArtist> {
    if !preferred.is_empty() {
        preferred.to_vec()
    } else if !fallback.is_empty() {
        fallback.to_vec()
    } else {
        vec![PreArtist::unknown()]
    }
}

/// Derive an album name from the song's parent folder.
fn folder_name(path: Option<&std::path::Path>) -> Option<String> {
    let parent = path?.parent()?;
    let name = parent.file_name()?.to_string_lossy();
    correct_whitespace_one(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, album: &str, artist: &str) -> RawSong {
        RawSong {
            name: Some(name.to_string()),
            album_name: Some(album.to_string()),
            artist_names: vec![artist.to_string()],
            ..Default::default()
        }
    }

    fn interpret(raw: &RawSong) -> Option<PreSong> {
        let config = KlangConfig::default();
        Interpreter::new(&config).interpret(raw)
    }

    #[test]
    fn test_essentials() {
        let song = interpret(&raw("Song A", "Demo", "X")).unwrap();
        assert_eq!(song.name.raw(), Some("Song A"));
        assert_eq!(song.album.name, "Demo");
        assert_eq!(song.artists.len(), 1);
        assert_eq!(song.artists[0].name.as_deref(), Some("X"));
    }

    #[test]
    fn test_untitled_record_rejected() {
        let mut record = raw("Song A", "Demo", "X");
        record.name = None;
        assert!(interpret(&record).is_none());
        record.name = Some("   ".to_string());
        assert!(interpret(&record).is_none());
    }

    #[test]
    fn test_album_falls_back_to_folder() {
        let mut record = raw("Song A", "", "X");
        record.album_name = None;
        record.path = Some(PathBuf::from("/music/Demo Tapes/01 Song A.flac"));
        let song = interpret(&record).unwrap();
        assert_eq!(song.album.name, "Demo Tapes");

        record.path = None;
        assert!(interpret(&record).is_none());
    }

    #[test]
    fn test_album_artist_preference() {
        let mut record = raw("Song A", "Comp", "Guest");
        record.album_artist_names = vec!["Curator".to_string()];
        let song = interpret(&record).unwrap();
        assert_eq!(song.artists[0].name.as_deref(), Some("Guest"));
        assert_eq!(song.album.artists[0].name.as_deref(), Some("Curator"));
    }

    #[test]
    fn test_artist_fallbacks() {
        // Songs with only album artists credit those; songs with no artists
        // at all credit the unknown placeholder.
        let mut record = raw("Song A", "Comp", "");
        record.artist_names = vec![];
        record.album_artist_names = vec!["Curator".to_string()];
        let song = interpret(&record).unwrap();
        assert_eq!(song.artists[0].name.as_deref(), Some("Curator"));

        record.album_artist_names = vec![];
        let song = interpret(&record).unwrap();
        assert_eq!(song.artists[0].name, None);
        assert_eq!(song.album.artists[0].name, None);
    }

    #[test]
    fn test_separator_splitting_respects_config() {
        let config = KlangConfig {
            separators: ";".to_string(),
            ..Default::default()
        };
        let record = raw("Song A", "Demo", "B; A");
        let song = Interpreter::new(&config).interpret(&record).unwrap();
        let names: Vec<_> = song
            .artists
            .iter()
            .map(|a| a.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_uid_ignores_separator_config() {
        let record = raw("Song A", "Demo", "B; A");
        let split_config = KlangConfig {
            separators: ";".to_string(),
            ..Default::default()
        };
        let plain = interpret(&record).unwrap();
        let split = Interpreter::new(&split_config).interpret(&record).unwrap();
        assert_eq!(plain.uid, split.uid);
        // Grouping-facing data is allowed to differ.
        assert_ne!(plain.artists.len(), split.artists.len());
    }

    #[test]
    fn test_musicbrainz_uid_priority() {
        let mut record = raw("Song A", "Demo", "X");
        record.musicbrainz_id = Some("b1a9c0e9-d987-4042-ae91-78d6a3267d69".to_string());
        let with_mbid = interpret(&record).unwrap();
        record.musicbrainz_id = None;
        let hashed = interpret(&record).unwrap();
        assert_ne!(with_mbid.uid, hashed.uid);
    }

    #[test]
    fn test_duplicate_credits_deduplicated() {
        let config = KlangConfig {
            separators: ";".to_string(),
            ..Default::default()
        };
        let record = raw("Song A", "Demo", "X; x");
        let song = Interpreter::new(&config).interpret(&record).unwrap();
        assert_eq!(song.artists.len(), 1);
        assert_eq!(song.artists[0].name.as_deref(), Some("X"));
    }

    #[test]
    fn test_unknown_genre_fallback() {
        let song = interpret(&raw("Song A", "Demo", "X")).unwrap();
        assert_eq!(song.genres.len(), 1);
        assert_eq!(song.genres[0].name, None);
    }

    #[test]
    fn test_id3_genre_resolution() {
        let mut record = raw("Song A", "Demo", "X");
        record.genre_names = vec!["17".to_string()];
        let song = interpret(&record).unwrap();
        assert_eq!(song.genres[0].name.as_deref(), Some("Rock"));
    }
}
