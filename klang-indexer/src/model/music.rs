//! Final music entities
//!
//! These are the immutable, fully-linked values published inside a
//! [`crate::model::library::Library`]. Parent/child references are typed
//! indices into the owning library's arenas; resolve them through the
//! library's `Index` implementations.

use crate::model::uid::Uid;
use crate::tag::{Date, DateRange, Name, ReleaseType};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Handle to a [`Song`] within its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongRef(pub(crate) usize);

/// Handle to an [`Album`] within its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlbumRef(pub(crate) usize);

/// Handle to an [`Artist`] within its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtistRef(pub(crate) usize);

/// Handle to a [`Genre`] within its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenreRef(pub(crate) usize);

/// A disc number with an optional subtitle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Disc {
    pub number: u32,
    pub name: Option<String>,
}

/// A song.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub uid: Uid,
    /// Always a known name; untitled records are dropped during
    /// interpretation.
    pub name: Name,
    /// The track number, if a valid one was present in the metadata.
    pub track: Option<u32>,
    /// The disc, if a valid disc number was present in the metadata.
    pub disc: Option<Disc>,
    /// The release date, if a valid one was present in the metadata.
    pub date: Option<Date>,
    /// Path to the audio file, if the source exposes one.
    pub path: Option<PathBuf>,
    /// MIME type of the audio file. Only intended for display.
    pub mime_type: Option<String>,
    /// Size of the audio file, in bytes.
    pub size: Option<u64>,
    /// Duration of the audio, in milliseconds.
    pub duration_ms: u64,
    /// Source-assigned id usable for URI resolution, if any.
    pub external_id: Option<u64>,
    /// When the song was added to the collection. The unix epoch if the
    /// source never said.
    pub date_added: DateTime<Utc>,

    /// The one album this song belongs to.
    pub album: AlbumRef,
    /// The artists credited on this song, in original tag order.
    pub artists: Vec<ArtistRef>,
    /// The genres of this song, in original tag order.
    pub genres: Vec<GenreRef>,
}

/// An abstract release group: albums proper, but also singles, EPs,
/// compilations and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub uid: Uid,
    /// Always a known name; songs without one fall back to their folder.
    pub name: Name,
    /// What kind of release this is.
    pub release_type: ReleaseType,
    /// The span of release dates of the songs on this album.
    pub dates: Option<DateRange>,
    /// Total duration of the album's songs, in milliseconds.
    pub duration_ms: u64,
    /// The earliest time a song on this album was added.
    pub date_added: DateTime<Utc>,

    /// The artists attributed to this album, in original tag order. Album
    /// artist tags are preferred over the songs' own artist tags.
    pub artists: Vec<ArtistRef>,
    /// The songs on this album. Never empty.
    pub songs: Vec<SongRef>,
}

/// An artist: the merged identity behind both "artist" and "album artist"
/// credits.
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub uid: Uid,
    /// The artist name, or a placeholder if every credit was untagged.
    pub name: Name,
    /// Songs directly crediting this artist via an artist tag.
    pub songs: Vec<SongRef>,
    /// Albums whose artist attribution includes this artist.
    pub albums: Vec<AlbumRef>,
    /// Genres of the owned songs, ranked by song count descending.
    pub genres: Vec<GenreRef>,
    /// Total duration of the owned songs, in milliseconds.
    pub duration_ms: u64,
}

impl Artist {
    /// True if this artist only ever appears on other artists' albums
    /// (session musicians, featured guests).
    pub fn is_collaborator(&self) -> bool {
        self.albums.is_empty()
    }
}

/// A genre.
#[derive(Debug, Clone, PartialEq)]
pub struct Genre {
    pub uid: Uid,
    /// The genre name, or a placeholder for untagged songs.
    pub name: Name,
    /// The songs in this genre. Never empty.
    pub songs: Vec<SongRef>,
    /// Albums reached through the owned songs, ranked by how many of this
    /// genre's songs each contains.
    pub albums: Vec<AlbumRef>,
    /// Artists reached through the owned songs, ranked by how many of this
    /// genre's songs each is credited on.
    pub artists: Vec<ArtistRef>,
    /// Total duration of the owned songs, in milliseconds.
    pub duration_ms: u64,
}

/// A playlist, passed through from a playlist source and resolved against
/// the built library.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub uid: Uid,
    pub name: Name,
    /// Member songs in playlist order. May be empty.
    pub songs: Vec<SongRef>,
    /// Total duration of the member songs, in milliseconds.
    pub duration_ms: u64,
}
