//! The published library snapshot
//!
//! A [`Library`] is the immutable result of one successful pipeline run. It
//! owns every finalized entity in arena storage and indexes them by UID.
//! Libraries are replaced atomically, never mutated in place, so concurrent
//! readers need no locks.

use crate::model::music::{
    Album, AlbumRef, Artist, ArtistRef, Genre, GenreRef, Playlist, Song, SongRef,
};
use crate::model::uid::Uid;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::path::Path;

/// Organized music library information.
///
/// Entity cross-references are handles valid only within the library that
/// produced them; resolve them by indexing (`&library[song.album]`).
#[derive(Clone, PartialEq)]
pub struct Library {
    songs: Vec<Song>,
    albums: Vec<Album>,
    artists: Vec<Artist>,
    genres: Vec<Genre>,
    playlists: Vec<Playlist>,

    song_uids: HashMap<Uid, SongRef>,
    album_uids: HashMap<Uid, AlbumRef>,
    artist_uids: HashMap<Uid, ArtistRef>,
    genre_uids: HashMap<Uid, GenreRef>,
}

impl Library {
    pub(crate) fn new(
        songs: Vec<Song>,
        albums: Vec<Album>,
        artists: Vec<Artist>,
        genres: Vec<Genre>,
        playlists: Vec<Playlist>,
    ) -> Library {
        let song_uids = songs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.uid, SongRef(i)))
            .collect();
        let album_uids = albums
            .iter()
            .enumerate()
            .map(|(i, a)| (a.uid, AlbumRef(i)))
            .collect();
        let artist_uids = artists
            .iter()
            .enumerate()
            .map(|(i, a)| (a.uid, ArtistRef(i)))
            .collect();
        let genre_uids = genres
            .iter()
            .enumerate()
            .map(|(i, g)| (g.uid, GenreRef(i)))
            .collect();
        Library {
            songs,
            albums,
            artists,
            genres,
            playlists,
            song_uids,
            album_uids,
            artist_uids,
            genre_uids,
        }
    }

    /// Attach resolved playlists to a freshly built library.
    pub(crate) fn with_playlists(mut self, playlists: Vec<Playlist>) -> Library {
        self.playlists = playlists;
        self
    }

    /// All songs in this library.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// All albums in this library.
    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    /// All artists in this library.
    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// All genres in this library.
    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// All playlists in this library.
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Find the song with the given UID.
    pub fn find_song(&self, uid: &Uid) -> Option<&Song> {
        self.song_uids.get(uid).map(|r| &self[*r])
    }

    /// Find the album with the given UID.
    pub fn find_album(&self, uid: &Uid) -> Option<&Album> {
        self.album_uids.get(uid).map(|r| &self[*r])
    }

    /// Find the artist with the given UID.
    pub fn find_artist(&self, uid: &Uid) -> Option<&Artist> {
        self.artist_uids.get(uid).map(|r| &self[*r])
    }

    /// Find the genre with the given UID.
    pub fn find_genre(&self, uid: &Uid) -> Option<&Genre> {
        self.genre_uids.get(uid).map(|r| &self[*r])
    }

    /// Find the ref of the song with the given UID.
    pub fn find_song_ref(&self, uid: &Uid) -> Option<SongRef> {
        self.song_uids.get(uid).copied()
    }

    /// Find a song by its file path. Intended for resolving externally
    /// supplied paths back to library entries.
    pub fn find_song_by_path(&self, path: &Path) -> Option<&Song> {
        self.songs
            .iter()
            .find(|s| s.path.as_deref() == Some(path))
    }

    /// True if the library contains no songs.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl Index<SongRef> for Library {
    type Output = Song;

    fn index(&self, index: SongRef) -> &Song {
        &self.songs[index.0]
    }
}

impl Index<AlbumRef> for Library {
    type Output = Album;

    fn index(&self, index: AlbumRef) -> &Album {
        &self.albums[index.0]
    }
}

impl Index<ArtistRef> for Library {
    type Output = Artist;

    fn index(&self, index: ArtistRef) -> &Artist {
        &self.artists[index.0]
    }
}

impl Index<GenreRef> for Library {
    type Output = Genre;

    fn index(&self, index: GenreRef) -> &Genre {
        &self.genres[index.0]
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Library(songs={}, albums={}, artists={}, genres={}, playlists={})",
            self.songs.len(),
            self.albums.len(),
            self.artists.len(),
            self.genres.len(),
            self.playlists.len()
        )
    }
}
