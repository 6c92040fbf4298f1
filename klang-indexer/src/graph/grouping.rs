//! Grouping passes
//!
//! Each pass collapses raw records into equivalence classes keyed by the
//! types in [`crate::model::raw`]. Group order is order of first appearance
//! in the original song order, and the first member seen becomes the
//! template that supplies single-valued fields, so equivalent-but-textually-
//! different raw values resolve deterministically.

use crate::model::raw::{AlbumKey, ArtistKey, GenreKey};
use crate::tag::interpret::{PreAlbum, PreArtist, PreGenre, PreSong};
use std::collections::HashMap;

/// Songs grouped into one album equivalence class.
pub(crate) struct AlbumGroup {
    /// First-seen raw album record; supplies name, sort name, MusicBrainz
    /// ID and release type for the whole group.
    pub template: PreAlbum,
    /// Member songs, as indices into the interpreted song list.
    pub songs: Vec<usize>,
}

/// Credits grouped into one artist equivalence class.
pub(crate) struct ArtistGroup {
    /// First-seen raw credit.
    pub template: PreArtist,
    /// Songs whose own artist tags credit this artist.
    pub songs: Vec<usize>,
    /// Albums (as indices into the album group list) whose attribution
    /// includes this artist.
    pub albums: Vec<usize>,
}

/// Songs grouped into one genre equivalence class.
pub(crate) struct GenreGroup {
    /// First-seen raw genre.
    pub template: PreGenre,
    /// Member songs.
    pub songs: Vec<usize>,
}

/// Group songs into albums by their collated album key.
pub(crate) fn group_albums(songs: &[PreSong]) -> Vec<AlbumGroup> {
    let mut index: HashMap<AlbumKey, usize> = HashMap::new();
    let mut groups: Vec<AlbumGroup> = Vec::new();

    for (i, song) in songs.iter().enumerate() {
        match index.get(&song.album.key()) {
            Some(&at) => groups[at].songs.push(i),
            None => {
                index.insert(song.album.key(), groups.len());
                groups.push(AlbumGroup {
                    template: song.album.clone(),
                    songs: vec![i],
                });
            }
        }
    }

    groups
}

/// Group artist credits from songs and albums into artists.
///
/// Every credit on every song and album lands in the grouping, so
/// multi-artist combinations are never treated as separate artists. Song
/// credits are collected first, album credits second; both use the same
/// key space, which is what merges "artist" and "album artist" identities.
pub(crate) fn group_artists(songs: &[PreSong], albums: &[AlbumGroup]) -> Vec<ArtistGroup> {
    let mut index: HashMap<ArtistKey, usize> = HashMap::new();
    let mut groups: Vec<ArtistGroup> = Vec::new();

    let mut group_at = |index: &mut HashMap<ArtistKey, usize>,
                        groups: &mut Vec<ArtistGroup>,
                        credit: &PreArtist| {
        let key = credit.key();
        match index.get(&key) {
            Some(&at) => at,
            None => {
                index.insert(key, groups.len());
                groups.push(ArtistGroup {
                    template: credit.clone(),
                    songs: Vec::new(),
                    albums: Vec::new(),
                });
                groups.len() - 1
            }
        }
    };

    for (i, song) in songs.iter().enumerate() {
        for credit in &song.artists {
            let at = group_at(&mut index, &mut groups, credit);
            groups[at].songs.push(i);
        }
    }

    for (i, album) in albums.iter().enumerate() {
        for credit in &album.template.artists {
            let at = group_at(&mut index, &mut groups, credit);
            groups[at].albums.push(i);
        }
    }

    groups
}

/// Group songs into genres. A song with several genre tags joins several
/// groups.
pub(crate) fn group_genres(songs: &[PreSong]) -> Vec<GenreGroup> {
    let mut index: HashMap<GenreKey, usize> = HashMap::new();
    let mut groups: Vec<GenreGroup> = Vec::new();

    for (i, song) in songs.iter().enumerate() {
        for genre in &song.genres {
            match index.get(&genre.key()) {
                Some(&at) => groups[at].songs.push(i),
                None => {
                    index.insert(genre.key(), groups.len());
                    groups.push(GenreGroup {
                        template: genre.clone(),
                        songs: vec![i],
                    });
                }
            }
        }
    }

    groups
}
