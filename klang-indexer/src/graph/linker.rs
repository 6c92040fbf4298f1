//! Graph linking and finalization
//!
//! Phase 1 constructs each parent entity (Album/Artist/Genre) directly from
//! its grouping; the parent is the sole constructor of the back-reference.
//! Phase 2 writes the parent references into each song in *original tag
//! order* (not grouping insertion order), derives the ranked collections,
//! and validates the completeness invariants.
//!
//! Any validation failure here means the grouping passes produced a
//! malformed graph. That is an internal defect: the load is aborted rather
//! than silently dropping entities.

use crate::error::IndexError;
use crate::graph::grouping::{AlbumGroup, ArtistGroup, GenreGroup};
use crate::model::library::Library;
use crate::model::music::{
    Album, AlbumRef, Artist, ArtistRef, Genre, GenreRef, Song, SongRef,
};
use crate::model::raw::{ArtistKey, GenreKey};
use crate::model::uid::{ItemKind, Uid};
use crate::tag::interpret::{PreAlbum, PreArtist, PreSong};
use crate::tag::name::Placeholder;
use crate::tag::{DateRange, Name};
use chrono::{DateTime, Utc};
use klang_common::config::KlangConfig;
use std::collections::HashMap;

/// Link grouped records into a finalized library (without playlists).
pub(crate) fn link(
    songs: Vec<PreSong>,
    album_groups: Vec<AlbumGroup>,
    artist_groups: Vec<ArtistGroup>,
    genre_groups: Vec<GenreGroup>,
    config: &KlangConfig,
) -> Result<Library, IndexError> {
    // --- Phase 1: construct parents with their child references. ---

    let mut song_album: Vec<Option<AlbumRef>> = vec![None; songs.len()];
    let mut albums: Vec<Album> = Vec::with_capacity(album_groups.len());
    for (i, group) in album_groups.iter().enumerate() {
        if group.songs.is_empty() {
            return Err(IndexError::GraphInvariant(format!(
                "album {:?} owns no songs",
                group.template.name
            )));
        }

        let mut duration_ms = 0;
        let mut dates: Option<DateRange> = None;
        let mut date_added: Option<DateTime<Utc>> = None;
        for &s in &group.songs {
            let song = &songs[s];
            duration_ms += song.duration_ms;
            if let Some(date) = &song.date {
                match &mut dates {
                    Some(range) => range.expand(date),
                    None => dates = Some(DateRange::point(date.clone())),
                }
            }
            date_added = Some(date_added.map_or(song.date_added, |a| a.min(song.date_added)));
            song_album[s] = Some(AlbumRef(i));
        }

        let template = &group.template;
        albums.push(Album {
            uid: album_uid(template),
            name: Name::known(&template.name, template.sort_name.as_deref(), config),
            release_type: template.release_type.unwrap_or_default(),
            dates,
            duration_ms,
            date_added: date_added.unwrap_or(DateTime::UNIX_EPOCH),
            artists: Vec::new(), // filled in phase 2
            songs: group.songs.iter().map(|&s| SongRef(s)).collect(),
        });
    }

    let mut genre_index: HashMap<GenreKey, GenreRef> = HashMap::new();
    let mut genres: Vec<Genre> = Vec::with_capacity(genre_groups.len());
    for group in &genre_groups {
        if group.songs.is_empty() {
            return Err(IndexError::GraphInvariant(format!(
                "genre {:?} owns no songs",
                group.template.name
            )));
        }

        let name = group.template.name.as_deref();
        genre_index.insert(group.template.key(), GenreRef(genres.len()));
        genres.push(Genre {
            uid: Uid::hashed(ItemKind::Genre, |d| d.string(name)),
            name: Name::known_or(name, None, Placeholder::Genre, config),
            songs: group.songs.iter().map(|&s| SongRef(s)).collect(),
            albums: Vec::new(),  // ranked in phase 2
            artists: Vec::new(), // ranked in phase 2
            duration_ms: group.songs.iter().map(|&s| songs[s].duration_ms).sum(),
        });
    }

    let mut artist_index: HashMap<ArtistKey, ArtistRef> = HashMap::new();
    let mut artists: Vec<Artist> = Vec::with_capacity(artist_groups.len());
    for group in &artist_groups {
        if group.songs.is_empty() && group.albums.is_empty() {
            return Err(IndexError::GraphInvariant(format!(
                "artist {:?} owns no songs and no albums",
                group.template.name
            )));
        }

        let template = &group.template;
        artist_index.insert(template.key(), ArtistRef(artists.len()));
        artists.push(Artist {
            uid: artist_uid(template),
            name: Name::known_or(
                template.name.as_deref(),
                template.sort_name.as_deref(),
                Placeholder::Artist,
                config,
            ),
            songs: group.songs.iter().map(|&s| SongRef(s)).collect(),
            albums: group.albums.iter().map(|&a| AlbumRef(a)).collect(),
            genres: Vec::new(), // ranked in phase 2
            duration_ms: group.songs.iter().map(|&s| songs[s].duration_ms).sum(),
        });
    }

    // --- Phase 2: back-references in original tag order. ---

    // Each song's parent lists mirror the ordering of its raw tag values,
    // resolved through the grouping keys.
    let song_artist_refs: Vec<Vec<ArtistRef>> = songs
        .iter()
        .map(|song| resolve_credits(&song.artists, &artist_index, &song.name))
        .collect::<Result<_, _>>()?;
    let song_genre_refs: Vec<Vec<GenreRef>> = songs
        .iter()
        .map(|song| {
            song.genres
                .iter()
                .map(|genre| {
                    genre_index.get(&genre.key()).copied().ok_or_else(|| {
                        IndexError::GraphInvariant(format!(
                            "song {} references unknown genre {:?}",
                            song.name, genre.name
                        ))
                    })
                })
                .collect()
        })
        .collect::<Result<_, _>>()?;

    for (i, group) in album_groups.iter().enumerate() {
        let resolved = resolve_credits(&group.template.artists, &artist_index, &albums[i].name)?;
        albums[i].artists = resolved;
    }

    // Artist genres, ranked by how many of the artist's songs carry each
    // genre; ties resolve by genre name.
    for artist in &mut artists {
        let mut counts: HashMap<GenreRef, usize> = HashMap::new();
        let mut ordered: Vec<GenreRef> = Vec::new();
        for song in &artist.songs {
            for &genre in &song_genre_refs[song.0] {
                if *counts.entry(genre).and_modify(|c| *c += 1).or_insert(1) == 1 {
                    ordered.push(genre);
                }
            }
        }
        ordered.sort_by(|a, b| {
            counts[b]
                .cmp(&counts[a])
                .then_with(|| genres[a.0].name.cmp(&genres[b.0].name))
        });
        artist.genres = ordered;
    }

    // Genre albums/artists, ranked by how many of the genre's songs touch
    // each; ties keep first-appearance order.
    for genre in &mut genres {
        let mut album_counts: HashMap<AlbumRef, usize> = HashMap::new();
        let mut album_order: Vec<AlbumRef> = Vec::new();
        let mut artist_counts: HashMap<ArtistRef, usize> = HashMap::new();
        let mut artist_order: Vec<ArtistRef> = Vec::new();

        for song in &genre.songs {
            let album = song_album[song.0].ok_or_else(|| {
                IndexError::GraphInvariant(format!("song #{} has no album", song.0))
            })?;
            if *album_counts.entry(album).and_modify(|c| *c += 1).or_insert(1) == 1 {
                album_order.push(album);
            }
            for &artist in &song_artist_refs[song.0] {
                if *artist_counts.entry(artist).and_modify(|c| *c += 1).or_insert(1) == 1 {
                    artist_order.push(artist);
                }
            }
        }

        album_order.sort_by(|a, b| album_counts[b].cmp(&album_counts[a]));
        artist_order.sort_by(|a, b| artist_counts[b].cmp(&artist_counts[a]));
        genre.albums = album_order;
        genre.artists = artist_order;
    }

    // --- Assemble final songs and validate. ---

    let finalized: Vec<Song> = songs
        .into_iter()
        .enumerate()
        .map(|(i, song)| {
            let album = song_album[i].ok_or_else(|| {
                IndexError::GraphInvariant(format!("song {} has no album", song.name))
            })?;
            let artists = song_artist_refs[i].clone();
            let genres = song_genre_refs[i].clone();
            if artists.is_empty() {
                return Err(IndexError::GraphInvariant(format!(
                    "song {} has no artists",
                    song.name
                )));
            }
            if genres.is_empty() {
                return Err(IndexError::GraphInvariant(format!(
                    "song {} has no genres",
                    song.name
                )));
            }
            Ok(Song {
                uid: song.uid,
                name: song.name,
                track: song.track,
                disc: song.disc,
                date: song.date,
                path: song.path,
                mime_type: song.mime_type,
                size: song.size,
                duration_ms: song.duration_ms,
                external_id: song.external_id,
                date_added: song.date_added,
                album,
                artists,
                genres,
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(Library::new(finalized, albums, artists, genres, Vec::new()))
}

/// Resolve a raw credit list to artist refs, preserving tag order.
fn resolve_credits(
    credits: &[PreArtist],
    artist_index: &HashMap<ArtistKey, ArtistRef>,
    owner: &Name,
) -> Result<Vec<ArtistRef>, IndexError> {
    credits
        .iter()
        .map(|credit| {
            artist_index.get(&credit.key()).copied().ok_or_else(|| {
                IndexError::GraphInvariant(format!(
                    "{} references unknown artist {:?}",
                    owner, credit.name
                ))
            })
        })
        .collect()
}

fn album_uid(template: &PreAlbum) -> Uid {
    if let Some(mbid) = template.musicbrainz_id {
        return Uid::musicbrainz(ItemKind::Album, mbid);
    }
    // Hash only names despite the presence of a date, for stability across
    // metadata quirks.
    Uid::hashed(ItemKind::Album, |d| {
        d.string(Some(&template.name));
        d.u32(Some(template.artists.len() as u32));
        for artist in &template.artists {
            d.string(artist.name.as_deref());
        }
    })
}

fn artist_uid(template: &PreArtist) -> Uid {
    if let Some(mbid) = template.musicbrainz_id {
        return Uid::musicbrainz(ItemKind::Artist, mbid);
    }
    Uid::hashed(ItemKind::Artist, |d| d.string(template.name.as_deref()))
}
