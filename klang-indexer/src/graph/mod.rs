//! Library graph construction
//!
//! Takes interpreted song records through the three grouping passes
//! (songs → albums, albums → artists, songs → genres), links the resulting
//! graph in both directions, validates it, and assembles the final
//! [`Library`].

mod grouping;
mod linker;

use crate::error::IndexError;
use crate::model::library::Library;
use crate::model::raw::RawSong;
use crate::model::uid::Uid;
use crate::tag::interpret::{Interpreter, PreSong};
use klang_common::config::KlangConfig;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Counters describing what one build consumed and discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Raw records pulled from the source.
    pub total_records: usize,
    /// Records dropped as unusable during interpretation.
    pub dropped_records: usize,
    /// Records dropped because another record produced the same song UID.
    pub duplicate_songs: usize,
}

/// Run the full construction pipeline over raw records.
///
/// `total` is the record count reported by the source; `on_progress` is
/// invoked as `(current, total)` while records are interpreted. The
/// returned library has no playlists attached. Pure CPU work; the only
/// failure mode is a graph invariant violation, which indicates a grouping
/// bug rather than bad input.
pub fn build_library(
    records: impl Iterator<Item = RawSong>,
    total: usize,
    config: &KlangConfig,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<(Library, BuildStats), IndexError> {
    let start = Instant::now();
    let mut stats = BuildStats::default();

    // Interpret and deduplicate. Two records hashing to the same UID are
    // metadata-identical clones; the first one wins.
    let interpreter = Interpreter::new(config);
    let mut uids: HashSet<Uid> = HashSet::new();
    let mut songs: Vec<PreSong> = Vec::new();
    for raw in records {
        stats.total_records += 1;
        on_progress(stats.total_records, total);
        match interpreter.interpret(&raw) {
            Some(song) => {
                if uids.insert(song.uid) {
                    songs.push(song);
                } else {
                    debug!("Duplicate song dropped: {}", song.name);
                    stats.duplicate_songs += 1;
                }
            }
            None => {
                debug!("Unusable record dropped: {:?}", raw.path);
                stats.dropped_records += 1;
            }
        }
    }
    debug!(
        "Interpreted {} songs ({} dropped, {} duplicates) in {}ms",
        songs.len(),
        stats.dropped_records,
        stats.duplicate_songs,
        start.elapsed().as_millis()
    );

    let link_start = Instant::now();
    let album_groups = grouping::group_albums(&songs);
    let genre_groups = grouping::group_genres(&songs);
    let artist_groups = grouping::group_artists(&songs, &album_groups);
    debug!(
        "Grouped {} albums, {} artists, {} genres",
        album_groups.len(),
        artist_groups.len(),
        genre_groups.len()
    );

    let library = linker::link(songs, album_groups, artist_groups, genre_groups, config)?;
    debug!("Linked library in {}ms", link_start.elapsed().as_millis());

    info!(
        "Built {:?} from {} records in {}ms",
        library,
        stats.total_records,
        start.elapsed().as_millis()
    );
    Ok((library, stats))
}
