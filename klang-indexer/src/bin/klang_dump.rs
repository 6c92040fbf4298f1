//! klang-dump - Build a library from a record dump and print it
//!
//! Reads a JSON array of raw song records, runs the full construction
//! pipeline against the user's configuration, and prints the resulting
//! hierarchy. Meant for inspecting how a given set of tags will group,
//! without involving a real record source.
//!
//! Usage: `klang-dump <records.json>`

use anyhow::{Context, Result};
use klang_common::config::KlangConfig;
use klang_indexer::model::raw::RawSong;
use klang_indexer::source::VecSource;
use klang_indexer::{Indexer, LoadOutcome};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let path = std::env::args()
        .nth(1)
        .context("usage: klang-dump <records.json>")?;
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {path}"))?;
    let records: Vec<RawSong> =
        serde_json::from_str(&content).context("failed to parse record dump")?;
    info!("Loaded {} raw records from {path}", records.len());

    let config = KlangConfig::load()?;
    let indexer = Indexer::new(Arc::new(VecSource::new(records)), config);

    let library = match indexer.index().await {
        LoadOutcome::Ok(library) => library,
        LoadOutcome::NoMusic => {
            info!("No music found in the dump");
            return Ok(());
        }
        LoadOutcome::NoPermission => anyhow::bail!("record source denied access"),
        LoadOutcome::Err(e) => anyhow::bail!("load failed: {e}"),
    };

    println!("{library:?}");
    for artist in library.artists() {
        println!(
            "artist: {} ({} songs, {} albums)",
            artist.name,
            artist.songs.len(),
            artist.albums.len()
        );
        for &album in &artist.albums {
            let album = &library[album];
            println!("  album: {} [{}]", album.name, album.release_type);
            for &song in &album.songs {
                let song = &library[song];
                println!(
                    "    {}. {}",
                    song.track.map_or("-".to_string(), |t| t.to_string()),
                    song.name
                );
            }
        }
    }
    for genre in library.genres() {
        println!("genre: {} ({} songs)", genre.name, genre.songs.len());
    }

    Ok(())
}
