//! Indexing coordinator
//!
//! Owns the music loading state machine. Loads run on a background blocking
//! worker; every progress or completion callback carries the generation it
//! was produced under, and the coordinator silently discards anything from
//! a generation that is no longer current. That discard is the sole
//! cancellation mechanism: a superseded load may run to completion, but its
//! results can never reach observers or corrupt the published state.
//!
//! Observers subscribe through an event bus and always see either the
//! in-flight progress or the most recent completion; a failed or canceled
//! reload never blanks out a previously working library.

use crate::error::IndexError;
use crate::graph::{build_library, BuildStats};
use crate::model::library::Library;
use crate::model::music::Playlist;
use crate::model::uid::{ItemKind, Uid};
use crate::source::{PermissionStatus, PlaylistSource, RawPlaylist, RecordSource};
use crate::tag::Name;
use klang_common::config::KlangConfig;
use klang_common::events::EventBus;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Progress of an in-flight load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Progress {
    /// Structural phase; no record count is available yet.
    Indeterminate,
    /// Interpreting records.
    Counted { current: usize, total: usize },
}

/// The outcome of a completed load attempt.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A new library was built and published.
    Ok(Arc<Library>),
    /// No records survived interpretation; there is nothing to index.
    NoMusic,
    /// The record source denied access.
    NoPermission,
    /// The load failed outright.
    Err(Arc<IndexError>),
}

/// Observer-visible indexing state. Observers additionally see `None`
/// before any load has ever started.
#[derive(Debug, Clone)]
pub enum IndexingState {
    /// A load is in flight.
    Indexing(Progress),
    /// The latest load finished. May describe a previous load if the
    /// current one was canceled.
    Completed(LoadOutcome),
}

struct CoordinatorState {
    /// Monotonic load counter. Bumped on every load start and explicit
    /// cancel; anything stamped with an older value is stale.
    generation: u64,
    loading: Option<Progress>,
    last_outcome: Option<LoadOutcome>,
    /// The most recent successfully built library. Unlike `last_outcome`,
    /// this survives failed and canceled reloads.
    last_library: Option<Arc<Library>>,
    cancel: Option<CancellationToken>,
}

struct Shared {
    source: Arc<dyn RecordSource>,
    playlist_source: Option<Arc<dyn PlaylistSource>>,
    config: Mutex<KlangConfig>,
    state: Mutex<CoordinatorState>,
    bus: EventBus<Option<IndexingState>>,
    reindex_tx: mpsc::UnboundedSender<()>,
    reindex_rx: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
}

/// The indexing coordinator. Cheap to clone; all clones share one state
/// machine.
#[derive(Clone)]
pub struct Indexer {
    shared: Arc<Shared>,
}

impl Indexer {
    /// Event bus capacity. Progress is throttled, so a small buffer is
    /// plenty for any observer that keeps up at all.
    const BUS_CAPACITY: usize = 64;

    pub fn new(source: Arc<dyn RecordSource>, config: KlangConfig) -> Indexer {
        let (reindex_tx, reindex_rx) = mpsc::unbounded_channel();
        Indexer {
            shared: Arc::new(Shared {
                source,
                playlist_source: None,
                config: Mutex::new(config),
                state: Mutex::new(CoordinatorState {
                    generation: 0,
                    loading: None,
                    last_outcome: None,
                    last_library: None,
                    cancel: None,
                }),
                bus: EventBus::new(Self::BUS_CAPACITY),
                reindex_tx,
                reindex_rx: Mutex::new(Some(reindex_rx)),
            }),
        }
    }

    /// Attach a playlist source before first use.
    pub fn with_playlists(mut self, playlist_source: Arc<dyn PlaylistSource>) -> Indexer {
        let shared = Arc::get_mut(&mut self.shared)
            .expect("playlist source must be attached before the indexer is shared");
        shared.playlist_source = Some(playlist_source);
        self
    }

    /// Replace the interpretation settings. Takes effect at the next load
    /// start; an in-flight load keeps its snapshot.
    pub fn set_config(&self, config: KlangConfig) {
        *self.shared.config.lock().unwrap() = config;
    }

    /// Subscribe to indexing state changes.
    ///
    /// Returns the current state (`None` if nothing was ever loaded and
    /// nothing is loading) plus a receiver for every future change.
    pub fn subscribe(
        &self,
    ) -> (
        Option<IndexingState>,
        broadcast::Receiver<Option<IndexingState>>,
    ) {
        let (current, rx) = self.shared.bus.subscribe();
        (current.flatten(), rx)
    }

    /// Take the controller role.
    ///
    /// There is at most one controller; taking the role twice is a
    /// programming error and panics.
    pub fn controller(&self) -> Controller {
        let rx = self
            .shared
            .reindex_rx
            .lock()
            .unwrap()
            .take()
            .expect("indexer controller role was already taken");
        Controller {
            indexer: self.clone(),
            reindex_rx: rx,
        }
    }

    /// Ask the controller to reindex. Fire-and-forget; usable from any
    /// component that cannot drive loads itself.
    pub fn request_reindex(&self) {
        let _ = self.shared.reindex_tx.send(());
    }

    /// Cancel the in-flight load, if any, by making it unable to publish
    /// further state. Observers revert to the previous completion.
    pub fn cancel(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.generation += 1;
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        state.loading = None;
        debug!("Canceled load, now at generation {}", state.generation);
        let visible = state.last_outcome.clone().map(IndexingState::Completed);
        self.shared.bus.emit(visible);
    }

    /// The most recent successfully built library, regardless of how later
    /// loads fared.
    pub fn current_library(&self) -> Option<Arc<Library>> {
        self.shared.state.lock().unwrap().last_library.clone()
    }

    /// Run one load to completion.
    ///
    /// Starting a load supersedes any load already in flight: the older
    /// generation's callbacks are discarded from this point on. The
    /// returned outcome is also delivered to observers (unless this load
    /// itself got superseded meanwhile).
    pub async fn index(&self) -> LoadOutcome {
        let (generation, cancel) = {
            let mut state = self.shared.state.lock().unwrap();
            state.generation += 1;
            if let Some(previous) = state.cancel.take() {
                previous.cancel();
            }
            let token = CancellationToken::new();
            state.cancel = Some(token.clone());
            (state.generation, token)
        };
        let config = self.shared.config.lock().unwrap().clone();
        let start = Instant::now();
        debug!("Starting load generation {generation}");

        if self.shared.source.check_permission() == PermissionStatus::Denied {
            warn!("Record source denied access");
            let outcome = LoadOutcome::NoPermission;
            self.shared.emit_completion(outcome.clone(), generation);
            return outcome;
        }

        self.shared
            .emit_loading(Some(Progress::Indeterminate), generation);

        let shared = Arc::clone(&self.shared);
        let result = tokio::task::spawn_blocking(move || {
            shared.load_blocking(generation, &config, &cancel)
        })
        .await;

        let outcome = match result {
            Ok(Ok(library)) if library.is_empty() => {
                info!("No music found");
                LoadOutcome::NoMusic
            }
            Ok(Ok(library)) => {
                info!(
                    "Load generation {generation} completed successfully in {}ms",
                    start.elapsed().as_millis()
                );
                LoadOutcome::Ok(library)
            }
            Ok(Err(e)) => {
                error!("Load generation {generation} failed: {e}");
                LoadOutcome::Err(Arc::new(e))
            }
            Err(join_error) => {
                error!("Load generation {generation} worker died: {join_error}");
                LoadOutcome::Err(Arc::new(IndexError::Source(
                    anyhow::anyhow!("load worker died: {join_error}").into(),
                )))
            }
        };

        self.shared.emit_completion(outcome.clone(), generation);
        outcome
    }
}

impl Shared {
    /// Publish in-flight progress, unless it is stale.
    fn emit_loading(&self, loading: Option<Progress>, generation: u64) {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!("Discarding stale progress from generation {generation}");
            return;
        }
        state.loading = loading;
        // With no load in flight, observers see the previous completion
        // (if any) to keep the visible state consistent.
        let visible = match state.loading {
            Some(progress) => Some(IndexingState::Indexing(progress)),
            None => state.last_outcome.clone().map(IndexingState::Completed),
        };
        self.bus.emit(visible);
    }

    /// Publish a completion, unless it is stale.
    fn emit_completion(&self, outcome: LoadOutcome, generation: u64) {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!("Discarding stale completion from generation {generation}");
            return;
        }
        state.loading = None;
        state.cancel = None;
        if let LoadOutcome::Ok(library) = &outcome {
            state.last_library = Some(Arc::clone(library));
        }
        state.last_outcome = Some(outcome.clone());
        self.bus.emit(Some(IndexingState::Completed(outcome)));
    }

    /// The blocking part of a load: fetch, interpret, group, link, resolve
    /// playlists.
    fn load_blocking(
        &self,
        generation: u64,
        config: &KlangConfig,
        cancel: &CancellationToken,
    ) -> Result<Arc<Library>, IndexError> {
        let batch = self.source.fetch(cancel)?;
        let total = batch.total();

        // Progress is throttled to roughly one update per percent; anything
        // finer is noise that just contends on the state lock.
        let stride = (total / 100).max(1);
        let (library, stats) =
            build_library(batch.into_iter(), total, config, |current, total| {
                if current % stride == 0 || current == total {
                    self.emit_loading(Some(Progress::Counted { current, total }), generation);
                }
            })?;
        log_drops(&stats);

        let library = match &self.playlist_source {
            Some(source) if !library.is_empty() => {
                let raw = source.fetch()?;
                resolve_playlists(library, raw, config)
            }
            _ => library,
        };

        Ok(Arc::new(library))
    }
}

/// The privileged handle that drives load decisions. Only one exists per
/// indexer.
pub struct Controller {
    indexer: Indexer,
    reindex_rx: mpsc::UnboundedReceiver<()>,
}

impl Controller {
    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    /// Run one load to completion. See [`Indexer::index`].
    pub async fn index(&self) -> LoadOutcome {
        self.indexer.index().await
    }

    /// Wait until some component requests a reindex. Bursts of requests
    /// are coalesced into one.
    pub async fn reindex_requested(&mut self) {
        if self.reindex_rx.recv().await.is_some() {
            while self.reindex_rx.try_recv().is_ok() {}
        }
    }
}

/// Resolve raw playlists against a freshly built library. Entries whose
/// songs did not make it into the library are dropped.
fn resolve_playlists(
    library: Library,
    raw: Vec<RawPlaylist>,
    config: &KlangConfig,
) -> Library {
    let playlists = raw
        .into_iter()
        .map(|playlist| {
            let mut songs = Vec::with_capacity(playlist.song_uids.len());
            let mut duration_ms = 0;
            for uid in &playlist.song_uids {
                match library.find_song_ref(uid) {
                    Some(song) => {
                        duration_ms += library[song].duration_ms;
                        songs.push(song);
                    }
                    None => {
                        warn!(
                            "Playlist {:?} references song {uid} not in the library",
                            playlist.name
                        );
                    }
                }
            }
            Playlist {
                uid: Uid::hashed(ItemKind::Playlist, |d| d.string(Some(&playlist.name))),
                name: Name::known(&playlist.name, None, config),
                songs,
                duration_ms,
            }
        })
        .collect();
    library.with_playlists(playlists)
}

fn log_drops(stats: &BuildStats) {
    if stats.dropped_records > 0 {
        info!(
            "Dropped {} of {} records as unusable",
            stats.dropped_records, stats.total_records
        );
    }
    if stats.duplicate_songs > 0 {
        info!("Dropped {} duplicate songs", stats.duplicate_songs);
    }
}
