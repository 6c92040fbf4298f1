//! Record source collaborators
//!
//! The indexer never reads tags itself; a [`RecordSource`] hands it raw
//! per-track records, already extracted from whatever backing store the
//! platform provides. Fetching is the only blocking operation in a load and
//! runs on a blocking worker thread.

use crate::model::raw::RawSong;
use crate::model::uid::Uid;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result of the out-of-band permission check consulted before fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Errors a record source can raise while being queried.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying storage failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The fetch observed its cancellation token and gave up early.
    #[error("fetch interrupted")]
    Interrupted,

    /// Source-specific failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One batch of raw records: the total count, known up-front for progress
/// reporting, and a lazy iteration over the records themselves.
///
/// A batch is consumed exactly once per load attempt and is not
/// restartable.
pub struct RecordBatch {
    total: usize,
    records: Box<dyn Iterator<Item = RawSong> + Send>,
}

impl RecordBatch {
    pub fn new(total: usize, records: impl Iterator<Item = RawSong> + Send + 'static) -> Self {
        Self {
            total,
            records: Box::new(records),
        }
    }

    pub fn from_vec(records: Vec<RawSong>) -> Self {
        Self::new(records.len(), records.into_iter())
    }

    /// Number of records this batch will yield.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl IntoIterator for RecordBatch {
    type Item = RawSong;
    type IntoIter = Box<dyn Iterator<Item = RawSong> + Send>;

    fn into_iter(self) -> Self::IntoIter {
        self.records
    }
}

/// A supplier of raw track records.
///
/// `fetch` may block; it is always called from a blocking worker, never
/// from the async runtime. Honoring the cancellation token is optional (a
/// superseded load's results are discarded regardless), but sources doing
/// expensive I/O should check it and bail out with
/// [`SourceError::Interrupted`].
pub trait RecordSource: Send + Sync {
    /// Whether the backing store may be read at all. Consulted before every
    /// fetch.
    fn check_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    /// Query the backing store for one batch of records.
    fn fetch(&self, cancel: &CancellationToken) -> Result<RecordBatch, SourceError>;
}

/// A raw playlist handed over by a [`PlaylistSource`], referencing songs by
/// their UIDs.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlaylist {
    pub name: String,
    pub song_uids: Vec<Uid>,
}

/// A supplier of stored playlists, resolved against each freshly built
/// library. Purely a pass-through collaborator.
pub trait PlaylistSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<RawPlaylist>, SourceError>;
}

/// A fixed in-memory record source, for tests and static collections.
///
/// Unlike a real backing store it is restartable: every fetch yields the
/// same records again.
pub struct VecSource {
    records: Vec<RawSong>,
    permission: PermissionStatus,
}

impl VecSource {
    pub fn new(records: Vec<RawSong>) -> Self {
        Self {
            records,
            permission: PermissionStatus::Granted,
        }
    }

    pub fn denied() -> Self {
        Self {
            records: Vec::new(),
            permission: PermissionStatus::Denied,
        }
    }
}

impl RecordSource for VecSource {
    fn check_permission(&self) -> PermissionStatus {
        self.permission
    }

    fn fetch(&self, _cancel: &CancellationToken) -> Result<RecordBatch, SourceError> {
        Ok(RecordBatch::from_vec(self.records.clone()))
    }
}
