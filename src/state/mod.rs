//! State Management Module
//!
//! Key-value storage backends, the portfolio library with its version
//! histories, undo/redo, debounced autosave, save status and the live
//! editing session that ties them together.

pub mod autosave;
pub mod library;
pub mod session;
pub mod status;
pub mod storage;
pub mod store;
pub mod undo;
pub mod versions;

pub use autosave::{AutosaveScheduler, DEFAULT_AUTOSAVE_DELAY_MS};
pub use library::{PortfolioLibrary, COPY_SUFFIX};
pub use session::{AutosaveRequest, LoadGuard, PersistenceService, SessionPhase};
pub use status::{SaveStatus, StatusTracker};
pub use storage::{check_storage_health, storage_usage, StorageUsage};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use undo::{UndoEntry, UndoManager, DEFAULT_MAX_UNDO_LEVELS};
pub use versions::{VersionHistory, VersionSnapshot, DEFAULT_MAX_VERSIONS};
