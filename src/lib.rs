//! Folio - Portfolio Builder Core
//!
//! Folio turns a portfolio's editor state into markup and keeps portfolios
//! safe on local storage:
//! 1. Renderer - a pure function from a portfolio to markup, shared by the
//!    live preview and both export formats
//! 2. Export Service - standalone flat documents and paginated documents
//!    with images inlined and fonts loaded
//! 3. Persistence Service - verified saves, version history, undo/redo and
//!    debounced autosave over a key-value store
//!
//! # Architecture
//!
//! The renderer is a leaf with no I/O. The export service reads portfolios
//! through the persistence layer's [`state::PortfolioLibrary`], which is
//! the only writer to the store.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod state;

pub use config::{ExportConfig, FolioConfig, PersistenceConfig};
pub use error::{FolioError, Result};
pub use export::{ExportService, ExportedDocument};
pub use model::{EditorState, Portfolio, PortfolioDraft};
pub use render::render_markup;
pub use state::{KeyValueStore, PersistenceService, PortfolioLibrary, SaveStatus};
