//! Live editing session.
//!
//! [`PersistenceService`] owns the one live [`EditorState`] together with
//! its undo history, the autosave slot and the current portfolio id. It is
//! a cheap clonable handle; every clone drives the same session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::PersistenceConfig;
use crate::error::Result;
use crate::model::{
    BlockEntry, CustomBlock, EditorState, GlobalTheme, Page, Portfolio, PortfolioDraft,
    PortfolioItem,
};
use crate::render::render_markup;
use crate::state::autosave::AutosaveScheduler;
use crate::state::library::PortfolioLibrary;
use crate::state::status::SaveStatus;
use crate::state::store::KeyValueStore;
use crate::state::undo::UndoManager;
use crate::state::versions::VersionSnapshot;

/// Whether the session accepts autosaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    /// A portfolio is being applied; autosaves are rejected.
    Loading,
}

/// Outcome of an autosave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveRequest {
    Scheduled,
    /// Rejected because a load is in progress or autosave is off.
    Suppressed,
}

#[derive(Debug)]
struct LiveSession {
    loading_depth: usize,
    autosave_enabled: bool,
    current_id: Option<String>,
    title: String,
    state: EditorState,
    global_theme: Option<GlobalTheme>,
    pages: Vec<Page>,
    blocks: Vec<BlockEntry>,
    undo: UndoManager,
}

impl LiveSession {
    fn phase(&self) -> SessionPhase {
        if self.loading_depth > 0 {
            SessionPhase::Loading
        } else {
            SessionPhase::Editing
        }
    }

    fn draft(&self) -> PortfolioDraft {
        PortfolioDraft {
            id: self.current_id.clone(),
            title: self.title.clone(),
            editor_state: self.state.clone(),
            global_theme: self.global_theme.clone(),
            pages: self.pages.clone(),
            blocks: self.blocks.clone(),
        }
    }
}

struct Inner {
    library: Arc<PortfolioLibrary>,
    autosave: AutosaveScheduler,
    session: Mutex<LiveSession>,
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, LiveSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Body of a fired autosave. The phase is checked again because the
    /// session may have started loading after the save was scheduled.
    fn commit_autosave(&self, mut draft: PortfolioDraft) {
        let mut session = self.session();
        if session.phase() == SessionPhase::Loading || !session.autosave_enabled {
            tracing::debug!("autosave dropped at commit time");
            return;
        }
        // The id is resolved now: an explicit save may have assigned one
        // while this autosave was waiting.
        if draft.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            draft.id = session.current_id.clone();
        }
        match self.library.save(draft, false) {
            Ok(saved) => {
                tracing::debug!(id = %saved.id, version = %saved.version, "autosave committed");
                session.current_id = Some(saved.id);
            }
            Err(e) => tracing::warn!(error = %e, "autosave failed"),
        }
    }
}

/// Handle to the persistence layer and its live session.
#[derive(Clone)]
pub struct PersistenceService {
    inner: Arc<Inner>,
}

/// Keeps the session in [`SessionPhase::Loading`] until dropped.
pub struct LoadGuard {
    inner: Arc<Inner>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        let mut session = self.inner.session();
        session.loading_depth = session.loading_depth.saturating_sub(1);
    }
}

impl PersistenceService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, &PersistenceConfig::default())
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, config: &PersistenceConfig) -> Self {
        let library = Arc::new(PortfolioLibrary::with_config(store, config));
        Self {
            inner: Arc::new(Inner {
                library,
                autosave: AutosaveScheduler::new(config.autosave_delay()),
                session: Mutex::new(LiveSession {
                    loading_depth: 0,
                    autosave_enabled: true,
                    current_id: None,
                    title: String::new(),
                    state: EditorState::default(),
                    global_theme: None,
                    pages: Vec::new(),
                    blocks: Vec::new(),
                    undo: UndoManager::new(config.max_undo_levels),
                }),
            }),
        }
    }

    pub fn library(&self) -> &Arc<PortfolioLibrary> {
        &self.inner.library
    }

    // ---- session phase ----

    pub fn phase(&self) -> SessionPhase {
        self.inner.session().phase()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == SessionPhase::Loading
    }

    /// Enter the loading phase. Any waiting autosave is cancelled, not just
    /// suppressed, so it cannot fire once the load has finished.
    pub fn begin_load(&self) -> LoadGuard {
        self.inner.session().loading_depth += 1;
        if self.inner.autosave.cancel() {
            tracing::debug!("pending autosave cancelled by load");
        }
        LoadGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Make `portfolio` the live session. The previous state is discarded
    /// whole, along with its undo history.
    pub fn load_into_editor(&self, portfolio: &Portfolio) -> EditorState {
        let _loading = self.begin_load();
        let mut session = self.inner.session();
        session.state = portfolio.editor_state.clone();
        session.title = portfolio.title.clone();
        session.current_id = Some(portfolio.id.clone());
        session.global_theme = portfolio.global_theme.clone();
        session.pages = portfolio.pages.clone();
        session.blocks = portfolio.blocks.clone();
        session.undo.clear();
        self.inner.library.set_status(SaveStatus::Saved);
        tracing::info!(id = %portfolio.id, "portfolio loaded into editor");
        session.state.clone()
    }

    /// Start an empty, unsaved session.
    pub fn new_portfolio(&self, title: impl Into<String>) {
        let _loading = self.begin_load();
        let mut session = self.inner.session();
        session.state = EditorState::default();
        session.title = title.into();
        session.current_id = None;
        session.global_theme = None;
        session.pages.clear();
        session.blocks.clear();
        session.undo.clear();
    }

    // ---- live state ----

    pub fn editor_state(&self) -> EditorState {
        self.inner.session().state.clone()
    }

    pub fn title(&self) -> String {
        self.inner.session().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let mut session = self.inner.session();
        session.title = title.into();
        self.mark_unsaved_locked(&session);
    }

    pub fn current_id(&self) -> Option<String> {
        self.inner.session().current_id.clone()
    }

    /// The live session as a draft ready to save.
    pub fn current_draft(&self) -> PortfolioDraft {
        self.inner.session().draft()
    }

    /// Render the live state with the same renderer exports use.
    pub fn render_preview(&self) -> String {
        let draft = self.current_draft();
        let preview = Portfolio {
            id: draft.id.unwrap_or_default(),
            title: draft.title,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            version: String::new(),
            editor_state: draft.editor_state,
            global_theme: draft.global_theme,
            pages_count: draft.pages.len().max(1),
            blocks_count: draft.blocks.len(),
            pages: draft.pages,
            blocks: draft.blocks,
        };
        render_markup(&preview)
    }

    /// Replace the live state.
    ///
    /// Outside a load the previous state goes onto the undo stack, the redo
    /// stack is cleared and the session becomes unsaved. During a load the
    /// state is replaced silently.
    pub fn apply_edit(&self, description: impl Into<String>, state: EditorState) {
        let mut session = self.inner.session();
        if session.phase() == SessionPhase::Loading {
            session.state = state;
            return;
        }
        let previous = std::mem::replace(&mut session.state, state);
        session.undo.record(description, previous);
        self.mark_unsaved_locked(&session);
    }

    /// Edit through a closure over a copy of the live state.
    pub fn update<F>(&self, description: impl Into<String>, edit: F)
    where
        F: FnOnce(&mut EditorState),
    {
        let mut state = self.editor_state();
        edit(&mut state);
        self.apply_edit(description, state);
    }

    pub fn items(&self) -> Vec<PortfolioItem> {
        self.inner.session().state.items.clone()
    }

    pub fn set_items(&self, items: Vec<PortfolioItem>) {
        self.update("edit work items", |s| s.items = items);
    }

    pub fn custom_blocks(&self) -> Vec<CustomBlock> {
        self.inner.session().state.custom_blocks.clone()
    }

    pub fn set_custom_blocks(&self, blocks: Vec<CustomBlock>) {
        self.update("edit custom blocks", |s| s.custom_blocks = blocks);
    }

    /// Step back one edit. `false` when there is nothing to undo.
    pub fn undo(&self) -> bool {
        let mut session = self.inner.session();
        let current = session.state.clone();
        match session.undo.undo(current) {
            Some(previous) => {
                session.state = previous;
                self.mark_unsaved_locked(&session);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone edit. `false` when there is nothing to redo.
    pub fn redo(&self) -> bool {
        let mut session = self.inner.session();
        let current = session.state.clone();
        match session.undo.redo(current) {
            Some(next) => {
                session.state = next;
                self.mark_unsaved_locked(&session);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.inner.session().undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.session().undo.can_redo()
    }

    // ---- status ----

    pub fn status(&self) -> SaveStatus {
        self.inner.library.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.library.subscribe_status()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.status() == SaveStatus::Unsaved
    }

    /// No effect while loading.
    pub fn mark_unsaved(&self) {
        let session = self.inner.session();
        self.mark_unsaved_locked(&session);
    }

    fn mark_unsaved_locked(&self, session: &LiveSession) {
        if session.phase() == SessionPhase::Editing {
            self.inner.library.set_status(SaveStatus::Unsaved);
        }
    }

    // ---- autosave ----

    pub fn autosave_enabled(&self) -> bool {
        self.inner.session().autosave_enabled
    }

    /// Turning autosave off also drops any waiting save.
    pub fn set_autosave_enabled(&self, enabled: bool) {
        self.inner.session().autosave_enabled = enabled;
        if !enabled {
            self.inner.autosave.cancel();
        }
    }

    /// Debounced, unversioned save of `draft`.
    ///
    /// A draft without an id takes the current portfolio id when it
    /// commits, so successive autosaves of a new portfolio update a single
    /// record.
    pub fn autosave(&self, draft: PortfolioDraft) -> Result<AutosaveRequest> {
        {
            let session = self.inner.session();
            if session.phase() == SessionPhase::Loading || !session.autosave_enabled {
                tracing::debug!(phase = ?session.phase(), "autosave suppressed");
                return Ok(AutosaveRequest::Suppressed);
            }
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.autosave.schedule(move || async move {
            if let Some(inner) = weak.upgrade() {
                inner.commit_autosave(draft);
            }
        })?;
        Ok(AutosaveRequest::Scheduled)
    }

    /// Autosave the live session.
    pub fn autosave_current(&self) -> Result<AutosaveRequest> {
        self.autosave(self.current_draft())
    }

    pub fn cancel_autosave(&self) -> bool {
        self.inner.autosave.cancel()
    }

    pub fn autosave_pending(&self) -> bool {
        self.inner.autosave.is_pending()
    }

    // ---- library ----

    pub fn list_all(&self) -> Vec<Portfolio> {
        self.inner.library.list_all()
    }

    pub fn get(&self, id: &str) -> Option<Portfolio> {
        self.inner.library.get(id)
    }

    /// Save `draft` and make it the session's current portfolio.
    ///
    /// A waiting autosave holds an older draft and is dropped.
    pub fn save(&self, draft: PortfolioDraft, create_version: bool) -> Result<Portfolio> {
        if self.inner.autosave.cancel() {
            tracing::debug!("pending autosave superseded by explicit save");
        }
        let saved = self.inner.library.save(draft, create_version)?;
        let mut session = self.inner.session();
        session.current_id = Some(saved.id.clone());
        session.title = saved.title.clone();
        Ok(saved)
    }

    /// Save the live session.
    pub fn save_current(&self, create_version: bool) -> Result<Portfolio> {
        self.save(self.current_draft(), create_version)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        if self.current_id().as_deref() == Some(id) {
            self.inner.autosave.cancel();
        }
        let removed = self.inner.library.delete(id)?;
        let mut session = self.inner.session();
        if session.current_id.as_deref() == Some(id) {
            session.current_id = None;
        }
        Ok(removed)
    }

    pub fn duplicate(&self, id: &str) -> Result<Portfolio> {
        self.inner.library.duplicate(id)
    }

    pub fn snapshot(&self, portfolio_id: &str, data: &Portfolio) -> Result<VersionSnapshot> {
        self.inner.library.snapshot(portfolio_id, data)
    }

    pub fn history(&self, portfolio_id: &str) -> Vec<VersionSnapshot> {
        self.inner.library.history(portfolio_id)
    }

    /// Restore a snapshot. When it belongs to the portfolio being edited,
    /// the restored state is loaded into the editor.
    pub fn restore(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio> {
        if self.current_id().as_deref() == Some(portfolio_id) {
            self.inner.autosave.cancel();
        }
        let restored = self.inner.library.restore(portfolio_id, version_id)?;
        if self.current_id().as_deref() == Some(portfolio_id) {
            self.load_into_editor(&restored);
        }
        Ok(restored)
    }
}
