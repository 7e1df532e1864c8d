//! All UI actions. Actions are the only way state changes.

use std::fmt;
use std::sync::Arc;

use medstock_core::{Record, Resource};

use crate::screen::ScreenId;

/// Shared snapshot of one resource's rows.
pub type Rows = Arc<Vec<Arc<Record>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// A destructive request waiting on y/n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecord {
        resource: Resource,
        id: String,
        name: String,
    },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteRecord { resource, name, .. } => {
                write!(f, "Delete {name} from {}?", resource.label())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    CloseDetail,

    // ── Data ──────────────────────────────────────────────────────
    Refresh(Resource),
    RefreshAll,
    RecordsLoaded {
        resource: Resource,
        generation: u64,
        rows: Rows,
    },
    FetchFailed {
        resource: Resource,
        generation: u64,
        message: String,
    },

    // ── Writes ────────────────────────────────────────────────────
    RequestDelete {
        resource: Resource,
        id: String,
        name: String,
    },
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Search ────────────────────────────────────────────────────
    OpenSearch,
    /// Close the bar, keep the query.
    CloseSearch,
    /// Close the bar and clear the query.
    CancelSearch,
    SearchInput(String),

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notification),
}
