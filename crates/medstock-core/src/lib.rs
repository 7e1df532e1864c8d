//! Record model, client-side query pipeline, and inventory facade for
//! the medstock CLI and TUI.
//!
//! - **[`query`]**: the pure Filter and Sort engines and count
//!   aggregation: `display = sort(filter(records, query, filters), spec)`.
//!   Free text is OR-matched case-insensitively over a screen's search
//!   fields; categorical filters are strict-equality ANDs with `"all"` as
//!   the no-constraint sentinel; sorting is stable with null/missing
//!   values lowest.
//!
//! - **[`TableView`]**: the query/filter/sort state a list screen keeps,
//!   including the header-click toggle.
//!
//! - **[`classify`]**: total code tables for roles, statuses, and
//!   transaction types, mapping raw codes to a label and display tone.
//!
//! - **[`resource`]**: per-screen descriptors (search fields, filters,
//!   columns) so every screen runs the same engines.
//!
//! - **[`Inventory`]**: facade over `medstock-api` owning the explicit
//!   [`AuthContext`].

pub mod auth;
pub mod classify;
pub mod config;
pub mod error;
pub mod inventory;
pub mod model;
pub mod query;
pub mod resource;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthContext, SessionUser};
pub use classify::{Classification, Classifier, CodeTable, Role, Status, Tone, TransactionKind};
pub use config::{InventoryConfig, TlsVerification};
pub use error::CoreError;
pub use inventory::Inventory;
pub use model::Record;
pub use query::{FilterSet, SortDirection, SortSpec, Summary};
pub use resource::{Column, ResourceSpec};
pub use view::TableView;

pub use medstock_api::Resource;
