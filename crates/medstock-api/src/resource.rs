// ── REST resource catalogue ──
//
// Every collection the inventory server exposes, with its base path
// and the verbs it accepts.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A record collection exposed by the inventory API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Resource {
    /// User accounts of every role.
    Accounts,
    /// Staff users, joined with their assigned storage.
    Staff,
    Items,
    Storages,
    #[strum(to_string = "categories", serialize = "storage-categories")]
    StorageCategories,
    #[strum(to_string = "lots", serialize = "item-lots")]
    ItemLots,
    /// Requests to move item lots into a storage.
    #[strum(to_string = "lot-requests", serialize = "lot-storage-requests")]
    LotStorageRequests,
    /// Supplier requests to register new item lots.
    #[strum(to_string = "create-requests", serialize = "lot-create-requests")]
    LotCreateRequests,
}

impl Resource {
    /// Base path relative to the server root (no leading slash).
    pub fn path(self) -> &'static str {
        match self {
            Self::Accounts => "api/user",
            Self::Staff => "api/staff-user",
            Self::Items => "api/items",
            Self::Storages => "api/storage",
            Self::StorageCategories => "api/storage-category",
            Self::ItemLots => "api/item-lots",
            Self::LotStorageRequests => "api/item-lots/storage/requests",
            Self::LotCreateRequests => "api/item-lots/create-requests",
        }
    }

    /// Path of the server-side `?query=` search, for the resources that have one.
    pub fn search_path(self) -> Option<&'static str> {
        match self {
            Self::Items => Some("api/items"),
            Self::LotStorageRequests => Some("api/lot-request"),
            _ => None,
        }
    }

    /// Whether the server accepts POST/PUT/DELETE on this collection.
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            Self::Accounts | Self::Items | Self::Storages | Self::StorageCategories | Self::ItemLots
        )
    }

    /// Human-readable plural name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Accounts => "Accounts",
            Self::Staff => "Staff",
            Self::Items => "Items",
            Self::Storages => "Storages",
            Self::StorageCategories => "Storage Categories",
            Self::ItemLots => "Item Lots",
            Self::LotStorageRequests => "Lot Requests",
            Self::LotCreateRequests => "Create Requests",
        }
    }
}
