//! Screen identifiers and tab-bar ordering.

use std::fmt;

use medstock_core::Resource;

/// One top-level screen: the dashboard or a resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Dashboard,
    Records(Resource),
}

impl ScreenId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Records(resource) => resource.label(),
        }
    }

    /// Compact label for narrow terminals (< 100 cols).
    pub fn label_short(self) -> &'static str {
        match self {
            Self::Dashboard => "Dash",
            Self::Records(resource) => match resource {
                Resource::Accounts => "Acct",
                Resource::Staff => "Staff",
                Resource::Items => "Items",
                Resource::Storages => "Stor",
                Resource::StorageCategories => "Cat",
                Resource::ItemLots => "Lots",
                Resource::LotStorageRequests => "LReq",
                Resource::LotCreateRequests => "CReq",
            },
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tab-bar order: the dashboard, then each resource the session may see.
/// Number keys address positions 1-9.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOrder(Vec<ScreenId>);

impl TabOrder {
    pub fn for_resources(visible: &[Resource]) -> Self {
        let mut tabs = vec![ScreenId::Dashboard];
        tabs.extend(visible.iter().copied().map(ScreenId::Records));
        Self(tabs)
    }

    pub fn screens(&self) -> &[ScreenId] {
        &self.0
    }

    pub fn position(&self, id: ScreenId) -> Option<usize> {
        self.0.iter().position(|&s| s == id)
    }

    /// 1-based tab number shown in the bar.
    pub fn number(&self, id: ScreenId) -> Option<usize> {
        self.position(id).map(|i| i + 1)
    }

    pub fn from_number(&self, n: usize) -> Option<ScreenId> {
        n.checked_sub(1).and_then(|i| self.0.get(i)).copied()
    }

    pub fn next(&self, id: ScreenId) -> ScreenId {
        let idx = self.position(id).unwrap_or(0);
        self.0[(idx + 1) % self.0.len()]
    }

    pub fn prev(&self, id: ScreenId) -> ScreenId {
        let idx = self.position(id).unwrap_or(0);
        self.0[(idx + self.0.len() - 1) % self.0.len()]
    }
}
