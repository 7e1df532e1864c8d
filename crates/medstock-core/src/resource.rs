// ── Resource catalogue ──
//
// One declarative descriptor per list screen: which fields the search
// box looks at, which columns offer categorical filters, and which
// columns a table shows. Every screen runs the same engines with these
// parameters.

use medstock_api::Resource;

use crate::classify::Classifier;

/// One table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
}

impl Column {
    const fn new(key: &'static str, title: &'static str) -> Self {
        Self { key, title }
    }

    /// Code table used to render this column, when it holds codes.
    pub fn classifier(&self) -> Option<Classifier> {
        Classifier::for_field(self.key)
    }
}

/// Search, filter, and column layout for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub resource: Resource,
    pub search_fields: &'static [&'static str],
    pub categorical: &'static [&'static str],
    pub columns: &'static [Column],
}

impl ResourceSpec {
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|c| c.key)
    }
}

static ACCOUNTS: ResourceSpec = ResourceSpec {
    resource: Resource::Accounts,
    search_fields: &["name", "email", "phone"],
    categorical: &["role", "status"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("phone", "Phone"),
        Column::new("role", "Role"),
        Column::new("status", "Status"),
        Column::new("createdAt", "Created"),
    ],
};

static STAFF: ResourceSpec = ResourceSpec {
    resource: Resource::Staff,
    search_fields: &["name", "email", "storageName"],
    categorical: &["role"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("role", "Role"),
        Column::new("storageName", "Storage"),
    ],
};

static ITEMS: ResourceSpec = ResourceSpec {
    resource: Resource::Items,
    search_fields: &["name", "description", "unit"],
    categorical: &["categoryName"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("unit", "Unit"),
        Column::new("quantity", "Qty"),
        Column::new("categoryName", "Category"),
        Column::new("description", "Description"),
    ],
};

static STORAGES: ResourceSpec = ResourceSpec {
    resource: Resource::Storages,
    search_fields: &["name", "location"],
    categorical: &["storageCategoryName", "status"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("location", "Location"),
        Column::new("storageCategoryName", "Category"),
        Column::new("capacity", "Capacity"),
        Column::new("status", "Status"),
    ],
};

static STORAGE_CATEGORIES: ResourceSpec = ResourceSpec {
    resource: Resource::StorageCategories,
    search_fields: &["name", "description"],
    categorical: &[],
    columns: &[
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("description", "Description"),
    ],
};

static ITEM_LOTS: ResourceSpec = ResourceSpec {
    resource: Resource::ItemLots,
    search_fields: &["lotNumber", "itemName", "storageName"],
    categorical: &["status"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("lotNumber", "Lot"),
        Column::new("itemName", "Item"),
        Column::new("quantity", "Qty"),
        Column::new("expiryDate", "Expires"),
        Column::new("storageName", "Storage"),
        Column::new("status", "Status"),
    ],
};

static LOT_STORAGE_REQUESTS: ResourceSpec = ResourceSpec {
    resource: Resource::LotStorageRequests,
    search_fields: &["lotNumber", "itemName", "storageName", "note"],
    categorical: &["status", "type"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("lotNumber", "Lot"),
        Column::new("itemName", "Item"),
        Column::new("quantity", "Qty"),
        Column::new("type", "Type"),
        Column::new("status", "Status"),
        Column::new("storageName", "Storage"),
        Column::new("createdAt", "Requested"),
    ],
};

static LOT_CREATE_REQUESTS: ResourceSpec = ResourceSpec {
    resource: Resource::LotCreateRequests,
    search_fields: &["lotNumber", "itemName", "supplierName"],
    categorical: &["status"],
    columns: &[
        Column::new("id", "ID"),
        Column::new("lotNumber", "Lot"),
        Column::new("itemName", "Item"),
        Column::new("quantity", "Qty"),
        Column::new("supplierName", "Supplier"),
        Column::new("status", "Status"),
        Column::new("createdAt", "Requested"),
    ],
};

/// Descriptor for `resource`.
pub fn spec(resource: Resource) -> &'static ResourceSpec {
    match resource {
        Resource::Accounts => &ACCOUNTS,
        Resource::Staff => &STAFF,
        Resource::Items => &ITEMS,
        Resource::Storages => &STORAGES,
        Resource::StorageCategories => &STORAGE_CATEGORIES,
        Resource::ItemLots => &ITEM_LOTS,
        Resource::LotStorageRequests => &LOT_STORAGE_REQUESTS,
        Resource::LotCreateRequests => &LOT_CREATE_REQUESTS,
    }
}
