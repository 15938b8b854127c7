//! Allow-list of collections reachable through the generic gateway.
//!
//! The gateway never interpolates a caller-supplied name into SQL. Every
//! request is resolved against this registry first; the registry yields the
//! table name, the owner column, and the set of writable columns, all of
//! which are compile-time string literals.

use once_cell::sync::Lazy;

/// Operations a collection exposes through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    pub list: bool,
    pub create: bool,
    pub update: bool,
}

impl Operations {
    const ALL: Operations = Operations {
        list: true,
        create: true,
        update: true,
    };

    const LIST_ONLY: Operations = Operations {
        list: true,
        create: false,
        update: false,
    };
}

/// Static description of one gateway-accessible collection.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    /// Collection (table) name as addressed by clients.
    pub name: &'static str,

    /// Column auto-populated with the caller's id on create, when present.
    pub owner_column: Option<&'static str>,

    /// Columns a client may set on create/update. `id` is never writable.
    pub writable_columns: &'static [&'static str],

    /// Operations permitted through the gateway.
    pub operations: Operations,

    /// Whether `?category=` filtering applies.
    pub category_filter: bool,

    /// Whether listing uses the vendor quality ordering
    /// (rating descending nulls last, then recency descending).
    pub vendor_ordering: bool,
}

impl CollectionSpec {
    /// True when `column` may be written by a client.
    pub fn is_writable(&self, column: &str) -> bool {
        self.writable_columns.contains(&column)
    }
}

static COLLECTIONS: Lazy<Vec<CollectionSpec>> = Lazy::new(|| {
    vec![
        CollectionSpec {
            name: "wedding_plans",
            owner_column: Some("couple_user_id"),
            writable_columns: &[
                "couple_user_id",
                "title",
                "wedding_date",
                "venue",
                "guest_count",
                "budget_total",
                "notes",
            ],
            operations: Operations::ALL,
            category_filter: false,
            vendor_ordering: false,
        },
        CollectionSpec {
            name: "guests",
            owner_column: Some("created_by_user_id"),
            writable_columns: &[
                "created_by_user_id",
                "wedding_plan_id",
                "full_name",
                "phone",
                "side",
                "rsvp_status",
                "table_number",
            ],
            operations: Operations::ALL,
            category_filter: false,
            vendor_ordering: false,
        },
        CollectionSpec {
            name: "bookings",
            owner_column: Some("couple_user_id"),
            writable_columns: &[
                "couple_user_id",
                "vendor_id",
                "wedding_plan_id",
                "service_date",
                "amount",
                "status",
                "payment_status",
                "notes",
            ],
            operations: Operations::ALL,
            category_filter: false,
            vendor_ordering: false,
        },
        CollectionSpec {
            name: "reviews",
            owner_column: Some("user_id"),
            writable_columns: &["user_id", "vendor_id", "rating", "comment"],
            operations: Operations::ALL,
            category_filter: false,
            vendor_ordering: false,
        },
        CollectionSpec {
            name: "checklists",
            owner_column: Some("couple_user_id"),
            writable_columns: &[
                "couple_user_id",
                "wedding_plan_id",
                "title",
                "due_date",
                "completed",
            ],
            operations: Operations::ALL,
            category_filter: false,
            vendor_ordering: false,
        },
        CollectionSpec {
            name: "budgets",
            owner_column: Some("couple_user_id"),
            writable_columns: &[
                "couple_user_id",
                "wedding_plan_id",
                "category",
                "planned_amount",
                "actual_amount",
            ],
            operations: Operations::ALL,
            category_filter: true,
            vendor_ordering: false,
        },
        // Public vendor catalog: read-only through the gateway.
        CollectionSpec {
            name: "vendors",
            owner_column: None,
            writable_columns: &[],
            operations: Operations::LIST_ONLY,
            category_filter: true,
            vendor_ordering: true,
        },
    ]
});

/// The name of the distinguished vendor catalog collection.
pub const VENDOR_COLLECTION: &str = "vendors";

/// Looks up a collection spec by name. `None` means the collection is not
/// reachable through the gateway at all.
pub fn collection_spec(name: &str) -> Option<&'static CollectionSpec> {
    COLLECTIONS.iter().find(|c| c.name == name)
}

/// The owner column for a collection, if it has an ownership rule.
pub fn owner_column_for(name: &str) -> Option<&'static str> {
    collection_spec(name).and_then(|c| c.owner_column)
}
