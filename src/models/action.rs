use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Longest `details` text kept on an action row.
pub const MAX_DETAILS_LEN: usize = 256;

/// Audit log vocabulary. Stored as its label; the column itself is free text,
/// so unrecognised labels read back as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    Login,
    AddItem,
    EditItem,
    DeleteItem,
    AdminEditItem,
    AdminDeleteItem,
    AdminEditUser,
    AdminPruneLog,
    ExportLogs,
    Other(String),
}

impl ActionType {
    pub const KNOWN: [Self; 9] = [
        Self::Login,
        Self::AddItem,
        Self::EditItem,
        Self::DeleteItem,
        Self::AdminEditItem,
        Self::AdminDeleteItem,
        Self::AdminEditUser,
        Self::AdminPruneLog,
        Self::ExportLogs,
    ];

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Login => "User Login",
            Self::AddItem => "Add Item",
            Self::EditItem => "Edit Item",
            Self::DeleteItem => "Delete Item",
            Self::AdminEditItem => "Admin Edit Item",
            Self::AdminDeleteItem => "Admin Delete Item",
            Self::AdminEditUser => "Admin Edit User",
            Self::AdminPruneLog => "Admin Pruned Log History",
            Self::ExportLogs => "Export Logs CSV",
            Self::Other(label) => label,
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.label() == label)
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }

    #[must_use]
    pub const fn is_admin_override(&self) -> bool {
        matches!(
            self,
            Self::AdminEditItem | Self::AdminDeleteItem | Self::AdminEditUser | Self::AdminPruneLog
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ActionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The entity an action was performed on.
///
/// Stored as a loose `(target_type, target_id)` pair with no foreign key,
/// so `Other` keeps whatever a row carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    User(i32),
    Catalog(i32),
    Other { kind: String, id: Option<i32> },
}

impl Target {
    pub const USER: &'static str = "User";
    pub const CATALOG: &'static str = "Catalog";

    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::User(_) => Self::USER,
            Self::Catalog(_) => Self::CATALOG,
            Self::Other { kind, .. } => kind,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<i32> {
        match self {
            Self::User(id) | Self::Catalog(id) => Some(*id),
            Self::Other { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn from_parts(kind: Option<&str>, id: Option<i32>) -> Option<Self> {
        match (kind?, id) {
            (Self::USER, Some(id)) => Some(Self::User(id)),
            (Self::CATALOG, Some(id)) => Some(Self::Catalog(id)),
            (kind, id) => Some(Self::Other {
                kind: kind.to_string(),
                id,
            }),
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Target", 2)?;
        state.serialize_field("type", self.kind())?;
        state.serialize_field("id", &self.id())?;
        state.end()
    }
}

/// A row to append to the audit log.
#[derive(Debug, Clone)]
pub struct NewAction {
    pub action_type: ActionType,
    pub user_id: Option<i32>,
    pub target: Option<Target>,
    pub details: Option<String>,
}

impl NewAction {
    #[must_use]
    pub fn new(action_type: ActionType, user_id: i32) -> Self {
        Self {
            action_type,
            user_id: Some(user_id),
            target: None,
            details: None,
        }
    }

    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

/// Cuts `details` down to `MAX_DETAILS_LEN` characters.
#[must_use]
pub fn clamp_details(details: &str) -> String {
    match details.char_indices().nth(MAX_DETAILS_LEN) {
        Some((end, _)) => details[..end].to_string(),
        None => details.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub action_type: Option<String>,
    pub user_id: Option<i32>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}
