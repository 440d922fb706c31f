//! Permission kinds and authorization label sets.
//!
//! These are the argument types the security operations take. Their
//! `Display` output is what appears in rendered audit messages.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Instance-wide permission a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemPermission {
    /// Grant permissions to other users
    Grant,
    /// Create tables
    CreateTable,
    /// Drop any table
    DropTable,
    /// Alter any table
    AlterTable,
    /// Create users
    CreateUser,
    /// Drop users
    DropUser,
    /// Alter users
    AlterUser,
    /// Full system access
    System,
}

impl fmt::Display for SystemPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grant => "GRANT",
            Self::CreateTable => "CREATE_TABLE",
            Self::DropTable => "DROP_TABLE",
            Self::AlterTable => "ALTER_TABLE",
            Self::CreateUser => "CREATE_USER",
            Self::DropUser => "DROP_USER",
            Self::AlterUser => "ALTER_USER",
            Self::System => "SYSTEM",
        };
        f.write_str(name)
    }
}

/// Permission a user may hold on a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TablePermission {
    /// Scan the table
    Read,
    /// Write mutations to the table
    Write,
    /// Bulk import files into the table
    BulkImport,
    /// Alter table configuration
    AlterTable,
    /// Grant permissions on the table
    Grant,
    /// Drop the table
    DropTable,
}

impl fmt::Display for TablePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::BulkImport => "BULK_IMPORT",
            Self::AlterTable => "ALTER_TABLE",
            Self::Grant => "GRANT",
            Self::DropTable => "DROP_TABLE",
        };
        f.write_str(name)
    }
}

/// The set of visibility labels a user may read.
///
/// Labels are kept sorted and deduplicated. `Display` joins them with `,`.
///
/// # Examples
///
/// ```
/// use audited_security::Authorizations;
///
/// let auths = Authorizations::from_labels(["public", "admin", "public"]);
/// assert_eq!(auths.len(), 2);
/// assert_eq!(auths.to_string(), "admin,public");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authorizations {
    labels: BTreeSet<String>,
}

impl Authorizations {
    /// Creates an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a label set from any iterator of labels.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `label` is in the set.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Iterates the labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the set holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for Authorizations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for label in &self.labels {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(label)?;
            first = false;
        }
        Ok(())
    }
}
