//! Group lookup table built from the groups feed.

use super::contacts_types::GroupEntry;
use log::{debug, warn};
use std::collections::HashMap;

/// System group id of the "My Contacts" group
pub const PRIMARY_SYSTEM_GROUP: &str = "Contacts";

/// Maps group ids to display names and remembers the primary group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTable {
    primary: Option<String>,
    names: HashMap<String, String>,
}

impl GroupTable {
    pub fn new(primary: Option<String>, names: HashMap<String, String>) -> Self {
        Self { primary, names }
    }

    /// Builds the table in a single pass over the groups feed.
    ///
    /// System groups are not used as categories; the one whose system id is
    /// `Contacts` becomes the primary group.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = GroupEntry>,
    {
        let mut table = GroupTable::default();

        for entry in entries {
            if let Some(system_id) = entry.system_group.as_deref() {
                if system_id == PRIMARY_SYSTEM_GROUP {
                    debug!("Primary group is '{}'", entry.id);
                    table.primary = Some(entry.id);
                }
                continue;
            }
            let title = entry.title.unwrap_or_default();
            table.names.insert(entry.id, title);
        }

        if table.primary.is_none() {
            warn!("No '{}' system group found, every contact will be skipped", PRIMARY_SYSTEM_GROUP);
        }

        table
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn name_of(&self, group_id: &str) -> Option<&str> {
        self.names.get(group_id).map(String::as_str)
    }

    /// Resolves group ids to names, dropping the primary group and unknown ids
    pub fn resolve<'a, I>(&self, group_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        group_ids
            .into_iter()
            .filter(|id| Some(id.as_str()) != self.primary())
            .filter_map(|id| self.name_of(id))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
