//! Data model of the remote address book.
//
// These types are what the service client hands to the exporter. Relation and
// protocol fields keep the service's URI form (e.g.
// `http://schemas.google.com/g/2005#mobile`); the exporter derives card types
// from their fragment.

/// A contact group as listed by the service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupEntry {
    pub id: String,
    pub title: Option<String>,
    /// Set for built-in groups, e.g. `Contacts` for "My Contacts"
    pub system_group: Option<String>,
}

/// One page of the contacts feed
#[derive(Debug, Clone, Default)]
pub struct ContactsPage {
    pub entries: Vec<ContactEntry>,
    /// Opaque cursor for the next page, `None` on the last page
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactEntry {
    pub id: String,
    /// Display name; absent for addresses the service collected automatically
    pub title: Option<String>,
    pub name: Option<NameParts>,
    pub emails: Vec<EmailAddress>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub postal_addresses: Vec<PostalAddress>,
    pub organization: Option<Organization>,
    pub birthday: Option<String>,
    /// Group ids this contact belongs to
    pub group_memberships: Vec<String>,
    pub im_addresses: Vec<ImAddress>,
    pub websites: Vec<String>,
    pub note: Option<String>,
    pub extended_properties: Vec<ExtendedProperty>,
    /// Last-modified timestamp, as sent by the service
    pub updated: Option<String>,
    pub photo: Option<PhotoLink>,
}

impl ContactEntry {
    /// Display name, if present and non-empty
    pub fn display_name(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_member_of(&self, group_id: &str) -> bool {
        self.group_memberships.iter().any(|g| g == group_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameParts {
    pub full_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub name_prefix: Option<String>,
    pub additional_name: Option<String>,
    pub name_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailAddress {
    pub address: String,
    /// Raw flag; only the literal `"true"` marks the primary address
    pub primary: Option<String>,
}

impl EmailAddress {
    pub fn is_primary(&self) -> bool {
        self.primary.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneNumber {
    pub number: String,
    pub rel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostalAddress {
    pub rel: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub neighborhood: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub po_box: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Organization {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImAddress {
    pub protocol: Option<String>,
    pub address: String,
}

/// Service-specific key/value pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedProperty {
    pub name: String,
    pub value: Option<String>,
    /// Raw payload when the property carries structured data instead of a value
    pub blob: Option<String>,
}

impl ExtendedProperty {
    pub fn display_value(&self) -> &str {
        self.value.as_deref().or(self.blob.as_deref()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoLink {
    pub href: String,
    /// Image checksum; a link without one has no photo behind it
    pub etag: Option<String>,
}
