//! Remote address book access and export to vCard.
//!
//! The exporter only talks to the service through [`ContactsService`], so the
//! mapping can run against the real GData feed or an in-memory fake.

use async_trait::async_trait;

mod contacts_export;
mod contacts_gdata;
mod contacts_groups;
mod contacts_types;

pub use contacts_export::*;
pub use contacts_gdata::*;
pub use contacts_groups::*;
pub use contacts_types::*;

/// Largest page the contacts feed will return
pub const MAX_PAGE_SIZE: u32 = 999;

/// Custom error type for address book operations
#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed feed: {0}")]
    Feed(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContactsError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, ContactsError::Authentication(_))
    }
}

/// Capabilities the exporter needs from the remote service
#[async_trait]
pub trait ContactsService: Send + Sync {
    /// All contact groups, system groups included
    async fn list_groups(&self) -> Result<Vec<GroupEntry>, ContactsError>;

    /// One page of contacts; pass the previous page's cursor to continue
    async fn list_contacts(
        &self,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ContactsPage, ContactsError>;

    /// Photo bytes for the entry, `None` if the service has none
    async fn fetch_photo(&self, entry: &ContactEntry) -> Result<Option<Vec<u8>>, ContactsError>;
}
