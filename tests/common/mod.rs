#![allow(dead_code)]

pub mod local_server;

use async_trait::async_trait;
use contacts_vcf::contacts::{
    ContactEntry, ContactsError, ContactsPage, ContactsService, GroupEntry, NameParts,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory address book serving fixed pages
#[derive(Default)]
pub struct FakeService {
    pub groups: Vec<GroupEntry>,
    /// Pages keyed by the cursor that requests them; `None` is the first page
    pub pages: HashMap<Option<String>, ContactsPage>,
    /// Photo bytes keyed by entry id
    pub photos: HashMap<String, Vec<u8>>,
    pub reject_credentials: bool,
    pub requests: Mutex<Vec<(u32, Option<String>)>>,
    pub photo_requests: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new(groups: Vec<GroupEntry>, entries: Vec<ContactEntry>) -> Self {
        let mut pages = HashMap::new();
        pages.insert(None, ContactsPage { entries, next_cursor: None });
        Self { groups, pages, ..Default::default() }
    }

    pub fn rejecting() -> Self {
        Self { reject_credentials: true, ..Default::default() }
    }
}

#[async_trait]
impl ContactsService for FakeService {
    async fn list_groups(&self) -> Result<Vec<GroupEntry>, ContactsError> {
        if self.reject_credentials {
            return Err(ContactsError::Authentication("BadAuthentication".to_string()));
        }
        Ok(self.groups.clone())
    }

    async fn list_contacts(
        &self,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ContactsPage, ContactsError> {
        let cursor = cursor.map(str::to_string);
        self.requests.lock().unwrap().push((page_size, cursor.clone()));
        self.pages.get(&cursor).cloned().ok_or_else(|| ContactsError::UnexpectedStatus {
            status: 404,
            url: format!("{:?}", cursor),
        })
    }

    async fn fetch_photo(&self, entry: &ContactEntry) -> Result<Option<Vec<u8>>, ContactsError> {
        self.photo_requests.lock().unwrap().push(entry.id.clone());
        Ok(self.photos.get(&entry.id).cloned())
    }
}

pub fn group(id: &str, title: &str, system_group: Option<&str>) -> GroupEntry {
    GroupEntry {
        id: id.to_string(),
        title: Some(title.to_string()),
        system_group: system_group.map(str::to_string),
    }
}

/// The primary group `primary` plus `g1` named "Friends"
pub fn default_groups() -> Vec<GroupEntry> {
    vec![
        group("primary", "System Group: My Contacts", Some("Contacts")),
        group("g1", "Friends", None),
    ]
}

pub fn contact(id: &str, display_name: Option<&str>, memberships: &[&str]) -> ContactEntry {
    ContactEntry {
        id: id.to_string(),
        title: display_name.map(str::to_string),
        name: display_name.map(|n| NameParts { full_name: Some(n.to_string()), ..Default::default() }),
        group_memberships: memberships.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Parses every record of an exported file with the `ical` vCard reader
pub fn parse_cards(output: &str) -> Vec<ical::parser::vcard::component::VcardContact> {
    output
        .split("\r\n\r\n")
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            let mut parser = ical::VcardParser::new(std::io::BufReader::new(chunk.as_bytes()));
            parser.next().expect("one card per record").expect("card parses")
        })
        .collect()
}

pub fn values_of(card: &ical::parser::vcard::component::VcardContact, name: &str) -> Vec<String> {
    card.properties
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(name))
        .filter_map(|p| p.value.clone())
        .collect()
}

pub fn param_values(property: &ical::property::Property, name: &str) -> Vec<String> {
    property
        .params
        .iter()
        .flatten()
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .flat_map(|(_, values)| values.clone())
        .collect()
}
