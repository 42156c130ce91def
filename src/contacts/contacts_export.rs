//! Export of the remote address book to a vCard file.
//
// Entries are streamed page by page; each accepted entry is mapped, written
// and dropped before the next one is looked at.

use super::contacts_groups::GroupTable;
use super::contacts_types::*;
use super::{ContactsError, ContactsService, MAX_PAGE_SIZE};
use crate::vcard::{Address, StructuredName, VCard, VCardValue};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Card property carrying instant-messaging addresses
pub const IM_PROPERTY: &str = "X-KADDRESSBOOK-X-IMADDRESS";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving one `<display name>.jpg` per contact photo
    pub photo_dir: Option<PathBuf>,
    pub page_size: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { photo_dir: None, page_size: MAX_PAGE_SIZE }
    }
}

/// Counters reported at the end of a dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    /// Entries without a display name or outside the primary group
    pub skipped_collected: usize,
    /// Entries without a full name
    pub skipped_incomplete: usize,
    pub photos_saved: usize,
}

pub struct ContactMapper<S> {
    service: S,
    options: ExportOptions,
}

impl<S: ContactsService> ContactMapper<S> {
    pub fn new(service: S, options: ExportOptions) -> Self {
        Self { service, options }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Reads the groups feed into a [`GroupTable`]
    pub async fn list_groups(&self) -> Result<GroupTable, ContactsError> {
        let entries = self.service.list_groups().await?;
        debug!("Groups feed returned {} entries", entries.len());
        let table = GroupTable::from_entries(entries);
        if table.is_empty() {
            debug!("No user groups, cards will carry no categories");
        }
        Ok(table)
    }

    /// Writes every real contact to `output` as vCard, overwriting the file.
    ///
    /// Groups are listed before the file is created, so rejected credentials
    /// leave nothing behind.
    pub async fn dump(&self, output: &Path) -> Result<ExportSummary, ContactsError> {
        let groups = self.list_groups().await?;
        self.write_contacts(&groups, output).await
    }

    /// Writes every real contact to `output` using an already listed group table
    pub async fn write_contacts(
        &self,
        groups: &GroupTable,
        output: &Path,
    ) -> Result<ExportSummary, ContactsError> {
        if let Some(dir) = &self.options.photo_dir {
            if !dir.exists() {
                info!("Creating photo directory {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }

        let mut writer = BufWriter::new(File::create(output)?);
        let mut summary = ExportSummary::default();
        let page_size = self.options.page_size.clamp(1, MAX_PAGE_SIZE);
        let mut cursor: Option<String> = None;
        let mut index = 0usize;

        loop {
            let page = self.service.list_contacts(page_size, cursor.as_deref()).await?;
            debug!("Contacts page with {} entries", page.entries.len());

            for entry in &page.entries {
                index += 1;

                if !is_real_contact(entry, groups) {
                    debug!("Skipping collected address {:?}", entry.id);
                    summary.skipped_collected += 1;
                    continue;
                }
                let display_name = entry.display_name().unwrap_or_default();
                println!("{} {}", index, display_name);

                if full_name(entry).is_none() {
                    debug!("Skipping '{}': no full name", display_name);
                    summary.skipped_incomplete += 1;
                    continue;
                }

                let photo = self.photo_for(entry).await?;
                if let (Some(bytes), Some(dir)) = (&photo, &self.options.photo_dir) {
                    save_photo(dir, display_name, bytes)?;
                    summary.photos_saved += 1;
                }

                let Some(card) = map_entry(entry, groups, photo.as_deref()) else {
                    summary.skipped_incomplete += 1;
                    continue;
                };
                print_extended_properties(entry);

                writer.write_all(card.serialize().as_bytes())?;
                writer.write_all(b"\r\n")?;
                summary.written += 1;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        writer.flush()?;
        info!(
            "Wrote {} contacts to {} ({} collected addresses skipped, {} incomplete, {} photos saved)",
            summary.written,
            output.display(),
            summary.skipped_collected,
            summary.skipped_incomplete,
            summary.photos_saved
        );
        Ok(summary)
    }

    async fn photo_for(&self, entry: &ContactEntry) -> Result<Option<Vec<u8>>, ContactsError> {
        if !has_photo(entry) {
            return Ok(None);
        }
        self.service.fetch_photo(entry).await
    }
}

/// True for entries that have a display name and belong to the primary group
pub fn is_real_contact(entry: &ContactEntry, groups: &GroupTable) -> bool {
    if entry.display_name().is_none() {
        return false;
    }
    match groups.primary() {
        Some(primary) => entry.is_member_of(primary),
        None => false,
    }
}

fn full_name(entry: &ContactEntry) -> Option<&str> {
    entry.name.as_ref().and_then(|n| n.full_name.as_deref())
}

/// A photo link only points at an image when it carries a checksum
fn has_photo(entry: &ContactEntry) -> bool {
    entry.photo.as_ref().map_or(false, |p| p.etag.is_some())
}

/// Maps a remote entry to a card.
///
/// Returns `None` when the entry has no full name. `photo` is inlined as a
/// base64 JPEG when given.
pub fn map_entry(entry: &ContactEntry, groups: &GroupTable, photo: Option<&[u8]>) -> Option<VCard> {
    let name = entry.name.as_ref()?;
    let formatted = name.full_name.as_deref()?;
    let mut card = VCard::new();

    card.add(
        "N",
        VCardValue::StructuredName(StructuredName {
            family: name.family_name.clone(),
            given: name.given_name.clone(),
            additional: name.additional_name.clone(),
            prefix: name.name_prefix.clone(),
            suffix: None,
        }),
    );
    card.add("FN", VCardValue::text(formatted));
    if let Some(title) = &entry.title {
        card.add("NAME", VCardValue::text(title.as_str()));
    }

    for email in &entry.emails {
        let prop = card.add("EMAIL", VCardValue::text(email.address.as_str()));
        if email.is_primary() {
            prop.add_type("PREF");
        }
    }

    if let Some(note) = &entry.note {
        card.add("NOTE", VCardValue::text(note.as_str()));
    }

    let categories = groups.resolve(&entry.group_memberships);
    if !categories.is_empty() {
        card.add("CATEGORIES", VCardValue::TextList(categories));
    }

    if let Some(updated) = &entry.updated {
        card.add("REV", VCardValue::text(updated.as_str()));
    }

    for phone in &entry.phone_numbers {
        let prop = card.add("TEL", VCardValue::text(phone.number.as_str()));
        let tel_type = phone_type(phone.rel.as_deref());
        if !tel_type.is_empty() {
            prop.add_type(&tel_type);
        }
    }

    if let Some(org_name) = entry.organization.as_ref().and_then(|o| o.name.clone()) {
        card.add("ORG", VCardValue::Organization(vec![org_name]));
    }

    if let Some(birthday) = &entry.birthday {
        card.add("BDAY", VCardValue::text(birthday.as_str()));
    }

    for address in &entry.postal_addresses {
        let prop = card.add("ADR", VCardValue::Address(map_address(address)));
        let adr_type = rel_fragment(address.rel.as_deref()).to_uppercase();
        if !adr_type.is_empty() {
            prop.add_type(&adr_type);
        }
    }

    if let Some(bytes) = photo {
        card.add("PHOTO", VCardValue::Binary(bytes.to_vec()))
            .add_param("ENCODING", "b")
            .add_type("image/jpeg");
    }

    if !entry.im_addresses.is_empty() {
        let im_addrs: Vec<String> = entry
            .im_addresses
            .iter()
            .map(|im| format!("({}){}", rel_fragment(im.protocol.as_deref()), im.address))
            .collect();
        card.add(IM_PROPERTY, VCardValue::text(im_addrs.join(" ")));
    }

    for website in &entry.websites {
        card.add("URL", VCardValue::Uri(website.clone()));
    }

    Some(card)
}

fn map_address(address: &PostalAddress) -> Address {
    let mut adr = Address {
        po_box: address.po_box.clone(),
        street: address.street.clone(),
        city: address.city.clone(),
        region: address.region.clone(),
        country: address.country.clone(),
        ..Default::default()
    };
    // Neighborhood and postcode share the code slot; postcode wins when both are set.
    if address.neighborhood.is_some() {
        adr.code = address.neighborhood.clone();
    }
    if address.postcode.is_some() {
        adr.code = address.postcode.clone();
    }
    adr
}

/// Fragment of a relation URI, e.g. `mobile` for `http://schemas.google.com/g/2005#mobile`
pub fn rel_fragment(rel: Option<&str>) -> String {
    let Some(rel) = rel else {
        return String::new();
    };
    match Url::parse(rel) {
        Ok(url) => url.fragment().unwrap_or_default().to_string(),
        Err(_) => rel.rsplit_once('#').map(|(_, f)| f.to_string()).unwrap_or_default(),
    }
}

/// Card `TEL` type for a phone relation
pub fn phone_type(rel: Option<&str>) -> String {
    let fragment = rel_fragment(rel);
    let phone_type = match fragment.as_str() {
        "mobile" => "cell",
        "work_fax" => "fax",
        other => other,
    };
    phone_type.to_uppercase()
}

/// Path of the photo file for a contact; path separators in the name are replaced
pub fn photo_path(dir: &Path, display_name: &str) -> PathBuf {
    let stem: String =
        display_name.chars().map(|c| if c == '/' || c == '\\' { '_' } else { c }).collect();
    dir.join(format!("{}.jpg", stem))
}

fn save_photo(dir: &Path, display_name: &str, bytes: &[u8]) -> Result<(), ContactsError> {
    let path = photo_path(dir, display_name);
    debug!("Saving photo to {}", path.display());
    fs::write(&path, bytes).map_err(|e| {
        warn!("Failed to write photo {}: {}", path.display(), e);
        ContactsError::Io(e)
    })
}

fn print_extended_properties(entry: &ContactEntry) {
    for property in &entry.extended_properties {
        println!("    Extended Property - {}: {}", property.name, property.display_value());
    }
}
