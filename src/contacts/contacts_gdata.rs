//! Google Contacts (GData v3) client.
//
// Speaks the JSON flavour of the feed (`alt=json`). Feed decoding is kept in
// plain functions so fixture documents can be decoded without a server.

use super::contacts_types::*;
use super::{ContactsError, ContactsService};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_BASE_URL: &str = "https://www.google.com";
pub const DEFAULT_LOGIN_URL: &str = "https://www.google.com/accounts/ClientLogin";

const GDATA_VERSION: &str = "3.0";
const SOURCE: &str = "contacts-vcf";
const PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#photo";

/// How to authenticate against the service
#[derive(Debug)]
pub enum Credentials {
    /// Account e-mail and password, exchanged for a token through ClientLogin
    Password { user: String, password: SecretString },
    /// Ready-made OAuth access token
    Token(SecretString),
}

#[derive(Debug, Clone)]
pub struct GDataSettings {
    pub base_url: String,
    pub login_url: String,
}

impl Default for GDataSettings {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), login_url: DEFAULT_LOGIN_URL.to_string() }
    }
}

pub struct GDataClient {
    http: Client,
    base_url: String,
    authorization: SecretString,
}

impl GDataClient {
    /// Authenticates and returns a client ready to read the feeds.
    ///
    /// Rejected credentials yield [`ContactsError::Authentication`]. Token
    /// credentials are not checked here; the first feed request does that.
    pub async fn login(
        settings: &GDataSettings,
        credentials: &Credentials,
    ) -> Result<Self, ContactsError> {
        let http = Client::new();

        let authorization = match credentials {
            Credentials::Token(token) => format!("Bearer {}", token.expose_secret()),
            Credentials::Password { user, password } => {
                info!("Logging in as {}", user);
                let response = http
                    .post(&settings.login_url)
                    .form(&[
                        ("accountType", "HOSTED_OR_GOOGLE"),
                        ("Email", user.as_str()),
                        ("Passwd", password.expose_secret()),
                        ("service", "cp"),
                        ("source", SOURCE),
                    ])
                    .send()
                    .await?;

                let status = response.status();
                let body = response.text().await?;

                if status == StatusCode::FORBIDDEN || parse_login_error(&body).is_some() {
                    let reason = parse_login_error(&body).unwrap_or("BadAuthentication");
                    return Err(ContactsError::Authentication(reason.to_string()));
                }
                if !status.is_success() {
                    return Err(ContactsError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: settings.login_url.clone(),
                    });
                }

                let token = parse_auth_token(&body).ok_or_else(|| {
                    ContactsError::Authentication("login response carried no Auth token".to_string())
                })?;
                format!("GoogleLogin auth={}", token)
            }
        };

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            authorization: SecretString::from(authorization),
        })
    }

    fn groups_url(&self) -> String {
        format!("{}/m8/feeds/groups/default/full?alt=json&max-results=999", self.base_url)
    }

    fn contacts_url(&self, page_size: u32) -> String {
        format!("{}/m8/feeds/contacts/default/full?alt=json&max-results={}", self.base_url, page_size)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, ContactsError> {
        debug!("GET {}", url);
        Ok(self
            .http
            .get(url)
            .header(AUTHORIZATION, self.authorization.expose_secret())
            .header("GData-Version", GDATA_VERSION)
            .send()
            .await?)
    }

    /// Feed request; 401 and 403 mean the credentials were rejected
    async fn get(&self, url: &str) -> Result<reqwest::Response, ContactsError> {
        let response = self.send(url).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ContactsError::Authentication(
                format!("{} rejected the credentials", url),
            )),
            _ => Ok(response),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, ContactsError> {
        let response = self.get(url).await?;
        if !response.status().is_success() {
            return Err(ContactsError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ContactsService for GDataClient {
    async fn list_groups(&self) -> Result<Vec<GroupEntry>, ContactsError> {
        let body = self.get_text(&self.groups_url()).await?;
        decode_groups_feed(&body)
    }

    async fn list_contacts(
        &self,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ContactsPage, ContactsError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => self.contacts_url(page_size),
        };
        let body = self.get_text(&url).await?;
        decode_contacts_feed(&body)
    }

    async fn fetch_photo(&self, entry: &ContactEntry) -> Result<Option<Vec<u8>>, ContactsError> {
        let Some(photo) = &entry.photo else {
            return Ok(None);
        };

        // The feeds already accepted the credentials, so a refused photo is
        // reported as a plain status error.
        let response = self.send(&photo.href).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No photo behind {}", photo.href);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ContactsError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: photo.href.clone(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(if bytes.is_empty() { None } else { Some(bytes.to_vec()) })
    }
}

/// Extracts the `Auth=` token from a ClientLogin response body
pub fn parse_auth_token(body: &str) -> Option<&str> {
    login_field(body, "Auth")
}

/// Extracts the `Error=` reason from a ClientLogin response body
pub fn parse_login_error(body: &str) -> Option<&str> {
    login_field(body, "Error")
}

fn login_field<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    body.lines()
        .filter_map(|line| line.trim().split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Decodes a groups feed document
pub fn decode_groups_feed(json: &str) -> Result<Vec<GroupEntry>, ContactsError> {
    let document: GroupsDocument = serde_json::from_str(json)?;
    Ok(document.feed.entry.into_iter().map(GroupEntry::from).collect())
}

/// Decodes one page of the contacts feed
pub fn decode_contacts_feed(json: &str) -> Result<ContactsPage, ContactsError> {
    let document: ContactsDocument = serde_json::from_str(json)?;
    let next_cursor =
        document.feed.link.into_iter().find(|l| l.rel == "next").map(|l| l.href);

    Ok(ContactsPage {
        entries: document.feed.entry.into_iter().map(ContactEntry::from).collect(),
        next_cursor,
    })
}

#[derive(Debug, Deserialize)]
struct GroupsDocument {
    feed: GroupsFeed,
}

#[derive(Debug, Deserialize)]
struct GroupsFeed {
    #[serde(default)]
    entry: Vec<GroupJson>,
}

#[derive(Debug, Deserialize)]
struct ContactsDocument {
    feed: ContactsFeed,
}

#[derive(Debug, Deserialize)]
struct ContactsFeed {
    #[serde(default)]
    entry: Vec<ContactJson>,
    #[serde(default)]
    link: Vec<LinkJson>,
}

/// Text node, `{"$t": "..."}`
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$t", default)]
    text: String,
}

fn text_of(node: Option<Text>) -> Option<String> {
    node.map(|t| t.text)
}

#[derive(Debug, Deserialize)]
struct GroupJson {
    id: Text,
    title: Option<Text>,
    #[serde(rename = "gContact$systemGroup")]
    system_group: Option<SystemGroupJson>,
}

#[derive(Debug, Deserialize)]
struct SystemGroupJson {
    id: String,
}

impl From<GroupJson> for GroupEntry {
    fn from(json: GroupJson) -> Self {
        GroupEntry {
            id: json.id.text,
            title: text_of(json.title),
            system_group: json.system_group.map(|s| s.id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinkJson {
    #[serde(default)]
    rel: String,
    #[serde(default)]
    href: String,
    #[serde(rename = "gd$etag")]
    etag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContactJson {
    id: Option<Text>,
    title: Option<Text>,
    #[serde(rename = "gd$name")]
    name: Option<NameJson>,
    #[serde(rename = "gd$email", default)]
    email: Vec<EmailJson>,
    content: Option<Text>,
    #[serde(rename = "gContact$groupMembershipInfo", default)]
    group_membership_info: Vec<MembershipJson>,
    updated: Option<Text>,
    #[serde(rename = "gd$phoneNumber", default)]
    phone_number: Vec<PhoneJson>,
    #[serde(rename = "gd$organization", default)]
    organization: Vec<OrganizationJson>,
    #[serde(rename = "gContact$birthday")]
    birthday: Option<BirthdayJson>,
    #[serde(rename = "gd$structuredPostalAddress", default)]
    structured_postal_address: Vec<AddressJson>,
    #[serde(default)]
    link: Vec<LinkJson>,
    #[serde(rename = "gd$im", default)]
    im: Vec<ImJson>,
    #[serde(rename = "gContact$website", default)]
    website: Vec<WebsiteJson>,
    #[serde(rename = "gd$extendedProperty", default)]
    extended_property: Vec<ExtendedPropertyJson>,
}

#[derive(Debug, Deserialize)]
struct NameJson {
    #[serde(rename = "gd$fullName")]
    full_name: Option<Text>,
    #[serde(rename = "gd$givenName")]
    given_name: Option<Text>,
    #[serde(rename = "gd$familyName")]
    family_name: Option<Text>,
    #[serde(rename = "gd$namePrefix")]
    name_prefix: Option<Text>,
    #[serde(rename = "gd$additionalName")]
    additional_name: Option<Text>,
    #[serde(rename = "gd$nameSuffix")]
    name_suffix: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct EmailJson {
    address: String,
    primary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MembershipJson {
    href: String,
    deleted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhoneJson {
    #[serde(rename = "$t", default)]
    number: String,
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationJson {
    #[serde(rename = "gd$orgName")]
    name: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct BirthdayJson {
    when: String,
}

#[derive(Debug, Deserialize)]
struct AddressJson {
    rel: Option<String>,
    #[serde(rename = "gd$street")]
    street: Option<Text>,
    #[serde(rename = "gd$city")]
    city: Option<Text>,
    #[serde(rename = "gd$region")]
    region: Option<Text>,
    #[serde(rename = "gd$neighborhood")]
    neighborhood: Option<Text>,
    #[serde(rename = "gd$postcode")]
    postcode: Option<Text>,
    #[serde(rename = "gd$country")]
    country: Option<Text>,
    #[serde(rename = "gd$pobox")]
    po_box: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct ImJson {
    address: String,
    protocol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebsiteJson {
    href: String,
}

#[derive(Debug, Deserialize)]
struct ExtendedPropertyJson {
    name: String,
    value: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<ContactJson> for ContactEntry {
    fn from(json: ContactJson) -> Self {
        let photo = json
            .link
            .into_iter()
            .find(|l| l.rel == PHOTO_REL)
            .map(|l| PhotoLink { href: l.href, etag: l.etag });

        ContactEntry {
            id: text_of(json.id).unwrap_or_default(),
            title: text_of(json.title),
            name: json.name.map(|n| NameParts {
                full_name: text_of(n.full_name),
                given_name: text_of(n.given_name),
                family_name: text_of(n.family_name),
                name_prefix: text_of(n.name_prefix),
                additional_name: text_of(n.additional_name),
                name_suffix: text_of(n.name_suffix),
            }),
            emails: json
                .email
                .into_iter()
                .map(|e| EmailAddress { address: e.address, primary: e.primary })
                .collect(),
            phone_numbers: json
                .phone_number
                .into_iter()
                .map(|p| PhoneNumber { number: p.number, rel: p.rel })
                .collect(),
            postal_addresses: json
                .structured_postal_address
                .into_iter()
                .map(|a| PostalAddress {
                    rel: a.rel,
                    street: text_of(a.street),
                    city: text_of(a.city),
                    region: text_of(a.region),
                    neighborhood: text_of(a.neighborhood),
                    postcode: text_of(a.postcode),
                    country: text_of(a.country),
                    po_box: text_of(a.po_box),
                })
                .collect(),
            organization: json
                .organization
                .into_iter()
                .next()
                .map(|o| Organization { name: text_of(o.name) }),
            birthday: json.birthday.map(|b| b.when),
            group_memberships: json
                .group_membership_info
                .into_iter()
                .filter(|m| m.deleted.as_deref() != Some("true"))
                .map(|m| m.href)
                .collect(),
            im_addresses: json
                .im
                .into_iter()
                .map(|i| ImAddress { protocol: i.protocol, address: i.address })
                .collect(),
            websites: json.website.into_iter().map(|w| w.href).collect(),
            note: text_of(json.content),
            extended_properties: json
                .extended_property
                .into_iter()
                .map(|p| ExtendedProperty {
                    name: p.name,
                    value: p.value,
                    blob: if p.rest.is_empty() {
                        None
                    } else {
                        Some(Value::Object(p.rest).to_string())
                    },
                })
                .collect(),
            updated: text_of(json.updated),
            photo,
        }
    }
}
