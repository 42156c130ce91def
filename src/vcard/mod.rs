//! vCard 3.0 value model and writer.
//
// Cards are built property by property and serialized in insertion order.

mod vcard_escape;
mod vcard_fold;
mod vcard_serializer;

pub use vcard_escape::*;
pub use vcard_fold::*;
pub use vcard_serializer::*;

/// Version string written after `BEGIN:VCARD`
pub const VCARD_VERSION: &str = "3.0";

/// A single contact card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VCard {
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property and returns a handle to it so parameters can be added
    pub fn add(&mut self, name: &str, value: VCardValue) -> &mut VCardProperty {
        self.properties.push(VCardProperty::new(name, value));
        let last = self.properties.len() - 1;
        &mut self.properties[last]
    }

    /// First property with the given name
    pub fn get(&self, name: &str) -> Option<&VCardProperty> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// All properties with the given name, in insertion order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a VCardProperty> + 'a {
        self.properties.iter().filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Serializes this card, see [`serialize_vcard`]
    pub fn serialize(&self) -> String {
        serialize_vcard(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VCardProperty {
    pub name: String,
    pub params: Vec<VCardParameter>,
    pub value: VCardValue,
}

impl VCardProperty {
    pub fn new(name: &str, value: VCardValue) -> Self {
        Self { name: name.to_ascii_uppercase(), params: Vec::new(), value }
    }

    pub fn add_param(&mut self, name: &str, value: &str) -> &mut Self {
        match self.params.iter_mut().find(|p| p.name.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.values.push(value.to_string()),
            None => self.params.push(VCardParameter {
                name: name.to_ascii_uppercase(),
                values: vec![value.to_string()],
            }),
        }
        self
    }

    /// Adds a `TYPE` parameter value
    pub fn add_type(&mut self, value: &str) -> &mut Self {
        self.add_param("TYPE", value)
    }

    pub fn param(&self, name: &str) -> Option<&VCardParameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn has_type(&self, value: &str) -> bool {
        self.param("TYPE")
            .map(|p| p.values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VCardParameter {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VCardValue {
    Text(String),
    /// Comma separated list, e.g. `CATEGORIES`
    TextList(Vec<String>),
    /// Written without escaping
    Uri(String),
    StructuredName(StructuredName),
    Address(Address),
    /// Organization name followed by units
    Organization(Vec<String>),
    /// Raw bytes, written as base64
    Binary(Vec<u8>),
}

impl VCardValue {
    pub fn text(value: impl Into<String>) -> Self {
        VCardValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VCardValue::Text(s) | VCardValue::Uri(s) => Some(s),
            _ => None,
        }
    }
}

/// `N` components: family;given;additional;prefixes;suffixes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredName {
    pub family: Option<String>,
    pub given: Option<String>,
    pub additional: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// `ADR` components: box;extended;street;locality;region;code;country
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub po_box: Option<String>,
    pub extended: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub code: Option<String>,
    pub country: Option<String>,
}
