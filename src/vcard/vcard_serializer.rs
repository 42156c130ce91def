//! vCard serialization.

use super::{Address, StructuredName, VCard, VCardParameter, VCardProperty, VCardValue, VCARD_VERSION};
use super::{escape_param_value, escape_text, fold_line};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Serializes a card to vCard 3.0 text.
///
/// Every content line, including the last `END:VCARD`, is terminated by CRLF.
pub fn serialize_vcard(card: &VCard) -> String {
    let mut output = String::new();

    output.push_str("BEGIN:VCARD\r\n");
    output.push_str("VERSION:");
    output.push_str(VCARD_VERSION);
    output.push_str("\r\n");

    for prop in &card.properties {
        serialize_property(prop, &mut output);
    }

    output.push_str("END:VCARD\r\n");
    output
}

fn serialize_property(prop: &VCardProperty, output: &mut String) {
    let mut line = String::new();
    line.push_str(&prop.name);

    for param in &prop.params {
        serialize_parameter(param, &mut line);
    }

    line.push(':');
    serialize_value(&prop.value, &mut line);

    output.push_str(&fold_line(&line));
    output.push_str("\r\n");
}

fn serialize_parameter(param: &VCardParameter, output: &mut String) {
    output.push(';');
    output.push_str(&param.name);
    output.push('=');

    for (i, value) in param.values.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        let (escaped, needs_quotes) = escape_param_value(value);
        if needs_quotes {
            output.push('"');
            output.push_str(&escaped);
            output.push('"');
        } else {
            output.push_str(&escaped);
        }
    }
}

fn serialize_value(value: &VCardValue, output: &mut String) {
    match value {
        VCardValue::Text(s) => output.push_str(&escape_text(s)),
        VCardValue::TextList(list) => {
            let escaped: Vec<String> = list.iter().map(|s| escape_text(s)).collect();
            output.push_str(&escaped.join(","));
        }
        VCardValue::Uri(s) => output.push_str(s),
        VCardValue::StructuredName(name) => serialize_structured_name(name, output),
        VCardValue::Address(addr) => serialize_address(addr, output),
        VCardValue::Organization(parts) => {
            let escaped: Vec<String> = parts.iter().map(|s| escape_text(s)).collect();
            output.push_str(&escaped.join(";"));
        }
        VCardValue::Binary(bytes) => output.push_str(&STANDARD.encode(bytes)),
    }
}

fn serialize_structured_name(name: &StructuredName, output: &mut String) {
    serialize_components(
        &[&name.family, &name.given, &name.additional, &name.prefix, &name.suffix],
        output,
    );
}

fn serialize_address(addr: &Address, output: &mut String) {
    serialize_components(
        &[
            &addr.po_box,
            &addr.extended,
            &addr.street,
            &addr.city,
            &addr.region,
            &addr.code,
            &addr.country,
        ],
        output,
    );
}

fn serialize_components(components: &[&Option<String>], output: &mut String) {
    let parts: Vec<String> =
        components.iter().map(|c| c.as_deref().map(escape_text).unwrap_or_default()).collect();
    output.push_str(&parts.join(";"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialize_simple_card() {
        let mut card = VCard::new();
        card.add("FN", VCardValue::text("Jane Doe"));

        assert_eq!(card.serialize(), "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane Doe\r\nEND:VCARD\r\n");
    }

    #[test]
    fn serialize_typed_property() {
        let mut card = VCard::new();
        card.add("TEL", VCardValue::text("+1-555-0100")).add_type("CELL");
        card.add("EMAIL", VCardValue::text("jane@example.com")).add_type("PREF");

        let output = card.serialize();
        assert!(output.contains("TEL;TYPE=CELL:+1-555-0100\r\n"));
        assert!(output.contains("EMAIL;TYPE=PREF:jane@example.com\r\n"));
    }

    #[test]
    fn serialize_structured_values() {
        let mut card = VCard::new();
        card.add(
            "N",
            VCardValue::StructuredName(StructuredName {
                family: Some("Doe".to_string()),
                given: Some("Jane".to_string()),
                prefix: Some("Dr.".to_string()),
                ..Default::default()
            }),
        );
        card.add(
            "ADR",
            VCardValue::Address(Address {
                po_box: Some("PO 7".to_string()),
                street: Some("1 Main St".to_string()),
                city: Some("Springfield".to_string()),
                code: Some("12345".to_string()),
                ..Default::default()
            }),
        )
        .add_type("HOME");
        card.add("ORG", VCardValue::Organization(vec!["Acme, Inc.".to_string()]));

        let output = card.serialize();
        assert!(output.contains("N:Doe;Jane;;Dr.;\r\n"));
        assert!(output.contains("ADR;TYPE=HOME:PO 7;;1 Main St;Springfield;;12345;\r\n"));
        assert!(output.contains("ORG:Acme\\, Inc.\r\n"));
    }

    #[test]
    fn serialize_text_list_escapes_items() {
        let mut card = VCard::new();
        card.add("CATEGORIES", VCardValue::TextList(vec!["Friends".into(), "Work, Old".into()]));

        assert!(card.serialize().contains("CATEGORIES:Friends,Work\\, Old\r\n"));
    }

    #[test]
    fn serialize_uri_unescaped() {
        let mut card = VCard::new();
        card.add("URL", VCardValue::Uri("http://example.com/a;b,c".to_string()));

        assert!(card.serialize().contains("URL:http://example.com/a;b,c\r\n"));
    }

    #[test]
    fn serialize_binary_as_base64() {
        let mut card = VCard::new();
        card.add("PHOTO", VCardValue::Binary(b"jpeg".to_vec()))
            .add_param("ENCODING", "b")
            .add_type("image/jpeg");

        assert!(card.serialize().contains("PHOTO;ENCODING=b;TYPE=image/jpeg:anBlZw==\r\n"));
    }

    #[test]
    fn serialize_folds_long_lines() {
        let mut card = VCard::new();
        card.add("NOTE", VCardValue::text("X".repeat(100)));

        let output = card.serialize();
        assert!(output.contains("\r\n X"));
        assert!(output.lines().all(|l| l.len() <= 75));
    }
}
