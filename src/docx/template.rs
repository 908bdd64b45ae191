//! `{{placeholder}}` substitution in the document XML.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::xmlutil::escape_xml;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern");
}

/// Substitute every known `{{field}}` in `xml` with its XML-escaped value.
///
/// Placeholders with no entry in `fields` are left untouched. A placeholder
/// must sit inside a single text run; word processors that split the braces
/// across runs need the template re-saved from a plain editor.
pub fn render_placeholders(xml: &str, fields: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(xml, |caps: &Captures| match fields.get(&caps[1]) {
            Some(value) => escape_xml(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}
