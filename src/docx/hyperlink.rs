//! `[short_link]` marker splice.
//!
//! The template is first rendered with the literal marker instead of the real
//! link, then this pass locates the marker in the document's text runs and
//! replaces it with a clickable `<w:hyperlink>` whose visible text and target
//! are both the row's link. The external target is registered through the
//! document relationship part.

use lazy_static::lazy_static;
use regex::Regex;

use super::container::DocxFile;
use super::style::justify_paragraph_inner;
use super::xmlutil::{escape_xml, find_element, text_content};
use super::{DocxError, LETTER_FONT, LETTER_SIZE_HALF_POINTS, LINK_COLOR};

/// Literal marker substituted for the link placeholder during rendering.
pub const LINK_MARKER: &str = "[short_link]";

const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

lazy_static! {
    static ref REL_ID_RE: Regex = Regex::new(r#"Id="rId(\d+)""#).expect("relationship id pattern");
}

/// Replace every `[short_link]` marker in the document with a hyperlink to
/// `url`. Returns `true` when at least one marker was spliced.
pub fn splice_hyperlink(doc: &mut DocxFile, url: &str) -> Result<bool, DocxError> {
    let xml = doc.document_xml()?;
    // The marker can span run boundaries, so the guard has to look at the
    // visible paragraph text, not the raw XML.
    if !document_has_marker(&xml) {
        return Ok(false);
    }

    let (rels, rel_id) = register_hyperlink(&doc.relationships_xml(), url);

    let mut out = String::with_capacity(xml.len() + 256);
    let mut pos = 0;
    while let Some(p) = find_element(&xml, "w:p", pos) {
        out.push_str(&xml[pos..p.start]);
        if p.self_closing {
            out.push_str(&xml[p.start..p.end]);
            pos = p.end;
            continue;
        }

        let inner = &xml[p.inner_start..p.inner_end];
        if text_content(inner).contains(LINK_MARKER) {
            let spliced = splice_paragraph(inner, url, &rel_id);
            out.push_str(&xml[p.start..p.inner_start]);
            out.push_str(&justify_paragraph_inner(&spliced));
            out.push_str(&xml[p.inner_end..p.end]);
        } else {
            out.push_str(&xml[p.start..p.end]);
        }
        pos = p.end;
    }
    out.push_str(&xml[pos..]);

    doc.set_document_xml(out);
    doc.set_relationships_xml(rels);
    Ok(true)
}

/// True when any paragraph's concatenated run text contains the marker.
fn document_has_marker(xml: &str) -> bool {
    let mut pos = 0;
    while let Some(p) = find_element(xml, "w:p", pos) {
        if !p.self_closing && text_content(&xml[p.inner_start..p.inner_end]).contains(LINK_MARKER)
        {
            return true;
        }
        pos = p.end;
    }
    false
}

/// Splice within one paragraph. Runs that contain the whole marker are split
/// in place; when the marker only exists across run boundaries the paragraph
/// is rebuilt from its flattened text (paragraph properties are kept).
fn splice_paragraph(inner: &str, url: &str, rel_id: &str) -> String {
    let mut out = String::with_capacity(inner.len() + 256);
    let mut pos = 0;
    let mut matched = false;

    while let Some(r) = find_element(inner, "w:r", pos) {
        out.push_str(&inner[pos..r.start]);
        let run_text = if r.self_closing {
            String::new()
        } else {
            text_content(&inner[r.inner_start..r.inner_end])
        };
        if run_text.contains(LINK_MARKER) {
            push_split_run(&mut out, &run_text, url, rel_id);
            matched = true;
        } else {
            out.push_str(&inner[r.start..r.end]);
        }
        pos = r.end;
    }
    out.push_str(&inner[pos..]);

    if matched {
        return out;
    }

    // Marker split across runs: rebuild the paragraph from its whole text.
    let mut rebuilt = String::with_capacity(inner.len() + 256);
    if let Some(ppr) = find_element(inner, "w:pPr", 0) {
        if ppr.start == 0 {
            rebuilt.push_str(&inner[ppr.start..ppr.end]);
        }
    }
    push_split_run(&mut rebuilt, &text_content(inner), url, rel_id);
    rebuilt
}

/// Emit `before` + hyperlink + `after` for one text containing the marker.
/// Only the first occurrence is split, matching the row renderer's contract.
fn push_split_run(out: &mut String, text: &str, url: &str, rel_id: &str) {
    let mut parts = text.splitn(2, LINK_MARKER);
    let before = parts.next().unwrap_or("");
    let after = parts.next().unwrap_or("");

    if !before.is_empty() {
        out.push_str(&plain_run(before));
    }
    out.push_str(&hyperlink_run(url, rel_id));
    if !after.is_empty() {
        out.push_str(&plain_run(after));
    }
}

fn plain_run(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r>"#,
        font = LETTER_FONT,
        size = LETTER_SIZE_HALF_POINTS,
        text = escape_xml(text),
    )
}

fn hyperlink_run(url: &str, rel_id: &str) -> String {
    format!(
        concat!(
            r#"<w:hyperlink r:id="{id}">"#,
            r#"<w:r><w:rPr>"#,
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
            r#"<w:color w:val="{color}"/><w:u w:val="single"/>"#,
            r#"</w:rPr><w:t xml:space="preserve">{text}</w:t></w:r>"#,
            r#"</w:hyperlink>"#,
        ),
        id = rel_id,
        font = LETTER_FONT,
        size = LETTER_SIZE_HALF_POINTS,
        color = LINK_COLOR,
        text = escape_xml(url),
    )
}

/// Append an external hyperlink relationship for `url`, allocating the next
/// free `rIdN`. Returns the rewritten relationship XML and the new id.
fn register_hyperlink(rels_xml: &str, url: &str) -> (String, String) {
    let max_id = REL_ID_RE
        .captures_iter(rels_xml)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let rel_id = format!("rId{}", max_id + 1);

    let relationship = format!(
        r#"<Relationship Id="{id}" Type="{ty}" Target="{target}" TargetMode="External"/>"#,
        id = rel_id,
        ty = HYPERLINK_REL_TYPE,
        target = escape_xml(url),
    );

    let rewritten = match rels_xml.rfind("</Relationships>") {
        Some(idx) => {
            let mut out = String::with_capacity(rels_xml.len() + relationship.len());
            out.push_str(&rels_xml[..idx]);
            out.push_str(&relationship);
            out.push_str(&rels_xml[idx..]);
            out
        }
        None => format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            ),
            relationship
        ),
    };

    (rewritten, rel_id)
}
