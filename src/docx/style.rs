//! Uniform style pass and plain-text flattening.
//!
//! Whatever the template author set, the finished letter is normalized to
//! justified paragraphs and Arial 12 runs so every generated document looks
//! the same. Run properties other than font and size (the hyperlink's color
//! and underline included) are left alone.

use super::container::DocxFile;
use super::xmlutil::{find_element, remove_elements, text_content};
use super::{DocxError, LETTER_FONT, LETTER_SIZE_HALF_POINTS};

const JUSTIFIED: &str = r#"<w:jc w:val="both"/>"#;

/// Justify every paragraph and force every run to the fixed font and size.
pub fn apply_uniform_style(doc: &mut DocxFile) -> Result<(), DocxError> {
    let xml = doc.document_xml()?;
    let xml = rewrite_elements(&xml, "w:p", justify_paragraph_inner);
    let xml = rewrite_elements(&xml, "w:r", normalize_run_inner);
    doc.set_document_xml(xml);
    Ok(())
}

/// Flatten the document to plain text: non-empty paragraph texts joined by
/// blank lines, for on-screen preview.
pub fn flatten_text(doc: &DocxFile) -> Result<String, DocxError> {
    let xml = doc.document_xml()?;
    let mut paragraphs = Vec::new();
    let mut pos = 0;
    while let Some(p) = find_element(&xml, "w:p", pos) {
        if !p.self_closing {
            let text = text_content(&xml[p.inner_start..p.inner_end]);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                paragraphs.push(trimmed.to_string());
            }
        }
        pos = p.end;
    }
    Ok(paragraphs.join("\n\n"))
}

/// Rewrite the inner content of every non-self-closing `tag` element.
fn rewrite_elements(xml: &str, tag: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    while let Some(el) = find_element(xml, tag, pos) {
        out.push_str(&xml[pos..el.start]);
        if el.self_closing {
            out.push_str(&xml[el.start..el.end]);
        } else {
            out.push_str(&xml[el.start..el.inner_start]);
            out.push_str(&rewrite(&xml[el.inner_start..el.inner_end]));
            out.push_str(&xml[el.inner_end..el.end]);
        }
        pos = el.end;
    }
    out.push_str(&xml[pos..]);
    out
}

/// Force `w:jc val="both"` on one paragraph's properties, creating the
/// `w:pPr` element when the paragraph has none.
pub(crate) fn justify_paragraph_inner(inner: &str) -> String {
    let ppr = match find_element(inner, "w:pPr", 0) {
        Some(ppr) if ppr.start == 0 => ppr,
        _ => return format!("<w:pPr>{JUSTIFIED}</w:pPr>{inner}"),
    };

    if ppr.self_closing {
        let mut out = format!("<w:pPr>{JUSTIFIED}</w:pPr>");
        out.push_str(&inner[ppr.end..]);
        return out;
    }

    let props = remove_elements(&inner[ppr.inner_start..ppr.inner_end], "w:jc");
    // w:jc must precede the paragraph mark's run properties when present.
    let insert_at = props.find("<w:rPr").unwrap_or(props.len());

    let mut out = String::with_capacity(inner.len() + JUSTIFIED.len());
    out.push_str(&inner[..ppr.inner_start]);
    out.push_str(&props[..insert_at]);
    out.push_str(JUSTIFIED);
    out.push_str(&props[insert_at..]);
    out.push_str(&inner[ppr.inner_end..]);
    out
}

/// Force the fixed font and size on one run's properties, creating the
/// `w:rPr` element when the run has none.
fn normalize_run_inner(inner: &str) -> String {
    let forced = format!(
        r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
        font = LETTER_FONT,
        size = LETTER_SIZE_HALF_POINTS,
    );

    let rpr = match find_element(inner, "w:rPr", 0) {
        Some(rpr) if rpr.start == 0 => rpr,
        _ => return format!("<w:rPr>{forced}</w:rPr>{inner}"),
    };

    if rpr.self_closing {
        let mut out = format!("<w:rPr>{forced}</w:rPr>");
        out.push_str(&inner[rpr.end..]);
        return out;
    }

    let props = &inner[rpr.inner_start..rpr.inner_end];
    let props = remove_elements(props, "w:rFonts");
    let props = remove_elements(&props, "w:sz");
    let props = remove_elements(&props, "w:szCs");

    let mut out = String::with_capacity(inner.len() + forced.len());
    out.push_str(&inner[..rpr.inner_start]);
    out.push_str(&forced);
    out.push_str(&props);
    out.push_str(&inner[rpr.inner_end..]);
    out
}
