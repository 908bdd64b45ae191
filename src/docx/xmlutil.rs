//! Minimal XML helpers for WordprocessingML.
//!
//! The document part is rewritten with targeted string surgery instead of a
//! full XML parse: elements of interest (`w:p`, `w:r`, `w:t`, ...) never nest
//! within themselves, so a linear scan is enough.

/// Byte ranges of one located element.
#[derive(Debug, Clone, Copy)]
pub struct Element {
    /// Index of the opening `<`.
    pub start: usize,
    /// Index just past the `>` of the open tag.
    pub inner_start: usize,
    /// Index of the closing tag's `<` (equals `inner_start` when self-closing).
    pub inner_end: usize,
    /// Index just past the end of the whole element.
    pub end: usize,
    pub self_closing: bool,
}

/// Find the next `tag` element at or after `from`.
///
/// Matches `<tag>`, `<tag attr=..>` and `<tag/>` forms, and rejects longer
/// names that share the prefix (`w:r` does not match `w:rPr`).
pub fn find_element(xml: &str, tag: &str, from: usize) -> Option<Element> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search = from;

    loop {
        let start = xml.get(search..)?.find(&open)? + search;
        let after = start + open.len();
        let boundary = matches!(
            xml.as_bytes().get(after),
            Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n')
        );
        if !boundary {
            search = after;
            continue;
        }

        let inner_start = xml[after..].find('>')? + after + 1;
        if xml[..inner_start].ends_with("/>") {
            return Some(Element {
                start,
                inner_start,
                inner_end: inner_start,
                end: inner_start,
                self_closing: true,
            });
        }
        let inner_end = xml[inner_start..].find(&close)? + inner_start;
        return Some(Element {
            start,
            inner_start,
            inner_end,
            end: inner_end + close.len(),
            self_closing: false,
        });
    }
}

/// Concatenated visible text of all `<w:t>` elements inside `xml`.
pub fn text_content(xml: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;
    while let Some(t) = find_element(xml, "w:t", pos) {
        if !t.self_closing {
            out.push_str(&unescape_xml(&xml[t.inner_start..t.inner_end]));
        }
        pos = t.end;
    }
    out
}

/// Remove every `tag` element from `xml`.
pub fn remove_elements(xml: &str, tag: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    while let Some(el) = find_element(xml, tag, pos) {
        out.push_str(&xml[pos..el.start]);
        pos = el.end;
    }
    out.push_str(&xml[pos..]);
    out
}

/// Escape a value for use in XML text or attribute content.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolve the five predefined XML entities; unknown entities pass through.
pub fn unescape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let replaced = [
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&apos;", "'"),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));
        match replaced {
            Some((entity, ch)) => {
                out.push_str(ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
