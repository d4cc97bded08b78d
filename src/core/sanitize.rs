// src/core/sanitize.rs

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#36;", "$")
        .replace("&quot;", "\"")
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Brand cell from a user file: strip a BOM and trim the ends.
/// Inner spacing is kept as written. Empty after cleaning means "skip this row".
pub fn clean_brand(raw: &str) -> Option<String> {
    let s = raw.trim_start_matches('\u{feff}').trim();
    if s.is_empty() { None } else { Some(s!(s)) }
}

/// Visible text of a price element, ready for number matching.
pub fn price_text(raw: &str) -> String {
    normalize_ws(&normalize_entities(raw))
}
