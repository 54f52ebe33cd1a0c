use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::io::Cursor;

/// SVG elements an inline icon may use. Everything else is dropped along
/// with its subtree.
const ALLOWED_ELEMENTS: &[&str] = &[
    "svg",
    "g",
    "path",
    "circle",
    "ellipse",
    "line",
    "polyline",
    "polygon",
    "rect",
    "defs",
    "symbol",
    "use",
    "title",
    "desc",
    "lineargradient",
    "radialgradient",
    "stop",
    "clippath",
    "mask",
    "pattern",
    "marker",
    "text",
    "tspan",
];

/// Dangerous URI schemes in href/xlink:href/src attributes
const DANGEROUS_SCHEMES: &[&str] = &[
    "javascript:",
    "data:text/html",
    "data:application",
    "vbscript:",
];

/// Attributes that can contain URIs and need scheme checking
const URI_ATTRIBUTES: &[&str] = &["href", "xlink:href", "src", "action", "formaction"];

/// Clean a fetched icon so it can be inlined into the page.
///
/// Keeps only plain SVG drawing elements and drops event handlers, external
/// `<use>` references, comments, the XML declaration, any DOCTYPE and
/// everything after the root closes. The root `<svg>` is marked
/// `aria-hidden="true"`; with `inherit_color` it is also forced to
/// `stroke="currentColor" fill="none"` so the icon follows the text colour.
/// Returns `None` if the markup does not parse or has no `<svg>` root.
pub fn sanitize_icon(input: &str, inherit_color: bool) -> Option<String> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut skip_depth: usize = 0;
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    continue;
                }

                let tag_name = tag_of(e);
                if !saw_root && tag_name != "svg" {
                    return None;
                }
                if !is_allowed(&tag_name, e) {
                    skip_depth = 1;
                    continue;
                }

                let mut cleaned = clean_attributes(e, !saw_root && inherit_color);
                if !saw_root {
                    saw_root = true;
                    mark_root(&mut cleaned, inherit_color);
                }
                writer.write_event(Event::Start(cleaned)).ok()?;
                depth += 1;
            }
            Ok(Event::End(ref e)) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                writer.write_event(Event::End(e.to_owned())).ok()?;
                depth = depth.saturating_sub(1);
                // nothing after the root element is part of the icon
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if skip_depth > 0 {
                    continue;
                }

                let tag_name = tag_of(e);
                if !saw_root && tag_name != "svg" {
                    return None;
                }
                if !is_allowed(&tag_name, e) {
                    continue;
                }

                let mut cleaned = clean_attributes(e, !saw_root && inherit_color);
                let is_root = !saw_root;
                if is_root {
                    saw_root = true;
                    mark_root(&mut cleaned, inherit_color);
                }
                writer.write_event(Event::Empty(cleaned)).ok()?;
                if is_root {
                    break;
                }
            }
            Ok(Event::Text(ref e)) => {
                if skip_depth > 0 || !saw_root {
                    continue;
                }
                writer.write_event(Event::Text(e.to_owned())).ok()?;
            }
            Ok(Event::CData(ref e)) => {
                if skip_depth > 0 || !saw_root {
                    continue;
                }
                writer.write_event(Event::CData(e.to_owned())).ok()?;
            }
            // comments can carry IE conditional tricks; declarations and
            // doctypes are meaningless inside HTML
            Ok(Event::Comment(_)) | Ok(Event::Decl(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {
                continue;
            }
            Err(_) => return None,
        }
    }

    if !saw_root {
        return None;
    }
    String::from_utf8(writer.into_inner().into_inner()).ok()
}

fn is_allowed(tag_name: &str, e: &BytesStart) -> bool {
    ALLOWED_ELEMENTS.contains(&tag_name) && !(tag_name == "use" && has_external_use_href(e))
}

fn tag_of(e: &BytesStart) -> String {
    std::str::from_utf8(e.name().as_ref())
        .unwrap_or("")
        .to_lowercase()
}

fn mark_root(root: &mut BytesStart, inherit_color: bool) {
    if inherit_color {
        root.push_attribute(("stroke", "currentColor"));
        root.push_attribute(("fill", "none"));
    }
    root.push_attribute(("aria-hidden", "true"));
}

fn is_dangerous_attribute(name: &str) -> bool {
    // "on" + at least one more char = event handler (onclick, onload, etc.)
    let lower = name.to_lowercase();
    lower.starts_with("on") && lower.len() > 2
}

fn has_dangerous_uri(value: &str) -> bool {
    let trimmed = value.trim().to_lowercase();
    DANGEROUS_SCHEMES
        .iter()
        .any(|scheme| trimmed.starts_with(scheme))
}

fn has_external_use_href(e: &BytesStart) -> bool {
    for attr in e.attributes().flatten() {
        let name = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        let lower = name.to_lowercase();
        if lower == "href" || lower == "xlink:href" {
            let val = std::str::from_utf8(&attr.value).unwrap_or("");
            let trimmed = val.trim();
            if trimmed.starts_with("http://")
                || trimmed.starts_with("https://")
                || trimmed.starts_with("//")
            {
                return true;
            }
        }
    }
    false
}

/// Copy the safe attributes of `e`. With `drop_paint`, existing
/// `stroke`/`fill`/`aria-hidden` are left out so the root can be re-marked.
fn clean_attributes(e: &BytesStart, drop_paint: bool) -> BytesStart<'static> {
    let mut cleaned = BytesStart::new(
        std::str::from_utf8(e.name().as_ref())
            .unwrap_or("g")
            .to_string(),
    );

    for attr in e.attributes().flatten() {
        let name = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        let value = std::str::from_utf8(&attr.value).unwrap_or("");
        let lower_name = name.to_lowercase();

        if is_dangerous_attribute(name) {
            continue;
        }
        if URI_ATTRIBUTES.contains(&lower_name.as_str()) && has_dangerous_uri(value) {
            continue;
        }
        if lower_name == "style" {
            let lower_val = value.to_lowercase();
            if lower_val.contains("javascript:") || lower_val.contains("expression(") {
                continue;
            }
        }
        if lower_name == "aria-hidden" || (drop_paint && (lower_name == "stroke" || lower_name == "fill")) {
            continue;
        }

        cleaned.push_attribute((name, value));
    }

    cleaned
}
