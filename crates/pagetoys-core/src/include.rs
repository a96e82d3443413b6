//! Shared header/footer fragments.
//!
//! Pages ship with empty `header-placeholder` / `footer-placeholder`
//! elements. Composing a page fills them in, sets the header `<h1>` from the
//! per-page title table and marks the nav link for the current page active.
//! Missing fragments or placeholders leave the page as it was.

use std::path::Path;

use crate::storage::IncludeConfig;

pub const HEADER_PLACEHOLDER: &str = "header-placeholder";
pub const FOOTER_PLACEHOLDER: &str = "footer-placeholder";

impl IncludeConfig {
    pub fn page_title(&self, file_name: &str) -> &str {
        self.titles
            .get(file_name)
            .map(String::as_str)
            .unwrap_or(self.default_title.as_str())
    }
}

/// File name part of a URL path, e.g. `/site/index.html` -> `index.html`.
pub fn current_file(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// A nav link is active on its own page; the site root counts as `index.html`.
pub fn is_active(link_href: &str, current_file: &str) -> bool {
    link_href == current_file || (current_file.is_empty() && link_href == "index.html")
}

/// Replace the text of the first `<h1>` in the fragment.
pub fn set_heading(fragment: &str, title: &str) -> String {
    let Some(open) = fragment.find("<h1") else {
        return fragment.to_string();
    };
    let Some(open_end) = fragment[open..].find('>').map(|i| open + i + 1) else {
        return fragment.to_string();
    };
    let Some(close) = fragment[open_end..].find("</h1>").map(|i| open_end + i) else {
        return fragment.to_string();
    };
    format!("{}{}{}", &fragment[..open_end], title, &fragment[close..])
}

/// Add the `active` class to every `<a>` inside a `<nav>` whose `href`
/// matches the page. Links outside navigation are left alone.
pub fn mark_active_links(fragment: &str, current_file: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 16);
    let mut rest = fragment;

    while let Some(start) = find_tag(rest, "nav") {
        let Some(end) = rest[start..].find("</nav>").map(|i| start + i) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&mark_links(&rest[start..end], current_file));
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn mark_links(fragment: &str, current_file: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 16);
    let mut rest = fragment;

    while let Some(start) = rest.find("<a") {
        let Some(end) = rest[start..].find('>').map(|i| start + i) else {
            break;
        };
        out.push_str(&rest[..start]);
        let tag = &rest[start..end];
        let is_anchor = tag[2..].starts_with(|c: char| c.is_whitespace());
        match attr_value(tag, "href") {
            Some(href) if is_anchor && is_active(href, current_file) => {
                out.push_str(&add_class(tag, "active"))
            }
            _ => out.push_str(tag),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Header for `current_file`: page title in the `<h1>`, its nav link active.
pub fn render_header(fragment: &str, current_file: &str, config: &IncludeConfig) -> String {
    let titled = set_heading(fragment, config.page_title(current_file));
    mark_active_links(&titled, current_file)
}

/// Put `fragment` inside the element with `id="placeholder_id"`.
///
/// Returns `None` when no such element exists.
pub fn inject(page: &str, placeholder_id: &str, fragment: &str) -> Option<String> {
    let needle = format!("id=\"{placeholder_id}\"");
    let attr = page.find(&needle)?;
    let open_end = page[attr..].find('>').map(|i| attr + i + 1)?;
    let tag_start = page[..attr].rfind('<')?;
    let tag_name: String = page[tag_start + 1..]
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    let close = matching_close(page, open_end, &tag_name)?;
    Some(format!("{}{}{}", &page[..open_end], fragment, &page[close..]))
}

/// Fill the header and footer placeholders of `page`.
pub fn compose(page: &str, current: &str, site_dir: &Path, config: &IncludeConfig) -> String {
    let mut out = page.to_string();

    match std::fs::read_to_string(site_dir.join(&config.header)) {
        Ok(header) => {
            let header = render_header(&header, current, config);
            match inject(&out, HEADER_PLACEHOLDER, &header) {
                Some(filled) => out = filled,
                None => tracing::warn!("page has no #{HEADER_PLACEHOLDER}"),
            }
        }
        Err(e) => tracing::warn!(file = %config.header, error = %e, "cannot read header fragment"),
    }

    match std::fs::read_to_string(site_dir.join(&config.footer)) {
        Ok(footer) => match inject(&out, FOOTER_PLACEHOLDER, &footer) {
            Some(filled) => out = filled,
            None => tracing::warn!("page has no #{FOOTER_PLACEHOLDER}"),
        },
        Err(e) => tracing::warn!(file = %config.footer, error = %e, "cannot read footer fragment"),
    }

    out
}

/// Position of the next `<name` that opens a `name` element (not `<navbar`).
fn find_tag(html: &str, name: &str) -> Option<usize> {
    let open = format!("<{name}");
    let mut from = 0;
    while let Some(i) = html[from..].find(&open).map(|i| from + i) {
        let next = html[i + open.len()..].chars().next();
        if matches!(next, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            return Some(i);
        }
        from = i + open.len();
    }
    None
}

/// Start of the `</name>` that closes the element whose content begins at
/// `from`, skipping nested elements of the same name.
fn matching_close(html: &str, from: usize, name: &str) -> Option<usize> {
    let close = format!("</{name}>");
    let mut depth = 0usize;
    let mut pos = from;
    loop {
        let next_close = html[pos..].find(&close).map(|i| pos + i)?;
        match find_tag(&html[pos..next_close], name) {
            Some(i) => {
                depth += 1;
                pos += i + name.len() + 1;
            }
            None if depth == 0 => return Some(next_close),
            None => {
                depth -= 1;
                pos = next_close + close.len();
            }
        }
    }
}

fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

fn add_class(tag: &str, class: &str) -> String {
    match tag.find("class=\"") {
        Some(i) => {
            let at = i + "class=\"".len();
            let existing = &tag[at..];
            let classes = existing.split('"').next().unwrap_or("");
            if classes.split_whitespace().any(|c| c == class) {
                return tag.to_string();
            }
            format!("{}{} {}", &tag[..at], class, existing)
        }
        None => format!("{tag} class=\"{class}\""),
    }
}
