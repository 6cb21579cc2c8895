//! Restricted HTML for rich-text schedule fields.
//!
//! Each field accepts a small whitelist of inline tags. Anything else is
//! stripped and its text content kept. Angle brackets left in text are
//! escaped, so stripping a tag can never splice a new one together.

use std::sync::OnceLock;

use regex::Regex;

/// Rich-text fields and their markup allowances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Day description: basic emphasis only
    DayDescription,
    /// Item title: basic emphasis only
    ItemTitle,
    /// Item description: emphasis, paragraphs, line breaks and links
    ItemDescription,
    /// No markup at all (ids, time values)
    Plain,
}

const EMPHASIS: &[&str] = &["b", "i", "strong", "em"];
const DESCRIPTION: &[&str] = &["b", "i", "strong", "em", "p", "br", "a"];
const VOID: &[&str] = &["br"];

impl FieldKind {
    fn allowed_tags(&self) -> &'static [&'static str] {
        match self {
            FieldKind::DayDescription | FieldKind::ItemTitle => EMPHASIS,
            FieldKind::ItemDescription => DESCRIPTION,
            FieldKind::Plain => &[],
        }
    }
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b([^>]*)>").expect("tag pattern is valid")
    })
}

fn comment_pattern() -> &'static Regex {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"))
}

fn href_pattern() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("href pattern is valid")
    })
}

/// Reduces `html` to the markup allowed for `field`
///
/// Allowed tags are re-emitted lowercase and without attributes, except
/// `a[href]`. Links with a `javascript:` target lose their `href`.
pub fn sanitize(html: &str, field: FieldKind) -> String {
    let allowed = field.allowed_tags();
    let html = comment_pattern().replace_all(html, "");

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for caps in tag_pattern().captures_iter(&html) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        push_text(&mut out, &html[last..whole.start]);
        last = whole.end;

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        if !allowed.contains(&name.as_str()) {
            continue;
        }

        if closing {
            if !VOID.contains(&name.as_str()) {
                out.push_str(&format!("</{}>", name));
            }
        } else if name == "a" {
            match safe_href(&caps[3]) {
                Some(href) => out.push_str(&format!("<a href=\"{}\">", href)),
                None => out.push_str("<a>"),
            }
        } else {
            out.push_str(&format!("<{}>", name));
        }
    }
    push_text(&mut out, &html[last..]);
    out
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Removes all markup, keeping text
///
/// The result is for display, so escaped angle brackets are turned back
/// into characters.
pub fn to_plain_text(html: &str) -> String {
    sanitize(html, FieldKind::Plain).replace("&lt;", "<").replace("&gt;", ">")
}

fn safe_href(attributes: &str) -> Option<String> {
    let caps = href_pattern().captures(attributes)?;
    let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?.as_str().trim();
    let scheme: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") {
        return None;
    }
    Some(value.replace('"', "&quot;").replace('<', "&lt;"))
}
