// ── HTML link and text extraction ──
//
// Deliberately small, scan-based extraction for the page fetcher. This
// handles the tag soup real portals and landing pages serve without
// pulling in a full HTML parser; it is not a scraping framework.

use url::Url;

/// One anchor found in a page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Link {
    /// The raw `href` attribute value.
    pub href: String,
    /// The anchor's visible text, tags stripped.
    pub text: String,
    /// `href` resolved against the page URL, when it resolves.
    pub absolute: Option<String>,
}

/// Extract every `<a href=...>` from `html`, resolving each href
/// against `base`.
pub fn extract_links(html: &str, base: &Url) -> Vec<Link> {
    let lower = ascii_lower(html);
    let mut links = Vec::new();
    let mut from = 0;

    while let Some(rel) = lower[from..].find("<a") {
        let start = from + rel;
        // Require a delimiter after "<a" so "<abbr>" doesn't match.
        match lower.as_bytes().get(start + 2) {
            Some(b' ' | b'\t' | b'\n' | b'\r' | b'>') => {}
            _ => {
                from = start + 2;
                continue;
            }
        }
        let Some(open_end) = html[start..].find('>').map(|i| start + i + 1) else {
            break;
        };

        let tag = &html[start..open_end];
        let href = attribute_value(tag, &lower[start..open_end], "href");

        let (text, next) = match lower[open_end..].find("</a") {
            Some(close_rel) => {
                let close = open_end + close_rel;
                (strip_tags(&html[open_end..close]), close + 3)
            }
            None => (String::new(), open_end),
        };

        if let Some(href) = href {
            let absolute = base.join(&href).ok().map(|u| u.to_string());
            links.push(Link {
                href,
                text,
                absolute,
            });
        }
        from = next;
    }

    links
}

/// Extract clean, readable text from `html`: script and style blocks
/// dropped, tags stripped, entities decoded, whitespace collapsed.
pub fn extract_text(html: &str) -> String {
    let without_scripts = drop_blocks(html, "script");
    let without_styles = drop_blocks(&without_scripts, "style");
    strip_tags(&without_styles)
}

/// Count of whitespace-separated words in extracted text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ── Scanning helpers ─────────────────────────────────────────────────

fn ascii_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Remove every `<tag ...>...</tag>` block, case-insensitively.
fn drop_blocks(html: &str, tag: &str) -> String {
    let lower = ascii_lower(html);
    let open = format!("<{tag}");
    let close = format!("</{tag}");

    let mut out = String::with_capacity(html.len());
    let mut from = 0;
    while let Some(rel) = lower[from..].find(&open) {
        let start = from + rel;
        out.push_str(&html[from..start]);
        match lower[start..].find(&close) {
            Some(close_rel) => {
                let close_start = start + close_rel;
                // Skip past the closing tag's '>'.
                from = match lower[close_start..].find('>') {
                    Some(gt) => close_start + gt + 1,
                    None => lower.len(),
                };
            }
            None => {
                from = lower.len();
            }
        }
    }
    out.push_str(&html[from..]);
    out
}

/// Pull a quoted attribute value out of a single tag's text.
///
/// `tag` and `tag_lower` must cover the same byte range.
fn attribute_value(tag: &str, tag_lower: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=");
    let at = tag_lower.find(&needle)? + needle.len();
    let rest = tag.get(at..)?;
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, quote @ ('"' | '\''))) => {
            let end = rest[1..].find(quote)?;
            Some(rest[1..=end].to_string())
        }
        // Unquoted value: runs to whitespace or tag end.
        Some(_) => {
            let end = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '>')
                .unwrap_or(rest.len());
            Some(rest[..end].to_string())
        }
        None => None,
    }
}

/// Drop tags, decode the common entities, collapse whitespace.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = decode_entities(&out);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        "https://example.com/docs/".parse().expect("base url")
    }

    #[test]
    fn extracts_links_with_text_and_absolute_urls() {
        let html = r#"<p>See <a href="/about">About <b>us</b></a> and
            <a href='https://other.example/x'>elsewhere</a>.</p>"#;
        let links = extract_links(html, &base());

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "/about");
        assert_eq!(links[0].text, "About us");
        assert_eq!(links[0].absolute.as_deref(), Some("https://example.com/about"));
        assert_eq!(links[1].absolute.as_deref(), Some("https://other.example/x"));
    }

    #[test]
    fn relative_hrefs_resolve_against_the_page() {
        let html = r#"<a href="guide.html">guide</a>"#;
        let links = extract_links(html, &base());
        assert_eq!(
            links[0].absolute.as_deref(),
            Some("https://example.com/docs/guide.html")
        );
    }

    #[test]
    fn anchors_without_href_are_skipped() {
        let html = r#"<a name="top">anchor</a><a href="/real">real</a>"#;
        let links = extract_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/real");
    }

    #[test]
    fn abbr_does_not_match_as_anchor() {
        let html = r#"<abbr title="x">GIS</abbr><a href="/y">y</a>"#;
        let links = extract_links(html, &base());
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn text_extraction_drops_scripts_and_styles() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var x = "<b>not text</b>";</script></head>
            <body><h1>Title</h1><p>Hello &amp; welcome.</p></body></html>"#;
        assert_eq!(extract_text(html), "Title Hello & welcome.");
    }

    #[test]
    fn text_extraction_collapses_whitespace() {
        let html = "<p>one\n\n   two</p>\t<p>three</p>";
        let text = extract_text(html);
        assert_eq!(text, "one two three");
        assert_eq!(word_count(&text), 3);
    }

    #[test]
    fn unterminated_script_block_drops_to_end() {
        let html = "before<script>var x = 1;";
        assert_eq!(extract_text(html), "before");
    }
}
