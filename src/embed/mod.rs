//! Embeddable link extraction from rendered notes.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::OnceLock;

const AUTOLINK_CLASS: &str = "autolink";

fn anchor_regex() -> &'static Regex {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    ANCHOR.get_or_init(|| {
        // Quoted attribute values may contain '>'
        Regex::new(r#"(?is)<a(\s(?:[^>"']|"[^"]*"|'[^']*')*)?>"#)
            .expect("Invalid Regex, this should be fixed at compile time.")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
            .expect("Invalid Regex, this should be fixed at compile time.")
    })
}

fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    attribute_regex().captures_iter(attributes).find_map(|captures| {
        let key = captures.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))
            .map(|m| m.as_str())
    })
}

/// Returns the href of every `<a class="autolink">` anchor, in document order.
pub fn extract_embeddable_links(html: &str) -> Vec<String> {
    anchor_regex()
        .captures_iter(html)
        .filter_map(|captures| {
            let attributes = captures.get(1)?.as_str();
            let is_autolink = attribute(attributes, "class")
                .map(|classes| {
                    decode_html_entities(classes)
                        .split_whitespace()
                        .any(|c| c == AUTOLINK_CLASS)
                })
                .unwrap_or(false);
            if !is_autolink {
                return None;
            }
            attribute(attributes, "href").map(|href| decode_html_entities(href).into_owned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_autolinks_in_order() {
        let html = r#"<p>Watch <a class="autolink" href="https://youtu.be/a">this</a>
            and <a href='https://example.com/b' class="link autolink">that</a></p>"#;
        assert_eq!(
            extract_embeddable_links(html),
            vec!["https://youtu.be/a", "https://example.com/b"]
        );
    }

    #[test]
    fn ignores_other_anchors() {
        let html = r#"<a href="https://example.com">plain</a>
            <a class="autolinked" href="https://example.com/x">near miss</a>
            <abbr class="autolink" title="not an anchor">x</abbr>"#;
        assert!(extract_embeddable_links(html).is_empty());
    }

    #[test]
    fn skips_autolinks_without_href() {
        let html =
            r#"<a class="autolink">dangling</a><A CLASS=autolink HREF=https://x.io/y>ok</A>"#;
        assert_eq!(extract_embeddable_links(html), vec!["https://x.io/y"]);
    }

    #[test]
    fn decodes_entities_in_href() {
        let html = r#"<a class="autolink" href="https://youtube.com/watch?v=abc&amp;t=10">OP</a>"#;
        assert_eq!(
            extract_embeddable_links(html),
            vec!["https://youtube.com/watch?v=abc&t=10"]
        );
    }

    #[test]
    fn quoted_attribute_values_may_contain_angle_brackets() {
        let html = r#"<a title="a > b" class="autolink" href="https://x.io/1">one</a>
            <a data-x='<' href="https://x.io/2" class="autolink">two</a>"#;
        assert_eq!(
            extract_embeddable_links(html),
            vec!["https://x.io/1", "https://x.io/2"]
        );
    }

    #[test]
    fn plain_text_has_no_links() {
        assert!(extract_embeddable_links("just some notes, 12 episodes in").is_empty());
    }
}
