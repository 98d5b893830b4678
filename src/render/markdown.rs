// src/render/markdown.rs
// =============================================================================
// Flattens markdown prose into plain terminal text.
//
// Prose discoveries often carry **bold**, _emphasis_, [links](url) and lists.
// A terminal can't show those, so we walk pulldown-cmark's event stream and
// keep only the readable text:
//   **bold**          -> bold
//   [text](url)       -> text (url)
//   `code`            -> `code`
//   - item            -> • item
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

pub fn flatten_markdown(markdown: &str) -> String {
    let mut out = String::new();
    let mut link_targets: Vec<String> = Vec::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) => out.push_str(&text),
            Event::Code(code) => {
                out.push('`');
                out.push_str(&code);
                out.push('`');
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("• "),
            Event::Start(Tag::Link(_, dest_url, _)) => link_targets.push(dest_url.to_string()),
            Event::End(Tag::Link(..)) => {
                if let Some(url) = link_targets.pop() {
                    out.push_str(&format!(" ({})", url));
                }
            }
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(flatten_markdown("Hello there"), "Hello there");
    }

    #[test]
    fn test_emphasis_removed() {
        assert_eq!(
            flatten_markdown("A **very** _odd_ name"),
            "A very odd name"
        );
    }

    #[test]
    fn test_inline_code_kept() {
        assert_eq!(
            flatten_markdown("Calls `do_the_thing()` twice"),
            "Calls `do_the_thing()` twice"
        );
    }

    #[test]
    fn test_link_shows_target() {
        assert_eq!(
            flatten_markdown("See [main.c](https://github.com/x/y/blob/main/main.c)"),
            "See main.c (https://github.com/x/y/blob/main/main.c)"
        );
    }

    #[test]
    fn test_list_items() {
        assert_eq!(flatten_markdown("- one\n- two"), "• one\n• two");
    }
}
