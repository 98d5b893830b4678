// src/discovery/lexer.rs
// =============================================================================
// Splits a query answer into paragraphs and each paragraph into tokens.
//
// Grammar (informal):
//   message     = paragraph { "\n\n" paragraph }
//   paragraph   = { token }
//   token       = fence | attribution | text
//   fence       = "```"
//   attribution = "[Source:" file "](" url ")"
//   text        = anything else
//
// A "[Source:" that isn't followed by a complete "](url)" is plain text.
// A run of four or more backticks is a fence followed by text backticks.
// =============================================================================

pub const FENCE: &str = "```";
const ATTRIBUTION_OPEN: &str = "[Source:";
const PARAGRAPH_BREAK: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Fence,
    Attribution { file: &'a str, url: &'a str },
}

impl Token<'_> {
    /// Text made only of whitespace (newlines between a fence and the end)
    pub fn is_blank(&self) -> bool {
        matches!(self, Token::Text(text) if text.trim().is_empty())
    }
}

/// Paragraphs of a message, skipping whitespace-only ones
pub fn paragraphs(message: &str) -> impl Iterator<Item = &str> {
    message
        .split(PARAGRAPH_BREAK)
        .filter(|paragraph| !paragraph.trim().is_empty())
}

pub fn tokenize(paragraph: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < paragraph.len() {
        let rest = &paragraph[pos..];

        if rest.starts_with(FENCE) {
            push_text(&mut tokens, &paragraph[text_start..pos]);
            tokens.push(Token::Fence);
            pos += FENCE.len();
            text_start = pos;
            continue;
        }

        if rest.starts_with(ATTRIBUTION_OPEN) {
            if let Some((file, url, consumed)) = scan_attribution(rest) {
                push_text(&mut tokens, &paragraph[text_start..pos]);
                tokens.push(Token::Attribution { file, url });
                pos += consumed;
                text_start = pos;
                continue;
            }
        }

        // Step one whole character so slicing stays on a char boundary
        pos += rest.chars().next().map_or(1, char::len_utf8);
    }

    push_text(&mut tokens, &paragraph[text_start..]);
    tokens
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
}

// Reads "[Source: file](url)" at the start of `input`.
// Returns (file, url, bytes consumed).
fn scan_attribution(input: &str) -> Option<(&str, &str, usize)> {
    let after_open = &input[ATTRIBUTION_OPEN.len()..];

    let close_bracket = after_open.find(']')?;
    let file = after_open[..close_bracket].trim();
    if file.is_empty() || file.contains('\n') {
        return None;
    }

    let after_bracket = &after_open[close_bracket + 1..];
    let link = after_bracket.strip_prefix('(')?;
    let close_paren = link.find(')')?;
    let url = link[..close_paren].trim();
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }

    let consumed = ATTRIBUTION_OPEN.len() + close_bracket + 1 + 1 + close_paren + 1;
    Some((file, url, consumed))
}
