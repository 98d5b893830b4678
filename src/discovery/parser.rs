// src/discovery/parser.rs
// =============================================================================
// Turns lexer tokens into Discovery values.
//
// Per paragraph:
// - starts with a fence      -> code; the opening fence and the closing
//                               fence (if one ends the paragraph) are removed
// - anything else            -> prose, kept as written
// - has a [Source: f](url)   -> attribution captured, marker removed,
//                               leftover fences dropped
// - only an attribution      -> attached to the previous discovery
//
// Parsing never fails. Input that doesn't look like discoveries at all just
// comes back as prose paragraphs.
// =============================================================================

use super::lexer::{paragraphs, tokenize, Token, FENCE};
use super::{Attribution, Discovery, DiscoveryKind};

// Result of parsing one paragraph
enum Parsed {
    Discovery(Discovery),
    AttributionOnly(Attribution),
    Empty,
}

/// Parses a raw query answer into discoveries, in order
pub fn parse_discoveries(message: &str) -> Vec<Discovery> {
    let mut discoveries: Vec<Discovery> = Vec::new();

    for paragraph in paragraphs(message) {
        match parse_paragraph(&tokenize(paragraph)) {
            Parsed::Discovery(discovery) => discoveries.push(discovery),
            Parsed::AttributionOnly(source) => match discoveries.last_mut() {
                Some(previous) if previous.source.is_none() => previous.source = Some(source),
                _ => tracing::debug!(file = %source.file, "dropping attribution with nothing to attach to"),
            },
            Parsed::Empty => {}
        }
    }

    discoveries
}

fn parse_paragraph(tokens: &[Token<'_>]) -> Parsed {
    let source = tokens.iter().find_map(|token| match token {
        Token::Attribution { file, url } => Some(Attribution {
            file: file.to_string(),
            url: url.to_string(),
        }),
        _ => None,
    });

    let body: Vec<Token<'_>> = tokens
        .iter()
        .copied()
        .filter(|token| !matches!(token, Token::Attribution { .. }))
        .collect();

    // Once an attribution marker is present, stray fences are noise
    let keep_inner_fences = source.is_none();

    let first = body.iter().position(|token| !token.is_blank());
    let (kind, content) = match first {
        Some(open) if body[open] == Token::Fence => {
            let inner = strip_closing_fence(&body[open + 1..]);
            let text = render(inner, keep_inner_fences);
            let (language, code) = split_language(&text);
            (DiscoveryKind::Code { language }, code.trim().to_string())
        }
        _ => (
            DiscoveryKind::Prose,
            render(&body, keep_inner_fences).trim().to_string(),
        ),
    };

    match (content.is_empty(), source) {
        (false, source) => Parsed::Discovery(Discovery {
            kind,
            content,
            source,
        }),
        (true, Some(source)) => Parsed::AttributionOnly(source),
        (true, None) => Parsed::Empty,
    }
}

// Drops the last fence if it ends the paragraph (ignoring trailing blanks)
fn strip_closing_fence<'t, 'a>(tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    match tokens.iter().rposition(|token| !token.is_blank()) {
        Some(last) if tokens[last] == Token::Fence => &tokens[..last],
        _ => tokens,
    }
}

fn render(tokens: &[Token<'_>], keep_fences: bool) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Fence if keep_fences => out.push_str(FENCE),
            Token::Fence | Token::Attribution { .. } => {}
        }
    }
    out
}

// "rust\nfn main() {}" -> (Some("rust"), "fn main() {}")
fn split_language(code: &str) -> (Option<String>, &str) {
    match code.split_once('\n') {
        Some((first_line, rest)) if is_language_tag(first_line) && !rest.trim().is_empty() => {
            (Some(first_line.trim().to_string()), rest)
        }
        _ => (None, code),
    }
}

// Info strings we recognise after an opening fence. Anything else on that
// line is part of the excerpt.
const LANGUAGE_TAGS: &[&str] = &[
    "bash", "c", "c++", "cpp", "cs", "csharp", "c#", "css", "dart", "diff", "elixir", "erlang",
    "go", "golang", "h", "haskell", "hpp", "html", "java", "javascript", "js", "json", "jsx",
    "kotlin", "kt", "lua", "makefile", "objc", "ocaml", "perl", "php", "py", "python", "rb",
    "ruby", "rs", "rust", "scala", "sh", "shell", "sql", "swift", "toml", "ts", "tsx",
    "typescript", "xml", "yaml", "yml", "zig", "zsh",
];

fn is_language_tag(line: &str) -> bool {
    let tag = line.trim();
    LANGUAGE_TAGS.iter().any(|known| known.eq_ignore_ascii_case(tag))
}
