// src/discovery/mod.rs
// =============================================================================
// Parsing of the query answer into "discoveries".
//
// The service answers in loosely structured markdown: paragraphs separated
// by blank lines, snippets wrapped in triple backticks, sometimes a
// [Source: file](url) marker pointing at the file a snippet came from.
//
// Submodules:
// - lexer: paragraphs and tokens
// - parser: tokens -> Discovery
// =============================================================================

mod lexer;
mod parser;

pub use parser::parse_discoveries;

use serde::Serialize;

use crate::greptile::SourceEntry;

/// Where a discovery came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub file: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoveryKind {
    Prose,
    Code {
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

/// One unit of the answer: a prose paragraph or a code excerpt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    #[serde(flatten)]
    pub kind: DiscoveryKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Attribution>,
}

impl Discovery {
    pub fn is_code(&self) -> bool {
        matches!(self.kind, DiscoveryKind::Code { .. })
    }
}

/// Source entries worth showing: blank content is filtered out
pub fn visible_sources(sources: &[SourceEntry]) -> impl Iterator<Item = &SourceEntry> {
    sources
        .iter()
        .filter(|source| !source.content.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str, content: &str) -> SourceEntry {
        SourceEntry {
            file: file.to_string(),
            content: content.to_string(),
            url: None,
        }
    }

    #[test]
    fn test_visible_sources_drops_blank_content() {
        let sources = vec![
            entry("a.rs", "fn a() {}"),
            entry("b.rs", "   \n\t"),
            entry("c.rs", ""),
            entry("d.rs", "// d"),
        ];
        let files: Vec<&str> = visible_sources(&sources).map(|s| s.file.as_str()).collect();
        assert_eq!(files, vec!["a.rs", "d.rs"]);
    }

    #[test]
    fn test_discovery_json_shape() {
        let discovery = Discovery {
            kind: DiscoveryKind::Code {
                language: Some("go".to_string()),
            },
            content: "x := 1".to_string(),
            source: None,
        };
        let json = serde_json::to_value(&discovery).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "code", "language": "go", "content": "x := 1" })
        );
        assert!(discovery.is_code());
    }
}
