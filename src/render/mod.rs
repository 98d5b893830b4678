// src/render/mod.rs
// =============================================================================
// Output of a finished search: a human-readable report or JSON.
//
// Both take any std::io::Write so tests can render into a Vec<u8>.
// =============================================================================

mod markdown;
mod text;

pub use text::{print_discoveries, print_sources};

use serde::Serialize;
use std::io::{self, Write};

use crate::discovery::{visible_sources, Discovery};
use crate::github::Branch;
use crate::greptile::SourceEntry;
use crate::search::{IndexState, IndexSubmission, SearchOutcome};

/// What --json prints
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub repository: String,
    pub owner: &'a str,
    pub name: &'a str,
    pub branch: Option<Branch>,
    pub index_state: IndexState,
    pub submission: &'a IndexSubmission,
    pub discoveries: &'a [Discovery],
    pub sources: Vec<&'a SourceEntry>,
}

impl<'a> Report<'a> {
    pub fn from_outcome(outcome: &'a SearchOutcome) -> Self {
        Self {
            repository: outcome.context.repo().to_string(),
            owner: outcome.context.repo().owner(),
            name: outcome.context.repo().name(),
            branch: outcome.context.branch(),
            index_state: outcome.context.state(),
            submission: &outcome.submission,
            discoveries: &outcome.discoveries,
            sources: visible_sources(&outcome.result.sources).collect(),
        }
    }
}

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// The full text report: discoveries, then the source files
pub fn write_report<W: Write>(out: &mut W, outcome: &SearchOutcome) -> io::Result<()> {
    print_discoveries(out, &outcome.discoveries)?;
    print_sources(out, &outcome.result.sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::parse_discoveries;
    use crate::github::RepositoryRef;
    use crate::greptile::SearchResult;
    use crate::search::SearchContext;

    fn outcome() -> SearchOutcome {
        let message = "```// abandon hope```".to_string();
        SearchOutcome {
            context: SearchContext::new(RepositoryRef::parse("x/y").unwrap()),
            submission: IndexSubmission::AlreadyIndexed { branch: Branch::Main },
            discoveries: parse_discoveries(&message),
            result: SearchResult {
                message: Some(message),
                sources: vec![
                    SourceEntry {
                        file: "hope.c".to_string(),
                        content: "// abandon hope".to_string(),
                        url: Some("https://github.com/x/y/blob/main/hope.c".to_string()),
                    },
                    SourceEntry {
                        file: "empty.c".to_string(),
                        content: "  ".to_string(),
                        url: None,
                    },
                ],
            },
        }
    }

    #[test]
    fn test_json_report_shape() {
        let outcome = outcome();
        let report = Report::from_outcome(&outcome);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["repository"], "x/y");
        assert_eq!(json["owner"], "x");
        assert_eq!(json["name"], "y");
        assert_eq!(json["index_state"], "unknown");
        assert_eq!(json["submission"]["status"], "already_indexed");
        assert_eq!(json["submission"]["branch"], "main");
        assert_eq!(json["discoveries"][0]["kind"], "code");
        assert_eq!(json["discoveries"][0]["content"], "// abandon hope");
        assert_eq!(json["sources"].as_array().unwrap().len(), 1);
        assert_eq!(json["sources"][0]["file"], "hope.c");
    }

    #[test]
    fn test_write_json_ends_with_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({ "a": 1 })).unwrap();
        assert!(String::from_utf8(buf).unwrap().ends_with("}\n"));
    }
}
