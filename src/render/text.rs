// src/render/text.rs
// =============================================================================
// Terminal rendering of discoveries and source files.
//
// Layout:
//
//   🐉 Discovery 1  (src/net.c)
//      │ // don't touch this, it works and nobody knows why
//      │ int retries = 7;
//      🔗 https://github.com/owner/repo/blob/main/src/net.c
//
//   Prose paragraphs are printed as flattened text, no gutter.
// =============================================================================

use std::io::{self, Write};

use super::markdown::flatten_markdown;
use crate::discovery::{visible_sources, Discovery, DiscoveryKind};
use crate::greptile::SourceEntry;

const GUTTER: &str = "   │ ";

pub fn print_discoveries<W: Write>(out: &mut W, discoveries: &[Discovery]) -> io::Result<()> {
    if discoveries.is_empty() {
        writeln!(out, "🤷 No discoveries in this repository's answer")?;
        return Ok(());
    }

    let mut code_count = 0;

    for discovery in discoveries {
        match &discovery.kind {
            DiscoveryKind::Prose => {
                writeln!(out, "{}", flatten_markdown(&discovery.content))?;
            }
            DiscoveryKind::Code { language } => {
                code_count += 1;
                write!(out, "🐉 Discovery {}", code_count)?;
                if let Some(source) = &discovery.source {
                    write!(out, "  ({})", source.file)?;
                } else if let Some(language) = language {
                    write!(out, "  [{}]", language)?;
                }
                writeln!(out)?;

                for line in discovery.content.lines() {
                    writeln!(out, "{}{}", GUTTER, line)?;
                }
            }
        }

        if let Some(source) = &discovery.source {
            if discovery.is_code() {
                writeln!(out, "   🔗 {}", source.url)?;
            } else {
                writeln!(out, "   🔗 {} ({})", source.file, source.url)?;
            }
        }

        writeln!(out)?;
    }

    Ok(())
}

/// Prints source entries with non-blank content
pub fn print_sources<W: Write>(out: &mut W, sources: &[SourceEntry]) -> io::Result<()> {
    let visible: Vec<&SourceEntry> = visible_sources(sources).collect();
    if visible.is_empty() {
        return Ok(());
    }

    writeln!(out, "📄 Source files ({})", visible.len())?;
    writeln!(out, "{}", "=".repeat(60))?;

    for source in visible {
        writeln!(out, "{}", source.file)?;
        if let Some(url) = &source.url {
            writeln!(out, "   View on GitHub → {}", url)?;
        }
        for line in source.content.trim_end().lines() {
            writeln!(out, "{}{}", GUTTER, line)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::parse_discoveries;

    fn render_discoveries(message: &str) -> String {
        let mut buf = Vec::new();
        print_discoveries(&mut buf, &parse_discoveries(message)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_code_block_gets_gutter() {
        let text = render_discoveries("Hello **world**\n\n```let a = 1;\nlet b = 2;```");
        assert!(text.starts_with("Hello world\n"));
        assert!(text.contains("🐉 Discovery 1\n"));
        assert!(text.contains("   │ let a = 1;\n   │ let b = 2;\n"));
    }

    #[test]
    fn test_attribution_rendered_without_marker() {
        let text = render_discoveries(
            "```// why```\n[Source: foo.go](https://github.com/x/y/blob/main/foo.go)",
        );
        assert!(text.contains("🐉 Discovery 1  (foo.go)"));
        assert!(text.contains("🔗 https://github.com/x/y/blob/main/foo.go"));
        assert!(!text.contains("[Source:"));
        assert!(!text.contains("```"));
    }

    #[test]
    fn test_empty_answer() {
        assert!(render_discoveries("").contains("No discoveries"));
    }

    #[test]
    fn test_blank_sources_not_printed() {
        let sources = vec![
            SourceEntry {
                file: "kept.rs".to_string(),
                content: "fn kept() {}".to_string(),
                url: Some("https://github.com/x/y/blob/main/kept.rs".to_string()),
            },
            SourceEntry {
                file: "blank.rs".to_string(),
                content: "\n  \n".to_string(),
                url: None,
            },
        ];
        let mut buf = Vec::new();
        print_sources(&mut buf, &sources).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("📄 Source files (1)"));
        assert!(text.contains("kept.rs"));
        assert!(text.contains("View on GitHub → https://github.com/x/y/blob/main/kept.rs"));
        assert!(!text.contains("blank.rs"));
    }

    #[test]
    fn test_no_sources_prints_nothing() {
        let mut buf = Vec::new();
        print_sources(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }
}
