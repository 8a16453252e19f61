//! Terminal rendering for finished assistant turns.
//!
//! Markdown is parsed with pulldown-cmark and mapped to ANSI styling via
//! console. Link destinations are printed next to the link text so the
//! target is visible before the user opens it. Rendering is pure
//! text-in/text-out: the same input always produces the same output.

use console::style;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    Heading,
    Strong,
    Emphasis,
}

/// Render markdown to ANSI-styled terminal text.
pub fn render(markdown: &str) -> String {
    let mut out = String::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut link: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { .. } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    spans.push(Span::Heading);
                }
                Tag::Strong => spans.push(Span::Strong),
                Tag::Emphasis => spans.push(Span::Emphasis),
                Tag::Link { dest_url, .. } => link = Some(dest_url.to_string()),
                Tag::Item => out.push_str("  • "),
                Tag::CodeBlock(_) => out.push('\n'),
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => {
                    spans.pop();
                    out.push('\n');
                }
                TagEnd::Strong | TagEnd::Emphasis => {
                    spans.pop();
                }
                TagEnd::Link => {
                    if let Some(url) = link.take() {
                        out.push_str(&format!(" ({})", style(url).dim().underlined()));
                    }
                }
                TagEnd::Item => out.push('\n'),
                TagEnd::Paragraph => out.push_str("\n\n"),
                TagEnd::CodeBlock => out.push('\n'),
                _ => {}
            },
            Event::Text(text) => out.push_str(&styled(&text, &spans)),
            Event::Code(code) => out.push_str(&style(code.as_ref()).yellow().to_string()),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                out.push_str(&style("────────").dim().to_string());
                out.push('\n');
            }
            _ => {}
        }
    }

    let trimmed = out.trim_end();
    format!("{}\n", trimmed)
}

fn styled(text: &str, spans: &[Span]) -> String {
    if spans.contains(&Span::Heading) {
        style(text).cyan().bold().to_string()
    } else if spans.contains(&Span::Strong) {
        style(text).bold().to_string()
    } else if spans.contains(&Span::Emphasis) {
        style(text).italic().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_is_idempotent() {
        let input = "## Also Recommended\n\n**Cooking in NYC** by *Ada*\n\n- [Watch Video](https://youtube.com/watch?v=abc)\n";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn test_link_destination_is_visible() {
        let output = render("[Watch Video](https://youtube.com/watch?v=abc)");
        assert!(output.contains("Watch Video"));
        assert!(output.contains("https://youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_plain_text_survives() {
        let output = render("just a plain answer");
        assert!(output.contains("just a plain answer"));
    }

    #[test]
    fn test_headings_and_lists_have_structure() {
        let output = render("## Also Recommended\n\n- first\n- second\n");
        assert!(output.contains("Also Recommended"));
        assert!(output.contains("  • first\n"));
        assert!(output.contains("  • second\n"));
    }
}
