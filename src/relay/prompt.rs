//! Grounding prompt assembly.
//!
//! The grounding block is deterministic: one record per match, fixed field
//! order, records joined by a fixed delimiter, in the order the search
//! returned them.

use crate::search::ClipMatch;

/// System instructions sent with every grounded completion.
pub const SYSTEM_INSTRUCTIONS: &str = r###"You are a search assistant for ClipNest, a video content discovery platform.

IMPORTANT: You MUST only use the matched content provided. Do NOT use outside knowledge or make up information. Every title, creator, URL, venue, address, and city must come directly from the matched content. If no strong match exists, say "I couldn't find a strong match for that in the ClipNest database."

Format responses in clean markdown:
- Use **bold** for titles and important info
- Make video URLs clickable: [Watch Video](url)
- Always include: title, creator, summary
- When available, include a 📍 location block with venue, address, city
- Feature the best match (Match 1) prominently at the top
- List remaining matches under "## Also Recommended"
- Keep descriptions concise"###;

/// Delimiter between match records in the grounding block.
const RECORD_DELIMITER: &str = "\n\n---\n\n";

/// Render one match record.
///
/// The location line is present only when at least one of venue, address or
/// city is non-empty.
fn format_match(index: usize, m: &ClipMatch) -> String {
    let location: Vec<&str> = [&m.venue, &m.address, &m.city]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .filter(|value| !value.is_empty())
        .collect();

    let mut lines = vec![
        format!("[Match {}]", index + 1),
        format!("Title: {}", m.title.as_deref().unwrap_or("Untitled")),
        format!("Creator: {}", m.creator.as_deref().unwrap_or("Unknown")),
        format!("Platform: {}", m.platform.as_deref().unwrap_or("N/A")),
    ];
    if !location.is_empty() {
        lines.push(format!("Location: {}", location.join(", ")));
    }
    lines.push(format!("Summary: {}", m.summary.as_deref().unwrap_or("N/A")));
    lines.push(format!(
        "Preview: {}",
        m.transcript_preview.as_deref().unwrap_or("N/A")
    ));
    lines.push(format!("URL: {}", m.video_url.as_deref().unwrap_or("N/A")));
    lines.push(format!("Relevance: {:.1}%", m.similarity * 100.0));

    lines.join("\n")
}

/// Build the grounding block: one record per match, in returned order.
pub fn build_grounding_block(matches: &[ClipMatch]) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| format_match(i, m))
        .collect::<Vec<_>>()
        .join(RECORD_DELIMITER)
}

/// Compose the completion input from the grounding block and user message.
pub fn compose_input(grounding: &str, message: &str) -> String {
    format!(
        "New results from ClipNest database for this query:\n{}\n\nUser: {}",
        grounding, message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match(title: &str, similarity: f32) -> ClipMatch {
        ClipMatch {
            title: Some(title.to_string()),
            creator: Some("Ada".to_string()),
            platform: Some("YouTube".to_string()),
            summary: Some("A summary".to_string()),
            transcript_preview: Some("...preview...".to_string()),
            video_url: Some("https://youtube.com/watch?v=abc".to_string()),
            venue: None,
            address: None,
            city: None,
            similarity,
        }
    }

    #[test]
    fn test_two_matches_render_in_returned_order() {
        let matches = vec![sample_match("First", 0.9), sample_match("Second", 0.8)];
        let block = build_grounding_block(&matches);

        assert_eq!(block.matches("[Match ").count(), 2);
        let first = block.find("[Match 1]").unwrap();
        let second = block.find("[Match 2]").unwrap();
        assert!(first < second);
        assert!(block.find("First").unwrap() < block.find("Second").unwrap());
        assert!(block.contains("\n\n---\n\n"));
    }

    #[test]
    fn test_field_order_is_fixed() {
        let mut m = sample_match("Title here", 0.5);
        m.venue = Some("The Venue".to_string());
        m.city = Some("NYC".to_string());
        let block = build_grounding_block(&[m]);

        let order = [
            "[Match 1]",
            "Title: ",
            "Creator: ",
            "Platform: ",
            "Location: ",
            "Summary: ",
            "Preview: ",
            "URL: ",
            "Relevance: ",
        ];
        let mut last = 0;
        for needle in order {
            let pos = block[last..].find(needle).unwrap_or_else(|| {
                panic!("missing or misordered field: {}", needle);
            });
            last += pos + needle.len();
        }
    }

    #[test]
    fn test_location_line_omitted_when_all_parts_empty() {
        let m = sample_match("No location", 0.4);
        let block = build_grounding_block(&[m]);
        assert!(!block.contains("Location:"));
        assert!(block.contains("Platform: YouTube\nSummary: A summary"));
    }

    #[test]
    fn test_location_joins_present_parts() {
        let mut m = sample_match("With location", 0.4);
        m.venue = Some("Blue Note".to_string());
        m.address = Some(String::new());
        m.city = Some("New York".to_string());
        let block = build_grounding_block(&[m]);
        assert!(block.contains("Location: Blue Note, New York"));
    }

    #[test]
    fn test_relevance_is_one_decimal_percentage() {
        let m = sample_match("Precise", 0.873_4);
        let block = build_grounding_block(&[m]);
        assert!(block.contains("Relevance: 87.3%"));
    }

    #[test]
    fn test_null_fields_render_fallbacks() {
        let m = ClipMatch {
            title: None,
            creator: None,
            platform: None,
            summary: None,
            transcript_preview: None,
            video_url: None,
            venue: None,
            address: None,
            city: None,
            similarity: 0.0,
        };
        let block = build_grounding_block(&[m]);
        assert!(block.contains("Title: Untitled"));
        assert!(block.contains("Creator: Unknown"));
        assert!(block.contains("Platform: N/A"));
        assert!(block.contains("URL: N/A"));
    }

    #[test]
    fn test_compose_input_wraps_context_and_message() {
        let input = compose_input("[Match 1]\nTitle: X", "Find videos about React hooks");
        assert!(input.starts_with("New results from ClipNest database for this query:\n"));
        assert!(input.ends_with("User: Find videos about React hooks"));
        assert!(input.contains("[Match 1]"));
    }
}
