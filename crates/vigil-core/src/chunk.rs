//! Markdown chunking for memory ingestion.
//!
//! Splits a document into standalone chunks at heading and blank-line
//! boundaries, packing consecutive content lines up to a character budget.
//! Heading lines themselves are dropped: a chunk must read as standalone
//! prose, not as an outline fragment.

/// Chunks at or below this many characters are discarded as noise.
pub const MIN_CHUNK_CHARS: usize = 20;

/// Default character budget per chunk.
pub const DEFAULT_MAX_CHARS: usize = 400;

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Boundaries are markdown headings (`#`-prefixed lines) and blank lines;
/// both close the current chunk without being included in any chunk. A
/// content line that would push the current chunk past the budget starts a
/// new chunk instead, so a single line longer than `max_chars` becomes a
/// chunk on its own rather than being split mid-line.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    let mut close = |current: &mut String, current_chars: &mut usize, chunks: &mut Vec<String>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        current.clear();
        *current_chars = 0;
    };

    for line in text.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            close(&mut current, &mut current_chars, &mut chunks);
            continue;
        }

        let line_chars = line.chars().count();
        if current_chars + line_chars > max_chars {
            close(&mut current, &mut current_chars, &mut chunks);
        }
        current.push_str(line);
        current.push('\n');
        current_chars += line_chars + 1;
    }
    close(&mut current, &mut current_chars, &mut chunks);

    chunks.retain(|c| c.chars().count() > MIN_CHUNK_CHARS);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_force_boundaries() {
        let para = "x".repeat(150);
        let text = format!("{para}\n\n{para}\n\n{para}\n");
        let chunks = split_into_chunks(&text, 400);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() == 150));
    }

    #[test]
    fn test_headings_are_boundaries_and_dropped() {
        let text = "# Title\nfirst paragraph of content here\n## Section\nsecond paragraph of content here\n";
        let chunks = split_into_chunks(text, 400);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| !c.contains('#')));
    }

    #[test]
    fn test_budget_starts_a_new_chunk() {
        let a = "a".repeat(300);
        let b = "b".repeat(300);
        let text = format!("{a}\n{b}\n");
        let chunks = split_into_chunks(&text, 400);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], a);
        assert_eq!(chunks[1], b);
    }

    #[test]
    fn test_oversized_line_becomes_its_own_chunk() {
        let huge = "z".repeat(900);
        let chunks = split_into_chunks(&huge, 400);
        assert_eq!(chunks, vec![huge]);
    }

    #[test]
    fn test_tiny_chunks_are_discarded() {
        let text = "short\n\nthis paragraph is comfortably long enough to survive\n";
        let chunks = split_into_chunks(text, 400);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("this paragraph"));
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(split_into_chunks("", 400).is_empty());
        assert!(split_into_chunks("\n\n# Heading\n\n", 400).is_empty());
    }

    #[test]
    fn test_multiline_paragraph_packs_into_one_chunk() {
        let text = "line one of the note body\nline two of the note body\nline three of the note body\n";
        let chunks = split_into_chunks(text, 400);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].lines().count(), 3);
    }
}
