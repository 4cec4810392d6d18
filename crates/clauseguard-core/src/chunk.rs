//! Overlapping character-window text chunker.
//!
//! Splits document text into windows of roughly `chunk_size` characters
//! with `overlap` characters carried into the next window. Windows end
//! on word boundaries where possible, so clauses are not cut mid-word.
//! All byte indices are snapped to UTF-8 char boundaries.
//!
//! Chunking is deterministic: the same text and parameters always
//! produce the same chunks, which in turn keeps clause matching and
//! critical-clause detection reproducible per validation run.

/// Split `text` into overlapping chunks.
///
/// Returns an empty vector for empty text. `overlap` values at or above
/// `chunk_size` are treated as no-overlap to guarantee forward progress.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.is_empty() || chunk_size == 0 {
        return chunks;
    }
    let overlap = if overlap >= chunk_size { 0 } else { overlap };

    let len = text.len();
    let mut start = 0usize;
    while start < len {
        let mut end = snap_to_char_boundary(text, (start + chunk_size).min(len));

        if end < len {
            // Prefer to end after the last space in the window.
            if let Some(last_space) = text[start..end].rfind(' ') {
                end = start + last_space + 1;
            }
        }

        // Unbroken runs (or multi-byte snaps) can leave us stuck; take
        // at least one char.
        if end <= start {
            end = next_char_boundary(text, start + 1);
        }

        chunks.push(text[start..end].to_string());

        if end >= len {
            break;
        }
        let next = snap_to_char_boundary(text, end.saturating_sub(overlap));
        start = if next > start { next } else { end };
    }

    chunks
}

/// Snap a byte index back to the nearest valid UTF-8 char boundary.
fn snap_to_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Snap a byte index forward to the nearest valid UTF-8 char boundary.
fn next_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 1000, 100).is_empty());
    }

    #[test]
    fn short_text_single_chunk() {
        let chunks = chunk_text("The interest rate is 5.5% per year.", 1000, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "The interest rate is 5.5% per year.");
    }

    #[test]
    fn chunks_cover_the_whole_text() {
        let text = "word ".repeat(100);
        let chunks = chunk_text(&text, 40, 10);
        assert!(chunks.len() > 1);
        // Last chunk ends where the text ends.
        assert!(text.ends_with(chunks.last().unwrap().as_str()));
        // Every chunk appears verbatim in the source.
        for c in &chunks {
            assert!(text.contains(c.as_str()));
        }
    }

    #[test]
    fn windows_break_on_word_boundaries() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = chunk_text(text, 16, 4);
        for c in &chunks[..chunks.len() - 1] {
            assert!(c.ends_with(' '), "chunk {c:?} cut a word");
        }
    }

    #[test]
    fn overlap_repeats_trailing_text() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 20, 8);
        assert!(chunks.len() > 1);
        // The next window starts `overlap` bytes before the previous end,
        // so chunk N's tail reappears as chunk N+1's head.
        assert!(chunks[0].ends_with(&chunks[1][..8]));
    }

    #[test]
    fn multibyte_text_never_panics() {
        let text = "naïve café — résumé ünïcode ".repeat(20);
        let chunks = chunk_text(&text, 17, 5);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(!c.is_empty());
        }
    }

    #[test]
    fn unbroken_run_is_hard_split() {
        let text = "x".repeat(50);
        let chunks = chunk_text(&text, 20, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 20);
        assert_eq!(chunks[2].len(), 10);
    }

    #[test]
    fn deterministic() {
        let text = "Interest Rate: 5.5%. Maturity Date: 2029-12-31. Collateral: government bonds.";
        assert_eq!(chunk_text(text, 30, 10), chunk_text(text, 30, 10));
    }
}
