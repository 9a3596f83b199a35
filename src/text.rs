/// Cut `s` to at most `max` characters, marking the cut with `...`.
/// Counts chars, not bytes, so multi-byte names are never split.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate("Acme", 18), "Acme");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn long_text_keeps_max_chars_including_marker() {
        let cut = truncate("Machine Learning Engineer", 10);
        assert_eq!(cut, "Machine...");
        assert_eq!(cut.chars().count(), 10);
    }

    #[test]
    fn multibyte_names_are_cut_on_char_boundaries() {
        assert_eq!(truncate("Zürich Ärzte GmbH", 9), "Zürich...");
    }
}
