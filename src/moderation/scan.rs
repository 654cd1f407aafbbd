use linked_hash_set::LinkedHashSet;
use std::collections::BTreeSet;

/// Fixed list of lowercase words which are not allowed in guild messages.
#[derive(Debug, Clone, Default)]
pub struct BannedWords(LinkedHashSet<String>);

impl BannedWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    /// Returns every banned word contained in `text`, ignoring case.
    ///
    /// Words are matched as plain substrings, so `"badword1"` is found in
    /// `"xxBADWORD1xx"` as well.
    pub fn scan_text(&self, text: &str) -> BTreeSet<&str> {
        if text.is_empty() {
            return BTreeSet::new();
        }

        let text = text.to_lowercase();
        self.0
            .iter()
            .filter(|word| text.contains(word.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> BannedWords {
        BannedWords::new(["badword1", "badword2", "badword3"])
    }

    #[test]
    fn scan_ignores_case() {
        let words = words();
        let matched = words.scan_text("BadWord1 text");

        assert!(matched.contains("badword1"));
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn scan_without_match_is_empty() {
        assert!(words().scan_text("a perfectly friendly message").is_empty());
        assert!(words().scan_text("").is_empty());
    }

    #[test]
    fn scan_reports_every_distinct_word() {
        let words = words();
        let matched = words.scan_text("badword2 and BADWORD3 and badword2 again");

        assert_eq!(matched.into_iter().collect::<Vec<_>>(), vec!["badword2", "badword3"]);
    }

    #[test]
    fn configured_words_are_normalized() {
        let words = BannedWords::new(["  Spam ", ""]);

        assert_eq!(words.len(), 1);
        assert!(words.scan_text("no SPAMMING please").contains("spam"));
    }
}
