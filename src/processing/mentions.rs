use regex::{Regex, RegexBuilder};

use crate::message::ChatMessage;

/// Counts configured trigger words across a day of messages.
pub struct MentionCounter {
    patterns: Vec<Regex>,
}

impl MentionCounter {
    /// Compile `patterns` case-insensitively. Invalid patterns are logged and skipped.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match RegexBuilder::new(p).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(pattern = %p, error = %e, "Invalid mention pattern, skipped");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Sum of matches of every pattern over every message. A word hit by two
    /// patterns (exact form and root form) counts twice.
    pub fn count(&self, messages: &[ChatMessage]) -> usize {
        let total = messages
            .iter()
            .map(|m| {
                self.patterns
                    .iter()
                    .map(|re| re.find_iter(&m.text).count())
                    .sum::<usize>()
            })
            .sum();
        tracing::debug!(total, patterns = self.patterns.len(), "Mentions counted");
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MentionConfig;
    use crate::test_helpers::msg;

    #[test]
    fn test_default_patterns_count_forms_and_roots() {
        let counter = MentionCounter::new(&MentionConfig::default().patterns);
        let messages = vec![
            msg("1", "Ann", "Він мєнт"),
            msg("2", "Bob", "ментівський підхід"),
            msg("3", "Cat", "нічого такого"),
        ];
        // "мєнт" matches the exact and the root pattern; "ментівський" only the root.
        assert_eq!(counter.count(&messages), 3);
    }

    #[test]
    fn test_case_insensitive() {
        let counter = MentionCounter::new(&["\\bfaceit\\b".to_string()]);
        assert_eq!(counter.count(&[msg("1", "Ann", "FACEIT Faceit faceit")]), 3);
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let counter = MentionCounter::new(&["(unclosed".to_string(), "ok".to_string()]);
        assert!(!counter.is_empty());
        assert_eq!(counter.count(&[msg("1", "Ann", "ok ok")]), 2);
        assert!(MentionCounter::new(&[]).is_empty());
    }
}
