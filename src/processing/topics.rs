use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::tokenizer::tokenize;
use crate::message::ChatMessage;

/// A ranked keyword. `frequency` is the number of messages mentioning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub keyword: String,
    pub frequency: usize,
}

impl Topic {
    /// Keyword with its first letter capitalised, used when no title was generated.
    pub fn display_name(&self) -> String {
        let mut chars = self.keyword.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Rank keywords across `messages`.
///
/// Each message counts at most once per keyword, so a topic's frequency is
/// never larger than its group can be. Sorted by frequency descending; ties
/// keep first-occurrence order in the token stream. At most `max_topics`
/// entries, none below `min_frequency`.
pub fn rank_topics(messages: &[ChatMessage], max_topics: usize, min_frequency: usize) -> Vec<Topic> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for msg in messages {
        let mut seen_here: HashSet<String> = HashSet::new();
        for token in tokenize(&msg.text) {
            if !seen_here.insert(token.clone()) {
                continue;
            }
            let count = counts.entry(token.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(token);
            }
            *count += 1;
        }
    }

    let mut ranked: Vec<Topic> = first_seen
        .into_iter()
        .map(|keyword| {
            let frequency = counts.get(&keyword).copied().unwrap_or(0);
            Topic { keyword, frequency }
        })
        .filter(|t| t.frequency >= min_frequency.max(1))
        .collect();

    // Stable: equal frequencies stay in first-occurrence order.
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(max_topics);

    tracing::debug!(
        messages = messages.len(),
        topics = ranked.len(),
        top = ranked.first().map(|t| t.keyword.as_str()).unwrap_or(""),
        "Topics ranked"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_TOPICS;
    use crate::test_helpers::msg;

    #[test]
    fn test_faceit_scenario() {
        let messages = vec![
            msg("1", "Ann", "faceit rating is great today"),
            msg("2", "Bob", "faceit rating dropped"),
            msg("3", "Ann", "faceit faceit faceit"),
        ];
        let topics = rank_topics(&messages, MAX_TOPICS, 1);
        assert_eq!(topics[0], Topic { keyword: "faceit".into(), frequency: 3 });
        assert_eq!(topics[1], Topic { keyword: "rating".into(), frequency: 2 });
    }

    #[test]
    fn test_ties_follow_first_occurrence() {
        let messages = vec![
            msg("1", "Ann", "zebra apple"),
            msg("2", "Bob", "mango zebra"),
            msg("3", "Cat", "apple mango"),
        ];
        let keywords: Vec<String> = rank_topics(&messages, MAX_TOPICS, 1)
            .into_iter()
            .map(|t| t.keyword)
            .collect();
        assert_eq!(keywords, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_never_more_than_max_and_sorted() {
        let text: String = (0..60).map(|i| format!("word{:03} ", i)).collect();
        let messages = vec![msg("1", "Ann", &text), msg("2", "Bob", "word010 word020")];
        let topics = rank_topics(&messages, MAX_TOPICS, 1);
        assert_eq!(topics.len(), MAX_TOPICS);
        assert!(topics.windows(2).all(|w| w[0].frequency >= w[1].frequency));
        assert_eq!(topics[0].keyword, "word010");
        assert_eq!(topics[1].keyword, "word020");
    }

    #[test]
    fn test_min_frequency_filters() {
        let messages = vec![msg("1", "Ann", "alpha beta"), msg("2", "Bob", "alpha")];
        let topics = rank_topics(&messages, MAX_TOPICS, 2);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].keyword, "alpha");
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_topics(&[], MAX_TOPICS, 1).is_empty());
    }

    #[test]
    fn test_display_name_capitalises() {
        let t = Topic { keyword: "матч".into(), frequency: 1 };
        assert_eq!(t.display_name(), "Матч");
    }
}
