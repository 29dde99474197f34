use super::{Draft, NarrativeRequest, NarrativeStrategy, TierOutcome};
use crate::config::ExtractiveTierConfig;
use crate::processing::cleaner::truncate_chars;
use crate::processing::textrank::{split_sentences, summarize};
use crate::processing::tokenizer::token_set;
use crate::processing::Topic;

/// Offline tier: TextRank picks the strongest sentences of the group, then
/// each picked sentence is filed under the best-ranked keyword it mentions.
/// The block filed under the group's own keyword is the narrative.
pub struct ExtractiveStrategy {
    cfg: ExtractiveTierConfig,
}

impl ExtractiveStrategy {
    pub fn new(cfg: ExtractiveTierConfig) -> Self {
        Self { cfg }
    }

    /// `sentences / 5`, clamped to `[min, max]`, never above `sentences`.
    pub fn sentence_count(&self, sentences: usize) -> usize {
        (sentences / 5)
            .clamp(self.cfg.min_sentences, self.cfg.max_sentences)
            .min(sentences)
    }
}

/// File each sentence under the first ranked keyword it contains.
/// Returns one `(keyword, sentences)` block per keyword, in rank order.
pub fn regroup_by_topic(sentences: &[String], ranked: &[Topic]) -> Vec<(String, Vec<String>)> {
    let mut blocks: Vec<Vec<String>> = vec![Vec::new(); ranked.len()];
    for sentence in sentences {
        let tokens = token_set(sentence);
        if let Some(idx) = ranked.iter().position(|t| tokens.contains(&t.keyword)) {
            blocks[idx].push(sentence.clone());
        }
    }
    ranked
        .iter()
        .zip(blocks)
        .filter(|(_, b)| !b.is_empty())
        .map(|(t, b)| (t.keyword.clone(), b))
        .collect()
}

impl NarrativeStrategy for ExtractiveStrategy {
    fn name(&self) -> &'static str {
        "extractive"
    }

    fn generate(&self, request: &NarrativeRequest<'_>) -> TierOutcome {
        // One message per line so every message ends at least one sentence.
        let text = request
            .group
            .members
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let available = split_sentences(&text).len();
        if available == 0 {
            return TierOutcome::Skipped("no sentences".into());
        }

        let picked = summarize(&text, self.sentence_count(available));
        let keyword = &request.group.topic.keyword;
        let block = regroup_by_topic(&picked, request.ranked)
            .into_iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, sentences)| sentences);

        match block {
            Some(sentences) => {
                let chosen: Vec<String> = sentences
                    .into_iter()
                    .take(self.cfg.sentences_per_block)
                    .collect();
                let text = truncate_chars(&chosen.join(" "), self.cfg.max_chars);
                tracing::debug!(keyword = %keyword, available, chosen = chosen.len(), chars = text.chars().count(), "Extractive block built");
                TierOutcome::Produced(Draft::text(text))
            }
            None => TierOutcome::Retryable(format!("no picked sentence files under '{}'", keyword)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{group, topic};

    #[test]
    fn test_sentence_count_bounds() {
        let s = ExtractiveStrategy::new(ExtractiveTierConfig::default());
        assert_eq!(s.sentence_count(3), 3);
        assert_eq!(s.sentence_count(20), 8);
        assert_eq!(s.sentence_count(50), 10);
        assert_eq!(s.sentence_count(500), 15);
    }

    #[test]
    fn test_regroup_uses_rank_order() {
        let ranked = vec![topic("faceit", 3), topic("rating", 2)];
        let sentences: Vec<String> = ["rating faceit both", "rating only", "nothing relevant"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let blocks = regroup_by_topic(&sentences, &ranked);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], ("faceit".to_string(), vec!["rating faceit both".to_string()]));
        assert_eq!(blocks[1].1, vec!["rating only".to_string()]);
    }

    #[test]
    fn test_produces_block_for_group_keyword() {
        let g = group(
            "faceit",
            &[
                ("Ann", "Faceit rating is great today. Weather is nice."),
                ("Bob", "Faceit servers lagged! Elo dropped hard."),
                ("Cat", "faceit again"),
            ],
        );
        let ranked = vec![g.topic.clone()];
        let strategy = ExtractiveStrategy::new(ExtractiveTierConfig::default());
        let outcome = strategy.generate(&NarrativeRequest { group: &g, ranked: &ranked });

        let TierOutcome::Produced(draft) = outcome else {
            panic!("expected a draft, got {outcome:?}");
        };
        assert!(draft.text.contains("Faceit rating is great today."));
        assert!(!draft.text.contains("Weather"));
        assert!(draft.title.is_none());
    }

    #[test]
    fn test_block_capped_per_config() {
        let members: Vec<(String, String)> = (0..10)
            .map(|i| ("Ann".to_string(), format!("faceit match number{} happened", i)))
            .collect();
        let refs: Vec<(&str, &str)> = members.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let g = group("faceit", &refs);
        let ranked = vec![g.topic.clone()];
        let strategy = ExtractiveStrategy::new(ExtractiveTierConfig::default());
        let TierOutcome::Produced(draft) =
            strategy.generate(&NarrativeRequest { group: &g, ranked: &ranked })
        else {
            panic!("expected a draft");
        };
        assert_eq!(draft.text.matches("faceit").count(), 4);
    }

    #[test]
    fn test_block_length_capped() {
        let rant = format!("faceit {}", "servers lag again and nobody fixes them ".repeat(50));
        let g = group("faceit", &[("Ann", rant.as_str())]);
        let ranked = vec![g.topic.clone()];
        let cfg = ExtractiveTierConfig { max_chars: 200, ..ExtractiveTierConfig::default() };
        let strategy = ExtractiveStrategy::new(cfg);
        let TierOutcome::Produced(draft) =
            strategy.generate(&NarrativeRequest { group: &g, ranked: &ranked })
        else {
            panic!("expected a draft");
        };
        assert!(rant.chars().count() > 2000);
        assert!(draft.text.chars().count() <= 203, "{} chars", draft.text.chars().count());
        assert!(draft.text.starts_with("faceit servers lag"));
        assert!(draft.text.ends_with("..."));
    }

    #[test]
    fn test_falls_through_when_keyword_taken_by_higher_topic() {
        let g = group("rating", &[("Ann", "rating faceit")]);
        let ranked = vec![topic("faceit", 5), topic("rating", 1)];
        let strategy = ExtractiveStrategy::new(ExtractiveTierConfig::default());
        let outcome = strategy.generate(&NarrativeRequest { group: &g, ranked: &ranked });
        assert!(matches!(outcome, TierOutcome::Retryable(_)));
    }
}
