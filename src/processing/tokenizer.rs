//! Raw text → lowercase candidate words.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::constants::MIN_WORD_LENGTH;

/// Ukrainian and English function words, pronouns and filler.
/// Only entries of `MIN_WORD_LENGTH` chars or more can ever match, but the
/// short ones stay so the list reads as a whole.
const STOP_WORDS_LIST: &[&str] = &[
    // Ukrainian
    "і", "та", "або", "але", "що", "як", "для", "від", "до", "на", "з", "по", "про", "за", "при",
    "це", "той", "такий", "який", "коли", "де", "чому", "якщо", "хоча", "тому", "так", "ні",
    "не", "було", "буде", "є", "був", "була", "були", "я", "ти", "він", "вона", "воно", "ми",
    "ви", "вони", "щоб", "яка", "яке", "які", "цей", "ця", "ці", "те", "ті", "м", "т", "й",
    "ж", "б", "то", "а", "ну", "о", "у", "е", "и", "тебе", "мене", "його", "її", "нас", "вас",
    "їх", "просто", "думаю", "ніхуя", "нічого", "ніколи", "ніде", "нікуди", "може", "можна",
    "треба", "потрібно", "варто", "щось", "хтось", "десь", "кудись", "звідкись", "вже", "ще",
    "тільки", "лише", "навіть", "також", "дуже", "зараз", "тоді", "тепер", "себе", "свій",
    "своє", "своя", "свої", "якби", "після", "перед", "через", "поки", "тобто",
    // English
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "that", "this", "these", "those", "there", "their", "they", "them", "then",
    "than", "what", "when", "where", "which", "while", "who", "whom", "whose", "have", "has",
    "had", "been", "being", "were", "will", "would", "could", "should", "shall", "might",
    "must", "does", "doing", "done", "just", "also", "only", "very", "your", "yours", "mine",
    "ours", "into", "onto", "about", "over", "under", "some", "such", "each", "more", "most",
    "much", "many", "other", "same", "here", "because", "after", "before", "again", "still",
    "like", "really", "think", "yeah", "okay",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS_LIST.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Lowercase, blank out anything that is not a letter, digit or whitespace,
/// split, then drop short words and stop words. Order is preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LENGTH && !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

/// Distinct tokens of `text`, for membership checks.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_long_and_not_stop_words() {
        let samples = [
            "The faceit rating is great today!!!",
            "Що ви думаю про це? Просто жесть, матч був топовий",
            "a b c d, e-f... 12345 ok_then",
            "",
            "   \n\t ",
        ];
        for s in samples {
            for tok in tokenize(s) {
                assert!(tok.chars().count() >= MIN_WORD_LENGTH, "{tok:?} too short");
                assert!(!is_stop_word(&tok), "{tok:?} is a stop word");
            }
        }
    }

    #[test]
    fn test_punctuation_splits_words() {
        assert_eq!(tokenize("FACEIT,rating.great"), vec!["faceit", "rating", "great"]);
        assert_eq!(tokenize("don't-stop"), vec!["stop"]);
    }

    #[test]
    fn test_cyrillic_lowercased_and_kept() {
        assert_eq!(tokenize("Матч на Faceit сьогодні"), vec!["матч", "faceit", "сьогодні"]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        assert_eq!(tokenize("faceit faceit faceit"), vec!["faceit"; 3]);
        assert_eq!(token_set("faceit faceit rating").len(), 2);
    }

    #[test]
    fn test_digits_are_tokens() {
        assert_eq!(tokenize("score 2024 to 1337"), vec!["score", "2024", "1337"]);
    }
}
