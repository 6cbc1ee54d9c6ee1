//! Candidate phrase generation: tokenization, stop-word removal, and n-gram enumeration.

use super::NgramRange;
use std::collections::HashMap;

/// Common English function words that never start, end, or fill a keyphrase.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "although",
    "always", "am", "among", "an", "and", "another", "any", "are", "around", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "cannot", "could", "did", "do", "does", "doing", "done", "down", "during", "each", "either",
    "else", "enough", "etc", "even", "ever", "every", "few", "for", "from", "further", "get",
    "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "however", "if", "in", "into", "is", "it", "its", "itself", "just", "least",
    "less", "like", "made", "many", "may", "me", "might", "more", "most", "much", "must", "my",
    "myself", "neither", "never", "no", "nor", "not", "now", "of", "off", "often", "on", "once",
    "one", "only", "onto", "or", "other", "others", "our", "ours", "ourselves", "out", "over",
    "own", "per", "perhaps", "rather", "same", "several", "she", "should", "since", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "therefore", "these", "they", "this", "those", "though", "through", "thus", "to",
    "too", "toward", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well",
    "were", "what", "whatever", "when", "where", "whether", "which", "while", "who", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// A distinct candidate phrase with its occurrence statistics.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) phrase: String,
    pub(crate) count: usize,
    pub(crate) first_seen: usize,
}

/// Whether `word` (already lower-cased) is a stop word.
pub(crate) fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Lower-cased word tokens of at least two characters with stop words removed.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|token| !is_stop_word(token))
        .collect()
}

/// Distinct n-grams over the filtered token stream, ordered by first occurrence.
pub(crate) fn candidate_phrases(text: &str, range: NgramRange) -> Vec<Candidate> {
    let tokens = tokenize(text);
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut position = 0;

    for start in 0..tokens.len() {
        for n in range.min..=range.max {
            let end = start + n;
            if n == 0 || end > tokens.len() {
                continue;
            }
            let phrase = tokens[start..end].join(" ");
            match index.get(&phrase) {
                Some(&slot) => candidates[slot].count += 1,
                None => {
                    index.insert(phrase.clone(), candidates.len());
                    candidates.push(Candidate {
                        phrase,
                        count: 1,
                        first_seen: position,
                    });
                }
            }
            position += 1;
        }
    }

    candidates
}
