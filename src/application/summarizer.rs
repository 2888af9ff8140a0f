//! Extractive article summary and keyword extraction.
//!
//! Sentences are scored by the frequency of their non-stopword terms across
//! the whole text, with a bonus for terms shared with the title. The summary
//! keeps the best sentences in their original order.

use std::collections::{HashMap, HashSet};

pub const SUMMARY_SENTENCES: usize = 5;
pub const MAX_KEYWORDS: usize = 10;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "may", "me", "might", "more", "most", "much", "must", "my", "myself", "new",
    "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only", "or", "other", "our",
    "ours", "ourselves", "out", "over", "own", "said", "same", "says", "she", "should", "since",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "us", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "year", "years", "you", "your", "yours", "yourself",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() > 2 && !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !is_stopword(w))
}

/// Term frequencies plus first-occurrence rank, for deterministic ties.
fn frequencies(text: &str) -> HashMap<String, (usize, usize)> {
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, term) in terms(text).enumerate() {
        freq.entry(term).or_insert((0, position)).0 += 1;
    }
    freq
}

/// Most frequent content words, most frequent first.
pub fn keywords(text: &str, limit: usize) -> Vec<String> {
    let mut ranked: Vec<(String, (usize, usize))> = frequencies(text).into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked.into_iter().take(limit).map(|(term, _)| term).collect()
}

/// Splits on `.`, `!` or `?` followed by whitespace or end of text.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        if boundary {
            let sentence = current.split_whitespace().collect::<Vec<_>>().join(" ");
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let rest = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

pub fn summarize(title: &str, text: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= max_sentences {
        return sentences.join(" ");
    }

    let freq = frequencies(text);
    let title_terms: HashSet<String> = terms(title).collect();

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let words: Vec<String> = terms(sentence).collect();
            if words.is_empty() {
                return (index, 0.0);
            }
            let weight: usize = words.iter().map(|w| freq.get(w).map_or(0, |f| f.0)).sum();
            let title_hits = words.iter().filter(|w| title_terms.contains(*w)).count();
            let score = weight as f64 / words.len() as f64 + title_hits as f64;
            (index, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut chosen: Vec<usize> = scored.into_iter().take(max_sentences).map(|(i, _)| i).collect();
    chosen.sort_unstable();

    chosen
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
