//! crates/studyaid_core/src/topics.rs
//!
//! Deterministic topic-extraction strategies. Both strategies are pure
//! functions over the document text: they never fail, and an input with no
//! recognizable structure yields an empty list rather than an error.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// A pluggable topic-extraction strategy.
///
/// Implementations return an ordered, exact-string de-duplicated list of
/// topics. Order reflects document order; duplicates differing only in case
/// or whitespace are not coalesced.
pub trait TopicStrategy: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// De-duplicates while preserving first-seen order.
///
/// `["A", "B", "A", "C"]` becomes `["A", "B", "C"]`.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn heading_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:unit|module|section|part|chapter)\s*\d+\s*[.:)\-]?\s*(.+)$")
            .unwrap()
    })
}

fn numbered_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\.\d+\.?\s+(.+)$").unwrap())
}

fn bullet_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[-*•]\s+(.+)$").unwrap())
}

fn trailing_numbering() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Dot leaders and page numbers at the end of a heading line.
    RE.get_or_init(|| Regex::new(r"(?:[\s.\-:;,]*\d+)?[\s.\-:;,…]*$").unwrap())
}

/// Scans each line for syllabus heading shapes: "Unit 3: Sorting",
/// "2.1 Graph Traversal", and bullet items.
#[derive(Debug, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    fn capture_title(line: &str) -> Option<String> {
        let captured = heading_pattern()
            .captures(line)
            .or_else(|| numbered_pattern().captures(line))
            .or_else(|| bullet_pattern().captures(line))?;
        let raw = captured.get(1)?.as_str();
        let title = trailing_numbering().replace(raw, "").trim().to_string();
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }
}

impl TopicStrategy for RuleBasedExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let titles = text.lines().filter_map(Self::capture_title).collect();
        dedup_preserving_order(titles)
    }
}

/// Words that terminate a noun chunk.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "in", "on", "at", "to", "for", "from", "with",
    "by", "as", "is", "are", "was", "were", "be", "been", "being", "this", "that", "these",
    "those", "it", "its", "we", "you", "they", "he", "she", "will", "shall", "can", "could",
    "would", "should", "may", "might", "must", "have", "has", "had", "do", "does", "did", "not",
    "no", "so", "if", "then", "than", "each", "every", "all", "any", "some", "such", "which",
    "what", "who", "whom", "whose", "how", "when", "where", "why", "also", "into", "about",
    "over", "under", "between", "through",
];

const MAX_NOUN_PHRASES: usize = 50;
const MAX_CHUNK_WORDS: usize = 4;

/// A lightweight noun-chunk segmenter: runs of content words delimited by
/// stopwords and punctuation. A stand-in for a full NLP noun-phrase pass,
/// with the same downstream filtering.
#[derive(Debug, Default)]
pub struct NounPhraseExtractor;

impl NounPhraseExtractor {
    fn is_stopword(word: &str) -> bool {
        let lower = word.to_lowercase();
        STOPWORDS.contains(&lower.as_str())
    }

    fn keep(phrase: &str) -> bool {
        phrase.len() > 3 && !phrase.to_lowercase().contains("page")
    }
}

impl TopicStrategy for NounPhraseExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut phrases = Vec::new();
        let mut chunk: Vec<&str> = Vec::new();

        let mut flush = |chunk: &mut Vec<&str>| {
            if !chunk.is_empty() && chunk.len() <= MAX_CHUNK_WORDS {
                let phrase = chunk.join(" ");
                if Self::keep(&phrase) {
                    phrases.push(phrase);
                }
            }
            chunk.clear();
        };

        for segment in text.split(|c: char| !c.is_alphanumeric() && c != ' ' && c != '\'') {
            for word in segment.split_whitespace() {
                if Self::is_stopword(word) {
                    flush(&mut chunk);
                } else {
                    chunk.push(word);
                }
            }
            flush(&mut chunk);
        }
        flush(&mut chunk);

        let mut unique = dedup_preserving_order(phrases);
        unique.truncate(MAX_NOUN_PHRASES);
        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_and_order() {
        let input = vec![
            "A".to_string(),
            "B".to_string(),
            "A".to_string(),
            "C".to_string(),
        ];
        assert_eq!(dedup_preserving_order(input), vec!["A", "B", "C"]);
    }

    #[test]
    fn dedup_does_not_coalesce_case_or_whitespace_variants() {
        let input = vec!["Graphs".to_string(), "graphs".to_string(), "Graphs ".to_string()];
        assert_eq!(
            dedup_preserving_order(input),
            vec!["Graphs", "graphs", "Graphs "]
        );
    }

    #[test]
    fn rule_based_recognizes_unit_headings() {
        let text = "Unit 1: Introduction to Algorithms\nChapter 2 - Data Structures\nModule 3. Complexity Analysis";
        let topics = RuleBasedExtractor.extract(text);
        assert_eq!(
            topics,
            vec![
                "Introduction to Algorithms",
                "Data Structures",
                "Complexity Analysis"
            ]
        );
    }

    #[test]
    fn rule_based_recognizes_numbered_and_bulleted_items() {
        let text = "2.1 Graph Traversal\n2.2 Shortest Paths\n- Dynamic Programming\n* Greedy Methods\n• Backtracking";
        let topics = RuleBasedExtractor.extract(text);
        assert_eq!(
            topics,
            vec![
                "Graph Traversal",
                "Shortest Paths",
                "Dynamic Programming",
                "Greedy Methods",
                "Backtracking"
            ]
        );
    }

    #[test]
    fn rule_based_strips_trailing_numbering() {
        let text = "Unit 4: Sorting Algorithms ...... 37";
        let topics = RuleBasedExtractor.extract(text);
        assert_eq!(topics, vec!["Sorting Algorithms"]);
    }

    #[test]
    fn rule_based_returns_empty_for_unstructured_text() {
        let text = "This paragraph has no headings or bullets at all.\nJust prose.";
        assert!(RuleBasedExtractor.extract(text).is_empty());
    }

    #[test]
    fn rule_based_returns_empty_for_whitespace_input() {
        assert!(RuleBasedExtractor.extract("   \n\t  ").is_empty());
    }

    #[test]
    fn rule_based_dedups_repeated_headings() {
        let text = "Unit 1: Recursion\nUnit 5: Recursion";
        assert_eq!(RuleBasedExtractor.extract(text), vec!["Recursion"]);
    }

    #[test]
    fn noun_phrases_are_filtered_and_capped() {
        let text = "The neural networks of the brain and gradient descent on page 3";
        let topics = NounPhraseExtractor.extract(text);
        assert!(topics.contains(&"neural networks".to_string()));
        assert!(topics.contains(&"gradient descent".to_string()));
        // "page 3" is excluded and short fragments are dropped.
        assert!(!topics.iter().any(|t| t.to_lowercase().contains("page")));
        assert!(!topics.iter().any(|t| t.len() <= 3));
    }

    #[test]
    fn noun_phrases_cap_at_fifty() {
        let mut text = String::new();
        for i in 0..80 {
            text.push_str(&format!("concept{} alpha. ", i));
        }
        assert!(NounPhraseExtractor.extract(&text).len() <= 50);
    }
}
