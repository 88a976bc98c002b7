//! # Extrator de Sintomas
//!
//! Encontra, num texto livre, menções aos fatos terminais do chatbot:
//!
//! ```text
//! "honestly I'm exhausted and kind of worried"
//!   → [feeling_tired, feeling_anxious]
//! ```
//!
//! Cada fato tem uma regex de palavras-chave. Uma menção precedida de
//! negação ("not", "never", "...n't") nas duas palavras anteriores é
//! ignorada: "I'm not sad" não assere `feeling_sad`. Essas menções
//! negadas saem em [`SymptomExtractor::denied()`], que o chatbot usa
//! como "não" quando o fato é justamente o que ele perguntou.

use regex::Regex;

use super::normalize;
use crate::core::{FactId, FactSet};

/// Um fato e as palavras que o indicam.
struct SymptomPattern {
    fact: FactId,
    re: Regex,
}

/// Extrator de sintomas por palavras-chave.
pub struct SymptomExtractor {
    patterns: Vec<SymptomPattern>,
}

const KEYWORDS: &[(&str, &str)] = &[
    ("feeling_tired", r"\b(tired|exhausted|sleepy|drained|worn out|fatigued|knackered)\b"),
    ("feeling_sad", r"\b(sad|down|unhappy|blue|depressed|miserable|low)\b"),
    ("feeling_overwhelmed", r"\b(overwhelmed|swamped|too much|stressed|overloaded)\b"),
    ("feeling_anxious", r"\b(anxious|worried|nervous|on edge|panicky|uneasy)\b"),
];

impl SymptomExtractor {
    /// Compila as regexes uma única vez.
    pub fn new() -> Self {
        let patterns = KEYWORDS
            .iter()
            .map(|(fact, pattern)| SymptomPattern {
                fact: FactId::from(*fact),
                re: Regex::new(pattern).expect("invalid regex"),
            })
            .collect();
        Self { patterns }
    }

    /// Fatos mencionados (e não negados) no texto.
    pub fn extract(&self, text: &str) -> FactSet {
        let text = normalize(text);
        self.patterns
            .iter()
            .filter(|p| p.re.find_iter(&text).any(|m| !is_negated(&text[..m.start()])))
            .map(|p| p.fact.clone())
            .collect()
    }

    /// Fatos mencionados apenas com negação: "not tired" nega `feeling_tired`.
    pub fn denied(&self, text: &str) -> FactSet {
        let text = normalize(text);
        self.patterns
            .iter()
            .filter(|p| {
                let mut mentions = p.re.find_iter(&text).peekable();
                mentions.peek().is_some() && mentions.all(|m| is_negated(&text[..m.start()]))
            })
            .map(|p| p.fact.clone())
            .collect()
    }
}

impl Default for SymptomExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `true` se uma das duas palavras antes da menção é uma negação.
fn is_negated(before: &str) -> bool {
    before
        .split_whitespace()
        .rev()
        .take(2)
        .any(|w| matches!(w, "not" | "never" | "no") || w.ends_with("n't"))
}
