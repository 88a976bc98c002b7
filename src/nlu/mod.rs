//! # Módulo NLU: Entendendo o Usuário no Chat
//!
//! Camada leve de compreensão de texto usada pelo chatbot:
//!
//! | Sub-módulo | Responsabilidade |
//! |------------|------------------|
//! | [`intent`] | Classifica respostas de sim/não/recomeçar |
//! | [`symptoms`] | Extrai fatos terminais (sintomas) de texto livre |
//!
//! Tudo é heurístico (regex), sem modelo de linguagem. Antes de qualquer
//! regex, o texto passa por [`normalize()`].

/// Sub-módulo do classificador de intenção.
pub mod intent;

/// Sub-módulo do extrator de sintomas.
pub mod symptoms;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub use intent::{Intent, IntentClassifier};
pub use symptoms::SymptomExtractor;

/// Normaliza texto do usuário para casamento de padrões.
///
/// 1. NFD + remoção de marcas combinantes ("não" → "nao")
/// 2. Apóstrofo tipográfico `’` → `'`
/// 3. Minúsculas e `trim`
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_and_case() {
        assert_eq!(normalize("  Não, Está Ótimo "), "nao, esta otimo");
    }

    #[test]
    fn straightens_apostrophes() {
        assert_eq!(normalize("I\u{2019}m fine"), "i'm fine");
    }
}
