//! # Classificador de Respostas do Usuário
//!
//! O chatbot faz perguntas de sim/não. O [`IntentClassifier`] decide o
//! que o usuário quis dizer:
//!
//! | Intent | Significado | Exemplo |
//! |--------|-------------|---------|
//! | [`Yes`](Intent::Yes) | confirma | "yes", "yeah a bit", "I am" |
//! | [`No`](Intent::No) | nega | "no", "not really", "I'm fine" |
//! | [`Restart`](Intent::Restart) | recomeça a conversa | "restart", "start over" |
//! | [`Unclear`](Intent::Unclear) | nenhum dos anteriores | "hmm", "not sure" |
//!
//! ## Estratégia
//!
//! Só heurísticas (regex ancoradas no início da frase), avaliadas nesta ordem:
//! Restart → Unclear → No → Yes. "No" vem antes de "Yes" porque
//! "I am not" começa com "I am".
//!
//! "I am", "I'm" e "I do" só confirmam sozinhos: "I'm fine, thanks" é
//! um "não", e "I'm tired" fica para o extrator de sintomas.

use regex::Regex;

use super::normalize;

/// Intenção de uma resposta do usuário.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Resposta afirmativa.
    Yes,
    /// Resposta negativa.
    No,
    /// Pedido para recomeçar a conversa.
    Restart,
    /// Não deu para entender.
    Unclear,
}

impl Intent {
    /// Converte em booleano quando for uma resposta de sim/não.
    pub fn as_answer(self) -> Option<bool> {
        match self {
            Intent::Yes => Some(true),
            Intent::No => Some(false),
            Intent::Restart | Intent::Unclear => None,
        }
    }
}

/// Classificador de intenção por regex.
pub struct IntentClassifier {
    restart_re: Regex,
    unclear_re: Regex,
    no_re: Regex,
    yes_re: Regex,
}

impl IntentClassifier {
    /// Compila as regexes uma única vez.
    pub fn new() -> Self {
        Self {
            restart_re: Regex::new(r"^(restart|reset|start over|start again|begin again|new check.?in)\b")
                .expect("invalid regex"),
            unclear_re: Regex::new(r"\b(not sure|maybe|don'?t know|idk|no idea|dunno)\b")
                .expect("invalid regex"),
            no_re: Regex::new(
                r"^(no|nope|nah|not really|not at all|not today|(i'?m|i am) (not|fine|ok|okay|good|alright|all right)|never|negative|nao)\b",
            )
            .expect("invalid regex"),
            yes_re: Regex::new(
                r"^((y|yes|yeah|yep|yup|sure|of course|definitely|absolutely|indeed|a bit|a little|kind of|kinda|totally|sim)\b|(i am|i'?m|i do)\W*$)",
            )
            .expect("invalid regex"),
        }
    }

    /// Classifica uma resposta livre.
    pub fn classify(&self, text: &str) -> Intent {
        let text = normalize(text);

        if self.restart_re.is_match(&text) {
            Intent::Restart
        } else if self.unclear_re.is_match(&text) {
            Intent::Unclear
        } else if self.no_re.is_match(&text) {
            Intent::No
        } else if self.yes_re.is_match(&text) {
            Intent::Yes
        } else {
            Intent::Unclear
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
