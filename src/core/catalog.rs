//! # Catálogo de Regras da Demonstração
//!
//! As três variantes da demonstração usam tabelas literais, carregadas
//! uma única vez na inicialização e compartilhadas (somente leitura)
//! por todas as sessões.
//!
//! | Tabela | Página | Regras |
//! |--------|--------|--------|
//! | [`Catalog::forward`] | Forward Chaining | 4 |
//! | [`Catalog::backward`] | Backward Chaining | 3 |
//! | [`Catalog::chat`] | Chatbot | 7 |
//!
//! ```text
//! feeling_tired ──→ needs_a_break ──┐
//!                                   ├──→ feeling_unwell
//! feeling_sad ────→ needs_a_hug ────┘
//! feeling_overwhelmed ──→ needs_calm_space
//! ```

use anyhow::{ensure, Context, Result};

use super::fact::FactId;
use super::rule::RuleTable;

/// Uma pista que o usuário pode marcar na página de encadeamento para frente.
#[derive(Clone, Debug)]
pub struct Clue {
    /// Fato asserido quando a caixa está marcada.
    pub fact: FactId,
    /// Texto da caixa de seleção.
    pub prompt: &'static str,
}

/// Um objetivo oferecido ao usuário, com a recomendação exibida se provado.
#[derive(Clone, Debug)]
pub struct Goal {
    /// Conclusão a provar.
    pub fact: FactId,
    /// Mensagem de recomendação mostrada quando o objetivo é provado.
    pub recommendation: &'static str,
}

/// Todas as tabelas e listas da demonstração, validadas.
#[derive(Debug)]
pub struct Catalog {
    /// Regras da página de encadeamento para frente.
    pub forward: RuleTable,
    /// Pistas (caixas de seleção) da página de encadeamento para frente.
    pub clues: Vec<Clue>,
    /// Regras da página de encadeamento para trás.
    pub backward: RuleTable,
    /// Objetivos da página de encadeamento para trás, na ordem do seletor.
    pub goals: Vec<Goal>,
    /// Regras do chatbot.
    pub chat: RuleTable,
    /// Objetivos que o chatbot tenta provar, em ordem.
    pub chat_goals: Vec<Goal>,
}

const FORWARD_RULES: &[(&str, &[&str])] = &[
    ("needs_a_break", &["feeling_tired"]),
    ("needs_a_hug", &["feeling_sad"]),
    ("needs_calm_space", &["feeling_overwhelmed"]),
    ("feeling_unwell", &["needs_a_break", "needs_a_hug"]),
];

const BACKWARD_RULES: &[(&str, &[&str])] = &[
    ("suggest_therapy", &["feeling_sad", "feeling_anxious"]),
    ("suggest_mindfulness", &["feeling_overwhelmed"]),
    ("suggest_break", &["feeling_tired"]),
];

const CHAT_RULES: &[(&str, &[&str])] = &[
    ("needs_a_break", &["feeling_tired"]),
    ("needs_a_hug", &["feeling_sad"]),
    ("needs_calm_space", &["feeling_overwhelmed"]),
    ("feeling_unwell", &["needs_a_break", "needs_a_hug"]),
    ("suggest_therapy", &["feeling_unwell", "feeling_anxious"]),
    ("suggest_mindfulness", &["needs_calm_space"]),
    ("suggest_break", &["needs_a_break"]),
];

const THERAPY: &str = "Talking to a counsellor or therapist could really help. You don't have to carry this alone. 💚";
const MINDFULNESS: &str = "Try a few minutes of mindfulness: slow breaths, notice five things around you. 🧘";
const BREAK: &str = "Take a proper break: step away, stretch, drink some water, maybe a short walk. ☕";

impl Catalog {
    /// Valida e monta o catálogo embutido.
    ///
    /// # Erros
    ///
    /// Falha se alguma tabela literal tiver conclusão duplicada ou
    /// identificador inválido, se um objetivo não for conclusão de
    /// nenhuma regra da sua tabela (o motor o perguntaria ao usuário) ou
    /// se uma pista não for fato terminal das regras para frente.
    pub fn builtin() -> Result<Self> {
        let forward = RuleTable::from_literal(FORWARD_RULES)
            .context("invalid forward chaining rule table")?;
        let backward = RuleTable::from_literal(BACKWARD_RULES)
            .context("invalid backward chaining rule table")?;
        let chat =
            RuleTable::from_literal(CHAT_RULES).context("invalid chatbot rule table")?;

        let clues = vec![
            Clue { fact: "feeling_tired".into(), prompt: "I feel tired. 😴" },
            Clue { fact: "feeling_sad".into(), prompt: "I feel sad. 😢" },
            Clue { fact: "feeling_overwhelmed".into(), prompt: "I feel overwhelmed. 🤯" },
        ];

        let goals = vec![
            Goal { fact: "suggest_therapy".into(), recommendation: THERAPY },
            Goal { fact: "suggest_mindfulness".into(), recommendation: MINDFULNESS },
            Goal { fact: "suggest_break".into(), recommendation: BREAK },
        ];
        let chat_goals = goals.clone();

        let catalog = Self { forward, clues, backward, goals, chat, chat_goals };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        for goal in &self.goals {
            ensure!(
                self.backward.concludes(&goal.fact),
                "goal `{}` is not concluded by any backward rule",
                goal.fact
            );
        }
        for goal in &self.chat_goals {
            ensure!(
                self.chat.concludes(&goal.fact),
                "chat goal `{}` is not concluded by any chatbot rule",
                goal.fact
            );
        }
        let terminals = self.forward.terminal_facts();
        for clue in &self.clues {
            ensure!(
                terminals.contains(&clue.fact),
                "clue `{}` is not a premise-only fact of the forward rules",
                clue.fact
            );
        }
        Ok(())
    }

    /// Busca um objetivo da página de encadeamento para trás pelo token.
    pub fn goal(&self, fact: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.fact.as_str() == fact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.forward.len(), 4);
        assert_eq!(catalog.backward.len(), 3);
        assert_eq!(catalog.chat.len(), 7);
    }

    #[test]
    fn goal_outside_its_table_is_rejected() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.goals.push(Goal { fact: "needs_a_hug".into(), recommendation: "" });
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("needs_a_hug"));
    }

    #[test]
    fn derived_clue_is_rejected() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.clues.push(Clue { fact: "needs_a_break".into(), prompt: "" });
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn goal_lookup() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.goal("suggest_break").is_some());
        assert!(catalog.goal("feeling_tired").is_none());
    }
}
