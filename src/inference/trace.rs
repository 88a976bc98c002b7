//! # Rastro do Raciocínio
//!
//! Eventos produzidos **apenas para exibição**: o motor nunca lê o
//! rastro para decidir nada. A interface usa os eventos para mostrar
//! passo a passo como a conclusão foi alcançada.
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "type")]`, igual aos demais eventos enviados via SSE:
//!
//! ```json
//! { "type": "RuleMatch", "goal": "feeling_unwell", "depth": 0,
//!   "premises": ["needs_a_break", "needs_a_hug"] }
//! ```

use serde::Serialize;

use crate::core::{join_labels, FactId};

/// Disparo de uma regra no encadeamento para frente.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Firing {
    /// Conclusão derivada.
    pub conclusion: FactId,
    /// Premissas que satisfizeram a regra.
    pub premises: Vec<FactId>,
    /// Varredura completa (1-indexed) em que a regra disparou.
    pub round: usize,
}

impl Firing {
    /// Texto no estilo da página: "We know: X, Y. So, we conclude: Z".
    pub fn describe(&self) -> String {
        format!(
            "We know: {}. So, we conclude: {}",
            join_labels(&self.premises),
            self.conclusion.label()
        )
    }
}

/// Passo do encadeamento para trás, na ordem exata da busca em profundidade.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TraceEvent {
    /// O objetivo já era um fato conhecido.
    KnownFact { goal: FactId, depth: usize },

    /// O objetivo já tinha resultado memorizado nesta sessão.
    CachedAnswer { goal: FactId, depth: usize, value: bool },

    /// O objetivo é conclusão de uma regra: as premissas serão provadas.
    RuleMatch { goal: FactId, depth: usize, premises: Vec<FactId> },

    /// Todas as premissas foram provadas.
    Proven { goal: FactId, depth: usize },

    /// Uma premissa falhou; as seguintes não foram avaliadas.
    Failed { goal: FactId, depth: usize, premise: FactId },

    /// O objetivo é terminal: a pergunta vai para o usuário.
    AskUser { goal: FactId, depth: usize },

    /// O usuário respondeu.
    Answered { goal: FactId, depth: usize, value: bool },

    /// A pergunta ficou pendente; a prova será retomada quando houver resposta.
    Deferred { goal: FactId, depth: usize },

    /// O objetivo reapareceu como premissa de si mesmo; tratado como falso.
    CycleDetected { goal: FactId, depth: usize },
}

impl TraceEvent {
    /// Profundidade na árvore de prova (0 = objetivo principal).
    pub fn depth(&self) -> usize {
        match self {
            TraceEvent::KnownFact { depth, .. }
            | TraceEvent::CachedAnswer { depth, .. }
            | TraceEvent::RuleMatch { depth, .. }
            | TraceEvent::Proven { depth, .. }
            | TraceEvent::Failed { depth, .. }
            | TraceEvent::AskUser { depth, .. }
            | TraceEvent::Answered { depth, .. }
            | TraceEvent::Deferred { depth, .. }
            | TraceEvent::CycleDetected { depth, .. } => *depth,
        }
    }

    /// O identificador ao qual o evento se refere.
    pub fn goal(&self) -> &FactId {
        match self {
            TraceEvent::KnownFact { goal, .. }
            | TraceEvent::CachedAnswer { goal, .. }
            | TraceEvent::RuleMatch { goal, .. }
            | TraceEvent::Proven { goal, .. }
            | TraceEvent::Failed { goal, .. }
            | TraceEvent::AskUser { goal, .. }
            | TraceEvent::Answered { goal, .. }
            | TraceEvent::Deferred { goal, .. }
            | TraceEvent::CycleDetected { goal, .. } => goal,
        }
    }

    /// Ícone exibido à esquerda do passo.
    pub fn icon(&self) -> &'static str {
        match self {
            TraceEvent::KnownFact { .. } => "✅",
            TraceEvent::CachedAnswer { .. } => "🤔",
            TraceEvent::RuleMatch { .. } => "🔍",
            TraceEvent::Proven { .. } => "🎉",
            TraceEvent::Failed { .. } => "🚫",
            TraceEvent::AskUser { .. } => "❓",
            TraceEvent::Answered { value: true, .. } => "👍",
            TraceEvent::Answered { value: false, .. } => "👎",
            TraceEvent::Deferred { .. } => "⏳",
            TraceEvent::CycleDetected { .. } => "🔁",
        }
    }

    /// Classe CSS do passo.
    pub fn css_class(&self) -> &'static str {
        match self {
            TraceEvent::Proven { .. } | TraceEvent::KnownFact { .. } => "step success",
            TraceEvent::Failed { .. } | TraceEvent::CycleDetected { .. } => "step failure",
            TraceEvent::AskUser { .. } | TraceEvent::Deferred { .. } => "step question",
            _ => "step",
        }
    }

    /// Frase legível do passo.
    pub fn describe(&self) -> String {
        match self {
            TraceEvent::KnownFact { goal, .. } => {
                format!("We already know '{}' is true!", goal.label())
            }
            TraceEvent::CachedAnswer { goal, value, .. } => format!(
                "We already checked '{}' ({}). Skipping.",
                goal.label(),
                yes_no(*value)
            ),
            TraceEvent::RuleMatch { goal, premises, .. } => format!(
                "To prove {}, we need to find clues for: {}",
                goal.label(),
                join_labels(premises)
            ),
            TraceEvent::Proven { goal, .. } => format!("Goal '{}' is proven!", goal.label()),
            TraceEvent::Failed { goal, premise, .. } => format!(
                "'{}' does not hold, so '{}' cannot be proven.",
                premise.label(),
                goal.label()
            ),
            TraceEvent::AskUser { goal, .. } => {
                format!("We need to ask a question to find out about: {}", goal.label())
            }
            TraceEvent::Answered { goal, value, .. } => {
                format!("You answered {} for '{}'.", yes_no(*value), goal.label())
            }
            TraceEvent::Deferred { goal, .. } => {
                format!("Waiting for your answer about '{}'...", goal.label())
            }
            TraceEvent::CycleDetected { goal, .. } => format!(
                "'{}' depends on itself, so we stop here and treat it as unproven.",
                goal.label()
            ),
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firing_description() {
        let firing = Firing {
            conclusion: "feeling_unwell".into(),
            premises: vec!["needs_a_break".into(), "needs_a_hug".into()],
            round: 2,
        };
        assert_eq!(
            firing.describe(),
            "We know: needs a break, needs a hug. So, we conclude: feeling unwell"
        );
    }

    #[test]
    fn trace_event_serializes_with_type_tag() {
        let event = TraceEvent::AskUser { goal: "feeling_sad".into(), depth: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AskUser");
        assert_eq!(json["goal"], "feeling_sad");
        assert_eq!(json["depth"], 2);
    }

    #[test]
    fn accessors() {
        let event = TraceEvent::Failed {
            goal: "feeling_unwell".into(),
            depth: 0,
            premise: "needs_a_hug".into(),
        };
        assert_eq!(event.depth(), 0);
        assert_eq!(event.goal().as_str(), "feeling_unwell");
        assert_eq!(event.icon(), "🚫");
    }
}
