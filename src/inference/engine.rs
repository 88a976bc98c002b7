//! # InferenceEngine: Pontos de Entrada sem Estado
//!
//! Fachada sobre [`forward_chain`] e [`backward_chain`] para quem não
//! guarda uma [`WorkingMemory`] entre chamadas: cada chamada cria a
//! própria, então chamadas concorrentes nunca compartilham estado.
//!
//! A página de encadeamento para frente roda sempre assim. A caçada da
//! página para trás também: as respostas do usuário ficam na sessão e
//! voltam a cada execução por um oráculo
//! [`Replay`](super::backward::Replay).
//!
//! ## Uso
//!
//! ```rust,ignore
//! let outcome = InferenceEngine::forward_chain(&rules, fact_set(["feeling_tired"]));
//! let outcome = InferenceEngine::backward_chain(
//!     &rules,
//!     &"needs_a_break".into(),
//!     &mut |question: &FactId| ask_somehow(question),
//!     FactSet::new(),
//! );
//! ```

use crate::core::{FactId, FactSet, RuleTable};

use super::backward::{backward_chain, BackwardOutcome, Oracle};
use super::forward::{forward_chain, ForwardOutcome};
use super::memory::WorkingMemory;

/// Motor de inferência: struct sem estado.
pub struct InferenceEngine;

impl InferenceEngine {
    /// Encadeia para frente a partir de `initial_facts`.
    ///
    /// As conclusões derivadas não incluem os fatos semeados; os
    /// disparos vêm em ordem.
    pub fn forward_chain(rules: &RuleTable, initial_facts: FactSet) -> ForwardOutcome {
        let mut memory = WorkingMemory::new();
        forward_chain(rules, &mut memory, initial_facts)
    }

    /// Tenta provar `goal`, perguntando ao `oracle` pelos fatos terminais.
    ///
    /// `known_facts` são tratados como verdadeiros sem perguntar. Com um
    /// oráculo bloqueante (qualquer closure `FnMut(&FactId) -> bool`) a
    /// prova nunca fica pendente.
    pub fn backward_chain<O>(
        rules: &RuleTable,
        goal: &FactId,
        oracle: &mut O,
        known_facts: FactSet,
    ) -> BackwardOutcome
    where
        O: Oracle + ?Sized,
    {
        let mut memory = WorkingMemory::with_facts(known_facts);
        backward_chain(rules, &mut memory, goal, oracle)
    }
}
