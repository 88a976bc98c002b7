//! # Memória de Trabalho
//!
//! Estado mutável de **uma** sessão de raciocínio. A tabela de regras é
//! imutável e compartilhada; tudo que muda durante o raciocínio vive aqui.
//!
//! | Campo | Quem usa | Ciclo de vida |
//! |-------|----------|---------------|
//! | `facts` | ambos | cresce monotonicamente |
//! | `answers` | encadeamento para trás | limpo a cada novo objetivo principal |

use std::collections::HashMap;

use crate::core::{FactId, FactSet};

/// Fatos e respostas memorizadas de uma sessão.
#[derive(Clone, Debug, Default)]
pub struct WorkingMemory {
    facts: FactSet,
    answers: HashMap<FactId, bool>,
}

impl WorkingMemory {
    /// Memória vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Memória semeada com fatos conhecidos.
    pub fn with_facts(facts: impl IntoIterator<Item = FactId>) -> Self {
        Self {
            facts: facts.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fatos considerados verdadeiros.
    pub fn facts(&self) -> &FactSet {
        &self.facts
    }

    /// `true` se `id` é um fato conhecido.
    pub fn knows(&self, id: &FactId) -> bool {
        self.facts.contains(id)
    }

    /// Assere um fato. Retorna `true` se era novo.
    pub fn assert_fact(&mut self, id: FactId) -> bool {
        self.facts.insert(id)
    }

    /// Resultado memorizado para `id`, se houver.
    pub fn cached(&self, id: &FactId) -> Option<bool> {
        self.answers.get(id).copied()
    }

    /// Memoriza o resultado de `id`.
    ///
    /// Usado tanto pelo motor (provas e respostas) quanto pelo anfitrião
    /// para retomar uma prova suspensa com a resposta do usuário.
    pub fn answer(&mut self, id: FactId, value: bool) {
        self.answers.insert(id, value);
    }

    /// Respostas memorizadas até agora.
    pub fn answers(&self) -> &HashMap<FactId, bool> {
        &self.answers
    }

    /// Volta ao estado vazio (reinício da sessão).
    pub fn clear(&mut self) {
        self.facts.clear();
        self.answers.clear();
    }
}
