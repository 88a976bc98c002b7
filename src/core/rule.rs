//! # Regras e Tabela de Regras
//!
//! Uma [`Rule`] liga uma **conclusão** a uma lista ordenada de **premissas**:
//!
//! ```text
//! SE feeling_tired ENTÃO needs_a_break
//! SE needs_a_break E needs_a_hug ENTÃO feeling_unwell
//! ```
//!
//! A [`RuleTable`] é imutável depois de montada. Ela preserva a ordem de
//! inserção (usada pelo encadeamento para frente) e mantém um índice
//! conclusão → posição (usado pelo encadeamento para trás).
//!
//! ## Validação
//!
//! | Situação | Resultado |
//! |----------|-----------|
//! | Conclusão repetida | [`RuleError::DuplicateConclusion`] |
//! | Conclusão vazia ou com espaços | [`RuleError::InvalidConclusion`] |
//! | Premissa vazia ou com espaços | [`RuleError::InvalidPremise`] |
//! | Premissa desconhecida | permitido: nunca será satisfeita por regra |
//! | Ciclo entre regras | permitido: o encadeamento para trás se protege |

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::fact::FactId;

/// Erros de configuração de uma tabela de regras.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// Duas regras com a mesma conclusão: a segunda sobrescreveria a primeira.
    #[error("duplicate conclusion `{0}` in rule table")]
    DuplicateConclusion(FactId),

    /// Conclusão vazia ou contendo espaços.
    #[error("invalid conclusion identifier `{0}`")]
    InvalidConclusion(FactId),

    /// Premissa vazia ou contendo espaços.
    #[error("invalid premise `{premise}` in rule for `{conclusion}`")]
    InvalidPremise {
        /// Conclusão da regra com a premissa inválida.
        conclusion: FactId,
        /// A premissa rejeitada.
        premise: FactId,
    },
}

/// Uma regra SE-premissas-ENTÃO-conclusão.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Identificador concluído quando todas as premissas são verdadeiras.
    pub conclusion: FactId,
    /// Premissas em ordem: o encadeamento para trás as avalia da esquerda para a direita.
    pub premises: Vec<FactId>,
}

impl Rule {
    /// Cria uma regra a partir de tokens.
    pub fn new<I, S>(conclusion: impl Into<FactId>, premises: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FactId>,
    {
        Self {
            conclusion: conclusion.into(),
            premises: premises.into_iter().map(Into::into).collect(),
        }
    }

    /// Descrição legível: `"feeling tired → needs a break"`.
    pub fn describe(&self) -> String {
        format!(
            "{} → {}",
            super::fact::join_labels(&self.premises),
            self.conclusion.label()
        )
    }
}

/// Tabela de regras imutável, com uma regra por conclusão.
///
/// Pode ser compartilhada entre sessões via `Arc`: nenhuma operação
/// do motor a modifica.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    /// Regras em ordem de inserção.
    rules: Vec<Rule>,
    /// Índice conclusão → posição em `rules`.
    by_conclusion: HashMap<FactId, usize>,
}

impl RuleTable {
    /// Monta uma tabela validando cada regra.
    ///
    /// # Erros
    ///
    /// Retorna [`RuleError`] na primeira regra inválida ou conclusão repetida.
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self, RuleError> {
        let mut table = Self::default();
        for rule in rules {
            if !rule.conclusion.is_valid() {
                return Err(RuleError::InvalidConclusion(rule.conclusion));
            }
            if let Some(premise) = rule.premises.iter().find(|p| !p.is_valid()) {
                return Err(RuleError::InvalidPremise {
                    conclusion: rule.conclusion.clone(),
                    premise: premise.clone(),
                });
            }
            if table.by_conclusion.contains_key(&rule.conclusion) {
                return Err(RuleError::DuplicateConclusion(rule.conclusion));
            }
            table
                .by_conclusion
                .insert(rule.conclusion.clone(), table.rules.len());
            table.rules.push(rule);
        }
        Ok(table)
    }

    /// Atalho para tabelas literais: `&[("conclusão", &["premissa", ...])]`.
    pub fn from_literal(entries: &[(&str, &[&str])]) -> Result<Self, RuleError> {
        Self::new(
            entries
                .iter()
                .map(|(conclusion, premises)| Rule::new(*conclusion, premises.iter().copied())),
        )
    }

    /// Regras em ordem de inserção.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// A regra cuja conclusão é `conclusion`, se existir.
    pub fn rule_for(&self, conclusion: &FactId) -> Option<&Rule> {
        self.by_conclusion.get(conclusion).map(|&i| &self.rules[i])
    }

    /// `true` se `id` é conclusão de alguma regra.
    pub fn concludes(&self, id: &FactId) -> bool {
        self.by_conclusion.contains_key(id)
    }

    /// Premissas que não são conclusão de nenhuma regra: só o usuário
    /// pode responder por elas. Ordem de primeira aparição.
    pub fn terminal_facts(&self) -> Vec<FactId> {
        let mut seen = Vec::new();
        for premise in self.rules.iter().flat_map(|r| &r.premises) {
            if !self.concludes(premise) && !seen.contains(premise) {
                seen.push(premise.clone());
            }
        }
        seen
    }

    /// Número de regras.
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
