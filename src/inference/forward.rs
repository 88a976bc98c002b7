//! # Encadeamento para Frente: O Coletor de Pistas
//!
//! Parte dos fatos conhecidos e deriva tudo que for possível, até um
//! **ponto fixo**:
//!
//! ```text
//! repita:
//!   para cada regra (em ordem de inserção):
//!     se todas as premissas são fatos E a conclusão ainda não é fato:
//!       dispara: conclusão vira fato
//! até uma varredura completa sem disparos
//! ```
//!
//! ## Terminação
//!
//! Cada disparo adiciona uma conclusão nova; uma conclusão nunca dispara
//! duas vezes. Logo há no máximo `|regras|` varreduras produtivas, mais
//! uma varredura final que confirma o ponto fixo.
//!
//! ## Premissas desconhecidas
//!
//! Uma premissa que nunca vira fato simplesmente impede a regra de
//! disparar: não é erro.

use crate::core::{FactId, FactSet, RuleTable};

use super::memory::WorkingMemory;
use super::trace::Firing;

/// Resultado de uma execução de encadeamento para frente.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForwardOutcome {
    /// Conclusões derivadas nesta execução (não inclui os fatos semeados).
    pub derived: FactSet,
    /// Disparos na ordem em que aconteceram: um por conclusão.
    pub firings: Vec<Firing>,
    /// Número de varreduras completas, incluindo a que confirmou o ponto fixo.
    pub rounds: usize,
}

/// Semeia `initial` na memória e encadeia para frente até o ponto fixo.
///
/// A memória é compartilhada com chamadas anteriores: fatos e conclusões
/// já conhecidos continuam valendo, e não disparam de novo.
pub fn forward_chain<I>(rules: &RuleTable, memory: &mut WorkingMemory, initial: I) -> ForwardOutcome
where
    I: IntoIterator<Item = FactId>,
{
    for fact in initial {
        memory.assert_fact(fact);
    }

    let mut outcome = ForwardOutcome::default();
    loop {
        outcome.rounds += 1;
        let mut fired = false;

        for rule in rules {
            if memory.knows(&rule.conclusion) {
                continue;
            }
            if !rule.premises.iter().all(|p| memory.knows(p)) {
                continue;
            }

            memory.assert_fact(rule.conclusion.clone());
            tracing::debug!(
                conclusion = %rule.conclusion,
                round = outcome.rounds,
                "forward: regra disparou"
            );
            outcome.derived.insert(rule.conclusion.clone());
            outcome.firings.push(Firing {
                conclusion: rule.conclusion.clone(),
                premises: rule.premises.clone(),
                round: outcome.rounds,
            });
            fired = true;
        }

        if !fired {
            break;
        }
    }

    tracing::debug!(
        derived = outcome.derived.len(),
        rounds = outcome.rounds,
        "forward: ponto fixo alcançado"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fact_set;

    fn mental_rules() -> RuleTable {
        RuleTable::from_literal(&[
            ("needs_a_break", &["feeling_tired"]),
            ("needs_a_hug", &["feeling_sad"]),
            ("feeling_unwell", &["needs_a_break", "needs_a_hug"]),
        ])
        .unwrap()
    }

    fn run(rules: &RuleTable, seed: &[&str]) -> (WorkingMemory, ForwardOutcome) {
        let mut memory = WorkingMemory::new();
        let outcome = forward_chain(rules, &mut memory, seed.iter().map(|s| FactId::from(*s)));
        (memory, outcome)
    }

    #[test]
    fn tired_only_derives_break() {
        let (_, outcome) = run(&mental_rules(), &["feeling_tired"]);
        assert_eq!(outcome.derived, fact_set(["needs_a_break"]));
    }

    #[test]
    fn tired_and_sad_derive_everything_in_dependency_order() {
        let (_, outcome) = run(&mental_rules(), &["feeling_tired", "feeling_sad"]);
        assert_eq!(
            outcome.derived,
            fact_set(["needs_a_break", "needs_a_hug", "feeling_unwell"])
        );
        let order: Vec<&str> = outcome.firings.iter().map(|f| f.conclusion.as_str()).collect();
        assert_eq!(order, vec!["needs_a_break", "needs_a_hug", "feeling_unwell"]);
    }

    #[test]
    fn empty_seed_derives_nothing() {
        let (memory, outcome) = run(&mental_rules(), &[]);
        assert!(outcome.derived.is_empty());
        assert!(outcome.firings.is_empty());
        assert!(memory.facts().is_empty());
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn facts_grow_monotonically() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::with_facts(["unrelated".into()]);
        let before = memory.facts().clone();
        forward_chain(&rules, &mut memory, [FactId::from("feeling_sad")]);
        assert!(memory.facts().is_superset(&before));
    }

    #[test]
    fn rerun_reaches_fixed_point() {
        let rules = mental_rules();
        let (mut memory, first) = run(&rules, &["feeling_tired", "feeling_sad"]);
        assert_eq!(first.derived.len(), 3);
        let second = forward_chain(&rules, &mut memory, std::iter::empty());
        assert!(second.derived.is_empty());
        assert!(second.firings.is_empty());
    }

    #[test]
    fn result_does_not_depend_on_rule_order() {
        let reversed = RuleTable::from_literal(&[
            ("feeling_unwell", &["needs_a_break", "needs_a_hug"]),
            ("needs_a_hug", &["feeling_sad"]),
            ("needs_a_break", &["feeling_tired"]),
        ])
        .unwrap();
        let (_, a) = run(&mental_rules(), &["feeling_tired", "feeling_sad"]);
        let (_, b) = run(&reversed, &["feeling_tired", "feeling_sad"]);
        assert_eq!(a.derived, b.derived);
        // reversed order needs a second scan for feeling_unwell
        assert_eq!(b.firings.last().unwrap().round, 2);
    }

    #[test]
    fn seeded_conclusion_does_not_fire_again() {
        let (_, outcome) = run(&mental_rules(), &["feeling_tired", "needs_a_break"]);
        assert!(outcome.derived.is_empty());
        assert!(outcome.firings.is_empty());
    }

    #[test]
    fn unknown_premises_never_fire() {
        let rules = RuleTable::from_literal(&[("needs_a_break", &["ghost"])]).unwrap();
        let (_, outcome) = run(&rules, &["feeling_tired"]);
        assert!(outcome.derived.is_empty());
    }

    #[test]
    fn firings_record_premises() {
        let (_, outcome) = run(&mental_rules(), &["feeling_tired", "feeling_sad"]);
        let last = outcome.firings.last().unwrap();
        assert_eq!(last.premises, vec![FactId::from("needs_a_break"), "needs_a_hug".into()]);
        assert_eq!(last.round, 1);
    }
}
