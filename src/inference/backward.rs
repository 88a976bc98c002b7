//! # Encadeamento para Trás: O Caçador de Objetivos
//!
//! Parte de um **objetivo** e o reduz recursivamente às premissas,
//! perguntando ao usuário o que não pode ser derivado.
//!
//! ## Algoritmo (busca em profundidade, premissas da esquerda para a direita)
//!
//! ```text
//! provar(objetivo):
//!   1. objetivo é fato conhecido        → verdadeiro
//!   2. objetivo tem resultado memorizado → esse resultado
//!   3. objetivo está em andamento        → falso (ciclo)
//!   4. objetivo é conclusão de regra:
//!        para cada premissa: se !provar(premissa) → memoriza falso, para
//!        todas provadas → memoriza verdadeiro, objetivo vira fato
//!   5. senão: pergunta ao oráculo, memoriza a resposta
//! ```
//!
//! ## Suspensão e Retomada
//!
//! O [`Oracle`] pode responder na hora ([`Reply::Answered`]) ou adiar
//! ([`Reply::Deferred`]). Um adiamento desfaz a recursão com
//! [`Proof::Pending`] sem memorizar nada para os objetivos ancestrais.
//! O anfitrião registra a resposta com
//! [`WorkingMemory::answer()`](super::WorkingMemory::answer) e roda o
//! mesmo objetivo de novo: as respostas memorizadas são reaproveitadas e
//! a prova continua exatamente de onde parou, sem perguntar nada duas vezes.
//!
//! ```text
//! requisição 1: provar(feeling_unwell) → Pending(feeling_tired)
//! usuário: "sim"  → answer(feeling_tired, true)
//! requisição 2: provar(feeling_unwell) → Pending(feeling_sad)
//! usuário: "não"  → answer(feeling_sad, false)
//! requisição 3: provar(feeling_unwell) → Unproven
//! ```

use std::collections::{HashMap, HashSet};

use crate::core::{FactId, RuleTable};

use super::memory::WorkingMemory;
use super::trace::TraceEvent;

/// Resposta de um [`Oracle`] a uma pergunta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// O usuário respondeu sim (`true`) ou não (`false`).
    Answered(bool),
    /// Ainda não há resposta; a prova deve ser suspensa.
    Deferred,
}

/// Fonte de respostas para fatos terminais.
///
/// Qualquer closure `FnMut(&FactId) -> bool` é um oráculo bloqueante.
pub trait Oracle {
    /// Pergunta se `question` é verdadeiro.
    fn ask(&mut self, question: &FactId) -> Reply;
}

impl<F> Oracle for F
where
    F: FnMut(&FactId) -> bool,
{
    fn ask(&mut self, question: &FactId) -> Reply {
        Reply::Answered(self(question))
    }
}

/// Oráculo de um anfitrião interativo: nunca responde na hora.
///
/// Toda resposta já dada está no cache da sessão; qualquer pergunta que
/// chegue até aqui é nova e suspende a prova.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interactive;

impl Oracle for Interactive {
    fn ask(&mut self, _question: &FactId) -> Reply {
        Reply::Deferred
    }
}

/// Oráculo que repete respostas já dadas e adia qualquer pergunta nova.
///
/// Com ele, o anfitrião guarda só as respostas do usuário e roda cada
/// retomada numa memória nova.
#[derive(Clone, Copy, Debug)]
pub struct Replay<'a> {
    answers: &'a HashMap<FactId, bool>,
}

impl<'a> Replay<'a> {
    /// Repete as respostas de `answers`.
    pub fn new(answers: &'a HashMap<FactId, bool>) -> Self {
        Self { answers }
    }
}

impl Oracle for Replay<'_> {
    fn ask(&mut self, question: &FactId) -> Reply {
        self.answers
            .get(question)
            .map_or(Reply::Deferred, |&value| Reply::Answered(value))
    }
}

/// Resultado de uma prova.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Proof {
    /// O objetivo é verdadeiro.
    Proven,
    /// O objetivo não pode ser provado.
    Unproven,
    /// A prova parou esperando a resposta do usuário sobre este fato.
    Pending(FactId),
}

impl Proof {
    /// `true` apenas para [`Proof::Proven`].
    pub fn is_proven(&self) -> bool {
        matches!(self, Proof::Proven)
    }

    /// A pergunta pendente, se houver.
    pub fn pending(&self) -> Option<&FactId> {
        match self {
            Proof::Pending(question) => Some(question),
            _ => None,
        }
    }
}

impl From<bool> for Proof {
    fn from(value: bool) -> Self {
        if value {
            Proof::Proven
        } else {
            Proof::Unproven
        }
    }
}

/// Resultado de uma execução de encadeamento para trás.
#[derive(Clone, Debug, PartialEq)]
pub struct BackwardOutcome {
    /// O veredito para o objetivo.
    pub proof: Proof,
    /// Passos na ordem da busca em profundidade.
    pub trace: Vec<TraceEvent>,
    /// Perguntas feitas ao oráculo nesta execução, em ordem.
    pub asked: Vec<FactId>,
}

/// Tenta provar `goal` usando as regras, a memória da sessão e o oráculo.
///
/// O cache de respostas da memória **não** é limpo aqui: chamar de novo
/// com o mesmo cache devolve o mesmo resultado sem repetir perguntas.
/// Para começar uma avaliação nova, use
/// [`WorkingMemory::clear()`](super::WorkingMemory::clear).
pub fn backward_chain<O>(
    rules: &RuleTable,
    memory: &mut WorkingMemory,
    goal: &FactId,
    oracle: &mut O,
) -> BackwardOutcome
where
    O: Oracle + ?Sized,
{
    let mut prover = Prover {
        rules,
        memory,
        oracle,
        in_progress: HashSet::new(),
        trace: Vec::new(),
        asked: Vec::new(),
    };
    let proof = prover.prove(goal, 0);
    tracing::debug!(goal = %goal, proof = ?proof, steps = prover.trace.len(), "backward: prova concluída");

    BackwardOutcome {
        proof,
        trace: prover.trace,
        asked: prover.asked,
    }
}

/// Estado de uma única descida recursiva.
struct Prover<'a, O: ?Sized> {
    rules: &'a RuleTable,
    memory: &'a mut WorkingMemory,
    oracle: &'a mut O,
    /// Objetivos na pilha atual: revisitar um deles é um ciclo.
    in_progress: HashSet<FactId>,
    trace: Vec<TraceEvent>,
    asked: Vec<FactId>,
}

impl<O: Oracle + ?Sized> Prover<'_, O> {
    fn prove(&mut self, goal: &FactId, depth: usize) -> Proof {
        if self.memory.knows(goal) {
            self.trace.push(TraceEvent::KnownFact { goal: goal.clone(), depth });
            return Proof::Proven;
        }

        if let Some(value) = self.memory.cached(goal) {
            self.trace.push(TraceEvent::CachedAnswer { goal: goal.clone(), depth, value });
            return value.into();
        }

        if self.in_progress.contains(goal) {
            tracing::debug!(goal = %goal, "backward: ciclo detectado");
            self.trace.push(TraceEvent::CycleDetected { goal: goal.clone(), depth });
            return Proof::Unproven;
        }

        let rules = self.rules;
        match rules.rule_for(goal) {
            Some(rule) => {
                self.in_progress.insert(goal.clone());
                let proof = self.prove_rule(goal, &rule.premises, depth);
                self.in_progress.remove(goal);
                proof
            }
            None => self.ask(goal, depth),
        }
    }

    /// Passo 4: E não-comutativo, da esquerda para a direita.
    fn prove_rule(&mut self, goal: &FactId, premises: &[FactId], depth: usize) -> Proof {
        self.trace.push(TraceEvent::RuleMatch {
            goal: goal.clone(),
            depth,
            premises: premises.to_vec(),
        });

        for premise in premises {
            match self.prove(premise, depth + 1) {
                Proof::Proven => {}
                Proof::Unproven => {
                    self.trace.push(TraceEvent::Failed {
                        goal: goal.clone(),
                        depth,
                        premise: premise.clone(),
                    });
                    self.memory.answer(goal.clone(), false);
                    return Proof::Unproven;
                }
                pending @ Proof::Pending(_) => return pending,
            }
        }

        self.memory.answer(goal.clone(), true);
        self.memory.assert_fact(goal.clone());
        self.trace.push(TraceEvent::Proven { goal: goal.clone(), depth });
        Proof::Proven
    }

    /// Passo 5: fato terminal, pergunta ao oráculo.
    fn ask(&mut self, goal: &FactId, depth: usize) -> Proof {
        self.trace.push(TraceEvent::AskUser { goal: goal.clone(), depth });

        match self.oracle.ask(goal) {
            Reply::Answered(value) => {
                tracing::debug!(question = %goal, value, "backward: usuário respondeu");
                self.asked.push(goal.clone());
                self.memory.answer(goal.clone(), value);
                self.trace.push(TraceEvent::Answered { goal: goal.clone(), depth, value });
                value.into()
            }
            Reply::Deferred => {
                tracing::debug!(question = %goal, "backward: pergunta pendente");
                self.trace.push(TraceEvent::Deferred { goal: goal.clone(), depth });
                Proof::Pending(goal.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::core::fact_set;
    use crate::inference::forward::forward_chain;

    fn mental_rules() -> RuleTable {
        RuleTable::from_literal(&[
            ("needs_a_break", &["feeling_tired"]),
            ("needs_a_hug", &["feeling_sad"]),
            ("feeling_unwell", &["needs_a_break", "needs_a_hug"]),
        ])
        .unwrap()
    }

    /// Oráculo roteirizado que registra cada pergunta recebida.
    fn scripted<'a>(
        answers: &'a [(&'a str, bool)],
        asked: &'a mut Vec<String>,
    ) -> impl FnMut(&FactId) -> bool + 'a {
        let answers: HashMap<&str, bool> = answers.iter().copied().collect();
        move |q: &FactId| {
            asked.push(q.to_string());
            answers.get(q.as_str()).copied().unwrap_or(false)
        }
    }

    #[test]
    fn unwell_fails_when_sad_is_denied() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::new();
        let mut asked = Vec::new();
        let mut oracle = scripted(&[("feeling_tired", true), ("feeling_sad", false)], &mut asked);

        let outcome = backward_chain(&rules, &mut memory, &"feeling_unwell".into(), &mut oracle);
        drop(oracle);

        assert_eq!(outcome.proof, Proof::Unproven);
        assert_eq!(asked, vec!["feeling_tired", "feeling_sad"]);
        assert_eq!(outcome.asked, vec![FactId::from("feeling_tired"), "feeling_sad".into()]);
    }

    #[test]
    fn known_fact_short_circuits_without_asking() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::with_facts(["feeling_tired".into()]);
        let mut asked = Vec::new();
        let mut oracle = scripted(&[], &mut asked);

        let outcome = backward_chain(&rules, &mut memory, &"needs_a_break".into(), &mut oracle);
        drop(oracle);

        assert!(outcome.proof.is_proven());
        assert!(asked.is_empty());
        assert!(memory.knows(&"needs_a_break".into()));
    }

    #[test]
    fn first_failing_premise_stops_evaluation() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::new();
        let mut asked = Vec::new();
        let mut oracle = scripted(&[("feeling_tired", false)], &mut asked);

        let outcome = backward_chain(&rules, &mut memory, &"feeling_unwell".into(), &mut oracle);
        drop(oracle);

        assert_eq!(outcome.proof, Proof::Unproven);
        assert_eq!(asked, vec!["feeling_tired"]);
        assert!(outcome
            .trace
            .iter()
            .all(|e| e.goal().as_str() != "needs_a_hug"));
    }

    #[test]
    fn trace_follows_depth_first_order() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::new();
        let mut oracle = |_: &FactId| true;

        let outcome = backward_chain(&rules, &mut memory, &"feeling_unwell".into(), &mut oracle);

        let steps: Vec<(&str, usize)> = outcome
            .trace
            .iter()
            .map(|e| (e.goal().as_str(), e.depth()))
            .collect();
        assert_eq!(
            steps,
            vec![
                ("feeling_unwell", 0),
                ("needs_a_break", 1),
                ("feeling_tired", 2),
                ("feeling_tired", 2),
                ("needs_a_break", 1),
                ("needs_a_hug", 1),
                ("feeling_sad", 2),
                ("feeling_sad", 2),
                ("needs_a_hug", 1),
                ("feeling_unwell", 0),
            ]
        );
        assert!(matches!(outcome.trace[0], TraceEvent::RuleMatch { .. }));
        assert!(matches!(outcome.trace[2], TraceEvent::AskUser { .. }));
        assert!(matches!(outcome.trace[9], TraceEvent::Proven { .. }));
    }

    #[test]
    fn repeated_goal_uses_cache() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::new();
        let mut asked = Vec::new();
        let mut oracle = scripted(&[("feeling_tired", true), ("feeling_sad", false)], &mut asked);

        let first = backward_chain(&rules, &mut memory, &"feeling_unwell".into(), &mut oracle);
        let second = backward_chain(&rules, &mut memory, &"feeling_unwell".into(), &mut oracle);
        drop(oracle);

        assert_eq!(first.proof, second.proof);
        assert_eq!(asked, vec!["feeling_tired", "feeling_sad"]);
        assert!(matches!(second.trace[0], TraceEvent::CachedAnswer { value: false, .. }));
    }

    #[test]
    fn shared_premise_is_asked_once() {
        let rules = RuleTable::from_literal(&[
            ("suggest_therapy", &["feeling_sad", "feeling_anxious"]),
            ("needs_a_hug", &["feeling_sad"]),
        ])
        .unwrap();
        let mut memory = WorkingMemory::new();
        let mut asked = Vec::new();
        let mut oracle = scripted(&[("feeling_sad", true), ("feeling_anxious", false)], &mut asked);

        backward_chain(&rules, &mut memory, &"suggest_therapy".into(), &mut oracle);
        let hug = backward_chain(&rules, &mut memory, &"needs_a_hug".into(), &mut oracle);
        drop(oracle);

        assert!(hug.proof.is_proven());
        assert_eq!(asked, vec!["feeling_sad", "feeling_anxious"]);
    }

    #[test]
    fn agrees_with_forward_chaining() {
        let rules = mental_rules();
        let seed = fact_set(["feeling_tired", "feeling_sad"]);
        let mut forward_memory = WorkingMemory::new();
        let derived = forward_chain(&rules, &mut forward_memory, seed.clone()).derived;

        for conclusion in &derived {
            let mut memory = WorkingMemory::with_facts(seed.clone());
            let mut asked = Vec::new();
            let mut oracle = scripted(&[], &mut asked);
            let outcome = backward_chain(&rules, &mut memory, conclusion, &mut oracle);
            drop(oracle);
            assert!(outcome.proof.is_proven(), "{conclusion}");
            assert!(asked.is_empty(), "{conclusion} asked {asked:?}");
        }
    }

    #[test]
    fn cycles_terminate_as_unproven() {
        let rules = RuleTable::from_literal(&[
            ("calm", &["rested"]),
            ("rested", &["calm"]),
        ])
        .unwrap();
        let mut memory = WorkingMemory::new();
        let mut asked = Vec::new();
        let mut oracle = scripted(&[], &mut asked);

        let outcome = backward_chain(&rules, &mut memory, &"calm".into(), &mut oracle);
        drop(oracle);

        assert_eq!(outcome.proof, Proof::Unproven);
        assert!(asked.is_empty());
        assert!(outcome
            .trace
            .iter()
            .any(|e| matches!(e, TraceEvent::CycleDetected { goal, .. } if goal.as_str() == "calm")));
    }

    #[test]
    fn revisited_goal_is_not_cached_by_the_cycle() {
        let rules = RuleTable::from_literal(&[
            ("rest_day", &["calm"]),
            ("calm", &["rested"]),
            ("rested", &["steady"]),
            ("steady", &["calm"]),
        ])
        .unwrap();
        let mut memory = WorkingMemory::new();
        let mut oracle = |_: &FactId| true;

        let outcome = backward_chain(&rules, &mut memory, &"rest_day".into(), &mut oracle);
        assert_eq!(outcome.proof, Proof::Unproven);

        let cycles: Vec<(&str, usize)> = outcome
            .trace
            .iter()
            .filter(|e| matches!(e, TraceEvent::CycleDetected { .. }))
            .map(|e| (e.goal().as_str(), e.depth()))
            .collect();
        assert_eq!(cycles, vec![("calm", 4)]);
        assert!(outcome
            .trace
            .iter()
            .all(|e| !matches!(e, TraceEvent::CachedAnswer { .. })));

        // o falso de calm vem da própria regra, depois de rested e steady
        let failed: Vec<&str> = outcome
            .trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Failed { goal, .. } => Some(goal.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec!["steady", "rested", "calm", "rest_day"]);
        for goal in ["steady", "rested", "calm", "rest_day"] {
            assert_eq!(memory.cached(&goal.into()), Some(false), "{goal}");
        }
    }

    #[test]
    fn replay_answers_known_questions_and_defers_the_rest() {
        let mut answers = HashMap::new();
        answers.insert(FactId::from("feeling_tired"), false);
        let mut replay = Replay::new(&answers);

        assert_eq!(replay.ask(&"feeling_tired".into()), Reply::Answered(false));
        assert_eq!(replay.ask(&"feeling_sad".into()), Reply::Deferred);
    }

    #[test]
    fn self_referencing_rule_with_escape_premise() {
        let rules = RuleTable::from_literal(&[("loop", &["loop", "feeling_tired"])]).unwrap();
        let mut memory = WorkingMemory::new();
        let mut oracle = |_: &FactId| true;

        let outcome = backward_chain(&rules, &mut memory, &"loop".into(), &mut oracle);
        assert_eq!(outcome.proof, Proof::Unproven);
        assert_eq!(memory.cached(&"loop".into()), Some(false));
    }

    #[test]
    fn unknown_goal_goes_to_the_user() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::new();
        let mut oracle = |_: &FactId| false;
        let outcome = backward_chain(&rules, &mut memory, &"ghost".into(), &mut oracle);
        assert_eq!(outcome.proof, Proof::Unproven);
        assert_eq!(outcome.asked, vec![FactId::from("ghost")]);
    }

    #[test]
    fn interactive_oracle_suspends_and_resumes() {
        let rules = mental_rules();
        let goal = FactId::from("feeling_unwell");
        let mut memory = WorkingMemory::new();

        let first = backward_chain(&rules, &mut memory, &goal, &mut Interactive);
        assert_eq!(first.proof, Proof::Pending("feeling_tired".into()));
        assert!(first.asked.is_empty());
        // nada memorizado para os ancestrais ainda não resolvidos
        assert_eq!(memory.cached(&goal), None);
        assert_eq!(memory.cached(&"needs_a_break".into()), None);

        memory.answer("feeling_tired".into(), true);
        let second = backward_chain(&rules, &mut memory, &goal, &mut Interactive);
        assert_eq!(second.proof, Proof::Pending("feeling_sad".into()));

        memory.answer("feeling_sad".into(), true);
        let third = backward_chain(&rules, &mut memory, &goal, &mut Interactive);
        assert_eq!(third.proof, Proof::Proven);
        assert!(third
            .trace
            .iter()
            .all(|e| !matches!(e, TraceEvent::AskUser { .. })));
    }

    #[test]
    fn resumed_result_matches_blocking_result() {
        let rules = mental_rules();
        let goal = FactId::from("feeling_unwell");
        let script = [("feeling_tired", true), ("feeling_sad", false)];

        let mut blocking_memory = WorkingMemory::new();
        let mut asked = Vec::new();
        let mut oracle = scripted(&script, &mut asked);
        let blocking = backward_chain(&rules, &mut blocking_memory, &goal, &mut oracle);
        drop(oracle);

        let mut memory = WorkingMemory::new();
        let mut questions = Vec::new();
        let resumed = loop {
            let outcome = backward_chain(&rules, &mut memory, &goal, &mut Interactive);
            match outcome.proof {
                Proof::Pending(q) => {
                    let value = script.iter().find(|(id, _)| *id == q.as_str()).map(|(_, v)| *v);
                    questions.push(q.to_string());
                    memory.answer(q, value.unwrap_or(false));
                }
                done => break done,
            }
        };

        assert_eq!(resumed, blocking.proof);
        assert_eq!(questions, asked);
    }

    #[test]
    fn dyn_oracle_is_accepted() {
        let rules = mental_rules();
        let mut memory = WorkingMemory::new();
        let mut interactive = Interactive;
        let oracle: &mut dyn Oracle = &mut interactive;
        let outcome = backward_chain(&rules, &mut memory, &"needs_a_hug".into(), oracle);
        assert_eq!(outcome.proof.pending(), Some(&FactId::from("feeling_sad")));
    }
}
