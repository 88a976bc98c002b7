//! # Módulo Inference: Motor de Encadeamento
//!
//! Duas estratégias clássicas sobre uma tabela de regras SE-ENTÃO:
//!
//! | Estratégia | Direção | Pergunta ao usuário? | Módulo |
//! |------------|---------|----------------------|--------|
//! | **Para frente** | fatos → conclusões | não | [`forward`] |
//! | **Para trás** | objetivo → premissas | sim, para fatos terminais | [`backward`] |
//!
//! ## Analogia
//!
//! - Para frente é o **detetive que coleciona pistas**: junta o que sabe
//!   e vê o que dá para concluir, até não sobrar nada novo.
//! - Para trás é o **caçador de objetivos**: quer provar uma coisa e
//!   pergunta "do que eu preciso para isso?" até chegar numa pergunta
//!   que alguém sabe responder.
//!
//! ## Estado
//!
//! A [`RuleTable`](crate::core::RuleTable) é imutável e compartilhada.
//! Todo estado mutável (fatos, conclusões, respostas memorizadas) vive
//! numa [`WorkingMemory`] que pertence a uma única sessão.

/// Encadeamento para trás com memorização, proteção contra ciclos e suspensão.
pub mod backward;

/// Pontos de entrada sem estado.
pub mod engine;

/// Encadeamento para frente até o ponto fixo.
pub mod forward;

/// Memória de trabalho de uma sessão.
pub mod memory;

/// Eventos de rastro para exibição.
pub mod trace;

pub use backward::{backward_chain, Interactive, Proof, Replay};
pub use engine::InferenceEngine;
pub use forward::forward_chain;
pub use memory::WorkingMemory;
pub use trace::{Firing, TraceEvent};
