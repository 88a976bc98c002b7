//! # Eventos SSE de Raciocínio
//!
//! Cada execução (página para frente, caçada para trás, turno do chat)
//! publica seus passos no canal broadcast, marcados com o id da sessão.
//! O `/events?session=<id>` repassa só os eventos daquela sessão.
//!
//! ## Ciclo de Vida dos Eventos
//!
//! ```text
//! Para frente:  RuleFired* → Finished
//! Para trás:    Step* → (Question | Finished)
//! Chat:         RuleFired* → Step* → (Question | Finished)?
//! ```
//!
//! ## Serialização
//!
//! ```json
//! { "session": "uuid", "event": { "type": "RuleFired", "firing": { ... } } }
//! ```

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::FactId;
use crate::inference::{Firing, TraceEvent};

/// Evento de uma sessão, como trafega no canal.
#[derive(Clone, Debug, Serialize)]
pub struct SessionEvent {
    /// Sessão de origem.
    pub session: Uuid,
    /// O que aconteceu.
    pub event: ReasoningEvent,
}

/// Passo observável de uma execução de raciocínio.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum ReasoningEvent {
    /// Uma regra disparou no encadeamento para frente.
    RuleFired {
        /// O disparo, com premissas e varredura.
        firing: Firing,
    },

    /// Um passo da busca em profundidade.
    Step {
        /// O passo do rastro.
        step: TraceEvent,
    },

    /// A execução parou esperando uma resposta de sim/não.
    Question {
        /// Fato terminal perguntado.
        fact: FactId,
    },

    /// A execução terminou.
    Finished {
        /// Página de origem (`"forward"`, `"backward"`, `"chat"`).
        page: &'static str,
        /// Resumo legível do resultado.
        summary: String,
    },
}

/// Publica uma sequência de eventos de uma sessão.
///
/// Sem inscritos o `send` falha; os eventos simplesmente se perdem.
pub fn publish(
    tx: &broadcast::Sender<SessionEvent>,
    session: Uuid,
    events: impl IntoIterator<Item = ReasoningEvent>,
) {
    for event in events {
        let _ = tx.send(SessionEvent { session, event });
    }
}
