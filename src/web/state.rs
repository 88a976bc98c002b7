//! # Estado da Aplicação Web
//!
//! Estado compartilhado entre todos os handlers Axum. Tudo aqui é
//! imutável ou sincronizado; o estado mutável de raciocínio vive nas
//! sessões.
//!
//! ```text
//! AppState (Clone barato: só Arcs)
//!  ├── catalog       Arc<Catalog>          somente leitura
//!  ├── orchestrator  Arc<Orchestrator>     somente leitura
//!  ├── sessions      Arc<SessionStore>     RwLock + Mutex por sessão
//!  └── events_tx     broadcast::Sender     SSE
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::core::Catalog;
use crate::orchestrator::Orchestrator;
use crate::session::SessionStore;
use crate::web::events::SessionEvent;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Tabelas de regras validadas.
    pub catalog: Arc<Catalog>,
    /// Roteiro do chatbot.
    pub orchestrator: Arc<Orchestrator>,
    /// Sessões de raciocínio por visitante.
    pub sessions: Arc<SessionStore>,
    /// Canal broadcast para eventos SSE de raciocínio.
    pub events_tx: Arc<broadcast::Sender<SessionEvent>>,
}

impl AppState {
    /// Monta o estado a partir do catálogo já validado.
    pub fn new(catalog: Catalog, max_sessions: usize, event_capacity: usize) -> Self {
        let catalog = Arc::new(catalog);
        let (events_tx, _) = broadcast::channel(event_capacity);
        Self {
            orchestrator: Arc::new(Orchestrator::new(Arc::clone(&catalog))),
            catalog,
            sessions: Arc::new(SessionStore::new(max_sessions)),
            events_tx: Arc::new(events_tx),
        }
    }
}
