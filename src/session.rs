//! # Sessões de Raciocínio
//!
//! Cada visitante tem uma [`ReasoningSession`] isolada: memória de
//! trabalho própria para cada página e o histórico do chat. Nada de
//! estado global mutável.
//!
//! ```text
//! SessionStore
//!   └── RwLock<HashMap<Uuid, Arc<Mutex<ReasoningSession>>>>
//!         ├── forward:  WorkingMemory      (/forward)
//!         ├── backward: BackwardHunt       (/backward)
//!         └── chat:     Conversation       (/chat)
//! ```
//!
//! As páginas criam a sessão no GET; os formulários devolvem o id.
//! Um id desconhecido (ou expirado) cria uma sessão nova de forma
//! transparente. Acima de `max_sessions`, as mais antigas (menor
//! `created_at`) saem.
//!
//! O navegador guarda o id também no cookie `chaining_session`, então
//! navegar entre páginas ou recarregar retoma a mesma sessão.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::core::FactId;
use crate::inference::WorkingMemory;
use crate::orchestrator::Conversation;

/// Estado da página de encadeamento para trás.
#[derive(Clone, Debug, Default)]
pub struct BackwardHunt {
    /// Fatos e respostas memorizadas da caçada atual.
    pub memory: WorkingMemory,
    /// Objetivo escolhido no último "Start the Goal Hunt".
    pub goal: Option<FactId>,
    /// Pergunta aguardando resposta.
    pub pending: Option<FactId>,
}

impl BackwardHunt {
    /// Nova caçada: limpa o cache de respostas e fixa o objetivo.
    pub fn start(&mut self, goal: FactId) {
        self.memory.clear();
        self.goal = Some(goal);
        self.pending = None;
    }
}

/// Contexto de raciocínio de um visitante.
#[derive(Debug)]
pub struct ReasoningSession {
    /// Identificador enviado nos formulários.
    pub id: Uuid,
    /// Momento de criação.
    pub created_at: DateTime<Utc>,
    /// Memória da página de encadeamento para frente.
    pub forward: WorkingMemory,
    /// Caçada da página de encadeamento para trás.
    pub backward: BackwardHunt,
    /// Conversa com o chatbot.
    pub chat: Conversation,
}

impl ReasoningSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            forward: WorkingMemory::new(),
            backward: BackwardHunt::default(),
            chat: Conversation::new(),
        }
    }
}

/// Sessão compartilhada entre requisições.
pub type SharedSession = Arc<Mutex<ReasoningSession>>;

/// Armazém de sessões em memória.
pub struct SessionStore {
    inner: RwLock<Registry>,
    max_sessions: usize,
}

/// Chave de despejo: momento de criação, com o número de ordem
/// desempatando sessões criadas no mesmo instante.
type Age = (DateTime<Utc>, u64);

/// Sessões indexadas por id.
#[derive(Default)]
struct Registry {
    next_seq: u64,
    sessions: HashMap<Uuid, (Age, SharedSession)>,
}

impl SessionStore {
    /// Cria um armazém que mantém no máximo `max_sessions` sessões.
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Sessão existente para `id`, ou uma nova.
    ///
    /// Retorna `(sessão, criada)`; `criada == true` quando o id era
    /// ausente ou desconhecido.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (SharedSession, bool) {
        if let Some(id) = id {
            if let Some((_, session)) = self.inner.read().sessions.get(&id) {
                return (Arc::clone(session), false);
            }
        }
        (self.create(), true)
    }

    /// Busca uma sessão sem criar.
    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.inner.read().sessions.get(id).map(|(_, s)| Arc::clone(s))
    }

    /// Cria e registra uma sessão nova, despejando as mais antigas
    /// (menor `created_at`).
    pub fn create(&self) -> SharedSession {
        let session = ReasoningSession::new();
        let id = session.id;
        let created_at = session.created_at;
        let shared = Arc::new(Mutex::new(session));

        let mut registry = self.inner.write();
        let seq = registry.next_seq;
        registry.next_seq += 1;

        let sessions = &mut registry.sessions;
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, (age, _))| *age)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::debug!(session = %oldest, "sessão despejada");
        }
        sessions.insert(id, ((created_at, seq), Arc::clone(&shared)));
        tracing::debug!(session = %id, total = sessions.len(), "sessão criada");
        shared
    }

    /// Número de sessões vivas.
    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_creates_session() {
        let store = SessionStore::new(8);
        let (session, created) = store.get_or_create(Some(Uuid::new_v4()));
        assert!(created);
        assert_eq!(store.len(), 1);

        let id = session.lock().id;
        let (again, created) = store.get_or_create(Some(id));
        assert!(!created);
        assert!(Arc::ptr_eq(&session, &again));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new(8);
        let a = store.create();
        let b = store.create();
        a.lock().forward.assert_fact("feeling_tired".into());
        assert!(b.lock().forward.facts().is_empty());
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let store = SessionStore::new(2);
        let first = store.create().lock().id;
        let second = store.create().lock().id;
        let third = store.create().lock().id;

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
    }

    #[test]
    fn eviction_follows_creation_time() {
        let store = SessionStore::new(2);
        let first = store.create().lock().id;
        let second = store.create().lock().id;
        // a primeira passa a ser a mais nova
        if let Some((age, _)) = store.inner.write().sessions.get_mut(&first) {
            age.0 = Utc::now() + chrono::Duration::seconds(60);
        }

        store.create();
        assert!(store.get(&first).is_some());
        assert!(store.get(&second).is_none());
    }

    #[test]
    fn starting_a_hunt_clears_answers() {
        let mut hunt = BackwardHunt::default();
        hunt.memory.answer("feeling_sad".into(), true);
        hunt.pending = Some("feeling_anxious".into());

        hunt.start("suggest_therapy".into());
        assert_eq!(hunt.memory.cached(&"feeling_sad".into()), None);
        assert!(hunt.pending.is_none());
        assert_eq!(hunt.goal, Some(FactId::from("suggest_therapy")));
    }
}
