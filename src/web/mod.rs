//! # Módulo Web: O Playground no Navegador
//!
//! Camada web construída com **Axum** + **HTMX** + **Maud** + **SSE**.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (HTMX + EventSource)                            │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                               │
//! │  ├── GET  /                 → apresentação              │
//! │  ├── GET  /forward          → página para frente        │
//! │  ├── POST /forward/run      → HTMX fragment             │
//! │  ├── GET  /backward         → página para trás          │
//! │  ├── POST /backward/start   → HTMX fragment             │
//! │  ├── POST /backward/answer  → HTMX fragment             │
//! │  ├── GET  /chat             → chatbot                   │
//! │  ├── POST /chat/message     → HTMX fragment             │
//! │  ├── GET  /status           → JSON                      │
//! │  └── GET  /events           → SSE stream por sessão     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)         │
//! │ TraceLayer (tower_http) → spans por requisição          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Eventos SSE de raciocínio |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Páginas HTML ──────────────────────────────────────
        .route("/", get(handlers::index))
        .route("/forward", get(handlers::forward_page))
        .route("/backward", get(handlers::backward_page))
        .route("/chat", get(handlers::chat_page))
        // ── HTMX fragments ───────────────────────────────────
        .route("/forward/run", post(handlers::forward_run))
        .route("/backward/start", post(handlers::backward_start))
        .route("/backward/answer", post(handlers::backward_answer))
        .route("/chat/message", post(handlers::chat_message))
        // ── API JSON / SSE ───────────────────────────────────
        .route("/status", get(handlers::status))
        .route("/events", get(handlers::sse_events))
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
