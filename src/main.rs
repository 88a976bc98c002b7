//! # AI Chaining Playground
//!
//! **Ponto de entrada** do playground de encadeamento para frente e para
//! trás. Valida o catálogo de regras, monta o estado compartilhado e
//! inicia o servidor web.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Lê Config (variáveis CHAINING_*)
//!   ├── Configura tracing/logging (RUST_LOG ou CHAINING_LOG)
//!   ├── Valida o Catalog embutido (erro aborta a inicialização)
//!   ├── Monta AppState (sessões, orquestrador, canal SSE)
//!   └── Inicia servidor TCP
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Logs detalhados de cada disparo e prova
//! RUST_LOG=debug cargo run
//!
//! # Outra porta
//! CHAINING_ADDR=127.0.0.1:8080 cargo run
//! ```

/// Módulo `config`: configuração via variáveis de ambiente.
mod config;

/// Módulo `core`: fatos, regras e o catálogo embutido.
mod core;

/// Módulo `inference`: encadeamento para frente e para trás.
mod inference;

/// Módulo `metrics`: snapshot de RAM/CPU do processo.
mod metrics;

/// Módulo `nlu`: intenção e sintomas a partir de texto livre.
mod nlu;

/// Módulo `orchestrator`: roteiro do chatbot.
mod orchestrator;

/// Módulo `session`: sessões de raciocínio isoladas por visitante.
mod session;

/// Módulo `web`: servidor axum, handlers, templates e SSE.
mod web;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::Catalog;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    // RUST_LOG tem precedência sobre CHAINING_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    for rejected in &config.rejected {
        tracing::warn!(value = %rejected, "variável de ambiente inválida, usando o padrão");
    }

    tracing::info!("✨ AI Chaining Playground starting");

    let catalog = Catalog::builtin().context("built-in rule catalog failed validation")?;
    tracing::info!(
        forward = catalog.forward.len(),
        backward = catalog.backward.len(),
        chat = catalog.chat.len(),
        "catálogo de regras validado"
    );

    let state = AppState::new(catalog, config.max_sessions, config.event_capacity);
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, "🚀 Server running");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
