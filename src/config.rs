//! # Configuração
//!
//! Valores padrão embutidos, sobrescritíveis por variáveis de ambiente.
//! Lidos uma única vez em `main()`.
//!
//! | Variável | Padrão | Uso |
//! |----------|--------|-----|
//! | `CHAINING_ADDR` | `0.0.0.0:3000` | endereço do servidor |
//! | `CHAINING_EVENT_CAPACITY` | `256` | buffer do canal SSE |
//! | `CHAINING_MAX_SESSIONS` | `1024` | sessões mantidas em memória |
//! | `CHAINING_LOG` | `info` | filtro de log quando `RUST_LOG` não está definido |
//!
//! Valores inválidos (ou zero) mantêm o padrão e são reportados em
//! [`Config::rejected`] para o `warn!` em `main()`.

/// Configuração do servidor.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Endereço de bind do listener TCP.
    pub addr: String,
    /// Capacidade do canal broadcast de eventos SSE.
    pub event_capacity: usize,
    /// Número máximo de sessões mantidas; as mais antigas são descartadas.
    pub max_sessions: usize,
    /// Filtro padrão do `tracing_subscriber` (ex: `"info"`, `"debug"`).
    pub log_filter: String,
    /// Variáveis com valor inválido, registradas em log depois que o
    /// subscriber de tracing estiver ativo.
    pub rejected: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            event_capacity: 256,
            max_sessions: 1024,
            log_filter: "info".to_string(),
            rejected: Vec::new(),
        }
    }
}

impl Config {
    /// Lê a configuração das variáveis de ambiente do processo.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lê a configuração a partir de uma função de busca arbitrária.
    ///
    /// Separado de [`from_env()`](Config::from_env) para testes sem
    /// mexer no ambiente do processo.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut rejected = Vec::new();
        let mut parse_or = |key: &str, default: usize| match lookup(key) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => {
                    rejected.push(format!("{key}={raw}"));
                    default
                }
            },
            None => default,
        };
        let event_capacity = parse_or("CHAINING_EVENT_CAPACITY", defaults.event_capacity);
        let max_sessions = parse_or("CHAINING_MAX_SESSIONS", defaults.max_sessions);

        Self {
            addr: lookup("CHAINING_ADDR").unwrap_or(defaults.addr),
            event_capacity,
            max_sessions,
            log_filter: lookup("CHAINING_LOG").unwrap_or(defaults.log_filter),
            rejected,
        }
    }
}
