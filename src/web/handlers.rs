//! # Handlers HTTP: Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Os POSTs seguem o padrão
//! **HTMX fragment**: retornam fragmentos HTML que o HTMX injeta no DOM.
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Apresentação |
//! | `forward_page` | GET | HTML completo | Página para frente |
//! | `forward_run` | POST | HTMX fragment | Rastro de disparos + conclusões |
//! | `backward_page` | GET | HTML completo | Página para trás |
//! | `backward_start` | POST | HTMX fragment | Nova caçada |
//! | `backward_answer` | POST | HTMX fragment | Resposta + retomada |
//! | `chat_page` | GET | HTML completo | Chatbot com histórico |
//! | `chat_message` | POST | HTMX fragment | Bolhas do turno |
//! | `status` | GET | JSON | Saúde + métricas |
//! | `sse_events` | GET | SSE stream | Eventos de uma sessão |
//!
//! ## Sessões
//!
//! Os formulários carregam o id da sessão num campo oculto
//! (`#session-field`). Se o id for desconhecido, uma sessão nova é
//! criada e o fragmento devolve o campo atualizado via `hx-swap-oob`.
//! As páginas procuram o id em `?session=` e depois no cookie
//! `chaining_session`, que toda página (e todo fragmento que cria
//! sessão) regrava.
//! Os locks de sessão são `parking_lot` e nunca atravessam um `.await`.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use futures_util::stream::StreamExt;
use maud::{html, Markup};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use super::events::{publish, ReasoningEvent};
use super::state::AppState;
use super::templates;
use crate::core::{fact_set, join_labels, FactSet};
use crate::inference::{InferenceEngine, Proof, Replay, WorkingMemory};
use crate::metrics::{collect_metrics, ProcessMetrics};
use crate::orchestrator::MessageRole;
use crate::session::{ReasoningSession, SharedSession};

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: Markup) -> Html<String> {
    Html(m.into_string())
}

/// Id de sessão vindo de formulário ou query; lixo vira `None`.
fn parse_session(raw: Option<&str>) -> Option<Uuid> {
    raw.and_then(|s| Uuid::parse_str(s.trim()).ok())
}

/// Sessão do formulário, ou uma nova.
fn session_for(state: &AppState, raw: Option<&str>) -> (SharedSession, bool) {
    state.sessions.get_or_create(parse_session(raw))
}

/// Nome do cookie que guarda o id da sessão no navegador.
pub const SESSION_COOKIE: &str = "chaining_session";

/// Id de sessão do cabeçalho `Cookie`, se houver um válido.
fn cookie_session(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| parse_session(Some(value)))
}

/// Sessão de uma página: `?session=` primeiro, depois o cookie.
fn page_session(state: &AppState, query: &SessionQuery, headers: &HeaderMap) -> SharedSession {
    let id = parse_session(query.session.as_deref()).or_else(|| cookie_session(headers));
    state.sessions.get_or_create(id).0
}

fn session_cookie(id: Uuid) -> [(HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"),
    )]
}

/// Fragmento HTMX; se a sessão é nova, devolve também o campo oculto
/// atualizado e o cookie.
fn fragment(id: Uuid, created: bool, markup: Markup) -> Response {
    let html = markup_to_html(html! {
        (markup)
        (session_refresh(id, created))
    });
    if created {
        (session_cookie(id), html).into_response()
    } else {
        html.into_response()
    }
}

/// Substitui o campo oculto de sessão quando uma sessão nova foi criada.
fn session_refresh(id: Uuid, created: bool) -> Markup {
    html! {
        @if created {
            input #session-field type="hidden" name="session" value=(id.to_string()) hx-swap-oob="true";
        }
    }
}

fn metrics_line(state: &AppState, elapsed: Duration, work: String) -> Markup {
    let pm = collect_metrics(state.sessions.len(), Some(work));
    html! {
        div class="metrics-line" { (format!("\u{26a1} {}", pm.summary_line(elapsed))) }
    }
}

fn error_fragment(message: &str) -> Markup {
    html! {
        div class="step failure" { "⚠️ " (message) }
    }
}

/// Query opcional `?session=` das páginas.
#[derive(serde::Deserialize)]
pub struct SessionQuery {
    /// Sessão a retomar.
    pub session: Option<String>,
}

// ─── Páginas ─────────────────────────────────────────────────────

/// GET `/`: Apresentação.
pub async fn index() -> Html<String> {
    markup_to_html(templates::home_page())
}

/// GET `/forward`: Página do colecionador de pistas.
pub async fn forward_page(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let id = page_session(&state, &query, &headers).lock().id;
    (
        session_cookie(id),
        markup_to_html(templates::forward_page(id, &state.catalog)),
    )
}

/// GET `/backward`: Página do caçador de objetivos.
pub async fn backward_page(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let id = page_session(&state, &query, &headers).lock().id;
    (
        session_cookie(id),
        markup_to_html(templates::backward_page(id, &state.catalog)),
    )
}

/// GET `/chat`: Chatbot; uma conversa sem histórico começa com a saudação.
pub async fn chat_page(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let shared = page_session(&state, &query, &headers);
    let mut session = shared.lock();
    if session.chat.history.is_empty() {
        state.orchestrator.greet(&mut session.chat);
    }
    let page = markup_to_html(templates::chat_page(session.id, &session.chat.history));
    (session_cookie(session.id), page)
}

// ─── Encadeamento para frente ────────────────────────────────────

/// POST `/forward/run`: Roda a dedução com as pistas marcadas.
///
/// O formulário repete o campo `clue` (um por caixa marcada), por isso
/// é lido como lista de pares. Pistas fora do catálogo são ignoradas.
/// Cada execução é independente ([`InferenceEngine::forward_chain`]);
/// a sessão guarda só o que a última dedução ficou sabendo.
pub async fn forward_run(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let raw_session = fields
        .iter()
        .find(|(k, _)| k == "session")
        .map(|(_, v)| v.as_str());
    let mut clues: FactSet = fact_set(
        fields
            .iter()
            .filter(|(k, _)| k == "clue")
            .map(|(_, v)| v.trim()),
    );
    clues.retain(|f| state.catalog.clues.iter().any(|c| &c.fact == f));

    let t0 = Instant::now();
    let outcome = InferenceEngine::forward_chain(&state.catalog.forward, clues.clone());
    let elapsed = t0.elapsed();

    let (shared, created) = session_for(&state, raw_session);
    let mut session = shared.lock();
    let id = session.id;
    session.forward = WorkingMemory::with_facts(clues.iter().chain(&outcome.derived).cloned());
    let known = session.forward.facts().len();
    drop(session);

    tracing::info!(
        session = %id,
        clues = clues.len(),
        derived = outcome.derived.len(),
        rounds = outcome.rounds,
        "forward: dedução concluída"
    );

    let summary = if outcome.derived.is_empty() {
        "no new conclusions".to_string()
    } else {
        format!("concluded {}", join_labels(&outcome.derived))
    };
    publish(
        &state.events_tx,
        id,
        outcome
            .firings
            .iter()
            .cloned()
            .map(|firing| ReasoningEvent::RuleFired { firing })
            .chain([ReasoningEvent::Finished {
                page: "forward",
                summary,
            }]),
    );

    let work = format!(
        "{} firings in {} rounds, {} facts known",
        outcome.firings.len(),
        outcome.rounds,
        known
    );
    fragment(id, created, html! {
        h3 { "🕵️ The Deduction Process:" }
        @if clues.is_empty() {
            div class="step question" { "No clues yet! Tick at least one box so the detective has something to work with." }
        }
        @for firing in &outcome.firings {
            div class="step success" {
                span class="round" { "round " (firing.round) }
                strong { "Clue Found! " }
                (firing.describe()) " 🎉"
            }
        }
        @if !clues.is_empty() && outcome.firings.is_empty() {
            div class="step" { "No rule has all its clues yet, so nothing new can be concluded." }
        }
        div class="final" {
            strong { "Final Conclusions: " }
            @if outcome.derived.is_empty() {
                "none"
            } @else {
                (join_labels(&outcome.derived))
            }
        }
        (metrics_line(&state, elapsed, work))
    })
}

// ─── Encadeamento para trás ──────────────────────────────────────

/// Formulário do "Start the Goal Hunt!".
#[derive(serde::Deserialize)]
pub struct HuntForm {
    /// Sessão do visitante.
    pub session: Option<String>,
    /// Objetivo escolhido no seletor.
    pub goal: String,
}

/// Formulário de resposta a uma pergunta pendente.
#[derive(serde::Deserialize)]
pub struct AnswerForm {
    /// Sessão do visitante.
    pub session: Option<String>,
    /// `"yes"` ou `"no"`.
    pub answer: String,
}

/// POST `/backward/start`: Nova caçada: limpa o cache e roda.
pub async fn backward_start(
    State(state): State<AppState>,
    Form(form): Form<HuntForm>,
) -> Response {
    let Some(goal) = state.catalog.goal(form.goal.trim()) else {
        tracing::warn!(goal = %form.goal, "backward: objetivo desconhecido");
        return markup_to_html(error_fragment("Unknown goal. Pick one from the list."))
            .into_response();
    };

    let (shared, created) = session_for(&state, form.session.as_deref());
    let mut session = shared.lock();
    session.backward.start(goal.fact.clone());
    tracing::info!(session = %session.id, goal = %goal.fact, "backward: caçada iniciada");

    let result = hunt(&state, &mut session);
    let id = session.id;
    drop(session);
    fragment(id, created, result)
}

/// POST `/backward/answer`: Registra a resposta e retoma a caçada.
pub async fn backward_answer(
    State(state): State<AppState>,
    Form(form): Form<AnswerForm>,
) -> Html<String> {
    let value = match form.answer.trim() {
        "yes" => true,
        "no" => false,
        other => {
            tracing::warn!(answer = %other, "backward: resposta inválida");
            return markup_to_html(error_fragment("Please answer yes or no."));
        }
    };

    let (shared, _) = session_for(&state, form.session.as_deref());
    let mut session = shared.lock();
    let Some(question) = session.backward.pending.take() else {
        return markup_to_html(error_fragment(
            "There is no question waiting. Start the goal hunt again!",
        ));
    };
    session.backward.memory.answer(question, value);

    markup_to_html(hunt(&state, &mut session))
}

/// Roda (ou retoma) a caçada da sessão e renderiza o resultado.
///
/// Retomar é rodar de novo, sem estado no motor: as respostas já dadas
/// ficam na sessão e o oráculo [`Replay`] as repete sem perguntar outra
/// vez. Uma pergunta nova suspende a prova.
fn hunt(state: &AppState, session: &mut ReasoningSession) -> Markup {
    let id = session.id;
    let Some(goal) = session
        .backward
        .goal
        .as_ref()
        .and_then(|g| state.catalog.goal(g.as_str()))
    else {
        return error_fragment("Pick a goal and start the hunt first.");
    };

    let t0 = Instant::now();
    let memory = &session.backward.memory;
    let outcome = InferenceEngine::backward_chain(
        &state.catalog.backward,
        &goal.fact,
        &mut Replay::new(memory.answers()),
        memory.facts().clone(),
    );
    let elapsed = t0.elapsed();
    session.backward.pending = outcome.proof.pending().cloned();
    tracing::info!(
        session = %id,
        goal = %goal.fact,
        proven = outcome.proof.is_proven(),
        pending = outcome.proof.pending().is_some(),
        "backward: caçada avaliada"
    );

    let closing = match &outcome.proof {
        Proof::Pending(fact) => ReasoningEvent::Question { fact: fact.clone() },
        Proof::Proven => ReasoningEvent::Finished {
            page: "backward",
            summary: format!("{} proven", goal.fact.label()),
        },
        Proof::Unproven => ReasoningEvent::Finished {
            page: "backward",
            summary: format!("{} not proven", goal.fact.label()),
        },
    };
    publish(
        &state.events_tx,
        id,
        outcome
            .trace
            .iter()
            .cloned()
            .map(|step| ReasoningEvent::Step { step })
            .chain([closing]),
    );

    let work = format!(
        "{} steps, {} answers replayed",
        outcome.trace.len(),
        outcome.asked.len()
    );
    html! {
        h3 { "🎯 Hunting for the Goal..." }
        ol class="trace" {
            @for step in &outcome.trace {
                li class=(step.css_class())
                    data-goal=(step.goal().as_str())
                    style=(format!("margin-left: {}em", step.depth() * 2)) {
                    span class="step-icon" { (step.icon()) }
                    " " (step.describe())
                }
            }
        }
        @match &outcome.proof {
            Proof::Pending(question) => {
                form class="question" hx-post="/backward/answer" hx-target="#hunt-result" hx-swap="innerHTML" {
                    input type="hidden" name="session" value=(id.to_string());
                    span { "Are you " strong { (question.label()) } "?" }
                    button type="submit" name="answer" value="yes" class="action-btn" { "Yes 👍" }
                    button type="submit" name="answer" value="no" class="action-btn secondary" { "No 👎" }
                }
            }
            Proof::Proven => {
                div class="final success" {
                    "🎉 Goal '" (goal.fact.label()) "' is proven! The recommendation is: "
                    strong { (goal.fact.label()) }
                    p { (goal.recommendation) }
                }
            }
            Proof::Unproven => {
                div class="final warning" {
                    "The goal could not be proven based on the provided clues."
                }
            }
        }
        (metrics_line(state, elapsed, work))
    }
}

// ─── Chatbot ─────────────────────────────────────────────────────

/// Dados do formulário de chat.
#[derive(serde::Deserialize)]
pub struct ChatForm {
    /// Sessão do visitante.
    pub session: Option<String>,
    /// Texto da mensagem do usuário.
    pub message: String,
}

/// POST `/chat/message`: Processa um turno do chatbot.
///
/// ## Fluxo
///
/// ```text
/// 1. Ignora mensagem vazia
/// 2. Adquire o lock da sessão
/// 3. orchestrator.process_message() → ChatTurn
/// 4. Publica disparos, passos e a pergunta/conclusão no SSE
/// 5. Renderiza as bolhas + linha de métricas
/// ```
pub async fn chat_message(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> Response {
    let text = form.message.trim();
    if text.is_empty() {
        return markup_to_html(html! {}).into_response();
    }

    let (shared, created) = session_for(&state, form.session.as_deref());
    let mut session = shared.lock();
    let id = session.id;

    let t0 = Instant::now();
    let turn = state.orchestrator.process_message(&mut session.chat, text);
    let elapsed = t0.elapsed();
    let pending = session.chat.pending().cloned();
    let finished = session.chat.is_finished();
    let known = session.chat.memory().facts().len();
    drop(session);

    let closing = match (pending, finished) {
        (Some(fact), _) => Some(ReasoningEvent::Question { fact }),
        (None, true) if !turn.trace.is_empty() => Some(ReasoningEvent::Finished {
            page: "chat",
            summary: "check-in finished".to_string(),
        }),
        _ => None,
    };
    publish(
        &state.events_tx,
        id,
        turn.firings
            .iter()
            .cloned()
            .map(|firing| ReasoningEvent::RuleFired { firing })
            .chain(turn.trace.iter().cloned().map(|step| ReasoningEvent::Step { step }))
            .chain(closing),
    );

    let work = format!(
        "{} firings, {} steps, {} facts known",
        turn.firings.len(),
        turn.trace.len(),
        known
    );
    fragment(id, created, html! {
        @for msg in &turn.messages {
            (templates::chat_bubble(msg))
        }
        (metrics_line(&state, elapsed, work))
    })
}

// ─── JSON e SSE ──────────────────────────────────────────────────

/// Resposta do endpoint `/status`.
#[derive(serde::Serialize)]
pub struct StatusResponse {
    /// O catálogo foi validado e o servidor está atendendo.
    pub ready: bool,
    /// Sessões vivas.
    pub sessions: usize,
    /// Total de regras carregadas nas três tabelas.
    pub rules: usize,
    /// Snapshot do processo.
    pub metrics: ProcessMetrics,
}

/// GET `/status`: Saúde do servidor.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let sessions = state.sessions.len();
    let catalog = &state.catalog;
    Json(StatusResponse {
        ready: true,
        sessions,
        rules: catalog.forward.len() + catalog.backward.len() + catalog.chat.len(),
        metrics: collect_metrics(sessions, None),
    })
}

/// Query do `/events`.
#[derive(serde::Deserialize)]
pub struct EventsQuery {
    /// Sessão cujos eventos serão repassados.
    pub session: String,
}

/// GET `/events?session=<id>`: Stream SSE dos eventos de uma sessão.
///
/// Id malformado → 400; sessão desconhecida ou despejada → 404.
///
/// ## Keep-Alive
///
/// Envia keep-alive a cada 15s para manter a conexão viva.
///
/// ## Lagged Messages
///
/// Se o subscriber ficar para trás (buffer cheio), mensagens
/// são silenciosamente descartadas (filter_map retorna None).
pub async fn sse_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>>, StatusCode> {
    let session = parse_session(Some(&query.session)).ok_or(StatusCode::BAD_REQUEST)?;
    if state.sessions.get(&session).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.session == session => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            _ => None,
        }
    });
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

// ─── Extensões de MessageRole para HTML ──────────────────────────

impl MessageRole {
    /// Classe CSS da bolha.
    ///
    /// - `user` → alinhado à direita
    /// - `bot` → bolha padrão do chatbot
    /// - `inference` → fundo azulado, ícone 🧪
    /// - `question` → destaque amarelo
    /// - `recommendation` → fundo verde
    /// - `alert` → fundo alaranjado
    pub fn css_class(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Bot => "bot",
            MessageRole::Inference => "inference",
            MessageRole::Question => "question",
            MessageRole::Recommendation => "recommendation",
            MessageRole::Alert => "alert",
        }
    }

    /// Label textual da role.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "You",
            MessageRole::Bot => "Buddy",
            MessageRole::Inference => "Inference",
            MessageRole::Question => "Question",
            MessageRole::Recommendation => "Suggestion",
            MessageRole::Alert => "Heads-up",
        }
    }
}
