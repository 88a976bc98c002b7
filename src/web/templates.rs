//! # Templates Maud: HTML Server-Side Rendering
//!
//! Páginas completas renderizadas com o macro [`maud`](https://maud.lambda.xyz/).
//! Os fragmentos HTMX devolvidos pelos POSTs ficam nos handlers.
//!
//! ## Filosofia: HTMX + Maud = Hypermedia-Driven
//!
//! - Servidor retorna **HTML fragments** (não JSON)
//! - HTMX no frontend injeta fragments no DOM
//! - O único JavaScript é o leitor do feed SSE
//!
//! ## Templates Disponíveis
//!
//! | Função | Rota | Descrição |
//! |--------|------|-----------|
//! | [`home_page()`] | `/` | Apresentação das duas estratégias |
//! | [`forward_page()`] | `/forward` | Caixas de pistas + "Start the Deduction!" |
//! | [`backward_page()`] | `/backward` | Seletor de objetivo + "Start the Goal Hunt!" |
//! | [`chat_page()`] | `/chat` | Conversa com o chatbot |
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────── nav-bar ─────────────────────┐
//! │ ✨ │ Home │ Forward │ Backward │ Chat        │
//! ├──────────────────────────┬───────────────────┤
//! │  Explicação + formulário │  Live reasoning   │
//! │  ┌────────────────────┐  │  (SSE da sessão)  │
//! │  │ resultado (HTMX)   │  │                   │
//! │  └────────────────────┘  │                   │
//! └──────────────────────────┴───────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};
use uuid::Uuid;

use crate::core::Catalog;
use crate::orchestrator::ChatMessage;

/// Página da barra de navegação marcada como ativa.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Forward,
    Backward,
    Chat,
}

/// Link interno que carrega a sessão, quando há uma.
fn session_href(path: &str, session: Option<Uuid>) -> String {
    match session {
        Some(id) => format!("{path}?session={id}"),
        None => path.to_string(),
    }
}

fn layout(title: &str, active: Nav, session: Option<Uuid>, content: Markup) -> Markup {
    let link = |nav: Nav, path: &str, icon: &str, label: &str| {
        html! {
            a href=(session_href(path, session)) class=(if nav == active { "nav-link active" } else { "nav-link" }) {
                span class="nav-link-icon" { (icon) }
                span class="nav-link-label" { (label) }
            }
        }
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · AI Chaining Playground" }
                link rel="stylesheet" href="/assets/style.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                div class="app-shell" {
                    nav class="nav-bar" {
                        a href=(session_href("/", session)) class="nav-brand" {
                            span class="nav-brand-icon" { "✨" }
                            span class="nav-brand-text" { "AI Chaining " em { "Playground" } }
                        }
                        div class="nav-links" {
                            (link(Nav::Home, "/", "🏠", "Home"))
                            (link(Nav::Forward, "/forward", "🚀", "Forward Chaining"))
                            (link(Nav::Backward, "/backward", "🎯", "Backward Chaining"))
                            (link(Nav::Chat, "/chat", "💬", "Chatbot"))
                        }
                    }

                    @match session {
                        Some(id) => {
                            div class="app-container" {
                                main class="content-panel" { (content) }
                                aside class="sidebar" {
                                    div class="sidebar-title" { "🛰 Live reasoning" }
                                    ul #live-feed class="live-feed" {}
                                }
                            }
                            (live_feed_script(id))
                        }
                        None => {
                            div class="app-container single" {
                                main class="content-panel" { (content) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Leitor do `/events` da sessão: cada evento vira uma linha no feed.
///
/// O id vem de `#session-field`; quando um fragmento troca o campo via
/// `hx-swap-oob`, o leitor reconecta na sessão nova.
fn live_feed_script(session: Uuid) -> Markup {
    html! {
        script {
            (PreEscaped(format!(r#"
(function() {{
    const feed = document.getElementById('live-feed');
    let source = null;
    let current = null;
    function connect() {{
        const field = document.getElementById('session-field');
        const id = field ? field.value : '{session}';
        if (id === current) return;
        if (source) source.close();
        current = id;
        source = new EventSource('/events?session=' + encodeURIComponent(id));
        source.onmessage = render;
    }}
    function render(e) {{
        let ev;
        try {{ ev = JSON.parse(e.data).event; }} catch (_) {{ return; }}
        const li = document.createElement('li');
        li.className = 'feed-item feed-' + ev.type.toLowerCase();
        if (ev.type === 'RuleFired') {{
            li.textContent = '🧪 round ' + ev.firing.round + ': ' + ev.firing.conclusion;
        }} else if (ev.type === 'Step') {{
            li.textContent = '·'.repeat(ev.step.depth) + ' ' + ev.step.type + ' ' + ev.step.goal;
        }} else if (ev.type === 'Question') {{
            li.textContent = '❓ ' + ev.fact;
        }} else if (ev.type === 'Finished') {{
            li.textContent = '🏁 ' + ev.summary;
        }}
        feed.appendChild(li);
        feed.scrollTop = feed.scrollHeight;
    }}
    connect();
    document.body.addEventListener('htmx:oobAfterSwap', connect);
    document.body.addEventListener('htmx:afterSettle', connect);
}})();
"#)))
        }
    }
}

/// GET `/`: apresentação.
pub fn home_page() -> Markup {
    layout(
        "Home",
        Nav::Home,
        None,
        html! {
            h1 class="page-title" { "AI Chaining Playground ✨" }
            h2 { "Welcome to the World of AI Reasoning!" }
            p {
                "Have you ever wondered how a chatbot or an expert system makes a decision? 🤖 "
                "They often use a process called " strong { "chaining" }
                " to figure things out! It's like a detective solving a mystery."
            }
            div class="cards" {
                a class="card" href="/forward" {
                    div class="card-icon" { "🚀" }
                    div class="card-title" { "Forward Chaining" }
                    p { "The \"What's happening?\" approach: starts with clues to find a conclusion." }
                }
                a class="card" href="/backward" {
                    div class="card-icon" { "🎯" }
                    div class="card-title" { "Backward Chaining" }
                    p { "The \"What do I need?\" approach: starts with a goal and works backward to find the clues." }
                }
                a class="card" href="/chat" {
                    div class="card-icon" { "💬" }
                    div class="card-title" { "Chatbot" }
                    p { "Both at once: tell it how you feel, it collects clues and then hunts for a suggestion." }
                }
            }
        },
    )
}

/// GET `/forward`: o colecionador de pistas.
pub fn forward_page(session: Uuid, catalog: &Catalog) -> Markup {
    layout(
        "Forward Chaining",
        Nav::Forward,
        Some(session),
        html! {
            h1 class="page-title" { "🚀 Forward Chaining: The Clue Collector" }
            p {
                "Imagine you're a detective. You start with all the clues you have, and you see what you can figure out. "
                "When a rule's clues are all found, you can make a new conclusion! "
                "You keep doing this until you can't figure out anything else."
            }
            (rule_list(catalog.forward.iter().map(|r| r.describe())))

            h3 { "What clues do we have?" }
            form hx-post="/forward/run" hx-target="#forward-result" hx-swap="innerHTML" {
                input #session-field type="hidden" name="session" value=(session.to_string());
                @for clue in &catalog.clues {
                    label class="clue" {
                        input type="checkbox" name="clue" value=(clue.fact.as_str());
                        " " (clue.prompt)
                    }
                }
                button type="submit" class="action-btn" { "Start the Deduction!" }
            }
            div #forward-result class="result" {}
        },
    )
}

/// GET `/backward`: o caçador de objetivos.
pub fn backward_page(session: Uuid, catalog: &Catalog) -> Markup {
    layout(
        "Backward Chaining",
        Nav::Backward,
        Some(session),
        html! {
            h1 class="page-title" { "🎯 Backward Chaining: The Goal Hunter" }
            p {
                "Imagine you have a specific goal, like \"I want to eat a delicious pizza.\" 🍕 "
                "You ask, \"What do I need to make a pizza?\" "
                "You keep working backward until you find a question you can answer!"
            }
            (rule_list(catalog.backward.iter().map(|r| r.describe())))

            h3 { "What's our goal?" }
            form hx-post="/backward/start" hx-target="#hunt-result" hx-swap="innerHTML" {
                input #session-field type="hidden" name="session" value=(session.to_string());
                label for="goal" { "I want to figure out if I should... " }
                select #goal name="goal" {
                    @for goal in &catalog.goals {
                        option value=(goal.fact.as_str()) { (goal.fact.label()) }
                    }
                }
                button type="submit" class="action-btn" { "Start the Goal Hunt!" }
            }
            div #hunt-result class="result" {}
        },
    )
}

/// GET `/chat`: conversa, re-renderizando o histórico da sessão.
pub fn chat_page(session: Uuid, history: &[ChatMessage]) -> Markup {
    layout(
        "Chatbot",
        Nav::Chat,
        Some(session),
        html! {
            h1 class="page-title" { "💬 Chaining Buddy" }
            div #chat-messages class="chat-messages" {
                @for msg in history {
                    (chat_bubble(msg))
                }
            }
            form #chat-form class="chat-input-area"
                hx-post="/chat/message"
                hx-target="#chat-messages"
                hx-swap="beforeend" {
                input #session-field type="hidden" name="session" value=(session.to_string());
                input type="text" name="message"
                    placeholder="How are you feeling?"
                    autocomplete="off"
                    autofocus;
                button type="submit" { "Send" }
            }
            script {
                (PreEscaped(r#"
document.body.addEventListener('htmx:afterRequest', function(e) {
    if (e.target.id === 'chat-form') {
        e.target.reset();
        const box = document.getElementById('chat-messages');
        box.scrollTop = box.scrollHeight;
    }
});
"#))
            }
        },
    )
}

/// Uma mensagem do chat.
pub fn chat_bubble(msg: &ChatMessage) -> Markup {
    html! {
        div class=(format!("message {}", msg.role.css_class())) {
            div class="message-role" {
                (msg.role.label())
                span class="message-time" { (msg.at.format("%H:%M").to_string()) }
            }
            div class="message-content" { (msg.content) }
        }
    }
}

fn rule_list(rules: impl Iterator<Item = String>) -> Markup {
    html! {
        details class="rules" {
            summary { "📜 Rules" }
            ul {
                @for rule in rules {
                    li { code { (rule) } }
                }
            }
        }
    }
}
