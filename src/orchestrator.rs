//! # Orquestrador: O Roteiro do Chatbot
//!
//! O [`Orchestrator`] conduz a conversa do chatbot, encadeando as duas
//! estratégias do motor sobre a tabela de regras do chat:
//!
//! ```text
//! Mensagem do Usuário
//!   │
//!   ├── 1. 🔄 RECOMEÇAR (Intent::Restart)
//!   │   └── limpa a conversa e cumprimenta de novo
//!   │
//!   ├── 2. 💬 RESPOSTA (há pergunta pendente)
//!   │   └── sim/não (ou o sintoma perguntado, negado ou não)
//!   │         → memoriza no cache da sessão
//!   │       não entendeu → repete a pergunta
//!   │
//!   ├── 3. 🕵️ PISTAS (sintomas mencionados no texto)
//!   │   └── viram fatos → encadeamento para frente → mensagens de Inferência
//!   │
//!   └── 4. 🎯 CAÇA AOS OBJETIVOS (encadeamento para trás)
//!       └── tenta cada recomendação em ordem, com oráculo interativo:
//!           Pending  → faz a pergunta e espera a próxima mensagem
//!           Proven   → recomenda e encerra
//!           Unproven → passa para o próximo objetivo
//! ```
//!
//! ## Estado
//!
//! Todo o estado da conversa vive em [`Conversation`], que pertence à
//! sessão do usuário. O orquestrador em si é imutável e compartilhado.
//! O cache de respostas vale para a conversa inteira: uma pergunta
//! respondida para um objetivo não é repetida para o seguinte.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::{join_labels, Catalog, FactId};
use crate::inference::{
    backward_chain, forward_chain, Firing, Interactive, Proof, TraceEvent, WorkingMemory,
};
use crate::nlu::{Intent, IntentClassifier, SymptomExtractor};

/// Mensagem no chat.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    /// Origem semântica da mensagem.
    pub role: MessageRole,
    /// Texto pronto para exibição.
    pub content: String,
    /// Momento em que a mensagem foi criada.
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    /// Cria uma mensagem com o horário atual.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Role semântica das mensagens.
///
/// - `User`: mensagem do próprio usuário
/// - `Bot`: fala roteirizada do chatbot
/// - `Inference`: conclusão do encadeamento para frente (🧪)
/// - `Question`: pergunta de sim/não do encadeamento para trás (❓)
/// - `Recommendation`: objetivo provado (🎉)
/// - `Alert`: aviso (ex: não é aconselhamento clínico)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    /// Mensagem do usuário.
    User,
    /// Fala do chatbot.
    Bot,
    /// Conclusão derivada.
    Inference,
    /// Pergunta ao usuário.
    Question,
    /// Recomendação final.
    Recommendation,
    /// Aviso.
    Alert,
}

/// Estado de uma conversa com o chatbot.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    /// Fatos, conclusões e respostas memorizadas desta conversa.
    memory: WorkingMemory,
    /// Pergunta feita e ainda não respondida.
    pending: Option<FactId>,
    /// Índice do objetivo sendo caçado em `Catalog::chat_goals`.
    goal_index: usize,
    /// A conversa chegou a uma recomendação (ou esgotou os objetivos).
    finished: bool,
    /// Histórico completo, para re-renderizar a página.
    pub history: Vec<ChatMessage>,
}

impl Conversation {
    /// Conversa nova, sem histórico.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pergunta aguardando resposta, se houver.
    pub fn pending(&self) -> Option<&FactId> {
        self.pending.as_ref()
    }

    /// `true` depois de uma recomendação ou de esgotar os objetivos.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Memória de trabalho da conversa.
    pub fn memory(&self) -> &WorkingMemory {
        &self.memory
    }

    /// Recomeça o raciocínio; o histórico é preservado.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.pending = None;
        self.goal_index = 0;
        self.finished = false;
    }
}

/// Resultado de um turno: mensagens novas e o raciocínio por trás delas.
#[derive(Debug, Default)]
pub struct ChatTurn {
    /// Mensagens produzidas neste turno (inclui a do usuário).
    pub messages: Vec<ChatMessage>,
    /// Disparos do encadeamento para frente.
    pub firings: Vec<Firing>,
    /// Passos do encadeamento para trás, de todos os objetivos tentados.
    pub trace: Vec<TraceEvent>,
}

impl ChatTurn {
    fn say(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }
}

/// Orquestrador do chatbot: sem estado próprio, compartilhável.
pub struct Orchestrator {
    catalog: Arc<Catalog>,
    intents: IntentClassifier,
    symptoms: SymptomExtractor,
}

impl Orchestrator {
    /// Cria o orquestrador sobre o catálogo validado.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            intents: IntentClassifier::new(),
            symptoms: SymptomExtractor::new(),
        }
    }

    /// Mensagens de boas-vindas; também registradas no histórico.
    pub fn greet(&self, conversation: &mut Conversation) -> Vec<ChatMessage> {
        let messages = vec![
            ChatMessage::new(
                MessageRole::Bot,
                "Hi! I'm the Chaining Buddy 🤖. Tell me how you're feeling today, \
                 for example \"I'm tired and a bit anxious\".",
            ),
            ChatMessage::new(
                MessageRole::Alert,
                "I'm a demo of rule-based reasoning, not a clinician. \
                 If you're struggling, please reach out to someone you trust or a professional.",
            ),
        ];
        conversation.history.extend(messages.iter().cloned());
        messages
    }

    /// Processa uma mensagem do usuário e devolve o turno completo.
    ///
    /// ## Fluxo
    ///
    /// ```text
    /// 1. Registra a mensagem do usuário
    /// 2. Restart → reset + saudação
    /// 3. Conversa encerrada → convida a recomeçar
    /// 4. Pergunta pendente → interpreta sim/não (ou repete a pergunta)
    /// 5. Sintomas mencionados → encadeamento para frente
    /// 6. Caça aos objetivos → encadeamento para trás
    /// ```
    pub fn process_message(&self, conversation: &mut Conversation, text: &str) -> ChatTurn {
        let mut turn = ChatTurn::default();
        turn.say(MessageRole::User, text.trim());

        let intent = self.intents.classify(text);
        let mentioned = self.symptoms.extract(text);
        tracing::debug!(intent = ?intent, mentioned = mentioned.len(), "chat: mensagem classificada");

        if intent == Intent::Restart {
            conversation.reset();
            turn.say(MessageRole::Bot, "Sure, let's start over. 🌱");
            turn.messages.extend(self.greet(&mut Conversation::new()));
            return self.record(conversation, turn);
        }

        if conversation.finished {
            turn.say(
                MessageRole::Bot,
                "That's all I can work out for now. Type \"restart\" to check in again. 💚",
            );
            return self.record(conversation, turn);
        }

        if let Some(question) = conversation.pending.clone() {
            // "not tired" nega a pergunta; "so tired" a confirma
            let answer = intent.as_answer().or_else(|| {
                if self.symptoms.denied(text).contains(&question) {
                    Some(false)
                } else {
                    mentioned.contains(&question).then_some(true)
                }
            });
            match answer {
                Some(value) => {
                    conversation.memory.answer(question, value);
                    conversation.pending = None;
                }
                None => {
                    turn.say(
                        MessageRole::Bot,
                        "Sorry, I didn't quite get that. A simple yes or no is perfect.",
                    );
                    turn.say(MessageRole::Question, ask(&question));
                    return self.record(conversation, turn);
                }
            }
        }

        self.collect_clues(conversation, mentioned, &mut turn);
        self.hunt_goals(conversation, &mut turn);
        self.record(conversation, turn)
    }

    /// Sintomas mencionados viram fatos; o encadeamento para frente
    /// deriva o que puder a partir deles.
    fn collect_clues(
        &self,
        conversation: &mut Conversation,
        mentioned: crate::core::FactSet,
        turn: &mut ChatTurn,
    ) {
        let new: Vec<FactId> = mentioned
            .into_iter()
            .filter(|f| !conversation.memory.knows(f))
            .collect();
        if new.is_empty() {
            return;
        }

        turn.say(MessageRole::Bot, format!("Noted: {}.", join_labels(&new)));
        let outcome = forward_chain(&self.catalog.chat, &mut conversation.memory, new);
        for firing in &outcome.firings {
            turn.say(MessageRole::Inference, format!("🧪 {}", firing.describe()));
        }
        turn.firings.extend(outcome.firings);
    }

    /// Tenta provar cada recomendação, em ordem, até uma pergunta
    /// pendente, uma prova ou o fim da lista.
    fn hunt_goals(&self, conversation: &mut Conversation, turn: &mut ChatTurn) {
        while let Some(goal) = self.catalog.chat_goals.get(conversation.goal_index) {
            let outcome = backward_chain(
                &self.catalog.chat,
                &mut conversation.memory,
                &goal.fact,
                &mut Interactive,
            );
            turn.trace.extend(outcome.trace);

            match outcome.proof {
                Proof::Pending(question) => {
                    turn.say(MessageRole::Question, ask(&question));
                    conversation.pending = Some(question);
                    return;
                }
                Proof::Proven => {
                    tracing::info!(goal = %goal.fact, "chat: recomendação provada");
                    turn.say(
                        MessageRole::Recommendation,
                        format!("🎉 I'd suggest: {}. {}", goal.fact.label(), goal.recommendation),
                    );
                    turn.say(MessageRole::Bot, "Type \"restart\" any time to check in again.");
                    conversation.finished = true;
                    return;
                }
                Proof::Unproven => conversation.goal_index += 1,
            }
        }

        tracing::info!("chat: nenhum objetivo provado");
        turn.say(
            MessageRole::Bot,
            "I couldn't match any of my suggestions, which sounds like good news! \
             Take care of yourself. Type \"restart\" to check in again.",
        );
        conversation.finished = true;
    }

    fn record(&self, conversation: &mut Conversation, turn: ChatTurn) -> ChatTurn {
        conversation.history.extend(turn.messages.iter().cloned());
        turn
    }
}

fn ask(question: &FactId) -> String {
    format!("Are you {}?", question.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Arc::new(Catalog::builtin().unwrap()))
    }

    fn contents(turn: &ChatTurn, role: MessageRole) -> Vec<String> {
        turn.messages
            .iter()
            .filter(|m| m.role == role)
            .map(|m| m.content.clone())
            .collect()
    }

    #[test]
    fn first_message_without_symptoms_asks_a_question() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        let turn = bot.process_message(&mut conversation, "hello");

        assert_eq!(contents(&turn, MessageRole::Question), vec!["Are you feeling tired?"]);
        assert_eq!(conversation.pending(), Some(&FactId::from("feeling_tired")));
    }

    #[test]
    fn mentioned_symptoms_are_not_asked_again() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        let turn = bot.process_message(&mut conversation, "I'm so tired and sad");

        assert!(!turn.firings.is_empty());
        assert!(conversation.memory().knows(&"feeling_unwell".into()));
        // tired + sad already known: therapy only needs anxiety now
        assert_eq!(contents(&turn, MessageRole::Question), vec!["Are you feeling anxious?"]);
    }

    #[test]
    fn yes_to_anxious_recommends_therapy() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "I'm so tired and sad");
        let turn = bot.process_message(&mut conversation, "yes");

        let recommendation = contents(&turn, MessageRole::Recommendation);
        assert_eq!(recommendation.len(), 1);
        assert!(recommendation[0].contains("suggest therapy"));
        assert!(conversation.is_finished());
    }

    #[test]
    fn denied_answers_move_to_next_goal_without_repeating() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "hi");
        // tired? no → therapy and break both become unprovable
        let turn = bot.process_message(&mut conversation, "no");
        assert_eq!(contents(&turn, MessageRole::Question), vec!["Are you feeling overwhelmed?"]);

        let turn = bot.process_message(&mut conversation, "nope");
        assert!(contents(&turn, MessageRole::Question).is_empty());
        assert!(contents(&turn, MessageRole::Recommendation).is_empty());
        assert!(conversation.is_finished());
    }

    #[test]
    fn fine_thanks_is_a_no_not_a_yes() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "hi");
        let turn = bot.process_message(&mut conversation, "I'm fine, thanks");

        assert_eq!(conversation.memory().cached(&"feeling_tired".into()), Some(false));
        assert_eq!(contents(&turn, MessageRole::Question), vec!["Are you feeling overwhelmed?"]);
    }

    #[test]
    fn negated_symptom_answers_the_question() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "hi");
        bot.process_message(&mut conversation, "not tired");

        assert_eq!(conversation.memory().cached(&"feeling_tired".into()), Some(false));
        assert_ne!(conversation.pending(), Some(&FactId::from("feeling_tired")));
    }

    #[test]
    fn naming_the_symptom_confirms_it() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "hi");
        let turn = bot.process_message(&mut conversation, "I'm tired");

        assert_eq!(conversation.memory().cached(&"feeling_tired".into()), Some(true));
        assert_eq!(contents(&turn, MessageRole::Question), vec!["Are you feeling sad?"]);
    }

    #[test]
    fn unclear_reply_repeats_the_question() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "hi");
        let turn = bot.process_message(&mut conversation, "hmm");

        assert_eq!(contents(&turn, MessageRole::Question), vec!["Are you feeling tired?"]);
        assert_eq!(conversation.pending(), Some(&FactId::from("feeling_tired")));
        assert!(turn.trace.is_empty());
    }

    #[test]
    fn restart_clears_reasoning_but_keeps_history() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "I'm exhausted");
        let before = conversation.history.len();

        bot.process_message(&mut conversation, "restart");
        assert!(conversation.memory().facts().is_empty());
        assert!(conversation.pending().is_none());
        assert!(conversation.history.len() > before);
    }

    #[test]
    fn finished_conversation_invites_restart() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        bot.process_message(&mut conversation, "overwhelmed");
        // tired? no → mindfulness proven from the mentioned clue
        let turn = bot.process_message(&mut conversation, "no");
        assert!(contents(&turn, MessageRole::Recommendation)[0].contains("mindfulness"));

        let turn = bot.process_message(&mut conversation, "thanks");
        assert!(contents(&turn, MessageRole::Bot)[0].contains("restart"));
    }

    #[test]
    fn greeting_is_recorded() {
        let bot = orchestrator();
        let mut conversation = Conversation::new();
        let greeting = bot.greet(&mut conversation);
        assert_eq!(conversation.history.len(), greeting.len());
    }
}
