//! AI chat conversations with simulated replies
//!
//! Replies are produced by a timer task on the tokio runtime and handed back
//! to the UI thread through a channel. Only one reply can be pending for the
//! whole session.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::config::ChatConfig;

/// Title of conversations that have no messages yet
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Characters of the first message used as the conversation title
const TITLE_CHARS: usize = 30;

/// How the assistant should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    Chat,
    #[default]
    Agent,
}

impl ChatMode {
    pub const ALL: [ChatMode; 2] = [ChatMode::Agent, ChatMode::Chat];

    pub fn label(self) -> &'static str {
        match self {
            ChatMode::Chat => "Chat",
            ChatMode::Agent => "Agent",
        }
    }
}

/// Composer variant selected in the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Composer {
    #[default]
    #[serde(rename = "composer-1")]
    Composer1,
    #[serde(rename = "composer-2")]
    Composer2,
    #[serde(rename = "composer-3")]
    Composer3,
}

impl Composer {
    pub const ALL: [Composer; 3] = [Composer::Composer1, Composer::Composer2, Composer::Composer3];

    pub fn label(self) -> &'static str {
        match self {
            Composer::Composer1 => "Composer 1",
            Composer::Composer2 => "Composer 2",
            Composer::Composer3 => "Composer 3",
        }
    }
}

/// Model variant shown in the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-3.5")]
    Gpt35,
    #[serde(rename = "claude-3-opus")]
    Claude3Opus,
    #[serde(rename = "claude-3-sonnet")]
    Claude3Sonnet,
}

impl Model {
    pub const ALL: [Model; 4] = [Model::Gpt4, Model::Gpt35, Model::Claude3Opus, Model::Claude3Sonnet];

    pub fn label(self) -> &'static str {
        match self {
            Model::Gpt4 => "gpt-4",
            Model::Gpt35 => "gpt-3.5",
            Model::Claude3Opus => "claude-3-opus",
            Model::Claude3Sonnet => "claude-3-sonnet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub mode: ChatMode,
    pub composer: Composer,
    pub model: Model,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Conversation {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        mode: ChatMode,
        composer: Composer,
        model: Model,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            mode,
            composer,
            model,
            created_at,
            updated_at: created_at,
        }
    }
}

/// The templated echo used in place of a real model
pub fn simulated_reply(prompt: &str) -> String {
    format!(
        "This is a simulated AI reply. You asked: {}\n\nA full implementation would call a real AI API here.",
        prompt
    )
}

/// Compact age label for the history list
pub fn format_time_ago(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let diff = now.signed_duration_since(timestamp);
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = hours / 24;

    if diff.num_seconds() < 60 {
        "Now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if hours < 24 {
        format!("{}h", hours)
    } else if days < 7 {
        format!("{}d", days)
    } else {
        timestamp.format("%b %-d").to_string()
    }
}

/// A finished reply timer
#[derive(Debug)]
struct ReplyReady {
    conversation_id: String,
    prompt: String,
}

/// All conversations of the chat panel
pub struct ChatSession {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    mode: ChatMode,
    composer: Composer,
    model: Model,
    /// Conversation waiting for its reply; blocks every send while set
    in_flight: Option<String>,
    reply_delay: Duration,
    runtime: Handle,
    reply_tx: UnboundedSender<ReplyReady>,
    reply_rx: UnboundedReceiver<ReplyReady>,
    timers: HashMap<String, JoinHandle<()>>,
    next_id: u64,
}

impl ChatSession {
    /// Create an empty session whose reply timers run on `runtime`
    pub fn new(runtime: Handle, config: &ChatConfig) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            conversations: Vec::new(),
            active_id: None,
            mode: config.default_mode,
            composer: config.default_composer,
            model: config.default_model,
            in_flight: None,
            reply_delay: Duration::from_millis(config.reply_delay_ms),
            runtime,
            reply_tx,
            reply_rx,
            timers: HashMap::new(),
            next_id: 1000,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Conversations, newest first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// The first `n` conversations, shown as tabs
    pub fn recent(&self, n: usize) -> &[Conversation] {
        &self.conversations[..n.min(self.conversations.len())]
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Activate a conversation and adopt its settings as the selection
    pub fn set_active(&mut self, id: &str) {
        let Some(conversation) = self.get(id) else {
            return;
        };
        let (mode, composer, model) = (conversation.mode, conversation.composer, conversation.model);
        self.mode = mode;
        self.composer = composer;
        self.model = model;
        self.active_id = Some(id.to_string());
    }

    /// Start a fresh conversation at the top of the list and activate it
    pub fn create_conversation(&mut self, mode: ChatMode, composer: Composer, model: Model) -> &Conversation {
        let id = format!("conv-{}", self.next_id());
        let conversation = Conversation::new(id.clone(), NEW_CHAT_TITLE, mode, composer, model, Local::now());
        self.conversations.insert(0, conversation);
        self.mode = mode;
        self.composer = composer;
        self.model = model;
        self.active_id = Some(id);
        &self.conversations[0]
    }

    /// Start a conversation with the current selection
    pub fn new_conversation(&mut self) -> String {
        let (mode, composer, model) = (self.mode, self.composer, self.model);
        self.create_conversation(mode, composer, model).id.clone()
    }

    /// Append an older conversation to the end of the history
    pub fn push_history(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
    }

    /// Remove a conversation, cancelling its pending reply
    pub fn delete_conversation(&mut self, id: &str) {
        self.cancel_reply(id);
        self.conversations.retain(|c| c.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.conversations.first().map(|c| c.id.clone());
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn composer(&self) -> Composer {
        self.composer
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn set_mode(&mut self, mode: ChatMode) {
        self.mode = mode;
        if let Some(active) = self.active_mut() {
            active.mode = mode;
        }
    }

    pub fn set_composer(&mut self, composer: Composer) {
        self.composer = composer;
        if let Some(active) = self.active_mut() {
            active.composer = composer;
        }
    }

    pub fn set_model(&mut self, model: Model) {
        self.model = model;
        if let Some(active) = self.active_mut() {
            active.model = model;
        }
    }

    fn active_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.active_id.as_deref()?;
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Whether a reply is pending; sends are refused meanwhile
    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Conversation whose reply is pending
    pub fn awaiting_reply_for(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    /// Append a user message and schedule the simulated reply.
    ///
    /// Returns `false` when the message was ignored: unknown conversation,
    /// blank text, or a reply still pending.
    pub fn send_message(&mut self, conversation_id: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.in_flight.is_some() {
            return false;
        }
        let message_id = format!("msg-{}-user", self.next_id());
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == conversation_id) else {
            tracing::debug!("Ignoring message for unknown conversation {}", conversation_id);
            return false;
        };

        let now = Local::now();
        if conversation.messages.is_empty() {
            conversation.title = text.chars().take(TITLE_CHARS).collect();
        }
        conversation.messages.push(Message {
            id: message_id,
            role: Role::User,
            content: text.to_string(),
            timestamp: now,
        });
        conversation.updated_at = now;

        self.schedule_reply(conversation_id, text);
        true
    }

    fn schedule_reply(&mut self, conversation_id: &str, prompt: &str) {
        let ready = ReplyReady {
            conversation_id: conversation_id.to_string(),
            prompt: prompt.to_string(),
        };
        let tx = self.reply_tx.clone();
        let delay = self.reply_delay;
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // The session may be gone already
            let _ = tx.send(ready);
        });

        if let Some(previous) = self.timers.insert(conversation_id.to_string(), handle) {
            tracing::warn!("Replacing pending reply timer for {}", conversation_id);
            previous.abort();
        }
        self.in_flight = Some(conversation_id.to_string());
    }

    /// Cancel the pending reply of a conversation, if any
    pub fn cancel_reply(&mut self, conversation_id: &str) {
        if let Some(handle) = self.timers.remove(conversation_id) {
            handle.abort();
            tracing::debug!("Cancelled reply for {}", conversation_id);
        }
        if self.in_flight.as_deref() == Some(conversation_id) {
            self.in_flight = None;
        }
    }

    /// Apply finished replies. Returns how many messages were appended.
    pub fn poll_replies(&mut self) -> usize {
        let mut appended = 0;
        while let Ok(ready) = self.reply_rx.try_recv() {
            self.timers.remove(&ready.conversation_id);
            if self.in_flight.as_deref() == Some(ready.conversation_id.as_str()) {
                self.in_flight = None;
            }

            let message_id = format!("msg-{}-assistant", self.next_id());
            let Some(conversation) = self
                .conversations
                .iter_mut()
                .find(|c| c.id == ready.conversation_id)
            else {
                tracing::debug!("Dropping reply for missing conversation {}", ready.conversation_id);
                continue;
            };

            let now = Local::now();
            conversation.messages.push(Message {
                id: message_id,
                role: Role::Assistant,
                content: simulated_reply(&ready.prompt),
                timestamp: now,
            });
            conversation.updated_at = now;
            appended += 1;
        }
        appended
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;

    fn session() -> ChatSession {
        ChatSession::new(Handle::current(), &ChatConfig::default())
    }

    #[test]
    fn test_model_names_match_labels() {
        for model in Model::ALL {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.label()));
            assert_eq!(serde_json::from_str::<Model>(&json).unwrap(), model);
        }
        for composer in Composer::ALL {
            let json = serde_json::to_string(&composer).unwrap();
            let expected = composer.label().to_lowercase().replace(' ', "-");
            assert_eq!(json, format!("\"{expected}\""));
            assert_eq!(serde_json::from_str::<Composer>(&json).unwrap(), composer);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_message_sets_title() {
        let mut chat = session();
        let id = chat.new_conversation();
        assert_eq!(chat.active().unwrap().title, NEW_CHAT_TITLE);

        assert!(chat.send_message(&id, "  hello  "));
        let conversation = chat.get(&id).unwrap();
        assert_eq!(conversation.title, "hello");
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, Role::User);
        assert_eq!(conversation.messages[0].content, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_is_truncated_and_not_changed_later() {
        let mut chat = session();
        let id = chat.new_conversation();
        let long = "a".repeat(45);
        assert!(chat.send_message(&id, &long));
        assert_eq!(chat.get(&id).unwrap().title, "a".repeat(30));

        tokio::time::sleep(Duration::from_millis(1001)).await;
        chat.poll_replies();
        assert!(chat.send_message(&id, "second"));
        assert_eq!(chat.get(&id).unwrap().title, "a".repeat(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_delay() {
        let mut chat = session();
        let id = chat.new_conversation();
        assert!(chat.send_message(&id, "hello"));
        assert!(chat.is_awaiting_reply());

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(chat.poll_replies(), 0);
        assert!(chat.is_awaiting_reply());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(chat.poll_replies(), 1);
        assert!(!chat.is_awaiting_reply());

        let messages = &chat.get(&id).unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, simulated_reply("hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_blocked_while_reply_pending() {
        let mut chat = session();
        let first = chat.new_conversation();
        let second = chat.new_conversation();
        assert!(chat.send_message(&first, "one"));
        assert!(!chat.send_message(&first, "two"));
        assert!(!chat.send_message(&second, "three"));
        assert_eq!(chat.get(&second).unwrap().messages.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_sends() {
        let mut chat = session();
        let id = chat.new_conversation();
        assert!(!chat.send_message(&id, "   "));
        assert!(!chat.send_message("missing", "hello"));
        assert!(!chat.is_awaiting_reply());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_cancels_pending_reply() {
        let mut chat = session();
        let keep = chat.new_conversation();
        let doomed = chat.new_conversation();
        assert!(chat.send_message(&doomed, "bye"));
        chat.delete_conversation(&doomed);
        assert!(!chat.is_awaiting_reply());
        assert_eq!(chat.active_id(), Some(keep.as_str()));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(chat.poll_replies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_and_selection() {
        let mut chat = session();
        let older = chat.new_conversation();
        chat.set_model(Model::Claude3Opus);
        let newer = chat.create_conversation(ChatMode::Chat, Composer::Composer2, Model::Gpt35).id.clone();
        chat.new_conversation();

        assert_eq!(chat.recent(2).len(), 2);
        assert_eq!(chat.recent(2)[1].id, newer);
        assert_eq!(chat.recent(10).len(), 3);

        chat.set_active(&older);
        assert_eq!(chat.model(), Model::Claude3Opus);
        assert_eq!(chat.mode(), ChatMode::Agent);
    }

    #[test]
    fn test_format_time_ago() {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(format_time_ago(now - TimeDelta::seconds(30), now), "Now");
        assert_eq!(format_time_ago(now - TimeDelta::minutes(5), now), "5m");
        assert_eq!(format_time_ago(now - TimeDelta::hours(17), now), "17h");
        assert_eq!(format_time_ago(now - TimeDelta::days(3), now), "3d");
        let old = Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format_time_ago(old, now), "Mar 1");
    }
}
