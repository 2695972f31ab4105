//! Conversation records and the session store.
//!
//! The store owns every conversation for the lifetime of the process and
//! tracks which one is current. All mutation goes through store methods on
//! the main task; the gateway worker only ever sees cloned transcript
//! snapshots, so there is no shared mutable state to coordinate.

use time::OffsetDateTime;
use time::macros::format_description;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::{Content, Role};

/// Character budget for titles derived from a message.
const TITLE_TRUNCATE_CHARS: usize = 30;

/// One conversation: a display title plus an ordered transcript.
#[derive(Debug, Clone)]
pub struct Conversation {
    title: String,
    placeholder: bool,
    messages: Vec<Content>,
}

impl Conversation {
    fn new(number: usize) -> Self {
        Self {
            title: format!("New Chat {number}"),
            placeholder: true,
            messages: Vec::new(),
        }
    }

    /// The display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the title is still the auto-numbered placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// The transcript, oldest message first.
    pub fn messages(&self) -> &[Content] {
        &self.messages
    }

    fn derive_title_from(&mut self, text: &str) {
        if !self.placeholder {
            return;
        }
        self.title = truncate_title(text);
        self.placeholder = false;
    }

    /// Settle the title when the conversation stops being current.
    ///
    /// Applies only while the title is a placeholder and the transcript is
    /// non-empty: derives from the first user message, or falls back to a
    /// timestamp when no user message exists. Idempotent by construction.
    fn finalize_title(&mut self) {
        if !self.placeholder || self.messages.is_empty() {
            return;
        }
        let first_user_text = self
            .messages
            .iter()
            .find(|message| message.role == Role::User)
            .map(Content::text);
        self.title = match first_user_text {
            Some(text) => truncate_title(&text),
            None => timestamp_title(),
        };
        self.placeholder = false;
    }
}

/// Truncate message text to the title budget, appending an ellipsis when
/// anything was cut. Operates on characters, not bytes.
fn truncate_title(text: &str) -> String {
    let mut chars = text.chars();
    let title: String = chars.by_ref().take(TITLE_TRUNCATE_CHARS).collect();
    if chars.next().is_some() {
        format!("{title}...")
    } else {
        title
    }
}

/// Title for a conversation that was abandoned before any user message.
fn timestamp_title() -> String {
    let format = format_description!("[hour]:[minute] [month repr:short] [day]");
    match OffsetDateTime::now_utc().format(&format) {
        Ok(stamp) => format!("Chat {stamp}"),
        Err(_) => "Chat".to_string(),
    }
}

/// The ordered collection of conversations and the current cursor.
///
/// Invariant: the store always holds at least one conversation and
/// `current` always indexes a valid element.
#[derive(Debug)]
pub struct SessionStore {
    conversations: Vec<Conversation>,
    current: usize,
}

impl SessionStore {
    /// Creates a store holding the initial conversation.
    pub fn new() -> Self {
        let mut store = Self {
            conversations: Vec::new(),
            current: 0,
        };
        store.create_conversation();
        store
    }

    /// Appends a fresh placeholder conversation, makes it current, and
    /// returns its index. The outgoing conversation's title is finalized
    /// first.
    pub fn create_conversation(&mut self) -> usize {
        self.finalize_current_title();
        let number = self.conversations.len() + 1;
        self.conversations.push(Conversation::new(number));
        self.current = self.conversations.len() - 1;
        self.current
    }

    /// Makes the conversation at `index` current.
    ///
    /// A switch to the current index is a no-op; otherwise the outgoing
    /// conversation's title is finalized before the cursor moves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] when `index` does not name a
    /// conversation.
    pub fn switch_to(&mut self, index: usize) -> Result<()> {
        if index >= self.conversations.len() {
            return Err(Error::out_of_range(index, self.conversations.len()));
        }
        if index == self.current {
            return Ok(());
        }
        self.finalize_current_title();
        self.current = index;
        Ok(())
    }

    /// Appends a message to the current transcript.
    ///
    /// A user message that is the conversation's first message also derives
    /// the title immediately.
    pub fn append_message(&mut self, role: Role, text: &str) {
        let conversation = &mut self.conversations[self.current];
        if conversation.messages.is_empty() && role == Role::User {
            conversation.derive_title_from(text);
        }
        conversation.messages.push(Content::new(role, text));
    }

    /// Removes the most recent message of the current transcript, but only
    /// if it is a user message. Returns whether anything was removed.
    ///
    /// This undoes a turn whose gateway request failed, so the transcript
    /// reflects only confirmed exchanges.
    pub fn rollback_last_user_message(&mut self) -> bool {
        let conversation = &mut self.conversations[self.current];
        if conversation.messages.last().map(|message| message.role) == Some(Role::User) {
            conversation.messages.pop();
            observability::TURNS_ROLLED_BACK.click();
            true
        } else {
            false
        }
    }

    /// Index of the current conversation.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current conversation.
    pub fn current(&self) -> &Conversation {
        &self.conversations[self.current]
    }

    /// Every conversation, in creation order.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    fn finalize_current_title(&mut self) {
        if let Some(conversation) = self.conversations.get_mut(self.current) {
            conversation.finalize_title();
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_starts_with_one_placeholder_conversation() {
        let store = SessionStore::new();
        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current().title(), "New Chat 1");
        assert!(store.current().is_placeholder());
        assert!(store.current().messages().is_empty());
    }

    #[test]
    fn create_conversation_numbers_placeholders() {
        let mut store = SessionStore::new();
        assert_eq!(store.create_conversation(), 1);
        assert_eq!(store.create_conversation(), 2);
        assert_eq!(store.conversations()[1].title(), "New Chat 2");
        assert_eq!(store.conversations()[2].title(), "New Chat 3");
        assert_eq!(store.current_index(), 2);
    }

    #[test]
    fn first_user_message_derives_title() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Hello");
        assert_eq!(store.current().title(), "Hello");
        assert!(!store.current().is_placeholder());
    }

    #[test]
    fn long_first_message_truncates_to_thirty_chars() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Plan my trip to Japan for two weeks");
        let title = store.current().title();
        assert_eq!(title, "Plan my trip to Japan for two ...");
        assert!(title.chars().count() <= 33);
    }

    #[test]
    fn exactly_thirty_chars_is_not_truncated() {
        let mut store = SessionStore::new();
        let text = "a".repeat(30);
        store.append_message(Role::User, &text);
        assert_eq!(store.current().title(), text);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let mut store = SessionStore::new();
        let text = "é".repeat(40);
        store.append_message(Role::User, &text);
        let title = store.current().title();
        assert_eq!(title.chars().count(), 33);
        assert!(title.starts_with(&"é".repeat(30)));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn switch_away_finalizes_title_from_first_user_message() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Plan my trip to Japan for two weeks");
        store.create_conversation();
        assert_eq!(
            store.conversations()[0].title(),
            "Plan my trip to Japan for two ..."
        );
    }

    #[test]
    fn switch_away_without_user_message_falls_back_to_timestamp() {
        let mut store = SessionStore::new();
        store.append_message(Role::Model, "unsolicited greeting");
        store.create_conversation();
        let title = store.conversations()[0].title();
        assert!(title.starts_with("Chat "), "unexpected title: {title}");
        assert!(!store.conversations()[0].is_placeholder());
    }

    #[test]
    fn finalize_prefers_first_user_message() {
        let mut store = SessionStore::new();
        store.append_message(Role::Model, "welcome");
        store.append_message(Role::User, "real question");
        store.create_conversation();
        assert_eq!(store.conversations()[0].title(), "real question");
    }

    #[test]
    fn empty_conversation_keeps_placeholder_on_switch() {
        let mut store = SessionStore::new();
        store.create_conversation();
        assert_eq!(store.conversations()[0].title(), "New Chat 1");
        assert!(store.conversations()[0].is_placeholder());
    }

    #[test]
    fn finalized_title_is_never_rederived() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Hello");
        store.append_message(Role::User, "Completely different subject");
        store.create_conversation();
        store.switch_to(0).unwrap();
        store.switch_to(1).unwrap();
        assert_eq!(store.conversations()[0].title(), "Hello");
    }

    #[test]
    fn switch_to_same_index_is_noop() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Hello");
        let before = store.current().title().to_string();
        store.switch_to(0).unwrap();
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current().title(), before);
    }

    #[test]
    fn switch_to_out_of_range_fails() {
        let mut store = SessionStore::new();
        let err = store.switch_to(3).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { index: 3, len: 1 }));
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn switch_preserves_transcripts() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "first question");
        store.append_message(Role::Model, "first answer");
        store.create_conversation();
        store.append_message(Role::User, "second question");

        store.switch_to(0).unwrap();
        let transcript = store.current().messages();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text(), "first question");
        assert_eq!(transcript[1].text(), "first answer");
    }

    #[test]
    fn rollback_removes_exactly_the_failed_user_turn() {
        // a failed first turn leaves the transcript empty again
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Hello");
        assert!(store.rollback_last_user_message());
        assert!(store.current().messages().is_empty());
    }

    #[test]
    fn rollback_restores_previous_length() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "one");
        store.append_message(Role::Model, "two");
        let before = store.current().messages().len();
        store.append_message(Role::User, "three");
        assert!(store.rollback_last_user_message());
        assert_eq!(store.current().messages().len(), before);
    }

    #[test]
    fn rollback_is_noop_when_last_message_is_model() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "question");
        store.append_message(Role::Model, "answer");
        assert!(!store.rollback_last_user_message());
        assert_eq!(store.current().messages().len(), 2);
    }

    #[test]
    fn rollback_is_noop_on_empty_transcript() {
        let mut store = SessionStore::new();
        assert!(!store.rollback_last_user_message());
    }

    #[test]
    fn successful_turn_transcript_shape() {
        let mut store = SessionStore::new();
        store.append_message(Role::User, "Hello");
        store.append_message(Role::Model, "Hi there");
        let transcript = store.current().messages();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].text(), "Hello");
        assert_eq!(transcript[1].role, Role::Model);
        assert_eq!(transcript[1].text(), "Hi there");
        assert_eq!(store.current().title(), "Hello");
    }
}
