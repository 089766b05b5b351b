//! Background conversation title generation.
//!
//! The workflow runs off the triggering request's critical path: a single
//! bounded-time model call produces a candidate, sanitization validates it,
//! and a localized placeholder covers every failure mode. The conversation
//! is re-loaded immediately before the write so a concurrent update or
//! deletion is never clobbered.

mod sanitize;

use crate::events::{ConversationEvent, ConversationEvents};
use crate::llm::LlmClient;
use crate::sessions::{ConversationStore, TITLE_SENTINEL};
use sanitize::{fallback_title, sanitize_candidate, trim_edge_punctuation};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Asynchronous title generator for new conversations.
#[derive(Clone)]
pub struct TitleWorkflow {
    llm: Option<Arc<dyn LlmClient + Send + Sync>>,
    conversations: Arc<dyn ConversationStore>,
    events: ConversationEvents,
    timeout: Duration,
}

/// True while a conversation still carries a placeholder title.
///
/// Covers the creation sentinel and the localized fallbacks, so a failed
/// generation can be retried on a later trigger, while a real generated
/// title is never overwritten.
pub fn needs_title(title: &str) -> bool {
    title.is_empty()
        || title.starts_with(TITLE_SENTINEL)
        || title.starts_with("New Chat")
        || title.starts_with("שיחה חדשה")
}

impl TitleWorkflow {
    /// Wire the workflow to its collaborators.
    pub fn new(
        llm: Option<Arc<dyn LlmClient + Send + Sync>>,
        conversations: Arc<dyn ConversationStore>,
        events: ConversationEvents,
        timeout: Duration,
    ) -> Self {
        Self {
            llm,
            conversations,
            events,
            timeout,
        }
    }

    /// Fire-and-forget title generation for one conversation.
    ///
    /// The triggering request returns immediately; all failures inside the
    /// spawned task degrade to the localized fallback or a silent no-op.
    pub fn spawn(&self, conversation_id: Uuid, first_message: String, language: String) {
        let workflow = self.clone();
        tokio::spawn(async move {
            workflow.run(conversation_id, first_message, language).await;
        });
    }

    /// Execute the generation pipeline once.
    pub async fn run(&self, conversation_id: Uuid, first_message: String, language: String) {
        tracing::info!(conversation = %conversation_id, "Generating conversation title");

        let candidate = sanitize_candidate(&self.request_candidate(&first_message, &language).await);

        let mut title = if candidate.is_empty() {
            let fallback = fallback_title(&language);
            tracing::warn!(
                conversation = %conversation_id,
                fallback,
                "Title generation empty; using fallback"
            );
            fallback.to_string()
        } else {
            candidate
        };
        if language == "en" {
            title = trim_edge_punctuation(&title);
        }

        // Re-load right before the write; the conversation may have been
        // deleted or retitled while the model call was in flight.
        let Some(mut conversation) = self.conversations.find_by_id(conversation_id).await else {
            tracing::warn!(
                conversation = %conversation_id,
                title,
                "Conversation vanished before title could be saved"
            );
            return;
        };
        if !needs_title(&conversation.title) {
            tracing::debug!(
                conversation = %conversation_id,
                "Title already set; skipping"
            );
            return;
        }

        conversation.title = title.clone();
        self.conversations.save(conversation).await;
        self.events.publish(ConversationEvent::TitleUpdated {
            conversation_id,
            title: title.clone(),
        });
        tracing::info!(conversation = %conversation_id, title, "Saved generated title");
    }

    /// Run the bounded-time model call, degrading every failure to `""`.
    async fn request_candidate(&self, first_message: &str, language: &str) -> String {
        let Some(llm) = &self.llm else {
            return String::new();
        };

        let system_instruction = format!(
            "You are a concise title generator. Produce a single short title that summarizes \
             the conversation based only on the user's first message. IMPORTANT: The title must \
             be AT MOST FIVE WORDS and must contain only the title text - no explanation, no \
             punctuation at start/end, no quotes, no extra lines. Return exactly the title text \
             in plain text.{}",
            if language == "he" {
                " הכותרת חייבת להיות בעברית."
            } else {
                " The title must be in English."
            }
        );
        let user_prompt = format!("User's message:\n\n{first_message}\n\nTitle:");

        match tokio::time::timeout(self.timeout, llm.complete(&user_prompt, &system_instruction))
            .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "Title generation failed");
                String::new()
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Title generation timed out");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmClientError;
    use crate::sessions::{Conversation, InMemoryConversationStore};
    use async_trait::async_trait;

    struct FixedLlm(String);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _: &str, _: &str) -> Result<String, LlmClientError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _: &str, _: &str) -> Result<String, LlmClientError> {
            Err(LlmClientError::GenerationFailed("model offline".into()))
        }
    }

    fn workflow(
        llm: Option<Arc<dyn LlmClient + Send + Sync>>,
    ) -> (TitleWorkflow, Arc<InMemoryConversationStore>, ConversationEvents) {
        let store = Arc::new(InMemoryConversationStore::new());
        let events = ConversationEvents::new(16);
        let workflow = TitleWorkflow::new(
            llm,
            store.clone(),
            events.clone(),
            Duration::from_secs(5),
        );
        (workflow, store, events)
    }

    async fn seeded_conversation(store: &InMemoryConversationStore) -> Uuid {
        let conversation = Conversation::new(Some("user@example.org".into()));
        let id = conversation.id;
        store.save(conversation).await;
        id
    }

    #[tokio::test]
    async fn saves_sanitized_title_and_publishes_event() {
        let (workflow, store, events) =
            workflow(Some(Arc::new(FixedLlm("  \"Login Bug Fix\"\n".into()))));
        let mut subscription = events.subscribe();
        let id = seeded_conversation(&store).await;

        workflow.run(id, "my login page is broken".into(), "en".into()).await;

        let saved = store.find_by_id(id).await.expect("conversation");
        assert_eq!(saved.title, "Login Bug Fix");
        assert_eq!(
            subscription.recv().await.expect("event"),
            ConversationEvent::TitleUpdated {
                conversation_id: id,
                title: "Login Bug Fix".into()
            }
        );
    }

    #[tokio::test]
    async fn overlong_candidate_falls_back_to_placeholder() {
        let (workflow, store, _) = workflow(Some(Arc::new(FixedLlm(
            "this title clearly has far too many words".into(),
        ))));
        let id = seeded_conversation(&store).await;

        workflow.run(id, "question".into(), "en".into()).await;

        let saved = store.find_by_id(id).await.expect("conversation");
        assert_eq!(saved.title, "New Chat");
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_localized_placeholder() {
        let (workflow, store, _) = workflow(Some(Arc::new(FailingLlm)));
        let id = seeded_conversation(&store).await;

        workflow.run(id, "שאלה".into(), "he".into()).await;

        let saved = store.find_by_id(id).await.expect("conversation");
        assert_eq!(saved.title, "שיחה חדשה");
    }

    #[tokio::test]
    async fn missing_provider_uses_fallback() {
        let (workflow, store, _) = workflow(None);
        let id = seeded_conversation(&store).await;

        workflow.run(id, "hello".into(), "en".into()).await;

        let saved = store.find_by_id(id).await.expect("conversation");
        assert_eq!(saved.title, "New Chat");
    }

    #[tokio::test]
    async fn rerun_is_noop_once_a_real_title_landed() {
        let (workflow, store, events) =
            workflow(Some(Arc::new(FixedLlm("Second Attempt".into()))));
        let id = seeded_conversation(&store).await;

        let mut conversation = store.find_by_id(id).await.expect("conversation");
        conversation.title = "Quarterly Report Review".into();
        store.save(conversation).await;

        let mut subscription = events.subscribe();
        workflow.run(id, "hello again".into(), "en".into()).await;

        let saved = store.find_by_id(id).await.expect("conversation");
        assert_eq!(saved.title, "Quarterly Report Review");
        assert!(subscription.try_recv().is_err());
    }

    #[tokio::test]
    async fn vanished_conversation_aborts_silently() {
        let (workflow, _, events) = workflow(Some(Arc::new(FixedLlm("Ghost Title".into()))));
        let mut subscription = events.subscribe();

        workflow.run(Uuid::new_v4(), "hello".into(), "en".into()).await;

        assert!(subscription.try_recv().is_err());
    }
}
