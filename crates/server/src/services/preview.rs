//! Preview orchestration.
//!
//! Ties link extraction, story lookup, message building, and posting
//! together:
//! 1. A message mentioning stories arrives
//! 2. Few mentions: stories are fetched and a preview is posted in place
//! 3. Many mentions: the author is privately asked first ("Post preview")
//! 4. Buttons on previews expand a story or complete a deferred preview

use std::sync::Arc;

use pivotal_preview_core::{PreviewRequest, Story, StoryId};
use tracing::{debug, info, instrument, warn};

use super::ports::{ChatPoster, StoryFetcher};
use crate::links::extract_story_ids;
use crate::slack::{
    ACTION_POST_PREVIEW, ACTION_SHOW_MORE, InteractionAction, InteractionPayload, MessageEvent,
    build_description_message, build_preview_prompt, build_stories_message,
};

/// Default number of mentioned stories at which the author is asked first.
pub const DEFAULT_ASK_THRESHOLD: usize = 2;

/// Handles story mentions and preview button actions.
#[derive(Clone)]
pub struct PreviewService {
    stories: Arc<dyn StoryFetcher>,
    chat: Arc<dyn ChatPoster>,
    ask_threshold: usize,
}

impl std::fmt::Debug for PreviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewService")
            .field("ask_threshold", &self.ask_threshold)
            .finish_non_exhaustive()
    }
}

impl PreviewService {
    /// Create a new preview service.
    #[must_use]
    pub fn new(
        stories: Arc<dyn StoryFetcher>,
        chat: Arc<dyn ChatPoster>,
        ask_threshold: usize,
    ) -> Self {
        Self {
            stories,
            chat,
            ask_threshold,
        }
    }

    /// Whether mentioning `ids` needs a confirmation before posting.
    #[must_use]
    pub fn needs_confirmation(&self, ids: &[StoryId]) -> bool {
        ids.len() >= self.ask_threshold
    }

    /// Handle a channel message: preview mentioned stories or ask first.
    ///
    /// Messages without story links and messages from bots are ignored.
    #[instrument(skip(self, event), fields(channel = %event.channel))]
    pub async fn handle_message(&self, event: &MessageEvent) {
        if event.is_bot_message() {
            return;
        }

        let ids = extract_story_ids(&event.text);
        if ids.is_empty() {
            return;
        }

        info!(stories = ?ids, "Received message with pivotal stories mentioned");

        if self.needs_confirmation(&ids) {
            self.ask_for_preview(event, ids).await;
        } else {
            self.post_preview(&ids, &event.channel, event.thread_ts(), None)
                .await;
        }
    }

    /// Route a single clicked button to its handler.
    ///
    /// Unknown action IDs are ignored.
    #[instrument(skip(self, payload, action), fields(action_id = %action.action_id))]
    pub async fn handle_action(&self, payload: &InteractionPayload, action: &InteractionAction) {
        let value = action.value.as_deref().unwrap_or_default();

        match action.action_id.as_str() {
            ACTION_SHOW_MORE => self.expand(payload, value).await,
            ACTION_POST_PREVIEW => self.confirm_preview(payload, value).await,
            other => debug!(action_id = %other, "Ignoring unknown action"),
        }
    }

    /// Privately show the full description of one story.
    async fn expand(&self, payload: &InteractionPayload, value: &str) {
        let id: StoryId = match value.parse() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, value, "Unexpected value for expand block action");
                return;
            }
        };

        let story = match self.stories.fetch_story(id).await {
            Ok(story) => story,
            Err(e) => {
                warn!(error = %e, story_id = %id, "Cannot fetch pivotal story");
                return;
            }
        };

        let message = build_description_message(&story, payload.thread_ts());

        if let Err(e) = self
            .chat
            .post_ephemeral(payload.channel_id(), &payload.user.id, &message)
            .await
        {
            warn!(error = %e, "Cannot post ephemeral slack message with more info");
            return;
        }

        info!(story_id = %id, "Ephemeral slack message with details is posted");
    }

    /// Complete a preview the author confirmed.
    async fn confirm_preview(&self, payload: &InteractionPayload, value: &str) {
        let request = match PreviewRequest::decode(value) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Cannot parse preview action data");
                return;
            }
        };

        self.post_preview(
            request.ids(),
            request.channel(),
            request.thread_ts(),
            payload.response_url(),
        )
        .await;
    }

    /// Fetch stories and post a single preview message.
    ///
    /// Stories that cannot be fetched are skipped; nothing is posted if none
    /// could be fetched. When `response_url` is given, the interactive
    /// message it belongs to is deleted after the preview is posted.
    #[instrument(skip(self, ids, response_url), fields(stories = ids.len()))]
    pub async fn post_preview(
        &self,
        ids: &[StoryId],
        channel: &str,
        thread_ts: Option<&str>,
        response_url: Option<&str>,
    ) {
        let stories = self.resolve(ids).await;

        if stories.is_empty() {
            debug!("No mentioned stories were fetched successfully, nothing to post");
            return;
        }

        let message = build_stories_message(&stories, thread_ts);

        if let Err(e) = self.chat.post_message(channel, &message).await {
            warn!(error = %e, "Cannot post slack message in response to mentioned stories");
            return;
        }

        info!(posted = stories.len(), "Slack message with mentioned stories is posted");

        if let Some(url) = response_url {
            if let Err(e) = self.chat.delete_original(url).await {
                warn!(error = %e, "Cannot delete preview prompt");
            }
        }
    }

    /// Privately ask the author whether to post a preview.
    async fn ask_for_preview(&self, event: &MessageEvent, ids: Vec<StoryId>) {
        let Some(user) = event.user.as_deref() else {
            debug!("Message has no author, cannot ask for preview");
            return;
        };

        let request = PreviewRequest::new(event.channel.clone(), event.thread_ts(), ids);
        let message = match build_preview_prompt(&request, event.thread_ts()) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Cannot build preview prompt");
                return;
            }
        };

        if let Err(e) = self.chat.post_ephemeral(&event.channel, user, &message).await {
            warn!(error = %e, "Cannot post ephemeral slack message to ask for preview");
            return;
        }

        info!("User is asked for the need of preview");
    }

    /// Fetch stories one by one, keeping mention order and skipping failures.
    async fn resolve(&self, ids: &[StoryId]) -> Vec<Story> {
        let mut stories = Vec::with_capacity(ids.len());

        for &id in ids {
            match self.stories.fetch_story(id).await {
                Ok(story) => stories.push(story),
                Err(e) => warn!(error = %e, story_id = %id, "Cannot fetch pivotal story"),
            }
        }

        stories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivotal::PivotalError;
    use crate::slack::{Accessory, Block, InteractionUser, RenderedMessage, SlackError};
    use async_trait::async_trait;
    use pivotal_preview_core::StoryType;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeTracker {
        missing: HashSet<i64>,
        fetched: Mutex<Vec<StoryId>>,
    }

    impl FakeTracker {
        fn new(missing: &[i64]) -> Arc<Self> {
            Arc::new(Self {
                missing: missing.iter().copied().collect(),
                fetched: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl StoryFetcher for FakeTracker {
        async fn fetch_story(&self, id: StoryId) -> Result<Story, PivotalError> {
            self.fetched.lock().expect("lock").push(id);
            if self.missing.contains(&id.as_i64()) {
                return Err(PivotalError::NotFound(format!("story {id}")));
            }
            Ok(Story {
                id,
                name: format!("Story {id}"),
                url: format!("https://www.pivotaltracker.com/story/show/{id}"),
                kind: StoryType::Feature,
                state: "started".to_string(),
                description: String::new(),
                labels: Vec::new(),
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Posted {
        Message(String, RenderedMessage),
        Ephemeral(String, String, RenderedMessage),
        Deleted(String),
    }

    #[derive(Default)]
    struct FakeChat {
        posted: Mutex<Vec<Posted>>,
        fail_posts: bool,
    }

    impl FakeChat {
        fn posted(&self) -> Vec<Posted> {
            self.posted.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ChatPoster for FakeChat {
        async fn post_message(&self, channel: &str, message: &RenderedMessage) -> Result<(), SlackError> {
            if self.fail_posts {
                return Err(SlackError::Api("channel_not_found".to_string()));
            }
            self.posted
                .lock()
                .expect("lock")
                .push(Posted::Message(channel.to_string(), message.clone()));
            Ok(())
        }

        async fn post_ephemeral(
            &self,
            channel: &str,
            user: &str,
            message: &RenderedMessage,
        ) -> Result<(), SlackError> {
            self.posted.lock().expect("lock").push(Posted::Ephemeral(
                channel.to_string(),
                user.to_string(),
                message.clone(),
            ));
            Ok(())
        }

        async fn delete_original(&self, response_url: &str) -> Result<(), SlackError> {
            self.posted
                .lock()
                .expect("lock")
                .push(Posted::Deleted(response_url.to_string()));
            Ok(())
        }
    }

    fn service(tracker: &Arc<FakeTracker>, chat: &Arc<FakeChat>) -> PreviewService {
        PreviewService::new(tracker.clone(), chat.clone(), DEFAULT_ASK_THRESHOLD)
    }

    fn message(text: &str, thread_ts: Option<&str>) -> MessageEvent {
        MessageEvent {
            channel: "C1".to_string(),
            user: Some("U1".to_string()),
            text: text.to_string(),
            ts: "10.0".to_string(),
            thread_ts: thread_ts.map(String::from),
            ..MessageEvent::default()
        }
    }

    fn payload(response_url: Option<&str>) -> InteractionPayload {
        InteractionPayload {
            interaction_type: "block_actions".to_string(),
            user: InteractionUser {
                id: "U2".to_string(),
                username: None,
            },
            channel: Some(crate::slack::InteractionChannel {
                id: "C1".to_string(),
            }),
            message: Some(crate::slack::InteractionMessage {
                ts: Some("11.0".to_string()),
                thread_ts: Some("9.0".to_string()),
            }),
            actions: Vec::new(),
            response_url: response_url.map(String::from),
            trigger_id: None,
        }
    }

    fn action(action_id: &str, value: &str) -> InteractionAction {
        InteractionAction {
            action_id: action_id.to_string(),
            block_id: None,
            value: Some(value.to_string()),
            action_type: "button".to_string(),
        }
    }

    fn story_ids(message: &RenderedMessage) -> Vec<String> {
        message
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Section {
                    accessory: Some(Accessory::Button { value, .. }),
                    ..
                } => value.clone(),
                _ => None,
            })
            .collect()
    }

    fn ids(raw: &[i64]) -> Vec<StoryId> {
        raw.iter().copied().map(StoryId::new).collect()
    }

    #[test]
    fn test_needs_confirmation_threshold() {
        let svc = service(&FakeTracker::new(&[]), &Arc::new(FakeChat::default()));

        assert!(!svc.needs_confirmation(&ids(&[1])));
        assert!(svc.needs_confirmation(&ids(&[1, 2])));
        assert!(svc.needs_confirmation(&ids(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_single_mention_posts_directly() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_message(&message("see pivotaltracker.com/story/show/5", None))
            .await;

        let posted = chat.posted();
        assert_eq!(posted.len(), 1);
        let Some(Posted::Message(channel, rendered)) = posted.first() else {
            panic!("Expected channel message");
        };
        assert_eq!(channel, "C1");
        assert_eq!(story_ids(rendered), ["5"]);
        assert_eq!(rendered.thread_ts, None);
    }

    #[tokio::test]
    async fn test_single_mention_in_thread_replies_in_thread() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_message(&message("pivotaltracker.com/story/show/5", Some("8.0")))
            .await;

        let Some(Posted::Message(_, rendered)) = chat.posted().first().cloned() else {
            panic!("Expected channel message");
        };
        assert_eq!(rendered.thread_ts.as_deref(), Some("8.0"));
    }

    #[tokio::test]
    async fn test_many_mentions_ask_first() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_message(&message(
                "pivotaltracker.com/story/show/1 pivotaltracker.com/story/show/2",
                None,
            ))
            .await;

        assert!(tracker.fetched.lock().expect("lock").is_empty());
        let posted = chat.posted();
        let Some(Posted::Ephemeral(channel, user, rendered)) = posted.first() else {
            panic!("Expected ephemeral prompt");
        };
        assert_eq!(channel, "C1");
        assert_eq!(user, "U1");

        let value = story_ids(rendered);
        let request = PreviewRequest::decode(value.first().expect("button value"))
            .expect("button value should decode");
        assert_eq!(request, PreviewRequest::new("C1", None, ids(&[1, 2])));
    }

    #[tokio::test]
    async fn test_message_without_links_is_ignored() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_message(&message("nothing to see here 123", None))
            .await;

        assert!(chat.posted().is_empty());
        assert!(tracker.fetched.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_bot_message_is_ignored() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());
        let event = MessageEvent {
            bot_id: Some("B1".to_string()),
            ..message("pivotaltracker.com/story/show/5", None)
        };

        service(&tracker, &chat).handle_message(&event).await;

        assert!(chat.posted().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_skipped() {
        let tracker = FakeTracker::new(&[2]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .post_preview(&ids(&[1, 2, 3]), "C1", None, None)
            .await;

        assert_eq!(*tracker.fetched.lock().expect("lock"), ids(&[1, 2, 3]));
        let Some(Posted::Message(_, rendered)) = chat.posted().first().cloned() else {
            panic!("Expected channel message");
        };
        assert_eq!(story_ids(&rendered), ["1", "3"]);
        assert_eq!(rendered.divider_count(), 1);
    }

    #[tokio::test]
    async fn test_nothing_posted_when_all_fetches_fail() {
        let tracker = FakeTracker::new(&[1, 2]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .post_preview(&ids(&[1, 2]), "C1", None, Some("https://hooks.slack.com/x"))
            .await;

        assert!(chat.posted().is_empty());
    }

    #[tokio::test]
    async fn test_show_more_posts_description_ephemerally() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_action(&payload(None), &action(ACTION_SHOW_MORE, "77"))
            .await;

        let posted = chat.posted();
        let Some(Posted::Ephemeral(channel, user, rendered)) = posted.first() else {
            panic!("Expected ephemeral description");
        };
        assert_eq!(channel, "C1");
        assert_eq!(user, "U2");
        assert_eq!(rendered.thread_ts.as_deref(), Some("9.0"));
        assert_eq!(rendered.blocks.len(), 1);
    }

    #[tokio::test]
    async fn test_show_more_with_bad_value() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_action(&payload(None), &action(ACTION_SHOW_MORE, "abc"))
            .await;

        assert!(chat.posted().is_empty());
        assert!(tracker.fetched.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_show_more_fetch_failure() {
        let tracker = FakeTracker::new(&[77]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_action(&payload(None), &action(ACTION_SHOW_MORE, "77"))
            .await;

        assert!(chat.posted().is_empty());
    }

    #[tokio::test]
    async fn test_post_preview_action_posts_and_deletes_prompt() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());
        let value = PreviewRequest::new("C9", Some("4.0"), ids(&[3, 4]))
            .encode()
            .expect("encode");

        service(&tracker, &chat)
            .handle_action(
                &payload(Some("https://hooks.slack.com/actions/1")),
                &action(ACTION_POST_PREVIEW, &value),
            )
            .await;

        let posted = chat.posted();
        assert_eq!(posted.len(), 2);
        let Some(Posted::Message(channel, rendered)) = posted.first() else {
            panic!("Expected channel message");
        };
        assert_eq!(channel, "C9");
        assert_eq!(rendered.thread_ts.as_deref(), Some("4.0"));
        assert_eq!(story_ids(rendered), ["3", "4"]);
        assert_eq!(
            posted.get(1),
            Some(&Posted::Deleted("https://hooks.slack.com/actions/1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_post_preview_action_with_bad_value() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_action(&payload(None), &action(ACTION_POST_PREVIEW, "{broken"))
            .await;

        assert!(chat.posted().is_empty());
        assert!(tracker.fetched.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_prompt_kept_when_post_fails() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat {
            fail_posts: true,
            ..FakeChat::default()
        });

        service(&tracker, &chat)
            .post_preview(&ids(&[1]), "C1", None, Some("https://hooks.slack.com/x"))
            .await;

        assert!(chat.posted().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_is_ignored() {
        let tracker = FakeTracker::new(&[]);
        let chat = Arc::new(FakeChat::default());

        service(&tracker, &chat)
            .handle_action(&payload(None), &action("something_else", "1"))
            .await;

        assert!(chat.posted().is_empty());
        assert!(tracker.fetched.lock().expect("lock").is_empty());
    }
}
