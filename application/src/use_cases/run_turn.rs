//! Run Turn use case
//!
//! Orchestrates one user turn: concurrent per-model fan-out, the
//! confidence-based escalation decision, and the optional council debate
//! round.

use crate::ports::document_store::DocumentStore;
use crate::ports::llm_gateway::{ChatGateway, ChatRequest, GatewayError};
use crate::ports::progress::{NoProgress, ProgressNotifier, TurnPhase};
use crate::ports::response_cache::{Fingerprint, ResponseCache};
use crate::ports::thread_store::{StoreError, ThreadStore};
use std::sync::Arc;
use thinktank_domain::{
    filter_by_mentions, orchestration::routing, ChatMessage, ChatPromptTemplate, ConfidenceScorer,
    Message, Mode, Model, Thread, USER_SPEAKER,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Fixed model for short debate reactions: stable and widely available.
pub const DEBATE_MODEL: Model = Model::Gpt4oMini;

/// Token budget for a debate reaction
pub const DEBATE_MAX_TOKENS: u32 = 120;

/// Character budget for the reference-document excerpt
const REFERENCE_BUDGET: usize = 2000;

/// Errors that can occur during turn execution
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("User text must not be empty")]
    EmptyUserText,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Input for the RunTurn use case
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    /// Thread receiving the turn
    pub thread_id: String,
    /// The user's message text
    pub text: String,
    /// Explicit participant override; replaces the thread's stored set
    pub participants: Option<Vec<Model>>,
    /// Generation mode
    pub mode: Mode,
    /// Whether the council debate round may run
    pub debate: bool,
}

impl RunTurnInput {
    pub fn new(thread_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            text: text.into(),
            participants: None,
            mode: Mode::default(),
            debate: true,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_participants(mut self, participants: Vec<Model>) -> Self {
        self.participants = Some(participants);
        self
    }

    pub fn without_debate(mut self) -> Self {
        self.debate = false;
        self
    }
}

/// An event emitted by the streaming variant
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// One reply, emitted as soon as its generation resolves
    Reply(ChatMessage),
    /// The debate round's replies, emitted together after the fan-out
    Debate(Vec<ChatMessage>),
    /// End of the turn
    Done,
}

/// Use case for running one chat turn
pub struct RunTurnUseCase<G: ChatGateway + 'static> {
    gateway: Arc<G>,
    threads: Arc<dyn ThreadStore>,
    documents: Arc<dyn DocumentStore>,
    cache: Arc<dyn ResponseCache>,
    scorer: Arc<dyn ConfidenceScorer>,
}

impl<G: ChatGateway + 'static> Clone for RunTurnUseCase<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            threads: Arc::clone(&self.threads),
            documents: Arc::clone(&self.documents),
            cache: Arc::clone(&self.cache),
            scorer: Arc::clone(&self.scorer),
        }
    }
}

impl<G: ChatGateway + 'static> RunTurnUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        threads: Arc<dyn ThreadStore>,
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn ResponseCache>,
        scorer: Arc<dyn ConfidenceScorer>,
    ) -> Self {
        Self {
            gateway,
            threads,
            documents,
            cache,
            scorer,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunTurnInput) -> Result<Vec<ChatMessage>, RunTurnError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute one turn in batch mode.
    ///
    /// Returns the produced messages in deterministic order: base replies
    /// in participant selection order, the escalation reply (if any)
    /// appended last, then debate replies in first-appearance speaker
    /// order. All messages are appended to the thread in the same order.
    pub async fn execute_with_progress(
        &self,
        input: RunTurnInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<ChatMessage>, RunTurnError> {
        let (thread, selected) = self.prepare_turn(&input).await?;
        let mode = input.mode;

        info!(
            thread = %thread.id,
            %mode,
            participants = selected.len(),
            "Starting turn"
        );

        let mut replies = self.fan_out(&thread, &selected, mode, progress).await;

        if let Some(escalated) = self.escalate(&thread, &replies, mode, progress).await {
            replies.push(escalated);
        }

        for message in &replies {
            self.threads.append(&thread.id, message.clone()).await?;
        }

        let profile = mode.profile();
        if profile.debate_eligible && input.debate {
            let debate = self.debate_round(&thread, &replies, mode, progress).await;
            for message in &debate {
                self.threads.append(&thread.id, message.clone()).await?;
            }
            replies.extend(debate);
        }

        Ok(replies)
    }

    /// Execute one turn in streaming mode.
    ///
    /// Each reply is emitted as soon as its generation resolves, so event
    /// order is completion order, not selection order; only the batch
    /// endpoint guarantees deterministic ordering. The thread's persisted
    /// log reflects append-arrival order. The streaming path fans out and
    /// debates but never escalates.
    pub async fn execute_streaming(
        &self,
        input: RunTurnInput,
    ) -> Result<mpsc::Receiver<TurnEvent>, RunTurnError> {
        let (thread, selected) = self.prepare_turn(&input).await?;
        let mode = input.mode;
        let debate_enabled = mode.profile().debate_eligible && input.debate;

        info!(
            thread = %thread.id,
            %mode,
            participants = selected.len(),
            "Starting streaming turn"
        );

        let (tx, rx) = mpsc::channel(16);
        let this = self.clone();
        let thread = Arc::new(thread);

        tokio::spawn(async move {
            let mut join_set = JoinSet::new();
            for model in selected {
                let this = this.clone();
                let thread = Arc::clone(&thread);
                join_set
                    .spawn(async move { this.generate_reply(&thread, &model, mode).await });
            }

            let mut replies = Vec::new();
            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok(message) => {
                        if let Err(e) = this.threads.append(&thread.id, message.clone()).await {
                            warn!("Failed to append streamed reply: {}", e);
                        }
                        replies.push(message.clone());
                        if tx.send(TurnEvent::Reply(message)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!("Task join error: {}", e),
                }
            }

            if debate_enabled {
                let debate = this
                    .debate_round(&thread, &replies, mode, &NoProgress)
                    .await;
                for message in &debate {
                    if let Err(e) = this.threads.append(&thread.id, message.clone()).await {
                        warn!("Failed to append debate reply: {}", e);
                    }
                }
                if tx.send(TurnEvent::Debate(debate)).await.is_err() {
                    return;
                }
            }

            let _ = tx.send(TurnEvent::Done).await;
        });

        Ok(rx)
    }

    /// Validate the input, apply a participant override, append the user
    /// message, and compute the participant selection for this turn.
    ///
    /// Rejects before any side effect so a failed turn leaves no trace.
    async fn prepare_turn(
        &self,
        input: &RunTurnInput,
    ) -> Result<(Thread, Vec<Model>), RunTurnError> {
        if input.text.trim().is_empty() {
            return Err(RunTurnError::EmptyUserText);
        }

        if let Some(participants) = &input.participants {
            let sanitized = Thread::sanitize_participants(participants.clone());
            self.threads
                .set_participants(&input.thread_id, sanitized)
                .await?;
        }

        self.threads
            .append(&input.thread_id, ChatMessage::user(input.text.clone()))
            .await?;

        let thread = self.threads.thread(&input.thread_id).await?;

        let narrowed = filter_by_mentions(&input.text, &thread.participants);
        let selected: Vec<Model> = narrowed
            .into_iter()
            .filter(|m| m.as_str() != USER_SPEAKER)
            .collect();

        // An empty selection falls back to the mode's default roster.
        let selected = if selected.is_empty() {
            routing::default_participants(input.mode)
        } else {
            selected
        };

        Ok((thread, selected))
    }

    /// Fan out one concurrent generation per selected model.
    ///
    /// Result order is re-imposed to selection order regardless of which
    /// call returns first. A failing branch degrades to its placeholder
    /// and never cancels siblings.
    async fn fan_out(
        &self,
        thread: &Thread,
        selected: &[Model],
        mode: Mode,
        progress: &dyn ProgressNotifier,
    ) -> Vec<ChatMessage> {
        progress.on_phase_start(&TurnPhase::FanOut, selected.len());

        let thread = Arc::new(thread.clone());
        let mut join_set = JoinSet::new();

        for (index, model) in selected.iter().cloned().enumerate() {
            let this = self.clone();
            let thread = Arc::clone(&thread);
            join_set.spawn(async move {
                let message = this.generate_reply(&thread, &model, mode).await;
                (index, model, message)
            });
        }

        let mut slots: Vec<Option<ChatMessage>> = vec![None; selected.len()];
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, model, message)) => {
                    progress.on_task_complete(
                        &TurnPhase::FanOut,
                        &model,
                        message.confidence.is_some(),
                    );
                    slots[index] = Some(message);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        progress.on_phase_complete(&TurnPhase::FanOut);
        slots.into_iter().flatten().collect()
    }

    /// Apply the escalation decision: in eligible modes, a round whose
    /// mean confidence falls strictly below the threshold earns exactly
    /// one extra call to the mode's escalation candidate. Never cascades.
    async fn escalate(
        &self,
        thread: &Thread,
        replies: &[ChatMessage],
        mode: Mode,
        progress: &dyn ProgressNotifier,
    ) -> Option<ChatMessage> {
        let profile = mode.profile();
        if !profile.escalation_eligible {
            return None;
        }

        let mean = if replies.is_empty() {
            0.0
        } else {
            replies
                .iter()
                .map(|r| self.scorer.score(&r.text))
                .sum::<f32>()
                / replies.len() as f32
        };

        if mean >= profile.escalation_threshold {
            return None;
        }

        let candidate = routing::escalation_candidate(mode)?;
        info!(%mode, mean, candidate = %candidate, "Low confidence, escalating");

        progress.on_phase_start(&TurnPhase::Escalation, 1);
        let message = self.generate_reply(thread, &candidate, mode).await;
        progress.on_task_complete(&TurnPhase::Escalation, &candidate, message.confidence.is_some());
        progress.on_phase_complete(&TurnPhase::Escalation);

        Some(message)
    }

    /// One short debate round: every distinct speaker of this round adds
    /// a brief reaction to the others, concurrently, on the fixed debate
    /// model. Debate replies are never cached.
    async fn debate_round(
        &self,
        thread: &Thread,
        replies: &[ChatMessage],
        mode: Mode,
        progress: &dyn ProgressNotifier,
    ) -> Vec<ChatMessage> {
        let mut speakers: Vec<String> = Vec::new();
        for reply in replies {
            if !speakers.contains(&reply.speaker) {
                speakers.push(reply.speaker.clone());
            }
        }

        let mut context_lines: Vec<String> = Vec::new();
        if let Some(last_user) = thread.last_user_text() {
            context_lines.push(format!("[{}] {}", USER_SPEAKER, last_user));
        }
        context_lines.extend(replies.iter().map(ChatMessage::context_line));
        let context = Arc::new(context_lines.join("\n"));

        progress.on_phase_start(&TurnPhase::Debate, speakers.len());

        let temperature = mode.profile().temperature;
        let mut join_set = JoinSet::new();

        for (index, speaker) in speakers.iter().cloned().enumerate() {
            let this = self.clone();
            let context = Arc::clone(&context);
            join_set.spawn(async move {
                let request = ChatRequest::new(
                    DEBATE_MODEL,
                    vec![
                        Message::system(ChatPromptTemplate::debate_system()),
                        Message::user(ChatPromptTemplate::debate_prompt(&context, &speaker)),
                    ],
                    temperature,
                    DEBATE_MAX_TOKENS,
                );
                let message = match this.gateway.complete(&request).await {
                    Ok(text) => {
                        let confidence = this.scorer.score(&text);
                        ChatMessage::reply(speaker, text, confidence)
                    }
                    Err(e) => {
                        warn!(%e, "Debate reaction failed");
                        ChatMessage::debate_error(speaker, e)
                    }
                };
                (index, message)
            });
        }

        let mut slots: Vec<Option<ChatMessage>> = vec![None; speakers.len()];
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, message)) => {
                    progress.on_task_complete(
                        &TurnPhase::Debate,
                        &DEBATE_MODEL,
                        message.confidence.is_some(),
                    );
                    slots[index] = Some(message);
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        progress.on_phase_complete(&TurnPhase::Debate);
        slots.into_iter().flatten().collect()
    }

    /// Generate one reply for one model, degrading any gateway failure to
    /// an inline error placeholder that flows downstream like a normal
    /// reply.
    async fn generate_reply(&self, thread: &Thread, model: &Model, mode: Mode) -> ChatMessage {
        let speaker = model.short_name().to_string();
        match self.try_generate(thread, model, mode).await {
            Ok((text, confidence)) => ChatMessage::reply(speaker, text, confidence),
            Err(e) => {
                warn!(model = %model, %e, "Generation failed");
                ChatMessage::transport_error(speaker, e)
            }
        }
    }

    async fn try_generate(
        &self,
        thread: &Thread,
        model: &Model,
        mode: Mode,
    ) -> Result<(String, f32), GatewayError> {
        let context = thread.context();
        let query = thread.last_user_text().unwrap_or_default();

        // Reference text is best-effort: a document subsystem failure
        // must not fail the generation branch.
        let reference = self
            .documents
            .reference_text(&thread.id, REFERENCE_BUDGET, query)
            .await
            .unwrap_or_default();

        let profile = mode.profile();
        let fingerprint = Fingerprint::for_request(
            model,
            profile.temperature,
            profile.max_tokens,
            &context,
            &reference,
        );

        if let Some(text) = self.cache.get(&fingerprint).await {
            debug!(model = %model, "Response cache hit");
            let confidence = self.scorer.score(&text);
            return Ok((text, confidence));
        }

        let request = ChatRequest::for_mode(
            model.clone(),
            vec![
                Message::system(ChatPromptTemplate::group_chat_system()),
                Message::user(ChatPromptTemplate::reply_prompt(&context, &reference)),
            ],
            mode,
        );

        let text = self.gateway.complete(&request).await?;
        self.cache
            .put(fingerprint, text.clone(), profile.cache_ttl)
            .await;

        let confidence = self.scorer.score(&text);
        Ok((text, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;
    use thinktank_domain::HeuristicScorer;

    // -- Mock gateway ----------------------------------------------------------

    #[derive(Default)]
    struct MockGateway {
        calls: Mutex<Vec<ChatRequest>>,
        replies: HashMap<String, String>,
        failing: HashSet<String>,
        delays: HashMap<String, u64>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self::default()
        }

        fn with_reply(mut self, model: &Model, text: &str) -> Self {
            self.replies.insert(model.as_str().to_string(), text.to_string());
            self
        }

        fn failing(mut self, model: &Model) -> Self {
            self.failing.insert(model.as_str().to_string());
            self
        }

        fn with_delay(mut self, model: &Model, millis: u64) -> Self {
            self.delays.insert(model.as_str().to_string(), millis);
            self
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.calls.lock().unwrap().clone()
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl ChatGateway for MockGateway {
        async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(request.clone());

            if let Some(millis) = self.delays.get(request.model.as_str()) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            if self.failing.contains(request.model.as_str()) {
                return Err(GatewayError::RequestFailed("boom".to_string()));
            }
            Ok(self
                .replies
                .get(request.model.as_str())
                .cloned()
                .unwrap_or_else(|| "ok".to_string()))
        }
    }

    // -- In-memory test ports --------------------------------------------------

    #[derive(Default)]
    struct MemoryThreads {
        threads: Mutex<HashMap<String, Thread>>,
    }

    impl MemoryThreads {
        fn snapshot(&self, id: &str) -> Thread {
            self.threads
                .lock()
                .unwrap()
                .entry(id.to_string())
                .or_insert_with(|| Thread::new(id))
                .clone()
        }
    }

    #[async_trait::async_trait]
    impl ThreadStore for MemoryThreads {
        async fn thread(&self, id: &str) -> Result<Thread, StoreError> {
            Ok(self.snapshot(id))
        }

        async fn append(&self, id: &str, message: ChatMessage) -> Result<(), StoreError> {
            self.threads
                .lock()
                .unwrap()
                .entry(id.to_string())
                .or_insert_with(|| Thread::new(id))
                .push(message);
            Ok(())
        }

        async fn participants(&self, id: &str) -> Result<Vec<Model>, StoreError> {
            Ok(self.snapshot(id).participants)
        }

        async fn set_participants(
            &self,
            id: &str,
            participants: Vec<Model>,
        ) -> Result<(), StoreError> {
            self.threads
                .lock()
                .unwrap()
                .entry(id.to_string())
                .or_insert_with(|| Thread::new(id))
                .participants = participants;
            Ok(())
        }
    }

    struct NoDocuments;

    #[async_trait::async_trait]
    impl DocumentStore for NoDocuments {
        async fn add(
            &self,
            _thread_id: &str,
            _document: thinktank_domain::Document,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn list(
            &self,
            _thread_id: &str,
        ) -> Result<Vec<thinktank_domain::Document>, StoreError> {
            Ok(vec![])
        }

        async fn set_enabled(
            &self,
            _thread_id: &str,
            _document_id: &uuid::Uuid,
            _enabled: bool,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn clear(&self, _thread_id: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn reference_text(
            &self,
            _thread_id: &str,
            _max_chars: usize,
            _query: &str,
        ) -> Result<String, StoreError> {
            Ok(String::new())
        }
    }

    struct NullCache;

    #[async_trait::async_trait]
    impl ResponseCache for NullCache {
        async fn get(&self, _fingerprint: &Fingerprint) -> Option<String> {
            None
        }

        async fn put(&self, _fingerprint: Fingerprint, _text: String, _ttl: Duration) {}
    }

    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait::async_trait]
    impl ResponseCache for MemoryCache {
        async fn get(&self, fingerprint: &Fingerprint) -> Option<String> {
            self.entries.lock().unwrap().get(fingerprint.as_str()).cloned()
        }

        async fn put(&self, fingerprint: Fingerprint, text: String, _ttl: Duration) {
            self.entries
                .lock()
                .unwrap()
                .insert(fingerprint.as_str().to_string(), text);
        }
    }

    // -- Helpers ---------------------------------------------------------------

    fn use_case(
        gateway: Arc<MockGateway>,
        threads: Arc<MemoryThreads>,
        cache: Arc<dyn ResponseCache>,
    ) -> RunTurnUseCase<MockGateway> {
        RunTurnUseCase::new(
            gateway,
            threads,
            Arc::new(NoDocuments),
            cache,
            Arc::new(HeuristicScorer::default()),
        )
    }

    fn long_text() -> String {
        "a".repeat(700)
    }

    // -- Escalation ------------------------------------------------------------

    #[tokio::test]
    async fn low_confidence_in_balanced_escalates_exactly_once() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Balanced)
            .with_participants(vec![Model::Grok4, Model::Gpt41Mini]);
        let replies = uc.execute(input).await.unwrap();

        // Two base replies plus the escalation reply from the candidate.
        assert_eq!(replies.len(), 3);
        assert_eq!(gateway.call_count(), 3);
        let last = gateway.requests().pop().unwrap();
        assert_eq!(last.model, Model::Gpt4o);
        assert_eq!(replies[2].speaker, "gpt-4o");
    }

    #[tokio::test]
    async fn eco_never_escalates_regardless_of_confidence() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Eco)
            .with_participants(vec![Model::Grok4, Model::Gpt41Mini]);
        let replies = uc.execute(input).await.unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn confident_round_does_not_escalate() {
        let long = long_text();
        let gateway = Arc::new(
            MockGateway::new()
                .with_reply(&Model::Grok4, &long)
                .with_reply(&Model::Gpt41Mini, &long),
        );
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Balanced)
            .with_participants(vec![Model::Grok4, Model::Gpt41Mini]);
        let replies = uc.execute(input).await.unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(gateway.call_count(), 2);
    }

    // -- Debate ----------------------------------------------------------------

    #[tokio::test]
    async fn council_debate_runs_one_reaction_per_distinct_speaker() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let participants = vec![Model::Grok4, Model::ClaudeSonnet35, Model::Gpt4o];
        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Council)
            .with_participants(participants);
        let replies = uc.execute(input).await.unwrap();

        assert_eq!(replies.len(), 6);

        let debate_calls: Vec<ChatRequest> = gateway
            .requests()
            .into_iter()
            .filter(|r| r.max_tokens == DEBATE_MAX_TOKENS)
            .collect();
        assert_eq!(debate_calls.len(), 3);
        assert!(debate_calls.iter().all(|r| r.model == DEBATE_MODEL));

        // Debate replies keep the first-appearance speaker order.
        let debate_speakers: Vec<&str> =
            replies[3..].iter().map(|m| m.speaker.as_str()).collect();
        assert_eq!(
            debate_speakers,
            vec!["grok-4", "claude-3.5-sonnet", "gpt-4o"]
        );
    }

    #[tokio::test]
    async fn debate_disabled_by_caller_runs_no_extra_calls() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Council)
            .with_participants(vec![Model::Grok4, Model::ClaudeSonnet35, Model::Gpt4o])
            .without_debate();
        let replies = uc.execute(input).await.unwrap();

        assert_eq!(replies.len(), 3);
        assert_eq!(gateway.call_count(), 3);
    }

    // -- Partial failure -------------------------------------------------------

    #[tokio::test]
    async fn failing_branch_degrades_to_placeholder() {
        let gateway = Arc::new(MockGateway::new().failing(&Model::Grok4));
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Deluxe)
            .with_participants(vec![Model::Grok4, Model::ClaudeSonnet35, Model::Gpt4oMini]);
        let replies = uc.execute(input).await.unwrap();

        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0].speaker, "grok-4");
        assert!(replies[0].text.starts_with("(error from grok-4:"));
        assert!(replies[0].confidence.is_none());
        assert!(replies[1].confidence.is_some());
        assert!(replies[2].confidence.is_some());

        // The placeholder is persisted like any other reply.
        let thread = threads.snapshot("t");
        assert_eq!(thread.messages.len(), 4);
    }

    // -- Ordering --------------------------------------------------------------

    #[tokio::test]
    async fn batch_order_matches_selection_order() {
        let gateway = Arc::new(MockGateway::new().with_delay(&Model::Grok4, 50));
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Deluxe)
            .with_participants(vec![Model::Grok4, Model::Gpt4oMini]);
        let replies = uc.execute(input).await.unwrap();

        // grok-4 finishes last but stays first: selection order wins.
        assert_eq!(replies[0].speaker, "grok-4");
        assert_eq!(replies[1].speaker, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn streaming_emits_in_completion_order() {
        let gateway = Arc::new(MockGateway::new().with_delay(&Model::Grok4, 50));
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Deluxe)
            .with_participants(vec![Model::Grok4, Model::Gpt4oMini]);
        let mut rx = uc.execute_streaming(input).await.unwrap();

        let mut speakers = Vec::new();
        let mut saw_done = false;
        while let Some(event) = rx.recv().await {
            match event {
                TurnEvent::Reply(message) => speakers.push(message.speaker),
                TurnEvent::Debate(_) => panic!("no debate in deluxe"),
                TurnEvent::Done => {
                    saw_done = true;
                    break;
                }
            }
        }

        assert!(saw_done);
        assert_eq!(speakers, vec!["gpt-4o-mini", "grok-4"]);

        // The persisted log reflects arrival order too.
        let thread = threads.snapshot("t");
        assert_eq!(thread.messages[1].speaker, "gpt-4o-mini");
        assert_eq!(thread.messages[2].speaker, "grok-4");
    }

    #[tokio::test]
    async fn streaming_council_emits_debate_then_done() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Council)
            .with_participants(vec![Model::Grok4, Model::Gpt4o]);
        let mut rx = uc.execute_streaming(input).await.unwrap();

        let mut reply_count = 0;
        let mut debate_len = None;
        while let Some(event) = rx.recv().await {
            match event {
                TurnEvent::Reply(_) => reply_count += 1,
                TurnEvent::Debate(messages) => debate_len = Some(messages.len()),
                TurnEvent::Done => break,
            }
        }

        assert_eq!(reply_count, 2);
        assert_eq!(debate_len, Some(2));
    }

    // -- Validation and selection ----------------------------------------------

    #[tokio::test]
    async fn empty_text_is_rejected_without_side_effects() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let result = uc.execute(RunTurnInput::new("t", "  ")).await;
        assert!(matches!(result, Err(RunTurnError::EmptyUserText)));
        assert_eq!(gateway.call_count(), 0);
        assert!(threads.snapshot("t").messages.is_empty());
    }

    #[tokio::test]
    async fn participant_override_is_sanitized_and_stored() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Deluxe)
            .with_participants(vec![
                Model::Grok4,
                Model::Grok4,
                Model::Custom("user".to_string()),
                Model::Gpt4o,
                Model::ClaudeSonnet35,
                Model::ClaudeHaiku3,
                Model::Gpt41,
            ]);
        let replies = uc.execute(input).await.unwrap();

        let stored = threads.snapshot("t").participants;
        assert_eq!(
            stored,
            vec![
                Model::Grok4,
                Model::Gpt4o,
                Model::ClaudeSonnet35,
                Model::ClaudeHaiku3,
            ]
        );
        assert_eq!(replies.len(), 4);
    }

    #[tokio::test]
    async fn mention_narrows_fan_out_to_addressed_model() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        // Default thread participants: grok-4, claude-3.5-sonnet, gpt-4o-mini.
        let input = RunTurnInput::new("t", "hey @grok-4 thoughts?").with_mode(Mode::Deluxe);
        let replies = uc.execute(input).await.unwrap();

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].speaker, "grok-4");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_selection_falls_back_to_mode_defaults() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), Arc::new(NullCache));

        let input = RunTurnInput::new("t", "hello")
            .with_mode(Mode::Eco)
            .with_participants(vec![]);
        let replies = uc.execute(input).await.unwrap();

        let called: Vec<Model> = gateway.requests().into_iter().map(|r| r.model).collect();
        assert_eq!(called, vec![Model::ClaudeHaiku3, Model::Gpt4oMini]);
        assert_eq!(replies.len(), 2);
    }

    // -- Caching ---------------------------------------------------------------

    #[tokio::test]
    async fn identical_requests_are_served_from_cache() {
        let gateway = Arc::new(MockGateway::new());
        let threads = Arc::new(MemoryThreads::default());
        let cache = Arc::new(MemoryCache::default());
        let uc = use_case(Arc::clone(&gateway), Arc::clone(&threads), cache);

        let participants = vec![Model::Grok4, Model::Gpt4o];

        let first = RunTurnInput::new("a", "hi")
            .with_mode(Mode::Deluxe)
            .with_participants(participants.clone());
        uc.execute(first).await.unwrap();
        assert_eq!(gateway.call_count(), 2);

        // A different thread with an identical context hits the cache.
        let second = RunTurnInput::new("b", "hi")
            .with_mode(Mode::Deluxe)
            .with_participants(participants);
        let replies = uc.execute(second).await.unwrap();

        assert_eq!(gateway.call_count(), 2);
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|r| r.confidence.is_some()));
    }
}
