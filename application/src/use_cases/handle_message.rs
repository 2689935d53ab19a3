//! Handle Message use case
//!
//! The turn orchestrator: one inbound user message in, zero or more persona
//! responses out, with an optional Governor merge at the end.
//!
//! Turn flow:
//! 1. command marker - delegate to the command interpreter, no personas run
//! 2. crisis text - fixed safety notice, stop
//! 3. forced `@` mentions - one engages isolation, two or more fan out
//!    concurrently and bypass classification
//! 4. persist the user's message
//! 5. isolation - the single isolated persona answers alone
//! 6. classification intersected with the active set (fail-open)
//! 7. randomized turn-count policy: one, two, or three responses
//! 8. Governor merge when more than one distinct persona spoke
//!
//! Only the forced fan-out runs generations concurrently; every other step
//! feeds earlier responses into later prompts, so they are sequential.
//! A failed generation costs that contribution, never the turn.

use crate::ports::classifier::PersonaClassifier;
use crate::ports::crisis::CrisisDetector;
use crate::ports::gateway::PersonaGateway;
use crate::ports::history::ConversationStore;
use crate::ports::random::RandomSource;
use crate::ports::transport::{IndicatorHandle, Transport, TransportError};
use crate::use_cases::lock_registry;
use crate::use_cases::run_command::RunCommandUseCase;
use chorus_domain::{
    PersonaId, PersonaRegistry, ResponsePlan, Turn, TurnPrompt, forced_mentions, is_command,
    plan_turns, sanitize,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

/// Errors that escape a turn.
///
/// Generation and classification failures are recovered inside the turn;
/// only transport failures on required deliveries surface.
#[derive(Error, Debug)]
pub enum HandleMessageError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Tunables for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Upper bound on the forced-mention fan-out
    pub fanout_timeout: Duration,
    /// UX smoothing pause between showing the thinking indicator and
    /// generating
    pub thinking_delay: Duration,
    /// How many history lines accompany each generation call
    pub history_window: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            fanout_timeout: Duration::from_secs(20),
            thinking_delay: Duration::from_secs(2),
            history_window: 20,
        }
    }
}

/// Use case for processing one inbound user message
pub struct HandleMessageUseCase {
    registry: Arc<Mutex<PersonaRegistry>>,
    gateway: Arc<dyn PersonaGateway>,
    classifier: Arc<dyn PersonaClassifier>,
    crisis: Arc<dyn CrisisDetector>,
    store: Arc<dyn ConversationStore>,
    transport: Arc<dyn Transport>,
    rng: Arc<dyn RandomSource>,
    commands: RunCommandUseCase,
    settings: OrchestratorSettings,
}

impl HandleMessageUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<Mutex<PersonaRegistry>>,
        gateway: Arc<dyn PersonaGateway>,
        classifier: Arc<dyn PersonaClassifier>,
        crisis: Arc<dyn CrisisDetector>,
        store: Arc<dyn ConversationStore>,
        transport: Arc<dyn Transport>,
        rng: Arc<dyn RandomSource>,
        settings: OrchestratorSettings,
    ) -> Self {
        let commands = RunCommandUseCase::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            Arc::clone(&transport),
        );
        Self {
            registry,
            gateway,
            classifier,
            crisis,
            store,
            transport,
            rng,
            commands,
            settings,
        }
    }

    /// Process one inbound message end to end
    pub async fn handle(
        &self,
        text: &str,
        author: &str,
        channel_id: &str,
    ) -> Result<(), HandleMessageError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        // Step 1: commands never start a persona turn
        if is_command(text) {
            return Ok(self.commands.execute(text, author, channel_id).await?);
        }

        // Step 2: crisis short-circuit
        if self.crisis.detect(text).await {
            info!("crisis flagged; delivering safety notice only");
            self.transport
                .send_system(channel_id, TurnPrompt::crisis_notice())
                .await?;
            return Ok(());
        }

        // Step 3: forced mentions
        let forced = forced_mentions(text);
        match forced.len() {
            1 => {
                let persona = forced[0];
                info!("forced mention engages isolation on {persona}");
                lock_registry(&self.registry).isolate(persona);
                self.transport
                    .send_system(
                        channel_id,
                        &format!("**Isolation mode: only {persona} will respond.**"),
                    )
                    .await?;
                // Falls through; the isolation branch below answers
            }
            n if n >= 2 => {
                return self.forced_fan_out(&forced, text, channel_id).await;
            }
            _ => {}
        }

        // Step 4: persist the user's message
        self.store.append(channel_id, author, text).await;

        // Step 5: isolation short-circuit, single responder, never merged
        let isolated = lock_registry(&self.registry).isolated_persona();
        if let Some(persona) = isolated {
            let mut turn = Turn::new(channel_id, text);
            self.generation_step(&mut turn, persona, text, "Thinking...")
                .await;
            return Ok(());
        }

        // Step 6: candidate pool = classification intersected with actives
        let active = lock_registry(&self.registry).active_set();
        let classified = self.classifier.classify(text).await;
        let mut pool: Vec<PersonaId> = classified
            .into_iter()
            .filter(|p| active.contains(p))
            .collect();
        if pool.is_empty() {
            // Fail-open: the classifier never shrinks the chorus to nothing
            pool = active;
        }
        debug!("candidate pool: {pool:?}");

        // Step 7: randomized multi-turn
        let mut turn = Turn::new(channel_id, text);

        let first = pool[self.rng.pick(pool.len())];
        let Some(first_response) = self
            .generation_step(&mut turn, first, text, "Thinking...")
            .await
        else {
            // Every later step builds on this response
            return Ok(());
        };

        let plan = plan_turns(self.rng.roll(), || self.rng.roll());
        debug!("response plan: {plan:?} ({} steps)", plan.steps());

        if plan != ResponsePlan::Single {
            self.continue_turn(&mut turn, plan, &pool, first, &first_response)
                .await;
        }

        // Step 8: Governor merge
        self.governor_merge(&turn).await;
        Ok(())
    }

    /// Steps two and three of a multi-response plan
    async fn continue_turn(
        &self,
        turn: &mut Turn,
        plan: ResponsePlan,
        pool: &[PersonaId],
        first: PersonaId,
        first_response: &str,
    ) {
        let second_pool: Vec<PersonaId> =
            pool.iter().copied().filter(|p| *p != first).collect();
        if second_pool.is_empty() {
            return;
        }
        let second = second_pool[self.rng.pick(second_pool.len())];

        let prompt = TurnPrompt::second(turn.user_text(), first_response);
        let Some(second_response) = self
            .generation_step(turn, second, &prompt, "Thinking more...")
            .await
        else {
            return;
        };

        match plan {
            ResponsePlan::TripleFollowUp => {
                let prompt = TurnPrompt::follow_up(&second_response, first);
                self.generation_step(turn, first, &prompt, "A brief follow-up...")
                    .await;
            }
            ResponsePlan::TriplePerspective => {
                let third_pool: Vec<PersonaId> = second_pool
                    .iter()
                    .copied()
                    .filter(|p| *p != second)
                    .collect();
                // No distinct third candidate: the first persona returns
                let third = if third_pool.is_empty() {
                    first
                } else {
                    third_pool[self.rng.pick(third_pool.len())]
                };
                let prompt = TurnPrompt::perspective(
                    turn.user_text(),
                    first_response,
                    &second_response,
                    third,
                );
                self.generation_step(turn, third, &prompt, "Another perspective...")
                    .await;
            }
            _ => {}
        }
    }

    /// Two or more forced personas respond concurrently to the original
    /// text, then the Governor merges whatever succeeded.
    async fn forced_fan_out(
        &self,
        forced: &[PersonaId],
        text: &str,
        channel_id: &str,
    ) -> Result<(), HandleMessageError> {
        info!("fan-out to {} forced personas", forced.len());

        let history = self
            .store
            .load(channel_id, self.settings.history_window)
            .await;

        let mut join_set = JoinSet::new();
        for persona in forced.iter().copied() {
            let gateway = Arc::clone(&self.gateway);
            let prompt = text.to_string();
            let history = history.clone();
            join_set.spawn(async move {
                let result = gateway.generate(persona, &prompt, &history).await;
                (persona, result)
            });
        }

        let indicator = self.begin_thinking(channel_id, "Thinking...").await;
        sleep(self.settings.thinking_delay).await;

        let mut turn = Turn::new(channel_id, text);
        let deadline = Instant::now() + self.settings.fanout_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, join_set.join_next()).await {
                Ok(Some(Ok((persona, Ok(raw))))) => {
                    let clean = sanitize(persona.as_str(), &raw);
                    self.store
                        .append(channel_id, persona.as_str(), &clean)
                        .await;
                    turn.record(persona, clean);
                }
                Ok(Some(Ok((persona, Err(e))))) => {
                    warn!("forced generation failed for {persona}: {e}");
                }
                Ok(Some(Err(e))) => {
                    warn!("task join error: {e}");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "fan-out timed out; proceeding with {} responses",
                        turn.responses().len()
                    );
                    join_set.abort_all();
                    break;
                }
            }
        }

        self.end_thinking(channel_id, indicator).await;

        for (persona, response) in turn.responses() {
            if let Err(e) = self
                .transport
                .send_as(persona.as_str(), channel_id, response)
                .await
            {
                warn!("delivery failed for {persona}: {e}");
            }
        }

        self.governor_merge(&turn).await;
        Ok(())
    }

    /// One sequential generation step: indicator up, generate against
    /// recent history, sanitize, persist, deliver, indicator down.
    ///
    /// Returns the sanitized response, or `None` when the backend failed
    /// (that persona simply sits the turn out).
    async fn generation_step(
        &self,
        turn: &mut Turn,
        persona: PersonaId,
        prompt: &str,
        label: &str,
    ) -> Option<String> {
        let channel_id = turn.channel_id().to_string();
        let indicator = self.begin_thinking(&channel_id, label).await;
        sleep(self.settings.thinking_delay).await;

        let history = self
            .store
            .load(&channel_id, self.settings.history_window)
            .await;
        let result = self.gateway.generate(persona, prompt, &history).await;

        self.end_thinking(&channel_id, indicator).await;

        match result {
            Ok(raw) => {
                let clean = sanitize(persona.as_str(), &raw);
                self.store
                    .append(&channel_id, persona.as_str(), &clean)
                    .await;
                if let Err(e) = self
                    .transport
                    .send_as(persona.as_str(), &channel_id, &clean)
                    .await
                {
                    warn!("delivery failed for {persona}: {e}");
                }
                turn.record(persona, clean.clone());
                Some(clean)
            }
            Err(e) => {
                warn!("generation failed for {persona}: {e}");
                None
            }
        }
    }

    /// Invoke the Governor when more than one distinct persona spoke and
    /// isolation is off. Failure is non-fatal: the individual responses
    /// are already delivered.
    async fn governor_merge(&self, turn: &Turn) {
        let isolating = lock_registry(&self.registry).is_isolating();
        if isolating || turn.distinct_responders() < 2 {
            return;
        }

        debug!(
            "governor merge over {} responses",
            turn.responses().len()
        );
        let history = self
            .store
            .load(turn.channel_id(), self.settings.history_window)
            .await;
        match self
            .gateway
            .merge(turn.responses(), turn.user_text(), &history)
            .await
        {
            Ok(text) => {
                let framed = format!("*{}*", text.trim());
                if let Err(e) = self
                    .transport
                    .send_as(PersonaId::Governor.as_str(), turn.channel_id(), &framed)
                    .await
                {
                    warn!("governor delivery failed: {e}");
                }
            }
            Err(e) => {
                warn!("governor merge failed: {e}");
            }
        }
    }

    async fn begin_thinking(&self, channel_id: &str, label: &str) -> Option<IndicatorHandle> {
        match self.transport.begin_thinking(channel_id, label).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                debug!("thinking indicator failed: {e}");
                None
            }
        }
    }

    async fn end_thinking(
        &self,
        channel_id: &str,
        indicator: Option<IndicatorHandle>,
    ) {
        if let Some(handle) = indicator {
            self.transport.end_thinking(channel_id, handle).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::gateway::GatewayError;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};

    // ==================== Test Mocks ====================

    /// Scripted gateway: pops queued results, or echoes a canned line.
    /// Records every generate and merge call.
    struct MockGateway {
        scripted: Mutex<HashMap<PersonaId, VecDeque<Result<String, GatewayError>>>>,
        stalled: Mutex<Vec<PersonaId>>,
        generate_calls: Mutex<Vec<(PersonaId, String)>>,
        merge_calls: Mutex<Vec<Vec<(PersonaId, String)>>>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                scripted: Mutex::new(HashMap::new()),
                stalled: Mutex::new(Vec::new()),
                generate_calls: Mutex::new(Vec::new()),
                merge_calls: Mutex::new(Vec::new()),
            }
        }

        fn script(self, persona: PersonaId, result: Result<&str, GatewayError>) -> Self {
            self.scripted
                .lock()
                .unwrap()
                .entry(persona)
                .or_default()
                .push_back(result.map(str::to_string));
            self
        }

        /// This persona's backend never answers
        fn stall(self, persona: PersonaId) -> Self {
            self.stalled.lock().unwrap().push(persona);
            self
        }

        fn responders(&self) -> Vec<PersonaId> {
            self.generate_calls.lock().unwrap().iter().map(|(p, _)| *p).collect()
        }
    }

    #[async_trait]
    impl PersonaGateway for MockGateway {
        async fn generate(
            &self,
            persona: PersonaId,
            prompt: &str,
            _history: &[String],
        ) -> Result<String, GatewayError> {
            self.generate_calls
                .lock()
                .unwrap()
                .push((persona, prompt.to_string()));
            let stalled = self.stalled.lock().unwrap().contains(&persona);
            if stalled {
                sleep(Duration::from_secs(3600)).await;
            }
            let scripted = self
                .scripted
                .lock()
                .unwrap()
                .get_mut(&persona)
                .and_then(VecDeque::pop_front);
            scripted.unwrap_or_else(|| Ok(format!("{persona} weighs in")))
        }

        async fn merge(
            &self,
            responses: &[(PersonaId, String)],
            _user_text: &str,
            _history: &[String],
        ) -> Result<String, GatewayError> {
            self.merge_calls.lock().unwrap().push(responses.to_vec());
            Ok("one unified view".to_string())
        }
    }

    struct MockClassifier {
        result: Vec<PersonaId>,
    }

    #[async_trait]
    impl PersonaClassifier for MockClassifier {
        async fn classify(&self, _user_text: &str) -> Vec<PersonaId> {
            self.result.clone()
        }
    }

    struct MockCrisis {
        flagged: bool,
    }

    #[async_trait]
    impl CrisisDetector for MockCrisis {
        async fn detect(&self, _user_text: &str) -> bool {
            self.flagged
        }
    }

    struct MockStore {
        lines: Mutex<HashMap<String, Vec<String>>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                lines: Mutex::new(HashMap::new()),
            }
        }

        fn lines_for(&self, channel_id: &str) -> Vec<String> {
            self.lines
                .lock()
                .unwrap()
                .get(channel_id)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ConversationStore for MockStore {
        async fn append(&self, channel_id: &str, author: &str, text: &str) {
            self.lines
                .lock()
                .unwrap()
                .entry(channel_id.to_string())
                .or_default()
                .push(format!("{author}: {text}"));
        }

        async fn load(&self, channel_id: &str, limit: usize) -> Vec<String> {
            let all = self.lines_for(channel_id);
            let start = all.len().saturating_sub(limit);
            all[start..].to_vec()
        }

        async fn clear(&self, channel_id: &str) {
            self.lines.lock().unwrap().remove(channel_id);
        }
    }

    struct MockTransport {
        sent: Mutex<Vec<(String, String)>>,
        system: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                system: Mutex::new(Vec::new()),
            }
        }

        fn sent_by(&self, speaker: &str) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(s, _)| s == speaker)
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send_as(
            &self,
            speaker: &str,
            _channel_id: &str,
            text: &str,
        ) -> Result<(), TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((speaker.to_string(), text.to_string()));
            Ok(())
        }

        async fn send_system(&self, _channel_id: &str, text: &str) -> Result<(), TransportError> {
            self.system.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn begin_thinking(
            &self,
            _channel_id: &str,
            _label: &str,
        ) -> Result<IndicatorHandle, TransportError> {
            Ok(IndicatorHandle(1))
        }

        async fn end_thinking(&self, _channel_id: &str, _handle: IndicatorHandle) {}

        async fn create_private_channel(&self, user_id: &str) -> Result<String, TransportError> {
            Ok(format!("private-{user_id}"))
        }
    }

    /// Deterministic draws: pops queued values, defaults to 0.0 / index 0
    struct FixedRandom {
        rolls: Mutex<VecDeque<f64>>,
        picks: Mutex<VecDeque<usize>>,
    }

    impl FixedRandom {
        fn new(rolls: &[f64], picks: &[usize]) -> Self {
            Self {
                rolls: Mutex::new(rolls.iter().copied().collect()),
                picks: Mutex::new(picks.iter().copied().collect()),
            }
        }
    }

    impl RandomSource for FixedRandom {
        fn roll(&self) -> f64 {
            self.rolls.lock().unwrap().pop_front().unwrap_or(0.0)
        }

        fn pick(&self, len: usize) -> usize {
            self.picks.lock().unwrap().pop_front().unwrap_or(0).min(len - 1)
        }
    }

    // ==================== Harness ====================

    struct Harness {
        use_case: HandleMessageUseCase,
        registry: Arc<Mutex<PersonaRegistry>>,
        gateway: Arc<MockGateway>,
        store: Arc<MockStore>,
        transport: Arc<MockTransport>,
    }

    fn harness(
        gateway: MockGateway,
        classified: Vec<PersonaId>,
        crisis: bool,
        rng: FixedRandom,
    ) -> Harness {
        let settings = OrchestratorSettings {
            fanout_timeout: Duration::from_secs(5),
            thinking_delay: Duration::ZERO,
            history_window: 20,
        };
        harness_with_settings(gateway, classified, crisis, rng, settings)
    }

    fn harness_with_settings(
        gateway: MockGateway,
        classified: Vec<PersonaId>,
        crisis: bool,
        rng: FixedRandom,
        settings: OrchestratorSettings,
    ) -> Harness {
        let registry = Arc::new(Mutex::new(PersonaRegistry::new()));
        let gateway = Arc::new(gateway);
        let store = Arc::new(MockStore::new());
        let transport = Arc::new(MockTransport::new());
        let use_case = HandleMessageUseCase::new(
            Arc::clone(&registry),
            Arc::clone(&gateway) as Arc<dyn PersonaGateway>,
            Arc::new(MockClassifier { result: classified }),
            Arc::new(MockCrisis { flagged: crisis }),
            Arc::clone(&store) as Arc<dyn ConversationStore>,
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::new(rng),
            settings,
        );
        Harness {
            use_case,
            registry,
            gateway,
            store,
            transport,
        }
    }

    fn all_main() -> Vec<PersonaId> {
        PersonaId::MAIN.to_vec()
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_crisis_short_circuits_everything() {
        let h = harness(MockGateway::new(), all_main(), true, FixedRandom::new(&[], &[]));
        h.use_case.handle("dark thoughts", "user", "chan").await.unwrap();

        assert_eq!(
            h.transport.system.lock().unwrap().as_slice(),
            [TurnPrompt::crisis_notice()]
        );
        assert!(h.gateway.generate_calls.lock().unwrap().is_empty());
        assert!(h.store.lines_for("chan").is_empty());
    }

    #[tokio::test]
    async fn test_command_bypasses_personas() {
        let h = harness(MockGateway::new(), all_main(), false, FixedRandom::new(&[], &[]));
        h.use_case.handle("!reset", "user", "chan").await.unwrap();

        assert!(h.gateway.generate_calls.lock().unwrap().is_empty());
        assert_eq!(
            h.transport.system.lock().unwrap().as_slice(),
            ["**All personas reset to active. Isolation mode off.**"]
        );
    }

    #[tokio::test]
    async fn test_single_forced_mention_engages_isolation() {
        let h = harness(MockGateway::new(), all_main(), false, FixedRandom::new(&[], &[]));
        h.use_case.handle("what next, @emo?", "user", "chan").await.unwrap();

        {
            let registry = lock_registry(&h.registry);
            assert!(registry.is_isolating());
            assert_eq!(registry.active_set(), vec![PersonaId::Emo]);
        }
        // Only the isolated persona answered, and nothing was merged
        assert_eq!(h.gateway.responders(), vec![PersonaId::Emo]);
        assert!(h.gateway.merge_calls.lock().unwrap().is_empty());
        assert_eq!(h.transport.sent_by("Emo").len(), 1);
    }

    #[tokio::test]
    async fn test_isolation_persists_into_later_turns() {
        let h = harness(MockGateway::new(), all_main(), false, FixedRandom::new(&[], &[]));
        h.use_case.handle("@prim only you", "user", "chan").await.unwrap();
        h.use_case.handle("and now?", "user", "chan").await.unwrap();

        assert_eq!(h.gateway.responders(), vec![PersonaId::Prim, PersonaId::Prim]);
        assert!(h.gateway.merge_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_forced_mentions_fan_out_and_merge() {
        let gateway = MockGateway::new()
            .script(PersonaId::Cyclo, Ok("Cyclo: *nods* step back first"))
            .script(PersonaId::Prim, Ok("just do it"));
        let h = harness(gateway, all_main(), false, FixedRandom::new(&[], &[]));
        h.use_case.handle("@cyclo @prim thoughts?", "user", "chan").await.unwrap();

        // Both responses sanitized and persisted; the user text is not
        // (the fan-out path bypasses step 4)
        let lines = h.store.lines_for("chan");
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"Cyclo: step back first".to_string()));
        assert!(lines.contains(&"Prim: just do it".to_string()));

        // Merge ran over exactly the two responses, delivered as Governor
        let merges = h.gateway.merge_calls.lock().unwrap();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].len(), 2);
        drop(merges);
        assert_eq!(h.transport.sent_by("Governor"), ["*one unified view*"]);
    }

    #[tokio::test]
    async fn test_fan_out_partial_failure_skips_merge() {
        let gateway = MockGateway::new()
            .script(PersonaId::Cyclo, Err(GatewayError::Timeout))
            .script(PersonaId::Spri, Ok("stay centered"));
        let h = harness(gateway, all_main(), false, FixedRandom::new(&[], &[]));
        h.use_case.handle("@cyclo @spri ?", "user", "chan").await.unwrap();

        // One success: delivered, but a single responder never merges
        assert_eq!(h.transport.sent_by("Spri"), ["stay centered"]);
        assert!(h.gateway.merge_calls.lock().unwrap().is_empty());
        assert!(h.transport.sent_by("Governor").is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_deadline_proceeds_with_completed_responses() {
        let gateway = MockGateway::new()
            .script(PersonaId::Emo, Ok("Emo here"))
            .stall(PersonaId::Cyclo);
        let settings = OrchestratorSettings {
            fanout_timeout: Duration::from_millis(200),
            thinking_delay: Duration::ZERO,
            history_window: 20,
        };
        let h = harness_with_settings(
            gateway,
            all_main(),
            false,
            FixedRandom::new(&[], &[]),
            settings,
        );
        h.use_case
            .handle("@cyclo @emo still there?", "user", "chan")
            .await
            .unwrap();

        // The hung persona is abandoned at the deadline; the completed one
        // is still delivered and persisted
        assert_eq!(h.transport.sent_by("Emo"), ["Emo here"]);
        assert!(h.transport.sent_by("Cyclo").is_empty());
        assert_eq!(h.store.lines_for("chan"), ["Emo: Emo here"]);

        // One responder, so no merge
        assert!(h.gateway.merge_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_plan_runs_one_persona_no_merge() {
        // flow roll 0.2 -> single; pick 0 -> Cyclo
        let h = harness(
            MockGateway::new(),
            all_main(),
            false,
            FixedRandom::new(&[0.2], &[0]),
        );
        h.use_case.handle("hello there", "user", "chan").await.unwrap();

        assert_eq!(h.gateway.responders(), vec![PersonaId::Cyclo]);
        assert!(h.gateway.merge_calls.lock().unwrap().is_empty());

        // User message persisted before the response
        let lines = h.store.lines_for("chan");
        assert_eq!(lines[0], "user: hello there");
    }

    #[tokio::test]
    async fn test_pair_plan_merges_two_voices() {
        // flow roll 0.4 -> pair; picks: Cyclo then Emo
        let h = harness(
            MockGateway::new(),
            all_main(),
            false,
            FixedRandom::new(&[0.4], &[0, 0]),
        );
        h.use_case.handle("big decision ahead", "user", "chan").await.unwrap();

        assert_eq!(h.gateway.responders(), vec![PersonaId::Cyclo, PersonaId::Emo]);

        // Second prompt chains the first response
        let calls = h.gateway.generate_calls.lock().unwrap();
        assert!(calls[1].1.contains("The first response was:"));
        drop(calls);

        assert_eq!(h.gateway.merge_calls.lock().unwrap().len(), 1);
        assert_eq!(h.transport.sent_by("Governor"), ["*one unified view*"]);
    }

    #[tokio::test]
    async fn test_triple_follow_up_reuses_first_persona() {
        // flow 0.6, follow 0.2 -> A,B,A
        let h = harness(
            MockGateway::new(),
            all_main(),
            false,
            FixedRandom::new(&[0.6, 0.2], &[0, 0]),
        );
        h.use_case.handle("untangle this", "user", "chan").await.unwrap();

        assert_eq!(
            h.gateway.responders(),
            vec![PersonaId::Cyclo, PersonaId::Emo, PersonaId::Cyclo]
        );
        let calls = h.gateway.generate_calls.lock().unwrap();
        assert!(calls[2].1.contains("short final follow-up, Cyclo"));
    }

    #[tokio::test]
    async fn test_triple_perspective_without_third_candidate_reuses_first() {
        // Only two candidates are active; flow 0.7, follow 0.9 -> A,B,C
        // but no distinct C exists, so A returns
        let h = harness(
            MockGateway::new(),
            all_main(),
            false,
            FixedRandom::new(&[0.7, 0.9], &[0, 0]),
        );
        {
            let mut registry = lock_registry(&h.registry);
            registry.deactivate(PersonaId::Prim);
            registry.deactivate(PersonaId::Spri);
        }
        h.use_case.handle("one more angle?", "user", "chan").await.unwrap();

        assert_eq!(
            h.gateway.responders(),
            vec![PersonaId::Cyclo, PersonaId::Emo, PersonaId::Cyclo]
        );
        let calls = h.gateway.generate_calls.lock().unwrap();
        assert!(calls[2].1.contains("unique perspective, Cyclo"));
        drop(calls);
        // Two distinct voices spoke, so the merge still runs
        assert_eq!(h.gateway.merge_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_classifier_intersection_fails_open_to_active_set() {
        // Classifier only proposes Cyclo, but Cyclo is deactivated:
        // the pool falls back to the remaining active personas
        let h = harness(
            MockGateway::new(),
            vec![PersonaId::Cyclo],
            false,
            FixedRandom::new(&[0.1], &[0]),
        );
        lock_registry(&h.registry).deactivate(PersonaId::Cyclo);
        h.use_case.handle("anyone?", "user", "chan").await.unwrap();

        assert_eq!(h.gateway.responders(), vec![PersonaId::Emo]);
    }

    #[tokio::test]
    async fn test_failed_second_step_keeps_first_response_and_skips_merge() {
        let gateway = MockGateway::new().script(PersonaId::Emo, Err(GatewayError::Timeout));
        // flow 0.4 -> pair; picks Cyclo then Emo
        let h = harness(gateway, all_main(), false, FixedRandom::new(&[0.4], &[0, 0]));
        h.use_case.handle("tricky one", "user", "chan").await.unwrap();

        assert_eq!(h.transport.sent_by("Cyclo").len(), 1);
        assert!(h.transport.sent_by("Emo").is_empty());
        assert!(h.gateway.merge_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_responses_are_sanitized_before_persistence() {
        let gateway = MockGateway::new().script(PersonaId::Cyclo, Ok("*pauses* cyclo: here it is"));
        let h = harness(gateway, all_main(), false, FixedRandom::new(&[0.1], &[0]));
        h.use_case.handle("go", "user", "chan").await.unwrap();

        let lines = h.store.lines_for("chan");
        assert_eq!(lines, ["user: go", "Cyclo: here it is"]);
        assert_eq!(h.transport.sent_by("Cyclo"), ["here it is"]);
    }
}
