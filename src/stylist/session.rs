//! Styling session state machine.
//!
//! One dispatcher task owns the single [`StylingSnapshot`]. User actions
//! and network completions all arrive as commands on one unbounded queue,
//! so mutations are serialized without locks; every change publishes a
//! whole replacement snapshot through a watch channel.
//!
//! Each outstanding network task carries the generation it was spawned
//! under. Reset and re-upload bump the generation, so completions that
//! arrive late for a session that no longer exists are discarded instead
//! of leaking into the new one.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use super::backend::StylistBackend;
use super::events::StylistEvent;
use super::model::{ImageData, ItemAnalysis, OutfitSuggestion, StylingSnapshot, OUTFIT_SLOTS};
use crate::error::StylistError;

/// Commands consumed by the dispatcher. User actions come from the
/// [`SessionHandle`]; the `*Resolved` variants are posted back by spawned
/// network tasks.
enum SessionCommand {
    Upload {
        image: ImageData,
    },
    RequestEdit {
        slot: usize,
        instruction: String,
    },
    Reset,
    AnalysisResolved {
        generation: u64,
        outcome: Result<ItemAnalysis, StylistError>,
    },
    PlanResolved {
        generation: u64,
        outcome: Result<Vec<OutfitSuggestion>, StylistError>,
    },
    VisualResolved {
        generation: u64,
        slot: usize,
        outcome: Result<ImageData, StylistError>,
    },
    EditResolved {
        generation: u64,
        slot: usize,
        outcome: Result<ImageData, StylistError>,
    },
}

/// Handle to a running styling session.
///
/// Cheap to clone. Commands are fire-and-forget; observe results through
/// [`SessionHandle::subscribe`] or the event channel supplied at spawn.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    snapshot_rx: watch::Receiver<StylingSnapshot>,
}

impl SessionHandle {
    /// Start a new session from an uploaded photo. Acts as an implicit
    /// reset when a session is already active.
    pub fn upload(&self, image: ImageData) {
        let _ = self.command_tx.send(SessionCommand::Upload { image });
    }

    /// Request an edit of one slot's visual. Ignored unless that slot
    /// currently has an image.
    pub fn request_edit(&self, slot: usize, instruction: impl Into<String>) {
        let _ = self.command_tx.send(SessionCommand::RequestEdit {
            slot,
            instruction: instruction.into(),
        });
    }

    /// Discard the session entirely.
    pub fn reset(&self) {
        let _ = self.command_tx.send(SessionCommand::Reset);
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> StylingSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<StylingSnapshot> {
        self.snapshot_rx.clone()
    }
}

/// Spawn the session dispatcher and return a handle to it.
///
/// Events are best-effort: if the receiver is dropped, the session keeps
/// running and sends are silently discarded.
pub fn spawn_session(
    backend: Arc<dyn StylistBackend>,
    event_tx: mpsc::UnboundedSender<StylistEvent>,
) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(StylingSnapshot::default());

    let dispatcher = Dispatcher {
        backend,
        event_tx,
        command_tx: command_tx.clone(),
        snapshot_tx,
        snapshot: StylingSnapshot::default(),
        generation: 0,
        pending_visuals: 0,
    };
    tokio::spawn(dispatcher.run(command_rx));

    SessionHandle {
        command_tx,
        snapshot_rx,
    }
}

struct Dispatcher {
    backend: Arc<dyn StylistBackend>,
    event_tx: mpsc::UnboundedSender<StylistEvent>,
    /// Completions post back through the same queue as user actions
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    snapshot_tx: watch::Sender<StylingSnapshot>,
    snapshot: StylingSnapshot,
    /// Bumped on every upload and reset; stale completions are discarded
    generation: u64,
    /// Synthesis calls not yet resolved for the current generation
    pending_visuals: usize,
}

impl Dispatcher {
    async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<SessionCommand>) {
        while let Some(command) = command_rx.recv().await {
            self.handle(command);
        }
        debug!("session handle dropped, dispatcher exiting");
    }

    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Upload { image } => self.on_upload(image),
            SessionCommand::Reset => self.on_reset(),
            SessionCommand::RequestEdit { slot, instruction } => {
                self.on_request_edit(slot, instruction)
            }
            SessionCommand::AnalysisResolved {
                generation,
                outcome,
            } => {
                if !self.is_stale(generation) {
                    self.on_analysis_resolved(outcome);
                }
            }
            SessionCommand::PlanResolved {
                generation,
                outcome,
            } => {
                if !self.is_stale(generation) {
                    self.on_plan_resolved(outcome);
                }
            }
            SessionCommand::VisualResolved {
                generation,
                slot,
                outcome,
            } => {
                if !self.is_stale(generation) {
                    self.on_visual_resolved(slot, outcome);
                }
            }
            SessionCommand::EditResolved {
                generation,
                slot,
                outcome,
            } => {
                if !self.is_stale(generation) {
                    self.on_edit_resolved(slot, outcome);
                }
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                "discarding completion for a prior session"
            );
            return true;
        }
        false
    }

    fn publish(&self) {
        let _ = self.snapshot_tx.send(self.snapshot.clone());
    }

    fn emit(&self, event: StylistEvent) {
        let _ = self.event_tx.send(event);
    }

    fn on_upload(&mut self, image: ImageData) {
        self.generation += 1;
        self.pending_visuals = 0;
        self.snapshot = StylingSnapshot {
            source_image: Some(image.clone()),
            analyzing: true,
            started_at: Some(Utc::now()),
            ..StylingSnapshot::default()
        };
        self.publish();

        let session_id = uuid::Uuid::new_v4().to_string();
        debug!(%session_id, generation = self.generation, "session started");
        self.emit(StylistEvent::UploadAccepted { session_id });

        let backend = Arc::clone(&self.backend);
        let command_tx = self.command_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let outcome = backend.analyze_item(&image).await;
            let _ = command_tx.send(SessionCommand::AnalysisResolved {
                generation,
                outcome,
            });
        });
    }

    fn on_analysis_resolved(&mut self, outcome: Result<ItemAnalysis, StylistError>) {
        let analysis = match outcome {
            Ok(analysis) => analysis,
            Err(err) => return self.fail_session(err),
        };

        self.snapshot.analysis = Some(analysis.clone());
        self.snapshot.analyzing = false;
        self.publish();
        self.emit(StylistEvent::AnalysisCompleted {
            analysis: analysis.clone(),
        });

        // Planning is strictly sequential after analysis: its prompt
        // embeds the analysis result.
        let backend = Arc::clone(&self.backend);
        let command_tx = self.command_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let outcome = backend.plan_outfits(&analysis).await;
            let _ = command_tx.send(SessionCommand::PlanResolved {
                generation,
                outcome,
            });
        });
    }

    fn on_plan_resolved(&mut self, outcome: Result<Vec<OutfitSuggestion>, StylistError>) {
        let outfits = match outcome {
            Ok(outfits) => outfits,
            Err(err) => return self.fail_session(err),
        };

        // The planner client already enforces the slot count; re-check so
        // the invariant holds for any backend implementation.
        if outfits.len() != OUTFIT_SLOTS {
            return self.fail_session(StylistError::Planning(genai_rest::GenAiError::Parse(
                format!("backend returned {} outfit slots", outfits.len()),
            )));
        }

        let analysis = match self.snapshot.analysis.clone() {
            Some(analysis) => analysis,
            None => {
                // Unreachable through normal flow; planning only starts
                // after analysis lands in the snapshot.
                warn!("plan resolved without an analysis in the snapshot");
                return;
            }
        };

        self.snapshot.outfits = outfits.clone();
        self.snapshot.synthesizing = true;
        self.pending_visuals = OUTFIT_SLOTS;
        self.publish();
        self.emit(StylistEvent::OutfitsPlanned {
            count: outfits.len(),
        });

        // Fan out: one synthesis task per slot, each keyed by its index.
        // Completion order across slots is unconstrained.
        for (slot, outfit) in outfits.into_iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let command_tx = self.command_tx.clone();
            let generation = self.generation;
            let analysis = analysis.clone();
            tokio::spawn(async move {
                let outcome = backend.synthesize_visual(&analysis, &outfit).await;
                let _ = command_tx.send(SessionCommand::VisualResolved {
                    generation,
                    slot,
                    outcome,
                });
            });
        }
    }

    fn on_visual_resolved(&mut self, slot: usize, outcome: Result<ImageData, StylistError>) {
        match outcome {
            Ok(image) => {
                if let Some(outfit) = self.snapshot.outfits.get_mut(slot) {
                    outfit.image_url = Some(image.to_data_url());
                    self.emit(StylistEvent::VisualReady { slot });
                } else {
                    warn!(slot, "visual resolved for an unknown slot");
                }
            }
            Err(err) => {
                // Non-fatal: the slot stays without an image and the
                // session-level error stays unset.
                warn!(slot, error = %err, "outfit visual failed");
                self.emit(StylistEvent::VisualFailed {
                    slot,
                    message: err.to_string(),
                });
            }
        }

        self.pending_visuals = self.pending_visuals.saturating_sub(1);
        if self.pending_visuals == 0 {
            self.snapshot.synthesizing = false;
            self.emit(StylistEvent::VisualsSettled);
        }
        self.publish();
    }

    fn on_request_edit(&mut self, slot: usize, instruction: String) {
        let image_url = match self
            .snapshot
            .outfits
            .get(slot)
            .and_then(|outfit| outfit.image_url.clone())
        {
            Some(image_url) => image_url,
            None => {
                warn!(slot, "edit requested for a slot without a visual");
                self.emit(StylistEvent::EditFailed {
                    slot,
                    message: "no visual to refine".to_string(),
                });
                return;
            }
        };

        let backend = Arc::clone(&self.backend);
        let command_tx = self.command_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let outcome = backend.edit_visual(&image_url, &instruction).await;
            let _ = command_tx.send(SessionCommand::EditResolved {
                generation,
                slot,
                outcome,
            });
        });
    }

    fn on_edit_resolved(&mut self, slot: usize, outcome: Result<ImageData, StylistError>) {
        match outcome {
            Ok(image) => {
                if let Some(outfit) = self.snapshot.outfits.get_mut(slot) {
                    outfit.image_url = Some(image.to_data_url());
                    self.publish();
                    self.emit(StylistEvent::EditApplied { slot });
                }
            }
            Err(err) => {
                // The prior visual is preserved untouched.
                warn!(slot, error = %err, "edit failed");
                self.emit(StylistEvent::EditFailed {
                    slot,
                    message: err.to_string(),
                });
            }
        }
    }

    fn on_reset(&mut self) {
        self.generation += 1;
        self.pending_visuals = 0;
        self.snapshot = StylingSnapshot::default();
        self.publish();
        self.emit(StylistEvent::SessionCleared);
    }

    /// Fatal failure: surface one user-facing message, clear both phase
    /// flags and any planned outfits in a single snapshot replacement.
    fn fail_session(&mut self, err: StylistError) {
        error!(error = %err, "session failed");
        let message = err.user_message().to_string();
        self.pending_visuals = 0;
        self.snapshot.analyzing = false;
        self.snapshot.synthesizing = false;
        self.snapshot.outfits.clear();
        self.snapshot.error = Some(message.clone());
        self.publish();

        match err {
            StylistError::Analysis(_) => self.emit(StylistEvent::AnalysisFailed { message }),
            _ => self.emit(StylistEvent::PlanningFailed { message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use genai_rest::GenAiError;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::stylist::model::OutfitCategory;

    fn sample_analysis() -> ItemAnalysis {
        ItemAnalysis {
            garment_type: "Silk Scarf".to_string(),
            color_palette: vec!["#eee0d2".to_string(), "#2b2b2b".to_string()],
            style: "Minimalist".to_string(),
            description: "A lightweight silk scarf with a painterly abstract print.".to_string(),
        }
    }

    fn sample_image() -> ImageData {
        ImageData::new("image/png", "dXBsb2Fk")
    }

    /// Scripted backend: failures and completion gates are configured per
    /// test so interleavings are deterministic.
    #[derive(Default)]
    struct MockBackend {
        fail_analysis: bool,
        fail_planning: bool,
        fail_edits: bool,
        /// Number of outfits the planner returns (3 unless scripted)
        plan_count: Option<usize>,
        /// Outfit descriptions whose synthesis fails
        failing_visuals: Vec<String>,
        /// Analysis acquires a permit before resolving (start closed)
        analysis_gate: Option<Arc<Semaphore>>,
        /// Synthesis acquires a permit from the gate keyed by outfit
        /// description
        visual_gates: HashMap<String, Arc<Semaphore>>,
        analyze_calls: AtomicUsize,
        plan_calls: AtomicUsize,
    }

    impl MockBackend {
        fn planned_outfits(count: usize) -> Vec<OutfitSuggestion> {
            (0..count)
                .map(|slot| OutfitSuggestion {
                    category: OutfitCategory::ALL.get(slot).copied(),
                    description: format!("look-{slot}"),
                    pieces: vec![format!("piece-{slot}")],
                    image_url: None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl StylistBackend for MockBackend {
        async fn analyze_item(&self, _image: &ImageData) -> Result<ItemAnalysis, StylistError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.analysis_gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            if self.fail_analysis {
                return Err(StylistError::Analysis(GenAiError::Parse(
                    "scripted analysis failure".to_string(),
                )));
            }
            Ok(sample_analysis())
        }

        async fn plan_outfits(
            &self,
            _analysis: &ItemAnalysis,
        ) -> Result<Vec<OutfitSuggestion>, StylistError> {
            self.plan_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_planning {
                return Err(StylistError::Planning(GenAiError::Parse(
                    "scripted planning failure".to_string(),
                )));
            }
            Ok(Self::planned_outfits(self.plan_count.unwrap_or(OUTFIT_SLOTS)))
        }

        async fn synthesize_visual(
            &self,
            _analysis: &ItemAnalysis,
            outfit: &OutfitSuggestion,
        ) -> Result<ImageData, StylistError> {
            if let Some(gate) = self.visual_gates.get(&outfit.description) {
                gate.acquire().await.expect("gate closed").forget();
            }
            if self.failing_visuals.contains(&outfit.description) {
                return Err(StylistError::Synthesis(GenAiError::NoImagePayload));
            }
            Ok(ImageData::new("image/png", format!("img-{}", outfit.description)))
        }

        async fn edit_visual(
            &self,
            _image_url: &str,
            instruction: &str,
        ) -> Result<ImageData, StylistError> {
            if self.fail_edits {
                return Err(StylistError::Edit(GenAiError::NoImagePayload));
            }
            Ok(ImageData::new("image/png", format!("edited-{instruction}")))
        }
    }

    struct TestSession {
        backend: Arc<MockBackend>,
        handle: SessionHandle,
        events: mpsc::UnboundedReceiver<StylistEvent>,
    }

    fn start(backend: MockBackend) -> TestSession {
        let backend = Arc::new(backend);
        let (event_tx, events) = mpsc::unbounded_channel();
        let handle = spawn_session(backend.clone() as Arc<dyn StylistBackend>, event_tx);
        TestSession {
            backend,
            handle,
            events,
        }
    }

    async fn wait_for(
        handle: &SessionHandle,
        predicate: impl FnMut(&StylingSnapshot) -> bool,
    ) -> StylingSnapshot {
        let mut rx = handle.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("timed out waiting for snapshot")
            .expect("session dispatcher exited")
            .clone();
        snapshot
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<StylistEvent>) -> StylistEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn upload_runs_analysis_planning_then_concurrent_synthesis() {
        let mut session = start(MockBackend::default());
        session.handle.upload(sample_image());

        let snapshot = wait_for(&session.handle, |s| s.is_ready() && !s.synthesizing).await;

        assert_eq!(snapshot.analysis, Some(sample_analysis()));
        assert_eq!(snapshot.outfits.len(), OUTFIT_SLOTS);
        for (slot, outfit) in snapshot.outfits.iter().enumerate() {
            let url = outfit.image_url.as_deref().unwrap();
            assert!(url.contains(&format!("img-look-{slot}")), "slot {slot} got {url}");
        }
        assert!(!snapshot.analyzing);
        assert!(snapshot.error.is_none());
        assert!(snapshot.started_at.is_some());

        // Exactly one analyzer call preceded exactly one planner call
        assert_eq!(session.backend.analyze_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.backend.plan_calls.load(Ordering::SeqCst), 1);

        // Event stream covers the whole flow
        assert!(matches!(
            next_event(&mut session.events).await,
            StylistEvent::UploadAccepted { .. }
        ));
        assert!(matches!(
            next_event(&mut session.events).await,
            StylistEvent::AnalysisCompleted { .. }
        ));
        assert!(matches!(
            next_event(&mut session.events).await,
            StylistEvent::OutfitsPlanned { count: 3 }
        ));
        let mut ready_slots = Vec::new();
        loop {
            match next_event(&mut session.events).await {
                StylistEvent::VisualReady { slot } => ready_slots.push(slot),
                StylistEvent::VisualsSettled => break,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        ready_slots.sort_unstable();
        assert_eq!(ready_slots, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn analysis_failure_is_fatal_and_planner_never_runs() {
        let session = start(MockBackend {
            fail_analysis: true,
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());

        let snapshot = wait_for(&session.handle, |s| s.error.is_some()).await;
        assert!(!snapshot.analyzing);
        assert!(!snapshot.synthesizing);
        assert!(snapshot.outfits.is_empty());
        assert!(snapshot.analysis.is_none());

        // Give any wrongly-spawned planner task a chance to run
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.backend.plan_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn planning_failure_is_fatal() {
        let session = start(MockBackend {
            fail_planning: true,
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());

        let snapshot = wait_for(&session.handle, |s| s.error.is_some()).await;
        assert!(snapshot.outfits.is_empty());
        assert!(!snapshot.synthesizing);
        // The analysis itself succeeded before planning failed
        assert!(snapshot.analysis.is_some());
    }

    #[tokio::test]
    async fn wrong_slot_count_from_backend_is_a_planning_failure() {
        let session = start(MockBackend {
            plan_count: Some(2),
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());

        let snapshot = wait_for(&session.handle, |s| s.error.is_some()).await;
        assert!(snapshot.outfits.is_empty());
    }

    #[tokio::test]
    async fn visual_completion_updates_only_its_own_slot() {
        let gate_0 = Arc::new(Semaphore::new(0));
        let gate_2 = Arc::new(Semaphore::new(0));
        let mut visual_gates = HashMap::new();
        visual_gates.insert("look-0".to_string(), gate_0.clone());
        visual_gates.insert("look-2".to_string(), gate_2.clone());

        let session = start(MockBackend {
            visual_gates,
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());

        // Only slot 1 is ungated; wait for exactly its completion
        let snapshot = wait_for(&session.handle, |s| {
            s.outfits.len() == OUTFIT_SLOTS && s.outfits[1].image_url.is_some()
        })
        .await;
        assert!(snapshot.outfits[0].image_url.is_none());
        assert!(snapshot.outfits[2].image_url.is_none());
        assert_eq!(snapshot.outfits[0].description, "look-0");
        assert_eq!(snapshot.outfits[2].description, "look-2");
        assert!(snapshot.synthesizing);

        gate_0.add_permits(1);
        gate_2.add_permits(1);
        let snapshot = wait_for(&session.handle, |s| s.is_ready() && !s.synthesizing).await;
        assert_eq!(snapshot.outfits.len(), OUTFIT_SLOTS);
    }

    #[tokio::test]
    async fn failed_visual_leaves_slot_empty_and_session_error_unset() {
        let session = start(MockBackend {
            failing_visuals: vec!["look-1".to_string()],
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());

        let snapshot = wait_for(&session.handle, |s| {
            !s.outfits.is_empty() && !s.synthesizing
        })
        .await;
        assert!(snapshot.outfits[0].image_url.is_some());
        assert!(snapshot.outfits[1].image_url.is_none());
        assert!(snapshot.outfits[2].image_url.is_some());
        assert!(snapshot.error.is_none());
        assert!(!snapshot.is_ready());
    }

    #[tokio::test]
    async fn edit_replaces_only_the_target_slot() {
        let session = start(MockBackend::default());
        session.handle.upload(sample_image());
        let before = wait_for(&session.handle, |s| s.is_ready()).await;

        session.handle.request_edit(1, "add a retro film filter");
        let after = wait_for(&session.handle, |s| {
            s.outfits[1].image_url != before.outfits[1].image_url
        })
        .await;

        assert!(after.outfits[1]
            .image_url
            .as_deref()
            .unwrap()
            .contains("edited-add a retro film filter"));
        assert_eq!(after.outfits[0], before.outfits[0]);
        assert_eq!(after.outfits[2], before.outfits[2]);
    }

    #[tokio::test]
    async fn failed_edit_preserves_the_prior_visual() {
        let mut session = start(MockBackend {
            fail_edits: true,
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());
        let before = wait_for(&session.handle, |s| s.is_ready()).await;

        session.handle.request_edit(1, "make it moodier");
        loop {
            match next_event(&mut session.events).await {
                StylistEvent::EditFailed { slot, .. } => {
                    assert_eq!(slot, 1);
                    break;
                }
                StylistEvent::EditApplied { .. } => panic!("edit should have failed"),
                _ => continue,
            }
        }

        let after = session.handle.snapshot();
        assert_eq!(after.outfits, before.outfits);
        assert!(after.error.is_none());
    }

    #[tokio::test]
    async fn edit_without_an_image_is_rejected_without_state_changes() {
        let mut session = start(MockBackend::default());
        session.handle.request_edit(0, "nothing to edit yet");

        assert!(matches!(
            next_event(&mut session.events).await,
            StylistEvent::EditFailed { slot: 0, .. }
        ));
        assert_eq!(session.handle.snapshot(), StylingSnapshot::default());
    }

    #[tokio::test]
    async fn reset_clears_everything_even_mid_synthesis() {
        let gate = Arc::new(Semaphore::new(0));
        let mut visual_gates = HashMap::new();
        for slot in 0..OUTFIT_SLOTS {
            visual_gates.insert(format!("look-{slot}"), gate.clone());
        }
        let session = start(MockBackend {
            visual_gates,
            ..MockBackend::default()
        });
        session.handle.upload(sample_image());
        wait_for(&session.handle, |s| s.synthesizing).await;

        session.handle.reset();
        let snapshot = wait_for(&session.handle, |s| s.source_image.is_none()).await;
        assert_eq!(snapshot, StylingSnapshot::default());

        // Release the in-flight synthesis tasks; their completions target
        // a dead generation and must not resurrect any state
        gate.add_permits(OUTFIT_SLOTS);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.handle.snapshot(), StylingSnapshot::default());
    }

    #[tokio::test]
    async fn stale_analysis_after_reset_is_discarded() {
        let gate = Arc::new(Semaphore::new(0));
        let session = start(MockBackend {
            analysis_gate: Some(gate.clone()),
            ..MockBackend::default()
        });

        session.handle.upload(sample_image());
        wait_for(&session.handle, |s| s.analyzing).await;
        session.handle.reset();
        wait_for(&session.handle, |s| s.source_image.is_none()).await;

        // Resolve the stale analyzer call; the session must remain empty
        gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let snapshot = session.handle.snapshot();
        assert_eq!(snapshot, StylingSnapshot::default());
        assert!(snapshot.analysis.is_none());
        assert_eq!(session.backend.plan_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn re_upload_discards_the_prior_generation() {
        let gate = Arc::new(Semaphore::new(0));
        let session = start(MockBackend {
            analysis_gate: Some(gate.clone()),
            ..MockBackend::default()
        });

        session.handle.upload(sample_image());
        wait_for(&session.handle, |s| s.analyzing).await;

        // Second upload supersedes the first; both gated analyzer calls
        // get released
        session.handle.upload(ImageData::new("image/jpeg", "c2Vjb25k"));
        gate.add_permits(2);

        let snapshot = wait_for(&session.handle, |s| s.is_ready()).await;
        assert_eq!(
            snapshot.source_image,
            Some(ImageData::new("image/jpeg", "c2Vjb25k"))
        );
        // Only the second generation's pipeline ran to completion
        assert_eq!(session.backend.analyze_calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.backend.plan_calls.load(Ordering::SeqCst), 1);
    }
}
