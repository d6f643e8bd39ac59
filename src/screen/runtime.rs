use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::action::Action;
use super::effects::{DataEffects, Effect};
use super::reducer::reduce;
use super::state::{ScreenSnapshot, ScreenState};

/// Pause between drain passes while effects are still running
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Screen runtime - owns the state and executes effects
///
/// The Runtime is responsible for:
/// - Holding the screen state
/// - Dispatching actions through the reducer
/// - Executing side effects asynchronously and feeding their actions back
pub struct Runtime {
    /// Current screen state
    state: ScreenState,

    /// Channel for dispatching actions
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,

    /// Channel for queuing effects
    effect_tx: mpsc::UnboundedSender<Effect>,

    /// Data effects handler
    data_effects: Arc<DataEffects>,

    /// Effects queued or running whose action has not been sent yet
    in_flight: Arc<AtomicUsize>,
}

impl Runtime {
    /// Create a new runtime; must be called from within a tokio runtime
    pub fn new(initial_state: ScreenState, data_effects: Arc<DataEffects>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (effect_tx, mut effect_rx) = mpsc::unbounded_channel();
        let in_flight = Arc::new(AtomicUsize::new(0));

        // Spawn effect executor task
        let action_tx_clone = action_tx.clone();
        let in_flight_clone = in_flight.clone();
        tokio::spawn(async move {
            Self::run_effect_executor(&mut effect_rx, action_tx_clone, in_flight_clone).await;
        });

        Self {
            state: initial_state,
            action_tx,
            action_rx,
            effect_tx,
            data_effects,
            in_flight,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// What the rendering layer should show right now
    pub fn snapshot(&self) -> ScreenSnapshot {
        self.state.snapshot()
    }

    /// Dispatch an action to be processed by the reducer
    ///
    /// Uses mem::take to avoid cloning ScreenState.
    pub fn dispatch(&mut self, action: Action) {
        trace!("ACTION: Dispatching {:?}", action);
        let state = std::mem::take(&mut self.state);
        let (new_state, effect) = reduce(state, action);
        self.state = new_state;
        self.execute_effect(effect);
    }

    /// Turn descriptive effects into async work and queue it
    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::None => {
                // Nothing to do
            }
            Effect::Fetch(request, slice) => {
                debug!("EFFECT: Fetching {} for game {}", slice, request.id);
                self.queue(self.data_effects.fetch(request, slice));
            }
            Effect::Refetch(request, slice) => {
                debug!("EFFECT: Refetching {} for game {}", slice, request.id);
                self.queue(self.data_effects.refetch(request, slice));
            }
            Effect::LoadPreferences(game_id) => {
                debug!("EFFECT: Loading preferences for game {}", game_id);
                self.queue(self.data_effects.load_preferences(game_id));
            }
            Effect::SaveResumeMarker(game_id, index) => {
                debug!("EFFECT: Saving resume marker {} for game {}", index, game_id);
                self.queue(self.data_effects.persist_marker(game_id, Some(index)));
            }
            Effect::ClearResumeMarker(game_id) => {
                debug!("EFFECT: Clearing resume marker for game {}", game_id);
                self.queue(self.data_effects.persist_marker(game_id, None));
            }
            Effect::SaveSocialOptIn(game_id, opt_in) => {
                debug!("EFFECT: Saving social opt-in {} for game {}", opt_in, game_id);
                self.queue(self.data_effects.save_social_opt_in(game_id, opt_in));
            }
            Effect::Batch(effects) => {
                for e in effects {
                    self.execute_effect(e);
                }
            }
            Effect::Action(_) | Effect::Async(_) => {
                trace!("ACTION: Queueing effect for async execution");
                self.queue(effect);
            }
        }
    }

    fn queue(&self, effect: Effect) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.effect_tx.send(effect).is_err() {
            warn!("EFFECT: Executor is gone; dropping effect");
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Process all pending actions in the queue
    ///
    /// Returns the number of actions processed
    pub fn process_actions(&mut self) -> usize {
        let mut count = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            self.dispatch(action);
            count += 1;
        }
        count
    }

    /// Drain actions until no effect is outstanding or `max_wait` passes
    ///
    /// Returns the number of actions processed
    pub async fn run_until_idle(&mut self, max_wait: Duration) -> usize {
        let start = tokio::time::Instant::now();
        let mut total = 0;
        loop {
            // Read before draining: a task sends its action before it leaves
            // the count, so zero here means the drain below sees everything
            let outstanding = self.in_flight.load(Ordering::SeqCst);
            let processed = self.process_actions();
            total += processed;
            if outstanding == 0 && processed == 0 {
                break;
            }
            if start.elapsed() >= max_wait {
                warn!(
                    "ACTION: Still {} effects in flight after {:?}",
                    self.in_flight.load(Ordering::SeqCst),
                    max_wait
                );
                break;
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
        total
    }

    /// Get a sender for dispatching actions from external sources
    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Execute effects asynchronously
    ///
    /// Runs in its own tokio task. Only `Action` and `Async` effects reach
    /// this channel; descriptive effects are converted by `execute_effect`.
    async fn run_effect_executor(
        effect_rx: &mut mpsc::UnboundedReceiver<Effect>,
        action_tx: mpsc::UnboundedSender<Action>,
        in_flight: Arc<AtomicUsize>,
    ) {
        while let Some(effect) = effect_rx.recv().await {
            Self::process_effect_async(effect, &action_tx, &in_flight);
        }
    }

    /// Process a single effect in the async executor
    fn process_effect_async(
        effect: Effect,
        action_tx: &mpsc::UnboundedSender<Action>,
        in_flight: &Arc<AtomicUsize>,
    ) {
        match effect {
            Effect::Action(action) => {
                let _ = action_tx.send(action);
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            Effect::Async(future) => {
                let action_tx = action_tx.clone();
                let in_flight = in_flight.clone();
                tokio::spawn(async move {
                    let action = future.await;
                    let _ = action_tx.send(action);
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                });
            }
            other => {
                warn!("EFFECT: {:?} reached the async executor unconverted", other);
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}
