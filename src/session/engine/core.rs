//! Session engine: single owner of the active session and the history archive.

use std::collections::HashMap;
use std::iter;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::llm::GenerationClient;
use crate::session::core::config::AssistantConfig;
use crate::session::core::ids::{CallId, SessionId};
use crate::session::core::message::{Message, Session};
use crate::session::engine::snapshot::{EngineSnapshot, SendOutcome};
use crate::session::goal::announce_goal;
use crate::session::storage::durable_store::{DurableStore, load_or_default};
use crate::session::storage::persist_worker::PersistWorker;
use crate::session::timer::{
    StudyTimer, TIMER_STARTED_TEXT, TickControl, Ticker, TimerTransition, session_ended_text,
};

/// Timer resolution.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Characters kept in history previews.
pub const PREVIEW_CHARS: usize = 80;

struct EngineState {
    active: Session,
    history: Vec<Session>,
    /// Pending sends, keyed by call, valued by the session they were issued against.
    in_flight: HashMap<CallId, SessionId>,
    timer: StudyTimer,
    ticker: Ticker,
    full_screen: bool,
    open: bool,
}

impl EngineState {
    fn fresh_id(&self) -> SessionId {
        self.history
            .iter()
            .map(|s| s.id)
            .chain(iter::once(self.active.id))
            .max()
            .unwrap_or_default()
            .next()
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            session: self.active.clone(),
            history_len: self.history.len(),
            busy: !self.in_flight.is_empty(),
            pending_calls: self.in_flight.len(),
            timer: self.timer.state(),
            timer_remaining_seconds: self.timer.remaining_seconds(),
            full_screen: self.full_screen,
            open: self.open,
        }
    }
}

struct StorageKeys {
    current: String,
    history: String,
}

struct EngineInner {
    client: Arc<GenerationClient>,
    persist: PersistWorker,
    keys: StorageKeys,
    state: Mutex<EngineState>,
    events: watch::Sender<EngineSnapshot>,
}

impl EngineInner {
    fn persist_active(&self, state: &EngineState) {
        self.persist.save(&self.keys.current, &state.active);
    }

    fn persist_history(&self, state: &EngineState) {
        self.persist.save(&self.keys.history, &state.history);
    }

    fn publish(&self, state: &EngineState) {
        self.events.send_replace(state.snapshot());
    }

    fn start_ticker(self: &Arc<Self>, state: &mut EngineState) {
        let weak = Arc::downgrade(self);
        state.ticker.start(TICK_PERIOD, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.on_tick().await,
                    None => TickControl::Stop,
                }
            }
        });
    }

    async fn on_tick(&self) -> TickControl {
        let mut state = self.state.lock().await;
        if !state.timer.is_running() {
            return TickControl::Stop;
        }

        if let Some(change) = state.timer.tick() {
            info!(completed = ?change.completed, next = ?change.next, "Timer phase completed");
            state.active.push(Message::system(change.narrative()));
            self.persist_active(&state);
        }
        self.publish(&state);
        TickControl::Continue
    }

    async fn finish_call(&self, call_id: CallId, text: String) -> SendOutcome {
        let reply_text = self.client.reply(&text).await;

        let mut state = self.state.lock().await;
        let issued_for = state.in_flight.remove(&call_id);
        let outcome = match issued_for {
            Some(session_id) if session_id == state.active.id => {
                let reply = Message::system(reply_text);
                state.active.push(reply.clone());
                self.persist_active(&state);
                debug!(%call_id, "Reply appended");
                SendOutcome::Replied { call_id, reply }
            }
            Some(session_id) => {
                info!(%call_id, %session_id, "Active session changed, discarding reply");
                SendOutcome::Superseded { call_id }
            }
            None => {
                warn!(%call_id, "Reply for an unknown call, discarding");
                SendOutcome::Superseded { call_id }
            }
        };
        self.publish(&state);
        outcome
    }
}

/// Conversation-session engine.
///
/// Cheap to clone; clones share state. All mutations are written through to
/// the durable store in the background and published to subscribers.
#[derive(Clone)]
pub struct SessionEngine {
    inner: Arc<EngineInner>,
}

impl SessionEngine {
    /// Restore state from `store` and start the engine.
    ///
    /// Missing or corrupt persisted data yields an empty session and history.
    /// Must be called from within a tokio runtime.
    pub async fn open(
        config: &AssistantConfig,
        client: Arc<GenerationClient>,
        store: Arc<dyn DurableStore>,
    ) -> Self {
        let keys = StorageKeys {
            current: config.storage.current_session_key.clone(),
            history: config.storage.session_history_key.clone(),
        };
        let active: Session = load_or_default(store.as_ref(), &keys.current).await;
        let history: Vec<Session> = load_or_default(store.as_ref(), &keys.history).await;

        let mut state = EngineState {
            active,
            history,
            in_flight: HashMap::new(),
            timer: StudyTimer::new(&config.timer),
            ticker: Ticker::new(),
            full_screen: false,
            open: true,
        };
        if state.active.id == SessionId::default()
            || state.history.iter().any(|s| s.id == state.active.id)
        {
            state.active.id = state.fresh_id();
        }
        info!(
            session_id = %state.active.id,
            messages = state.active.len(),
            archived = state.history.len(),
            "Session engine ready"
        );

        let (persist, _writer) = PersistWorker::spawn(store);
        let (events, _) = watch::channel(state.snapshot());

        Self {
            inner: Arc::new(EngineInner {
                client,
                persist,
                keys,
                state: Mutex::new(state),
                events,
            }),
        }
    }

    /// Send user input and append the generated reply.
    ///
    /// Blank input is ignored. Concurrent sends are not serialized: each call
    /// gets its own [`CallId`] and completes exactly once. A reply whose
    /// session was archived or replaced meanwhile is discarded.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        let call_id = CallId::new();
        {
            let mut state = self.inner.state.lock().await;
            state.active.push(Message::user(text));
            let session_id = state.active.id;
            state.in_flight.insert(call_id, session_id);
            self.inner.persist_active(&state);
            self.inner.publish(&state);
            debug!(%call_id, %session_id, "Message sent");
        }

        // The round trip runs on its own task so a dropped caller cannot
        // leave the call registered forever.
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        match tokio::spawn(async move { inner.finish_call(call_id, text).await }).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%call_id, %err, "Reply task failed");
                let mut state = self.inner.state.lock().await;
                state.in_flight.remove(&call_id);
                self.inner.publish(&state);
                SendOutcome::Superseded { call_id }
            }
        }
    }

    /// Archive the active session (even if empty) and start a fresh one.
    ///
    /// The timer is stopped and zeroed without a narrative. Returns the id of
    /// the archived session.
    pub async fn start_new_conversation(&self) -> SessionId {
        let mut state = self.inner.state.lock().await;
        let new_id = state.fresh_id();
        let archived = std::mem::replace(&mut state.active, Session::empty(new_id));
        let archived_id = archived.id;
        state.history.push(archived);

        state.ticker.stop();
        state.timer.reset();

        self.inner.persist_history(&state);
        self.inner.persist_active(&state);
        self.inner.publish(&state);
        info!(%archived_id, %new_id, "Started new conversation");
        archived_id
    }

    /// Replace the active session with a copy of `history[index]`.
    ///
    /// The history entry stays in place. Returns `false` and changes nothing
    /// when `index` is out of range.
    pub async fn load_from_history(&self, index: usize) -> bool {
        let mut state = self.inner.state.lock().await;
        let Some(entry) = state.history.get(index) else {
            warn!(index, len = state.history.len(), "History index out of range, ignoring");
            return false;
        };
        let messages = entry.messages.clone();
        self.replace_active(&mut state, messages);
        true
    }

    /// Replace the active session with a copy of the archived session `id`.
    ///
    /// Returns `false` when no archived session has that id.
    pub async fn load_archived(&self, id: SessionId) -> bool {
        let mut state = self.inner.state.lock().await;
        let Some(entry) = state.history.iter().find(|s| s.id == id) else {
            warn!(%id, "No archived session with that id, ignoring");
            return false;
        };
        let messages = entry.messages.clone();
        self.replace_active(&mut state, messages);
        true
    }

    fn replace_active(&self, state: &mut EngineState, messages: Vec<Message>) {
        // Loaded copies get a fresh id so archiving them again adds a new entry.
        let id = state.fresh_id();
        state.active = Session { id, messages };
        self.inner.persist_active(state);
        self.inner.publish(state);
        debug!(session_id = %id, "Loaded session from history");
    }

    /// Announce a study goal. Returns `false` for blank input.
    pub async fn set_goal(&self, text: &str) -> bool {
        let Some(message) = announce_goal(text) else {
            return false;
        };
        let mut state = self.inner.state.lock().await;
        state.active.push(message);
        self.inner.persist_active(&state);
        self.inner.publish(&state);
        true
    }

    /// Start or pause the study timer.
    pub async fn toggle_timer(&self) -> TimerTransition {
        let mut state = self.inner.state.lock().await;
        let transition = state.timer.toggle();
        match transition {
            TimerTransition::Started => {
                state.active.push(Message::system(TIMER_STARTED_TEXT));
                self.inner.persist_active(&state);
                self.inner.start_ticker(&mut state);
            }
            TimerTransition::Paused => state.ticker.stop(),
        }
        self.inner.publish(&state);
        debug!(?transition, elapsed = state.timer.state().elapsed_seconds, "Timer toggled");
        transition
    }

    /// Stop and zero the timer, appending a summary of the ended duration.
    ///
    /// Returns the running seconds counted since the previous reset, summed
    /// over pomodoro phases.
    pub async fn reset_timer(&self) -> u64 {
        let mut state = self.inner.state.lock().await;
        state.ticker.stop();
        let total = state.timer.reset();
        state.active.push(Message::system(session_ended_text(total)));
        self.inner.persist_active(&state);
        self.inner.publish(&state);
        debug!(total, "Timer reset");
        total
    }

    /// Flip the full-screen presentation flag and return the new value.
    pub async fn toggle_full_screen(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        state.full_screen = !state.full_screen;
        self.inner.publish(&state);
        state.full_screen
    }

    /// Hide the widget. Persisted state is kept; the timer is paused.
    pub async fn close(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.open = false;
            state.full_screen = false;
            state.ticker.stop();
            if state.timer.is_running() {
                state.timer.toggle();
            }
            self.inner.publish(&state);
        }
        self.flush().await;
        info!("Study assistant closed");
    }

    /// Show the widget again after [`Self::close`].
    pub async fn reopen(&self) {
        let mut state = self.inner.state.lock().await;
        state.open = true;
        self.inner.publish(&state);
    }

    /// Messages of the active session.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.state.lock().await.active.messages.clone()
    }

    /// Archived sessions, oldest first.
    pub async fn history(&self) -> Vec<Session> {
        self.inner.state.lock().await.history.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        self.inner.events.borrow().clone()
    }

    /// Receive a snapshot after every mutation and timer tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.inner.events.subscribe()
    }

    /// Wait until all writes queued so far have reached the store.
    pub async fn flush(&self) {
        self.inner.persist.flush().await;
    }
}
