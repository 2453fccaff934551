use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::Result;
use super::state::{Action, CompanionState, Mood};
use super::store::StateStore;

/// Per-user advisory locks.
///
/// Two concurrent updates for one user would otherwise both read the
/// pre-update row and silently drop one write. Holding the user's lock
/// for a whole read-modify-write closes that window; different users
/// never contend.
#[derive(Default)]
struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn for_user(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(user_id.to_string()).or_default())
    }
}

/// Result of one interaction: the updated state plus presentation
/// hints for the calling layer.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionOutcome {
    pub state: CompanionState,
    pub message: String,
    pub animation: String,
    pub next_suggestions: Vec<String>,
}

/// The companion state engine.
///
/// Stateless between calls: every operation reads through the store,
/// mutates, and writes back. `get_state` deliberately persists the
/// decay it computes, so polling is not idempotent with respect to
/// storage; see the module tests for the exact semantics.
pub struct CompanionEngine<S: StateStore> {
    store: S,
    locks: UserLocks,
    decay_rate: f64,
}

impl<S: StateStore> CompanionEngine<S> {
    pub fn new(store: S, decay_rate: f64) -> Self {
        tracing::info!(decay_rate, "companion engine initialized");
        CompanionEngine {
            store,
            locks: UserLocks::default(),
            decay_rate,
        }
    }

    /// Current companion state for a user, decayed to `now`.
    ///
    /// Creates the default record on first access. The decayed values
    /// are written back, but `last_interaction` is not advanced, so
    /// the next read measures elapsed time against the same origin.
    pub fn get_state(&self, user_id: &str) -> Result<CompanionState> {
        let lock = self.locks.for_user(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(user_id, Utc::now())
    }

    /// Apply one discrete action for a user.
    ///
    /// No decay runs before the transition table: an interaction right
    /// after a long idle period acts on the stored energy, not the
    /// decayed view. Returns the state as a fresh `get_state` would,
    /// so the low-energy sleepy override still applies to the result.
    pub fn apply_interaction(&self, user_id: &str, action: Action) -> Result<CompanionState> {
        let lock = self.locks.for_user(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Utc::now();
        let mut state = self.fetch_or_create(user_id, now)?;
        state.apply_action(action, now);
        self.store.save(user_id, &state)?;

        tracing::debug!(
            user_id,
            action = %action,
            energy = state.energy,
            bond_level = state.bond_level,
            "interaction applied"
        );

        self.refresh(user_id, now)
    }

    /// Apply an action and wrap the result with presentation hints.
    pub fn interact(&self, user_id: &str, action: Action) -> Result<InteractionOutcome> {
        let state = self.apply_interaction(user_id, action)?;
        let message = reaction_message(action, &state);
        Ok(InteractionOutcome {
            message,
            animation: action.as_str().to_string(),
            next_suggestions: vec![
                format!("Want to {} again?", action.as_str()),
                "How about we try something else?".to_string(),
            ],
            state,
        })
    }

    /// Fetch, decay, persist, return. Caller must hold the user lock.
    fn refresh(&self, user_id: &str, now: DateTime<Utc>) -> Result<CompanionState> {
        let mut state = self.fetch_or_create(user_id, now)?;
        state.apply_time_decay(now, self.decay_rate);
        self.store.save(user_id, &state)?;
        Ok(state)
    }

    fn fetch_or_create(&self, user_id: &str, now: DateTime<Utc>) -> Result<CompanionState> {
        match self.store.find_by_user(user_id)? {
            Some(state) => Ok(state),
            None => {
                let state = CompanionState::new(now);
                self.store.create(user_id, &state)?;
                tracing::debug!(user_id, "created default companion state");
                Ok(state)
            }
        }
    }
}

fn reaction_message(action: Action, state: &CompanionState) -> String {
    match action {
        Action::Play => "That was fun! Let's play again soon.".to_string(),
        Action::Feed => "Yum, thank you! I'm feeling great.".to_string(),
        Action::Chat => "I love talking with you.".to_string(),
        Action::Rest => {
            if state.mood == Mood::Sleepy {
                "Mmm... just resting my eyes for a bit.".to_string()
            } else {
                "That nap helped a lot.".to_string()
            }
        }
        Action::Unrecognized => "Hmm, I'm not sure what that was, but I'm here!".to_string(),
    }
}
