use std::sync::{Arc, Mutex, RwLock};

use auric_api::models::{AuthLevel, Session};
use tokio::sync::broadcast;

use super::SessionObserver;
use crate::collaborators::ProfileIdStore;

/// Holds the single live session and its dependents.
///
/// Absence of a session is the canonical logged-out state; there is no
/// separate flag. Writes always replace the session wholesale (never a
/// field-by-field merge), which makes concurrent logins and logouts
/// last-writer-wins safe without extra locking.
pub struct SessionManager {
    session: RwLock<Option<Session>>,
    observers: RwLock<Vec<Arc<dyn SessionObserver>>>,
    profile_ids: Arc<dyn ProfileIdStore>,

    // Single-flight slot for the step-up dialog. Some(sender) while a
    // prompt is open; followers subscribe instead of opening a second one.
    // A std mutex: it is never held across an await, and the lead's drop
    // guard must be able to release it synchronously.
    step_up: Mutex<Option<broadcast::Sender<bool>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

pub(crate) enum StepUpTurn<'a> {
    /// This caller opens the prompt and reports its outcome through
    /// [`StepUpLead::finish`]. Dropping the lead unfinished releases the
    /// slot and resolves every follower `false`.
    Lead(StepUpLead<'a>),
    /// A prompt is already open; await its outcome.
    Follower(broadcast::Receiver<bool>),
}

/// Exclusive hold on the step-up slot while the prompt is open.
pub(crate) struct StepUpLead<'a> {
    manager: &'a SessionManager,
    sender: Option<broadcast::Sender<bool>>,
}

impl StepUpLead<'_> {
    /// Publish the prompt outcome and release the slot.
    pub(crate) fn finish(mut self, outcome: bool) {
        self.release(outcome);
    }

    fn release(&mut self, outcome: bool) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        *self
            .manager
            .step_up
            .lock()
            .expect("Mutex should not be poisoned") = None;
        // Followers subscribed before the slot was released, so they all
        // see this send even if it races a new request.
        let _ = sender.send(outcome);
    }
}

impl Drop for StepUpLead<'_> {
    fn drop(&mut self) {
        // A lead dropped mid-prompt (cancelled caller) counts as a
        // declined step-up.
        self.release(false);
    }
}

impl SessionManager {
    pub(crate) fn new(profile_ids: Arc<dyn ProfileIdStore>) -> Self {
        Self {
            session: RwLock::new(None),
            observers: RwLock::new(Vec::new()),
            profile_ids,
            step_up: Mutex::new(None),
        }
    }

    /// A snapshot of the current session, if one is live.
    pub fn current(&self) -> Option<Session> {
        self.session
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Whether a session is live.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .expect("RwLock should not be poisoned")
            .is_some()
    }

    /// The assurance level of the live session, if any.
    pub fn assurance_level(&self) -> Option<AuthLevel> {
        self.session
            .read()
            .expect("RwLock should not be poisoned")
            .as_ref()
            .and_then(|session| session.authenticator_assurance_level)
    }

    /// Replace the session wholesale and notify observers.
    pub fn update_session(&self, session: Session) {
        log::info!(
            "session replaced: {} (aal {:?})",
            session.id,
            session.authenticator_assurance_level
        );
        *self
            .session
            .write()
            .expect("RwLock should not be poisoned") = Some(session.clone());
        self.notify_observers(Some(&session));
    }

    /// Drop the session and clear dependent caches. No-op when already
    /// Anonymous, so concurrent logouts notify observers exactly once.
    pub fn clear(&self) {
        let had_session = self
            .session
            .write()
            .expect("RwLock should not be poisoned")
            .take()
            .is_some();
        if had_session {
            log::info!("session cleared");
            self.profile_ids.clear();
            self.notify_observers(None);
        }
    }

    /// Subscribe to session replacement.
    pub fn subscribe(&self, observer: Arc<dyn SessionObserver>) {
        self.observers
            .write()
            .expect("RwLock should not be poisoned")
            .push(observer);
    }

    fn notify_observers(&self, session: Option<&Session>) {
        let observers = self
            .observers
            .read()
            .expect("RwLock should not be poisoned")
            .clone();
        for observer in observers {
            observer.session_replaced(session);
        }
    }

    /// Claim a turn in the step-up protocol. At most one prompt is ever
    /// open; a request arriving while one is pending becomes a follower
    /// sharing the pending outcome.
    pub(crate) fn step_up_turn(&self) -> StepUpTurn<'_> {
        let mut guard = self.step_up.lock().expect("Mutex should not be poisoned");
        if let Some(sender) = guard.as_ref() {
            return StepUpTurn::Follower(sender.subscribe());
        }
        let (sender, _receiver) = broadcast::channel(1);
        *guard = Some(sender.clone());
        StepUpTurn::Lead(StepUpLead {
            manager: self,
            sender: Some(sender),
        })
    }
}
