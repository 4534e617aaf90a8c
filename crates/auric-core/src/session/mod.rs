//! Session lifecycle: the single live session, its observers, and the
//! step-up single-flight state.

mod guard;
mod manager;
mod observer;

pub use guard::GuardOutcome;
pub use manager::SessionManager;
pub(crate) use manager::StepUpTurn;
pub use observer::SessionObserver;
