//! Email verification: the redirect callback and the pending-verification
//! watcher, both keyed off a persisted marker holding the email that is
//! awaiting confirmation.

mod callback;
mod marker;
mod watcher;

pub use callback::{
    CallbackFailure, CallbackState, VerificationCallback, HOME_PATH, LOGIN_PATH, RETRY_DELAY,
    VERIFICATION_FAILED_PATH,
};
pub use marker::{
    FileMarkerStore, MarkerError, MarkerResult, MemoryMarkerStore, PendingVerificationStore,
    PENDING_VERIFICATION_KEY,
};
pub use watcher::{VerificationDialog, VerificationWatcher, WatchOutcome, POLL_INTERVAL};
