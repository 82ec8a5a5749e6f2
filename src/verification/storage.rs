//! Pending-verification-email persistence.
//!
//! The address awaiting confirmation is kept in browser session storage so a
//! user who leaves and returns to `/verify-email` without query parameters
//! can still resend. Reads and writes are browser-only; on the server every
//! operation is a no-op.

pub const PENDING_EMAIL_KEY: &str = "pending_verification_email";

#[cfg(feature = "hydrate")]
fn session_storage() -> Option<leptos::web_sys::Storage> {
    leptos::web_sys::window().and_then(|w| w.session_storage().ok().flatten())
}

#[cfg(feature = "hydrate")]
pub fn pending_email() -> Option<String> {
    session_storage()
        .and_then(|s| s.get_item(PENDING_EMAIL_KEY).ok().flatten())
        .filter(|e| !e.is_empty())
}

#[cfg(not(feature = "hydrate"))]
pub fn pending_email() -> Option<String> {
    None
}

#[cfg(feature = "hydrate")]
pub fn remember_pending_email(email: &str) {
    if let Some(storage) = session_storage() {
        let _ = storage.set_item(PENDING_EMAIL_KEY, email);
    }
}

#[cfg(not(feature = "hydrate"))]
pub fn remember_pending_email(_email: &str) {}

#[cfg(feature = "hydrate")]
pub fn clear_pending_email() {
    if let Some(storage) = session_storage() {
        let _ = storage.remove_item(PENDING_EMAIL_KEY);
    }
}

#[cfg(not(feature = "hydrate"))]
pub fn clear_pending_email() {}
