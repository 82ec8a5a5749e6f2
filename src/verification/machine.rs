use super::query::{FailureReason, VerificationQuery};

pub const MSG_VERIFIED: &str =
    "Your email has been verified successfully. You can now log in.";
pub const MSG_VERIFY_FAILED: &str = "Verification failed. Please try again.";
pub const MSG_RESEND_SENT: &str = "Verification email sent! Please check your inbox.";
pub const MSG_RESEND_FAILED: &str = "Failed to resend email. Please try again.";
pub const MSG_LINK_INVALID: &str = "Invalid verification link. Please request a new one.";
pub const MSG_LINK_EXPIRED: &str = "Verification link has expired. Please request a new one.";

/// The four states the page can render. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Verifying,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Home,
    Login,
}

impl Destination {
    pub fn path(self) -> &'static str {
        match self {
            Destination::Home => "/",
            Destination::Login => "/login",
        }
    }
}

/// Full controller state. The verify one-shot latch (`attempted`) and the
/// resend in-flight flag (`resending`) are part of the enumeration rather
/// than booleans held next to it, so the transition function alone decides
/// what is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Pending { attempted: bool, resending: bool },
    Verifying,
    Error,
    Success,
    /// The controller has navigated away. Terminal: every later event is
    /// discarded, which is what makes a mutation callback arriving after the
    /// page is gone harmless.
    Redirected(Destination),
}

impl State {
    pub fn new() -> Self {
        State::Pending {
            attempted: false,
            resending: false,
        }
    }

    /// Projection onto the four renderable states. `Redirected` renders
    /// nothing.
    pub fn status(&self) -> Option<Status> {
        match self {
            State::Pending { .. } => Some(Status::Pending),
            State::Verifying => Some(Status::Verifying),
            State::Error => Some(Status::Error),
            State::Success => Some(Status::Success),
            State::Redirected(_) => None,
        }
    }

    pub fn is_resending(&self) -> bool {
        matches!(self, State::Pending { resending: true, .. })
    }
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}

/// Everything that can happen to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The auth snapshot resolved. Delivered before the first
    /// `QueryResolved` so the logged-in redirect outranks everything else.
    MountChecked { authenticated: bool },
    QueryResolved(VerificationQuery),
    VerifySucceeded,
    VerifyFailed(Option<String>),
    /// User asked for a resend. The caller supplies the resolved email; an
    /// empty one is rejected here rather than at the call site.
    ResendRequested { email: String },
    ResendSucceeded,
    ResendFailed(Option<String>),
}

/// Side effects the caller must run after applying a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Verify(String),
    Resend(String),
    ClearPendingEmail,
    Navigate(Destination),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageUpdate {
    Keep,
    Clear,
    Set(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub next: State,
    pub message: MessageUpdate,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn stay(state: &State) -> Self {
        Outcome {
            next: state.clone(),
            message: MessageUpdate::Keep,
            effects: Vec::new(),
        }
    }

    fn redirect(dest: Destination) -> Self {
        Outcome {
            next: State::Redirected(dest),
            message: MessageUpdate::Keep,
            effects: vec![Effect::Navigate(dest)],
        }
    }
}

/// The single transition function. Any event not meaningful in the current
/// state leaves it unchanged with no effects.
pub fn transition(state: &State, event: Event) -> Outcome {
    if matches!(state, State::Redirected(_)) {
        return Outcome::stay(state);
    }

    match event {
        Event::MountChecked { authenticated } => {
            if authenticated {
                Outcome::redirect(Destination::Home)
            } else {
                Outcome::stay(state)
            }
        }
        Event::QueryResolved(query) => resolve_query(state, &query),
        Event::VerifySucceeded => match state {
            State::Verifying => Outcome {
                next: State::Success,
                message: MessageUpdate::Set(MSG_VERIFIED.to_string()),
                effects: vec![Effect::ClearPendingEmail],
            },
            _ => Outcome::stay(state),
        },
        Event::VerifyFailed(reason) => match state {
            State::Verifying => Outcome {
                next: State::Error,
                message: MessageUpdate::Set(reason_or(reason, MSG_VERIFY_FAILED)),
                effects: Vec::new(),
            },
            _ => Outcome::stay(state),
        },
        Event::ResendRequested { email } => {
            if email.is_empty() {
                return Outcome::stay(state);
            }
            match state {
                State::Pending {
                    attempted,
                    resending: false,
                } => Outcome {
                    next: State::Pending {
                        attempted: *attempted,
                        resending: true,
                    },
                    message: MessageUpdate::Clear,
                    effects: vec![Effect::Resend(email)],
                },
                // An error after a verify attempt must not re-arm the verify
                // latch, so the pending state we return to carries it set.
                State::Error => Outcome {
                    next: State::Pending {
                        attempted: true,
                        resending: true,
                    },
                    message: MessageUpdate::Clear,
                    effects: vec![Effect::Resend(email)],
                },
                _ => Outcome::stay(state),
            }
        }
        Event::ResendSucceeded => match state {
            State::Pending {
                attempted,
                resending: true,
            } => Outcome {
                next: State::Pending {
                    attempted: *attempted,
                    resending: false,
                },
                message: MessageUpdate::Set(MSG_RESEND_SENT.to_string()),
                effects: Vec::new(),
            },
            _ => Outcome::stay(state),
        },
        Event::ResendFailed(reason) => match state {
            State::Pending {
                resending: true, ..
            } => Outcome {
                next: State::Error,
                message: MessageUpdate::Set(reason_or(reason, MSG_RESEND_FAILED)),
                effects: Vec::new(),
            },
            _ => Outcome::stay(state),
        },
    }
}

/// Guards for a resolved query, in priority order: already-verified, link
/// failure flag, token, no context at all.
fn resolve_query(state: &State, query: &VerificationQuery) -> Outcome {
    if query.already_verified {
        return Outcome::redirect(Destination::Login);
    }

    if let Some(failure) = &query.failure {
        let message = match failure {
            FailureReason::InvalidToken => MessageUpdate::Set(MSG_LINK_INVALID.to_string()),
            FailureReason::ExpiredToken => MessageUpdate::Set(MSG_LINK_EXPIRED.to_string()),
            FailureReason::Other(_) => MessageUpdate::Clear,
        };
        return Outcome {
            next: State::Error,
            message,
            effects: Vec::new(),
        };
    }

    if let Some(token) = &query.token {
        // The latch: only an initial pending state may start a verify. Every
        // re-delivery of the same query afterwards falls through to stay.
        if let State::Pending {
            attempted: false, ..
        } = state
        {
            return Outcome {
                next: State::Verifying,
                message: MessageUpdate::Keep,
                effects: vec![Effect::Verify(token.clone())],
            };
        }
        return Outcome::stay(state);
    }

    if !query.has_context() {
        return Outcome::redirect(Destination::Login);
    }

    Outcome::stay(state)
}

fn reason_or(reason: Option<String>, fallback: &str) -> String {
    reason
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// State plus message, mutated only through [`transition`]. This is what the
/// page holds in a signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Machine {
    pub state: State,
    pub message: String,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event and return the effects the caller must run.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let outcome = transition(&self.state, event);
        self.state = outcome.next;
        match outcome.message {
            MessageUpdate::Keep => {}
            MessageUpdate::Clear => self.message.clear(),
            MessageUpdate::Set(message) => self.message = message,
        }
        outcome.effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_query(token: &str) -> VerificationQuery {
        VerificationQuery {
            token: Some(token.to_string()),
            ..Default::default()
        }
    }

    fn failed_query(flag: &str) -> VerificationQuery {
        VerificationQuery {
            failure: FailureReason::parse(flag),
            ..Default::default()
        }
    }

    #[test]
    fn authenticated_user_redirects_home_before_anything_else() {
        let mut m = Machine::new();
        let effects = m.apply(Event::MountChecked {
            authenticated: true,
        });
        assert_eq!(m.state, State::Redirected(Destination::Home));
        assert_eq!(effects, vec![Effect::Navigate(Destination::Home)]);

        // A token arriving afterwards must not start a verify.
        let effects = m.apply(Event::QueryResolved(token_query("abc")));
        assert_eq!(m.state, State::Redirected(Destination::Home));
        assert!(effects.is_empty());
    }

    #[test]
    fn unauthenticated_mount_is_a_no_op() {
        let mut m = Machine::new();
        let effects = m.apply(Event::MountChecked {
            authenticated: false,
        });
        assert_eq!(m.state, State::new());
        assert!(effects.is_empty());
    }

    #[test]
    fn already_verified_redirects_to_login_even_with_token() {
        let mut m = Machine::new();
        let query = VerificationQuery {
            token: Some("abc".into()),
            already_verified: true,
            ..Default::default()
        };
        let effects = m.apply(Event::QueryResolved(query));
        assert_eq!(m.state, State::Redirected(Destination::Login));
        assert_eq!(effects, vec![Effect::Navigate(Destination::Login)]);
    }

    #[test]
    fn verify_fires_exactly_once_across_repeated_query_resolutions() {
        let mut m = Machine::new();
        let effects = m.apply(Event::QueryResolved(token_query("abc")));
        assert_eq!(m.state, State::Verifying);
        assert_eq!(effects, vec![Effect::Verify("abc".into())]);

        // Simulated re-renders re-delivering the same query.
        for _ in 0..3 {
            let effects = m.apply(Event::QueryResolved(token_query("abc")));
            assert_eq!(m.state, State::Verifying);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn expired_link_flag_maps_to_expired_message() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(failed_query("expired_token")));
        assert_eq!(m.state, State::Error);
        assert_eq!(m.message, MSG_LINK_EXPIRED);
    }

    #[test]
    fn invalid_link_flag_maps_to_invalid_message() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(failed_query("invalid_token")));
        assert_eq!(m.state, State::Error);
        assert_eq!(m.message, MSG_LINK_INVALID);
    }

    #[test]
    fn unrecognized_failure_flag_shows_error_with_blank_message() {
        let mut m = Machine::new();
        m.message = "stale".into();
        m.apply(Event::QueryResolved(failed_query("rate_limited")));
        assert_eq!(m.state, State::Error);
        assert_eq!(m.message, "");
    }

    #[test]
    fn failure_flag_outranks_token() {
        let mut m = Machine::new();
        let query = VerificationQuery {
            token: Some("abc".into()),
            failure: Some(FailureReason::ExpiredToken),
            ..Default::default()
        };
        let effects = m.apply(Event::QueryResolved(query));
        assert_eq!(m.state, State::Error);
        assert!(effects.is_empty());
    }

    #[test]
    fn successful_verification_reaches_success_and_clears_stored_email() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(token_query("abc")));
        let effects = m.apply(Event::VerifySucceeded);
        assert_eq!(m.state, State::Success);
        assert_eq!(m.message, MSG_VERIFIED);
        assert_eq!(effects, vec![Effect::ClearPendingEmail]);
    }

    #[test]
    fn failed_verification_surfaces_reason() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(token_query("abc")));
        m.apply(Event::VerifyFailed(Some("Token expired".into())));
        assert_eq!(m.state, State::Error);
        assert_eq!(m.message, "Token expired");
    }

    #[test]
    fn failed_verification_without_reason_uses_fallback() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(token_query("abc")));
        m.apply(Event::VerifyFailed(None));
        assert_eq!(m.message, MSG_VERIFY_FAILED);
    }

    #[test]
    fn empty_query_redirects_to_login() {
        let mut m = Machine::new();
        let effects = m.apply(Event::QueryResolved(VerificationQuery::default()));
        assert_eq!(m.state, State::Redirected(Destination::Login));
        assert_eq!(effects, vec![Effect::Navigate(Destination::Login)]);
    }

    #[test]
    fn email_only_query_stays_pending() {
        let mut m = Machine::new();
        let query = VerificationQuery {
            email: "a@x.com".into(),
            ..Default::default()
        };
        let effects = m.apply(Event::QueryResolved(query));
        assert_eq!(m.state, State::new());
        assert!(effects.is_empty());
    }

    #[test]
    fn resend_clears_message_and_fires_request() {
        let mut m = Machine::new();
        m.message = "old".into();
        let effects = m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        assert!(m.state.is_resending());
        assert_eq!(m.message, "");
        assert_eq!(effects, vec![Effect::Resend("a@x.com".into())]);
    }

    #[test]
    fn resend_ignored_while_resend_outstanding() {
        let mut m = Machine::new();
        m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        let effects = m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        assert!(effects.is_empty());
        assert!(m.state.is_resending());
    }

    #[test]
    fn resend_requires_known_email() {
        let mut m = Machine::new();
        let effects = m.apply(Event::ResendRequested { email: String::new() });
        assert!(effects.is_empty());
        assert_eq!(m.state, State::new());
    }

    #[test]
    fn resend_ignored_while_verifying() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(token_query("abc")));
        let effects = m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        assert!(effects.is_empty());
        assert_eq!(m.state, State::Verifying);
    }

    #[test]
    fn resend_success_returns_to_pending_with_message() {
        let mut m = Machine::new();
        m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        m.apply(Event::ResendSucceeded);
        assert_eq!(
            m.state,
            State::Pending {
                attempted: false,
                resending: false
            }
        );
        assert_eq!(m.message, MSG_RESEND_SENT);
    }

    #[test]
    fn resend_failure_moves_to_error() {
        let mut m = Machine::new();
        m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        m.apply(Event::ResendFailed(Some("Mail server down".into())));
        assert_eq!(m.state, State::Error);
        assert_eq!(m.message, "Mail server down");
    }

    #[test]
    fn resend_failure_without_reason_uses_fallback() {
        let mut m = Machine::new();
        m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        m.apply(Event::ResendFailed(None));
        assert_eq!(m.message, MSG_RESEND_FAILED);
    }

    #[test]
    fn resend_after_verify_error_does_not_rearm_verify() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(token_query("abc")));
        m.apply(Event::VerifyFailed(Some("Token expired".into())));
        m.apply(Event::ResendRequested {
            email: "a@x.com".into(),
        });
        m.apply(Event::ResendSucceeded);

        // The same token re-resolving must not start a second verify.
        let effects = m.apply(Event::QueryResolved(token_query("abc")));
        assert!(effects.is_empty());
        assert_eq!(
            m.state,
            State::Pending {
                attempted: true,
                resending: false
            }
        );
    }

    #[test]
    fn verify_callbacks_ignored_outside_verifying() {
        let mut m = Machine::new();
        let effects = m.apply(Event::VerifySucceeded);
        assert!(effects.is_empty());
        assert_eq!(m.state, State::new());

        m.apply(Event::QueryResolved(failed_query("invalid_token")));
        let effects = m.apply(Event::VerifyFailed(Some("late".into())));
        assert!(effects.is_empty());
        assert_eq!(m.message, MSG_LINK_INVALID);
    }

    #[test]
    fn late_callbacks_after_redirect_are_discarded() {
        let mut m = Machine::new();
        m.apply(Event::QueryResolved(token_query("abc")));
        m.apply(Event::MountChecked {
            authenticated: true,
        });
        assert_eq!(m.state, State::Redirected(Destination::Home));

        for event in [
            Event::VerifySucceeded,
            Event::VerifyFailed(Some("late".into())),
            Event::ResendSucceeded,
            Event::ResendFailed(None),
            Event::ResendRequested {
                email: "a@x.com".into(),
            },
        ] {
            let effects = m.apply(event);
            assert!(effects.is_empty());
            assert_eq!(m.state, State::Redirected(Destination::Home));
        }
    }

    #[test]
    fn status_projection_covers_every_state() {
        assert_eq!(State::new().status(), Some(Status::Pending));
        assert_eq!(State::Verifying.status(), Some(Status::Verifying));
        assert_eq!(State::Error.status(), Some(Status::Error));
        assert_eq!(State::Success.status(), Some(Status::Success));
        assert_eq!(State::Redirected(Destination::Home).status(), None);
    }
}
