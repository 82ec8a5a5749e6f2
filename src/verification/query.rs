/// Why a verification link bounced, as reported in the `verification_failed`
/// query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    InvalidToken,
    ExpiredToken,
    /// Any other non-empty flag value. Shown as a generic failure with no
    /// detail text.
    Other(String),
}

impl FailureReason {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            "invalid_token" => Some(Self::InvalidToken),
            "expired_token" => Some(Self::ExpiredToken),
            other => Some(Self::Other(other.to_string())),
        }
    }
}

/// Everything the verification page knows about how it was entered, resolved
/// once per query-string change.
///
/// Resolution is a pure function of the URL parameters and the persisted
/// pending-email fallback, so it can be recomputed freely without observable
/// effect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationQuery {
    /// Address shown to the user and used for resends. Empty when unknown,
    /// in which case resending is disabled.
    pub email: String,
    pub token: Option<String>,
    pub already_verified: bool,
    pub failure: Option<FailureReason>,
}

impl VerificationQuery {
    /// Resolve the query from raw URL parameters plus the persisted fallback.
    ///
    /// The URL `email` parameter wins over the fallback; whitespace-only
    /// values count as absent.
    pub fn resolve(
        email: Option<&str>,
        token: Option<&str>,
        already_verified: Option<&str>,
        failure: Option<&str>,
        fallback_email: Option<&str>,
    ) -> Self {
        let email = non_empty(email)
            .or_else(|| non_empty(fallback_email))
            .unwrap_or_default();
        Self {
            email,
            token: non_empty(token),
            already_verified: already_verified == Some("true"),
            failure: failure.and_then(FailureReason::parse),
        }
    }

    /// A page entered with none of email, token, failure flag, or the
    /// already-verified flag has nothing to show and redirects to login.
    pub fn has_context(&self) -> bool {
        !self.email.is_empty()
            || self.token.is_some()
            || self.failure.is_some()
            || self.already_verified
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_email_wins_over_fallback() {
        let q = VerificationQuery::resolve(Some("a@x.com"), None, None, None, Some("b@x.com"));
        assert_eq!(q.email, "a@x.com");
    }

    #[test]
    fn fallback_email_used_when_url_param_absent() {
        let q = VerificationQuery::resolve(None, None, None, None, Some("b@x.com"));
        assert_eq!(q.email, "b@x.com");
    }

    #[test]
    fn email_empty_when_neither_source_present() {
        let q = VerificationQuery::resolve(None, None, None, None, None);
        assert_eq!(q.email, "");
        assert!(!q.has_context());
    }

    #[test]
    fn whitespace_email_param_falls_through_to_fallback() {
        let q = VerificationQuery::resolve(Some("   "), None, None, None, Some("b@x.com"));
        assert_eq!(q.email, "b@x.com");
    }

    #[test]
    fn already_verified_only_on_exact_true() {
        let q = VerificationQuery::resolve(None, None, Some("true"), None, None);
        assert!(q.already_verified);
        let q = VerificationQuery::resolve(None, None, Some("1"), None, None);
        assert!(!q.already_verified);
    }

    #[test]
    fn failure_flag_parses_known_and_unknown_values() {
        assert_eq!(
            FailureReason::parse("invalid_token"),
            Some(FailureReason::InvalidToken)
        );
        assert_eq!(
            FailureReason::parse("expired_token"),
            Some(FailureReason::ExpiredToken)
        );
        assert_eq!(
            FailureReason::parse("rate_limited"),
            Some(FailureReason::Other("rate_limited".into()))
        );
        assert_eq!(FailureReason::parse(""), None);
    }

    #[test]
    fn any_single_signal_counts_as_context() {
        let email = VerificationQuery::resolve(Some("a@x.com"), None, None, None, None);
        assert!(email.has_context());
        let token = VerificationQuery::resolve(None, Some("tok"), None, None, None);
        assert!(token.has_context());
        let failed = VerificationQuery::resolve(None, None, None, Some("invalid_token"), None);
        assert!(failed.has_context());
        let verified = VerificationQuery::resolve(None, None, Some("true"), None, None);
        assert!(verified.has_context());
    }

    #[test]
    fn empty_token_param_treated_as_absent() {
        let q = VerificationQuery::resolve(None, Some(""), None, None, None);
        assert_eq!(q.token, None);
        assert!(!q.has_context());
    }
}
