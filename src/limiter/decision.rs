//! Admission decisions returned by the controller.

use std::fmt;

use serde::Serialize;

/// Why a unit of work was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// The client used up its request budget for the current window
    RateLimited,
    /// Too much work is already in flight for this client or overall
    ConcurrencyLimited,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::RateLimited => "rate-limited",
            RejectReason::ConcurrencyLimited => "concurrency-limited",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured backpressure: the reason and an advisory retry delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reason: RejectReason,
    pub retry_after_secs: u64,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (retry after {}s)", self.reason, self.retry_after_secs)
    }
}

/// Outcome of [`AdmissionController::admit`](super::AdmissionController::admit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Rejected(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Decision::Allowed => None,
            Decision::Rejected(rejection) => Some(*rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serializes_kebab_case() {
        let json = serde_json::to_string(&RejectReason::RateLimited).unwrap();
        assert_eq!(json, r#""rate-limited""#);

        let json = serde_json::to_string(&RejectReason::ConcurrencyLimited).unwrap();
        assert_eq!(json, r#""concurrency-limited""#);
    }

    #[test]
    fn test_decision_helpers() {
        let rejection = Rejection {
            reason: RejectReason::ConcurrencyLimited,
            retry_after_secs: 5,
        };

        assert!(Decision::Allowed.is_allowed());
        assert_eq!(Decision::Allowed.rejection(), None);
        assert!(!Decision::Rejected(rejection).is_allowed());
        assert_eq!(Decision::Rejected(rejection).rejection(), Some(rejection));
        assert_eq!(rejection.to_string(), "concurrency-limited (retry after 5s)");
    }
}
