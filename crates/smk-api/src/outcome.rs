//! Typed results of the progress computations.
//!
//! The public services never fail: a computation that could not read all of
//! its inputs still answers with a value. [`Outcome`] keeps track of how that
//! value was obtained so callers can tell a genuine zero from a fallback.

use std::future::Future;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Every input was read successfully
    Computed(T),
    /// Some inputs failed and were replaced by their defaults
    Partial { value: T, failures: usize },
    /// The computation could not run and `value` is the documented default
    Defaulted { value: T, reason: String },
    /// The caller gave up before the computation finished
    Cancelled,
}

impl<T> Outcome<T> {
    /// `Computed` when nothing failed, `Partial` otherwise.
    pub fn with_failures(value: T, failures: usize) -> Self {
        if failures == 0 {
            Self::Computed(value)
        } else {
            Self::Partial { value, failures }
        }
    }

    pub fn defaulted(value: T, reason: impl ToString) -> Self {
        Self::Defaulted {
            value,
            reason: reason.to_string(),
        }
    }

    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Computed(value) | Self::Partial { value, .. } | Self::Defaulted { value, .. } => {
                Some(value)
            }
            Self::Cancelled => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Computed(value) | Self::Partial { value, .. } | Self::Defaulted { value, .. } => {
                Some(value)
            }
            Self::Cancelled => None,
        }
    }

    /// Whether the value relies on defaults.
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Partial { .. } | Self::Defaulted { .. })
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Number of inputs that had to be defaulted; a defaulted outcome counts as one.
    pub const fn failures(&self) -> usize {
        match self {
            Self::Computed(_) | Self::Cancelled => 0,
            Self::Partial { failures, .. } => *failures,
            Self::Defaulted { .. } => 1,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Computed(value) => Outcome::Computed(f(value)),
            Self::Partial { value, failures } => Outcome::Partial {
                value: f(value),
                failures,
            },
            Self::Defaulted { value, reason } => Outcome::Defaulted {
                value: f(value),
                reason,
            },
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    /// Status label used in responses and metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Computed(_) => "computed",
            Self::Partial { .. } => "partial",
            Self::Defaulted { .. } => "defaulted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Run `work` until it finishes or `cancel` fires, whichever comes first.
///
/// An already cancelled token never polls `work`.
pub async fn cancellable<T, F>(cancel: &CancellationToken, work: F) -> Outcome<T>
where
    F: Future<Output = Outcome<T>>,
{
    if cancel.is_cancelled() {
        return Outcome::Cancelled;
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Outcome::Cancelled,
        outcome = work => outcome,
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        let status = self.label();
        let body = match self {
            Self::Computed(data) => json!({ "status": status, "data": data }),
            Self::Partial { value, failures } => {
                json!({ "status": status, "data": value, "failures": failures })
            }
            Self::Defaulted { value, reason } => {
                json!({ "status": status, "data": value, "reason": reason })
            }
            Self::Cancelled => {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Computation cancelled" })),
                )
                    .into_response();
            }
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}
