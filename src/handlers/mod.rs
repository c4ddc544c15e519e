pub mod admin;
pub mod health;
pub mod live;
pub mod public;
pub mod receipt;

use axum::extract::rejection::JsonRejection;

use crate::services::lifecycle::{ActionResult, FailureKind};

/// Malformed bodies are reported like any other failed action.
pub(crate) fn rejected(rejection: JsonRejection) -> ActionResult {
    ActionResult::fail(FailureKind::Validation, rejection.body_text())
}
