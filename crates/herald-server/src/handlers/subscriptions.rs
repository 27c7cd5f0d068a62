//! Handlers for `/subscriptions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/subscriptions` | Body: [`CreateBody`]; returns 201 + stored subscription |
//! | `POST` | `/subscriptions/:id/deactivate` | 204, or 404 if unknown |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use herald_core::{
  record::RecordRef,
  store::SubscriptionRegistry,
  subscription::{NewSubscription, SubscriptionState},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub subject:     RecordRef,
  pub owner:       RecordRef,
  /// Defaults to the configured subscription lookup.
  pub lookup_name: Option<String>,
}

/// `POST /subscriptions`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionRegistry + 'static,
{
  if body.subject.is_empty() {
    return Err(ApiError::BadRequest("subject id must not be nil".into()));
  }

  let lookup_name = body
    .lookup_name
    .unwrap_or_else(|| state.fanout.config().subscription_lookup_name.clone());

  let subscription = state
    .fanout
    .store()
    .add_subscription(NewSubscription {
      lookup_name,
      subject: body.subject,
      owner: body.owner,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(subscription)))
}

// ─── Deactivate ──────────────────────────────────────────────────────────────

/// `POST /subscriptions/:id/deactivate`
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SubscriptionRegistry + 'static,
{
  let changed = state
    .fanout
    .store()
    .set_subscription_state(id, SubscriptionState::Inactive)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if changed {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("subscription {id} not found")))
  }
}
