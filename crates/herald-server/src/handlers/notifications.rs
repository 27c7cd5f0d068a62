//! `GET /notifications?owner=<uuid>`: notifications delivered to one owner.

use axum::{
  Json,
  extract::{Query, State},
};
use herald_core::{notification::Notification, store::SubscriptionRegistry};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: Uuid,
}

pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: SubscriptionRegistry + 'static,
{
  let notifications = state
    .fanout
    .store()
    .notifications_for_owner(params.owner)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(notifications))
}
