//! `POST /events`: the entry point invoked by the triggering platform.
//!
//! Body: an [`Invocation`]. Returns `200` with the [`Outcome`], including when
//! the invocation was skipped because no subject could be resolved.

use axum::{Json, extract::State};
use herald_core::{Invocation, Outcome, store::SubscriptionRegistry};

use crate::{AppState, error::ApiError};

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(invocation): Json<Invocation>,
) -> Result<Json<Outcome>, ApiError>
where
  S: SubscriptionRegistry + 'static,
{
  let outcome = state.fanout.execute(&invocation).await?;
  Ok(Json(outcome))
}
