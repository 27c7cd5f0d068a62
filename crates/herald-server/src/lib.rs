//! HTTP adapter for the Herald fan-out engine.
//!
//! Exposes an axum [`Router`] whose `POST /events` route is the single entry
//! point for the triggering platform, plus small subscription and
//! notification routes backed by any [`SubscriptionRegistry`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events` | Body: [`herald_core::Invocation`] |
//! | `POST` | `/subscriptions` | Create an active subscription |
//! | `POST` | `/subscriptions/:id/deactivate` | Stop a subscription |
//! | `GET`  | `/notifications?owner=<uuid>` | Notifications for one owner |

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::path::PathBuf;

use axum::{Router, routing::{get, post}};
use herald_core::{Fanout, FanoutConfig, store::SubscriptionRegistry};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{events, notifications, subscriptions};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub fanout:     FanoutConfig,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub fanout: Fanout<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { fanout: self.fanout.clone() } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SubscriptionRegistry + 'static,
{
  Router::new()
    .route("/events", post(events::handler::<S>))
    .route("/subscriptions", post(subscriptions::create::<S>))
    .route("/subscriptions/{id}/deactivate", post(subscriptions::deactivate::<S>))
    .route("/notifications", get(notifications::list::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
