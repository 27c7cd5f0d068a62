//! Core types and the notification fan-out engine for Herald.
//!
//! When a record is created, updated, assigned, deleted or mentioned, the
//! engine resolves the subject that subscriptions are anchored to, looks up
//! every active subscriber of that subject and writes one notification per
//! subscriber.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! is reached only through the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod filter;
pub mod notification;
pub mod record;
pub mod resolve;
pub mod store;
pub mod subscription;

#[cfg(test)]
mod testing;

pub use config::FanoutConfig;
pub use engine::{Delivery, Fanout, Invocation, Outcome};
pub use error::{Error, Result};
pub use event::EventKind;
pub use resolve::SkipReason;
