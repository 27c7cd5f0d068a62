//! HTTP handlers, one module per resource.

pub mod events;
pub mod notifications;
pub mod subscriptions;
