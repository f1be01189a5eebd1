//! Business logic services.
//!
//! Services own the state and decisions of the relay: the persisted key
//! set, channel authorization, message delivery and request processing.

pub mod channel;
pub mod key_registry;
pub mod relay;
pub mod webhook_service;
