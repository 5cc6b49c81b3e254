//! Shared types for the QR dine-in ordering system
//!
//! Wire-level types used by both the menu server and its frontends
//! (customer menu/bill pages, kitchen dashboard): order/payment enums,
//! sync payloads for the push channel, and pagination envelopes.

pub mod message;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType, SyncPayload};

// Model re-exports
pub use models::{OrderStatus, PaymentMethod, PaymentStatus};
