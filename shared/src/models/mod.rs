//! Shared wire models
//!
//! Enums and derived views that must serialize identically on the server
//! and on every frontend. Store-side entities (with record ids) live in
//! `menu-server/src/db/models`.

mod order;

pub use order::{
    OrderStatus, PaymentMethod, PaymentStage, PaymentStatus, PaymentView,
};
