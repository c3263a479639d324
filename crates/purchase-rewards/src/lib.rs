//! Discount rules evaluated against running customer purchase totals.
//!
//! A purchase updates the customer's lifetime and rolling weekly totals, the resulting
//! fact set is checked against a static set of threshold rules, and every match is handed
//! to the registered notification listeners.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
