//! Client-side core of an app marketplace.
//!
//! [`prompt`] holds the transient overlay system (alerts, notices, toasts,
//! drawers and back-navigation), [`store`] the app catalog with its
//! installation state machine and status reconciliation, and [`api`] the
//! backend contract.

pub mod api;
pub mod cli;
pub mod config;
pub mod i18n;
pub mod prompt;
pub mod store;
