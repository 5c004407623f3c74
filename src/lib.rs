//! PurrPass: client core for a veterinary clinic portal.
//!
//! Session store, route guard, onboarding resolver and step forms, form
//! validation, and a typed REST client with a query cache.

pub mod account;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod model;
pub mod onboarding;
pub mod session;
pub mod validation;
