//! HTTP handlers for notewell-api.

pub mod auth;
pub mod notes;
