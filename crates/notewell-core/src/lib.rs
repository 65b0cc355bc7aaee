//! # notewell-core
//!
//! Core types, traits, and abstractions for the notewell note service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the storage and API crates depend on: the domain models, the
//! repository traits (`NoteStore`, `UserStore`, `SessionStore`), the shared
//! error type, structured-logging field names, and centralized defaults.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
