//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod settings;
pub mod snapshot;
pub mod student;

pub use settings::*;
pub use snapshot::*;
pub use student::*;
