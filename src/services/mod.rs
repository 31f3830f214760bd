//! Business logic services

pub mod inactivity_service;
pub mod settings_service;
pub mod stats_service;
pub mod student_service;
pub mod sync_service;

pub use inactivity_service::{InactivityService, ReminderDecision};
pub use settings_service::SettingsService;
pub use stats_service::StatsService;
pub use student_service::StudentService;
pub use sync_service::{SyncOutcome, SyncReport, SyncRunner, SyncService};
