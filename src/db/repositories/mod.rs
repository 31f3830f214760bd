//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod settings_repo;
pub mod snapshot_repo;
pub mod student_repo;

pub use settings_repo::SettingsRepository;
pub use snapshot_repo::SnapshotRepository;
pub use student_repo::StudentRepository;
