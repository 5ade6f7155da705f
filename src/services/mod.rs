pub mod audit;
pub mod finance;
pub mod profile;
pub mod settings;

pub use audit::{AuditEntry, AuditService};
pub use profile::ProfileService;
pub use settings::SettingsService;
