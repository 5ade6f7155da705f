pub mod audit_log;
pub mod contact;
pub mod emergency_contact;
pub mod job_history;
pub mod marketplace;
pub mod pipeline;
pub mod profile;
pub mod setting;
pub mod transaction;

pub use audit_log::{AuditLog, AuditLogRow};
pub use contact::{Contact, ContactRow, CreateContact, UpdateContact};
pub use emergency_contact::{
    CreateEmergencyContact, EmergencyContact, EmergencyContactRow, UpdateEmergencyContact,
};
pub use job_history::{CreateJobHistory, EmploymentType, JobHistory, JobHistoryRow, UpdateJobHistory};
pub use marketplace::{
    CreateMarketplaceResource, ListingStatus, MarketplaceResource, MarketplaceResourceRow,
    UpdateMarketplaceResource,
};
pub use pipeline::{CreatePipelineJob, JobStatus, PipelineJob, PipelineJobRow, UpdatePipelineJob};
pub use profile::{Profile, ProfileInput, ProfileRow};
pub use setting::{Setting, SettingBody, SettingInput, SettingRow};
pub use transaction::{
    CreateTransaction, Transaction, TransactionKind, TransactionRow, TransactionStatus, UpdateTransaction,
};
