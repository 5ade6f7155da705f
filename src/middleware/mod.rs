pub mod json;
pub mod response;
pub mod tenant;

pub use json::JsonBody;
pub use response::{ApiResponse, ApiResult};
pub use tenant::TenantContext;
