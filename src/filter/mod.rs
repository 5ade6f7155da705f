pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod list_query;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use list_query::{ListQuery, ListSpec};
pub use error::FilterError;
