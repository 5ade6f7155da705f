pub mod finance;
pub mod graphql;
pub mod profile;
pub mod resource;
pub mod settings;
