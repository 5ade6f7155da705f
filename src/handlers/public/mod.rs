pub mod health;
pub mod root;
pub mod webhooks;

pub use health::health;
pub use root::root;
pub use webhooks::payments as payment_webhook;
