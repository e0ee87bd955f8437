pub mod catalog;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod loyalty;
pub mod types;

pub use config::LoyaltyConfig;
pub use error::{LoyaltyError, LoyaltyResult};
