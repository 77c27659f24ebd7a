pub mod error;
pub mod notifier;
pub mod password;
pub mod policy;
pub mod services;
pub mod traits;
