//! Account registration and self-service updates.

pub mod service;

pub use service::{AccountService, RegisterAccount, UpdateAccountDetails};
