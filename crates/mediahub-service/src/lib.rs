//! # mediahub-service
//!
//! Service layer for MediaHub. Each service orchestrates the store, the
//! asset host, and the credential components to implement one group of
//! use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod aggregate;
pub mod validation;

pub use account::{AccountService, RegisterAccount, UpdateAccountDetails};
pub use aggregate::AggregatorService;
