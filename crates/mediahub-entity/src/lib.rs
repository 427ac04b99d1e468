//! # mediahub-entity
//!
//! Domain entity models for MediaHub. Stored records derive
//! `sqlx::FromRow`; the read projections in [`projection`] are the only
//! shapes that leave the core, and none of them carries a credential or a
//! refresh token.

pub mod account;
pub mod media;
pub mod projection;
pub mod subscription;

pub use account::{Account, AccountPatch, AccountView, NewAccount, PasswordHash};
pub use media::MediaItem;
pub use projection::{ChannelProfile, OwnerSummary, WatchHistoryEntry};
pub use subscription::Subscription;
