//! Account entities.

pub mod identity;
pub mod model;
pub mod view;

pub use identity::{normalize_email, normalize_username};
pub use model::{Account, AccountPatch, NewAccount, PasswordHash};
pub use view::AccountView;
