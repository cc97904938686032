pub mod identity;
pub mod mailer;
pub mod repository;

pub use identity::{Role, User};
pub use mailer::{LogMailer, Mailer};
pub use repository::{StoreError, UserStore};
