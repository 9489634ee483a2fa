pub mod password;
pub mod policy;
pub mod session;

pub use password::PasswordService;
pub use session::{Session, SessionStore};
