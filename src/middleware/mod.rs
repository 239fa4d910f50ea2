pub mod cookies;
pub mod csrf;
pub mod flash;
pub mod session;

pub use session::Session;
