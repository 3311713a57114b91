pub mod gate;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod session;
pub mod validate;
