pub mod account_handlers;
pub mod admin_handlers;
pub mod auth_handlers;
pub mod poll_handlers;
pub mod vote_handlers;
