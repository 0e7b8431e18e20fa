pub mod admin;
pub mod announcements;
pub mod auth;
pub mod me;
pub mod tickets;
