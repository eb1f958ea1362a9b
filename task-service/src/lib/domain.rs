pub mod identity;
pub mod task;
pub mod user;
