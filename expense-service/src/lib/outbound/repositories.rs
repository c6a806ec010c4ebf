pub mod expense;
pub mod team;
pub mod user;
