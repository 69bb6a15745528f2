pub mod admin;
pub mod auth;
pub mod characters;
pub mod health;
pub mod users;
