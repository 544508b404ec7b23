pub mod auth;
pub mod event;
pub mod health;
pub mod membership;
pub mod users;
pub mod views;
