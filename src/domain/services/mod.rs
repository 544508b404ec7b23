pub mod auth_service;
pub mod directory;
pub mod images;
pub mod membership;
pub mod views;
