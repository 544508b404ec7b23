use std::sync::Arc;
use crate::domain::ports::{AuthRepository, EventRepository, UserRepository};
use crate::domain::services::{
    auth_service::AuthService,
    directory::Directory,
    membership::MembershipService,
    views::ViewService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
    pub membership: Arc<MembershipService>,
    pub directory: Arc<Directory>,
    pub views: Arc<ViewService>,
}
