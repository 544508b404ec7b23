use serde::Serialize;
use crate::domain::models::user::{email_local_part, User};

/// The authenticated caller of a request.
///
/// Built by the `AuthUser` extractor from a verified access token and handed
/// explicitly to every service call. It lives exactly as long as the access
/// token: established at login, renewed by refresh, gone after logout.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.username.clone(),
        }
    }

    /// Name recorded on membership entries created by this session.
    pub fn member_name(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => email_local_part(&self.email).to_string(),
        }
    }
}
