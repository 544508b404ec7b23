use serde::Serialize;

#[derive(Serialize)]
pub struct DisplayNameResponse {
    pub user_id: String,
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
