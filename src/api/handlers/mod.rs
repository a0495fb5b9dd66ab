pub mod chat;
pub mod health;
pub mod messages;
pub mod metrics;
pub mod notifications;
pub mod sessions;
pub mod settings;
pub mod trades;
pub mod wallet;
pub mod ws;

use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
