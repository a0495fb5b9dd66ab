use serde::Serialize;

use crate::engine::SettlementSnapshot;
use crate::models::AdminMessage;

/// Messages pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "snapshot")]
    Snapshot(SettlementSnapshot),

    #[serde(rename = "admin_message")]
    AdminMessage(AdminMessage),

    #[serde(rename = "session_closed")]
    SessionClosed,
}
