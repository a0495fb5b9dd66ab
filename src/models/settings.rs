use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub email: bool,
    pub push: bool,
    pub price_alerts: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            price_alerts: true,
        }
    }
}

/// Per-user preferences, stored as a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub theme: String,
    pub language: String,
    pub notifications: NotificationPrefs,
    pub currency: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: "dark".into(),
            language: "en".into(),
            notifications: NotificationPrefs::default(),
            currency: "USDT".into(),
        }
    }
}
