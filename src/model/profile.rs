use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PROFILE_NAME: &str = "Player";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl Profile {
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_PROFILE_NAME
        } else {
            name
        };
        Self {
            id: generate_id(),
            name: name.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

fn generate_id() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("p_{}", &token[..12])
}
