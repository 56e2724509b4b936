use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<u64>,
    /// Path relative to the media root, e.g. `posts/small.gif`.
    pub image: Option<String>,
}

impl Post {
    /// First fifteen characters, used in log lines.
    pub fn preview(&self) -> &str {
        match self.text.char_indices().nth(15) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}
