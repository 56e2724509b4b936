use serde::{Deserialize, Serialize};

/// A topical community posts can be filed under. Groups are seeded, never
/// created through the web surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub description: String,
}
