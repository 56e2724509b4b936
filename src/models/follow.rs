use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed edge: `user` follows `author`.
///
/// Rows carry their own id and the store keeps no index on the
/// `(user, author)` pair, so nothing below the handlers prevents duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub id: u64,
    pub user_id: Uuid,
    pub author_id: Uuid,
}
