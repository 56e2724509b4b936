use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{Comment, Follow, Group, Post, User},
};

/// In-process relational store.
///
/// Each map is a table; the `*_index` maps are unique indexes. Cascades and
/// `SET NULL` rules live in the delete methods. Every individual write is
/// atomic per key, nothing spans several statements.
#[derive(Clone, Default)]
pub struct Store {
    users: Arc<DashMap<Uuid, User>>,
    username_index: Arc<DashMap<String, Uuid>>,
    email_index: Arc<DashMap<String, Uuid>>,
    groups: Arc<DashMap<u64, Group>>,
    slug_index: Arc<DashMap<String, u64>>,
    posts: Arc<DashMap<u64, Post>>,
    comments: Arc<DashMap<u64, Comment>>,
    follows: Arc<DashMap<u64, Follow>>,
    sequence: Arc<AtomicU64>,
}

/// Shape of one entry in the group seed file.
#[derive(Debug, Deserialize)]
pub struct GroupSeed {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
    posts
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    // ---- users ----

    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: String,
    ) -> Result<User, ApiError> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            hashed_password,
            created_at: Utc::now().timestamp(),
        };

        match self.username_index.entry(user.username.clone()) {
            Entry::Occupied(_) => {
                return Err(ApiError::Conflict("A user with that username already exists.".into()));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        match self.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => {
                self.username_index.remove(&user.username);
                return Err(ApiError::Conflict("A user with that email already exists.".into()));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());

        Ok(user)
    }

    pub fn user(&self, id: &Uuid) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        let id = *self.username_index.get(username)?;
        self.user(&id)
    }

    /// Removes a user together with their posts, comments and follow rows.
    pub fn delete_user(&self, id: &Uuid) -> Result<(), ApiError> {
        let (_, user) = self.users.remove(id).ok_or(ApiError::NotFound)?;
        self.username_index.remove(&user.username);
        self.email_index.remove(&user.email);

        let post_ids: Vec<u64> = self
            .posts
            .iter()
            .filter(|p| p.author_id == *id)
            .map(|p| p.id)
            .collect();
        for post_id in post_ids {
            self.delete_post(post_id)?;
        }
        self.comments.retain(|_, c| c.author_id != *id);
        self.follows.retain(|_, f| f.user_id != *id && f.author_id != *id);

        info!("User deleted: {}", user.username);
        Ok(())
    }

    // ---- groups ----

    pub fn create_group(&self, title: &str, slug: &str, description: &str) -> Result<Group, ApiError> {
        let group = Group {
            id: self.next_id(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        };

        match self.slug_index.entry(group.slug.clone()) {
            Entry::Occupied(_) => {
                return Err(ApiError::Conflict(format!("Group slug {} already exists", slug)));
            }
            Entry::Vacant(slot) => {
                slot.insert(group.id);
            }
        }
        self.groups.insert(group.id, group.clone());

        Ok(group)
    }

    /// Inserts every seed whose slug is not taken yet, returns how many were added.
    pub fn seed_groups(&self, seeds: Vec<GroupSeed>) -> usize {
        seeds
            .into_iter()
            .filter(|seed| {
                self.create_group(&seed.title, &seed.slug, &seed.description)
                    .map_err(|_| debug!("Skipping existing group {}", seed.slug))
                    .is_ok()
            })
            .count()
    }

    /// Reads a JSON array of [`GroupSeed`] and seeds it.
    pub fn seed_groups_from_file(&self, path: &Path) -> Result<usize, ApiError> {
        let raw = std::fs::read_to_string(path)?;
        let seeds: Vec<GroupSeed> = serde_json::from_str(&raw)
            .map_err(|e| ApiError::BadRequest(format!("Invalid group seed file {}: {}", path.display(), e)))?;
        Ok(self.seed_groups(seeds))
    }

    pub fn group(&self, id: u64) -> Option<Group> {
        self.groups.get(&id).map(|g| g.clone())
    }

    pub fn group_by_slug(&self, slug: &str) -> Option<Group> {
        let id = *self.slug_index.get(slug)?;
        self.group(id)
    }

    /// All groups in creation order.
    pub fn groups(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.groups.iter().map(|entry| entry.value().clone()).collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    /// Removes a group; its posts stay but lose their group.
    pub fn delete_group(&self, id: u64) -> Result<(), ApiError> {
        let (_, group) = self.groups.remove(&id).ok_or(ApiError::NotFound)?;
        self.slug_index.remove(&group.slug);
        for mut post in self.posts.iter_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        info!("Group deleted: {}", group.slug);
        Ok(())
    }

    // ---- posts ----

    pub fn create_post(
        &self,
        author_id: Uuid,
        text: String,
        group_id: Option<u64>,
        image: Option<String>,
    ) -> Post {
        let post = Post {
            id: self.next_id(),
            text,
            pub_date: Utc::now(),
            author_id,
            group_id,
            image,
        };
        self.posts.insert(post.id, post.clone());
        post
    }

    pub fn post(&self, id: u64) -> Option<Post> {
        self.posts.get(&id).map(|p| p.clone())
    }

    /// Replaces the mutable fields of an existing post.
    pub fn update_post(&self, id: u64, text: String, group_id: Option<u64>, image: Option<String>) -> Result<Post, ApiError> {
        let mut post = self.posts.get_mut(&id).ok_or(ApiError::NotFound)?;
        post.text = text;
        post.group_id = group_id;
        post.image = image;
        Ok(post.clone())
    }

    /// Removes a post and its comments.
    pub fn delete_post(&self, id: u64) -> Result<(), ApiError> {
        self.posts.remove(&id).ok_or(ApiError::NotFound)?;
        self.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    pub fn posts(&self) -> Vec<Post> {
        newest_first(self.posts.iter().map(|entry| entry.value().clone()).collect())
    }

    pub fn posts_in_group(&self, group_id: u64) -> Vec<Post> {
        newest_first(
            self.posts
                .iter()
                .filter(|p| p.group_id == Some(group_id))
                .map(|p| p.clone())
                .collect(),
        )
    }

    pub fn posts_by_author(&self, author_id: &Uuid) -> Vec<Post> {
        newest_first(
            self.posts
                .iter()
                .filter(|p| p.author_id == *author_id)
                .map(|p| p.clone())
                .collect(),
        )
    }

    /// Posts whose author is followed by `user_id`.
    pub fn feed(&self, user_id: &Uuid) -> Vec<Post> {
        let followed: Vec<Uuid> = self
            .follows
            .iter()
            .filter(|f| f.user_id == *user_id)
            .map(|f| f.author_id)
            .collect();

        newest_first(
            self.posts
                .iter()
                .filter(|p| followed.contains(&p.author_id))
                .map(|p| p.clone())
                .collect(),
        )
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    // ---- comments ----

    pub fn create_comment(&self, post_id: u64, author_id: Uuid, text: String) -> Result<Comment, ApiError> {
        if !self.posts.contains_key(&post_id) {
            return Err(ApiError::NotFound);
        }
        let comment = Comment {
            id: self.next_id(),
            text,
            created: Utc::now(),
            post_id,
            author_id,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    /// Comments of a post, newest first.
    pub fn comments_for(&self, post_id: u64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        comments
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    // ---- follows ----

    /// Raw insert with no duplicate check.
    pub fn insert_follow(&self, user_id: Uuid, author_id: Uuid) -> Follow {
        let follow = Follow {
            id: self.next_id(),
            user_id,
            author_id,
        };
        self.follows.insert(follow.id, follow.clone());
        follow
    }

    /// Returns the existing relation, or inserts one. The flag is true when a
    /// row was created. Check and insert are separate steps.
    pub fn get_or_create_follow(&self, user_id: Uuid, author_id: Uuid) -> (Follow, bool) {
        let existing = self
            .follows
            .iter()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .map(|f| f.clone());

        match existing {
            Some(follow) => (follow, false),
            None => (self.insert_follow(user_id, author_id), true),
        }
    }

    pub fn is_following(&self, user_id: &Uuid, author_id: &Uuid) -> bool {
        self.follows
            .iter()
            .any(|f| f.user_id == *user_id && f.author_id == *author_id)
    }

    /// Deletes every matching relation; `NotFound` when there was none.
    pub fn delete_follow(&self, user_id: &Uuid, author_id: &Uuid) -> Result<usize, ApiError> {
        let mut removed = 0;
        self.follows.retain(|_, f| {
            let hit = f.user_id == *user_id && f.author_id == *author_id;
            if hit {
                removed += 1;
            }
            !hit
        });
        match removed {
            0 => Err(ApiError::NotFound),
            removed => Ok(removed),
        }
    }

    pub fn follow_count(&self) -> usize {
        self.follows.len()
    }
}
