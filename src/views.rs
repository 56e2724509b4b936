//! Page templates and the view models they render.

use askama::Template;

use crate::{
    dto::{FormErrors, PostForm},
    models::{Comment, Group, Post, User},
    pagination::Page,
    store::Store,
};

const DATE_FORMAT: &str = "%d %B %Y %H:%M";

/// A post with its relations resolved for display.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: u64,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    /// Stored image name relative to the media root.
    pub image: Option<String>,
    pub image_url: Option<String>,
}

impl PostView {
    pub fn build(store: &Store, post: Post) -> Self {
        let author = store
            .user(&post.author_id)
            .map(|u| u.username)
            .unwrap_or_default();
        let group = post.group_id.and_then(|id| store.group(id));
        Self {
            id: post.id,
            pub_date: post.pub_date.format(DATE_FORMAT).to_string(),
            author,
            group_title: group.as_ref().map(|g| g.title.clone()),
            group_slug: group.map(|g| g.slug),
            image_url: post.image.as_ref().map(|name| format!("/media/{name}")),
            image: post.image,
            text: post.text,
        }
    }

    pub fn page(store: &Store, page: Page<Post>) -> Page<PostView> {
        page.map(|post| PostView::build(store, post))
    }
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created: String,
}

impl CommentView {
    pub fn build(store: &Store, comment: Comment) -> Self {
        Self {
            author: store
                .user(&comment.author_id)
                .map(|u| u.username)
                .unwrap_or_default(),
            text: comment.text,
            created: comment.created.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupChoice {
    pub id: u64,
    pub title: String,
    pub selected: bool,
}

/// Everything the post form template needs: current values, choices and
/// per-field errors.
#[derive(Debug, Clone, Default)]
pub struct PostFormView {
    pub text: String,
    pub groups: Vec<GroupChoice>,
    pub current_image: Option<String>,
    pub errors: FormErrors,
}

impl PostFormView {
    pub fn blank(store: &Store) -> Self {
        Self::with_values(store, String::new(), "", None, FormErrors::default())
    }

    pub fn for_post(store: &Store, post: &Post) -> Self {
        let group = post.group_id.map(|id| id.to_string()).unwrap_or_default();
        Self::with_values(store, post.text.clone(), &group, post.image.clone(), FormErrors::default())
    }

    /// Re-renders a rejected submission, keeping what the user typed.
    pub fn rejected(store: &Store, form: PostForm, current_image: Option<String>, errors: FormErrors) -> Self {
        Self::with_values(store, form.text, &form.group, current_image, errors)
    }

    fn with_values(
        store: &Store,
        text: String,
        selected_group: &str,
        current_image: Option<String>,
        errors: FormErrors,
    ) -> Self {
        let groups = store
            .groups()
            .into_iter()
            .map(|g: Group| GroupChoice {
                selected: g.id.to_string() == selected_group,
                id: g.id,
                title: g.title,
            })
            .collect();
        Self {
            text,
            groups,
            current_image,
            errors,
        }
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.for_field(field)
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexPage {
    pub viewer: Option<String>,
    pub page: Page<PostView>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupPage {
    pub viewer: Option<String>,
    pub group: Group,
    pub page: Page<PostView>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfilePage {
    pub viewer: Option<String>,
    pub author: String,
    pub following: bool,
    /// False for guests and for the author looking at their own profile.
    pub can_follow: bool,
    pub page: Page<PostView>,
}

impl ProfilePage {
    pub fn new(viewer: Option<&User>, author: &User, following: bool, page: Page<PostView>) -> Self {
        Self {
            viewer: viewer.map(|u| u.username.clone()),
            author: author.username.clone(),
            following,
            can_follow: viewer.is_some_and(|v| v.id != author.id),
            page,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailPage {
    pub viewer: Option<String>,
    pub post: PostView,
    pub author_post_count: usize,
    pub can_edit: bool,
    pub page: Page<CommentView>,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormPage {
    pub viewer: Option<String>,
    /// Set when editing an existing post.
    pub post_id: Option<u64>,
    pub form: PostFormView,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowPage {
    pub viewer: Option<String>,
    pub page: Page<PostView>,
}

#[derive(Template, Default)]
#[template(path = "users/login.html")]
pub struct LoginPage {
    pub viewer: Option<String>,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

#[derive(Template, Default)]
#[template(path = "users/signup.html")]
pub struct SignupPage {
    pub viewer: Option<String>,
    pub username: String,
    pub email: String,
    pub errors: FormErrors,
}

#[derive(Template, Default)]
#[template(path = "about/author.html")]
pub struct AboutAuthorPage {
    pub viewer: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "about/tech.html")]
pub struct AboutTechPage {
    pub viewer: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "core/404.html")]
pub struct NotFoundPage {
    pub viewer: Option<String>,
}
