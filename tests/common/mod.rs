#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, StatusCode, header},
};
use tempfile::TempDir;
use tower::ServiceExt;
use yatube::{
    AppState, app,
    auth::create_token,
    config::Config,
    models::{Group, Post, User},
};

pub const SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "yatube-test-boundary";

/// 1x1 GIF.
pub const SMALL_GIF: &[u8] = b"GIF89a\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff\x21\xf9\x04\x00\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0c\x0a\x00\x3b";

pub struct TestApp {
    pub state: AppState,
    router: Router,
    pub media: TempDir,
}

pub struct Client {
    token: Option<String>,
}

impl Client {
    pub fn guest() -> Self {
        Self { token: None }
    }
}

impl TestApp {
    pub fn new() -> Self {
        let media = tempfile::tempdir().expect("temp media root");
        let mut config = Config::new(SECRET, media.path());
        config.bcrypt_cost = 4;
        let state = AppState::new(config);
        let router = app(state.clone());
        Self { state, router, media }
    }

    pub fn user(&self, username: &str) -> User {
        self.state
            .store
            .create_user(username, &format!("{username}@example.com"), "unused".into())
            .expect("create user")
    }

    pub fn client(&self, user: &User) -> Client {
        Client {
            token: Some(create_token(&user.id, &user.username, SECRET).expect("token")),
        }
    }

    pub fn group(&self, title: &str, slug: &str) -> Group {
        self.state
            .store
            .create_group(title, slug, &format!("{title} description"))
            .expect("create group")
    }

    pub fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.state
            .store
            .create_post(author.id, text.into(), group.map(|g| g.id), None)
    }

    async fn send(&self, client: &Client, mut req: Request<Body>) -> Response<Body> {
        if let Some(token) = &client.token {
            req.headers_mut().insert(
                header::AUTHORIZATION,
                format!("Bearer {token}").parse().unwrap(),
            );
        }
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Sends a hand-built request as is.
    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, client: &Client, uri: &str) -> Response<Body> {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(client, req).await
    }

    pub async fn post_form(&self, client: &Client, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(client, req).await
    }

    /// Multipart submission, optionally with an `image` file.
    pub async fn post_multipart(
        &self,
        client: &Client,
        uri: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/gif\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(client, req).await
    }
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> String {
    assert_eq!(resp.status(), StatusCode::FOUND, "expected a redirect");
    resp.headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Number of post cards on a rendered listing.
pub fn post_cards(html: &str) -> usize {
    html.matches("<article class=\"post\"").count()
}

pub fn shows_post(html: &str, post: &Post) -> bool {
    html.contains(&format!("data-post-id=\"{}\"", post.id))
}
