mod common;

use axum::http::StatusCode;
use common::{Client, SMALL_GIF, TestApp, body_text, location};
use yatube::dto::{INVALID_CHOICE, REQUIRED};

#[tokio::test]
async fn valid_post_form_creates_a_post() {
    let app = TestApp::new();
    let user = app.user("auth");
    let group = app.group("test_group", "test_slug");
    let client = app.client(&user);

    let resp = app
        .post_multipart(
            &client,
            "/create/",
            &[("text", "New_post"), ("group", group.id.to_string().as_str())],
            Some(("small.gif", SMALL_GIF)),
        )
        .await;

    assert_eq!(location(&resp), "/profile/auth/");
    assert_eq!(app.state.store.post_count(), 1);
    let post = &app.state.store.posts()[0];
    assert_eq!(post.text, "New_post");
    assert_eq!(post.group_id, Some(group.id));
    assert_eq!(post.author_id, user.id);
    assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
    assert!(app.media.path().join("posts/small.gif").exists());
}

#[tokio::test]
async fn urlencoded_post_without_image_is_accepted() {
    let app = TestApp::new();
    let user = app.user("auth");
    let client = app.client(&user);

    let resp = app
        .post_form(&client, "/create/", &[("text", "plain"), ("group", "")])
        .await;

    assert_eq!(location(&resp), "/profile/auth/");
    let post = &app.state.store.posts()[0];
    assert_eq!(post.group_id, None);
    assert_eq!(post.image, None);
}

#[tokio::test]
async fn invalid_post_form_rerenders_with_errors() {
    let app = TestApp::new();
    let user = app.user("auth");
    let client = app.client(&user);

    let resp = app
        .post_form(&client, "/create/", &[("text", "  "), ("group", "999")])
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(REQUIRED));
    assert!(html.contains("data-field=\"group\""));
    assert!(html.contains(INVALID_CHOICE));
    assert_eq!(app.state.store.post_count(), 0);
}

#[tokio::test]
async fn non_image_upload_is_rejected_without_writing() {
    let app = TestApp::new();
    let user = app.user("auth");
    let client = app.client(&user);

    let resp = app
        .post_multipart(
            &client,
            "/create/",
            &[("text", "with junk")],
            Some(("notes.gif", b"definitely not an image".as_slice())),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("data-field=\"image\""));
    assert_eq!(app.state.store.post_count(), 0);
    assert!(!app.media.path().join("posts/notes.gif").exists());
}

#[tokio::test]
async fn author_can_edit_post() {
    let app = TestApp::new();
    let user = app.user("auth");
    let group = app.group("test_group", "test_slug");
    let group_2 = app.group("group_title", "group_slug");
    let post = app.post(&user, "test_text", Some(&group));
    let client = app.client(&user);

    let resp = app
        .post_multipart(
            &client,
            &format!("/posts/{}/edit/", post.id),
            &[("text", "edited"), ("group", group_2.id.to_string().as_str())],
            Some(("little.gif", SMALL_GIF)),
        )
        .await;

    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert_eq!(app.state.store.post_count(), 1);
    let edited = app.state.store.post(post.id).unwrap();
    assert_eq!(edited.text, "edited");
    assert_eq!(edited.group_id, Some(group_2.id));
    assert_eq!(edited.image.as_deref(), Some("posts/little.gif"));
    assert_eq!(edited.author_id, user.id);
    assert_eq!(edited.pub_date, post.pub_date);
}

#[tokio::test]
async fn edit_without_upload_keeps_image_and_clear_removes_it() {
    let app = TestApp::new();
    let user = app.user("auth");
    let client = app.client(&user);
    let post = app
        .state
        .store
        .create_post(user.id, "pic".into(), None, Some("posts/old.gif".into()));
    let url = format!("/posts/{}/edit/", post.id);

    app.post_form(&client, &url, &[("text", "still pic")]).await;
    assert_eq!(
        app.state.store.post(post.id).unwrap().image.as_deref(),
        Some("posts/old.gif")
    );

    app.post_form(&client, &url, &[("text", "no pic"), ("image-clear", "on")])
        .await;
    assert_eq!(app.state.store.post(post.id).unwrap().image, None);
}

#[tokio::test]
async fn guest_cannot_create_post() {
    let app = TestApp::new();
    app.user("auth");

    let resp = app
        .post_multipart(
            &Client::guest(),
            "/create/",
            &[("text", "New_post")],
            Some(("3.gif", SMALL_GIF)),
        )
        .await;

    assert_eq!(location(&resp), "/auth/login/?next=/create/");
    assert_eq!(app.state.store.post_count(), 0);
}

#[tokio::test]
async fn non_author_and_guest_cannot_edit() {
    let app = TestApp::new();
    let user = app.user("auth");
    let other = app.user("HasNoName");
    let group = app.group("test_group", "test_slug");
    let group_3 = app.group("group_title_3", "group_slug_3");
    let post = app.post(&user, "test_text", Some(&group));
    let url = format!("/posts/{}/edit/", post.id);

    for client in [app.client(&other), Client::guest()] {
        app.post_multipart(
            &client,
            &url,
            &[("text", "New_post_3"), ("group", group_3.id.to_string().as_str())],
            Some(("4.gif", SMALL_GIF)),
        )
        .await;

        assert_eq!(app.state.store.post_count(), 1);
        assert_eq!(app.state.store.post(post.id).unwrap(), post);
    }
    assert!(!app.media.path().join("posts/4.gif").exists());
}

#[tokio::test]
async fn post_form_pages_render_declared_fields() {
    let app = TestApp::new();
    let user = app.user("auth");
    let group = app.group("test_group", "test_slug");
    let post = app.post(&user, "prefilled text", Some(&group));
    let client = app.client(&user);

    for url in ["/create/".to_string(), format!("/posts/{}/edit/", post.id)] {
        let html = body_text(app.get(&client, &url).await).await;
        assert!(html.contains("<textarea id=\"id_text\" name=\"text\""), "{url}");
        assert!(html.contains("<select id=\"id_group\" name=\"group\">"), "{url}");
        assert!(html.contains("type=\"file\" id=\"id_image\" name=\"image\""), "{url}");
        assert!(html.contains("test_group"), "{url}");
    }

    let html = body_text(app.get(&client, &format!("/posts/{}/edit/", post.id)).await).await;
    assert!(html.contains("prefilled text"));
    assert!(html.contains(" selected>test_group"));
}

#[tokio::test]
async fn valid_comment_is_saved() {
    let app = TestApp::new();
    let user = app.user("auth");
    let post = app.post(&user, "test_text", None);
    let client = app.client(&user);

    let resp = app
        .post_form(&client, &format!("/posts/{}/comment/", post.id), &[("text", "comment_text")])
        .await;

    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    let comments = app.state.store.comments_for(post.id);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "comment_text");
    assert_eq!(comments[0].author_id, user.id);

    let html = body_text(app.get(&client, &format!("/posts/{}/", post.id)).await).await;
    assert!(html.contains("comment_text"));
}

#[tokio::test]
async fn guest_and_blank_comments_are_dropped() {
    let app = TestApp::new();
    let user = app.user("auth");
    let post = app.post(&user, "test_text", None);
    let url = format!("/posts/{}/comment/", post.id);

    let resp = app.post_form(&Client::guest(), &url, &[("text", "comment_text")]).await;
    assert_eq!(location(&resp), format!("/auth/login/?next={url}"));

    let resp = app.post_form(&app.client(&user), &url, &[("text", "")]).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    assert_eq!(app.state.store.comment_count(), 0);
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let app = TestApp::new();
    let user = app.user("auth");

    let resp = app
        .post_form(&app.client(&user), "/posts/777/comment/", &[("text", "hello")])
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    for text in ["hello", ""] {
        let resp = app
            .post_form(&app.client(&user), "/posts/abc/comment/", &[("text", text)])
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "text {text:?}");
    }
}

#[tokio::test]
async fn corrupted_image_is_rejected_without_writing() {
    let app = TestApp::new();
    let user = app.user("auth");

    let resp = app
        .post_multipart(
            &app.client(&user),
            "/create/",
            &[("text", "broken picture")],
            Some(("bad.gif", b"GIF89a this is not a gif at all".as_slice())),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("data-field=\"image\""));
    assert_eq!(app.state.store.post_count(), 0);
    assert!(!app.media.path().join("posts/bad.gif").exists());
}

#[tokio::test]
async fn only_author_can_delete_post() {
    let app = TestApp::new();
    let user = app.user("auth");
    let other = app.user("other");
    let post = app.post(&user, "doomed", None);
    app.state
        .store
        .create_comment(post.id, other.id, "bye".into())
        .unwrap();
    let url = format!("/posts/{}/delete/", post.id);

    let resp = app.post_form(&app.client(&other), &url, &[]).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert_eq!(app.state.store.post_count(), 1);

    let resp = app.post_form(&app.client(&user), &url, &[]).await;
    assert_eq!(location(&resp), "/profile/auth/");
    assert_eq!(app.state.store.post_count(), 0);
    assert_eq!(app.state.store.comment_count(), 0);
}
