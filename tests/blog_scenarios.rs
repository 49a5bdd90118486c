//! End-to-end scenarios against an in-memory store
//!
//! These tests exercise the blog service the way resolvers do:
//! - mutation fan-out to topic subscribers
//! - paginated list queries
//! - the unpublish cascade
//! - identity, ownership and visibility rules

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use blog_api::db::UpdatePost;
use blog_api::error::ApiError;
use blog_api::services::events::EventPayload;
use blog_api::services::paginator::PageLink;
use blog_api::services::{ListArgs, MutationKind, NewComment, PageLinks, Topic, UserChanges};

use common::{blog, sign_up, write_post};

// ============================================================================
// Event fan-out
// ============================================================================

#[tokio::test]
async fn published_post_reaches_global_and_author_topics_only() {
    let blog = blog().await;
    let (u1, u1_auth) = sign_up(&blog, "Ada").await;
    let (u2, _) = sign_up(&blog, "Brian").await;

    let mut global = blog.events().subscribe(Topic::Posts);
    let mut mine = blog.events().subscribe(Topic::UserPosts(u1.id.clone()));
    let mut theirs = blog.events().subscribe(Topic::UserPosts(u2.id.clone()));

    let post = write_post(&blog, &u1_auth, "Hello", true).await;

    let event = global.try_recv().expect("global event");
    assert_eq!(event.kind, MutationKind::Created);
    assert_matches!(event.payload, EventPayload::Post(ref p) if p.id == post.id);
    assert_eq!(global.try_recv(), None);

    let event = mine.try_recv().expect("author event");
    assert_eq!(event.kind, MutationKind::Created);
    assert_eq!(mine.try_recv(), None);

    assert_eq!(theirs.try_recv(), None);
}

#[tokio::test]
async fn drafts_only_reach_the_author() {
    let blog = blog().await;
    let (u1, u1_auth) = sign_up(&blog, "Ada").await;

    let mut global = blog.events().subscribe(Topic::Posts);
    let mut mine = blog.subscribe_my_posts(Some(&u1_auth)).await.unwrap();
    assert_eq!(mine.topic(), &Topic::UserPosts(u1.id.clone()));

    write_post(&blog, &u1_auth, "Draft", false).await;

    assert_eq!(global.try_recv(), None);
    assert_matches!(mine.try_recv(), Some(e) if e.kind == MutationKind::Created);
}

#[tokio::test]
async fn comment_events_follow_their_post() {
    let blog = blog().await;
    let (_, auth) = sign_up(&blog, "Ada").await;
    let post = write_post(&blog, &auth, "Hello", true).await;
    let other = write_post(&blog, &auth, "Other", true).await;

    let mut comments = blog.subscribe_comments(&post.id).await.unwrap();
    let mut other_comments = blog.subscribe_comments(&other.id).await.unwrap();

    let comment = blog
        .create_comment(
            Some(&auth),
            NewComment {
                text: "First!".into(),
                post_id: post.id.clone(),
            },
        )
        .await
        .unwrap();
    blog.update_comment(Some(&auth), &comment.id, "Edited".into())
        .await
        .unwrap();

    let created = comments.try_recv().expect("created");
    let updated = comments.try_recv().expect("updated");
    assert_eq!(created.kind, MutationKind::Created);
    assert_eq!(updated.kind, MutationKind::Updated);
    assert_matches!(updated.payload, EventPayload::Comment(ref c) if c.text == "Edited");
    assert_eq!(other_comments.try_recv(), None);
}

#[tokio::test]
async fn subscribing_to_missing_post_fails() {
    let blog = blog().await;
    let result = blog.subscribe_comments("nope").await;
    assert_matches!(result, Err(ApiError::NotFound(msg)) if msg == "Post not found");
    assert_eq!(blog.events().topic_count(), 0);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn second_page_of_twenty_five() {
    let blog = blog().await;
    let (_, auth) = sign_up(&blog, "Ada").await;
    for i in 0..25 {
        write_post(&blog, &auth, &format!("Post {:02}", i), true).await;
    }
    write_post(&blog, &auth, "Hidden draft", false).await;

    let page = blog
        .posts(&ListArgs {
            page: Some(2),
            take: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.count, 25);
    assert_eq!(page.results.len(), 10);
    assert_eq!(page.results[0].title, "Post 10");
    assert_eq!(
        page.pagination,
        Some(PageLinks {
            previous: Some(PageLink { page: 1, take: 10 }),
            next: Some(PageLink { page: 3, take: 5 }),
        })
    );
}

#[tokio::test]
async fn single_page_has_no_pagination() {
    let blog = blog().await;
    let (_, auth) = sign_up(&blog, "Ada").await;
    write_post(&blog, &auth, "Only", true).await;

    let page = blog.posts(&ListArgs::default()).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.pagination, None);

    let err = blog
        .posts(&ListArgs {
            page: Some(0),
            take: Some(10),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::ValidationFailed(_));
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let blog = blog().await;
    let (_, auth) = sign_up(&blog, "Ada").await;
    write_post(&blog, &auth, "Only", true).await;

    let page = blog
        .posts(&ListArgs {
            page: Some(i64::MAX),
            take: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert!(page.results.is_empty());
    assert_eq!(
        page.pagination.and_then(|links| links.next),
        None
    );
}

#[tokio::test]
async fn search_and_limit_narrow_results() {
    let blog = blog().await;
    let (_, auth) = sign_up(&blog, "Ada").await;
    write_post(&blog, &auth, "Learning Rust", true).await;
    write_post(&blog, &auth, "Gardening", true).await;
    write_post(&blog, &auth, "Rust draft", false).await;

    let page = blog
        .posts(&ListArgs {
            filter: Some("rust".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].title, "Learning Rust");

    let mine = blog
        .my_posts(
            Some(&auth),
            &ListArgs {
                filter: Some("RUST".into()),
                limit: vec![("published", false.into())],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(mine.count, 1);
    assert_eq!(mine.results[0].title, "Rust draft");
}

#[tokio::test]
async fn text_matching_folds_non_ascii_case() {
    let blog = blog().await;
    let (_, auth) = sign_up(&blog, "Ada").await;
    write_post(&blog, &auth, "École", true).await;
    write_post(&blog, &auth, "Ecole", true).await;

    let searched = blog
        .posts(&ListArgs {
            filter: Some("éCOLE".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.count, 1);
    assert_eq!(searched.results[0].title, "École");

    let limited = blog
        .posts(&ListArgs {
            limit: vec![("title", "éCOLE".into())],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.count, 1);
    assert_eq!(limited.results[0].title, "École");

    let updated = blog
        .update_post(
            Some(&auth),
            &searched.results[0].id,
            UpdatePost {
                title: Some("ÜBER".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let found = blog
        .posts(&ListArgs {
            filter: Some("über".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.results, vec![updated]);
}

// ============================================================================
// Unpublish cascade
// ============================================================================

#[tokio::test]
async fn unpublishing_removes_comments() {
    let blog = blog().await;
    let (_, author) = sign_up(&blog, "Ada").await;
    let (_, reader) = sign_up(&blog, "Brian").await;
    let post = write_post(&blog, &author, "Hello", true).await;

    for (auth, text) in [(&author, "Thanks for reading"), (&reader, "Nice post")] {
        blog.create_comment(
            Some(auth),
            NewComment {
                text: text.into(),
                post_id: post.id.clone(),
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(blog.post_comments(&post.id).await.unwrap().len(), 2);

    let mut global = blog.events().subscribe(Topic::Posts);
    let updated = blog
        .update_post(
            Some(&author),
            &post.id,
            UpdatePost {
                published: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!updated.published);
    assert!(blog.post_comments(&post.id).await.unwrap().is_empty());
    assert_eq!(blog.comments(&ListArgs::default()).await.unwrap().count, 0);
    // No longer published, so the global topic stays quiet
    assert_eq!(global.try_recv(), None);
}

#[tokio::test]
async fn editing_a_published_post_keeps_comments() {
    let blog = blog().await;
    let (_, author) = sign_up(&blog, "Ada").await;
    let post = write_post(&blog, &author, "Hello", true).await;
    blog.create_comment(
        Some(&author),
        NewComment {
            text: "Note".into(),
            post_id: post.id.clone(),
        },
    )
    .await
    .unwrap();

    blog.update_post(
        Some(&author),
        &post.id,
        UpdatePost {
            title: Some("Hello again".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(blog.post_comments(&post.id).await.unwrap().len(), 1);
}

// ============================================================================
// Identity, ownership and visibility
// ============================================================================

#[tokio::test]
async fn identity_modes() {
    let blog = blog().await;
    let (user, auth) = sign_up(&blog, "Ada").await;

    assert_matches!(
        blog.my_posts(None, &ListArgs::default()).await,
        Err(ApiError::AuthenticationRequired)
    );
    assert_matches!(
        blog.me(Some("Bearer not-a-token")).await,
        Err(ApiError::AuthenticationFailed(_))
    );
    assert_eq!(blog.me(Some(&auth)).await.unwrap().id, user.id);

    // Optional mode: anonymous is fine, a bad token is not
    let post = write_post(&blog, &auth, "Public", true).await;
    assert!(blog.post(None, &post.id).await.is_ok());
    assert_matches!(
        blog.post(Some("Bearer garbage"), &post.id).await,
        Err(ApiError::AuthenticationFailed(_))
    );
}

#[tokio::test]
async fn drafts_are_visible_to_their_author_only() {
    let blog = blog().await;
    let (_, author) = sign_up(&blog, "Ada").await;
    let (_, stranger) = sign_up(&blog, "Brian").await;
    let draft = write_post(&blog, &author, "Secret", false).await;

    assert_eq!(blog.post(Some(&author), &draft.id).await.unwrap().id, draft.id);
    assert_matches!(blog.post(None, &draft.id).await, Err(ApiError::NotFound(_)));
    assert_matches!(
        blog.post(Some(&stranger), &draft.id).await,
        Err(ApiError::NotFound(_))
    );
}

#[tokio::test]
async fn foreign_posts_look_missing() {
    let blog = blog().await;
    let (_, author) = sign_up(&blog, "Ada").await;
    let (_, stranger) = sign_up(&blog, "Brian").await;
    let post = write_post(&blog, &author, "Mine", true).await;

    let update = blog
        .update_post(Some(&stranger), &post.id, UpdatePost::default())
        .await;
    assert_matches!(update, Err(ApiError::NotFound(msg)) if msg == "Unable to update post");

    let delete = blog.delete_post(Some(&stranger), &post.id).await;
    assert_matches!(delete, Err(ApiError::NotFound(msg)) if msg == "Unable to delete post");

    let deleted = blog.delete_post(Some(&author), &post.id).await.unwrap();
    assert_eq!(deleted.id, post.id);
    assert_eq!(blog.post_by_id(&post.id).await.unwrap(), None);
}

#[tokio::test]
async fn comment_rules() {
    let blog = blog().await;
    let (_, author) = sign_up(&blog, "Ada").await;
    let (_, reader) = sign_up(&blog, "Brian").await;
    let (_, stranger) = sign_up(&blog, "Carol").await;
    let post = write_post(&blog, &author, "Hello", true).await;
    let draft = write_post(&blog, &author, "Draft", false).await;

    let on_draft = blog
        .create_comment(
            Some(&reader),
            NewComment {
                text: "Early".into(),
                post_id: draft.id.clone(),
            },
        )
        .await;
    assert_matches!(on_draft, Err(ApiError::NotFound(_)));

    let comment = blog
        .create_comment(
            Some(&reader),
            NewComment {
                text: "Hi".into(),
                post_id: post.id.clone(),
            },
        )
        .await
        .unwrap();

    // Only the comment's author may edit it
    assert_matches!(
        blog.update_comment(Some(&author), &comment.id, "Edited".into())
            .await,
        Err(ApiError::NotFound(_))
    );

    // A stranger may not delete it, the post's author may
    assert_matches!(
        blog.delete_comment(Some(&stranger), &comment.id).await,
        Err(ApiError::NotFound(_))
    );
    let mut events = blog.subscribe_comments(&post.id).await.unwrap();
    let deleted = blog.delete_comment(Some(&author), &comment.id).await.unwrap();
    assert_eq!(deleted.id, comment.id);
    assert_matches!(events.try_recv(), Some(e) if e.kind == MutationKind::Deleted);
}

#[tokio::test]
async fn login_and_account_lifecycle() {
    let blog = blog().await;
    let (user, auth) = sign_up(&blog, "Ada").await;

    let session = blog
        .login("ADA@example.com", "correct horse battery")
        .await
        .unwrap();
    assert_eq!(session.user.id, user.id);

    assert_matches!(
        blog.login("ada@example.com", "wrong password").await,
        Err(ApiError::AuthenticationFailed(msg)) if msg == "Unable to login"
    );
    assert_matches!(
        blog.login("nobody@example.com", "whatever1").await,
        Err(ApiError::AuthenticationFailed(msg)) if msg == "Unable to login"
    );

    let duplicate = blog
        .create_user(blog_api::services::NewUser {
            name: "Imposter".into(),
            email: "Ada@Example.COM".into(),
            password: "long enough pw".into(),
        })
        .await;
    assert_matches!(duplicate, Err(ApiError::ValidationFailed(_)));

    let short = blog
        .update_user(
            Some(&auth),
            UserChanges {
                password: Some("short".into()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(short, Err(ApiError::ValidationFailed(_)));

    let renamed = blog
        .update_user(
            Some(&auth),
            UserChanges {
                name: Some("Ada L.".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Ada L.");

    let post = write_post(&blog, &auth, "Soon gone", true).await;
    blog.delete_user(Some(&auth)).await.unwrap();

    assert_eq!(blog.post_by_id(&post.id).await.unwrap(), None);
    assert_matches!(blog.me(Some(&auth)).await, Err(ApiError::NotFound(_)));
}
