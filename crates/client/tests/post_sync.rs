//! Integration tests for the post sync controller against a mocked backend.

use std::rc::Rc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postboard_client::{
    route_decision, ApiClient, LoadOutcome, PostSyncController, RouteDecision, SessionStore,
    SyncError,
};

const TOKEN: &str = "tok";

fn controller_for(server: &MockServer) -> (PostSyncController, Rc<SessionStore>) {
    let session = Rc::new(SessionStore::ephemeral());
    session.set(TOKEN);
    let controller = PostSyncController::new(ApiClient::new(server.uri()), Rc::clone(&session));
    (controller, session)
}

fn profile_json() -> serde_json::Value {
    json!({"id": 1, "email": "a@example.com"})
}

fn post_json(id: i64, title: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "createdAt": "2026-08-01T10:00:00Z",
    })
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn load_publishes_profile_and_posts() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            post_json(2, "Second", "b"),
            post_json(1, "First", "a"),
        ])))
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    let outcome = controller.load_all().await.unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(controller.user().unwrap().email, "a@example.com");
    // Server ordering is preserved as-is
    let ids: Vec<i64> = controller.posts().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn profile_401_clears_session_and_redirects_ignoring_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    // Posts succeed, but the payload must be ignored
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json(1, "Ghost", "x")])),
        )
        .mount(&server)
        .await;

    let (controller, session) = controller_for(&server);
    let err = controller.load_all().await.unwrap_err();

    assert_eq!(err, SyncError::SessionInvalidated);
    assert_eq!(session.get(), None);
    assert_eq!(route_decision(&session), RouteDecision::RedirectToLogin);
    assert!(controller.posts().is_empty());
    assert_eq!(controller.user(), None);
}

#[tokio::test]
async fn posts_failure_alone_still_publishes_profile() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (controller, session) = controller_for(&server);
    let outcome = controller.load_all().await.unwrap();

    assert_eq!(
        outcome,
        LoadOutcome::PostsFailed("Could not load your posts.".to_string())
    );
    assert_eq!(controller.user().unwrap().email, "a@example.com");
    // Session stays valid: this is a posts-only failure
    assert_eq!(session.get().as_deref(), Some(TOKEN));
    assert_eq!(route_decision(&session), RouteDecision::Allow);
}

#[tokio::test]
async fn failed_posts_refetch_clears_stale_entries() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    // First fetch succeeds; the refetch fails
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(1, "a", "1")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();
    assert_eq!(controller.posts().len(), 1);

    let outcome = controller.load_all().await.unwrap();

    assert!(matches!(outcome, LoadOutcome::PostsFailed(_)));
    // The previously cached list must not survive the failed reconciliation
    assert!(controller.posts().is_empty());
    assert_eq!(controller.user().unwrap().email, "a@example.com");
}

#[tokio::test]
async fn create_post_reconciles_by_refetch_and_resets_draft() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    // First fetch: empty board; second fetch (after create): server-assigned post
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(99, "T", "C")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(header("Authorization", "Bearer tok"))
        .and(body_json(json!({"title": "T", "content": "C"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(post_json(99, "T", "C")))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();
    assert!(controller.posts().is_empty());

    controller.update_draft("T", "C");
    controller.create_post().await.unwrap();

    let posts = controller.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 99);
    assert_eq!(posts[0].title, "T");
    assert!(controller.draft().title.is_empty());
    assert!(controller.draft().content.is_empty());
    assert!(!controller.is_mutating());
}

#[tokio::test]
async fn create_post_with_empty_fields_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.update_draft("only a title", "   ");

    let err = controller.create_post().await.unwrap_err();

    assert_eq!(
        err,
        SyncError::Validation("Title and content are required.".to_string())
    );
    assert_eq!(controller.draft().title, "only a title");
}

#[tokio::test]
async fn create_post_failure_preserves_draft_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Title too long."})),
        )
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.update_draft("T", "C");

    let err = controller.create_post().await.unwrap_err();

    assert_eq!(err, SyncError::Operation("Title too long.".to_string()));
    assert_eq!(controller.draft().title, "T");
    assert_eq!(controller.draft().content, "C");
    assert!(!controller.is_mutating());
}

#[tokio::test]
async fn update_post_round_trips_new_fields_through_refetch() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json(7, "old title", "old")])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([post_json(7, "new title", "new content")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/posts/7"))
        .and(body_json(json!({"title": "new title", "content": "new content"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();

    assert!(controller.begin_edit(7));
    controller.update_edit("new title", "new content");
    controller.update_post().await.unwrap();

    assert_eq!(controller.editing(), None);
    let posts = controller.posts();
    assert_eq!(posts[0].title, "new title");
    assert_eq!(posts[0].content, "new content");
}

#[tokio::test]
async fn update_post_failure_preserves_edit_buffer() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(7, "t", "c")])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/posts/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();

    controller.begin_edit(7);
    controller.update_edit("edited", "still editing");
    let err = controller.update_post().await.unwrap_err();

    assert_eq!(
        err,
        SyncError::Operation("Could not update the post.".to_string())
    );
    let edit = controller.editing().unwrap();
    assert_eq!(edit.title, "edited");
    // The cache keeps the pre-edit server state
    assert_eq!(controller.posts()[0].title, "t");
}

#[tokio::test]
async fn delete_post_removes_entry_locally_without_refetch() {
    let server = MockServer::start().await;
    // Exactly one GET each: the delete must not trigger a reload
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            post_json(41, "a", "1"),
            post_json(42, "b", "2"),
            post_json(43, "c", "3"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/posts/42"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();
    assert_eq!(controller.posts().len(), 3);

    controller.delete_post(42).await.unwrap();

    let posts = controller.posts();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.id != 42));
}

#[tokio::test]
async fn concurrent_mutations_are_rejected_not_queued() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            post_json(41, "a", "1"),
            post_json(42, "b", "2"),
        ])))
        .mount(&server)
        .await;
    // The delay keeps the first delete in flight while the second arrives
    Mock::given(method("DELETE"))
        .and(path("/posts/41"))
        .respond_with(
            ResponseTemplate::new(204).set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/posts/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();

    let (first, second) = tokio::join!(controller.delete_post(41), controller.delete_post(42));

    // The second mutation is ignored, not queued: post 42 was never deleted
    assert_eq!(first, Ok(()));
    assert_eq!(second, Ok(()));
    let ids: Vec<i64> = controller.posts().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![42]);
    assert!(!controller.is_mutating());
}

#[tokio::test]
async fn delete_post_failure_leaves_cache_untouched() {
    let server = MockServer::start().await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/posts/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(42, "b", "2")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/posts/42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (controller, _session) = controller_for(&server);
    controller.load_all().await.unwrap();

    let err = controller.delete_post(42).await.unwrap_err();

    assert_eq!(
        err,
        SyncError::Operation("Could not delete the post.".to_string())
    );
    assert_eq!(controller.posts().len(), 1);
    assert_eq!(controller.posts()[0].id, 42);
}

#[tokio::test]
async fn load_without_token_reports_invalidated_session() {
    let server = MockServer::start().await;
    let session = Rc::new(SessionStore::ephemeral());
    let controller = PostSyncController::new(ApiClient::new(server.uri()), Rc::clone(&session));

    let err = controller.load_all().await.unwrap_err();

    assert_eq!(err, SyncError::SessionInvalidated);
}
