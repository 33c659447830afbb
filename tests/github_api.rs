use changegate::{Forge, GateError, GitHub, Repo, ReviewState};
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

fn test_repo() -> Repo {
    Repo::new("owner", "repo").unwrap()
}

fn client_for(server: &MockServer) -> GitHub {
    let api_url = Url::parse(&server.uri()).unwrap();
    GitHub::new("ghp_test", &api_url).unwrap()
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    }))
}

fn assert_host_error(err: &anyhow::Error, operation: &str) {
    let gate_err = err.downcast_ref::<GateError>().unwrap();
    assert!(gate_err.is_host());
    assert!(err.to_string().contains(operation));
}

#[tokio::test]
async fn test_compare_commits_lists_filenames_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/compare/b4se...he4d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ahead",
            "files": [
                { "filename": "src/a.ts", "status": "modified" },
                { "filename": "docs/readme.md", "status": "added" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let paths = client_for(&server)
        .compare_commits(&test_repo(), "b4se", "he4d")
        .await
        .unwrap();

    assert_eq!(paths, vec!["src/a.ts", "docs/readme.md"]);
}

#[tokio::test]
async fn test_compare_commits_without_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/compare/b4se...he4d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "identical" })))
        .mount(&server)
        .await;

    let paths = client_for(&server)
        .compare_commits(&test_repo(), "b4se", "he4d")
        .await
        .unwrap();

    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_compare_commits_failure_is_a_host_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/compare/b4se...he4d"))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .compare_commits(&test_repo(), "b4se", "he4d")
        .await
        .unwrap_err();

    assert_host_error(&err, "compare commits");
}

#[tokio::test]
async fn test_commit_lookup_strips_refs_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/commits/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "0002",
            "commit": { "message": "release: v2.0\n\nNotes" },
            "files": [{ "filename": "Cargo.toml" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let commit = client_for(&server)
        .commit(&test_repo(), "refs/heads/main")
        .await
        .unwrap();

    assert_eq!(commit.message, "release: v2.0\n\nNotes");
    assert_eq!(commit.paths, vec!["Cargo.toml"]);
}

#[tokio::test]
async fn test_commit_lookup_failure_is_a_host_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/commits/deadbeef"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let err = client_for(&server)
        .commit(&test_repo(), "deadbeef")
        .await
        .unwrap_err();

    assert_host_error(&err, "get commit");
}

#[tokio::test]
async fn test_pull_request_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo/pulls/7/reviews"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "state": "COMMENTED", "body": "nit" },
            { "id": 2, "state": "APPROVED", "body": "" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = client_for(&server)
        .pull_request_reviews(&test_repo(), 7)
        .await
        .unwrap();

    assert_eq!(reviews, vec![ReviewState::Commented, ReviewState::Approved]);
}

#[tokio::test]
async fn test_submit_approval_posts_approve_review() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/owner/repo/pulls/7/reviews"))
        .and(body_json(json!({
            "body": "Auto approved based on commit conditions",
            "event": "APPROVE"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "state": "APPROVED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .submit_approval(&test_repo(), 7, "Auto approved based on commit conditions")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_submit_approval_failure_is_a_host_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/owner/repo/pulls/7/reviews"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Can not approve your own pull request",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_approval(&test_repo(), 7, "ok")
        .await
        .unwrap_err();

    assert_host_error(&err, "create review");
}
