//! Integration tests for tangled-mcp
//!
//! These tests run against a real Tangled repository through the account's PDS.
//! They require:
//! - TANGLED_HANDLE and TANGLED_PASSWORD (an app password)
//! - Network access to the PDS, tangled.org and the repository's knot
//!
//! # Running tests
//!
//! ```bash
//! # Run read-only tests (safe, no side effects)
//! cargo test -p tangled-mcp --test integration -- --ignored read_
//!
//! # Run all integration tests (includes write tests)
//! cargo test -p tangled-mcp --test integration -- --ignored
//!
//! # Run with custom test repo
//! TEST_REPO=owner.handle/repo cargo test -p tangled-mcp --test integration -- --ignored
//! ```
//!
//! Read tests default to `tangled.org/core`. Write tests open an issue and
//! delete it again, so they only run against a repo named in `TEST_REPO`.

use std::env;
use std::sync::Arc;

use tangled_mcp::atproto::{Credentials, XrpcClient};
use tangled_mcp::tangled::{IssueUpdate, KnotClient, NewIssue, ServiceSettings, Tangled};
use tangled_mcp::Config;

const DEFAULT_READ_REPO: &str = "tangled.org/core";

/// Get the test repository from environment or use default
fn test_repo() -> String {
    env::var("TEST_REPO").unwrap_or_else(|_| DEFAULT_READ_REPO.to_string())
}

/// Repository that write tests may modify: only one set explicitly
fn write_repo_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup("TEST_REPO").filter(|repo| !repo.trim().is_empty())
}

fn write_repo() -> Option<String> {
    let repo = write_repo_from(|key: &str| env::var(key).ok());
    if repo.is_none() {
        eprintln!("Skipping: set TEST_REPO to a repo you own to run write tests");
    }
    repo
}

/// Build a client from the environment, or None when no account is configured
fn connect() -> Option<Tangled> {
    let config = Config::load_with(None, |key: &str| env::var(key).ok()).ok()?;
    if config.validate().is_err() {
        eprintln!("Skipping: TANGLED_HANDLE / TANGLED_PASSWORD not set");
        return None;
    }

    let pds = XrpcClient::new(
        config.account.pds_url.clone(),
        Credentials {
            identifier: config.account.handle.clone(),
            password: config.account.password.clone(),
        },
        config.timeout(),
        config.session_ttl(),
    )
    .ok()?;
    let knots = KnotClient::new(config.timeout()).ok()?;
    Some(Tangled::new(
        Arc::new(pds),
        knots,
        ServiceSettings {
            service_did: config.tangled.service_did.clone(),
            scan_limit: config.tangled.scan_limit,
        },
    ))
}

// ============================================================================
// READ-ONLY TESTS (safe to run anytime)
// ============================================================================

#[tokio::test]
#[ignore = "integration test - requires TANGLED_HANDLE/TANGLED_PASSWORD and network"]
async fn read_status() {
    let Some(tangled) = connect() else { return };

    let status = tangled.status("configured").await;
    assert!(status.session_ok, "login failed: {:?}", status);
    assert!(status.did.is_some());
}

#[tokio::test]
#[ignore = "integration test - requires TANGLED_HANDLE/TANGLED_PASSWORD and network"]
async fn read_repo_labels() {
    let Some(tangled) = connect() else { return };

    let labels = tangled.list_labels(&test_repo()).await;
    assert!(labels.is_ok(), "list_labels failed: {:?}", labels.err());
}

#[tokio::test]
#[ignore = "integration test - requires TANGLED_HANDLE/TANGLED_PASSWORD and network"]
async fn read_repo_branches() {
    let Some(tangled) = connect() else { return };

    let page = tangled.list_branches(&test_repo(), 5, None).await;
    assert!(page.is_ok(), "list_branches failed: {:?}", page.err());
    let page = page.unwrap();
    assert!(page.branches.len() <= 5);
    assert!(page.branches.iter().all(|b| !b.name.is_empty()));
}

#[tokio::test]
#[ignore = "integration test - requires TANGLED_HANDLE/TANGLED_PASSWORD and network"]
async fn read_issue_list() {
    let Some(tangled) = connect() else { return };

    let page = tangled.list_issues(&test_repo(), 10, None).await;
    assert!(page.is_ok(), "list_issues failed: {:?}", page.err());
}

#[tokio::test]
#[ignore = "integration test - requires TANGLED_HANDLE/TANGLED_PASSWORD and network"]
async fn read_pull_list() {
    let Some(tangled) = connect() else { return };

    let page = tangled.list_pulls(&test_repo(), 10, None).await;
    assert!(page.is_ok(), "list_pulls failed: {:?}", page.err());
}

#[tokio::test]
#[ignore = "integration test - requires TANGLED_HANDLE/TANGLED_PASSWORD and network"]
async fn read_unknown_repo_is_not_found() {
    let Some(tangled) = connect() else { return };

    let err = tangled
        .list_issues("tangled.org/this-repo-should-not-exist-0000", 5, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[test]
fn write_tests_never_fall_back_to_the_public_repo() {
    assert_eq!(write_repo_from(|_: &str| None), None);
    assert_eq!(write_repo_from(|_: &str| Some("  ".to_string())), None);
    assert_eq!(
        write_repo_from(|_: &str| Some("me.test/scratch".to_string())),
        Some("me.test/scratch".to_string())
    );
}

// ============================================================================
// WRITE TESTS (create and clean up records in TEST_REPO)
// ============================================================================

#[tokio::test]
#[ignore = "integration test - writes an issue to TEST_REPO and deletes it"]
async fn write_issue_lifecycle() {
    let Some(repo) = write_repo() else { return };
    let Some(tangled) = connect() else { return };

    let created = tangled
        .create_issue(
            &repo,
            NewIssue {
                title: "[integration] tangled-mcp lifecycle".into(),
                body: Some("Created by the tangled-mcp integration tests".into()),
                labels: None,
            },
        )
        .await;
    assert!(created.is_ok(), "create_issue failed: {:?}", created.err());
    let created = created.unwrap();
    assert!(created.issue_id >= 1);

    let updated = tangled
        .update_issue(
            &repo,
            created.issue_id,
            IssueUpdate {
                title: Some("[integration] tangled-mcp lifecycle (edited)".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(updated.is_ok(), "update_issue failed: {:?}", updated.err());
    assert_eq!(updated.unwrap().uri, created.uri);

    let deleted = tangled.delete_issue(&repo, created.issue_id).await;
    assert_eq!(deleted.ok().as_deref(), Some(created.uri.as_str()));
}
