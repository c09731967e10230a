use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use crate::{
    config::Config,
    integrations::github::{GitHub, MergeMethod},
    state::RunType,
};

#[derive(Clone, Debug, clap::Args)]
pub(crate) struct Args {
    /// The pull request number.
    pub(crate) number: u64,
    /// How to merge.
    #[arg(long, value_enum, default_value_t = MergeMethod::Squash)]
    pub(crate) method: MergeMethod,
    /// Seconds to wait after marking a draft ready for review, before merging.
    #[arg(long, default_value_t = 5)]
    pub(crate) ready_delay: u64,
}

/// Take a pull request out of draft if it needs it, then merge it.
pub(crate) async fn run(args: RunType<Args>, config: &Config) -> Result<(), super::Error> {
    let (run_type, args) = args.take();
    let repository = config.repository()?;

    if let RunType::DryRun(()) = run_type {
        info!(
            "Would mark #{} ready for review if it is a draft, then {} it in {repository}",
            args.number, args.method
        );
        return Ok(());
    }

    let github = GitHub::new(config.github_token()?, &config.github.api_url, repository)?;
    let mut pull = github.get_pull(args.number).await?;
    if pull.merged || pull.state != "open" {
        return Err(Error::NotOpen {
            number: pull.number,
            state: if pull.merged {
                String::from("merged")
            } else {
                pull.state
            },
        }
        .into());
    }

    if pull.draft {
        info!("Marking #{} ready for review", pull.number);
        github.mark_ready_for_review(&pull.node_id).await?;
        tokio::time::sleep(Duration::from_secs(args.ready_delay)).await;
        pull = github.get_pull(args.number).await?;
        if pull.draft {
            return Err(Error::StillDraft {
                number: pull.number,
            }
            .into());
        }
    }

    let sha = github.merge_pull(pull.number, args.method).await?;
    println!("✅ Merged #{} ({sha}): {}", pull.number, pull.html_url);
    Ok(())
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Pull request #{number} is {state}, not open")]
    #[diagnostic(code(auto_merge::not_open))]
    NotOpen { number: u64, state: String },
    #[error("Pull request #{number} is still a draft")]
    #[diagnostic(
        code(auto_merge::still_draft),
        help("GitHub may need longer to take it out of draft. Try again with a larger --ready-delay.")
    )]
    StillDraft { number: u64 },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_run {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        integrations::github,
        test_server::{Route, TestServer},
    };

    const PULL: &str = "/repos/octo-org/octo-repo/pulls/42";
    const MERGE: &str = "/repos/octo-org/octo-repo/pulls/42/merge";

    fn pull(state: &str, draft: bool, merged: bool) -> String {
        serde_json::json!({
            "number": 42,
            "node_id": "PR_kwDOA",
            "state": state,
            "draft": draft,
            "merged": merged,
            "html_url": "https://github.com/octo-org/octo-repo/pull/42",
        })
        .to_string()
    }

    fn config(server: &TestServer) -> Config {
        let api_url = server.url().to_string();
        Config::from_lookup(move |name| match name {
            "GITHUB_TOKEN" => Some("token".to_string()),
            "GITHUB_REPOSITORY" => Some("octo-org/octo-repo".to_string()),
            "GITHUB_API_URL" => Some(api_url.clone()),
            _ => None,
        })
    }

    fn args() -> RunType<Args> {
        RunType::Real(Args {
            number: 42,
            method: MergeMethod::Squash,
            ready_delay: 0,
        })
    }

    #[tokio::test]
    async fn merges_an_open_pull_request() {
        let server = TestServer::start(vec![
            Route::new("GET", PULL, 200, &pull("open", false, false)),
            Route::new("PUT", MERGE, 200, r#"{"sha": "6dcb09b", "merged": true}"#),
        ])
        .await;

        run(args(), &config(&server)).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
        assert_eq!(body["merge_method"], "squash");
    }

    #[tokio::test]
    async fn draft_is_marked_ready_first() {
        let server = TestServer::start(vec![
            Route::new("GET", PULL, 200, &pull("open", true, false)),
            Route::new("GET", PULL, 200, &pull("open", false, false)),
            Route::new("POST", "/graphql", 200, r#"{"data": {}}"#),
            Route::new("PUT", MERGE, 200, r#"{"sha": "6dcb09b", "merged": true}"#),
        ])
        .await;

        run(args(), &config(&server)).await.unwrap();

        let paths: Vec<_> = server
            .requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect();
        assert_eq!(
            paths,
            [
                format!("GET {PULL}"),
                "POST /graphql".to_string(),
                format!("GET {PULL}"),
                format!("PUT {MERGE}"),
            ]
        );
    }

    #[tokio::test]
    async fn still_draft_after_the_delay() {
        let server = TestServer::start(vec![
            Route::new("GET", PULL, 200, &pull("open", true, false)),
            Route::new("POST", "/graphql", 200, r#"{"data": {}}"#),
        ])
        .await;

        let err = run(args(), &config(&server)).await.unwrap_err();

        assert!(matches!(
            err,
            super::super::Error::AutoMerge(Error::StillDraft { number: 42 })
        ));
        assert!(
            server
                .requests()
                .iter()
                .all(|request| request.method != "PUT")
        );
    }

    #[tokio::test]
    async fn graphql_errors_stop_the_merge() {
        let server = TestServer::start(vec![
            Route::new("GET", PULL, 200, &pull("open", true, false)),
            Route::new(
                "POST",
                "/graphql",
                200,
                r#"{"errors": [{"message": "Resource not accessible by integration"}]}"#,
            ),
        ])
        .await;

        let err = run(args(), &config(&server)).await.unwrap_err();

        assert!(matches!(
            err,
            super::super::Error::GitHub(github::Error::GraphQl { .. })
        ));
    }

    #[tokio::test]
    async fn merged_pull_request_is_not_open() {
        let server =
            TestServer::start(vec![Route::new("GET", PULL, 200, &pull("closed", false, true))])
                .await;

        let err = run(args(), &config(&server)).await.unwrap_err();

        let super::super::Error::AutoMerge(Error::NotOpen { number, state }) = err else {
            panic!("expected NotOpen, got {err:?}");
        };
        assert_eq!(number, 42);
        assert_eq!(state, "merged");
    }

    #[tokio::test]
    async fn closed_pull_request_is_not_open() {
        let server =
            TestServer::start(vec![Route::new("GET", PULL, 200, &pull("closed", false, false))])
                .await;

        let err = run(args(), &config(&server)).await.unwrap_err();

        assert!(matches!(
            err,
            super::super::Error::AutoMerge(Error::NotOpen { .. })
        ));
    }

    #[tokio::test]
    async fn conflicts_are_not_mergeable() {
        let server = TestServer::start(vec![
            Route::new("GET", PULL, 200, &pull("open", false, false)),
            Route::new(
                "PUT",
                MERGE,
                405,
                r#"{"message": "Pull Request is not mergeable"}"#,
            ),
        ])
        .await;

        let err = run(args(), &config(&server)).await.unwrap_err();

        let super::super::Error::GitHub(github::Error::NotMergeable { number, message }) = err
        else {
            panic!("expected NotMergeable, got {err:?}");
        };
        assert_eq!(number, 42);
        assert_eq!(message, "Pull Request is not mergeable");
    }

    #[tokio::test]
    async fn bad_token() {
        let server = TestServer::start(vec![Route::new(
            "GET",
            PULL,
            401,
            r#"{"message": "Bad credentials"}"#,
        )])
        .await;

        let err = run(args(), &config(&server)).await.unwrap_err();

        assert!(matches!(
            err,
            super::super::Error::GitHub(github::Error::Unauthorized { .. })
        ));
    }
}
