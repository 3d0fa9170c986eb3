//! Comment publishing via the GitHub REST API
//!
//! Create-or-update: list the PR's comments, find the bot-authored one
//! carrying the marker heading, PATCH it if present, POST a new one
//! otherwise. At most one marker comment is expected to exist, so a linear
//! first-match scan is enough. Transport failures propagate; there is no
//! retry and no optimistic-concurrency guard (two concurrent runs can race
//! into duplicate comments, an accepted risk).

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::markdown::COMMENT_MARKER;

/// Author login GitHub Actions uses for workflow-token comments
pub const BOT_LOGIN: &str = "github-actions[bot]";

const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    pub user: CommentAuthor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
}

/// First bot-authored comment whose body contains the marker heading.
pub fn find_marker_comment(comments: &[IssueComment]) -> Option<&IssueComment> {
    comments
        .iter()
        .find(|c| c.user.login == BOT_LOGIN && c.body.contains(COMMENT_MARKER))
}

/// GitHub REST client scoped to one repository
pub struct CommentPublisher {
    client: reqwest::Client,
    api_url: String,
    repo: String,
    token: String,
}

impl CommentPublisher {
    /// `repo` is the `owner/name` slug (`GITHUB_REPOSITORY` in Actions).
    /// The API base honors `GITHUB_API_URL` for GHES setups.
    pub fn new(repo: String, token: String) -> Self {
        let api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_url,
            repo,
            token,
        }
    }

    /// Create or update the coverage comment on the given PR.
    pub async fn publish(&self, pr_number: &str, body: &str) -> Result<()> {
        let list_url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_url, self.repo, pr_number
        );

        let comments: Vec<IssueComment> = self
            .authed(self.client.get(&list_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let payload = serde_json::json!({ "body": body });

        match find_marker_comment(&comments) {
            Some(existing) => {
                let url = format!(
                    "{}/repos/{}/issues/comments/{}",
                    self.api_url, self.repo, existing.id
                );
                self.authed(self.client.patch(&url))
                    .json(&payload)
                    .send()
                    .await?
                    .error_for_status()?;
                info!("Updated existing coverage comment (ID: {})", existing.id);
            }
            None => {
                self.authed(self.client.post(&list_url))
                    .json(&payload)
                    .send()
                    .await?
                    .error_for_status()?;
                info!("Created new coverage comment");
            }
        }

        Ok(())
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(USER_AGENT, "keystone-coverage-comment")
            .header(ACCEPT, "application/vnd.github+json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64, login: &str, body: &str) -> IssueComment {
        IssueComment {
            id,
            body: body.to_string(),
            user: CommentAuthor {
                login: login.to_string(),
            },
        }
    }

    #[test]
    fn test_picks_only_the_marker_comment() {
        let comments = vec![
            comment(1, BOT_LOGIN, "## Lint Report\n\nall clean"),
            comment(2, BOT_LOGIN, "## Code Coverage Report\n\n### Total"),
            comment(3, "reviewer", "looks good"),
        ];
        let found = find_marker_comment(&comments).expect("marker comment");
        assert_eq!(found.id, 2);
    }

    #[test]
    fn test_ignores_marker_text_from_humans() {
        let comments = vec![comment(7, "reviewer", "## Code Coverage Report looks wrong")];
        assert!(find_marker_comment(&comments).is_none());
    }

    #[test]
    fn test_no_comments_means_create() {
        assert!(find_marker_comment(&[]).is_none());
    }
}
