//! HTTP client for the public Codeforces API

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::CodeforcesConfig;
use crate::constants::{SUBMISSIONS_FETCH_COUNT, USER_AGENT};

use super::{
    CodeforcesError, ContestPlatform,
    types::{ApiResponse, RatingChange, Standings, Submission, UserInfo},
};

/// reqwest-backed [`ContestPlatform`]
#[derive(Debug, Clone)]
pub struct CodeforcesClient {
    http: Client,
    base_url: String,
}

impl CodeforcesClient {
    /// Create a client for the configured API root
    pub fn new(config: &CodeforcesConfig) -> Result<Self, CodeforcesError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Call an API method and unwrap the `{status, result}` envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, CodeforcesError> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!(method, ?query, "Calling Codeforces API");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        // Failed calls still answer with a JSON envelope carrying a comment,
        // so the body is decoded before looking at the status code.
        let envelope: ApiResponse<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(CodeforcesError::Status {
                    method,
                    status: status.as_u16(),
                });
            }
            Err(e) => return Err(CodeforcesError::Http(e)),
        };

        if envelope.status != "OK" {
            return Err(CodeforcesError::Api {
                method,
                comment: envelope.comment.unwrap_or_else(|| envelope.status.clone()),
            });
        }

        envelope.result.ok_or(CodeforcesError::EmptyResult(method))
    }
}

#[async_trait]
impl ContestPlatform for CodeforcesClient {
    async fn user_info(&self, handle: &str) -> Result<UserInfo, CodeforcesError> {
        let users: Vec<UserInfo> = self
            .call("user.info", &[("handles", handle.to_string())])
            .await?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| CodeforcesError::HandleNotFound(handle.to_string()))
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, CodeforcesError> {
        self.call("user.rating", &[("handle", handle.to_string())])
            .await
    }

    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>, CodeforcesError> {
        self.call(
            "user.status",
            &[
                ("handle", handle.to_string()),
                ("from", "1".to_string()),
                ("count", SUBMISSIONS_FETCH_COUNT.to_string()),
            ],
        )
        .await
    }

    async fn contest_problem_count(&self, contest_id: i64) -> Result<usize, CodeforcesError> {
        let standings: Standings = self
            .call(
                "contest.standings",
                &[
                    ("contestId", contest_id.to_string()),
                    ("from", "1".to_string()),
                    ("count", "1".to_string()),
                ],
            )
            .await?;

        Ok(standings.problems.len())
    }
}
