//! HTTP client for a Nexus-style staging service.

use super::service::StagingService;
use super::sleeper::{Sleeper, TokioSleeper};
use crate::config::{StagingConfig, StagingCredentials};
use crate::error::{Result, StagingError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Longest response body echoed into an error
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
struct StagingProfile {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagingRepository {
    repository_id: String,
    #[serde(rename = "type")]
    state: String,
    #[serde(default)]
    transitioning: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkRequest<'a> {
    staged_repository_ids: Vec<&'a str>,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_drop_after_release: Option<bool>,
}

/// Staging service client (REST, JSON, basic auth)
#[derive(Clone)]
pub struct NexusStagingClient<P = TokioSleeper> {
    http: reqwest::Client,
    service_url: Url,
    username: String,
    password: String,
    poll_interval: Duration,
    transition_attempts: u32,
    sleeper: P,
    /// Profile name and id resolved by the first lookup
    resolved_profile: OnceCell<(String, String)>,
}

impl<P> std::fmt::Debug for NexusStagingClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusStagingClient")
            .field("service_url", &self.service_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl NexusStagingClient {
    /// Client for `config.service_url` authenticating with `credentials`
    pub fn new(config: &StagingConfig, credentials: &StagingCredentials) -> Result<Self> {
        Self::with_sleeper(config, credentials, TokioSleeper)
    }
}

impl<P: Sleeper> NexusStagingClient<P> {
    /// Client with an explicit sleeper for transition polling
    pub fn with_sleeper(
        config: &StagingConfig,
        credentials: &StagingCredentials,
        sleeper: P,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| StagingError::RequestFailed {
                operation: "build http client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            service_url: config.service_url.clone(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            poll_interval: config.poll_interval,
            transition_attempts: config.transition_attempts,
            sleeper,
            resolved_profile: OnceCell::new(),
        })
    }

    fn endpoint(&self, operation: &str, path: &str) -> Result<Url> {
        self.service_url.join(path).map_err(|e| {
            StagingError::RequestFailed {
                operation: operation.to_string(),
                reason: format!("invalid endpoint '{}': {}", path, e),
            }
            .into()
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T> {
        let url = self.endpoint(operation, path)?;
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_failed(operation, e))?;

        let response = check_status(operation, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| request_failed(operation, e).into())
    }

    async fn post_json<B: Serialize>(&self, operation: &str, path: &str, body: &B) -> Result<()> {
        let url = self.endpoint(operation, path)?;
        log::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(operation, e))?;

        check_status(operation, response).await?;
        Ok(())
    }

    async fn profile_id(&self, profile: &str) -> Result<String> {
        if let Some((name, id)) = self.resolved_profile.get()
            && name == profile
        {
            return Ok(id.clone());
        }

        let id = self.lookup_profile_id(profile).await?;
        // Only the first resolved profile is cached
        let _ = self.resolved_profile.set((profile.to_string(), id.clone()));
        Ok(id)
    }

    async fn lookup_profile_id(&self, profile: &str) -> Result<String> {
        let profiles: DataEnvelope<Vec<StagingProfile>> =
            self.get_json("list profiles", "staging/profiles").await?;

        find_profile(&profiles.data, profile)
            .map(|p| p.id.clone())
            .ok_or_else(|| {
                StagingError::ProfileNotFound {
                    profile: profile.to_string(),
                }
                .into()
            })
    }

    async fn profile_repositories(&self, profile: &str) -> Result<Vec<StagingRepository>> {
        let profile_id = self.profile_id(profile).await?;
        let repositories: DataEnvelope<Vec<StagingRepository>> = self
            .get_json(
                "list staging repositories",
                &format!("staging/profile_repositories/{}", profile_id),
            )
            .await?;
        Ok(repositories.data)
    }

    async fn repository(&self, repository_id: &str) -> Result<StagingRepository> {
        self.get_json(
            "get staging repository",
            &format!("staging/repository/{}", repository_id),
        )
        .await
    }

    async fn await_settled(&self, repository_id: &str) -> Result<StagingRepository> {
        for _ in 0..self.transition_attempts {
            let repository = self.repository(repository_id).await?;
            if !repository.transitioning {
                return Ok(repository);
            }
            log::debug!("{} still transitioning", repository_id);
            self.sleeper.sleep(self.poll_interval).await;
        }

        Err(StagingError::TransitionTimeout {
            repository: repository_id.to_string(),
            attempts: self.transition_attempts,
        }
        .into())
    }
}

impl<P: Sleeper> StagingService for NexusStagingClient<P> {
    async fn list_staging_repositories(&self, profile: &str) -> Result<usize> {
        Ok(self.profile_repositories(profile).await?.len())
    }

    async fn release_sole_staging_repository(&self, profile: &str) -> Result<()> {
        let repositories = self.profile_repositories(profile).await?;
        let repository = match repositories.as_slice() {
            [only] => only,
            _ => {
                return Err(StagingError::UnexpectedRepositoryCount {
                    profile: profile.to_string(),
                    count: repositories.len(),
                }
                .into());
            }
        };
        let id = repository.repository_id.as_str();
        let description = format!("Release of {} staging repository", profile);

        if repository.state == "open" {
            log::info!("Closing staging repository {}", id);
            self.post_json(
                "close staging repository",
                "staging/bulk/close",
                &bulk_request(id, &description, None),
            )
            .await?;
        }

        let settled = self.await_settled(id).await?;
        if settled.state != "closed" {
            return Err(StagingError::CloseFailed {
                repository: id.to_string(),
                state: settled.state,
            }
            .into());
        }

        log::info!("Promoting staging repository {}", id);
        self.post_json(
            "release staging repository",
            "staging/bulk/promote",
            &bulk_request(id, &description, Some(true)),
        )
        .await
    }
}

fn find_profile<'p>(profiles: &'p [StagingProfile], profile: &str) -> Option<&'p StagingProfile> {
    profiles
        .iter()
        .find(|p| p.name == profile)
        .or_else(|| profiles.iter().find(|p| p.id == profile))
}

fn bulk_request<'a>(
    id: &'a str,
    description: &'a str,
    auto_drop_after_release: Option<bool>,
) -> DataEnvelope<BulkRequest<'a>> {
    DataEnvelope {
        data: BulkRequest {
            staged_repository_ids: vec![id],
            description,
            auto_drop_after_release,
        },
    }
}

fn request_failed(operation: &str, e: reqwest::Error) -> StagingError {
    StagingError::RequestFailed {
        operation: operation.to_string(),
        reason: e.to_string(),
    }
}

async fn check_status(operation: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }

    Err(StagingError::UnexpectedStatus {
        operation: operation.to_string(),
        status: status.as_u16(),
        body,
    }
    .into())
}
