//! HTTP collaborators for the cluster and load balancer control API.
//!
//! Both talk JSON to a control API gateway. Target groups and clusters are
//! passed as query parameters or body fields so ARNs never need to be
//! escaped into paths.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tgsync_core::target::TargetDescription;
use tgsync_core::{
    ClusterId, CoreError, ServiceId, Target, TargetAddress, TargetGroupHandle, Task, TaskHandle,
};

use crate::directory::TaskDirectory;
use crate::error::{DirectoryError, RegistryError};
use crate::registry::TargetRegistry;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure of a single control API request.
#[derive(Debug)]
enum ApiFailure {
    Transport(String),
    Rejected { status: u16, message: String },
    Decode(String),
}

impl From<ApiFailure> for DirectoryError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Transport(m) => Self::Transport(m),
            ApiFailure::Rejected { status, message } => Self::Rejected { status, message },
            ApiFailure::Decode(m) => Self::Decode(m),
        }
    }
}

impl From<ApiFailure> for RegistryError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Transport(m) => Self::Transport(m),
            ApiFailure::Rejected { status, message } => Self::Rejected { status, message },
            ApiFailure::Decode(m) => Self::Decode(m),
        }
    }
}

/// JSON client for the control API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET JSON from an endpoint.
    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiFailure>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    /// POST JSON to an endpoint and decode the JSON answer.
    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiFailure>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.post(path, body).await?;
        Self::decode(response).await
    }

    /// POST JSON to an endpoint, ignoring the answer body.
    async fn post<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, ApiFailure>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST request");

        let response = self
            .inner
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        Self::check(response).await
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ApiFailure::Rejected {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.to_string()
            } else {
                message
            },
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiFailure> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiFailure::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTasksResponse {
    #[serde(default)]
    task_arns: Vec<TaskHandle>,
}

#[derive(Debug, Serialize)]
struct DescribeTasksRequest<'a> {
    cluster: &'a ClusterId,
    tasks: &'a [TaskHandle],
}

#[derive(Debug, Deserialize)]
struct DescribeTasksResponse {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    failures: Vec<DescribeFailure>,
}

#[derive(Debug, Deserialize)]
struct DescribeFailure {
    #[serde(default)]
    arn: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetHealthResponse {
    #[serde(default)]
    target_health_descriptions: Vec<Target>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetsRequest<'a> {
    target_group_arn: &'a TargetGroupHandle,
    targets: Vec<TargetDescription>,
}

impl<'a> TargetsRequest<'a> {
    fn new(group: &'a TargetGroupHandle, targets: &[TargetAddress]) -> Self {
        Self {
            target_group_arn: group,
            targets: targets
                .iter()
                .map(|id| TargetDescription { id: id.clone() })
                .collect(),
        }
    }
}

/// Task directory backed by the control API.
#[derive(Debug, Clone)]
pub struct HttpTaskDirectory {
    client: HttpClient,
}

impl HttpTaskDirectory {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskDirectory for HttpTaskDirectory {
    async fn list_running(
        &self,
        cluster: &ClusterId,
        service: &ServiceId,
    ) -> Result<Vec<TaskHandle>, DirectoryError> {
        let query = [
            ("cluster", cluster.as_str()),
            ("serviceName", service.as_str()),
            ("desiredStatus", "RUNNING"),
        ];
        let response: ListTasksResponse = self.client.get_json("/v1/tasks", &query).await?;
        Ok(response.task_arns)
    }

    async fn describe(
        &self,
        cluster: &ClusterId,
        tasks: &[TaskHandle],
    ) -> Result<Vec<Task>, DirectoryError> {
        let request = DescribeTasksRequest { cluster, tasks };
        let response: DescribeTasksResponse =
            self.client.post_json("/v1/tasks/describe", &request).await?;

        for failure in &response.failures {
            warn!(
                task = failure.arn.as_deref().unwrap_or("unknown"),
                reason = failure.reason.as_deref().unwrap_or("unknown"),
                "Task could not be described"
            );
        }
        Ok(response.tasks)
    }
}

/// Target registry backed by the control API.
#[derive(Debug, Clone)]
pub struct HttpTargetRegistry {
    client: HttpClient,
}

impl HttpTargetRegistry {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TargetRegistry for HttpTargetRegistry {
    async fn register(
        &self,
        group: &TargetGroupHandle,
        targets: &[TargetAddress],
    ) -> Result<(), RegistryError> {
        self.client
            .post("/v1/target-groups/register", &TargetsRequest::new(group, targets))
            .await?;
        Ok(())
    }

    async fn deregister(
        &self,
        group: &TargetGroupHandle,
        targets: &[TargetAddress],
    ) -> Result<(), RegistryError> {
        self.client
            .post("/v1/target-groups/deregister", &TargetsRequest::new(group, targets))
            .await?;
        Ok(())
    }

    async fn describe_health(
        &self,
        group: &TargetGroupHandle,
    ) -> Result<Vec<Target>, RegistryError> {
        let query = [("targetGroupArn", group.as_str())];
        let response: TargetHealthResponse = self
            .client
            .get_json("/v1/target-groups/health", &query)
            .await?;
        Ok(response.target_health_descriptions)
    }
}
