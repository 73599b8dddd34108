//! Client for the Xray cloud API.
//!
//! Xray authenticates with an API key pair exchanged for a bearer token,
//! then exposes its operations over GraphQL.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::config::XrayConfig;
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CREATE_TEST_PLAN_MUTATION: &str = r#"
    mutation CreateTestPlan($jira: JSON!) {
        createTestPlan(testIssueIds: [], jira: $jira) {
            testPlan {
                issueId
                jira(fields: ["key"])
            }
            warnings
        }
    }
"#;

/// GraphQL request body
#[derive(Debug, Serialize)]
struct GraphQLRequest<V: Serialize> {
    query: &'static str,
    variables: V,
}

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// Test Plan issue created in Xray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrayTestPlan {
    pub issue_id: String,
    pub key: String,
    pub warnings: Vec<String>,
}

/// Xray GraphQL client. The bearer token is fetched once and reused.
#[derive(Debug)]
pub struct XrayClient {
    client: reqwest::Client,
    config: XrayConfig,
    token: OnceCell<String>,
}

impl XrayClient {
    /// Create a new Xray client.
    pub fn new(config: XrayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            config,
            token: OnceCell::new(),
        })
    }

    /// Exchange the API key pair for a bearer token.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<String> {
        let url = format!("{}/api/v2/authenticate", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Xray(format!(
                "authentication returned {status}: {body}"
            )));
        }

        // The token comes back as a bare JSON string.
        let token: String = response.json().await?;
        debug!("Authenticated with Xray");
        Ok(token)
    }

    async fn token(&self) -> Result<&str> {
        self.token
            .get_or_try_init(|| self.authenticate())
            .await
            .map(String::as_str)
    }

    /// Execute a GraphQL query/mutation
    async fn execute<V: Serialize, R: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: V,
    ) -> Result<R> {
        let url = format!("{}/api/v2/graphql", self.config.base_url);
        let token = self.token().await?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Xray(format!("GraphQL returned {status}: {body}")));
        }

        let gql_response: GraphQLResponse<R> = response.json().await?;

        if let Some(errors) = gql_response.errors {
            let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Error::Xray(format!(
                "GraphQL errors: {}",
                messages.join(", ")
            )));
        }

        gql_response
            .data
            .ok_or_else(|| Error::Xray("No data in GraphQL response".to_string()))
    }

    /// Create a Test Plan issue in `project_key`.
    #[instrument(skip(self))]
    pub async fn create_test_plan(&self, project_key: &str, summary: &str) -> Result<XrayTestPlan> {
        #[derive(Serialize)]
        struct Variables {
            jira: Value,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            create_test_plan: CreateResult,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CreateResult {
            test_plan: TestPlanNode,
            #[serde(default)]
            warnings: Option<Vec<String>>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct TestPlanNode {
            issue_id: String,
            jira: Value,
        }

        let variables = Variables {
            jira: json!({
                "fields": {
                    "summary": summary,
                    "project": { "key": project_key },
                }
            }),
        };

        let response: Response = self.execute(CREATE_TEST_PLAN_MUTATION, variables).await?;
        let CreateResult {
            test_plan,
            warnings,
        } = response.create_test_plan;

        let key = test_plan
            .jira
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Xray("Test Plan response has no Jira key".to_string()))?
            .to_string();

        info!(key = %key, issue_id = %test_plan.issue_id, "Created Xray test plan");

        Ok(XrayTestPlan {
            issue_id: test_plan.issue_id,
            key,
            warnings: warnings.unwrap_or_default(),
        })
    }
}
