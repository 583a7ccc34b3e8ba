use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::mutation::config::EndpointOptions;
use crate::mutation::error::{
    internal_error, invalid_argument, network_error, permission_denied, unauthenticated,
    MutationResult,
};
use crate::mutation::request::{DependentRead, MutationInvocation};
use crate::platform::token::{AccessTokenProvider, AnonymousTokenProvider};

/// The remote write wrapped by a [`MutationRunner`](crate::mutation::MutationRunner).
///
/// A resolved `Ok` payload may still carry domain errors; `Err` means the
/// round trip itself was rejected.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MutationTransport: Send + Sync {
    async fn invoke(&self, invocation: MutationInvocation) -> MutationResult<Value>;
}

/// Re-executes read queries so their cached results match the server again.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ReadRefresher: Send + Sync {
    async fn refresh(&self, read: &DependentRead) -> MutationResult<()>;
}

/// Refresher for callers that keep no read cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReadRefresher;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReadRefresher for NoopReadRefresher {
    async fn refresh(&self, _read: &DependentRead) -> MutationResult<()> {
        Ok(())
    }
}

/// GraphQL-over-HTTP client shared by the write and refresh adapters.
#[derive(Clone)]
pub struct GraphQlClient {
    client: reqwest::Client,
    endpoint: EndpointOptions,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl GraphQlClient {
    pub fn new(endpoint: EndpointOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            token_provider: Arc::new(AnonymousTokenProvider),
        }
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.token_provider = provider;
        self
    }

    pub fn endpoint(&self) -> &EndpointOptions {
        &self.endpoint
    }

    async fn headers(&self) -> MutationResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let token = self
            .token_provider
            .access_token()
            .await
            .map_err(|err| unauthenticated(format!("access token unavailable: {err}")))?;
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|err| invalid_argument(format!("invalid access token: {err}")))?,
            );
        }
        Ok(headers)
    }

    /// Posts one operation and returns the `data` member of the response.
    pub async fn execute(&self, document: &str, variables: &Value) -> MutationResult<Value> {
        let body = json!({
            "query": document,
            "variables": variables,
        });

        let headers = self.headers().await?;
        let response = self
            .client
            .post(self.endpoint.graphql_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|err| network_error(format!("GraphQL request failed: {err}")))?;

        let status = response.status();
        match status.as_u16() {
            401 => return Err(unauthenticated("Request unauthorized")),
            403 => return Err(permission_denied("Request forbidden")),
            _ if !status.is_success() => {
                return Err(network_error(format!("GraphQL request failed with status {status}"))
                    .with_status(status.as_u16()))
            }
            _ => {}
        }

        let graph_response: GraphQlResponse = response
            .json()
            .await
            .map_err(|err| internal_error(format!("invalid GraphQL response: {err}")))?;

        match graph_response.data {
            Some(data) if !data.is_null() => Ok(data),
            _ if !graph_response.errors.is_empty() => {
                let messages = graph_response
                    .errors
                    .into_iter()
                    .map(|error| {
                        error
                            .message
                            .unwrap_or_else(|| "Unknown GraphQL error".to_string())
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(internal_error(messages).with_status(status.as_u16()))
            }
            _ => Ok(Value::Null),
        }
    }
}

/// Remote write bound to one GraphQL mutation document.
#[derive(Clone)]
pub struct GraphQlMutation {
    client: GraphQlClient,
    document: Arc<str>,
}

impl GraphQlMutation {
    pub fn new(client: GraphQlClient, document: impl Into<Arc<str>>) -> MutationResult<Self> {
        let document = document.into();
        if document.trim().is_empty() {
            return Err(invalid_argument("Mutation document must not be empty"));
        }
        Ok(Self { client, document })
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MutationTransport for GraphQlMutation {
    async fn invoke(&self, invocation: MutationInvocation) -> MutationResult<Value> {
        self.client
            .execute(&self.document, &invocation.variables)
            .await
    }
}

/// Refreshes dependent reads by re-running them against the GraphQL endpoint.
///
/// Results are dropped; keeping read caches consistent is the query layer's job
/// once the fresh response has gone through it.
#[derive(Clone)]
pub struct GraphQlReadRefresher {
    client: GraphQlClient,
}

impl GraphQlReadRefresher {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReadRefresher for GraphQlReadRefresher {
    async fn refresh(&self, read: &DependentRead) -> MutationResult<()> {
        self.client.execute(&read.query, &read.variables).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::mutation::config::parse_endpoint_options;
    use crate::mutation::error::MutationErrorCode;
    use crate::platform::token::StaticTokenProvider;
    use httpmock::Method::POST;
    use crate::test_support::start_mock_server;
    use httpmock::MockServer;

    const UPDATE_THING: &str =
        "mutation UpdateThing($id: ID!) { updateThing(id: $id) { ok errors { resource field code } } }";

    fn client_for(server: &MockServer) -> GraphQlClient {
        GraphQlClient::new(parse_endpoint_options(&server.base_url()).unwrap())
    }

    fn invocation() -> MutationInvocation {
        MutationInvocation {
            variables: json!({ "id": "abc" }),
            dependent_reads: Vec::new(),
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn mutation_posts_document_and_returns_data() {
        let server = start_mock_server().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .header("authorization", "Bearer session-token")
                    .json_body(json!({ "query": UPDATE_THING, "variables": { "id": "abc" } }));
                then.status(200)
                    .json_body(json!({ "data": { "updateThing": { "ok": true, "errors": null } } }));
            })
            .await;

        let client = client_for(&server)
            .with_token_provider(Arc::new(StaticTokenProvider::new("session-token")));
        let mutation = GraphQlMutation::new(client, UPDATE_THING).unwrap();
        let payload = mutation.invoke(invocation()).await.unwrap();

        assert_eq!(payload, json!({ "updateThing": { "ok": true, "errors": null } }));
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn forbidden_maps_to_permission_denied() {
        let server = start_mock_server().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(403);
            })
            .await;

        let mutation = GraphQlMutation::new(client_for(&server), UPDATE_THING).unwrap();
        let err = mutation.invoke(invocation()).await.unwrap_err();

        assert_eq!(err.code, MutationErrorCode::PermissionDenied);
        assert!(err.is_permission_denied());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn server_failures_keep_their_status() {
        let server = start_mock_server().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(502);
            })
            .await;

        let mutation = GraphQlMutation::new(client_for(&server), UPDATE_THING).unwrap();
        let err = mutation.invoke(invocation()).await.unwrap_err();

        assert_eq!(err.code, MutationErrorCode::Network);
        assert_eq!(err.http_status(), Some(502));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn top_level_errors_without_data_are_internal() {
        let server = start_mock_server().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200)
                    .json_body(json!({ "data": null, "errors": [{ "message": "Cannot query field" }] }));
            })
            .await;

        let mutation = GraphQlMutation::new(client_for(&server), UPDATE_THING).unwrap();
        let err = mutation.invoke(invocation()).await.unwrap_err();

        assert_eq!(err.code, MutationErrorCode::Internal);
        assert!(err.message().contains("Cannot query field"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refresher_reruns_the_read() {
        let server = start_mock_server().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/graphql")
                    .json_body(json!({ "query": "query Things { things { id } }", "variables": {} }));
                then.status(200).json_body(json!({ "data": { "things": [] } }));
            })
            .await;

        let refresher = GraphQlReadRefresher::new(client_for(&server));
        refresher
            .refresh(&DependentRead::new("query Things { things { id } }", json!({})))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn empty_document_is_rejected() {
        let client = GraphQlClient::new(EndpointOptions::default());
        let err = GraphQlMutation::new(client, "  ").err().unwrap();
        assert_eq!(err.code, MutationErrorCode::InvalidArgument);
    }
}
