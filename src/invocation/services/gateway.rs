//! A2A `message/send` handling: resolve, translate, call, and wrap.

use super::GatewayCredentials;
use crate::discovery::{AgentSummary, ResourceDirectory};
use crate::invocation::{
    InvocationError,
    domain::{AgentCall, GatewayRequest, SendMessageParams, Task},
    ports::{RemoteAgentClient, RemoteCall, RemoteFailure},
};
use crate::jsonrpc::{ErrorKind, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::registry::ports::MetadataStore;
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Remote call timeout used when none is configured.
pub const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(30);

const SEND_MESSAGE: &str = "message/send";

/// Result of one successful remote agent call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome {
    /// Resolved agent identifier.
    pub agent_id: String,
    /// Resolved version tag.
    pub version: String,
    /// Absolute URL that was called.
    pub serving_url: String,
    /// Body sent to the agent.
    pub request_body: Value,
    /// HTTP status returned by the agent.
    pub status_code: u16,
    /// Response content type.
    pub content_type: Option<String>,
    /// Normalized response body.
    pub payload: Value,
}

impl InvocationOutcome {
    /// Renders the outcome as JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "agent_id": self.agent_id,
            "version": self.version,
            "serving_url": self.serving_url,
            "request_body": self.request_body,
            "status_code": self.status_code,
            "content_type": self.content_type,
            "payload": self.payload,
        })
    }
}

/// Invocation gateway over the registry and a remote agent client.
pub struct InvocationGateway<S, R, C>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    directory: ResourceDirectory<S>,
    client: Arc<R>,
    clock: Arc<C>,
    credentials: GatewayCredentials,
    timeout: Duration,
}

impl<S, R, C> Clone for InvocationGateway<S, R, C>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            client: Arc::clone(&self.client),
            clock: Arc::clone(&self.clock),
            credentials: self.credentials.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S, R, C> InvocationGateway<S, R, C>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    /// Creates a gateway with no credentials and the default timeout.
    #[must_use]
    pub const fn new(directory: ResourceDirectory<S>, client: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            directory,
            client,
            clock,
            credentials: GatewayCredentials::none(),
            timeout: DEFAULT_INVOKE_TIMEOUT,
        }
    }

    /// Sets the credentials offered to remote agents.
    #[must_use]
    pub fn with_credentials(mut self, credentials: GatewayCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the default remote call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the default remote call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the directory used for listing and resolution.
    #[must_use]
    pub const fn directory(&self) -> &ResourceDirectory<S> {
        &self.directory
    }

    /// Answers one A2A JSON-RPC request.
    ///
    /// Only `message/send` is supported. Every failure becomes a JSON-RPC
    /// error response echoing the request id.
    pub async fn handle(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.response_id();
        if request.method != SEND_MESSAGE {
            return JsonRpcResponse::method_not_found(id, &request.method);
        }

        match self.send_message(request.params.as_ref()).await {
            Ok(task) => match serde_json::to_value(&task) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::failure(
                    id,
                    JsonRpcError::from_kind(ErrorKind::Internal, err.to_string()),
                ),
            },
            Err(err) => {
                warn!(kind = %err.kind(), error = %err, "message/send failed");
                JsonRpcResponse::failure(id, err.to_rpc_error())
            }
        }
    }

    /// Runs the request embedded in `message/send` parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::Request`] for malformed envelopes and
    /// payloads, and propagates the failures of [`Self::list_agents`] and
    /// [`Self::invoke`].
    pub async fn send_message(&self, params: Option<&Value>) -> Result<Task, InvocationError> {
        let send = SendMessageParams::from_params(params)?;
        let payload = send.message.embedded_payload()?;
        let context_id = send.message.context_id.as_deref();

        match GatewayRequest::from_payload(&payload)? {
            GatewayRequest::ListAgents => {
                let agents = self.list_agents().await?;
                Ok(Task::completed(
                    context_id,
                    "agents",
                    &json!({ "agents": agents }),
                    &*self.clock,
                ))
            }
            GatewayRequest::CallAgent(call) => {
                let outcome = self.invoke(&call, None).await?;
                Ok(Task::completed(
                    context_id,
                    "agent_result",
                    &outcome.to_value(),
                    &*self.clock,
                )
                .with_metadata("agent_id", json!(outcome.agent_id))
                .with_metadata("version", json!(outcome.version)))
            }
        }
    }

    /// Lists discoverable agents in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::Discovery`] when the store fails.
    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>, InvocationError> {
        Ok(self.directory.agent_summaries().await?)
    }

    /// Resolves `call`, forwards it to the agent, and returns the answer.
    ///
    /// `timeout` overrides the configured default for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::Resolve`] when the agent or version does
    /// not resolve, [`InvocationError::Request`] when the input is missing,
    /// and [`InvocationError::Remote`] when the call fails or the serving URL
    /// is relative without a public base URL.
    pub async fn invoke(
        &self,
        call: &AgentCall,
        timeout: Option<Duration>,
    ) -> Result<InvocationOutcome, InvocationError> {
        let resolution = self
            .directory
            .resolver()
            .resolve(call.agent_id(), call.version())
            .await?;
        let version = resolution.version();

        let payload = call.downstream_payload()?;
        let serving = version.serving_url();
        let url = serving
            .resolve(self.directory.generator().public_base_url())
            .ok_or_else(|| {
                RemoteFailure::unreachable(
                    serving.as_str(),
                    "relative serving URL requires a configured public base URL",
                )
            })?;

        let remote_call = self
            .credentials
            .headers_for(version.security())
            .into_iter()
            .fold(
                RemoteCall::new(url.clone(), payload.clone(), timeout.unwrap_or(self.timeout)),
                |pending, (name, value)| pending.with_header(name, value),
            );

        let started = Instant::now();
        let response = self.client.invoke(&remote_call).await.inspect_err(|err| {
            warn!(
                agent_id = %call.agent_id(),
                version = %version.version(),
                error = %err,
                "remote agent call failed"
            );
        })?;

        info!(
            agent_id = %call.agent_id(),
            version = %version.version(),
            status = response.status,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "invoked remote agent"
        );

        Ok(InvocationOutcome {
            agent_id: call.agent_id().to_string(),
            version: version.version().to_string(),
            serving_url: url,
            request_body: payload,
            status_code: response.status,
            content_type: response.content_type,
            payload: response.body,
        })
    }
}
