//! Fixed config → transform → invoke pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::invoker::{InvokerError, OutboundCallDescriptor, OutboundInvoker, RawResponse};
use crate::normalize;
use crate::observability::metrics;
use crate::resilience::Deadline;
use crate::store::{ConfigStore, StoreError, TenantConfig};
use crate::transform::RequestTransformer;
use crate::workflow::state::{ExecutionState, StateTracker};
use crate::workflow::types::{ExecutionResult, Failure, FailureKind, InboundRequest};

/// Everything known about one finished execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub execution_id: Uuid,
    pub tenant_id: String,
    pub result: ExecutionResult,
    /// States visited, starting with `Start` and ending in a terminal state.
    pub path: Vec<ExecutionState>,
    pub elapsed: Duration,
}

/// Runs executions against a tenant store and an outbound transport.
///
/// Cheap to share: hold it in an `Arc` and call [`execute`](Self::execute)
/// from as many tasks as needed. Executions share nothing but the store.
pub struct WorkflowExecutor {
    store: Arc<dyn ConfigStore>,
    invoker: Arc<dyn OutboundInvoker>,
    transformer: RequestTransformer,
    deadline: Duration,
    invoke_timeout: Duration,
    enable_log: bool,
}

impl WorkflowExecutor {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        invoker: Arc<dyn OutboundInvoker>,
        config: &WorkflowConfig,
    ) -> Self {
        Self {
            store,
            invoker,
            transformer: RequestTransformer::from_config(config),
            deadline: config.deadline(),
            invoke_timeout: config.invoke_timeout(),
            enable_log: config.enable_log,
        }
    }

    pub fn transformer(&self) -> &RequestTransformer {
        &self.transformer
    }

    /// Run one execution for `tenant_id`. Always yields exactly one result.
    pub async fn execute(&self, tenant_id: &str, request: InboundRequest) -> ExecutionOutcome {
        let execution_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "execution",
            execution_id = %execution_id,
            tenant_id = %tenant_id,
            method = %request.http_method,
            path = %request.resource_path,
        );

        let start = Instant::now();
        let mut states = StateTracker::new();
        let result = self
            .run(tenant_id, request, &mut states)
            .instrument(span.clone())
            .await;
        let elapsed = start.elapsed();

        span.in_scope(|| {
            tracing::info!(
                outcome = result.outcome(),
                status = result.status_code(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Execution finished"
            );
        });
        metrics::record_execution(result.outcome(), result.status_code(), elapsed);

        ExecutionOutcome {
            execution_id,
            tenant_id: tenant_id.to_string(),
            result,
            path: states.into_path(),
            elapsed,
        }
    }

    async fn run(
        &self,
        tenant_id: &str,
        request: InboundRequest,
        states: &mut StateTracker,
    ) -> ExecutionResult {
        let deadline = Deadline::after(self.deadline);

        states.advance(ExecutionState::ConfigLookup);
        let config = match self.lookup(tenant_id, &deadline).await {
            Ok(config) => config,
            Err(failure) => {
                states.advance(ExecutionState::Failed);
                return failure.into();
            }
        };

        states.advance(ExecutionState::Transform);
        let descriptor = self.transformer.build(request, &config);
        if self.enable_log {
            log_descriptor(&descriptor);
        }

        states.advance(ExecutionState::Invoke);
        match self.invoke(descriptor, &deadline).await {
            Ok(response) => {
                states.advance(ExecutionState::Done);
                ExecutionResult::Success {
                    status_code: response.status_code,
                    headers: response.headers,
                    body: response.body,
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Outbound call failed");
                states.advance(ExecutionState::Failed);
                normalize::classify(error).into()
            }
        }
    }

    async fn lookup(
        &self,
        tenant_id: &str,
        deadline: &Deadline,
    ) -> Result<Arc<TenantConfig>, Failure> {
        let lookup = match deadline.run(self.store.lookup(tenant_id)).await {
            Ok(lookup) => lookup,
            Err(exceeded) => Err(StoreError::Unavailable(format!("lookup cancelled: {}", exceeded))),
        };

        lookup.map_err(|error| {
            let status_code = match &error {
                StoreError::NotFound(_) => {
                    tracing::warn!(error = %error, "Tenant configuration not found");
                    400
                }
                StoreError::Unavailable(_) => {
                    tracing::error!(error = %error, "Tenant configuration unavailable");
                    500
                }
            };
            Failure::new(FailureKind::ConfigError, status_code, error.to_string())
        })
    }

    async fn invoke(
        &self,
        descriptor: OutboundCallDescriptor,
        deadline: &Deadline,
    ) -> Result<RawResponse, InvokerError> {
        let timeout = deadline.clamp(self.invoke_timeout);
        tracing::debug!(timeout_ms = timeout.as_millis() as u64, url = %descriptor.url, "Invoking upstream");

        // The invoker enforces `timeout` itself; the deadline is the backstop.
        match deadline.run(self.invoker.call(descriptor, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(InvokerError::Timeout(timeout)),
        }
    }
}

fn log_descriptor(descriptor: &OutboundCallDescriptor) {
    tracing::debug!(
        method = %descriptor.method,
        url = %descriptor.url,
        headers = ?descriptor.redacted_headers(),
        query = ?descriptor.query_params,
        body_bytes = descriptor.body.as_ref().map(|b| b.len()).unwrap_or(0),
        "Outbound descriptor"
    );
}
