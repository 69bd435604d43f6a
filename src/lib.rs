//! Config-driven, multi-tenant HTTP proxy workflow engine.
//!
//! Each inbound request runs one short-lived execution:
//! tenant lookup → request transform → outbound call → uniform result.

// Workflow core
pub mod invoker;
pub mod normalize;
pub mod store;
pub mod transform;
pub mod workflow;

// Listener and operations surface
pub mod admin;
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use workflow::{ExecutionResult, InboundRequest, WorkflowExecutor};
