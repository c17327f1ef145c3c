use crate::error::ToolError;
use async_trait::async_trait;

/// One read-only external lookup source.
///
/// Adapters are stateless, built once at startup, and safe to invoke
/// repeatedly with different queries within a single run. Results are
/// truncated by the adapter itself; `Unavailable` means the endpoint
/// could not be reached, which the loop absorbs as an observation.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn invoke(&self, query: &str) -> Result<String, ToolError>;
}
