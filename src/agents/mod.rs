//! Multi-agent orchestration: router, programmer, analyst/mentor, and
//! feedback/check-in agents.
//!
//! Agents are request-scoped: the dispatcher constructs a fresh instance per
//! inbound message, which makes each agent's internal cache request-scoped by
//! construction. Shared retry/cache/logging behavior lives in
//! [`base::AgentBase`], composed into each concrete agent rather than
//! inherited.

/// Shared agent plumbing: retries, request-scoped cache, conversation log.
pub mod base;
/// Intent classification and routing predicates.
pub mod router;
/// Methodology-aware program generation.
pub mod programmer;
/// Read-only coaching and mentorship.
pub mod analyst;
/// Workout adjustment and check-in analysis.
pub mod feedback;

use crate::types::{AgentContext, AgentInput, AgentType, Result};
use async_trait::async_trait;

pub use analyst::AnalystMentorAgent;
pub use base::AgentBase;
pub use feedback::{CheckInAgent, FeedbackAgent};
pub use programmer::ProgrammerAgent;
pub use router::RouterAgent;

/// Contract for message-shaped agents.
///
/// Every concrete agent builds its own system prompt and processes input
/// against a request-scoped context. The feedback and check-in agents keep
/// this module's base plumbing but expose typed inherent operations instead;
/// their inputs are sessions and metrics, not messages.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's identity, used for logging and response attribution.
    fn agent_type(&self) -> AgentType;

    /// Build the agent-specific system prompt for this request.
    fn system_prompt(&self, context: &AgentContext) -> String;

    /// Process user input and produce an agent-specific JSON response.
    async fn process(&self, input: &AgentInput, context: &AgentContext)
        -> Result<serde_json::Value>;
}
