use crate::agents::{Agent, AgentBase};
use crate::db::Store;
use crate::llm::{CompletionClient, ResponseFormat};
use crate::types::{
    AgentContext, AgentInput, AgentType, AppError, Intent, IntentClassification, Result,
};
use crate::utils::config::AgentConfig;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Default sampling temperature for classification. Low, so categorical
/// output stays near-deterministic across repeated identical inputs.
pub const ROUTER_TEMPERATURE: f64 = 0.3;

/// Router agent: classifies a user message into one of five intents.
///
/// Classification and routing are deliberately decoupled: the router never
/// calls another agent. The dispatcher applies the routing predicates below,
/// so routing policy can change without touching the model prompt, and the
/// predicates are unit-testable against literal classification fixtures.
pub struct RouterAgent {
    base: AgentBase,
}

impl RouterAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<dyn Store>) -> Self {
        Self {
            base: AgentBase::new(llm, store, ROUTER_TEMPERATURE),
        }
    }

    /// Construct with the deployment's agent settings instead of the
    /// compiled-in defaults.
    pub fn configured(
        llm: Arc<dyn CompletionClient>,
        store: Arc<dyn Store>,
        settings: &AgentConfig,
    ) -> Self {
        Self {
            base: AgentBase::new(llm, store, settings.router_temperature)
                .with_max_retries(settings.max_retries),
        }
    }

    pub fn base(&self) -> &AgentBase {
        &self.base
    }

    /// Classify a user message. Fails on empty input and on any completion
    /// output that does not validate against the classification shape; there
    /// is no silent fallback at this layer.
    pub async fn classify(
        &self,
        message: &str,
        context: &AgentContext,
    ) -> Result<IntentClassification> {
        if message.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        tracing::info!(preview = %truncate(message, 50), "classifying intent");

        let system_prompt = self.system_prompt(context);
        let user_prompt = format!("User message: {}", message);
        let format = ResponseFormat::Json {
            schema: Some(intent_schema()),
        };

        let response_text = self
            .base
            .call_model(&system_prompt, &user_prompt, &format)
            .await?;

        let classification: IntentClassification = serde_json::from_str(&response_text)
            .map_err(|e| AppError::Schema(format!("intent classification: {}", e)))?;

        if !(0.0..=1.0).contains(&classification.confidence) {
            return Err(AppError::Schema(format!(
                "confidence {} outside [0, 1]",
                classification.confidence
            )));
        }

        tracing::info!(
            intent = ?classification.intent,
            confidence = classification.confidence,
            agent = ?classification.suggested_agent,
            "intent classified"
        );

        Ok(classification)
    }

    /// True when the classification should be handled by the programmer.
    pub fn should_route_to_programmer(classification: &IntentClassification) -> bool {
        classification.intent == Intent::ProgramGeneration
    }

    /// True when the classification should be handled by the analyst/mentor.
    pub fn should_route_to_analyst(classification: &IntentClassification) -> bool {
        matches!(
            classification.intent,
            Intent::TechniqueQuestion | Intent::MotivationSupport | Intent::GeneralChat
        )
    }

    /// True when the classification should be handled by the feedback agent.
    pub fn should_route_to_feedback(classification: &IntentClassification) -> bool {
        classification.intent == Intent::ProgramAdjustment
    }
}

#[async_trait]
impl Agent for RouterAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Router
    }

    fn system_prompt(&self, context: &AgentContext) -> String {
        let methodology = context
            .methodology_id
            .as_deref()
            .unwrap_or("None");

        format!(
            r#"You are a Router Agent for IronPath, a powerlifting coaching system.

Classify user messages into intents to route to the correct specialized agent.

**Available Agents:**
1. Programmer Agent: Generate/modify workout programs
2. Analyst/Mentor Agent: Coaching advice, technique tips, motivation
3. Feedback Agent: Workout feedback and autoregulation

**Context:**
- User has existing program: {}
- Current methodology: {}

**Intent Types:**
- program_generation: User wants to create a new training program
- technique_question: User asks about exercise form, technique, or weak points
- motivation_support: User needs encouragement or mental coaching
- program_adjustment: User wants to modify existing workout based on feedback
- general_chat: Greetings, unclear questions, general conversation

**Instructions:**
Analyze the user message and return JSON with:
1. intent: One of the intent types above
2. confidence: Float 0.0-1.0 indicating classification confidence
3. reasoning: Brief explanation of why you chose this intent
4. suggestedAgent: Which agent should handle this (programmer, analyst_mentor, feedback)
5. requiresProgramContext: Boolean - does this need the user's current program data?

Return ONLY valid JSON, no additional text."#,
            context.has_program, methodology
        )
    }

    async fn process(
        &self,
        input: &AgentInput,
        context: &AgentContext,
    ) -> Result<serde_json::Value> {
        let classification = self.classify(&input.message, context).await?;
        serde_json::to_value(&classification).map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// JSON schema constraining the classification completion.
fn intent_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "intent": {
                "type": "string",
                "description": "Classified intent type",
                "enum": [
                    "program_generation",
                    "technique_question",
                    "motivation_support",
                    "program_adjustment",
                    "general_chat"
                ]
            },
            "confidence": {
                "type": "number",
                "description": "Confidence score 0.0-1.0"
            },
            "reasoning": {
                "type": "string",
                "description": "Explanation of classification"
            },
            "suggestedAgent": {
                "type": "string",
                "description": "Agent to route to",
                "enum": ["programmer", "analyst_mentor", "feedback"]
            },
            "requiresProgramContext": {
                "type": "boolean",
                "description": "Needs current program data"
            }
        },
        "required": [
            "intent",
            "confidence",
            "reasoning",
            "suggestedAgent",
            "requiresProgramContext"
        ]
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockStore;
    use crate::types::SuggestedAgent;

    struct CannedClient {
        response: String,
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _temperature: f64,
            _format: &ResponseFormat,
        ) -> Result<String> {
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "canned-test-model"
        }
    }

    fn router_with_response(response: &str) -> RouterAgent {
        RouterAgent::new(
            Arc::new(CannedClient {
                response: response.to_string(),
            }),
            Arc::new(MockStore::new()),
        )
    }

    fn classification(intent: Intent) -> IntentClassification {
        IntentClassification {
            intent,
            confidence: 0.95,
            reasoning: "fixture".to_string(),
            suggested_agent: SuggestedAgent::AnalystMentor,
            requires_program_context: false,
        }
    }

    #[test]
    fn predicates_are_mutually_exclusive_over_intents() {
        for intent in [
            Intent::ProgramGeneration,
            Intent::TechniqueQuestion,
            Intent::MotivationSupport,
            Intent::ProgramAdjustment,
            Intent::GeneralChat,
        ] {
            let c = classification(intent);
            let hits = [
                RouterAgent::should_route_to_programmer(&c),
                RouterAgent::should_route_to_analyst(&c),
                RouterAgent::should_route_to_feedback(&c),
            ]
            .iter()
            .filter(|&&b| b)
            .count();
            assert_eq!(hits, 1, "intent {:?} matched {} predicates", intent, hits);
        }
    }

    #[test]
    fn program_generation_routes_to_programmer_only() {
        let c = classification(Intent::ProgramGeneration);
        assert!(RouterAgent::should_route_to_programmer(&c));
        assert!(!RouterAgent::should_route_to_analyst(&c));
        assert!(!RouterAgent::should_route_to_feedback(&c));
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_any_network_call() {
        let router = router_with_response("{}");
        let err = router
            .classify("   ", &AgentContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn valid_json_classification_is_parsed() {
        let router = router_with_response(
            r#"{"intent":"technique_question","confidence":0.92,
                "reasoning":"asks about bench form","suggestedAgent":"analyst_mentor",
                "requiresProgramContext":false}"#,
        );
        let c = router
            .classify("How do I fix my bench lockout?", &AgentContext::default())
            .await
            .unwrap();
        assert_eq!(c.intent, Intent::TechniqueQuestion);
        assert_eq!(c.suggested_agent, SuggestedAgent::AnalystMentor);
    }

    #[tokio::test]
    async fn malformed_json_propagates_schema_error() {
        let router = router_with_response("not json at all");
        let err = router
            .classify("hello", &AgentContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_VALIDATION");
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_rejected() {
        let router = router_with_response(
            r#"{"intent":"general_chat","confidence":1.7,"reasoning":"x",
                "suggestedAgent":"analyst_mentor","requiresProgramContext":false}"#,
        );
        let err = router
            .classify("hey", &AgentContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_VALIDATION");
    }

    #[test]
    fn system_prompt_reflects_routing_context() {
        let router = router_with_response("{}");
        let context = AgentContext {
            has_program: true,
            methodology_id: Some("westside_conjugate".to_string()),
            ..Default::default()
        };
        let prompt = router.system_prompt(&context);
        assert!(prompt.contains("User has existing program: true"));
        assert!(prompt.contains("westside_conjugate"));
    }
}
