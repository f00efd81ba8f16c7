use crate::agents::{Agent, AgentBase};
use crate::db::Store;
use crate::llm::{CompletionClient, ResponseFormat};
use crate::types::{AgentContext, AgentInput, AgentType, AppError, AthleteProfile, Result};
use crate::utils::config::AgentConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Balanced temperature: helpful but consistent advice.
pub const ANALYST_TEMPERATURE: f64 = 0.7;

/// Methodology name plus knowledge base, as injected into the coaching
/// prompt. Empty when the athlete has no methodology or the row is gone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodologyKnowledge {
    pub methodology_name: String,
    pub knowledge_base: serde_json::Value,
}

impl MethodologyKnowledge {
    fn is_empty(&self) -> bool {
        self.methodology_name.is_empty()
    }
}

/// Analyst/mentor agent: read-only coaching with methodology knowledge
/// retrieval. It answers technique, injury, and motivation questions and
/// must never mutate a program.
pub struct AnalystMentorAgent {
    base: AgentBase,
}

impl AnalystMentorAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<dyn Store>) -> Self {
        Self {
            base: AgentBase::new(llm, store, ANALYST_TEMPERATURE),
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
            base: AgentBase::new(llm, store, settings.analyst_temperature)
                .with_max_retries(settings.max_retries),
        }
    }

    /// Answer a coaching question as free text.
    pub async fn advise(
        &self,
        message: &str,
        profile: Option<&AthleteProfile>,
    ) -> Result<String> {
        if message.trim().is_empty() {
            return Err(AppError::InvalidInput("message must not be empty".to_string()));
        }

        tracing::info!(
            user_id = profile.map(|p| p.id.as_str()).unwrap_or("unknown"),
            "processing analyst query"
        );

        let knowledge = match profile.and_then(|p| p.methodology_id.as_deref()) {
            Some(id) => self.load_methodology_knowledge(id).await?,
            None => MethodologyKnowledge::default(),
        };

        let system_prompt = build_system_prompt(&knowledge);
        let user_prompt = build_user_prompt(message, profile);

        let response = self
            .base
            .call_model(&system_prompt, &user_prompt, &ResponseFormat::Text)
            .await?;

        tracing::info!(chars = response.len(), "analyst response generated");
        Ok(response)
    }

    /// Look up the methodology's knowledge base. A missing row degrades to
    /// empty knowledge rather than failing: advice can stand without it.
    async fn load_methodology_knowledge(
        &self,
        methodology_id: &str,
    ) -> Result<MethodologyKnowledge> {
        let cache_key = format!("methodology_kb_{}", methodology_id);
        if let Some(cached) = self.base.cache_get::<MethodologyKnowledge>(&cache_key) {
            tracing::debug!(methodology_id, "methodology knowledge loaded from cache");
            return Ok(cached);
        }

        let Some(methodology) = self.base.store().get_methodology(methodology_id).await? else {
            tracing::warn!(methodology_id, "methodology not found");
            return Ok(MethodologyKnowledge::default());
        };

        let knowledge = MethodologyKnowledge {
            methodology_name: methodology.name,
            knowledge_base: methodology.knowledge_base,
        };
        self.base.cache_set(&cache_key, &knowledge);
        tracing::debug!(methodology_id, "methodology knowledge loaded from store");
        Ok(knowledge)
    }
}

fn build_system_prompt(knowledge: &MethodologyKnowledge) -> String {
    let methodology_name = if knowledge.is_empty() {
        "Unknown"
    } else {
        &knowledge.methodology_name
    };

    let mut prompt = format!(
        "You are an expert powerlifting coach and mentor for IronPath AI.\n\n\
         Your role is to provide:\n\
         1. Technique advice (form, cues, movement patterns)\n\
         2. Injury prevention guidance\n\
         3. Weak point analysis and strategies\n\
         4. Exercise substitutions and alternatives\n\
         5. Motivation and mental coaching support\n\n\
         **CRITICAL: You are READ-ONLY. You CANNOT modify training programs.**\n\
         If the user wants to change their program, direct them to use the feedback \
         system or program regeneration.\n\n\
         **ATHLETE'S METHODOLOGY:** {}\n",
        methodology_name
    );

    if !knowledge.is_empty() && !knowledge.knowledge_base.is_null() {
        prompt.push_str(&format!(
            "\n**METHODOLOGY KNOWLEDGE BASE:**\n{}\n",
            serde_json::to_string_pretty(&knowledge.knowledge_base)
                .unwrap_or_else(|_| knowledge.knowledge_base.to_string())
        ));
    }

    prompt.push_str(
        "\n**Guidelines:**\n\
         - Provide specific, actionable advice\n\
         - Reference powerlifting science and best practices\n\
         - Be encouraging but realistic\n\
         - If you don't know something, say so\n\
         - Always prioritize safety and injury prevention\n\
         - Tailor advice to the athlete's methodology when relevant\n\n\
         Respond in a conversational, supportive tone as if you're a knowledgeable coach.\n",
    );

    prompt
}

fn build_user_prompt(message: &str, profile: Option<&AthleteProfile>) -> String {
    let mut prompt = format!("User question: {}", message);

    if let Some(p) = profile {
        let weak_points = if p.weak_points.is_empty() {
            "None specified".to_string()
        } else {
            p.weak_points.join(", ")
        };
        let unit = p.biometrics.unit.as_str();
        prompt.push_str(&format!(
            "\n\nAthlete context:\n\
             - Training age: {}\n\
             - Weak points: {}\n\
             - 1RMs: Squat {}{unit}, Bench {}{unit}, Deadlift {}{unit}\n",
            p.training_age.as_str(),
            weak_points,
            p.one_rep_max.squat,
            p.one_rep_max.bench,
            p.one_rep_max.deadlift,
        ));
    }

    prompt
}

#[async_trait]
impl Agent for AnalystMentorAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::AnalystMentor
    }

    fn system_prompt(&self, _context: &AgentContext) -> String {
        build_system_prompt(&MethodologyKnowledge::default())
    }

    async fn process(
        &self,
        input: &AgentInput,
        context: &AgentContext,
    ) -> Result<serde_json::Value> {
        let response = self.advise(&input.message, context.profile.as_ref()).await?;
        Ok(json!({
            "response": response,
            "agentType": AgentType::AnalystMentor.as_str(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockStore;
    use crate::types::{Biometrics, Methodology, OneRepMax, Sex, TrainingAge, Unit};
    use crate::types::EquipmentAccess;
    use parking_lot::Mutex;

    struct RecordingClient {
        response: String,
        last_system: Mutex<String>,
    }

    impl RecordingClient {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                last_system: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(
            &self,
            system: &str,
            _user: &str,
            _temperature: f64,
            format: &ResponseFormat,
        ) -> Result<String> {
            assert!(matches!(format, ResponseFormat::Text), "analyst is free-text");
            *self.last_system.lock() = system.to_string();
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "canned-test-model"
        }
    }

    fn profile_with_methodology(methodology_id: Option<&str>) -> AthleteProfile {
        AthleteProfile {
            id: "athlete-1".to_string(),
            name: "Test Lifter".to_string(),
            biometrics: Biometrics {
                bodyweight: 82.5,
                unit: Unit::Kg,
                sex: Sex::Female,
                age: 31,
            },
            one_rep_max: OneRepMax {
                squat: 140.0,
                bench: 82.5,
                deadlift: 170.0,
            },
            training_age: TrainingAge::Intermediate,
            weak_points: vec!["bench_lockout".to_string()],
            equipment_access: EquipmentAccess::Commercial,
            preferred_session_length: 75,
            methodology_id: methodology_id.map(|s| s.to_string()),
            competition_date: None,
        }
    }

    #[tokio::test]
    async fn prompt_carries_read_only_contract_and_knowledge() {
        let mut store = MockStore::new();
        store.expect_get_methodology().returning(|id| {
            Ok(Some(Methodology {
                id: id.to_string(),
                name: "Westside Conjugate".to_string(),
                description: "test".to_string(),
                category: "advanced".to_string(),
                prompt_template: "unused here".to_string(),
                programming_rules: json!({}),
                knowledge_base: json!({"max_effort": "rotate weekly"}),
            }))
        });

        let client = Arc::new(RecordingClient::new("Keep your elbows tucked."));
        let agent = AnalystMentorAgent::new(client.clone(), Arc::new(store));

        let answer = agent
            .advise(
                "How do I fix my bench lockout?",
                Some(&profile_with_methodology(Some("westside_conjugate"))),
            )
            .await
            .unwrap();

        assert_eq!(answer, "Keep your elbows tucked.");
        let system = client.last_system.lock().clone();
        assert!(system.contains("READ-ONLY"));
        assert!(system.contains("Westside Conjugate"));
        assert!(system.contains("max_effort"));
    }

    #[tokio::test]
    async fn missing_methodology_degrades_to_empty_knowledge() {
        let mut store = MockStore::new();
        store.expect_get_methodology().returning(|_| Ok(None));

        let client = Arc::new(RecordingClient::new("Advice without knowledge."));
        let agent = AnalystMentorAgent::new(client.clone(), Arc::new(store));

        let answer = agent
            .advise(
                "Should I deload?",
                Some(&profile_with_methodology(Some("gone_methodology"))),
            )
            .await
            .unwrap();

        assert_eq!(answer, "Advice without knowledge.");
        let system = client.last_system.lock().clone();
        assert!(system.contains("**ATHLETE'S METHODOLOGY:** Unknown"));
        assert!(!system.contains("METHODOLOGY KNOWLEDGE BASE"));
    }

    #[tokio::test]
    async fn no_profile_skips_the_store_entirely() {
        // MockStore with no expectations panics if touched.
        let store = MockStore::new();
        let client = Arc::new(RecordingClient::new("General advice."));
        let agent = AnalystMentorAgent::new(client, Arc::new(store));

        let answer = agent.advise("What is RPE?", None).await.unwrap();
        assert_eq!(answer, "General advice.");
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let agent = AnalystMentorAgent::new(
            Arc::new(RecordingClient::new("unused")),
            Arc::new(MockStore::new()),
        );
        let err = agent.advise("   ", None).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn knowledge_lookup_is_cached() {
        let mut store = MockStore::new();
        store
            .expect_get_methodology()
            .times(1)
            .returning(|id| {
                Ok(Some(Methodology {
                    id: id.to_string(),
                    name: "Linear Progression".to_string(),
                    description: "test".to_string(),
                    category: "beginner".to_string(),
                    prompt_template: "unused".to_string(),
                    programming_rules: json!({}),
                    knowledge_base: json!({"progression": "add 2.5kg"}),
                }))
            });

        let agent = AnalystMentorAgent::new(
            Arc::new(RecordingClient::new("ok")),
            Arc::new(store),
        );
        let profile = profile_with_methodology(Some("linear_progression"));

        agent.advise("First question", Some(&profile)).await.unwrap();
        agent.advise("Second question", Some(&profile)).await.unwrap();
    }
}
