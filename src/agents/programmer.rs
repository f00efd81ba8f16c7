use crate::agents::{Agent, AgentBase};
use crate::db::Store;
use crate::llm::{CompletionClient, ResponseFormat};
use crate::types::{
    AgentContext, AgentInput, AgentType, AppError, AthleteProfile, Complexity, EquipmentAccess,
    Exercise, FullProgram, Methodology, ProgramRequest, Result, TrainingAge,
};
use crate::utils::config::AgentConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

/// Default sampling temperature for generation. Higher than the router's so
/// exercise variation stays creative within the enumerated-exercise
/// constraint.
pub const PROGRAMMER_TEMPERATURE: f64 = 0.8;

/// Generated program plus the methodology that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProgram {
    pub program: FullProgram,
    pub methodology_used: String,
}

/// Programmer agent: builds a methodology- and profile-aware prompt and
/// requests a structured program document.
pub struct ProgrammerAgent {
    base: AgentBase,
}

/// Complexity tiers allowed at each training age. Monotonic: a higher
/// training age is a strict superset, never excluding easier movements.
pub fn allowed_complexity(training_age: TrainingAge) -> &'static [Complexity] {
    match training_age {
        TrainingAge::Novice => &[Complexity::Beginner],
        TrainingAge::Intermediate => &[Complexity::Beginner, Complexity::Intermediate],
        TrainingAge::Advanced => &[
            Complexity::Beginner,
            Complexity::Intermediate,
            Complexity::Advanced,
        ],
    }
}

/// Equipment available at each access tier. Monotonic:
/// garage ⊂ commercial ⊂ hardcore.
pub fn available_equipment(access: EquipmentAccess) -> &'static [&'static str] {
    match access {
        EquipmentAccess::Garage => &["barbell", "rack", "bench"],
        EquipmentAccess::Commercial => &[
            "barbell", "rack", "bench", "dumbbells", "cable", "machines",
        ],
        EquipmentAccess::Hardcore => &[
            "barbell",
            "rack",
            "bench",
            "dumbbells",
            "cable",
            "machines",
            "bands",
            "chains",
            "specialty_bars",
        ],
    }
}

impl ProgrammerAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<dyn Store>) -> Self {
        Self {
            base: AgentBase::new(llm, store, PROGRAMMER_TEMPERATURE),
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
            base: AgentBase::new(llm, store, settings.programmer_temperature)
                .with_max_retries(settings.max_retries),
        }
    }

    /// Generate a methodology-aware training program.
    pub async fn generate(
        &self,
        profile: &AthleteProfile,
        request: &ProgramRequest,
    ) -> Result<GeneratedProgram> {
        tracing::info!(
            user_id = %profile.id,
            goal = request.goal.as_str(),
            weeks = request.weeks,
            days_per_week = request.days_per_week,
            "generating program"
        );

        let methodology = self.load_methodology(profile).await?;
        let exercises = self.exercises_for_profile(profile).await?;

        let system_prompt = self.build_system_prompt(&methodology, profile, &exercises);
        let user_prompt = build_user_prompt(profile, request);

        let format = ResponseFormat::Json {
            schema: Some(program_schema()),
        };
        let response_text = self
            .base
            .call_model(&system_prompt, &user_prompt, &format)
            .await?;

        let program: FullProgram = serde_json::from_str(&response_text)
            .map_err(|e| AppError::Schema(format!("program document: {}", e)))?;
        program.validate()?;

        tracing::info!(
            program_id = %program.id,
            title = %program.title,
            weeks = program.weeks.len(),
            "program generated"
        );

        Ok(GeneratedProgram {
            methodology_used: methodology.name,
            program,
        })
    }

    /// Load the profile's methodology. Missing id or row is a hard failure;
    /// a program cannot be generated without methodology rules.
    async fn load_methodology(&self, profile: &AthleteProfile) -> Result<Methodology> {
        let methodology_id = profile.methodology_id.as_deref().ok_or_else(|| {
            AppError::InvalidInput("profile has no methodology selected".to_string())
        })?;

        let cache_key = format!("methodology_{}", methodology_id);
        if let Some(cached) = self.base.cache_get::<Methodology>(&cache_key) {
            tracing::debug!(methodology_id, "methodology loaded from cache");
            return Ok(cached);
        }

        let methodology = self
            .base
            .store()
            .get_methodology(methodology_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("methodology '{}' not found", methodology_id))
            })?;

        self.base.cache_set(&cache_key, &methodology);
        tracing::debug!(methodology_id, "methodology loaded from store");
        Ok(methodology)
    }

    /// Exercises the athlete can actually perform: complexity allowed for
    /// their training age AND required equipment available at their tier.
    async fn exercises_for_profile(&self, profile: &AthleteProfile) -> Result<Vec<Exercise>> {
        let cache_key = format!(
            "exercises_{}_{}",
            profile.equipment_access.as_str(),
            profile.training_age.as_str()
        );
        if let Some(cached) = self.base.cache_get::<Vec<Exercise>>(&cache_key) {
            tracing::debug!("exercises loaded from cache");
            return Ok(cached);
        }

        let allowed = allowed_complexity(profile.training_age);
        let candidates = self.base.store().list_exercises(allowed).await?;

        let equipment: HashSet<&str> = available_equipment(profile.equipment_access)
            .iter()
            .copied()
            .collect();
        let filtered: Vec<Exercise> = candidates
            .into_iter()
            .filter(|ex| ex.equipment.iter().all(|e| equipment.contains(e.as_str())))
            .collect();

        self.base.cache_set(&cache_key, &filtered);
        tracing::debug!(
            count = filtered.len(),
            access = profile.equipment_access.as_str(),
            training_age = profile.training_age.as_str(),
            "exercises filtered"
        );
        Ok(filtered)
    }

    fn build_system_prompt(
        &self,
        methodology: &Methodology,
        profile: &AthleteProfile,
        exercises: &[Exercise],
    ) -> String {
        let mut prompt = methodology.prompt_template.clone();

        let weak_points = if profile.weak_points.is_empty() {
            "None specified".to_string()
        } else {
            profile.weak_points.join(", ")
        };
        let unit = profile.biometrics.unit.as_str();

        prompt.push_str(&format!(
            "\n\n## ATHLETE PROFILE\n\
             - Training Age: {}\n\
             - Weak Points: {}\n\
             - Equipment Access: {}\n\
             - Preferred Session Length: {} minutes\n\
             - 1RMs: Squat {}{unit}, Bench {}{unit}, Deadlift {}{unit}\n",
            profile.training_age.as_str(),
            weak_points,
            profile.equipment_access.as_str(),
            profile.preferred_session_length,
            profile.one_rep_max.squat,
            profile.one_rep_max.bench,
            profile.one_rep_max.deadlift,
        ));

        prompt.push_str("\n## AVAILABLE EXERCISES\n");
        for ex in exercises {
            prompt.push_str(&format!(
                "- {} ({}) - Targets: {}\n",
                ex.name,
                ex.category,
                ex.targets_weak_points.join(", ")
            ));
        }

        prompt.push_str(&format!(
            "\n## PROGRAMMING RULES\n{}\n",
            serde_json::to_string_pretty(&methodology.programming_rules)
                .unwrap_or_else(|_| methodology.programming_rules.to_string())
        ));

        prompt
    }
}

fn build_user_prompt(profile: &AthleteProfile, request: &ProgramRequest) -> String {
    let mut prompt = format!(
        "Generate a {}-week powerlifting program with the following parameters:\n\n\
         **Goal:** {}\n\
         **Training Days Per Week:** {}\n\
         **Athlete Level:** {}\n",
        request.weeks,
        request.goal.as_str(),
        request.days_per_week,
        profile.training_age.as_str(),
    );

    if !request.limitations.is_empty() {
        prompt.push_str(&format!(
            "\n**Limitations/Injuries:** {}",
            request.limitations.join(", ")
        ));
    }
    if !request.focus_areas.is_empty() {
        prompt.push_str(&format!(
            "\n**Focus Areas:** {}",
            request.focus_areas.join(", ")
        ));
    }
    if !profile.weak_points.is_empty() {
        prompt.push_str(&format!(
            "\n**Weak Points to Address:** {}",
            profile.weak_points.join(", ")
        ));
    }
    if let Some(date) = &profile.competition_date {
        prompt.push_str(&format!("\n**Competition Date:** {}", date));
    }

    prompt.push_str(&format!(
        "\n\nGenerate a complete {}-week program following the methodology's programming rules.\n\
         Use only exercises from the AVAILABLE EXERCISES list above.\n\
         Return valid JSON matching the required schema.\n",
        request.weeks
    ));

    prompt
}

/// JSON schema constraining the program completion.
fn program_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "description": "Unique program ID"},
            "createdAt": {"type": "string", "description": "ISO 8601 timestamp"},
            "title": {"type": "string", "description": "Program title"},
            "weeks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "weekNumber": {"type": "integer"},
                        "sessions": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "dayNumber": {"type": "integer"},
                                    "focus": {"type": "string"},
                                    "exercises": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "name": {"type": "string"},
                                                "sets": {"type": "integer"},
                                                "reps": {"type": "string"},
                                                "rpeTarget": {"type": "number"},
                                                "restSeconds": {"type": "integer"},
                                                "notes": {"type": "string"}
                                            },
                                            "required": [
                                                "name", "sets", "reps", "rpeTarget", "restSeconds"
                                            ]
                                        }
                                    }
                                },
                                "required": ["dayNumber", "focus", "exercises"]
                            }
                        }
                    },
                    "required": ["weekNumber", "sessions"]
                }
            }
        },
        "required": ["id", "createdAt", "title", "weeks"]
    })
}

#[async_trait]
impl Agent for ProgrammerAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Programmer
    }

    fn system_prompt(&self, _context: &AgentContext) -> String {
        // The real system prompt needs the loaded methodology and filtered
        // exercises; this standalone form is the template-free skeleton.
        "You are a powerlifting program generator. Generate structured programs \
         following the selected methodology's rules."
            .to_string()
    }

    async fn process(
        &self,
        _input: &AgentInput,
        context: &AgentContext,
    ) -> Result<serde_json::Value> {
        let profile = context
            .profile
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("context must contain a profile".to_string()))?;
        let request = context.request.as_ref().ok_or_else(|| {
            AppError::InvalidInput("context must contain a program request".to_string())
        })?;

        let generated = self.generate(profile, request).await?;
        serde_json::to_value(&generated).map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockStore;
    use crate::types::{Biometrics, OneRepMax, ProgramGoal, Sex, Unit};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

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

    fn profile(training_age: TrainingAge, access: EquipmentAccess) -> AthleteProfile {
        AthleteProfile {
            id: "athlete-1".to_string(),
            name: "Test Lifter".to_string(),
            biometrics: Biometrics {
                bodyweight: 82.5,
                unit: Unit::Kg,
                sex: Sex::Male,
                age: 28,
            },
            one_rep_max: OneRepMax {
                squat: 180.0,
                bench: 120.0,
                deadlift: 220.0,
            },
            training_age,
            weak_points: vec!["lockout".to_string()],
            equipment_access: access,
            preferred_session_length: 90,
            methodology_id: Some("linear_progression".to_string()),
            competition_date: None,
        }
    }

    fn exercise(id: &str, complexity: Complexity, equipment: &[&str]) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: id.to_string(),
            category: "squat".to_string(),
            variation_type: "test".to_string(),
            equipment: equipment.iter().map(|s| s.to_string()).collect(),
            targets_weak_points: vec!["overall".to_string()],
            movement_pattern: "bilateral_squat".to_string(),
            complexity,
        }
    }

    #[test]
    fn complexity_table_is_monotonic_in_training_age() {
        let novice: HashSet<_> = allowed_complexity(TrainingAge::Novice).iter().collect();
        let intermediate: HashSet<_> = allowed_complexity(TrainingAge::Intermediate)
            .iter()
            .collect();
        let advanced: HashSet<_> = allowed_complexity(TrainingAge::Advanced).iter().collect();

        assert!(novice.is_subset(&intermediate));
        assert!(intermediate.is_subset(&advanced));
        assert!(novice.len() < advanced.len());
    }

    #[test]
    fn equipment_table_is_monotonic_in_access_tier() {
        let garage: HashSet<_> = available_equipment(EquipmentAccess::Garage).iter().collect();
        let commercial: HashSet<_> = available_equipment(EquipmentAccess::Commercial)
            .iter()
            .collect();
        let hardcore: HashSet<_> = available_equipment(EquipmentAccess::Hardcore)
            .iter()
            .collect();

        assert!(garage.is_subset(&commercial));
        assert!(commercial.is_subset(&hardcore));
        assert!(garage.len() < hardcore.len());
    }

    #[tokio::test]
    async fn machine_exercise_excluded_for_garage_novice() {
        let mut store = MockStore::new();
        store.expect_list_exercises().returning(|allowed| {
            // The store only sees the complexity filter. The novice allow-set
            // excludes the advanced exercise already; the machine exercise
            // survives complexity but must fall to the equipment filter.
            assert_eq!(allowed, &[Complexity::Beginner]);
            Ok(vec![
                exercise("competition_squat", Complexity::Beginner, &["barbell", "rack"]),
                exercise("leg_press", Complexity::Beginner, &["machines"]),
            ])
        });

        let agent = ProgrammerAgent::new(
            Arc::new(CannedClient {
                response: "{}".to_string(),
            }),
            Arc::new(store),
        );
        let filtered = agent
            .exercises_for_profile(&profile(TrainingAge::Novice, EquipmentAccess::Garage))
            .await
            .unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "competition_squat");
    }

    #[tokio::test]
    async fn exercise_cache_hits_skip_the_store() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let mut store = MockStore::new();
        store.expect_list_exercises().returning(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(vec![exercise(
                "competition_squat",
                Complexity::Beginner,
                &["barbell", "rack"],
            )])
        });

        let agent = ProgrammerAgent::new(
            Arc::new(CannedClient {
                response: "{}".to_string(),
            }),
            Arc::new(store),
        );
        let p = profile(TrainingAge::Novice, EquipmentAccess::Garage);

        let first = agent.exercises_for_profile(&p).await.unwrap();
        let second = agent.exercises_for_profile(&p).await.unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "store read not cached");
    }

    #[tokio::test]
    async fn missing_methodology_is_a_hard_failure() {
        let mut store = MockStore::new();
        store
            .expect_get_methodology()
            .returning(|_| Ok(None));
        store.expect_list_exercises().returning(|_| Ok(vec![]));

        let agent = ProgrammerAgent::new(
            Arc::new(CannedClient {
                response: "{}".to_string(),
            }),
            Arc::new(store),
        );
        let request = ProgramRequest {
            goal: ProgramGoal::StrengthBlock,
            weeks: 8,
            days_per_week: 4,
            limitations: vec![],
            focus_areas: vec![],
        };
        let err = agent
            .generate(&profile(TrainingAge::Novice, EquipmentAccess::Garage), &request)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_program_json_propagates_schema_error() {
        let mut store = MockStore::new();
        store.expect_get_methodology().returning(|id| {
            Ok(Some(Methodology {
                id: id.to_string(),
                name: "Linear Progression".to_string(),
                description: "test".to_string(),
                category: "beginner".to_string(),
                prompt_template: "You are a coach.".to_string(),
                programming_rules: json!({"frequency": "3x"}),
                knowledge_base: json!({}),
            }))
        });
        store.expect_list_exercises().returning(|_| {
            Ok(vec![exercise(
                "competition_squat",
                Complexity::Beginner,
                &["barbell", "rack"],
            )])
        });

        let agent = ProgrammerAgent::new(
            Arc::new(CannedClient {
                response: "{\"title\": \"missing everything else\"}".to_string(),
            }),
            Arc::new(store),
        );
        let request = ProgramRequest {
            goal: ProgramGoal::Peaking,
            weeks: 8,
            days_per_week: 4,
            limitations: vec![],
            focus_areas: vec![],
        };
        let err = agent
            .generate(&profile(TrainingAge::Novice, EquipmentAccess::Garage), &request)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_VALIDATION");
    }
}
