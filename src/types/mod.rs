//! Core types: domain entities, API request/response shapes, and error handling.
//!
//! Wire format is camelCase throughout (matches the frontend contract), while
//! enum values stay snake_case (`program_generation`, `analyst_mentor`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Intent Classification =============

/// The five user intents the router distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ProgramGeneration,
    TechniqueQuestion,
    MotivationSupport,
    ProgramAdjustment,
    GeneralChat,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ProgramGeneration => "program_generation",
            Intent::TechniqueQuestion => "technique_question",
            Intent::MotivationSupport => "motivation_support",
            Intent::ProgramAdjustment => "program_adjustment",
            Intent::GeneralChat => "general_chat",
        }
    }
}

/// Agent suggested by the router for a classified message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAgent {
    Programmer,
    AnalystMentor,
    Feedback,
}

/// Result of classifying one inbound message.
///
/// Produced once per request by the router agent and embedded in the
/// conversation log; never persisted as its own entity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentClassification {
    pub intent: Intent,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
    pub suggested_agent: SuggestedAgent,
    pub requires_program_context: bool,
}

// ============= Agent Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Router,
    Programmer,
    AnalystMentor,
    Feedback,
    CheckIn,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Router => "router",
            AgentType::Programmer => "programmer",
            AgentType::AnalystMentor => "analyst_mentor",
            AgentType::Feedback => "feedback",
            AgentType::CheckIn => "check_in",
        }
    }
}

/// Request-scoped bag of data the dispatcher hands to an agent.
///
/// Owned by the dispatcher for the duration of one request; never shared
/// across requests.
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub profile: Option<AthleteProfile>,
    pub request: Option<ProgramRequest>,
    pub has_program: bool,
    pub methodology_id: Option<String>,
    pub feedback_categories: Vec<FeedbackCategory>,
}

/// Free-text input for message-shaped agents.
#[derive(Debug, Clone)]
pub struct AgentInput {
    pub message: String,
}

// ============= Athlete Profile =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Lbs,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Lbs => "lbs",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Biometrics {
    pub bodyweight: f64,
    pub unit: Unit,
    pub sex: Sex,
    pub age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OneRepMax {
    pub squat: f64,
    pub bench: f64,
    pub deadlift: f64,
}

/// Training experience brackets driving exercise complexity filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrainingAge {
    Novice,
    Intermediate,
    Advanced,
}

impl TrainingAge {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingAge::Novice => "novice",
            TrainingAge::Intermediate => "intermediate",
            TrainingAge::Advanced => "advanced",
        }
    }
}

/// Equipment tiers. Each tier is a strict superset of the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentAccess {
    Garage,
    Commercial,
    Hardcore,
}

impl EquipmentAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentAccess::Garage => "garage",
            EquipmentAccess::Commercial => "commercial",
            EquipmentAccess::Hardcore => "hardcore",
        }
    }
}

/// Extended lifter profile supplied with every agent request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AthleteProfile {
    pub id: String,
    pub name: String,
    pub biometrics: Biometrics,
    pub one_rep_max: OneRepMax,
    pub training_age: TrainingAge,
    #[serde(default)]
    pub weak_points: Vec<String>,
    pub equipment_access: EquipmentAccess,
    /// Preferred session length in minutes.
    pub preferred_session_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_date: Option<String>,
}

// ============= Reference Data =============

/// Exercise complexity tiers. Ordering matters for the training-age filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

/// A training methodology: prompt template plus structured rules and
/// knowledge. Seeded reference data, read-only at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Methodology {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub prompt_template: String,
    pub programming_rules: serde_json::Value,
    pub knowledge_base: serde_json::Value,
}

/// Exercise library entry used by the programmer agent's filtering step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    pub variation_type: String,
    pub equipment: Vec<String>,
    pub targets_weak_points: Vec<String>,
    pub movement_pattern: String,
    pub complexity: Complexity,
}

// ============= Program Document =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgramGoal {
    Peaking,
    Hypertrophy,
    StrengthBlock,
}

impl ProgramGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramGoal::Peaking => "peaking",
            ProgramGoal::Hypertrophy => "hypertrophy",
            ProgramGoal::StrengthBlock => "strength_block",
        }
    }
}

/// Parameters for a new program.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRequest {
    pub goal: ProgramGoal,
    pub weeks: u32,
    pub days_per_week: u32,
    #[serde(default)]
    pub limitations: Vec<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

/// Single prescribed exercise inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePrescription {
    pub name: String,
    pub sets: u32,
    /// Reps as a string: `"5"`, `"3-5"`, or `"AMRAP"`.
    pub reps: String,
    pub rpe_target: f64,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One training day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub day_number: u32,
    pub focus: String,
    pub exercises: Vec<ExercisePrescription>,
}

/// One week of training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramWeek {
    pub week_number: u32,
    pub sessions: Vec<Session>,
}

/// Complete generated program document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullProgram {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub weeks: Vec<ProgramWeek>,
}

impl FullProgram {
    /// Structural validation beyond what serde enforces. A malformed program
    /// must never reach the athlete, so violations are `AppError::Schema`.
    pub fn validate(&self) -> Result<()> {
        if self.weeks.is_empty() {
            return Err(AppError::Schema("program has no weeks".to_string()));
        }
        for week in &self.weeks {
            if week.sessions.is_empty() {
                return Err(AppError::Schema(format!(
                    "week {} has no sessions",
                    week.week_number
                )));
            }
            for session in &week.sessions {
                if session.exercises.is_empty() {
                    return Err(AppError::Schema(format!(
                        "week {} day {} has no exercises",
                        week.week_number, session.day_number
                    )));
                }
                for ex in &session.exercises {
                    if ex.sets == 0 || ex.sets > 10 {
                        return Err(AppError::Schema(format!(
                            "exercise '{}' has invalid set count {}",
                            ex.name, ex.sets
                        )));
                    }
                    if !(6.0..=10.0).contains(&ex.rpe_target) {
                        return Err(AppError::Schema(format!(
                            "exercise '{}' has RPE target {} outside 6-10",
                            ex.name, ex.rpe_target
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============= Feedback & Check-in =============

/// Feedback category taxonomy, each with a documented adjustment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Injury,
    MuscleFatigue,
    ExcessiveSoreness,
    LowEnergy,
    ScheduleConflict,
    FeelingStrong,
    Other,
}

impl FeedbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Injury => "injury",
            FeedbackCategory::MuscleFatigue => "muscle_fatigue",
            FeedbackCategory::ExcessiveSoreness => "excessive_soreness",
            FeedbackCategory::LowEnergy => "low_energy",
            FeedbackCategory::ScheduleConflict => "schedule_conflict",
            FeedbackCategory::FeelingStrong => "feeling_strong",
            FeedbackCategory::Other => "other",
        }
    }
}

/// Adherence metrics for a check-in period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInMetrics {
    pub sessions_completed: u32,
    pub sessions_planned: u32,
    /// Fraction in `[0, 1]`.
    pub adherence_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rpe: Option<f64>,
}

/// Summary of one completed session, as submitted with a check-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub week_number: u32,
    pub day_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<SessionFeedback>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionFeedback {
    #[serde(default)]
    pub categories: Vec<FeedbackCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
}

/// Outcome of a check-in analysis.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInAnalysis {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub adjustments_needed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_program: Option<FullProgram>,
}

// ============= Conversation Log =============

/// Append-only record of one routed message. Write failures are swallowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConversation {
    pub id: String,
    pub user_id: String,
    pub agent_type: String,
    pub user_message: String,
    pub intent_classification: Option<serde_json::Value>,
    pub agent_response: String,
    pub context: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ============= API Request/Response Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessageRequest {
    pub message: String,
    pub profile: AthleteProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_program_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessageResponse {
    pub agent_used: String,
    pub intent_classification: IntentClassification,
    #[schema(value_type = Object)]
    pub response: serde_json::Value,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProgramRequest {
    pub profile: AthleteProfile,
    pub request: ProgramRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramResponse {
    pub program: FullProgram,
    pub methodology_used: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustWorkoutRequest {
    pub user_id: String,
    pub session: Session,
    pub categories: Vec<FeedbackCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustWorkoutResponse {
    pub adjusted_session: Session,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub user_id: String,
    /// `daily` or `weekly`.
    pub check_in_type: String,
    pub metrics: CheckInMetrics,
    #[serde(default)]
    pub sessions: Vec<CompletedSession>,
    pub program: FullProgram,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessCheckRequest {
    pub user_id: String,
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub day_number: Option<u32>,
    /// 1 (terrible) to 5 (excellent).
    pub sleep_quality: u8,
    /// 1 (calm) to 5 (maxed out).
    pub stress_level: u8,
    /// 1 (beat up) to 5 (fresh).
    pub soreness_fatigue: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessCheckResponse {
    pub check_id: String,
    pub overall_readiness: f64,
    pub recommendation: String,
    pub should_adjust_workout: bool,
    /// `reduce_volume` or `reduce_intensity`; absent when training as planned.
    pub adjustment_type: Option<String>,
    pub timestamp: String,
}

/// Methodology listing entry, without the prompt template and rule payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MethodologySummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

impl From<&Methodology> for MethodologySummary {
    fn from(m: &Methodology) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            description: m.description.clone(),
            category: m.category.clone(),
        }
    }
}

/// Full methodology record as exposed over the API. The agent-facing prompt
/// template stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodologyDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub programming_rules: serde_json::Value,
    pub knowledge_base: serde_json::Value,
}

impl From<Methodology> for MethodologyDetail {
    fn from(m: Methodology) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category: m.category,
            programming_rules: m.programming_rules,
            knowledge_base: m.knowledge_base,
        }
    }
}

// ============= Error Types =============

/// Application error taxonomy.
///
/// Input and schema errors map to 4xx; completion/transport errors to 502;
/// database and internal errors to 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Schema validation failed: {0}")]
    Schema(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Schema(_) => "SCHEMA_VALIDATION",
            AppError::Completion(_) => "COMPLETION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let code = self.code();
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Schema(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Completion(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::ProgramGeneration).unwrap();
        assert_eq!(json, "\"program_generation\"");

        let parsed: Intent = serde_json::from_str("\"technique_question\"").unwrap();
        assert_eq!(parsed, Intent::TechniqueQuestion);
    }

    #[test]
    fn classification_round_trips_camel_case() {
        let raw = serde_json::json!({
            "intent": "program_adjustment",
            "confidence": 0.9,
            "reasoning": "wants to change today's workout",
            "suggestedAgent": "feedback",
            "requiresProgramContext": true,
        });
        let c: IntentClassification = serde_json::from_value(raw).unwrap();
        assert_eq!(c.intent, Intent::ProgramAdjustment);
        assert_eq!(c.suggested_agent, SuggestedAgent::Feedback);
        assert!(c.requires_program_context);
    }

    #[test]
    fn program_validation_rejects_out_of_range_rpe() {
        let program = FullProgram {
            id: "p1".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            title: "Test".to_string(),
            weeks: vec![ProgramWeek {
                week_number: 1,
                sessions: vec![Session {
                    day_number: 1,
                    focus: "Squat".to_string(),
                    exercises: vec![ExercisePrescription {
                        name: "Competition Squat".to_string(),
                        sets: 5,
                        reps: "5".to_string(),
                        rpe_target: 11.0,
                        rest_seconds: 180,
                        notes: None,
                    }],
                }],
            }],
        };
        let err = program.validate().unwrap_err();
        assert_eq!(err.code(), "SCHEMA_VALIDATION");
    }

    #[test]
    fn program_validation_rejects_empty_weeks() {
        let program = FullProgram {
            id: "p1".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            title: "Test".to_string(),
            weeks: vec![],
        };
        assert!(program.validate().is_err());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AppError::InvalidInput("x".into()).code(), "INVALID_INPUT");
        assert_eq!(AppError::Completion("x".into()).code(), "COMPLETION_ERROR");
        assert_eq!(AppError::Schema("x".into()).code(), "SCHEMA_VALIDATION");
    }
}
