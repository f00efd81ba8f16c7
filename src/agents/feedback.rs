//! Session-adjustment and check-in agents.
//!
//! Both agents never fail the caller: any completion or parse failure
//! degrades to a safe fallback so the athlete always has a session to
//! follow and an insight to read.

use crate::agents::AgentBase;
use crate::db::Store;
use crate::llm::{CompletionClient, ResponseFormat};
use crate::types::{
    CheckInAnalysis, CheckInMetrics, CompletedSession, FeedbackCategory, FullProgram, Result,
    Session,
};
use crate::utils::config::AgentConfig;
use serde::Deserialize;
use std::sync::Arc;

pub const FEEDBACK_TEMPERATURE: f64 = 0.7;
pub const CHECK_IN_TEMPERATURE: f64 = 0.7;

/// Adjusts a single planned session from category-tagged feedback.
pub struct FeedbackAgent {
    base: AgentBase,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustmentDocument {
    adjusted_session: Session,
    reason: String,
}

impl FeedbackAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<dyn Store>) -> Self {
        Self {
            base: AgentBase::new(llm, store, FEEDBACK_TEMPERATURE),
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
            base: AgentBase::new(llm, store, settings.feedback_temperature)
                .with_max_retries(settings.max_retries),
        }
    }

    /// Adjust a workout from feedback. Infallible by contract: any failure
    /// returns the original session with the reason carrying the error.
    pub async fn adjust_workout(
        &self,
        original_session: &Session,
        categories: &[FeedbackCategory],
        feedback_text: Option<&str>,
    ) -> (Session, String) {
        match self
            .try_adjust(original_session, categories, feedback_text)
            .await
        {
            Ok((session, reason)) => {
                tracing::info!(reason = %reason, "workout adjusted");
                (session, reason)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to adjust workout, returning original");
                (
                    original_session.clone(),
                    format!("Unable to adjust workout automatically: {}", e),
                )
            }
        }
    }

    async fn try_adjust(
        &self,
        session: &Session,
        categories: &[FeedbackCategory],
        feedback_text: Option<&str>,
    ) -> Result<(Session, String)> {
        let user_prompt = build_adjustment_prompt(session, categories, feedback_text);
        let system_prompt = "You are an expert powerlifting coach. A lifter has provided \
                             feedback about their upcoming workout.";

        let response = self
            .base
            .call_model(system_prompt, &user_prompt, &ResponseFormat::Json { schema: None })
            .await?;

        let doc: AdjustmentDocument = serde_json::from_str(&response)
            .map_err(|e| crate::types::AppError::Schema(format!("adjustment document: {}", e)))?;
        Ok((doc.adjusted_session, doc.reason))
    }
}

fn build_adjustment_prompt(
    session: &Session,
    categories: &[FeedbackCategory],
    feedback_text: Option<&str>,
) -> String {
    let categories_str = categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "**Current Workout:**\n\
         Focus: {}\n\
         Day: {}\n\n\
         Exercises:\n",
        session.focus, session.day_number
    );

    for (i, ex) in session.exercises.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {}: {}x{} @ RPE {} (rest: {}s)\n",
            i + 1,
            ex.name,
            ex.sets,
            ex.reps,
            ex.rpe_target,
            ex.rest_seconds
        ));
        if let Some(notes) = &ex.notes {
            prompt.push_str(&format!("   Notes: {}\n", notes));
        }
    }

    prompt.push_str(&format!("\n**Feedback Categories:** {}\n", categories_str));
    if let Some(text) = feedback_text {
        prompt.push_str(&format!("**Additional Feedback:** {}\n", text));
    }

    prompt.push_str(
        "\n**Your Task:**\n\
         Based on the feedback, adjust this workout to be appropriate while maintaining \
         training progress.\n\n\
         Guidelines:\n\
         - For INJURY: Modify or remove problematic exercises, reduce intensity\n\
         - For MUSCLE_FATIGUE/EXCESSIVE_SORENESS: Reduce volume or intensity\n\
         - For LOW_ENERGY: Reduce volume, maintain or reduce intensity\n\
         - For SCHEDULE_CONFLICT: Suggest time-efficient alternatives\n\
         - For FEELING_STRONG: Consider slight increases if appropriate\n\
         - For OTHER: Use the feedback text to make appropriate adjustments\n\n\
         Return a JSON object with the adjusted session (same structure as the input) \
         and a clear explanation of why you made these adjustments:\n\
         {\n\
         \x20 \"adjustedSession\": {\"dayNumber\": <number>, \"focus\": \"<string>\", \"exercises\": [...]},\n\
         \x20 \"reason\": \"<explanation of adjustments>\"\n\
         }\n",
    );

    prompt
}

/// Analyzes a training period and produces check-in insights.
pub struct CheckInAgent {
    base: AgentBase,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckInDocument {
    #[serde(default)]
    insights: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    program_adjustments_needed: bool,
}

impl CheckInAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<dyn Store>) -> Self {
        Self {
            base: AgentBase::new(llm, store, CHECK_IN_TEMPERATURE),
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
            base: AgentBase::new(llm, store, settings.feedback_temperature)
                .with_max_retries(settings.max_retries),
        }
    }

    /// Analyze progress for the period. Infallible by contract: on any
    /// failure the insight is derived from the submitted metrics instead.
    pub async fn analyze_progress(
        &self,
        check_in_type: &str,
        metrics: &CheckInMetrics,
        sessions: &[CompletedSession],
        current_program: &FullProgram,
    ) -> CheckInAnalysis {
        match self
            .try_analyze(check_in_type, metrics, sessions, current_program)
            .await
        {
            Ok(analysis) => {
                tracing::info!(
                    insights = analysis.insights.len(),
                    adjustments_needed = analysis.adjustments_needed,
                    "check-in analysis complete"
                );
                analysis
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to analyze progress, using fallback");
                CheckInAnalysis {
                    insights: vec![format!(
                        "Completed {} of {} sessions",
                        metrics.sessions_completed, metrics.sessions_planned
                    )],
                    recommendations: vec!["Continue with your current program".to_string()],
                    adjustments_needed: false,
                    adjusted_program: None,
                }
            }
        }
    }

    async fn try_analyze(
        &self,
        check_in_type: &str,
        metrics: &CheckInMetrics,
        sessions: &[CompletedSession],
        current_program: &FullProgram,
    ) -> Result<CheckInAnalysis> {
        let user_prompt = build_check_in_prompt(check_in_type, metrics, sessions, current_program);
        let system_prompt = format!(
            "You are an expert powerlifting coach performing a {} check-in with an athlete.",
            check_in_type
        );

        let response = self
            .base
            .call_model(&system_prompt, &user_prompt, &ResponseFormat::Json { schema: None })
            .await?;

        let doc: CheckInDocument = serde_json::from_str(&response)
            .map_err(|e| crate::types::AppError::Schema(format!("check-in document: {}", e)))?;

        // Program regeneration on adjustment is deferred to the programmer
        // agent; the flag alone is surfaced here.
        Ok(CheckInAnalysis {
            insights: doc.insights,
            recommendations: doc.recommendations,
            adjustments_needed: doc.program_adjustments_needed,
            adjusted_program: None,
        })
    }
}

fn build_check_in_prompt(
    check_in_type: &str,
    metrics: &CheckInMetrics,
    sessions: &[CompletedSession],
    current_program: &FullProgram,
) -> String {
    let mut prompt = format!(
        "**Check-in Metrics:**\n\
         - Sessions Completed: {}/{}\n\
         - Adherence Rate: {:.1}%\n",
        metrics.sessions_completed,
        metrics.sessions_planned,
        metrics.adherence_rate * 100.0
    );
    if let Some(rpe) = metrics.average_rpe {
        prompt.push_str(&format!("- Average RPE: {:.1}\n", rpe));
    }

    prompt.push_str(&format!(
        "\n**Completed Sessions This Period:** {}\n",
        sessions.len()
    ));
    if !sessions.is_empty() {
        prompt.push_str("\nSession Details:\n");
        // Most recent five only.
        for sess in sessions.iter().take(5) {
            prompt.push_str(&format!(
                "- Week {}, Day {}",
                sess.week_number, sess.day_number
            ));
            if let Some(completed_at) = &sess.completed_at {
                prompt.push_str(&format!(" (completed: {})", completed_at));
            }
            if let Some(feedback) = &sess.feedback {
                let categories: Vec<&str> =
                    feedback.categories.iter().map(|c| c.as_str()).collect();
                prompt.push_str(&format!("\n  Feedback: {:?}", categories));
                if let Some(text) = &feedback.feedback_text {
                    prompt.push_str(&format!(" - {}", text));
                }
            }
            prompt.push('\n');
        }
    }

    prompt.push_str(&format!(
        "\n**Current Program:**\n\
         Title: {}\n\
         Total Weeks: {}\n\n\
         **Your Task:**\n\
         Analyze this {} progress and provide:\n\n\
         1. **Insights** (2-4 bullet points): Key observations about performance, adherence, recovery\n\
         2. **Recommendations** (2-4 bullet points): Specific actionable advice for the upcoming period\n\
         3. **Program Adjustments Needed** (boolean): Whether major changes to the program are required\n\n\
         If major adjustments ARE needed:\n\
         - Provide specific reasoning\n\
         - Consider: low adherence (<60%), consistent fatigue/injury feedback, or dramatic performance changes\n\n\
         If NO major adjustments needed:\n\
         - Continue with current program\n\
         - Small tweaks can be handled through daily feedback\n\n\
         Return JSON format:\n\
         {{\n\
         \x20 \"insights\": [\"insight 1\", \"insight 2\"],\n\
         \x20 \"recommendations\": [\"rec 1\", \"rec 2\"],\n\
         \x20 \"programAdjustmentsNeeded\": true,\n\
         \x20 \"adjustmentReason\": \"explanation if adjustments needed (null otherwise)\"\n\
         }}\n",
        current_program.title,
        current_program.weeks.len(),
        check_in_type
    ));

    prompt
}
