//! Reference-data seeding: training methodologies and the exercise library.
//!
//! Runs once against an empty database. Methodology prompt templates carry
//! the coaching philosophy; programming rules and knowledge bases are
//! structured JSON the agents serialize into prompts.

use super::libsql::LibsqlStore;
use crate::types::{Complexity, Exercise, Methodology, Result};
use serde_json::json;

/// Seed methodologies and exercises if the store is empty.
pub async fn seed_if_empty(store: &LibsqlStore) -> Result<bool> {
    if !store.needs_seeding().await? {
        return Ok(false);
    }

    for methodology in methodologies() {
        store.insert_methodology(&methodology).await?;
    }
    for exercise in exercises() {
        store.insert_exercise(&exercise).await?;
    }

    tracing::info!("Seeded reference data: 3 methodologies, {} exercises", exercises().len());
    Ok(true)
}

fn methodologies() -> Vec<Methodology> {
    vec![
        Methodology {
            id: "linear_progression".to_string(),
            name: "Linear Progression".to_string(),
            description: "Classic beginner program with weekly weight increases".to_string(),
            category: "beginner".to_string(),
            prompt_template: "You are a Linear Progression coach for novice lifters.\n\n\
Your philosophy: simple, consistent progression builds the foundation for long-term strength.\n\n\
CORE PRINCIPLES:\n\
- Weekly weight increases (2.5-5lbs upper body, 5-10lbs lower body)\n\
- 3 training days per week, full body or A/B split\n\
- Compound movements only, focus on form and consistency\n\n\
Generate programs using ONLY exercises from the AVAILABLE EXERCISES list below.\n\
Ensure workouts fit within the athlete's preferred session length."
                .to_string(),
            programming_rules: json!({
                "frequency": "3x per week",
                "structure": "full_body or upper_lower",
                "progression": "weekly linear (2.5-5lbs)",
                "intensity": "75-85% 1RM",
                "volume": "3-5 sets of 5 reps",
                "deload": "when stalling 2-3 sessions"
            }),
            knowledge_base: json!({
                "quotes": [
                    "Master the basics before adding complexity",
                    "Consistency beats optimization for beginners"
                ],
                "weak_point_strategies": {
                    "squat": "Add pause squats for bottom position",
                    "bench": "Increase pressing frequency",
                    "deadlift": "Focus on setup and bracing"
                }
            }),
        },
        Methodology {
            id: "westside_conjugate".to_string(),
            name: "Westside Conjugate".to_string(),
            description: "Max effort and dynamic effort training for advanced lifters".to_string(),
            category: "advanced".to_string(),
            prompt_template: "You are a Westside Barbell coach training lifters with the Conjugate Method.\n\n\
Your philosophy: special exercises cure special weaknesses. Attack weak points aggressively.\n\n\
CORE PRINCIPLES:\n\
- Max Effort day: rotate main lift weekly, work up to 1-3RM\n\
- Dynamic Effort day: speed work with bands/chains (50-60% + accommodating resistance)\n\
- Repetition Method: high-volume accessories (8-15 reps) targeting weak points\n\
- 72-hour recovery between similar sessions\n\n\
Generate programs using ONLY exercises from the AVAILABLE EXERCISES list below.\n\
Select variations that target the athlete's specific weak points.\n\
Ensure workouts fit within the athlete's preferred session length."
                .to_string(),
            programming_rules: json!({
                "frequency": "4x per week (2 lower, 2 upper)",
                "max_effort_rotation": "weekly (never repeat same movement 2 weeks in a row)",
                "dynamic_effort": "8-12 sets x 1-3 reps at 50-60% + bands/chains",
                "accessories": "3-5 exercises, 3-4 sets, 8-15 reps",
                "intensity_distribution": "ME day: 90-100%, DE day: 50-60%"
            }),
            knowledge_base: json!({
                "quotes": [
                    "If you don't have a weakness, you're not training hard enough",
                    "Special exercises cure special weaknesses"
                ],
                "weak_point_strategies": {
                    "squat": "Box squats and good mornings for posterior chain",
                    "bench": "Board presses and floor presses for lockout",
                    "deadlift": "Deficit pulls for starting strength, rack pulls for lockout"
                }
            }),
        },
        Methodology {
            id: "daily_undulating".to_string(),
            name: "Daily Undulating Periodization (DUP)".to_string(),
            description: "High-frequency training varying intensity and volume day-to-day"
                .to_string(),
            category: "intermediate".to_string(),
            prompt_template: "You are a DUP coach programming high-frequency undulating training.\n\n\
Your philosophy: frequent practice with varied stimulus drives both skill and strength.\n\n\
CORE PRINCIPLES:\n\
- Each main lift trained 2-3x per week with different rep zones\n\
- Rotate hypertrophy (8-12), strength (4-6), and power (1-3) days\n\
- RPE-based load autoregulation (stay within target RPE)\n\
- Volume before intensity within each week\n\n\
Generate programs using ONLY exercises from the AVAILABLE EXERCISES list below.\n\
Ensure workouts fit within the athlete's preferred session length."
                .to_string(),
            programming_rules: json!({
                "frequency": "4-6x per week",
                "structure": "undulating rep zones per lift",
                "rep_zones": {"hypertrophy": "8-12", "strength": "4-6", "power": "1-3"},
                "autoregulation": "RPE 6-9 targets, adjust load to stay in range",
                "deload": "every 4th or 5th week, volume cut 40-50%"
            }),
            knowledge_base: json!({
                "quotes": [
                    "Frequency is a skill multiplier",
                    "Vary the stimulus, keep the movement"
                ],
                "weak_point_strategies": {
                    "squat": "Tempo squats on volume days",
                    "bench": "Close grip work on secondary days",
                    "deadlift": "Paused pulls at moderate intensity"
                }
            }),
        },
    ]
}

fn exercises() -> Vec<Exercise> {
    fn ex(
        id: &str,
        name: &str,
        category: &str,
        variation: &str,
        equipment: &[&str],
        weak_points: &[&str],
        pattern: &str,
        complexity: Complexity,
    ) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            variation_type: variation.to_string(),
            equipment: equipment.iter().map(|s| s.to_string()).collect(),
            targets_weak_points: weak_points.iter().map(|s| s.to_string()).collect(),
            movement_pattern: pattern.to_string(),
            complexity,
        }
    }

    vec![
        // Squat variations
        ex(
            "competition_squat",
            "Competition Squat",
            "squat",
            "competition",
            &["barbell", "rack"],
            &["overall"],
            "bilateral_squat",
            Complexity::Beginner,
        ),
        ex(
            "pause_squat",
            "Pause Squat",
            "squat",
            "pause",
            &["barbell", "rack"],
            &["hole", "positioning"],
            "bilateral_squat",
            Complexity::Intermediate,
        ),
        ex(
            "front_squat",
            "Front Squat",
            "squat",
            "front",
            &["barbell", "rack"],
            &["quad_strength", "positioning"],
            "bilateral_squat",
            Complexity::Intermediate,
        ),
        ex(
            "ssb_squat",
            "Safety Bar Squat",
            "squat",
            "specialty_bar",
            &["specialty_bars", "rack"],
            &["upper_back", "positioning"],
            "bilateral_squat",
            Complexity::Advanced,
        ),
        ex(
            "leg_press",
            "Leg Press",
            "squat",
            "machine",
            &["machines"],
            &["quad_strength"],
            "bilateral_squat",
            Complexity::Beginner,
        ),
        // Bench variations
        ex(
            "competition_bench",
            "Competition Bench Press",
            "bench",
            "competition",
            &["barbell", "bench", "rack"],
            &["overall"],
            "horizontal_press",
            Complexity::Beginner,
        ),
        ex(
            "close_grip_bench",
            "Close Grip Bench Press",
            "bench",
            "grip",
            &["barbell", "bench", "rack"],
            &["lockout", "triceps"],
            "horizontal_press",
            Complexity::Intermediate,
        ),
        ex(
            "dumbbell_bench",
            "Dumbbell Bench Press",
            "bench",
            "dumbbell",
            &["dumbbells", "bench"],
            &["stability", "chest"],
            "horizontal_press",
            Complexity::Beginner,
        ),
        ex(
            "bench_with_chains",
            "Bench Press Against Chains",
            "bench",
            "accommodating_resistance",
            &["barbell", "bench", "rack", "chains"],
            &["lockout", "explosiveness"],
            "horizontal_press",
            Complexity::Advanced,
        ),
        // Deadlift variations
        ex(
            "competition_deadlift",
            "Competition Deadlift",
            "deadlift",
            "competition",
            &["barbell"],
            &["overall"],
            "hip_hinge",
            Complexity::Beginner,
        ),
        ex(
            "deficit_deadlift",
            "Deficit Deadlift",
            "deadlift",
            "deficit",
            &["barbell"],
            &["off_the_floor", "positioning"],
            "hip_hinge",
            Complexity::Intermediate,
        ),
        ex(
            "romanian_deadlift",
            "Romanian Deadlift",
            "deadlift",
            "rdl",
            &["barbell"],
            &["hamstrings", "lockout"],
            "hip_hinge",
            Complexity::Beginner,
        ),
        ex(
            "banded_deadlift",
            "Deadlift Against Bands",
            "deadlift",
            "accommodating_resistance",
            &["barbell", "bands"],
            &["lockout", "explosiveness"],
            "hip_hinge",
            Complexity::Advanced,
        ),
        // Accessories
        ex(
            "cable_row",
            "Seated Cable Row",
            "accessory",
            "row",
            &["cable"],
            &["upper_back"],
            "horizontal_pull",
            Complexity::Beginner,
        ),
        ex(
            "barbell_row",
            "Barbell Row",
            "accessory",
            "row",
            &["barbell"],
            &["upper_back", "lats"],
            "horizontal_pull",
            Complexity::Intermediate,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::Store;
    use crate::types::Complexity;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = LibsqlStore::new_memory().await.unwrap();
        assert!(seed_if_empty(&store).await.unwrap());
        assert!(!seed_if_empty(&store).await.unwrap());

        let all = store
            .list_exercises(&[
                Complexity::Beginner,
                Complexity::Intermediate,
                Complexity::Advanced,
            ])
            .await
            .unwrap();
        assert_eq!(all.len(), exercises().len());
    }

    #[test]
    fn every_complexity_tier_is_represented() {
        let all = exercises();
        for tier in [
            Complexity::Beginner,
            Complexity::Intermediate,
            Complexity::Advanced,
        ] {
            assert!(
                all.iter().any(|e| e.complexity == tier),
                "no exercise with complexity {:?}",
                tier
            );
        }
    }
}
