//! Powerlifting math: RPE-based load estimation and DOTS scoring.

use crate::types::{Sex, Unit};

const LBS_TO_KG: f64 = 0.453592;
const KG_TO_LBS: f64 = 2.20462;

/// The three competition lifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainLift {
    Squat,
    Bench,
    Deadlift,
}

/// Tuscherer's RTS scale: percentage of 1RM indexed by RPE row and rep count.
/// Rows run RPE 10.0 down to 6.0 in half-point steps; columns are reps 1..=10.
const RPE_CHART: [[f64; 10]; 9] = [
    [100.0, 95.5, 92.2, 89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 74.0],
    [97.8, 93.9, 90.7, 87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.9],
    [95.5, 92.2, 89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 74.0, 71.8],
    [93.9, 90.7, 87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.9, 70.7],
    [92.2, 89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 74.0, 71.8, 69.7],
    [90.7, 87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.9, 70.7, 68.6],
    [89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 74.0, 71.8, 69.7, 67.6],
    [87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.9, 70.7, 68.6, 66.6],
    [86.3, 83.7, 81.1, 78.6, 76.2, 74.0, 71.8, 69.7, 67.6, 65.6],
];

/// Percentage of 1RM for the given reps and RPE. Inputs are clamped to the
/// chart's domain (reps 1..=10, RPE 6.0..=10.0, RPE rounded to nearest 0.5).
fn chart_percentage(reps: u32, rpe: f64) -> f64 {
    let reps = reps.clamp(1, 10);
    let rpe = rpe.clamp(6.0, 10.0);
    let rounded_rpe = (rpe * 2.0).round() / 2.0;

    // RPE 10.0 is row 0; each half point down is one row.
    let row = ((10.0 - rounded_rpe) * 2.0).round() as usize;
    let col = (reps - 1) as usize;
    RPE_CHART[row][col]
}

/// Estimated 1RM from a performed set. Same unit as the input weight.
pub fn calculate_one_rep_max(weight: f64, reps: u32, rpe: f64) -> f64 {
    let percentage = chart_percentage(reps, rpe);
    ((weight / percentage) * 100.0).round()
}

/// Working weight to prescribe for a target reps-at-RPE. Same unit as the 1RM.
pub fn calculate_working_weight(one_rep_max: f64, reps: u32, rpe: f64) -> f64 {
    let percentage = chart_percentage(reps, rpe);
    ((one_rep_max * percentage) / 100.0).round()
}

struct DotsCoefficients {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
}

const DOTS_MALE: DotsCoefficients = DotsCoefficients {
    a: -0.0000010930,
    b: 0.0007391293,
    c: -0.1918759221,
    d: 24.0900756,
    e: -307.75076,
};

const DOTS_FEMALE: DotsCoefficients = DotsCoefficients {
    a: -0.0000010706,
    b: 0.0005158568,
    c: -0.1126655495,
    d: 13.6175032,
    e: -57.96288,
};

/// DOTS score (IPF formula), comparing relative strength across bodyweights.
///
/// `DOTS = (total / (A·x⁴ + B·x³ + C·x² + D·x + E)) * 500` with `x` the
/// bodyweight in kg. Rounded to two decimal places.
pub fn calculate_dots(bodyweight: f64, total: f64, sex: Sex, unit: Unit) -> f64 {
    let (bw_kg, total_kg) = match unit {
        Unit::Kg => (bodyweight, total),
        Unit::Lbs => (bodyweight * LBS_TO_KG, total * LBS_TO_KG),
    };

    let coeff = match sex {
        Sex::Male => &DOTS_MALE,
        Sex::Female => &DOTS_FEMALE,
    };

    let denominator = coeff.a * bw_kg.powi(4)
        + coeff.b * bw_kg.powi(3)
        + coeff.c * bw_kg.powi(2)
        + coeff.d * bw_kg
        + coeff.e;

    if denominator.abs() < 1e-10 {
        return 0.0;
    }

    ((total_kg / denominator) * 500.0 * 100.0).round() / 100.0
}

const SQUAT_KEYWORDS: &[&str] = &[
    "squat", "front squat", "box squat", "pause squat", "tempo squat", "pin squat", "safety bar",
    "ssb",
];
const BENCH_KEYWORDS: &[&str] = &[
    "bench", "close grip", "wide grip", "pause bench", "spoto", "floor press",
];
const DEADLIFT_KEYWORDS: &[&str] = &[
    "deadlift", "dead lift", "deficit pull", "block pull", "rack pull", "romanian", "rdl",
    "stiff leg", "sumo",
];

/// Match an exercise name to its main lift, handling variations like
/// "Pause Squat" or "Close Grip Bench Press". `None` for accessories.
pub fn match_exercise_to_lift(exercise_name: &str) -> Option<MainLift> {
    let name = exercise_name.to_lowercase();

    if SQUAT_KEYWORDS.iter().any(|k| name.contains(k)) {
        return Some(MainLift::Squat);
    }
    if BENCH_KEYWORDS.iter().any(|k| name.contains(k)) {
        return Some(MainLift::Bench);
    }
    if DEADLIFT_KEYWORDS.iter().any(|k| name.contains(k)) {
        return Some(MainLift::Deadlift);
    }
    None
}

/// Readiness adjustment suggested by the pre-workout check score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessAdjustment {
    /// Score below 0.5: cut volume 30-40% or switch to a recovery session.
    ReduceVolume,
    /// Score in [0.5, 0.7): back RPE off by one point or drop 1-2 sets.
    ReduceIntensity,
    /// Score at or above 0.7: train as planned.
    Proceed,
}

/// Overall readiness from pre-workout metrics, normalized to 0..=1.
///
/// All inputs are on a 1-5 scale. Sleep quality and freshness score
/// directly; stress is inverted (a calm athlete scores high). Weighted
/// sleep 0.4, stress 0.3, soreness 0.3, rounded to two decimal places.
pub fn calculate_readiness(sleep_quality: u8, stress_level: u8, soreness_fatigue: u8) -> f64 {
    let score = (f64::from(sleep_quality) / 5.0) * 0.4
        + ((6.0 - f64::from(stress_level)) / 5.0) * 0.3
        + (f64::from(soreness_fatigue) / 5.0) * 0.3;
    (score * 100.0).round() / 100.0
}

/// Map a readiness score onto the adjustment thresholds.
pub fn readiness_adjustment(score: f64) -> ReadinessAdjustment {
    if score < 0.5 {
        ReadinessAdjustment::ReduceVolume
    } else if score < 0.7 {
        ReadinessAdjustment::ReduceIntensity
    } else {
        ReadinessAdjustment::Proceed
    }
}

/// Convert between kg and lbs, rounded to one decimal place.
pub fn convert_weight(weight: f64, from_unit: Unit, to_unit: Unit) -> f64 {
    match (from_unit, to_unit) {
        (Unit::Kg, Unit::Lbs) => (weight * KG_TO_LBS * 10.0).round() / 10.0,
        (Unit::Lbs, Unit::Kg) => (weight * LBS_TO_KG * 10.0).round() / 10.0,
        _ => weight,
    }
}
