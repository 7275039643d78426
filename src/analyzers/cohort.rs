//! Cohort selection over per-person totals.
//!
//! | Cohort    | Rule                                                  |
//! |-----------|-------------------------------------------------------|
//! | potential | `2 <= total_count <= median(total_count)`             |
//! | heavy     | `weighted_total > p90(weighted_total)` or `count > 15` |

use crate::analyzers::types::{PersonTotal, Thresholds};
use crate::analyzers::utility::{median, quantile};

/// Smallest attendance count considered for the potential cohort.
pub const POTENTIAL_MIN_COUNT: u64 = 2;

/// Attendance count above which a person is always heavy.
pub const HEAVY_COUNT_LIMIT: u64 = 15;

/// Quantile of the weighted score marking the heavy cohort.
pub const HEAVY_QUANTILE: f64 = 0.9;

impl Thresholds {
    /// Median count over everyone, p90 over people that have a weighted score.
    pub fn from_people(people: &[PersonTotal]) -> Self {
        let counts: Vec<f64> = people.iter().map(|p| p.total_count as f64).collect();
        let scores: Vec<f64> = people.iter().filter_map(|p| p.weighted_total).collect();

        Self {
            median_count: median(&counts),
            weighted_p90: quantile(&scores, HEAVY_QUANTILE),
        }
    }
}

pub fn potential(people: &[PersonTotal], thresholds: &Thresholds) -> Vec<PersonTotal> {
    let Some(median) = thresholds.median_count else {
        return Vec::new();
    };

    people
        .iter()
        .filter(|p| p.total_count >= POTENTIAL_MIN_COUNT && p.total_count as f64 <= median)
        .cloned()
        .collect()
}

pub fn heavy(people: &[PersonTotal], thresholds: &Thresholds) -> Vec<PersonTotal> {
    people
        .iter()
        .filter(|p| {
            let above_p90 = match (p.weighted_total, thresholds.weighted_p90) {
                (Some(score), Some(p90)) => score > p90,
                _ => false,
            };
            above_p90 || p.total_count > HEAVY_COUNT_LIMIT
        })
        .cloned()
        .collect()
}
