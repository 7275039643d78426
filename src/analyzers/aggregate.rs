//! Single-pass accumulation over sign-in rows.
//!
//! [`count_attendance`] tallies every name in every row. [`accumulate_weighted`]
//! only looks at classified rows and records weighted scores by category and
//! by month.

use crate::analyzers::types::AttendanceRow;
use crate::classify::{Classification, Classifier, extract_month, month_rank};
use crate::config::WeightConfig;
use crate::names::extract_names;
use std::collections::HashMap;
use tracing::debug;

/// Column header fragments marking a leadership role.
pub static LEADERSHIP_KEYWORDS: &[&str] = &["MD", "Band Leader", "Vocal Leader"];

/// Per-name accumulator that remembers first-appearance order.
#[derive(Debug, Clone)]
pub struct Ledger<T> {
    order: Vec<String>,
    entries: HashMap<String, T>,
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T: Default> Ledger<T> {
    pub fn entry(&mut self, name: &str) -> &mut T {
        if !self.entries.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.entries.entry(name.to_string()).or_default()
    }
}

impl<T> Ledger<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|entry| (name.as_str(), entry)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthTally {
    pub count: u64,
    pub weighted: f64,
}

/// Weighted activity of one person across classified rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonTally {
    pub per_category: HashMap<String, f64>,
    pub per_month: HashMap<String, MonthTally>,
}

/// Result of the weighted pass.
#[derive(Debug, Clone, Default)]
pub struct WeightedTally {
    pub people: Ledger<PersonTally>,
    /// Categories seen in the batch, in first-seen order.
    pub categories: Vec<String>,
    /// Months seen in the batch, in calendar order with unknown last.
    pub months: Vec<String>,
    pub unclassified_rows: usize,
}

/// Whether a column header names a leadership role.
pub fn is_leadership_column(column: &str) -> bool {
    LEADERSHIP_KEYWORDS
        .iter()
        .any(|keyword| column.contains(keyword))
}

/// Counts every extracted name in every role cell, classified or not.
pub fn count_attendance(rows: &[AttendanceRow]) -> Ledger<u64> {
    let mut totals = Ledger::default();

    for row in rows {
        for (_, cell) in &row.role_cells {
            for name in extract_names(cell.as_deref()) {
                *totals.entry(&name) += 1;
            }
        }
    }

    totals
}

/// Accumulates base and bonus weighted scores for classified rows.
pub fn accumulate_weighted(
    rows: &[AttendanceRow],
    classifier: &Classifier,
    config: &WeightConfig,
) -> WeightedTally {
    let bonus = config.bonus_multiplier();
    let mut tally = WeightedTally::default();

    for row in rows {
        let category = match classifier.classify(&row.gathering_name) {
            Classification::Category(category) => category,
            Classification::Unclassified => {
                debug!(gathering = %row.gathering_name, "Skipping unclassified gathering");
                tally.unclassified_rows += 1;
                continue;
            }
        };

        let month = extract_month(&row.source_label);
        let base_weight = config.category_weight(category);

        for (column, cell) in &row.role_cells {
            let role_multiplier = if is_leadership_column(column) {
                bonus
            } else {
                1.0
            };
            let final_weight = base_weight * role_multiplier;

            for name in extract_names(cell.as_deref()) {
                let person = tally.people.entry(&name);
                *person.per_category.entry(category.to_string()).or_default() += final_weight;

                let month_tally = person.per_month.entry(month.to_string()).or_default();
                month_tally.count += 1;
                month_tally.weighted += final_weight;

                if !tally.categories.iter().any(|c| c == category) {
                    tally.categories.push(category.to_string());
                }
                if !tally.months.iter().any(|m| m == month) {
                    tally.months.push(month.to_string());
                }
            }
        }
    }

    tally.months.sort_by_key(|m| month_rank(m));
    tally
}
