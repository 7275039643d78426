//! Data types used by the attendance pipeline.

use serde::Serialize;

/// One gathering occurrence read from a sign-in sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRow {
    pub gathering_name: String,
    pub source_label: String,
    /// Every other column in sheet order; `None` for an empty cell.
    pub role_cells: Vec<(String, Option<String>)>,
}

impl AttendanceRow {
    pub fn new(gathering_name: impl Into<String>, source_label: impl Into<String>) -> Self {
        Self {
            gathering_name: gathering_name.into(),
            source_label: source_label.into(),
            role_cells: Vec::new(),
        }
    }

    /// Adds a role cell; builder style for tests and loaders.
    pub fn with_cell(mut self, column: impl Into<String>, value: Option<&str>) -> Self {
        self.role_cells
            .push((column.into(), value.map(str::to_string)));
        self
    }
}

/// Flat per-person totals joined with the weighted score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonTotal {
    pub name: String,
    pub total_count: u64,
    /// `None` when the person only appears in unclassified gatherings.
    pub weighted_total: Option<f64>,
}

/// Per-category scores for one person, aligned with [`SourceBreakdown::categories`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScores {
    pub name: String,
    pub raw: Vec<f64>,
    pub weighted: Vec<f64>,
    pub weighted_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceBreakdown {
    pub categories: Vec<String>,
    pub rows: Vec<CategoryScores>,
}

impl SourceBreakdown {
    pub fn person(&self, name: &str) -> Option<&CategoryScores> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Raw score of `name` in `category`, if both are present.
    pub fn raw(&self, name: &str, category: &str) -> Option<f64> {
        let column = self.categories.iter().position(|c| c == category)?;
        self.person(name).map(|row| row.raw[column])
    }

    pub fn weighted(&self, name: &str, category: &str) -> Option<f64> {
        let column = self.categories.iter().position(|c| c == category)?;
        self.person(name).map(|row| row.weighted[column])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthCell {
    pub count: u64,
    pub weighted: f64,
}

/// Per-month activity for one person, aligned with [`MonthlyBreakdown::months`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub name: String,
    pub months: Vec<MonthCell>,
    pub total_count: u64,
    pub total_weighted: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub months: Vec<String>,
    pub rows: Vec<MonthlyRow>,
}

impl MonthlyBreakdown {
    pub fn person(&self, name: &str) -> Option<&MonthlyRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn cell(&self, name: &str, month: &str) -> Option<MonthCell> {
        let column = self.months.iter().position(|m| m == month)?;
        self.person(name).map(|row| row.months[column])
    }
}

/// Cohort cut-offs computed from the current batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Thresholds {
    pub median_count: Option<f64>,
    pub weighted_p90: Option<f64>,
}

/// Everything produced from one batch of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub thresholds: Thresholds,
    pub people_totals: Vec<PersonTotal>,
    pub potential: Vec<PersonTotal>,
    pub heavy: Vec<PersonTotal>,
    pub source_breakdown: SourceBreakdown,
    pub monthly_breakdown: MonthlyBreakdown,
}

impl StatisticsReport {
    pub fn person(&self, name: &str) -> Option<&PersonTotal> {
        self.people_totals.iter().find(|p| p.name == name)
    }
}
