//! Gathering classification and month inference.
//!
//! A [`Classifier`] holds an ordered list of [`CategoryRule`]s. The first rule
//! with a keyword occurring in the gathering name decides the category.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Month tokens in calendar order. Scanned in this order, first hit wins.
pub static MONTH_TOKENS: &[&str] = &[
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

/// Label used when a source label carries no month token.
pub const UNKNOWN_MONTH: &str = "未知";

/// Built-in category table used when no table is configured.
static DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("禱告會", &["禱告會"]),
    ("主日崇拜", &["三民早堂", "美河堂"]),
    ("青年主日", &["青年主日"]),
    ("QQ堂", &["QQ", "大Q"]),
    ("英文崇拜", &["英文崇拜"]),
    ("早上飽", &["早上飽"]),
];

/// One named category and the substrings that select it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, gathering_name: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| gathering_name.contains(keyword.as_str()))
    }
}

/// Outcome of classifying one gathering name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    Category(&'a str),
    Unclassified,
}

impl<'a> Classification<'a> {
    pub fn category(self) -> Option<&'a str> {
        match self {
            Classification::Category(name) => Some(name),
            Classification::Unclassified => None,
        }
    }
}

/// Ordered, first-match-wins category table.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_RULES
                .iter()
                .map(|(name, keywords)| CategoryRule::new(*name, keywords))
                .collect(),
        )
    }
}

impl Classifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Loads a rule table from a JSON array of `{ "name", "keywords" }` objects.
    ///
    /// ```json
    /// [
    ///   { "name": "禱告會", "keywords": ["禱告會"] },
    ///   { "name": "QQ堂", "keywords": ["QQ", "大Q"] }
    /// ]
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category table at {}", path.display()))?;
        let rules: Vec<CategoryRule> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse category table in {}", path.display()))?;
        debug!(path = %path.display(), rules = rules.len(), "Category table loaded");
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Returns the first category whose keywords occur in `gathering_name`.
    pub fn classify(&self, gathering_name: &str) -> Classification<'_> {
        self.rules
            .iter()
            .find(|rule| rule.matches(gathering_name))
            .map_or(Classification::Unclassified, |rule| {
                Classification::Category(rule.name.as_str())
            })
    }
}

/// Infers the month of an occurrence from its source label.
///
/// Tokens are tested in calendar order, so a label containing `11月` also
/// contains `1月` and resolves to `1月`.
pub fn extract_month(source_label: &str) -> &'static str {
    MONTH_TOKENS
        .iter()
        .copied()
        .find(|token| source_label.contains(token))
        .unwrap_or(UNKNOWN_MONTH)
}

/// Calendar position of a month label; unknown and foreign labels sort last.
///
/// Months are ordered by calendar on purpose rather than as strings, which
/// would put `10月` ahead of `2月`.
pub fn month_rank(month: &str) -> usize {
    MONTH_TOKENS
        .iter()
        .position(|token| *token == month)
        .unwrap_or(MONTH_TOKENS.len())
}
