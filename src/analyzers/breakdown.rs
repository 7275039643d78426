//! Per-category and per-month tables derived from the weighted pass.

use crate::analyzers::aggregate::WeightedTally;
use crate::analyzers::types::{
    CategoryScores, MonthCell, MonthlyBreakdown, MonthlyRow, SourceBreakdown,
};
use crate::analyzers::utility::round2;
use crate::config::WeightConfig;

/// Builds raw and column-weighted category scores for every person with
/// classified activity.
///
/// A configured weight whose key equals a category name scales that
/// category's column on top of the base weight already applied while
/// accumulating.
pub fn source_breakdown(tally: &WeightedTally, config: &WeightConfig) -> SourceBreakdown {
    let column_weights: Vec<Option<f64>> = tally
        .categories
        .iter()
        .map(|category| config.column_weight(category))
        .collect();

    let rows = tally
        .people
        .iter()
        .map(|(name, person)| {
            let raw: Vec<f64> = tally
                .categories
                .iter()
                .map(|category| person.per_category.get(category).copied().unwrap_or(0.0))
                .collect();

            let weighted: Vec<f64> = raw
                .iter()
                .zip(&column_weights)
                .map(|(value, weight)| round2(value * weight.unwrap_or(1.0)))
                .collect();

            CategoryScores {
                name: name.to_string(),
                weighted_total: weighted.iter().sum(),
                raw,
                weighted,
            }
        })
        .collect();

    SourceBreakdown {
        categories: tally.categories.clone(),
        rows,
    }
}

/// Builds one count/weighted pair per observed month for every person with
/// classified activity, zero-filled where the person was absent.
pub fn monthly_breakdown(tally: &WeightedTally) -> MonthlyBreakdown {
    let rows = tally
        .people
        .iter()
        .map(|(name, person)| {
            let mut total_count = 0;
            let mut total_weighted = 0.0;

            let months = tally
                .months
                .iter()
                .map(|month| {
                    let entry = person.per_month.get(month).copied().unwrap_or_default();
                    total_count += entry.count;
                    total_weighted += entry.weighted;
                    MonthCell {
                        count: entry.count,
                        weighted: round2(entry.weighted),
                    }
                })
                .collect();

            MonthlyRow {
                name: name.to_string(),
                months,
                total_count,
                total_weighted: round2(total_weighted),
            }
        })
        .collect();

    MonthlyBreakdown {
        months: tally.months.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::accumulate_weighted;
    use crate::analyzers::types::AttendanceRow;
    use crate::classify::Classifier;

    fn sample_rows() -> Vec<AttendanceRow> {
        vec![
            AttendanceRow::new("週三禱告會", "2024-1月").with_cell("Vocal", Some("Alice/Bob")),
            AttendanceRow::new("美河堂", "2024-1月").with_cell("MD", Some("Alice")),
            AttendanceRow::new("英文崇拜", "2024-3月").with_cell("Vocal", Some("Alice")),
        ]
    }

    #[test]
    fn test_source_breakdown_raw_and_weighted() {
        let config = WeightConfig::from_pairs([("禱告會", 2.0), ("MD/BL/VL 加權倍數", 1.5)]);
        let tally = accumulate_weighted(&sample_rows(), &Classifier::default(), &config);
        let breakdown = source_breakdown(&tally, &config);

        assert_eq!(breakdown.categories, vec!["禱告會", "主日崇拜", "英文崇拜"]);
        // base weight 2.0, then scaled again by the matching column weight
        assert_eq!(breakdown.raw("Alice", "禱告會"), Some(2.0));
        assert_eq!(breakdown.weighted("Alice", "禱告會"), Some(4.0));
        // no column weight for 主日崇拜: identity
        assert_eq!(breakdown.raw("Alice", "主日崇拜"), Some(1.5));
        assert_eq!(breakdown.weighted("Alice", "主日崇拜"), Some(1.5));

        let alice = breakdown.person("Alice").unwrap();
        assert_eq!(alice.weighted_total, 4.0 + 1.5 + 1.0);

        let bob = breakdown.person("Bob").unwrap();
        assert_eq!(bob.raw, vec![2.0, 0.0, 0.0]);
        assert_eq!(bob.weighted_total, 4.0);
    }

    #[test]
    fn test_weighted_values_are_rounded() {
        let config = WeightConfig::from_pairs([("禱告會", 1.0 / 3.0)]);
        let rows = vec![AttendanceRow::new("禱告會", "1月").with_cell("Vocal", Some("Cy"))];
        let tally = accumulate_weighted(&rows, &Classifier::default(), &config);
        let breakdown = source_breakdown(&tally, &config);

        assert_eq!(breakdown.raw("Cy", "禱告會"), Some(1.0 / 3.0));
        assert_eq!(breakdown.weighted("Cy", "禱告會"), Some(0.11));
    }

    #[test]
    fn test_monthly_breakdown_zero_fills() {
        let tally = accumulate_weighted(
            &sample_rows(),
            &Classifier::default(),
            &WeightConfig::default(),
        );
        let monthly = monthly_breakdown(&tally);

        assert_eq!(monthly.months, vec!["1月", "3月"]);
        assert_eq!(
            monthly.cell("Bob", "3月"),
            Some(MonthCell {
                count: 0,
                weighted: 0.0
            })
        );
        assert_eq!(
            monthly.cell("Alice", "1月"),
            Some(MonthCell {
                count: 2,
                weighted: 2.0
            })
        );
    }

    #[test]
    fn test_monthly_totals_match_cells() {
        let config = WeightConfig::from_pairs([("英文崇拜", 0.333), ("MD/BL/VL 加權倍數", 2.0)]);
        let tally = accumulate_weighted(&sample_rows(), &Classifier::default(), &config);
        let monthly = monthly_breakdown(&tally);

        for row in &monthly.rows {
            let count: u64 = row.months.iter().map(|m| m.count).sum();
            assert_eq!(row.total_count, count);

            let person = tally.people.get(&row.name).unwrap();
            let weighted: f64 = person.per_month.values().map(|m| m.weighted).sum();
            assert_eq!(row.total_weighted, round2(weighted));
        }

        // 0.333 per 英文崇拜 attendance, shown at two decimals
        assert_eq!(monthly.cell("Alice", "3月").map(|c| c.weighted), Some(0.33));
    }
}
