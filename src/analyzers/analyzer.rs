use crate::analyzers::aggregate::{accumulate_weighted, count_attendance};
use crate::analyzers::breakdown::{monthly_breakdown, source_breakdown};
use crate::analyzers::cohort;
use crate::analyzers::types::{AttendanceRow, PersonTotal, StatisticsReport, Thresholds};
use crate::classify::Classifier;
use crate::config::WeightConfig;
use tracing::{debug, warn};

/// Computes every attendance table for one batch of rows.
///
/// Pure: the same rows, table and weights always give the same report.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn compute_statistics(
    rows: &[AttendanceRow],
    classifier: &Classifier,
    config: &WeightConfig,
) -> StatisticsReport {
    let totals = count_attendance(rows);
    let tally = accumulate_weighted(rows, classifier, config);

    debug!(
        people = totals.len(),
        scored_people = tally.people.len(),
        unclassified_rows = tally.unclassified_rows,
        "Rows accumulated"
    );
    if tally.people.is_empty() && !rows.is_empty() {
        warn!(rows = rows.len(), "No gathering matched a category, every score is empty");
    }

    let source_breakdown = source_breakdown(&tally, config);
    let monthly_breakdown = monthly_breakdown(&tally);

    // left join: people seen only in unclassified rows keep no score
    let people_totals: Vec<PersonTotal> = totals
        .iter()
        .map(|(name, count)| PersonTotal {
            name: name.to_string(),
            total_count: *count,
            weighted_total: source_breakdown.person(name).map(|row| row.weighted_total),
        })
        .collect();

    let thresholds = Thresholds::from_people(&people_totals);
    debug!(
        median_count = ?thresholds.median_count,
        weighted_p90 = ?thresholds.weighted_p90,
        "Cohort thresholds"
    );

    StatisticsReport {
        thresholds,
        potential: cohort::potential(&people_totals, &thresholds),
        heavy: cohort::heavy(&people_totals, &thresholds),
        people_totals,
        source_breakdown,
        monthly_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::CategoryRule;

    #[test]
    fn test_empty_batch() {
        let report = compute_statistics(&[], &Classifier::default(), &WeightConfig::default());
        assert_eq!(report, StatisticsReport::default());
    }

    #[test]
    fn test_unclassified_person_has_no_score() {
        let rows = vec![
            AttendanceRow::new("禱告會", "1月").with_cell("Vocal", Some("Ann")),
            AttendanceRow::new("小組", "1月").with_cell("Vocal", Some("Ann/Ben")),
        ];
        let report = compute_statistics(&rows, &Classifier::default(), &WeightConfig::default());

        let ann = report.person("Ann").unwrap();
        assert_eq!(ann.total_count, 2);
        assert_eq!(ann.weighted_total, Some(1.0));

        let ben = report.person("Ben").unwrap();
        assert_eq!(ben.total_count, 1);
        assert_eq!(ben.weighted_total, None);
        assert!(report.source_breakdown.person("Ben").is_none());
        assert!(report.monthly_breakdown.person("Ben").is_none());
    }

    #[test]
    fn test_all_unclassified_batch_still_counts() {
        let rows = vec![AttendanceRow::new("小組", "1月").with_cell("Vocal", Some("Ona/Pat"))];
        let report = compute_statistics(&rows, &Classifier::default(), &WeightConfig::default());

        assert_eq!(report.people_totals.len(), 2);
        assert!(report.source_breakdown.rows.is_empty());
        assert!(report.monthly_breakdown.rows.is_empty());
        assert_eq!(report.thresholds.weighted_p90, None);
    }

    #[test]
    fn test_heavy_includes_frequent_attendees() {
        let mut rows = Vec::new();
        for _ in 0..16 {
            rows.push(AttendanceRow::new("小組", "4月").with_cell("Vocal", Some("Kim")));
        }
        rows.push(AttendanceRow::new("禱告會", "4月").with_cell("Vocal", Some("Lee")));

        let report = compute_statistics(&rows, &Classifier::default(), &WeightConfig::default());
        assert!(report.heavy.iter().any(|p| p.name == "Kim"));
    }

    #[test]
    fn test_potential_respects_median() {
        let classifier = Classifier::new(vec![CategoryRule::new("禱告會", &["禱告會"])]);
        let mut rows = Vec::new();
        for (name, times) in [("a", 1), ("b", 2), ("c", 2), ("d", 5), ("e", 6)] {
            for _ in 0..times {
                rows.push(AttendanceRow::new("禱告會", "5月").with_cell("Vocal", Some(name)));
            }
        }

        let report = compute_statistics(&rows, &classifier, &WeightConfig::default());
        assert_eq!(report.thresholds.median_count, Some(2.0));
        let names: Vec<&str> = report.potential.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        for person in &report.potential {
            assert!(person.total_count >= 2);
            assert!(person.total_count as f64 <= 2.0);
        }
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![
            AttendanceRow::new("三民早堂", "6月")
                .with_cell("MD", Some("Max"))
                .with_cell("Vocal", Some("Max/Ned/暫停")),
            AttendanceRow::new("早上飽", "7月").with_cell("Vocal Leader", Some("Ned")),
        ];
        let config = WeightConfig::from_pairs([("早上飽", 0.7), ("MD/BL/VL 加權倍數", 1.2)]);
        let classifier = Classifier::default();

        let first = compute_statistics(&rows, &classifier, &config);
        let second = compute_statistics(&rows, &classifier, &config);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
