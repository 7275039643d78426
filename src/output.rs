//! Output formatting and persistence for attendance reports.
//!
//! Supports a logged summary, a JSON report document, and one CSV file per
//! table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{MonthlyBreakdown, PersonTotal, SourceBreakdown, StatisticsReport};

pub const NAME_HEADER: &str = "姓名";
pub const COUNT_HEADER: &str = "總次數";
pub const SCORE_HEADER: &str = "加權分數";
pub const WEIGHTED_TOTAL_HEADER: &str = "加權總分";
pub const RAW_SUFFIX: &str = "_原始";
pub const WEIGHTED_SUFFIX: &str = "_加權";
pub const MONTH_COUNT_SUFFIX: &str = "_次數";
pub const MONTH_WEIGHTED_TOTAL_HEADER: &str = "總加權";

pub const PEOPLE_TOTALS_FILE: &str = "people_totals.csv";
pub const POTENTIAL_FILE: &str = "potential.csv";
pub const HEAVY_FILE: &str = "heavy.csv";
pub const SOURCE_BREAKDOWN_FILE: &str = "source_breakdown.csv";
pub const MONTHLY_BREAKDOWN_FILE: &str = "monthly_breakdown.csv";
pub const REPORT_FILE: &str = "report.json";

/// Report wrapped with its generation time, as written to `report.json`.
#[derive(Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: &'a StatisticsReport,
}

/// Logs cohort sizes and thresholds.
pub fn log_summary(report: &StatisticsReport) {
    info!(
        people = report.people_totals.len(),
        scored = report.source_breakdown.rows.len(),
        potential = report.potential.len(),
        heavy = report.heavy.len(),
        median_count = ?report.thresholds.median_count,
        weighted_p90 = ?report.thresholds.weighted_p90,
        months = ?report.monthly_breakdown.months,
        "Attendance summary"
    );
}

/// Serializes the report with a generation timestamp as pretty JSON.
pub fn to_json(report: &StatisticsReport) -> Result<String> {
    let document = ReportDocument {
        generated_at: Utc::now(),
        report,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn write_json_report(path: &Path, report: &StatisticsReport) -> Result<()> {
    let json = to_json(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    debug!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Writes the five tables into `dir`, creating it if needed.
///
/// Returns the written paths in table order.
pub fn write_csv_tables(dir: &Path, report: &StatisticsReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let people_path = dir.join(PEOPLE_TOTALS_FILE);
    write_people(&people_path, &report.people_totals)?;

    let potential_path = dir.join(POTENTIAL_FILE);
    write_people(&potential_path, &report.potential)?;

    let heavy_path = dir.join(HEAVY_FILE);
    write_people(&heavy_path, &report.heavy)?;

    let source_path = dir.join(SOURCE_BREAKDOWN_FILE);
    write_source_breakdown(&source_path, &report.source_breakdown)?;

    let monthly_path = dir.join(MONTHLY_BREAKDOWN_FILE);
    write_monthly_breakdown(&monthly_path, &report.monthly_breakdown)?;

    info!(dir = %dir.display(), "CSV tables written");
    Ok(vec![
        people_path,
        potential_path,
        heavy_path,
        source_path,
        monthly_path,
    ])
}

fn create_writer(path: &Path) -> Result<Writer<std::fs::File>> {
    Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn write_people(path: &Path, people: &[PersonTotal]) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record([NAME_HEADER, COUNT_HEADER, SCORE_HEADER])?;

    for person in people {
        writer.write_record([
            person.name.clone(),
            person.total_count.to_string(),
            person
                .weighted_total
                .map(|score| score.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_source_breakdown(path: &Path, breakdown: &SourceBreakdown) -> Result<()> {
    let mut writer = create_writer(path)?;

    let mut header = vec![NAME_HEADER.to_string()];
    header.extend(breakdown.categories.iter().map(|c| format!("{c}{RAW_SUFFIX}")));
    header.extend(
        breakdown
            .categories
            .iter()
            .map(|c| format!("{c}{WEIGHTED_SUFFIX}")),
    );
    header.push(WEIGHTED_TOTAL_HEADER.to_string());
    writer.write_record(&header)?;

    for row in &breakdown.rows {
        let mut record = vec![row.name.clone()];
        record.extend(row.raw.iter().map(f64::to_string));
        record.extend(row.weighted.iter().map(f64::to_string));
        record.push(row.weighted_total.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_monthly_breakdown(path: &Path, breakdown: &MonthlyBreakdown) -> Result<()> {
    let mut writer = create_writer(path)?;

    let mut header = vec![NAME_HEADER.to_string()];
    for month in &breakdown.months {
        header.push(format!("{month}{MONTH_COUNT_SUFFIX}"));
        header.push(format!("{month}{WEIGHTED_SUFFIX}"));
    }
    header.push(COUNT_HEADER.to_string());
    header.push(MONTH_WEIGHTED_TOTAL_HEADER.to_string());
    writer.write_record(&header)?;

    for row in &breakdown.rows {
        let mut record = vec![row.name.clone()];
        for cell in &row.months {
            record.push(cell.count.to_string());
            record.push(cell.weighted.to_string());
        }
        record.push(row.total_count.to_string());
        record.push(row.total_weighted.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::compute_statistics;
    use crate::analyzers::types::AttendanceRow;
    use crate::classify::Classifier;
    use crate::config::WeightConfig;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    fn sample_report() -> StatisticsReport {
        let rows = vec![
            AttendanceRow::new("禱告會", "1月").with_cell("MD", Some("Amy/Ben")),
            AttendanceRow::new("英文崇拜", "2月").with_cell("Vocal", Some("Amy")),
            AttendanceRow::new("小組", "2月").with_cell("Vocal", Some("Cat")),
        ];
        compute_statistics(&rows, &Classifier::default(), &WeightConfig::default())
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        log_summary(&StatisticsReport::default());
    }

    #[test]
    fn test_to_json_includes_tables() {
        let json = to_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.get("generated_at").is_some());
        assert_eq!(value["people_totals"].as_array().unwrap().len(), 3);
        assert!(value["people_totals"][2]["weighted_total"].is_null());
        assert_eq!(value["monthly_breakdown"]["months"][1], "2月");
    }

    #[test]
    fn test_write_csv_tables() {
        let dir = temp_dir("attendance_rater_test_tables");
        let _ = fs::remove_dir_all(&dir);

        let paths = write_csv_tables(&dir, &sample_report()).unwrap();
        assert_eq!(paths.len(), 5);
        for path in &paths {
            assert!(path.exists());
        }

        let people = fs::read_to_string(dir.join(PEOPLE_TOTALS_FILE)).unwrap();
        let lines: Vec<_> = people.lines().collect();
        assert_eq!(lines[0], "姓名,總次數,加權分數");
        assert_eq!(lines[1], "Amy,2,2");
        assert_eq!(lines[3], "Cat,1,");

        let source = fs::read_to_string(dir.join(SOURCE_BREAKDOWN_FILE)).unwrap();
        assert_eq!(
            source.lines().next().unwrap(),
            "姓名,禱告會_原始,英文崇拜_原始,禱告會_加權,英文崇拜_加權,加權總分"
        );

        let monthly = fs::read_to_string(dir.join(MONTHLY_BREAKDOWN_FILE)).unwrap();
        let lines: Vec<_> = monthly.lines().collect();
        assert_eq!(lines[0], "姓名,1月_次數,1月_加權,2月_次數,2月_加權,總次數,總加權");
        assert_eq!(lines[2], "Ben,1,1,0,0,1,1");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_empty_tables_keeps_headers() {
        let dir = temp_dir("attendance_rater_test_empty_tables");
        let _ = fs::remove_dir_all(&dir);

        write_csv_tables(&dir, &StatisticsReport::default()).unwrap();
        let heavy = fs::read_to_string(dir.join(HEAVY_FILE)).unwrap();
        assert_eq!(heavy.lines().count(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_json_report() {
        let path = temp_dir("attendance_rater_test_report.json");
        let _ = fs::remove_file(&path);

        write_json_report(&path, &sample_report()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"heavy\""));

        fs::remove_file(&path).unwrap();
    }
}
