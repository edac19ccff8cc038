//! Aggregation of persisted `*_qa.json` artifacts into CSV and HTML
//! reports plus a printable summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{VigilError, VigilResult};
use crate::qa::score::{Dimension, Grade, QaResult};

/// Load every `*_qa.json` file under `dir`, skipping files that fail to
/// parse (each skip is logged). A missing directory is an error; an empty
/// one yields an empty vector.
pub fn load_results(dir: &Path) -> VigilResult<Vec<QaResult>> {
    let mut results = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with("_qa.json") {
            continue;
        }
        let text = fs::read_to_string(entry.path())?;
        match serde_json::from_str::<QaResult>(&text) {
            Ok(result) => {
                debug!(file = %name, video_id = %result.video_id, "loaded qa artifact");
                results.push(result);
            }
            Err(err) => {
                warn!(file = %name, error = %err, "skipping unparsable qa artifact");
            }
        }
    }
    // Worst first, so problem videos surface at the top of every report.
    results.sort_by(|a, b| {
        a.total_score
            .partial_cmp(&b.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(results)
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the result set as CSV, one row per video.
pub fn render_csv(results: &[QaResult]) -> String {
    let mut out = String::from(
        "video_id,total_score,grade,accuracy,completeness,readability,signal_quality,\
         hype_assessment,structural_quality,claims_quality,issues_count,\
         recommendations_count,evaluated_at\n",
    );
    for r in results {
        let dims: Vec<String> = Dimension::ALL
            .iter()
            .map(|d| format!("{:.1}", r.scores.get(*d)))
            .collect();
        out.push_str(&format!(
            "{},{:.2},{},{},{},{},{}\n",
            csv_escape(&r.video_id),
            r.total_score,
            r.grade,
            dims.join(","),
            r.issues_count(),
            r.recommendations.len(),
            csv_escape(&r.evaluated_at),
        ));
    }
    out
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::A => "#2e7d32",
        Grade::B => "#558b2f",
        Grade::C => "#f9a825",
        Grade::D => "#ef6c00",
        Grade::F => "#c62828",
    }
}

/// Render the result set as a standalone HTML page: a summary header
/// followed by one card per video, worst scores first.
pub fn render_html(results: &[QaResult]) -> String {
    let stats = SummaryStats::compute(results);
    let mut body = String::new();

    body.push_str(&format!(
        "<div class=\"summary\"><h2>QA Report</h2>\
         <p>{} videos evaluated &middot; average score {:.2}</p></div>\n",
        stats.total, stats.average_score,
    ));

    for r in results {
        let mut dims = String::new();
        for d in Dimension::ALL {
            dims.push_str(&format!(
                "<li>{}: {:.1}</li>",
                d,
                r.scores.get(d)
            ));
        }
        let mut issues = String::new();
        for (dim, list) in &r.issues {
            for issue in list {
                issues.push_str(&format!(
                    "<li><em>{}</em>: {}</li>",
                    html_escape(dim),
                    html_escape(issue)
                ));
            }
        }
        body.push_str(&format!(
            "<div class=\"card\" style=\"border-left: 6px solid {color}\">\
             <h3>{id} <span class=\"grade\" style=\"color:{color}\">{grade}</span></h3>\
             <p>Total: {total:.2} &middot; evaluated {at}</p>\
             <ul>{dims}</ul><ul class=\"issues\">{issues}</ul></div>\n",
            color = grade_color(r.grade),
            id = html_escape(&r.video_id),
            grade = r.grade,
            total = r.total_score,
            at = html_escape(&r.evaluated_at),
            dims = dims,
            issues = issues,
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>QA Report</title>\
         <style>body{{font-family:sans-serif;max-width:900px;margin:2em auto}}\
         .card{{background:#f7f7f7;padding:1em;margin:1em 0;border-radius:4px}}\
         .grade{{font-weight:bold}}</style></head><body>\n{body}</body></html>\n"
    )
}

/// Aggregate statistics across a result set.
#[derive(Debug, Default, serde::Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub average_score: f64,
    /// Count per letter grade, all five grades always present.
    pub grade_counts: BTreeMap<String, usize>,
    /// Mean score per dimension, in canonical dimension order.
    pub dimension_averages: Vec<(String, f64)>,
    /// Most frequent issue texts, descending, at most ten.
    pub top_issues: Vec<(String, usize)>,
}

impl SummaryStats {
    pub fn compute(results: &[QaResult]) -> Self {
        let mut stats = SummaryStats {
            total: results.len(),
            ..Default::default()
        };
        for g in [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F] {
            stats.grade_counts.insert(g.to_string(), 0);
        }
        if results.is_empty() {
            return stats;
        }

        stats.average_score =
            results.iter().map(|r| r.total_score).sum::<f64>() / results.len() as f64;

        for r in results {
            if let Some(count) = stats.grade_counts.get_mut(r.grade.as_str()) {
                *count += 1;
            }
        }

        for d in Dimension::ALL {
            let mean =
                results.iter().map(|r| r.scores.get(d)).sum::<f64>() / results.len() as f64;
            stats.dimension_averages.push((d.to_string(), mean));
        }

        let mut issue_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in results {
            for issue in r.issues.values().flatten() {
                *issue_counts.entry(issue.as_str()).or_default() += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> = issue_counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(10);
        stats.top_issues = ranked;

        stats
    }

    /// Human-readable summary for terminal output.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "videos evaluated: {}\naverage score:    {:.2}\n\ngrades:\n",
            self.total, self.average_score
        );
        for (grade, count) in &self.grade_counts {
            let bar = "#".repeat(*count);
            out.push_str(&format!("  {grade}  {count:>3}  {bar}\n"));
        }
        out.push_str("\ndimension averages:\n");
        for (dim, avg) in &self.dimension_averages {
            out.push_str(&format!("  {dim:<20} {avg:.2}\n"));
        }
        if !self.top_issues.is_empty() {
            out.push_str("\ntop issues:\n");
            for (issue, count) in &self.top_issues {
                out.push_str(&format!("  {count:>3}x {issue}\n"));
            }
        }
        out
    }
}

/// Write the CSV report to `path`.
pub fn write_csv(results: &[QaResult], path: &Path) -> VigilResult<()> {
    fs::write(path, render_csv(results)).map_err(VigilError::Io)
}

/// Write the HTML report to `path`.
pub fn write_html(results: &[QaResult], path: &Path) -> VigilResult<()> {
    fs::write(path, render_html(results)).map_err(VigilError::Io)
}
