//! Seven-dimension QA rubric: dimension identities, aggregation into a
//! total score, and letter grading.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use vigil_store::QaEvaluationRecord;

/// The seven rubric dimensions, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Accuracy,
    Completeness,
    Readability,
    SignalQuality,
    HypeAssessment,
    StructuralQuality,
    ClaimsQuality,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Accuracy,
        Dimension::Completeness,
        Dimension::Readability,
        Dimension::SignalQuality,
        Dimension::HypeAssessment,
        Dimension::StructuralQuality,
        Dimension::ClaimsQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Accuracy => "accuracy",
            Dimension::Completeness => "completeness",
            Dimension::Readability => "readability",
            Dimension::SignalQuality => "signal_quality",
            Dimension::HypeAssessment => "hype_assessment",
            Dimension::StructuralQuality => "structural_quality",
            Dimension::ClaimsQuality => "claims_quality",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dimension's verdict from the judge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DimensionScore {
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// All seven dimension verdicts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DimensionScores {
    pub accuracy: DimensionScore,
    pub completeness: DimensionScore,
    pub readability: DimensionScore,
    pub signal_quality: DimensionScore,
    pub hype_assessment: DimensionScore,
    pub structural_quality: DimensionScore,
    pub claims_quality: DimensionScore,
}

impl DimensionScores {
    pub fn get(&self, dim: Dimension) -> &DimensionScore {
        match dim {
            Dimension::Accuracy => &self.accuracy,
            Dimension::Completeness => &self.completeness,
            Dimension::Readability => &self.readability,
            Dimension::SignalQuality => &self.signal_quality,
            Dimension::HypeAssessment => &self.hype_assessment,
            Dimension::StructuralQuality => &self.structural_quality,
            Dimension::ClaimsQuality => &self.claims_quality,
        }
    }

    pub fn get_mut(&mut self, dim: Dimension) -> &mut DimensionScore {
        match dim {
            Dimension::Accuracy => &mut self.accuracy,
            Dimension::Completeness => &mut self.completeness,
            Dimension::Readability => &mut self.readability,
            Dimension::SignalQuality => &mut self.signal_quality,
            Dimension::HypeAssessment => &mut self.hype_assessment,
            Dimension::StructuralQuality => &mut self.structural_quality,
            Dimension::ClaimsQuality => &mut self.claims_quality,
        }
    }

    /// Unweighted mean of the seven scores, rounded to two decimals.
    pub fn total(&self) -> f64 {
        let sum: f64 = Dimension::ALL.iter().map(|d| self.get(*d).score).sum();
        let mean = sum / Dimension::ALL.len() as f64;
        (mean * 100.0).round() / 100.0
    }
}

/// Letter grade derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Breakpoints: >= 9.0 A, >= 7.0 B, >= 5.0 C, >= 3.0 D, else F.
    pub fn from_total(total: f64) -> Self {
        if total >= 9.0 {
            Grade::A
        } else if total >= 7.0 {
            Grade::B
        } else if total >= 5.0 {
            Grade::C
        } else if total >= 3.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat per-dimension score table, as written to `*_qa.json` artifacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreTable {
    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub readability_score: f64,
    pub signal_quality_score: f64,
    pub hype_assessment_score: f64,
    pub structural_quality_score: f64,
    pub claims_quality_score: f64,
}

impl ScoreTable {
    pub fn get(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::Accuracy => self.accuracy_score,
            Dimension::Completeness => self.completeness_score,
            Dimension::Readability => self.readability_score,
            Dimension::SignalQuality => self.signal_quality_score,
            Dimension::HypeAssessment => self.hype_assessment_score,
            Dimension::StructuralQuality => self.structural_quality_score,
            Dimension::ClaimsQuality => self.claims_quality_score,
        }
    }
}

/// A complete evaluation result: the schema of one `*_qa.json` artifact.
///
/// Per-dimension example snippets from the judge are working material for
/// the judge's reasoning and are not persisted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaResult {
    pub video_id: String,
    pub evaluated_at: String,
    pub evaluator: String,
    pub scores: ScoreTable,
    /// Per-dimension issue lists, keyed by dimension name.
    pub issues: BTreeMap<String, Vec<String>>,
    pub total_score: f64,
    pub grade: Grade,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    pub evaluation_duration_seconds: f64,
    #[serde(default)]
    pub tokens_used: Option<u64>,
}

impl QaResult {
    /// Assemble a result from the judge's per-dimension verdicts.
    pub fn assemble(
        video_id: &str,
        evaluator: &str,
        dimensions: &DimensionScores,
        recommendations: Vec<String>,
        strengths: Vec<String>,
        evaluation_duration_seconds: f64,
        tokens_used: Option<u64>,
    ) -> Self {
        let total = dimensions.total();
        let scores = ScoreTable {
            accuracy_score: dimensions.accuracy.score,
            completeness_score: dimensions.completeness.score,
            readability_score: dimensions.readability.score,
            signal_quality_score: dimensions.signal_quality.score,
            hype_assessment_score: dimensions.hype_assessment.score,
            structural_quality_score: dimensions.structural_quality.score,
            claims_quality_score: dimensions.claims_quality.score,
        };
        let issues = Dimension::ALL
            .iter()
            .map(|d| (d.as_str().to_string(), dimensions.get(*d).issues.clone()))
            .collect();

        Self {
            video_id: video_id.to_string(),
            evaluated_at: Utc::now().to_rfc3339(),
            evaluator: evaluator.to_string(),
            scores,
            issues,
            total_score: total,
            grade: Grade::from_total(total),
            recommendations,
            strengths,
            evaluation_duration_seconds,
            tokens_used,
        }
    }

    /// Total count of issues across all dimensions.
    pub fn issues_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    /// Convert to the relational row shape, bound to a store-side video UUID.
    pub fn to_evaluation_record(&self, video_uuid: &str) -> QaEvaluationRecord {
        QaEvaluationRecord {
            video_id: video_uuid.to_string(),
            evaluated_at: self.evaluated_at.clone(),
            evaluator: self.evaluator.clone(),
            accuracy_score: self.scores.accuracy_score,
            completeness_score: self.scores.completeness_score,
            readability_score: self.scores.readability_score,
            signal_quality_score: self.scores.signal_quality_score,
            hype_assessment_score: self.scores.hype_assessment_score,
            structural_quality_score: self.scores.structural_quality_score,
            claims_quality_score: self.scores.claims_quality_score,
            total_score: self.total_score,
            grade: self.grade.to_string(),
            issues: serde_json::json!(self.issues),
            recommendations: self.recommendations.clone(),
            strengths: self.strengths.clone(),
            evaluation_duration_seconds: self.evaluation_duration_seconds,
            tokens_used: self.tokens_used,
        }
    }
}
