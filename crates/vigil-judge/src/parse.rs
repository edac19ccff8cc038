//! Verdict extraction: pull the JSON block out of free-form judge output
//! and validate it into typed dimension scores.

use regex::Regex;
use serde_json::Value;
use vigil_core::qa::score::{Dimension, DimensionScore, DimensionScores};

use crate::error::{JudgeError, JudgeResult};

/// Extract the JSON payload from raw model output.
///
/// Prefers a fenced ```json block; falls back to the outermost brace pair.
/// Models reliably produce one of the two, but the surrounding prose
/// varies, so nothing outside the payload is interpreted.
pub fn extract_json(output: &str) -> JudgeResult<Value> {
    static FENCE: &str = r"```json\s*([\s\S]*?)```";
    // Pattern is a literal; compilation cannot fail.
    if let Ok(re) = Regex::new(FENCE) {
        if let Some(caps) = re.captures(output) {
            if let Some(block) = caps.get(1) {
                return serde_json::from_str(block.as_str().trim())
                    .map_err(|e| JudgeError::MalformedVerdict(e.to_string()));
            }
        }
    }

    let start = output.find('{').ok_or(JudgeError::NoJsonInOutput)?;
    let end = output.rfind('}').ok_or(JudgeError::NoJsonInOutput)?;
    if end < start {
        return Err(JudgeError::NoJsonInOutput);
    }
    serde_json::from_str(&output[start..=end])
        .map_err(|e| JudgeError::MalformedVerdict(e.to_string()))
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Validate a raw verdict object into typed dimension scores.
///
/// Every one of the seven dimensions must be present with a numeric
/// `score`; `issues` and `examples` default to empty when omitted.
/// Returns the dimensions plus the free-form recommendation and strength
/// lists.
pub fn parse_verdict(raw: &Value) -> JudgeResult<(DimensionScores, Vec<String>, Vec<String>)> {
    let obj = raw
        .as_object()
        .ok_or_else(|| JudgeError::MalformedVerdict("verdict is not an object".to_string()))?;

    let mut dimensions = DimensionScores::default();
    for dim in Dimension::ALL {
        let entry = obj
            .get(dim.as_str())
            .ok_or(JudgeError::MissingDimension(dim.as_str()))?;
        let score = entry
            .get("score")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                JudgeError::MalformedVerdict(format!("dimension '{dim}' has no numeric score"))
            })?;
        *dimensions.get_mut(dim) = DimensionScore {
            score,
            issues: string_list(entry.get("issues")),
            examples: string_list(entry.get("examples")),
        };
    }

    let recommendations = string_list(obj.get("recommendations"));
    let strengths = string_list(obj.get("strengths"));
    Ok((dimensions, recommendations, strengths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_verdict() -> Value {
        let mut obj = serde_json::Map::new();
        for dim in Dimension::ALL {
            obj.insert(
                dim.as_str().to_string(),
                json!({"score": 8.0, "issues": ["minor nit"], "examples": ["at 02:13"]}),
            );
        }
        obj.insert("recommendations".into(), json!(["tighten the intro"]));
        obj.insert("strengths".into(), json!(["clear sourcing"]));
        Value::Object(obj)
    }

    #[test]
    fn test_extract_json_prefers_fenced_block() {
        let output = format!(
            "Here is my evaluation:\n```json\n{}\n```\nHope that helps!",
            full_verdict()
        );
        let value = extract_json(&output).unwrap();
        assert!(value.get("accuracy").is_some());
    }

    #[test]
    fn test_extract_json_falls_back_to_braces() {
        let output = format!("Evaluation: {} -- done", full_verdict());
        let value = extract_json(&output).unwrap();
        assert!(value.get("claims_quality").is_some());
    }

    #[test]
    fn test_extract_json_rejects_proseless_output() {
        assert!(matches!(
            extract_json("I cannot evaluate this."),
            Err(JudgeError::NoJsonInOutput)
        ));
    }

    #[test]
    fn test_parse_verdict_requires_all_dimensions() {
        let mut verdict = full_verdict();
        verdict.as_object_mut().unwrap().remove("readability");
        assert!(matches!(
            parse_verdict(&verdict),
            Err(JudgeError::MissingDimension("readability"))
        ));
    }

    #[test]
    fn test_parse_verdict_defaults_optional_lists() {
        let mut verdict = full_verdict();
        verdict["accuracy"] = json!({"score": 9.5});
        verdict.as_object_mut().unwrap().remove("recommendations");

        let (dims, recs, strengths) = parse_verdict(&verdict).unwrap();
        assert_eq!(dims.accuracy.score, 9.5);
        assert!(dims.accuracy.issues.is_empty());
        assert!(recs.is_empty());
        assert_eq!(strengths, vec!["clear sourcing"]);
    }

    #[test]
    fn test_parse_verdict_rejects_non_numeric_score() {
        let mut verdict = full_verdict();
        verdict["accuracy"] = json!({"score": "high"});
        assert!(matches!(
            parse_verdict(&verdict),
            Err(JudgeError::MalformedVerdict(_))
        ));
    }

    #[test]
    fn test_integer_scores_are_accepted() {
        let mut verdict = full_verdict();
        verdict["accuracy"] = json!({"score": 7});
        let (dims, _, _) = parse_verdict(&verdict).unwrap();
        assert_eq!(dims.accuracy.score, 7.0);
    }
}
