//! The Assessment schema contract: the JSON schema sent to the reasoning service and
//! the structural validation its output must pass before it is trusted.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::assessment::{Assessment, EDUCATION_NOT_FOUND};
use crate::models::role::RoleLabel;

pub const REQUIRED_FIELDS: [&str; 6] = [
    "skills",
    "experience_years",
    "summary",
    "ats_score",
    "education_summary",
    "improvements",
];

#[derive(Debug, Error, PartialEq)]
pub enum SchemaViolation {
    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("field 'summary' is blank")]
    BlankSummary,
}

/// JSON schema for the Assessment, with per-field intent conditioned on `role`.
pub fn assessment_schema(role: &RoleLabel) -> Value {
    json!({
        "type": "object",
        "properties": {
            "skills": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Technical and professional skills found in the resume, in order of relevance."
            },
            "experience_years": {
                "type": "number",
                "minimum": 0,
                "description": "Total years of professional experience; 0 for entry-level or unknown."
            },
            "summary": {
                "type": "string",
                "description": format!("Two to three sentence summary of the candidate's fit for the {role} role.")
            },
            "ats_score": {
                "type": "integer",
                "minimum": 0,
                "maximum": 100,
                "description": format!("ATS-style match score from 0 to 100. It must reflect fitness specifically for the {role} role, not general resume quality.")
            },
            "education_summary": {
                "type": "string",
                "description": format!("One-line summary of the highest education, or \"{EDUCATION_NOT_FOUND}\" if none is listed.")
            },
            "improvements": {
                "type": "array",
                "items": { "type": "string" },
                "description": format!("Concrete improvements tailored to the {role} role. Prefix each with its section, e.g. \"Skills: ...\", \"Experience: ...\", \"Projects: ...\".")
            }
        },
        "required": REQUIRED_FIELDS,
        "additionalProperties": false
    })
}

/// Checks presence, rough type and range of every required field.
///
/// Values are taken as given; nothing is recomputed.
pub fn validate_assessment(value: &Value) -> Result<Assessment, SchemaViolation> {
    let object = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    let skills = string_array(object, "skills")?;
    let improvements = string_array(object, "improvements")?;

    let experience_years = required(object, "experience_years")?
        .as_f64()
        .ok_or(SchemaViolation::WrongType {
            field: "experience_years",
            expected: "a number",
        })?;
    if !experience_years.is_finite() || experience_years < 0.0 {
        return Err(SchemaViolation::OutOfRange {
            field: "experience_years",
            value: experience_years.to_string(),
        });
    }

    let ats_score = integer(required(object, "ats_score")?).ok_or(SchemaViolation::WrongType {
        field: "ats_score",
        expected: "an integer",
    })?;
    if !(0..=100).contains(&ats_score) {
        return Err(SchemaViolation::OutOfRange {
            field: "ats_score",
            value: ats_score.to_string(),
        });
    }

    let summary = string(object, "summary")?;
    if summary.trim().is_empty() {
        return Err(SchemaViolation::BlankSummary);
    }
    let education_summary = string(object, "education_summary")?;

    Ok(Assessment {
        skills,
        experience_years,
        summary,
        ats_score: ats_score as u32,
        education_summary,
        improvements,
    })
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, SchemaViolation> {
    match object.get(field) {
        None | Some(Value::Null) => Err(SchemaViolation::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn string(object: &Map<String, Value>, field: &'static str) -> Result<String, SchemaViolation> {
    required(object, field)?
        .as_str()
        .map(String::from)
        .ok_or(SchemaViolation::WrongType {
            field,
            expected: "a string",
        })
}

fn string_array(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, SchemaViolation> {
    let wrong_type = SchemaViolation::WrongType {
        field,
        expected: "an array of strings",
    };
    let items = required(object, field)?.as_array().ok_or(wrong_type)?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(String::from).ok_or(SchemaViolation::WrongType {
                field,
                expected: "an array of strings",
            })
        })
        .collect()
}

/// Accepts `87` and `87.0`, rejects `87.5`.
fn integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Value {
        json!({
            "skills": ["python", "sql"],
            "experience_years": 4.5,
            "summary": "Solid analyst profile.",
            "ats_score": 82,
            "education_summary": "BSc Statistics",
            "improvements": ["Skills: Add Tableau", "Quantify dashboard impact"]
        })
    }

    #[test]
    fn test_valid_payload_passes_untouched() {
        let assessment = validate_assessment(&valid()).unwrap();
        assert_eq!(assessment.skills, vec!["python", "sql"]);
        assert_eq!(assessment.experience_years, 4.5);
        assert_eq!(assessment.ats_score, 82);
        assert_eq!(assessment.improvements.len(), 2);
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        for field in REQUIRED_FIELDS {
            let mut payload = valid();
            payload.as_object_mut().unwrap().remove(field);
            assert_eq!(
                validate_assessment(&payload),
                Err(SchemaViolation::MissingField(field)),
                "field {field}"
            );
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut payload = valid();
        payload["ats_score"] = Value::Null;
        assert_eq!(
            validate_assessment(&payload),
            Err(SchemaViolation::MissingField("ats_score"))
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            validate_assessment(&json!(["skills"])),
            Err(SchemaViolation::NotAnObject)
        );
    }

    #[test]
    fn test_score_as_string_rejected() {
        let mut payload = valid();
        payload["ats_score"] = json!("82");
        assert!(matches!(
            validate_assessment(&payload),
            Err(SchemaViolation::WrongType {
                field: "ats_score",
                ..
            })
        ));
    }

    #[test]
    fn test_whole_float_score_accepted() {
        let mut payload = valid();
        payload["ats_score"] = json!(82.0);
        assert_eq!(validate_assessment(&payload).unwrap().ats_score, 82);
    }

    #[test]
    fn test_fractional_score_rejected() {
        let mut payload = valid();
        payload["ats_score"] = json!(82.5);
        assert!(validate_assessment(&payload).is_err());
    }

    #[test]
    fn test_score_above_100_rejected() {
        let mut payload = valid();
        payload["ats_score"] = json!(101);
        assert!(matches!(
            validate_assessment(&payload),
            Err(SchemaViolation::OutOfRange {
                field: "ats_score",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_years_rejected() {
        let mut payload = valid();
        payload["experience_years"] = json!(-1);
        assert!(matches!(
            validate_assessment(&payload),
            Err(SchemaViolation::OutOfRange {
                field: "experience_years",
                ..
            })
        ));
    }

    #[test]
    fn test_blank_summary_rejected() {
        let mut payload = valid();
        payload["summary"] = json!("   ");
        assert_eq!(
            validate_assessment(&payload),
            Err(SchemaViolation::BlankSummary)
        );
    }

    #[test]
    fn test_non_string_skill_rejected() {
        let mut payload = valid();
        payload["skills"] = json!(["python", 3]);
        assert!(matches!(
            validate_assessment(&payload),
            Err(SchemaViolation::WrongType {
                field: "skills",
                ..
            })
        ));
    }

    #[test]
    fn test_schema_lists_required_fields_and_role() {
        let schema = assessment_schema(&RoleLabel::new("Data Analyst").unwrap());
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
        assert!(schema["properties"]["ats_score"]["description"]
            .as_str()
            .unwrap()
            .contains("Data Analyst"));
    }
}
