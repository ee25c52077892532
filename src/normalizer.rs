// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Normalizer -- turns untyped candidate records into canonical entities.
//!
//! Candidate records arrive as JSON objects of unknown completeness, from
//! pattern extraction or from a generative source. Each record is validated
//! on its own: a bad record is rejected with a reason and the rest of the
//! batch carries on. Unresolved dependency ids are not checked here; the
//! graph builder reports them.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::types::{
    Complexity, Impact, Priority, Probability, Requirement, RequirementType, RiskCandidate,
    RiskCategory, Vocabulary,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single candidate record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` has the wrong shape: expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` has unknown value `{value}`")]
    InvalidEnumValue { field: &'static str, value: String },

    #[error("requirement `{id}` depends on itself")]
    SelfDependency { id: String },

    #[error("duplicate id `{id}` in batch")]
    DuplicateId { id: String },
}

// ---------------------------------------------------------------------------
// Batch result
// ---------------------------------------------------------------------------

/// A rejected record: its position in the input, its id when one could be
/// read, and the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub id: Option<String>,
    #[serde(serialize_with = "serialize_reason")]
    pub error: NormalizeError,
}

fn serialize_reason<S: Serializer>(error: &NormalizeError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Accepted entities in input order, plus the records that were turned away.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedBatch<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<Rejection>,
}

impl<T> Default for NormalizedBatch<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn as_object(raw: &Value) -> Result<&Map<String, Value>, NormalizeError> {
    raw.as_object().ok_or(NormalizeError::InvalidType {
        field: "record",
        expected: "an object",
    })
}

/// Present and non-null.
fn field<'a>(record: &'a Map<String, Value>, name: &'static str) -> Option<&'a Value> {
    record.get(name).filter(|v| !v.is_null())
}

/// Ids may arrive as strings or bare numbers.
fn read_id(record: &Map<String, Value>) -> Result<String, NormalizeError> {
    match field(record, "id") {
        None => Err(NormalizeError::MissingField { field: "id" }),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(NormalizeError::MissingField { field: "id" }),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(NormalizeError::InvalidType {
            field: "id",
            expected: "a string",
        }),
    }
}

fn read_enum<T: Vocabulary>(
    record: &Map<String, Value>,
    name: &'static str,
) -> Result<T, NormalizeError> {
    let value = field(record, name).ok_or(NormalizeError::MissingField { field: name })?;
    let raw = value.as_str().ok_or(NormalizeError::InvalidType {
        field: name,
        expected: "a string",
    })?;
    // "Very High", "very-high" and "very_high" all name the same level
    let wire = raw.trim().to_lowercase().replace([' ', '-'], "_");
    T::from_wire(&wire).ok_or_else(|| NormalizeError::InvalidEnumValue {
        field: name,
        value: raw.to_string(),
    })
}

fn read_text(
    record: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, NormalizeError> {
    match field(record, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(NormalizeError::InvalidType {
            field: name,
            expected: "a string",
        }),
    }
}

/// Absent lists are empty; present ones must hold ids. Ids are trimmed and
/// bare numbers are accepted, the same way `read_id` reads them.
fn read_ids(
    record: &Map<String, Value>,
    name: &'static str,
) -> Result<Vec<String>, NormalizeError> {
    let invalid = NormalizeError::InvalidType {
        field: name,
        expected: "a list of ids",
    };
    match field(record, name) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(invalid.clone()),
            })
            .collect(),
        Some(_) => Err(invalid),
    }
}

/// Free-text lists are copied as-is. Anything but a string is refused.
fn read_text_list(
    record: &Map<String, Value>,
    name: &'static str,
) -> Result<Vec<String>, NormalizeError> {
    let invalid = NormalizeError::InvalidType {
        field: name,
        expected: "a list of strings",
    };
    match field(record, name) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid.clone()))
            .collect(),
        Some(_) => Err(invalid),
    }
}

// ---------------------------------------------------------------------------
// Single records
// ---------------------------------------------------------------------------

/// Validate one requirement candidate.
pub fn normalize_requirement(raw: &Value) -> Result<Requirement, NormalizeError> {
    let record = as_object(raw)?;
    let id = read_id(record)?;
    let priority = read_enum::<Priority>(record, "priority")?;
    let complexity = read_enum::<Complexity>(record, "complexity")?;
    let requirement_type = read_enum::<RequirementType>(record, "type")?;
    let dependencies = read_ids(record, "dependencies")?;

    let mut requirement =
        Requirement::new(id, priority, complexity, requirement_type, dependencies)?;
    if let Some(text) = read_text(record, "text")? {
        requirement = requirement.with_text(text);
    }
    if let Some(section) = read_text(record, "section")? {
        requirement = requirement.with_section(section);
    }
    Ok(requirement)
}

/// Validate one risk candidate. A pre-computed `risk_score` is dropped.
pub fn normalize_risk(raw: &Value) -> Result<RiskCandidate, NormalizeError> {
    let record = as_object(raw)?;
    let id = read_id(record)?;
    let category = read_enum::<RiskCategory>(record, "category")?;
    let probability = read_enum::<Probability>(record, "probability")?;
    let impact = read_enum::<Impact>(record, "impact")?;

    if record.contains_key("risk_score") {
        debug!(risk_id = %id, "discarding upstream risk_score");
    }

    let mut candidate = RiskCandidate::new(id, category, probability, impact)
        .with_mitigation_strategies(read_text_list(record, "mitigation_strategies")?)
        .with_contingency_plans(read_text_list(record, "contingency_plans")?)
        .with_early_warning_signs(read_text_list(record, "early_warning_signs")?);
    if let Some(title) = read_text(record, "title")? {
        candidate = candidate.with_title(title);
    }
    if let Some(description) = read_text(record, "description")? {
        candidate = candidate.with_description(description);
    }
    if let Some(owner) = read_text(record, "owner")? {
        candidate = candidate.with_owner(owner);
    }
    Ok(candidate)
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

fn normalize_batch<T>(
    kind: &'static str,
    raws: &[Value],
    normalize: impl Fn(&Value) -> Result<T, NormalizeError>,
    id_of: impl Fn(&T) -> &str,
) -> NormalizedBatch<T> {
    let mut batch = NormalizedBatch::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(raws.len());

    for (index, raw) in raws.iter().enumerate() {
        let outcome = normalize(raw).and_then(|entity| {
            if seen.insert(id_of(&entity).to_string()) {
                Ok(entity)
            } else {
                Err(NormalizeError::DuplicateId {
                    id: id_of(&entity).to_string(),
                })
            }
        });

        match outcome {
            Ok(entity) => batch.accepted.push(entity),
            Err(error) => {
                let id = raw
                    .as_object()
                    .and_then(|record| read_id(record).ok());
                warn!(kind, index, id = ?id, %error, "rejected candidate record");
                batch.rejected.push(Rejection { index, id, error });
            }
        }
    }

    info!(
        kind,
        accepted = batch.accepted.len(),
        rejected = batch.rejected.len(),
        "normalized candidate batch"
    );
    batch
}

/// Validate a batch of requirement candidates. Later duplicates of an id
/// are rejected; the first occurrence is kept.
pub fn normalize_requirements(raws: &[Value]) -> NormalizedBatch<Requirement> {
    normalize_batch("requirement", raws, normalize_requirement, |r| r.id())
}

/// Validate a batch of risk candidates.
pub fn normalize_risks(raws: &[Value]) -> NormalizedBatch<RiskCandidate> {
    normalize_batch("risk", raws, normalize_risk, |r| r.id())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn requirement_record(id: &str, deps: &[&str]) -> Value {
        json!({
            "id": id,
            "priority": "mandatory",
            "complexity": "high",
            "type": "technical",
            "dependencies": deps,
        })
    }

    #[test]
    fn accepts_complete_requirement() {
        let req = normalize_requirement(&requirement_record("REQ-1", &["REQ-2"]))
            .expect("test: valid requirement");
        assert_eq!(req.id(), "REQ-1");
        assert_eq!(req.priority(), Priority::Mandatory);
        assert_eq!(req.complexity(), Complexity::High);
        assert_eq!(req.requirement_type(), RequirementType::Technical);
        assert_eq!(req.dependencies(), &["REQ-2".to_string()]);
    }

    #[test]
    fn missing_field_is_named() {
        let err = normalize_requirement(&json!({
            "id": "REQ-1", "priority": "mandatory", "type": "technical"
        }))
        .unwrap_err();
        assert_eq!(err, NormalizeError::MissingField { field: "complexity" });
    }

    #[test]
    fn null_counts_as_missing() {
        let err = normalize_risk(&json!({
            "id": "R-1", "category": null, "probability": "low", "impact": "low"
        }))
        .unwrap_err();
        assert_eq!(err, NormalizeError::MissingField { field: "category" });
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let err = normalize_risk(&json!({
            "id": "R-1", "category": "weather", "probability": "low", "impact": "low"
        }))
        .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidEnumValue {
                field: "category",
                value: "weather".into()
            }
        );
    }

    #[test]
    fn enum_spelling_is_coerced() {
        let risk = normalize_risk(&json!({
            "id": "R-1", "category": "Technical", "probability": "Very High", "impact": "critical"
        }))
        .expect("test: coerced spelling");
        assert_eq!(risk.category(), RiskCategory::Technical);
        assert_eq!(risk.probability(), Probability::VeryHigh);
    }

    #[test]
    fn wrong_shape_dependencies() {
        let mut record = requirement_record("REQ-1", &[]);
        record["dependencies"] = json!("REQ-2");
        let err = normalize_requirement(&record).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidType { field: "dependencies", .. }
        ));
    }

    #[test]
    fn absent_dependencies_default_to_empty() {
        let req = normalize_requirement(&json!({
            "id": "REQ-1", "priority": "optional", "complexity": "low", "type": "business"
        }))
        .expect("test: no dependency list");
        assert!(req.dependencies().is_empty());
    }

    #[test]
    fn numeric_id_is_coerced() {
        let req = normalize_requirement(&json!({
            "id": 7, "priority": "important", "complexity": "medium", "type": "security"
        }))
        .expect("test: numeric id");
        assert_eq!(req.id(), "7");
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = normalize_risk(&json!(["R-1"])).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidType { field: "record", .. }));
    }

    #[test]
    fn self_dependency_is_rejected_from_batch() {
        let batch = normalize_requirements(&[
            requirement_record("REQ-1", &[]),
            requirement_record("REQ-2", &["REQ-1", "REQ-2"]),
        ]);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].id(), "REQ-1");
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 1);
        assert_eq!(batch.rejected[0].id.as_deref(), Some("REQ-2"));
        assert_eq!(
            batch.rejected[0].error,
            NormalizeError::SelfDependency { id: "REQ-2".into() }
        );
    }

    #[test]
    fn dangling_dependency_is_not_a_normalizer_error() {
        let batch = normalize_requirements(&[requirement_record("REQ-1", &["REQ-404"])]);
        assert_eq!(batch.accepted.len(), 1);
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn duplicate_id_keeps_first() {
        let batch = normalize_requirements(&[
            requirement_record("REQ-1", &[]),
            requirement_record("REQ-1", &["REQ-9"]),
        ]);
        assert_eq!(batch.accepted.len(), 1);
        assert!(batch.accepted[0].dependencies().is_empty());
        assert_eq!(
            batch.rejected[0].error,
            NormalizeError::DuplicateId { id: "REQ-1".into() }
        );
    }

    #[test]
    fn rejected_record_does_not_abort_batch() {
        let batch = normalize_risks(&[
            json!({"id": "R-1", "category": "schedule", "probability": "high", "impact": "high"}),
            json!({"id": "R-2", "category": "schedule"}),
            json!({"id": "R-3", "category": "external", "probability": "low", "impact": "medium"}),
        ]);
        let ids: Vec<&str> = batch.accepted.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["R-1", "R-3"]);
        assert_eq!(
            batch.rejected[0].error,
            NormalizeError::MissingField { field: "probability" }
        );
    }

    #[test]
    fn passthrough_text_is_kept_verbatim() {
        let risk = normalize_risk(&json!({
            "id": "R-1",
            "category": "compliance",
            "probability": "medium",
            "impact": "high",
            "risk_score": 4.9,
            "mitigation_strategies": ["Engage auditor early", "Map controls"],
            "early_warning_signs": ["Audit findings"]
        }))
        .expect("test: passthrough");
        assert_eq!(risk.mitigation_strategies().len(), 2);
        assert_eq!(risk.early_warning_signs(), &["Audit findings".to_string()]);
    }

    #[test]
    fn free_text_lists_keep_surrounding_whitespace() {
        let risk = normalize_risk(&json!({
            "id": "R-1",
            "category": "technical",
            "probability": "low",
            "impact": "low",
            "mitigation_strategies": ["  Indented step\n", "Plain step"],
            "contingency_plans": ["\tSwitch vendor "]
        }))
        .expect("test: free text");
        assert_eq!(
            risk.mitigation_strategies(),
            &["  Indented step\n".to_string(), "Plain step".to_string()]
        );
        assert_eq!(risk.contingency_plans(), &["\tSwitch vendor ".to_string()]);
    }

    #[test]
    fn free_text_lists_refuse_numbers() {
        let err = normalize_risk(&json!({
            "id": "R-1",
            "category": "technical",
            "probability": "low",
            "impact": "low",
            "early_warning_signs": ["Velocity drops", 42]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidType {
                field: "early_warning_signs",
                expected: "a list of strings"
            }
        );
    }

    #[test]
    fn dependency_ids_are_trimmed_and_coerced() {
        let req = normalize_requirement(&json!({
            "id": "REQ-1", "priority": "optional", "complexity": "low", "type": "business",
            "dependencies": [" REQ-2 ", 3]
        }))
        .expect("test: dependency ids");
        assert_eq!(req.dependencies(), &["REQ-2".to_string(), "3".to_string()]);
    }

    #[test]
    fn rejection_serializes_reason_text() {
        let batch = normalize_risks(&[json!({"id": "R-1"})]);
        let value = serde_json::to_value(&batch).expect("test: serialize batch");
        assert_eq!(
            value["rejected"][0]["error"],
            json!("missing required field `category`")
        );
    }
}
