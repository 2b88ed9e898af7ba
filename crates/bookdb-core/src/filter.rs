//! Engine-agnostic filter IR and its compilation into the engine's native
//! filter shape.
//!
//! A [`FilterSpec`] is a conjunction of conditions produced fresh per query
//! by the translator and consumed immediately by [`compile`]. Its serde
//! representation is exactly the wire shape the completion model is asked
//! to emit, e.g.
//! `{"must": [{"key": "price", "range": {"lte": 20.0}}]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Fields a filter may reference. Anything else came from a hallucinated or
/// source-schema field name and drops the whole filter.
pub const FILTERABLE_FIELDS: &[&str] = &[
    "author",
    "price",
    "title",
    "genre",
    "store",
    "publication_year",
    "rating",
    "reviews_count",
];

/// Conjunction of conditions. Empty means "no filter".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterSpec {
    #[serde(default)]
    pub must: Vec<ConditionSpec>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
    }
}

/// One condition. A well-formed condition carries exactly one of `match` /
/// `range`; shape violations are caught by the compiler, not the parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionSpec {
    pub key: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_: Option<MatchSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeSpec>,
}

impl ConditionSpec {
    pub fn match_value(key: &str, value: impl Into<Value>) -> Self {
        Self {
            key: key.to_string(),
            match_: Some(MatchSpec::Value { value: value.into() }),
            range: None,
        }
    }

    pub fn match_any(key: &str, values: Vec<Value>) -> Self {
        Self {
            key: key.to_string(),
            match_: Some(MatchSpec::Any { any: values }),
            range: None,
        }
    }

    pub fn range(key: &str, range: RangeSpec) -> Self {
        Self { key: key.to_string(), match_: None, range: Some(range) }
    }
}

/// Exact equality against one value, or against any of several.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MatchSpec {
    Value { value: Value },
    Any { any: Vec<Value> },
}

/// Numeric bounds; all four are optional and independently combinable.
/// Absent bounds are omitted on the wire, never defaulted to sentinels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RangeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
}

impl RangeSpec {
    pub fn is_unbounded(&self) -> bool {
        self.gte.is_none() && self.lte.is_none() && self.gt.is_none() && self.lt.is_none()
    }
}

/// The engine's own filter representation: an AND list whose entries are
/// either a single field condition or a nested OR group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NativeFilter {
    pub must: Vec<NativeCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NativeCondition {
    Field(FieldCondition),
    /// OR group nested inside the outer AND; matches when any branch does.
    AnyOf { should: Vec<FieldCondition> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldCondition {
    pub key: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_: Option<MatchValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeSpec>,
}

impl FieldCondition {
    fn equals(key: &str, value: Value) -> Self {
        Self { key: key.to_string(), match_: Some(MatchValue { value }), range: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchValue {
    pub value: Value,
}

/// Compile the abstract filter into the engine's native shape.
///
/// Returns `None` for an empty filter and for a malformed one alike: a bad
/// filter must never abort the search, only widen it to unfiltered. The
/// cause is logged for operators.
pub fn compile(spec: &FilterSpec) -> Option<NativeFilter> {
    if spec.must.is_empty() {
        return None;
    }
    let mut must = Vec::with_capacity(spec.must.len());
    for cond in &spec.must {
        if !FILTERABLE_FIELDS.contains(&cond.key.as_str()) {
            warn!(key = %cond.key, "unknown filter key, widening to unfiltered search");
            return None;
        }
        match (&cond.match_, &cond.range) {
            (Some(MatchSpec::Value { value }), None) => {
                must.push(NativeCondition::Field(FieldCondition::equals(&cond.key, value.clone())));
            }
            (Some(MatchSpec::Any { any }), None) => {
                if any.is_empty() {
                    warn!(key = %cond.key, "empty match-any list, widening to unfiltered search");
                    return None;
                }
                // "any of N values" compiles to an OR group nested inside the
                // outer AND. Flattening the branches into `must` would require
                // every value to match at once.
                let should = any
                    .iter()
                    .map(|v| FieldCondition::equals(&cond.key, v.clone()))
                    .collect();
                must.push(NativeCondition::AnyOf { should });
            }
            (None, Some(range)) => {
                if range.is_unbounded() {
                    warn!(key = %cond.key, "range without bounds, widening to unfiltered search");
                    return None;
                }
                must.push(NativeCondition::Field(FieldCondition {
                    key: cond.key.clone(),
                    match_: None,
                    range: Some(*range),
                }));
            }
            _ => {
                warn!(
                    key = %cond.key,
                    "condition must carry exactly one of match/range, widening to unfiltered search"
                );
                return None;
            }
        }
    }
    Some(NativeFilter { must })
}
