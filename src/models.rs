//! Data models for the crowd-test tally.
//!
//! This module contains the submission documents as they are stored on disk,
//! the variant labels voters pick from, and the normalized vote a ballot
//! resolves to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One comparison arm shown to voters, or the `none` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariantLabel {
    /// Generated with the simple prompt.
    Simple,
    /// Generated with the extended prompt.
    Extended,
    /// Generated without a reference image.
    NoReference,
    /// Generated without a reference image, model variant.
    NoReferenceModel,
    /// The voter rejected every variant shown.
    None,
    /// A label outside the known set, kept verbatim.
    Other(String),
}

impl VariantLabel {
    /// The known labels, in the order reports list them.
    pub const KNOWN: [VariantLabel; 5] = [
        VariantLabel::Simple,
        VariantLabel::Extended,
        VariantLabel::NoReference,
        VariantLabel::NoReferenceModel,
        VariantLabel::None,
    ];

    /// Returns the raw label as it appears in submission files.
    pub fn as_str(&self) -> &str {
        match self {
            VariantLabel::Simple => "simple",
            VariantLabel::Extended => "extended",
            VariantLabel::NoReference => "no_reference",
            VariantLabel::NoReferenceModel => "no_reference_model",
            VariantLabel::None => "none",
            VariantLabel::Other(s) => s,
        }
    }

    /// Returns the human-readable name used in reports.
    pub fn display_name(&self) -> &str {
        match self {
            VariantLabel::Simple => "简单版",
            VariantLabel::Extended => "扩展版",
            VariantLabel::NoReference => "不垫图版",
            VariantLabel::NoReferenceModel => "不垫图版模特",
            VariantLabel::None => "都不满意",
            VariantLabel::Other(s) => s,
        }
    }
}

impl fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<&str> for VariantLabel {
    fn from(s: &str) -> Self {
        match s {
            "simple" => VariantLabel::Simple,
            "extended" => VariantLabel::Extended,
            "no_reference" => VariantLabel::NoReference,
            "no_reference_model" => VariantLabel::NoReferenceModel,
            "none" => VariantLabel::None,
            other => VariantLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for VariantLabel {
    fn from(s: String) -> Self {
        VariantLabel::from(s.as_str())
    }
}

impl From<VariantLabel> for String {
    fn from(label: VariantLabel) -> Self {
        label.as_str().to_string()
    }
}

/// One voter session, as written by the submission endpoint.
///
/// Scalar fields are read leniently: a number or boolean where a string is
/// expected is kept in its text form instead of failing the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Identifier the voter entered in the web page.
    #[serde(
        rename = "userId",
        default = "default_user_id",
        deserialize_with = "lenient::user_id"
    )]
    pub user_id: String,
    /// Submission time, kept opaque.
    #[serde(default, deserialize_with = "lenient::text")]
    pub timestamp: String,
    /// One ballot per rated product.
    #[serde(default)]
    pub results: Vec<RawBallot>,
}

fn default_user_id() -> String {
    "unknown".to_string()
}

/// A ballot exactly as stored, in any of its historical shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBallot {
    #[serde(rename = "productId", default, deserialize_with = "lenient::text")]
    pub product_id: String,
    #[serde(rename = "productName", default, deserialize_with = "lenient::text")]
    pub product_name: String,
    /// Randomized order the variants were shown in.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub order: Vec<String>,
    /// Multi-select format.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub selections: Option<Vec<String>>,
    /// Read by truthiness, so `1` or `"yes"` count as set.
    #[serde(
        rename = "isNone",
        default,
        deserialize_with = "lenient::truthy",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_none: Option<bool>,
    /// Legacy single-select format.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub selection: Option<String>,
}

impl RawBallot {
    /// Classifies the ballot by which vote fields it carries.
    pub fn shape(&self) -> BallotShape {
        let selections: Vec<VariantLabel> = self
            .selections
            .iter()
            .flatten()
            .map(|s| VariantLabel::from(s.as_str()))
            .collect();
        let is_none = self.is_none.unwrap_or(false);

        if !selections.is_empty() || is_none {
            return BallotShape::Canonical {
                selections,
                is_none,
            };
        }

        match self.selection.as_deref() {
            Some(s) if !s.is_empty() => BallotShape::Legacy(s.to_string()),
            _ => BallotShape::Absent,
        }
    }
}

/// The three on-disk ballot shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallotShape {
    /// `selections` and/or `isNone` carry the vote.
    Canonical {
        selections: Vec<VariantLabel>,
        is_none: bool,
    },
    /// Only the scalar `selection` field is set.
    Legacy(String),
    /// No vote signal at all.
    Absent,
}

impl BallotShape {
    /// Resolves the shape to the vote it casts, if any.
    ///
    /// A canonical ballot flagged `isNone` is a "none" vote even when it
    /// also lists selections.
    pub fn vote(self) -> Option<Vote> {
        match self {
            BallotShape::Canonical { is_none: true, .. } => Some(Vote::None),
            BallotShape::Canonical { selections, .. } if !selections.is_empty() => {
                Some(Vote::Selections(selections))
            }
            BallotShape::Canonical { .. } => None,
            BallotShape::Legacy(s) if s == "none" => Some(Vote::None),
            BallotShape::Legacy(s) => Some(Vote::Selections(vec![VariantLabel::from(s)])),
            BallotShape::Absent => None,
        }
    }
}

/// A decisive vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vote {
    /// Rejected all variants shown.
    None,
    /// One or more preferred variants, in ballot order.
    Selections(Vec<VariantLabel>),
}

impl Vote {
    /// The tally buckets this vote increments, once each.
    pub fn labels(&self) -> Vec<VariantLabel> {
        match self {
            Vote::None => vec![VariantLabel::None],
            Vote::Selections(labels) => labels.clone(),
        }
    }

    /// Raw labels of the selected variants; empty for a "none" vote.
    pub fn selections(&self) -> &[VariantLabel] {
        match self {
            Vote::None => &[],
            Vote::Selections(labels) => labels,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Vote::None)
    }

    /// Display names joined with `|`, or the "none" name.
    pub fn selection_names(&self) -> String {
        match self {
            Vote::None => VariantLabel::None.display_name().to_string(),
            Vote::Selections(labels) => labels
                .iter()
                .map(|l| l.display_name())
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

/// Best-effort field readers for hand-edited or older submission files.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Text form of a scalar; `None` for null.
    fn scalar_text(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(&Value::deserialize(d)?))
    }

    pub fn user_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(&Value::deserialize(d)?).unwrap_or_else(super::default_user_id))
    }

    /// Array items in text form; anything else is `None`.
    pub fn opt_text_list<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        match Value::deserialize(d)? {
            Value::Array(items) => Ok(Some(items.iter().filter_map(scalar_text).collect())),
            _ => Ok(None),
        }
    }

    pub fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(opt_text_list(d)?.unwrap_or_default())
    }

    pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        let set = match Value::deserialize(d)? {
            Value::Null => return Ok(None),
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        };
        Ok(Some(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot() -> RawBallot {
        RawBallot {
            product_id: "01".to_string(),
            product_name: "Linen shirt".to_string(),
            order: vec!["simple".to_string(), "extended".to_string()],
            ..RawBallot::default()
        }
    }

    #[test]
    fn test_label_round_trip_names() {
        for label in VariantLabel::KNOWN.iter() {
            assert_eq!(&VariantLabel::from(label.as_str()), label);
        }
        assert_eq!(
            VariantLabel::from("mystery"),
            VariantLabel::Other("mystery".to_string())
        );
        assert_eq!(VariantLabel::Other("mystery".to_string()).display_name(), "mystery");
        assert_eq!(VariantLabel::NoReferenceModel.display_name(), "不垫图版模特");
    }

    #[test]
    fn test_canonical_selections() {
        let mut b = ballot();
        b.selections = Some(vec!["simple".to_string(), "extended".to_string()]);
        b.is_none = Some(false);

        assert_eq!(
            b.shape().vote(),
            Some(Vote::Selections(vec![
                VariantLabel::Simple,
                VariantLabel::Extended
            ]))
        );
    }

    #[test]
    fn test_none_wins_over_selections() {
        let mut b = ballot();
        b.selections = Some(vec!["simple".to_string()]);
        b.is_none = Some(true);

        assert_eq!(b.shape().vote(), Some(Vote::None));
    }

    #[test]
    fn test_legacy_selection() {
        let mut b = ballot();
        b.selection = Some("no_reference".to_string());
        assert_eq!(b.shape(), BallotShape::Legacy("no_reference".to_string()));
        assert_eq!(
            b.shape().vote(),
            Some(Vote::Selections(vec![VariantLabel::NoReference]))
        );

        b.selection = Some("none".to_string());
        assert_eq!(b.shape().vote(), Some(Vote::None));
    }

    #[test]
    fn test_empty_canonical_falls_back_to_legacy() {
        let mut b = ballot();
        b.selections = Some(vec![]);
        b.is_none = Some(false);
        b.selection = Some("extended".to_string());

        assert_eq!(
            b.shape().vote(),
            Some(Vote::Selections(vec![VariantLabel::Extended]))
        );
    }

    #[test]
    fn test_absent_ballot_has_no_vote() {
        let mut b = ballot();
        assert_eq!(b.shape(), BallotShape::Absent);
        assert_eq!(b.shape().vote(), None);

        b.selection = Some(String::new());
        assert_eq!(b.shape().vote(), None);
    }

    #[test]
    fn test_vote_selection_names() {
        let v = Vote::Selections(vec![VariantLabel::Simple, VariantLabel::NoReference]);
        assert_eq!(v.selection_names(), "简单版|不垫图版");
        assert_eq!(Vote::None.selection_names(), "都不满意");
        assert_eq!(Vote::None.labels(), vec![VariantLabel::None]);
        assert!(Vote::None.selections().is_empty());
    }

    #[test]
    fn test_parse_submission() {
        let json = r#"{
            "userId": "u1",
            "timestamp": "2025-01-08T10:00:00Z",
            "results": [
                {"productId": "01", "productName": "衬衫", "order": ["extended", "simple"],
                 "selections": ["simple"], "isNone": false},
                {"productId": "02", "productName": "外套", "selection": "none"},
                {"productId": "03"}
            ]
        }"#;

        let s: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(s.user_id, "u1");
        assert_eq!(s.results.len(), 3);
        assert_eq!(s.results[0].order, vec!["extended", "simple"]);
        assert_eq!(s.results[1].shape().vote(), Some(Vote::None));
        assert_eq!(s.results[2].shape(), BallotShape::Absent);
    }

    #[test]
    fn test_missing_user_id_defaults() {
        let s: Submission = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(s.user_id, "unknown");
        assert_eq!(s.timestamp, "");
    }

    #[test]
    fn test_off_type_fields_are_read_as_text() {
        let json = r#"{
            "userId": 42,
            "timestamp": null,
            "results": [
                {"productId": 1, "productName": "衬衫", "order": ["simple", 7],
                 "selections": ["extended"], "isNone": 0},
                {"productId": "02", "selections": "simple", "selection": "none"},
                {"productId": 3, "selections": [], "isNone": "yes"}
            ]
        }"#;

        let s: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(s.user_id, "42");
        assert_eq!(s.timestamp, "");
        assert_eq!(s.results[0].product_id, "1");
        assert_eq!(s.results[0].order, vec!["simple", "7"]);
        assert_eq!(
            s.results[0].shape().vote(),
            Some(Vote::Selections(vec![VariantLabel::Extended]))
        );
        // A non-list `selections` falls back to the legacy field
        assert_eq!(s.results[1].selections, None);
        assert_eq!(s.results[1].shape().vote(), Some(Vote::None));
        assert_eq!(s.results[2].is_none, Some(true));
        assert_eq!(s.results[2].shape().vote(), Some(Vote::None));
    }

    #[test]
    fn test_null_user_id_defaults() {
        let s: Submission = serde_json::from_str(r#"{"userId": null}"#).unwrap();
        assert_eq!(s.user_id, "unknown");
    }
}
