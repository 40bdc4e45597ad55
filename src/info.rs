use crate::types::{Delegate, RegionMetadata};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const NO_INFORMATION: &str = "No information available for this state.";
pub const NO_REPRESENTATION: &str =
    "This region had no representation in the Constituent Assembly";
pub const NO_MEMBERS_FOUND: &str = "No members found for this region.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InfoResult {
    /// No metadata entry for the region.
    Unavailable { region: String },
    /// `members == 0`.
    NoRepresentation { region: String, explanation: String },
    /// Members were recorded but none of the legacy provinces has a roster.
    NoMembersFound {
        region: String,
        explanation: String,
        member_count: u32,
        legacy_provinces: Vec<String>,
    },
    Delegates {
        region: String,
        explanation: String,
        member_count: u32,
        legacy_provinces: Vec<String>,
        delegates: Vec<Delegate>,
    },
}

impl InfoResult {
    pub fn region(&self) -> &str {
        match self {
            InfoResult::Unavailable { region }
            | InfoResult::NoRepresentation { region, .. }
            | InfoResult::NoMembersFound { region, .. }
            | InfoResult::Delegates { region, .. } => region.as_str(),
        }
    }

    pub fn explanation(&self) -> Option<&str> {
        match self {
            InfoResult::Unavailable { .. } => None,
            InfoResult::NoRepresentation { explanation, .. }
            | InfoResult::NoMembersFound { explanation, .. }
            | InfoResult::Delegates { explanation, .. } => Some(explanation.as_str()),
        }
    }

    pub fn member_count(&self) -> u32 {
        match self {
            InfoResult::Unavailable { .. } | InfoResult::NoRepresentation { .. } => 0,
            InfoResult::NoMembersFound { member_count, .. }
            | InfoResult::Delegates { member_count, .. } => *member_count,
        }
    }

    pub fn delegates(&self) -> &[Delegate] {
        match self {
            InfoResult::Delegates { delegates, .. } => delegates.as_slice(),
            _ => &[],
        }
    }

    /// User-facing text for the outcomes that have no delegate list.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            InfoResult::Unavailable { .. } => Some(NO_INFORMATION),
            InfoResult::NoRepresentation { .. } => Some(NO_REPRESENTATION),
            InfoResult::NoMembersFound { .. } => Some(NO_MEMBERS_FOUND),
            InfoResult::Delegates { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct InfoAggregator {
    metadata: HashMap<String, RegionMetadata>,
    // Legacy province -> delegates in roster order
    delegates: HashMap<String, Vec<Delegate>>,
}

impl InfoAggregator {
    /// Index both datasets. Later metadata entries replace earlier ones with
    /// the same name.
    pub fn new(states: Vec<RegionMetadata>, members: Vec<Delegate>) -> Self {
        let metadata = states
            .into_iter()
            .map(|state| (state.name.clone(), state))
            .collect();

        let mut delegates: HashMap<String, Vec<Delegate>> = HashMap::new();
        for delegate in members {
            delegates
                .entry(delegate.province.clone())
                .or_default()
                .push(delegate);
        }

        Self { metadata, delegates }
    }

    #[cfg(test)]
    pub(crate) fn metadata(&self, region: &str) -> Option<&RegionMetadata> {
        self.metadata.get(region)
    }

    pub fn info_for(&self, region: &str) -> InfoResult {
        let Some(state) = self.metadata.get(region) else {
            return InfoResult::Unavailable {
                region: region.to_string(),
            };
        };

        if state.members == 0 {
            return InfoResult::NoRepresentation {
                region: region.to_string(),
                explanation: state.explanation.clone(),
            };
        }

        let legacy_provinces = legacy_provinces(&state.old_name);

        let mut combined: Vec<Delegate> = legacy_provinces
            .iter()
            .filter_map(|province| self.delegates.get(province))
            .flatten()
            .cloned()
            .collect();

        if combined.is_empty() {
            return InfoResult::NoMembersFound {
                region: region.to_string(),
                explanation: state.explanation.clone(),
                member_count: state.members,
                legacy_provinces,
            };
        }

        combined.sort_by(|a, b| compare_names(&a.name, &b.name));

        InfoResult::Delegates {
            region: region.to_string(),
            explanation: state.explanation.clone(),
            member_count: state.members,
            legacy_provinces,
            delegates: combined,
        }
    }
}

/// Split `oldName` on commas and trim each token. Empty tokens and
/// duplicates are kept; an empty token simply matches no roster.
pub fn legacy_provinces(old_name: &str) -> Vec<String> {
    old_name.split(',').map(|token| token.trim().to_string()).collect()
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str, members: u32, old_name: &str) -> RegionMetadata {
        RegionMetadata {
            name: name.to_string(),
            explanation: format!("About {name}"),
            members,
            old_name: old_name.to_string(),
        }
    }

    fn delegate(name: &str, province: &str) -> Delegate {
        Delegate {
            name: name.to_string(),
            province: province.to_string(),
            summary: None,
            url: None,
        }
    }

    fn aggregator() -> InfoAggregator {
        InfoAggregator::new(
            vec![
                state("Maharashtra", 21, "Bombay, Hyderabad"),
                state("Kerala", 0, ""),
                state("Telangana", 5, "Nizam"),
                state("Punjab", 12, ""),
            ],
            vec![
                delegate("Zakir Hussain", "Bombay"),
                delegate("B. R. Ambedkar", "Bombay"),
                delegate("M. R. Masani", "Bombay"),
                delegate("Kamaladevi", "Hyderabad"),
                delegate("anand", "Hyderabad"),
                delegate("Somnath", "Madras"),
            ],
        )
    }

    fn names(result: &InfoResult) -> Vec<&str> {
        result.delegates().iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_union_of_legacy_provinces_sorted_by_name() {
        let result = aggregator().info_for("Maharashtra");

        assert_eq!(
            names(&result),
            vec!["anand", "B. R. Ambedkar", "Kamaladevi", "M. R. Masani", "Zakir Hussain"]
        );
        assert_eq!(result.member_count(), 21);
        assert!(result
            .delegates()
            .iter()
            .all(|d| d.province == "Bombay" || d.province == "Hyderabad"));
        match &result {
            InfoResult::Delegates { legacy_provinces, .. } => {
                assert_eq!(legacy_provinces, &vec!["Bombay".to_string(), "Hyderabad".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_zero_members_is_no_representation() {
        let result = aggregator().info_for("Kerala");

        assert!(matches!(result, InfoResult::NoRepresentation { .. }));
        assert!(result.delegates().is_empty());
        assert_eq!(result.notice(), Some(NO_REPRESENTATION));
        assert_eq!(result.explanation(), Some("About Kerala"));
    }

    #[test]
    fn test_zero_members_ignores_matching_roster() {
        let agg = InfoAggregator::new(
            vec![state("Sind", 0, "Bombay")],
            vec![delegate("Someone", "Bombay")],
        );
        let result = agg.info_for("Sind");
        assert!(matches!(result, InfoResult::NoRepresentation { .. }));
        assert!(result.delegates().is_empty());
    }

    #[test]
    fn test_members_without_roster_is_no_members_found() {
        let result = aggregator().info_for("Telangana");

        assert!(matches!(result, InfoResult::NoMembersFound { .. }));
        assert_eq!(result.member_count(), 5);
        assert_eq!(result.notice(), Some(NO_MEMBERS_FOUND));
    }

    #[test]
    fn test_empty_old_name_with_members() {
        let result = aggregator().info_for("Punjab");
        match result {
            InfoResult::NoMembersFound { legacy_provinces, .. } => {
                assert_eq!(legacy_provinces, vec![String::new()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_region_is_placeholder() {
        let result = aggregator().info_for("NoSuchState");

        assert_eq!(
            result,
            InfoResult::Unavailable {
                region: "NoSuchState".to_string()
            }
        );
        assert_eq!(result.notice(), Some(NO_INFORMATION));
        assert_eq!(result.explanation(), None);
    }

    #[test]
    fn test_info_for_is_idempotent() {
        let agg = aggregator();
        let first = agg.info_for("Maharashtra");
        for _ in 0..3 {
            assert_eq!(agg.info_for("Maharashtra"), first);
        }
    }

    #[test]
    fn test_duplicate_legacy_tokens_repeat_delegates() {
        let agg = InfoAggregator::new(
            vec![state("Twice", 2, "Madras,Madras")],
            vec![delegate("Somnath", "Madras")],
        );
        assert_eq!(names(&agg.info_for("Twice")), vec!["Somnath", "Somnath"]);
    }

    #[test]
    fn test_later_metadata_replaces_earlier() {
        let agg = InfoAggregator::new(
            vec![state("Assam", 0, ""), state("Assam", 3, "Assam")],
            vec![delegate("Gopinath", "Assam")],
        );
        assert_eq!(agg.info_for("Assam").member_count(), 3);
    }

    #[test]
    fn test_legacy_provinces_trims_and_keeps_empty_tokens() {
        assert_eq!(legacy_provinces(" Bombay ,Hyderabad,"), vec!["Bombay", "Hyderabad", ""]);
        assert_eq!(legacy_provinces(""), vec![""]);
    }

    #[test]
    fn test_info_result_serializes_with_status_tag() {
        let json = serde_json::to_value(aggregator().info_for("Kerala")).unwrap();
        assert_eq!(json["status"], "no_representation");
        assert_eq!(json["region"], "Kerala");
    }
}
