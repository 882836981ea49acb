use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SourceKind {
    Publication => "publication",
    Registry => "registry",
    Label => "label",
    WebSearch => "web_search",
});

str_enum!(EndpointType {
    Primary => "primary",
    Secondary => "secondary",
    Exploratory => "exploratory",
});

str_enum!(ReviewStatus {
    AutoAccepted => "auto_accepted",
    PendingReview => "pending_review",
    UserConfirmed => "user_confirmed",
    UserRejected => "user_rejected",
});

str_enum!(ExtractionStatus {
    Pending => "pending",
    Success => "success",
    Partial => "partial",
    Failed => "failed",
});

str_enum!(SessionStatus {
    Initializing => "initializing",
    Extracting => "extracting",
    ReviewNeeded => "review_needed",
    Complete => "complete",
    Failed => "failed",
});

str_enum!(TrialProvenance {
    Registry => "registry",
    LlmLookup => "llm_lookup",
    LlmWebSearch => "llm_web_search",
});

str_enum!(MatchType {
    Predefined => "predefined",
    Database => "database",
    Thesaurus => "thesaurus",
    Fuzzy => "fuzzy",
    Unmatched => "unmatched",
});

str_enum!(EvidenceLevel {
    Rct => "rct",
    MetaAnalysis => "meta_analysis",
    SystematicReview => "systematic_review",
    Cohort => "cohort",
    CaseControl => "case_control",
    CaseSeries => "case_series",
    CaseReport => "case_report",
    Preclinical => "preclinical",
    Unknown => "unknown",
});

str_enum!(EfficacySignal {
    Strong => "strong",
    Moderate => "moderate",
    Mixed => "mixed",
    Weak => "weak",
    None => "none",
});

str_enum!(Consistency {
    High => "high",
    Moderate => "moderate",
    Low => "low",
    NotAvailable => "n/a",
});

impl EfficacySignal {
    /// Numeric weight used when averaging signals across papers.
    pub fn score(&self) -> f64 {
        match self {
            Self::Strong => 3.0,
            Self::Moderate => 2.0,
            Self::Mixed => 1.5,
            Self::Weak => 1.0,
            Self::None => 0.0,
        }
    }
}

impl ReviewStatus {
    /// Rejected points are excluded from all downstream aggregation.
    pub fn counts_toward_aggregation(&self) -> bool {
        !matches!(self, Self::UserRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn source_kind_roundtrip() {
        for kind in [
            SourceKind::Publication,
            SourceKind::Registry,
            SourceKind::Label,
            SourceKind::WebSearch,
        ] {
            let parsed = SourceKind::from_str(kind.as_str()).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn review_status_roundtrip() {
        for status in [
            ReviewStatus::AutoAccepted,
            ReviewStatus::PendingReview,
            ReviewStatus::UserConfirmed,
            ReviewStatus::UserRejected,
        ] {
            let parsed = ReviewStatus::from_str(status.as_str()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn invalid_enum_value_is_error() {
        assert!(SessionStatus::from_str("running").is_err());
        assert!(EndpointType::from_str("").is_err());
    }

    #[test]
    fn rejected_points_excluded_from_aggregation() {
        assert!(!ReviewStatus::UserRejected.counts_toward_aggregation());
        assert!(ReviewStatus::AutoAccepted.counts_toward_aggregation());
        assert!(ReviewStatus::PendingReview.counts_toward_aggregation());
        assert!(ReviewStatus::UserConfirmed.counts_toward_aggregation());
    }

    #[test]
    fn signal_scores_ordered() {
        assert!(EfficacySignal::Strong.score() > EfficacySignal::Moderate.score());
        assert!(EfficacySignal::Moderate.score() > EfficacySignal::Mixed.score());
        assert!(EfficacySignal::Mixed.score() > EfficacySignal::Weak.score());
        assert_eq!(EfficacySignal::None.score(), 0.0);
    }
}
