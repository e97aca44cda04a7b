//! The closed set of clinical condition codes.
//!
//! Condition tokens are a fixed enumeration, not a dense numeric range: the
//! original charting convention mixes single digits, two-digit codes, and the
//! letter `T`. Unknown tokens are rejected at the ingestion boundary instead
//! of being passed through for display layers to guess at.

use crate::error::{RecordError, RecordResult};
use std::fmt;
use std::str::FromStr;

macro_rules! conditions {
    ($($variant:ident => ($code:literal, $label:literal)),+ $(,)?) => {
        /// A clinical condition recorded against a single tooth.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Condition {
            $($variant),+
        }

        impl Condition {
            /// Every condition in declaration order.
            pub const ALL: [Condition; 18] = [$(Condition::$variant),+];

            /// The chart token for this condition.
            pub const fn code(self) -> &'static str {
                match self {
                    $(Condition::$variant => $code),+
                }
            }

            /// The clinical display label.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Condition::$variant => $label),+
                }
            }
        }

        impl FromStr for Condition {
            type Err = RecordError;

            fn from_str(s: &str) -> RecordResult<Self> {
                match s {
                    $($code => Ok(Condition::$variant),)+
                    other => Err(RecordError::InvalidInput(format!(
                        "unknown condition code: '{}'",
                        other
                    ))),
                }
            }
        }
    };
}

conditions! {
    Healthy => ("0", "sano"),
    Caries => ("1", "caries"),
    FilledWithCaries => ("2", "obturado con caries"),
    FilledSound => ("3", "obturado sin caries"),
    LostToCaries => ("4", "perdido por caries"),
    LostOtherCause => ("5", "perdido otra causa"),
    SealedFissure => ("6", "fisura obturada"),
    CrownOrImplant => ("7", "corona/implante"),
    Unerupted => ("8", "sin erupcionar"),
    Unrecorded => ("9", "no registrado"),
    Trauma => ("T", "traumatismo"),
    GingivalRecession => ("11", "recesion gingival"),
    RootCanalTreatment => ("12", "tratamiento de conductos"),
    SeparatedInstrument => ("13", "instrumento separado"),
    PeriodontalPockets => ("14", "bolsas periodontales"),
    Fluorosis => ("15", "fluorosis"),
    MorphologicalAlteration => ("16", "alteracion morfologica"),
    EndoPeriodontalLesion => ("17", "lesion endoperiodontal"),
}

/// Fixed clinical-severity order used when grouping findings for reports.
///
/// Caries-related and pathological codes come first, cosmetic and neutral
/// codes last. Codes not on this list sort after every listed code, in their
/// declaration order (stable).
const SEVERITY_PRIORITY: [Condition; 18] = [
    Condition::Caries,
    Condition::FilledWithCaries,
    Condition::LostToCaries,
    Condition::EndoPeriodontalLesion,
    Condition::RootCanalTreatment,
    Condition::SeparatedInstrument,
    Condition::PeriodontalPockets,
    Condition::Trauma,
    Condition::GingivalRecession,
    Condition::LostOtherCause,
    Condition::FilledSound,
    Condition::SealedFissure,
    Condition::CrownOrImplant,
    Condition::Fluorosis,
    Condition::MorphologicalAlteration,
    Condition::Unerupted,
    Condition::Healthy,
    Condition::Unrecorded,
];

impl Condition {
    /// Rank of this condition in the severity order; lower sorts first.
    ///
    /// Conditions absent from the priority list rank after every listed one,
    /// offset by their declaration position so the resulting order is stable.
    pub fn severity_rank(self) -> usize {
        SEVERITY_PRIORITY
            .iter()
            .position(|c| *c == self)
            .unwrap_or_else(|| {
                SEVERITY_PRIORITY.len()
                    + Condition::ALL
                        .iter()
                        .position(|c| *c == self)
                        .expect("every condition is declared")
            })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl serde::Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Condition::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_str() {
        for condition in Condition::ALL {
            let parsed: Condition = condition.code().parse().unwrap();
            assert_eq!(parsed, condition);
        }
    }

    #[test]
    fn rejects_unknown_tokens() {
        for bad in ["10", "18", "t", "99", "", "caries"] {
            assert!(
                bad.parse::<Condition>().is_err(),
                "'{bad}' should not parse as a condition"
            );
        }
    }

    #[test]
    fn letter_and_two_digit_codes_are_distinct() {
        // "11" is gingival recession, not two healthy teeth; "T" is trauma.
        assert_eq!("11".parse::<Condition>().unwrap(), Condition::GingivalRecession);
        assert_eq!("T".parse::<Condition>().unwrap(), Condition::Trauma);
    }

    #[test]
    fn severity_puts_pathology_before_neutral_codes() {
        assert!(Condition::Caries.severity_rank() < Condition::Healthy.severity_rank());
        assert!(
            Condition::FilledWithCaries.severity_rank() < Condition::CrownOrImplant.severity_rank()
        );
        assert!(Condition::Healthy.severity_rank() < Condition::Unrecorded.severity_rank());
    }

    #[test]
    fn severity_ranks_are_unique() {
        let mut ranks: Vec<usize> = Condition::ALL.iter().map(|c| c.severity_rank()).collect();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), Condition::ALL.len());
    }

    #[test]
    fn serde_uses_the_chart_token() {
        assert_eq!(serde_json::to_string(&Condition::Trauma).unwrap(), "\"T\"");
        let back: Condition = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(back, Condition::RootCanalTreatment);
    }
}
