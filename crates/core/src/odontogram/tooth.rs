//! The fixed universe of adult tooth positions.
//!
//! Teeth are identified by FDI two-digit notation: a quadrant digit (1-4) and a
//! position-in-quadrant digit (1-8), e.g. `11` is the upper right central
//! incisor and `48` the lower right third molar. The universe is closed: there
//! are exactly 32 adult positions, so the identifier is a closed enum rather
//! than a validated string. Out-of-universe identifiers cannot be represented
//! and are rejected wherever charts are deserialised.

use crate::error::{RecordError, RecordResult};
use std::fmt;
use std::str::FromStr;

macro_rules! tooth_ids {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// One of the 32 adult tooth positions in FDI notation.
        ///
        /// Variants are declared in ascending FDI order, so the derived `Ord`
        /// sorts tooth identifiers numerically (`11` < `12` < … < `48`).
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ToothId {
            $($variant),+
        }

        impl ToothId {
            /// All 32 positions in ascending FDI order.
            pub const ALL: [ToothId; 32] = [$(ToothId::$variant),+];

            /// The two-digit FDI token for this position.
            pub const fn code(self) -> &'static str {
                match self {
                    $(ToothId::$variant => $code),+
                }
            }
        }

        impl FromStr for ToothId {
            type Err = RecordError;

            fn from_str(s: &str) -> RecordResult<Self> {
                match s {
                    $($code => Ok(ToothId::$variant),)+
                    other => Err(RecordError::InvalidInput(format!(
                        "unknown tooth identifier: '{}'",
                        other
                    ))),
                }
            }
        }
    };
}

tooth_ids! {
    T11 => "11", T12 => "12", T13 => "13", T14 => "14",
    T15 => "15", T16 => "16", T17 => "17", T18 => "18",
    T21 => "21", T22 => "22", T23 => "23", T24 => "24",
    T25 => "25", T26 => "26", T27 => "27", T28 => "28",
    T31 => "31", T32 => "32", T33 => "33", T34 => "34",
    T35 => "35", T36 => "36", T37 => "37", T38 => "38",
    T41 => "41", T42 => "42", T43 => "43", T44 => "44",
    T45 => "45", T46 => "46", T47 => "47", T48 => "48",
}

impl ToothId {
    /// The FDI quadrant digit (1-4).
    pub fn quadrant(self) -> u8 {
        self.code().as_bytes()[0] - b'0'
    }

    /// The position within the quadrant (1-8).
    pub fn position(self) -> u8 {
        self.code().as_bytes()[1] - b'0'
    }

    /// The upper arch display row, left to right as the clinician faces the
    /// patient: quadrant 1 from the third molar inward, then quadrant 2
    /// outward.
    pub const UPPER_ARCH: [ToothId; 16] = [
        ToothId::T18,
        ToothId::T17,
        ToothId::T16,
        ToothId::T15,
        ToothId::T14,
        ToothId::T13,
        ToothId::T12,
        ToothId::T11,
        ToothId::T21,
        ToothId::T22,
        ToothId::T23,
        ToothId::T24,
        ToothId::T25,
        ToothId::T26,
        ToothId::T27,
        ToothId::T28,
    ];

    /// The lower arch display row, left to right: quadrant 4 from the third
    /// molar inward, then quadrant 3 outward.
    pub const LOWER_ARCH: [ToothId; 16] = [
        ToothId::T48,
        ToothId::T47,
        ToothId::T46,
        ToothId::T45,
        ToothId::T44,
        ToothId::T43,
        ToothId::T42,
        ToothId::T41,
        ToothId::T31,
        ToothId::T32,
        ToothId::T33,
        ToothId::T34,
        ToothId::T35,
        ToothId::T36,
        ToothId::T37,
        ToothId::T38,
    ];
}

impl fmt::Display for ToothId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl serde::Serialize for ToothId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for ToothId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ToothId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_has_exactly_32_positions() {
        assert_eq!(ToothId::ALL.len(), 32);
    }

    #[test]
    fn codes_round_trip_through_from_str() {
        for tooth in ToothId::ALL {
            let parsed: ToothId = tooth.code().parse().unwrap();
            assert_eq!(parsed, tooth);
        }
    }

    #[test]
    fn rejects_out_of_universe_identifiers() {
        for bad in ["10", "19", "49", "51", "85", "1", "111", "xx"] {
            assert!(
                bad.parse::<ToothId>().is_err(),
                "'{bad}' should not parse as a tooth id"
            );
        }
    }

    #[test]
    fn ordering_is_ascending_fdi() {
        assert!(ToothId::T11 < ToothId::T12);
        assert!(ToothId::T18 < ToothId::T21);
        assert!(ToothId::T28 < ToothId::T31);
        assert!(ToothId::T38 < ToothId::T41);

        let mut sorted = ToothId::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, ToothId::ALL.to_vec());
    }

    #[test]
    fn quadrant_and_position_come_from_the_code() {
        assert_eq!(ToothId::T11.quadrant(), 1);
        assert_eq!(ToothId::T11.position(), 1);
        assert_eq!(ToothId::T48.quadrant(), 4);
        assert_eq!(ToothId::T48.position(), 8);
    }

    #[test]
    fn arches_partition_the_universe() {
        let mut teeth: Vec<ToothId> = ToothId::UPPER_ARCH
            .iter()
            .chain(ToothId::LOWER_ARCH.iter())
            .copied()
            .collect();
        teeth.sort();
        teeth.dedup();
        assert_eq!(teeth.len(), 32);
        assert_eq!(ToothId::UPPER_ARCH.len(), 16);
        assert_eq!(ToothId::LOWER_ARCH.len(), 16);
    }

    #[test]
    fn serde_uses_the_fdi_token() {
        let json = serde_json::to_string(&ToothId::T21).unwrap();
        assert_eq!(json, "\"21\"");
        let back: ToothId = serde_json::from_str("\"21\"").unwrap();
        assert_eq!(back, ToothId::T21);
    }
}
