//! The tooth chart snapshot: one point-in-time observation of the mouth.
//!
//! A chart is a sparse mapping from tooth position to recorded state. Omission
//! means "no observation recorded" (condition code `9`); the [`ToothChart::normalize`]
//! step makes that default explicit when a total view over all 32 positions is
//! needed.
//!
//! Each tooth's value is an open attribute set, not a bare code: the primary
//! condition lives under the `code` attribute and optional surface-level
//! annotations live in a named-attribute map. Charting schemes that record
//! several concurrent findings per tooth therefore fit without a breaking
//! change, and the diff engine compares per attribute.

use super::condition::Condition;
use super::tooth::ToothId;
use std::collections::BTreeMap;

/// The recorded state of a single tooth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToothState {
    code: Condition,
    surfaces: BTreeMap<String, String>,
}

impl ToothState {
    /// A state consisting only of a primary condition.
    pub fn of(code: Condition) -> Self {
        Self {
            code,
            surfaces: BTreeMap::new(),
        }
    }

    /// Adds a named surface annotation (e.g. `"oclusal" -> "1"`).
    pub fn with_surface(mut self, surface: impl Into<String>, value: impl Into<String>) -> Self {
        self.surfaces.insert(surface.into(), value.into());
        self
    }

    /// The primary condition.
    pub fn code(&self) -> Condition {
        self.code
    }

    /// The surface annotations, ordered by name.
    pub fn surfaces(&self) -> &BTreeMap<String, String> {
        &self.surfaces
    }

    /// All attributes of this state as `(field, value)` pairs: the `code`
    /// attribute first, then surfaces in ascending name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once(("code", self.code.code()))
            .chain(self.surfaces.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl From<Condition> for ToothState {
    fn from(code: Condition) -> Self {
        ToothState::of(code)
    }
}

// On the wire a tooth's state is either a bare condition token ("1") or an
// object with the condition and surface annotations. The bare form is what
// clinicians' charts use for the common single-code case.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum ToothStateRepr {
    Code(Condition),
    Full {
        code: Condition,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        surfaces: BTreeMap<String, String>,
    },
}

impl serde::Serialize for ToothState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let repr = if self.surfaces.is_empty() {
            ToothStateRepr::Code(self.code)
        } else {
            ToothStateRepr::Full {
                code: self.code,
                surfaces: self.surfaces.clone(),
            }
        };
        repr.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ToothState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = ToothStateRepr::deserialize(deserializer)?;
        Ok(match repr {
            ToothStateRepr::Code(code) => ToothState::of(code),
            ToothStateRepr::Full { code, surfaces } => ToothState { code, surfaces },
        })
    }
}

/// A sparse odontogram snapshot: tooth position to recorded state.
///
/// Positions absent from the map carry the implicit default
/// [`Condition::Unrecorded`]. The map is keyed by the closed [`ToothId`] enum,
/// so out-of-universe identifiers are rejected during deserialization rather
/// than silently carried.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ToothChart(BTreeMap<ToothId, ToothState>);

impl ToothChart {
    /// An empty chart (every tooth implicitly unrecorded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state of one tooth, replacing any previous state.
    pub fn set(&mut self, tooth: ToothId, state: impl Into<ToothState>) {
        self.0.insert(tooth, state.into());
    }

    /// The recorded state for a tooth, if any observation exists.
    pub fn get(&self, tooth: ToothId) -> Option<&ToothState> {
        self.0.get(&tooth)
    }

    /// Number of explicitly recorded teeth.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded entries in ascending tooth order.
    pub fn iter(&self) -> impl Iterator<Item = (ToothId, &ToothState)> {
        self.0.iter().map(|(t, s)| (*t, s))
    }

    /// Returns a total view covering every position of the 32-tooth universe,
    /// filling unrecorded positions with [`Condition::Unrecorded`].
    ///
    /// Total function: never fails, always exactly 32 entries.
    pub fn normalize(&self) -> BTreeMap<ToothId, ToothState> {
        ToothId::ALL
            .iter()
            .map(|tooth| {
                let state = self
                    .0
                    .get(tooth)
                    .cloned()
                    .unwrap_or_else(|| ToothState::of(Condition::Unrecorded));
                (*tooth, state)
            })
            .collect()
    }

    /// The clinically meaningful observations: every recorded tooth whose code
    /// is not [`Condition::Unrecorded`], in ascending tooth order.
    ///
    /// Code `0` (sano) counts as a finding — only `9` means "unset".
    pub fn findings(&self) -> Vec<(ToothId, &ToothState)> {
        self.0
            .iter()
            .filter(|(_, state)| state.code() != Condition::Unrecorded)
            .map(|(t, s)| (*t, s))
            .collect()
    }

    /// Groups findings by shared condition code for report presentation.
    ///
    /// Groups are ordered by the fixed clinical-severity priority (see
    /// [`Condition::severity_rank`]); teeth within a group ascend numerically.
    pub fn group_by_code(findings: &[(ToothId, &ToothState)]) -> Vec<(Condition, Vec<ToothId>)> {
        let mut groups: BTreeMap<Condition, Vec<ToothId>> = BTreeMap::new();
        for (tooth, state) in findings {
            groups.entry(state.code()).or_default().push(*tooth);
        }

        let mut ordered: Vec<(Condition, Vec<ToothId>)> = groups
            .into_iter()
            .map(|(code, mut teeth)| {
                teeth.sort();
                teeth.dedup();
                (code, teeth)
            })
            .collect();
        ordered.sort_by_key(|(code, _)| code.severity_rank());
        ordered
    }
}

impl FromIterator<(ToothId, ToothState)> for ToothChart {
    fn from_iter<I: IntoIterator<Item = (ToothId, ToothState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<(ToothId, Condition)> for ToothChart {
    fn from_iter<I: IntoIterator<Item = (ToothId, Condition)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(t, c)| (t, ToothState::of(c)))
                .collect(),
        )
    }
}
