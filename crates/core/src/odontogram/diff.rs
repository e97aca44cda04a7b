//! Pure comparison of two tooth chart snapshots.
//!
//! The diff engine holds no state and performs no I/O: given two charts it
//! produces the per-tooth, per-attribute change list a clinician reviews when
//! comparing any two recorded versions. The caller chooses the direction;
//! chronological order is not required.

use super::chart::ToothChart;
use super::tooth::ToothId;
use std::collections::{BTreeMap, BTreeSet};

/// One changed attribute on one tooth.
///
/// `from`/`to` are `None` when the attribute is absent on that side (for the
/// `code` attribute this means the tooth is not recorded in that snapshot at
/// all).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChartChange {
    pub tooth: ToothId,
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Computes the attribute-level differences between two charts.
///
/// Only teeth present in at least one chart are considered: an identifier
/// absent from both produces no entry, so two empty charts diff to an empty
/// list. Within a tooth, the attribute universe is the union of both sides'
/// attribute names; a differing value emits one [`ChartChange`].
///
/// Output order is deterministic: ascending tooth identifier, with the `code`
/// attribute before surface attributes and surfaces in ascending name order.
///
/// Deterministic and total: equal inputs (including two references to the same
/// chart) always produce an empty list.
pub fn diff_charts(a: &ToothChart, b: &ToothChart) -> Vec<ChartChange> {
    let teeth: BTreeSet<ToothId> = a
        .iter()
        .map(|(tooth, _)| tooth)
        .chain(b.iter().map(|(tooth, _)| tooth))
        .collect();

    let mut changes = Vec::new();

    for tooth in teeth {
        let left: BTreeMap<&str, &str> = a
            .get(tooth)
            .map(|state| state.attributes().collect())
            .unwrap_or_default();
        let right: BTreeMap<&str, &str> = b
            .get(tooth)
            .map(|state| state.attributes().collect())
            .unwrap_or_default();

        let mut fields: Vec<&str> = left.keys().chain(right.keys()).copied().collect();
        fields.sort_unstable();
        fields.dedup();
        // `code` leads; the remaining attribute names are already ascending.
        if let Some(pos) = fields.iter().position(|f| *f == "code") {
            fields.remove(pos);
            fields.insert(0, "code");
        }

        for field in fields {
            let from = left.get(field).copied();
            let to = right.get(field).copied();
            if from != to {
                changes.push(ChartChange {
                    tooth,
                    field: field.to_owned(),
                    from: from.map(str::to_owned),
                    to: to.map(str::to_owned),
                });
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odontogram::chart::ToothState;
    use crate::odontogram::condition::Condition;
    use ToothId::*;

    fn chart(entries: &[(ToothId, Condition)]) -> ToothChart {
        entries.iter().copied().collect()
    }

    #[test]
    fn detects_a_changed_code() {
        let a = chart(&[(T11, Condition::Caries), (T21, Condition::Healthy)]);
        let b = chart(&[(T11, Condition::Caries), (T21, Condition::FilledWithCaries)]);

        assert_eq!(
            diff_charts(&a, &b),
            vec![ChartChange {
                tooth: T21,
                field: "code".into(),
                from: Some("0".into()),
                to: Some("2".into()),
            }]
        );
    }

    #[test]
    fn empty_charts_diff_to_empty() {
        assert_eq!(diff_charts(&ToothChart::new(), &ToothChart::new()), vec![]);
    }

    #[test]
    fn tooth_absent_on_one_side_diffs_against_null() {
        let a = chart(&[(T16, Condition::LostToCaries)]);
        let b = ToothChart::new();

        assert_eq!(
            diff_charts(&a, &b),
            vec![ChartChange {
                tooth: T16,
                field: "code".into(),
                from: Some("4".into()),
                to: None,
            }]
        );
    }

    #[test]
    fn identical_charts_diff_to_empty() {
        let a = chart(&[(T11, Condition::Caries), (T48, Condition::Trauma)]);
        assert_eq!(diff_charts(&a, &a), vec![]);
        assert_eq!(diff_charts(&a, &a.clone()), vec![]);
    }

    #[test]
    fn diff_is_nonempty_iff_charts_differ() {
        let a = chart(&[(T11, Condition::Caries)]);
        let b = chart(&[(T11, Condition::Caries)]);
        let c = chart(&[(T11, Condition::FilledSound)]);

        assert!(diff_charts(&a, &b).is_empty());
        assert!(!diff_charts(&a, &c).is_empty());
    }

    #[test]
    fn reversed_diff_swaps_from_and_to() {
        let a = chart(&[
            (T11, Condition::Caries),
            (T21, Condition::Healthy),
            (T31, Condition::Trauma),
        ]);
        let b = chart(&[(T11, Condition::FilledSound), (T21, Condition::Healthy)]);

        let forward = diff_charts(&a, &b);
        let backward = diff_charts(&b, &a);

        assert_eq!(forward.len(), backward.len());

        let forward_teeth: BTreeSet<ToothId> = forward.iter().map(|c| c.tooth).collect();
        let backward_teeth: BTreeSet<ToothId> = backward.iter().map(|c| c.tooth).collect();
        assert_eq!(forward_teeth, backward_teeth);

        for change in &forward {
            let mirrored = backward
                .iter()
                .find(|c| c.tooth == change.tooth && c.field == change.field)
                .expect("every change has a mirror");
            assert_eq!(mirrored.from, change.to);
            assert_eq!(mirrored.to, change.from);
        }
    }

    #[test]
    fn changes_are_ordered_by_ascending_tooth() {
        let a = chart(&[
            (T48, Condition::Caries),
            (T11, Condition::Caries),
            (T21, Condition::Caries),
        ]);
        let b = ToothChart::new();

        let teeth: Vec<ToothId> = diff_charts(&a, &b).iter().map(|c| c.tooth).collect();
        assert_eq!(teeth, vec![T11, T21, T48]);
    }

    #[test]
    fn surface_attributes_diff_independently_of_the_code() {
        let mut a = ToothChart::new();
        a.set(
            T16,
            ToothState::of(Condition::Caries).with_surface("oclusal", "leve"),
        );
        let mut b = ToothChart::new();
        b.set(
            T16,
            ToothState::of(Condition::Caries).with_surface("oclusal", "profunda"),
        );

        assert_eq!(
            diff_charts(&a, &b),
            vec![ChartChange {
                tooth: T16,
                field: "oclusal".into(),
                from: Some("leve".into()),
                to: Some("profunda".into()),
            }]
        );
    }

    #[test]
    fn code_change_precedes_surface_changes_for_the_same_tooth() {
        let mut a = ToothChart::new();
        a.set(
            T16,
            ToothState::of(Condition::Caries).with_surface("oclusal", "leve"),
        );
        let b = chart(&[(T16, Condition::FilledSound)]);

        let fields: Vec<String> = diff_charts(&a, &b).iter().map(|c| c.field.clone()).collect();
        assert_eq!(fields, vec!["code".to_owned(), "oclusal".to_owned()]);
    }

    #[test]
    fn unrecorded_code_differs_from_absent_tooth() {
        // An explicit 9 is an attribute value; an absent tooth has no
        // attributes. The diff reflects that distinction.
        let a = chart(&[(T11, Condition::Unrecorded)]);
        let b = ToothChart::new();

        assert_eq!(
            diff_charts(&a, &b),
            vec![ChartChange {
                tooth: T11,
                field: "code".into(),
                from: Some("9".into()),
                to: None,
            }]
        );
    }
}
