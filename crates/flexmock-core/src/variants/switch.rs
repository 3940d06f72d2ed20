//! Revert/apply computation when switching from one variant to another.

use crate::variants::change::ControlChange;
use serde::Serialize;
use std::collections::HashMap;

/// Changes needed to move the control tree from one variant to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariantSwitch {
    /// Materialized changes of the current variant, newest first
    pub revert: Vec<ControlChange>,
    /// Changes of the target variant, in application order
    pub apply: Vec<ControlChange>,
}

impl VariantSwitch {
    /// Compute the switch between two variants' change lists.
    ///
    /// `materialized` maps a control id to the change instances currently applied to it.
    /// Only changes of `current` that are materialized are reverted. The longest common
    /// prefix (by change id) of the current and target lists is neither reverted nor
    /// re-applied.
    pub fn between(
        current: &[ControlChange],
        target: &[ControlChange],
        materialized: &HashMap<String, Vec<ControlChange>>,
    ) -> Self {
        let applied: HashMap<&str, &ControlChange> = materialized
            .values()
            .flatten()
            .map(|change| (change.id(), change))
            .collect();

        let current: Vec<&ControlChange> = current
            .iter()
            .filter_map(|change| applied.get(change.id()).copied())
            .collect();

        let shared = current
            .iter()
            .zip(target)
            .take_while(|(have, want)| have.id() == want.id())
            .count();

        Self {
            revert: current[shared..].iter().rev().map(|c| (*c).clone()).collect(),
            apply: target[shared..].to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.revert.is_empty() && self.apply.is_empty()
    }
}
