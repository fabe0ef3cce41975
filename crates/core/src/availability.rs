//! Per-entity availability: the slot indices, per weekday, during which a
//! faculty member or room may be scheduled.
//!
//! Stored and sent to the solver as `{"MON": [0, 1, 2], ...}`. Each day's
//! set is kept sorted ascending so diffs and renders are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::calendar::Weekday;
use crate::error::CoreError;
use crate::time_grid::SlotGrid;
use crate::types::SlotIndex;

/// Weekday → sorted set of available slot indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Availability(BTreeMap<Weekday, BTreeSet<SlotIndex>>);

impl Availability {
    /// No availability at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every slot of every day in `grid`. The default for new entities.
    pub fn full(grid: &SlotGrid) -> Self {
        let all: BTreeSet<SlotIndex> = grid.indices().collect();
        Self(grid.days().iter().map(|d| (*d, all.clone())).collect())
    }

    /// Every slot of the standard MON–FRI grid.
    pub fn standard() -> Self {
        Self::full(&SlotGrid::derive(&crate::time_config::TimeConfig::standard()))
    }

    pub fn is_available(&self, day: Weekday, index: SlotIndex) -> bool {
        self.0.get(&day).is_some_and(|set| set.contains(&index))
    }

    /// Sorted slot indices for one day (empty if the day is absent).
    pub fn day(&self, day: Weekday) -> Vec<SlotIndex> {
        self.0
            .get(&day)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Total number of available `(day, slot)` instants.
    pub fn count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Flip one slot: present becomes absent, absent becomes present.
    ///
    /// The slot must exist in `grid`. Returns the new membership state.
    pub fn toggle(
        &mut self,
        grid: &SlotGrid,
        day: Weekday,
        index: SlotIndex,
    ) -> Result<bool, CoreError> {
        check_instant(grid, day, index)?;
        let set = self.0.entry(day).or_default();
        let now_available = if set.remove(&index) {
            false
        } else {
            set.insert(index);
            true
        };
        if set.is_empty() {
            self.0.remove(&day);
        }
        Ok(now_available)
    }

    /// Entries that do not correspond to a slot of `grid`.
    pub fn invalid_entries(&self, grid: &SlotGrid) -> Vec<(Weekday, SlotIndex)> {
        self.0
            .iter()
            .flat_map(|(day, set)| set.iter().map(move |idx| (*day, *idx)))
            .filter(|(day, idx)| !grid.has_day(*day) || !grid.contains(*idx))
            .collect()
    }

    /// Reject availability containing any entry outside `grid`.
    pub fn validate_against(&self, grid: &SlotGrid) -> Result<(), CoreError> {
        match self.invalid_entries(grid).first() {
            None => Ok(()),
            Some((day, idx)) => Err(CoreError::Validation(format!(
                "Availability slot {day}/{idx} is not part of the time grid"
            ))),
        }
    }

    /// A copy keeping only entries that exist in `grid`.
    pub fn restricted_to(&self, grid: &SlotGrid) -> Self {
        let mut out = BTreeMap::new();
        for (day, set) in &self.0 {
            if !grid.has_day(*day) {
                continue;
            }
            let kept: BTreeSet<SlotIndex> =
                set.iter().copied().filter(|i| grid.contains(*i)).collect();
            if !kept.is_empty() {
                out.insert(*day, kept);
            }
        }
        Self(out)
    }
}

fn check_instant(grid: &SlotGrid, day: Weekday, index: SlotIndex) -> Result<(), CoreError> {
    if !grid.has_day(day) {
        return Err(CoreError::Validation(format!(
            "{day} is not a teaching day of this time grid"
        )));
    }
    if !grid.contains(index) {
        return Err(CoreError::Validation(format!(
            "Slot index {index} is outside the time grid (0..{})",
            grid.slots_per_day()
        )));
    }
    Ok(())
}
