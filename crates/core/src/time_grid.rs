//! Time grid derivation.
//!
//! [`derive_slots`] is the single place that turns working hours into
//! indexed slots. Payload building (availability masks) and timetable
//! rendering (display times for stored slot indices) both go through
//! [`SlotGrid`], so the two can never disagree about what index N means.

use serde::Serialize;

use crate::calendar::{ClockTime, Weekday};
use crate::time_config::TimeConfig;
use crate::types::SlotIndex;

/// One teachable slot of a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub index: SlotIndex,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// Derive the ordered slot list for one working day.
///
/// Walks from `start` in steps of `slot_duration`. A step that would
/// overlap `[break_start, break_end)` jumps to `break_end` instead and
/// emits nothing. The walk stops once a full slot no longer fits before
/// `end`; trailing partial slots are dropped. Indices count emitted slots
/// only, starting at 0.
pub fn derive_slots(
    start: ClockTime,
    end: ClockTime,
    slot_duration: u16,
    break_start: ClockTime,
    break_end: ClockTime,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    if slot_duration == 0 {
        return slots;
    }

    let dur = u32::from(slot_duration);
    let end = u32::from(end.minutes());
    let brk_start = u32::from(break_start.minutes());
    let brk_end = u32::from(break_end.minutes());

    let mut t = u32::from(start.minutes());
    let mut index: SlotIndex = 0;

    while t + dur <= end {
        if t < brk_end && t + dur > brk_start {
            t = brk_end;
            continue;
        }
        slots.push(Slot {
            index,
            start_time: ClockTime::from_minutes_unchecked(t as u16),
            end_time: ClockTime::from_minutes_unchecked((t + dur) as u16),
        });
        index += 1;
        t += dur;
    }

    slots
}

/// The derived grid of a [`TimeConfig`]: its days plus the per-day slot list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotGrid {
    days: Vec<Weekday>,
    slots: Vec<Slot>,
}

impl SlotGrid {
    pub fn derive(config: &TimeConfig) -> Self {
        Self {
            days: config.days.clone(),
            slots: derive_slots(
                config.start_time,
                config.end_time,
                config.slot_duration,
                config.break_start,
                config.break_end,
            ),
        }
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots per day.
    pub fn slots_per_day(&self) -> usize {
        self.slots.len()
    }

    /// Number of `(day, slot)` instants in the whole week.
    pub fn instants(&self) -> usize {
        self.days.len() * self.slots.len()
    }

    pub fn has_day(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        self.slots.get(index as usize)
    }

    pub fn contains(&self, index: SlotIndex) -> bool {
        (index as usize) < self.slots.len()
    }

    /// Display times for a session starting at `index` and covering
    /// `duration` consecutive slots.
    ///
    /// Returns `None` if any covered index falls outside the grid or the
    /// duration is zero. A session spanning the break reports the break
    /// as part of its wall-clock range.
    pub fn span_times(&self, index: SlotIndex, duration: u32) -> Option<(ClockTime, ClockTime)> {
        if duration == 0 {
            return None;
        }
        let first = self.slot(index)?;
        let last = self.slot(index.checked_add(duration - 1)?)?;
        Some((first.start_time, last.end_time))
    }

    /// Every slot index of the grid, in order.
    pub fn indices(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.slots.iter().map(|s| s.index)
    }
}
