//! Timetable grid reconstruction.
//!
//! Rebuilds a day × slot grid from persisted assignments for rendering.
//! Every placed session gets exactly one `Anchor` cell at its own start
//! slot, with `row_span` covering its duration. Slots with no session
//! starting in them are `Covered` by the nearest anchor above whose block
//! reaches them, or `Empty`. Double-bookings are kept and listed in
//! `conflicts`, never deduplicated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{ClockTime, Weekday};
use crate::time_config::TimeConfig;
use crate::time_grid::{Slot, SlotGrid};
use crate::types::{DbId, SlotIndex};

/// Display palette. Chosen per course code, see [`course_color`].
pub const PALETTE: [&str; 8] = [
    "blue", "green", "purple", "orange", "pink", "teal", "indigo", "amber",
];

/// Which entity the grid is filtered by. Decides which names each entry shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridView {
    Batch,
    Faculty,
    Room,
    /// Unfiltered, whole-schedule view.
    Schedule,
}

/// A persisted assignment joined with the names the grid displays.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAssignment {
    pub id: DbId,
    pub day: Weekday,
    pub slot_index: SlotIndex,
    pub duration: u32,
    pub course_code: String,
    pub course_name: String,
    /// Stored display times; compared against the derived grid.
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub faculty_name: String,
    pub room_name: String,
    pub batch_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridEntry {
    pub assignment_id: DbId,
    pub course_code: String,
    pub course_name: String,
    pub duration: u32,
    /// Derived from the current time configuration.
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub color: &'static str,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridCell {
    Empty,
    /// Start of one or more sessions. Rendered with full detail, even when
    /// it lies inside an earlier block (that overlap is a conflict).
    Anchor {
        /// Longest duration among `entries`.
        row_span: u32,
        entries: Vec<GridEntry>,
    },
    /// Inside the block anchored at `anchor_slot`; not rendered on its own.
    /// `anchor_slot` is always an `Anchor` cell of the same day.
    Covered { anchor_slot: SlotIndex },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub slot: Slot,
    /// One cell per grid day, in day order.
    pub cells: Vec<GridCell>,
}

/// An instant occupied by more than one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub day: Weekday,
    pub slot_index: SlotIndex,
    pub assignment_ids: Vec<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableGrid {
    pub view: GridView,
    pub days: Vec<Weekday>,
    pub rows: Vec<GridRow>,
    pub conflicts: Vec<Conflict>,
    /// Assignments whose day or slot range is not part of the grid.
    pub unplaced: Vec<DbId>,
    /// Assignments whose stored times disagree with the derived grid.
    pub stale: Vec<DbId>,
}

impl TimetableGrid {
    pub fn cell(&self, day: Weekday, slot_index: SlotIndex) -> Option<&GridCell> {
        let col = self.days.iter().position(|d| *d == day)?;
        self.rows.get(slot_index as usize)?.cells.get(col)
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Deterministic palette colour for a course code (FNV-1a over its bytes).
pub fn course_color(course_code: &str) -> &'static str {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in course_code.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    PALETTE[(hash as usize) % PALETTE.len()]
}

fn labels_for(view: GridView, a: &GridAssignment) -> Vec<String> {
    let mut labels = Vec::with_capacity(3);
    if view != GridView::Faculty {
        labels.push(a.faculty_name.clone());
    }
    if view != GridView::Room {
        labels.push(a.room_name.clone());
    }
    if view != GridView::Batch {
        labels.push(a.batch_name.clone());
    }
    labels
}

/// Build the rendering grid for `assignments` under `config`.
pub fn reconstruct(
    config: &TimeConfig,
    view: GridView,
    assignments: &[GridAssignment],
) -> TimetableGrid {
    let grid = SlotGrid::derive(config);
    let slot_count = grid.slots_per_day();

    let mut unplaced = Vec::new();
    let mut stale = Vec::new();
    // (day, anchor slot) -> entries anchored there
    let mut anchored: BTreeMap<(Weekday, SlotIndex), Vec<GridEntry>> = BTreeMap::new();
    // (day, slot) -> ids occupying that instant
    let mut occupancy: BTreeMap<(Weekday, SlotIndex), Vec<DbId>> = BTreeMap::new();

    let mut sorted: Vec<&GridAssignment> = assignments.iter().collect();
    sorted.sort_by_key(|a| (a.day, a.slot_index, a.id));

    for a in sorted {
        let span = if grid.has_day(a.day) {
            grid.span_times(a.slot_index, a.duration)
        } else {
            None
        };
        let Some((start_time, end_time)) = span else {
            unplaced.push(a.id);
            continue;
        };
        if (a.start_time, a.end_time) != (start_time, end_time) {
            stale.push(a.id);
        }

        for offset in 0..a.duration {
            occupancy
                .entry((a.day, a.slot_index + offset))
                .or_default()
                .push(a.id);
        }

        anchored
            .entry((a.day, a.slot_index))
            .or_default()
            .push(GridEntry {
                assignment_id: a.id,
                course_code: a.course_code.clone(),
                course_name: a.course_name.clone(),
                duration: a.duration,
                start_time,
                end_time,
                color: course_color(&a.course_code),
                labels: labels_for(view, a),
            });
    }

    // Build columns day by day, then transpose into rows.
    let mut columns: Vec<Vec<GridCell>> = Vec::with_capacity(grid.days().len());
    for &day in grid.days() {
        let mut column = Vec::with_capacity(slot_count);
        // (anchor slot, exclusive end) of every block opened so far this day.
        let mut blocks: Vec<(SlotIndex, SlotIndex)> = Vec::new();

        for slot in grid.slots() {
            let here = anchored.remove(&(day, slot.index)).unwrap_or_default();
            if let Some(row_span) = here.iter().map(|e| e.duration).max() {
                blocks.push((slot.index, slot.index + row_span));
                column.push(GridCell::Anchor {
                    row_span,
                    entries: here,
                });
                continue;
            }

            let cover = blocks
                .iter()
                .rev()
                .find(|(_, end)| slot.index < *end)
                .map(|(anchor, _)| *anchor);
            column.push(match cover {
                Some(anchor_slot) => GridCell::Covered { anchor_slot },
                None => GridCell::Empty,
            });
        }
        columns.push(column);
    }

    let mut rows: Vec<GridRow> = grid
        .slots()
        .iter()
        .map(|slot| GridRow {
            slot: *slot,
            cells: Vec::with_capacity(columns.len()),
        })
        .collect();
    for column in columns {
        for (row, cell) in rows.iter_mut().zip(column) {
            row.cells.push(cell);
        }
    }

    let day_order = |d: Weekday| grid.days().iter().position(|x| *x == d);
    let mut conflicts: Vec<Conflict> = occupancy
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((day, slot_index), assignment_ids)| Conflict {
            day,
            slot_index,
            assignment_ids,
        })
        .collect();
    conflicts.sort_by_key(|c| (day_order(c.day), c.slot_index));

    TimetableGrid {
        view,
        days: grid.days().to_vec(),
        rows,
        conflicts,
        unplaced,
        stale,
    }
}
