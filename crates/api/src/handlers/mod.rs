pub mod batch;
pub mod course;
pub mod faculty;
pub mod room;
pub mod schedule;
pub mod solve;
pub mod timetable;

use timetable_core::error::CoreError;
use timetable_core::time_grid::SlotGrid;
use timetable_core::types::DbId;
use timetable_db::repositories::ScheduleRepo;
use timetable_db::DbPool;

use crate::error::{AppError, AppResult};

/// Slot grid of a schedule's time configuration.
///
/// 404 when the schedule or its time configuration is missing.
pub(crate) async fn schedule_grid(pool: &DbPool, schedule_id: DbId) -> AppResult<SlotGrid> {
    let config = ScheduleRepo::find_time_config(pool, schedule_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimeConfig",
            id: schedule_id,
        }))?;
    Ok(SlotGrid::derive(&config))
}

/// 404 for `entity` unless `found`.
pub(crate) fn found_or_404(found: bool, entity: &'static str, id: DbId) -> AppResult<()> {
    if found {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound { entity, id }))
    }
}
