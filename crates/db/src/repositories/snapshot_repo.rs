//! Loads everything the solver payload needs for one schedule.

use sqlx::PgPool;
use timetable_core::catalog::CourseKind;
use timetable_core::payload::{
    BatchPayload, CoursePayload, DomainSnapshot, FacultyPayload, LabGroupPayload, RoomPayload,
    SectionPayload,
};
use timetable_core::types::DbId;

use crate::decode_error;
use crate::repositories::{BatchRepo, CourseRepo, FacultyRepo, RoomRepo, ScheduleRepo};

/// Assembles a [`DomainSnapshot`] from the catalog tables.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Read the schedule's time configuration and the full catalog.
    ///
    /// Returns `None` if the schedule does not exist. A missing time
    /// configuration is left as `None` in the snapshot for the payload
    /// builder to report. Lab groups are only carried for LAB courses.
    pub async fn load(
        pool: &PgPool,
        schedule_id: DbId,
    ) -> Result<Option<DomainSnapshot>, sqlx::Error> {
        if ScheduleRepo::find_by_id(pool, schedule_id).await?.is_none() {
            return Ok(None);
        }
        let time_config = ScheduleRepo::find_time_config(pool, schedule_id).await?;

        let mut courses = Vec::new();
        for c in CourseRepo::list_with_sections(pool).await? {
            let kind = c.course.kind().map_err(decode_error)?;
            let sections = c
                .sections
                .into_iter()
                .map(|s| SectionPayload {
                    id: s.section.id,
                    name: s.section.name,
                    lab_groups: if kind == CourseKind::Lab {
                        s.lab_groups
                            .into_iter()
                            .map(|g| LabGroupPayload {
                                id: g.id,
                                name: g.name,
                            })
                            .collect()
                    } else {
                        Vec::new()
                    },
                })
                .collect();
            courses.push(CoursePayload {
                id: c.course.id,
                code: c.course.code,
                name: c.course.name,
                kind,
                hours_per_week: c.course.hours_per_week,
                sessions_per_week: c.course.sessions_per_week,
                sections,
            });
        }

        let mut faculty = Vec::new();
        for f in FacultyRepo::list_with_courses(pool).await? {
            faculty.push(FacultyPayload {
                kind: f.faculty.kind().map_err(decode_error)?,
                id: f.faculty.id,
                name: f.faculty.name,
                max_hours: f.faculty.max_hours,
                availability: f.faculty.availability.0,
                qualified_course_ids: f.course_ids,
            });
        }

        let mut rooms = Vec::new();
        for r in RoomRepo::list(pool).await? {
            rooms.push(RoomPayload {
                kind: r.kind().map_err(decode_error)?,
                id: r.id,
                name: r.name,
                capacity: r.capacity,
                availability: r.availability.0,
            });
        }

        let batches = BatchRepo::list_with_sections(pool)
            .await?
            .into_iter()
            .map(|b| BatchPayload {
                id: b.batch.id,
                name: b.batch.name,
                student_count: b.batch.student_count,
                section_ids: b.section_ids,
            })
            .collect();

        Ok(Some(DomainSnapshot {
            schedule_id,
            time_config,
            courses,
            faculty,
            rooms,
            batches,
        }))
    }
}
