use chrono::NaiveDateTime;
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::GroupLesson;

const DEFAULT_CALENDAR_NAME: &str = "Planning Viamentor";
const DEFAULT_LESSON_LABEL: &str = "Leçon de groupe";

#[derive(Clone, Default)]
pub struct PlanningExporter;

impl PlanningExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, lessons: &[GroupLesson], calendar_name: Option<&str>) -> Vec<u8> {
        if lessons.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(calendar_name.unwrap_or(DEFAULT_CALENDAR_NAME));

        for lesson in lessons {
            let start = NaiveDateTime::new(lesson.date, lesson.start_time);
            let end = NaiveDateTime::new(lesson.date, lesson.end_time);
            let label = lesson.name.as_deref().unwrap_or(DEFAULT_LESSON_LABEL);

            let mut event = Event::new();
            event.summary(label);
            event.starts(start);
            event.ends(end);
            if let Some(room) = &lesson.room_id {
                event.location(room);
            }
            let instructor = lesson.instructor_id.as_deref().unwrap_or("non assigné");
            event.description(&format!(
                "Moniteur: {instructor}\nInscriptions: {}/{}",
                lesson.enrolled_count, lesson.capacity
            ));
            event.uid(&format!(
                "{}-{}-viamentor-planning",
                start.format("%Y%m%dT%H%M%S"),
                lesson.id
            ));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}
