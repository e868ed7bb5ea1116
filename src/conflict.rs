use chrono::Duration;

use crate::models::{
    Conflict, ConflictResult, GroupLesson, Instructor, Room, Severity, TimeSlot,
};

/// Read-only snapshot a validation call runs against. The checker never
/// mutates it; keeping the snapshot fresh and serializing
/// check-then-commit is the caller's responsibility.
pub struct SlotContext<'a> {
    pub room_id: Option<&'a str>,
    pub instructor_id: Option<&'a str>,
    pub exclude_lesson_ids: &'a [String],
    pub enrollment_count: u32,
    pub max_capacity: u32,
    pub lessons: &'a [GroupLesson],
    pub rooms: &'a [Room],
    pub instructors: &'a [Instructor],
}

pub struct ConflictChecker {
    suggestion_step: Duration,
    suggestion_window_slots: u32,
    suggestion_limit: usize,
}

impl Default for ConflictChecker {
    fn default() -> Self {
        Self::new(30, 4, 3)
    }
}

impl ConflictChecker {
    pub fn new(step_minutes: u32, window_slots: u32, limit: usize) -> Self {
        Self {
            suggestion_step: Duration::minutes(i64::from(step_minutes)),
            suggestion_window_slots: window_slots,
            suggestion_limit: limit,
        }
    }

    /// Evaluates a candidate slot against the snapshot. Pure and
    /// deterministic; identical inputs yield deep-equal results.
    /// Only `error` entries decide `has_conflict`; warnings are
    /// advisory.
    pub fn validate_slot(&self, slot: &TimeSlot, ctx: &SlotContext<'_>) -> ConflictResult {
        let mut conflicts = Vec::new();
        self.collect_overlaps(slot, ctx, &mut conflicts);
        self.collect_capacity(slot, ctx, &mut conflicts);
        self.collect_availability(slot, ctx, &mut conflicts);

        let has_conflict = conflicts.iter().any(|c| c.severity == Severity::Error);
        let suggestions = if has_conflict {
            self.suggest_alternatives(slot, ctx)
        } else {
            Vec::new()
        };

        ConflictResult {
            has_conflict,
            conflicts,
            suggestions,
        }
    }

    fn collect_overlaps(
        &self,
        slot: &TimeSlot,
        ctx: &SlotContext<'_>,
        conflicts: &mut Vec<Conflict>,
    ) {
        for lesson in ctx.lessons {
            if is_excluded(ctx, &lesson.id) || lesson.date != slot.date {
                continue;
            }
            if !overlaps(slot, lesson) {
                continue;
            }
            if let Some(room) = ctx.room_id
                && lesson.room_id.as_deref() == Some(room)
            {
                conflicts.push(Conflict {
                    message: format!(
                        "Salle {room} déjà réservée de {} à {}",
                        lesson.start_time.format("%H:%M"),
                        lesson.end_time.format("%H:%M")
                    ),
                    severity: Severity::Error,
                });
            }
            if let Some(instructor) = ctx.instructor_id
                && lesson.instructor_id.as_deref() == Some(instructor)
            {
                conflicts.push(Conflict {
                    message: format!(
                        "Moniteur {instructor} déjà occupé de {} à {}",
                        lesson.start_time.format("%H:%M"),
                        lesson.end_time.format("%H:%M")
                    ),
                    severity: Severity::Error,
                });
            }
        }
    }

    fn collect_capacity(
        &self,
        slot: &TimeSlot,
        ctx: &SlotContext<'_>,
        conflicts: &mut Vec<Conflict>,
    ) {
        let matching = ctx.lessons.iter().find(|lesson| {
            !is_excluded(ctx, &lesson.id)
                && lesson.date == slot.date
                && lesson.start_time == slot.start_time
                && lesson.end_time == slot.end_time
                && lesson.room_id.as_deref() == ctx.room_id
        });

        let (projected, limit) = match matching {
            Some(lesson) => (lesson.enrolled_count + ctx.enrollment_count, lesson.capacity),
            None => (ctx.enrollment_count, ctx.max_capacity),
        };
        if projected >= limit {
            conflicts.push(Conflict {
                message: format!("Capacité maximale atteinte ({projected}/{limit} places)"),
                severity: Severity::Error,
            });
        }
    }

    fn collect_availability(
        &self,
        slot: &TimeSlot,
        ctx: &SlotContext<'_>,
        conflicts: &mut Vec<Conflict>,
    ) {
        if let Some(room_id) = ctx.room_id
            && let Some(room) = ctx.rooms.iter().find(|r| r.id == room_id)
            && !room.availability.is_empty()
            && !room.availability.iter().any(|w| w.covers(slot))
        {
            conflicts.push(Conflict {
                message: format!("Salle {room_id} en dehors des disponibilités configurées"),
                severity: Severity::Warning,
            });
        }
        if let Some(instructor_id) = ctx.instructor_id
            && let Some(instructor) = ctx.instructors.iter().find(|i| i.id == instructor_id)
            && !instructor.availability.is_empty()
            && !instructor.availability.iter().any(|w| w.covers(slot))
        {
            conflicts.push(Conflict {
                message: format!("Moniteur {instructor_id} en dehors des disponibilités configurées"),
                severity: Severity::Warning,
            });
        }
    }

    /// Scans ± `suggestion_window_slots` steps around the requested
    /// start (later offset first at equal distance) and keeps the first
    /// alternatives that stay within the day and pass the overlap and
    /// capacity rules.
    fn suggest_alternatives(&self, slot: &TimeSlot, ctx: &SlotContext<'_>) -> Vec<String> {
        let duration = slot.end_time - slot.start_time;
        let mut suggestions = Vec::new();

        for step in 1..=self.suggestion_window_slots {
            let offset = self.suggestion_step * step as i32;
            for candidate in [
                shift_slot(slot, offset, duration),
                shift_slot(slot, -offset, duration),
            ]
            .into_iter()
            .flatten()
            {
                if self.blocks(&candidate, ctx) {
                    continue;
                }
                suggestions.push(format!(
                    "Essayez {} à {}",
                    candidate.start_time.format("%H:%M"),
                    candidate.end_time.format("%H:%M")
                ));
                if suggestions.len() == self.suggestion_limit {
                    return suggestions;
                }
            }
        }
        suggestions
    }

    fn blocks(&self, slot: &TimeSlot, ctx: &SlotContext<'_>) -> bool {
        let mut conflicts = Vec::new();
        self.collect_overlaps(slot, ctx, &mut conflicts);
        self.collect_capacity(slot, ctx, &mut conflicts);
        !conflicts.is_empty()
    }
}

// Half-open intervals: a slot ending exactly when another begins does
// not overlap.
fn overlaps(slot: &TimeSlot, lesson: &GroupLesson) -> bool {
    slot.start_time < lesson.end_time && lesson.start_time < slot.end_time
}

fn is_excluded(ctx: &SlotContext<'_>, id: &str) -> bool {
    ctx.exclude_lesson_ids.iter().any(|excluded| excluded == id)
}

fn shift_slot(slot: &TimeSlot, offset: Duration, duration: Duration) -> Option<TimeSlot> {
    let (start, wrapped) = slot.start_time.overflowing_add_signed(offset);
    if wrapped != 0 {
        return None;
    }
    let (end, wrapped) = start.overflowing_add_signed(duration);
    if wrapped != 0 {
        return None;
    }
    Some(TimeSlot {
        date: slot.date,
        start_time: start,
        end_time: end,
    })
}
