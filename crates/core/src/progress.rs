//! Course progress engine.
//!
//! Pure functions over enrollment state: aggregate completion, the linear
//! chapter-unlock rule, and the completion transition. Nothing here performs
//! I/O; callers load and persist records through the storage layer.
//!
//! Chapters unlock strictly in order. Chapter `0` is always open and chapter
//! `i` opens once chapter `i - 1` is completed, so the unlock frontier only
//! ever moves forward.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ChapterProgress, Course, EnrollmentRecord, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("chapter index {index} is out of range for {len} chapters")]
    InvalidArgument { index: usize, len: usize },

    #[error("chapter not found in enrollment: {name}")]
    NotFound { name: String },
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Aggregate completion of a chapter list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub completed_count: usize,
    pub total_count: usize,
    /// `completed_count / total_count`, or `0.0` for an empty list.
    pub fraction: f64,
}

impl ProgressSummary {
    /// True once every chapter of a non-empty course is done.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completed_count == self.total_count
    }

    /// Whole-number percentage for display, rounded to nearest.
    ///
    /// Only a complete course reports `100`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        let rounded = (self.fraction * 100.0).round().clamp(0.0, 100.0) as u8;
        if self.is_complete() {
            100
        } else {
            rounded.min(99)
        }
    }
}

/// Display state of a single chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterState {
    Completed,
    Unlocked,
    Locked,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Count completed chapters and compute the completed fraction.
#[must_use]
pub fn compute_progress(chapters: &[ChapterProgress]) -> ProgressSummary {
    let completed_count = chapters.iter().filter(|c| c.is_completed()).count();
    let total_count = chapters.len();

    #[allow(clippy::cast_precision_loss)]
    let fraction = if total_count > 0 {
        completed_count as f64 / total_count as f64
    } else {
        0.0
    };

    ProgressSummary {
        completed_count,
        total_count,
        fraction,
    }
}

/// Whether the chapter at `index` may be opened.
///
/// # Errors
///
/// Returns `ProgressError::InvalidArgument` if `index` is out of bounds.
pub fn is_chapter_unlocked(chapters: &[ChapterProgress], index: usize) -> Result<bool, ProgressError> {
    if index >= chapters.len() {
        return Err(ProgressError::InvalidArgument {
            index,
            len: chapters.len(),
        });
    }
    if index == 0 {
        return Ok(true);
    }
    Ok(chapters[index - 1].is_completed())
}

/// Return a copy of `record` with the chapter named `chapter_name` completed.
///
/// Completing an already-completed chapter yields an equal record.
///
/// # Errors
///
/// Returns `ProgressError::NotFound` if no chapter has that name. `record` is
/// left untouched either way.
pub fn apply_completion(
    record: &EnrollmentRecord,
    chapter_name: &str,
) -> Result<EnrollmentRecord, ProgressError> {
    let position = record
        .chapters()
        .iter()
        .position(|c| c.name() == chapter_name)
        .ok_or_else(|| ProgressError::NotFound {
            name: chapter_name.to_owned(),
        })?;

    let mut updated = record.clone();
    updated.chapters_mut()[position].mark_completed();
    Ok(updated)
}

/// Resolve the enrollment to show for `course`.
///
/// A persisted record always wins. Without one, a fresh record is built from
/// the catalog definition with every chapter incomplete and `enrolled_at = now`.
#[must_use]
pub fn merge_or_initialize(
    course: &Course,
    existing: Option<EnrollmentRecord>,
    user_id: UserId,
    now: DateTime<Utc>,
) -> EnrollmentRecord {
    match existing {
        Some(record) => record,
        None => EnrollmentRecord::from_course(course, user_id, now),
    }
}

/// Index of the furthest chapter that is currently unlocked, i.e. the last
/// index for which `is_chapter_unlocked` holds.
///
/// Returns `0` for an empty list.
#[must_use]
pub fn unlock_frontier(chapters: &[ChapterProgress]) -> usize {
    (1..chapters.len())
        .rev()
        .find(|&i| chapters[i - 1].is_completed())
        .unwrap_or(0)
}

/// First chapter still to be finished, if any.
#[must_use]
pub fn next_chapter(chapters: &[ChapterProgress]) -> Option<usize> {
    chapters.iter().position(|c| !c.is_completed())
}

/// Per-chapter display state, in chapter order.
#[must_use]
pub fn chapter_states(chapters: &[ChapterProgress]) -> Vec<ChapterState> {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            if chapter.is_completed() {
                ChapterState::Completed
            } else if i == 0 || chapters[i - 1].is_completed() {
                ChapterState::Unlocked
            } else {
                ChapterState::Locked
            }
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterDefinition, CourseTitle, Topic};
    use crate::time::fixed_now;

    fn course(names: &[&str]) -> Course {
        let chapters = names
            .iter()
            .map(|name| {
                let topic = Topic::new(format!("{name} basics"), "", None, None).unwrap();
                ChapterDefinition::new(*name, vec![topic]).unwrap()
            })
            .collect();
        Course::new(
            CourseTitle::new("Rust").unwrap(),
            "systems programming",
            "coding",
            u32::try_from(names.len()).unwrap(),
            chapters,
        )
        .unwrap()
    }

    fn progress(flags: &[bool]) -> Vec<ChapterProgress> {
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| ChapterProgress::new(format!("ch{i}"), *done))
            .collect()
    }

    #[test]
    fn empty_list_has_zero_progress() {
        let summary = compute_progress(&[]);
        assert_eq!(summary.completed_count, 0);
        assert_eq!(summary.total_count, 0);
        assert!(summary.fraction.abs() < f64::EPSILON);
        assert!(!summary.is_complete());
    }

    #[test]
    fn progress_stays_within_bounds() {
        for flags in [
            vec![false],
            vec![true],
            vec![true, false, true],
            vec![true, true, true, true],
        ] {
            let summary = compute_progress(&progress(&flags));
            assert!(summary.completed_count <= summary.total_count);
            assert!((0.0..=1.0).contains(&summary.fraction));
        }
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let summary = compute_progress(&progress(&[true, false, false]));
        assert_eq!(summary.percent(), 33);
        let summary = compute_progress(&progress(&[true, true, false]));
        assert_eq!(summary.percent(), 67);
    }

    #[test]
    fn percent_reaches_hundred_only_when_complete() {
        let mut flags = vec![true; 200];
        flags[199] = false;
        let summary = compute_progress(&progress(&flags));
        assert!(!summary.is_complete());
        assert_eq!(summary.percent(), 99);

        let summary = compute_progress(&progress(&[true; 200]));
        assert_eq!(summary.percent(), 100);
        assert_eq!(compute_progress(&[]).percent(), 0);
    }

    #[test]
    fn first_chapter_is_always_unlocked() {
        assert!(is_chapter_unlocked(&progress(&[false]), 0).unwrap());
        assert!(is_chapter_unlocked(&progress(&[false, false, false]), 0).unwrap());
    }

    #[test]
    fn later_chapters_follow_predecessor() {
        let chapters = progress(&[true, false, true, false]);
        assert!(is_chapter_unlocked(&chapters, 1).unwrap());
        assert!(!is_chapter_unlocked(&chapters, 2).unwrap());
        assert!(is_chapter_unlocked(&chapters, 3).unwrap());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let err = is_chapter_unlocked(&progress(&[true, false]), 2).unwrap_err();
        assert_eq!(err, ProgressError::InvalidArgument { index: 2, len: 2 });
        assert!(is_chapter_unlocked(&[], 0).is_err());
    }

    #[test]
    fn completion_is_idempotent_and_local() {
        let course = course(&["Intro", "Loops", "Functions"]);
        let record = merge_or_initialize(&course, None, UserId::generate(), fixed_now());

        let once = apply_completion(&record, "Loops").unwrap();
        let twice = apply_completion(&once, "Loops").unwrap();
        assert_eq!(once, twice);

        let names: Vec<_> = once.chapters().iter().map(ChapterProgress::name).collect();
        assert_eq!(names, ["Intro", "Loops", "Functions"]);
        assert!(!once.chapters()[0].is_completed());
        assert!(once.chapters()[1].is_completed());
        assert!(!once.chapters()[2].is_completed());
        assert_eq!(once.enrolled_at(), record.enrolled_at());
    }

    #[test]
    fn unknown_chapter_is_not_found_and_input_is_unchanged() {
        let course = course(&["Intro"]);
        let record = merge_or_initialize(&course, None, UserId::generate(), fixed_now());
        let before = record.clone();

        let err = apply_completion(&record, "NoSuchChapter").unwrap_err();
        assert_eq!(
            err,
            ProgressError::NotFound {
                name: "NoSuchChapter".into()
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn initialize_starts_with_nothing_completed() {
        let course = course(&["Intro", "Loops"]);
        let user = UserId::generate();
        let record = merge_or_initialize(&course, None, user, fixed_now());

        let summary = compute_progress(record.chapters());
        assert_eq!(summary.total_count, course.chapters().len());
        assert_eq!(summary.completed_count, 0);
        assert_eq!(record.user_id(), user);
        assert_eq!(record.enrolled_at(), fixed_now());
        assert_eq!(record.course_title(), course.title());
    }

    #[test]
    fn existing_record_wins_over_catalog() {
        let course = course(&["Intro", "Loops"]);
        let user = UserId::generate();
        let existing = apply_completion(
            &merge_or_initialize(&course, None, user, fixed_now()),
            "Intro",
        )
        .unwrap();

        let changed_course = self::course(&["Intro", "Loops", "Traits"]);
        let later = fixed_now() + chrono::Duration::days(3);
        let merged = merge_or_initialize(&changed_course, Some(existing.clone()), user, later);
        assert_eq!(merged, existing);
    }

    #[test]
    fn frontier_states_and_resume_point() {
        assert_eq!(unlock_frontier(&[]), 0);
        assert_eq!(next_chapter(&[]), None);

        let chapters = progress(&[true, true, false, false]);
        assert_eq!(unlock_frontier(&chapters), 2);
        assert_eq!(next_chapter(&chapters), Some(2));
        assert_eq!(
            chapter_states(&chapters),
            [
                ChapterState::Completed,
                ChapterState::Completed,
                ChapterState::Unlocked,
                ChapterState::Locked
            ]
        );

        let done = progress(&[true, true]);
        assert_eq!(unlock_frontier(&done), 1);
        assert_eq!(next_chapter(&done), None);
    }

    #[test]
    fn frontier_agrees_with_unlock_rule_out_of_order() {
        let chapters = progress(&[true, false, true, false]);
        let furthest = (0..chapters.len())
            .filter(|&i| is_chapter_unlocked(&chapters, i).unwrap())
            .max()
            .unwrap();
        assert_eq!(unlock_frontier(&chapters), furthest);
        assert_eq!(unlock_frontier(&chapters), 3);
        assert_eq!(
            chapter_states(&chapters)[unlock_frontier(&chapters)],
            ChapterState::Unlocked
        );
        assert_eq!(next_chapter(&chapters), Some(1));

        let gap = progress(&[false, true, false]);
        assert_eq!(unlock_frontier(&gap), 2);
        assert!(is_chapter_unlocked(&gap, 2).unwrap());
    }

    #[test]
    fn walk_through_three_chapters() {
        let course = course(&["Intro", "Loops", "Functions"]);
        let record = merge_or_initialize(&course, None, UserId::generate(), fixed_now());
        assert_eq!(record.chapters().len(), 3);
        assert!(record.chapters().iter().all(|c| !c.is_completed()));
        assert!(compute_progress(record.chapters()).fraction.abs() < f64::EPSILON);

        let record = apply_completion(&record, "Intro").unwrap();
        let summary = compute_progress(record.chapters());
        assert!((summary.fraction - 1.0 / 3.0).abs() < 1e-9);
        assert!(is_chapter_unlocked(record.chapters(), 1).unwrap());
        assert!(!is_chapter_unlocked(record.chapters(), 2).unwrap());

        let record = apply_completion(&record, "Loops").unwrap();
        let summary = compute_progress(record.chapters());
        assert!((summary.fraction - 2.0 / 3.0).abs() < 1e-9);
        assert!(is_chapter_unlocked(record.chapters(), 2).unwrap());

        let record = apply_completion(&record, "Functions").unwrap();
        let summary = compute_progress(record.chapters());
        assert!((summary.fraction - 1.0).abs() < f64::EPSILON);
        assert!(summary.is_complete());
    }
}
