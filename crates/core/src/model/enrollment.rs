use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::course::{Course, CourseTitle};
use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnrollmentError {
    #[error("enrollment course title cannot be empty")]
    EmptyCourseTitle,

    #[error("enrollment chapter name cannot be empty")]
    EmptyChapterName,

    #[error("duplicate chapter in enrollment: {0}")]
    DuplicateChapter(String),
}

/// Completion flag for one chapter of an enrolled course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterProgress {
    name: String,
    completed: bool,
}

impl ChapterProgress {
    /// The name is trimmed, matching `ChapterDefinition::new`.
    #[must_use]
    pub fn new(name: impl Into<String>, completed: bool) -> Self {
        let name = name.into();
        Self {
            name: name.trim().to_owned(),
            completed,
        }
    }

    /// Chapter that has not been finished yet.
    #[must_use]
    pub fn pending(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }
}

/// Unvalidated enrollment fields as read back from storage.
#[derive(Debug, Clone)]
pub struct EnrollmentDraft {
    pub user_id: UserId,
    pub course_title: String,
    pub description: String,
    pub category: String,
    pub chapter_count: u32,
    pub chapters: Vec<ChapterProgress>,
    pub enrolled_at: DateTime<Utc>,
}

/// A user's personal snapshot of a course and their chapter completion state.
///
/// Keyed by `(user_id, course_title)`. Chapter names and order are copied from the
/// course at enrollment time and never follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRecord {
    user_id: UserId,
    course_title: CourseTitle,
    description: String,
    category: String,
    chapter_count: u32,
    chapters: Vec<ChapterProgress>,
    enrolled_at: DateTime<Utc>,
}

impl EnrollmentRecord {
    /// Copy-on-enroll: every chapter of `course` starts incomplete.
    #[must_use]
    pub fn from_course(course: &Course, user_id: UserId, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_title: course.title().clone(),
            description: course.description().to_owned(),
            category: course.category().to_owned(),
            chapter_count: course.chapter_count(),
            chapters: course
                .chapters()
                .iter()
                .map(|c| ChapterProgress::pending(c.name()))
                .collect(),
            enrolled_at,
        }
    }

    /// Rehydrate a record from persisted fields.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError` if the title is blank or chapter names are blank
    /// or repeated.
    pub fn from_persisted(draft: EnrollmentDraft) -> Result<Self, EnrollmentError> {
        let course_title =
            CourseTitle::new(draft.course_title).map_err(|_| EnrollmentError::EmptyCourseTitle)?;

        let mut seen = HashSet::with_capacity(draft.chapters.len());
        for chapter in &draft.chapters {
            if chapter.name().trim().is_empty() {
                return Err(EnrollmentError::EmptyChapterName);
            }
            if !seen.insert(chapter.name()) {
                return Err(EnrollmentError::DuplicateChapter(chapter.name().to_owned()));
            }
        }

        Ok(Self {
            user_id: draft.user_id,
            course_title,
            description: draft.description,
            category: draft.category,
            chapter_count: draft.chapter_count,
            chapters: draft.chapters,
            enrolled_at: draft.enrolled_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn course_title(&self) -> &CourseTitle {
        &self.course_title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn chapter_count(&self) -> u32 {
        self.chapter_count
    }

    #[must_use]
    pub fn chapters(&self) -> &[ChapterProgress] {
        &self.chapters
    }

    #[must_use]
    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    pub(crate) fn chapters_mut(&mut self) -> &mut [ChapterProgress] {
        &mut self.chapters
    }
}
