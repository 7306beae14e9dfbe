use std::sync::Arc;

use storage::repository::{CatalogRepository, EnrollmentRepository};
use tutor_core::model::{ChapterDefinition, Course, CourseTitle, EnrollmentRecord, TopicCursor};
use tutor_core::progress::{
    ChapterState, ProgressError, ProgressSummary, apply_completion, chapter_states,
    compute_progress, is_chapter_unlocked, merge_or_initialize, next_chapter, unlock_frontier,
};
use tutor_core::session::UserSession;

use crate::Clock;
use crate::error::EnrollmentServiceError;

/// What the course detail screen shows for one user.
///
/// When the user has not enrolled, `record` is an ephemeral fallback built from
/// the catalog and is never persisted by viewing.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOverview {
    pub record: EnrollmentRecord,
    pub enrolled: bool,
    pub progress: ProgressSummary,
    pub chapters: Vec<ChapterState>,
    /// Furthest chapter the user may open.
    pub frontier: usize,
    /// First chapter still to finish; `None` once the course is done.
    pub resume_at: Option<usize>,
}

impl CourseOverview {
    fn from_record(record: EnrollmentRecord, enrolled: bool) -> Self {
        let progress = compute_progress(record.chapters());
        let chapters = chapter_states(record.chapters());
        let frontier = unlock_frontier(record.chapters());
        let resume_at = next_chapter(record.chapters());
        Self {
            record,
            enrolled,
            progress,
            chapters,
            frontier,
            resume_at,
        }
    }
}

/// An enrolled course with its progress, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrolledCourse {
    pub record: EnrollmentRecord,
    pub progress: ProgressSummary,
    pub next_chapter: Option<String>,
}

/// A chapter opened for reading, positioned on its first topic.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedChapter {
    pub index: usize,
    pub chapter: ChapterDefinition,
    pub cursor: Option<TopicCursor>,
    pub completed: bool,
}

/// Orchestrates enrollment, chapter gating and completion write-back.
#[derive(Clone)]
pub struct EnrollmentService {
    clock: Clock,
    catalog: Arc<dyn CatalogRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn CatalogRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            enrollments,
        }
    }

    /// Resolve the record to display for `title`, falling back to the catalog
    /// definition when the user has not enrolled.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentServiceError::CourseNotFound` if there is neither an
    /// enrollment nor a catalog entry, and `EnrollmentServiceError::Storage` if
    /// repository access fails.
    pub async fn view_course(
        &self,
        session: &UserSession,
        title: &CourseTitle,
    ) -> Result<CourseOverview, EnrollmentServiceError> {
        let existing = self
            .enrollments
            .get_enrollment(session.user_id(), title)
            .await?;
        if let Some(record) = existing {
            return Ok(CourseOverview::from_record(record, true));
        }

        let course = self.load_course(title).await?;
        let record = merge_or_initialize(&course, None, session.user_id(), self.clock.now());
        Ok(CourseOverview::from_record(record, false))
    }

    /// Enroll the user in `title`. Enrolling twice returns the existing record
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentServiceError::CourseNotFound` if the course is not in
    /// the catalog and `EnrollmentServiceError::Storage` if persistence fails.
    pub async fn enroll(
        &self,
        session: &UserSession,
        title: &CourseTitle,
    ) -> Result<EnrollmentRecord, EnrollmentServiceError> {
        let existing = self
            .enrollments
            .get_enrollment(session.user_id(), title)
            .await?;
        if let Some(record) = existing {
            tracing::debug!(course = %title, "already enrolled");
            return Ok(record);
        }

        let course = self.load_course(title).await?;
        let record = merge_or_initialize(&course, None, session.user_id(), self.clock.now());
        self.enrollments.save_enrollment(&record).await?;
        tracing::info!(user = %session.user_id(), course = %title, "enrolled");
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `EnrollmentServiceError::Storage` if repository access fails.
    pub async fn is_enrolled(
        &self,
        session: &UserSession,
        title: &CourseTitle,
    ) -> Result<bool, EnrollmentServiceError> {
        let record = self
            .enrollments
            .get_enrollment(session.user_id(), title)
            .await?;
        Ok(record.is_some())
    }

    /// Open the chapter at `index` for reading.
    ///
    /// Gating follows the same record `view_course` shows, so a user who has
    /// not enrolled can still read the first chapter.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentServiceError::ChapterLocked` when the previous chapter
    /// is incomplete, `EnrollmentServiceError::Progress` for an out-of-range
    /// index, and `EnrollmentServiceError::ChapterContentMissing` when the
    /// catalog no longer has the chapter.
    pub async fn open_chapter(
        &self,
        session: &UserSession,
        title: &CourseTitle,
        index: usize,
    ) -> Result<OpenedChapter, EnrollmentServiceError> {
        let overview = self.view_course(session, title).await?;
        let chapters = overview.record.chapters();
        if !is_chapter_unlocked(chapters, index)? {
            return Err(EnrollmentServiceError::ChapterLocked { index });
        }

        let progress = &chapters[index];
        let course = self.load_course(title).await?;
        let chapter = course
            .chapter(progress.name())
            .cloned()
            .ok_or_else(|| EnrollmentServiceError::ChapterContentMissing(progress.name().to_owned()))?;

        Ok(OpenedChapter {
            index,
            cursor: TopicCursor::start(&chapter),
            completed: progress.is_completed(),
            chapter,
        })
    }

    /// Mark `chapter_name` complete and overwrite the stored record.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentServiceError::NotEnrolled` without an enrollment,
    /// `EnrollmentServiceError::Progress` for an unknown chapter,
    /// `EnrollmentServiceError::ChapterLocked` when the previous chapter is
    /// incomplete, and `EnrollmentServiceError::Storage` if persistence fails.
    pub async fn complete_chapter(
        &self,
        session: &UserSession,
        title: &CourseTitle,
        chapter_name: &str,
    ) -> Result<EnrollmentRecord, EnrollmentServiceError> {
        let record = self
            .enrollments
            .get_enrollment(session.user_id(), title)
            .await?
            .ok_or_else(|| EnrollmentServiceError::NotEnrolled(title.to_string()))?;

        let index = record
            .chapters()
            .iter()
            .position(|c| c.name() == chapter_name)
            .ok_or_else(|| ProgressError::NotFound {
                name: chapter_name.to_owned(),
            })?;
        if !is_chapter_unlocked(record.chapters(), index)? {
            return Err(EnrollmentServiceError::ChapterLocked { index });
        }

        let updated = apply_completion(&record, chapter_name)?;
        self.enrollments.save_enrollment(&updated).await?;

        let summary = compute_progress(updated.chapters());
        tracing::info!(
            course = %title,
            chapter = chapter_name,
            completed = summary.completed_count,
            total = summary.total_count,
            "chapter completed"
        );
        Ok(updated)
    }

    /// Every enrollment of the signed-in user, ordered by course title.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentServiceError::Storage` if repository access fails.
    pub async fn list_enrolled(
        &self,
        session: &UserSession,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentServiceError> {
        let records = self.enrollments.list_enrollments(session.user_id()).await?;
        Ok(records
            .into_iter()
            .map(|record| EnrolledCourse {
                progress: compute_progress(record.chapters()),
                next_chapter: next_chapter(record.chapters())
                    .map(|i| record.chapters()[i].name().to_owned()),
                record,
            })
            .collect())
    }

    async fn load_course(&self, title: &CourseTitle) -> Result<Course, EnrollmentServiceError> {
        self.catalog
            .get_course(title)
            .await?
            .ok_or_else(|| EnrollmentServiceError::CourseNotFound(title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryRepository;
    use tutor_core::model::{ChapterProgress, Email, EnrollmentDraft, Topic, UserId, UserProfile};
    use tutor_core::time::fixed_now;

    fn course() -> Course {
        let chapters = ["Intro", "Loops", "Functions"]
            .into_iter()
            .map(|name| {
                let topic = Topic::new(format!("{name} 1"), "first", None, None).unwrap();
                let second = Topic::new(format!("{name} 2"), "second", None, None).unwrap();
                ChapterDefinition::new(name, vec![topic, second]).unwrap()
            })
            .collect();
        Course::new(
            CourseTitle::new("Python Fundamentals").unwrap(),
            "basics",
            "Coding",
            3,
            chapters,
        )
        .unwrap()
    }

    fn session() -> UserSession {
        let profile = UserProfile::new(
            UserId::generate(),
            Email::parse("ada@example.com").unwrap(),
            "Ada",
            "hash",
            fixed_now(),
        )
        .unwrap();
        UserSession::start(&profile, fixed_now())
    }

    async fn service() -> EnrollmentService {
        let repo = InMemoryRepository::new();
        repo.upsert_course(&course()).await.unwrap();
        EnrollmentService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        )
    }

    fn title() -> CourseTitle {
        CourseTitle::new("Python Fundamentals").unwrap()
    }

    #[tokio::test]
    async fn viewing_without_enrollment_uses_catalog_fallback() {
        let service = service().await;
        let session = session();

        let overview = service.view_course(&session, &title()).await.unwrap();
        assert!(!overview.enrolled);
        assert_eq!(overview.progress.completed_count, 0);
        assert_eq!(overview.progress.total_count, 3);
        assert_eq!(
            overview.chapters,
            [ChapterState::Unlocked, ChapterState::Locked, ChapterState::Locked]
        );
        assert_eq!(overview.frontier, 0);
        assert_eq!(overview.resume_at, Some(0));
        assert!(!service.is_enrolled(&session, &title()).await.unwrap());
    }

    #[tokio::test]
    async fn enroll_is_idempotent() {
        let service = service().await;
        let session = session();

        let first = service.enroll(&session, &title()).await.unwrap();
        service
            .complete_chapter(&session, &title(), "Intro")
            .await
            .unwrap();
        let second = service.enroll(&session, &title()).await.unwrap();

        assert_eq!(first.enrolled_at(), second.enrolled_at());
        assert!(second.chapters()[0].is_completed());

        let listed = service.list_enrolled(&session).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].next_chapter.as_deref(), Some("Loops"));
    }

    #[tokio::test]
    async fn locked_chapter_cannot_be_opened_or_completed() {
        let service = service().await;
        let session = session();
        service.enroll(&session, &title()).await.unwrap();

        let err = service.open_chapter(&session, &title(), 1).await.unwrap_err();
        assert!(matches!(err, EnrollmentServiceError::ChapterLocked { index: 1 }));

        let err = service
            .complete_chapter(&session, &title(), "Loops")
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollmentServiceError::ChapterLocked { index: 1 }));

        let opened = service.open_chapter(&session, &title(), 0).await.unwrap();
        assert_eq!(opened.chapter.name(), "Intro");
        assert_eq!(opened.cursor.map(|c| c.total()), Some(2));
        assert!(!opened.completed);
    }

    #[tokio::test]
    async fn out_of_order_record_opens_up_to_its_frontier() {
        let repo = InMemoryRepository::new();
        repo.upsert_course(&course()).await.unwrap();
        let service = EnrollmentService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let session = session();

        let stored = EnrollmentRecord::from_persisted(EnrollmentDraft {
            user_id: session.user_id(),
            course_title: "Python Fundamentals".into(),
            description: "basics".into(),
            category: "Coding".into(),
            chapter_count: 3,
            chapters: vec![
                ChapterProgress::new("Intro", false),
                ChapterProgress::new("Loops ", true),
                ChapterProgress::new("Functions", false),
            ],
            enrolled_at: fixed_now(),
        })
        .unwrap();
        repo.save_enrollment(&stored).await.unwrap();

        let overview = service.view_course(&session, &title()).await.unwrap();
        assert_eq!(overview.frontier, 2);
        assert_eq!(overview.chapters[overview.frontier], ChapterState::Unlocked);
        assert_eq!(overview.resume_at, Some(0));

        let opened = service
            .open_chapter(&session, &title(), overview.frontier)
            .await
            .unwrap();
        assert_eq!(opened.chapter.name(), "Functions");
        assert_eq!(overview.chapters[1], ChapterState::Completed);
        assert_eq!(overview.record.chapters()[1].name(), "Loops");
    }

    #[tokio::test]
    async fn completion_requires_enrollment() {
        let service = service().await;
        let err = service
            .complete_chapter(&session(), &title(), "Intro")
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollmentServiceError::NotEnrolled(_)));
    }

    #[tokio::test]
    async fn unknown_chapter_and_course_are_reported() {
        let service = service().await;
        let session = session();
        service.enroll(&session, &title()).await.unwrap();

        let err = service
            .complete_chapter(&session, &title(), "Classes")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EnrollmentServiceError::Progress(ProgressError::NotFound { .. })
        ));

        let err = service.open_chapter(&session, &title(), 7).await.unwrap_err();
        assert!(matches!(
            err,
            EnrollmentServiceError::Progress(ProgressError::InvalidArgument { index: 7, len: 3 })
        ));

        let missing = CourseTitle::new("Haskell").unwrap();
        let err = service.view_course(&session, &missing).await.unwrap_err();
        assert!(matches!(err, EnrollmentServiceError::CourseNotFound(_)));
    }
}
