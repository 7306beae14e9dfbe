use storage::StorageError;
use storage::repository::{CatalogRepository, EnrollmentRepository, QuizRepository, UserRepository};
use storage::sqlite::SqliteRepository;
use tutor_core::model::{
    ChapterDefinition, Course, CourseTitle, Email, EnrollmentRecord, Question, Quiz, QuizId,
    Topic, UserId, UserProfile,
};
use tutor_core::progress::{apply_completion, compute_progress};
use tutor_core::time::fixed_now;

async fn open(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_course(chapters: &[&str]) -> Course {
    let defs = chapters
        .iter()
        .map(|name| {
            let topic = Topic::new(
                format!("{name} overview"),
                "explanation",
                Some("fn main() {}".into()),
                None,
            )
            .unwrap();
            ChapterDefinition::new(*name, vec![topic]).unwrap()
        })
        .collect();
    Course::new(
        CourseTitle::new("Rust for Beginners").unwrap(),
        "ownership and borrowing",
        "Coding",
        3,
        defs,
    )
    .unwrap()
}

fn build_user(email: &str) -> UserProfile {
    UserProfile::new(
        UserId::generate(),
        Email::parse(email).unwrap(),
        "Linus",
        "$argon2id$v=19$stub",
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn course_round_trips_with_nested_content() {
    let repo = open("memdb_course_roundtrip").await;
    let course = build_course(&["Intro", "Loops", "Functions"]);
    repo.upsert_course(&course).await.unwrap();

    let fetched = repo.get_course(course.title()).await.unwrap().unwrap();
    assert_eq!(fetched, course);
    assert_eq!(fetched.chapters()[1].content()[0].code(), Some("fn main() {}"));

    let missing = CourseTitle::new("Haskell").unwrap();
    assert!(repo.get_course(&missing).await.unwrap().is_none());
    assert_eq!(repo.list_courses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn enrollment_overwrite_keeps_enrolled_at() {
    let repo = open("memdb_enrollment_overwrite").await;
    let user = build_user("linus@example.com");
    repo.insert_user(&user).await.unwrap();

    let course = build_course(&["Intro", "Loops", "Functions"]);
    let record = EnrollmentRecord::from_course(&course, user.id(), fixed_now());
    assert!(
        repo.get_enrollment(user.id(), course.title())
            .await
            .unwrap()
            .is_none()
    );
    repo.save_enrollment(&record).await.unwrap();

    let updated = apply_completion(&record, "Intro").unwrap();
    repo.save_enrollment(&updated).await.unwrap();

    let stored = repo
        .get_enrollment(user.id(), course.title())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.enrolled_at(), fixed_now());
    assert_eq!(compute_progress(stored.chapters()).completed_count, 1);

    let listed = repo.list_enrollments(user.id()).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn malformed_enrollment_document_is_rejected() {
    let repo = open("memdb_malformed_doc").await;
    let user = build_user("mal@example.com");
    repo.insert_user(&user).await.unwrap();

    sqlx::query(
        r#"
        INSERT INTO enrollments (user_id, course_title, description, category, chapter_count, chapters, enrolled_at)
        VALUES (?1, 'Broken', '', 'Coding', 1, '[{"chapterName": 42}]', ?2)
        "#,
    )
    .bind(user.id().to_string())
    .bind(fixed_now())
    .execute(repo.pool())
    .await
    .unwrap();

    let title = CourseTitle::new("Broken").unwrap();
    let err = repo.get_enrollment(user.id(), &title).await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let repo = open("memdb_duplicate_email").await;
    repo.insert_user(&build_user("dup@example.com")).await.unwrap();
    let err = repo
        .insert_user(&build_user("dup@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let email = Email::parse("dup@example.com").unwrap();
    let found = repo.get_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.display_name(), "Linus");
    assert_eq!(repo.get_user(found.id()).await.unwrap(), Some(found));
}

#[tokio::test]
async fn quizzes_round_trip_in_id_order() {
    let repo = open("memdb_quizzes").await;
    let q = Question::new("2 + 2?", vec!["3".into(), "4".into()], "4").unwrap();
    repo.upsert_quiz(&Quiz::new(QuizId::new(2), "Second", vec![q.clone()]))
        .await
        .unwrap();
    repo.upsert_quiz(&Quiz::new(QuizId::new(1), "First", vec![q]))
        .await
        .unwrap();

    let quizzes = repo.list_quizzes().await.unwrap();
    let titles: Vec<_> = quizzes.iter().map(Quiz::title).collect();
    assert_eq!(titles, ["First", "Second"]);
    assert_eq!(quizzes[0].questions()[0].correct_answer(), "4");
}
