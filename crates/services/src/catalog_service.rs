use std::collections::BTreeSet;
use std::sync::Arc;

use storage::repository::CatalogRepository;
use tutor_core::catalog::CourseQuery;
use tutor_core::model::{Course, CourseTitle};

use crate::error::CatalogServiceError;

/// Read-side access to the course catalog.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// All courses, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CatalogServiceError> {
        let courses = self.catalog.list_courses().await?;
        Ok(courses)
    }

    /// Fetch a course by title. `Ok(None)` when it is not in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Course` for a blank title and
    /// `CatalogServiceError::Storage` if repository access fails.
    pub async fn get_course(&self, title: &str) -> Result<Option<Course>, CatalogServiceError> {
        let title = CourseTitle::new(title)?;
        let course = self.catalog.get_course(&title).await?;
        Ok(course)
    }

    /// Courses matching `query`, keeping catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn search(&self, query: &CourseQuery) -> Result<Vec<Course>, CatalogServiceError> {
        let courses = self.catalog.list_courses().await?;
        let matched: Vec<Course> = query.apply(&courses).into_iter().cloned().collect();
        tracing::debug!(matched = matched.len(), "catalog search");
        Ok(matched)
    }

    /// Distinct non-empty categories, sorted.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn categories(&self) -> Result<Vec<String>, CatalogServiceError> {
        let courses = self.catalog.list_courses().await?;
        let categories: BTreeSet<String> = courses
            .iter()
            .map(Course::category)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(categories.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryRepository;
    use tutor_core::catalog::CategoryFilter;
    use tutor_core::model::{ChapterDefinition, Topic};

    fn course(title: &str, category: &str) -> Course {
        let topic = Topic::new("Basics", "Start here", None, None).unwrap();
        let chapter = ChapterDefinition::new("Intro", vec![topic]).unwrap();
        Course::new(
            CourseTitle::new(title).unwrap(),
            format!("{title} course"),
            category,
            1,
            vec![chapter],
        )
        .unwrap()
    }

    async fn seeded() -> CatalogService {
        let repo = InMemoryRepository::new();
        for c in [
            course("Python Fundamentals", "Coding"),
            course("React Native", "Development"),
            course("SQL Essentials", "Database"),
            course("Java Basics", "Coding"),
        ] {
            repo.upsert_course(&c).await.unwrap();
        }
        CatalogService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn category_filter_and_search() {
        let service = seeded().await;

        let coding = service
            .search(&CourseQuery::new().with_category(CategoryFilter::parse("Coding")))
            .await
            .unwrap();
        let titles: Vec<_> = coding.iter().map(|c| c.title().as_str()).collect();
        assert_eq!(titles, ["Java Basics", "Python Fundamentals"]);

        let found = service
            .search(
                &CourseQuery::new()
                    .with_category(CategoryFilter::parse("Database"))
                    .with_search("react"),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title().as_str(), "React Native");
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let service = seeded().await;
        assert_eq!(
            service.categories().await.unwrap(),
            ["Coding", "Database", "Development"]
        );
    }

    #[tokio::test]
    async fn get_course_distinguishes_missing() {
        let service = seeded().await;
        assert!(service.get_course("SQL Essentials").await.unwrap().is_some());
        assert!(service.get_course("Haskell").await.unwrap().is_none());
        assert!(matches!(
            service.get_course("  ").await,
            Err(CatalogServiceError::Course(_))
        ));
    }
}
