//! Catalog search and category filtering.

use crate::model::Course;

/// Category selector for catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// `"All"` (any case) or a blank value selects every category.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(value.to_owned())
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name.to_lowercase() == category.to_lowercase(),
        }
    }
}

/// Title search combined with a category selector.
///
/// A non-empty search text overrides the category selector, so typing a
/// query always searches the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseQuery {
    search: String,
    category: CategoryFilter,
}

impl CourseQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into().trim().to_lowercase();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        let matches_search =
            self.search.is_empty() || course.title().as_str().to_lowercase().contains(&self.search);
        let matches_category = !self.search.is_empty() || self.category.matches(course.category());
        matches_search && matches_category
    }

    /// Courses that match, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, courses: &'a [Course]) -> Vec<&'a Course> {
        courses.iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterDefinition, CourseTitle};

    fn course(title: &str, category: &str) -> Course {
        Course::new(
            CourseTitle::new(title).unwrap(),
            "",
            category,
            1,
            vec![ChapterDefinition::new("Intro", vec![]).unwrap()],
        )
        .unwrap()
    }

    fn catalog() -> Vec<Course> {
        vec![
            course("Java Basics", "Coding"),
            course("React Native", "Development"),
            course("MongoDB", "Database"),
            course("JavaScript", "Coding"),
        ]
    }

    fn titles(found: &[&Course]) -> Vec<String> {
        found.iter().map(|c| c.title().to_string()).collect()
    }

    #[test]
    fn default_query_lists_everything() {
        let courses = catalog();
        assert_eq!(CourseQuery::new().apply(&courses).len(), 4);
    }

    #[test]
    fn category_is_case_insensitive() {
        let courses = catalog();
        let query = CourseQuery::new().with_category(CategoryFilter::parse("coding"));
        assert_eq!(titles(&query.apply(&courses)), ["Java Basics", "JavaScript"]);
    }

    #[test]
    fn search_overrides_category() {
        let courses = catalog();
        let query = CourseQuery::new()
            .with_category(CategoryFilter::parse("Database"))
            .with_search("JAVA");
        assert_eq!(titles(&query.apply(&courses)), ["Java Basics", "JavaScript"]);
    }

    #[test]
    fn all_filter_parses_any_case() {
        assert_eq!(CategoryFilter::parse("ALL"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(" New Tech "),
            CategoryFilter::Named("New Tech".into())
        );
    }
}
