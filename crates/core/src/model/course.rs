use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("chapter name cannot be empty")]
    EmptyChapterName,

    #[error("duplicate chapter name: {0}")]
    DuplicateChapter(String),

    #[error("topic heading cannot be empty")]
    EmptyTopic,
}

//
// ─── TITLE ─────────────────────────────────────────────────────────────────────
//

/// Course title, trimmed and non-empty.
///
/// The title doubles as the natural key for catalog and enrollment lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseTitle(String);

impl CourseTitle {
    /// Create a validated course title.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CourseError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// One content item inside a chapter: a heading, its explanation, and optional
/// code and example snippets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    topic: String,
    explain: String,
    code: Option<String>,
    example: Option<String>,
}

impl Topic {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTopic` if the heading is blank.
    pub fn new(
        topic: impl Into<String>,
        explain: impl Into<String>,
        code: Option<String>,
        example: Option<String>,
    ) -> Result<Self, CourseError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(CourseError::EmptyTopic);
        }
        Ok(Self {
            topic: topic.trim().to_owned(),
            explain: explain.into(),
            code: code.filter(|c| !c.trim().is_empty()),
            example: example.filter(|e| !e.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn explain(&self) -> &str {
        &self.explain
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }
}

/// A named chapter and its ordered topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDefinition {
    name: String,
    content: Vec<Topic>,
}

impl ChapterDefinition {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyChapterName` if the name is blank.
    pub fn new(name: impl Into<String>, content: Vec<Topic>) -> Result<Self, CourseError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CourseError::EmptyChapterName);
        }
        Ok(Self {
            name: name.trim().to_owned(),
            content,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn content(&self) -> &[Topic] {
        &self.content
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Immutable catalog definition of a course.
///
/// Chapter order is the unlock order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    title: CourseTitle,
    description: String,
    category: String,
    chapter_count: u32,
    chapters: Vec<ChapterDefinition>,
}

impl Course {
    /// Creates a course definition.
    ///
    /// `chapter_count` is the advertised number of chapters and is not checked
    /// against `chapters.len()`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::DuplicateChapter` if two chapters share a name.
    pub fn new(
        title: CourseTitle,
        description: impl Into<String>,
        category: impl Into<String>,
        chapter_count: u32,
        chapters: Vec<ChapterDefinition>,
    ) -> Result<Self, CourseError> {
        let mut seen = HashSet::with_capacity(chapters.len());
        for chapter in &chapters {
            if !seen.insert(chapter.name()) {
                return Err(CourseError::DuplicateChapter(chapter.name().to_owned()));
            }
        }

        Ok(Self {
            title,
            description: description.into().trim().to_owned(),
            category: category.into().trim().to_owned(),
            chapter_count,
            chapters,
        })
    }

    #[must_use]
    pub fn title(&self) -> &CourseTitle {
        &self.title
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
    pub fn chapters(&self) -> &[ChapterDefinition] {
        &self.chapters
    }

    #[must_use]
    pub fn chapter(&self, name: &str) -> Option<&ChapterDefinition> {
        self.chapters.iter().find(|c| c.name() == name)
    }
}

//
// ─── TOPIC CURSOR ──────────────────────────────────────────────────────────────
//

/// Position while reading through a chapter's topics, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicCursor {
    position: usize,
    total: usize,
}

impl TopicCursor {
    /// Starts at the first topic. Returns `None` for a chapter without content.
    #[must_use]
    pub fn start(chapter: &ChapterDefinition) -> Option<Self> {
        let total = chapter.content().len();
        (total > 0).then_some(Self { position: 0, total })
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Moves forward one topic. Returns false when already on the last topic.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.position += 1;
        true
    }

    /// Moves back one topic. Returns false when already on the first topic.
    pub fn previous(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        true
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.total
    }

    /// A chapter can only be finished from its last topic.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        self.is_last()
    }

    #[must_use]
    pub fn current<'a>(&self, chapter: &'a ChapterDefinition) -> Option<&'a Topic> {
        chapter.content().get(self.position)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
