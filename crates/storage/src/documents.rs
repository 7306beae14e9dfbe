//! JSON document shapes for nested course, enrollment, and quiz data.
//!
//! Field names follow the documents the mobile client already writes
//! (`chapterName`, `correctAns`, ...). Every document is decoded into these
//! typed structs first and then validated into domain values, so a malformed
//! document is rejected here instead of reaching the progress engine.

use serde::{Deserialize, Serialize};
use tutor_core::model::{ChapterDefinition, ChapterProgress, Question, Topic};

use crate::repository::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TopicDocument {
    pub topic: String,
    #[serde(default)]
    pub explain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChapterDocument {
    #[serde(rename = "chapterName")]
    pub chapter_name: String,
    #[serde(default)]
    pub content: Vec<TopicDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChapterProgressDocument {
    #[serde(rename = "chapterName")]
    pub chapter_name: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct QuestionDocument {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAns")]
    pub correct_ans: String,
}

fn invalid<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn encode_chapters(chapters: &[ChapterDefinition]) -> Result<String, StorageError> {
    let docs: Vec<ChapterDocument> = chapters
        .iter()
        .map(|chapter| ChapterDocument {
            chapter_name: chapter.name().to_owned(),
            content: chapter
                .content()
                .iter()
                .map(|t| TopicDocument {
                    topic: t.topic().to_owned(),
                    explain: t.explain().to_owned(),
                    code: t.code().map(str::to_owned),
                    example: t.example().map(str::to_owned),
                })
                .collect(),
        })
        .collect();
    serde_json::to_string(&docs).map_err(invalid)
}

pub(crate) fn decode_chapters(json: &str) -> Result<Vec<ChapterDefinition>, StorageError> {
    let docs: Vec<ChapterDocument> = serde_json::from_str(json).map_err(invalid)?;
    docs.into_iter()
        .map(|doc| {
            let content = doc
                .content
                .into_iter()
                .map(|t| Topic::new(t.topic, t.explain, t.code, t.example))
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
            ChapterDefinition::new(doc.chapter_name, content).map_err(invalid)
        })
        .collect()
}

pub(crate) fn encode_progress(chapters: &[ChapterProgress]) -> Result<String, StorageError> {
    let docs: Vec<ChapterProgressDocument> = chapters
        .iter()
        .map(|c| ChapterProgressDocument {
            chapter_name: c.name().to_owned(),
            completed: c.is_completed(),
        })
        .collect();
    serde_json::to_string(&docs).map_err(invalid)
}

pub(crate) fn decode_progress(json: &str) -> Result<Vec<ChapterProgress>, StorageError> {
    let docs: Vec<ChapterProgressDocument> = serde_json::from_str(json).map_err(invalid)?;
    Ok(docs
        .into_iter()
        .map(|doc| ChapterProgress::new(doc.chapter_name, doc.completed))
        .collect())
}

pub(crate) fn encode_questions(questions: &[Question]) -> Result<String, StorageError> {
    let docs: Vec<QuestionDocument> = questions
        .iter()
        .map(|q| QuestionDocument {
            question: q.question().to_owned(),
            options: q.options().to_vec(),
            correct_ans: q.correct_answer().to_owned(),
        })
        .collect();
    serde_json::to_string(&docs).map_err(invalid)
}

pub(crate) fn decode_questions(json: &str) -> Result<Vec<Question>, StorageError> {
    let docs: Vec<QuestionDocument> = serde_json::from_str(json).map_err(invalid)?;
    docs.into_iter()
        .map(|doc| Question::new(doc.question, doc.options, doc.correct_ans).map_err(invalid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_client_shaped_chapters() {
        let json = r#"[
            {"chapterName": "Intro", "content": [
                {"topic": "Hello", "explain": "first program", "code": "print('hi')"}
            ]},
            {"chapterName": "Loops"}
        ]"#;
        let chapters = decode_chapters(json).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].content()[0].code(), Some("print('hi')"));
        assert!(chapters[1].content().is_empty());
    }

    #[test]
    fn missing_completed_flag_reads_as_pending() {
        let progress = decode_progress(r#"[{"chapterName": "Intro"}]"#).unwrap();
        assert!(!progress[0].is_completed());
    }

    #[test]
    fn padded_progress_names_match_chapter_definitions() {
        let chapters = decode_chapters(r#"[{"chapterName": "Intro"}]"#).unwrap();
        let progress = decode_progress(r#"[{"chapterName": "Intro ", "completed": true}]"#).unwrap();
        assert_eq!(progress[0].name(), chapters[0].name());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            decode_chapters(r#"[{"name": "Intro"}]"#),
            Err(StorageError::Serialization(_))
        ));
        assert!(matches!(
            decode_chapters(r#"[{"chapterName": "  "}]"#),
            Err(StorageError::Serialization(_))
        ));
        assert!(matches!(
            decode_questions(r#"[{"question": "q", "options": ["a"], "correctAns": "b"}]"#),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn progress_document_uses_client_field_names() {
        let json = encode_progress(&[ChapterProgress::new("Intro", true)]).unwrap();
        assert_eq!(json, r#"[{"chapterName":"Intro","completed":true}]"#);
    }
}
