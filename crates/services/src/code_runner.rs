use std::env;
use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CodeRunnerError;

const DEFAULT_BASE_URL: &str = "https://judge029.p.rapidapi.com";
const NO_OUTPUT: &str = "No output";

/// Languages accepted by the remote judge, with their judge ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Cpp,
    Java,
    C,
    JavaScript,
    Rust,
    Ruby,
    Go,
    Php,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::Cpp,
        Language::Java,
        Language::C,
        Language::JavaScript,
        Language::Rust,
        Language::Ruby,
        Language::Go,
        Language::Php,
    ];

    #[must_use]
    pub fn judge_id(self) -> u32 {
        match self {
            Language::Python => 71,
            Language::Cpp => 54,
            Language::Java => 62,
            Language::C => 50,
            Language::JavaScript => 63,
            Language::Rust => 73,
            Language::Ruby => 72,
            Language::Go => 60,
            Language::Php => 68,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::C => "C",
            Language::JavaScript => "JavaScript",
            Language::Rust => "Rust",
            Language::Ruby => "Ruby",
            Language::Go => "Go",
            Language::Php => "PHP",
        }
    }

    /// Heuristic: does `code` read from standard input?
    #[must_use]
    pub fn requires_input(self, code: &str) -> bool {
        match self {
            Language::Python => code.contains("input("),
            Language::Cpp => code.contains("cin >>"),
            Language::Java => code.contains("Scanner"),
            Language::C => code.contains("scanf("),
            Language::JavaScript => code.contains("prompt("),
            Language::Rust => code.contains("read_line"),
            Language::Ruby => code.contains("gets"),
            Language::Go => code.contains("Scanln"),
            Language::Php => code.contains("fgets") || code.contains("readline"),
        }
    }

    /// Hello-world program shown when a language is picked.
    #[must_use]
    pub fn starter_snippet(self) -> &'static str {
        match self {
            Language::Python => "print(\"Hello, World!\")\n",
            Language::Cpp => {
                "#include <iostream>\n\nint main() {\n    std::cout << \"Hello, World!\" << std::endl;\n    return 0;\n}\n"
            }
            Language::Java => {
                "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}\n"
            }
            Language::C => {
                "#include <stdio.h>\n\nint main() {\n    printf(\"Hello, World!\\n\");\n    return 0;\n}\n"
            }
            Language::JavaScript => "console.log(\"Hello, World!\");\n",
            Language::Rust => "fn main() {\n    println!(\"Hello, World!\");\n}\n",
            Language::Ruby => "puts \"Hello, World!\"\n",
            Language::Go => {
                "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"Hello, World!\")\n}\n"
            }
            Language::Php => "<?php\necho \"Hello, World!\";\n",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts a label (any case), a common alias, or a judge id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        let alias = match needle.as_str() {
            "py" => Some(Language::Python),
            "cpp" | "c++" => Some(Language::Cpp),
            "js" | "javascript" => Some(Language::JavaScript),
            "rs" => Some(Language::Rust),
            "rb" => Some(Language::Ruby),
            "golang" => Some(Language::Go),
            _ => None,
        };
        if let Some(language) = alias {
            return Ok(language);
        }
        Language::ALL
            .into_iter()
            .find(|l| l.label().eq_ignore_ascii_case(&needle) || l.judge_id().to_string() == needle)
            .ok_or_else(|| UnknownLanguage(s.to_owned()))
    }
}

#[derive(Clone, Debug)]
pub struct CodeRunnerConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
}

impl CodeRunnerConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TUTOR_RUNNER_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("TUTOR_RUNNER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let api_host = env::var("TUTOR_RUNNER_HOST").unwrap_or_else(|_| host_of(&base_url));
        Some(Self {
            base_url,
            api_key,
            api_host,
        })
    }
}

fn host_of(base_url: &str) -> String {
    let without_scheme = base_url
        .split_once("://")
        .map_or(base_url, |(_, rest)| rest);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_owned()
}

/// Result of one remote run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub output: String,
    pub status: Option<String>,
}

/// Sends code to a Judge0-compatible endpoint and waits for the result.
#[derive(Clone)]
pub struct CodeRunnerService {
    client: Client,
    config: Option<CodeRunnerConfig>,
}

impl CodeRunnerService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(CodeRunnerConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<CodeRunnerConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Run `source` and return the first non-empty of stdout, compiler output
    /// and stderr.
    ///
    /// `stdin` is forwarded only when the code looks like it reads input.
    ///
    /// # Errors
    ///
    /// Returns `CodeRunnerError` when the service is disabled, the source is
    /// blank, or the request fails.
    pub async fn run(
        &self,
        language: Language,
        source: &str,
        stdin: &str,
    ) -> Result<RunOutput, CodeRunnerError> {
        let config = self.config.as_ref().ok_or(CodeRunnerError::Disabled)?;
        if source.trim().is_empty() {
            return Err(CodeRunnerError::EmptySource);
        }

        let url = format!(
            "{}/submissions?base64_encoded=false&wait=true",
            config.base_url.trim_end_matches('/')
        );
        let payload = SubmissionRequest {
            source_code: source,
            language_id: language.judge_id(),
            stdin: if language.requires_input(source) {
                stdin
            } else {
                ""
            },
        };

        tracing::debug!(%language, "submitting code");
        let response = self
            .client
            .post(url)
            .header("x-rapidapi-host", &config.api_host)
            .header("x-rapidapi-key", &config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "code runner request failed");
            return Err(CodeRunnerError::HttpStatus(response.status()));
        }

        let body: SubmissionResponse = response.json().await?;
        Ok(body.into_output())
    }
}

#[derive(Debug, Serialize)]
struct SubmissionRequest<'a> {
    source_code: &'a str,
    language_id: u32,
    stdin: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionResponse {
    stdout: Option<String>,
    compile_output: Option<String>,
    stderr: Option<String>,
    status: Option<SubmissionStatus>,
}

#[derive(Debug, Deserialize)]
struct SubmissionStatus {
    description: Option<String>,
}

impl SubmissionResponse {
    fn into_output(self) -> RunOutput {
        let output = [self.stdout, self.compile_output, self.stderr]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| NO_OUTPUT.to_owned());
        RunOutput {
            output,
            status: self.status.and_then(|s| s.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_prefers_stdout_then_compiler_then_stderr() {
        let body: SubmissionResponse = serde_json::from_str(
            r#"{"stdout": "", "compile_output": "error: expected ;", "stderr": "boom",
                "status": {"id": 6, "description": "Compilation Error"}}"#,
        )
        .unwrap();
        let out = body.into_output();
        assert_eq!(out.output, "error: expected ;");
        assert_eq!(out.status.as_deref(), Some("Compilation Error"));

        let empty = SubmissionResponse::default().into_output();
        assert_eq!(empty.output, "No output");
        assert_eq!(empty.status, None);
    }

    #[test]
    fn input_detection_per_language() {
        assert!(Language::Python.requires_input("name = input()"));
        assert!(!Language::Python.requires_input("print(1)"));
        assert!(Language::Php.requires_input("$x = readline();"));
        assert!(Language::Rust.requires_input("io::stdin().read_line(&mut s)"));
        assert!(!Language::Go.requires_input("fmt.Println(1)"));
    }

    #[test]
    fn languages_parse_by_label_alias_or_id() {
        assert_eq!("python".parse::<Language>(), Ok(Language::Python));
        assert_eq!("C++".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("rs".parse::<Language>(), Ok(Language::Rust));
        assert_eq!("68".parse::<Language>(), Ok(Language::Php));
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn every_language_has_a_runnable_starter() {
        for language in Language::ALL {
            let snippet = language.starter_snippet();
            assert!(snippet.contains("Hello, World!"), "{language}");
            assert!(!language.requires_input(snippet), "{language}");
        }
    }

    #[test]
    fn host_is_derived_from_base_url() {
        assert_eq!(host_of("https://judge029.p.rapidapi.com"), "judge029.p.rapidapi.com");
        assert_eq!(host_of("http://localhost:2358/api"), "localhost:2358");
    }

    #[tokio::test]
    async fn disabled_without_config() {
        let service = CodeRunnerService::new(None);
        assert!(!service.enabled());
        let err = service
            .run(Language::Python, "print(1)", "")
            .await
            .unwrap_err();
        assert!(matches!(err, CodeRunnerError::Disabled));
    }
}
