mod telemetry;

use std::fmt;
use std::io::BufRead;

use services::{AppServices, Clock, CourseOverview, Language};
use tutor_core::catalog::{CategoryFilter, CourseQuery};
use tutor_core::model::{CourseTitle, QuizId};
use tutor_core::progress::ChapterState;
use tutor_core::session::{SessionSlot, UserSession};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLanguage { raw: String },
    InvalidQuizId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required for this command"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLanguage { raw } => write!(f, "unsupported --language value: {raw}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- catalog  [--search <text>] [--category <name>]");
    eprintln!("  cargo run -p app -- signup   --email <e> --password <p> --name <n>");
    eprintln!("  cargo run -p app -- enroll   --email <e> --password <p> --course <title>");
    eprintln!("  cargo run -p app -- view     --email <e> --password <p> --course <title>");
    eprintln!("  cargo run -p app -- complete --email <e> --password <p> --course <title> --chapter <name>");
    eprintln!("  cargo run -p app -- progress --email <e> --password <p>");
    eprintln!("  cargo run -p app -- quiz     [--quiz <id>]  # answers are read from stdin");
    eprintln!("  cargo run -p app -- run      --language <lang> [--file <path>] [--stdin <text>]");
    eprintln!();
    eprintln!("Every command accepts --db <sqlite_url> (default: sqlite://tutor.sqlite3).");
    eprintln!("Seed a demo catalog with: cargo run -p storage --bin seed");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_DB_URL, TUTOR_LOG, TUTOR_LOG_FORMAT");
    eprintln!("  TUTOR_RUNNER_API_KEY, TUTOR_RUNNER_BASE_URL, TUTOR_RUNNER_HOST");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Catalog,
    Signup,
    Enroll,
    View,
    Complete,
    Progress,
    Quiz,
    Run,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "catalog" => Some(Self::Catalog),
            "signup" => Some(Self::Signup),
            "enroll" => Some(Self::Enroll),
            "view" => Some(Self::View),
            "complete" => Some(Self::Complete),
            "progress" => Some(Self::Progress),
            "quiz" => Some(Self::Quiz),
            "run" => Some(Self::Run),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    db_url: String,
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    course: Option<String>,
    chapter: Option<String>,
    search: Option<String>,
    category: Option<String>,
    language: Option<String>,
    file: Option<String>,
    stdin: Option<String>,
    quiz: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("TUTOR_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://tutor.sqlite3".into(), normalize_sqlite_url),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--email" => parsed.email = Some(require_value(args, "--email")?),
                "--password" => parsed.password = Some(require_value(args, "--password")?),
                "--name" => parsed.name = Some(require_value(args, "--name")?),
                "--course" => parsed.course = Some(require_value(args, "--course")?),
                "--chapter" => parsed.chapter = Some(require_value(args, "--chapter")?),
                "--search" => parsed.search = Some(require_value(args, "--search")?),
                "--category" => parsed.category = Some(require_value(args, "--category")?),
                "--language" => parsed.language = Some(require_value(args, "--language")?),
                "--file" => parsed.file = Some(require_value(args, "--file")?),
                "--stdin" => parsed.stdin = Some(require_value(args, "--stdin")?),
                "--quiz" => parsed.quiz = Some(require_value(args, "--quiz")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn required<'a>(value: Option<&'a String>, flag: &'static str) -> Result<&'a str, ArgsError> {
    value.map(String::as_str).ok_or(ArgsError::MissingFlag { flag })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn sign_in(
    services: &AppServices,
    args: &Args,
    slot: &mut SessionSlot,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = required(args.email.as_ref(), "--email")?;
    let password = required(args.password.as_ref(), "--password")?;
    let session = services.accounts().sign_in(email, password).await?;
    slot.sign_in(session);
    Ok(())
}

fn course_title(args: &Args) -> Result<CourseTitle, Box<dyn std::error::Error>> {
    let raw = required(args.course.as_ref(), "--course")?;
    Ok(CourseTitle::new(raw)?)
}

fn print_overview(overview: &CourseOverview) {
    let record = &overview.record;
    println!("{} [{}]", record.course_title(), record.category());
    if !record.description().is_empty() {
        println!("  {}", record.description());
    }
    println!(
        "  {}/{} chapters ({}%){}",
        overview.progress.completed_count,
        overview.progress.total_count,
        overview.progress.percent(),
        if overview.enrolled { "" } else { "  not enrolled" }
    );
    for (chapter, state) in record.chapters().iter().zip(&overview.chapters) {
        let marker = match state {
            ChapterState::Completed => "[x]",
            ChapterState::Unlocked => "[ ]",
            ChapterState::Locked => "[#]",
        };
        println!("  {marker} {}", chapter.name());
    }
    if let Some(next) = overview.resume_at.and_then(|i| record.chapters().get(i)) {
        println!("  next: {}", next.name());
    }
}

fn current(slot: &SessionSlot) -> Result<&UserSession, Box<dyn std::error::Error>> {
    Ok(slot.require()?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if cmd == Command::Run {
        return run_code(&args).await;
    }

    // Open + migrate SQLite in the binary so the library crates stay free of path handling.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::system()).await?;
    tracing::debug!(db_url = %args.db_url, ?cmd, "storage ready");
    let mut slot = SessionSlot::new();

    match cmd {
        Command::Catalog => {
            let mut query = CourseQuery::new();
            if let Some(search) = &args.search {
                query = query.with_search(search.as_str());
            }
            if let Some(category) = &args.category {
                query = query.with_category(CategoryFilter::parse(category));
            }
            let courses = services.catalog().search(&query).await?;
            if courses.is_empty() {
                println!("No courses found.");
            }
            for course in courses {
                println!(
                    "{} [{}] {} chapters",
                    course.title(),
                    course.category(),
                    course.chapter_count()
                );
            }
        }
        Command::Signup => {
            let session = services
                .accounts()
                .sign_up(
                    required(args.email.as_ref(), "--email")?,
                    required(args.password.as_ref(), "--password")?,
                    required(args.name.as_ref(), "--name")?,
                )
                .await?;
            println!("Welcome, {}.", session.display_name());
        }
        Command::Enroll => {
            sign_in(&services, &args, &mut slot).await?;
            let title = course_title(&args)?;
            let record = services.enrollments().enroll(current(&slot)?, &title).await?;
            println!("Enrolled in {}.", record.course_title());
        }
        Command::View => {
            sign_in(&services, &args, &mut slot).await?;
            let title = course_title(&args)?;
            let overview = services
                .enrollments()
                .view_course(current(&slot)?, &title)
                .await?;
            print_overview(&overview);
        }
        Command::Complete => {
            sign_in(&services, &args, &mut slot).await?;
            let title = course_title(&args)?;
            let chapter = required(args.chapter.as_ref(), "--chapter")?;
            let enrollments = services.enrollments();
            enrollments
                .complete_chapter(current(&slot)?, &title, chapter)
                .await?;
            let overview = enrollments.view_course(current(&slot)?, &title).await?;
            print_overview(&overview);
        }
        Command::Progress => {
            sign_in(&services, &args, &mut slot).await?;
            let enrolled = services.enrollments().list_enrolled(current(&slot)?).await?;
            if enrolled.is_empty() {
                println!("Not enrolled in any course yet.");
            }
            for course in enrolled {
                println!(
                    "{}: {}/{} ({}%){}",
                    course.record.course_title(),
                    course.progress.completed_count,
                    course.progress.total_count,
                    course.progress.percent(),
                    course
                        .next_chapter
                        .as_deref()
                        .map(|name| format!(", next: {name}"))
                        .unwrap_or_default()
                );
            }
        }
        Command::Quiz => take_quiz(&services, &args).await?,
        Command::Run => {}
    }

    if let Some(session) = slot.sign_out() {
        services.accounts().sign_out(session);
    }
    Ok(())
}

async fn run_code(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let raw = required(args.language.as_ref(), "--language")?;
    let language: Language = raw
        .parse()
        .map_err(|_| ArgsError::InvalidLanguage { raw: raw.to_owned() })?;
    let Some(path) = args.file.as_deref() else {
        eprintln!("No --file given; starter program for {language}:");
        print!("{}", language.starter_snippet());
        return Ok(());
    };
    let source = std::fs::read_to_string(path)?;
    let stdin = args.stdin.as_deref().unwrap_or_default();

    let runner = services::CodeRunnerService::from_env();
    let result = runner.run(language, &source, stdin).await?;
    if let Some(status) = result.status {
        eprintln!("status: {status}");
    }
    println!("{}", result.output);
    Ok(())
}

/// Accepts a 1-based option number or the option text itself.
fn pick_option(options: &[String], input: &str) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| input.to_owned())
}

async fn take_quiz(services: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let quizzes = services.quizzes();
    let Some(raw) = args.quiz.as_deref() else {
        for quiz in quizzes.list_quizzes().await? {
            println!(
                "{} {} ({} questions)",
                quiz.id(),
                quiz.title(),
                quiz.questions().len()
            );
        }
        return Ok(());
    };
    let quiz_id: QuizId = raw
        .parse()
        .map_err(|_| ArgsError::InvalidQuizId { raw: raw.to_owned() })?;

    let mut attempt = quizzes.start_attempt(quiz_id, &mut rand::rng()).await?;
    let mut lines = std::io::stdin().lock().lines();
    while let Some(question) = attempt.current_question() {
        println!(
            "Q{}/{}: {}",
            attempt.position() + 1,
            attempt.total(),
            question.question()
        );
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        let Some(line) = lines.next() else {
            break;
        };
        let choice = pick_option(question.options(), line?.trim());
        let outcome = attempt.answer(&choice)?;
        println!("{}", if outcome.correct { "Correct!" } else { "Wrong." });
    }
    println!("Score: {}/{}", attempt.score(), attempt.total());
    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut raw.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn quiz_answers_accept_numbers_or_text() {
        let options = vec!["4".to_owned(), "5".to_owned()];
        assert_eq!(pick_option(&options, "2"), "5");
        assert_eq!(pick_option(&options, "five"), "five");
        assert_eq!(pick_option(&options, "0"), "0");
        assert_eq!(pick_option(&options, "7"), "7");
    }

    #[test]
    fn quiz_flag_is_parsed() {
        let args = parse(&["--quiz", "3", "--db", "sqlite::memory:"]).unwrap();
        assert_eq!(args.quiz.as_deref(), Some("3"));
        assert!(matches!(
            parse(&["--quiz"]),
            Err(ArgsError::MissingValue { .. })
        ));
    }
}
