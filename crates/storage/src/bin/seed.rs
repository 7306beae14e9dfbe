use std::fmt;

use storage::repository::Storage;
use tutor_core::model::{ChapterDefinition, Course, CourseTitle, Question, Quiz, QuizId, Topic};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    with_quizzes: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("TUTOR_DB_URL").unwrap_or_else(|_| "sqlite:tutor.sqlite3?mode=rwc".into());
        let mut with_quizzes = true;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--no-quizzes" => with_quizzes = false,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            with_quizzes,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:tutor.sqlite3?mode=rwc)");
    eprintln!("  --no-quizzes        Only seed the course catalog");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_DB_URL");
}

type ChapterSpec<'a> = (&'a str, &'a [(&'a str, &'a str, Option<&'a str>)]);

fn build_course(
    title: &str,
    description: &str,
    category: &str,
    chapters: &[ChapterSpec<'_>],
) -> Result<Course, Box<dyn std::error::Error>> {
    let mut defs = Vec::with_capacity(chapters.len());
    for (name, topics) in chapters {
        let content = topics
            .iter()
            .map(|(topic, explain, code)| {
                Topic::new(*topic, *explain, code.map(str::to_owned), None)
            })
            .collect::<Result<Vec<_>, _>>()?;
        defs.push(ChapterDefinition::new(*name, content)?);
    }
    let count = u32::try_from(defs.len())?;
    Ok(Course::new(
        CourseTitle::new(title)?,
        description,
        category,
        count,
        defs,
    )?)
}

fn demo_catalog() -> Result<Vec<Course>, Box<dyn std::error::Error>> {
    Ok(vec![
        build_course(
            "Python Fundamentals",
            "Variables, control flow and functions in Python.",
            "Coding",
            &[
                (
                    "Introduction",
                    &[
                        ("What is Python", "A general-purpose interpreted language.", None),
                        ("Hello World", "Print a line to the console.", Some("print('Hello, World!')")),
                    ],
                ),
                (
                    "Loops",
                    &[("for loops", "Iterate over any sequence.", Some("for i in range(3):\n    print(i)"))],
                ),
                (
                    "Functions",
                    &[("def", "Define reusable blocks of code.", Some("def greet(name):\n    return f'Hello, {name}'"))],
                ),
            ],
        )?,
        build_course(
            "Java Basics",
            "Classes, objects and the JVM.",
            "Coding",
            &[
                ("Getting Started", &[("The JVM", "Java compiles to bytecode.", None)]),
                ("Classes", &[("Objects", "Instances of classes.", Some("class Dog {}"))]),
            ],
        )?,
        build_course(
            "React Native",
            "Build mobile apps with JavaScript.",
            "Development",
            &[
                ("Setup", &[("Tooling", "Install Node and the Expo CLI.", None)]),
                ("Components", &[("View and Text", "The core building blocks.", None)]),
            ],
        )?,
        build_course(
            "SQL Essentials",
            "Querying relational databases.",
            "Database",
            &[
                ("SELECT", &[("Projection", "Choose columns.", Some("SELECT name FROM users;"))]),
                ("JOIN", &[("Inner join", "Combine matching rows.", None)]),
            ],
        )?,
    ])
}

fn demo_quizzes() -> Result<Vec<Quiz>, Box<dyn std::error::Error>> {
    let python = vec![
        Question::new(
            "Which keyword defines a function in Python?",
            vec!["func".into(), "def".into(), "fn".into()],
            "def",
        )?,
        Question::new(
            "What does len([1, 2, 3]) return?",
            vec!["2".into(), "3".into(), "4".into()],
            "3",
        )?,
    ];
    let sql = vec![Question::new(
        "Which clause filters rows?",
        vec!["WHERE".into(), "ORDER BY".into(), "GROUP BY".into()],
        "WHERE",
    )?];
    Ok(vec![
        Quiz::new(QuizId::new(1), "Python Quiz", python),
        Quiz::new(QuizId::new(2), "SQL Quiz", sql),
    ])
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;

    let courses = demo_catalog()?;
    for course in &courses {
        storage.catalog.upsert_course(course).await?;
    }

    let mut quiz_count = 0;
    if args.with_quizzes {
        for quiz in demo_quizzes()? {
            storage.quizzes.upsert_quiz(&quiz).await?;
            quiz_count += 1;
        }
    }

    println!(
        "Seeded {} courses and {} quizzes into {}",
        courses.len(),
        quiz_count,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
