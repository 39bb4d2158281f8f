use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use coursegate::api::{
    Backend, CachedBackend, CourseApi, EnrollmentApi, InMemoryBackend, LocalCache, RestClient,
};
use coursegate::course::Course;
use coursegate::draft::{ApiKeyManager, CompletionClient, DraftModel, DraftRequest, draft_course};
use coursegate::progress::{Enrollment, progress_report};
use coursegate::{App, Config};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coursegate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Course API base URL (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Student email (overrides the config file)
    #[arg(long, global = true)]
    student: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a course in the terminal viewer
    View {
        /// Course identifier on the backend
        course_id: Option<String>,

        /// View a course JSON file offline instead
        #[arg(long, conflicts_with = "course_id")]
        file: Option<PathBuf>,
    },
    /// Print lesson progress for a course
    Progress {
        course_id: String,

        /// Read the last cached copy instead of the backend
        #[arg(long)]
        cached: bool,
    },
    /// Draft a new course with quizzes using a language model
    Draft {
        /// What the course should teach
        topic: String,

        /// Number of lessons
        #[arg(long, default_value_t = 5)]
        lessons: u32,

        /// Intended audience
        #[arg(long)]
        audience: Option<String>,

        /// Write the course JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model to draft with
        #[arg(long)]
        model: Option<DraftModel>,
    },
    /// Store the drafting API key in the system keyring
    ///
    /// Without a key, reports whether one is stored.
    SetKey {
        key: Option<String>,

        /// Remove the stored key
        #[arg(long, conflicts_with = "key")]
        delete: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal owns stdout while the viewer runs
    let log_file = match &cli.command {
        Commands::View { .. } => Config::log_path().ok(),
        _ => None,
    };
    init_logging(log_file)?;
    let config = Config::load()?;

    match cli.command {
        Commands::View { course_id, file } => {
            let (backend, course_id, student): (Arc<dyn Backend>, String, String) = match file {
                Some(path) => {
                    let course = read_course(&path)?;
                    let student = cli
                        .student
                        .or_else(|| config.student_email.clone())
                        .unwrap_or_else(|| "local".to_string());
                    let course_id = course.id.clone();
                    let enrollment = Enrollment::new("local", student.clone(), course_id.clone());
                    let backend =
                        InMemoryBackend::new().with_course(course).with_enrollment(enrollment);
                    (Arc::new(backend), course_id, student)
                }
                None => {
                    let Some(course_id) = course_id else {
                        bail!("Give a course id or --file");
                    };
                    let student = student_email(cli.student, &config)?;
                    let backend = rest_backend(&config, cli.api_url)?;
                    (Arc::new(backend), course_id, student)
                }
            };

            tracing::info!(course_id = %course_id, backend = backend.backend_tag(), "opening course");
            let mut app = App::new(config.active_theme())?;
            app.run(backend, &course_id, &student).await?;
        }
        Commands::Progress { course_id, cached } => {
            let student = student_email(cli.student, &config)?;
            let backend = rest_backend(&config, cli.api_url)?;

            let (course, enrollment) = if cached {
                let course = backend
                    .peek_course(&course_id)
                    .with_context(|| format!("No cached copy of course {course_id}"))?;
                let enrollment = backend.peek_enrollment(&student, &course_id);
                if let Some(copy) = &enrollment {
                    println!("Cached {}", copy.cached_at.format("%Y-%m-%d %H:%M UTC"));
                }
                (course.value, enrollment.map(|copy| copy.value))
            } else {
                let course = backend.get_course(&course_id).await?;
                let mut enrollments = backend.find_enrollments(&student, &course_id).await?;
                if enrollments.len() > 1 {
                    tracing::warn!(count = enrollments.len(), "multiple enrollments found, using the first");
                }
                let enrollment = (!enrollments.is_empty()).then(|| enrollments.swap_remove(0));
                (course, enrollment)
            };

            print!("{}", progress_report(&course, enrollment.as_ref()));
        }
        Commands::Draft { topic, lessons, audience, output, model } => {
            let mut request = DraftRequest::new(topic, lessons);
            if let Some(audience) = audience {
                request = request.with_audience(audience);
            }

            let client = CompletionClient::new(ApiKeyManager::get_api_key()?)?;
            let course = draft_course(&client, model.unwrap_or(config.draft_model), &request).await?;
            for issue in course.validate() {
                tracing::warn!("Drafted course: {}", issue);
            }

            let json = serde_json::to_string_pretty(&course)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} lessons to {}", course.total_lessons(), path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::SetKey { key, delete } => match key {
            Some(key) => {
                ApiKeyManager::set_api_key(&key)?;
                println!("Stored API key {}", ApiKeyManager::mask_key(key.trim()));
            }
            None if delete => {
                ApiKeyManager::delete_api_key()?;
                println!("Removed the stored API key");
            }
            None if ApiKeyManager::has_api_key() => println!("An API key is stored"),
            None => println!("No API key stored. Run `coursegate set-key <key>`"),
        },
    }

    Ok(())
}

/// Log to `log_file` when given, otherwise to stderr
fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "coursegate=info".into());

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::options()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}

fn student_email(flag: Option<String>, config: &Config) -> Result<String> {
    flag.or_else(|| config.student_email.clone())
        .context("No student email: pass --student or set student_email in the config file")
}

fn rest_backend(config: &Config, api_url: Option<String>) -> Result<CachedBackend<RestClient>> {
    let base_url = api_url.unwrap_or_else(|| config.api_base_url.clone());
    let client =
        RestClient::from_env(base_url, Duration::from_secs(config.request_timeout_secs))?;
    Ok(CachedBackend::new(client, LocalCache::open_default()?))
}

fn read_course(path: &Path) -> Result<Course> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut course: Course = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a course file", path.display()))?;
    for lesson in &mut course.lessons {
        if let Some(mut quiz) = lesson.quiz().cloned() {
            quiz.normalize();
            lesson.set_quiz(Some(quiz));
        }
    }
    for issue in course.validate() {
        tracing::warn!("{}: {}", path.display(), issue);
    }
    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_key_accepts_key_delete_or_nothing() {
        let cli = Cli::try_parse_from(["coursegate", "set-key", "--delete"]).unwrap();
        assert!(matches!(cli.command, Commands::SetKey { key: None, delete: true }));

        let cli = Cli::try_parse_from(["coursegate", "set-key"]).unwrap();
        assert!(matches!(cli.command, Commands::SetKey { key: None, delete: false }));

        assert!(Cli::try_parse_from(["coursegate", "set-key", "sk-ant-x", "--delete"]).is_err());
    }

    #[test]
    fn view_takes_a_course_id_or_a_file() {
        let cli = Cli::try_parse_from(["coursegate", "--student", "s@example.com", "view", "rust-101"])
            .unwrap();
        assert_eq!(cli.student.as_deref(), Some("s@example.com"));
        assert!(matches!(cli.command, Commands::View { course_id: Some(_), file: None }));

        assert!(Cli::try_parse_from(["coursegate", "view", "c1", "--file", "c.json"]).is_err());
    }
}
