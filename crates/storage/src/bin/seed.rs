use std::fmt;

use chrono::{DateTime, Duration, Utc};
use reading_core::model::{BookDraft, BookId, Goal, GoalId, GoalType};
use storage::repository::{
    BookRepository, GenreRepository, GoalRepository, NewBookRecord, NewGenreRecord,
    NewGoalRecord, NewSessionRecord, SessionRepository, Storage,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    books: u32,
    days: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidBooks { raw: String },
    InvalidDays { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBooks { raw } => write!(f, "invalid --books value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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
            std::env::var("READTRACK_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut books = std::env::var("READTRACK_SEED_BOOKS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(4);
        let mut days = std::env::var("READTRACK_SEED_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut now: Option<DateTime<Utc>> = None;

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
                "--books" => {
                    let value = require_value(&mut args, "--books")?;
                    books = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidBooks { raw: value.clone() })?;
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            books,
            days,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --books <n>         Number of sample books to insert (default: 4)");
    eprintln!("  --days <n>          Consecutive past days to log sessions for (default: 5)");
    eprintln!("  --now <rfc3339>     Fixed current time for deterministic seeding");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  READTRACK_DB_URL, READTRACK_SEED_BOOKS, READTRACK_SEED_DAYS");
}

const SAMPLE_BOOKS: [(&str, &str, u32); 6] = [
    ("The Left Hand of Darkness", "Ursula K. Le Guin", 304),
    ("Kindred", "Octavia E. Butler", 288),
    ("The Master and Margarita", "Mikhail Bulgakov", 384),
    ("Convenience Store Woman", "Sayaka Murata", 163),
    ("Piranesi", "Susanna Clarke", 245),
    ("The Dispossessed", "Ursula K. Le Guin", 387),
];

const DEFAULT_GENRES: [(&str, &str); 4] = [
    ("Fantasy", "#8b5cf6"),
    ("Science Fiction", "#6366f1"),
    ("Literary Fiction", "#10b981"),
    ("Non-fiction", "#f59e0b"),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut genre_ids = Vec::new();
    if storage.genres.list_genres().await?.is_empty() {
        for (name, color) in DEFAULT_GENRES {
            let id = storage
                .genres
                .insert_new_genre(NewGenreRecord {
                    name: name.to_owned(),
                    color: color.to_owned(),
                    is_default: true,
                    created_at: now,
                })
                .await?;
            genre_ids.push(id);
        }
    } else {
        genre_ids = storage
            .genres
            .list_genres()
            .await?
            .iter()
            .map(reading_core::model::Genre::id)
            .collect();
    }

    let mut book_ids = Vec::new();
    for i in 0..args.books {
        let idx = (i as usize) % SAMPLE_BOOKS.len();
        let (title, author, pages) = SAMPLE_BOOKS[idx];
        let mut draft = BookDraft::new(title, author).with_total_pages(pages);
        if let Some(genre_id) = genre_ids.get(idx % genre_ids.len().max(1)) {
            draft = draft.with_genre(*genre_id);
        }
        let book = draft.build(BookId::new(0), now - Duration::days(i64::from(args.days)))?;
        let id = storage
            .books
            .insert_new_book(NewBookRecord::from_book(&book))
            .await?;
        book_ids.push(id);
    }

    // One session per past day, rotating through the seeded books. Every day
    // gets an entry so the streak and heatmap have visible data.
    let mut sessions = 0_u32;
    for day in 0..args.days {
        let Some(&book_id) = book_ids.get((day as usize) % book_ids.len().max(1)) else {
            break;
        };
        let at = now - Duration::days(i64::from(day));
        let pages = 12 + (day % 4) * 9;

        let mut book = storage
            .books
            .get_book(book_id)
            .await?
            .ok_or("seeded book vanished")?;
        let start_page = book.current_page();
        book.apply_session(pages, at);

        let record = NewSessionRecord {
            book_id,
            session_date: at.date_naive(),
            pages_read: pages,
            start_page: Some(start_page),
            end_page: Some(book.current_page()),
            duration_minutes: 20 + (day % 3) * 10,
            notes: None,
            created_at: at,
        };
        storage.sessions.log_reading(record, &book).await?;
        sessions += 1;
    }

    let goal = Goal::starting(
        GoalId::new(0),
        GoalType::DailyPages,
        30,
        now.date_naive(),
        now,
    )?;
    storage
        .goals
        .insert_new_goal(NewGoalRecord::from_goal(&goal))
        .await?;

    println!(
        "Seeded {} books, {} sessions, {} genres, and a daily goal into {}",
        book_ids.len(),
        sessions,
        genre_ids.len(),
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
