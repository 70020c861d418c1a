use std::fmt;

use chrono::{Datelike, NaiveDate};
use reading_core::Clock;
use reading_core::model::{Book, BookId, GoalId, GoalType};
use reading_core::stats::{DayActivity, Intensity};
use services::{AppServices, GoalOverviewItem, MonthView};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownSubcommand(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    MissingFlag { flag: &'static str },
    InvalidGoalType { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownSubcommand(arg) => write!(f, "unknown subcommand: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::InvalidGoalType { raw } => write!(
                f,
                "invalid --type value: {raw} (expected daily_pages, monthly_books, or yearly_books)"
            ),
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

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: &str) -> Result<T, ArgsError> {
    raw.parse::<T>().map_err(|_| ArgsError::InvalidNumber {
        flag,
        raw: raw.to_owned(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Dashboard,
    Books,
    Log,
    Goals,
    Heatmap,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "dashboard" => Some(Self::Dashboard),
            "books" => Some(Self::Books),
            "log" => Some(Self::Log),
            "goals" => Some(Self::Goals),
            "heatmap" => Some(Self::Heatmap),
            _ => None,
        }
    }
}

/// What to do within `goals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GoalAction {
    List,
    Add,
    Done,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    json: bool,
    limit: u32,
    book: Option<BookId>,
    pages: Option<u32>,
    minutes: Option<u32>,
    notes: Option<String>,
    year: Option<i32>,
    month: Option<u32>,
    goal_action: GoalAction,
    goal_type: Option<GoalType>,
    target: Option<u32>,
    goal_id: Option<GoalId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let db_url = std::env::var("READTRACK_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://readtrack.sqlite3".into(), normalize_sqlite_url);

        let mut parsed = Self {
            db_url,
            json: false,
            limit: 20,
            book: None,
            pages: None,
            minutes: None,
            notes: None,
            year: None,
            month: None,
            goal_action: GoalAction::List,
            goal_type: None,
            target: None,
            goal_id: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "add" => parsed.goal_action = GoalAction::Add,
                "done" => parsed.goal_action = GoalAction::Done,
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--json" => parsed.json = true,
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    parsed.limit = parse_number("--limit", &value)?;
                }
                "--book" => {
                    let value = require_value(args, "--book")?;
                    parsed.book = Some(parse_number("--book", &value)?);
                }
                "--pages" => {
                    let value = require_value(args, "--pages")?;
                    parsed.pages = Some(parse_number("--pages", &value)?);
                }
                "--minutes" => {
                    let value = require_value(args, "--minutes")?;
                    parsed.minutes = Some(parse_number("--minutes", &value)?);
                }
                "--notes" => {
                    parsed.notes = Some(require_value(args, "--notes")?);
                }
                "--year" => {
                    let value = require_value(args, "--year")?;
                    parsed.year = Some(parse_number("--year", &value)?);
                }
                "--month" => {
                    let value = require_value(args, "--month")?;
                    parsed.month = Some(parse_number("--month", &value)?);
                }
                "--type" => {
                    let value = require_value(args, "--type")?;
                    let goal_type = value
                        .parse::<GoalType>()
                        .map_err(|_| ArgsError::InvalidGoalType { raw: value })?;
                    parsed.goal_type = Some(goal_type);
                }
                "--target" => {
                    let value = require_value(args, "--target")?;
                    parsed.target = Some(parse_number("--target", &value)?);
                }
                "--id" => {
                    let value = require_value(args, "--id")?;
                    parsed.goal_id = Some(parse_number("--id", &value)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn required<T: Copy>(value: Option<T>, flag: &'static str) -> Result<T, ArgsError> {
        value.ok_or(ArgsError::MissingFlag { flag })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- dashboard [--json]");
    eprintln!("  cargo run -p app -- books [--limit <n>]");
    eprintln!("  cargo run -p app -- log --book <id> --pages <n> --minutes <n> [--notes <text>]");
    eprintln!("  cargo run -p app -- goals [--json]");
    eprintln!("  cargo run -p app -- goals add --type <goal_type> --target <n>");
    eprintln!("  cargo run -p app -- goals done --id <id>");
    eprintln!("  cargo run -p app -- heatmap [--year <y>] [--month <m>]");
    eprintln!();
    eprintln!("Goal types: daily_pages, monthly_books, yearly_books");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:readtrack.sqlite3 (or READTRACK_DB_URL)");
    eprintln!("  heatmap year/month default to the current calendar month");
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: show the dashboard when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Dashboard,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Dashboard,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            let err = ArgsError::UnknownSubcommand(first.to_owned());
            eprintln!("{err}");
            print_usage();
            err
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") && Command::from_arg(&argv[0]).is_some() {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let clock = Clock::default_clock();
    let services = AppServices::new_sqlite(&args.db_url, clock).await?;

    match cmd {
        Command::Dashboard => show_dashboard(&services, &args).await,
        Command::Books => show_books(&services, &args).await,
        Command::Log => log_reading(&services, &args).await,
        Command::Goals => handle_goals(&services, &args).await,
        Command::Heatmap => show_heatmap(&services, &args, clock).await,
    }
}

async fn show_dashboard(
    services: &AppServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = services.stats().dashboard(6).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view.stats)?);
        return Ok(());
    }

    let stats = &view.stats;
    println!(
        "Books: {} total · {} in progress · {} completed",
        stats.total_books, stats.books_in_progress, stats.books_completed
    );
    println!(
        "Today: {} pages · streak {} days",
        stats.pages_read_today, stats.current_streak
    );
    println!(
        "This month: {} books completed",
        stats.books_completed_this_month
    );

    if !view.recent_books.is_empty() {
        println!();
        println!("Recent books:");
        for book in &view.recent_books {
            println!("  {}", format_book_line(book));
        }
    }
    Ok(())
}

async fn show_books(
    services: &AppServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let books = services.books().list_books(args.limit).await?;
    if books.is_empty() {
        println!("No books cataloged yet. Add one, then `log` a session against it.");
        return Ok(());
    }
    for book in &books {
        println!("{}", format_book_line(book));
    }
    Ok(())
}

fn format_book_line(book: &Book) -> String {
    let progress = match book.progress_percent() {
        Some(pct) => format!(
            " {}/{} ({pct}%)",
            book.current_page(),
            book.total_pages()
        ),
        None => String::new(),
    };
    format!(
        "#{} {} — {} [{}]{}",
        book.id(),
        book.title(),
        book.author(),
        book.status().as_str(),
        progress
    )
}

async fn log_reading(
    services: &AppServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let book_id = Args::required(args.book, "--book")?;
    let pages = Args::required(args.pages, "--pages")?;
    let minutes = Args::required(args.minutes, "--minutes")?;

    let logged = services
        .reading()
        .log_reading(book_id, pages, minutes, args.notes.clone())
        .await?;

    println!(
        "Logged {pages} pages ({minutes} min) against #{} {}",
        logged.book.id(),
        logged.book.title()
    );
    if logged.book.status() == reading_core::model::BookStatus::Completed {
        println!("Finished! {} is complete.", logged.book.title());
    } else if let Some(pct) = logged.book.progress_percent() {
        println!(
            "Now at page {}/{} ({pct}%)",
            logged.book.current_page(),
            logged.book.total_pages()
        );
    }
    Ok(())
}

async fn handle_goals(
    services: &AppServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.goal_action {
        GoalAction::Add => {
            let goal_type = args
                .goal_type
                .ok_or(ArgsError::MissingFlag { flag: "--type" })?;
            let target = Args::required(args.target, "--target")?;
            let goal_id = services.goals().create_goal(goal_type, target).await?;
            println!("Created goal #{goal_id} ({goal_type}, target {target})");
        }
        GoalAction::Done => {
            let goal_id = Args::required(args.goal_id, "--id")?;
            services.goals().deactivate_goal(goal_id).await?;
            println!("Deactivated goal #{goal_id}");
        }
        GoalAction::List => {
            let overview = services.goals().overview().await?;
            if args.json {
                let items: Vec<serde_json::Value> = overview
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "id": item.goal.id().value(),
                            "goal_type": item.goal.goal_type().as_str(),
                            "progress": item.progress,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }

            if overview.is_empty() {
                println!("No active goals. Create one with `goals add`.");
                return Ok(());
            }
            for item in &overview {
                println!("{}", format_goal_line(item));
            }
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_goal_line(item: &GoalOverviewItem) -> String {
    let trophy = if item.progress.achieved() {
        "  << achieved"
    } else {
        ""
    };
    let pct = item.progress.percentage().round() as u32;
    format!(
        "#{} {} — {}/{} ({pct}%){trophy}",
        item.goal.id(),
        item.goal.goal_type(),
        item.progress.current(),
        item.progress.target(),
    )
}

async fn show_heatmap(
    services: &AppServices,
    args: &Args,
    clock: Clock,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = clock.today();
    let year = args.year.unwrap_or_else(|| today.year());

    // A bare --year asks for the whole year; otherwise render one month.
    if args.month.is_none() && args.year.is_some() {
        let days = services.stats().heatmap(year).await?;
        render_year(year, &days);
        return Ok(());
    }

    let month = args.month.unwrap_or_else(|| today.month());
    let view = services.stats().month_view(year, month).await?;
    render_month(&view, year, month);
    Ok(())
}

fn render_year(year: i32, days: &std::collections::BTreeMap<NaiveDate, DayActivity>) {
    println!("{year} reading activity");
    for month in 1..=12_u32 {
        let (mut active_days, mut pages) = (0_u32, 0_u32);
        for (date, activity) in days {
            if date.month() == month {
                active_days += 1;
                pages = pages.saturating_add(activity.pages);
            }
        }
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b").to_string())
            .unwrap_or_default();
        println!("{label:<4} {active_days:>3} days {pages:>6} pages");
    }
}

fn intensity_glyph(intensity: Intensity) -> &'static str {
    match intensity {
        Intensity::None => " . ",
        Intensity::Low => " - ",
        Intensity::Medium => " + ",
        Intensity::High => " * ",
        Intensity::Max => " # ",
    }
}

fn render_month(view: &MonthView, year: i32, month: u32) {
    if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
        println!("{}", first.format("%B %Y"));
    }
    println!(" Su Mo Tu We Th Fr Sa");

    let mut column = 0;
    for _ in 0..view.grid.leading_blanks() {
        print!("   ");
        column += 1;
    }
    for date in view.grid.days() {
        let intensity = view
            .days
            .get(&date)
            .map_or(Intensity::None, |activity| activity.intensity());
        print!("{}", intensity_glyph(intensity));
        column += 1;
        if column == 7 {
            println!();
            column = 0;
        }
    }
    if column != 0 {
        println!();
    }

    println!();
    println!(
        "{} sessions · {} pages · {} pages/session",
        view.summary.sessions, view.summary.pages, view.summary.avg_pages_per_session
    );
    println!("legend: . none  - <10  + <25  * <50  # 50+");
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
