mod args;
mod play;

use std::path::Path;

use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, ArgsError, Command, Config, ProfileFields, print_usage};
use quiz_core::model::Profile;
use services::{AppServices, Clock, ProfileServiceError, QuestionCatalog, ScoreAggregator};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

fn load_catalog(config: &Config) -> Result<QuestionCatalog, Box<dyn std::error::Error>> {
    let catalog = match &config.questions {
        Some(path) => {
            info!(path = %path.display(), "loading question catalog");
            QuestionCatalog::from_path(path)?
        }
        None => QuestionCatalog::builtin()?,
    };
    Ok(catalog)
}

async fn connect(config: &Config) -> Result<AppServices, Box<dyn std::error::Error>> {
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(
        &config.db_url,
        Clock::system(),
        load_catalog(config)?,
        config.advance_delay,
    )
    .await?;
    debug!(db = %config.db_url, "storage ready");
    Ok(services)
}

fn print_profile(profile: &Profile) {
    println!("{} ({})", profile.preferred_name(), profile.name());
    println!("  gender: {}", profile.gender());
    println!("  age:    {}", profile.age());
    println!("  avatar: {}", profile.avatar());

    let summary = ScoreAggregator::compute_summary(profile);
    println!(
        "  quizzes completed: {}, average score: {}%",
        summary.count, summary.average_percent
    );
    for (category, records) in profile.score_history() {
        let Some(last) = records.last() else {
            continue;
        };
        println!(
            "    {category}: {} played, last {}/{} ({}) on {}",
            records.len(),
            last.score(),
            last.total(),
            last.difficulty(),
            last.completed_at().format("%Y-%m-%d %H:%M")
        );
    }
}

async fn register(config: &Config, fields: ProfileFields) -> Result<(), Box<dyn std::error::Error>> {
    let draft = fields.into_new_draft()?;
    let services = connect(config).await?;
    let profile = services.profiles().register(draft).await?;
    println!("Welcome, {}!", profile.preferred_name());
    Ok(())
}

async fn edit(config: &Config, fields: ProfileFields) -> Result<(), Box<dyn std::error::Error>> {
    let services = connect(config).await?;
    let profiles = services.profiles();
    let current = profiles
        .load()
        .await?
        .ok_or(ProfileServiceError::NotRegistered)?;
    let profile = profiles.update(fields.merge_into(current.to_draft())).await?;
    print_profile(&profile);
    Ok(())
}

async fn show_profile(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let services = connect(config).await?;
    match services.profiles().load().await? {
        Some(profile) => print_profile(&profile),
        None => println!("No profile registered yet. Create one with `quiz register`."),
    }
    Ok(())
}

fn list_categories(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(config)?;
    let set = catalog.question_set();
    for info in catalog.categories() {
        let served = set.resolve_key(&info.id);
        let count = set.resolve(&info.id).len();
        if served == info.id {
            println!("{:<14} {} ({count} questions)", info.id, info.name);
        } else {
            println!("{:<14} {} (uses {served} questions)", info.id, info.name);
        }
        if !info.description.is_empty() {
            println!("{:<14} {}", "", info.description);
        }
    }
    Ok(())
}

async fn play(
    config: &Config,
    category: Option<String>,
    difficulty: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = connect(config).await?;
    if services.profiles().load().await?.is_none() {
        println!("No profile registered: scores from this game will not be saved.");
    }

    let quiz = services.quiz_loop();
    let category =
        category.unwrap_or_else(|| quiz.bank().question_set().default_category().to_string());
    let difficulty = difficulty.unwrap_or_default();
    let session = quiz.start_session(&category, &difficulty)?;
    println!(
        "{} quiz, {} difficulty, {} questions.",
        session.category(),
        session.difficulty(),
        session.total()
    );

    play::run((*quiz).clone(), session).await
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(parsed) = Args::parse(argv, Config::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let Args { config, command } = parsed;
    match command {
        Command::Categories => list_categories(&config),
        Command::Register(fields) => register(&config, fields).await,
        Command::Profile => show_profile(&config).await,
        Command::Edit(fields) => edit(&config, fields).await,
        Command::Play {
            category,
            difficulty,
        } => play(&config, category, difficulty).await,
    }
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

    let path = Path::new(path);
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

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
