use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use quiz_core::model::{Gender, ProfileDraft};
use services::DEFAULT_ADVANCE_DELAY;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz categories");
    eprintln!("  quiz register --name <n> --preferred-name <n> --gender <male|female> --age <1-120> [--avatar <url>]");
    eprintln!("  quiz profile");
    eprintln!("  quiz edit [--name <n>] [--preferred-name <n>] [--gender <g>] [--age <a>] [--avatar <url>]");
    eprintln!("  quiz play [<category>] [--difficulty <easy|medium|hard>]");
    eprintln!();
    eprintln!("Options for every command:");
    eprintln!("  --db <sqlite_url>        (default {DEFAULT_DB_URL})");
    eprintln!("  --questions <file.json>  (default: built-in questions)");
    eprintln!("  --advance-ms <ms>        (default {})", DEFAULT_ADVANCE_DELAY.as_millis());
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS, QUIZ_ADVANCE_MS, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidValue { flag, raw })
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub questions: Option<PathBuf>,
    pub advance_delay: Duration,
}

impl Config {
    /// Defaults overridden by `QUIZ_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_url = lookup("QUIZ_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let questions = lookup("QUIZ_QUESTIONS")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let advance_delay = lookup("QUIZ_ADVANCE_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(DEFAULT_ADVANCE_DELAY, Duration::from_millis);

        Self {
            db_url,
            questions,
            advance_delay,
        }
    }

    /// Apply a global flag. Returns `Ok(false)` if `flag` is not one.
    fn apply_flag(
        &mut self,
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match flag {
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                self.db_url = normalize_sqlite_url(value);
            }
            "--questions" => {
                self.questions = Some(PathBuf::from(require_value(args, "--questions")?));
            }
            "--advance-ms" => {
                let ms: u64 = parse_value("--advance-ms", require_value(args, "--advance-ms")?)?;
                self.advance_delay = Duration::from_millis(ms);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
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
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

/// Identity fields given on the command line; unset ones keep their value on edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub preferred_name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub avatar: Option<String>,
}

impl ProfileFields {
    fn apply_flag(
        &mut self,
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match flag {
            "--name" => self.name = Some(require_value(args, "--name")?),
            "--preferred-name" => {
                self.preferred_name = Some(require_value(args, "--preferred-name")?);
            }
            "--gender" => {
                self.gender = Some(parse_value("--gender", require_value(args, "--gender")?)?);
            }
            "--age" => self.age = Some(parse_value("--age", require_value(args, "--age")?)?),
            "--avatar" => self.avatar = Some(require_value(args, "--avatar")?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Draft for a new profile; every field but the avatar is required.
    pub fn into_new_draft(self) -> Result<ProfileDraft, ArgsError> {
        Ok(ProfileDraft {
            name: self.name.ok_or(ArgsError::MissingFlag { flag: "--name" })?,
            preferred_name: self.preferred_name.ok_or(ArgsError::MissingFlag {
                flag: "--preferred-name",
            })?,
            gender: self.gender.ok_or(ArgsError::MissingFlag { flag: "--gender" })?,
            age: self.age.ok_or(ArgsError::MissingFlag { flag: "--age" })?,
            avatar: self.avatar,
        })
    }

    /// Overlay the given fields onto an existing profile's draft.
    #[must_use]
    pub fn merge_into(self, mut draft: ProfileDraft) -> ProfileDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(preferred_name) = self.preferred_name {
            draft.preferred_name = preferred_name;
        }
        if let Some(gender) = self.gender {
            draft.gender = gender;
        }
        if let Some(age) = self.age {
            draft.age = age;
        }
        if let Some(avatar) = self.avatar {
            draft.avatar = Some(avatar);
        }
        draft
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Categories,
    Register(ProfileFields),
    Profile,
    Edit(ProfileFields),
    Play {
        category: Option<String>,
        difficulty: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: Config,
    pub command: Command,
}

impl Args {
    /// Parse arguments (without the program name) on top of `config`.
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        mut config: Config,
    ) -> Result<Option<Self>, ArgsError> {
        let mut args = argv.into_iter();
        let Some(first) = args.next() else {
            return Ok(None);
        };

        let mut command = match first.as_str() {
            "--help" | "-h" | "help" => return Ok(None),
            "categories" => Command::Categories,
            "register" => Command::Register(ProfileFields::default()),
            "profile" => Command::Profile,
            "edit" => Command::Edit(ProfileFields::default()),
            "play" => Command::Play {
                category: None,
                difficulty: None,
            },
            _ => return Err(ArgsError::UnknownCommand(first)),
        };

        while let Some(arg) = args.next() {
            if matches!(arg.as_str(), "--help" | "-h") {
                return Ok(None);
            }
            if config.apply_flag(&arg, &mut args)? {
                continue;
            }

            let handled = match &mut command {
                Command::Register(fields) | Command::Edit(fields) => {
                    fields.apply_flag(&arg, &mut args)?
                }
                Command::Play {
                    category,
                    difficulty,
                } => match arg.as_str() {
                    "--difficulty" => {
                        *difficulty = Some(require_value(&mut args, "--difficulty")?);
                        true
                    }
                    _ if !arg.starts_with('-') && category.is_none() => {
                        *category = Some(arg.clone());
                        true
                    }
                    _ => false,
                },
                Command::Categories | Command::Profile => false,
            };
            if !handled {
                return Err(ArgsError::UnknownArg(arg));
            }
        }

        Ok(Some(Self { config, command }))
    }
}
