use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use storage::DocumentTemplate;

pub const DEFAULT_DATA_FILE: &str = "data.json";
pub const DEFAULT_TEMPLATE_FILE: &str = "data.template.json";
pub const DEFAULT_DB_URL: &str = "sqlite://tracker.sqlite3";
pub const DEFAULT_PROJECT_NAME: &str = "Suivi de Chantier";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidHost { raw: String },
    InvalidBackend { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidHost { raw } => write!(f, "invalid --host value: {raw}"),
            ArgsError::InvalidBackend { raw } => {
                write!(f, "invalid --backend value: {raw} (expected json, sqlite or memory)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Which store holds the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

impl FromStr for Backend {
    type Err = ArgsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(ArgsError::InvalidBackend {
                raw: raw.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub backend: Backend,
    pub data_file: PathBuf,
    /// Explicit template path; `None` falls back to `data.template.json` when present.
    pub template_file: Option<PathBuf>,
    pub db_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub project_name: String,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tracker [--backend json|sqlite|memory] [--data <path>] [--template <path>]");
    eprintln!("          [--db <sqlite_url>] [--host <addr>] [--port <port>] [--name <project>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --backend json");
    eprintln!("  --data {DEFAULT_DATA_FILE}");
    eprintln!("  --template {DEFAULT_TEMPLATE_FILE} (if present)");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --host 0.0.0.0 --port {DEFAULT_PORT}");
    eprintln!("  --name \"{DEFAULT_PROJECT_NAME}\"");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_BACKEND, TRACKER_DATA_FILE, TRACKER_TEMPLATE_FILE, TRACKER_DB_URL,");
    eprintln!("  TRACKER_HOST, PORT, TRACKER_PROJECT_NAME, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_port(raw: String) -> Result<u16, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidPort { raw })
}

fn parse_host(raw: String) -> Result<IpAddr, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidHost { raw })
}

fn parse_db_url(raw: String) -> Result<String, ArgsError> {
    if raw.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw });
    }
    Ok(normalize_sqlite_url(raw))
}

impl Args {
    /// Parse flags from `args`, reading defaults through `env`.
    ///
    /// Returns `Ok(None)` when help was requested.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags, missing values, or values that do not parse.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut parsed = Self {
            backend: env("TRACKER_BACKEND")
                .map(|raw| raw.parse::<Backend>())
                .transpose()?
                .unwrap_or_default(),
            data_file: env("TRACKER_DATA_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from),
            template_file: env("TRACKER_TEMPLATE_FILE").map(PathBuf::from),
            db_url: env("TRACKER_DB_URL")
                .map_or_else(|| Ok(normalize_sqlite_url(DEFAULT_DB_URL.into())), parse_db_url)?,
            host: env("TRACKER_HOST")
                .map(parse_host)
                .transpose()?
                .unwrap_or(IpAddr::from([0, 0, 0, 0])),
            port: env("PORT")
                .map(parse_port)
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            project_name: env("TRACKER_PROJECT_NAME")
                .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_owned()),
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--backend" => {
                    parsed.backend = require_value(&mut args, "--backend")?.parse::<Backend>()?;
                }
                "--data" => parsed.data_file = require_value(&mut args, "--data")?.into(),
                "--template" => {
                    parsed.template_file = Some(require_value(&mut args, "--template")?.into());
                }
                "--db" => parsed.db_url = parse_db_url(require_value(&mut args, "--db")?)?,
                "--host" => parsed.host = parse_host(require_value(&mut args, "--host")?)?,
                "--port" => parsed.port = parse_port(require_value(&mut args, "--port")?)?,
                "--name" => parsed.project_name = require_value(&mut args, "--name")?,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(parsed))
    }

    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Template used when the store is empty on first start.
    #[must_use]
    pub fn document_template(&self) -> DocumentTemplate {
        let path = self.template_file.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_TEMPLATE_FILE);
            default.exists().then_some(default)
        });
        DocumentTemplate::new(path, self.project_name.clone())
    }
}

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.contains("mode=memory") {
        return raw;
    }
    if raw
        .strip_prefix("sqlite://")
        .is_some_and(|path| Path::new(path).is_absolute())
    {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
///
/// # Errors
///
/// Returns an error if the URL has no path or the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
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
