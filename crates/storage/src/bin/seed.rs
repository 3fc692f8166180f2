use std::fmt;
use std::path::PathBuf;

use storage::repository::Storage;
use tracker_core::model::AppData;
use tracker_core::template::sample_document;

#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    Sqlite(String),
}

#[derive(Debug, Clone)]
struct Args {
    target: Target,
    name: Option<String>,
    subtitle: Option<String>,
    empty: bool,
    force: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidOut { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidOut { raw } => write!(f, "invalid --out value: {raw}"),
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
        let mut target = Target::File(
            std::env::var("TRACKER_TEMPLATE_FILE")
                .map_or_else(|_| PathBuf::from("data.template.json"), PathBuf::from),
        );
        let mut name = None;
        let mut subtitle = None;
        let mut empty = false;
        let mut force = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => {
                    let value = require_value(&mut args, "--out")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidOut { raw: value });
                    }
                    target = Target::File(PathBuf::from(value));
                }
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if !value.starts_with("sqlite:") {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    target = Target::Sqlite(value);
                }
                "--name" => name = Some(require_value(&mut args, "--name")?),
                "--subtitle" => subtitle = Some(require_value(&mut args, "--subtitle")?),
                "--empty" => empty = true,
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            target,
            name,
            subtitle,
            empty,
            force,
        })
    }

    fn document(&self) -> AppData {
        let mut doc = if self.empty {
            AppData::fallback("Suivi de Chantier")
        } else {
            sample_document()
        };
        if let Some(name) = &self.name {
            doc.config.name.clone_from(name);
        }
        if let Some(subtitle) = &self.subtitle {
            doc.config.subtitle.clone_from(subtitle);
        }
        doc
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --out <path>          JSON file to write (default: data.template.json)");
    eprintln!("  --db <sqlite_url>     Write into a SQLite store instead of a file");
    eprintln!("  --name <text>         Override the project name");
    eprintln!("  --subtitle <text>     Override the project subtitle");
    eprintln!("  --empty               Write the minimal document instead of the sample site");
    eprintln!("  --force               Overwrite an existing document");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_TEMPLATE_FILE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let (storage, label) = match &args.target {
        Target::File(path) => (Storage::json_file(path.clone()), path.display().to_string()),
        Target::Sqlite(url) => (Storage::sqlite(url).await?, url.clone()),
    };

    if !args.force && storage.documents.exists().await? {
        eprintln!("{label} already holds a document; pass --force to overwrite.");
        std::process::exit(1);
    }

    let doc = args.document();
    storage.documents.replace(&doc).await?;

    println!(
        "Seeded {} with {} steps and {} records",
        label,
        doc.config.steps.len(),
        doc.tasks.len()
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
