mod export;
mod seed;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use travlr_core::Role;
use travlr_core::user::Registration;
use travlr_core::validation::{Mode, Validate};
use travlr_db::{Database, DatabaseConfig};

use export::{Collection, CsvRow, Format};
use seed::SeedFile;

#[derive(Parser)]
#[command(name = "travlr", version, about = "Admin tools for the Travlr API")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Connection pool size
    #[arg(long, global = true, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Replace all data with the contents of a seed file
    Seed {
        /// JSON file with users, trips, rooms, meals and news
        file: PathBuf,
    },

    /// Create an account
    CreateUser {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Reads from TRAVLR_USER_PASSWORD if not provided
        #[arg(short, long, env = "TRAVLR_USER_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(short, long, default_value = "user")]
        role: Role,
    },

    /// Write every item of a collection to stdout or a file
    Export {
        #[arg(value_enum)]
        resource: Collection,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so exports can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("travlr=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = database_config(cli.database_url, cli.max_connections)?;

    match cli.command {
        Commands::Migrate => {
            connect_db(&config).await?;
            tracing::info!("Migrations applied");
        }
        Commands::Seed { file } => {
            let db = connect_db(&config).await?;
            cmd_seed(&file, &db).await?;
        }
        Commands::CreateUser {
            name,
            email,
            password,
            role,
        } => {
            let db = connect_db(&config).await?;
            let registration = Registration {
                name,
                email,
                password,
                role: Some(role),
            };
            cmd_create_user(registration, &db).await?;
        }
        Commands::Export {
            resource,
            format,
            output,
        } => {
            let db = connect_db(&config).await?;
            cmd_export(resource, format, output.as_deref(), &db).await?;
        }
    }

    Ok(())
}

fn database_config(url: Option<String>, max_connections: u32) -> Result<DatabaseConfig> {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        bail!("DATABASE_URL not set. Pass --database-url or set the environment variable.");
    };
    if max_connections == 0 {
        bail!("--max-connections must be at least 1");
    }
    Ok(DatabaseConfig {
        url,
        max_connections,
    })
}

/// Connect and bring the schema up to date.
async fn connect_db(config: &DatabaseConfig) -> Result<Database> {
    let db = Database::connect(config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_seed(file: &Path, db: &Database) -> Result<()> {
    let mut seed = SeedFile::load(file)?;
    seed.prepare()?;

    let summary = seed.apply(db).await?;
    tracing::info!(
        users = summary.users,
        trips = summary.trips,
        rooms = summary.rooms,
        meals = summary.meals,
        news = summary.news,
        "Database seeded"
    );
    println!(
        "Seeded {} users, {} trips, {} rooms, {} meals, {} news articles",
        summary.users, summary.trips, summary.rooms, summary.meals, summary.news
    );
    Ok(())
}

async fn cmd_create_user(mut registration: Registration, db: &Database) -> Result<()> {
    registration.normalize();
    registration
        .validate(Mode::Create)
        .map_err(|e| anyhow::anyhow!("Invalid user: {e}"))?;

    let user = seed::insert_user(&db.users(), registration).await?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

async fn cmd_export(
    resource: Collection,
    format: Format,
    output: Option<&Path>,
    db: &Database,
) -> Result<()> {
    match resource {
        Collection::Trips => emit(&export::collect_all(&db.trips()).await?, format, output),
        Collection::Rooms => emit(&export::collect_all(&db.rooms()).await?, format, output),
        Collection::Meals => emit(&export::collect_all(&db.meals()).await?, format, output),
        Collection::News => emit(&export::collect_all(&db.news()).await?, format, output),
    }
}

fn emit<T>(items: &[T], format: Format, output: Option<&Path>) -> Result<()>
where
    T: serde::Serialize + CsvRow,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            export::write_items(items, format, &mut out)?;
            out.flush()?;
            tracing::info!(count = items.len(), path = %path.display(), "Export written");
        }
        None => {
            let stdout = io::stdout();
            export::write_items(items, format, stdout.lock())?;
        }
    }
    Ok(())
}
