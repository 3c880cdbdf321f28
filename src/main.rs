use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use schemaforge::describe::describe;
use schemaforge::project::{Project, is_project_file};
use schemaforge::schema::Schema;
use schemaforge::sql::{Dialect, GeneratorOptions, generate_with, import_sql};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Relational schema designer: DDL generation and import.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug events to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a DDL script from a project file
    Generate {
        /// Project file (.sf or .json)
        input: PathBuf,

        /// Target dialect: standard, postgresql, mysql, cockroachdb, sqlite, mssql, oracle
        #[arg(short, long, default_value = "standard")]
        dialect: Dialect,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Omit the leading comment block
        #[arg(long)]
        no_header: bool,
    },

    /// Import a DDL script into a new project
    Import {
        /// SQL file with CREATE TABLE statements
        input: PathBuf,

        /// Project name (default: the input file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Output project file, .sf or .json (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of a project or SQL file
    Describe {
        /// Project file (.sf or .json) or SQL file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            dialect,
            output,
            no_header,
        } => {
            let project = Project::load(&input)?;
            let schema = project.to_schema();
            let options = GeneratorOptions {
                header: !no_header,
                ..GeneratorOptions::default()
            };
            let sql = generate_with(schema.tables(), dialect, &options, Utc::now());
            write_output(output.as_deref(), &sql)?;
        }
        Commands::Import {
            input,
            name,
            output,
        } => {
            let schema = read_sql(&input)?;
            let name = name.unwrap_or_else(|| project_name(&input));
            let project = Project::from_schema(name, &schema);
            match output {
                Some(path) => {
                    project.save(&path)?;
                    eprintln!(
                        "Imported {} tables into {}",
                        schema.tables().len(),
                        path.display()
                    );
                }
                None => println!("{}", project.to_json_pretty()?),
            }
        }
        Commands::Describe { input } => {
            let schema = if is_project_file(&input) {
                Project::load(&input)?.to_schema()
            } else {
                read_sql(&input)?
            };
            print!("{}", describe(&schema));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_sql(path: &Path) -> Result<Schema> {
    let sql = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tables = import_sql(&sql).with_context(|| format!("Failed to import {}", path.display()))?;
    Ok(Schema::from_tables(tables))
}

fn project_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
