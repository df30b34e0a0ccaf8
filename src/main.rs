use sql_insights::config::InsightsConfig;
use sql_insights::llm::LlmClient;
use sql_insights::pipeline::InsightsPipeline;
use sql_insights::render::render_answer;
use sql_insights::schema::SchemaIntrospector;
use sql_insights::seed::{seed_employees, seed_movies, SeedOptions};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sql-insights")]
#[command(about = "Ask questions about a SQLite database in plain English")]
#[command(version)]
struct Args {
    /// Path to the SQLite database (or set INSIGHTS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name (or set OPENAI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat completions base URL (or set OPENAI_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a question to SQL, run it and print the result
    Ask {
        /// The question in natural language
        question: String,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask questions interactively, one per line
    Repl,
    /// Print the database schema
    Schema,
    /// Create the database file with synthetic data
    Seed {
        #[arg(long, value_enum, default_value_t = Domain::Movies)]
        domain: Domain,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Domain {
    Movies,
    Employees,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sql_insights=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    match args.command {
        Commands::Ask { question, json } => run_ask(&config, &question, json).await,
        Commands::Repl => run_repl(&config).await,
        Commands::Schema => {
            let introspector = SchemaIntrospector::new(&config.db_path, config.busy_timeout());
            println!("{}", introspector.describe_schema()?);
            Ok(())
        }
        Commands::Seed { domain, seed } => {
            let options = SeedOptions { seed, ..Default::default() };
            let summary = match domain {
                Domain::Movies => seed_movies(&config.db_path, &options)?,
                Domain::Employees => seed_employees(&config.db_path, &options)?,
            };
            println!(
                "Created '{}' with tables {} ({} rows).",
                config.db_path.display(),
                summary.tables.join(", "),
                summary.rows
            );
            Ok(())
        }
    }
}

fn build_config(args: &Args) -> Result<InsightsConfig> {
    let mut config = InsightsConfig::from_env()?;
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(key) = &args.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

fn build_pipeline(config: &InsightsConfig) -> Result<InsightsPipeline> {
    let client = LlmClient::from_config(config)?;
    Ok(InsightsPipeline::new(config, Arc::new(client)))
}

async fn run_ask(config: &InsightsConfig, question: &str, json: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let answer = pipeline.ask(question).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", render_answer(&answer));
    }
    Ok(())
}

async fn run_repl(config: &InsightsConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("question> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        // A failed question does not end the session
        match pipeline.ask(question).await {
            Ok(answer) => println!("{}", render_answer(&answer)),
            Err(e) => {
                error!("{}", e);
                println!("Error: {}", e);
            }
        }
    }
    Ok(())
}
