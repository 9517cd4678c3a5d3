//! Sage CLI
//!
//! Commands:
//!   ask    - Ask the Sage a question, optionally with book context
//!   health - Check whether the configured provider is reachable
//!   info   - Show provider metadata and capabilities

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::str::FromStr;

use sage::{Config, ProviderKind, QuestionContext, Sage};

#[derive(Parser)]
#[command(name = "sage")]
#[command(about = "AI tutor for classical reading")]
#[command(version)]
struct Cli {
    /// Override the configured provider (openai, anthropic, local, ollama)
    #[arg(short, long)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the Sage a question
    Ask {
        /// The question to ask
        question: String,

        /// Title of the book being read
        #[arg(long)]
        title: Option<String>,

        /// Author of the book being read
        #[arg(long)]
        author: Option<String>,

        /// Passage the question refers to
        #[arg(long)]
        passage: Option<String>,
    },

    /// Check whether the configured provider is reachable
    Health,

    /// Show provider metadata and capabilities
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?.unwrap_or_default();
    config.apply_env();

    let kind = match &cli.provider {
        Some(value) => ProviderKind::from_str(value)?,
        None => config.provider,
    };

    let sage = Sage::new(kind, config.provider_config(kind))?;

    match cli.command {
        Commands::Ask {
            question,
            title,
            author,
            passage,
        } => {
            let context = QuestionContext {
                book_title: title,
                book_author: author,
                passage_text: passage,
                user_id: None,
            };

            let response = sage.ask(&question, &context).await?;

            println!("{}", response.answer.trim());
            println!();
            let mut meta = format!(
                "{} · {} · {:.2?}",
                response.provider, response.model, response.response_time
            );
            if response.tokens_used > 0 {
                meta.push_str(&format!(" · {} tokens", response.tokens_used));
            }
            println!("{}", meta.dimmed());
        }

        Commands::Health => {
            let info = sage.provider_info();
            match sage.health_check().await {
                Ok(()) => {
                    println!(
                        "{} {} ({}) is healthy as of {}",
                        "✓".green(),
                        info.name,
                        info.model,
                        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                Err(err) => {
                    println!("{} {} is unhealthy: {}", "✗".red(), info.name, err);
                    std::process::exit(1);
                }
            }
        }

        Commands::Info => {
            let info = sage.provider_info();
            let caps = sage.capabilities();

            println!("{}", info.name.bold());
            println!("  provider:       {}", info.provider);
            println!("  model:          {}", info.model);
            println!("  version:        {}", info.version);
            println!("  local:          {}", info.is_local);
            println!("  cost:           {}", info.cost);
            println!("  description:    {}", info.description);
            println!();
            println!("{}", "Capabilities".bold());
            println!("  streaming:      {}", caps.supports_streaming);
            println!("  conversations:  {}", caps.supports_conversations);
            println!("  languages:      {}", caps.supported_languages.join(", "));
            println!("  max tokens:     {}", caps.max_tokens);
            println!("  context length: {}", caps.max_context_length);
            println!("  documents:      {}", caps.supports_documents);
            println!("  images:         {}", caps.supports_images);
        }
    }

    Ok(())
}
