use std::num::NonZeroUsize;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod chat;
pub mod describe;

use crate::core::AppConfig;

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Start an interactive chat session
    Chat {
        /// Model identifier sent with every request
        #[arg(long, default_value = "mistral")]
        model: String,

        /// Keep at most this many user and assistant messages
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_turns: Option<u64>,
    },
    /// Ask a vision model about an image in a single request
    Describe {
        #[arg(long, default_value = "idefics2")]
        model: String,

        #[arg(long, default_value = describe::DEFAULT_IMAGE_URL)]
        image_url: String,

        #[arg(long, default_value = describe::DEFAULT_PROMPT)]
        prompt: String,

        /// Print every HTTP request and response
        #[arg(long, action, default_value = "false")]
        log_http: bool,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the OpenAI compatible API, e.g. http://localhost:1234/v1/
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Applies flags on top of `base` (defaults and environment) and
/// picks the command to run. No subcommand means chat.
fn resolve(args: Cli, mut base: AppConfig) -> (AppConfig, Command) {
    if let Some(url) = args.api_base_url {
        base.api_base_url = url;
    }
    if let Some(key) = args.api_key {
        base.api_key = key;
    }

    let command = args.command.unwrap_or(Command::Chat {
        model: chat::DEFAULT_MODEL.to_string(),
        max_turns: None,
    });
    if let Command::Chat {
        max_turns: Some(n), ..
    } = &command
    {
        base.max_turns = NonZeroUsize::new(*n as usize);
    }

    (base, command)
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    init_tracing();

    let (config, command) = resolve(args, AppConfig::default());

    // Handle each sub command
    match command {
        Command::Chat { model, .. } => {
            chat::run(&config, &model).await?;
        }
        Command::Describe {
            model,
            image_url,
            prompt,
            log_http,
        } => {
            describe::run(&config, &model, &image_url, &prompt, log_http).await?;
        }
    }

    Ok(())
}
