//! A terminal chat client backed by an OpenAI-compatible streaming
//! endpoint.

#[macro_use]
extern crate tracing;

mod config;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tiny_chat_core::{ChatClient, ChatController};
use tiny_chat_model::TurnOptions;
use tiny_chat_openai_backend::{OpenAIBackend, OpenAIConfigBuilder};
use tokio::io::{self, AsyncBufReadExt};

use config::ChatConfig;

const BAR_CHAR: &str = "▎";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let config = match ChatConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {config_path}: {err}");
            std::process::exit(1);
        }
    };

    let mut builder = OpenAIConfigBuilder::with_api_key(config.api_key.clone())
        .with_endpoint(config.api_url.clone());
    if let Some(prompt) = &config.system_prompt {
        builder = builder.with_system_prompt(prompt.clone());
    }
    let backend = OpenAIBackend::new(builder.build());
    let mut controller = ChatController::new(ChatClient::new(backend));

    let mut opts = TurnOptions {
        model: config.models[0].clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    println!(
        "model: {} (/models to list, /model <name> to switch, /reset, /quit)",
        opts.model.bold()
    );

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();

        match line {
            "/quit" => break,
            "/reset" => {
                controller.reset();
                println!("(conversation cleared)");
                continue;
            }
            "/models" => {
                for model in &config.models {
                    let marker = if *model == opts.model { "*" } else { " " };
                    println!("{marker} {model}");
                }
                continue;
            }
            _ => {}
        }

        if let Some(model) = line.strip_prefix("/model ") {
            let model = model.trim();
            if config.models.iter().any(|m| m == model) {
                opts.model = model.to_owned();
                println!("(switched to {model})");
            } else {
                println!("unknown model: {model}");
            }
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let Some(mut turn) = controller.submit(&opts, line).await else {
            // Whitespace-only input is a no-op.
            progress_bar.finish_and_clear();
            continue;
        };

        let mut first = true;
        while let Some(fragment) = turn.next_fragment().await {
            if first {
                progress_bar.finish_and_clear();
                print!("{}🤖 ", BAR_CHAR.bright_cyan());
                first = false;
            }
            print!("{}", fragment.as_str().bright_white());
            std::io::stdout().flush().unwrap();
        }
        if first {
            // The reply ended without a single fragment.
            progress_bar.finish_and_clear();
        } else {
            println!();
        }
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
