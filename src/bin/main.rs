use clap::Parser;
use crossterm::style::Stylize;
use crossterm::{cursor::MoveTo, execute, terminal::{Clear, ClearType}};
use log::error;
use markov_core::config::Config;
use markov_core::persistence::FileStore;
use markov_core::responder;
use markov_core::validator::HttpValidator;
use markov_core::{CommunityRegistry, MediaKind};
use rand::Rng;
use std::io::{stdin, stdout, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;

const BOT_NAME: &str = "@rolando";
const TALK_LENGTH: RangeInclusive<usize> = 4..=24;

/// Chat with one community's model from the terminal.
#[derive(Parser, Debug)]
#[command(name = "markov_engine")]
struct Args {
    /// JSON config file; MARKOV_* variables override it.
    #[arg(short, long, env = "MARKOV_CONFIG")]
    config: Option<PathBuf>,

    /// Community to simulate.
    #[arg(long, default_value = "local")]
    community: String,

    /// Overrides the configured data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = run(Args::parse()).await {
        error!("{}", e);
        eprintln!("{} {}", "[ERROR]".red(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let validator = Arc::new(HttpValidator::new(config.validation_timeout())?);
    let registry = CommunityRegistry::new(config, store, validator);
    let community = args.community;
    registry.register(&community);

    print_banner(&registry, &community).await?;

    loop {
        print!("\n{} ", ">".dark_grey());
        stdout().flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim_end_matches(['\r', '\n']);

        match line {
            "exit" => break,
            "" => continue,
            s if s.starts_with(':') => run_command(&registry, &community, &s[1..]).await?,
            message => {
                registry.observe(&community, message).await;
                let mentioned = message.contains(BOT_NAME);
                if let Some(reply) = registry.reply(&community, mentioned).await {
                    say(&reply);
                }
            }
        }
    }

    println!("{}", "Bye.".dark_grey());
    Ok(())
}

async fn run_command(
    registry: &CommunityRegistry,
    community: &str,
    command: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    let Some(shared) = registry.get(community) else {
        return Ok(());
    };

    match name {
        "talk" => {
            let length = rand::thread_rng().gen_range(TALK_LENGTH);
            say_or_silent(shared.lock().await.talk(length));
        }
        "ping" => say_or_silent(responder::ping(&*shared.lock().await, &mut rand::thread_rng())),
        "gif" | "image" | "video" => {
            let kind = match name {
                "gif" => MediaKind::Gif,
                "image" => MediaKind::Image,
                _ => MediaKind::Video,
            };
            if let Some(url) = registry.get_media(community, kind).await {
                say(&url);
            }
        }
        "opinion" => {
            let chain = shared.lock().await;
            say_or_silent(responder::opinion(&chain, rest, &mut rand::thread_rng()));
        }
        "delete" => {
            let found = registry.delete_message(community, rest).await.unwrap_or(false);
            note(&responder::deletion_notice(found, rest));
        }
        "rate" => match rest.parse::<u32>() {
            Ok(rate) => {
                registry.set_reply_rate(community, rate).await?;
                note(&format!("Reply rate set to {}", rate));
            }
            Err(_) => note("Usage: :rate <number>"),
        },
        "hiero" => {
            let chain = shared.lock().await;
            let text = (!rest.is_empty()).then_some(rest);
            say_or_silent(responder::hieroglyphs(&chain, text, &mut rand::thread_rng()));
        }
        "unhiero" => say(&responder::unhieroglyphs(rest)),
        "stats" => {
            if let Some(stats) = registry.analytics(community).await {
                note(&serde_json::to_string_pretty(&stats)?);
            }
        }
        "reset" => {
            registry.reset(community).await?;
            note("All the training data for this community has been deleted, i am now a blank slate.");
        }
        _ => note("Commands: :talk :ping :gif :image :video :opinion <text> :delete <text> :rate <n> :hiero [text] :unhiero <text> :stats :reset, or 'exit'"),
    }
    Ok(())
}

async fn print_banner(registry: &CommunityRegistry, community: &str) -> std::io::Result<()> {
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Community Markov Simulator".bold());
    println!("---------------------------------------------------------------");
    println!("Type messages to teach the model. Mention {} to get a reply.", BOT_NAME);
    println!("Commands start with ':' (try ':help'). 'exit' to quit.");
    if let Some(stats) = registry.analytics(community).await {
        println!(
            "\nCommunity '{}': {} words, {} gifs, {} images, {} videos, reply rate {}",
            community, stats.words, stats.gifs, stats.images, stats.videos, stats.reply_rate
        );
    }
    Ok(())
}

fn say(text: &str) {
    println!("{} {}", "rolando:".green().bold(), text);
}

fn say_or_silent(text: Option<String>) {
    match text {
        Some(text) => say(&text),
        None => note("I have nothing to say yet."),
    }
}

fn note(text: &str) {
    println!("{}", text.dark_yellow());
}
