use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use translate_fulfillment::chat::ChatSession;
use translate_fulfillment::context::TRANSLATE_CONTEXT;
use translate_fulfillment::{Config, messages};

#[derive(Parser, Debug)]
#[command(
    name = "translate-fulfillment",
    version,
    about = "Conversational translation webhook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Translation API key (overrides environment variables)
    #[arg(short = 'k', long = "key", global = true)]
    key: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings", global = true)]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Listen address (default from settings [server] addr)
        #[arg(long = "addr")]
        addr: Option<String>,
    },
    /// Talk to the translate action from the terminal
    Chat {
        /// Name substituted for {nickname} in replies
        #[arg(long = "nickname", default_value = "you")]
        nickname: String,
    },
    /// Print the accepted language names and their codes
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    translate_fulfillment::logging::init(cli.verbose)?;
    let config = Config {
        key: cli.key,
        settings_path: cli.read_settings,
    };

    match cli.command {
        Commands::Serve { addr } => {
            let (settings, fulfillment) = translate_fulfillment::build_fulfillment(&config)?;
            let addr = addr.unwrap_or(settings.server_addr);
            translate_fulfillment::server::run_server(fulfillment, addr).await
        }
        Commands::Chat { nickname } => run_chat(&config, &nickname).await,
        Commands::Languages => {
            let (_, mapping) = translate_fulfillment::load_environment(&config)?;
            println!("{}", translate_fulfillment::format_languages(&mapping));
            Ok(())
        }
    }
}

async fn run_chat(config: &Config, nickname: &str) -> Result<()> {
    let (_, fulfillment) = translate_fulfillment::build_fulfillment(config)?;
    let mut session = ChatSession::new(fulfillment);
    println!("Chat mode. Use /quit or /exit to finish.");
    println!("Type /help to see available commands.");

    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    loop {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin_lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "/quit" | "/exit" => break,
            "/help" => print_chat_help(),
            "/languages" => println!(
                "{}",
                translate_fulfillment::format_languages(session.fulfillment().mapping())
            ),
            "/context" => match session.contexts().entry(TRANSLATE_CONTEXT) {
                Some(entry) => println!(
                    "{} (lifespan {}): {}",
                    TRANSLATE_CONTEXT,
                    entry.lifespan,
                    serde_json::to_string(&entry.parameters)?
                ),
                None => println!("{}: (none)", TRANSLATE_CONTEXT),
            },
            _ if input.starts_with('/') => eprintln!("unknown command: {}", input),
            _ => match session.turn(input).await {
                Ok(replies) => {
                    for reply in replies {
                        println!("{}", messages::address(&reply, nickname));
                    }
                }
                Err(err) => eprintln!("{}", err),
            },
        }
    }
    Ok(())
}

fn print_chat_help() {
    println!("Input:");
    println!("  text=<words> lang-to=<language> lang-from=<language>");
    println!("  Words before the first key are taken as text; omitted fields");
    println!("  are filled from the previous turns.");
    println!("Commands:");
    println!("  /quit, /exit   Exit chat mode");
    println!("  /languages     Show accepted language names");
    println!("  /context       Show the stored translation context");
}
