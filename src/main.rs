use clap::Parser;

use profile_photo::cli::{handle_config_action, handle_edit, Args, Command};
use profile_photo::config::Config;

/// Load .env file and check for the remove.bg API key
///
/// Does not override existing environment variables.
/// Warns if the key is not set; removal will then fail before any request.
fn load_env(config: &Config) {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    let key_env = config.api_key_env();
    if std::env::var(key_env).is_err() {
        eprintln!("Warning: {} environment variable not set.", key_env);
        eprintln!("         Background removal will not be available.");
        eprintln!("         Set {} in .env or environment to enable.\n", key_env);
    }
}

/// Load the config file.
///
/// If --config is specified, require the file to exist.
/// Otherwise, fall back to defaults if the default config is missing or broken.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::load_from_explicit(path).map_err(|e| e.to_string()),
        None => match Config::load(None) {
            Ok(c) => Ok(c),
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Ok(Config::default())
            }
        },
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Edit(edit) => {
            load_env(&config);
            handle_edit(&edit, &config).await
        }
        Command::Config { action } => {
            let _ = dotenv::dotenv();
            handle_config_action(action, args.config.as_deref(), &config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
