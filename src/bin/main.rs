use clap::Parser;
use color_eyre::Result;
use feedcard::app::App;
use feedcard::backend::types::Post;
use feedcard::backend::HttpPostStore;
use feedcard::config::Config;
use feedcard::utils::{get_config_dir, get_data_dir, initialize_panic_handler};
use std::env;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Post card with inline description editing.
struct Args {
    /// Path to a JSON file holding the post to show.
    #[arg(short, long)]
    post: PathBuf,
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Base URL of the feed service.
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Development mode
    #[arg(short, long)]
    dev: bool,
}

impl Args {
    fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            Ok(path.clone())
        } else {
            Self::default_config_path()
        }
    }
    fn default_config_path() -> Result<PathBuf> {
        let config_dir = get_config_dir()?;
        fs::create_dir_all(&config_dir)?;
        Ok(config_dir.join("feedcard.config.toml"))
    }
}

fn init_logger(dev: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if env::var("RUST_LOG").is_err() {
        if dev {
            // stderr belongs to the terminal UI
            let data_dir = get_data_dir()?;
            fs::create_dir_all(&data_dir)?;
            let file = File::create(data_dir.join("feedcard.log"))?;
            builder
                .filter_level(log::LevelFilter::Debug)
                .target(env_logger::Target::Pipe(Box::new(file)));
        } else {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = if args.config_path()?.exists() {
        toml::from_str(&fs::read_to_string(args.config_path()?)?)?
    } else {
        Config::default()
    };
    config.set_default_keybindings();
    if let Some(endpoint) = args.endpoint {
        config.persistence.endpoint = endpoint;
    }
    if let Ok(token) = env::var("FEEDCARD_TOKEN") {
        config.session.token = token;
    }
    config.dev |= args.dev;

    init_logger(config.dev)?;

    initialize_panic_handler()?;

    let post = serde_json::from_str::<Post>(&fs::read_to_string(&args.post)?)?;
    let store = HttpPostStore::new(&config.persistence)?;
    App::new(config, post, Arc::new(store)).run().await
}
