//! shelfview: browse a bookmark server from the terminal.
//!
//! Usage: `shelfview [search words...] [--page N]`. Search words are joined
//! with spaces and parsed like the search box, so `#tag` filters by tag.
//! `--set key=value` and `--reset-settings` edit the settings file instead.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shelfview::app::HomeView;
use shelfview::managers::history_manager::{entry_url, MemoryNavigator};
use shelfview::managers::page_state_manager::PageStateTrait;
use shelfview::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use shelfview::services::transport::HttpTransport;

/// Browse a bookmark server from the terminal
#[derive(Parser, Debug)]
#[command(name = "shelfview", version, long_about = None)]
struct Args {
    /// Search words; `#tag` or `"#two words"` filters by tag
    words: Vec<String>,

    /// Page of the results to show
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Change a setting and exit, e.g. `--set server.base_url=http://nas:8080`
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
    set: Vec<(String, serde_json::Value)>,

    /// Restore the default settings and exit (applied before any --set)
    #[arg(long = "reset-settings")]
    reset_settings: bool,
}

impl Args {
    fn search(&self) -> String {
        self.words.join(" ")
    }

    fn changes_settings(&self) -> bool {
        self.reset_settings || !self.set.is_empty()
    }
}

/// `key=value`, where a value that is not valid JSON is taken as a string.
fn parse_setting(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut engine = SettingsEngine::new(None);
    let mut settings = engine.load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.changes_settings() {
        if args.reset_settings {
            engine.reset()?;
        }
        for (key, value) in &args.set {
            engine.set_value(key, value.clone())?;
        }
        settings = engine.get_settings().clone();
        println!(
            "{}\n{}",
            engine.get_config_path(),
            serde_json::to_string_pretty(&settings)?
        );
        return Ok(());
    }

    tracing::info!(server = %settings.server.base_url, "starting shelfview");

    let transport = HttpTransport::new(&settings.server)?;
    // start at the location the arguments describe; mounting decodes it
    let location = entry_url(&args.search(), args.page);
    let mut view = HomeView::new(transport, MemoryNavigator::new(&location), settings.display);
    view.mount().await?;

    let page_state = view.state().page_state();
    println!(
        "page {} of {} ({})",
        page_state.page(),
        page_state.max_page(),
        if page_state.search().is_empty() {
            "all bookmarks"
        } else {
            page_state.search()
        }
    );
    for book in view.state().bookmarks() {
        let tags = book.tag_line();
        if tags.is_empty() {
            println!("{:>6}  {}\n        {}", book.id, book.title, book.url);
        } else {
            println!("{:>6}  {} [{}]\n        {}", book.id, book.title, tags, book.url);
        }
    }
    Ok(())
}
