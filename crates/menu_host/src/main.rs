//! Reference host for the menu engine.
//!
//! Loads layouts and messages, keeps a shared instance of every layout alive and runs
//! the synchronous tick loop that executes scheduled menu work. Texture lookups run on
//! a separate multi-threaded tokio runtime.

mod cli;
mod config;
mod logging;
mod players;
mod signals;

use anyhow::Context;
use cli::CliArgs;
use config::AppConfig;
use menu_engine::ports::MemoryContainerFactory;
use menu_engine::resolver::StaticResolver;
use menu_engine::{
    ContainerSnapshot, Filler, LayoutCatalog, MapFiller, MenuKind, MenuRegistry, MenuServices,
    MessageCatalog, TickScheduler, DEFAULT_TEMPLATE,
};
use players::LoggingPlayers;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Loads the configuration file and applies command-line overrides.
async fn load_config(args: &CliArgs) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .with_context(|| format!("Failed to load {}", args.config_path.display()))?;

    if let Some(layout_dir) = &args.layout_dir {
        config.host.layout_directory = layout_dir.to_string_lossy().to_string();
    }
    if let Some(messages_file) = &args.messages_file {
        config.host.messages_file = messages_file.to_string_lossy().to_string();
    }
    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
    Ok(config)
}

struct Application {
    config: AppConfig,
    scheduler: Arc<TickScheduler>,
    registry: Arc<MenuRegistry>,
}

impl Application {
    fn new(config: AppConfig, runtime: Handle) -> anyhow::Result<Self> {
        let main_language = config.engine.main_language.clone();
        let catalog = LayoutCatalog::load_dir(&config.layout_directory(), &main_language)?;
        if catalog.is_empty() {
            warn!("No layouts found in {}", config.host.layout_directory);
        }

        let messages_path = config.messages_file();
        let messages = if messages_path.exists() {
            MessageCatalog::load(&messages_path, &main_language)?
        } else {
            info!("No message file at {}, using defaults", messages_path.display());
            MessageCatalog::with_defaults(main_language)
        };

        let scheduler = Arc::new(TickScheduler::new(runtime));
        let services = Arc::new(MenuServices::new(
            config.engine.clone(),
            scheduler.clone(),
            Arc::new(MemoryContainerFactory),
            Arc::new(LoggingPlayers),
            Arc::new(messages),
            Arc::new(StaticResolver::default()),
        ));
        let registry = MenuRegistry::new(services, catalog);

        Ok(Self {
            config,
            scheduler,
            registry,
        })
    }

    /// Renders every layout once and collects its pages in the main language.
    fn dump(&self, sample_fillers: usize) -> anyhow::Result<serde_json::Value> {
        let main_language = &self.config.engine.main_language;
        let mut layouts = serde_json::Map::new();

        for id in self.registry.catalog().ids() {
            let menu = self.registry.shared(&id)?;
            if menu.kind() == MenuKind::Fillable {
                menu.set_fillers(sample(sample_fillers, main_language));
            }
            let pages: Vec<ContainerSnapshot> = (0..menu.page_count())
                .filter_map(|page| menu.snapshot(main_language, page))
                .collect();
            layouts.insert(id, serde_json::to_value(pages)?);
        }

        Ok(serde_json::Value::Object(layouts))
    }

    async fn run(self) -> anyhow::Result<()> {
        for id in self.registry.catalog().ids() {
            let menu = self.registry.shared(&id)?;
            if menu.kind() == MenuKind::Fillable {
                menu.set_fillers(Vec::new());
            }
        }

        info!("Menu host running with {} layouts", self.registry.catalog().len());
        info!("  Tick interval: {}ms", self.config.host.tick_interval_ms);
        info!("  Languages: {:?}", self.config.engine.loaded_languages());
        info!("  Async workers: {}", self.config.async_workers());

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.host.tick_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shutdown = signals::wait_for_shutdown();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let ran = self.scheduler.run_pending();
                    if ran > 0 {
                        debug!("Tick ran {} menu tasks", ran);
                    }
                }
                result = &mut shutdown => {
                    result?;
                    break;
                }
            }
        }

        info!("Shutdown signal received, closing menus");
        self.registry.invalidate_all();
        self.scheduler.run_pending();
        info!("Menu host shutdown complete");
        Ok(())
    }
}

/// Numbered placeholder fillers for previewing fillable layouts.
fn sample(count: usize, language: &str) -> Vec<Arc<dyn Filler>> {
    (1..=count)
        .map(|index| {
            Arc::new(
                MapFiller::new(DEFAULT_TEMPLATE)
                    .with(language, "index", index.to_string())
                    .with(language, "name", format!("entry-{index}")),
            ) as Arc<dyn Filler>
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(load_config(&args))?;
    logging::setup_logging(&config.logging)?;

    let runtime = Builder::new_multi_thread()
        .worker_threads(config.async_workers())
        .thread_name("menu-async")
        .enable_all()
        .build()?;
    let app = Application::new(config, runtime.handle().clone())?;

    if args.dump {
        let dump = app.dump(args.sample_fillers)?;
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    runtime.block_on(app.run())
}
