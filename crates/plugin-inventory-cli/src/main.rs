mod serve;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use plugin_inventory::{list_inventory, ConfigFile, InventoryCache, ScanConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plugin-inventory", version, about = "Discover installed audio plug-ins")]
struct Cli {
    #[command(flatten)]
    scan: ScanArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory to scan for plug-ins; replaces the platform defaults
    #[arg(long = "path", value_name = "PATH", global = true)]
    paths: Vec<PathBuf>,

    /// Seconds before a cached inventory is rescanned
    #[arg(long, value_name = "SECONDS", global = true)]
    ttl_secs: Option<u64>,

    /// Load every candidate and drop the ones that fail; `--validate=false`
    /// overrides the config file
    #[arg(
        long,
        value_name = "BOOL",
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    validate: Option<bool>,

    /// Deepest directory level visited below each root
    #[arg(long, value_name = "DEPTH", global = true)]
    max_depth: Option<usize>,

    /// JSON config file; defaults to the per-user config location
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

impl ScanArgs {
    fn resolve(self) -> Result<ScanConfig> {
        let mut file = match self.config {
            Some(path) => ConfigFile::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => match ConfigFile::default_path() {
                Ok(path) => ConfigFile::load_or_default(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                Err(_) => ConfigFile::default(),
            },
        };
        if !self.paths.is_empty() {
            file.roots = Some(self.paths);
        }
        if self.ttl_secs.is_some() {
            file.ttl_secs = self.ttl_secs;
        }
        if self.validate.is_some() {
            file.validate = self.validate;
        }
        if self.max_depth.is_some() {
            file.max_depth = self.max_depth;
        }
        Ok(file.into_scan_config())
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the directories that would be scanned.
    Roots,
    /// Scan and print the installed plug-ins.
    List {
        /// Ignore any cached inventory
        #[arg(long)]
        refresh: bool,
        /// Print at most this many plug-ins
        #[arg(long)]
        limit: Option<usize>,
        /// Tab separated lines instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Answer JSON tool calls read line by line from stdin.
    Serve,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = cli.scan.resolve()?;

    match cli.command {
        Command::Roots => {
            for root in &config.roots {
                println!("{}", root.display());
            }
        }
        Command::List {
            refresh,
            limit,
            text,
        } => {
            let cache = InventoryCache::new(config);
            let listing = list_inventory(&cache, refresh, limit);
            if text {
                for plugin in &listing.records {
                    println!(
                        "{}\t{}\t{}",
                        plugin.name,
                        plugin.format.label(),
                        plugin.path.display()
                    );
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            }
        }
        Command::Serve => {
            let cache = Arc::new(InventoryCache::new(config));
            tracing::info!(
                roots = cache.config().roots.len(),
                validate = cache.config().validate,
                "serving plugin inventory on stdio"
            );
            cache.warm_up();
            serve::run(&cache, io::stdin().lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}
