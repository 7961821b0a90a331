mod commands;
mod server;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "menusite")]
#[command(version, about = "Restaurant menu price site server and generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Check site.json, content documents and menu data
    Validate {
        /// Path to site project directory
        path: PathBuf,
    },

    /// Serve the site over HTTP
    Serve {
        /// Path to site project directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Render every request instead of caching pages
        #[arg(long)]
        no_cache: bool,
    },

    /// Render every page to static files
    Build {
        /// Path to site project directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Submit every page URL to IndexNow
    Submit {
        /// Path to site project directory
        path: PathBuf,
    },

    /// Merge calories from a nutrition export into an ordering-system export
    MergeMenu {
        /// Nutrition export: object keyed by category with titled items
        #[arg(long)]
        nutrition: PathBuf,

        /// Ordering-system export: array of categories with menuItems
        #[arg(long)]
        order: PathBuf,

        /// TOML file mapping order category and dish names to nutrition names
        #[arg(long)]
        map: PathBuf,

        /// Where to write the merged menu data
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Download remote menu item images and convert them to WebP
    Images {
        /// Path to site project directory
        path: PathBuf,

        /// Menu data file, relative to the project's data directory
        #[arg(long, default_value = "index.json")]
        data: String,

        /// Images processed at the same time
        #[arg(short = 'j', long, default_value = "10")]
        concurrency: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Serve {
            path,
            port,
            host,
            no_cache,
        } => commands::serve::run(path, host, port, no_cache).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Submit { path } => commands::submit::run(path).await,
        Command::MergeMenu {
            nutrition,
            order,
            map,
            output,
        } => commands::merge_menu::run(nutrition, order, map, output).await,
        Command::Images {
            path,
            data,
            concurrency,
        } => commands::images::run(path, data, concurrency).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "menusite", &mut io::stdout());
            Ok(())
        }
    }
}
