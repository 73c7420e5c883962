//! httpdconf - Query and edit Apache httpd configuration trees
//!
//! This is the main entry point for the httpdconf CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use httpdconf_config::HttpdConfig;
use httpdconf_core::{ProfileLoader, ServerProfile};
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "httpdconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server profile (TOML or JSON) describing the installation
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Root configuration file, overrides the profile
    #[arg(long, global = true)]
    root_file: Option<PathBuf>,

    /// Server root for relative Include paths, overrides the profile
    #[arg(long, global = true)]
    server_root: Option<PathBuf>,

    /// Modules compiled into the server
    #[arg(long = "static-module", global = true, value_delimiter = ',')]
    static_modules: Vec<String>,

    /// Modules loaded with LoadModule
    #[arg(long = "shared-module", global = true, value_delimiter = ',')]
    shared_modules: Vec<String>,

    /// Ignore content inside <VirtualHost> blocks
    #[arg(long, global = true)]
    exclude_vhosts: bool,

    /// Print query results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the values of every active directive of a type
    Values {
        /// Directive name, e.g. Listen
        directive: String,
    },

    /// Print every active directive of a type
    Directives { directive: String },

    /// Print every active block of a type, e.g. VirtualHost
    Enclosures { enclosure: String },

    /// List the files reachable from the root file
    Files,

    /// Print the first file holding a matching directive
    Find {
        directive: String,

        /// Regex matched against the directive's arguments
        #[arg(default_value = ".*")]
        pattern: String,
    },

    /// Insert a line next to the first matching directive
    Insert {
        directive: String,
        pattern: String,

        /// Line to insert
        text: String,

        /// Insert before the match instead of after it
        #[arg(long)]
        before: bool,
    },

    /// Comment out or delete matching directives in one file
    Remove {
        directive: String,
        pattern: String,

        /// File to edit, defaults to the root file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Delete the lines instead of commenting them out
        #[arg(long)]
        delete: bool,
    },

    /// Comment out or delete matching blocks in every active file
    #[command(name = "remove-enclosure")]
    RemoveEnclosure {
        enclosure: String,
        pattern: String,

        /// Delete the blocks instead of commenting them out
        #[arg(long)]
        delete: bool,
    },

    /// Replace the first matching directive with a new value
    Set {
        directive: String,
        value: String,

        #[arg(long, default_value = ".*")]
        pattern: String,

        /// File to edit, defaults to the root file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Append the directive when nothing matches
        #[arg(long)]
        add: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    let profile = load_profile(&cli)?;
    let config = HttpdConfig::from_profile(&profile).context("Failed to open configuration")?;
    let include_vhosts = !cli.exclude_vhosts;

    match cli.command {
        Commands::Values { directive } => {
            let values = config.get_directive_values(&directive, include_vhosts)?;
            print_list(cli.json, &values, |value| value.clone())?;
        }

        Commands::Directives { directive } => {
            let directives = config.get_directive(&directive, include_vhosts)?;
            print_list(cli.json, &directives, |d| {
                format!("{}:{}: {}", d.source.file.display(), d.source.line_start, d)
            })?;
        }

        Commands::Enclosures { enclosure } => {
            let enclosures = config.get_enclosure(&enclosure, include_vhosts)?;
            print_list(cli.json, &enclosures, |e| {
                format!("# {}:{}\n{}", e.file.display(), e.line_start, e)
            })?;
        }

        Commands::Files => {
            let files = config.active_file_list()?;
            print_list(cli.json, &files, |file| file.display().to_string())?;
        }

        Commands::Find { directive, pattern } => {
            let pattern = compile(&pattern)?;
            let found = config.find_first_file_containing(&directive, &pattern, include_vhosts)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if let Some(file) = found {
                println!("{}", file.display());
            } else {
                eprintln!("❌ No active {} matches '{}'", directive, pattern);
                std::process::exit(1);
            }
        }

        Commands::Insert {
            directive,
            pattern,
            text,
            before,
        } => {
            let pattern = compile(&pattern)?;
            if config.insert_relative_to_first_match(&directive, &pattern, &text, before, include_vhosts)? {
                println!("✅ Inserted '{}'", text);
            } else {
                eprintln!("❌ No active {} matches '{}'", directive, pattern);
                std::process::exit(1);
            }
        }

        Commands::Remove {
            directive,
            pattern,
            file,
            delete,
        } => {
            let pattern = compile(&pattern)?;
            let file = file.unwrap_or_else(|| config.root_file().to_path_buf());
            if config.comment_or_delete_directive(&directive, &file, &pattern, !delete)? {
                println!("✅ Updated {}", file.display());
            } else {
                println!("Nothing to change in {}", file.display());
            }
        }

        Commands::RemoveEnclosure {
            enclosure,
            pattern,
            delete,
        } => {
            let pattern = compile(&pattern)?;
            let files = config.comment_or_delete_enclosure(&enclosure, &pattern, !delete, include_vhosts)?;
            if files.is_empty() {
                println!("Nothing to change");
            }
            for file in files {
                println!("✅ Updated {}", file.display());
            }
        }

        Commands::Set {
            directive,
            value,
            pattern,
            file,
            add,
        } => {
            let pattern = compile(&pattern)?;
            let file = file.unwrap_or_else(|| config.root_file().to_path_buf());
            if config.set_directive_value(&directive, &file, &value, &pattern, add)? {
                println!("✅ Updated {}", file.display());
            } else {
                eprintln!("❌ No active {} matches '{}' in {}", directive, pattern, file.display());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Profile file (explicit or default location) overlaid with command-line flags
fn load_profile(cli: &Cli) -> anyhow::Result<ServerProfile> {
    let base = match &cli.profile {
        Some(path) => ProfileLoader::load(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => {
            let path = ProfileLoader::default_path();
            if path.is_file() {
                tracing::debug!("📄 Using profile {}", path.display());
                ProfileLoader::load(&path)?
            } else {
                ServerProfile::default()
            }
        }
    };

    let overrides = ServerProfile {
        root_file: cli.root_file.clone(),
        server_root: cli.server_root.clone(),
        static_modules: cli.static_modules.clone(),
        shared_modules: cli.shared_modules.clone(),
    };

    Ok(base.merge(overrides))
}

fn compile(pattern: &str) -> anyhow::Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))
}

fn print_list<T: Serialize>(json: bool, items: &[T], line: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for item in items {
            println!("{}", line(item));
        }
    }
    Ok(())
}
