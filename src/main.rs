//! Stencil CLI
//!
//! Usage:
//!   stencil [OPTIONS] <COMMAND>
//!
//! Commands:
//!   list     List available templates
//!   show     Show the metadata of one template
//!   render   Render a template with placeholder values
//!   check    Validate template source files, each on its own
//!
//! Options:
//!   -c, --config <FILE>     Store configuration (TOML format)
//!   -t, --templates <DIR>   Extra template directory, repeatable
//!   --no-builtin            Skip the built-in templates
//!   -v, --verbose           Debug logging

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use stencil::{StoreConfig, Template, TemplateFilter, TemplateStore, ValuePolicy, Values};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Render boilerplate templates with placeholder values")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Store configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Extra template directory (repeatable)
    #[arg(short = 't', long = "templates", global = true)]
    templates: Vec<PathBuf>,

    /// Do not load the built-in templates
    #[arg(long, global = true)]
    no_builtin: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List available templates
    List {
        /// Only templates with this language tag
        #[arg(long)]
        language: Option<String>,

        /// Only templates with this framework tag
        #[arg(long)]
        framework: Option<String>,
    },

    /// Show the metadata of one template
    Show {
        /// Template id
        id: String,
    },

    /// Render a template with placeholder values
    Render {
        /// Template id
        id: String,

        /// Placeholder value as NAME=VALUE (repeatable)
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// TOML file with placeholder values; --set entries override it
        #[arg(long)]
        values: Option<PathBuf>,

        /// Ignore values for placeholders the template does not declare
        #[arg(long)]
        lenient: bool,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate template source files, each on its own
    Check {
        /// Template files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", arg)),
    }
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    stencil::logging::init_logger(cli.verbose);

    match &cli.command {
        Command::List {
            language,
            framework,
        } => {
            let store = load_store(&cli);
            let mut filter = TemplateFilter::new();
            filter.language = language.clone();
            filter.framework = framework.clone();
            list(&store, &filter);
        }
        Command::Show { id } => {
            let store = load_store(&cli);
            show(&store, id);
        }
        Command::Render {
            id,
            set,
            values,
            lenient,
            output,
        } => {
            let store = load_store(&cli);
            let values = collect_values(values.as_deref(), set);
            let policy = if *lenient {
                ValuePolicy::Lenient
            } else {
                store.policy()
            };
            let rendered = match store.render_with(id, &values, policy) {
                Ok(text) => text,
                Err(e) => fail(e),
            };
            match output {
                Some(path) => {
                    if let Err(e) = fs::write(path, rendered) {
                        fail(format!("writing '{}': {}", path.display(), e));
                    }
                    tracing::info!(id = %id, path = %path.display(), "rendered template");
                }
                None => print!("{}", rendered),
            }
        }
        Command::Check { files } => check(files),
    }
}

fn load_store(cli: &Cli) -> TemplateStore {
    let mut config = match &cli.config {
        Some(path) => match StoreConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(format!("loading config '{}': {}", path.display(), e)),
        },
        None => StoreConfig::default(),
    };
    if cli.no_builtin {
        config = config.with_builtin(false);
    }
    for dir in &cli.templates {
        config = config.with_directory(dir.clone());
    }

    match TemplateStore::from_config(&config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{}", e.report());
            std::process::exit(1);
        }
    }
}

fn collect_values(file: Option<&Path>, set: &[(String, String)]) -> Values {
    let mut values = match file {
        Some(path) => {
            let content = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => fail(format!("reading values '{}': {}", path.display(), e)),
            };
            match toml::from_str::<Values>(&content) {
                Ok(v) => v,
                Err(e) => fail(format!("parsing values '{}': {}", path.display(), e)),
            }
        }
        None => Values::new(),
    };
    values.extend(set.iter().cloned());
    values
}

fn list(store: &TemplateStore, filter: &TemplateFilter) {
    for template in store.find(filter) {
        let meta = &template.metadata;
        let tags = match (&meta.language, &meta.framework) {
            (Some(l), Some(f)) => format!("{}/{}", l, f),
            (Some(t), None) | (None, Some(t)) => t.clone(),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<24} {:<8} {:<16} {}",
            meta.id,
            meta.version.to_string(),
            tags,
            meta.description
        );
    }
}

fn show(store: &TemplateStore, id: &str) {
    let Some(template) = store.get(id) else {
        fail(format!("unknown template: {}", id));
    };
    let meta = &template.metadata;

    println!("id:           {}", meta.id);
    println!("version:      {}", meta.version);
    println!("description:  {}", meta.description);
    println!("language:     {}", meta.language.as_deref().unwrap_or("-"));
    println!("framework:    {}", meta.framework.as_deref().unwrap_or("-"));
    println!("dependencies: {}", meta.dependencies.join(", "));
    println!(
        "placeholders: {}",
        meta.placeholders.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    for (key, value) in &meta.attributes {
        println!("{}: {}", key, value);
    }
    if let Some(origin) = &template.origin {
        println!("origin:       {}", origin.display());
    }
}

/// Validate each file on its own; ids are not compared across files
fn check(files: &[PathBuf]) {
    let mut failed = 0;

    for path in files {
        match Template::from_file(path) {
            Ok(template) => println!("ok     {} ({})", path.display(), template.id()),
            Err(e) => {
                println!("error  {}", path.display());
                eprintln!("{}", e.report());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        fail(format!("{} of {} templates failed validation", failed, files.len()));
    }
}
