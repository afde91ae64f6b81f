use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use genera_config::{init_tracing, load_for_dir, GeneraConfig};
use genera_types::{
    all_hierarchical_types, format_type, hierarchical_types, resolve_actual_type_argument,
    resolve_actual_type_argument_classes, resolve_actual_type_arguments, ClassId, ResolveError,
    Type, TypeEnv, TypeStore,
};
use genera_types_bridge::TableLoader;
use genera_types_signature::{parse_type, TypeVarScope};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "genera",
    version,
    about = "Resolve generic type arguments over declarative type tables"
)]
struct Cli {
    /// Config file (defaults to `genera.toml` in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the type arguments START supplies to ANCESTOR's type parameters
    Resolve(ResolveArgs),
    /// Print the generic supertypes of a type
    Ancestors(AncestorsArgs),
}

#[derive(Args)]
struct TableArgs {
    /// Type table to load (repeatable; loaded after the tables listed in the config)
    #[arg(long = "table", value_name = "FILE")]
    tables: Vec<PathBuf>,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    tables: TableArgs,
    /// Start type, e.g. `com.example.IntBox` or `Box<String>`
    start: String,
    /// Generic ancestor class
    ancestor: String,
    /// Print only the N-th resolved argument
    #[arg(long, value_name = "N")]
    index: Option<usize>,
    /// Print raw classes instead of full types
    #[arg(long, conflicts_with = "index")]
    classes: bool,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AncestorsArgs {
    #[command(flatten)]
    tables: TableArgs,
    /// Type whose supertypes to list
    ty: String,
    /// Walk the whole hierarchy instead of the immediate supertypes
    #[arg(long)]
    all: bool,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let (config, config_path) = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);
    if let Some(path) = &config_path {
        tracing::debug!(path = %path.display(), "using config");
    }

    match cli.command {
        Command::Resolve(args) => {
            let store = load_store(&config, &args.tables)?;
            resolve(&store, &args)
        }
        Command::Ancestors(args) => {
            let store = load_store(&config, &args.tables)?;
            ancestors(&store, &args)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<(GeneraConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = GeneraConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    Ok(load_for_dir(&cwd)?)
}

fn load_store(config: &GeneraConfig, args: &TableArgs) -> Result<TypeStore> {
    let mut store = TypeStore::with_builtins();
    let mut loader = TableLoader::new(&mut store);
    for path in config.tables.iter().chain(&args.tables) {
        loader
            .load_path(path)
            .with_context(|| format!("failed to load type table {}", path.display()))?;
    }
    Ok(store)
}

fn parse(store: &TypeStore, text: &str) -> Result<Type> {
    parse_type(store, &TypeVarScope::new(), text)
        .with_context(|| format!("invalid type `{text}`"))
}

fn parse_class(store: &TypeStore, text: &str) -> Result<ClassId> {
    match parse(store, text)? {
        Type::Class(id) => Ok(id),
        _ => bail!("`{text}` is not a class name"),
    }
}

#[derive(Serialize)]
struct ResolveOutput {
    start: String,
    ancestor: String,
    arguments: Vec<String>,
}

#[derive(Serialize)]
struct ResolveIndexOutput {
    start: String,
    ancestor: String,
    index: usize,
    argument: String,
}

fn resolve(store: &TypeStore, args: &ResolveArgs) -> Result<i32> {
    let start = parse(store, &args.start)?;
    let ancestor = parse_class(store, &args.ancestor)?;
    let start_name = format_type(store, &start);
    let ancestor_name = format_type(store, &Type::class(ancestor));

    if let Some(index) = args.index {
        let argument = match resolve_actual_type_argument(store, &start, ancestor, index) {
            Ok(argument) => argument,
            Err(err @ ResolveError::IndexOutOfRange { .. }) => {
                eprintln!("{err}");
                return Ok(1);
            }
            Err(err) => return Err(err.into()),
        };
        let argument = format_type(store, &argument);
        if args.json {
            print_json(&ResolveIndexOutput {
                start: start_name,
                ancestor: ancestor_name,
                index,
                argument,
            })?;
        } else {
            println!("{argument}");
        }
        return Ok(0);
    }

    let arguments: Vec<String> = if args.classes {
        resolve_actual_type_argument_classes(store, &start, ancestor)
            .into_iter()
            .map(|id| class_name(store, id))
            .collect()
    } else {
        resolve_actual_type_arguments(store, &start, ancestor)
            .iter()
            .map(|ty| format_type(store, ty))
            .collect()
    };

    if args.json {
        print_json(&ResolveOutput {
            start: start_name,
            ancestor: ancestor_name,
            arguments,
        })?;
    } else {
        for argument in &arguments {
            println!("{argument}");
        }
    }
    Ok(0)
}

#[derive(Serialize)]
struct AncestorsOutput {
    #[serde(rename = "type")]
    ty: String,
    ancestors: Vec<String>,
}

fn ancestors(store: &TypeStore, args: &AncestorsArgs) -> Result<i32> {
    let ty = parse(store, &args.ty)?;
    let found = if args.all {
        all_hierarchical_types(store, &ty, &[])
    } else {
        hierarchical_types(store, &ty, &[])
    };
    let ancestors: Vec<String> = found.iter().map(|t| format_type(store, t)).collect();

    if args.json {
        print_json(&AncestorsOutput {
            ty: format_type(store, &ty),
            ancestors,
        })?;
    } else {
        for ancestor in &ancestors {
            println!("{ancestor}");
        }
    }
    Ok(0)
}

fn class_name(store: &TypeStore, id: ClassId) -> String {
    store
        .class(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| format!("{id:?}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
