mod describe;

use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde_json::Value;
use veditor_ast::{DeclResolver, Resolver, TypeExpr};
use veditor_core::{
    adl_table_info, create_veditor, ui_factory, AdlTree, CustomContext, DeriveOptions, Factory,
    JsonBinding, OutlineRenderer, UVEditor,
};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Inspect ADL types and the value editors derived from them.
#[derive(Parser)]
#[command(
    name = "veditor",
    version,
    about = "Inspect ADL types and the value editors derived from them"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log derivation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved structure of a type
    Describe {
        /// Path to the ADL JSON schema
        schema: PathBuf,
        /// Type expression, e.g. demo.Person or Vector<demo.Person>
        type_expr: String,
        /// Levels to expand below the root
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },

    /// Check a JSON value against a type and its derived editor
    Check {
        /// Path to the ADL JSON schema
        schema: PathBuf,
        /// Type expression of the value
        type_expr: String,
        /// Path to the JSON value
        value: PathBuf,
    },

    /// Render the derived editor as a text outline
    Render {
        /// Path to the ADL JSON schema
        schema: PathBuf,
        /// Type expression to derive an editor for
        type_expr: String,
        /// Path to a JSON value to load (defaults to the initial state)
        #[arg(long)]
        value: Option<PathBuf>,
        /// Do not seed struct fields from declared defaults
        #[arg(long)]
        no_defaults: bool,
    },

    /// List the table columns of a struct type
    Columns {
        /// Path to the ADL JSON schema
        schema: PathBuf,
        /// Struct type expression
        type_expr: String,
        /// Path to a JSON array of rows to tabulate
        #[arg(long)]
        rows: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Describe {
            schema,
            type_expr,
            depth,
        } => {
            cmd_describe(&schema, &type_expr, depth, cli.output, cli.quiet);
        }
        Commands::Check {
            schema,
            type_expr,
            value,
        } => {
            cmd_check(&schema, &type_expr, &value, cli.output, cli.quiet);
        }
        Commands::Render {
            schema,
            type_expr,
            value,
            no_defaults,
        } => {
            cmd_render(
                &schema,
                &type_expr,
                value.as_deref(),
                no_defaults,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Columns {
            schema,
            type_expr,
            rows,
        } => {
            cmd_columns(&schema, &type_expr, rows.as_deref(), cli.output, cli.quiet);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Off
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_env("VEDITOR_LOG")
        .init();
}

// ── Commands ─────────────────────────────────────────────────────────

fn cmd_describe(schema: &Path, type_expr: &str, depth: usize, output: OutputFormat, quiet: bool) {
    let resolver = load_schema(schema, output, quiet);
    let texpr = parse_type(type_expr, output, quiet);
    let tree = AdlTree::new(texpr, resolver);
    let described = describe::describe(&tree, depth);

    if let Err(e) = tree.details() {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }

    match output {
        OutputFormat::Text => print!("{}", describe::format_outline(&described)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&described).unwrap_or_default()
        ),
    }
}

fn cmd_check(
    schema: &Path,
    type_expr: &str,
    value_path: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let resolver = load_schema(schema, output, quiet);
    let texpr = parse_type(type_expr, output, quiet);
    require_resolvable(&texpr, &resolver, output, quiet);
    let value = read_json(value_path, output, quiet);

    let binding = JsonBinding::new(texpr.clone(), Rc::clone(&resolver));
    let errors = match binding.from_json(&value) {
        Ok(value) => {
            let veditor = derive(&texpr, &resolver, DeriveOptions::default());
            let state = veditor.state_from_value(&value);
            let errors = veditor.validate(&state);
            if errors.is_empty() {
                match veditor.value_from_state(&state) {
                    Ok(round_tripped) if round_tripped != value => {
                        log::warn!(
                            "the editor for {} does not reproduce the value exactly",
                            texpr
                        );
                    }
                    _ => {}
                }
            }
            errors
        }
        Err(e) => vec![e.to_string()],
    };

    if errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{{\"valid\": true}}"),
            }
        }
    } else {
        match output {
            OutputFormat::Text => {
                if !quiet {
                    eprintln!("invalid {}", texpr);
                    for err in &errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": false,
                    "type": texpr.to_string(),
                    "errors": errors
                });
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                );
            }
        }
        process::exit(1);
    }
}

fn cmd_render(
    schema: &Path,
    type_expr: &str,
    value_path: Option<&Path>,
    no_defaults: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let resolver = load_schema(schema, output, quiet);
    let texpr = parse_type(type_expr, output, quiet);
    require_resolvable(&texpr, &resolver, output, quiet);

    let options = DeriveOptions {
        apply_struct_defaults: !no_defaults,
    };
    let veditor = derive(&texpr, &resolver, options);
    let state = match value_path {
        Some(path) => {
            let value = read_json(path, output, quiet);
            let binding = JsonBinding::new(texpr.clone(), Rc::clone(&resolver));
            match binding.from_json(&value) {
                Ok(value) => veditor.state_from_value(&value),
                Err(e) => {
                    let msg = format!("error in '{}': {}", path.display(), e);
                    report_error(&msg, output, quiet);
                    process::exit(1);
                }
            }
        }
        None => veditor.initial_state(),
    };

    let outline = veditor.render(&state, false, Rc::new(|_| {}));
    match output {
        OutputFormat::Text => println!("{}", outline),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "type": texpr.to_string(),
                "outline": outline,
                "errors": veditor.validate(&state),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

fn cmd_columns(
    schema: &Path,
    type_expr: &str,
    rows_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let resolver = load_schema(schema, output, quiet);
    let texpr = parse_type(type_expr, output, quiet);

    let factory: Factory<String> = ui_factory(Rc::new(OutlineRenderer));
    let custom_field = |ctx: &CustomContext| factory.get_custom_field(ctx);
    let info = match adl_table_info(Rc::clone(&resolver), texpr, Some(&custom_field)) {
        Ok(info) => info,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let rows = match rows_path {
        Some(path) => match read_json(path, output, quiet) {
            Value::Array(rows) => rows,
            _ => {
                let msg = format!("'{}' must contain a JSON array of rows", path.display());
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    match output {
        OutputFormat::Text => {
            if rows_path.is_none() {
                for column in &info.columns {
                    println!("{}\t{}", column.field_name, column.label);
                }
            } else {
                let labels: Vec<&str> = info.columns.iter().map(|c| c.label.as_str()).collect();
                println!("{}", labels.join("\t"));
                for row in &rows {
                    let cells: Vec<String> =
                        info.columns.iter().map(|c| c.cell_text(row)).collect();
                    println!("{}", cells.join("\t"));
                }
            }
        }
        OutputFormat::Json => {
            let columns: Vec<Value> = info
                .columns
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "field": c.field_name,
                        "serializedName": c.serialized_name,
                        "label": c.label,
                    })
                })
                .collect();
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|row| info.columns.iter().map(|c| c.cell_text(row)).collect())
                .collect();
            let json = serde_json::json!({"columns": columns, "rows": cells});
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn derive(
    texpr: &TypeExpr,
    resolver: &Rc<dyn DeclResolver>,
    options: DeriveOptions,
) -> UVEditor<String> {
    let factory = ui_factory(Rc::new(OutlineRenderer)).with_options(options);
    create_veditor(texpr.clone(), Rc::clone(resolver), &factory)
}

fn read_json(path: &Path, output: OutputFormat, quiet: bool) -> Value {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn load_schema(path: &Path, output: OutputFormat, quiet: bool) -> Rc<dyn DeclResolver> {
    let doc = read_json(path, output, quiet);
    match Resolver::from_adl_json(&doc) {
        Ok(resolver) => {
            log::debug!(
                "loaded {} declarations from {}",
                resolver.len(),
                path.display()
            );
            Rc::new(resolver)
        }
        Err(e) => {
            let msg = format!("error loading schema '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn parse_type(text: &str, output: OutputFormat, quiet: bool) -> TypeExpr {
    match text.parse() {
        Ok(texpr) => texpr,
        Err(e) => {
            let msg = format!("{}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn require_resolvable(
    texpr: &TypeExpr,
    resolver: &Rc<dyn DeclResolver>,
    output: OutputFormat,
    quiet: bool,
) {
    let tree = AdlTree::new(texpr.clone(), Rc::clone(resolver));
    if let Err(e) = tree.details() {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
