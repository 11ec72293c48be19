use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use trap_rules::cli::{self, CheckOptions, CliError};
use trap_rules::logging::{self, LogConfig};

#[derive(ClapParser)]
#[command(name = "traprule")]
#[command(about = "Traprule - Evaluate SNMP trap rules and maintain the trap database schema")]
#[command(version)]
struct Cli {
    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "TRAPRULE_LOG", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "TRAPRULE_JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a rule against trap varbinds
    Check {
        /// The rule to evaluate
        rule: String,

        /// JSON varbind list (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print a rule with spaces outside quotes removed
    Cleanup {
        /// The rule to clean
        rule: String,
    },

    /// Print the statements of a schema script
    Schema {
        /// Schema script
        file: PathBuf,

        /// Table prefix replacing #PREFIX#
        #[arg(long, default_value = "traps_")]
        prefix: String,
    },

    /// Describe the upgrade steps between two schema versions
    UpgradeNotes {
        /// Directory holding update_sql/ and update_pgsql/ (with trailing '/')
        prefix: String,

        /// Database dialect
        #[arg(long, default_value = "mysql")]
        dialect: String,

        /// Current schema version
        #[arg(long)]
        from: u32,

        /// Target schema version
        #[arg(long)]
        to: u32,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'traprule docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.log_level,
        json: cli.json_logs,
    };
    if let Err(e) = logging::init(&log_config) {
        eprintln!("cannot initialize logging: {}", e);
    }

    let result = match cli.command {
        Commands::Check {
            rule,
            input,
            pretty,
        } => run_check(rule, input, pretty),
        Commands::Cleanup { rule } => trap_rules::cleanup(&rule)
            .map(|cleaned| println!("{}", cleaned))
            .map_err(CliError::from),
        Commands::Schema { file, prefix } => {
            cli::schema_file_statements(&file, &prefix).map(|statements| {
                for sql in statements {
                    println!("{}", sql);
                }
            })
        }
        Commands::UpgradeNotes {
            prefix,
            dialect,
            from,
            to,
        } => cli::upgrade_notes(&prefix, &dialect, from, to).map(|notes| print!("{}", notes)),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => {
            cli::get_doc_category(&category).map(|content| print!("{}", content))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(rule: String, input: Option<String>, pretty: bool) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        rule,
        input,
        pretty,
    };

    let result = cli::execute_check(&options)?;
    let json = if options.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }?;
    println!("{}", json);
    Ok(())
}
