//! # pcq-cli
//!
//! Command line front end for the pcq flag-query engine.
//!
//! This binary is a thin adapter: it maps arguments and environment
//! variables onto a `ResolveConfig`, runs the requested query through a
//! `Client`, prints the result and translates errors into exit codes. All
//! resolution semantics live in the engine crates.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use pcq_core::diag::{Diagnostic, DiagnosticSink};
use pcq_core::ResolveConfig;
use pcq_resolver::Client;

/// Query compiler and linker flags for installed packages
#[derive(Parser, Debug)]
#[command(name = "pcq", version, about = "Query compiler and linker flags for installed packages")]
struct Cli {
    /// Packages to query, each optionally constrained (e.g. 'foo >= 1.2')
    #[arg(value_name = "PACKAGE")]
    query: Vec<String>,

    /// Print compiler flags
    #[arg(long)]
    cflags: bool,

    /// Print linker flags
    #[arg(long)]
    libs: bool,

    /// Resolve for static linking (traverses private requirements)
    #[arg(long = "static")]
    static_link: bool,

    /// Never merge private fragments, even with --static
    #[arg(long)]
    pure: bool,

    /// Exit successfully if the query resolves, printing nothing
    #[arg(long)]
    exists: bool,

    /// Print the version of each queried package
    #[arg(long)]
    modversion: bool,

    /// Print the expanded value of a variable for each queried package
    #[arg(long, value_name = "NAME")]
    variable: Option<String>,

    /// Override a variable in every record (NAME=VALUE, repeatable)
    #[arg(long = "define-variable", value_name = "NAME=VALUE")]
    define_variable: Vec<String>,

    /// Print direct public requirements
    #[arg(long = "print-requires")]
    print_requires: bool,

    /// Print direct private requirements
    #[arg(long = "print-requires-private")]
    print_requires_private: bool,

    /// Print Provides entries
    #[arg(long = "print-provides")]
    print_provides: bool,

    /// Print the declared license of each queried package
    #[arg(long = "print-license")]
    print_license: bool,

    /// Print the variable names each queried package defines
    #[arg(long = "print-variables")]
    print_variables: bool,

    /// Print the record path of each queried package
    #[arg(long)]
    path: bool,

    /// List every package visible on the search path
    #[arg(long = "list-all")]
    list_all: bool,

    /// Prepend directories to the search path (repeatable)
    #[arg(long = "with-path", value_name = "DIR")]
    with_path: Vec<String>,

    /// Search only directories given explicitly or via PCQ_PATH
    #[arg(long = "env-only")]
    env_only: bool,

    /// Search path taken from the environment (colon-separated)
    #[arg(long, env = "PCQ_PATH", hide = true, value_name = "DIRS")]
    pcq_path: Option<String>,

    /// Prepend a sysroot to absolute -I and -L paths
    #[arg(long = "sysroot-dir", env = "PCQ_SYSROOT_DIR", value_name = "DIR")]
    sysroot_dir: Option<String>,

    /// Value for the pc_top_builddir builtin variable
    #[arg(long = "buildroot-dir", env = "PCQ_TOP_BUILD_DIR", value_name = "DIR")]
    buildroot_dir: Option<String>,

    /// Always prepend the sysroot, even to paths already under it
    #[arg(long = "fdo-sysroot-rules")]
    fdo_sysroot_rules: bool,

    /// Keep -I flags pointing into system include directories
    #[arg(long = "keep-system-cflags")]
    keep_system_cflags: bool,

    /// Keep -L flags pointing into system library directories
    #[arg(long = "keep-system-libs")]
    keep_system_libs: bool,

    /// Only print fragments of these types (e.g. 'IL')
    #[arg(long = "fragment-filter", value_name = "TYPES")]
    fragment_filter: Option<String>,

    /// Render flags in MSVC toolchain syntax
    #[arg(long = "msvc-syntax")]
    msvc_syntax: bool,

    /// Ignore Conflicts fields during resolution
    #[arg(long = "ignore-conflicts")]
    ignore_conflicts: bool,

    /// Ignore -uninstalled overlay records
    #[arg(long = "no-uninstalled")]
    no_uninstalled: bool,

    /// Re-read records on every lookup instead of caching
    #[arg(long = "no-cache")]
    no_cache: bool,

    /// Ceiling on dependency graph depth
    #[arg(long = "maximum-traverse-depth", value_name = "DEPTH")]
    maximum_traverse_depth: Option<u32>,

    /// Suppress error messages; the exit code still reports failure
    #[arg(long = "silence-errors", conflicts_with = "print_errors")]
    silence_errors: bool,

    /// Print error details even for queries that are normally quiet
    #[arg(long = "print-errors")]
    print_errors: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Sink that prints warnings to stderr as they arrive.
struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, diagnostic: Diagnostic) {
        eprintln!("warning: {diagnostic}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let silent = cli.silence_errors;
    let detailed = cli.print_errors;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !silent {
                eprintln!("pcq: {err:#}");
                if detailed {
                    if let Some(pcq) = err.downcast_ref::<pcq_core::error::PcqError>() {
                        if let Some(suggestion) = pcq.suggestion() {
                            eprintln!("pcq: {suggestion}");
                        }
                    }
                }
            }
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    debug!(?config, "resolved configuration");
    let mut client = Client::with_sink(config, Arc::new(StderrSink));

    if cli.list_all {
        for package in client.list_all() {
            println!("{:30} {} - {}", package.id, package.realname, package.description);
        }
        return Ok(());
    }

    let query = cli.query.join(" ");
    if query.trim().is_empty() {
        bail!("no packages named on the command line");
    }

    if cli.exists {
        client.solve(&query)?;
        return Ok(());
    }

    if cli.modversion {
        print_lines(client.modversions(&query)?);
        return Ok(());
    }
    if cli.path {
        print_lines(client.paths(&query)?);
        return Ok(());
    }
    if let Some(name) = &cli.variable {
        print_lines(client.variable(&query, name)?);
        return Ok(());
    }
    if cli.print_variables {
        for names in client.variable_names(&query)? {
            print_lines(names);
        }
        return Ok(());
    }
    if cli.print_requires {
        print_lines(client.requires(&query)?);
        return Ok(());
    }
    if cli.print_requires_private {
        print_lines(client.requires_private(&query)?);
        return Ok(());
    }
    if cli.print_provides {
        print_lines(client.provides(&query)?);
        return Ok(());
    }
    if cli.print_license {
        print_lines(client.licenses(&query)?);
        return Ok(());
    }

    let tokens = match (cli.cflags, cli.libs) {
        (true, true) => client.cflags_and_libs(&query)?,
        (true, false) => client.cflags(&query)?,
        (false, true) => client.libs(&query)?,
        (false, false) => {
            // no output requested; behave as a validity check
            client.solve(&query)?;
            return Ok(());
        },
    };
    println!("{}", tokens.join(" "));
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ResolveConfig> {
    let mut builder = ResolveConfig::builder()
        .static_link(cli.static_link)
        .pure(cli.pure)
        .env_only(cli.env_only)
        .no_cache(cli.no_cache)
        .ignore_conflicts(cli.ignore_conflicts)
        .disable_uninstalled(cli.no_uninstalled)
        .fdo_sysroot_rules(cli.fdo_sysroot_rules)
        .msvc_syntax(cli.msvc_syntax)
        .keep_system_cflags(cli.keep_system_cflags)
        .keep_system_libs(cli.keep_system_libs);

    for dir in &cli.with_path {
        builder = builder.extra_path(dir);
    }
    if let Some(list) = &cli.pcq_path {
        for dir in pcq_registry::split_path_list(list) {
            builder = builder.env_path(dir);
        }
    }
    if let Some(sysroot) = &cli.sysroot_dir {
        builder = builder.sysroot_dir(sysroot);
    }
    if let Some(buildroot) = &cli.buildroot_dir {
        builder = builder.buildroot_dir(buildroot);
    }
    if let Some(depth) = cli.maximum_traverse_depth {
        builder = builder.max_depth(depth);
    }
    if let Some(types) = &cli.fragment_filter {
        builder = builder.fragment_filter(types);
    }
    for entry in &cli.define_variable {
        let (name, value) = parse_define(entry)?;
        builder = builder.define(name, value);
    }

    Ok(builder.build())
}

fn parse_define(entry: &str) -> Result<(&str, &str)> {
    let (name, value) = entry
        .split_once('=')
        .with_context(|| format!("--define-variable takes NAME=VALUE, got '{entry}'"))?;
    if name.is_empty() {
        bail!("--define-variable takes NAME=VALUE, got '{entry}'");
    }
    Ok((name, value))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose { "pcq=debug" } else { "pcq=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
