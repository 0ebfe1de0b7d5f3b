use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use tokencast::{BuildContext, Diagnostic, Metadata, Plugin, PluginOutput, Token};

mod build;
mod css;
mod js;
mod list;
#[cfg(feature = "watch")]
mod watch;

#[derive(Parser)]
#[command(
    name = "tokencast",
    version,
    about = "Design token code generator (CSS custom properties, JS, JSON)"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show project information
    #[arg(long)]
    about: bool,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON array of token objects
    Json,
}

/// Which file the `js` command prints.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Emit {
    /// JavaScript module (default)
    #[default]
    Js,
    /// TypeScript declarations
    Dts,
    /// JSON document
    Json,
}

#[derive(Subcommand)]
#[command(next_display_order = None)]
enum Commands {
    /// Build every configured output into the output directory
    Build {
        /// Config file [default: tokencast.yaml, .yml or .json in the current directory]
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the configured output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Compare against files on disk without writing (exit 1 if stale)
        #[arg(long)]
        check: bool,
        /// Rebuild when the config or token file changes (requires 'watch' feature)
        #[arg(long)]
        watch: bool,
    },
    /// Print CSS custom properties for a token file
    Css {
        /// Token file (JSON or YAML)
        tokens: PathBuf,
        /// Display name for the file header
        #[arg(long)]
        name: Option<String>,
        /// Custom-property prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Mode selector as GROUP#MODE=SELECTOR (repeatable)
        #[arg(long = "mode-selector", value_name = "KEY=SELECTOR")]
        mode_selectors: Vec<String>,
        /// Inline linked files as data URIs (paths relative to the token file)
        #[arg(long)]
        embed_files: bool,
    },
    /// Print the JS module, its declarations, or JSON for a token file
    Js {
        /// Token file (JSON or YAML)
        tokens: PathBuf,
        /// Which output to print
        #[arg(long, value_enum, default_value_t = Emit::Js)]
        emit: Emit,
        /// Nest tokens by id segment
        #[arg(long)]
        deep: bool,
        /// Glob pattern of token ids to leave out (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// List tokens in a token file
    #[command(alias = "ls")]
    List {
        /// Token file (JSON or YAML)
        tokens: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    match cli.command {
        Some(Commands::Build {
            config,
            out_dir,
            check,
            watch,
        }) => build::run(config, out_dir, check, watch),
        Some(Commands::Css {
            tokens,
            name,
            prefix,
            mode_selectors,
            embed_files,
        }) => css::run(tokens, name, prefix, mode_selectors, embed_files),
        Some(Commands::Js {
            tokens,
            emit,
            deep,
            exclude,
        }) => js::run(tokens, emit, deep, exclude),
        Some(Commands::List { tokens, format }) => list::run(tokens, format),
        None => {
            eprintln!("Usage: tokencast <command> [args]");
            eprintln!("Run `tokencast --help` for details.");
            std::process::exit(1);
        }
    }
}

fn print_about() {
    println!(
        "tokencast: Design Token Code Generator\n\
         ├─ version:    {}\n\
         ├─ author:     {}\n\
         ├─ developer:  mailto:waclaw.kusnierczyk@gmail.com\n\
         ├─ source:     {}\n\
         └─ licence:    {} https://www.apache.org/licenses/LICENSE-2.0",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
    );
}

/// Read a token file or exit with `tokencast <command>: <error>`.
fn load_tokens(command: &str, path: &Path) -> Vec<Token> {
    tokencast::read_tokens(path).unwrap_or_else(|e| {
        eprintln!("tokencast {command}: {}: {e}", path.display());
        std::process::exit(1);
    })
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        eprintln!("{d}");
    }
}

/// Run one plugin over a token file, relative assets resolving next to it.
fn run_single(command: &str, plugin: &dyn Plugin, tokens_path: &Path, name: Option<String>) -> PluginOutput {
    let tokens = load_tokens(command, tokens_path);
    let metadata = Metadata { name };
    let base_dir = tokens_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let ctx = BuildContext {
        tokens: &tokens,
        metadata: &metadata,
        out_dir: base_dir,
    };
    let output = plugin.build(&ctx).unwrap_or_else(|e| {
        eprintln!("tokencast {command}: {e}");
        std::process::exit(1);
    });
    print_diagnostics(&output.diagnostics);
    output
}
