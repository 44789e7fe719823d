//! `vero` — command-line driver for the Vero DSL toolchain.

use clap::{Parser as ClapParser, Subcommand};
use std::path::{Path, PathBuf};
use vero_cli::colors::{bold, green, red, status_label};
use vero_cli::{config::VeroConfig, fmt};
use vero_compiler::diagnostics::Diagnostic;

#[derive(ClapParser)]
#[command(
    name = "vero",
    version,
    about = "Vero — a plain-English DSL for browser end-to-end tests",
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}

Examples:
  vero check tests/login.vero          Type-check a suite
  vero build tests/login.vero -o dist  Transpile a suite to test-runner source
  vero fmt tests/login.vero            Reformat a suite in place
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lex, parse, and validate a `.vero` suite; report diagnostics
    Check {
        #[arg()]
        file: PathBuf,
    },
    /// Compile a `.vero` suite and write the generated test-runner sources
    Build {
        #[arg()]
        file: PathBuf,

        /// Output directory for generated sources (default: `dist`)
        #[arg(short, long, default_value = "dist")]
        output: PathBuf,
    },
    /// Reformat `.vero` files in place
    Fmt {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Check formatting without writing; exit non-zero if a file differs
        #[arg(long)]
        check: bool,
    },
    /// Print the default `vero.toml` template
    Init,
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file } => cmd_check(&file),
        Commands::Build { file, output } => cmd_build(&file, &output),
        Commands::Fmt { files, check } => cmd_fmt(&files, check),
        Commands::Init => cmd_init(),
    }
}

fn read_source(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("{} cannot read file '{}': {}", red("error:"), bold(&path.display().to_string()), e);
        std::process::exit(1);
    })
}

fn print_diagnostics(diagnostics: &[Diagnostic], source: &str) {
    let lines: Vec<&str> = source.lines().collect();
    for diag in diagnostics {
        eprint!("{}", diag.render_ansi(&lines));
    }
}

fn cmd_check(file: &Path) {
    let source = read_source(file);
    println!("{} {}", status_label("Checking"), bold(&file.display().to_string()));

    let result = vero_compiler::compile(&source);
    print_diagnostics(&result.diagnostics, &source);

    if result.valid {
        println!("{} no errors", green("Finished"));
    } else {
        eprintln!("{} compilation failed", red("error:"));
        std::process::exit(1);
    }
}

fn cmd_build(file: &Path, output_dir: &Path) {
    let source = read_source(file);
    println!("{} {}", status_label("Compiling"), bold(&file.display().to_string()));

    let result = vero_compiler::compile(&source);
    print_diagnostics(&result.diagnostics, &source);

    if !result.valid {
        eprintln!("{} compilation failed, nothing written", red("error:"));
        std::process::exit(1);
    }

    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!("{} cannot create '{}': {}", red("error:"), output_dir.display(), e);
        std::process::exit(1);
    }

    let mut written = 0;
    for (name, code) in result.output.pages.iter().chain(result.output.page_actions.iter()) {
        written += write_unit(output_dir, name, "page", code);
    }
    for (name, code) in &result.output.tests {
        written += write_unit(output_dir, name, "spec", code);
    }

    println!("{} {} file(s) in {}", green("Finished"), written, output_dir.display());
}

fn write_unit(dir: &Path, name: &str, kind: &str, code: &str) -> usize {
    let path = dir.join(format!("{}.{}.ts", name, kind));
    match std::fs::write(&path, code) {
        Ok(()) => 1,
        Err(e) => {
            eprintln!("{} cannot write '{}': {}", red("error:"), path.display(), e);
            0
        }
    }
}

fn cmd_fmt(files: &[PathBuf], check_only: bool) {
    let mut unformatted = Vec::new();
    for file in files {
        let source = read_source(file);
        match fmt::format_source(&source) {
            Ok(formatted) => {
                if formatted == source {
                    continue;
                }
                if check_only {
                    unformatted.push(file.clone());
                } else {
                    if let Err(e) = std::fs::write(file, &formatted) {
                        eprintln!("{} cannot write '{}': {}", red("error:"), file.display(), e);
                        std::process::exit(1);
                    }
                    println!("{} {}", status_label("Formatted"), bold(&file.display().to_string()));
                }
            }
            Err(diagnostics) => {
                print_diagnostics(&diagnostics, &source);
                eprintln!("{} '{}' has errors, not formatted", red("error:"), file.display());
                std::process::exit(1);
            }
        }
    }

    if check_only {
        if unformatted.is_empty() {
            println!("{} all files formatted", green("Finished"));
        } else {
            for file in &unformatted {
                eprintln!("{} {} is not formatted", red("error:"), file.display());
            }
            std::process::exit(1);
        }
    }
}

fn cmd_init() {
    print!("{}", VeroConfig::default_template());
}
