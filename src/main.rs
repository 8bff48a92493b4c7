//! Command-line driver.
//!
//! Reads an already-preprocessed `.rc` file, runs the code-page scan, the
//! parser and the emitter in order, and writes the `.res` next to the input
//! unless told otherwise. Rendering diagnostics to the terminal happens
//! here; the library only produces their data model.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use resc::code_page::{self, CodePage};
use resc::diagnostics::{Diagnostic, Diagnostics, Severity};
use resc::lexer::{LexMode, Lexer, TokenId};
use resc::options::Options;
use resc::resolver::SearchPaths;
use resc::{emitter, parser};

#[derive(Parser, Debug)]
#[command(version, about = "Compiles Windows resource scripts (.rc) into .res binaries")]
struct Cli {
    /// Preprocessed resource script.
    input: PathBuf,

    /// Output file; defaults to the input path with a .res extension.
    output: Option<PathBuf>,

    /// Additional directory to search for referenced files; repeatable.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include: Vec<PathBuf>,

    /// Default language id, e.g. 0x409.
    #[arg(short = 'l', long = "language", value_name = "ID", default_value = "0x409", value_parser = parse_u16)]
    language: u16,

    /// Default code page (1252 or 65001).
    #[arg(short = 'c', long = "codepage", value_name = "PAGE", default_value_t = 1252)]
    codepage: u32,

    /// Maximum string literal length as a percentage of 8192 code units.
    #[arg(long = "sl", value_name = "PERCENT", value_parser = clap::value_parser!(u16).range(1..=100))]
    string_length_percent: Option<u16>,

    /// Null-terminate every string-table string.
    #[arg(short = 'n', long = "null-terminate")]
    null_terminate: bool,

    /// Warn instead of erroring on unknown #pragma code_page values.
    #[arg(long = "warn-invalid-code-page")]
    warn_invalid_code_page: bool,

    /// Stop after tokenizing and dump the tokens.
    #[arg(long)]
    tokenize: bool,

    /// Stop after parsing and dump the syntax tree.
    #[arg(long)]
    parse: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let Some(default_code_page) = CodePage::from_identifier(cli.codepage) else {
        bail!("unsupported code page {}", cli.codepage);
    };
    let mut options = Options {
        default_language_id: cli.language,
        default_code_page,
        null_terminate_string_table_strings: cli.null_terminate,
        warn_instead_of_error_on_invalid_code_page: cli.warn_invalid_code_page,
        include_directories: cli.include.clone(),
        ..Options::default()
    };
    if let Some(percent) = cli.string_length_percent {
        options.max_string_literal_code_units = Options::string_length_limit_from_percent(percent);
    }

    let source = fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    debug!(len = source.len(), "read source");

    let mut diagnostics = Diagnostics::new();
    let code_pages = match code_page::scan(
        &source,
        options.default_code_page,
        options.warn_instead_of_error_on_invalid_code_page,
        &mut diagnostics,
    ) {
        Ok(code_pages) => code_pages,
        Err(error) => {
            render_diagnostics(&diagnostics);
            bail!("{error} (line {})", error.span().line);
        }
    };

    if cli.tokenize {
        dump_tokens(&source);
        render_diagnostics(&diagnostics);
        return Ok(());
    }

    let root = match parser::parse(&source, &code_pages, &mut diagnostics) {
        Ok(root) => root,
        Err(error) => {
            render_diagnostics(&diagnostics);
            bail!("{error} (line {})", error.span.line);
        }
    };
    debug!(statements = root.body.len(), "parsed");

    if cli.parse {
        println!("{root:#?}");
        render_diagnostics(&diagnostics);
        return Ok(());
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("res"));
    let search = SearchPaths::new(
        cli.input.parent().map(PathBuf::from),
        options.include_directories.clone(),
    );

    let out_file = File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let mut out = BufWriter::new(out_file);

    let result = emitter::compile(
        &root,
        &source,
        &code_pages,
        &options,
        &search,
        &mut diagnostics,
        &mut out,
    );
    render_diagnostics(&diagnostics);
    if let Err(error) = result {
        // Errors abort the compilation; never leave a partial .res behind.
        drop(out);
        fs::remove_file(&output_path).ok();
        bail!("{error} (line {})", error.span.line);
    }
    debug!(path = %output_path.display(), "wrote output");
    Ok(())
}

fn render_diagnostics(diagnostics: &Diagnostics) {
    for Diagnostic {
        severity,
        reason,
        span,
    } in diagnostics
    {
        let label = match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        eprintln!("{label}: {reason} (line {})", span.line);
    }
}

fn dump_tokens(source: &[u8]) {
    let mut lexer = Lexer::new(source);
    loop {
        match lexer.next(LexMode::Normal) {
            Ok(token) => {
                println!(
                    "{:?} {:?} (line {})",
                    token.id,
                    String::from_utf8_lossy(token.slice(source)),
                    token.line
                );
                if token.id == TokenId::Eof {
                    break;
                }
            }
            Err(error) => {
                eprintln!("error: {error} (line {})", error.span.line);
                break;
            }
        }
    }
}

fn parse_u16(value: &str) -> std::result::Result<u16, String> {
    let (digits, radix) = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };
    u16::from_str_radix(digits, radix).map_err(|error| error.to_string())
}
