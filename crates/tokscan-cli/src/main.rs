//! tokscan - List the tokens of a model file's embedded vocabulary
//!
//! This tool finds the vocabulary table inside a GGUF-style model file by
//! scanning for special tokens and word-boundary markers, then prints each
//! token with its offset, raw bytes, guessed identifiers and decoded text.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use tokscan_core::{
    write_listing, ListingWriter, MappedFile, Scanner, ScannerConfig, Selection, TableWriter,
    TextWriter,
};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
Examples:
  # Show first 50 tokens:
  tokscan model.gguf

  # Show 100 tokens starting from position 1000:
  tokscan --count 100 --skip 1000 model.gguf

  # Show 150 tokens around position 1000:
  tokscan --window 150 --skip 1000 model.gguf

Output Format:
  #          Token number in vocabulary
  Offset     File offset in hexadecimal
  Len        Length of token in bytes
  Raw Hex    Hexadecimal representation of token data
  Token IDs  Potential token IDs found near token
  Token Text Decoded token text";

/// List meaningful tokens from a model file's vocabulary section
#[derive(Parser, Debug)]
#[command(name = "tokscan")]
#[command(author, version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Path to the model file (GGUF)
    file: Option<PathBuf>,

    /// Number of tokens to display
    #[arg(long, default_value = "50")]
    count: usize,

    /// Number of tokens to skip before starting display
    #[arg(long, default_value = "0")]
    skip: usize,

    /// Show N tokens centered around the skip position
    #[arg(long, default_value = "0", value_name = "N")]
    window: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Special token marking the start of the vocabulary (repeatable,
    /// replaces the built-in set)
    #[arg(long = "special-token", value_name = "TOKEN")]
    special_tokens: Vec<String>,

    /// Zero bytes in a row that end the vocabulary section
    #[arg(long, default_value = "100")]
    null_threshold: usize,

    /// Maximum bytes read after a boundary marker
    #[arg(long, default_value = "100")]
    lookahead: usize,

    /// Exclusive upper bound for a plausible token ID
    #[arg(long, default_value = "100000")]
    id_ceiling: u32,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format for the token listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Diagnostic table with offsets, hex and IDs
    Table,
    /// Decoded token text only (for scripting)
    Text,
}

impl Cli {
    fn scanner_config(&self) -> ScannerConfig {
        let mut config = ScannerConfig::new()
            .null_run_threshold(self.null_threshold)
            .lookahead_limit(self.lookahead)
            .id_ceiling(self.id_ceiling);
        if !self.special_tokens.is_empty() {
            config = config.special_tokens(self.special_tokens.iter().map(String::as_str));
        }
        config
    }

    fn selection(&self) -> Selection {
        Selection::from_args(self.count, self.skip, self.window)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let Some(ref file) = cli.file else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let stdout = io::stdout().lock();
    match cli.format {
        OutputFormat::Table => list_tokens(&cli, file, &mut TableWriter::new(stdout)),
        OutputFormat::Text => list_tokens(&cli, file, &mut TextWriter::new(stdout)),
    }
}

/// Map the model file and write its token listing
fn list_tokens<W: ListingWriter>(cli: &Cli, file: &Path, writer: &mut W) -> Result<()> {
    let scanner = Scanner::with_config(cli.scanner_config()).context("Invalid scan settings")?;

    let mapped = MappedFile::open(file)
        .with_context(|| format!("Failed to open model file: {}", file.display()))?;
    debug!(
        "Opened {} ({} bytes, mapped: {})",
        file.display(),
        mapped.len(),
        mapped.is_mapped()
    );

    writer
        .write_source(file, mapped.len() as u64)
        .context("Failed to write listing")?;

    let report = scanner.locate(&mapped);
    if report.is_fallback() {
        info!("No special tokens in {}, listing from the start of the file", file.display());
    }

    let selection = cli.selection();
    let written = write_listing(&scanner, &mapped, &report, selection, writer)
        .context("Failed to write listing")?;

    info!("Listed {} of {} requested tokens", written, selection.count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tokscan", "model.gguf"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("model.gguf")));
        assert_eq!(cli.selection(), Selection::new(50, 0));
        assert_eq!(cli.format, OutputFormat::Table);

        let config = cli.scanner_config();
        assert_eq!(config.null_run_threshold, 100);
        assert_eq!(config.lookahead_limit, 100);
        assert_eq!(config.id_ceiling, 100_000);
        assert_eq!(config.special_tokens.len(), 4);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let cli = Cli::try_parse_from(["tokscan"]).unwrap();
        assert!(cli.file.is_none());
    }

    #[test]
    fn test_window_selection() {
        let cli =
            Cli::try_parse_from(["tokscan", "--window", "150", "--skip", "1000", "model.gguf"])
                .unwrap();
        let selection = cli.selection();
        assert_eq!(selection.skip, 925);
        assert_eq!(selection.count, 150);
    }

    #[test]
    fn test_special_token_override() {
        let cli = Cli::try_parse_from([
            "tokscan",
            "--special-token",
            "<s>",
            "--special-token",
            "</s>",
            "model.gguf",
        ])
        .unwrap();
        assert_eq!(
            cli.scanner_config().special_tokens,
            vec![b"<s>".to_vec(), b"</s>".to_vec()]
        );
    }

    #[test]
    fn test_list_tokens_text_format() {
        use std::io::Write as _;

        let mut data = b"<eos>".to_vec();
        data.extend_from_slice(&[0, 0, 0, 9]);
        data.extend_from_slice("\u{2581}token".as_bytes());
        data.extend(std::iter::repeat(0u8).take(128));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let cli = Cli::try_parse_from(["tokscan", "--format", "text"]).unwrap();
        let mut writer = TextWriter::new(Vec::new());
        list_tokens(&cli, file.path(), &mut writer).unwrap();
        assert_eq!(
            String::from_utf8(writer.into_inner()).unwrap(),
            "\u{2581}token\n"
        );
    }

    #[test]
    fn test_list_tokens_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["tokscan"]).unwrap();
        let mut writer = TextWriter::new(Vec::new());
        let err = list_tokens(&cli, &dir.path().join("absent.gguf"), &mut writer).unwrap_err();
        assert!(err.to_string().contains("Failed to open model file"));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let cli = Cli::try_parse_from(["tokscan", "--lookahead", "0", "model.gguf"]).unwrap();
        assert!(Scanner::with_config(cli.scanner_config()).is_err());
    }
}
