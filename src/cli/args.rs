use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xlft")]
#[command(about = "XLIFF translation CLI that keeps inline formatting intact")]
#[command(version)]
pub struct Args {
    /// XLF file to translate (interactive mode if not provided)
    pub file: Option<PathBuf>,

    /// Target language code (e.g., es, fr, de-DE)
    #[arg(short = 't', long = "to")]
    pub to: Option<String>,

    /// Provider name from the config file
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Terms to leave untranslated (comma-separated or repeated)
    #[arg(long = "preserve", value_delimiter = ',')]
    pub preserve: Vec<String>,

    /// Extra context for the translation prompt
    #[arg(short = 'c', long)]
    pub context: Option<String>,

    /// Units per request in batch mode
    #[arg(short = 'b', long)]
    pub batch_size: Option<usize>,

    /// Translate one unit per request instead of batching
    #[arg(long)]
    pub sequential: bool,

    /// Output file (defaults to <name>_translated.xlf next to the input)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Disable cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    /// Suppress status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Show debug diagnostics
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show statistics, samples and structural advisories for an XLF file
    Inspect {
        /// XLF file to inspect
        file: PathBuf,
    },
    /// Check a translated XLF file for leftover boundary tokens
    Validate {
        /// Translated XLF file
        file: PathBuf,
    },
    /// Remove leftover boundary tokens from a translated XLF file
    Cleanup {
        /// Translated XLF file
        file: PathBuf,

        /// Output file (defaults to <name>_cleaned.xlf next to the input)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// List supported language codes
    Languages,
    /// List configured providers
    Providers {
        /// Show details for one provider
        provider: Option<String>,
    },
    /// Configure default settings
    Configure,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_flags() {
        let args = Args::try_parse_from([
            "xlft",
            "course.xlf",
            "--to",
            "es",
            "--preserve",
            "Pixel,Acme",
            "--preserve",
            "MbG",
            "--sequential",
        ])
        .unwrap();

        assert_eq!(args.file, Some(PathBuf::from("course.xlf")));
        assert_eq!(args.to.as_deref(), Some("es"));
        assert_eq!(args.preserve, vec!["Pixel", "Acme", "MbG"]);
        assert!(args.sequential);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_subcommand_with_global_flag() {
        let args = Args::try_parse_from(["xlft", "cleanup", "out.xlf", "-o", "clean.xlf", "-q"])
            .unwrap();

        assert!(args.quiet);
        assert!(matches!(
            args.command,
            Some(Command::Cleanup { ref output, .. }) if output.as_deref() == Some(std::path::Path::new("clean.xlf"))
        ));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["xlft", "-q", "-v", "languages"]).is_err());
    }
}
