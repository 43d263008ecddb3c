use anyhow::Result;
use clap::Parser;

use xlf_translate::cli::commands::translate::TranslateOptions;
use xlf_translate::cli::commands::{
    cleanup, configure, inspect, interactive, providers, translate, validate,
};
use xlf_translate::cli::{Args, Command};
use xlf_translate::output::{self, OutputConfig};
use xlf_translate::translation::{print_languages, validate_language};
use xlf_translate::ui::Style;

/// Exit status for errors, matching what returning `Err` from `main` gives.
const FAILURE: exitcode::ExitCode = 1;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.quiet,
        no_color: args.no_color || std::env::var_os("NO_COLOR").is_some(),
        verbose: args.verbose,
    });

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            FAILURE
        }
    };

    std::process::exit(code);
}

async fn run(args: Args) -> Result<exitcode::ExitCode> {
    match args.command {
        Some(Command::Inspect { file }) => inspect::run_inspect(&file),
        Some(Command::Validate { file }) => validate::run_validate(&file),
        Some(Command::Cleanup { file, output }) => cleanup::run_cleanup(&file, output),
        Some(Command::Languages) => {
            print_languages();
            Ok(exitcode::OK)
        }
        Some(Command::Providers { provider }) => {
            providers::print_providers(provider.as_deref())?;
            Ok(exitcode::OK)
        }
        Some(Command::Configure) => {
            configure::run_configure()?;
            Ok(exitcode::OK)
        }
        None => {
            if let Some(ref lang) = args.to {
                validate_language(lang)?;
            }

            let options = TranslateOptions {
                to: args.to,
                provider: args.provider,
                model: args.model,
                preserve: args.preserve,
                context: args.context,
                batch_size: args.batch_size,
                sequential: args.sequential,
                output: args.output,
                no_cache: args.no_cache,
            };

            match args.file {
                Some(file) => translate::run_translate(&file, &options).await,
                None => interactive::run_interactive(options).await,
            }
        }
    }
}
