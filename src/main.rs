use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::info;

use texpack::cli::CliArgs;
use texpack::codec::ImageCrateCodec;
use texpack::config::Settings;
use texpack::report::RunContext;

/// Completed, but some images were skipped or altered
const EXIT_DIAGNOSTICS: u8 = 2;

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let ctx = RunContext::new();

    match run(&ctx) {
        Ok(()) if ctx.has_diagnostics() => {
            eprintln!(
                "Finished with {} diagnostic(s), {} image(s) skipped",
                ctx.diagnostics().len(),
                ctx.skipped_count()
            );
            ExitCode::from(EXIT_DIAGNOSTICS)
        }
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Use eprintln instead of error! because logger may not be initialized
            // (e.g., config loading fails before logger init)
            for diagnostic in ctx.diagnostics() {
                eprintln!("{}", diagnostic);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &RunContext) -> Result<()> {
    let cli = CliArgs::parse();
    let settings = Settings::from_args(&cli)?;

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(if settings.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("texpack v{}", env!("CARGO_PKG_VERSION"));

    let codec = ImageCrateCodec::new().compress(settings.compress);
    let summary = texpack::run(&settings, &codec, ctx)?;

    info!(
        "Packed {} of {} images into {} atlas(es)",
        summary.composited,
        summary.discovered,
        summary.bins.len()
    );
    info!("Done!");

    Ok(())
}
