use std::fs;
use std::path::PathBuf;

use log::info;

use crate::atlas::Compositor;
use crate::catalog::discover;
use crate::codec::ImageCodec;
use crate::config::Settings;
use crate::error::AtlasError;
use crate::output::{BinOutput, Manifest, NameTemplate, write_bins, write_manifest};
use crate::packing::BinPacker;
use crate::report::{ImageIssue, RunContext};

/// What a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Images found in the source folders
    pub discovered: usize,
    /// Images written into an atlas
    pub composited: usize,
    /// Atlas image names as recorded in the manifest
    pub bins: Vec<String>,
    pub manifest: PathBuf,
}

/// Discover, pack, composite and write the atlases described by `settings`.
///
/// Problems with single images are reported to `ctx` and the run goes on
/// without them. Anything returned as an error aborts the run.
pub fn run(
    settings: &Settings,
    codec: &impl ImageCodec,
    ctx: &RunContext,
) -> Result<RunSummary, AtlasError> {
    settings.validate()?;
    let template = NameTemplate::parse(&settings.name_format)?;

    let catalog = discover(
        &settings.directories,
        settings.include_extensions,
        codec,
        ctx,
    )?;
    let channels = catalog.channel_depth(settings.format);
    info!(
        "Packing {} images into {}x{} atlases ({} channels)",
        catalog.len(),
        settings.size,
        settings.size,
        channels
    );

    let packed = BinPacker::new(settings.size)
        .heuristic(settings.heuristic)
        .pack(&catalog.rectangles());

    for rejected in &packed.rejected {
        if let Some(image) = catalog.get(rejected.image()) {
            ctx.report(&image.path, ImageIssue::Packing(rejected.clone()));
        }
    }
    for (index, occupancy) in packed.occupancy.iter().enumerate() {
        info!("Atlas {}: {:.1}% full", index + 1, occupancy * 100.0);
    }

    let layout = packed.layout(catalog.len());
    let composite =
        Compositor::new(settings.size, channels).composite(&catalog, &layout, codec, ctx)?;

    fs::create_dir_all(&settings.output_dir).map_err(|e| AtlasError::OutputDirectory {
        path: settings.output_dir.clone(),
        source: e,
    })?;

    let output = BinOutput {
        directory: &settings.output_dir,
        template: &template,
        format: settings.format,
        absolute_paths: settings.absolute_bin_paths,
    };
    let bins = write_bins(&composite.bins, &output, codec)?;

    let manifest = Manifest::build(bins.clone(), &catalog, &layout, &composite.composited);
    write_manifest(&manifest, &settings.manifest)?;
    info!("Generated {}", settings.manifest.display());

    Ok(RunSummary {
        discovered: catalog.len(),
        composited: composite.composited.len(),
        bins,
        manifest: settings.manifest.clone(),
    })
}
