pub mod color;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

pub use color::{Color, ColorError, Hsl};
pub use editor::{EditorSession, ExportOutcome, ToolKind};
pub use error::{AppError, AppResult};
pub use export::{ExportArtifact, ExportFormat, Exporter, PdfDocumentEncoder};
pub use geometry::{CellCoord, GridDimensions};
pub use grid::PixelGrid;

/// Entrypoint used by the CLI: fills a random pattern and exports it.
///
/// An empty `formats` list exports every format. Returns the saved paths in
/// request order.
pub fn run(formats: &[ExportFormat]) -> AppResult<Vec<PathBuf>> {
    logging::init();
    tracing::info!("starting pixelgrid");

    let config = config::load_app_config();
    let formats = if formats.is_empty() {
        ExportFormat::ALL.to_vec()
    } else {
        formats.to_vec()
    };

    let exporter = Exporter::new(config.export_settings())
        .with_document_encoder(Arc::new(PdfDocumentEncoder::default()));
    let store = storage::JsonFileStore::with_default_path()?;
    let mut session = EditorSession::new(&config, exporter, store)?;
    session.randomize_from_clock();

    let downloads = match &config.export.output_dir {
        Some(dir) => storage::DownloadDirectory::new(dir.clone()),
        None => storage::DownloadDirectory::current_dir()?,
    };
    let outcomes = formats
        .iter()
        .map(|format| session.export(*format, &downloads))
        .collect::<Result<Vec<_>, _>>()?;
    let saved = outcomes
        .into_iter()
        .map(ExportOutcome::wait)
        .collect::<Result<Vec<_>, _>>()?;

    session.close();
    tracing::info!(exports = saved.len(), "done");
    Ok(saved)
}
