//! One export against an already connected browser.

use std::path::Path;

use anyhow::{Context, Result};

use board_export::{BoardExporter, ConfirmGate, ExportConfig, RunOutcome, TracingReporter};

use crate::locator::DomLocator;
use crate::output::write_document;
use crate::renderer::Renderer;

/// Export the board the renderer shows and write it to `output`.
///
/// The renderer is shut down on every path once this is called. When both
/// the export and the shutdown fail, the export error is returned.
pub async fn export_board(
    renderer: &dyn Renderer,
    url: Option<&str>,
    gate: &dyn ConfirmGate,
    config: ExportConfig,
    output: &Path,
) -> Result<()> {
    let result = export(renderer, url, gate, config, output).await;
    match renderer.shutdown().await {
        Ok(()) => result,
        Err(e) if result.is_err() => {
            tracing::warn!("Browser shutdown failed: {e:#}");
            result
        }
        Err(e) => Err(e.context("browser shutdown failed")),
    }
}

async fn export(
    renderer: &dyn Renderer,
    url: Option<&str>,
    gate: &dyn ConfirmGate,
    config: ExportConfig,
    output: &Path,
) -> Result<()> {
    let ctx = renderer.board_context(url).await?;
    let locator = DomLocator::new(ctx);

    let outcome = BoardExporter::new(&locator, config)
        .run(gate, &TracingReporter)
        .await
        .context("export failed")?;

    match outcome {
        RunOutcome::Exported(doc) => {
            write_document(&doc, output)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        RunOutcome::Cancelled => {
            tracing::info!("Cancelled; nothing written");
        }
    }
    Ok(())
}
