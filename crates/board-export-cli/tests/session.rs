//! Browser lifetime around a single export.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use board_export::{AutoConfirm, ExportConfig};
use board_export_cli::renderer::{NavigationResult, RenderContext, Renderer};
use board_export_cli::export_board;

/// A tab whose page can no longer be read.
struct DeadTab;

#[async_trait]
impl RenderContext for DeadTab {
    async fn navigate(&mut self, _url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        Err(anyhow!("target closed"))
    }

    async fn execute_js(&self, _script: &str) -> Result<Value> {
        Err(anyhow!("target closed"))
    }

    async fn get_url(&self) -> Result<String> {
        Err(anyhow!("target closed"))
    }
}

#[derive(Default)]
struct FakeRenderer {
    has_board_tab: bool,
    shutdown_fails: bool,
    shutdowns: AtomicUsize,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn board_context(&self, _url: Option<&str>) -> Result<Box<dyn RenderContext>> {
        if self.has_board_tab {
            Ok(Box::new(DeadTab))
        } else {
            Err(anyhow!("no open tab shows a board"))
        }
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.shutdown_fails {
            Err(anyhow!("browser already gone"))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_shutdown_after_missing_board_tab() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("board.json");
    let renderer = FakeRenderer::default();

    let err = export_board(&renderer, None, &AutoConfirm, ExportConfig::default(), &output)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("no open tab shows a board"));
    assert_eq!(renderer.shutdowns.load(Ordering::SeqCst), 1);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_shutdown_after_failed_export() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("board.json");
    let renderer = FakeRenderer {
        has_board_tab: true,
        ..FakeRenderer::default()
    };

    let err = export_board(&renderer, None, &AutoConfirm, ExportConfig::default(), &output)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("export failed"));
    assert_eq!(renderer.shutdowns.load(Ordering::SeqCst), 1);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_export_error_wins_over_shutdown_error() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer {
        shutdown_fails: true,
        ..FakeRenderer::default()
    };

    let err = export_board(
        &renderer,
        None,
        &AutoConfirm,
        ExportConfig::default(),
        &dir.path().join("board.json"),
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("no open tab shows a board"));
    assert!(!message.contains("browser already gone"));
    assert_eq!(renderer.shutdowns.load(Ordering::SeqCst), 1);
}
