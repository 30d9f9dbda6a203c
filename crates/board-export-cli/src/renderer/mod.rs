//! Renderer abstraction for the browser that shows the board.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can hand out the tab showing the board.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// The tab showing the board.
    ///
    /// With `url`, a tab already at that address is reused, otherwise one is
    /// opened there. Without it, the first tab that looks like a board wins.
    async fn board_context(&self, url: Option<&str>) -> Result<Box<dyn RenderContext>>;
    /// Release the browser. Attached browsers are left running.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser tab.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
}
