//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use crate::markup::BOARD_URL_MARKER;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// How long to let the handler register an attached browser's tabs.
const TARGET_DISCOVERY_PAUSE: Duration = Duration::from_millis(500);

const NAVIGATION_TIMEOUT_MS: u64 = 60_000;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. BOARD_EXPORT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("BOARD_EXPORT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.board-export/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".board-export/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".board-export/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".board-export/chromium/chrome-linux64/chrome"),
                home.join(".board-export/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Options for launching a fresh Chromium.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit binary; discovered with [`find_chromium`] when absent.
    pub chrome: Option<PathBuf>,
    /// Profile directory, so an existing login can be reused.
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
}

/// Chromium-based renderer, launched or attached over CDP.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    attached: bool,
}

impl ChromiumRenderer {
    /// Launch a new Chromium instance.
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        let chrome_path = match options.chrome {
            Some(path) => path,
            None => find_chromium()
                .context("Chromium not found. Pass --chrome or set BOARD_EXPORT_CHROMIUM_PATH.")?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        builder = if options.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        if let Some(dir) = options.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        Ok(Self {
            browser,
            handler: spawn_handler(handler),
            attached: false,
        })
    }

    /// Attach to a running browser through its DevTools websocket URL.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let (mut browser, handler) = Browser::connect(ws_url)
            .await
            .with_context(|| format!("failed to connect to {ws_url}"))?;
        let handler = spawn_handler(handler);

        browser
            .fetch_targets()
            .await
            .context("failed to list browser targets")?;
        tokio::time::sleep(TARGET_DISCOVERY_PAUSE).await;

        Ok(Self {
            browser,
            handler,
            attached: true,
        })
    }

    async fn tab_urls(&self) -> Result<Vec<(Page, String)>> {
        let pages = self.browser.pages().await.context("failed to list tabs")?;
        let mut tabs = Vec::with_capacity(pages.len());
        for page in pages {
            let url = page.url().await.ok().flatten().unwrap_or_default();
            tabs.push((page, url));
        }
        Ok(tabs)
    }
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!("CDP handler error: {e}");
            }
        }
    })
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn board_context(&self, url: Option<&str>) -> Result<Box<dyn RenderContext>> {
        let tabs = self.tab_urls().await?;

        if let Some(url) = url {
            if let Some((page, _)) = tabs.into_iter().find(|(_, u)| u.starts_with(url)) {
                tracing::info!("Using open tab at {url}");
                return Ok(Box::new(ChromiumContext { page }));
            }
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .context("failed to create new page")?;
            let mut ctx = ChromiumContext { page };
            let nav = ctx.navigate(url, NAVIGATION_TIMEOUT_MS).await?;
            tracing::info!("Opened {} in {}ms", nav.final_url, nav.load_time_ms);
            return Ok(Box::new(ctx));
        }

        match tabs.into_iter().find(|(_, u)| u.contains(BOARD_URL_MARKER)) {
            Some((page, u)) => {
                tracing::info!("Using board tab {u}");
                Ok(Box::new(ChromiumContext { page }))
            }
            None => bail!("no open tab shows a board; pass --url"),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        // Dropping a launched Browser kills its process; an attached one
        // only loses this connection.
        if self.attached {
            tracing::debug!("Detaching from browser");
        }
        self.handler.abort();
        Ok(())
    }
}

/// A single Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_response)) => {
                let _ = self.page.wait_for_navigation().await;

                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn get_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .unwrap_or_default();
        Ok(url)
    }
}
