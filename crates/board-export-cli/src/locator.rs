//! DOM-backed [`ViewLocator`] over a live browser tab.
//!
//! Each operation evaluates one small probe script. Probes return
//! `JSON.stringify(...)` of their result so the shape crossing the CDP
//! boundary is plain JSON text, parsed here with serde. Elements the engine
//! needs to touch again are tagged with [`HANDLE_ATTR`] and referred to by
//! that tag.
//!
//! [`HANDLE_ATTR`]: crate::markup::HANDLE_ATTR

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use board_export::{
    Activation, ActivationHandle, CardProbe, ColumnProbe, ControlHandle, ExpandCandidate,
    ExportError, ExportResult, FeedSnapshot, StoryProbe, TitleSurface, ViewLocator,
};

use crate::markup::selector_table;
use crate::renderer::RenderContext;

/// Marker opening every probe script, followed by the probe name.
pub const PROBE_MARKER: &str = "/*board-export:";

/// Helpers shared by every probe. Expects `SEL` in scope.
const PRELUDE: &str = r#"
const tag = (el) => {
  let h = el.getAttribute(SEL.handleAttr);
  if (!h) {
    window.__boardExportSeq = (window.__boardExportSeq || 0) + 1;
    h = "h" + window.__boardExportSeq;
    el.setAttribute(SEL.handleAttr, h);
  }
  return h;
};
const byHandle = (h) =>
  document.querySelector("[" + SEL.handleAttr + '="' + CSS.escape(h) + '"]');
const box = (el) => {
  const r = el.getBoundingClientRect();
  const cs = getComputedStyle(el);
  return { width: r.width, height: r.height, display: cs.display, visibility: cs.visibility };
};
const byText = (el) => (el?.innerText ?? el?.textContent ?? "").trim();
const columns = () => Array.from(document.querySelectorAll(SEL.column));
const columnScroller = (col) => col.querySelector(":scope " + SEL.columnScroller) || col;
const feedScroller = (feed) => {
  for (let n = feed; n && n !== document.body; n = n.parentElement) {
    const cs = getComputedStyle(n);
    if (/(auto|scroll)/.test(cs.overflowY || "") || n.scrollHeight > n.clientHeight) return n;
  }
  return feed;
};
"#;

const COLUMNS: &str = r#"
return columns().map((c, index) => ({ index, element: box(c) }));
"#;

const COLUMN_HEADERS: &str = r#"
return Array.from(document.querySelectorAll(SEL.columnHeader)).map(byText);
"#;

const SCROLL_COLUMN: &str = r#"
const col = columns()[ARG];
if (col) {
  const s = columnScroller(col);
  s.scrollTop = s.scrollHeight;
}
return null;
"#;

const CARDS: &str = r#"
const col = columns()[ARG];
if (!col) return [];
return Array.from(columnScroller(col).querySelectorAll(":scope " + SEL.card)).map((card) => ({
  item_id: card.getAttribute(SEL.cardIdAttr),
  element: box(card),
  handle: tag(card.querySelector(SEL.cardClickTarget) || card),
}));
"#;

const ACTIVATE: &str = r#"
const el = byHandle(ARG);
if (!el || !el.isConnected) return "stale";
const r = el.getBoundingClientRect();
el.dispatchEvent(new MouseEvent("click", {
  bubbles: true,
  cancelable: true,
  clientX: r.left + r.width / 2,
  clientY: r.top + r.height / 2,
}));
return "dispatched";
"#;

const TITLE_SURFACE: &str = r#"
const el = document.querySelector(SEL.title);
if (!el) return null;
return "value" in el ? { kind: "control", value: el.value ?? "" } : { kind: "text", text: byText(el) };
"#;

const PERMALINK: &str = r#"
const link = document.querySelector(SEL.permalink);
return link?.getAttribute("href") || null;
"#;

const CLOSE_CONTROL: &str = r#"
const el = document.querySelector(SEL.close);
return el ? tag(el) : null;
"#;

const INVOKE: &str = r#"
const el = byHandle(ARG);
if (!el) return false;
el.click();
return true;
"#;

const FEED_PRESENT: &str = r#"
return !!document.querySelector(SEL.feed);
"#;

const SELECT_COMMENTS_TAB: &str = r#"
const feed = document.querySelector(SEL.feed);
const tab = feed?.querySelector(SEL.tablist)?.querySelector(SEL.commentsTab);
if (tab && tab.getAttribute("aria-selected") !== "true") {
  try { tab.click(); } catch (e) {}
}
return null;
"#;

const EXPAND_CANDIDATES: &str = r#"
const feed = document.querySelector(SEL.feed);
if (!feed) return [];
return Array.from(feed.querySelectorAll("button")).map((b) => ({
  label: b.innerText || b.textContent || "",
  aria_label: b.getAttribute("aria-label"),
  in_rich_text: !!b.closest(SEL.truncatedRegion),
  handle: tag(b),
}));
"#;

const SCROLL_FEED: &str = r#"
const feed = document.querySelector(SEL.feed);
if (feed) {
  const s = feedScroller(feed);
  s.scrollTop = s.scrollHeight;
}
return null;
"#;

const FEED_SNAPSHOT: &str = r#"
const feed = document.querySelector(SEL.feed);
const s = feed ? feedScroller(feed) : document.scrollingElement;
return {
  entry_count: document.querySelectorAll(SEL.story).length,
  scroll: { scroll_top: s.scrollTop, scroll_height: s.scrollHeight, client_height: s.clientHeight },
};
"#;

const STORIES: &str = r#"
return Array.from(document.querySelectorAll(SEL.story)).map((s) => {
  const bodyHost = s.querySelector(SEL.storyBody);
  const body = bodyHost ? bodyHost.querySelector(SEL.richText) || bodyHost : null;
  return {
    native_id: s.getAttribute(SEL.storyIdAttr),
    in_composer: !!s.closest(SEL.composer),
    body_html: body ? body.innerHTML : null,
    author: byText(s.querySelector(SEL.actor)) || null,
    datetime: s.querySelector(SEL.timestampTime)?.getAttribute("datetime") || null,
    timestamp_text: byText(s.querySelector(SEL.timestamp)) || null,
  };
});
"#;

/// Wrap a probe body into a self-contained expression.
///
/// `arg` is spliced in as a JSON literal bound to `ARG`.
pub fn build_probe(name: &str, body: &str, arg: impl Serialize) -> ExportResult<String> {
    let selectors = serde_json::to_string(&selector_table())?;
    let arg = serde_json::to_string(&arg)?;
    Ok(format!(
        "{PROBE_MARKER}{name}*/(() => {{\nconst SEL = {selectors};\nconst ARG = {arg};\n{PRELUDE}\nconst __result = (() => {{{body}}})();\nreturn JSON.stringify(__result === undefined ? null : __result);\n}})()"
    ))
}

/// A [`ViewLocator`] that observes the host board through a browser tab.
pub struct DomLocator {
    ctx: Box<dyn RenderContext>,
}

impl DomLocator {
    pub fn new(ctx: Box<dyn RenderContext>) -> Self {
        Self { ctx }
    }

    async fn probe<T: DeserializeOwned>(
        &self,
        name: &str,
        body: &str,
        arg: impl Serialize + Send,
    ) -> ExportResult<T> {
        let script = build_probe(name, body, arg)?;
        let value = self
            .ctx
            .execute_js(&script)
            .await
            .map_err(|e| ExportError::view(format!("probe {name} failed: {e:#}")))?;

        let text = value
            .as_str()
            .ok_or_else(|| ExportError::view(format!("probe {name} returned {value}")))?;
        serde_json::from_str(text)
            .map_err(|e| ExportError::view(format!("probe {name} returned malformed data: {e}")))
    }
}

#[async_trait]
impl ViewLocator for DomLocator {
    async fn columns(&self) -> ExportResult<Vec<ColumnProbe>> {
        self.probe("columns", COLUMNS, ()).await
    }

    async fn column_headers(&self) -> ExportResult<Vec<String>> {
        self.probe("column_headers", COLUMN_HEADERS, ()).await
    }

    async fn scroll_column_to_end(&self, column: usize) -> ExportResult<()> {
        self.probe("scroll_column", SCROLL_COLUMN, column).await
    }

    async fn cards(&self, column: usize) -> ExportResult<Vec<CardProbe>> {
        self.probe("cards", CARDS, column).await
    }

    async fn activate(&self, handle: &ActivationHandle) -> ExportResult<Activation> {
        self.probe("activate", ACTIVATE, handle).await
    }

    async fn find_title_surface(&self) -> ExportResult<Option<TitleSurface>> {
        self.probe("title_surface", TITLE_SURFACE, ()).await
    }

    async fn find_permalink(&self) -> ExportResult<Option<String>> {
        self.probe("permalink", PERMALINK, ()).await
    }

    async fn find_close_control(&self) -> ExportResult<Option<ControlHandle>> {
        self.probe("close_control", CLOSE_CONTROL, ()).await
    }

    async fn invoke(&self, control: &ControlHandle) -> ExportResult<()> {
        let clicked: bool = self.probe("invoke", INVOKE, control).await?;
        if clicked {
            Ok(())
        } else {
            Err(ExportError::StaleHandle(control.to_string()))
        }
    }

    async fn feed_present(&self) -> ExportResult<bool> {
        self.probe("feed_present", FEED_PRESENT, ()).await
    }

    async fn select_comments_tab(&self) -> ExportResult<()> {
        self.probe("select_comments_tab", SELECT_COMMENTS_TAB, ()).await
    }

    async fn expand_candidates(&self) -> ExportResult<Vec<ExpandCandidate>> {
        self.probe("expand_candidates", EXPAND_CANDIDATES, ()).await
    }

    async fn scroll_feed_to_end(&self) -> ExportResult<()> {
        self.probe("scroll_feed", SCROLL_FEED, ()).await
    }

    async fn feed_snapshot(&self) -> ExportResult<FeedSnapshot> {
        self.probe("feed_snapshot", FEED_SNAPSHOT, ()).await
    }

    async fn stories(&self) -> ExportResult<Vec<StoryProbe>> {
        self.probe("stories", STORIES, ()).await
    }

    async fn source_url(&self) -> ExportResult<String> {
        self.ctx
            .get_url()
            .await
            .map_err(|e| ExportError::view(format!("failed to read tab URL: {e:#}")))
    }
}
