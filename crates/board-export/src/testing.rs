//! In-memory board for exercising the engine without a browser.
//!
//! [`FakeBoard`] implements [`ViewLocator`] with the behaviors that make the
//! real host awkward: columns that only materialize cards as they scroll,
//! panes that settle late or never, cards whose handles go stale, feeds that
//! page in over several scrolls, and comments truncated behind "Show more".

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{ExportError, ExportResult};
use crate::locator::ViewLocator;
use crate::types::{
    Activation, ActivationHandle, CardProbe, ColumnProbe, ControlHandle, ElementBox,
    ExpandCandidate, FeedSnapshot, ScrollMetrics, StoryProbe, TitleSurface,
};

const SOURCE_URL: &str = "https://app.example.com/0/1200/board";
const CLOSE_CONTROL: &str = "close";
const FEED_CLIENT_HEIGHT: f64 = 400.0;
const STORY_HEIGHT: f64 = 100.0;

/// A task's activity feed.
#[derive(Debug, Clone)]
pub struct FakeFeed {
    present: bool,
    bodies: Vec<String>,
    schedule: Vec<usize>,
    truncated: HashMap<usize, String>,
}

impl FakeFeed {
    /// `n` distinct comments, all rendered from the start.
    pub fn with_comments(n: usize) -> Self {
        Self {
            present: true,
            bodies: (1..=n).map(|i| format!("<p>Comment {i}</p>")).collect(),
            schedule: Vec::new(),
            truncated: HashMap::new(),
        }
    }

    /// A detail view without any feed.
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::with_comments(0)
        }
    }

    /// Number of comments rendered after each scroll; the last value holds
    /// for every later scroll.
    pub fn revealed_by_scroll(mut self, schedule: &[usize]) -> Self {
        self.schedule = schedule.to_vec();
        self
    }

    /// Render comment `index` as a preview until its expand control is
    /// clicked, then as `full_html`.
    pub fn truncated(mut self, index: usize, full_html: &str) -> Self {
        self.truncated.insert(index, full_html.to_string());
        self
    }

    fn rendered(&self, scrolls: usize) -> usize {
        let count = match self.schedule.as_slice() {
            [] => self.bodies.len(),
            schedule => schedule[scrolls.clamp(1, schedule.len()) - 1],
        };
        count.min(self.bodies.len())
    }
}

#[derive(Debug, Clone, Copy)]
enum Settle {
    AfterPolls(usize),
    Never,
}

/// One card and the detail view behind it.
#[derive(Debug, Clone)]
pub struct FakeTask {
    id: String,
    title: Option<String>,
    permalink: Option<String>,
    feed: FakeFeed,
    stale: bool,
    settle: Settle,
    close_control: bool,
    unreadable_comments: bool,
}

impl FakeTask {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            permalink: None,
            feed: FakeFeed::with_comments(2),
            stale: false,
            settle: Settle::AfterPolls(0),
            close_control: true,
            unreadable_comments: false,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn permalink(mut self, href: &str) -> Self {
        self.permalink = Some(href.to_string());
        self
    }

    pub fn feed(mut self, feed: FakeFeed) -> Self {
        self.feed = feed;
        self
    }

    /// The card re-rendered after enumeration; its handle is detached.
    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    pub fn never_settles(mut self) -> Self {
        self.settle = Settle::Never;
        self
    }

    pub fn settles_after_polls(mut self, polls: usize) -> Self {
        self.settle = Settle::AfterPolls(polls);
        self
    }

    pub fn without_close_control(mut self) -> Self {
        self.close_control = false;
        self
    }

    /// Reading the comments fails with an I/O error rather than a view one.
    pub fn unreadable_comments(mut self) -> Self {
        self.unreadable_comments = true;
        self
    }
}

/// A board column.
#[derive(Debug, Clone)]
pub struct FakeColumn {
    name: Option<String>,
    tasks: Vec<FakeTask>,
    hidden: bool,
    hidden_cards: HashSet<String>,
    virtualized: Option<(usize, usize)>,
}

impl FakeColumn {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::unnamed()
        }
    }

    pub fn unnamed() -> Self {
        Self {
            name: None,
            tasks: Vec::new(),
            hidden: false,
            hidden_cards: HashSet::new(),
            virtualized: None,
        }
    }

    /// Add default tasks; an empty id renders a card without one.
    pub fn cards(mut self, ids: &[&str]) -> Self {
        self.tasks.extend(ids.iter().map(|id| FakeTask::new(id)));
        self
    }

    pub fn task(mut self, task: FakeTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Render the card with zero area (a virtualization placeholder).
    pub fn hidden_card(mut self, id: &str) -> Self {
        self.hidden_cards.insert(id.to_string());
        self
    }

    /// Only `initial` cards exist until the column is scrolled; each scroll
    /// materializes `per_scroll` more.
    pub fn virtualized(mut self, initial: usize, per_scroll: usize) -> Self {
        self.virtualized = Some((initial, per_scroll));
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeBoardBuilder {
    columns: Vec<FakeColumn>,
}

impl FakeBoardBuilder {
    pub fn column(mut self, column: FakeColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> FakeBoard {
        let mut tasks = HashMap::new();
        for task in self.columns.iter().flat_map(|c| &c.tasks) {
            tasks.entry(task.id.clone()).or_insert_with(|| task.clone());
        }
        let revealed = self
            .columns
            .iter()
            .map(|c| c.virtualized.map_or(usize::MAX, |(initial, _)| initial))
            .collect();

        FakeBoard {
            state: Mutex::new(BoardState {
                columns: self.columns,
                revealed,
                tasks,
                pane: None,
                activations: 0,
                close_attempts: 0,
                feed_scrolls: 0,
                tab_selections: 0,
                decoy_clicks: 0,
            }),
        }
    }
}

#[derive(Debug)]
struct OpenPane {
    task_id: String,
    polls: usize,
    scrolls: usize,
    expanded: HashSet<usize>,
}

#[derive(Debug)]
struct BoardState {
    columns: Vec<FakeColumn>,
    revealed: Vec<usize>,
    tasks: HashMap<String, FakeTask>,
    pane: Option<OpenPane>,
    activations: usize,
    close_attempts: usize,
    feed_scrolls: usize,
    tab_selections: usize,
    decoy_clicks: usize,
}

impl BoardState {
    fn open_task(&self) -> Option<(&OpenPane, &FakeTask)> {
        let pane = self.pane.as_ref()?;
        let task = self.tasks.get(&pane.task_id)?;
        Some((pane, task))
    }
}

/// In-memory [`ViewLocator`].
#[derive(Debug)]
pub struct FakeBoard {
    state: Mutex<BoardState>,
}

impl FakeBoard {
    pub fn builder() -> FakeBoardBuilder {
        FakeBoardBuilder::default()
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of card clicks dispatched (including stale ones).
    pub fn activations(&self) -> usize {
        self.state().activations
    }

    /// Number of close-control lookups.
    pub fn close_attempts(&self) -> usize {
        self.state().close_attempts
    }

    pub fn pane_open(&self) -> bool {
        self.state().pane.is_some()
    }

    pub fn feed_scrolls(&self) -> usize {
        self.state().feed_scrolls
    }

    pub fn comments_tab_selections(&self) -> usize {
        self.state().tab_selections
    }

    /// Clicks on feed buttons that are not expand controls.
    pub fn decoy_clicks(&self) -> usize {
        self.state().decoy_clicks
    }
}

#[async_trait]
impl ViewLocator for FakeBoard {
    async fn columns(&self) -> ExportResult<Vec<ColumnProbe>> {
        Ok(self
            .state()
            .columns
            .iter()
            .enumerate()
            .map(|(index, c)| ColumnProbe {
                index,
                element: if c.hidden {
                    ElementBox {
                        display: "none".to_string(),
                        ..ElementBox::sized(0.0, 0.0)
                    }
                } else {
                    ElementBox::sized(280.0, 640.0)
                },
            })
            .collect())
    }

    async fn column_headers(&self) -> ExportResult<Vec<String>> {
        Ok(self
            .state()
            .columns
            .iter()
            .filter(|c| !c.hidden)
            .filter_map(|c| c.name.clone())
            .collect())
    }

    async fn scroll_column_to_end(&self, column: usize) -> ExportResult<()> {
        let mut state = self.state();
        let per_scroll = state
            .columns
            .get(column)
            .ok_or_else(|| ExportError::view(format!("no column {column}")))?
            .virtualized
            .map_or(0, |(_, per_scroll)| per_scroll);
        state.revealed[column] = state.revealed[column].saturating_add(per_scroll);
        Ok(())
    }

    async fn cards(&self, column: usize) -> ExportResult<Vec<CardProbe>> {
        let state = self.state();
        let col = state
            .columns
            .get(column)
            .ok_or_else(|| ExportError::view(format!("no column {column}")))?;
        Ok(col
            .tasks
            .iter()
            .take(state.revealed[column])
            .map(|t| CardProbe {
                item_id: (!t.id.is_empty()).then(|| t.id.clone()),
                element: if col.hidden_cards.contains(&t.id) {
                    ElementBox::sized(0.0, 0.0)
                } else {
                    ElementBox::sized(260.0, 72.0)
                },
                handle: ActivationHandle(format!("card:{}", t.id)),
            })
            .collect())
    }

    async fn activate(&self, handle: &ActivationHandle) -> ExportResult<Activation> {
        let mut state = self.state();
        state.activations += 1;
        let id = handle.0.strip_prefix("card:").unwrap_or(&handle.0).to_string();
        match state.tasks.get(&id) {
            Some(task) if !task.stale => {
                state.pane = Some(OpenPane {
                    task_id: id,
                    polls: 0,
                    scrolls: 0,
                    expanded: HashSet::new(),
                });
                Ok(Activation::Dispatched)
            }
            _ => Ok(Activation::Stale),
        }
    }

    async fn find_title_surface(&self) -> ExportResult<Option<TitleSurface>> {
        let mut state = self.state();
        let Some(pane) = state.pane.as_mut() else {
            return Ok(None);
        };
        pane.polls += 1;
        let polls = pane.polls;
        let Some((_, task)) = state.open_task() else {
            return Ok(None);
        };
        let settled = match task.settle {
            Settle::AfterPolls(n) => polls > n,
            Settle::Never => false,
        };
        Ok(settled.then(|| TitleSurface::Control {
            value: task
                .title
                .clone()
                .unwrap_or_else(|| format!("Task {}", task.id)),
        }))
    }

    async fn find_permalink(&self) -> ExportResult<Option<String>> {
        Ok(self
            .state()
            .open_task()
            .and_then(|(_, task)| task.permalink.clone()))
    }

    async fn find_close_control(&self) -> ExportResult<Option<ControlHandle>> {
        let mut state = self.state();
        state.close_attempts += 1;
        let has_control = state
            .open_task()
            .map(|(_, task)| task.close_control)
            .unwrap_or(false);
        Ok(has_control.then(|| ControlHandle(CLOSE_CONTROL.to_string())))
    }

    async fn invoke(&self, control: &ControlHandle) -> ExportResult<()> {
        let mut state = self.state();
        if control.0 == CLOSE_CONTROL {
            state.pane = None;
            return Ok(());
        }
        if let Some(index) = control.0.strip_prefix("expand:") {
            let index: usize = index
                .parse()
                .map_err(|_| ExportError::view(format!("bad control {control}")))?;
            if let Some(pane) = state.pane.as_mut() {
                pane.expanded.insert(index);
            }
            return Ok(());
        }
        if control.0.starts_with("like:") {
            state.decoy_clicks += 1;
            return Ok(());
        }
        Err(ExportError::view(format!("unknown control {control}")))
    }

    async fn feed_present(&self) -> ExportResult<bool> {
        Ok(self
            .state()
            .open_task()
            .is_some_and(|(_, task)| task.feed.present))
    }

    async fn select_comments_tab(&self) -> ExportResult<()> {
        self.state().tab_selections += 1;
        Ok(())
    }

    async fn expand_candidates(&self) -> ExportResult<Vec<ExpandCandidate>> {
        let state = self.state();
        let Some((pane, task)) = state.open_task() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for i in 0..task.feed.rendered(pane.scrolls) {
            if task.feed.truncated.contains_key(&i) && !pane.expanded.contains(&i) {
                out.push(ExpandCandidate {
                    label: "Show more".to_string(),
                    aria_label: None,
                    in_rich_text: true,
                    handle: ControlHandle(format!("expand:{i}")),
                });
            }
            out.push(ExpandCandidate {
                label: "Show more".to_string(),
                aria_label: Some("More options".to_string()),
                in_rich_text: true,
                handle: ControlHandle(format!("like:{i}")),
            });
        }
        Ok(out)
    }

    async fn scroll_feed_to_end(&self) -> ExportResult<()> {
        let mut state = self.state();
        state.feed_scrolls += 1;
        if let Some(pane) = state.pane.as_mut() {
            pane.scrolls += 1;
        }
        Ok(())
    }

    async fn feed_snapshot(&self) -> ExportResult<FeedSnapshot> {
        let state = self.state();
        let Some((pane, task)) = state.open_task() else {
            return Ok(FeedSnapshot::default());
        };
        let count = task.feed.rendered(pane.scrolls);
        let grew = pane.scrolls > 1 && count > task.feed.rendered(pane.scrolls - 1);

        let scroll_height = FEED_CLIENT_HEIGHT + count as f64 * STORY_HEIGHT;
        let max_top = scroll_height - FEED_CLIENT_HEIGHT;
        Ok(FeedSnapshot {
            entry_count: count,
            scroll: ScrollMetrics {
                // Freshly loaded content pushes the bottom out of view.
                scroll_top: if grew { max_top - STORY_HEIGHT } else { max_top },
                scroll_height,
                client_height: FEED_CLIENT_HEIGHT,
            },
        })
    }

    async fn stories(&self) -> ExportResult<Vec<StoryProbe>> {
        let state = self.state();
        let Some((pane, task)) = state.open_task() else {
            return Ok(Vec::new());
        };
        if task.unreadable_comments {
            return Err(ExportError::Io(std::io::Error::other(
                "comment markup unreadable",
            )));
        }
        let mut stories: Vec<StoryProbe> = task
            .feed
            .bodies
            .iter()
            .take(task.feed.rendered(pane.scrolls))
            .enumerate()
            .map(|(i, body)| {
                let body_html = match task.feed.truncated.get(&i) {
                    Some(full) if pane.expanded.contains(&i) => full.clone(),
                    _ => body.clone(),
                };
                StoryProbe {
                    native_id: None,
                    in_composer: false,
                    body_html: Some(body_html),
                    author: Some(format!("Author {}", i % 2 + 1)),
                    datetime: Some(format!("2024-01-{:02}T10:00:00Z", i % 28 + 1)),
                    timestamp_text: None,
                }
            })
            .collect();

        stories.push(StoryProbe {
            in_composer: true,
            body_html: Some("<p>Add a comment</p>".to_string()),
            ..StoryProbe::default()
        });
        Ok(stories)
    }

    async fn source_url(&self) -> ExportResult<String> {
        Ok(SOURCE_URL.to_string())
    }
}
