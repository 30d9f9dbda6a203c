//! Board Export CLI: drives a Chromium tab showing a kanban board and
//! writes the column-grouped export with every task's comments.

pub mod config;
pub mod locator;
pub mod markup;
pub mod output;
pub mod prompt;
pub mod renderer;
pub mod session;

pub use config::{load_config, resolve_config_path, resolve_output_path};
pub use locator::DomLocator;
pub use output::write_document;
pub use prompt::PromptGate;
pub use renderer::chromium::{ChromiumRenderer, LaunchOptions};
pub use renderer::{RenderContext, Renderer};
pub use session::export_board;
