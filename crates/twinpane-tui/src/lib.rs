//! Terminal user interface for twinpane.
//!
//! A dual-pane file manager built with ratatui on top of the
//! `twinpane-core` interaction state and the `twinpane-ops` collaborators.
//!
//! # Usage
//!
//! ```rust,no_run
//! use twinpane_tui::{run, Settings};
//!
//! // Open the left pane at /srv
//! run(Settings::load(), Some("/srv".to_string())).unwrap();
//! ```
//!
//! # Keyboard Navigation
//!
//! - `↑`/`↓` - Move focus, `Shift` extends the selection
//! - `→`/`←` - Enter directory / go to parent
//! - `Tab` - Switch pane
//! - `Space` - Select or preview, `Ctrl-Space` switches between the two
//! - `Shift-V`/`Shift-B` - Copy/move to the other pane
//! - `F2` - Menu, `F1` - Help, `Ctrl-q` - Quit

pub mod app;
mod event;
mod theme;
pub mod ui;

pub use app::{App, AppResult, Settings, Workbench};
pub use event::{actions_for, KeyAction};
pub use theme::{Theme, ThemeVariant};

/// Run the TUI application.
///
/// `initial` is a logical path for the left pane; when `None` both panes
/// reopen where they were left.
pub fn run(settings: Settings, initial: Option<String>) -> AppResult<()> {
    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let terminal = ratatui::init();
    let result = rt.block_on(async {
        let app = App::new(&settings, initial)?;
        app.run(terminal).await
    });
    ratatui::restore();

    // Shutdown runtime immediately to cancel background tasks
    rt.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}
