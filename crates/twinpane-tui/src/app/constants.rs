//! Application constants.

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 50;

/// Channel buffer size for collaborator completions.
pub const COMPLETION_CHANNEL_SIZE: usize = 100;

/// Terminal output kept in the overlay, in bytes.
pub const TERMINAL_SCROLLBACK: usize = 256 * 1024;

/// Default name offered by the "new" prompt.
pub const NEW_ITEM_DEFAULT_NAME: &str = "new-folder";

/// Pixels per terminal cell, horizontally.
///
/// Mouse positions arrive in cells; the drag threshold and column minimum
/// are configured in pixels.
pub const CELL_WIDTH_PX: f64 = 8.0;

/// Pixels per terminal cell, vertically.
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Two clicks on the same row or tab within this window form a double-click.
pub const DOUBLE_CLICK_MS: u64 = 400;
