/// Terminal-side runtime state. Stream state lives with the controller.
#[derive(Debug, Clone)]
pub struct State {
    pub input: String,
    /// Cursor position in input (byte index)
    pub input_cursor: usize,
    /// Lines scrolled from the top of the writing panel
    pub scroll_offset: u16,
    pub user_scrolled: bool,
    /// Maximum scroll offset (set by UI based on content height)
    pub max_scroll: u16,
    /// Something changed since the last frame
    pub dirty: bool,
    pub spinner_frame: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            input: String::new(),
            input_cursor: 0,
            scroll_offset: 0,
            user_scrolled: false,
            max_scroll: 0,
            dirty: true,
            spinner_frame: 0,
        }
    }
}

impl State {
    /// Drop any manual scroll so the answer follows its tail again.
    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.user_scrolled = false;
        self.max_scroll = 0;
    }
}
