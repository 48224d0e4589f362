use crate::state::State;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InputChar(char),
    /// Pasted text, already flattened to one line
    InsertText(String),
    InputBackspace,
    InputDelete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    Submit,
    NewSession,
    StopStreaming,
    ScrollUp(u16),
    ScrollDown(u16),
    None,
}

/// What the caller must do after an action touched local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Nothing,
    Submit(String),
    NewSession,
    Stop,
}

pub fn apply_action(state: &mut State, action: Action) -> ActionResult {
    match action {
        Action::InputChar(c) => {
            state.input.insert(state.input_cursor, c);
            state.input_cursor += c.len_utf8();
            ActionResult::Nothing
        }
        Action::InsertText(text) => {
            state.input.insert_str(state.input_cursor, &text);
            state.input_cursor += text.len();
            ActionResult::Nothing
        }
        Action::InputBackspace => {
            if let Some(c) = state.input[..state.input_cursor].chars().next_back() {
                state.input_cursor -= c.len_utf8();
                state.input.remove(state.input_cursor);
            }
            ActionResult::Nothing
        }
        Action::InputDelete => {
            if state.input_cursor < state.input.len() {
                state.input.remove(state.input_cursor);
            }
            ActionResult::Nothing
        }
        Action::CursorLeft => {
            if let Some(c) = state.input[..state.input_cursor].chars().next_back() {
                state.input_cursor -= c.len_utf8();
            }
            ActionResult::Nothing
        }
        Action::CursorRight => {
            if let Some(c) = state.input[state.input_cursor..].chars().next() {
                state.input_cursor += c.len_utf8();
            }
            ActionResult::Nothing
        }
        Action::CursorHome => {
            state.input_cursor = 0;
            ActionResult::Nothing
        }
        Action::CursorEnd => {
            state.input_cursor = state.input.len();
            ActionResult::Nothing
        }
        Action::Submit => {
            // Blank input stays where it is
            if state.input.trim().is_empty() {
                return ActionResult::Nothing;
            }
            let query = std::mem::take(&mut state.input);
            state.input_cursor = 0;
            state.reset_scroll();
            ActionResult::Submit(query)
        }
        Action::NewSession => {
            state.reset_scroll();
            ActionResult::NewSession
        }
        Action::StopStreaming => ActionResult::Stop,
        Action::ScrollUp(amount) => {
            state.scroll_offset = state.scroll_offset.saturating_sub(amount);
            state.user_scrolled = true;
            ActionResult::Nothing
        }
        Action::ScrollDown(amount) => {
            state.scroll_offset = state.scroll_offset.saturating_add(amount).min(state.max_scroll);
            // Back at the bottom: resume following new content
            if state.scroll_offset >= state.max_scroll {
                state.user_scrolled = false;
            }
            ActionResult::Nothing
        }
        Action::None => ActionResult::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> State {
        let mut state = State::default();
        for c in text.chars() {
            apply_action(&mut state, Action::InputChar(c));
        }
        state
    }

    #[test]
    fn editing_respects_char_boundaries() {
        let mut state = typed("héllo");
        apply_action(&mut state, Action::CursorLeft);
        apply_action(&mut state, Action::CursorLeft);
        apply_action(&mut state, Action::CursorLeft);
        apply_action(&mut state, Action::InputBackspace);
        assert_eq!(state.input, "hllo");
        assert_eq!(state.input_cursor, 1);

        apply_action(&mut state, Action::InputDelete);
        assert_eq!(state.input, "hlo");
        apply_action(&mut state, Action::CursorEnd);
        apply_action(&mut state, Action::InsertText(" world".into()));
        assert_eq!(state.input, "hlo world");
        apply_action(&mut state, Action::CursorHome);
        apply_action(&mut state, Action::InputBackspace);
        assert_eq!(state.input, "hlo world");
    }

    #[test]
    fn submit_takes_input() {
        let mut state = typed("what is rust");
        state.user_scrolled = true;
        assert_eq!(apply_action(&mut state, Action::Submit), ActionResult::Submit("what is rust".into()));
        assert!(state.input.is_empty());
        assert_eq!(state.input_cursor, 0);
        assert!(!state.user_scrolled);
    }

    #[test]
    fn blank_submit_keeps_input() {
        let mut state = typed("   ");
        assert_eq!(apply_action(&mut state, Action::Submit), ActionResult::Nothing);
        assert_eq!(state.input, "   ");
    }

    #[test]
    fn scrolling_down_to_bottom_resumes_follow() {
        let mut state = State { max_scroll: 20, scroll_offset: 20, ..Default::default() };
        apply_action(&mut state, Action::ScrollUp(10));
        assert_eq!(state.scroll_offset, 10);
        assert!(state.user_scrolled);

        apply_action(&mut state, Action::ScrollDown(5));
        assert!(state.user_scrolled);
        apply_action(&mut state, Action::ScrollDown(50));
        assert_eq!(state.scroll_offset, 20);
        assert!(!state.user_scrolled);
    }
}
