//! Component trait: the interface every UI panel implements.
//!
//! - Components own their cursor state and render themselves.
//! - They read controller state through `AppState` and never mutate it.
//! - Key handling returns `Vec<Action>` for the App to dispatch.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::app_state::AppState;

pub trait Component {
    /// Only called when this component has focus.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// Mouse events are routed to the focused component.
    fn handle_mouse(&mut self, _event: MouseEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
