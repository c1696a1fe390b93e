use crossterm::event::{KeyEvent, MouseEvent};

pub type IdType = u32;

#[derive(Debug, Clone)]
pub enum Action {
    Error(String),
    Quit,
    Tick(usize),
    Render,
    Card((IdType, CardAction)),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    Delete,
    Open,
    Commit,
    Cancel,
    /// Resolution of the update request with the given generation.
    Resolved(u64, Result<(), String>),
    CooldownElapsed,
}

#[derive(Debug, Clone)]
pub enum Event {
    Tick(usize),
    Render,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Error(String),
}
