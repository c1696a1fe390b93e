use crate::backend::config::Config as PersistenceConfig;
use crate::backend::types::Session;
use crate::types::{Action as AppAction, CardAction as AppCardAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub keybindings: Keybindings,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub dev: bool,
}

impl Config {
    pub fn set_default_keybindings(&mut self) {
        for (key, action) in [(Key::ctrl('c'), GlobalAction::Quit)] {
            if !self.keybindings.global.values().any(|a| a == &action) {
                self.keybindings.global.entry(key).or_insert(action);
            }
        }
        for (key, action) in [
            (Key::char('e'), CardAction::Edit),
            (Key::char('d'), CardAction::Delete),
            (Key::char('o'), CardAction::Open),
        ] {
            if !self.keybindings.card.values().any(|a| a == &action) {
                self.keybindings.card.entry(key).or_insert(action);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Keybindings {
    #[serde(default)]
    pub global: HashMap<Key, GlobalAction>,
    #[serde(default)]
    pub card: HashMap<Key, CardAction>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Key(KeyCode, Option<KeyModifiers>);

impl Key {
    pub fn new(code: KeyCode, modifiers: Option<KeyModifiers>) -> Self {
        Self(code, modifiers)
    }
    pub fn char(c: char) -> Self {
        Self(KeyCode::Char(c), None)
    }
    pub fn ctrl(c: char) -> Self {
        Self(KeyCode::Char(c), Some(KeyModifiers::CONTROL))
    }
    pub fn code(&self) -> KeyCode {
        self.0
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self(code, None)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Self(
            event.code,
            match event.modifiers {
                KeyModifiers::CONTROL | KeyModifiers::SHIFT => Some(event.modifiers),
                _ => None,
            },
        )
    }
}

const NAMED_KEYS: [(&str, KeyCode); 8] = [
    ("Enter", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("Backspace", KeyCode::Backspace),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
];

fn parse_code(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    NAMED_KEYS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, code)| *code)
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((modifier, code)) if !modifier.is_empty() && !code.is_empty() => {
                let modifier = match modifier {
                    "Ctrl" => KeyModifiers::CONTROL,
                    "Shift" => KeyModifiers::SHIFT,
                    _ => return Err(format!("invalid key modifier: {modifier}")),
                };
                parse_code(code)
                    .map(|code| Self(code, Some(modifier)))
                    .ok_or_else(|| format!("invalid key: {s}"))
            }
            _ => parse_code(s)
                .map(|code| Self(code, None))
                .ok_or_else(|| format!("invalid key: {s}")),
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(KeyModifiers::CONTROL) => write!(f, "Ctrl-")?,
            Some(KeyModifiers::SHIFT) => write!(f, "Shift-")?,
            Some(modifiers) => write!(f, "{modifiers:?}-")?,
            None => {}
        }
        match self.0 {
            KeyCode::Char(c) => write!(f, "{c}"),
            code => match NAMED_KEYS.iter().find(|(_, c)| *c == code) {
                Some((name, _)) => write!(f, "{name}"),
                None => write!(f, "{code:?}"),
            },
        }
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = self.to_string();
        if s.parse::<Self>().as_ref() != Ok(self) {
            return Err(serde::ser::Error::custom(format!("invalid key: {s}")));
        }
        s.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
}

impl From<&GlobalAction> for AppAction {
    fn from(action: &GlobalAction) -> Self {
        match action {
            GlobalAction::Quit => AppAction::Quit,
        }
    }
}

/// Card actions that can be bound to keys. Commit and cancel are bound by the
/// card itself for as long as it is mounted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    Delete,
    Open,
}

impl From<&CardAction> for AppCardAction {
    fn from(action: &CardAction) -> Self {
        match action {
            CardAction::Edit => AppCardAction::Edit,
            CardAction::Delete => AppCardAction::Delete,
            CardAction::Open => AppCardAction::Open,
        }
    }
}
