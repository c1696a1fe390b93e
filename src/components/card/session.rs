//! Local edit state of a post card.

use std::time::Duration;

/// How long input stays disabled after a failed commit.
pub const COMMIT_COOLDOWN: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Flight {
    #[default]
    Idle,
    Committing,
    CoolingDown,
}

/// Why a commit did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitRejected {
    NotEditing,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    /// Matches the result back to this request in [`EditSession::resolve`].
    pub generation: u64,
    pub description: String,
}

/// Result of resolving an outstanding commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The submitted text is now the committed description.
    Committed(String),
    /// The working text was reset to `restored`; input stays disabled for `cooldown`.
    Reverted { restored: String, cooldown: Duration },
}

#[derive(Debug, Clone)]
pub struct EditSession {
    committed: String,
    working: String,
    mode: Mode,
    flight: Flight,
    generation: u64,
}

impl EditSession {
    pub fn new(description: impl Into<String>) -> Self {
        let committed = description.into();
        Self {
            working: committed.clone(),
            committed,
            mode: Mode::Viewing,
            flight: Flight::Idle,
            generation: 0,
        }
    }
    /// Starts over from `description`. Results of requests issued before the
    /// restart no longer match any request and are ignored.
    pub fn restart(&mut self, description: impl Into<String>) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::new(description)
        };
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Editing
    }
    pub fn in_flight(&self) -> bool {
        self.flight != Flight::Idle
    }
    pub fn is_cooling_down(&self) -> bool {
        self.flight == Flight::CoolingDown
    }
    pub fn committed(&self) -> &str {
        &self.committed
    }
    /// The edit buffer, only available while editing.
    pub fn working(&self) -> Option<&str> {
        self.is_editing().then_some(self.working.as_str())
    }
    /// The text the card shows: the buffer while editing, the committed description otherwise.
    pub fn displayed(&self) -> &str {
        match self.mode {
            Mode::Viewing => &self.committed,
            Mode::Editing => &self.working,
        }
    }
    /// Flips between viewing and editing. Leaving edit mode this way discards
    /// the buffer. Returns whether the mode changed.
    pub fn toggle_edit(&mut self) -> bool {
        if self.in_flight() {
            return false;
        }
        match self.mode {
            Mode::Viewing => {
                self.working.clone_from(&self.committed);
                self.mode = Mode::Editing;
            }
            Mode::Editing => self.reset(),
        }
        true
    }
    /// Replaces the buffer. Ignored unless editing with no request outstanding.
    pub fn set_working(&mut self, text: impl Into<String>) -> bool {
        if !self.is_editing() || self.in_flight() {
            return false;
        }
        self.working = text.into();
        true
    }
    /// Leaves edit mode discarding the buffer. Returns whether the mode changed.
    pub fn cancel(&mut self) -> bool {
        if !self.is_editing() || self.in_flight() {
            return false;
        }
        self.reset();
        true
    }
    pub fn begin_commit(&mut self) -> Result<CommitRequest, CommitRejected> {
        if self.in_flight() {
            return Err(CommitRejected::InFlight);
        }
        if !self.is_editing() {
            return Err(CommitRejected::NotEditing);
        }
        self.flight = Flight::Committing;
        self.generation += 1;
        Ok(CommitRequest {
            generation: self.generation,
            description: self.working.clone(),
        })
    }
    /// Applies the result of the request started by [`Self::begin_commit`].
    /// Returns `None` if no request is outstanding or `generation` belongs to
    /// another request.
    pub fn resolve<E>(&mut self, generation: u64, result: Result<(), E>) -> Option<Outcome> {
        if self.flight != Flight::Committing || generation != self.generation {
            return None;
        }
        Some(match result {
            Ok(()) => {
                self.committed.clone_from(&self.working);
                self.mode = Mode::Viewing;
                self.flight = Flight::Idle;
                Outcome::Committed(self.committed.clone())
            }
            Err(_) => {
                self.working.clone_from(&self.committed);
                self.flight = Flight::CoolingDown;
                Outcome::Reverted {
                    restored: self.committed.clone(),
                    cooldown: COMMIT_COOLDOWN,
                }
            }
        })
    }
    /// Re-enables input after a failed commit. Returns whether anything changed.
    pub fn finish_cooldown(&mut self) -> bool {
        if self.flight != Flight::CoolingDown {
            return false;
        }
        self.flight = Flight::Idle;
        true
    }
    fn reset(&mut self) {
        self.working.clone_from(&self.committed);
        self.mode = Mode::Viewing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing(description: &str, text: &str) -> EditSession {
        let mut session = EditSession::new(description);
        assert!(session.toggle_edit());
        assert!(session.set_working(text));
        session
    }

    #[test]
    fn starts_viewing() {
        let session = EditSession::new("Hello");
        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.displayed(), "Hello");
        assert_eq!(session.working(), None);
        assert!(!session.in_flight());
    }

    #[test]
    fn toggle_starts_from_committed_text() {
        let mut session = editing("Hello", "draft");
        assert!(session.toggle_edit());
        assert_eq!(session.mode(), Mode::Viewing);
        assert!(session.toggle_edit());
        assert_eq!(session.working(), Some("Hello"));
    }

    #[test]
    fn buffer_is_read_only_while_viewing() {
        let mut session = EditSession::new("Hello");
        assert!(!session.set_working("Hi"));
        assert_eq!(session.displayed(), "Hello");
    }

    #[test]
    fn cancel_resets_buffer() {
        let mut session = editing("Hello", "Hi");
        assert!(session.set_working("Hi there"));
        assert!(session.cancel());
        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.displayed(), "Hello");
        assert!(session.toggle_edit());
        assert_eq!(session.working(), Some("Hello"));
    }

    #[test]
    fn cancel_while_viewing_is_noop() {
        let mut session = EditSession::new("Hello");
        assert!(!session.cancel());
        assert_eq!(session.mode(), Mode::Viewing);
    }

    #[test]
    fn commit_requires_editing() {
        let mut session = EditSession::new("Hello");
        assert_eq!(session.begin_commit(), Err(CommitRejected::NotEditing));
        assert!(!session.in_flight());
    }

    #[test]
    fn commit_success() {
        let mut session = editing("Hello", "Hi");
        assert_eq!(
            session.begin_commit(),
            Ok(CommitRequest {
                generation: 1,
                description: String::from("Hi")
            })
        );
        assert!(session.in_flight());
        assert_eq!(
            session.resolve::<()>(1, Ok(())),
            Some(Outcome::Committed(String::from("Hi")))
        );
        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.committed(), "Hi");
        assert_eq!(session.displayed(), "Hi");
        assert!(!session.in_flight());
    }

    #[test]
    fn commit_failure_reverts_and_cools_down() {
        let mut session = editing("Hello", "Hi");
        let request = session.begin_commit().expect("failed to commit");
        assert_eq!(
            session.resolve(request.generation, Err("offline")),
            Some(Outcome::Reverted {
                restored: String::from("Hello"),
                cooldown: Duration::from_millis(3000),
            })
        );
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.working(), Some("Hello"));
        assert!(session.in_flight());
        assert!(session.is_cooling_down());
        assert!(!session.set_working("again"));
        assert!(session.finish_cooldown());
        assert!(!session.in_flight());
        assert_eq!(session.mode(), Mode::Editing);
        assert!(session.set_working("again"));
    }

    #[test]
    fn nothing_moves_while_in_flight() {
        let mut session = editing("Hello", "Hi");
        assert!(session.begin_commit().is_ok());
        let before = session.clone();
        assert_eq!(session.begin_commit(), Err(CommitRejected::InFlight));
        assert!(!session.cancel());
        assert!(!session.toggle_edit());
        assert!(!session.set_working("other"));
        assert!(!session.finish_cooldown());
        assert_eq!(session.mode(), before.mode());
        assert_eq!(session.working(), before.working());
        assert_eq!(session.committed(), before.committed());
    }

    #[test]
    fn resolve_without_request() {
        let mut session = editing("Hello", "Hi");
        assert_eq!(session.resolve::<()>(0, Ok(())), None);
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.working(), Some("Hi"));
    }

    #[test]
    fn commit_rejected_during_cooldown() {
        let mut session = editing("Hello", "Hi");
        let request = session.begin_commit().expect("failed to commit");
        assert!(session.resolve(request.generation, Err(())).is_some());
        assert_eq!(session.begin_commit(), Err(CommitRejected::InFlight));
        assert_eq!(session.resolve::<()>(request.generation, Ok(())), None);
    }

    #[test]
    fn stale_result_after_restart_is_ignored() {
        let mut session = editing("Hello", "Hi");
        let stale = session.begin_commit().expect("failed to commit");
        session.restart("Hello");
        assert!(!session.in_flight());
        assert!(session.toggle_edit());
        assert!(session.set_working("Hello!"));
        let current = session.begin_commit().expect("failed to commit");
        assert_ne!(stale.generation, current.generation);

        assert_eq!(session.resolve(stale.generation, Err(())), None);
        assert!(session.in_flight());
        assert_eq!(session.working(), Some("Hello!"));
        assert_eq!(
            session.resolve::<()>(current.generation, Ok(())),
            Some(Outcome::Committed(String::from("Hello!")))
        );
        assert_eq!(session.committed(), "Hello!");
    }
}
