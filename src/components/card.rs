//! The post card: author, description with inline editing, and link preview.

mod session;

pub use self::session::{CommitRejected, EditSession, Mode, Outcome, COMMIT_COOLDOWN};

use super::Component;
use crate::backend::types::{Post, Session};
use crate::backend::{PostStore, UpdatePost};
use crate::bindings::{self, KeyBus, Scope, Subscription};
use crate::config::{CardAction as CardKeyAction, Key};
use crate::types::{Action, CardAction, IdType};
use crate::widgets::{AvatarWidget, LinkPreviewWidget};
use chrono::{DateTime, Local};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time;
use tui_textarea::{CursorMove, TextArea};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Called when the link preview is activated.
pub type OnActivate = Box<dyn Fn() + Send>;

#[derive(Debug, Default, Clone, Copy)]
struct Hitboxes {
    edit: Rect,
    delete: Rect,
    preview: Rect,
}

pub struct PostCardComponent {
    id: IdType,
    post: Post,
    edit: EditSession,
    editor: TextArea<'static>,
    store: Arc<dyn PostStore>,
    session: Arc<Session>,
    action_tx: UnboundedSender<Action>,
    keybindings: HashMap<Key, CardKeyAction>,
    on_activate: OnActivate,
    bus: Option<KeyBus>,
    subscriptions: Vec<Subscription>,
    cooldown: Option<JoinHandle<()>>,
    hitboxes: Hitboxes,
    saved_at: Option<DateTime<Local>>,
}

impl PostCardComponent {
    pub fn new(
        post: Post,
        store: Arc<dyn PostStore>,
        session: Arc<Session>,
        action_tx: UnboundedSender<Action>,
        keybindings: HashMap<Key, CardKeyAction>,
        on_activate: impl Fn() + Send + 'static,
    ) -> Self {
        let edit = EditSession::new(post.description.clone());
        let editor = editor(edit.displayed(), false);
        Self {
            id: COUNTER.fetch_add(1, Ordering::SeqCst),
            post,
            edit,
            editor,
            store,
            session,
            action_tx,
            keybindings,
            on_activate: Box::new(on_activate),
            bus: None,
            subscriptions: Vec::new(),
            cooldown: None,
            hitboxes: Hitboxes::default(),
            saved_at: None,
        }
    }
    pub fn id(&self) -> IdType {
        self.id
    }
    pub fn post(&self) -> &Post {
        &self.post
    }
    pub fn mode(&self) -> Mode {
        self.edit.mode()
    }
    pub fn in_flight(&self) -> bool {
        self.edit.in_flight()
    }
    pub fn displayed(&self) -> &str {
        self.edit.displayed()
    }
    pub fn is_mounted(&self) -> bool {
        self.bus.is_some()
    }
    fn toggle_edit(&mut self) -> Option<Action> {
        if !self.edit.toggle_edit() {
            log::debug!("card {}: toggle ignored while saving", self.id);
            return None;
        }
        self.sync_focus();
        self.sync_editor();
        Some(Action::Render)
    }
    fn cancel(&mut self) -> Option<Action> {
        if !self.edit.cancel() {
            return None;
        }
        self.sync_focus();
        self.sync_editor();
        Some(Action::Render)
    }
    fn commit(&mut self) -> Option<Action> {
        let request = match self.edit.begin_commit() {
            Ok(request) => request,
            Err(CommitRejected::InFlight) => {
                log::debug!("card {}: commit already in flight, ignored", self.id);
                return None;
            }
            Err(CommitRejected::NotEditing) => {
                log::debug!("card {}: not editing, commit ignored", self.id);
                return None;
            }
        };
        self.sync_editor();
        let (id, tx) = (self.id, self.action_tx.clone());
        let (store, session) = (Arc::clone(&self.store), Arc::clone(&self.session));
        let generation = request.generation;
        let update = UpdatePost {
            id: self.post.id.clone(),
            description: request.description,
        };
        tokio::spawn(async move {
            let result = store
                .update_post(&session, &update)
                .await
                .map_err(|e| e.to_string());
            if let Err(e) = tx.send(Action::Card((id, CardAction::Resolved(generation, result)))) {
                log::error!("failed to send commit result: {e}");
            }
        });
        Some(Action::Render)
    }
    fn resolve(&mut self, generation: u64, result: Result<(), String>) -> Option<Action> {
        match self.edit.resolve(generation, result.as_ref().map(|_| ())) {
            None => {
                log::debug!(
                    "card {}: commit {generation} is not outstanding, result dropped",
                    self.id
                );
                None
            }
            Some(Outcome::Committed(description)) => {
                log::info!("post {} updated", self.post.id);
                self.post.description = description;
                self.saved_at = Some(Local::now());
                self.sync_focus();
                self.sync_editor();
                Some(Action::Render)
            }
            Some(Outcome::Reverted { cooldown, .. }) => {
                if let Err(e) = &result {
                    log::error!("failed to update post {}: {e}", self.post.id);
                }
                self.sync_editor();
                self.schedule_cooldown(cooldown);
                Some(Action::Render)
            }
        }
    }
    fn schedule_cooldown(&mut self, cooldown: Duration) {
        let (id, tx) = (self.id, self.action_tx.clone());
        if let Some(handle) = self.cooldown.replace(tokio::spawn(async move {
            time::sleep(cooldown).await;
            if let Err(e) = tx.send(Action::Card((id, CardAction::CooldownElapsed))) {
                log::error!("failed to send cooldown action: {e}");
            }
        })) {
            handle.abort();
        }
    }
    fn finish_cooldown(&mut self) -> Option<Action> {
        self.cooldown.take();
        if !self.edit.finish_cooldown() {
            return None;
        }
        self.sync_editor();
        Some(Action::Render)
    }
    fn sync_focus(&self) {
        if let Some(bus) = &self.bus {
            if self.edit.is_editing() {
                bus.focus(Some(self.id));
            } else {
                bus.blur(self.id);
            }
        }
    }
    fn sync_editor(&mut self) {
        self.editor = editor(self.edit.displayed(), self.edit.in_flight());
    }
    fn hint(&self) -> Line<'static> {
        if self.edit.is_cooling_down() {
            Line::from("save failed, cooling down").red()
        } else if self.edit.in_flight() {
            Line::from("saving...").yellow()
        } else if self.edit.is_editing() {
            Line::from("Enter: save, Esc: cancel").dim()
        } else if let Some(saved_at) = self.saved_at {
            Line::from(format!("saved at {}", saved_at.format("%H:%M:%S"))).green()
        } else {
            Line::default()
        }
    }
}

fn editor(text: &str, disabled: bool) -> TextArea<'static> {
    let mut editor = TextArea::from(text.split('\n'));
    editor.set_cursor_line_style(Style::default());
    editor.move_cursor(CursorMove::Bottom);
    editor.move_cursor(CursorMove::End);
    if disabled {
        editor.set_block(Block::bordered().dim());
        editor.set_style(Style::default().dim());
        editor.set_cursor_style(Style::default());
    } else {
        editor.set_block(Block::bordered());
        editor.set_cursor_style(Style::default().reversed());
    }
    editor
}

impl Component for PostCardComponent {
    fn mount(&mut self, bus: &KeyBus) -> Result<()> {
        if self.bus.is_some() {
            return Err(bindings::Error::AlreadyMounted(self.id).into());
        }
        self.edit.restart(self.post.description.clone());
        self.subscriptions = vec![
            bus.subscribe(
                self.id,
                Scope::Field(self.id),
                Key::from(KeyCode::Enter),
                CardAction::Commit,
            )?,
            bus.subscribe(
                self.id,
                Scope::Document,
                Key::from(KeyCode::Esc),
                CardAction::Cancel,
            )?,
        ];
        self.bus = Some(bus.clone());
        self.sync_editor();
        log::debug!("card {} mounted", self.id);
        Ok(())
    }
    fn unmount(&mut self) -> Result<()> {
        let Some(bus) = self.bus.take() else {
            return Err(bindings::Error::NotMounted(self.id).into());
        };
        bus.blur(self.id);
        self.subscriptions.clear();
        if let Some(handle) = self.cooldown.take() {
            handle.abort();
        }
        log::debug!("card {} unmounted", self.id);
        Ok(())
    }
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.edit.is_editing() {
            if self.edit.in_flight() || matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                return Ok(None);
            }
            let cursor = self.editor.cursor();
            if self.editor.input(key) {
                self.edit.set_working(self.editor.lines().join("\n"));
                return Ok(Some(Action::Render));
            }
            return Ok((self.editor.cursor() != cursor).then_some(Action::Render));
        }
        Ok(self
            .keybindings
            .get(&key.into())
            .map(|action| Action::Card((self.id, action.into()))))
    }
    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }
        let position = Position::new(mouse.column, mouse.row);
        let action = if self.hitboxes.edit.contains(position) {
            CardAction::Edit
        } else if self.hitboxes.delete.contains(position) {
            CardAction::Delete
        } else if self.hitboxes.preview.contains(position) {
            CardAction::Open
        } else {
            return Ok(None);
        };
        Ok(Some(Action::Card((self.id, action))))
    }
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let Action::Card((id, action)) = action else {
            return Ok(None);
        };
        if id != self.id {
            return Ok(None);
        }
        if self.bus.is_none() {
            log::debug!("card {id} is not mounted, dropped {action:?}");
            return Ok(None);
        }
        Ok(match action {
            CardAction::Edit => self.toggle_edit(),
            CardAction::Delete => {
                log::debug!("card {id}: delete is not supported");
                None
            }
            CardAction::Open => {
                (self.on_activate)();
                None
            }
            CardAction::Commit => self.commit(),
            CardAction::Cancel => self.cancel(),
            CardAction::Resolved(generation, result) => self.resolve(generation, result),
            CardAction::CooldownElapsed => self.finish_cooldown(),
        })
    }
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let block = Block::bordered();
        let inner = block.inner(area);
        f.render_widget(block, area);

        self.hitboxes.edit =
            Rect::new(area.right().saturating_sub(8), area.y, 3, 1).intersection(area);
        self.hitboxes.delete =
            Rect::new(area.right().saturating_sub(5), area.y, 3, 1).intersection(area);
        let edit_icon = Line::from(" ✎ ");
        f.render_widget(
            if self.edit.is_editing() {
                edit_icon.reversed()
            } else {
                edit_icon
            },
            self.hitboxes.edit,
        );
        f.render_widget(Line::from(" 🗑"), self.hitboxes.delete);

        let [avatar, body] = Layout::horizontal([Constraint::Length(10), Constraint::Fill(1)])
            .spacing(1)
            .areas(inner);
        f.render_widget(
            AvatarWidget::new(&self.post.author_name, &self.post.author_image),
            avatar,
        );

        let text_lines = textwrap::wrap(self.edit.displayed(), usize::from(body.width.max(1)));
        let text_height = if self.edit.is_editing() {
            (self.editor.lines().len() as u16 + 2).clamp(3, 8)
        } else {
            text_lines.len().max(1) as u16
        };
        let [name, text, preview, hint] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(text_height),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .spacing(1)
        .areas(body);
        f.render_widget(Line::from(self.post.author_name.as_str()).bold(), name);
        if self.edit.is_editing() {
            f.render_widget(&self.editor, text);
        } else {
            f.render_widget(
                Paragraph::new(
                    text_lines
                        .iter()
                        .map(|s| Line::from(s.to_string()))
                        .collect::<Vec<_>>(),
                )
                .gray(),
                text,
            );
        }
        f.render_widget(LinkPreviewWidget::new(&self.post.preview), preview);
        self.hitboxes.preview = preview;
        f.render_widget(self.hint(), hint);
        Ok(())
    }
}

impl Drop for PostCardComponent {
    fn drop(&mut self) {
        if let Some(handle) = self.cooldown.take() {
            handle.abort();
        }
    }
}
