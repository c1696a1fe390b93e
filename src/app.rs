use crate::backend::types::{Post, Session};
use crate::backend::PostStore;
use crate::bindings::KeyBus;
use crate::components::card::PostCardComponent;
use crate::components::Component;
use crate::config::{Config, Key};
use crate::tui::{io, Tui};
use crate::types::{Action, Event};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const FRAME_RATE: f64 = 30.0;
const MAX_WIDTH: u16 = 100;
const MAX_HEIGHT: u16 = 22;

pub struct App {
    config: Config,
    post: Post,
    store: Arc<dyn PostStore>,
    session: Arc<Session>,
    bus: KeyBus,
}

impl App {
    pub fn new(config: Config, post: Post, store: Arc<dyn PostStore>) -> Self {
        log::debug!("App::new({config:?})");
        let session = Arc::new(config.session.clone());
        Self {
            config,
            post,
            store,
            session,
            bus: KeyBus::new(),
        }
    }
    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let terminal = Terminal::new(CrosstermBackend::new(io()))?;
        log::debug!("terminal size: {:?}", terminal.size()?);
        let mut tui = Tui::new(terminal);
        tui.start(FRAME_RATE)?;

        let link = self.post.preview.link.clone();
        let mut card = PostCardComponent::new(
            self.post.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.session),
            action_tx.clone(),
            self.config.keybindings.card.clone(),
            move || open_link(&link),
        );
        let result = self
            .run_card(&mut tui, &mut card, &action_tx, &mut action_rx)
            .await;
        let result = shutdown(&mut card, result);
        result.and(tui.end())
    }
    async fn run_card<B: Backend>(
        &self,
        tui: &mut Tui<B>,
        card: &mut PostCardComponent,
        action_tx: &UnboundedSender<Action>,
        action_rx: &mut UnboundedReceiver<Action>,
    ) -> Result<()> {
        card.mount(&self.bus)?;
        let mut should_quit = false;
        loop {
            if let Some(e) = tui.next_event().await {
                for action in self.handle_events(e, card)? {
                    action_tx.send(action)?;
                }
            }
            while let Ok(action) = action_rx.try_recv() {
                if !matches!(action, Action::Tick(_) | Action::Render) {
                    log::info!("Action {action:?}");
                }
                match action {
                    Action::Quit => should_quit = true,
                    Action::Tick(_) => {}
                    Action::Render => {
                        tui.draw(|f| {
                            if let Err(e) = card.draw(f, card_area(f.area())) {
                                if let Err(e) =
                                    action_tx.send(Action::Error(format!("failed to draw: {e:?}")))
                                {
                                    log::error!("failed to send error: {e}");
                                }
                            }
                        })?;
                    }
                    Action::Error(e) => log::error!("{e}"),
                    _ => {
                        if let Some(action) = card.update(action)? {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            if should_quit {
                return Ok(());
            }
        }
    }
    fn handle_events(&self, event: Event, card: &mut impl Component) -> Result<Vec<Action>> {
        Ok(match event {
            Event::Tick(i) => vec![Action::Tick(i)],
            Event::Render => vec![Action::Render],
            Event::Key(key_event) => self.handle_key_events(key_event, card)?,
            Event::Mouse(_) => card.handle_events(Some(event))?.into_iter().collect(),
            Event::Error(e) => vec![Action::Error(e)],
        })
    }
    /// Global bindings win, then bindings installed on the key bus, then the card itself.
    fn handle_key_events(
        &self,
        key_event: KeyEvent,
        card: &mut impl Component,
    ) -> Result<Vec<Action>> {
        let key: Key = key_event.into();
        if let Some(action) = self.config.keybindings.global.get(&key) {
            return Ok(vec![action.into()]);
        }
        let actions = self
            .bus
            .dispatch(&key)
            .into_iter()
            .map(Action::Card)
            .collect::<Vec<_>>();
        if !actions.is_empty() {
            return Ok(actions);
        }
        Ok(card.handle_key_events(key_event)?.into_iter().collect())
    }
}

/// Unmounts the card however the loop ended. The loop's own error wins.
fn shutdown(card: &mut impl Component, result: Result<()>) -> Result<()> {
    let unmounted = card.unmount();
    result.and(unmounted)
}

fn card_area(area: Rect) -> Rect {
    let (width, height) = (area.width.min(MAX_WIDTH), area.height.min(MAX_HEIGHT));
    Rect::new(area.x + (area.width - width) / 2, area.y, width, height)
}

fn open_link(link: &str) {
    if link.is_empty() {
        return log::debug!("no link to open");
    }
    if let Err(e) = open::that(link) {
        log::error!("failed to open {link}: {e}");
    }
}
