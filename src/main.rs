//! Terminal Block Album runner (default binary).
//!
//! Turn-based: the loop polls for input and redraws only after an event
//! changes something. It uses crossterm for input and the framebuffer
//! renderer from the term crate.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};

use block_album::core::EngineEvent;
use block_album::engine::{MatchSession, SessionError};
use block_album::input::{left_click, map_key, should_quit};
use block_album::term::{feed_line, FrameBuffer, GameView, TerminalRenderer, ViewOverlay, Viewport};
use block_album::types::{Cell, InputCommand};
use block_album::{logging, AppConfig};

const FEED_CAPACITY: usize = 8;
const POLL_MS: u64 = 250;

type Feed = Rc<RefCell<VecDeque<String>>>;

fn main() -> Result<()> {
    let app = AppConfig::from_env()?;
    logging::init(&app.log_path, app.log_level)?;
    info!("starting with seed {}", app.seed);

    let mut session = MatchSession::new(app.session, app.seed).context("invalid session configuration")?;

    // The HUD feed listens to the engine; the session itself never does.
    let feed: Feed = Rc::new(RefCell::new(VecDeque::with_capacity(FEED_CAPACITY)));
    let sink = Rc::clone(&feed);
    session.engine_mut().subscribe(move |event| {
        if let EngineEvent::TurnResolved(result) = event {
            if let Some(line) = feed_line(result) {
                let mut lines = sink.borrow_mut();
                if lines.len() == FEED_CAPACITY {
                    lines.pop_front();
                }
                lines.push_back(line);
            }
        }
    });

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, &feed);

    // Always try to restore terminal state.
    let _ = term.exit();
    info!("exiting");
    result
}

fn run(term: &mut TerminalRenderer, session: &mut MatchSession, feed: &Feed) -> Result<()> {
    let view = GameView::default();
    let mut overlay = ViewOverlay {
        selected_slot: Some(0),
        ..ViewOverlay::default()
    };
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut fb = FrameBuffer::new(w, h);
    let mut dirty = true;

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);

        if dirty {
            overlay.feed = feed.borrow().iter().cloned().collect();
            view.render_into(&session.snapshot(), &overlay, viewport, &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(POLL_MS))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(command) = map_key(key) {
                    apply(session, &mut overlay, command);
                    dirty = true;
                }
            }
            Event::Mouse(mouse) => {
                let size = session.engine().board_size();
                if let Some(cell) = left_click(&mouse).and_then(|(col, row)| view.cell_at(size, viewport, col, row)) {
                    overlay.cursor = cell;
                    apply(session, &mut overlay, InputCommand::Place);
                    dirty = true;
                }
            }
            Event::Resize(_, _) => {
                term.invalidate();
                dirty = true;
            }
            _ => {}
        }
    }
}

fn apply(session: &mut MatchSession, overlay: &mut ViewOverlay, command: InputCommand) {
    let size = session.engine().board_size();
    overlay.message = None;
    if command != InputCommand::Hint {
        overlay.hint = None;
    }

    let outcome: Result<(), SessionError> = match command {
        InputCommand::MoveCursor { dx, dy } => {
            overlay.cursor = Cell::new(
                (overlay.cursor.x + dx).clamp(0, size - 1),
                (overlay.cursor.y + dy).clamp(0, size - 1),
            );
            Ok(())
        }
        InputCommand::SelectSlot(slot) => {
            if slot < session.tray().slot_count() {
                overlay.selected_slot = Some(slot);
            }
            Ok(())
        }
        InputCommand::Place => match overlay.selected_slot {
            Some(slot) => session.place_from_tray(slot, overlay.cursor).map(|_| ()),
            None => {
                overlay.message = Some("select a tray slot first".to_string());
                Ok(())
            }
        },
        InputCommand::Bomb(kind) => session.use_bomb(kind, overlay.cursor).map(|_| ()),
        InputCommand::Swap => session.swap_tray(),
        InputCommand::Hint => {
            overlay.hint = session.suggest_hint();
            if let Some(hint) = &overlay.hint {
                overlay.selected_slot = Some(hint.slot);
            } else {
                overlay.message = Some("no hint available".to_string());
            }
            Ok(())
        }
        InputCommand::SecondChance => session.try_second_chance(),
        InputCommand::NextRun => {
            session.start_next_run();
            Ok(())
        }
        InputCommand::Restart => {
            session.restart();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        debug!("command {:?} refused: {}", command, err.code());
        overlay.message = Some(err.to_string());
    }
}
