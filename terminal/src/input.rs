use anyhow::{Context, Result};
use asteroids_core::FrameInput;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Left,
    Right,
    Fire,
    Pause,
    Restart,
    Confirm,
    Quit,
}

pub fn map_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(KeyAction::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(KeyAction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(KeyAction::Right),
        KeyCode::Char(' ') => Some(KeyAction::Fire),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(KeyAction::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyAction::Restart),
        KeyCode::Enter => Some(KeyAction::Confirm),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Everything pressed since the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameKeys {
    pub input: FrameInput,
    pub quit: bool,
}

impl FrameKeys {
    pub fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Left => self.input.left = true,
            KeyAction::Right => self.input.right = true,
            KeyAction::Fire => self.input.fire = true,
            KeyAction::Pause => self.input.pause = true,
            KeyAction::Restart => self.input.restart = true,
            KeyAction::Confirm => self.input.confirm = true,
            KeyAction::Quit => self.quit = true,
        }
    }
}

/// Folds every queued action into one frame. A closed channel means the
/// listener is gone, which ends the session.
pub fn drain_actions(rx: &Receiver<KeyAction>) -> FrameKeys {
    let mut keys = FrameKeys::default();
    loop {
        match rx.try_recv() {
            Ok(action) => keys.apply(action),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                keys.quit = true;
                break;
            }
        }
    }
    keys
}

/// Reads terminal key events on its own thread and forwards them to the
/// frame loop. Dropping the listener stops and joins the thread.
pub struct InputListener {
    rx: Receiver<KeyAction>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputListener {
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("asteroids-input".to_string())
            .spawn(move || listen(tx, thread_stop))
            .context("failed spawning input thread")?;

        Ok(Self {
            rx,
            stop,
            handle: Some(handle),
        })
    }

    pub fn drain(&self) -> FrameKeys {
        drain_actions(&self.rx)
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn listen(tx: Sender<KeyAction>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "input poll failed");
                return;
            }
        }

        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(action) = map_key(&key) {
                    tracing::trace!(?action, "key");
                    if tx.send(action).is_err() {
                        return;
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "input read failed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn movement_keys_map_to_both_bindings() {
        assert_eq!(map_key(&press(KeyCode::Char('a'))), Some(KeyAction::Left));
        assert_eq!(map_key(&press(KeyCode::Left)), Some(KeyAction::Left));
        assert_eq!(map_key(&press(KeyCode::Char('D'))), Some(KeyAction::Right));
        assert_eq!(map_key(&press(KeyCode::Right)), Some(KeyAction::Right));
    }

    #[test]
    fn control_keys_map_to_actions() {
        assert_eq!(map_key(&press(KeyCode::Char(' '))), Some(KeyAction::Fire));
        assert_eq!(map_key(&press(KeyCode::Char('p'))), Some(KeyAction::Pause));
        assert_eq!(map_key(&press(KeyCode::Char('r'))), Some(KeyAction::Restart));
        assert_eq!(map_key(&press(KeyCode::Enter)), Some(KeyAction::Confirm));
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(KeyAction::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn unbound_and_released_keys_are_ignored() {
        assert_eq!(map_key(&press(KeyCode::Char('x'))), None);
        assert_eq!(map_key(&press(KeyCode::Up)), None);
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            None
        );

        let mut released = press(KeyCode::Char('a'));
        released.kind = KeyEventKind::Release;
        assert_eq!(map_key(&released), None);
    }

    #[test]
    fn drain_merges_all_pending_actions() {
        let (tx, rx) = mpsc::channel();
        tx.send(KeyAction::Left).unwrap();
        tx.send(KeyAction::Fire).unwrap();
        tx.send(KeyAction::Left).unwrap();

        let keys = drain_actions(&rx);
        assert!(keys.input.left);
        assert!(keys.input.fire);
        assert!(!keys.input.right);
        assert!(!keys.quit);

        assert_eq!(drain_actions(&rx), FrameKeys::default());
        drop(tx);
    }

    #[test]
    fn closed_channel_requests_quit() {
        let (tx, rx) = mpsc::channel();
        tx.send(KeyAction::Confirm).unwrap();
        drop(tx);

        let keys = drain_actions(&rx);
        assert!(keys.input.confirm);
        assert!(keys.quit);
    }
}
