//! Global input interception.
//!
//! A [`ClickSource`] pushes one [`ClickEvent`] into a [`ClickSender`] per
//! primary-button press anywhere on the desktop. The real source is the
//! Win32 low-level mouse hook; [`ScriptedClicks`] replays a fixed sequence
//! without touching the OS.

#[cfg(all(feature = "desktop", target_os = "windows"))]
mod win32;

#[cfg(all(feature = "desktop", target_os = "windows"))]
pub use self::win32::MouseHook;

use crate::capture::ClickEvent;
use crate::queue::ClickSender;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Failed to install global mouse hook: {0}")]
    Install(String),

    #[error("Global mouse hooks are not supported on this platform")]
    Unsupported,
}

/// Something that delivers primary-button presses into the click queue.
pub trait ClickSource: Send + Sync {
    /// Starts forwarding presses into `sink`. Failure is fatal to the app.
    fn start(&self, sink: ClickSender) -> Result<(), HookError>;

    /// Stops forwarding. Safe when never started and when called repeatedly.
    fn stop(&self);
}

/// The hook for the current platform.
#[cfg(all(feature = "desktop", target_os = "windows"))]
pub fn platform_hook() -> Box<dyn ClickSource> {
    Box::new(MouseHook::new())
}

/// The hook for the current platform.
#[cfg(not(all(feature = "desktop", target_os = "windows")))]
pub fn platform_hook() -> Box<dyn ClickSource> {
    Box::new(UnsupportedHook)
}

/// Stand-in for platforms without a global mouse hook; always fails to start.
#[derive(Debug, Default)]
pub struct UnsupportedHook;

impl ClickSource for UnsupportedHook {
    fn start(&self, _sink: ClickSender) -> Result<(), HookError> {
        Err(HookError::Unsupported)
    }

    fn stop(&self) {}
}

/// Replays a scripted click sequence into the sink on `start`.
#[derive(Debug, Default)]
pub struct ScriptedClicks {
    clicks: Vec<ClickEvent>,
    running: AtomicBool,
}

impl ScriptedClicks {
    pub fn new(clicks: Vec<ClickEvent>) -> Self {
        Self {
            clicks,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl ClickSource for ScriptedClicks {
    fn start(&self, sink: ClickSender) -> Result<(), HookError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        for click in &self.clicks {
            sink.enqueue(*click);
        }
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue;

    #[test]
    fn scripted_clicks_arrive_in_order() {
        let (tx, mut rx) = queue::channel();
        let source = ScriptedClicks::new(vec![ClickEvent::new(1, 2), ClickEvent::new(3, 4)]);
        source.start(tx).unwrap();
        assert!(source.is_running());
        assert_eq!(rx.try_dequeue(), Some(ClickEvent::new(1, 2)));
        assert_eq!(rx.try_dequeue(), Some(ClickEvent::new(3, 4)));
        assert_eq!(rx.try_dequeue(), None);
    }

    #[test]
    fn stop_is_idempotent() {
        let never_started = ScriptedClicks::default();
        never_started.stop();
        never_started.stop();
        assert!(!never_started.is_running());

        let (tx, _rx) = queue::channel();
        let source = ScriptedClicks::new(vec![ClickEvent::new(0, 0)]);
        source.start(tx).unwrap();
        source.stop();
        source.stop();
        assert!(!source.is_running());
    }

    #[test]
    fn unsupported_hook_fails_to_start() {
        let (tx, _rx) = queue::channel();
        let hook = UnsupportedHook;
        assert!(matches!(hook.start(tx), Err(HookError::Unsupported)));
        hook.stop();
        hook.stop();
    }
}
