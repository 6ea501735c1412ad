//! Click Spy screenshots the screen or window under every mouse click.
//!
//! The click-capture pipeline (hook → queue → worker → geometry → capture →
//! event log) is platform independent and lives in the modules below. The
//! `desktop` feature adds the real OS backends and the Tauri tray shell in
//! [`run`].

pub mod capture;
pub mod event_log;
pub mod hook;
pub mod queue;
pub mod service;
pub mod settings;
#[cfg(feature = "desktop")]
mod tray;
pub mod worker;

pub use capture::{CaptureMode, ClickEvent, ModeState, Rect};
pub use service::{Backends, ClickSpy, StartupError};
pub use settings::Settings;

/// Entry point, called from `main`.
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;
    use tauri::Manager;

    settings::load_dotenv();
    env_logger::init();

    let settings = Settings::load();

    tauri::Builder::default()
        .setup(move |app| {
            log::info!("Click Spy starting up");

            let backends = Backends {
                desktop: capture::platform_desktop(),
                screen: Arc::new(capture::XcapDesktop::new()),
                hook: hook::platform_hook(),
            };
            let spy = tauri::async_runtime::block_on(async { ClickSpy::start(&settings, backends) })?;
            let initial_mode = spy.mode();
            app.manage(Arc::new(spy));

            tray::setup_tray(app.handle(), initial_mode)?;

            log::info!("System tray initialized, watching clicks");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running Click Spy");
}
