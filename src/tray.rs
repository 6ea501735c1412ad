//! System tray icon and menu.
//!
//! The tray is the only UI: two mutually exclusive capture-mode items
//! and Exit. It forwards to the running [`ClickSpy`] service.

use crate::capture::CaptureMode;
use crate::service::ClickSpy;
use std::sync::Arc;
use tauri::{
    image::Image as TauriImage,
    menu::{CheckMenuItem, CheckMenuItemBuilder, MenuBuilder, MenuItemBuilder},
    tray::TrayIconBuilder,
    AppHandle, Manager, Wry,
};

const MODE_MONITOR_ID: &str = "mode_monitor";
const MODE_WINDOW_ID: &str = "mode_window";
const EXIT_ID: &str = "exit";

/// Sets up the tray icon with its mode toggle and Exit item.
pub fn setup_tray(app: &AppHandle, initial_mode: CaptureMode) -> Result<(), Box<dyn std::error::Error>> {
    let monitor_item = CheckMenuItemBuilder::with_id(MODE_MONITOR_ID, "Mode: Screen")
        .checked(initial_mode == CaptureMode::Monitor)
        .build(app)?;
    let window_item = CheckMenuItemBuilder::with_id(MODE_WINDOW_ID, "Mode: Window")
        .checked(initial_mode == CaptureMode::Window)
        .build(app)?;
    let exit_item = MenuItemBuilder::with_id(EXIT_ID, "Exit").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&monitor_item)
        .item(&window_item)
        .separator()
        .item(&exit_item)
        .build()?;

    // Decode the PNG icon to RGBA for Tauri's Image type
    let icon_bytes = include_bytes!("../icons/32x32.png");
    let icon_img = image::load_from_memory(icon_bytes)
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    let _tray = TrayIconBuilder::new()
        .icon(tray_icon)
        .tooltip("Activity Log")
        .menu(&menu)
        .on_menu_event(move |app, event| match event.id().as_ref() {
            MODE_MONITOR_ID => select_mode(app, CaptureMode::Monitor, &monitor_item, &window_item),
            MODE_WINDOW_ID => select_mode(app, CaptureMode::Window, &monitor_item, &window_item),
            EXIT_ID => {
                log::info!("[TRAY] Exit requested");
                exit(app);
            }
            _ => {}
        })
        .build(app)?;

    Ok(())
}

/// Radio behaviour: exactly one mode item stays checked.
fn select_mode(
    app: &AppHandle,
    mode: CaptureMode,
    monitor_item: &CheckMenuItem<Wry>,
    window_item: &CheckMenuItem<Wry>,
) {
    let checks = [
        monitor_item.set_checked(mode == CaptureMode::Monitor),
        window_item.set_checked(mode == CaptureMode::Window),
    ];
    for result in checks {
        if let Err(e) = result {
            log::warn!("[TRAY] Failed to update mode check marks: {}", e);
        }
    }

    let spy = app.state::<Arc<ClickSpy>>();
    if spy.mode() != mode {
        spy.switch_mode(mode);
    }
}

/// Stops the service, then the process.
fn exit(app: &AppHandle) {
    let spy = Arc::clone(app.state::<Arc<ClickSpy>>().inner());
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        spy.shutdown().await;
        app.exit(0);
    });
}
