//! Build script for Click Spy.
//!
//! The Tauri build step (Windows resource file, generated context) only
//! runs for the `desktop` feature. The core library needs no build steps.

fn main() {
    println!("cargo:rerun-if-changed=tauri.conf.json");
    println!("cargo:rerun-if-changed=icons");

    #[cfg(feature = "desktop")]
    tauri_build::build();
}
