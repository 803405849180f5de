//! Browser console logging through `console_log`.

use log::LevelFilter;
use wasm_bindgen::prelude::*;

/// Route crate logs to the console. `level` is a `log` level name
/// ("error" ... "trace", or "off"); defaults to "info". Calling again only
/// changes the level.
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let filter = match level.as_deref() {
        None => LevelFilter::Info,
        Some(name) => name
            .parse::<LevelFilter>()
            .map_err(|_| JsError::new(&format!("unknown log level '{name}'")))?,
    };
    if let Some(level) = filter.to_level() {
        // Fails only when a logger is already installed.
        let _ = console_log::init_with_level(level);
    }
    log::set_max_level(filter);
    Ok(())
}
