#![forbid(unsafe_code)]

//! Settings page walkthrough on the headless document.
//!
//! Environment:
//! - `MFUI_THEME`: initial theme, `light` or `dark`.
//! - `RUST_LOG`: log filter, e.g. `mfui_widgets=debug`.

mod page;
mod tracing_setup;

use std::error::Error;

use mfui_core::{KeyCode, KeyEvent};
use mfui_runtime::{Store, Theme, ThemeStore};

use page::SettingsPage;

const THEME_ENV: &str = "MFUI_THEME";

fn initial_theme() -> Result<Theme, Box<dyn Error>> {
    match std::env::var(THEME_ENV) {
        Ok(value) => Ok(value.parse()?),
        Err(std::env::VarError::NotPresent) => Ok(Theme::default()),
        Err(err) => Err(format!("{THEME_ENV}: {err}").into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_setup::init_subscriber();

    let themes = ThemeStore::new(Store::new());
    themes.set_theme(initial_theme()?);
    tracing::info!(target: "mfui_demo", theme = %themes.theme(), "starting");

    let mut page = SettingsPage::new(themes);
    println!("save button:    {}", page.save_button());
    println!("initial:        {}", page.status());

    page.click_save()?;
    println!("after save:     {}", page.status());
    print!("{}", page.body_html());

    page.toggle_theme()?;
    println!("theme toggled:  {}", page.status());

    page.press_key(KeyEvent::new(KeyCode::Escape))?;
    println!("after escape:   {}", page.status());

    page.click_save()?;
    let backdrop = page.modal().ids().backdrop;
    let reason = page.click(backdrop)?;
    println!("after backdrop: {} ({reason:?})", page.status());

    Ok(())
}
