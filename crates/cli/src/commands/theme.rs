//! Dark mode preference.

use clap::ValueEnum;
use shopfront_storefront::ShopState;

use super::CommandError;
use crate::output;

/// Requested theme change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}

impl ThemeChoice {
    /// Dark mode setting after applying this choice to `current`.
    #[must_use]
    pub const fn resolve(self, current: bool) -> bool {
        match self {
            Self::Dark => true,
            Self::Light => false,
            Self::Toggle => !current,
        }
    }
}

/// Show the preference, or change it when `choice` is given.
pub fn theme(state: &ShopState, choice: Option<ThemeChoice>) -> Result<(), CommandError> {
    let mut dark = state.dark_mode();
    if let Some(choice) = choice {
        dark = choice.resolve(dark);
        state.set_dark_mode(dark)?;
    }
    output::line(if dark { "dark" } else { "light" });
    Ok(())
}
