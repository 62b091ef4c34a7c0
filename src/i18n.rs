//! Localized button labels.
//!
//! The engine resolves one [`Labels`] value per rendered frame: built-in
//! defaults for the configured language, overridden per label by the caller.
//! Rendering is external, so this stays a plain string table.

use serde::{Deserialize, Serialize};

// =============================================================================
// Language
// =============================================================================

/// Built-in label languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

// =============================================================================
// Labels
// =============================================================================

/// Resolved button labels handed to the overlay renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Step counter text, e.g. `"2/5"`.
    pub step: String,
    pub prev: String,
    pub next: String,
    pub skip: String,
    pub ok: String,
}

pub(crate) struct LabelDefaults {
    pub prev: &'static str,
    pub next: &'static str,
    pub skip: &'static str,
    pub ok: &'static str,
}

pub(crate) const fn defaults(lang: Lang) -> LabelDefaults {
    match lang {
        Lang::Zh => LabelDefaults {
            prev: "上一步",
            next: "下一步",
            skip: "跳过",
            ok: "我知道了",
        },
        Lang::En => LabelDefaults {
            prev: "Previous",
            next: "Next",
            skip: "Skip",
            ok: "Got it",
        },
    }
}

/// Default step counter text.
pub(crate) fn format_step(current: usize, total: usize) -> String {
    format!("{current}/{total}")
}

// =============================================================================
// Tests
// =============================================================================
