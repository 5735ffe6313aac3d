//! Display strings for built-in placeholders and messages.

#![allow(missing_docs)] // Derive macros generate undocumented methods.

use enum_assoc::Assoc;
use gpui::{App, Global, SharedString};
use indexmap::IndexMap;

/// Symbolic keys for strings the components render on their own.
#[derive(Assoc, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[func(pub fn english(&self) -> &'static str)]
pub enum LocaleKey {
    /// Placeholder of a select without a value.
    #[assoc(english = "Select")]
    Select,
    /// Row shown when no option is left to pick.
    #[assoc(english = "No options")]
    NoOptions,
    /// Label of the row that adds the typed query as a new option.
    /// `{term}` is replaced by the query.
    #[assoc(english = "Add \"{term}\"")]
    AddOption,
}

/// Overrides for [`LocaleKey`] strings. Keys without an override fall back
/// to English.
#[derive(Clone, Default)]
pub struct Locale {
    strings: IndexMap<LocaleKey, SharedString>,
}

impl Global for Locale {}

impl Locale {
    pub fn with(mut self, key: LocaleKey, text: impl Into<SharedString>) -> Self {
        self.strings.insert(key, text.into());
        self
    }

    pub fn get(&self, key: LocaleKey) -> SharedString {
        self.strings
            .get(&key)
            .cloned()
            .unwrap_or_else(|| SharedString::new_static(key.english()))
    }

    /// Resolves `key`, replacing `{term}` with `term`.
    pub fn format(&self, key: LocaleKey, term: &str) -> SharedString {
        self.get(key).replace("{term}", term).into()
    }
}

/// Extension trait for looking up localized strings.
pub trait LocaleExt {
    fn set_locale(&mut self, locale: Locale);

    fn translate(&self, key: LocaleKey) -> SharedString;

    /// Like [`translate`](Self::translate), replacing `{term}` with `term`.
    fn translate_term(&self, key: LocaleKey, term: &str) -> SharedString {
        self.translate(key).replace("{term}", term).into()
    }
}

impl LocaleExt for App {
    fn set_locale(&mut self, locale: Locale) {
        self.set_global(locale)
    }

    fn translate(&self, key: LocaleKey) -> SharedString {
        match self.try_global::<Locale>() {
            Some(locale) => locale.get(key),
            None => SharedString::new_static(key.english()),
        }
    }
}
