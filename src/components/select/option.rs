use std::fmt::Display;

use gpui::SharedString;

/// Values a select can hold. Implemented for every cloneable, comparable
/// and displayable type.
pub trait OptionValue: Clone + PartialEq + Display + 'static {}

impl<T: Clone + PartialEq + Display + 'static> OptionValue for T {}

/// One entry of a select's option list.
///
/// A `Primitive` option describes itself: its text and key are the value's
/// display string. A `Labeled` option carries its own text and key.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectOption<V> {
    Primitive(V),
    Labeled {
        value: V,
        text: SharedString,
        key: SharedString,
    },
}

/// An option reduced to the fields every consumer needs. Rows, search and
/// value lookups compare and render options through this form.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedOption<V> {
    pub value: V,
    pub text: SharedString,
    pub key: SharedString,
}

impl<V: OptionValue> SelectOption<V> {
    /// A labeled option whose key defaults to its text.
    pub fn labeled(value: V, text: impl Into<SharedString>) -> Self {
        let text = text.into();
        Self::Labeled {
            value,
            key: text.clone(),
            text,
        }
    }

    /// A labeled option with an explicit key.
    pub fn keyed(value: V, text: impl Into<SharedString>, key: impl Into<SharedString>) -> Self {
        Self::Labeled {
            value,
            text: text.into(),
            key: key.into(),
        }
    }

    pub fn value(&self) -> &V {
        match self {
            Self::Primitive(value) => value,
            Self::Labeled { value, .. } => value,
        }
    }

    pub fn text(&self) -> SharedString {
        match self {
            Self::Primitive(value) => value.to_string().into(),
            Self::Labeled { text, .. } => text.clone(),
        }
    }

    pub fn key(&self) -> SharedString {
        match self {
            Self::Primitive(value) => value.to_string().into(),
            Self::Labeled { key, .. } => key.clone(),
        }
    }

    pub fn normalize(&self) -> NormalizedOption<V> {
        NormalizedOption {
            value: self.value().clone(),
            text: self.text(),
            key: self.key(),
        }
    }
}

impl<V: OptionValue> From<V> for SelectOption<V> {
    fn from(value: V) -> Self {
        Self::Primitive(value)
    }
}

/// Display text for `value`, taken from the option carrying it, or the
/// value's own display string when no option does.
pub fn text_of<V: OptionValue>(options: &[SelectOption<V>], value: &V) -> SharedString {
    options
        .iter()
        .map(SelectOption::normalize)
        .find(|option| &option.value == value)
        .map(|option| option.text)
        .unwrap_or_else(|| value.to_string().into())
}

/// The selected value(s) of a select.
///
/// `Multiple` keeps each value at most once, in the order it was first
/// selected.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectValue<V> {
    Single(Option<V>),
    Multiple(Vec<V>),
}

impl<V> Default for SelectValue<V> {
    fn default() -> Self {
        Self::Single(None)
    }
}

impl<V: OptionValue> SelectValue<V> {
    /// An empty value of the given mode.
    pub fn empty(multiple: bool) -> Self {
        if multiple {
            Self::Multiple(Vec::new())
        } else {
            Self::Single(None)
        }
    }

    /// Converts the value to the given mode, keeping what fits.
    pub fn into_mode(self, multiple: bool) -> Self {
        match (self, multiple) {
            (Self::Single(value), true) => Self::Multiple(value.into_iter().collect()),
            (Self::Multiple(values), false) => Self::Single(values.into_iter().last()),
            (value, _) => value,
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.is_none(),
            Self::Multiple(values) => values.is_empty(),
        }
    }

    pub fn contains(&self, value: &V) -> bool {
        match self {
            Self::Single(selected) => selected.as_ref() == Some(value),
            Self::Multiple(values) => values.contains(value),
        }
    }

    pub fn values(&self) -> &[V] {
        match self {
            Self::Single(value) => value.as_slice(),
            Self::Multiple(values) => values,
        }
    }

    /// The single value, or the most recently added one.
    pub fn last(&self) -> Option<&V> {
        self.values().last()
    }

    /// Selects `value`: replaces a single value, appends a new one to a
    /// multiple value. Returns `true` when the value changed.
    pub fn select(&mut self, value: V) -> bool {
        match self {
            Self::Single(selected) => {
                if selected.as_ref() == Some(&value) {
                    return false;
                }
                *selected = Some(value);
                true
            }
            Self::Multiple(values) => {
                if values.contains(&value) {
                    return false;
                }
                values.push(value);
                true
            }
        }
    }

    /// Removes `value`. Returns `true` when it was selected.
    pub fn remove(&mut self, value: &V) -> bool {
        match self {
            Self::Single(selected) => {
                if selected.as_ref() != Some(value) {
                    return false;
                }
                *selected = None;
                true
            }
            Self::Multiple(values) => {
                let len = values.len();
                values.retain(|selected| selected != value);
                values.len() != len
            }
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Single(selected) => *selected = None,
            Self::Multiple(values) => values.clear(),
        }
    }
}

impl<V> From<Vec<V>> for SelectValue<V> {
    fn from(values: Vec<V>) -> Self {
        Self::Multiple(values)
    }
}

impl<V> From<Option<V>> for SelectValue<V> {
    fn from(value: Option<V>) -> Self {
        Self::Single(value)
    }
}
