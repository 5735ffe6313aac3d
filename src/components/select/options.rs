use std::{ops::Range, rc::Rc};

use gpui::SharedString;

use crate::components::select::{NormalizedOption, OptionValue, SelectOption, SelectValue, text_of};

/// Builds the option offered for a search term that matches nothing, or
/// `None` to offer nothing for it.
pub type AddOptionFn<V> = Rc<dyn Fn(&str) -> Option<SelectOption<V>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Option,
    /// Offers to add the current search term as a new option.
    Add,
}

/// One renderable row of the options panel.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionRow<V> {
    pub option: SelectOption<V>,
    pub key: SharedString,
    pub text: SharedString,
    /// Byte range of `text` matching the search query.
    pub highlight: Option<Range<usize>>,
    pub focused: bool,
    pub selected: bool,
    pub kind: RowKind,
}

impl<V: OptionValue> OptionRow<V> {
    fn new(option: SelectOption<V>, query: &str) -> Self {
        let NormalizedOption { text, key, .. } = option.normalize();
        Self {
            key,
            highlight: highlight_range(&text, query),
            text,
            option,
            focused: false,
            selected: false,
            kind: RowKind::Option,
        }
    }

    /// A row offering `option` under the given label.
    pub fn add(option: SelectOption<V>, label: impl Into<SharedString>) -> Self {
        Self {
            key: SharedString::new_static("select:add-option"),
            text: label.into(),
            highlight: None,
            option,
            focused: false,
            selected: false,
            kind: RowKind::Add,
        }
    }
}

/// Length in bytes of the prefix of `text` that equals `query` ignoring case.
fn match_len(text: &str, query: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let mut len = 0;

    for wanted in query.chars() {
        let (index, found) = chars.next()?;
        if !found.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
        len = index + found.len_utf8();
    }

    Some(len)
}

/// The part of `text` to highlight for `query`: all of it on an exact match
/// ignoring case, otherwise the first occurrence of `query` ignoring case.
pub fn highlight_range(text: &str, query: &str) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }

    if text.to_lowercase() == query.to_lowercase() {
        return Some(0..text.len());
    }

    text.char_indices()
        .find_map(|(start, _)| match_len(&text[start..], query).map(|len| start..start + len))
}

/// Turns options into rows, highlighting `query` in each.
pub fn render_rows<V: OptionValue>(options: &[SelectOption<V>], query: &str) -> Vec<OptionRow<V>> {
    options
        .iter()
        .map(|option| OptionRow::new(option.clone(), query))
        .collect()
}

/// `options` without the ones whose value is selected.
pub fn filter_selected<V: OptionValue>(
    options: &[SelectOption<V>],
    value: &SelectValue<V>,
) -> Vec<SelectOption<V>> {
    options
        .iter()
        .filter(|option| !value.contains(option.value()))
        .cloned()
        .collect()
}

/// The option to offer for `query` when it names neither a selected value
/// nor an existing option, compared ignoring case and surrounding spaces.
pub fn add_option<V: OptionValue>(
    query: &str,
    options: &[SelectOption<V>],
    value: &SelectValue<V>,
    factory: &AddOptionFn<V>,
) -> Option<SelectOption<V>> {
    let term = query.trim();
    if term.is_empty() {
        return None;
    }

    let term_lowercase = term.to_lowercase();
    let is_term = |text: &str| text.to_lowercase() == term_lowercase;

    if value
        .values()
        .iter()
        .any(|selected| is_term(&selected.to_string()) || is_term(&text_of(options, selected)))
    {
        return None;
    }

    if options.iter().any(|option| is_term(&option.normalize().text)) {
        return None;
    }

    factory(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers() -> Vec<SelectOption<i32>> {
        vec![
            SelectOption::labeled(1, "One"),
            SelectOption::labeled(2, "Two"),
            SelectOption::labeled(3, "Three"),
        ]
    }

    #[test]
    fn test_highlight_first_occurrence_ignoring_case() {
        assert_eq!(highlight_range("Banana", "AN"), Some(1..3));
        assert_eq!(highlight_range("Banana", "x"), None);
        assert_eq!(highlight_range("Banana", ""), None);
    }

    #[test]
    fn test_highlight_exact_match_covers_text() {
        assert_eq!(highlight_range("Apple", "apple"), Some(0..5));
    }

    #[test]
    fn test_highlight_respects_char_boundaries() {
        let text = "Crème Brûlée";
        let range = highlight_range(text, "BRÛ").unwrap();
        assert_eq!(&text[range], "Brû");
    }

    #[test]
    fn test_render_rows_keeps_order_and_keys() {
        let rows = render_rows(&numbers(), "t");

        let keys: Vec<_> = rows.iter().map(|row| row.key.to_string()).collect();
        assert_eq!(keys, ["One", "Two", "Three"]);
        assert_eq!(rows[0].highlight, None);
        assert_eq!(rows[1].highlight, Some(0..1));
        assert!(rows.iter().all(|row| row.kind == RowKind::Option));
    }

    #[test]
    fn test_filter_selected_removes_exactly_selected_values() {
        let options = numbers();

        for selected in [vec![], vec![1], vec![3, 1], vec![1, 2, 3]] {
            let value = SelectValue::Multiple(selected.clone());
            let filtered = filter_selected(&options, &value);

            let expected: Vec<_> = options
                .iter()
                .filter(|option| !selected.contains(option.value()))
                .cloned()
                .collect();
            assert_eq!(filtered, expected);
        }
    }

    #[test]
    fn test_add_option_skips_known_terms() {
        let factory: AddOptionFn<String> =
            Rc::new(|term| Some(SelectOption::Primitive(term.to_string())));
        let options = vec![SelectOption::Primitive("Red".to_string())];
        let value = SelectValue::Multiple(vec!["Blue".to_string()]);

        assert_eq!(add_option("  ", &options, &value, &factory), None);
        assert_eq!(add_option("red", &options, &value, &factory), None);
        assert_eq!(add_option(" BLUE ", &options, &value, &factory), None);
        assert_eq!(
            add_option(" Green ", &options, &value, &factory),
            Some(SelectOption::Primitive("Green".to_string()))
        );
    }

    #[test]
    fn test_add_option_factory_can_decline() {
        let factory: AddOptionFn<i32> = Rc::new(|term| term.parse().ok().map(SelectOption::Primitive));
        let value = SelectValue::empty(false);

        assert_eq!(add_option("abc", &numbers(), &value, &factory), None);
        assert_eq!(
            add_option("42", &numbers(), &value, &factory),
            Some(SelectOption::Primitive(42))
        );
    }
}
