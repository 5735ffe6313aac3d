use std::rc::Rc;

use gpui::SharedString;
use nucleo_matcher::{
    Config, Matcher, Utf32String,
    pattern::{CaseMatching, Normalization, Pattern},
};

use crate::components::select::{OptionValue, SelectOption};

/// Tuning of the fuzzy search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FuzzyConfig {
    /// Matches scoring below this are dropped.
    pub min_score: u32,
    /// Rank options whose text starts with the query before other matches.
    pub prefer_prefix: bool,
}

/// Fuzzy index over the display text of a list of options.
///
/// The index is rebuilt only when it is synced with a different candidate
/// list (by `Rc` identity), not on every query.
pub struct FuzzyIndex<V> {
    candidates: Rc<[SelectOption<V>]>,
    texts: Vec<SharedString>,
    haystacks: Vec<Utf32String>,
    matcher: Matcher,
    config: FuzzyConfig,
    rebuilds: usize,
    queries: usize,
}

impl<V: OptionValue> FuzzyIndex<V> {
    pub fn new(config: FuzzyConfig) -> Self {
        Self {
            candidates: Rc::from(Vec::new()),
            texts: Vec::new(),
            haystacks: Vec::new(),
            matcher: Matcher::new(Config::DEFAULT),
            config,
            rebuilds: 0,
            queries: 0,
        }
    }

    pub fn set_config(&mut self, config: FuzzyConfig) {
        self.config = config;
    }

    /// Points the index at `candidates`, re-indexing when the list changed.
    /// Returns `true` when a rebuild happened.
    pub fn sync(&mut self, candidates: &Rc<[SelectOption<V>]>) -> bool {
        if Rc::ptr_eq(&self.candidates, candidates) {
            return false;
        }

        self.candidates = candidates.clone();
        self.texts = candidates
            .iter()
            .map(|option| option.normalize().text)
            .collect();
        self.haystacks = self
            .texts
            .iter()
            .map(|text| Utf32String::from(text.as_ref()))
            .collect();
        self.rebuilds += 1;

        tracing::debug!(
            candidates = self.haystacks.len(),
            rebuilds = self.rebuilds,
            "fuzzy index rebuilt"
        );
        true
    }

    /// Forces the next [`sync`](Self::sync) to re-index.
    pub fn invalidate(&mut self) {
        self.candidates = Rc::from(Vec::new());
        self.texts.clear();
        self.haystacks.clear();
    }

    /// Options matching `query`, best match first. Ties keep list order.
    pub fn search(&mut self, query: &str) -> Vec<SelectOption<V>> {
        self.queries += 1;

        if query.trim().is_empty() {
            return self.candidates.to_vec();
        }

        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let lowercase_query = query.to_lowercase();

        let mut matches: Vec<(usize, bool, u32)> = self
            .haystacks
            .iter()
            .enumerate()
            .filter_map(|(index, haystack)| {
                let score = pattern.score(haystack.slice(..), &mut self.matcher)?;
                if score < self.config.min_score {
                    return None;
                }

                let prefix = self.config.prefer_prefix
                    && self.texts[index]
                        .to_lowercase()
                        .starts_with(&lowercase_query);

                Some((index, prefix, score))
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));

        matches
            .into_iter()
            .map(|(index, _, _)| self.candidates[index].clone())
            .collect()
    }

    /// Number of times the index was rebuilt.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Number of queries executed.
    pub fn queries(&self) -> usize {
        self.queries
    }
}

/// Identifies one scheduled search. Only the latest ticket is current.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Coalesces bursts of keystrokes into a single trailing search.
///
/// Every keystroke takes a new ticket and arms a timer with it; when a timer
/// fires, only the holder of the current ticket runs the search.
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
}

impl Debouncer {
    pub fn schedule(&mut self) -> SearchTicket {
        self.generation = self.generation.wrapping_add(1);
        SearchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Invalidates every outstanding ticket.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> Rc<[SelectOption<&'static str>]> {
        Rc::from(vec![
            SelectOption::Primitive("pineapple"),
            SelectOption::Primitive("apple"),
            SelectOption::Primitive("banana"),
            SelectOption::labeled("gs", "Granny Smith Apple"),
        ])
    }

    #[test]
    fn test_rebuilds_only_on_new_list() {
        let mut index = FuzzyIndex::new(FuzzyConfig::default());
        let list = fruits();

        assert!(index.sync(&list));
        assert!(!index.sync(&list.clone()));
        assert_eq!(index.rebuilds(), 1);

        let same_content = fruits();
        assert!(index.sync(&same_content), "identity, not content, decides");
        assert_eq!(index.rebuilds(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_and_ranked() {
        let mut index = FuzzyIndex::new(FuzzyConfig::default());
        index.sync(&fruits());

        let results = index.search("APPLE");
        let values: Vec<_> = results.iter().map(|option| *option.value()).collect();

        assert!(values.contains(&"apple"));
        assert!(values.contains(&"pineapple"));
        assert!(values.contains(&"gs"));
        assert!(!values.contains(&"banana"));
    }

    #[test]
    fn test_prefer_prefix() {
        let mut index = FuzzyIndex::new(FuzzyConfig {
            prefer_prefix: true,
            ..Default::default()
        });
        index.sync(&fruits());

        let results = index.search("app");
        assert_eq!(results[0].value(), &"apple");
    }

    #[test]
    fn test_fuzzy_match_tolerates_gaps() {
        let mut index = FuzzyIndex::new(FuzzyConfig::default());
        index.sync(&fruits());

        let results = index.search("bnn");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value(), &"banana");
    }

    #[test]
    fn test_empty_query_returns_candidates() {
        let mut index = FuzzyIndex::new(FuzzyConfig::default());
        index.sync(&fruits());

        assert_eq!(index.search("  ").len(), 4);
        assert_eq!(index.queries(), 1);
    }

    #[test]
    fn test_min_score_filters() {
        let mut index = FuzzyIndex::new(FuzzyConfig {
            min_score: u32::MAX,
            ..Default::default()
        });
        index.sync(&fruits());

        assert!(index.search("apple").is_empty());
    }

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut debouncer = Debouncer::default();

        let a = debouncer.schedule();
        let ap = debouncer.schedule();
        let app = debouncer.schedule();

        assert!(!debouncer.is_current(a));
        assert!(!debouncer.is_current(ap));
        assert!(debouncer.is_current(app));

        debouncer.cancel();
        assert!(!debouncer.is_current(app));
    }
}
