/*!
 * Filter and sort engine
 *
 * Derives the visible provider list from the canonical list and a
 * [`QueryState`]. Stages run in a fixed order (search, consultation,
 * specialty, sort); each keeps canonical relative order, and sorting is
 * stable. Malformed data never raises: it is filtered out or coerced to zero.
 */

use std::cmp::Reverse;
use regex::Regex;
use tracing::debug;

use crate::data_types::*;
use crate::query::{QueryState, SortKey};

lazy_static::lazy_static! {
    static ref FIRST_INTEGER: Regex = Regex::new(r"[0-9]+").expect("valid integer pattern");
}

/// Derive the filtered and sorted view for a query
///
/// Always returns a fresh list; `providers` is never modified.
pub fn derive_view(providers: &[Provider], query: &QueryState) -> Vec<Provider> {
    let mut view = ViewBuilder::new(providers);
    if let Some(term) = query.search.as_deref() {
        view = view.search(term);
    }
    if let Some(mode) = query.consultation {
        view = view.consultation(mode);
    }
    view = view.specialties(&query.specialties);
    if let Some(key) = query.sort {
        view = view.sort_by(key);
    }

    let result = view.execute();
    debug!(total = providers.len(), shown = result.len(), query = %query, "derived view");
    result
}

/// Builder for a filtered, optionally sorted provider view
pub struct ViewBuilder<'a> {
    providers: &'a [Provider],
    filters: Vec<Box<dyn Fn(&Provider) -> bool + 'a>>,
    sort: Option<SortKey>,
}

impl<'a> ViewBuilder<'a> {
    /// Create a new builder over the canonical list
    pub fn new(providers: &'a [Provider]) -> Self {
        Self {
            providers,
            filters: Vec::new(),
            sort: None,
        }
    }

    /// Keep providers whose name contains `term`, ignoring case
    pub fn search(mut self, term: &str) -> Self {
        if term.is_empty() {
            return self;
        }
        let term_lower = term.to_lowercase();
        self.filters.push(Box::new(move |p| p.name.to_lowercase().contains(&term_lower)));
        self
    }

    /// Keep providers consulted in the given mode
    pub fn consultation(mut self, mode: ConsultationMode) -> Self {
        self.filters.push(Box::new(move |p| matches_consultation(p, mode)));
        self
    }

    /// Keep providers matching any of the selected specialties
    pub fn specialties(mut self, selected: &'a [String]) -> Self {
        if selected.is_empty() {
            return self;
        }
        self.filters.push(Box::new(move |p| {
            selected.iter().any(|wanted| {
                p.specialities.iter().any(|own| specialty_matches(wanted, &own.name))
            })
        }));
        self
    }

    /// Sort the result by the given key
    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    /// Execute the filters and sort, returning owned copies
    pub fn execute(self) -> Vec<Provider> {
        let mut result: Vec<Provider> = self.providers.iter()
            .filter(|provider| self.filters.iter().all(|filter| filter(provider)))
            .cloned()
            .collect();

        // sort_by_key is stable: ties keep canonical order
        match self.sort {
            Some(SortKey::Fees) => result.sort_by_key(|p| fee_amount(&p.fees)),
            Some(SortKey::Experience) => result.sort_by_key(|p| Reverse(experience_years(&p.experience))),
            None => {}
        }
        result
    }
}

/// Consultation predicate with the legacy flag fallback
///
/// A provider whose mode is not settled (`Unknown`) still matches when the
/// corresponding source flag is set.
pub fn matches_consultation(provider: &Provider, wanted: ConsultationMode) -> bool {
    if provider.consultation_mode == wanted {
        return true;
    }
    if provider.consultation_mode != ConsultationMode::Unknown {
        return false;
    }
    match wanted {
        ConsultationMode::Video => provider.video_consult,
        ConsultationMode::Clinic => provider.in_clinic,
        ConsultationMode::Unknown => false,
    }
}

/// Whether a selected specialty matches one of a provider's specialties
///
/// Both sides are lower-cased with hyphens read as spaces. They match when
/// equal, when either contains the other, or when their slugs are equal.
///
/// A blank name on either side never matches.
pub fn specialty_matches(selected: &str, own: &str) -> bool {
    let selected = loosen(selected);
    let own = loosen(own);
    if selected.trim().is_empty() || own.trim().is_empty() {
        return false;
    }
    selected == own
        || own.contains(&selected)
        || selected.contains(&own)
        || slug(&own) == slug(&selected)
}

fn loosen(name: &str) -> String {
    name.to_lowercase().replace('-', " ")
}

fn slug(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Numeric fee used for sorting
///
/// Text keeps only its digits; numbers are truncated. No digits means 0.
pub fn fee_amount(fees: &Fees) -> i64 {
    match fees {
        Fees::Text(text) => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                0
            } else {
                digits.parse().unwrap_or(i64::MAX)
            }
        }
        Fees::Number(n) => n.as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
    }
}

/// Years of experience: the first integer anywhere in the text, else 0
pub fn experience_years(experience: &str) -> u64 {
    FIRST_INTEGER
        .find(experience)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Autocomplete suggestions for a partially typed search term
///
/// Returns at most `limit` providers, in canonical order, whose name contains
/// `input` ignoring case. Empty input gives no suggestions.
pub fn suggest<'a>(providers: &'a [Provider], input: &str, limit: usize) -> Vec<&'a Provider> {
    if input.is_empty() {
        return Vec::new();
    }
    let input_lower = input.to_lowercase();
    providers.iter()
        .filter(|p| p.name.to_lowercase().contains(&input_lower))
        .take(limit)
        .collect()
}
