/*!
 * Query-state codec
 *
 * [`QueryState`] is the immutable set of search, filter and sort selections.
 * It round-trips through a URL query string (`search`, `consultation`,
 * repeated `specialty`, `sort`), and every UI mutation is a pure transition
 * that returns a new state.
 */

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;

use crate::data_types::ConsultationMode;

pub const PARAM_SEARCH: &str = "search";
pub const PARAM_CONSULTATION: &str = "consultation";
pub const PARAM_SPECIALTY: &str = "specialty";
pub const PARAM_SORT: &str = "sort";

/// Sort orders offered by the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending by numeric fee
    Fees,
    /// Descending by years of experience
    Experience,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Fees => "fees",
            SortKey::Experience => "experience",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fees" => Ok(SortKey::Fees),
            "experience" => Ok(SortKey::Experience),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// A consultation radio choice; `All` clears the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationChoice {
    All,
    Mode(ConsultationMode),
}

impl FromStr for ConsultationChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(ConsultationChoice::All)
        } else {
            s.parse().map(ConsultationChoice::Mode)
        }
    }
}

/// Active search, filter and sort selections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search: Option<String>,
    pub consultation: Option<ConsultationMode>,
    /// Selected specialties in selection order
    pub specialties: Vec<String>,
    pub sort: Option<SortKey>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty state
    pub fn clear_all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the search term; an empty term removes it
    pub fn set_search(&self, value: &str) -> Self {
        Self {
            search: if value.is_empty() { None } else { Some(value.to_string()) },
            ..self.clone()
        }
    }

    /// Select a consultation mode, or clear it when it is already selected
    /// or the choice is `All`
    ///
    /// `Unknown` is not selectable and clears the filter like `All`.
    pub fn toggle_consultation(&self, choice: ConsultationChoice) -> Self {
        let consultation = match choice {
            ConsultationChoice::All | ConsultationChoice::Mode(ConsultationMode::Unknown) => None,
            ConsultationChoice::Mode(mode) if self.consultation == Some(mode) => None,
            ConsultationChoice::Mode(mode) => Some(mode),
        };
        Self {
            consultation,
            ..self.clone()
        }
    }

    /// Append a specialty, or remove it while keeping the others in order
    pub fn toggle_specialty(&self, value: &str) -> Self {
        let specialties = if self.specialties.iter().any(|s| s == value) {
            self.specialties.iter().filter(|s| *s != value).cloned().collect()
        } else {
            let mut specialties = self.specialties.clone();
            specialties.push(value.to_string());
            specialties
        };
        Self {
            specialties,
            ..self.clone()
        }
    }

    /// Select a sort order, or clear it when it is already selected
    pub fn toggle_sort(&self, key: SortKey) -> Self {
        Self {
            sort: if self.sort == Some(key) { None } else { Some(key) },
            ..self.clone()
        }
    }

    pub fn has_specialty(&self, value: &str) -> bool {
        self.specialties.iter().any(|s| s == value)
    }

    /// Encode as `key=value` pairs in canonical parameter order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push((PARAM_SEARCH, search.clone()));
        }
        if let Some(mode) = self.consultation {
            pairs.push((PARAM_CONSULTATION, mode.as_str().to_string()));
        }
        for specialty in &self.specialties {
            pairs.push((PARAM_SPECIALTY, specialty.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push((PARAM_SORT, sort.as_str().to_string()));
        }
        pairs
    }

    /// Decode from `key=value` pairs
    ///
    /// Single-valued parameters take their first occurrence. Unknown
    /// parameters and unrecognized consultation or sort values are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        let mut seen_search = false;
        let mut seen_consultation = false;
        let mut seen_sort = false;

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                PARAM_SEARCH if !seen_search => {
                    seen_search = true;
                    if !value.is_empty() {
                        state.search = Some(value.to_string());
                    }
                }
                PARAM_CONSULTATION if !seen_consultation => {
                    seen_consultation = true;
                    match value.parse() {
                        Ok(mode) => state.consultation = Some(mode),
                        Err(e) => debug!(error = %e, "ignoring consultation parameter"),
                    }
                }
                PARAM_SPECIALTY => state.specialties.push(value.to_string()),
                PARAM_SORT if !seen_sort => {
                    seen_sort = true;
                    match value.parse() {
                        Ok(key) => state.sort = Some(key),
                        Err(e) => debug!(error = %e, "ignoring sort parameter"),
                    }
                }
                _ => {}
            }
        }

        state
    }

    /// Encode as a URL query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }

    /// Decode from a URL query string; a leading `?` is accepted
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl FromStr for QueryState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_query_string(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> QueryState {
        QueryState::new()
            .set_search("Anita & co")
            .toggle_consultation(ConsultationChoice::Mode(ConsultationMode::Video))
            .toggle_specialty("General-Physician")
            .toggle_specialty("Dentist")
            .toggle_sort(SortKey::Fees)
    }

    #[test]
    fn test_round_trip() {
        let states = vec![
            QueryState::new(),
            sample_state(),
            QueryState::new().toggle_specialty("ENT").toggle_specialty("Ayurveda"),
            QueryState::new().set_search("ü +%=?").toggle_sort(SortKey::Experience),
        ];
        for state in states {
            let encoded = state.to_query_string();
            assert_eq!(QueryState::from_query_string(&encoded), state, "via {}", encoded);
        }
    }

    #[test]
    fn test_encoding_order() {
        assert_eq!(
            sample_state().to_query_string(),
            "search=Anita+%26+co&consultation=video&specialty=General-Physician&specialty=Dentist&sort=fees"
        );
    }

    #[test]
    fn test_decode_takes_first_single_value() {
        let state = QueryState::from_query_string("?sort=experience&sort=fees&search=a&search=b&consultation=Clinic");
        assert_eq!(state.sort, Some(SortKey::Experience));
        assert_eq!(state.search.as_deref(), Some("a"));
        assert_eq!(state.consultation, Some(ConsultationMode::Clinic));
    }

    #[test]
    fn test_decode_ignores_unknown_values() {
        let state = QueryState::from_query_string("consultation=home&sort=rating&page=2&search=");
        assert!(state.is_empty());

        let state = QueryState::from_query_string("consultation=unknown");
        assert_eq!(state.consultation, None);
        assert!("unknown".parse::<ConsultationChoice>().is_err());

        let video = QueryState::new().toggle_consultation(ConsultationChoice::Mode(ConsultationMode::Video));
        let cleared = video.toggle_consultation(ConsultationChoice::Mode(ConsultationMode::Unknown));
        assert_eq!(cleared.consultation, None);
    }

    #[test]
    fn test_toggle_consultation() {
        let video = ConsultationChoice::Mode(ConsultationMode::Video);
        let clinic = ConsultationChoice::Mode(ConsultationMode::Clinic);
        let state = QueryState::new().toggle_consultation(video);
        assert_eq!(state.consultation, Some(ConsultationMode::Video));
        assert_eq!(state.toggle_consultation(clinic).consultation, Some(ConsultationMode::Clinic));
        assert_eq!(state.toggle_consultation(video).consultation, None);
        assert_eq!(state.toggle_consultation(ConsultationChoice::All).consultation, None);
    }

    #[test]
    fn test_toggle_specialty_twice_restores_order() {
        let state = QueryState::new()
            .toggle_specialty("ENT")
            .toggle_specialty("Dentist")
            .toggle_specialty("Cardiologist");
        let removed = state.toggle_specialty("Dentist");
        assert_eq!(removed.specialties, vec!["ENT", "Cardiologist"]);
        let toggled_twice = state.toggle_specialty("Urologist").toggle_specialty("Urologist");
        assert_eq!(toggled_twice, state);
    }

    #[test]
    fn test_toggle_sort_and_search() {
        let state = QueryState::new().toggle_sort(SortKey::Fees);
        assert_eq!(state.toggle_sort(SortKey::Experience).sort, Some(SortKey::Experience));
        assert_eq!(state.toggle_sort(SortKey::Fees).sort, None);
        assert_eq!(state.set_search("x").set_search("").search, None);
    }

    #[test]
    fn test_transitions_leave_original_untouched() {
        let state = sample_state();
        let before = state.clone();
        let _ = state.toggle_specialty("Dentist");
        let _ = state.toggle_sort(SortKey::Fees);
        assert_eq!(state, before);
        assert!(QueryState::clear_all().is_empty());
    }

    #[test]
    fn test_consultation_choice_parse() {
        assert_eq!("all".parse::<ConsultationChoice>().unwrap(), ConsultationChoice::All);
        assert_eq!(
            "video".parse::<ConsultationChoice>().unwrap(),
            ConsultationChoice::Mode(ConsultationMode::Video)
        );
        assert!("phone".parse::<ConsultationChoice>().is_err());
    }
}
