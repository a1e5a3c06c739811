/*!
 * Directory session state
 *
 * A session loads the payload once, normalizes it into an immutable
 * [`Directory`], and from then on only derives views from it. [`LoadState`]
 * tracks the one-shot load and [`ViewState`] is what a renderer draws.
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde_json::Value;
use tracing::{error, info};

use crate::config::DirectoryConfig;
use crate::data_types::*;
use crate::engine::{self, derive_view};
use crate::fetch::{self, DirectoryClient};
use crate::normalizer::normalize;
use crate::query::QueryState;
use crate::Result;

/// Where the session payload comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadOrigin {
    /// The configured HTTP endpoint
    Remote,
    /// A local JSON file with the same shape as the HTTP body
    File(PathBuf),
}

/// Builder for loading a directory
///
/// # Example
/// ```no_run
/// # use docdir::directory::DirectoryBuilder;
/// # async fn run() -> docdir::Result<()> {
/// let directory = DirectoryBuilder::new()
///     .input_file("data/doctors.json")
///     .build()
///     .await?;
/// println!("{} providers", directory.len());
/// # Ok(())
/// # }
/// ```
pub struct DirectoryBuilder {
    config: DirectoryConfig,
    origin: PayloadOrigin,
}

impl Default for DirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryBuilder {
    /// Create a builder that fetches from the default endpoint
    pub fn new() -> Self {
        Self {
            config: DirectoryConfig::default(),
            origin: PayloadOrigin::Remote,
        }
    }

    /// Use the given configuration
    pub fn config(mut self, config: DirectoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the endpoint URL
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = url.into();
        self.origin = PayloadOrigin::Remote;
        self
    }

    /// Read the payload from a local file instead of the network
    pub fn input_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.origin = PayloadOrigin::File(path.as_ref().to_path_buf());
        self
    }

    /// Retrieve the raw records without normalizing them
    pub async fn fetch_raw(&self) -> Result<Vec<Value>> {
        match &self.origin {
            PayloadOrigin::Remote => DirectoryClient::new(&self.config)?.load().await,
            PayloadOrigin::File(path) => fetch::load_from_file(path),
        }
    }

    /// Load and normalize the directory
    pub async fn build(self) -> Result<Directory> {
        let raw = self.fetch_raw().await?;
        Ok(Directory::from_raw(&raw))
    }

    /// Run the one-shot load and report its terminal state
    pub async fn load(self) -> LoadState {
        LoadState::from_result(self.fetch_raw().await)
    }
}

/// Canonical provider list for a session
///
/// Built once and never mutated; clones share the same list.
#[derive(Debug, Clone)]
pub struct Directory {
    providers: Arc<[Provider]>,
}

impl Directory {
    /// Wrap already-normalized providers
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers: providers.into(),
        }
    }

    /// Normalize raw records into a directory
    pub fn from_raw(raw: &[Value]) -> Self {
        Self::new(normalize(raw))
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Derive the filtered and sorted view for a query
    pub fn view(&self, query: &QueryState) -> Vec<Provider> {
        derive_view(&self.providers, query)
    }

    /// Autocomplete suggestions for a partial search term
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<&Provider> {
        engine::suggest(&self.providers, input, limit)
    }

    /// Get directory statistics
    pub fn statistics(&self) -> DirectoryStatistics {
        DirectoryStatistics::from_providers(&self.providers)
    }
}

/// One-shot load lifecycle: `Loading` ends in exactly one of the others
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Directory),
    Failed(String),
}

impl LoadState {
    /// Settle the load; normalization runs only on success
    pub fn from_result(result: Result<Vec<Value>>) -> Self {
        match result {
            Ok(raw) => {
                let directory = Directory::from_raw(&raw);
                info!(providers = directory.len(), "directory ready");
                LoadState::Ready(directory)
            }
            Err(e) => {
                error!(error = %e, "failed to load directory");
                LoadState::Failed(e.to_string())
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading)
    }

    pub fn directory(&self) -> Option<&Directory> {
        match self {
            LoadState::Ready(directory) => Some(directory),
            _ => None,
        }
    }

    /// What a renderer should show for the current query
    pub fn view(&self, query: &QueryState) -> ViewState {
        match self {
            LoadState::Loading => ViewState::Loading,
            LoadState::Failed(message) => ViewState::Error(message.clone()),
            LoadState::Ready(directory) => {
                let providers = directory.view(query);
                if providers.is_empty() {
                    ViewState::NoResults
                } else {
                    ViewState::Providers(providers)
                }
            }
        }
    }
}

/// Renderable state of the directory
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    /// Load failed; only the message is shown
    Error(String),
    /// Loaded, but nothing matches the current filters
    NoResults,
    Providers(Vec<Provider>),
}

/// Directory statistics
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryStatistics {
    pub total_providers: usize,
    pub video_providers: usize,
    pub clinic_providers: usize,
    pub unknown_mode_providers: usize,
    /// Specialty name to number of providers listing it
    pub specialty_counts: BTreeMap<String, usize>,
    pub min_fee: Option<i64>,
    pub max_fee: Option<i64>,
}

impl DirectoryStatistics {
    /// Calculate statistics from a provider list
    pub fn from_providers(providers: &[Provider]) -> Self {
        let mut stats = Self {
            total_providers: providers.len(),
            video_providers: 0,
            clinic_providers: 0,
            unknown_mode_providers: 0,
            specialty_counts: BTreeMap::new(),
            min_fee: None,
            max_fee: None,
        };

        for provider in providers {
            match provider.consultation_mode {
                ConsultationMode::Video => stats.video_providers += 1,
                ConsultationMode::Clinic => stats.clinic_providers += 1,
                ConsultationMode::Unknown => stats.unknown_mode_providers += 1,
            }

            for speciality in &provider.specialities {
                *stats.specialty_counts.entry(speciality.name.clone()).or_insert(0) += 1;
            }

            let fee = engine::fee_amount(&provider.fees);
            stats.min_fee = Some(stats.min_fee.map_or(fee, |m| m.min(fee)));
            stats.max_fee = Some(stats.max_fee.map_or(fee, |m| m.max(fee)));
        }

        stats
    }

    /// Print a formatted summary of the statistics
    pub fn print_summary(&self) {
        println!("=== Provider Directory Statistics ===");
        println!("Total Providers: {}", self.total_providers);
        if self.total_providers == 0 {
            return;
        }
        let pct = |n: usize| (n as f64 / self.total_providers as f64) * 100.0;
        println!("  Video: {} ({:.1}%)", self.video_providers, pct(self.video_providers));
        println!("  In-clinic: {} ({:.1}%)", self.clinic_providers, pct(self.clinic_providers));
        println!("  Unspecified: {} ({:.1}%)", self.unknown_mode_providers, pct(self.unknown_mode_providers));
        if let (Some(min), Some(max)) = (self.min_fee, self.max_fee) {
            println!("Fee Range: ₹ {} - ₹ {}", min, max);
        }
        println!("Specialties: {}", self.specialty_counts.len());
        for (name, count) in &self.specialty_counts {
            println!("  {}: {}", name, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DirectoryError;
    use serde_json::json;

    fn raw_records() -> Vec<Value> {
        vec![
            json!({"id": "1", "name": "Anita Rao", "fees": "₹ 500", "video_consult": true,
                   "specialities": [{"name": "Dentist"}]}),
            json!({"id": "2", "name": "Vikram Shah", "fees": 300, "in_clinic": true,
                   "specialities": ["Dentist", "ENT"]}),
            json!({"id": "3", "name": "Meera Nair", "fees": "1200"}),
        ]
    }

    #[test]
    fn test_ready_state_views() {
        let state = LoadState::from_result(Ok(raw_records()));
        assert!(state.is_terminal());

        match state.view(&QueryState::new().set_search("nair")) {
            ViewState::Providers(list) => assert_eq!(list[0].id, "3"),
            other => panic!("unexpected view: {:?}", other),
        }
        assert_eq!(state.view(&QueryState::new().set_search("nobody")), ViewState::NoResults);
    }

    #[test]
    fn test_failed_state_shows_only_error() {
        let err = DirectoryError::http_status(500, "http://x.test");
        let state = LoadState::from_result(Err(err));
        assert!(state.directory().is_none());
        match state.view(&QueryState::new()) {
            ViewState::Error(message) => assert!(message.contains("500")),
            other => panic!("unexpected view: {:?}", other),
        }
        assert_eq!(LoadState::Loading.view(&QueryState::new()), ViewState::Loading);
        assert!(!LoadState::Loading.is_terminal());
    }

    #[test]
    fn test_views_do_not_mutate_directory() {
        let directory = Directory::from_raw(&raw_records());
        let before: Vec<Provider> = directory.providers().to_vec();
        let sorted = directory.view(&QueryState::new().toggle_sort(crate::query::SortKey::Fees));
        assert_eq!(sorted.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["2", "1", "3"]);
        assert_eq!(directory.providers(), before.as_slice());
    }

    #[test]
    fn test_statistics() {
        let stats = Directory::from_raw(&raw_records()).statistics();
        assert_eq!(stats.total_providers, 3);
        assert_eq!(stats.video_providers, 1);
        assert_eq!(stats.clinic_providers, 1);
        assert_eq!(stats.unknown_mode_providers, 1);
        assert_eq!(stats.specialty_counts.get("Dentist"), Some(&2));
        assert_eq!(stats.min_fee, Some(300));
        assert_eq!(stats.max_fee, Some(1200));
    }

    #[tokio::test]
    async fn test_builder_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doctors.json");
        std::fs::write(&path, json!({"doctors": raw_records()}).to_string()).unwrap();

        let directory = DirectoryBuilder::new().input_file(&path).build().await.unwrap();
        assert_eq!(directory.len(), 3);
        assert_eq!(directory.suggest("a", 2).len(), 2);
    }
}
