/*!
 * # Provider Directory Library
 *
 * Loads a healthcare provider directory from a JSON endpoint, normalizes the
 * loosely structured records, and derives searchable, filterable, sortable
 * views whose state round-trips through a URL query string.
 *
 * ## Features
 *
 * - **Tolerant loading**: bare arrays, `{"doctors": [...]}` or any object
 *   holding an array are all accepted
 * - **Canonical records**: missing or malformed fields fall back to defaults
 *   instead of failing
 * - **Shareable state**: search, consultation, specialty and sort selections
 *   encode to and from a query string
 * - **Deterministic views**: fixed filter order and a stable sort
 *
 * ## Quick Start
 *
 * ```no_run
 * use docdir::prelude::*;
 *
 * # async fn run() -> Result<()> {
 * let directory = DirectoryBuilder::new().build().await?;
 *
 * let query = QueryState::from_query_string("specialty=Dentist&sort=fees");
 * for provider in directory.view(&query) {
 *     println!("{}", provider);
 * }
 * # Ok(())
 * # }
 * ```
 *
 * ## Updating the query
 *
 * Every selection change is a pure transition returning a new state:
 *
 * ```
 * use docdir::prelude::*;
 *
 * let query = QueryState::new()
 *     .set_search("rao")
 *     .toggle_specialty("General-Physician")
 *     .toggle_consultation(ConsultationChoice::Mode(ConsultationMode::Video))
 *     .toggle_sort(SortKey::Experience);
 *
 * assert_eq!(
 *     query.to_query_string(),
 *     "search=rao&consultation=video&specialty=General-Physician&sort=experience"
 * );
 * assert_eq!(QueryState::from_query_string(&query.to_query_string()), query);
 * ```
 *
 * ## Working without the network
 *
 * ```
 * use docdir::prelude::*;
 * use serde_json::json;
 *
 * let raw = extract_records(json!({"doctors": [
 *     {"name": "Anita Rao", "fees": "₹ 500", "video_consult": true},
 *     {"name": "Vikram Shah", "fees": "300", "in_clinic": true},
 * ]})).unwrap();
 * let directory = Directory::from_raw(&raw);
 *
 * let cheapest_first = directory.view(&QueryState::new().toggle_sort(SortKey::Fees));
 * assert_eq!(cheapest_first[0].name, "Vikram Shah");
 * ```
 */

// Re-export error types from root
pub use error::{DirectoryError, Result, ExtractionFailure, PayloadSource, ExportFormat};

// Public modules
pub mod data_types;
pub mod normalizer;
pub mod query;
pub mod engine;
pub mod fetch;
pub mod directory;
pub mod export;
pub mod error;
pub mod config;
pub mod logging;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use docdir::prelude::*;
/// ```
pub mod prelude {
    pub use crate::data_types::*;
    pub use crate::normalizer::normalize;
    pub use crate::query::{QueryState, SortKey, ConsultationChoice};
    pub use crate::engine::{derive_view, suggest, ViewBuilder};
    pub use crate::fetch::{extract_records, load_from_file, DirectoryClient, Payload};
    pub use crate::directory::{Directory, DirectoryBuilder, DirectoryStatistics, LoadState, ViewState};
    pub use crate::export::{ViewExporter, JsonExporter, CsvExporter};
    pub use crate::error::{DirectoryError, Result};
    pub use crate::config::{ConfigBuilder, DirectoryConfig, OutputFormat};
    pub use crate::ExportFormat;
}

/// Directory constants
pub mod constants {
    /// Endpoint serving the provider payload
    pub const DEFAULT_ENDPOINT_URL: &str = "https://srijandubey.github.io/campus-api-mock/SRM-C1-25.json";

    /// Name used when a record has none
    pub const UNKNOWN_PROVIDER_NAME: &str = "Unknown Doctor";

    /// Image used when a record has none
    pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/60";

    /// Experience text used when a record has none
    pub const NO_EXPERIENCE_INFO: &str = "No experience info";

    /// Specialties offered as filters, in display order
    pub const SPECIALTIES: [&str; 24] = [
        "General-Physician",
        "Dentist",
        "Dermatologist",
        "Paediatrician",
        "Gynaecologist",
        "ENT",
        "Diabetologist",
        "Cardiologist",
        "Physiotherapist",
        "Endocrinologist",
        "Orthopaedic",
        "Ophthalmologist",
        "Gastroenterologist",
        "Pulmonologist",
        "Psychiatrist",
        "Urologist",
        "Dietitian-Nutritionist",
        "Psychologist",
        "Sexologist",
        "Nephrologist",
        "Neurologist",
        "Oncologist",
        "Ayurveda",
        "Homeopath",
    ];

    /// Label shown for a catalog specialty (hyphens read as spaces)
    pub fn specialty_label(specialty: &str) -> String {
        specialty.replace('-', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::constants::*;

    #[test]
    fn test_specialty_labels() {
        assert_eq!(specialty_label("General-Physician"), "General Physician");
        assert_eq!(specialty_label("ENT"), "ENT");
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        let unique: std::collections::HashSet<_> = SPECIALTIES.iter().collect();
        assert_eq!(unique.len(), SPECIALTIES.len());
    }
}
