/*!
 * Data type definitions for directory records
 *
 * The canonical provider record produced by the normalizer. Every field has a
 * settled shape here, so nothing downstream re-inspects raw JSON.
 */

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// How a provider can be consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationMode {
    Video,
    Clinic,
    #[default]
    Unknown,
}

impl ConsultationMode {
    /// Derive the mode from the source flags; video wins when both are set
    pub fn from_flags(video_consult: bool, in_clinic: bool) -> Self {
        if video_consult {
            ConsultationMode::Video
        } else if in_clinic {
            ConsultationMode::Clinic
        } else {
            ConsultationMode::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationMode::Video => "video",
            ConsultationMode::Clinic => "clinic",
            ConsultationMode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConsultationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsultationMode {
    type Err = String;

    /// Case-insensitive parse of the query-string form
    ///
    /// Only `video` and `clinic` are selectable; `unknown` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(ConsultationMode::Video),
            "clinic" => Ok(ConsultationMode::Clinic),
            other => Err(format!("unknown consultation mode '{}'", other)),
        }
    }
}

/// A single specialty entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Speciality {
    pub name: String,
}

impl Speciality {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Consultation fee exactly as the source gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fees {
    Number(Number),
    Text(String),
}

impl Default for Fees {
    fn default() -> Self {
        Fees::Text("0".to_string())
    }
}

impl fmt::Display for Fees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fees::Number(n) => write!(f, "{}", n),
            Fees::Text(s) => f.write_str(s),
        }
    }
}

impl Fees {
    /// Label with the rupee sign, unless the source text already carries one
    pub fn label(&self) -> String {
        match self {
            Fees::Text(s) if s.contains('₹') => s.clone(),
            other => format!("₹ {}", other),
        }
    }
}

/// Clinic information, passed through from the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Clinic {
    Name(String),
    Details(Map<String, Value>),
    /// Any other truthy value, kept as given
    Other(Value),
}

impl Clinic {
    /// Name to show for this clinic
    pub fn label(&self) -> &str {
        match self {
            Clinic::Name(name) => name,
            Clinic::Details(details) => details
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or("Clinic"),
            Clinic::Other(_) => "Clinic",
        }
    }
}

/// Canonical provider record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub image: String,
    pub specialities: Vec<Speciality>,
    pub fees: Fees,
    pub experience: String,
    pub clinic: Option<Clinic>,
    #[serde(rename = "consultationMode")]
    pub consultation_mode: ConsultationMode,
    /// Source flag kept for the consultation filter fallback
    #[serde(default)]
    pub video_consult: bool,
    /// Source flag kept for the consultation filter fallback
    #[serde(default)]
    pub in_clinic: bool,
}

impl Provider {
    /// Whether the provider offers video consultations
    pub fn offers_video(&self) -> bool {
        self.consultation_mode == ConsultationMode::Video || self.video_consult
    }

    /// Specialty names joined for display
    pub fn specialities_label(&self) -> String {
        self.specialities
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn clinic_label(&self) -> Option<&str> {
        self.clinic.as_ref().map(Clinic::label)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {}",
            self.name,
            self.specialities_label(),
            self.experience,
            self.fees.label(),
            self.consultation_mode,
        )?;
        if let Some(clinic) = self.clinic_label() {
            write!(f, " | {}", clinic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_consultation_mode_priority() {
        assert_eq!(ConsultationMode::from_flags(true, true), ConsultationMode::Video);
        assert_eq!(ConsultationMode::from_flags(false, true), ConsultationMode::Clinic);
        assert_eq!(ConsultationMode::from_flags(false, false), ConsultationMode::Unknown);
    }

    #[test]
    fn test_consultation_mode_parse_ignores_case() {
        assert_eq!("VIDEO".parse::<ConsultationMode>().unwrap(), ConsultationMode::Video);
        assert_eq!("Clinic".parse::<ConsultationMode>().unwrap(), ConsultationMode::Clinic);
        assert!("home".parse::<ConsultationMode>().is_err());
        assert!("unknown".parse::<ConsultationMode>().is_err());
    }

    #[test]
    fn test_fee_label() {
        assert_eq!(Fees::Text("₹ 500".to_string()).label(), "₹ 500");
        assert_eq!(Fees::Text("300".to_string()).label(), "₹ 300");
        assert_eq!(Fees::Number(Number::from(450)).label(), "₹ 450");
    }

    #[test]
    fn test_clinic_label() {
        assert_eq!(Clinic::Name("City Care".to_string()).label(), "City Care");
        assert_eq!(Clinic::Other(Value::Bool(true)).label(), "Clinic");
        let details = json!({"name": "Apollo", "address": {"city": "Chennai"}});
        let clinic: Clinic = serde_json::from_value(details).unwrap();
        assert_eq!(clinic.label(), "Apollo");
        let unnamed: Clinic = serde_json::from_value(json!({"address": "x"})).unwrap();
        assert_eq!(unnamed.label(), "Clinic");
    }

    #[test]
    fn test_provider_serializes_camel_case_mode() {
        let provider = Provider {
            id: "a1".to_string(),
            name: "Anita Rao".to_string(),
            image: "img".to_string(),
            specialities: vec![Speciality::new("Dentist"), Speciality::new("ENT")],
            fees: Fees::default(),
            experience: "5 Years".to_string(),
            clinic: None,
            consultation_mode: ConsultationMode::Clinic,
            video_consult: false,
            in_clinic: true,
        };
        let value = serde_json::to_value(&provider).unwrap();
        assert_eq!(value["consultationMode"], "clinic");
        assert_eq!(provider.specialities_label(), "Dentist, ENT");
        assert!(!provider.offers_video());
    }
}
