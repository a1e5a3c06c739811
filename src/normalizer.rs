/*!
 * Normalization of raw directory records
 *
 * Turns loosely structured JSON records into canonical [`Provider`] values.
 * Every field degrades to a default when it is missing or malformed, so a
 * single bad record can never fail the batch.
 */

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::constants::{NO_EXPERIENCE_INFO, PLACEHOLDER_IMAGE, UNKNOWN_PROVIDER_NAME};
use crate::data_types::*;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const GENERATED_ID_LEN: usize = 9;

/// Normalize a batch of raw records, preserving their order
pub fn normalize(raw_records: &[Value]) -> Vec<Provider> {
    let providers: Vec<Provider> = raw_records.iter().map(normalize_record).collect();
    info!(count = providers.len(), "normalized provider records");
    providers
}

/// Normalize one raw record
///
/// Non-object records are treated as an object with no fields and come out
/// as a fully defaulted provider.
pub fn normalize_record(raw: &Value) -> Provider {
    let empty = Map::new();
    let record = raw.as_object().unwrap_or(&empty);
    let field = |name: &str| record.get(name).filter(|v| is_truthy(v));

    let id = match field("id") {
        Some(value) => text_of(value),
        None => {
            let id = generate_id();
            debug!(%id, "record has no id, generated one");
            id
        }
    };

    let name = field("name")
        .map(text_of)
        .unwrap_or_else(|| UNKNOWN_PROVIDER_NAME.to_string());

    let image = field("photo")
        .or_else(|| field("image"))
        .map(text_of)
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let fees = match field("fees") {
        Some(Value::Number(n)) => Fees::Number(n.clone()),
        Some(other) => Fees::Text(text_of(other)),
        None => Fees::default(),
    };

    let experience = field("experience")
        .map(text_of)
        .unwrap_or_else(|| NO_EXPERIENCE_INFO.to_string());

    let clinic = field("clinic").map(|value| match value {
        Value::String(name) => Clinic::Name(name.clone()),
        Value::Object(details) => Clinic::Details(details.clone()),
        other => Clinic::Other(other.clone()),
    });

    let video_consult = field("video_consult").is_some();
    let in_clinic = field("in_clinic").is_some();
    let consultation_mode = match ConsultationMode::from_flags(video_consult, in_clinic) {
        ConsultationMode::Unknown => field("consultationMode")
            .and_then(Value::as_str)
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default(),
        mode => mode,
    };

    Provider {
        id,
        name,
        image,
        specialities: normalize_specialities(record.get("specialities")),
        fees,
        experience,
        clinic,
        consultation_mode,
        video_consult,
        in_clinic,
    }
}

/// Build the specialty list from a sequence, a single scalar, or nothing
pub fn normalize_specialities(raw: Option<&Value>) -> Vec<Speciality> {
    match raw {
        Some(Value::Array(items)) => items.iter().map(speciality_of).collect(),
        Some(value) if is_truthy(value) => vec![speciality_of(value)],
        _ => Vec::new(),
    }
}

fn speciality_of(value: &Value) -> Speciality {
    match value {
        Value::String(name) => Speciality::new(name.as_str()),
        Value::Object(fields) => Speciality::new(fields.get("name").map(text_of).unwrap_or_default()),
        other => Speciality::new(text_of(other)),
    }
}

/// JavaScript-style truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a scalar; composite values fall back to their JSON text
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Random base-36 identifier; uniqueness is best-effort only
fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let raw = json!({
            "id": "111",
            "name": "Dr. Anita Rao",
            "photo": "https://img.test/a.png",
            "specialities": [{"name": "Dentist"}],
            "fees": "₹ 500",
            "experience": "13 Years of experience",
            "clinic": {"name": "Smile Dental", "address": {"locality": "Indiranagar"}},
            "video_consult": true,
            "in_clinic": true
        });
        let provider = normalize_record(&raw);
        assert_eq!(provider.id, "111");
        assert_eq!(provider.name, "Dr. Anita Rao");
        assert_eq!(provider.image, "https://img.test/a.png");
        assert_eq!(provider.specialities, vec![Speciality::new("Dentist")]);
        assert_eq!(provider.fees, Fees::Text("₹ 500".to_string()));
        assert_eq!(provider.consultation_mode, ConsultationMode::Video);
        assert_eq!(provider.clinic_label(), Some("Smile Dental"));
    }

    #[test]
    fn test_empty_record_gets_defaults() {
        let provider = normalize_record(&json!({}));
        assert_eq!(provider.id.len(), GENERATED_ID_LEN);
        assert!(provider.id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        assert_eq!(provider.name, UNKNOWN_PROVIDER_NAME);
        assert_eq!(provider.image, PLACEHOLDER_IMAGE);
        assert!(provider.specialities.is_empty());
        assert_eq!(provider.fees, Fees::Text("0".to_string()));
        assert_eq!(provider.experience, NO_EXPERIENCE_INFO);
        assert_eq!(provider.clinic, None);
        assert_eq!(provider.consultation_mode, ConsultationMode::Unknown);
    }

    #[test]
    fn test_non_object_record_does_not_fail() {
        let provider = normalize_record(&json!("just a string"));
        assert_eq!(provider.name, UNKNOWN_PROVIDER_NAME);
    }

    #[test]
    fn test_falsy_values_default() {
        let provider = normalize_record(&json!({
            "id": "",
            "name": null,
            "fees": 0,
            "experience": "",
            "clinic": "",
            "video_consult": false
        }));
        assert_eq!(provider.name, UNKNOWN_PROVIDER_NAME);
        assert_eq!(provider.fees, Fees::Text("0".to_string()));
        assert_eq!(provider.experience, NO_EXPERIENCE_INFO);
        assert_eq!(provider.clinic, None);
        assert!(!provider.video_consult);
        assert!(!provider.id.is_empty());
    }

    #[test]
    fn test_clinic_passed_through() {
        let flag = normalize_record(&json!({"clinic": true}));
        assert_eq!(flag.clinic, Some(Clinic::Other(json!(true))));
        assert_eq!(flag.clinic_label(), Some("Clinic"));

        let list = normalize_record(&json!({"clinic": ["Adyar", "Velachery"]}));
        assert_eq!(list.clinic, Some(Clinic::Other(json!(["Adyar", "Velachery"]))));
        assert_eq!(list.clinic_label(), Some("Clinic"));

        let named = normalize_record(&json!({"clinic": "Downtown"}));
        assert_eq!(named.clinic, Some(Clinic::Name("Downtown".to_string())));
    }

    #[test]
    fn test_numeric_fields_kept() {
        let provider = normalize_record(&json!({"id": 42, "fees": 700, "in_clinic": true}));
        assert_eq!(provider.id, "42");
        assert_eq!(provider.fees, Fees::Number(700.into()));
        assert_eq!(provider.consultation_mode, ConsultationMode::Clinic);
    }

    #[test]
    fn test_speciality_shapes() {
        let strings = normalize_specialities(Some(&json!(["Dentist", "ENT"])));
        assert_eq!(strings, vec![Speciality::new("Dentist"), Speciality::new("ENT")]);

        let mixed = normalize_specialities(Some(&json!([{"name": "Cardiologist"}, "Neurologist"])));
        assert_eq!(mixed, vec![Speciality::new("Cardiologist"), Speciality::new("Neurologist")]);

        let scalar = normalize_specialities(Some(&json!("Dermatologist")));
        assert_eq!(scalar, vec![Speciality::new("Dermatologist")]);

        let number = normalize_specialities(Some(&json!(7)));
        assert_eq!(number, vec![Speciality::new("7")]);

        assert!(normalize_specialities(None).is_empty());
        assert!(normalize_specialities(Some(&json!(""))).is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raws = vec![
            json!({"name": "A", "fees": 300, "video_consult": true, "specialities": "ENT"}),
            json!({"id": "x", "clinic": "Downtown", "in_clinic": true, "fees": "₹ 800"}),
            json!({"consultationMode": "clinic"}),
            json!({}),
        ];
        for provider in normalize(&raws) {
            let again = normalize_record(&serde_json::to_value(&provider).unwrap());
            assert_eq!(again, provider);
        }
    }

    #[test]
    fn test_generated_ids_differ() {
        let providers = normalize(&[json!({}), json!({})]);
        assert_ne!(providers[0].id, providers[1].id);
    }
}
