use rust_decimal::Decimal;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

pub type RecordId = String;

/// Identifiers of the LivingApps apps (collections) holding the five entity kinds
pub mod app_ids {
    pub const DOZENTEN: &str = "6985d03078ae9dbf93526dca";
    pub const TEILNEHMER: &str = "6985d030d7588ee37aeb42db";
    pub const RAEUME: &str = "6985d03133bdbb8911d48f57";
    pub const KURSE: &str = "6985d03185d0dda331afe83a";
    pub const ANMELDUNGEN: &str = "6985d031eac4a175430940ce";
}

/// The field set of one entity kind, bound to the app it is stored in.
///
/// All fields of the implementing structs are optional and omitted from the serialized form when
/// absent. Thus, any value of a field struct can be used as a partial update ("patch") of a record.
pub trait RecordFields:
    Serialize + DeserializeOwned + Clone + Debug + Default + PartialEq + Send + Sync + 'static
{
    /// Identifier of the collection (LivingApps app) of this entity kind
    const APP_ID: &'static str;
    /// Human readable name of the collection, used for logging
    const COLLECTION_NAME: &'static str;
}

/// One persisted record of an entity collection
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Record<F> {
    pub record_id: RecordId,
    pub createdat: String,
    #[serde(default)]
    pub updatedat: Option<String>,
    #[serde(default)]
    pub fields: F,
}

pub type Dozent = Record<DozentFields>;
pub type Teilnehmer = Record<TeilnehmerFields>;
pub type Raum = Record<RaumFields>;
pub type Kurs = Record<KursFields>;
pub type Anmeldung = Record<AnmeldungFields>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DozentFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fachgebiet: Option<String>,
}

impl RecordFields for DozentFields {
    const APP_ID: &'static str = app_ids::DOZENTEN;
    const COLLECTION_NAME: &'static str = "Dozenten";
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TeilnehmerFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Calendar date, `YYYY-MM-DD` or ISO timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geburtsdatum: Option<String>,
}

impl RecordFields for TeilnehmerFields {
    const APP_ID: &'static str = app_ids::TEILNEHMER;
    const COLLECTION_NAME: &'static str = "Teilnehmer";
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RaumFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raumname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gebaeude: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub kapazitaet: Option<u32>,
}

impl RecordFields for RaumFields {
    const APP_ID: &'static str = app_ids::RAEUME;
    const COLLECTION_NAME: &'static str = "Raeume";
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct KursFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beschreibung: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startdatum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enddatum: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_teilnehmer: Option<u32>,
    /// Price in EUR, transferred as JSON number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preis: Option<Decimal>,
    /// Reference (record URL) to a record of [app_ids::DOZENTEN]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dozent: Option<String>,
    /// Reference (record URL) to a record of [app_ids::RAEUME]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raum: Option<String>,
}

impl RecordFields for KursFields {
    const APP_ID: &'static str = app_ids::KURSE;
    const COLLECTION_NAME: &'static str = "Kurse";
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AnmeldungFields {
    /// Reference (record URL) to a record of [app_ids::TEILNEHMER]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teilnehmer: Option<String>,
    /// Reference (record URL) to a record of [app_ids::KURSE]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kurs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anmeldedatum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bezahlt: Option<bool>,
}

impl AnmeldungFields {
    /// Field values of a new enrollment: registered today, not paid yet
    pub fn new_enrollment(today: chrono::NaiveDate) -> Self {
        Self {
            anmeldedatum: Some(today.format("%Y-%m-%d").to_string()),
            bezahlt: Some(false),
            ..Default::default()
        }
    }

    /// An absent `bezahlt` flag counts as "not paid"
    pub fn is_paid(&self) -> bool {
        self.bezahlt.unwrap_or(false)
    }
}

impl RecordFields for AnmeldungFields {
    const APP_ID: &'static str = app_ids::ANMELDUNGEN;
    const COLLECTION_NAME: &'static str = "Anmeldungen";
}

/// Deserialize a non-negative whole number, stored as any JSON number.
///
/// Whole-number floats (`20.0`) are accepted. Negative or fractional numbers and values of other
/// types result in None instead of an error, so a single odd record does not spoil its collection.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredNumber {
        Integer(i64),
        Float(f64),
        #[allow(dead_code)]
        Other(IgnoredAny),
    }

    let value = Option::<StoredNumber>::deserialize(deserializer)?;
    Ok(match value {
        Some(StoredNumber::Integer(v)) => u32::try_from(v).ok(),
        Some(StoredNumber::Float(v)) => {
            let whole = v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v);
            whole.then_some(v as u32)
        }
        Some(StoredNumber::Other(_)) | None => None,
    })
}

/// Parse a calendar date from the store's representation.
///
/// Accepts plain dates (`2025-03-01`), local timestamps (`2025-03-01T09:00` with or without
/// seconds) and RFC 3339 timestamps. The time of day is discarded.
pub fn parse_calendar_date(value: &str) -> Option<chrono::NaiveDate> {
    let value = value.trim();
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(value, format).ok())
        .map(|timestamp| timestamp.date())
}
