//! Resolving cross-entity references against in-memory snapshots
//!
//! Lookups are linear scans over the snapshot. Snapshots are rebuilt wholesale on every load, so
//! no index is maintained.

use crate::record_ref::extract_record_id;
use kursverwaltung_api_types::{Dozent, Kurs, Raum, Record, Teilnehmer};

/// Placeholder for names of absent, dangling or unnamed references
pub const NAME_PLACEHOLDER: &str = "-";

/// Find the record referenced by `reference` in the snapshot.
///
/// Returns None if the reference is absent or malformed or if the referenced record is not part of
/// the snapshot (dangling reference).
pub fn find_record<'a, F>(
    snapshot: &'a [Record<F>],
    reference: Option<&str>,
) -> Option<&'a Record<F>> {
    let record_id = extract_record_id(reference)?;
    snapshot.iter().find(|r| r.record_id == record_id)
}

/// Resolve the reference to the display name of the referenced record, given by the `name_field`
/// accessor. Falls back to [NAME_PLACEHOLDER] if the record cannot be found or the name field is
/// absent or empty.
pub fn resolve_name<F, N>(snapshot: &[Record<F>], reference: Option<&str>, name_field: N) -> String
where
    N: Fn(&F) -> Option<&str>,
{
    find_record(snapshot, reference)
        .and_then(|record| name_field(&record.fields))
        .filter(|name| !name.is_empty())
        .unwrap_or(NAME_PLACEHOLDER)
        .to_owned()
}

pub fn dozent_name(dozenten: &[Dozent], reference: Option<&str>) -> String {
    resolve_name(dozenten, reference, |d| d.name.as_deref())
}

pub fn teilnehmer_name(teilnehmer: &[Teilnehmer], reference: Option<&str>) -> String {
    resolve_name(teilnehmer, reference, |t| t.name.as_deref())
}

pub fn raum_name(raeume: &[Raum], reference: Option<&str>) -> String {
    resolve_name(raeume, reference, |r| r.raumname.as_deref())
}

pub fn kurs_titel(kurse: &[Kurs], reference: Option<&str>) -> String {
    resolve_name(kurse, reference, |k| k.titel.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_ref::create_record_url;
    use kursverwaltung_api_types::{app_ids, DozentFields, RaumFields};

    fn dozent(record_id: &str, name: Option<&str>) -> Dozent {
        Record {
            record_id: record_id.to_string(),
            createdat: "2025-01-01T00:00:00".to_string(),
            updatedat: None,
            fields: DozentFields {
                name: name.map(|n| n.to_string()),
                email: Some(format!("{}@example.org", record_id)),
                ..Default::default()
            },
        }
    }

    fn get_test_dozenten() -> Vec<Dozent> {
        vec![
            dozent("d1", Some("Erika Mustermann")),
            dozent("d2", Some("")),
            dozent("d3", None),
            dozent("d4", Some("Max Mustermann")),
        ]
    }

    #[test]
    fn test_resolve_existing_name() {
        let dozenten = get_test_dozenten();
        assert_eq!(
            dozent_name(&dozenten, Some(&create_record_url(app_ids::DOZENTEN, "d1"))),
            "Erika Mustermann"
        );
        assert_eq!(
            dozent_name(&dozenten, Some(&create_record_url(app_ids::DOZENTEN, "d4"))),
            "Max Mustermann"
        );
    }

    #[test]
    fn test_resolve_absent_reference() {
        assert_eq!(dozent_name(&get_test_dozenten(), None), "-");
        assert_eq!(dozent_name(&get_test_dozenten(), Some("")), "-");
        assert_eq!(dozent_name(&[], None), "-");
    }

    #[test]
    fn test_resolve_dangling_or_malformed_reference() {
        let dozenten = get_test_dozenten();
        assert_eq!(
            dozent_name(&dozenten, Some(&create_record_url(app_ids::DOZENTEN, "ghost"))),
            "-"
        );
        assert_eq!(dozent_name(&dozenten, Some("d1")), "-");
    }

    #[test]
    fn test_resolve_empty_name_field() {
        let dozenten = get_test_dozenten();
        assert_eq!(
            dozent_name(&dozenten, Some(&create_record_url(app_ids::DOZENTEN, "d2"))),
            "-"
        );
        assert_eq!(
            dozent_name(&dozenten, Some(&create_record_url(app_ids::DOZENTEN, "d3"))),
            "-"
        );
    }

    #[test]
    fn test_resolve_other_field() {
        let dozenten = get_test_dozenten();
        assert_eq!(
            resolve_name(
                &dozenten,
                Some(&create_record_url(app_ids::DOZENTEN, "d3")),
                |d| d.email.as_deref()
            ),
            "d3@example.org"
        );
    }

    #[test]
    fn test_find_record_ignores_app_id() {
        let raeume = vec![Record {
            record_id: "r1".to_string(),
            createdat: "2025-01-01T00:00:00".to_string(),
            updatedat: None,
            fields: RaumFields {
                raumname: Some("Atelier".to_string()),
                ..Default::default()
            },
        }];
        let found = find_record(&raeume, Some(&create_record_url("someotherapp", "r1")));
        assert_eq!(found.map(|r| r.record_id.as_str()), Some("r1"));
        assert_eq!(
            raum_name(&raeume, Some(&create_record_url(app_ids::RAEUME, "r1"))),
            "Atelier"
        );
    }
}
