use crate::dashboard::Snapshots;
use crate::lookup::find_record;
use kursverwaltung_api_types::{Anmeldung, Kurs};
use rust_decimal::Decimal;

/// Number of enrollments not marked as paid (`bezahlt` false or absent)
pub fn count_unpaid(anmeldungen: &[Anmeldung]) -> usize {
    anmeldungen.iter().filter(|a| !a.fields.is_paid()).count()
}

/// Sum of the course prices of all unpaid enrollments.
///
/// Enrollments referencing a course which is not part of the snapshot, and courses without price,
/// contribute zero.
pub fn sum_outstanding(anmeldungen: &[Anmeldung], kurse: &[Kurs]) -> Decimal {
    anmeldungen
        .iter()
        .filter(|a| !a.fields.is_paid())
        .filter_map(|a| find_record(kurse, a.fields.kurs.as_deref()))
        .filter_map(|kurs| kurs.fields.preis)
        .sum()
}

/// The figures of the statistics cards on top of the dashboard
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardStats {
    pub kurse: usize,
    pub dozenten: usize,
    pub teilnehmer: usize,
    pub raeume: usize,
    pub offene_zahlungen: usize,
    pub offener_betrag: Decimal,
}

impl DashboardStats {
    pub fn compute(snapshots: &Snapshots) -> Self {
        Self {
            kurse: snapshots.kurse.len(),
            dozenten: snapshots.dozenten.len(),
            teilnehmer: snapshots.teilnehmer.len(),
            raeume: snapshots.raeume.len(),
            offene_zahlungen: count_unpaid(&snapshots.anmeldungen),
            offener_betrag: sum_outstanding(&snapshots.anmeldungen, &snapshots.kurse),
        }
    }
}
