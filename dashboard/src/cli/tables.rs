//! Rendering of the dashboard's tabs and statistics as terminal tables

use crate::dashboard::{Snapshots, Tab};
use crate::formatting::{
    format_amount, format_date, format_optional_number, format_optional_text,
    format_payment_status, format_period, format_price,
};
use crate::lookup::{dozent_name, kurs_titel, raum_name, teilnehmer_name};
use crate::stats::DashboardStats;
use comfy_table::{ContentArrangement, Table};

fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_header(header)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_stats(stats: &DashboardStats) -> String {
    let mut table = new_table(["Kurse", "Dozenten", "Teilnehmer", "Räume", "Offene Zahlungen"]);
    table.add_row([
        stats.kurse.to_string(),
        stats.dozenten.to_string(),
        stats.teilnehmer.to_string(),
        stats.raeume.to_string(),
        format!(
            "{} ({})",
            stats.offene_zahlungen,
            format_amount(stats.offener_betrag)
        ),
    ]);
    table.to_string()
}

/// Render the records of the tab, with all references resolved to display names
pub fn render_tab(tab: Tab, snapshots: &Snapshots) -> String {
    let table = match tab {
        Tab::Kurse => kurse_table(snapshots),
        Tab::Dozenten => dozenten_table(snapshots),
        Tab::Teilnehmer => teilnehmer_table(snapshots),
        Tab::Raeume => raeume_table(snapshots),
        Tab::Anmeldungen => anmeldungen_table(snapshots),
    };
    match table {
        Some(table) => table.to_string(),
        None => format!("Noch keine {} vorhanden", tab.title()),
    }
}

fn kurse_table(snapshots: &Snapshots) -> Option<Table> {
    if snapshots.kurse.is_empty() {
        return None;
    }
    let mut table = new_table([
        "ID", "Titel", "Dozent", "Raum", "Zeitraum", "Max. TN", "Preis",
    ]);
    table.add_rows(snapshots.kurse.iter().map(|kurs| {
        let fields = &kurs.fields;
        [
            kurs.record_id.clone(),
            fields.titel.clone().unwrap_or_default(),
            dozent_name(&snapshots.dozenten, fields.dozent.as_deref()),
            raum_name(&snapshots.raeume, fields.raum.as_deref()),
            format_period(fields.startdatum.as_deref(), fields.enddatum.as_deref()),
            format_optional_number(fields.max_teilnehmer),
            format_price(fields.preis),
        ]
    }));
    Some(table)
}

fn dozenten_table(snapshots: &Snapshots) -> Option<Table> {
    if snapshots.dozenten.is_empty() {
        return None;
    }
    let mut table = new_table(["ID", "Name", "E-Mail", "Telefon", "Fachgebiet"]);
    table.add_rows(snapshots.dozenten.iter().map(|dozent| {
        let fields = &dozent.fields;
        [
            dozent.record_id.clone(),
            fields.name.clone().unwrap_or_default(),
            fields.email.clone().unwrap_or_default(),
            format_optional_text(fields.phone.as_deref()),
            format_optional_text(fields.fachgebiet.as_deref()),
        ]
    }));
    Some(table)
}

fn teilnehmer_table(snapshots: &Snapshots) -> Option<Table> {
    if snapshots.teilnehmer.is_empty() {
        return None;
    }
    let mut table = new_table(["ID", "Name", "E-Mail", "Telefon", "Geburtsdatum"]);
    table.add_rows(snapshots.teilnehmer.iter().map(|tn| {
        let fields = &tn.fields;
        [
            tn.record_id.clone(),
            fields.name.clone().unwrap_or_default(),
            fields.email.clone().unwrap_or_default(),
            format_optional_text(fields.phone.as_deref()),
            format_date(fields.geburtsdatum.as_deref()),
        ]
    }));
    Some(table)
}

fn raeume_table(snapshots: &Snapshots) -> Option<Table> {
    if snapshots.raeume.is_empty() {
        return None;
    }
    let mut table = new_table(["ID", "Raumname", "Gebäude", "Kapazität"]);
    table.add_rows(snapshots.raeume.iter().map(|raum| {
        let fields = &raum.fields;
        [
            raum.record_id.clone(),
            fields.raumname.clone().unwrap_or_default(),
            format_optional_text(fields.gebaeude.as_deref()),
            format_optional_number(fields.kapazitaet),
        ]
    }));
    Some(table)
}

fn anmeldungen_table(snapshots: &Snapshots) -> Option<Table> {
    if snapshots.anmeldungen.is_empty() {
        return None;
    }
    let mut table = new_table(["ID", "Teilnehmer", "Kurs", "Anmeldedatum", "Status"]);
    table.add_rows(snapshots.anmeldungen.iter().map(|anmeldung| {
        let fields = &anmeldung.fields;
        [
            anmeldung.record_id.clone(),
            teilnehmer_name(&snapshots.teilnehmer, fields.teilnehmer.as_deref()),
            kurs_titel(&snapshots.kurse, fields.kurs.as_deref()),
            format_date(fields.anmeldedatum.as_deref()),
            format_payment_status(fields.is_paid()).to_owned(),
        ]
    }));
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_ref::create_record_url;
    use kursverwaltung_api_types::{app_ids, AnmeldungFields, KursFields, Record};
    use rust_decimal::Decimal;

    fn record<F>(record_id: &str, fields: F) -> Record<F> {
        Record {
            record_id: record_id.to_string(),
            createdat: "2025-01-01T00:00:00".to_string(),
            updatedat: None,
            fields,
        }
    }

    #[test]
    fn test_empty_tabs() {
        let snapshots = Snapshots::default();
        assert_eq!(
            render_tab(Tab::Kurse, &snapshots),
            "Noch keine Kurse vorhanden"
        );
        assert_eq!(
            render_tab(Tab::Raeume, &snapshots),
            "Noch keine Räume vorhanden"
        );
    }

    #[test]
    fn test_render_with_resolved_references() {
        let snapshots = Snapshots {
            kurse: vec![record(
                "c1",
                KursFields {
                    titel: Some("Töpfern".to_string()),
                    startdatum: Some("2025-03-01".to_string()),
                    enddatum: Some("2025-03-15".to_string()),
                    preis: Some(Decimal::new(4990, 2)),
                    dozent: Some(create_record_url(app_ids::DOZENTEN, "ghost")),
                    ..Default::default()
                },
            )],
            anmeldungen: vec![record(
                "a1",
                AnmeldungFields {
                    kurs: Some(create_record_url(app_ids::KURSE, "c1")),
                    anmeldedatum: Some("2025-02-01".to_string()),
                    ..Default::default()
                },
            )],
            ..Default::default()
        };

        let kurse = render_tab(Tab::Kurse, &snapshots);
        assert!(kurse.contains("Töpfern"));
        assert!(kurse.contains("01.03.2025"));
        assert!(kurse.contains("15.03.2025"));
        assert!(kurse.contains("49.90 €"));

        let anmeldungen = render_tab(Tab::Anmeldungen, &snapshots);
        assert!(anmeldungen.contains("Töpfern"));
        assert!(anmeldungen.contains("01.02.2025"));
        assert!(anmeldungen.contains("Offen"));
    }

    #[test]
    fn test_render_stats() {
        let stats = DashboardStats {
            kurse: 2,
            dozenten: 1,
            teilnehmer: 3,
            raeume: 0,
            offene_zahlungen: 2,
            offener_betrag: Decimal::new(9980, 2),
        };
        assert!(render_stats(&stats).contains("2 (99.80 EUR)"));
    }
}
