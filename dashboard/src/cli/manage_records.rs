use crate::cli::tables::{render_stats, render_tab};
use crate::cli::util::{
    query_user, query_user_and_check, query_user_bool, query_user_if_changed, query_user_optional,
    CalendarDate, Optional, RequiredText,
};
use crate::cli_error::CliError;
use crate::dashboard::{Dashboard, DashboardError, Dialog, Editing, FormData, Snapshots, Tab};
use crate::formatting::{
    format_date, format_optional_number, format_optional_text, format_payment_status, format_price,
};
use crate::gateway::living_apps::LivingAppsGateway;
use crate::gateway::get_gateway_from_env;
use crate::lookup::{kurs_titel, resolve_name, teilnehmer_name};
use crate::record_ref::create_record_url;
use crate::stats::DashboardStats;
use kursverwaltung_api_types::{
    AnmeldungFields, DozentFields, KursFields, RaumFields, Record, RecordFields, TeilnehmerFields,
};
use rust_decimal::Decimal;

async fn load_dashboard() -> Result<Dashboard<LivingAppsGateway>, CliError> {
    let gateway = get_gateway_from_env()?;
    let mut dashboard = Dashboard::new(gateway);
    dashboard.reload().await?;
    Ok(dashboard)
}

pub async fn print_overview() -> Result<(), CliError> {
    let dashboard = load_dashboard().await?;
    let snapshots = dashboard.state().snapshots();
    println!("{}", render_stats(&DashboardStats::compute(&snapshots)));
    println!();
    println!("{}:", Tab::Kurse.title());
    println!("{}", render_tab(Tab::Kurse, &snapshots));
    Ok(())
}

pub async fn print_record_list(tab: Tab) -> Result<(), CliError> {
    let dashboard = load_dashboard().await?;
    println!("{}:", tab.title());
    println!("{}", render_tab(tab, &dashboard.state().snapshots()));
    Ok(())
}

pub async fn add_record(tab: Tab) -> Result<(), CliError> {
    let mut dashboard = load_dashboard().await?;
    dashboard.select_tab(tab);
    dashboard.open_add_dialog();
    println!("Neuen Eintrag anlegen: {}", tab.entity_name());

    let initial = FormData::new_for(tab, chrono::Local::now().date_naive());
    query_and_submit(&mut dashboard, initial, false).await
}

pub async fn edit_record(tab: Tab, record_id: &str) -> Result<(), CliError> {
    let mut dashboard = load_dashboard().await?;
    dashboard.open_edit_dialog(tab, record_id)?;
    let Dialog::Editing(editing) = dashboard.state().dialog().clone() else {
        return Err(CliError::DataError(
            "Record with given id does not exist".to_string(),
        ));
    };
    let snapshots = dashboard.state().snapshots();
    println!("Bearbeite {}", describe_record(&editing, &snapshots));

    query_and_submit(&mut dashboard, FormData::from_editing(&editing), true).await
}

/// Query the form of the open dialog and submit it. Invalid input can be corrected (asking field
/// by field whether to change the previous input) or the dialog is closed without saving.
async fn query_and_submit(
    dashboard: &mut Dashboard<LivingAppsGateway>,
    mut form: FormData,
    mut editing: bool,
) -> Result<(), CliError> {
    loop {
        form = query_form(form, &dashboard.state().snapshots(), editing);
        match dashboard.submit(form.clone()).await {
            Ok(()) => {
                println!("Success.");
                return Ok(());
            }
            Err(DashboardError::InvalidData(e)) => {
                println!("{}", e);
                if !query_user_bool("Erneut versuchen?", Some(true)) {
                    dashboard.close_dialog();
                    println!("Abgebrochen, nichts gespeichert.");
                    return Ok(());
                }
                editing = true;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

pub async fn delete_record(tab: Tab, record_id: &str) -> Result<(), CliError> {
    let mut dashboard = load_dashboard().await?;
    let snapshots = dashboard.state().snapshots();
    let editing = Editing::find(&snapshots, tab, record_id).ok_or(CliError::DataError(
        "Record with given id does not exist".to_string(),
    ))?;
    println!("Lösche {}", describe_record(&editing, &snapshots));

    let confirm = query_user_bool("Möchten Sie diesen Eintrag wirklich löschen?", None);
    if confirm {
        dashboard.delete(tab, record_id).await?;
        println!("Success.");
    }
    Ok(())
}

pub async fn toggle_payment(record_id: &str) -> Result<(), CliError> {
    let mut dashboard = load_dashboard().await?;
    dashboard.toggle_bezahlt(record_id).await?;
    let snapshots = dashboard.state().snapshots();
    if let Some(anmeldung) = snapshots
        .anmeldungen
        .iter()
        .find(|a| a.record_id == record_id)
    {
        println!(
            "Anmeldung von {} zu {} ist jetzt: {}",
            teilnehmer_name(&snapshots.teilnehmer, anmeldung.fields.teilnehmer.as_deref()),
            kurs_titel(&snapshots.kurse, anmeldung.fields.kurs.as_deref()),
            format_payment_status(anmeldung.fields.is_paid())
        );
    }
    Ok(())
}

fn describe_record(editing: &Editing, snapshots: &Snapshots) -> String {
    let name = match editing {
        Editing::Kurs(r) => format_optional_text(r.fields.titel.as_deref()),
        Editing::Dozent(r) => format_optional_text(r.fields.name.as_deref()),
        Editing::Teilnehmer(r) => format_optional_text(r.fields.name.as_deref()),
        Editing::Raum(r) => format_optional_text(r.fields.raumname.as_deref()),
        Editing::Anmeldung(r) => format!(
            "{} / {}",
            teilnehmer_name(&snapshots.teilnehmer, r.fields.teilnehmer.as_deref()),
            kurs_titel(&snapshots.kurse, r.fields.kurs.as_deref())
        ),
    };
    format!(
        "{} {} ({})",
        editing.tab().entity_name(),
        editing.record_id(),
        name
    )
}

fn query_form(form: FormData, snapshots: &Snapshots, editing: bool) -> FormData {
    match form {
        FormData::Kurs(fields) => FormData::Kurs(query_kurs(fields, snapshots, editing)),
        FormData::Dozent(fields) => FormData::Dozent(query_dozent(fields, editing)),
        FormData::Teilnehmer(fields) => FormData::Teilnehmer(query_teilnehmer(fields, editing)),
        FormData::Raum(fields) => FormData::Raum(query_raum(fields, editing)),
        FormData::Anmeldung(fields) => {
            FormData::Anmeldung(query_anmeldung(fields, snapshots, editing))
        }
    }
}

/// Query a field value. When editing, the user is first asked whether to change the current value.
fn ask<T, Q>(editing: bool, label: &str, current_display: String, current: T, query: Q) -> T
where
    Q: FnOnce() -> T,
{
    if editing {
        query_user_if_changed(&format!("{} [{}]", label, current_display), current, query)
    } else {
        query()
    }
}

fn ask_required_text(editing: bool, label: &str, current: Option<String>) -> Option<String> {
    let current_display = format_optional_text(current.as_deref());
    ask(editing, label, current_display, current, || {
        Some(query_user::<RequiredText>(label).0)
    })
}

fn ask_optional_text(editing: bool, label: &str, current: Option<String>) -> Option<String> {
    let current_display = format_optional_text(current.as_deref());
    ask(editing, label, current_display, current, || {
        query_user_optional::<String>(label)
    })
}

fn ask_date(editing: bool, label: &str, required: bool, current: Option<String>) -> Option<String> {
    let current_display = format_date(current.as_deref());
    let prompt = format!("{} (YYYY-MM-DD)", label);
    ask(editing, label, current_display, current, || {
        if required {
            Some(query_user::<CalendarDate>(&prompt).0)
        } else {
            query_user_optional::<CalendarDate>(&prompt).map(|d| d.0)
        }
    })
}

/// Let the user select a record of the snapshot by its id and return the reference to it
fn ask_reference<F: RecordFields>(
    editing: bool,
    label: &str,
    required: bool,
    current: Option<String>,
    snapshot: &[Record<F>],
    name_field: fn(&F) -> Option<&str>,
) -> Option<String> {
    let current_display = resolve_name(snapshot, current.as_deref(), name_field);
    ask(editing, label, current_display, current, || {
        println!("Verfügbar:");
        for record in snapshot {
            println!(
                "  {}: {}",
                record.record_id,
                format_optional_text(name_field(&record.fields))
            );
        }
        let prompt = if required {
            format!("{} (ID)", label)
        } else {
            format!("{} (ID, leer lassen für keine Auswahl)", label)
        };
        let record_id = query_user_and_check::<Optional<String>, _, _>(&prompt, |value| {
            match &value.0 {
                None if required => Err("Value is required."),
                None => Ok(()),
                Some(id) if snapshot.iter().any(|r| &r.record_id == id) => Ok(()),
                Some(_) => Err("No record with this id."),
            }
        })
        .0;
        record_id.map(|id| create_record_url(F::APP_ID, &id))
    })
}

fn query_kurs(fields: KursFields, snapshots: &Snapshots, editing: bool) -> KursFields {
    let titel = ask_required_text(editing, "Titel", fields.titel);
    let beschreibung = ask_optional_text(editing, "Beschreibung", fields.beschreibung);
    let startdatum = ask_date(editing, "Startdatum", true, fields.startdatum);
    let enddatum = ask_date(editing, "Enddatum", true, fields.enddatum);
    let max_teilnehmer = ask(
        editing,
        "Max. Teilnehmer",
        format_optional_number(fields.max_teilnehmer),
        fields.max_teilnehmer,
        || query_user_optional::<u32>("Max. Teilnehmer"),
    );
    let preis = ask(
        editing,
        "Preis (EUR)",
        format_price(fields.preis),
        fields.preis,
        || query_user_optional::<Decimal>("Preis (EUR)"),
    );
    let dozent = ask_reference(
        editing,
        "Dozent",
        true,
        fields.dozent,
        &snapshots.dozenten,
        |d| d.name.as_deref(),
    );
    let raum = ask_reference(
        editing,
        "Raum",
        false,
        fields.raum,
        &snapshots.raeume,
        |r| r.raumname.as_deref(),
    );
    KursFields {
        titel,
        beschreibung,
        startdatum,
        enddatum,
        max_teilnehmer,
        preis,
        dozent,
        raum,
    }
}

fn query_dozent(fields: DozentFields, editing: bool) -> DozentFields {
    DozentFields {
        name: ask_required_text(editing, "Name", fields.name),
        email: ask_required_text(editing, "E-Mail", fields.email),
        phone: ask_optional_text(editing, "Telefon", fields.phone),
        fachgebiet: ask_optional_text(editing, "Fachgebiet", fields.fachgebiet),
    }
}

fn query_teilnehmer(fields: TeilnehmerFields, editing: bool) -> TeilnehmerFields {
    TeilnehmerFields {
        name: ask_required_text(editing, "Name", fields.name),
        email: ask_required_text(editing, "E-Mail", fields.email),
        phone: ask_optional_text(editing, "Telefon", fields.phone),
        geburtsdatum: ask_date(editing, "Geburtsdatum", false, fields.geburtsdatum),
    }
}

fn query_raum(fields: RaumFields, editing: bool) -> RaumFields {
    RaumFields {
        raumname: ask_required_text(editing, "Raumname", fields.raumname),
        gebaeude: ask_optional_text(editing, "Gebäude", fields.gebaeude),
        kapazitaet: ask(
            editing,
            "Kapazität",
            format_optional_number(fields.kapazitaet),
            fields.kapazitaet,
            || query_user_optional::<u32>("Kapazität"),
        ),
    }
}

fn query_anmeldung(
    fields: AnmeldungFields,
    snapshots: &Snapshots,
    editing: bool,
) -> AnmeldungFields {
    let bezahlt = fields.is_paid();
    let teilnehmer = ask_reference(
        editing,
        "Teilnehmer",
        true,
        fields.teilnehmer,
        &snapshots.teilnehmer,
        |t| t.name.as_deref(),
    );
    let kurs = ask_reference(
        editing,
        "Kurs",
        true,
        fields.kurs,
        &snapshots.kurse,
        |k| k.titel.as_deref(),
    );
    // Prefilled with today for new enrollments
    let anmeldedatum = ask_date(true, "Anmeldedatum", true, fields.anmeldedatum);
    let bezahlt = Some(query_user_bool("Bezahlt?", Some(bezahlt)));
    AnmeldungFields {
        teilnehmer,
        kurs,
        anmeldedatum,
        bezahlt,
    }
}
