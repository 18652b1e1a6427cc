//! The view controller of the dashboard
//!
//! [DashboardState] holds everything the dashboard displays: the active tab, the open dialog and
//! the snapshots of the five collections. It is only changed through its transition functions.
//! [Dashboard] wires user actions to [RecordGateway] calls. Each successful mutation is followed by
//! a reload of all five collections; the local state is never patched optimistically.

use crate::gateway::{GatewayError, RecordGateway};
use crate::validation::{validate_form, ValidationError};
use kursverwaltung_api_types::{
    Anmeldung, AnmeldungFields, Dozent, DozentFields, Kurs, KursFields, Raum, RaumFields,
    RecordFields, Teilnehmer, TeilnehmerFields,
};
use log::{error, info};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Tab {
    Kurse,
    Dozenten,
    Teilnehmer,
    Raeume,
    Anmeldungen,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Kurse => "Kurse",
            Tab::Dozenten => "Dozenten",
            Tab::Teilnehmer => "Teilnehmer",
            Tab::Raeume => "Räume",
            Tab::Anmeldungen => "Anmeldungen",
        }
    }

    /// Name of a single entity of this tab, as used in dialog titles
    pub fn entity_name(&self) -> &'static str {
        match self {
            Tab::Kurse => "Kurs",
            Tab::Dozenten => "Dozent",
            Tab::Teilnehmer => "Teilnehmer",
            Tab::Raeume => "Raum",
            Tab::Anmeldungen => "Anmeldung",
        }
    }
}

/// The full in-memory copy of all five collections, as loaded together
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshots {
    pub dozenten: Vec<Dozent>,
    pub teilnehmer: Vec<Teilnehmer>,
    pub raeume: Vec<Raum>,
    pub kurse: Vec<Kurs>,
    pub anmeldungen: Vec<Anmeldung>,
}

/// Load the snapshots of all five collections.
///
/// The five requests are issued concurrently. If any of them fails, the whole load fails and no
/// partial result is returned.
pub async fn load_snapshots<G: RecordGateway>(gateway: &G) -> Result<Snapshots, GatewayError> {
    let (dozenten, teilnehmer, raeume, kurse, anmeldungen) = futures::try_join!(
        gateway.list::<DozentFields>(),
        gateway.list::<TeilnehmerFields>(),
        gateway.list::<RaumFields>(),
        gateway.list::<KursFields>(),
        gateway.list::<AnmeldungFields>(),
    )?;
    Ok(Snapshots {
        dozenten,
        teilnehmer,
        raeume,
        kurse,
        anmeldungen,
    })
}

/// The record being edited in the dialog
#[derive(Clone, Debug, PartialEq)]
pub enum Editing {
    Kurs(Kurs),
    Dozent(Dozent),
    Teilnehmer(Teilnehmer),
    Raum(Raum),
    Anmeldung(Anmeldung),
}

impl Editing {
    /// Find the record with the given id in the collection shown on `tab`
    pub fn find(snapshots: &Snapshots, tab: Tab, record_id: &str) -> Option<Self> {
        match tab {
            Tab::Kurse => find_by_id(&snapshots.kurse, record_id).map(Self::Kurs),
            Tab::Dozenten => find_by_id(&snapshots.dozenten, record_id).map(Self::Dozent),
            Tab::Teilnehmer => find_by_id(&snapshots.teilnehmer, record_id).map(Self::Teilnehmer),
            Tab::Raeume => find_by_id(&snapshots.raeume, record_id).map(Self::Raum),
            Tab::Anmeldungen => find_by_id(&snapshots.anmeldungen, record_id).map(Self::Anmeldung),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Editing::Kurs(_) => Tab::Kurse,
            Editing::Dozent(_) => Tab::Dozenten,
            Editing::Teilnehmer(_) => Tab::Teilnehmer,
            Editing::Raum(_) => Tab::Raeume,
            Editing::Anmeldung(_) => Tab::Anmeldungen,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            Editing::Kurs(r) => &r.record_id,
            Editing::Dozent(r) => &r.record_id,
            Editing::Teilnehmer(r) => &r.record_id,
            Editing::Raum(r) => &r.record_id,
            Editing::Anmeldung(r) => &r.record_id,
        }
    }
}

fn find_by_id<F: Clone>(
    snapshot: &[kursverwaltung_api_types::Record<F>],
    record_id: &str,
) -> Option<kursverwaltung_api_types::Record<F>> {
    snapshot.iter().find(|r| r.record_id == record_id).cloned()
}

/// The values entered in a create/edit form
#[derive(Clone, Debug, PartialEq)]
pub enum FormData {
    Kurs(KursFields),
    Dozent(DozentFields),
    Teilnehmer(TeilnehmerFields),
    Raum(RaumFields),
    Anmeldung(AnmeldungFields),
}

impl FormData {
    /// Initial form values for a new record of the given tab
    pub fn new_for(tab: Tab, today: chrono::NaiveDate) -> Self {
        match tab {
            Tab::Kurse => Self::Kurs(KursFields::default()),
            Tab::Dozenten => Self::Dozent(DozentFields::default()),
            Tab::Teilnehmer => Self::Teilnehmer(TeilnehmerFields::default()),
            Tab::Raeume => Self::Raum(RaumFields::default()),
            Tab::Anmeldungen => Self::Anmeldung(AnmeldungFields::new_enrollment(today)),
        }
    }

    /// Initial form values for editing the given record: its current fields
    pub fn from_editing(editing: &Editing) -> Self {
        match editing {
            Editing::Kurs(r) => Self::Kurs(r.fields.clone()),
            Editing::Dozent(r) => Self::Dozent(r.fields.clone()),
            Editing::Teilnehmer(r) => Self::Teilnehmer(r.fields.clone()),
            Editing::Raum(r) => Self::Raum(r.fields.clone()),
            Editing::Anmeldung(r) => Self::Anmeldung(r.fields.clone()),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            FormData::Kurs(_) => Tab::Kurse,
            FormData::Dozent(_) => Tab::Dozenten,
            FormData::Teilnehmer(_) => Tab::Teilnehmer,
            FormData::Raum(_) => Tab::Raeume,
            FormData::Anmeldung(_) => Tab::Anmeldungen,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Dialog {
    Closed,
    Adding(Tab),
    Editing(Editing),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    /// The first load is running, nothing to display yet
    Loading,
    /// The initial load failed; there are no snapshots
    Failed,
    Loaded,
    Mutating,
    /// Reloading after a mutation or on request; the previous snapshots are still displayed
    Reloading,
}

#[derive(Clone, Debug)]
pub struct DashboardState {
    active_tab: Tab,
    phase: LoadPhase,
    dialog: Dialog,
    snapshots: Option<Arc<Snapshots>>,
    last_error: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Kurse,
            phase: LoadPhase::Loading,
            dialog: Dialog::Closed,
            snapshots: None,
            last_error: None,
        }
    }
}

impl DashboardState {
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// The current snapshots. Empty collections, if nothing has been loaded successfully yet.
    pub fn snapshots(&self) -> Arc<Snapshots> {
        self.snapshots.clone().unwrap_or_default()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn load_started(&mut self) {
        self.phase = if self.snapshots.is_some() {
            LoadPhase::Reloading
        } else {
            LoadPhase::Loading
        };
    }

    pub fn load_succeeded(&mut self, snapshots: Snapshots) {
        self.snapshots = Some(Arc::new(snapshots));
        self.phase = LoadPhase::Loaded;
        self.last_error = None;
    }

    /// Keeps the previous snapshots (if any) visible
    pub fn load_failed(&mut self, error: String) {
        self.phase = self.settled_phase();
        self.last_error = Some(error);
    }

    pub fn mutation_started(&mut self) {
        self.phase = LoadPhase::Mutating;
    }

    /// The mutation has been accepted by the record storage. Closes the dialog; the caller must
    /// reload afterwards.
    pub fn mutation_succeeded(&mut self) {
        self.dialog = Dialog::Closed;
        self.last_error = None;
    }

    /// Keeps the dialog open, so the input can be corrected and submitted again
    pub fn mutation_failed(&mut self, error: String) {
        self.phase = self.settled_phase();
        self.last_error = Some(error);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.dialog = Dialog::Closed;
    }

    pub fn open_add_dialog(&mut self) {
        self.dialog = Dialog::Adding(self.active_tab);
    }

    pub fn open_edit_dialog(&mut self, editing: Editing) {
        self.active_tab = editing.tab();
        self.dialog = Dialog::Editing(editing);
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::Closed;
    }

    fn settled_phase(&self) -> LoadPhase {
        if self.snapshots.is_some() {
            LoadPhase::Loaded
        } else {
            LoadPhase::Failed
        }
    }
}

#[derive(Debug)]
pub enum DashboardError {
    Gateway(GatewayError),
    InvalidData(ValidationError),
    /// A form has been submitted, but no create/edit dialog is open
    NoOpenDialog,
    /// The submitted form does not belong to the entity kind of the open dialog
    FormKindMismatch { dialog: Tab, form: Tab },
    /// The record is not part of the current snapshots
    UnknownRecord,
}

impl From<GatewayError> for DashboardError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

impl From<ValidationError> for DashboardError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidData(e)
    }
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gateway(e) => write!(f, "{}", e),
            Self::InvalidData(e) => write!(f, "{}", e),
            Self::NoOpenDialog => f.write_str("No create or edit dialog is open."),
            Self::FormKindMismatch { dialog, form } => write!(
                f,
                "A {} form has been submitted to the {} dialog.",
                form.entity_name(),
                dialog.entity_name()
            ),
            Self::UnknownRecord => f.write_str("Record is not part of the loaded data."),
        }
    }
}

impl std::error::Error for DashboardError {}

pub struct Dashboard<G> {
    gateway: G,
    state: DashboardState,
}

impl<G: RecordGateway> Dashboard<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: DashboardState::default(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.state.select_tab(tab);
    }

    pub fn open_add_dialog(&mut self) {
        self.state.open_add_dialog();
    }

    /// Open the edit dialog for the record with the given id on the given tab
    pub fn open_edit_dialog(&mut self, tab: Tab, record_id: &str) -> Result<(), DashboardError> {
        let editing = Editing::find(&self.state.snapshots(), tab, record_id)
            .ok_or(DashboardError::UnknownRecord)?;
        self.state.open_edit_dialog(editing);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.state.close_dialog();
    }

    /// Reload all five collections from the record storage.
    ///
    /// On failure, the previous snapshots are kept and the error is recorded in the state.
    pub async fn reload(&mut self) -> Result<(), GatewayError> {
        self.state.load_started();
        match load_snapshots(&self.gateway).await {
            Ok(snapshots) => {
                info!(
                    "Loaded {} Kurse, {} Dozenten, {} Teilnehmer, {} Räume, {} Anmeldungen",
                    snapshots.kurse.len(),
                    snapshots.dozenten.len(),
                    snapshots.teilnehmer.len(),
                    snapshots.raeume.len(),
                    snapshots.anmeldungen.len()
                );
                self.state.load_succeeded(snapshots);
                Ok(())
            }
            Err(e) => {
                error!("Error loading data: {}", e);
                self.state.load_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Submit the form of the open dialog: create a new record or update the edited one.
    pub async fn submit(&mut self, form: FormData) -> Result<(), DashboardError> {
        let (dialog_tab, record_id) = match self.state.dialog() {
            Dialog::Closed => return Err(DashboardError::NoOpenDialog),
            Dialog::Adding(tab) => (*tab, None),
            Dialog::Editing(editing) => (editing.tab(), Some(editing.record_id().to_owned())),
        };
        if dialog_tab != form.tab() {
            return Err(DashboardError::FormKindMismatch {
                dialog: dialog_tab,
                form: form.tab(),
            });
        }
        validate_form(&form)?;

        self.state.mutation_started();
        let result = save_form(&self.gateway, form, record_id.as_deref()).await;
        self.finish_mutation(result).await
    }

    /// Delete the record. References to it in other records are left dangling.
    pub async fn delete(&mut self, tab: Tab, record_id: &str) -> Result<(), DashboardError> {
        self.state.mutation_started();
        let result = match tab {
            Tab::Kurse => self.gateway.delete::<KursFields>(record_id).await,
            Tab::Dozenten => self.gateway.delete::<DozentFields>(record_id).await,
            Tab::Teilnehmer => self.gateway.delete::<TeilnehmerFields>(record_id).await,
            Tab::Raeume => self.gateway.delete::<RaumFields>(record_id).await,
            Tab::Anmeldungen => self.gateway.delete::<AnmeldungFields>(record_id).await,
        };
        self.finish_mutation(result).await
    }

    /// Flip the payment status of the enrollment, changing only its `bezahlt` field
    pub async fn toggle_bezahlt(&mut self, record_id: &str) -> Result<(), DashboardError> {
        let snapshots = self.state.snapshots();
        let anmeldung = snapshots
            .anmeldungen
            .iter()
            .find(|a| a.record_id == record_id)
            .ok_or(DashboardError::UnknownRecord)?;
        let patch = AnmeldungFields {
            bezahlt: Some(!anmeldung.fields.is_paid()),
            ..Default::default()
        };

        self.state.mutation_started();
        let result = self
            .gateway
            .update(record_id, patch)
            .await
            .map(|_| ());
        self.finish_mutation(result).await
    }

    async fn finish_mutation(
        &mut self,
        result: Result<(), GatewayError>,
    ) -> Result<(), DashboardError> {
        match result {
            Ok(()) => {
                self.state.mutation_succeeded();
                self.reload().await?;
                Ok(())
            }
            Err(e) => {
                error!("Error saving data: {}", e);
                self.state.mutation_failed(e.to_string());
                Err(e.into())
            }
        }
    }
}

async fn save_form<G: RecordGateway>(
    gateway: &G,
    form: FormData,
    record_id: Option<&str>,
) -> Result<(), GatewayError> {
    match form {
        FormData::Kurs(fields) => save_fields(gateway, fields, record_id).await,
        FormData::Dozent(fields) => save_fields(gateway, fields, record_id).await,
        FormData::Teilnehmer(fields) => save_fields(gateway, fields, record_id).await,
        FormData::Raum(fields) => save_fields(gateway, fields, record_id).await,
        FormData::Anmeldung(fields) => save_fields(gateway, fields, record_id).await,
    }
}

async fn save_fields<G: RecordGateway, F: RecordFields>(
    gateway: &G,
    fields: F,
    record_id: Option<&str>,
) -> Result<(), GatewayError> {
    match record_id {
        Some(record_id) => gateway.update(record_id, fields).await.map(|_| ()),
        None => gateway.create(fields).await.map(|_| ()),
    }
}
