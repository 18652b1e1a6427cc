//! Checks of form data before it is sent to the record storage
//!
//! The rules resemble the required markers and input types of the dashboard's forms. All problems
//! of a form are collected, so they can be presented together.

use crate::dashboard::FormData;
use crate::record_ref::extract_record_id;
use kursverwaltung_api_types::{
    parse_calendar_date, AnmeldungFields, DozentFields, KursFields, RaumFields, TeilnehmerFields,
};
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: &'static str,
    pub problem: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub problems: Vec<FieldProblem>,
}

impl ValidationError {
    pub fn has_problem_with(&self, field: &str) -> bool {
        self.problems.iter().any(|p| p.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let descriptions: Vec<String> = self
            .problems
            .iter()
            .map(|p| format!("{}: {}", p.field, p.problem))
            .collect();
        write!(f, "Invalid form data ({})", descriptions.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Default)]
struct Checker {
    problems: Vec<FieldProblem>,
}

impl Checker {
    fn problem(&mut self, field: &'static str, problem: &'static str) {
        self.problems.push(FieldProblem { field, problem });
    }

    fn required_text(&mut self, field: &'static str, value: &Option<String>) {
        if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
            self.problem(field, "is required");
        }
    }

    fn optional_date(
        &mut self,
        field: &'static str,
        value: &Option<String>,
    ) -> Option<chrono::NaiveDate> {
        let value = value.as_deref().filter(|v| !v.is_empty())?;
        let date = parse_calendar_date(value);
        if date.is_none() {
            self.problem(field, "is not a valid date (YYYY-MM-DD)");
        }
        date
    }

    fn required_date(
        &mut self,
        field: &'static str,
        value: &Option<String>,
    ) -> Option<chrono::NaiveDate> {
        if value.as_deref().map_or(true, str::is_empty) {
            self.problem(field, "is required");
            return None;
        }
        self.optional_date(field, value)
    }

    fn optional_reference(&mut self, field: &'static str, value: &Option<String>) {
        if value.as_deref().is_some_and(|v| !v.is_empty())
            && extract_record_id(value.as_deref()).is_none()
        {
            self.problem(field, "is not a valid record reference");
        }
    }

    fn required_reference(&mut self, field: &'static str, value: &Option<String>) {
        if value.as_deref().map_or(true, str::is_empty) {
            self.problem(field, "is required");
        } else {
            self.optional_reference(field, value);
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                problems: self.problems,
            })
        }
    }
}

pub fn validate_form(form: &FormData) -> Result<(), ValidationError> {
    match form {
        FormData::Kurs(fields) => validate_kurs(fields),
        FormData::Dozent(fields) => validate_dozent(fields),
        FormData::Teilnehmer(fields) => validate_teilnehmer(fields),
        FormData::Raum(fields) => validate_raum(fields),
        FormData::Anmeldung(fields) => validate_anmeldung(fields),
    }
}

fn validate_kurs(fields: &KursFields) -> Result<(), ValidationError> {
    let mut checker = Checker::default();
    checker.required_text("titel", &fields.titel);
    let start = checker.required_date("startdatum", &fields.startdatum);
    let end = checker.required_date("enddatum", &fields.enddatum);
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            checker.problem("enddatum", "must not be before startdatum");
        }
    }
    if fields.preis.is_some_and(|p| p < Decimal::ZERO) {
        checker.problem("preis", "must not be negative");
    }
    checker.required_reference("dozent", &fields.dozent);
    checker.optional_reference("raum", &fields.raum);
    checker.finish()
}

fn validate_dozent(fields: &DozentFields) -> Result<(), ValidationError> {
    let mut checker = Checker::default();
    checker.required_text("name", &fields.name);
    checker.required_text("email", &fields.email);
    checker.finish()
}

fn validate_teilnehmer(fields: &TeilnehmerFields) -> Result<(), ValidationError> {
    let mut checker = Checker::default();
    checker.required_text("name", &fields.name);
    checker.required_text("email", &fields.email);
    checker.optional_date("geburtsdatum", &fields.geburtsdatum);
    checker.finish()
}

fn validate_raum(fields: &RaumFields) -> Result<(), ValidationError> {
    let mut checker = Checker::default();
    checker.required_text("raumname", &fields.raumname);
    checker.finish()
}

fn validate_anmeldung(fields: &AnmeldungFields) -> Result<(), ValidationError> {
    let mut checker = Checker::default();
    checker.required_reference("teilnehmer", &fields.teilnehmer);
    checker.required_reference("kurs", &fields.kurs);
    checker.required_date("anmeldedatum", &fields.anmeldedatum);
    checker.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_ref::create_record_url;
    use kursverwaltung_api_types::app_ids;

    fn get_valid_kurs() -> KursFields {
        KursFields {
            titel: Some("Töpfern für Anfänger".to_string()),
            beschreibung: None,
            startdatum: Some("2025-03-01".to_string()),
            enddatum: Some("2025-03-15".to_string()),
            max_teilnehmer: Some(12),
            preis: Some(Decimal::new(4990, 2)),
            dozent: Some(create_record_url(app_ids::DOZENTEN, "d1")),
            raum: None,
        }
    }

    #[test]
    fn test_valid_kurs() {
        assert_eq!(validate_form(&FormData::Kurs(get_valid_kurs())), Ok(()));
    }

    #[test]
    fn test_kurs_problems() {
        let fields = KursFields {
            titel: Some("  ".to_string()),
            startdatum: Some("2025-03-15".to_string()),
            enddatum: Some("2025-03-01".to_string()),
            preis: Some(Decimal::new(-1, 0)),
            dozent: None,
            raum: Some("Raum 1".to_string()),
            ..get_valid_kurs()
        };
        let error = validate_form(&FormData::Kurs(fields)).unwrap_err();
        assert!(error.has_problem_with("titel"));
        assert!(!error.has_problem_with("startdatum"));
        assert!(error.has_problem_with("enddatum"));
        assert!(error.has_problem_with("preis"));
        assert!(error.has_problem_with("dozent"));
        assert!(error.has_problem_with("raum"));
        assert_eq!(error.problems.len(), 5);
    }

    #[test]
    fn test_kurs_invalid_date() {
        let fields = KursFields {
            startdatum: Some("1.3.2025".to_string()),
            ..get_valid_kurs()
        };
        let error = validate_form(&FormData::Kurs(fields)).unwrap_err();
        assert_eq!(
            error.problems,
            vec![FieldProblem {
                field: "startdatum",
                problem: "is not a valid date (YYYY-MM-DD)"
            }]
        );
    }

    #[test]
    fn test_person_forms() {
        assert!(validate_form(&FormData::Dozent(DozentFields {
            name: Some("Erika Mustermann".to_string()),
            email: Some("erika@example.org".to_string()),
            ..Default::default()
        }))
        .is_ok());
        let error = validate_form(&FormData::Teilnehmer(TeilnehmerFields {
            name: Some("Max".to_string()),
            geburtsdatum: Some("gestern".to_string()),
            ..Default::default()
        }))
        .unwrap_err();
        assert!(error.has_problem_with("email"));
        assert!(error.has_problem_with("geburtsdatum"));
        assert!(!error.has_problem_with("name"));
    }

    #[test]
    fn test_raum_and_anmeldung() {
        assert!(validate_form(&FormData::Raum(RaumFields::default())).is_err());
        let fields = AnmeldungFields {
            teilnehmer: Some(create_record_url(app_ids::TEILNEHMER, "t1")),
            kurs: Some(create_record_url(app_ids::KURSE, "k1")),
            ..AnmeldungFields::new_enrollment(chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap())
        };
        assert_eq!(validate_form(&FormData::Anmeldung(fields)), Ok(()));
        let error = validate_form(&FormData::Anmeldung(AnmeldungFields::default())).unwrap_err();
        assert_eq!(error.problems.len(), 3);
    }
}
