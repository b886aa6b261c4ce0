//! Validation des étapes de l'assistant d'inscription.
//!
//! Chaque couple (rôle, étape) possède une table ordonnée de règles.
//! La validation s'arrête à la première règle qui échoue, et c'est son
//! message qui est présenté à l'utilisateur.

use derive_more::derive::Display;
use thiserror::Error;

use crate::consts::MIN_PASSWORD_LENGTH;
use crate::models::{ClinicDraft, Credentials, Draft, LoginForm, PatientDraft, PractitionerDraft};
use crate::utils::error_messages::*;

/// Une étape refusée, avec le message de la règle fautive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("{_0}")]
pub struct StepRejected(pub &'static str);

impl StepRejected {
    pub fn reason(&self) -> &'static str {
        self.0
    }
}

/// Une règle: un prédicat sur le brouillon et le message en cas d'échec
struct Rule<D> {
    passes: fn(&D) -> bool,
    reason: &'static str,
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn password_present<D: Credentials>(draft: &D) -> bool {
    !draft.password().is_empty()
}

fn password_long_enough<D: Credentials>(draft: &D) -> bool {
    draft.password().chars().count() >= MIN_PASSWORD_LENGTH
}

fn confirmation_present<D: Credentials>(draft: &D) -> bool {
    !draft.confirmation().is_empty()
}

fn passwords_match<D: Credentials>(draft: &D) -> bool {
    draft.password() == draft.confirmation()
}

macro_rules! credential_rules {
    ($draft:ty) => {
        &[
            Rule { passes: password_present::<$draft>, reason: PASSWORD_REQUIRED },
            Rule { passes: password_long_enough::<$draft>, reason: PASSWORD_TOO_SHORT },
            Rule { passes: confirmation_present::<$draft>, reason: CONFIRMATION_REQUIRED },
            Rule { passes: passwords_match::<$draft>, reason: PASSWORD_MISMATCH },
        ]
    };
}

static PATIENT_STEPS: [&[Rule<PatientDraft>]; 3] = [
    &[
        Rule { passes: |d| present(&d.first_name), reason: FIRST_NAME_REQUIRED },
        Rule { passes: |d| present(&d.last_name), reason: LAST_NAME_REQUIRED },
        Rule { passes: |d| present(&d.email), reason: EMAIL_REQUIRED },
        Rule { passes: |d| present(&d.phone), reason: PHONE_REQUIRED },
    ],
    &[Rule { passes: |d| present(&d.address), reason: ADDRESS_REQUIRED }],
    credential_rules!(PatientDraft),
];

static PRACTITIONER_STEPS: [&[Rule<PractitionerDraft>]; 3] = [
    &[
        Rule { passes: |d| present(&d.first_name), reason: FIRST_NAME_REQUIRED },
        Rule { passes: |d| present(&d.last_name), reason: LAST_NAME_REQUIRED },
        Rule { passes: |d| present(&d.email), reason: EMAIL_REQUIRED },
        Rule { passes: |d| present(&d.phone), reason: PHONE_REQUIRED },
    ],
    &[
        Rule { passes: |d| present(&d.specialty), reason: SPECIALTY_REQUIRED },
        Rule { passes: |d| present(&d.address), reason: ADDRESS_REQUIRED },
        // Le choix de la clinique n'est exigé que pour un médecin rattaché
        Rule { passes: |d| !d.is_affiliated() || d.clinic_id.is_some(), reason: CLINIC_REQUIRED },
    ],
    credential_rules!(PractitionerDraft),
];

static CLINIC_STEPS: [&[Rule<ClinicDraft>]; 2] = [
    &[
        Rule { passes: |d| present(&d.name), reason: CLINIC_NAME_REQUIRED },
        Rule { passes: |d| present(&d.email), reason: EMAIL_REQUIRED },
        Rule { passes: |d| present(&d.phone), reason: PHONE_REQUIRED },
        Rule { passes: |d| present(&d.address), reason: ADDRESS_REQUIRED },
        Rule { passes: |d| d.establishment_type.is_some(), reason: ESTABLISHMENT_TYPE_REQUIRED },
    ],
    credential_rules!(ClinicDraft),
];

fn check<D>(rules: &[&[Rule<D>]], step: u8, draft: &D) -> Result<(), StepRejected> {
    let Some(table) = usize::from(step).checked_sub(1).and_then(|i| rules.get(i)) else {
        return Ok(());
    };

    match table.iter().find(|rule| !(rule.passes)(draft)) {
        Some(rule) => Err(StepRejected(rule.reason)),
        None => Ok(()),
    }
}

/// Valide une étape (numérotée à partir de 1) du brouillon.
/// Une étape hors de la table du rôle n'a aucune règle.
pub fn validate_step(draft: &Draft, step: u8) -> Result<(), StepRejected> {
    match draft {
        Draft::Patient(d) => check(&PATIENT_STEPS, step, d),
        Draft::Practitioner(d) => check(&PRACTITIONER_STEPS, step, d),
        Draft::Clinic(d) => check(&CLINIC_STEPS, step, d),
    }
}

/// Valide toutes les étapes dans l'ordre, avant l'envoi
pub fn validate_draft(draft: &Draft) -> Result<(), StepRejected> {
    (1..=draft.role().step_count()).try_for_each(|step| validate_step(draft, step))
}

/// Valide le formulaire de connexion
pub fn validate_login(form: &LoginForm) -> Result<(), StepRejected> {
    if form.role.is_none() {
        return Err(StepRejected(ROLE_REQUIRED));
    }
    if !present(&form.email) {
        return Err(StepRejected(EMAIL_REQUIRED));
    }
    if form.password.is_empty() {
        return Err(StepRejected(PASSWORD_REQUIRED));
    }
    Ok(())
}
