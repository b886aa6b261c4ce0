//! Mise en forme des brouillons en corps de requête d'inscription.
//!
//! La confirmation du mot de passe n'est jamais envoyée. Les champs
//! facultatifs sont toujours présents, à `null` lorsqu'ils sont vides.

use serde::Serialize;

use crate::consts::DEFAULT_FUNCTION;
use crate::models::{
    BloodType, ClinicDraft, Draft, EstablishmentType, HivStatus, PatientDraft, PracticeType,
    PractitionerDraft, Role,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRegistration {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: String,
    pub adresse: String,
    pub password: String,
    pub groupe_sanguin: Option<BloodType>,
    pub statut_vih: Option<HivStatus>,
    pub antecedents_medicaux: Option<String>,
    pub allergies: Option<String>,
    pub traitements_chroniques: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PractitionerRegistration {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: String,
    pub specialite: String,
    pub adresse: String,
    pub password: String,
    pub type_exercice: PracticeType,
    pub clinique_id: Option<u64>,
    pub fonction: Option<String>,
    pub commune: Option<String>,
    pub ville: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicRegistration {
    pub nom: String,
    pub email: String,
    pub telephone: String,
    pub adresse: String,
    pub description: Option<String>,
    pub type_etablissement: Option<EstablishmentType>,
    pub urgences_24h: bool,
    pub parking: bool,
    pub site_web: Option<String>,
    pub password: String,
}

/// Corps d'une requête d'inscription, selon le rôle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegisterPayload {
    Patient(PatientRegistration),
    Practitioner(PractitionerRegistration),
    Clinic(ClinicRegistration),
}

fn text(value: &str) -> String {
    value.trim().to_owned()
}

fn nullable(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

impl From<&PatientDraft> for PatientRegistration {
    fn from(d: &PatientDraft) -> Self {
        Self {
            nom: text(&d.last_name),
            prenom: text(&d.first_name),
            email: text(&d.email),
            telephone: text(&d.phone),
            adresse: text(&d.address),
            password: d.password.clone(),
            groupe_sanguin: d.blood_type,
            statut_vih: d.hiv_status,
            antecedents_medicaux: nullable(&d.medical_history),
            allergies: nullable(&d.allergies),
            traitements_chroniques: nullable(&d.chronic_treatments),
        }
    }
}

impl From<&PractitionerDraft> for PractitionerRegistration {
    fn from(d: &PractitionerDraft) -> Self {
        // Un indépendant n'envoie ni clinique ni fonction, même si le
        // brouillon en a gardé une trace.
        let (clinique_id, fonction) = if d.is_affiliated() {
            let fonction = nullable(&d.function).unwrap_or_else(|| DEFAULT_FUNCTION.to_owned());
            (d.clinic_id, Some(fonction))
        } else {
            (None, None)
        };

        Self {
            nom: text(&d.last_name),
            prenom: text(&d.first_name),
            email: text(&d.email),
            telephone: text(&d.phone),
            specialite: text(&d.specialty),
            adresse: text(&d.address),
            password: d.password.clone(),
            type_exercice: d.practice_type,
            clinique_id,
            fonction,
            commune: nullable(&d.commune),
            ville: nullable(&d.city),
        }
    }
}

impl From<&ClinicDraft> for ClinicRegistration {
    fn from(d: &ClinicDraft) -> Self {
        Self {
            nom: text(&d.name),
            email: text(&d.email),
            telephone: text(&d.phone),
            adresse: text(&d.address),
            description: nullable(&d.description),
            type_etablissement: d.establishment_type,
            urgences_24h: d.emergency_24h,
            parking: d.parking,
            site_web: nullable(&d.website),
            password: d.password.clone(),
        }
    }
}

impl From<&Draft> for RegisterPayload {
    fn from(draft: &Draft) -> Self {
        match draft {
            Draft::Patient(d) => RegisterPayload::Patient(d.into()),
            Draft::Practitioner(d) => RegisterPayload::Practitioner(d.into()),
            Draft::Clinic(d) => RegisterPayload::Clinic(d.into()),
        }
    }
}

impl RegisterPayload {
    pub fn role(&self) -> Role {
        match self {
            RegisterPayload::Patient(_) => Role::Patient,
            RegisterPayload::Practitioner(_) => Role::Practitioner,
            RegisterPayload::Clinic(_) => Role::Clinic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn to_json(draft: &Draft) -> Value {
        serde_json::to_value(RegisterPayload::from(draft)).unwrap()
    }

    #[test]
    fn test_patient_payload_nulls_empty_medical_fields() {
        let draft = Draft::Patient(PatientDraft {
            first_name: " Awa ".into(),
            last_name: "Diallo".into(),
            email: "awa@example.com".into(),
            phone: "770000000".into(),
            address: "Dakar".into(),
            password: "motdepasse".into(),
            confirmation: "motdepasse".into(),
            blood_type: Some(BloodType::ONeg),
            allergies: "Pénicilline".into(),
            medical_history: "   ".into(),
            ..Default::default()
        });

        assert_eq!(
            to_json(&draft),
            json!({
                "nom": "Diallo",
                "prenom": "Awa",
                "email": "awa@example.com",
                "telephone": "770000000",
                "adresse": "Dakar",
                "password": "motdepasse",
                "groupe_sanguin": "O-",
                "statut_vih": null,
                "antecedents_medicaux": null,
                "allergies": "Pénicilline",
                "traitements_chroniques": null,
            })
        );
    }

    #[test]
    fn test_confirmation_is_never_sent() {
        let drafts = [
            Draft::empty(Role::Patient),
            Draft::empty(Role::Practitioner),
            Draft::empty(Role::Clinic),
        ];
        for draft in &drafts {
            let json = to_json(draft);
            assert!(json.get("confirmation").is_none(), "Confirmation leaked for {:?}", draft.role());
            assert!(json.get("password").is_some());
        }
    }

    #[test]
    fn test_affiliated_blank_function_gets_placeholder() {
        let draft = Draft::Practitioner(PractitionerDraft {
            practice_type: PracticeType::Affiliated,
            clinic_id: Some(1),
            function: "  ".into(),
            ..Default::default()
        });
        let json = to_json(&draft);
        assert_eq!(json["type_exercice"], "clinique");
        assert_eq!(json["clinique_id"], 1);
        assert_eq!(json["fonction"], DEFAULT_FUNCTION);
        assert_eq!(json["commune"], Value::Null);
        assert_eq!(json["ville"], Value::Null);
    }

    #[test]
    fn test_affiliated_function_is_kept() {
        let draft = Draft::Practitioner(PractitionerDraft {
            practice_type: PracticeType::Affiliated,
            clinic_id: Some(4),
            function: "Chef de service".into(),
            city: "Thiès".into(),
            ..Default::default()
        });
        let json = to_json(&draft);
        assert_eq!(json["fonction"], "Chef de service");
        assert_eq!(json["ville"], "Thiès");
    }

    #[test]
    fn test_independent_never_sends_clinic() {
        let draft = Draft::Practitioner(PractitionerDraft {
            practice_type: PracticeType::Independent,
            clinic_id: Some(9),
            function: "Chef de service".into(),
            ..Default::default()
        });
        let json = to_json(&draft);
        assert_eq!(json["type_exercice"], "independant");
        assert_eq!(json["clinique_id"], Value::Null);
        assert_eq!(json["fonction"], Value::Null);
    }

    #[test]
    fn test_clinic_payload() {
        let draft = Draft::Clinic(ClinicDraft {
            name: "Clinique A".into(),
            establishment_type: Some(EstablishmentType::CentreMedical),
            emergency_24h: true,
            website: "https://clinique-a.example".into(),
            ..Default::default()
        });
        let json = to_json(&draft);
        assert_eq!(json["type_etablissement"], "centre_medical");
        assert_eq!(json["urgences_24h"], true);
        assert_eq!(json["parking"], false);
        assert_eq!(json["description"], Value::Null);
        assert_eq!(json["site_web"], "https://clinique-a.example");
    }
}
