//! Modèle de données de l'assistant d'inscription

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::EnumIter;

/// Type de compte: Patient, Médecin ou Clinique
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[display("Patient")]
    Patient,
    #[display("Médecin")]
    Practitioner,
    #[display("Clinique")]
    Clinic,
}

impl Role {
    /// Segment de chemin de l'API, qui est aussi la clé du profil
    /// dans la réponse de connexion.
    pub fn api_segment(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Practitioner => "medecin",
            Role::Clinic => "clinique",
        }
    }

    /// Nombre d'étapes du formulaire d'inscription
    pub fn step_count(self) -> u8 {
        match self {
            Role::Patient | Role::Practitioner => 3,
            Role::Clinic => 2,
        }
    }
}

/// Un groupe sanguin ABO avec rhésus
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum BloodType {
    #[serde(rename = "A+")]
    #[display("A+")]
    APos,
    #[serde(rename = "A-")]
    #[display("A-")]
    ANeg,
    #[serde(rename = "B+")]
    #[display("B+")]
    BPos,
    #[serde(rename = "B-")]
    #[display("B-")]
    BNeg,
    #[serde(rename = "AB+")]
    #[display("AB+")]
    ABPos,
    #[serde(rename = "AB-")]
    #[display("AB-")]
    ABNeg,
    #[serde(rename = "O+")]
    #[display("O+")]
    OPos,
    #[serde(rename = "O-")]
    #[display("O-")]
    ONeg,
}

/// Statut sérologique VIH déclaré
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum HivStatus {
    #[serde(rename = "negatif")]
    #[display("Négatif")]
    Negative,
    #[serde(rename = "positif")]
    #[display("Positif")]
    Positive,
    #[serde(rename = "inconnu")]
    #[display("Inconnu")]
    Unknown,
}

/// Mode d'exercice d'un médecin
#[derive(
    Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display,
)]
pub enum PracticeType {
    #[default]
    #[serde(rename = "independant")]
    #[display("Indépendant")]
    Independent,
    #[serde(rename = "clinique")]
    #[display("Rattaché à une clinique")]
    Affiliated,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[serde(rename_all = "snake_case")]
pub enum EstablishmentType {
    #[display("Hôpital")]
    Hopital,
    #[display("Clinique")]
    Clinique,
    #[display("Centre médical")]
    CentreMedical,
    #[display("Cabinet")]
    Cabinet,
    #[display("Laboratoire")]
    Laboratoire,
    #[display("Pharmacie")]
    Pharmacie,
}

/// Catalogue des spécialités proposées aux médecins
pub const SPECIALTIES: &[&str] = &[
    "Médecine générale",
    "Cardiologie",
    "Dermatologie",
    "Gynécologie",
    "Pédiatrie",
    "Ophtalmologie",
    "ORL",
    "Neurologie",
    "Psychiatrie",
    "Radiologie",
    "Chirurgie",
    "Dentisterie",
];

/// Une clinique telle que listée par l'annuaire
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Display)]
#[display("{nom}")]
pub struct ClinicSummary {
    pub id: u64,
    pub nom: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClinicSummary {
    pub fn new(id: u64, nom: impl Into<String>) -> Self {
        Self {
            id,
            nom: nom.into(),
            extra: Map::new(),
        }
    }
}

/// Brouillon d'inscription d'un patient
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub confirmation: String,
    pub blood_type: Option<BloodType>,
    pub hiv_status: Option<HivStatus>,
    pub medical_history: String,
    pub allergies: String,
    pub chronic_treatments: String,
}

/// Brouillon d'inscription d'un médecin.
///
/// `clinic_id` et `function` ne sont utilisés que si le médecin
/// est rattaché à une clinique.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PractitionerDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub address: String,
    pub password: String,
    pub confirmation: String,
    pub practice_type: PracticeType,
    pub clinic_id: Option<u64>,
    pub function: String,
    pub commune: String,
    pub city: String,
}

impl PractitionerDraft {
    pub fn is_affiliated(&self) -> bool {
        self.practice_type == PracticeType::Affiliated
    }
}

/// Brouillon d'inscription d'un établissement
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: String,
    pub establishment_type: Option<EstablishmentType>,
    pub emergency_24h: bool,
    pub parking: bool,
    pub website: String,
    pub password: String,
    pub confirmation: String,
}

/// Le brouillon en cours, propre au rôle choisi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Draft {
    Patient(PatientDraft),
    Practitioner(PractitionerDraft),
    Clinic(ClinicDraft),
}

impl Draft {
    /// Crée un brouillon vide pour le rôle donné
    pub fn empty(role: Role) -> Self {
        match role {
            Role::Patient => Draft::Patient(PatientDraft::default()),
            Role::Practitioner => Draft::Practitioner(PractitionerDraft::default()),
            Role::Clinic => Draft::Clinic(ClinicDraft::default()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Draft::Patient(_) => Role::Patient,
            Draft::Practitioner(_) => Role::Practitioner,
            Draft::Clinic(_) => Role::Clinic,
        }
    }
}

/// Accès au couple mot de passe / confirmation, commun aux trois brouillons
pub trait Credentials {
    fn password(&self) -> &str;
    fn confirmation(&self) -> &str;
}

macro_rules! impl_credentials {
    ($($draft:ty),*) => {
        $(impl Credentials for $draft {
            fn password(&self) -> &str {
                &self.password
            }

            fn confirmation(&self) -> &str {
                &self.confirmation
            }
        })*
    };
}

impl_credentials!(PatientDraft, PractitionerDraft, ClinicDraft);

/// Formulaire de connexion
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub role: Option<Role>,
    pub email: String,
    pub password: String,
}

/// Ce que renvoie une connexion réussie
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub profile: Value,
    pub access_token: String,
}
