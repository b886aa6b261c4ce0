//! Messages affichés à l'utilisateur par l'assistant

pub const FIRST_NAME_REQUIRED: &str = "Le prénom est requis";
pub const LAST_NAME_REQUIRED: &str = "Le nom est requis";
pub const EMAIL_REQUIRED: &str = "L'email est requis";
pub const PHONE_REQUIRED: &str = "Le numéro de téléphone est requis";
pub const ADDRESS_REQUIRED: &str = "L'adresse est requise";

pub const SPECIALTY_REQUIRED: &str = "La spécialité est requise";
pub const CLINIC_REQUIRED: &str = "Veuillez sélectionner une clinique";

pub const CLINIC_NAME_REQUIRED: &str = "Le nom de l'établissement est requis";
pub const ESTABLISHMENT_TYPE_REQUIRED: &str = "Le type d'établissement est requis";

pub const PASSWORD_REQUIRED: &str = "Le mot de passe est requis";
pub const PASSWORD_TOO_SHORT: &str = "Le mot de passe doit contenir au moins 8 caractères";
pub const CONFIRMATION_REQUIRED: &str = "Veuillez confirmer le mot de passe";
pub const PASSWORD_MISMATCH: &str = "Les mots de passe ne correspondent pas";

pub const ROLE_REQUIRED: &str = "Veuillez choisir un type de compte";

/// Message générique pour toute erreur réseau ou réponse inexploitable
pub const GENERIC_ERROR: &str = "Une erreur est survenue, veuillez réessayer.";

pub const SUBMISSION_IN_FLIGHT: &str = "Une requête est déjà en cours";
