//! Constantes globales de l'application.

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/"; // URL de base de l'API distante.
pub const DEFAULT_SESSION_FILE: &str = "./data/session.json"; // Stockage local de la session.
pub const DEFAULT_LOG_FILE: &str = "./medirdv.log"; // Fichier de journalisation.

/// Clé du jeton d'accès dans le stockage persistant
pub const TOKEN_KEY: &str = "token";
/// Clé du profil sérialisé dans le stockage persistant
pub const USER_KEY: &str = "user";

/// Longueur minimale d'un mot de passe
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Fonction envoyée pour un médecin rattaché à une clinique qui n'a rien précisé
pub const DEFAULT_FUNCTION: &str = "Médecin";
