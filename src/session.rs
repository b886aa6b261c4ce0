//! Session de l'utilisateur connecté.
//!
//! La session est un objet explicite, créé au démarrage à partir du stockage
//! persistant et passé à qui en a besoin. Le jeton et le profil sont écrits
//! et effacés ensemble.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::{TOKEN_KEY, USER_KEY};
use crate::db::{PersistentStore, StoreError};
use crate::gateway::{SubmissionGateway, Transport};
use crate::models::Role;
use strum::IntoEnumIterator;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Profile serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// L'identité connectée
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    pub profile: Value,
}

impl Identity {
    /// Reconstruit l'identité à partir du profil persisté. Le rôle est lu
    /// dans le champ `role` s'il existe, sinon déduit des champs propres
    /// à chaque type de compte.
    pub fn from_profile(profile: Value) -> Option<Self> {
        if !profile.is_object() {
            return None;
        }
        let declared = profile.get("role").and_then(|role| {
            serde_json::from_value::<Role>(role.clone()).ok().or_else(|| {
                let segment = role.as_str()?;
                Role::iter().find(|r| r.api_segment() == segment)
            })
        });
        let role = declared.unwrap_or_else(|| {
            if profile.get("specialite").is_some() {
                Role::Practitioner
            } else if profile.get("type_etablissement").is_some() {
                Role::Clinic
            } else {
                Role::Patient
            }
        });
        Some(Self { role, profile })
    }

    /// Nom à afficher: prénom et nom si présents, sinon le nom seul ou l'email
    pub fn display_name(&self) -> String {
        let field = |key: &str| self.profile.get(key).and_then(Value::as_str);
        match (field("prenom"), field("nom"), field("email")) {
            (Some(first), Some(last), _) => format!("{first} {last}"),
            (None, Some(name), _) => name.to_owned(),
            (_, _, Some(email)) => email.to_owned(),
            _ => self.role.to_string(),
        }
    }
}

pub struct Session<S> {
    store: S,
    current: Option<(Identity, String)>,
}

impl<S: PersistentStore> Session<S> {
    /// Restaure la session persistée. Une paire incomplète ou illisible
    /// est effacée.
    pub fn restore(mut store: S) -> Self {
        let identity = store
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .and_then(Identity::from_profile);
        let token = store.get(TOKEN_KEY);

        let current = match (identity, token) {
            (Some(identity), Some(token)) => {
                info!("Session restaurée ({})", identity.role);
                Some((identity, token))
            }
            (None, None) => None,
            _ => {
                warn!("Incomplete persisted session, discarding it");
                for key in [TOKEN_KEY, USER_KEY] {
                    if let Err(e) = store.remove(key) {
                        warn!("Could not remove {key}: {e}");
                    }
                }
                None
            }
        };

        Self { store, current }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.current.as_ref().map(|(identity, _)| identity)
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(|identity| identity.role)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, token)| token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ouvre la session: le profil tel que renvoyé et le jeton sont persistés
    /// puis gardés en mémoire
    pub fn login(&mut self, profile: Value, role: Role, token: String) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(&profile)?;
        let identity = Identity { role, profile };

        self.store.set(USER_KEY, serialized)?;
        if let Err(e) = self.store.set(TOKEN_KEY, token.clone()) {
            // Pas de profil sans jeton
            let _ = self.store.remove(USER_KEY);
            return Err(e.into());
        }

        info!("Session ouverte ({role})");
        self.current = Some((identity, token));
        Ok(())
    }

    /// Ferme la session. L'invalidation distante est tentée, mais son échec
    /// n'empêche jamais l'effacement local.
    pub async fn logout<T: Transport>(
        &mut self,
        gateway: &SubmissionGateway<T>,
    ) -> Result<(), SessionError> {
        if let Some((identity, token)) = self.current.take() {
            if let Err(e) = gateway.logout(identity.role, &token).await {
                warn!("Remote logout failed: {e}");
            }
        }

        let token_removed = self.store.remove(TOKEN_KEY);
        let user_removed = self.store.remove(USER_KEY);
        info!("Session fermée");
        token_removed.and(user_removed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{JsonFileStore, MemoryStore};
    use crate::gateway::testing::ScriptedTransport;
    use serde_json::json;

    fn logged_in() -> Session<MemoryStore> {
        let mut session = Session::restore(MemoryStore::default());
        session
            .login(json!({ "id": 3, "nom": "Diallo", "prenom": "Awa" }), Role::Patient, "tok-3".into())
            .unwrap();
        session
    }

    #[test]
    fn test_login_holds_exactly_returned_identity() {
        let session = logged_in();
        assert_eq!(session.role(), Some(Role::Patient));
        assert_eq!(session.token(), Some("tok-3"));
        assert_eq!(
            session.identity().map(|i| &i.profile),
            Some(&json!({ "id": 3, "nom": "Diallo", "prenom": "Awa" }))
        );
        assert_eq!(session.store().get(TOKEN_KEY).as_deref(), Some("tok-3"));
        assert!(session.store().get(USER_KEY).is_some());
    }

    #[test]
    fn test_user_key_holds_profile_as_returned() {
        let session = logged_in();
        let raw = session.store().get(USER_KEY).unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, json!({ "id": 3, "nom": "Diallo", "prenom": "Awa" }));
    }

    #[test]
    fn test_restore_recovers_role_from_profile() {
        let cases = [
            (json!({ "id": 1, "nom": "Martin", "specialite": "Cardiologie" }), Role::Practitioner),
            (json!({ "id": 2, "nom": "Clinique A", "type_etablissement": "clinique" }), Role::Clinic),
            (json!({ "id": 3, "nom": "Diallo", "prenom": "Awa" }), Role::Patient),
            (json!({ "id": 4, "nom": "Clinique B", "role": "clinique" }), Role::Clinic),
            (json!({ "id": 5, "nom": "Sow", "role": "medecin" }), Role::Practitioner),
        ];

        for (profile, role) in cases {
            let mut session = Session::restore(MemoryStore::default());
            session.login(profile.clone(), role, "tok".into()).unwrap();

            let restored = Session::restore(session.store().clone());
            assert_eq!(restored.role(), Some(role), "Wrong role restored for {profile}");
            assert_eq!(restored.identity().map(|i| &i.profile), Some(&profile));
        }
    }

    #[test]
    fn test_restore_from_truncated_file_is_empty() {
        let path = std::env::temp_dir()
            .join(format!("medirdv-{}", uuid::Uuid::new_v4()))
            .join("session.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"token\": \"ab").unwrap();

        let session = Session::restore(JsonFileStore::open(path).unwrap());
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_restore_round_trip() {
        let session = logged_in();
        let restored = Session::restore(session.store().clone());
        assert_eq!(restored.identity(), session.identity());
        assert_eq!(restored.token(), Some("tok-3"));
    }

    #[test]
    fn test_restore_discards_incomplete_pair() {
        let mut store = MemoryStore::default();
        store.set(TOKEN_KEY, "orphan".into()).unwrap();

        let session = Session::restore(store);
        assert!(!session.is_authenticated());
        assert_eq!(session.store().get(TOKEN_KEY), None, "Orphan token was kept");
    }

    #[test]
    fn test_restore_discards_corrupted_profile() {
        let mut store = MemoryStore::default();
        store.set(TOKEN_KEY, "tok".into()).unwrap();
        store.set(USER_KEY, "{not json".into()).unwrap();

        let session = Session::restore(store);
        assert!(!session.is_authenticated());
        assert_eq!(session.store().get(USER_KEY), None);

        // Un profil qui n'est pas un objet est tout aussi illisible
        let mut store = MemoryStore::default();
        store.set(TOKEN_KEY, "tok".into()).unwrap();
        store.set(USER_KEY, "\"Awa\"".into()).unwrap();
        let session = Session::restore(store);
        assert!(!session.is_authenticated());
        assert_eq!(session.store().get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut session = logged_in();
        let gateway = SubmissionGateway::new(ScriptedTransport::default().reply(200, json!({})));

        session.logout(&gateway).await.unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.store().get(TOKEN_KEY), None);
        assert_eq!(session.store().get(USER_KEY), None);

        let sent = gateway.transport().sent();
        assert_eq!(sent[0].path, "patient/logout");
        assert_eq!(sent[0].bearer.as_deref(), Some("tok-3"));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let mut session = logged_in();
        let gateway =
            SubmissionGateway::new(ScriptedTransport::default().reply(500, json!({ "message": "down" })));

        session.logout(&gateway).await.unwrap();
        assert!(session.identity().is_none());
        assert!(session.token().is_none());
        assert_eq!(session.store().get(TOKEN_KEY), None);
        assert_eq!(session.store().get(USER_KEY), None);
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_remote_call() {
        let mut session = Session::restore(MemoryStore::default());
        let gateway = SubmissionGateway::new(ScriptedTransport::default());

        session.logout(&gateway).await.unwrap();
        assert!(gateway.transport().sent().is_empty());
    }

    #[test]
    fn test_display_name() {
        let identity = Identity {
            role: Role::Clinic,
            profile: json!({ "nom": "Clinique A", "email": "contact@clinique-a.example" }),
        };
        assert_eq!(identity.display_name(), "Clinique A");

        let identity = Identity { role: Role::Patient, profile: json!({ "prenom": "Awa", "nom": "Diallo" }) };
        assert_eq!(identity.display_name(), "Awa Diallo");
    }
}
