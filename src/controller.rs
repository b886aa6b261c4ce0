//! Point d'entrée unique de l'assistant: relie la machine à états, l'annuaire,
//! la passerelle d'envoi et la session.

use log::{info, warn};
use thiserror::Error;

use crate::db::PersistentStore;
use crate::directory::{filter, DirectoryCache};
use crate::gateway::{GatewayError, SubmissionGateway, Transport};
use crate::models::{ClinicSummary, Draft, LoginForm, PracticeType};
use crate::payload::RegisterPayload;
use crate::session::{Session, SessionError};
use crate::utils::error_messages::{GENERIC_ERROR, SUBMISSION_IN_FLIGHT};
use crate::wizard::{Action, Mode, Wizard, WizardState};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{}", SUBMISSION_IN_FLIGHT)]
    InFlight,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Issue d'une soumission. En cas de refus, le message est dans `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Refused,
}

pub struct WizardController<T> {
    wizard: Wizard,
    gateway: SubmissionGateway<T>,
    directory: DirectoryCache,
}

impl<T: Transport> WizardController<T> {
    pub fn new(gateway: SubmissionGateway<T>) -> Self {
        Self {
            wizard: Wizard::new(),
            gateway,
            directory: DirectoryCache::new(),
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn state(&self) -> &WizardState {
        self.wizard.state()
    }

    pub fn gateway(&self) -> &SubmissionGateway<T> {
        &self.gateway
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.wizard.draft_mut()
    }

    pub fn login_form_mut(&mut self) -> &mut LoginForm {
        self.wizard.login_form_mut()
    }

    pub fn dispatch(&mut self, action: Action) {
        self.wizard.dispatch(action);
    }

    /// Recommence depuis l'écran de connexion, annuaire compris
    pub fn reset(&mut self) {
        self.wizard = Wizard::new();
        self.directory = DirectoryCache::new();
    }

    /// Change le mode d'exercice du médecin. Le passage en « rattaché »
    /// charge l'annuaire s'il ne l'a pas encore été.
    pub async fn set_practice_type(&mut self, practice_type: PracticeType) {
        let Some(Draft::Practitioner(draft)) = self.wizard.draft_mut() else {
            return;
        };
        draft.practice_type = practice_type;

        if practice_type == PracticeType::Affiliated && !self.directory.is_loaded() {
            if let Err(e) = self.directory.ensure_loaded(&self.gateway).await {
                warn!("Clinic directory unavailable: {e}");
                self.wizard.dispatch(Action::Failed(e.to_string()));
            }
        }
    }

    pub fn clinics_loaded(&self) -> bool {
        self.directory.is_loaded()
    }

    /// Cliniques de l'annuaire dont le nom contient `term`
    pub fn clinic_choices(&self, term: &str) -> Vec<ClinicSummary> {
        filter(self.directory.clinics(), term)
    }

    /// Rattache le brouillon à une clinique de l'annuaire.
    /// Renvoie `false` si la clinique est inconnue ou le brouillon absent.
    pub fn select_clinic(&mut self, clinic_id: u64) -> bool {
        if self.directory.find(clinic_id).is_none() {
            return false;
        }
        match self.wizard.draft_mut() {
            Some(Draft::Practitioner(draft)) if draft.is_affiliated() => {
                draft.clinic_id = Some(clinic_id);
                true
            }
            _ => false,
        }
    }

    fn guard(&self) -> Result<(), ControllerError> {
        if self.wizard.state().in_flight {
            Err(ControllerError::InFlight)
        } else {
            Ok(())
        }
    }

    fn record_failure(&mut self, error: GatewayError) -> SubmitOutcome {
        self.wizard.dispatch(Action::Failed(error.to_string()));
        SubmitOutcome::Refused
    }

    /// Envoie le brouillon complet. En cas de succès, l'assistant revient à
    /// la connexion avec le rôle présélectionné.
    pub async fn submit_registration(&mut self) -> Result<SubmitOutcome, ControllerError> {
        self.guard()?;
        self.wizard.dispatch(Action::SubmitRegistration);
        if !self.wizard.state().in_flight {
            return Ok(SubmitOutcome::Refused);
        }

        let Some(payload) = self.wizard.draft().map(RegisterPayload::from) else {
            return Ok(self.record_failure(GatewayError::Unavailable));
        };

        match self.gateway.register(&payload).await {
            Ok(()) => {
                self.wizard.dispatch(Action::Registered);
                Ok(SubmitOutcome::Succeeded)
            }
            Err(e) => Ok(self.record_failure(e)),
        }
    }

    /// Connexion avec le formulaire courant; la session est ouverte en cas de succès.
    pub async fn submit_login<S: PersistentStore>(
        &mut self,
        session: &mut Session<S>,
    ) -> Result<SubmitOutcome, ControllerError> {
        self.guard()?;
        self.wizard.dispatch(Action::SubmitLogin);
        if !self.wizard.state().in_flight {
            return Ok(SubmitOutcome::Refused);
        }

        let form = self.wizard.login_form().clone();
        let Some(role) = form.role else {
            return Ok(self.record_failure(GatewayError::Unavailable));
        };

        let success = match self.gateway.login(role, &form.email, &form.password).await {
            Ok(success) => success,
            Err(e) => return Ok(self.record_failure(e)),
        };

        if let Err(e) = session.login(success.profile, role, success.access_token) {
            self.wizard.dispatch(Action::Failed(GENERIC_ERROR.to_owned()));
            return Err(e.into());
        }

        self.wizard.dispatch(Action::Authenticated);
        info!("Utilisateur authentifié ({role})");
        Ok(SubmitOutcome::Succeeded)
    }

    pub fn is_authenticated(&self) -> bool {
        self.wizard.state().mode == Mode::Authenticated
    }
}
