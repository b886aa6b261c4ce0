//! Machine à états de l'assistant de connexion et d'inscription.
//!
//! L'état courant est une simple valeur ([`WizardState`]); toutes les
//! transitions passent par [`Wizard::apply`], qui ne fait aucun appel réseau.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{Draft, LoginForm, Role};
use crate::utils::input_validation::{validate_draft, validate_login, validate_step};

/// Écran affiché par l'assistant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Login,
    RoleSelection,
    Registration,
    /// Sortie finale: la session est ouverte
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub mode: Mode,
    pub role: Option<Role>,
    pub step: u8,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            mode: Mode::Login,
            role: None,
            step: 1,
            error: None,
            in_flight: false,
        }
    }
}

/// Une action de l'utilisateur, ou le résultat d'un appel réseau
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateAccount,
    ShowLogin,
    SelectRole(Role),
    Continue,
    Back,
    SubmitRegistration,
    SubmitLogin,
    Registered,
    Authenticated,
    Failed(String),
}

/// L'assistant: son état, le brouillon du rôle actif et le formulaire de connexion
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Wizard {
    state: WizardState,
    draft: Option<Draft>,
    login: LoginForm,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Le brouillon n'est modifiable que pendant l'inscription
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self.state.mode {
            Mode::Registration => self.draft.as_mut(),
            _ => None,
        }
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    pub fn login_form_mut(&mut self) -> &mut LoginForm {
        &mut self.login
    }

    /// Vrai si l'étape courante est la dernière du formulaire
    pub fn on_last_step(&self) -> bool {
        self.state.mode == Mode::Registration
            && self.state.role.map(Role::step_count) == Some(self.state.step)
    }

    /// Applique une action et renvoie le nouvel assistant.
    /// Une action qui ne s'applique pas à l'écran courant est sans effet.
    pub fn apply(mut self, action: Action) -> Self {
        debug!("Wizard {:?} <- {:?}", self.state.mode, action);

        match (self.state.mode, action) {
            (Mode::Login, Action::CreateAccount) if !self.state.in_flight => {
                self.state = WizardState {
                    mode: Mode::RoleSelection,
                    ..WizardState::default()
                };
            }

            (Mode::RoleSelection, Action::ShowLogin) => {
                self.state = WizardState::default();
            }

            (Mode::RoleSelection, Action::SelectRole(role)) => {
                self.draft = Some(Draft::empty(role));
                self.state = WizardState {
                    mode: Mode::Registration,
                    role: Some(role),
                    step: 1,
                    ..WizardState::default()
                };
            }

            (Mode::Registration, Action::Continue) if !self.state.in_flight => {
                if self.on_last_step() {
                    return self;
                }
                let Some(draft) = &self.draft else {
                    return self;
                };
                match validate_step(draft, self.state.step) {
                    Ok(()) => {
                        self.state.step += 1;
                        self.state.error = None;
                    }
                    Err(rejected) => self.state.error = Some(rejected.to_string()),
                }
            }

            (Mode::Registration, Action::Back) if !self.state.in_flight => {
                if self.state.step > 1 {
                    self.state.step -= 1;
                    self.state.error = None;
                } else {
                    self.draft = None;
                    self.state = WizardState {
                        mode: Mode::RoleSelection,
                        ..WizardState::default()
                    };
                }
            }

            (Mode::Registration, Action::SubmitRegistration)
                if !self.state.in_flight && self.on_last_step() =>
            {
                self.state.error = None;
                if let Some(draft) = &self.draft {
                    match validate_draft(draft) {
                        Ok(()) => self.state.in_flight = true,
                        Err(rejected) => self.state.error = Some(rejected.to_string()),
                    }
                }
            }

            (Mode::Login, Action::SubmitLogin) if !self.state.in_flight => {
                self.state.error = None;
                match validate_login(&self.login) {
                    Ok(()) => self.state.in_flight = true,
                    Err(rejected) => self.state.error = Some(rejected.to_string()),
                }
            }

            (Mode::Registration, Action::Registered) if self.state.in_flight => {
                let role = self.state.role;
                self.draft = None;
                self.login = LoginForm {
                    role,
                    ..LoginForm::default()
                };
                self.state = WizardState {
                    role,
                    ..WizardState::default()
                };
            }

            (Mode::Login, Action::Authenticated) if self.state.in_flight => {
                self.login.password.clear();
                self.state = WizardState {
                    mode: Mode::Authenticated,
                    role: self.login.role,
                    ..WizardState::default()
                };
            }

            (_, Action::Failed(message)) if self.state.in_flight => {
                self.state.in_flight = false;
                self.state.error = Some(message);
            }

            // Erreur hors soumission, par exemple un annuaire injoignable
            (Mode::Registration | Mode::Login, Action::Failed(message)) => {
                self.state.error = Some(message);
            }

            _ => {}
        }

        self
    }

    /// Variante en place de [`Wizard::apply`]
    pub fn dispatch(&mut self, action: Action) {
        *self = std::mem::take(self).apply(action);
    }
}
