use anyhow::Result;
use derive_more::Display;
use dotenv::dotenv;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use medirdv::config::Config;
use medirdv::controller::{SubmitOutcome, WizardController};
use medirdv::db::JsonFileStore;
use medirdv::gateway::{HttpTransport, SubmissionGateway};
use medirdv::models::*;
use medirdv::session::Session;
use medirdv::wizard::{Action, Mode};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tokio::runtime::Runtime;

type Controller = WizardController<HttpTransport>;

type MenuExit = Option<()>;
const MENU_EXIT: MenuExit = None;
const MENU_LOOP: MenuExit = Some(());

/// Représente un menu texte
trait Menu {
    /// Implémente le contenu du menu. La valeur de retour
    /// doit être None si le menu souhaite terminer,
    /// ou Some(()) s'il faut le relancer.
    fn enter(&mut self) -> Result<MenuExit>;

    /// Lance le menu en boucle, en interceptant les erreurs,
    /// sauf si le menu souhaite quitter.
    fn enter_loop(&mut self) {
        while let Some(result) = self.enter().transpose() {
            if let Err(error) = result {
                eprintln!("Erreur: {error}");
            }
        }
    }
}

fn text(message: &str, current: &str) -> Result<String> {
    Ok(Text::new(message).with_initial_value(current).prompt()?)
}

fn password(message: &str) -> Result<String> {
    Ok(Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?)
}

/// Choix facultatif: le curseur part de la valeur actuelle, Échap la conserve
fn optional_select<T>(message: &str, current: Option<T>) -> Result<Option<T>>
where
    T: IntoEnumIterator + PartialEq + Copy + std::fmt::Display,
{
    let options: Vec<T> = T::iter().collect();
    let cursor = starting_cursor(&options, current);
    let chosen = Select::new(message, options)
        .with_starting_cursor(cursor)
        .prompt_skippable()?;
    Ok(chosen.or(current))
}

fn starting_cursor<T: PartialEq>(options: &[T], current: Option<T>) -> usize {
    current
        .and_then(|value| options.iter().position(|o| *o == value))
        .unwrap_or(0)
}

pub struct App {
    runtime: Runtime,
    controller: Controller,
    session: Session<JsonFileStore>,
}

impl App {
    pub fn new(runtime: Runtime, controller: Controller, session: Session<JsonFileStore>) -> Self {
        App {
            runtime,
            controller,
            session,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        println!("Bienvenue sur MediRDV, la prise de rendez-vous médicaux en ligne.");
        self.enter_loop();
        Ok(())
    }

    fn show_error(&self) {
        if let Some(error) = &self.controller.state().error {
            eprintln!("[!] {error}");
        }
    }

    fn login_screen(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[display("Se connecter")]
            Login,
            #[display("Créer un compte")]
            Register,
            #[display("Quitter")]
            Exit,
        }

        match Select::new("Que voulez-vous faire ?", Choice::iter().collect()).prompt()? {
            Choice::Login => {
                let roles: Vec<Role> = Role::iter().collect();
                let form = self.controller.login_form_mut();
                let cursor = form
                    .role
                    .and_then(|role| roles.iter().position(|r| *r == role))
                    .unwrap_or(0);
                form.role = Some(Select::new("Type de compte:", roles).with_starting_cursor(cursor).prompt()?);
                form.email = text("Email:", &form.email)?;
                form.password = password("Mot de passe:")?;

                let outcome = self
                    .runtime
                    .block_on(self.controller.submit_login(&mut self.session))?;
                if outcome == SubmitOutcome::Refused {
                    self.show_error();
                }
            }
            Choice::Register => self.controller.dispatch(Action::CreateAccount),
            Choice::Exit => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }

    fn role_selection(&mut self) -> Result<MenuExit> {
        #[derive(Display)]
        enum Choice {
            #[display("{_0}")]
            Role(Role),
            #[display("J'ai déjà un compte")]
            Login,
        }

        let choices = Role::iter().map(Choice::Role).chain([Choice::Login]).collect();
        match Select::new("Quel type de compte voulez-vous créer ?", choices).prompt()? {
            Choice::Role(role) => self.controller.dispatch(Action::SelectRole(role)),
            Choice::Login => self.controller.dispatch(Action::ShowLogin),
        }
        Ok(MENU_LOOP)
    }

    fn registration(&mut self) -> Result<MenuExit> {
        let (Some(role), step) = (self.controller.state().role, self.controller.state().step) else {
            self.controller.reset();
            return Ok(MENU_LOOP);
        };
        println!("\n[{role}] Étape {step}/{}", role.step_count());

        RegistrationStep {
            runtime: &self.runtime,
            controller: &mut self.controller,
        }
        .fill(step)?;

        #[derive(Display)]
        enum Choice {
            #[display("Continuer")]
            Continue,
            #[display("Créer mon compte")]
            Submit,
            #[display("Retour")]
            Back,
        }

        let forward = if self.controller.wizard().on_last_step() {
            Choice::Submit
        } else {
            Choice::Continue
        };
        match Select::new("Suite:", vec![forward, Choice::Back]).prompt()? {
            Choice::Continue => self.controller.dispatch(Action::Continue),
            Choice::Submit => {
                let outcome = self.runtime.block_on(self.controller.submit_registration())?;
                if outcome == SubmitOutcome::Succeeded {
                    println!("[*] Compte créé. Vous pouvez maintenant vous connecter.");
                }
            }
            Choice::Back => self.controller.dispatch(Action::Back),
        }
        self.show_error();
        Ok(MENU_LOOP)
    }
}

impl Menu for App {
    fn enter(&mut self) -> Result<MenuExit> {
        if self.session.is_authenticated() {
            UserMenu {
                runtime: &self.runtime,
                controller: &self.controller,
                session: &mut self.session,
            }
            .enter_loop();
            self.controller.reset();
            return Ok(MENU_LOOP);
        }

        match self.controller.state().mode {
            Mode::Login => self.login_screen(),
            Mode::RoleSelection => self.role_selection(),
            Mode::Registration => self.registration(),
            // La session a été fermée ailleurs
            Mode::Authenticated => {
                self.controller.reset();
                Ok(MENU_LOOP)
            }
        }
    }
}

/// Saisie des champs d'une étape du formulaire d'inscription
struct RegistrationStep<'app> {
    runtime: &'app Runtime,
    controller: &'app mut Controller,
}

impl RegistrationStep<'_> {
    fn fill(&mut self, step: u8) -> Result<()> {
        let Some(draft) = self.controller.draft_mut() else {
            return Ok(());
        };
        match (draft, step) {
            (Draft::Patient(d), 1) => {
                d.first_name = text("Prénom:", &d.first_name)?;
                d.last_name = text("Nom:", &d.last_name)?;
                d.email = text("Email:", &d.email)?;
                d.phone = text("Téléphone:", &d.phone)?;
            }
            (Draft::Patient(d), 2) => {
                d.address = text("Adresse:", &d.address)?;
                d.blood_type = optional_select("Groupe sanguin (Échap pour passer):", d.blood_type)?;
                d.hiv_status = optional_select("Statut VIH (Échap pour passer):", d.hiv_status)?;
                d.medical_history = text("Antécédents médicaux:", &d.medical_history)?;
                d.allergies = text("Allergies:", &d.allergies)?;
                d.chronic_treatments = text("Traitements chroniques:", &d.chronic_treatments)?;
            }
            (Draft::Practitioner(d), 1) => {
                d.first_name = text("Prénom:", &d.first_name)?;
                d.last_name = text("Nom:", &d.last_name)?;
                d.email = text("Email:", &d.email)?;
                d.phone = text("Téléphone:", &d.phone)?;
            }
            (Draft::Practitioner(d), 2) => {
                d.specialty = Select::new("Spécialité:", SPECIALTIES.to_vec()).prompt()?.to_owned();
                d.address = text("Adresse du cabinet:", &d.address)?;
                d.commune = text("Commune:", &d.commune)?;
                d.city = text("Ville:", &d.city)?;
                self.practice()?;
            }
            (Draft::Clinic(d), 1) => {
                d.name = text("Nom de l'établissement:", &d.name)?;
                d.email = text("Email:", &d.email)?;
                d.phone = text("Téléphone:", &d.phone)?;
                d.address = text("Adresse:", &d.address)?;
                d.description = text("Description:", &d.description)?;
                d.establishment_type = Some(
                    Select::new("Type d'établissement:", EstablishmentType::iter().collect())
                        .prompt()?,
                );
                d.emergency_24h = Confirm::new("Urgences 24h/24 ?")
                    .with_default(d.emergency_24h)
                    .prompt()?;
                d.parking = Confirm::new("Parking ?").with_default(d.parking).prompt()?;
                d.website = text("Site web:", &d.website)?;
            }
            (draft, _) => Self::credentials(draft)?,
        }
        Ok(())
    }

    fn credentials(draft: &mut Draft) -> Result<()> {
        let (pwd, confirmation) = match draft {
            Draft::Patient(d) => (&mut d.password, &mut d.confirmation),
            Draft::Practitioner(d) => (&mut d.password, &mut d.confirmation),
            Draft::Clinic(d) => (&mut d.password, &mut d.confirmation),
        };
        *pwd = password("Mot de passe (8 caractères minimum):")?;
        *confirmation = password("Confirmez le mot de passe:")?;
        Ok(())
    }

    /// Mode d'exercice, et choix de la clinique pour un médecin rattaché
    fn practice(&mut self) -> Result<()> {
        let practice_type = Select::new("Mode d'exercice:", PracticeType::iter().collect()).prompt()?;
        self.runtime
            .block_on(self.controller.set_practice_type(practice_type));
        if practice_type == PracticeType::Independent {
            return Ok(());
        }
        if !self.controller.clinics_loaded() {
            if let Some(error) = &self.controller.state().error {
                eprintln!("[!] {error}");
            }
            return Ok(());
        }

        let term = Text::new("Rechercher une clinique (vide pour tout afficher):").prompt()?;
        let choices = self.controller.clinic_choices(&term);
        if choices.is_empty() {
            println!("[*] Aucune clinique ne correspond à « {term} »");
            return Ok(());
        }
        let clinic = Select::new("Clinique:", choices).prompt()?;
        self.controller.select_clinic(clinic.id);

        if let Some(Draft::Practitioner(d)) = self.controller.draft_mut() {
            d.function = text("Fonction dans la clinique:", &d.function)?;
        }
        Ok(())
    }
}

struct UserMenu<'app> {
    runtime: &'app Runtime,
    controller: &'app Controller,
    session: &'app mut Session<JsonFileStore>,
}

impl Menu for UserMenu<'_> {
    fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[display("Voir mon profil")]
            Profile,
            #[display("Se déconnecter")]
            Logout,
        }

        let Some(identity) = self.session.identity() else {
            return Ok(MENU_EXIT);
        };
        println!("[*] Connecté en tant que {} ({})", identity.display_name(), identity.role);

        match Select::new("Que voulez-vous faire ?", Choice::iter().collect()).prompt()? {
            Choice::Profile => {
                println!("{}", serde_json::to_string_pretty(&identity.profile)?);
                Ok(MENU_LOOP)
            }
            Choice::Logout => {
                self.runtime
                    .block_on(self.session.logout(self.controller.gateway()))?;
                println!("[*] À bientôt.");
                Ok(MENU_EXIT)
            }
        }
    }
}

fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::from_env()?;
    simple_logging::log_to_file(&config.log_file, log::LevelFilter::Info)?;

    let runtime = Runtime::new()?;
    let session = Session::restore(JsonFileStore::open(config.session_file.clone())?);
    let gateway = SubmissionGateway::new(HttpTransport::new(config.api_url.clone()));

    App::new(runtime, WizardController::new(gateway), session).start()
}
