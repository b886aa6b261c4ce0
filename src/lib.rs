//! Assistant de connexion et d'inscription d'une plateforme de prise de
//! rendez-vous médicaux: patients, médecins et cliniques.

pub mod config;
pub mod consts;
pub mod controller;
pub mod db;
pub mod directory;
pub mod gateway;
pub mod models;
pub mod payload;
pub mod session;
pub mod utils;
pub mod wizard;
