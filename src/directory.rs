//! Annuaire des cliniques, utilisé pour rattacher un médecin à un établissement

use async_trait::async_trait;
use log::info;

use crate::gateway::GatewayError;
use crate::models::ClinicSummary;

/// Source de la liste des cliniques
#[async_trait]
pub trait ClinicDirectory {
    async fn list_clinics(&self) -> Result<Vec<ClinicSummary>, GatewayError>;
}

/// Filtre la liste sur le nom, sans tenir compte de la casse.
/// Un terme vide renvoie la liste telle quelle.
pub fn filter(list: &[ClinicSummary], term: &str) -> Vec<ClinicSummary> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return list.to_vec();
    }

    list.iter()
        .filter(|clinic| clinic.nom.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Liste des cliniques chargée au plus une fois par assistant
#[derive(Debug, Default)]
pub struct DirectoryCache {
    clinics: Option<Vec<ClinicSummary>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.clinics.is_some()
    }

    pub fn clinics(&self) -> &[ClinicSummary] {
        self.clinics.as_deref().unwrap_or_default()
    }

    pub fn find(&self, id: u64) -> Option<&ClinicSummary> {
        self.clinics().iter().find(|clinic| clinic.id == id)
    }

    /// Charge la liste si elle ne l'a pas encore été.
    /// En cas d'échec, rien n'est mis en cache.
    pub async fn ensure_loaded<D>(&mut self, directory: &D) -> Result<&[ClinicSummary], GatewayError>
    where
        D: ClinicDirectory + ?Sized,
    {
        if self.clinics.is_none() {
            let clinics = directory.list_clinics().await?;
            info!("{} cliniques chargées depuis l'annuaire", clinics.len());
            self.clinics = Some(clinics);
        }
        Ok(self.clinics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Vec<ClinicSummary> {
        vec![
            ClinicSummary::new(1, "Clinique A"),
            ClinicSummary::new(2, "Centre Hospitalier Abc"),
            ClinicSummary::new(3, "Polyclinique du Lac"),
        ]
    }

    struct CountingDirectory {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ClinicDirectory for CountingDirectory {
        async fn list_clinics(&self) -> Result<Vec<ClinicSummary>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(GatewayError::Unavailable)
            } else {
                Ok(sample())
            }
        }
    }

    #[test]
    fn test_empty_term_returns_list_unchanged() {
        let list = sample();
        assert_eq!(filter(&list, ""), list);
        assert_eq!(filter(&list, "   "), list);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let list = sample();
        assert_eq!(filter(&list, "ABC"), filter(&list, "abc"));
        assert_eq!(filter(&list, "abc"), vec![ClinicSummary::new(2, "Centre Hospitalier Abc")]);
    }

    #[test]
    fn test_filter_matches_substring() {
        let list = sample();
        let ids: Vec<u64> = filter(&list, "clinique").iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(filter(&list, "inexistante").is_empty());
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let directory = CountingDirectory { calls: AtomicUsize::new(0), fail: false };
        let mut cache = DirectoryCache::new();

        assert_eq!(cache.ensure_loaded(&directory).await.unwrap().len(), 3);
        assert_eq!(cache.ensure_loaded(&directory).await.unwrap().len(), 3);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1, "Clinic list was fetched twice");
        assert_eq!(cache.find(1).map(|c| c.nom.as_str()), Some("Clinique A"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let directory = CountingDirectory { calls: AtomicUsize::new(0), fail: true };
        let mut cache = DirectoryCache::new();

        assert!(cache.ensure_loaded(&directory).await.is_err());
        assert!(!cache.is_loaded());
        assert!(cache.clinics().is_empty());
    }
}
