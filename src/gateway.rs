//! Accès à l'API distante: connexion, inscription, déconnexion et annuaire.
//!
//! Le transport HTTP est derrière le trait [`Transport`]; la passerelle ne fait
//! que construire les requêtes et interpréter les réponses.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::directory::ClinicDirectory;
use crate::models::{ClinicSummary, LoginSuccess, Role};
use crate::payload::RegisterPayload;
use crate::utils::error_messages::GENERIC_ERROR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Une requête vers l'API, chemin relatif à l'URL de base
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// La requête n'a pas abouti (réseau, URL invalide...)
#[derive(Debug, Error)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Transport HTTP basé sur reqwest, sans délai d'expiration propre
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|e| TransportError(e.to_string()))?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

/// Échec d'un appel, tel que présenté à l'utilisateur
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Refus structuré du serveur (4xx avec un message)
    #[error("{0}")]
    Rejected(String),

    #[error("{}", GENERIC_ERROR)]
    Unavailable,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Classe la réponse: 2xx renvoie le corps, 4xx avec message devient un refus,
/// tout le reste est une erreur générique.
fn classify(result: Result<ApiResponse, TransportError>) -> Result<String, GatewayError> {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!("{e}");
            return Err(GatewayError::Unavailable);
        }
    };

    match response.status {
        200..=299 => Ok(response.body),
        400..=499 => match serde_json::from_str::<ErrorBody>(&response.body) {
            Ok(ErrorBody { message }) => Err(GatewayError::Rejected(message)),
            Err(_) => {
                warn!("Unstructured {} response", response.status);
                Err(GatewayError::Unavailable)
            }
        },
        status => {
            warn!("Unexpected status {status}");
            Err(GatewayError::Unavailable)
        }
    }
}

/// Point d'entrée unique vers l'API
pub struct SubmissionGateway<T> {
    transport: T,
}

impl<T: Transport> SubmissionGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&self, request: ApiRequest) -> Result<String, GatewayError> {
        debug!("{:?} {}", request.method, request.path);
        classify(self.transport.send(request).await)
    }

    /// Connexion: `POST <role>/login`. Le profil est lu sous la clé du rôle.
    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<LoginSuccess, GatewayError> {
        let body = self
            .call(ApiRequest {
                method: Method::Post,
                path: format!("{}/login", role.api_segment()),
                body: Some(json!({ "email": email.trim(), "password": password })),
                bearer: None,
            })
            .await?;

        let mut reply: Value = serde_json::from_str(&body).map_err(|_| GatewayError::Unavailable)?;
        let profile = reply
            .get_mut(role.api_segment())
            .map(Value::take)
            .filter(Value::is_object);
        let token = reply
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match (profile, token) {
            (Some(profile), Some(access_token)) => {
                info!("Connexion réussie ({role})");
                Ok(LoginSuccess {
                    profile,
                    access_token,
                })
            }
            _ => {
                warn!("Malformed login response for {role}");
                Err(GatewayError::Unavailable)
            }
        }
    }

    /// Inscription: `POST <role>/register`
    pub async fn register(&self, payload: &RegisterPayload) -> Result<(), GatewayError> {
        let role = payload.role();
        let body = serde_json::to_value(payload).map_err(|_| GatewayError::Unavailable)?;
        self.call(ApiRequest {
            method: Method::Post,
            path: format!("{}/register", role.api_segment()),
            body: Some(body),
            bearer: None,
        })
        .await?;

        info!("Compte {role} créé avec succès");
        Ok(())
    }

    /// Invalidation du jeton côté serveur
    pub async fn logout(&self, role: Role, token: &str) -> Result<(), GatewayError> {
        self.call(ApiRequest {
            method: Method::Post,
            path: format!("{}/logout", role.api_segment()),
            body: None,
            bearer: Some(token.to_owned()),
        })
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl<T: Transport> ClinicDirectory for SubmissionGateway<T> {
    async fn list_clinics(&self) -> Result<Vec<ClinicSummary>, GatewayError> {
        let body = self
            .call(ApiRequest {
                method: Method::Get,
                path: "cliniques".to_owned(),
                body: None,
                bearer: None,
            })
            .await?;
        serde_json::from_str(&body).map_err(|_| GatewayError::Unavailable)
    }
}
