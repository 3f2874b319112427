use std::sync::Arc;

use blueprints_config::{BlueprintsConfig, ConfigError};
use blueprints_store::{
    Blueprint, BlueprintService, BlueprintStore, InMemoryBlueprintStore, Point, ServiceError,
};
use blueprints_token::{KeyMaterial, TokenIssuer, TokenVerifier, DEFAULT_KEY_BITS};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::auth::{Authenticator, LoginError};
use crate::credentials::InMemoryCredentialStore;
use crate::error::ApiError;
use crate::guard::{AuthorizationGuard, AuthzError};
use crate::operation::Operation;
use crate::response::{
    ApiResponse, BlueprintResponse, LoginRequest, MessageResponse, NewBlueprintRequest,
};

/// Status and JSON body produced for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!(error = %e, "Failed to serialize response body");
                Self::envelope_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }

    fn envelope<T: Serialize>(response: ApiResponse<T>) -> Self {
        let status =
            StatusCode::from_u16(response.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::json(status, &response)
    }

    fn envelope_error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({
                "code": status.as_u16(),
                "message": message.into(),
                "data": null,
            }),
        }
    }
}

/// Framework-agnostic boundary of the Blueprints API.
///
/// A transport adapter hands over the raw `Authorization` header and a decoded
/// [`Operation`]; it gets back a status code and a JSON body.
#[derive(Debug, Clone)]
pub struct BlueprintsApi {
    authenticator: Authenticator,
    guard: AuthorizationGuard,
    service: BlueprintService,
    keys: Arc<KeyMaterial>,
}

impl BlueprintsApi {
    /// Wire every component from a configuration using the in-memory store
    pub fn from_config(config: &BlueprintsConfig) -> Result<Self, ApiError> {
        Self::with_store(config, Arc::new(InMemoryBlueprintStore::new()))
    }

    /// Wire every component from a configuration on top of the given store
    pub fn with_store(
        config: &BlueprintsConfig,
        store: Arc<dyn BlueprintStore>,
    ) -> Result<Self, ApiError> {
        config.validate()?;

        let keys = match (&config.private_key, &config.public_key) {
            (Some(private_pem), Some(public_pem)) => {
                KeyMaterial::from_pem(private_pem, public_pem)?
            }
            _ => {
                info!("No key pair configured, generating an ephemeral one");
                KeyMaterial::generate(DEFAULT_KEY_BITS)?
            }
        };
        let keys = Arc::new(keys);

        let ttl = i64::try_from(config.ttl_seconds()).map_err(|_| ConfigError::InvalidTtl)?;
        let issuer = TokenIssuer::new(keys.clone(), config.issuer.clone()).with_ttl(ttl)?;
        let verifier = TokenVerifier::new(keys.clone(), config.issuer.clone());
        let credentials = Arc::new(InMemoryCredentialStore::from_users(&config.users));

        let mut service = BlueprintService::new(store).with_filter(config.filter.into());
        if let Some(timeout) = config.store_timeout() {
            service = service.with_timeout(timeout);
        }

        Ok(Self {
            authenticator: Authenticator::new(credentials, issuer, config.scope_policy),
            guard: AuthorizationGuard::new(verifier),
            service,
            keys,
        })
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn guard(&self) -> &AuthorizationGuard {
        &self.guard
    }

    pub fn service(&self) -> &BlueprintService {
        &self.service
    }

    /// PEM of the key tokens are verified with, for third-party verifiers
    pub fn public_key_pem(&self) -> &str {
        self.keys.public_key_pem()
    }

    pub fn login(&self, request: &LoginRequest) -> Reply {
        match self
            .authenticator
            .login(&request.username, &request.password)
        {
            Ok(response) => Reply::json(StatusCode::OK, &response),
            Err(LoginError::InvalidCredentials) => Reply {
                status: StatusCode::UNAUTHORIZED,
                body: json!({ "error": "invalid_credentials" }),
            },
            Err(LoginError::Token(e)) => {
                error!(error = %e, "Failed to issue token");
                Reply {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "error": "token_issue_failed" }),
                }
            }
        }
    }

    /// Authorize and run one operation
    pub async fn dispatch(&self, authorization: Option<&str>, operation: Operation) -> Reply {
        if let Err(e) = self.guard.check(authorization, &operation) {
            return authz_reply(&e);
        }

        match self.run(operation).await {
            Ok(reply) => reply,
            Err(e) => service_reply(&e),
        }
    }

    async fn run(&self, operation: Operation) -> Result<Reply, ServiceError> {
        let reply = match operation {
            Operation::ListAll => {
                let blueprints = self.service.list_all().await?;
                Reply::envelope(ApiResponse::ok(to_responses(blueprints)))
            }
            Operation::ListByAuthor { author } => {
                let blueprints = self.service.list_by_author(&author).await?;
                Reply::envelope(ApiResponse::ok(to_responses(blueprints)))
            }
            Operation::GetOne { author, name } => {
                let blueprint = self.service.get_one(&author, &name).await?;
                Reply::envelope(ApiResponse::ok(BlueprintResponse::from(&blueprint)))
            }
            Operation::Create(NewBlueprintRequest {
                author,
                name,
                points,
            }) => {
                let points = points.into_iter().map(Point::from).collect();
                let blueprint = self.service.create(&author, &name, points).await?;
                Reply::envelope(ApiResponse::created(BlueprintResponse::from(&blueprint)))
            }
            Operation::AddPoint {
                author,
                name,
                point,
            } => {
                self.service
                    .add_point(&author, &name, point.x, point.y)
                    .await?;
                Reply::envelope(ApiResponse::accepted(MessageResponse::new(
                    "Point added successfully",
                )))
            }
        };
        Ok(reply)
    }
}

/// Stable output order for sets, by author then name
fn to_responses(blueprints: impl IntoIterator<Item = Blueprint>) -> Vec<BlueprintResponse> {
    let mut responses: Vec<BlueprintResponse> = blueprints
        .into_iter()
        .map(|bp| BlueprintResponse::from(&bp))
        .collect();
    responses.sort_by(|a, b| (&a.author, &a.name).cmp(&(&b.author, &b.name)));
    responses
}

fn authz_reply(error: &AuthzError) -> Reply {
    let status = match error {
        AuthzError::MissingToken | AuthzError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AuthzError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthzError::Internal(e) => {
            error!(error = %e, "Token verification failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    Reply::envelope_error(status, error.to_string())
}

fn service_reply(error: &ServiceError) -> Reply {
    let status = match error {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::PersistenceConflict(_) => StatusCode::FORBIDDEN,
        ServiceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Reply::envelope_error(status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::AddPointRequest;
    use crate::test_support::shared_pems;
    use blueprints_config::{FilterKind, UserCredential};
    use blueprints_store::BlueprintsFilter;

    fn config() -> BlueprintsConfig {
        let (private_pem, public_pem) = shared_pems();
        BlueprintsConfig::builder()
            .key_pair(private_pem, public_pem)
            .build()
            .unwrap()
    }

    fn bearer(api: &BlueprintsApi, username: &str, password: &str) -> String {
        let reply = api.login(&LoginRequest {
            username: username.into(),
            password: password.into(),
        });
        assert_eq!(reply.status, StatusCode::OK);
        format!("Bearer {}", reply.body["access_token"].as_str().unwrap())
    }

    #[test]
    fn test_login_reply_shapes() {
        let api = BlueprintsApi::from_config(&config()).unwrap();

        let ok = api.login(&LoginRequest {
            username: "student".into(),
            password: "student123".into(),
        });
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(ok.body["token_type"], "Bearer");
        assert_eq!(ok.body["expires_in"], 3600);

        let denied = api.login(&LoginRequest {
            username: "student".into(),
            password: "nope".into(),
        });
        assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
        assert_eq!(denied.body, json!({ "error": "invalid_credentials" }));
    }

    #[test]
    fn test_from_config_applies_filter() {
        let config = config().to_builder().filter(FilterKind::Undersampling).build().unwrap();
        let api = BlueprintsApi::from_config(&config).unwrap();
        assert_eq!(api.service().filter(), BlueprintsFilter::Undersampling);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = config();
        config.issuer.clear();
        assert!(matches!(
            BlueprintsApi::from_config(&config),
            Err(ApiError::Config(ConfigError::MissingIssuer))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_status_codes() {
        let api = BlueprintsApi::from_config(&config()).unwrap();
        let auth = bearer(&api, "student", "student123");

        let create = Operation::Create(NewBlueprintRequest {
            author: "a".into(),
            name: "b".into(),
            points: vec![],
        });
        assert_eq!(api.dispatch(Some(&auth), create.clone()).await.status, StatusCode::CREATED);

        let conflict = api.dispatch(Some(&auth), create).await;
        assert_eq!(conflict.status, StatusCode::FORBIDDEN);
        assert_eq!(conflict.body["data"], Value::Null);

        let add = api
            .dispatch(
                Some(&auth),
                Operation::AddPoint {
                    author: "a".into(),
                    name: "b".into(),
                    point: AddPointRequest { x: 1, y: 2 },
                },
            )
            .await;
        assert_eq!(add.status, StatusCode::ACCEPTED);
        assert_eq!(add.body["message"], "accepted");
        assert_eq!(add.body["data"]["message"], "Point added successfully");

        let missing = api
            .dispatch(
                Some(&auth),
                Operation::GetOne {
                    author: "a".into(),
                    name: "zzz".into(),
                },
            )
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.body["message"], "Blueprint not found: a, zzz");

        let anonymous = api.dispatch(None, Operation::ListAll).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authz_reply_statuses() {
        use blueprints_token::TokenError;

        assert_eq!(authz_reply(&AuthzError::MissingToken).status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            authz_reply(&AuthzError::from(TokenError::ExpiredToken)).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            authz_reply(&AuthzError::Forbidden {
                subject: "viewer".into(),
                required: crate::operation::Scope::Write,
            })
            .status,
            StatusCode::FORBIDDEN
        );

        let internal = authz_reply(&AuthzError::from(TokenError::invalid_key("bad modulus")));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body["data"], Value::Null);
    }

    #[test]
    fn test_from_config_rejects_overlong_ttl() {
        let mut config = config();
        config.token_ttl_seconds = Some(i64::MAX as u64);
        assert!(matches!(
            BlueprintsApi::from_config(&config),
            Err(ApiError::Config(ConfigError::InvalidTtl))
        ));
    }

    #[tokio::test]
    async fn test_read_only_user_gets_403_on_writes() {
        let config = config()
            .to_builder()
            .user(UserCredential::new("viewer", "viewer123", ["blueprints.read"]))
            .build()
            .unwrap();
        let api = BlueprintsApi::from_config(&config).unwrap();
        let auth = bearer(&api, "viewer", "viewer123");

        assert_eq!(
            api.dispatch(Some(&auth), Operation::ListAll).await.status,
            StatusCode::OK
        );

        let write = Operation::Create(NewBlueprintRequest {
            author: "viewer".into(),
            name: "sketch".into(),
            points: vec![],
        });
        assert_eq!(
            api.dispatch(Some(&auth), write).await.status,
            StatusCode::FORBIDDEN
        );
        assert!(api.service().list_all().await.unwrap().is_empty());
    }
}
