//! End-to-end tests of the middleware chain over the full router, using the
//! in-memory repositories.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{
    config::PorticoConfig,
    models::{CreateOrgApiKey, CreateOrganization, CreateService, CreateUser, Feature,
        OrgKeyScope, OrgUserRole, UserRole},
    routes,
    state::AppState,
};

struct TestApp {
    state: AppState,
    router: Router,
}

async fn spawn_app() -> TestApp {
    let state = AppState::new(PorticoConfig::default()).expect("default config is valid");
    let router = routes::router(state.clone());
    TestApp { state, router }
}

impl TestApp {
    async fn request(
        &self,
        method: Method,
        path: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_user(&self, username: &str, role: UserRole) -> String {
        self.state
            .services
            .users
            .create(CreateUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                role,
            })
            .await
            .unwrap()
            .api_key
    }

    async fn create_org(&self, name: &str, owner: &str) -> uuid::Uuid {
        self.state
            .services
            .organizations
            .create(
                CreateOrganization {
                    name: name.to_string(),
                },
                owner.to_string(),
            )
            .await
            .unwrap()
            .id
    }

    async fn create_org_key(&self, org_id: uuid::Uuid, scope: OrgKeyScope) -> String {
        self.state
            .services
            .organizations
            .create_key(
                org_id,
                CreateOrgApiKey {
                    name: format!("key-{}", scope),
                    scope,
                },
            )
            .await
            .unwrap()
            .api_key
    }

    async fn seed_catalog(&self) {
        self.state
            .services
            .catalog
            .create(CreateService {
                name: "logs".to_string(),
                description: "Log retention".to_string(),
                features: vec![
                    Feature {
                        key: "archive".to_string(),
                        description: String::new(),
                        plans: vec!["basic".to_string(), "premium".to_string()],
                    },
                    Feature {
                        key: "replay".to_string(),
                        description: String::new(),
                        plans: vec!["premium".to_string()],
                    },
                ],
            })
            .await
            .unwrap();
    }
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;
    let (status, body) = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn health_stays_public_with_credentials_attached() {
    let app = spawn_app().await;
    let key = app.create_user("alice", UserRole::User).await;
    let (status, _) = app
        .request(Method::GET, "/api/v1/health", Some(&key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn anonymous_request_to_protected_route_is_401() {
    let app = spawn_app().await;
    let (status, body) = app.request(Method::GET, "/api/v1/services", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "missing_credentials");
}

#[tokio::test]
async fn unknown_prefix_is_rejected_before_table_lookup() {
    let app = spawn_app().await;
    // Even on a public route the malformed credential fails fast.
    let (status, body) = app
        .request(Method::GET, "/api/v1/health", Some("sk_bogus"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "invalid_api_key_format");
}

#[tokio::test]
async fn unknown_user_key_is_401() {
    let app = spawn_app().await;
    let (status, body) = app
        .request(Method::GET, "/api/v1/services", Some("usr_unknown"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "invalid_api_key");
    assert_eq!(body["error"]["message"], "Invalid user API key");
}

#[tokio::test]
async fn unknown_org_key_is_401() {
    let app = spawn_app().await;
    let (status, body) = app
        .request(Method::GET, "/api/v1/services", Some("org_unknown"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid organization API key");
}

#[tokio::test]
async fn unmatched_route_is_denied_by_default() {
    let app = spawn_app().await;
    let key = app.create_user("alice", UserRole::Admin).await;
    let (status, body) = app
        .request(Method::DELETE, "/api/v1/unknown", Some(&key), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "access_denied");
}

#[tokio::test]
async fn user_management_requires_platform_admin() {
    let app = spawn_app().await;
    let user_key = app.create_user("alice", UserRole::User).await;
    let admin_key = app.create_user("root", UserRole::Admin).await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/users", Some(&user_key), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "insufficient_role");

    let (status, body) = app
        .request(Method::GET, "/api/v1/users", Some(&admin_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn user_creation_over_http() {
    let app = spawn_app().await;
    let admin_key = app.create_user("root", UserRole::Admin).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(&admin_key),
            Some(json!({
                "username": "bob",
                "email": "bob@example.com",
                "role": "user"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let issued_key = body["api_key"].as_str().unwrap();
    assert!(issued_key.starts_with("usr_"));

    // The fresh key works immediately.
    let (status, body) = app
        .request(Method::GET, "/api/v1/me", Some(issued_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "bob");
}

#[tokio::test]
async fn org_key_is_rejected_on_user_only_route() {
    let app = spawn_app().await;
    let org_id = app.create_org("Acme", "alice").await;
    let org_key = app.create_org_key(org_id, OrgKeyScope::All).await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/me", Some(&org_key), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "org_key_not_allowed");
}

#[tokio::test]
async fn org_scope_decides_per_method() {
    let app = spawn_app().await;
    app.seed_catalog().await;
    let org_id = app.create_org("Acme", "alice").await;
    let eval_key = app.create_org_key(org_id, OrgKeyScope::Evaluation).await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/services", Some(&eval_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/services",
            Some(&eval_key),
            Some(json!({"name": "new-service", "features": []})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "insufficient_scope");
}

#[tokio::test]
async fn revoked_org_key_stops_authenticating() {
    let app = spawn_app().await;
    let org_id = app.create_org("Acme", "alice").await;
    let created = app
        .state
        .services
        .organizations
        .create_key(
            org_id,
            CreateOrgApiKey {
                name: "ops".to_string(),
                scope: OrgKeyScope::All,
            },
        )
        .await
        .unwrap();

    let (status, _) = app
        .request(Method::GET, "/api/v1/services", Some(&created.api_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    app.state
        .services
        .organizations
        .revoke_key(org_id, created.key.id)
        .await
        .unwrap();

    let (status, _) = app
        .request(Method::GET, "/api/v1/services", Some(&created.api_key), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn org_role_governs_organization_updates() {
    let app = spawn_app().await;
    let owner_key = app.create_user("alice", UserRole::User).await;
    let manager_key = app.create_user("bob", UserRole::User).await;
    let stranger_key = app.create_user("charlie", UserRole::User).await;
    let admin_key = app.create_user("root", UserRole::Admin).await;

    let org_id = app.create_org("Acme", "alice").await;
    app.state
        .services
        .organizations
        .add_member(org_id, "bob".to_string(), OrgUserRole::Manager)
        .await
        .unwrap();

    let path = format!("/api/v1/organizations/{}", org_id);
    let rename = json!({"name": "Acme Renamed"});

    // Manager is a member but below the owner/admin bar for updates.
    let (status, body) = app
        .request(Method::PATCH, &path, Some(&manager_key), Some(rename.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "insufficient_org_role");

    // A non-member cannot even read membership standing.
    let (status, body) = app
        .request(Method::PATCH, &path, Some(&stranger_key), Some(rename.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "not_a_member");

    // The owner passes.
    let (status, _) = app
        .request(Method::PATCH, &path, Some(&owner_key), Some(rename.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A platform admin passes without membership.
    let (status, _) = app
        .request(Method::PATCH, &path, Some(&admin_key), Some(rename))
        .await;
    assert_eq!(status, StatusCode::OK);

    // The manager may still read the organization.
    let (status, body) = app
        .request(Method::GET, &path, Some(&manager_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme Renamed");
}

#[tokio::test]
async fn missing_organization_is_404_during_role_resolution() {
    let app = spawn_app().await;
    let key = app.create_user("alice", UserRole::User).await;
    let path = format!("/api/v1/organizations/{}", uuid::Uuid::new_v4());
    let (status, body) = app.request(Method::GET, &path, Some(&key), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "organization_not_found");
}

#[tokio::test]
async fn org_key_reads_only_its_own_organization() {
    let app = spawn_app().await;
    let org_a = app.create_org("Acme", "alice").await;
    let org_b = app.create_org("Umbrella", "eve").await;
    let key_a = app.create_org_key(org_a, OrgKeyScope::All).await;

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}", org_a),
            Some(&key_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/organizations/{}", org_b),
            Some(&key_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "not_a_member");
}

#[tokio::test]
async fn contract_and_evaluation_flow() {
    let app = spawn_app().await;
    app.seed_catalog().await;
    let owner_key = app.create_user("alice", UserRole::User).await;
    let org_id = app.create_org("Acme", "alice").await;
    let eval_key = app.create_org_key(org_id, OrgKeyScope::Evaluation).await;
    let mgmt_key = app.create_org_key(org_id, OrgKeyScope::Management).await;

    // No active contract yet.
    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/evaluation/logs?organization_id={}", org_id),
            Some(&owner_key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The evaluation key cannot create contracts...
    let contract_body = json!({
        "organization_id": org_id,
        "service": "logs",
        "plan": "basic"
    });
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/contracts",
            Some(&eval_key),
            Some(contract_body.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // ...the management key can.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/contracts",
            Some(&mgmt_key),
            Some(contract_body),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["plan"], "basic");

    // Evaluation through the org evaluation key: plan gates features.
    let (status, body) = app
        .request(Method::GET, "/api/v1/evaluation/logs", Some(&eval_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "basic");
    let features = body["features"].as_array().unwrap();
    assert_eq!(features[0]["key"], "archive");
    assert_eq!(features[0]["enabled"], true);
    assert_eq!(features[1]["key"], "replay");
    assert_eq!(features[1]["enabled"], false);

    // The management key lacks the evaluation scope.
    let (status, body) = app
        .request(Method::GET, "/api/v1/evaluation/logs", Some(&mgmt_key), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "insufficient_scope");
}

#[tokio::test]
async fn contract_creation_requires_management_standing_for_users() {
    let app = spawn_app().await;
    app.seed_catalog().await;
    let evaluator_key = app.create_user("dave", UserRole::User).await;
    let org_id = app.create_org("Acme", "alice").await;
    app.state
        .services
        .organizations
        .add_member(org_id, "dave".to_string(), OrgUserRole::Evaluator)
        .await
        .unwrap();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/contracts",
            Some(&evaluator_key),
            Some(json!({
                "organization_id": org_id,
                "service": "logs",
                "plan": "basic"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "insufficient_org_role");
}

#[tokio::test]
async fn rotated_user_key_invalidates_the_old_one() {
    let app = spawn_app().await;
    let admin_key = app.create_user("root", UserRole::Admin).await;
    let old_key = app.create_user("alice", UserRole::User).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users/alice/rotate-key",
            Some(&admin_key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_key = body["api_key"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(Method::GET, "/api/v1/me", Some(&old_key), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/v1/me", Some(&new_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn requests_outside_the_base_path_are_denied() {
    let app = spawn_app().await;
    let key = app.create_user("alice", UserRole::Admin).await;
    // The path reaches the table unstripped and matches no rule.
    let (status, body) = app.request(Method::GET, "/outside", Some(&key), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "access_denied");
}
