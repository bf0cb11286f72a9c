//! Store Admin API Integration Tests
//!
//! Drives the session, access, team and stores routers end to end over the
//! in-memory directory with signed bearer tokens.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use utoipa_axum::router::OpenApiRouter;

use sa_access::access::access_router;
use sa_access::directory::{MembershipDirectory, MemoryDirectory};
use sa_access::membership::{team_router, TeamState};
use sa_access::session::{session_router, SessionManager, SessionState};
use sa_access::store::{stores_router, StoresState};
use sa_access::{
    AppState, AuthLayer, Identity, JwtIdentityProvider, Membership, Role, Store, StoreStatus, User,
};

const SECRET: &str = "integration-test-secret";
const SIGN_IN: &str = "/handler/login";
const COOKIE: &str = "sa_session";

struct TestApp {
    app: Router,
    provider: Arc<JwtIdentityProvider>,
}

impl TestApp {
    fn new(directory: Arc<dyn MembershipDirectory>, lookup_timeout: Duration) -> Self {
        let provider = Arc::new(JwtIdentityProvider::new(SECRET, "storeadmin", "storeadmin-console"));
        let sessions = Arc::new(SessionManager::new(directory, lookup_timeout));

        let state = AppState {
            identity_provider: provider.clone(),
            sessions: sessions.clone(),
            sign_in_url: SIGN_IN.to_string(),
            session_cookie: COOKIE.to_string(),
        };

        let (router, _openapi) = OpenApiRouter::new()
            .nest("/api/session", session_router(SessionState { sessions: sessions.clone() }))
            .nest("/api/access", access_router())
            .nest("/api/team", team_router(TeamState { sessions: sessions.clone() }))
            .nest("/api/stores", stores_router(StoresState { sessions }))
            .split_for_parts();

        let app = Router::new().merge(router).layer(AuthLayer::new(state));
        Self { app, provider }
    }

    fn token(&self, user: &User) -> String {
        self.provider.issue_token(&Identity::from(user), 3600).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, json)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::GET, uri, Some(token), None).await;
        (status, body)
    }
}

struct Fixture {
    downtown: Store,
    harbor: Store,
    admin: User,
    owner: User,
    shipper: User,
    newbie: User,
}

fn fixture() -> (MemoryDirectory, Fixture) {
    let downtown = Store::new("Downtown Store", "downtown", "seed");
    let harbor = Store::new("Harbor Outlet", "harbor-outlet", "seed").with_status(StoreStatus::Inactive);

    let admin = User::new("sub-admin", "Ada Admin", "admin@example.com");
    let owner = User::new("sub-owner", "Olga Owner", "owner@example.com");
    let shipper = User::new("sub-shipper", "Sid Shipper", "shipper@example.com");
    let newbie = User::new("sub-newbie", "Nia New", "newbie@example.com");

    let member = |user: &User, store: &Store, role: Role| {
        Membership::invite(&user.id, &user.email, &store.id, role, "seed").active()
    };

    let directory = MemoryDirectory::new()
        .with_store(downtown.clone())
        .with_store(harbor.clone())
        .with_user(admin.clone())
        .with_user(owner.clone())
        .with_user(shipper.clone())
        .with_user(newbie.clone())
        .with_membership(member(&admin, &downtown, Role::Superadmin))
        .with_membership(member(&owner, &downtown, Role::Owner))
        .with_membership(member(&shipper, &downtown, Role::Shipper))
        .with_membership(member(&shipper, &harbor, Role::Shipper));

    (directory, Fixture { downtown, harbor, admin, owner, shipper, newbie })
}

fn app() -> (TestApp, Fixture) {
    let (directory, fx) = fixture();
    (TestApp::new(Arc::new(directory), Duration::from_secs(2)), fx)
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_request_redirects_to_sign_in() {
        let (app, _) = app();
        let (status, headers, body) = app.send(Method::GET, "/api/session", None, None).await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), SIGN_IN);
        assert_eq!(body["error"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_invalid_token_redirects_to_sign_in() {
        let (app, _) = app();
        let (status, _, _) = app.send(Method::GET, "/api/session", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_session_cookie_is_accepted() {
        let (app, fx) = app();
        let token = app.token(&fx.owner);

        let request = Request::builder()
            .uri("/api/session")
            .header(header::COOKIE, format!("theme=dark; {}={}", COOKIE, token))
            .body(Body::empty())
            .unwrap();
        let response = app.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_context_auto_selects_first_store() {
        let (app, fx) = app();
        let (status, body) = app.get("/api/session", &app.token(&fx.shipper)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isLoading"], false);
        assert_eq!(body["hasNoStores"], false);
        assert_eq!(body["stores"].as_array().unwrap().len(), 2);
        assert_eq!(body["selectedStore"]["id"], fx.downtown.id.as_str());
        assert_eq!(body["userRole"], "shipper");
        assert_eq!(body["identity"]["email"], "shipper@example.com");
    }

    #[tokio::test]
    async fn test_superadmin_permissions_are_wildcard() {
        let (app, fx) = app();
        let (_, body) = app.get("/api/session", &app.token(&fx.admin)).await;
        assert_eq!(body["permissions"], json!(["*"]));
    }

    #[tokio::test]
    async fn test_identity_without_memberships_has_no_stores() {
        let (app, fx) = app();
        let (status, body) = app.get("/api/session", &app.token(&fx.newbie)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasNoStores"], true);
        assert_eq!(body["selectedStore"], Value::Null);
        assert_eq!(body["userRole"], Value::Null);
    }

    #[tokio::test]
    async fn test_manual_selection_sticks() {
        let (app, fx) = app();
        let token = app.token(&fx.shipper);

        let (status, _, body) = app
            .send(Method::PUT, "/api/session/store", Some(&token), Some(json!({ "storeId": fx.harbor.id })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selectedStore"]["id"], fx.harbor.id.as_str());
        assert_eq!(body["selectedStore"]["isActive"], false);

        let (_, body) = app.get("/api/session", &token).await;
        assert_eq!(body["selectedStore"]["id"], fx.harbor.id.as_str());
    }

    #[tokio::test]
    async fn test_selecting_foreign_store_is_not_found() {
        let (app, fx) = app();
        let token = app.token(&fx.owner);

        let (status, _, body) = app
            .send(Method::PUT, "/api/session/store", Some(&token), Some(json!({ "storeId": fx.harbor.id })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_sign_out() {
        let (app, fx) = app();
        let token = app.token(&fx.owner);
        app.get("/api/session", &token).await;

        let (status, _, body) = app.send(Method::DELETE, "/api/session", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}

mod access_tests {
    use super::*;

    #[tokio::test]
    async fn test_check_granted_and_denied() {
        let (app, fx) = app();
        let token = app.token(&fx.owner);

        let (status, body) = app.get("/api/access/check?action=delete&resource=products", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "granted");
        assert_eq!(body["allowed"], true);
        assert_eq!(body["role"], "owner");
        assert_eq!(body["storeId"], fx.downtown.id.as_str());

        let (_, body) = app.get("/api/access/check?action=write&resource=slides", &token).await;
        assert_eq!(body["decision"], "denied");
        assert_eq!(body["allowed"], false);
    }

    #[tokio::test]
    async fn test_check_accepts_legacy_action_names() {
        let (app, fx) = app();
        let token = app.token(&fx.shipper);

        let (_, body) = app.get("/api/access/check?action=update&resource=orders", &token).await;
        assert_eq!(body["decision"], "granted");
    }

    #[tokio::test]
    async fn test_unknown_names_pass_only_for_superadmin() {
        let (app, fx) = app();

        let admin = app.token(&fx.admin);
        let (_, body) = app.get("/api/access/check?action=read&resource=locations", &admin).await;
        assert_eq!(body["decision"], "granted");
        assert_eq!(body["allowed"], true);

        let (_, body) = app.get("/api/access/check?action=approve&resource=products", &admin).await;
        assert_eq!(body["decision"], "granted");

        let owner = app.token(&fx.owner);
        let (_, body) = app.get("/api/access/check?action=read&resource=locations", &owner).await;
        assert_eq!(body["decision"], "denied");
        assert_eq!(body["allowed"], false);
    }

    #[tokio::test]
    async fn test_check_reports_no_stores() {
        let (app, fx) = app();
        let (_, body) = app.get("/api/access/check?action=read&resource=dashboard", &app.token(&fx.newbie)).await;
        assert_eq!(body["decision"], "no_stores");
    }

    #[tokio::test]
    async fn test_roles_table_is_public() {
        let (app, _) = app();
        let (status, _, body) = app.send(Method::GET, "/api/access/roles", None, None).await;

        assert_eq!(status, StatusCode::OK);
        let roles = body["roles"].as_array().unwrap();
        assert_eq!(roles.len(), 6);

        let superadmin = roles.iter().find(|r| r["role"] == "superadmin").unwrap();
        assert_eq!(superadmin["wildcard"], true);
        assert_eq!(superadmin["permissions"], json!(["*"]));

        let viewer = roles.iter().find(|r| r["role"] == "viewer").unwrap();
        let permissions = viewer["permissions"].as_array().unwrap();
        assert!(permissions.iter().all(|p| p.as_str().unwrap().ends_with(":read")));
    }
}

mod team_tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_lists_team_but_cannot_invite() {
        let (app, fx) = app();
        let token = app.token(&fx.owner);

        let (status, body) = app.get("/api/team", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);

        let (status, _, body) = app
            .send(Method::POST, "/api/team", Some(&token), Some(json!({ "email": fx.newbie.email, "role": "editor" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn test_shipper_cannot_list_team() {
        let (app, fx) = app();
        let (status, body) = app.get("/api/team", &app.token(&fx.shipper)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn test_team_requires_a_store() {
        let (app, fx) = app();
        let (status, body) = app.get("/api/team", &app.token(&fx.newbie)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "NO_STORES");
    }

    #[tokio::test]
    async fn test_invite_validation() {
        let (app, fx) = app();
        let token = app.token(&fx.admin);

        let (status, _, _) = app
            .send(Method::POST, "/api/team", Some(&token), Some(json!({ "email": fx.newbie.email, "role": "superadmin" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = app
            .send(Method::POST, "/api/team", Some(&token), Some(json!({ "email": "nobody@example.com", "role": "viewer" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = app
            .send(Method::POST, "/api/team", Some(&token), Some(json!({ "email": fx.owner.email, "role": "viewer" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "DUPLICATE");
    }

    #[tokio::test]
    async fn test_invite_accept_update_remove() {
        let (app, fx) = app();
        let admin = app.token(&fx.admin);
        let newbie = app.token(&fx.newbie);

        // Invite
        let (status, _, body) = app
            .send(
                Method::POST,
                "/api/team",
                Some(&admin),
                Some(json!({ "email": "NEWBIE@example.com", "role": "editor", "name": "Nia" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["principalId"], fx.newbie.id.as_str());
        assert_eq!(body["invitedBy"], fx.admin.id.as_str());
        let member_id = body["id"].as_str().unwrap().to_string();

        // Pending invitations confer nothing
        let (_, body) = app.get("/api/session", &newbie).await;
        assert_eq!(body["hasNoStores"], true);

        // Only the invitee may accept
        let accept = format!("/api/team/{}/accept", member_id);
        let (status, _, body) = app.send(Method::POST, &accept, Some(&app.token(&fx.owner)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");

        let (status, _, body) = app.send(Method::POST, &accept, Some(&newbie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");

        let (status, _, _) = app.send(Method::POST, &accept, Some(&newbie), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.get("/api/session", &newbie).await;
        assert_eq!(body["selectedStore"]["id"], fx.downtown.id.as_str());
        assert_eq!(body["userRole"], "editor");

        let (_, body) = app.get("/api/access/check?action=write&resource=products", &newbie).await;
        assert_eq!(body["decision"], "granted");

        // Role change takes effect on the next request
        let (status, _, body) = app
            .send(
                Method::PUT,
                &format!("/api/team/{}/role", member_id),
                Some(&admin),
                Some(json!({ "role": "viewer" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "viewer");

        let (_, body) = app.get("/api/access/check?action=write&resource=products", &newbie).await;
        assert_eq!(body["decision"], "denied");
        assert_eq!(body["role"], "viewer");

        // Removal
        let (status, _, _) = app
            .send(Method::DELETE, &format!("/api/team/{}", member_id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get("/api/session", &newbie).await;
        assert_eq!(body["hasNoStores"], true);

        let (status, _, _) = app
            .send(Method::DELETE, &format!("/api/team/{}", member_id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invitee_lists_pending_invitations() {
        let (app, fx) = app();
        let admin = app.token(&fx.admin);
        let newbie = app.token(&fx.newbie);

        let (status, body) = app.get("/api/team/invitations", &newbie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);

        let (_, _, body) = app
            .send(Method::POST, "/api/team", Some(&admin), Some(json!({ "email": fx.newbie.email, "role": "viewer" })))
            .await;
        let member_id = body["id"].as_str().unwrap().to_string();

        // Works without any store context
        let (status, body) = app.get("/api/team/invitations", &newbie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["members"][0]["id"], member_id.as_str());
        assert_eq!(body["members"][0]["storeId"], fx.downtown.id.as_str());

        let accept = format!("/api/team/{}/accept", member_id);
        let (status, _, _) = app.send(Method::POST, &accept, Some(&newbie), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get("/api/team/invitations", &newbie).await;
        assert_eq!(body["total"], 0);

        let (status, _, _) = app.send(Method::GET, "/api/team/invitations", None, None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_members_of_other_stores_are_not_found() {
        let (directory, fx) = fixture();
        let outsider = Membership::invite(&fx.newbie.id, &fx.newbie.email, &fx.harbor.id, Role::Viewer, "seed");
        let outsider_id = outsider.id.clone();
        let app = TestApp::new(Arc::new(directory.with_membership(outsider)), Duration::from_secs(2));

        // Admin's selected store is downtown
        let (status, _, _) = app
            .send(
                Method::PUT,
                &format!("/api/team/{}/role", outsider_id),
                Some(&app.token(&fx.admin)),
                Some(json!({ "role": "editor" })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod stores_tests {
    use super::*;

    #[tokio::test]
    async fn test_only_superadmin_administers_stores() {
        let (app, fx) = app();

        let (status, body) = app.get("/api/stores", &app.token(&fx.owner)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "ACCESS_DENIED");

        let (status, _, _) = app
            .send(Method::POST, "/api/stores", Some(&app.token(&fx.owner)), Some(json!({ "name": "X", "slug": "x" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.get("/api/stores", &app.token(&fx.admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);

        let stores = body["stores"].as_array().unwrap();
        let downtown = stores.iter().find(|s| s["slug"] == "downtown").unwrap();
        assert_eq!(downtown["memberCount"], 3);
        let harbor = stores.iter().find(|s| s["slug"] == "harbor-outlet").unwrap();
        assert_eq!(harbor["memberCount"], 1);
        assert_eq!(harbor["status"], "inactive");
    }

    #[tokio::test]
    async fn test_search_matches_exact_name_or_slug() {
        let (app, fx) = app();
        let token = app.token(&fx.admin);

        let (_, body) = app.get("/api/stores?search=harbor-outlet", &token).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["stores"][0]["id"], fx.harbor.id.as_str());

        let (_, body) = app.get("/api/stores?search=Downtown%20Store", &token).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["stores"][0]["id"], fx.downtown.id.as_str());

        let (_, body) = app.get("/api/stores?search=down", &token).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_create_and_update_store() {
        let (app, fx) = app();
        let token = app.token(&fx.admin);

        let (status, _, body) = app
            .send(
                Method::POST,
                "/api/stores",
                Some(&token),
                Some(json!({ "name": "Uptown", "slug": "uptown", "email": "uptown@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "active");
        assert_eq!(body["createdBy"], fx.admin.id.as_str());
        assert_eq!(body["memberCount"], 0);
        assert_eq!(body["updatedAt"], Value::Null);
        let store_id = body["id"].as_str().unwrap().to_string();

        let (status, _, body) = app
            .send(Method::POST, "/api/stores", Some(&token), Some(json!({ "name": "Again", "slug": "uptown" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "DUPLICATE");

        let (status, _, _) = app
            .send(Method::POST, "/api/stores", Some(&token), Some(json!({ "name": "  ", "slug": "blank" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/stores/{}", store_id);

        // Taking another store's slug conflicts, keeping its own does not
        let (status, _, _) = app.send(Method::PUT, &uri, Some(&token), Some(json!({ "slug": "downtown" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _, body) = app
            .send(
                Method::PUT,
                &uri,
                Some(&token),
                Some(json!({ "name": "Uptown Store", "slug": "uptown", "status": "inactive" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Uptown Store");
        assert_eq!(body["status"], "inactive");
        assert_eq!(body["email"], "uptown@example.com");
        assert!(body["updatedAt"].is_string());

        let (status, body) = app.get(&uri, &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Uptown Store");

        let (status, _) = app.get("/api/stores/missing", &token).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_store_removes_its_memberships() {
        let (app, fx) = app();
        let admin = app.token(&fx.admin);
        let shipper = app.token(&fx.shipper);

        let (_, body) = app.get("/api/session", &shipper).await;
        assert_eq!(body["stores"].as_array().unwrap().len(), 2);

        let uri = format!("/api/stores/{}", fx.harbor.id);
        let (status, _, _) = app.send(Method::DELETE, &uri, Some(&app.token(&fx.owner)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, body) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = app.get("/api/session", &shipper).await;
        let stores = body["stores"].as_array().unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0]["id"], fx.downtown.id.as_str());

        let (status, _) = app.get(&uri, &admin).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod pending_tests {
    use super::*;
    use sa_access::Result;

    /// Directory whose lookups never complete
    struct StalledDirectory;

    async fn stall<T>() -> Result<T> {
        std::future::pending().await
    }

    #[async_trait]
    impl MembershipDirectory for StalledDirectory {
        async fn stores_for_identity(&self, _: &str) -> Result<Vec<Store>> {
            stall().await
        }
        async fn memberships_in_store(&self, _: &str, _: &str) -> Result<Vec<Membership>> {
            stall().await
        }
        async fn list_stores(&self, _: Option<&str>) -> Result<Vec<Store>> {
            stall().await
        }
        async fn find_store(&self, _: &str) -> Result<Option<Store>> {
            stall().await
        }
        async fn find_store_by_slug(&self, _: &str) -> Result<Option<Store>> {
            stall().await
        }
        async fn insert_store(&self, _: &Store) -> Result<()> {
            stall().await
        }
        async fn update_store(&self, _: &Store) -> Result<()> {
            stall().await
        }
        async fn delete_store(&self, _: &str) -> Result<bool> {
            stall().await
        }
        async fn find_user_by_email(&self, _: &str) -> Result<Option<User>> {
            stall().await
        }
        async fn insert_user(&self, _: &User) -> Result<()> {
            stall().await
        }
        async fn list_members(&self, _: &str) -> Result<Vec<Membership>> {
            stall().await
        }
        async fn pending_invitations(&self, _: &str) -> Result<Vec<Membership>> {
            stall().await
        }
        async fn find_membership(&self, _: &str) -> Result<Option<Membership>> {
            stall().await
        }
        async fn insert_membership(&self, _: &Membership) -> Result<()> {
            stall().await
        }
        async fn update_membership(&self, _: &Membership) -> Result<()> {
            stall().await
        }
        async fn delete_membership(&self, _: &str) -> Result<bool> {
            stall().await
        }
    }

    fn stalled_app() -> TestApp {
        TestApp::new(Arc::new(StalledDirectory), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_session_reports_loading() {
        let app = stalled_app();
        let user = User::new("sub-1", "Pat", "pat@example.com");
        let (status, body) = app.get("/api/session", &app.token(&user)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isLoading"], true);
        assert_eq!(body["hasNoStores"], false);
    }

    #[tokio::test]
    async fn test_guarded_endpoint_is_retryable_while_loading() {
        let app = stalled_app();
        let user = User::new("sub-1", "Pat", "pat@example.com");
        let (status, headers, body) = app
            .send(Method::GET, "/api/team", Some(&app.token(&user)), None)
            .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(headers.get(header::RETRY_AFTER).unwrap(), "1");
        assert_eq!(body["error"], "CONTEXT_PENDING");
    }

    #[tokio::test]
    async fn test_selection_rejected_while_loading() {
        let app = stalled_app();
        let user = User::new("sub-1", "Pat", "pat@example.com");
        let (status, _, _) = app
            .send(Method::PUT, "/api/session/store", Some(&app.token(&user)), Some(json!({ "storeId": null })))
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
