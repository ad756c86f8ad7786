//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance (with migrations applied)
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET,
//!   ADMIN_EMAIL, ADMIN_PASSWORD
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_failure, assert_status, assert_succeeded, assert_success, check_test_env, fixtures::*,
    TestServer,
};
use reqwest::StatusCode;

async fn admin_token(server: &TestServer) -> TokenResponse {
    let response = server.post("/api/token", &TokenRequest::admin()).await.unwrap();
    assert_success(response).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Token Tests
// ============================================================================

#[tokio::test]
async fn test_token_exchange() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    assert!(!token.access_token.is_empty());
    assert!(!token.refresh_token.is_empty());
    assert_eq!(token.token_type, "Bearer");
    assert!(token.expires_in > 0);
}

#[tokio::test]
async fn test_token_exchange_wrong_password() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = TokenRequest {
        email: TokenRequest::admin().email,
        password: "WrongPassword1".to_string(),
    };

    let response = server.post("/api/token", &request).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token_rotation() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let response = server
        .post(
            "/api/token/refresh",
            &RefreshRequest {
                refresh_token: token.refresh_token.clone(),
            },
        )
        .await
        .unwrap();
    let rotated: TokenResponse = assert_success(response).await.unwrap();
    assert!(!rotated.access_token.is_empty());

    // The old refresh token is revoked by the rotation
    let response = server
        .post(
            "/api/token/refresh",
            &RefreshRequest {
                refresh_token: token.refresh_token,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Authorization Tests
// ============================================================================

#[tokio::test]
async fn test_anonymous_request_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/identity/users").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .get_auth("/api/identity/users", "not.a.token")
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// User CRUD + Audit Trail Tests
// ============================================================================

#[tokio::test]
async fn test_create_user_and_audit_record() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let request = CreateUserRequest::unique();
    let response = server
        .post_auth("/api/identity/users", &token.access_token, &request)
        .await
        .unwrap();
    let user: UserResponse = assert_success(response).await.unwrap();
    assert_eq!(user.email, request.email);
    assert!(user.is_active);

    // Creation landed in the audit trail with an empty before-state
    let response = server
        .get_auth(
            &format!("/api/lifecycle/audit/by-record/{}", user.id),
            &token.access_token,
        )
        .await
        .unwrap();
    let records: Vec<AuditTrailResponse> = assert_success(response).await.unwrap();
    assert!(!records.is_empty());
    let created = records.iter().find(|r| r.action == "Create").unwrap();
    assert_eq!(created.table_name, "Users");
    assert!(created.before.is_empty());
    assert_eq!(created.after.get("email"), Some(&request.email));
}

#[tokio::test]
async fn test_duplicate_email_fails_in_envelope() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let request = CreateUserRequest::unique();
    let response = server
        .post_auth("/api/identity/users", &token.access_token, &request)
        .await
        .unwrap();
    assert_success::<UserResponse>(response).await.unwrap();

    let response = server
        .post_auth("/api/identity/users", &token.access_token, &request)
        .await
        .unwrap();
    let messages = assert_failure(response).await.unwrap();
    assert!(messages.iter().any(|m| m.contains("Email already registered")));
}

#[tokio::test]
async fn test_invalid_id_fails_in_envelope() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let response = server
        .get_auth("/api/identity/users/not-a-uuid", &token.access_token)
        .await
        .unwrap();
    let messages = assert_failure(response).await.unwrap();
    assert!(messages.iter().any(|m| m.contains("value provided was invalid")));
}

// ============================================================================
// Role + Permission Tests
// ============================================================================

#[tokio::test]
async fn test_role_crud_round_trip() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let request = CreateRoleRequest::unique();
    let response = server
        .post_auth("/api/identity/roles", &token.access_token, &request)
        .await
        .unwrap();
    let role: RoleResponse = assert_success(response).await.unwrap();
    assert_eq!(role.name, request.name);
    assert!(!role.is_system);

    let response = server
        .get_auth(
            &format!("/api/identity/roles/{}", role.id),
            &token.access_token,
        )
        .await
        .unwrap();
    let fetched: RoleResponse = assert_success(response).await.unwrap();
    assert_eq!(fetched.id, role.id);

    let response = server
        .delete_auth(
            &format!("/api/identity/roles/{}", role.id),
            &token.access_token,
        )
        .await
        .unwrap();
    assert_succeeded(response).await.unwrap();
}

#[tokio::test]
async fn test_role_permission_update_rejects_unknown_string() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let request = CreateRoleRequest::unique();
    let response = server
        .post_auth("/api/identity/roles", &token.access_token, &request)
        .await
        .unwrap();
    let role: RoleResponse = assert_success(response).await.unwrap();

    let response = server
        .put_auth(
            &format!("/api/identity/permissions/role/{}", role.id),
            &token.access_token,
            &UpdateRolePermissionsRequest {
                permissions: vec!["Permissions.DoesNotExist.View".to_string()],
            },
        )
        .await
        .unwrap();
    let messages = assert_failure(response).await.unwrap();
    assert!(messages.iter().any(|m| m.contains("Unknown permission")));
}

#[tokio::test]
async fn test_registry_listing() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    let response = server
        .get_auth("/api/identity/permissions", &token.access_token)
        .await
        .unwrap();
    let registry: Vec<String> = assert_success(response).await.unwrap();
    assert!(registry.contains(&"Permissions.Users.Create".to_string()));
    assert!(registry.contains(&"Permissions.AuditTrails.View".to_string()));
}

// ============================================================================
// Audit Listing Tests
// ============================================================================

#[tokio::test]
async fn test_audit_pagination() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    // Generate some records
    for _ in 0..3 {
        let request = CreateUserRequest::unique();
        let response = server
            .post_auth("/api/identity/users", &token.access_token, &request)
            .await
            .unwrap();
        assert_success::<UserResponse>(response).await.unwrap();
    }

    let response = server
        .get_auth("/api/lifecycle/audit/paged?page=1&size=2", &token.access_token)
        .await
        .unwrap();
    let page: Paginated<AuditTrailResponse> = assert_success(response).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.size, 2);
    assert!(page.data.len() <= 2);
    assert!(page.total_count >= 3);
}

#[tokio::test]
async fn test_audit_purge_with_timeframe() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = admin_token(&server).await;

    // Nothing is older than ten years in a fresh test database
    let response = server
        .delete_auth(
            "/api/lifecycle/audit?timeframe=ten_years",
            &token.access_token,
        )
        .await
        .unwrap();
    let purged: PurgeResponse = assert_success(response).await.unwrap();
    assert_eq!(purged.removed, 0);
}
