use axum::http::StatusCode;
use travlr_core::TokenService;
use travlr_core::TokenConfig;

use crate::integration::common::{
    ADMIN_PASSWORD, TEST_SECRET, USER_PASSWORD, setup_test_app, trip_body,
};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_login_and_profile() {
    let app = setup_test_app().await;
    app.admin_token().await;

    let (status, json) = app
        .call(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({"email": "Admin@Travlr.com", "password": ADMIN_PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["user"].get("passwordHash").is_none());

    let tokens = TokenService::new(&TokenConfig::new(TEST_SECRET));
    let claims = tokens
        .verify_access(json["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.role, travlr_core::Role::Admin);

    let token = json["token"].as_str().unwrap();
    let (status, profile) = app.call("GET", "/api/v1/auth/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "admin@travlr.com");
    assert!(profile.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_and_invalid_registration() {
    let app = setup_test_app().await;
    app.user_token().await;

    let (status, json) = app
        .call(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "name": "Again",
                "email": "user@travlr.com",
                "password": USER_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "DUPLICATE_KEY");

    let (status, json) = app
        .call(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "name": "W",
                "email": "not-an-email",
                "password": "weak",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = setup_test_app().await;
    app.user_token().await;

    let (wrong_status, wrong) = app
        .call(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({"email": "user@travlr.com", "password": "Nope@1234"})),
        )
        .await;
    let (unknown_status, unknown) = app
        .call(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({"email": "ghost@travlr.com", "password": "Nope@1234"})),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn refresh_issues_working_access_token() {
    let app = setup_test_app().await;
    let (_, registered) = app
        .call(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "name": "Refresher",
                "email": "refresh@travlr.com",
                "password": USER_PASSWORD,
            })),
        )
        .await;
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    let (status, json) = app
        .call(
            "POST",
            "/api/v1/auth/refresh",
            None,
            Some(serde_json::json!({"refreshToken": refresh_token})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Token refreshed successfully");

    let token = json["token"].as_str().unwrap();
    let (status, profile) = app.call("GET", "/api/v1/auth/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Refresher");
    assert_eq!(profile["role"], "user");

    // The refresh token itself is not an access token.
    let (status, json) = app
        .call("GET", "/api/v1/auth/profile", Some(refresh_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "INVALID_TOKEN");
}

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_trip_lifecycle() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;

    let (status, created) = app
        .call("POST", "/api/v1/trips", Some(&admin), Some(trip_body("galr210214")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["code"], "GALR210214");
    assert_eq!(created["length"], 4);
    assert_eq!(created["perPerson"], 799.0);

    let (status, fetched) = app.call("GET", "/api/v1/trips/galr210214", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);

    let (status, updated) = app
        .call(
            "PUT",
            "/api/v1/trips/GALR210214",
            Some(&admin),
            Some(serde_json::json!({"resort": "Coral Sands, 5 stars"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["resort"], "Coral Sands, 5 stars");
    assert_eq!(updated["name"], "Gale Reef");

    let (status, deleted) = app
        .call("DELETE", "/api/v1/trips/GALR210214", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Trip deleted successfully");
    assert_eq!(deleted["item"]["code"], "GALR210214");

    let (status, json) = app.call("GET", "/api/v1/trips/GALR210214", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Trip not found");

    let history = app
        .db
        .audit()
        .history("trips", created["id"].as_str().unwrap().parse().unwrap())
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn trip_validation_and_conflict() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;

    let mut past = trip_body("PAST01");
    past["start"] = serde_json::json!("2001-01-01T00:00:00Z");
    let (status, json) = app.call("POST", "/api/v1/trips", Some(&admin), Some(past)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(json["details"][0]["field"], "start");

    app.call("POST", "/api/v1/trips", Some(&admin), Some(trip_body("DUPE01")))
        .await;
    let (status, json) = app
        .call("POST", "/api/v1/trips", Some(&admin), Some(trip_body("DUPE01")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["details"]["field"], "code");
}

#[tokio::test]
async fn user_token_cannot_create_trip() {
    let app = setup_test_app().await;
    let user = app.user_token().await;

    let (status, json) = app
        .call("POST", "/api/v1/trips", Some(&user), Some(trip_body("NOPE01")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["details"]["userRole"], "user");
}

#[tokio::test]
async fn trips_page_through_cursor() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;

    for i in 0..25 {
        let (status, _) = app
            .call(
                "POST",
                "/api/v1/trips",
                Some(&admin),
                Some(trip_body(&format!("TRIP{i:03}"))),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let mut sizes = Vec::new();
    let mut codes = Vec::new();
    let mut uri = "/api/v1/trips?limit=10".to_string();
    loop {
        let (status, page) = app.call("GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        let items = page["items"].as_array().unwrap();
        sizes.push(items.len());
        codes.extend(items.iter().map(|t| t["code"].as_str().unwrap().to_string()));
        if page["hasMore"] == false {
            assert!(page["nextCursor"].is_null());
            break;
        }
        uri = format!(
            "/api/v1/trips?limit=10&cursor={}",
            page["nextCursor"].as_str().unwrap()
        );
    }

    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(codes.first().map(String::as_str), Some("TRIP024"));
    assert_eq!(codes.last().map(String::as_str), Some("TRIP000"));
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[tokio::test]
async fn news_author_and_visibility() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;

    let draft = serde_json::json!({
        "code": "NEWS001",
        "title": "Reef season opens",
        "category": "Travel Tips",
        "image": "news.jpg",
        "summary": "Short summary.",
        "content": "Longer body text for the article.",
        "published": false,
        "authorId": "00000000-0000-0000-0000-000000000000",
    });
    let (status, created) = app.call("POST", "/api/v1/news", Some(&admin), Some(draft)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["authorName"], "Test Account");
    assert_ne!(created["authorId"], "00000000-0000-0000-0000-000000000000");

    let (_, public) = app.call("GET", "/api/v1/news", None, None).await;
    assert_eq!(public["items"].as_array().unwrap().len(), 0);

    let (status, _) = app.call("GET", "/api/v1/news/NEWS001", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, drafts) = app
        .call("GET", "/api/v1/news?published=false", Some(&admin), None)
        .await;
    assert_eq!(drafts["items"][0]["code"], "NEWS001");

    let (status, _) = app
        .call("GET", "/api/v1/news/NEWS001", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn public_reads_ignore_bad_tokens() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;
    app.call("POST", "/api/v1/trips", Some(&admin), Some(trip_body("OPEN01")))
        .await;

    for token in ["bad.token.value", ""] {
        let (status, json) = app.call("GET", "/api/v1/trips", Some(token), None).await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["items"][0]["code"], "OPEN01");

        let (status, json) = app
            .call("GET", "/api/v1/trips/OPEN01", Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
    }
}

#[tokio::test]
async fn drafts_listed_only_for_admin_claims() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    let draft = serde_json::json!({
        "code": "DRAFT01",
        "title": "Unannounced route",
        "category": "Events",
        "image": "news.jpg",
        "summary": "Short summary.",
        "content": "Longer body text for the article.",
        "published": false,
    });
    let (status, _) = app.call("POST", "/api/v1/news", Some(&admin), Some(draft)).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = "/api/v1/news?published=false";
    let (status, json) = app.call("GET", uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"][0]["code"], "DRAFT01");

    for token in [Some(user.as_str()), Some("bad.token.value"), None] {
        let (status, json) = app.call("GET", uri, token, None).await;
        assert_eq!(status, StatusCode::OK, "{token:?}");
        assert_eq!(json["items"], serde_json::json!([]), "{token:?}");
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analytics_for_authenticated_users() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;
    let user = app.user_token().await;

    app.call("POST", "/api/v1/trips", Some(&admin), Some(trip_body("STAT01")))
        .await;

    let (status, json) = app
        .call("GET", "/api/v1/analytics/trips-by-resort", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"][0]["resort"], "Emerald Bay, 3 stars");
    assert_eq!(json["items"][0]["tripCount"], 1);

    let (status, json) = app
        .call("GET", "/api/v1/analytics/room-availability", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"], serde_json::json!([]));
}
