use axum::http::{Method, StatusCode};
use domains::ProfileRepository;
use integration_tests::http::TestApp;
use serde_json::json;

#[tokio::test]
async fn first_upsert_creates_exactly_one_profile() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;

    let profile = app.create_profile(&token, "Dev", "go, rust, ts").await;
    assert_eq!(profile["status"], "Dev");
    assert_eq!(profile["skills"], json!(["go", "rust", "ts"]));
    assert_eq!(app.backend.profiles.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn second_upsert_updates_in_place() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    let first = app.create_profile(&token, "Dev", "rust").await;

    let (status, second) = app
        .call(
            Method::POST,
            "/api/profile",
            Some(&token),
            Some(json!({ "status": "Lead", "skills": "rust, go", "bio": "hello", "twitter": "https://twitter.com/ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["status"], "Lead");
    assert_eq!(second["bio"], "hello");
    assert_eq!(second["social"]["twitter"], "https://twitter.com/ada");
    assert_eq!(app.backend.profiles.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn upsert_requires_status_and_skills() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .call(Method::POST, "/api/profile", Some(&token), Some(json!({ "bio": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    assert!(app.backend.profiles.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn comma_only_skills_are_rejected() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/profile",
            Some(&token),
            Some(json!({ "status": "Dev", "skills": " , ," })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "skills");
    assert!(app.backend.profiles.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn reading_profiles() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    let user_id = app.user_id(&token).await;

    let (status, _) = app.call(Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.create_profile(&token, "Dev", "rust").await;

    let (status, me) = app.call(Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["owner"]["name"], "Ada");

    let (status, all) = app.call(Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, by_user) = app
        .call(Method::GET, &format!("/api/profile/user/{user_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_user["user"], user_id.as_str());

    let (status, _) = app
        .call(Method::GET, "/api/profile/user/not-an-id", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn experience_is_added_first_and_removed_by_id() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    app.create_profile(&token, "Dev", "rust").await;

    for title in ["Junior", "Senior"] {
        let (status, _) = app
            .call(
                Method::PUT,
                "/api/profile/experience",
                Some(&token),
                Some(json!({ "title": title, "company": "Acme", "from": "2020-01-01" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, profile) = app.call(Method::GET, "/api/profile/me", Some(&token), None).await;
    let experience = profile["experience"].as_array().unwrap();
    assert_eq!(experience[0]["title"], "Senior");
    assert_eq!(experience[1]["title"], "Junior");

    let senior = experience[0]["id"].as_str().unwrap().to_owned();
    let (status, profile) = app
        .call(
            Method::DELETE,
            &format!("/api/profile/experience/{senior}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let experience = profile["experience"].as_array().unwrap();
    assert_eq!(experience.len(), 1);
    assert_eq!(experience[0]["title"], "Junior");
}

#[tokio::test]
async fn experience_needs_a_profile_and_valid_dates() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    let entry = json!({ "title": "Dev", "company": "Acme", "from": "2020-01-01" });

    let (status, _) = app
        .call(Method::PUT, "/api/profile/experience", Some(&token), Some(entry))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.create_profile(&token, "Dev", "rust").await;
    let (status, body) = app
        .call(
            Method::PUT,
            "/api/profile/experience",
            Some(&token),
            Some(json!({ "title": "Dev", "company": "Acme", "from": "2021-01-01", "to": "2020-01-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "to");
}

#[tokio::test]
async fn education_round_trip_restores_length() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    app.create_profile(&token, "Dev", "rust").await;

    let (status, profile) = app
        .call(
            Method::PUT,
            "/api/profile/education",
            Some(&token),
            Some(json!({
                "school": "MIT",
                "degree": "BSc",
                "fieldofstudy": "CS",
                "from": "2010-09-01",
                "to": "2014-06-30"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let education = profile["education"].as_array().unwrap();
    assert_eq!(education.len(), 1);
    assert_eq!(education[0]["field_of_study"], "CS");

    let id = education[0]["id"].as_str().unwrap().to_owned();
    let (status, profile) = app
        .call(
            Method::DELETE,
            &format!("/api/profile/education/{id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(profile["education"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_the_account_removes_profile_and_user_but_keeps_posts() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    let other = app.register("Bob", "bob@example.com").await;
    app.create_profile(&token, "Dev", "rust").await;
    app.create_post(&token, "still here").await;

    let (status, body) = app.call(Method::DELETE, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    assert!(app.backend.profiles.list().await.unwrap().is_empty());
    let (status, _) = app.call(Method::GET, "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, posts) = app.call(Method::GET, "/api/posts", Some(&other), None).await;
    assert_eq!(posts.as_array().unwrap().len(), 1);

    // email is free again
    app.register("Ada", "ada@example.com").await;
}
