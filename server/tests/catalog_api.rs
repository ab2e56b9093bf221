//! End-to-end tests against a real PostgreSQL database.
//!
//! TEST_DATABASE_URL must name a database. Without it the tests fail, unless
//! LARDER_SKIP_DB_TESTS is set, in which case they return early.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use bigdecimal::BigDecimal;
use common::{png_bytes, sample_recipe, test_database, unique_email, TestDatabase};
use larder_server::store::{self, recipes::RecipeFields, StoreError};
use serde_json::{json, Value};
use std::sync::Barrier;

fn ids(values: &Value) -> Vec<i64> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

fn names(values: &Value) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn database_is_required_unless_skipped() {
    assert!(test_database(None, None).is_err());
    assert!(test_database(Some("  ".to_string()), None).is_err());
    assert_eq!(
        test_database(None, Some("1".to_string())),
        Ok(TestDatabase::Skipped)
    );
    assert_eq!(
        test_database(Some("postgres://db/test".to_string()), Some("1".to_string())),
        Ok(TestDatabase::Url("postgres://db/test".to_string()))
    );
}

#[tokio::test]
async fn create_user_normalizes_email() {
    let app = test_app!();
    let local = uuid::Uuid::new_v4();
    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/create",
            None,
            Some(json!({"email": format!("Mixed.{}@EXAMPLE.com", local), "password": "secret1"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], format!("mixed.{}@example.com", local));
    assert_eq!(body["name"], "");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn create_user_rejects_duplicate_and_blank_email() {
    let app = test_app!();
    let email = unique_email();
    let payload = json!({"email": email, "password": "secret1"});

    let (status, _) = app
        .call(Method::POST, "/api/user/create", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .call(Method::POST, "/api/user/create", None, Some(payload))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A user with this email already exists");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/user/create",
            None,
            Some(json!({"email": "", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn superuser_factory_sets_flags() {
    let app = test_app!();
    let mut conn = app.pool.get().unwrap();

    let user = store::users::create_superuser(&mut conn, &unique_email(), "secret1").unwrap();
    assert!(user.is_staff);
    assert!(user.is_superuser);
    assert!(user.is_active);

    let err = store::users::create_user(&mut conn, "   ", "secret1", "").unwrap_err();
    assert!(matches!(err, StoreError::InvalidEmail(_)));
}

#[tokio::test]
async fn token_requires_valid_credentials() {
    let app = test_app!();
    let email = unique_email();
    app.call(
        Method::POST,
        "/api/user/create",
        None,
        Some(json!({"email": email, "password": "secret1"})),
    )
    .await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/token",
            None,
            Some(json!({"email": email, "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("token").is_none());

    let (status, _) = app
        .call(
            Method::POST,
            "/api/user/token",
            None,
            Some(json!({"email": unique_email(), "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::GET, "/api/user/me", Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_can_be_read_and_updated() {
    let app = test_app!();
    let token = app.signup().await;

    let (status, body) = app.get("/api/user/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Test Cook");
    assert_eq!(body["is_staff"], false);

    let (status, body) = app
        .call(
            Method::PATCH,
            "/api/user/me",
            Some(&token),
            Some(json!({"name": "Renamed", "password": "newpass123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    let email = body["email"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(
            Method::POST,
            "/api/user/token",
            None,
            Some(json!({"email": email, "password": "newpass123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/user/me",
            Some(&token),
            Some(json!({"name": "No email"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tags_are_private_and_ordered_by_name_descending() {
    let app = test_app!();
    let token = app.signup().await;
    let other = app.signup().await;

    app.create_tag(&token, "Breakfast").await;
    app.create_tag(&token, "Dessert").await;
    app.create_tag(&other, "Fruity").await;

    let (status, body) = app.get("/api/recipes/tags", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Dessert", "Breakfast"]);

    let (status, body) = app
        .post("/api/recipes/tags", &token, json!({"name": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn ingredients_are_private_and_validated() {
    let app = test_app!();
    let token = app.signup().await;
    let other = app.signup().await;

    app.create_ingredient(&token, "Kale").await;
    app.create_ingredient(&token, "Salt").await;
    app.create_ingredient(&other, "Vinegar").await;

    let (status, body) = app.get("/api/recipes/ingredients", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Salt", "Kale"]);

    let (status, _) = app
        .post("/api/recipes/ingredients", &token, json!({"name": ""}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assigned_only_returns_each_entity_once() {
    let app = test_app!();
    let token = app.signup().await;

    let eggs = app.create_ingredient(&token, "Eggs").await;
    app.create_ingredient(&token, "Lentils").await;
    let breakfast = app.create_tag(&token, "Breakfast").await;
    app.create_tag(&token, "Lunch").await;

    for title in ["Eggs benedict", "Herb eggs"] {
        let mut payload = sample_recipe(title);
        payload["ingredients"] = json!([eggs]);
        payload["tags"] = json!([breakfast]);
        app.create_recipe(&token, payload).await;
    }

    let (status, body) = app
        .get("/api/recipes/ingredients?assigned_only=1", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![eggs]);

    let (status, body) = app.get("/api/recipes/tags?assigned_only=1", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![breakfast]);

    let (_, body) = app.get("/api/recipes/tags?assigned_only=0", &token).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.get("/api/recipes/tags?assigned_only=yes", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recipe_create_list_and_detail() {
    let app = test_app!();
    let token = app.signup().await;
    let vegan = app.create_tag(&token, "Vegan").await;
    let prawns = app.create_ingredient(&token, "Prawns").await;

    let created = app
        .create_recipe(
            &token,
            json!({
                "title": "Thai prawn curry",
                "time_minutes": 30,
                "price": 7.5,
                "tags": [vegan],
                "ingredients": [prawns],
            }),
        )
        .await;
    assert_eq!(created["price"], "7.50");
    assert_eq!(created["tags"], json!([vegan]));
    assert_eq!(created["ingredients"], json!([prawns]));
    assert_eq!(created["link"], Value::Null);
    assert_eq!(created["image"], Value::Null);

    let second = app.create_recipe(&token, sample_recipe("Toast")).await;

    let (status, body) = app.get("/api/recipes/recipes", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&body),
        vec![second["id"].as_i64().unwrap(), created["id"].as_i64().unwrap()]
    );

    let (status, detail) = app
        .get(&format!("/api/recipes/recipes/{}", created["id"]), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tags"], json!([{"id": vegan, "name": "Vegan"}]));
    assert_eq!(detail["ingredients"], json!([{"id": prawns, "name": "Prawns"}]));
}

#[tokio::test]
async fn recipes_are_private() {
    let app = test_app!();
    let token = app.signup().await;
    let other = app.signup().await;

    let mine = app.create_recipe(&token, sample_recipe("Mine")).await;
    app.create_recipe(&other, sample_recipe("Theirs")).await;

    let (_, body) = app.get("/api/recipes/recipes", &token).await;
    assert_eq!(ids(&body), vec![mine["id"].as_i64().unwrap()]);

    let uri = format!("/api/recipes/recipes/{}", mine["id"]);
    let (status, _) = app.get(&uri, &other).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Relations must reference the caller's own tags
    let foreign_tag = app.create_tag(&other, "Foreign").await;
    let mut payload = sample_recipe("Sneaky");
    payload["tags"] = json!([foreign_tag]);
    let (status, body) = app.post("/api/recipes/recipes", &token, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Unknown tag id: {}", foreign_tag));

    let (status, _) = app
        .upload(&format!("{}/image", uri), &other, "image", &png_bytes())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn filters_never_match_other_users_recipes() {
    let app = test_app!();
    let token = app.signup().await;
    let other = app.signup().await;

    let their_tag = app.create_tag(&other, "Shared name").await;
    let their_ingredient = app.create_ingredient(&other, "Tofu").await;
    let mut payload = sample_recipe("Their recipe");
    payload["tags"] = json!([their_tag]);
    payload["ingredients"] = json!([their_ingredient]);
    app.create_recipe(&other, payload).await;
    app.create_recipe(&token, sample_recipe("My recipe")).await;

    let (status, body) = app
        .get(&format!("/api/recipes/recipes?tags={}", their_tag), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&body).is_empty());

    let (status, body) = app
        .get(
            &format!("/api/recipes/recipes?ingredients={}", their_ingredient),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&body).is_empty());

    // The owner still sees it through the same filter
    let (_, body) = app
        .get(&format!("/api/recipes/recipes?tags={}", their_tag), &other)
        .await;
    assert_eq!(ids(&body).len(), 1);
}

#[tokio::test]
async fn recipe_validation_errors() {
    let app = test_app!();
    let token = app.signup().await;

    for payload in [
        json!({"title": "", "time_minutes": 5, "price": "1.00"}),
        json!({"title": "Soup", "time_minutes": -1, "price": "1.00"}),
        json!({"title": "Soup", "time_minutes": 5, "price": "1.005"}),
        json!({"title": "Soup", "time_minutes": 5, "price": "-2"}),
        json!({"title": "Soup", "time_minutes": 5, "price": "1000"}),
        json!({"title": "Soup", "time_minutes": 5, "price": "cheap"}),
        json!({"title": "Soup", "time_minutes": 5}),
    ] {
        let (status, body) = app.post("/api/recipes/recipes", &token, payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert!(body["error"].is_string());
    }

    let (status, _) = app.get("/api/recipes/recipes/not-a-number", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn filter_recipes_by_tags_and_ingredients() {
    let app = test_app!();
    let token = app.signup().await;

    let vegan = app.create_tag(&token, "Vegan").await;
    let vegetarian = app.create_tag(&token, "Vegetarian").await;
    let feta = app.create_ingredient(&token, "Feta").await;
    let chicken = app.create_ingredient(&token, "Chicken").await;

    let mut payload = sample_recipe("Aubergine tahini");
    payload["tags"] = json!([vegan]);
    payload["ingredients"] = json!([feta]);
    let r1 = app.create_recipe(&token, payload).await["id"].as_i64().unwrap();

    let mut payload = sample_recipe("Fish and chips");
    payload["tags"] = json!([vegetarian]);
    payload["ingredients"] = json!([chicken]);
    let r2 = app.create_recipe(&token, payload).await["id"].as_i64().unwrap();

    let r3 = app.create_recipe(&token, sample_recipe("Plain rice")).await["id"]
        .as_i64()
        .unwrap();

    let (status, body) = app
        .get(&format!("/api/recipes/recipes?tags={},{}", vegan, vegetarian), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let found = ids(&body);
    assert_eq!(found, vec![r2, r1]);
    assert!(!found.contains(&r3));

    let (_, body) = app
        .get(
            &format!("/api/recipes/recipes?ingredients={},{}", feta, chicken),
            &token,
        )
        .await;
    assert_eq!(ids(&body), vec![r2, r1]);

    // Both filters must match
    let (_, body) = app
        .get(
            &format!("/api/recipes/recipes?tags={}&ingredients={}", vegan, chicken),
            &token,
        )
        .await;
    assert!(ids(&body).is_empty());

    let (status, _) = app.get("/api/recipes/recipes?tags=1,,x", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_keeps_and_put_clears_relations() {
    let app = test_app!();
    let token = app.signup().await;
    let tag = app.create_tag(&token, "Dinner").await;
    let basil = app.create_ingredient(&token, "Basil").await;

    let mut payload = sample_recipe("Pasta");
    payload["tags"] = json!([tag]);
    payload["ingredients"] = json!([basil]);
    payload["link"] = json!("https://example.com/pasta");
    let recipe = app.create_recipe(&token, payload).await;
    let uri = format!("/api/recipes/recipes/{}", recipe["id"]);

    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"title": "Chicken pasta", "price": "6.10"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Chicken pasta");
    assert_eq!(body["price"], "6.10");
    assert_eq!(body["time_minutes"], 10);
    assert_eq!(body["tags"], json!([tag]));
    assert_eq!(body["ingredients"], json!([basil]));

    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"time_minutes": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time_minutes"], 3);
    assert_eq!(body["ingredients"], json!([basil]));

    let garlic = app.create_ingredient(&token, "Garlic").await;
    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"ingredients": [garlic, basil]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredients"], json!([basil, garlic]));

    let new_tag = app.create_tag(&token, "Lunch").await;
    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"tags": [new_tag]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!([new_tag]));

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"title": "Spaghetti", "time_minutes": 25, "price": "5.00"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Spaghetti");
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["ingredients"], json!([]));
    assert_eq!(body["link"], "https://example.com/pasta");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&token), Some(json!({"title": "Only title"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_image_validates_and_serves_file() {
    let app = test_app!();
    let token = app.signup().await;
    let recipe = app.create_recipe(&token, sample_recipe("Photogenic")).await;
    let uri = format!("/api/recipes/recipes/{}/image", recipe["id"]);

    let (status, body) = app.upload(&uri, &token, "image", b"notimage").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.upload(&uri, &token, "photo", &png_bytes()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.upload(&uri, &token, "image", &png_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], recipe["id"]);
    let first_url = body["image"].as_str().unwrap().to_string();
    assert!(first_url.starts_with("/media/uploads/recipe/"));
    assert!(first_url.ends_with(".png"));

    let relative = first_url.trim_start_matches("/media/");
    assert!(app.media.path().join(relative).exists());

    let response = app
        .send(Request::builder().uri(&first_url).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.0, StatusCode::OK);

    let (_, detail) = app
        .get(&format!("/api/recipes/recipes/{}", recipe["id"]), &token)
        .await;
    assert_eq!(detail["image"], first_url.as_str());

    // Replacing removes the previous file
    let (status, body) = app.upload(&uri, &token, "image", &png_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["image"], first_url.as_str());
    assert!(!app.media.path().join(relative).exists());
}

#[test]
fn concurrent_image_swaps_each_see_the_prior_image() {
    let app = test_app!();
    let mut conn = app.pool.get().unwrap();
    let owner = store::users::create_user(&mut conn, &unique_email(), "secret1", "")
        .unwrap()
        .id;
    let fields = RecipeFields {
        title: "Contested".to_string(),
        time_minutes: 5,
        price: BigDecimal::from(3),
        link: None,
    };
    let id = store::recipes::create_recipe(&mut conn, owner, &fields, &[], &[])
        .unwrap()
        .recipe
        .id;
    drop(conn);

    let paths = ["uploads/recipe/first.png", "uploads/recipe/second.png"];
    let barrier = Barrier::new(paths.len());
    let results: Vec<(&str, Option<String>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|&path| {
                let pool = app.pool.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    let mut conn = pool.get().unwrap();
                    barrier.wait();
                    let previous =
                        store::recipes::set_recipe_image(&mut conn, owner, id, path).unwrap();
                    (path, previous)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // One swap ran first and replaced nothing; the other replaced its file.
    let (first, _) = results
        .iter()
        .find(|(_, previous)| previous.is_none())
        .expect("one swap should see no previous image");
    let (_, replaced) = results
        .iter()
        .find(|(path, _)| path != first)
        .unwrap();
    assert_eq!(replaced.as_deref(), Some(*first));
}

#[tokio::test]
async fn delete_recipe_removes_row_and_image() {
    let app = test_app!();
    let token = app.signup().await;
    let tag = app.create_tag(&token, "Gone").await;
    let mut payload = sample_recipe("Short-lived");
    payload["tags"] = json!([tag]);
    let recipe = app.create_recipe(&token, payload).await;
    let uri = format!("/api/recipes/recipes/{}", recipe["id"]);

    let (_, body) = app
        .upload(&format!("{}/image", uri), &token, "image", &png_bytes())
        .await;
    let image_url = body["image"].as_str().unwrap().to_string();
    let on_disk = app
        .media
        .path()
        .join(image_url.trim_start_matches("/media/"));
    assert!(on_disk.exists());

    let (status, _) = app.call(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!on_disk.exists());

    let (status, _) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The tag survives and is no longer assigned
    let (_, body) = app.get("/api/recipes/tags?assigned_only=1", &token).await;
    assert!(!ids(&body).contains(&tag));
}
