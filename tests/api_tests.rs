mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{movie, test_server, DownProvider, StaticProvider};
use quickflicks_api::models::Platform;

fn default_server() -> axum_test::TestServer {
    test_server(
        StaticProvider::new(
            "tmdb",
            vec![
                movie("tmdb:movie:27205", "Inception", 2010, Platform::Netflix, 80.0),
                movie("tmdb:movie:64956", "Inception: The Cobol Job", 2010, Platform::Tmdb, 3.0),
            ],
        ),
        StaticProvider::new(
            "youtube",
            vec![movie("youtube:YoHD9XEInc0", "Inception", 2010, Platform::Youtube, 1_000_000.0)],
        ),
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = default_server();
    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendations() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "category": "movie",
            "searchQuery": "Inception",
            "region": "us",
            "limit": 5
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["searchQuery"], "Inception");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    // The trailer and the catalog entry merge into one card
    let merged = results
        .iter()
        .find(|r| r["title"] == "Inception")
        .unwrap();
    let platforms: Vec<&str> = merged["availablePlatforms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(platforms, vec!["netflix", "youtube"]);
    assert!(merged["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_recommendations_legacy_category_name() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "category": "movies", "searchQuery": "Inception" }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_invalid_requests_never_reach_providers() {
    let catalog = StaticProvider::new("tmdb", vec![]);
    let videos = StaticProvider::new("youtube", vec![]);
    let server = test_server(catalog.clone(), videos.clone());

    let invalid = [
        json!({ "category": "movie", "searchQuery": "   " }),
        json!({ "category": "movie" }),
        json!({ "category": "podcast", "searchQuery": "heat" }),
        json!({ "category": "movie", "searchQuery": "heat", "limit": 0 }),
        json!({ "category": "movie", "searchQuery": "heat", "limit": 51 }),
        json!({ "category": "movie", "searchQuery": "heat", "region": "USA" }),
        json!({ "category": "movie", "searchQuery": "x".repeat(201) }),
    ];

    for body in invalid {
        let response = server.post("/api/recommendations").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["error"].is_string());
    }

    assert_eq!(catalog.calls(), 0);
    assert_eq!(videos.calls(), 0);
}

#[tokio::test]
async fn test_all_providers_down_returns_bad_gateway() {
    let server = test_server(DownProvider::new("tmdb"), DownProvider::new("youtube"));

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "category": "tv_show", "searchQuery": "The Bear" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_request_id_header() {
    let server = default_server();

    let response = server.get("/api/health").await;
    assert!(response.maybe_header("x-request-id").is_some());

    let id = "6f1b6d2e-3c1a-4d8e-9b7a-2f4e5d6c7b8a";
    let response = server
        .get("/api/categories")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_categories() {
    let server = default_server();

    let response = server.get("/api/categories").await;
    response.assert_status_ok();

    let categories: Vec<Value> = response.json();
    let ids: Vec<&str> = categories.iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["movie", "tv_show", "short_video", "viral_clip"]);
    assert_eq!(categories[3]["weights"]["popularity"], 0.45);
}

#[tokio::test]
async fn test_interactions_and_stats() {
    let server = default_server();

    let search = json!({
        "sessionId": "session-1",
        "category": "movie",
        "searchQuery": "Inception",
        "region": "US",
        "recommendations": ["tmdb:movie:27205", "tmdb:movie:64956"]
    });
    let click = json!({
        "sessionId": "session-1",
        "category": "movie",
        "searchQuery": "Inception",
        "region": "US",
        "recommendations": ["tmdb:movie:27205", "tmdb:movie:64956"],
        "clickedVideoId": "tmdb:movie:27205",
        "clickedPosition": 0
    });

    server.post("/api/interactions").json(&search).await.assert_status(StatusCode::ACCEPTED);
    server.post("/api/interactions").json(&click).await.assert_status(StatusCode::ACCEPTED);

    // Writes happen on background tasks
    let mut stats = Value::Null;
    for _ in 0..50 {
        stats = server.get("/api/stats").await.json();
        if stats["totalInteractions"] == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(stats["totalInteractions"], 2);
    assert_eq!(stats["totalClicks"], 1);
    assert_eq!(stats["clickThroughRate"], 50.0);
    assert_eq!(stats["categoryBreakdown"]["movie"], 2);
}

#[tokio::test]
async fn test_interaction_validation() {
    let server = default_server();

    let response = server
        .post("/api/interactions")
        .json(&json!({ "sessionId": "s", "category": "radio", "recommendations": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watchlist_round_trip() {
    let server = default_server();

    let item = json!({
        "id": "tmdb:movie:27205",
        "title": "Inception",
        "thumbnailUrl": "https://image.tmdb.org/t/p/w500/inception.jpg",
        "sourcePlatform": "netflix",
        "availablePlatforms": ["netflix"],
        "releaseYear": 2010,
        "ratingValue": 8.4,
        "genreTags": ["Science Fiction"],
        "castNames": ["Leonardo DiCaprio"],
        "directorName": "Christopher Nolan",
        "popularityScore": 80.0,
        "description": null,
        "watchUrl": "https://www.netflix.com/browse"
    });

    let response = server.post("/api/watchlist/session-1").json(&item).await;
    response.assert_status(StatusCode::CREATED);

    let items: Vec<Value> = server.get("/api/watchlist/session-1").await.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "tmdb:movie:27205");
    assert!(items[0]["addedAt"].is_string());

    server
        .delete("/api/watchlist/session-1/tmdb:movie:27205")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/watchlist/session-1/tmdb:movie:27205")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let items: Vec<Value> = server.get("/api/watchlist/session-1").await.json();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_watchlist_personalises_ranking() {
    let mut nolan = movie("tmdb:movie:1", "Heist Night", 2015, Platform::Hulu, 10.0);
    nolan.director_name = Some("Christopher Nolan".to_string());
    let mut mann = movie("tmdb:movie:2", "Heist Day", 2015, Platform::Hulu, 20.0);
    mann.director_name = Some("Michael Mann".to_string());

    let server = test_server(
        StaticProvider::new("tmdb", vec![nolan, mann]),
        StaticProvider::new("youtube", vec![]),
    );

    server
        .post("/api/watchlist/fan")
        .json(&serde_json::to_value(movie_with_director()).unwrap())
        .await
        .assert_status(StatusCode::CREATED);

    // Anonymous: the more popular match seeds the taste signal
    let anonymous: Value = server
        .post("/api/recommendations")
        .json(&json!({ "category": "movie", "searchQuery": "heist" }))
        .await
        .json();
    assert_eq!(anonymous["results"][0]["id"], "tmdb:movie:2");

    // The saved Nolan film outweighs popularity for this session
    let personal: Value = server
        .post("/api/recommendations")
        .json(&json!({ "category": "movie", "searchQuery": "heist", "sessionId": "fan" }))
        .await
        .json();
    assert_eq!(personal["results"][0]["id"], "tmdb:movie:1");
}

fn movie_with_director() -> quickflicks_api::models::Candidate {
    let mut saved = movie("tmdb:movie:155", "The Dark Knight", 2008, Platform::Max, 90.0);
    saved.director_name = Some("Christopher Nolan".to_string());
    saved
}
