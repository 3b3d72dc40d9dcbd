use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    Router,
};
use livetv_catalog::{
    admin::PlaylistService,
    channels::{Channel, IdScheme},
    error::FetchError,
    fetch::TextFetcher,
    playlists::Playlist,
    store::{InMemoryPlaylistStore, NewPlaylist, StoredPlaylist},
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

const NEWS: &str = r#"#EXTM3U
#EXTINF:-1 tvg-id="bbc.uk" tvg-logo="http://x/bbc.png" group-title="News",BBC News
http://x/bbc.m3u8
#EXTINF:-1 group-title="Sports",Sky Sports, Main Event
http://x/sky.m3u8
"#;

const MOVIES: &str = r#"#EXTM3U
#EXTINF:-1 group-title="Movies",Cinema One
http://x/cinema.m3u8
#EXTINF:-1,No Group
http://x/plain.m3u8
"#;

struct FakeFetcher;

#[async_trait]
impl TextFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        match url {
            "http://x/news.m3u" => Ok(NEWS.to_string()),
            "http://x/movies.m3u8" => Ok(MOVIES.to_string()),
            "http://x/sports.m3u" => Ok((1..=10)
                .map(|n| {
                    format!("#EXTINF:-1 tvg-id=\"sport{n}\" group-title=\"Sports\",Sport {n}\nhttp://x/sport{n}.m3u8\n")
                })
                .collect()),
            _ => Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            }),
        }
    }
}

async fn app_with(urls: &[&str]) -> Router {
    let service = PlaylistService::new(
        Arc::new(FakeFetcher),
        Arc::new(InMemoryPlaylistStore::new()),
        IdScheme::Timestamped,
    );
    let seeds = urls
        .iter()
        .map(|url| NewPlaylist {
            name: url.to_string(),
            source_url: url.to_string(),
            description: None,
            is_active: true,
        })
        .collect();
    service.import_playlists(seeds).await;
    livetv_catalog::create_app(service)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_playlists_api_skips_failed_sources() {
    let app = app_with(&["http://x/news.m3u", "http://x/down.m3u", "http://x/movies.m3u8"]).await;
    let (status, body) = send(app, get("/api/playlists")).await;
    assert_eq!(status, StatusCode::OK);

    let playlists: Vec<Playlist> = serde_json::from_slice(&body).unwrap();
    assert_eq!(playlists.len(), 2);
    let news = playlists
        .iter()
        .find(|p| p.source_url == "http://x/news.m3u")
        .unwrap();
    assert_eq!(news.channels.len(), 2);
    assert_eq!(news.channels[0].id, "bbc.uk");
    assert_eq!(news.channels[1].name, "Sky Sports, Main Event");
}

#[tokio::test]
async fn test_channel_wire_format() {
    let app = app_with(&["http://x/news.m3u"]).await;
    let (_, body) = send(app, get("/api/playlists")).await;
    let value: Value = serde_json::from_slice(&body).unwrap();
    let channel = &value[0]["channels"][0];
    assert_eq!(channel["logoUrl"], "http://x/bbc.png");
    assert_eq!(channel["streamUrl"], "http://x/bbc.m3u8");
    assert_eq!(channel["isLive"], true);
    assert!(channel["viewerCount"].is_string());
    assert_eq!(value[0]["sourceUrl"], "http://x/news.m3u");
}

#[tokio::test]
async fn test_empty_catalog_is_ok() {
    let app = app_with(&[]).await;
    let (status, body) = send(app, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    let groups: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_categories_and_keyword_views() {
    let app = app_with(&["http://x/news.m3u", "http://x/movies.m3u8"]).await;

    let (_, body) = send(app.clone(), get("/api/categories")).await;
    let value: Value = serde_json::from_slice(&body).unwrap();
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    for expected in ["News", "Sports", "Movies", "General"] {
        assert!(names.contains(&expected), "missing {expected}");
    }

    let (_, body) = send(app.clone(), get("/api/categories/sports")).await;
    let sports: Vec<Channel> = serde_json::from_slice(&body).unwrap();
    assert_eq!(sports.len(), 1);
    assert_eq!(sports[0].name, "Sky Sports, Main Event");

    let (_, body) = send(app, get("/api/categories/movies")).await;
    let movies: Vec<Channel> = serde_json::from_slice(&body).unwrap();
    assert_eq!(movies[0].name, "Cinema One");
}

#[tokio::test]
async fn test_search_api() {
    let app = app_with(&["http://x/news.m3u", "http://x/movies.m3u8"]).await;
    let (_, body) = send(app.clone(), get("/api/search?q=bbc")).await;
    let found: Vec<Channel> = serde_json::from_slice(&body).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "BBC News");

    let (_, body) = send(app, get("/api/search")).await;
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn test_related_api() {
    let app = app_with(&["http://x/news.m3u", "http://x/movies.m3u8"]).await;
    let (status, body) = send(app.clone(), get("/api/channels/bbc.uk/related")).await;
    assert_eq!(status, StatusCode::OK);
    let related: Vec<Channel> = serde_json::from_slice(&body).unwrap();
    assert!(related.is_empty());

    let (status, _) = send(app, get("/api/channels/unknown/related")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_related_api_excludes_current_and_caps() {
    let app = app_with(&["http://x/sports.m3u"]).await;
    let (status, body) = send(app, get("/api/channels/sport3/related")).await;
    assert_eq!(status, StatusCode::OK);

    let related: Vec<Channel> = serde_json::from_slice(&body).unwrap();
    let ids: Vec<&str> = related.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        ["sport1", "sport2", "sport4", "sport5", "sport6", "sport7", "sport8", "sport9"]
    );
    assert!(related.iter().all(|c| c.category == "Sports"));
}

#[tokio::test]
async fn test_validate_api() {
    let app = app_with(&[]).await;
    let (_, body) = send(app.clone(), get("/api/validate?url=https%3A%2F%2Fx%2Flist.m3u8")).await;
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["acceptable"], true);

    let (_, body) = send(app, get("/api/validate?url=ftp%3A%2F%2Fx%2Flist.m3u")).await;
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["acceptable"], false);
}

#[tokio::test]
async fn test_admin_lifecycle() {
    let app = app_with(&[]).await;

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/admin/playlists",
            serde_json::json!({ "name": "News", "sourceUrl": "http://x/news.m3u" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: StoredPlaylist = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.channel_count, 2);
    assert!(created.is_active);

    let (status, body) = send(
        app.clone(),
        json_request(
            "PUT",
            &format!("/api/admin/playlists/{}", created.id),
            serde_json::json!({ "sourceUrl": "http://x/movies.m3u8", "isActive": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: StoredPlaylist = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.source_url, "http://x/movies.m3u8");
    assert!(!updated.is_active);

    let (_, body) = send(app.clone(), get("/api/playlists")).await;
    assert_eq!(&body[..], b"[]");

    let (status, _) = send(
        app.clone(),
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/admin/playlists/{}", created.id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(app, get("/api/admin/playlists")).await;
    let remaining: Vec<StoredPlaylist> = serde_json::from_slice(&body).unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_admin_errors() {
    let app = app_with(&[]).await;

    let (status, _) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/admin/playlists",
            serde_json::json!({ "name": "Bad", "sourceUrl": "ftp://x/list.m3u" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/admin/playlists",
            serde_json::json!({ "name": "Down", "sourceUrl": "http://x/down.m3u" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert!(value["error"].as_str().unwrap().contains("503"));

    let (status, _) = send(
        app,
        Request::builder()
            .method("DELETE")
            .uri("/api/admin/playlists/unknown")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_probe() {
    let app = app_with(&[]).await;
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/admin/playlists/test",
            serde_json::json!({ "url": "http://x/news.m3u" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["channelCount"], 2);
    assert_eq!(value["sampleChannels"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_metrics_and_fallback() {
    let app = app_with(&["http://x/news.m3u"]).await;
    let (_, _) = send(app.clone(), get("/api/playlists")).await;

    let (status, body) = send(app.clone(), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("livetv_channels_parsed_total"));

    let (status, _) = send(app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
