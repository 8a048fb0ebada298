use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use platform_gateway::{GatewayConfig, GatewayError, REQUEST_ID_HEADER, RecordGateway, RestGateway};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
}

#[derive(Clone, Default)]
struct Backend {
    items: Arc<Mutex<Vec<Item>>>,
    request_ids: Arc<Mutex<Vec<String>>>,
    next_id: Arc<Mutex<i64>>,
}

impl Backend {
    fn record_request(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get(REQUEST_ID_HEADER) {
            self.request_ids
                .lock()
                .unwrap()
                .push(value.to_str().unwrap().to_string());
        }
    }
}

async fn list_items(State(backend): State<Backend>, headers: HeaderMap) -> Json<Vec<Item>> {
    backend.record_request(&headers);
    Json(backend.items.lock().unwrap().clone())
}

async fn create_item(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(mut item): Json<Item>,
) -> Json<Item> {
    backend.record_request(&headers);
    let mut next = backend.next_id.lock().unwrap();
    *next += 1;
    item.id = Some(*next);
    backend.items.lock().unwrap().push(item.clone());
    Json(item)
}

async fn get_item(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, StatusCode> {
    backend
        .items
        .lock()
        .unwrap()
        .iter()
        .find(|item| item.id == Some(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(mut update): Json<Item>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = backend.items.lock().unwrap();
    let slot = items
        .iter_mut()
        .find(|item| item.id == Some(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    update.id = Some(id);
    *slot = update.clone();
    Ok(Json(update))
}

async fn delete_item(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let mut items = backend.items.lock().unwrap();
    let before = items.len();
    items.retain(|item| item.id != Some(id));
    if items.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "deleted": true })))
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let router = Router::new()
        .route("/api/v1/items", get(list_items).post(create_item))
        .route(
            "/api/v1/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
        )
        .route("/garbled", get(|| async { "not json" }))
        .route("/garbled/{id}", get(|| async { "not json" }))
        .with_state(backend.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

fn gateway(base: &str, path: &str) -> RestGateway<Item> {
    RestGateway::new(&GatewayConfig::new(format!("{base}{path}"))).unwrap()
}

#[tokio::test]
async fn create_then_list_round_trips_through_backend() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/api/v1/items");

    let created = gateway
        .create(&Item {
            id: None,
            name: "first".into(),
        })
        .await
        .unwrap();
    assert_eq!(created["id"], 1);

    let items = gateway.list().await.unwrap();
    assert_eq!(
        items,
        vec![Item {
            id: Some(1),
            name: "first".into()
        }]
    );
}

#[tokio::test]
async fn update_and_get_by_id_use_item_path() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/api/v1/items/");
    gateway
        .create(&Item {
            id: None,
            name: "before".into(),
        })
        .await
        .unwrap();

    let ack = gateway
        .update(
            1,
            &Item {
                id: Some(1),
                name: "after".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(ack["name"], "after");
    assert_eq!(gateway.get_by_id(1).await.unwrap().name, "after");
}

#[tokio::test]
async fn missing_records_map_to_not_found() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/api/v1/items");

    let err = gateway.get_by_id(42).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { id: 42 }));

    let err = gateway
        .update(
            42,
            &Item {
                id: Some(42),
                name: "ghost".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_removes_record() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/api/v1/items");
    gateway
        .create(&Item {
            id: None,
            name: "doomed".into(),
        })
        .await
        .unwrap();

    let ack = gateway.delete(1).await.unwrap();
    assert_eq!(ack["deleted"], true);
    assert!(gateway.list().await.unwrap().is_empty());
    assert!(gateway.delete(1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/broken");

    match gateway.list().await.unwrap_err() {
        GatewayError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_bodies_map_to_decode() {
    let (base, _backend) = spawn_backend().await;
    let gateway = gateway(&base, "/garbled");

    let err = gateway.list().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)), "{err:?}");
    assert_eq!(err.code(), "DECODE");

    let err = gateway.get_by_id(3).await.unwrap_err();
    assert_eq!(err.code(), "DECODE");
}

#[tokio::test]
async fn every_request_carries_a_fresh_request_id() {
    let (base, backend) = spawn_backend().await;
    let gateway = gateway(&base, "/api/v1/items");
    gateway.list().await.unwrap();
    gateway.list().await.unwrap();

    let ids = backend.request_ids.lock().unwrap().clone();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gateway = gateway(&format!("http://{addr}"), "/api/v1/items");

    let err = gateway.list().await.unwrap_err();
    assert_eq!(err.code(), "TRANSPORT");
}
