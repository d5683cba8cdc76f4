#![cfg(feature = "openai")]

use axum::{Json, Router, http::StatusCode, routing::post};
use carebot_rag::embedding::EmbeddingProvider;
use carebot_rag::error::RagError;
use carebot_rag::openai::OpenAIEmbeddingProvider;
use serde_json::{Value, json};

async fn spawn_server(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    (format!("http://{addr}"), handle)
}

/// Answers with one 3-d vector per input, listed in reverse index order.
async fn embeddings(Json(body): Json<Value>) -> Json<Value> {
    let inputs = body["input"].as_array().cloned().unwrap_or_default();
    let data: Vec<Value> = inputs
        .iter()
        .enumerate()
        .rev()
        .map(|(i, _)| json!({ "index": i, "embedding": [i as f32, 1.0, 0.0] }))
        .collect();
    Json(json!({ "data": data }))
}

#[tokio::test]
async fn batch_embeddings_come_back_in_input_order() {
    let (base, handle) = spawn_server(Router::new().route("/embeddings", post(embeddings))).await;
    let provider = OpenAIEmbeddingProvider::new("test-key")
        .unwrap()
        .with_base_url(base)
        .with_native_dimensions(3);

    let vectors = provider.embed_batch(&["first", "second", "third"]).await.unwrap();
    assert_eq!(vectors.len(), 3);
    assert_eq!(vectors[0][0], 0.0);
    assert_eq!(vectors[2][0], 2.0);
    assert_eq!(provider.dimensions(), 3);

    handle.abort();
}

#[tokio::test]
async fn api_errors_surface_the_server_message() {
    let app = Router::new().route(
        "/embeddings",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "message": "invalid api key" } })),
            )
        }),
    );
    let (base, handle) = spawn_server(app).await;
    let provider = OpenAIEmbeddingProvider::new("bad-key").unwrap().with_base_url(base);

    let err = provider.embed("insulin").await.unwrap_err();
    match err {
        RagError::EmbeddingError { provider, message } => {
            assert_eq!(provider, "OpenAI");
            assert!(message.contains("invalid api key"), "unexpected message: {message}");
        }
        other => panic!("expected EmbeddingError, got {other:?}"),
    }

    handle.abort();
}

#[test]
fn empty_api_key_is_rejected() {
    assert!(OpenAIEmbeddingProvider::new("").is_err());
}
