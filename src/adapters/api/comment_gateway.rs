use async_trait::async_trait;

use super::{CommentDto, CommentTextDto, CommentsClient};
use crate::{
    domain::{Comment, CommentId, SortPreference},
    ports::{CommentGateway, GatewayResult},
};

/// `CommentGateway` backed by the REST comments resource.
pub struct HttpCommentGateway {
    client: CommentsClient,
}

impl HttpCommentGateway {
    pub fn new(client: CommentsClient) -> Self {
        Self { client }
    }

    fn build_list_query_params(&self, sort: SortPreference) -> Vec<(String, String)> {
        vec![("ordering".to_string(), sort.ordering_param())]
    }

    fn build_query_string(&self, params: &[(String, String)]) -> String {
        if params.is_empty() {
            return String::new();
        }

        format!(
            "?{}",
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }
}

#[async_trait]
impl CommentGateway for HttpCommentGateway {
    async fn list(&self, sort: SortPreference) -> GatewayResult<Vec<Comment>> {
        let params = self.build_list_query_params(sort);
        let path = self.build_query_string(&params);

        let dtos: Vec<CommentDto> = self.client.get(&path).await?;
        dtos.into_iter().map(Comment::try_from).collect()
    }

    async fn create(&self, text: &str) -> GatewayResult<Comment> {
        let dto: CommentDto = self.client.post("", &CommentTextDto { text }).await?;
        dto.try_into()
    }

    async fn update(&self, id: CommentId, text: &str) -> GatewayResult<Comment> {
        let path = format!("{id}/");
        let dto: CommentDto = self.client.patch(&path, &CommentTextDto { text }).await?;
        dto.try_into()
    }

    async fn delete(&self, id: CommentId) -> GatewayResult<()> {
        self.client.delete(&format!("{id}/")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SortField, SortOrder};
    use crate::ports::TransportError;
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        routing::{get, patch},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::{collections::HashMap, sync::Arc, time::Duration};
    use tokio::{net::TcpListener, sync::Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Recorded {
        method: &'static str,
        path: String,
        query: HashMap<String, String>,
        body: Option<Value>,
    }

    #[derive(Clone, Default)]
    struct ServerState {
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    fn comment_json(id: i64, text: &str) -> Value {
        json!({
            "id": id,
            "author": "Admin",
            "text": text,
            "date": "2024-05-01T10:00:00Z",
            "image": null,
            "likes": 0
        })
    }

    async fn handle_list(
        State(state): State<ServerState>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        state.requests.lock().await.push(Recorded {
            method: "GET",
            path: "/api/comments/".to_string(),
            query,
            body: None,
        });
        Json(json!([comment_json(2, "b"), comment_json(1, "a")]))
    }

    async fn handle_create(
        State(state): State<ServerState>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let text = body["text"].as_str().unwrap_or_default().to_string();
        state.requests.lock().await.push(Recorded {
            method: "POST",
            path: "/api/comments/".to_string(),
            query: HashMap::new(),
            body: Some(body),
        });
        (StatusCode::CREATED, Json(comment_json(3, &text)))
    }

    async fn handle_update(
        State(state): State<ServerState>,
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let text = body["text"].as_str().unwrap_or_default().to_string();
        state.requests.lock().await.push(Recorded {
            method: "PATCH",
            path: format!("/api/comments/{id}/"),
            query: HashMap::new(),
            body: Some(body),
        });
        Json(comment_json(id, &text))
    }

    async fn handle_delete(State(state): State<ServerState>, Path(id): Path<i64>) -> StatusCode {
        state.requests.lock().await.push(Recorded {
            method: "DELETE",
            path: format!("/api/comments/{id}/"),
            query: HashMap::new(),
            body: None,
        });
        StatusCode::NO_CONTENT
    }

    async fn handle_failure() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn handle_garbage() -> &'static str {
        "not json"
    }

    async fn spawn_comment_server() -> (String, ServerState) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = ServerState::default();
        let app = Router::new()
            .route("/api/comments/", get(handle_list).post(handle_create))
            .route(
                "/api/comments/:id/",
                patch(handle_update).delete(handle_delete),
            )
            .route("/broken/", get(handle_failure).post(handle_failure))
            .route("/broken/:id/", patch(handle_failure).delete(handle_failure))
            .route("/garbage/", get(handle_garbage))
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), state)
    }

    fn gateway(base_url: String) -> HttpCommentGateway {
        HttpCommentGateway::new(
            CommentsClient::new(&base_url, Duration::from_secs(5)).expect("client"),
        )
    }

    #[tokio::test]
    async fn test_list_sends_ordering_and_keeps_server_order() {
        let (url, state) = spawn_comment_server().await;
        let gateway = gateway(format!("{url}/api/comments/"));

        let comments = gateway
            .list(SortPreference::new(SortField::Id, SortOrder::Desc))
            .await
            .expect("list");

        let ids: Vec<i64> = comments.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![2, 1]);

        let requests = state.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query.get("ordering").map(String::as_str), Some("-id"));
    }

    #[tokio::test]
    async fn test_create_posts_text() {
        let (url, state) = spawn_comment_server().await;
        let gateway = gateway(format!("{url}/api/comments"));

        let comment = gateway.create("hello").await.expect("create");
        assert_eq!(comment.id, CommentId(3));
        assert_eq!(comment.text, "hello");

        let requests = state.requests.lock().await;
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body, Some(json!({ "text": "hello" })));
    }

    #[tokio::test]
    async fn test_update_patches_resource() {
        let (url, state) = spawn_comment_server().await;
        let gateway = gateway(format!("{url}/api/comments/"));

        let comment = gateway.update(CommentId(2), "edited").await.expect("update");
        assert_eq!(comment.id, CommentId(2));
        assert_eq!(comment.text, "edited");

        let requests = state.requests.lock().await;
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].path, "/api/comments/2/");
        assert_eq!(requests[0].body, Some(json!({ "text": "edited" })));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_response() {
        let (url, state) = spawn_comment_server().await;
        let gateway = gateway(format!("{url}/api/comments/"));

        tokio_test::assert_ok!(gateway.delete(CommentId(1)).await);

        let requests = state.requests.lock().await;
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/api/comments/1/");
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let (url, _state) = spawn_comment_server().await;
        let gateway = gateway(format!("{url}/broken/"));

        let err = gateway.list(SortPreference::default()).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 500,
                body: "boom".to_string()
            }
        );
        assert!(matches!(
            gateway.create("x").await,
            Err(TransportError::Status { status: 500, .. })
        ));
        assert!(matches!(
            gateway.update(CommentId(1), "x").await,
            Err(TransportError::Status { status: 500, .. })
        ));
        assert!(matches!(
            gateway.delete(CommentId(1)).await,
            Err(TransportError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transport_error() {
        let (url, _state) = spawn_comment_server().await;
        let gateway = gateway(format!("{url}/garbage/"));

        let err = gateway.list(SortPreference::default()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let gateway = gateway(format!("http://{addr}/api/comments/"));
        let err = gateway.list(SortPreference::default()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
