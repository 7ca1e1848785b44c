//! In-process storage server that records requests for client tests.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::StorageClient;

/// Part of a multipart form received by the server.
#[derive(Debug, Clone)]
pub(crate) struct RecordedField {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Request received by the server.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub fields: Vec<RecordedField>,
}

impl RecordedRequest {
    /// Returns a header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

enum FakeBody {
    Fixed(Bytes),
    Channel(Mutex<Option<mpsc::Receiver<Bytes>>>),
}

/// Response the server gives to every request.
pub(crate) struct FakeResponse {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: FakeBody,
}

impl FakeResponse {
    pub fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            content_type: None,
            body: FakeBody::Fixed(Bytes::from_static(body.as_bytes())),
        }
    }

    pub fn ok(body: &'static str) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 200 response whose body is fed chunk by chunk through the sender.
    ///
    /// Serves a single request.
    pub fn streaming() -> (Self, mpsc::Sender<Bytes>) {
        let (sender, receiver) = mpsc::channel(4);
        let response = Self {
            status: StatusCode::OK,
            content_type: None,
            body: FakeBody::Channel(Mutex::new(Some(receiver))),
        };
        (response, sender)
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    fn render(&self) -> Response {
        let body = match &self.body {
            FakeBody::Fixed(bytes) => Body::from(bytes.clone()),
            FakeBody::Channel(receiver) => {
                let receiver = receiver.lock().unwrap().take().expect("streaming body already served");
                let chunks = futures::stream::unfold(receiver, |mut receiver| async move {
                    let chunk = receiver.recv().await?;
                    Some((Ok::<_, Infallible>(chunk), receiver))
                });
                Body::from_stream(chunks)
            }
        };

        let mut response = (self.status, body).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, content_type.parse().unwrap());
        }
        response
    }
}

#[derive(Clone)]
struct ServerState {
    response: Arc<FakeResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Storage server bound to an ephemeral local port.
///
/// The server task is aborted on drop.
pub(crate) struct FakeServer {
    host: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start(response: FakeResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());

        let state = ServerState {
            response: Arc::new(response),
            requests: Arc::default(),
        };
        let requests = state.requests.clone();

        let app = Router::new().fallback(record).with_state(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            host,
            requests,
            handle,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns a client for this server with fixed test credentials.
    pub fn client(&self) -> StorageClient {
        StorageClient::new(&self.host, "test-access", "test-secret").unwrap()
    }

    /// Returns the requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(State(state): State<ServerState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let headers = request.headers().clone();

    let is_multipart = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let mut body = Bytes::new();
    let mut fields = Vec::new();
    if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().map(str::to_owned);
            let file_name = field.file_name().map(str::to_owned);
            let data = field.bytes().await.unwrap();
            fields.push(RecordedField {
                name,
                file_name,
                data,
            });
        }
    } else {
        body = to_bytes(request.into_body(), usize::MAX).await.unwrap();
    }

    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body,
        fields,
    });

    state.response.render()
}
