use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;

/// What the server answers for a given method and path.
#[derive(Clone, Debug)]
pub struct CannedResponse {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn get(path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::GET, path, 200, body)
    }

    pub fn post(path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::POST, path, 200, body)
    }

    pub fn new(method: Method, path: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            body: body.into(),
        }
    }
}

/// One request as the server saw it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct Shared {
    responses: Vec<CannedResponse>,
    served: Mutex<HashMap<(Method, String), usize>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// An axum server on a loopback port, answering from canned responses.
///
/// Each canned method and path gets a route; other paths get a 404 and other methods on a known
/// path a 405. Several responses for one route are served in order, the last one repeating. Every
/// request that reaches a route is recorded. The server runs on its own thread and dies with the
/// test process.
pub struct TestServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

async fn answer(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    shared.requests.lock().expect("request log").push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let matching: Vec<&CannedResponse> = shared
        .responses
        .iter()
        .filter(|r| r.method == method && r.path == path)
        .collect();
    let mut served = shared.served.lock().expect("served counts");
    let nth = served.entry((method, path)).or_insert(0);
    let response = matching.get(*nth).or(matching.last()).copied();
    *nth += 1;

    match response {
        Some(r) => {
            let status = StatusCode::from_u16(r.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, r.body.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn router(shared: Arc<Shared>) -> Router {
    let mut routes: Vec<(Method, String)> = shared
        .responses
        .iter()
        .map(|r| (r.method.clone(), r.path.clone()))
        .collect();
    routes.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
    routes.dedup();

    let mut router = Router::new();
    for (method, path) in routes {
        let route = if method == Method::GET {
            get(answer)
        } else if method == Method::POST {
            post(answer)
        } else if method == Method::PUT {
            put(answer)
        } else if method == Method::DELETE {
            delete(answer)
        } else {
            panic!("no canned route for {method}");
        };
        router = router.route(&path, route);
    }
    router.with_state(shared)
}

impl TestServer {
    pub fn start(responses: Vec<CannedResponse>) -> Self {
        let shared = Arc::new(Shared {
            responses,
            ..Shared::default()
        });
        let app = router(Arc::clone(&shared));

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("listener should bind");
                tx.send(listener.local_addr().expect("listener should expose address"))
                    .expect("report address");
                axum::serve(listener, app).await.expect("test server should run");
            });
        });
        let addr = rx.recv().expect("test server address");

        Self { addr, shared }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().expect("request log").clone()
    }
}
