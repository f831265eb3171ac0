//! Simple mock HTTP collector for testing the flusher

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
pub struct MockServer {
    pub addr: SocketAddr,
    pub received_requests: Arc<Mutex<Vec<ReceivedRequest>>>,
    statuses: Arc<Mutex<VecDeque<u16>>>,
}

impl MockServer {
    /// Start a mock collector on a random port that answers every request
    /// with 200.
    pub async fn start() -> Self {
        Self::with_status_sequence(vec![]).await
    }

    /// Start a mock collector that answers with the given statuses in order,
    /// then 200 for every request after the script runs out.
    pub async fn with_status_sequence(statuses: Vec<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        let received_requests = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(VecDeque::from(statuses)));
        let requests_clone = received_requests.clone();
        let statuses_clone = statuses.clone();

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };

                let io = TokioIo::new(stream);
                let requests = requests_clone.clone();
                let statuses = statuses_clone.clone();

                tokio::spawn(async move {
                    let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let requests = requests.clone();
                        let statuses = statuses.clone();
                        async move {
                            // Capture the request
                            let method = req.method().to_string();
                            let path = req.uri().path().to_string();
                            let headers: Vec<(String, String)> = req
                                .headers()
                                .iter()
                                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                                .collect();

                            let body = req
                                .into_body()
                                .collect()
                                .await
                                .map(|collected| collected.to_bytes().to_vec())
                                .unwrap_or_default();

                            requests.lock().unwrap().push(ReceivedRequest {
                                method,
                                path,
                                headers,
                                body,
                            });

                            let status = statuses.lock().unwrap().pop_front().unwrap_or(200);
                            let body = if status == 200 {
                                r#"{"text":"Success","code":0}"#
                            } else {
                                r#"{"text":"failure"}"#
                            };
                            Ok::<_, hyper::http::Error>(
                                Response::builder()
                                    .status(status)
                                    .body(Full::new(Bytes::from(body)))
                                    .unwrap(),
                            )
                        }
                    });

                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        MockServer {
            addr,
            received_requests,
            statuses,
        }
    }

    /// Endpoint address carrying an explicit scheme, so the flusher targets
    /// this plain-HTTP server instead of wrapping the address in `https://`.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.received_requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.received_requests.lock().unwrap().clone()
    }

    pub fn remaining_statuses(&self) -> usize {
        self.statuses.lock().unwrap().len()
    }
}
