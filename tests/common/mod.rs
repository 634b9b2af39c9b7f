//! Shared harness for integration tests: an in-process server and a fake source site.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use groundtruth::capability::Capabilities;
use groundtruth::embedding::{NliClassifier, SentenceEncoder};
use groundtruth::entities::HeuristicEntityExtractor;
use groundtruth::gateway::{AppState, create_router};
use groundtruth::source::{HttpDocumentFetcher, SourcePolicy};
use groundtruth::verification::VerifierConfig;
use tokio::net::TcpListener;

pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Capabilities backed by the lexical stubs and the heuristic tagger.
pub fn stub_capabilities() -> Capabilities {
    Capabilities::new(
        Arc::new(NliClassifier::stub()),
        Arc::new(SentenceEncoder::stub()),
        Arc::new(HeuristicEntityExtractor::new()),
    )
}

pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub async fn spawn_test_server() -> TestServer {
    let fetcher =
        HttpDocumentFetcher::new(Duration::from_secs(2), SourcePolicy::default()).unwrap();
    let state = AppState::new(
        stub_capabilities(),
        VerifierConfig::default(),
        SourcePolicy::default(),
        Arc::new(fetcher),
    )
    .unwrap();

    TestServer {
        addr: serve(create_router(state)).await,
    }
}
