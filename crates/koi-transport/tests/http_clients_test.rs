//! Clients against a throwaway local HTTP responder.

use std::time::Duration;

use koi_core::errors::{BackendError, TransientCause};
use koi_core::models::{GraphRequest, VectorQuery};
use koi_core::traits::{IGraphBackend, IPredicateSimilarity, IVectorBackend};
use koi_core::KoiError;
use koi_transport::{
    build_client, HttpClientConfig, HttpGraphClient, HttpSimilarityClient, HttpVectorClient,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one request with `status` and a JSON `body`. The handle
/// yields the raw request text.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (base, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client(timeout: Duration) -> reqwest::Client {
    build_client(&HttpClientConfig {
        timeout,
        connect_timeout: timeout,
        ..HttpClientConfig::default()
    })
    .unwrap()
}

fn statement_request() -> GraphRequest {
    GraphRequest {
        graph: "regen_graph".into(),
        query: "MATCH (s)-[r]->(o) RETURN s.name AS subject LIMIT 5".into(),
        columns: vec!["subject".into(), "predicate".into(), "object".into()],
    }
}

fn backend_error(err: KoiError) -> BackendError {
    match err {
        KoiError::Backend(e) => e,
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn graph_client_posts_request_and_reads_rows() {
    let body = r#"{"rows":[{"subject":"MsgSend","predicate":"hasField","object":"amount"}]}"#;
    let (base, server) = serve_once("200 OK", body.to_string()).await;
    let graph = HttpGraphClient::with_client(client(Duration::from_secs(5)), format!("{base}/api/graph/query"));

    let rows = graph.run(&statement_request()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["object"], "amount");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/graph/query HTTP/1.1"));
    assert!(request.contains("\"graph\":\"regen_graph\""));
    assert!(request.contains("\"columns\":[\"subject\",\"predicate\",\"object\"]"));
}

#[tokio::test]
async fn server_error_is_transient_with_status() {
    let (base, _server) = serve_once("503 Service Unavailable", r#"{"error":"busy"}"#.into()).await;
    let graph = HttpGraphClient::with_client(client(Duration::from_secs(5)), base);

    let err = backend_error(graph.run(&statement_request()).await.unwrap_err());
    match err {
        BackendError::Transient { cause, .. } => assert_eq!(cause, TransientCause::Status(503)),
        other => panic!("expected transient, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_is_permanent() {
    let (base, _server) = serve_once("400 Bad Request", r#"{"error":"syntax"}"#.into()).await;
    let graph = HttpGraphClient::with_client(client(Duration::from_secs(5)), base);

    let err = graph.run(&statement_request()).await.unwrap_err();
    assert!(!err.is_retriable());
    assert!(matches!(
        backend_error(err),
        BackendError::Permanent { status: Some(400), .. }
    ));
}

#[tokio::test]
async fn malformed_success_body_is_permanent() {
    let (base, _server) = serve_once("200 OK", "<html>oops</html>".into()).await;
    let graph = HttpGraphClient::with_client(client(Duration::from_secs(5)), base);

    let err = backend_error(graph.run(&statement_request()).await.unwrap_err());
    assert!(!err.is_transient());
}

#[tokio::test]
async fn refused_connection_is_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let graph = HttpGraphClient::with_client(client(Duration::from_secs(5)), format!("http://{addr}"));

    let err = graph.run(&statement_request()).await.unwrap_err();
    assert!(err.is_retriable());
    assert!(matches!(
        backend_error(err),
        BackendError::Transient {
            cause: TransientCause::ConnectionRefused,
            ..
        }
    ));
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let _hold = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });
    let graph = HttpGraphClient::with_client(client(Duration::from_millis(100)), base);

    let err = backend_error(graph.run(&statement_request()).await.unwrap_err());
    assert!(matches!(
        err,
        BackendError::Transient {
            cause: TransientCause::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn vector_client_searches_with_filters() {
    let body = r#"{"success":true,"query":"retire","memories":[{"rid":"orn:a","content":"Retiring credits","text":"Retiring credits","source":"notion","score":0.7}],"results":[],"count":1}"#;
    let (base, server) = serve_once("200 OK", body.to_string()).await;
    let vector = HttpVectorClient::with_client(client(Duration::from_secs(5)), &format!("{base}/api/koi"));

    let query = VectorQuery::new("retire", 10).with_source_sensor("notion");
    let memories = vector.search(&query).await.unwrap();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].rid, "orn:a");
    assert_eq!(memories[0].similarity, 0.7);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/koi/query HTTP/1.1"));
    assert!(request.contains("\"source_sensor\":\"notion\""));
}

#[tokio::test]
async fn vector_health_reads_status() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"status":"degraded","database":"disconnected","uptime":12}"#.into(),
    )
    .await;
    let vector = HttpVectorClient::with_client(client(Duration::from_secs(5)), &base);

    let health = vector.health().await.unwrap();
    assert!(!health.is_healthy());
    assert_eq!(health.database.as_deref(), Some("disconnected"));
    assert!(server.await.unwrap().starts_with("GET /health HTTP/1.1"));
}

#[tokio::test]
async fn vector_stats_reads_counters() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"total_documents":120,"recent_7_days":4,"by_source":{"github":100,"notion":20},"database_config":{"host":"db"}}"#.into(),
    )
    .await;
    let vector = HttpVectorClient::with_client(client(Duration::from_secs(5)), &base);

    let stats = vector.stats().await.unwrap();
    assert_eq!(stats.total_documents, 120);
    assert_eq!(stats.recent_7_days, 4);
    assert_eq!(stats.by_source.get("notion"), Some(&20));
    assert!(server.await.unwrap().starts_with("GET /stats HTTP/1.1"));
}

#[tokio::test]
async fn similarity_client_caps_to_top_k() {
    let body = r#"[{"predicate":"hasField","score":0.9},{"predicate":"hasParameter","score":0.8},{"predicate":"uses","score":0.2}]"#;
    let (base, server) = serve_once("200 OK", body.to_string()).await;
    let similarity = HttpSimilarityClient::with_client(client(Duration::from_secs(5)), &base);

    let got = similarity.similar("fields of MsgSend", 2).await.unwrap();
    let names: Vec<&str> = got.iter().map(|p| p.predicate.as_str()).collect();
    assert_eq!(names, ["hasField", "hasParameter"]);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /similar HTTP/1.1"));
    assert!(request.contains("\"top_k\":2"));
}
