/*!
 * Integration tests for the translation API client.
 *
 * A minimal in-process HTTP server scripts the API's responses, which is
 * enough to exercise the retry loop without a network or a mock framework.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use locfill::providers::GoogleTranslate;
use locfill::{ProviderError, TranslationBackend};

/// Serve the scripted responses one connection at a time, counting requests
async fn spawn_server(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            read_request(&mut socket).await;
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), hits)
}

/// Read one HTTP request: headers, then content-length body bytes
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn http_503() -> String {
    let body = "throttled";
    format!(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn http_400() -> String {
    let body = "invalid language pair";
    format!(
        "HTTP/1.1 400 Bad Request\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn http_200(translations: &[&str]) -> String {
    let items: Vec<String> = translations
        .iter()
        .map(|t| format!("{{\"translatedText\":\"{}\"}}", t))
        .collect();
    let body = format!("{{\"data\":{{\"translations\":[{}]}}}}", items.join(","));
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn client(endpoint: &str) -> GoogleTranslate {
    // 1ms backoff base keeps the retry path fast under test
    GoogleTranslate::new_with_config("test-key", endpoint, 3, 1, 10, 5)
}

#[tokio::test]
async fn test_transient_errors_are_retried_until_success() {
    let (endpoint, hits) =
        spawn_server(vec![http_503(), http_503(), http_200(&["Gangnam-gu"])]).await;

    let texts = vec!["강남구".to_string()];
    let result = client(&endpoint).translate_batch(&texts, "ko", "en").await;

    let translations = tokio_test::assert_ok!(result);
    assert_eq!(translations, vec!["Gangnam-gu".to_string()]);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_fail_fast_without_retry() {
    let (endpoint, hits) = spawn_server(vec![http_400(), http_200(&["unreached"])]).await;

    let texts = vec!["강남구".to_string()];
    let result = client(&endpoint).translate_batch(&texts, "ko", "en").await;

    match result {
        Err(ProviderError::ApiError { status_code, .. }) => assert_eq!(status_code, 400),
        other => panic!("expected ApiError, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let (endpoint, hits) =
        spawn_server(vec![http_503(), http_503(), http_503(), http_503()]).await;

    let texts = vec!["강남구".to_string()];
    let result = client(&endpoint).translate_batch(&texts, "ko", "en").await;

    match result {
        Err(ProviderError::ApiError { status_code, .. }) => assert_eq!(status_code, 503),
        other => panic!("expected ApiError, got {:?}", other),
    }
    // First try plus three retries
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_count_mismatch_is_a_permanent_error() {
    let (endpoint, hits) = spawn_server(vec![http_200(&["only one"])]).await;

    let texts = vec!["강남구".to_string(), "서초구".to_string()];
    let result = client(&endpoint).translate_batch(&texts, "ko", "en").await;

    match result {
        Err(ProviderError::CountMismatch { sent, received }) => {
            assert_eq!(sent, 2);
            assert_eq!(received, 1);
        }
        other => panic!("expected CountMismatch, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_translations_array_is_an_error() {
    let (endpoint, _) = spawn_server(vec![http_200(&[])]).await;

    let texts = vec!["강남구".to_string()];
    let result = client(&endpoint).translate_batch(&texts, "ko", "en").await;

    assert!(matches!(
        result,
        Err(ProviderError::NoTranslations { expected: 1 })
    ));
}

#[tokio::test]
async fn test_empty_input_makes_no_request() {
    let (endpoint, hits) = spawn_server(vec![http_200(&["unreached"])]).await;

    let result = client(&endpoint).translate_batch(&[], "ko", "en").await;

    assert_eq!(tokio_test::assert_ok!(result), Vec::<String>::new());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
