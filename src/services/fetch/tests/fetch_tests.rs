use super::*;
use crate::test_utils::{spawn_http_stub, StubResponse};

#[tokio::test]
async fn test_fetch_returns_body() {
    let base = spawn_http_stub(StubResponse::bytes(200, vec![1, 2, 3, 4])).await;
    let bytes = fetch_image(&format!("{base}/card.jpg"), Duration::from_secs(5)).await;
    assert_eq!(bytes, Some(vec![1, 2, 3, 4]));
}

#[tokio::test]
async fn test_fetch_http_error_is_no_signal() {
    let base = spawn_http_stub(StubResponse::bytes(404, b"missing".to_vec())).await;
    let fetcher = ImageFetcher::new(Duration::from_secs(5)).unwrap();

    let url = format!("{base}/missing.jpg");
    assert_eq!(fetcher.try_fetch(&url).await, Err(NoSignal::Http(404)));
    assert_eq!(fetcher.fetch(&url).await, None);
}

#[tokio::test]
async fn test_fetch_times_out() {
    let base = spawn_http_stub(
        StubResponse::bytes(200, vec![0; 16]).delayed(Duration::from_secs(5)),
    )
    .await;
    let fetcher = ImageFetcher::new(Duration::from_millis(200)).unwrap();
    assert_eq!(
        fetcher.try_fetch(&format!("{base}/slow.jpg")).await,
        Err(NoSignal::Timeout)
    );
}

#[tokio::test]
async fn test_fetch_rejects_oversized_body() {
    let base = spawn_http_stub(StubResponse::bytes(200, vec![7; 64])).await;
    let fetcher = ImageFetcher::new(Duration::from_secs(5))
        .unwrap()
        .with_max_bytes(16);
    assert!(matches!(
        fetcher.try_fetch(&format!("{base}/big.jpg")).await,
        Err(NoSignal::Decode(_))
    ));
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_none() {
    // Port 9 (discard) on localhost is closed in test environments.
    let bytes = fetch_image("http://127.0.0.1:9/card.jpg", Duration::from_secs(2)).await;
    assert_eq!(bytes, None);
}
