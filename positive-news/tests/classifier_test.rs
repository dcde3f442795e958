use positive_news::llm_adapter::{build_user_message, clean_description, verdict_from_text, SYSTEM_PROMPT};
use positive_news::{
    Classifier, ClassifierConfig, ClassifierError, CuratorError, GroqClassifier,
    ScriptedClassifier, Verdict,
};
use std::net::SocketAddr;
use std::sync::Once;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

const ACCEPTED: &str = "KATEGORIE: Věda\nTITULEK: Nový objev\nSHRNUTÍ: Vědci popsali nový druh.";

fn local_config(addr: SocketAddr, cooldown: Duration) -> ClassifierConfig {
    ClassifierConfig {
        base_url: format!("http://{addr}"),
        timeout_seconds: 5,
        rate_limit_cooldown: cooldown,
        ..ClassifierConfig::new("test-key")
    }
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Answer exactly one HTTP request with the given status and body, returning the raw request.
async fn serve_once(status: &'static str, body: String) -> std::io::Result<(SocketAddr, JoinHandle<std::io::Result<String>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await?;
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = header_end(&buf) {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    });

    Ok((addr, handle))
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

#[test]
fn rate_limit_signature_detection() {
    init_tracing();

    assert!(ClassifierError::RateLimited.is_rate_limit());
    assert!(ClassifierError::Api { status: 429, body: String::new() }.is_rate_limit());
    assert!(ClassifierError::Network("status 429 from upstream".to_string()).is_rate_limit());
    assert!(!ClassifierError::Api { status: 500, body: String::new() }.is_rate_limit());
    assert!(!ClassifierError::EmptyResponse.is_rate_limit());
}

#[test]
fn description_is_cleaned_and_capped() {
    init_tracing();

    assert_eq!(clean_description("<p>První<br>druhá"), "První druhá");

    let long = "ž".repeat(700);
    assert_eq!(clean_description(&long).chars().count(), 600);
}

#[test]
fn user_message_carries_title_perex_and_link() {
    init_tracing();

    let message = build_user_message("Titulek", "<p>Perex", "https://a.cz/1");

    assert_eq!(message, "TITULEK: 'Titulek'\nPEREX: 'Perex'\nODKAZ: https://a.cz/1");
}

#[test]
fn skip_anywhere_rejects() {
    init_tracing();

    assert_eq!(verdict_from_text("SKIP"), Verdict::Reject);
    assert_eq!(verdict_from_text("  Tohle je SKIP.\n"), Verdict::Reject);
    assert_eq!(verdict_from_text(&format!("{ACCEPTED}\nSKIP")), Verdict::Reject);
    assert_eq!(verdict_from_text(&format!("  {ACCEPTED}\n")), Verdict::Accept(ACCEPTED.to_string()));
}

#[test]
fn empty_api_key_is_a_config_error() {
    init_tracing();

    let result = GroqClassifier::new(ClassifierConfig::new("   "));

    assert!(matches!(result, Err(CuratorError::Config(_))));
}

#[test]
fn request_uses_configured_model_and_prompt() -> Result<(), CuratorError> {
    init_tracing();
    let classifier = GroqClassifier::new(ClassifierConfig::new("test-key"))?;

    let request = classifier.build_request("Titulek", "Perex", "https://a.cz/1");

    assert_eq!(request.model, "llama-3.3-70b-versatile");
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
    assert_eq!(request.messages[1].role, "user");
    assert!(request.messages[1].content.contains("ODKAZ: https://a.cz/1"));
    Ok(())
}

#[tokio::test]
async fn scripted_classifier_replays_then_skips() {
    init_tracing();
    let classifier = ScriptedClassifier::new([ACCEPTED]);

    assert_eq!(classifier.analyze("a", "", "l1").await, Verdict::Accept(ACCEPTED.to_string()));
    assert_eq!(classifier.analyze("b", "", "l2").await, Verdict::Reject);
    assert_eq!(classifier.call_count(), 2);
}

#[tokio::test]
async fn successful_completion_is_accepted() -> Result<(), CuratorError> {
    init_tracing();
    let (addr, server) = serve_once("200 OK", completion_body(ACCEPTED)).await?;
    let classifier = GroqClassifier::new(local_config(addr, Duration::from_secs(5)))?;

    let verdict = classifier.analyze("Titulek", "Perex", "https://a.cz/1").await;
    let request = server.await.expect("server task")?;

    info!("Server saw request: {}", request.lines().next().unwrap_or_default());
    assert_eq!(verdict, Verdict::Accept(ACCEPTED.to_string()));
    assert!(request.starts_with("POST /chat/completions"));
    assert!(request.to_lowercase().contains("authorization: bearer test-key"));
    assert!(request.contains("llama-3.3-70b-versatile"));
    Ok(())
}

#[tokio::test]
async fn skip_completion_is_rejected() -> Result<(), CuratorError> {
    init_tracing();
    let (addr, server) = serve_once("200 OK", completion_body("SKIP")).await?;
    let classifier = GroqClassifier::new(local_config(addr, Duration::from_secs(5)))?;

    let verdict = classifier.analyze("Titulek", "Perex", "https://a.cz/1").await;
    server.await.expect("server task")?;

    assert_eq!(verdict, Verdict::Reject);
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_rejected() -> Result<(), CuratorError> {
    init_tracing();
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?
    };
    let classifier = GroqClassifier::new(local_config(addr, Duration::from_secs(5)))?;

    let start = Instant::now();
    let verdict = classifier.analyze("Titulek", "Perex", "https://a.cz/1").await;

    assert_eq!(verdict, Verdict::Reject);
    // Connection failures do not trigger the cool-down
    assert!(start.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn rate_limited_call_waits_out_the_cooldown() -> Result<(), CuratorError> {
    init_tracing();
    let cooldown = Duration::from_millis(300);
    let (addr, server) = serve_once("429 Too Many Requests", String::new()).await?;
    let classifier = GroqClassifier::new(local_config(addr, cooldown))?;

    let start = Instant::now();
    let verdict = classifier.analyze("Titulek", "Perex", "https://a.cz/1").await;
    let elapsed = start.elapsed();
    server.await.expect("server task")?;

    info!("Rate-limited call took {:?}", elapsed);
    assert_eq!(verdict, Verdict::Reject);
    assert!(elapsed >= cooldown);
    Ok(())
}

#[tokio::test]
async fn server_error_is_rejected_without_cooldown() -> Result<(), CuratorError> {
    init_tracing();
    let (addr, server) = serve_once("500 Internal Server Error", "{\"error\":\"boom\"}".to_string()).await?;
    let classifier = GroqClassifier::new(local_config(addr, Duration::from_secs(5)))?;

    let start = Instant::now();
    let verdict = classifier.analyze("Titulek", "Perex", "https://a.cz/1").await;
    server.await.expect("server task")?;

    assert_eq!(verdict, Verdict::Reject);
    assert!(start.elapsed() < Duration::from_secs(5));
    Ok(())
}
