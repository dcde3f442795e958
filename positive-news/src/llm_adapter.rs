use crate::traits::{Classifier, Verdict};
use crate::types::{ClassifierError, CuratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SKIP_SENTINEL: &str = "SKIP";
pub const MAX_DESCRIPTION_CHARS: usize = 600;
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const SYSTEM_PROMPT: &str = "\
Jsi editor seriózního pozitivního webu.
Analyzuj zprávu na základě titulku a perexu.

KRITÉRIA:
1. Hledáme POUZE: Vědecké objevy, Technologické inovace, Byznysové úspěchy, Medicínské průlomy, Dokončené projekty, Pomoc lidem.
2. IGNORUJ: Politiku, Krimi, Nehody, Bulvár, Sportovní výsledky.

POKUD ZPRÁVA NENÍ POZITIVNÍ:
Odpověz pouze slovem: SKIP

POKUD JE POZITIVNÍ:
Odpověz v tomto formátu:
KATEGORIE: [Vyber jednu: Věda / Technologie / Medicína / Byznys / Společnost]
TITULEK: [Přeformuluj na úderný titulek, max 8 slov]
SHRNUTÍ: [Napiš kvalitní shrnutí na 30-50 slov.]
";

/// Strip `<br>`/`<p>` markers and cap the description at 600 characters.
pub fn clean_description(description: &str) -> String {
    description
        .replace("<br>", " ")
        .replace("<p>", "")
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect()
}

pub fn build_user_message(title: &str, description: &str, link: &str) -> String {
    format!(
        "TITULEK: '{}'\nPEREX: '{}'\nODKAZ: {}",
        title,
        clean_description(description),
        link
    )
}

/// Map raw response text to a verdict. `SKIP` anywhere wins over everything else.
pub fn verdict_from_text(text: &str) -> Verdict {
    let text = text.trim();
    if text.contains(SKIP_SENTINEL) {
        Verdict::Reject
    } else {
        Verdict::Accept(text.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub rate_limit_cooldown: Duration,
}

impl ClassifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            timeout_seconds: 60,
            rate_limit_cooldown: Duration::from_secs(30),
        }
    }
}

/// Classifier backed by an OpenAI-compatible chat completions endpoint (Groq by default).
pub struct GroqClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl GroqClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CuratorError::Config("classifier API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn build_request(&self, title: &str, description: &str, link: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_user_message(title, description, link)),
            ],
            temperature: self.config.temperature,
        }
    }

    async fn chat_completion(&self, request: &ChatRequest) -> std::result::Result<String, ClassifierError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClassifierError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Classifier chat completion"
        );

        raw.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ClassifierError::EmptyResponse)
    }
}

#[async_trait]
impl Classifier for GroqClassifier {
    fn classifier_name(&self) -> String {
        format!("Groq ({})", self.config.model)
    }

    async fn analyze(&self, title: &str, description: &str, link: &str) -> Verdict {
        let request = self.build_request(title, description, link);

        match self.chat_completion(&request).await {
            Ok(text) => verdict_from_text(&text),
            Err(e) => {
                warn!("Classifier call failed for {}: {}", link, e);
                if e.is_rate_limit() {
                    info!("Rate limited, cooling down for {:?}", self.config.rate_limit_cooldown);
                    tokio::time::sleep(self.config.rate_limit_cooldown).await;
                }
                Verdict::Reject
            }
        }
    }
}

/// Deterministic classifier that replays queued responses in order.
///
/// Once the queue is empty every call answers `SKIP`. Used by tests and `--dry-run`.
pub struct ScriptedClassifier {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    fn classifier_name(&self) -> String {
        "Scripted".to_string()
    }

    async fn analyze(&self, title: &str, _description: &str, _link: &str) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = match self.responses.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };
        debug!("Scripted classifier answering for '{}'", title);
        verdict_from_text(&next.unwrap_or_else(|| SKIP_SENTINEL.to_string()))
    }
}
