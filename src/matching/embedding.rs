use std::time::Duration;
use tracing::debug;

/// Texts longer than this are truncated before embedding; the model input
/// window is shorter anyway.
const EMBED_TEXT_LIMIT: usize = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("embedding provider returned an unexpected payload")]
    UnexpectedPayload,
    #[error("embedding provider returned status {0}")]
    Status(u16),
}

/// Soft dependency on an external embedding provider. Consumed at most once
/// per ranking call; the engine branches on whether usable vectors came back,
/// never on configuration.
pub trait EmbeddingGateway: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Null object used when no provider is configured. Returns no vectors so the
/// engine falls back to the categorical path.
#[derive(Debug, Default)]
pub struct NoopEmbeddingGateway;

impl EmbeddingGateway for NoopEmbeddingGateway {
    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(Vec::new())
    }
}

/// HuggingFace feature-extraction gateway. One bounded-timeout request per
/// call, no retries; callers needing resilience wrap the engine externally.
pub struct HuggingFaceGateway {
    client: reqwest::blocking::Client,
    token: String,
    endpoint: String,
}

impl HuggingFaceGateway {
    pub fn new(token: impl Into<String>, model: &str) -> Result<Self, EmbeddingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
            endpoint: format!(
                "https://api-inference.huggingface.co/pipeline/feature-extraction/{model}"
            ),
        })
    }
}

impl EmbeddingGateway for HuggingFaceGateway {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let inputs: Vec<&str> = texts
            .iter()
            .map(|text| truncated(text, EMBED_TEXT_LIMIT))
            .collect();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "inputs": inputs }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Status(status.as_u16()));
        }

        let vectors: Vec<Vec<f32>> = response
            .json()
            .map_err(|_| EmbeddingError::UnexpectedPayload)?;
        debug!(count = vectors.len(), "received embedding vectors");
        Ok(vectors)
    }
}

fn truncated(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Cosine similarity mapped onto [0, 1]. Mismatched dimensions or zero-norm
/// vectors yield zero rather than an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    ((dot / (norm_a * norm_b)) + 1.0) / 2.0
}
