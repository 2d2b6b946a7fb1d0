/*!
 * Mock translation backend.
 *
 * Used by the test suite and by `--dry-run` so the pipeline can execute
 * end to end without network access. Translations are deterministic
 * (`"[target] source"`), every call is recorded, and failures can be
 * scripted: fail the next N calls, reject batch-sized calls while
 * accepting per-item calls, or permanently reject specific texts.
 */

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::TranslationBackend;
use crate::errors::ProviderError;

/// One recorded call to the mock backend
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Texts that were sent
    pub texts: Vec<String>,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
}

#[derive(Debug, Default)]
struct MockState {
    /// Every call received, in order
    calls: Vec<RecordedCall>,
    /// Number of upcoming calls to fail with a transient error
    fail_next: usize,
    /// Whether calls with more than one text always fail
    fail_batches: bool,
    /// Texts that always fail, even as single-item calls
    poison_texts: Vec<String>,
}

/// Offline translation backend with scriptable failures
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    state: Arc<Mutex<MockState>>,
}

impl MockTranslator {
    /// Create a mock that translates everything successfully
    pub fn new() -> Self {
        Self::default()
    }

    /// The deterministic translation the mock produces for a text
    pub fn expected_translation(text: &str, target_lang: &str) -> String {
        format!("[{}] {}", target_lang, text)
    }

    /// Fail the next `count` calls with a transient server error
    pub fn fail_next_calls(&self, count: usize) {
        self.state.lock().fail_next = count;
    }

    /// Reject every call carrying more than one text; single-item calls succeed
    pub fn fail_batch_calls(&self, enabled: bool) {
        self.state.lock().fail_batches = enabled;
    }

    /// Permanently reject a specific text, batch or not
    pub fn poison_text(&self, text: impl Into<String>) {
        self.state.lock().poison_texts.push(text.into());
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of calls that carried more than one text
    pub fn batch_call_count(&self) -> usize {
        self.state.lock().calls.iter().filter(|c| c.texts.len() > 1).count()
    }
}

#[async_trait]
impl TranslationBackend for MockTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall {
            texts: texts.to_vec(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        });

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "scripted transient failure".to_string(),
            });
        }

        if state.fail_batches && texts.len() > 1 {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "scripted batch failure".to_string(),
            });
        }

        if texts.iter().any(|t| state.poison_texts.contains(t)) {
            return Err(ProviderError::ApiError {
                status_code: 400,
                message: "scripted permanent failure".to_string(),
            });
        }

        Ok(texts
            .iter()
            .map(|t| Self::expected_translation(t, target_lang))
            .collect())
    }
}
