/*!
 * Translation backend implementations.
 *
 * This module contains client implementations for the batch translation API:
 * - Google: the Google-Translate-v2-shaped HTTP API
 * - Mock: an offline, scriptable backend used by tests and `--dry-run`
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for translation backends
///
/// Implementations translate a batch of texts in one call. The returned
/// vector is order-preserving and has the same length as the input; anything
/// else is an error the caller handles.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate `texts` from `source_lang` to `target_lang`.
    ///
    /// # Arguments
    /// * `texts` - The source strings; every text in one call shares `source_lang`
    /// * `source_lang` - API language code of the sources (e.g. `ko`)
    /// * `target_lang` - API language code to translate into (e.g. `ru`)
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - Translations in input order, or an error
    async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>, ProviderError>;
}

pub mod google;
pub mod mock;

pub use google::GoogleTranslate;
pub use mock::MockTranslator;
