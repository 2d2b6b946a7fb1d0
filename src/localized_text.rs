/*!
 * Localized-text values and the translation-need predicate.
 *
 * A localized-text cell is stored in the source export as either a map of
 * locale code to string (`{"ko_KR": "...", "en_US": "..."}`) or, for legacy
 * rows, a bare string that is treated as the primary locale's value.
 * Source data quality is inconsistent, so the accessor surface degrades to
 * an empty string instead of failing; malformed cells are still surfaced
 * through an explicit parse variant so the planner can count them.
 */

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde_json::Value;

/// Default source-locale priority order used when the config does not
/// override it: primary, secondary, tertiary.
pub static DEFAULT_LOCALE_PRIORITY: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        "ko_KR".to_string(),
        "en_US".to_string(),
        "th_TH".to_string(),
    ]
});

/// A parsed localized-text cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizedText {
    /// The field is absent or JSON null
    Missing,
    /// Legacy representation: a bare string, treated as the primary locale
    Bare(String),
    /// Structured representation: locale code -> text
    Map(BTreeMap<String, String>),
    /// Present but neither a string nor an object of strings
    Malformed,
}

impl LocalizedText {
    /// Parse a cell from the raw JSON value of an entity field
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(text)) => Self::Bare(text.clone()),
            Some(Value::Object(map)) => {
                let mut out = BTreeMap::new();
                for (locale, entry) in map {
                    match entry {
                        Value::String(text) => {
                            out.insert(locale.clone(), text.clone());
                        }
                        Value::Null => {
                            // Tolerated: an explicitly null locale slot is
                            // the same as an absent one
                        }
                        _ => return Self::Malformed,
                    }
                }
                Self::Map(out)
            }
            Some(_) => Self::Malformed,
        }
    }

    /// Return the first non-empty source string, checking `priority` in order.
    ///
    /// A bare legacy string is its own source. Returns an empty string when
    /// the cell is missing, malformed, or has no populated candidate locale.
    pub fn source_text<'a>(&'a self, priority: &[String]) -> &'a str {
        match self {
            Self::Bare(text) => text,
            Self::Map(map) => {
                for locale in priority {
                    if let Some(text) = map.get(locale) {
                        if !text.trim().is_empty() {
                            return text;
                        }
                    }
                }
                ""
            }
            Self::Missing | Self::Malformed => "",
        }
    }

    /// Locale whose value `source_text` would return, in the same priority order
    pub fn source_locale<'a>(&self, priority: &'a [String]) -> Option<&'a str> {
        match self {
            Self::Bare(text) => {
                if text.trim().is_empty() {
                    None
                } else {
                    priority.first().map(|l| l.as_str())
                }
            }
            Self::Map(map) => priority.iter().find_map(|locale| {
                map.get(locale)
                    .filter(|text| !text.trim().is_empty())
                    .map(|_| locale.as_str())
            }),
            Self::Missing | Self::Malformed => None,
        }
    }

    /// Return the text stored at `locale`, or an empty string.
    ///
    /// A bare string answers only for the primary locale (the head of the
    /// priority list); every other locale is absent for legacy cells.
    pub fn text_for<'a>(&'a self, locale: &str, priority: &[String]) -> &'a str {
        match self {
            Self::Bare(text) => {
                if priority.first().map(|l| l.as_str()) == Some(locale) {
                    text
                } else {
                    ""
                }
            }
            Self::Map(map) => map.get(locale).map(|s| s.as_str()).unwrap_or(""),
            Self::Missing | Self::Malformed => "",
        }
    }

    /// Decide whether this cell needs a translation into `target_locale`.
    ///
    /// Absent cells never need translation. Bare legacy strings always do,
    /// because filling the target locale also upgrades the cell into the
    /// structured map form. Otherwise the cell needs translation iff a
    /// source text exists and the target locale is absent or blank after
    /// trimming.
    pub fn needs_translation(&self, target_locale: &str, priority: &[String]) -> bool {
        match self {
            Self::Missing | Self::Malformed => false,
            Self::Bare(text) => !text.trim().is_empty(),
            Self::Map(map) => {
                if self.source_text(priority).is_empty() {
                    return false;
                }
                match map.get(target_locale) {
                    Some(existing) => existing.trim().is_empty(),
                    None => true,
                }
            }
        }
    }

    /// Fold a translated value back in, producing the structured map form.
    ///
    /// A bare legacy string migrates to `{primary: original, target: translated}`.
    pub fn with_translation(
        &self,
        target_locale: &str,
        translated: &str,
        priority: &[String],
    ) -> LocalizedText {
        let mut map = match self {
            Self::Bare(text) => {
                let mut m = BTreeMap::new();
                if let Some(primary) = priority.first() {
                    m.insert(primary.clone(), text.clone());
                }
                m
            }
            Self::Map(existing) => existing.clone(),
            Self::Missing | Self::Malformed => BTreeMap::new(),
        };
        map.insert(target_locale.to_string(), translated.to_string());
        Self::Map(map)
    }

    /// Serialize back to the JSON form stored in entity snapshots
    pub fn to_value(&self) -> Value {
        match self {
            Self::Missing => Value::Null,
            Self::Bare(text) => Value::String(text.clone()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            Self::Malformed => Value::Null,
        }
    }

    /// Whether the cell parsed as a legacy bare string
    pub fn is_bare(&self) -> bool {
        matches!(self, Self::Bare(_))
    }

    /// Whether the cell was present but unparseable
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }
}
