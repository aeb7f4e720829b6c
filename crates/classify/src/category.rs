use serde::{Deserialize, Serialize};
use thiserror::Error;
use zapfin_parse::fold;

pub const FALLBACK_CATEGORY: &str = "Other";

const BUILTIN_LEXICON: &str = include_str!("../data/categories.toml");

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Failed to parse category lexicon: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    version: u32,
    #[serde(default, rename = "category")]
    categories: Vec<Category>,
}

/// Ordered category → keywords table. Immutable once built.
///
/// Lookup folds case and accents on both sides and returns the first
/// category, in declaration order, with a keyword contained in the text.
#[derive(Debug, Clone, Default)]
pub struct CategoryLexicon {
    version: u32,
    categories: Vec<Category>,
    /// Folded keywords per category, same order as `categories`.
    folded: Vec<Vec<String>>,
}

impl CategoryLexicon {
    pub fn new(version: u32, categories: Vec<Category>) -> Self {
        let folded = categories
            .iter()
            .map(|c| {
                c.keywords
                    .iter()
                    .map(|k| fold(k.trim()))
                    // An empty keyword would match every description.
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .collect();
        Self {
            version,
            categories,
            folded,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The lexicon shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_LEXICON).unwrap_or_else(|e| {
            tracing::warn!("built-in category lexicon is unusable, falling back to empty: {e}");
            Self::empty()
        })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = toml::from_str(toml_content)?;
        Ok(Self::new(file.version, file.categories))
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category for `description`, or [`FALLBACK_CATEGORY`].
    pub fn infer(&self, description: &str) -> &str {
        let text = fold(description);
        self.categories
            .iter()
            .zip(&self.folded)
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(category, _)| category.name.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }
}
