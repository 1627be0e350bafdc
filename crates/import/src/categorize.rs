use financas_core::Transaction;
use serde::Deserialize;

/// Merchant-keyword fallback table. Substring matched, declaration
/// order, first hit wins — reproduced exactly for compatibility with
/// already-categorized history.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct KeywordRule {
    pattern: String,
    category: String,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    keywords: Vec<KeywordRule>,
}

impl KeywordTable {
    /// The built-in merchant table.
    pub fn builtin() -> Self {
        let entries = [
            ("uber", "Transporte"),
            ("99app", "Transporte"),
            ("ifood", "Alimentação"),
            ("netflix", "Assinaturas"),
            ("spotify", "Assinaturas"),
            ("amazon", "Compras"),
            ("mercado livre", "Compras"),
            ("supermercado", "Alimentação"),
            ("posto", "Transporte"),
            ("farmacia", "Saúde"),
            ("drogaria", "Saúde"),
        ];
        KeywordTable {
            entries: entries
                .iter()
                .map(|(k, c)| (k.to_string(), c.to_string()))
                .collect(),
        }
    }

    /// Loads extra rules from a TOML document:
    ///
    /// ```toml
    /// [[keywords]]
    /// pattern = "padaria"
    /// category = "Alimentação"
    /// ```
    ///
    /// User rules are tried before the built-in ones.
    pub fn builtin_with_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: KeywordFile = toml::from_str(content)?;
        let mut entries: Vec<(String, String)> = file
            .keywords
            .into_iter()
            .map(|r| (r.pattern.to_lowercase(), r.category))
            .collect();
        entries.extend(Self::builtin().entries);
        Ok(KeywordTable { entries })
    }

    pub fn lookup(&self, description: &str) -> Option<&str> {
        let lower = description.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, category)| category.as_str())
    }
}

/// Guesses a category for an uncategorized entry. Ordered rules, first
/// hit wins:
///
/// 1. exact case-insensitive description match in history;
/// 2. fuzzy containment against history sorted by description length
///    descending (so "Uber Trip" is preferred over "Uber"), requiring
///    the contained side to be longer than 3 characters;
/// 3. keyword table;
/// 4. none — callers fall back to "Outros" at commit time.
pub fn infer_category(
    description: &str,
    history: &[Transaction],
    keywords: &KeywordTable,
) -> Option<String> {
    let lower = description.to_lowercase();

    if let Some(exact) = history
        .iter()
        .find(|t| t.description.to_lowercase() == lower)
    {
        return Some(exact.category.clone());
    }

    let mut by_length: Vec<&Transaction> = history.iter().collect();
    by_length.sort_by(|a, b| b.description.len().cmp(&a.description.len()));

    let fuzzy = by_length.iter().find(|t| {
        let hist = t.description.to_lowercase();
        (hist.len() > 3 && lower.contains(&hist)) || (lower.len() > 3 && hist.contains(&lower))
    });
    if let Some(hit) = fuzzy {
        return Some(hit.category.clone());
    }

    keywords.lookup(description).map(str::to_string)
}
