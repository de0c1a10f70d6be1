use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoiceSynthError};

/// Speakers shown per table row in the catalog listing.
const SPEAKERS_PER_ROW: usize = 10;

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog {
    entries: vec![
        entry("v4_ru", "ru", "russian", strings(&["aidar", "baya", "kseniya", "xenia", "eugene"])),
        entry("v4_ua", "ua", "ukrainian", strings(&["mykyta"])),
        entry("v3_en", "en", "english", numbered("en", 118)),
        entry("v3_de", "de", "german", strings(&["eva_k", "karlsson"])),
        entry("v3_es", "es", "spanish", numbered("es", 3)),
        entry("v3_fr", "fr", "french", numbered("fr", 6)),
    ],
});

fn entry(id: &str, lang_dir: &str, language: &str, speakers: Vec<String>) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        url: format!("https://models.silero.ai/models/tts/{lang_dir}/{id}.pt"),
        language: language.to_string(),
        speakers,
    }
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn numbered(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}_{i}")).collect()
}

/// One downloadable model: where to fetch it and which speakers it knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub url: String,
    pub language: String,
    /// Ordered; the first speaker is the default.
    pub speakers: Vec<String>,
}

impl CatalogEntry {
    pub fn default_speaker(&self) -> &str {
        // Catalog construction rejects empty speaker lists.
        &self.speakers[0]
    }

    pub fn has_speaker(&self, name: &str) -> bool {
        self.speakers.iter().any(|s| s == name)
    }

    /// Resolve `name` against the speaker list.
    pub fn speaker(&self, name: &str) -> Result<&str> {
        self.speakers
            .iter()
            .find(|s| *s == name)
            .map(String::as_str)
            .ok_or_else(|| VoiceSynthError::InvalidSpeaker {
                requested: name.to_string(),
                valid: self.speakers.join(", "),
            })
    }
}

/// Read-only registry of models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The built-in Silero catalog.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a catalog from custom entries.
    ///
    /// Ids must be unique and non-empty; every entry needs at least one
    /// speaker and no speaker may appear twice.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut ids = HashSet::new();
        for entry in &entries {
            if entry.id.is_empty() {
                return Err(VoiceSynthError::InvalidCatalog(
                    "entry with empty id".to_string(),
                ));
            }
            if !ids.insert(entry.id.as_str()) {
                return Err(VoiceSynthError::InvalidCatalog(format!(
                    "duplicate model id '{}'",
                    entry.id
                )));
            }
            if entry.speakers.is_empty() {
                return Err(VoiceSynthError::InvalidCatalog(format!(
                    "model '{}' has no speakers",
                    entry.id
                )));
            }
            let mut seen = HashSet::new();
            if let Some(dup) = entry.speakers.iter().find(|s| !seen.insert(s.as_str())) {
                return Err(VoiceSynthError::InvalidCatalog(format!(
                    "model '{}' lists speaker '{dup}' twice",
                    entry.id
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| VoiceSynthError::InvalidCatalog(format!("failed to parse JSON: {e}")))?;
        Self::from_entries(entries)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn lookup(&self, id: &str) -> Result<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| VoiceSynthError::UnknownModel {
                requested: id.to_string(),
                valid: self.ids().collect::<Vec<_>>().join(", "),
            })
    }

    /// Model ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

/// Human-readable table of every model, its URL, language and speakers.
impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url_width = self
            .entries
            .iter()
            .map(|e| e.url.len())
            .max()
            .unwrap_or(0)
            .max(3);
        let rule = "-".repeat(url_width + 60);

        writeln!(
            f,
            " {:<10}|   {:<url_width$}|   {:<10}|   Speakers",
            "Model", "Url", "Language"
        )?;
        writeln!(f, "{rule}")?;

        for entry in &self.entries {
            for (i, row) in entry.speakers.chunks(SPEAKERS_PER_ROW).enumerate() {
                let (id, url, language) = if i == 0 {
                    (entry.id.as_str(), entry.url.as_str(), entry.language.as_str())
                } else {
                    ("", "", "")
                };
                writeln!(
                    f,
                    " {id:<10}|   {url:<url_width$}|   {language:<10}|   {}",
                    row.join(", ")
                )?;
            }
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_entry_has_speakers() {
        let catalog = Catalog::builtin();
        for id in catalog.ids() {
            let entry = catalog.lookup(id).unwrap();
            assert!(!entry.speakers.is_empty(), "{id} has no speakers");
            assert!(entry.url.ends_with(&format!("{id}.pt")));
        }
        assert_eq!(catalog.entries().len(), 6);
    }

    #[test]
    fn builtin_speaker_lists_match_models() {
        let catalog = Catalog::builtin();
        let ru = catalog.lookup("v4_ru").unwrap();
        assert_eq!(ru.speakers, ["aidar", "baya", "kseniya", "xenia", "eugene"]);
        assert_eq!(ru.default_speaker(), "aidar");
        assert_eq!(ru.url, "https://models.silero.ai/models/tts/ru/v4_ru.pt");

        let en = catalog.lookup("v3_en").unwrap();
        assert_eq!(en.speakers.len(), 118);
        assert_eq!(en.speakers.last().map(String::as_str), Some("en_117"));
    }

    #[test]
    fn unknown_model_lists_every_valid_id() {
        let err = Catalog::builtin().lookup("v5_xx").unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, VoiceSynthError::UnknownModel { .. }));
        for id in Catalog::builtin().ids() {
            assert!(message.contains(id), "{message} is missing {id}");
        }
    }

    #[test]
    fn speaker_lookup_is_membership() {
        let ru = Catalog::builtin().lookup("v4_ru").unwrap();
        assert_eq!(ru.speaker("xenia").unwrap(), "xenia");
        assert!(!ru.has_speaker("Xenia"));

        let err = ru.speaker("nonexistent").unwrap_err().to_string();
        for name in &ru.speakers {
            assert!(err.contains(name.as_str()));
        }
    }

    #[test]
    fn custom_catalog_from_json() {
        let catalog = Catalog::from_json_str(
            r#"[{"id": "tiny", "url": "http://localhost/tiny.pt", "language": "test",
                 "speakers": ["a", "b"]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), ["tiny"]);
        assert_eq!(catalog.lookup("tiny").unwrap().default_speaker(), "a");
    }

    #[test]
    fn rejects_malformed_catalogs() {
        let base = || CatalogEntry {
            id: "m".to_string(),
            url: "http://localhost/m.pt".to_string(),
            language: "test".to_string(),
            speakers: strings(&["a"]),
        };

        let mut empty = base();
        empty.speakers.clear();
        let mut dup_speaker = base();
        dup_speaker.speakers = strings(&["a", "b", "a"]);

        for entries in [vec![empty], vec![dup_speaker], vec![base(), base()]] {
            assert!(matches!(
                Catalog::from_entries(entries),
                Err(VoiceSynthError::InvalidCatalog(_))
            ));
        }
        assert!(matches!(
            Catalog::from_json_str("{not json"),
            Err(VoiceSynthError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn table_wraps_long_speaker_lists() {
        let table = Catalog::builtin().to_string();
        assert!(table.starts_with(" Model"));
        assert!(table.contains("v4_ru"));
        assert!(table.contains("aidar, baya, kseniya, xenia, eugene"));
        // 118 English speakers at ten per row.
        let en_rows = table.lines().filter(|l| l.contains("en_")).count();
        assert_eq!(en_rows, 12);
    }
}
