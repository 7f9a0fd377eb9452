//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
        }
    }
}

/// A user-facing message in every supported language
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: String,
    pub es: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Spanish => &self.es,
            Language::English => &self.en,
        }
    }
}

/// Reference to a file held by the external storage service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileReference {
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

/// Types of uploaded files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Image,
    Document,
}

impl FileKind {
    /// Classify an upload by its declared content type
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.starts_with("image/") {
            Some(FileKind::Image)
        } else if content_type == "application/pdf" {
            Some(FileKind::Document)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_text_lookup() {
        let text = LocalizedText::new("Approved", "Aprobado");
        assert_eq!(text.get(Language::English), "Approved");
        assert_eq!(text.get(Language::Spanish), "Aprobado");
    }

    #[test]
    fn test_file_kind_from_content_type() {
        assert_eq!(FileKind::from_content_type("image/png"), Some(FileKind::Image));
        assert_eq!(FileKind::from_content_type("Application/PDF"), Some(FileKind::Document));
        assert_eq!(FileKind::from_content_type("text/html"), None);
    }
}
