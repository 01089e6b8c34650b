use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::hierarchy::NodePath;

/// Which of the two verse texts is shown and scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Korean,
    English,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Korean => Language::English,
            Language::English => Language::Korean,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Korean => "korean",
            Language::English => "english",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "korean" | "ko" => Some(Language::Korean),
            "english" | "en" => Some(Language::English),
            _ => None,
        }
    }
}

/// Fully-qualified verse identity: `category/subcategory[/subsubcategory]/number`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerseId(String);

impl VerseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VerseId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub category: String,
    pub subcategory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsubcategory: Option<String>,
    pub number: u32,
    pub book: String,
    pub chapter: u32,
    pub verse1: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse2: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versename: Option<String>,
    #[serde(rename = "koreanText")]
    pub korean_text: String,
    #[serde(rename = "englishText")]
    pub english_text: String,
}

impl Verse {
    pub fn id(&self) -> VerseId {
        let mut id = format!("{}/{}", self.category, self.subcategory);
        if let Some(ref ss) = self.subsubcategory {
            id.push('/');
            id.push_str(ss);
        }
        id.push('/');
        id.push_str(&self.number.to_string());
        VerseId(id)
    }

    /// The `subcategory-number` key older progress files were written with.
    pub fn legacy_id(&self) -> String {
        format!("{}-{}", self.subcategory, self.number)
    }

    /// Position of this verse in the category hierarchy.
    pub fn path(&self) -> NodePath {
        let mut labels = vec![self.category.clone(), self.subcategory.clone()];
        if let Some(ref ss) = self.subsubcategory {
            labels.push(ss.clone());
        }
        NodePath::from_labels(labels)
    }

    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::Korean => &self.korean_text,
            Language::English => &self.english_text,
        }
    }

    /// Scripture reference such as `요한복음 3:16` or `잠언 3:5-6`.
    pub fn reference(&self) -> String {
        match self.verse2 {
            Some(end) => format!("{} {}:{}-{}", self.book, self.chapter, self.verse1, end),
            None => format!("{} {}:{}", self.book, self.chapter, self.verse1),
        }
    }

    /// Breadcrumb shown above a verse card.
    pub fn breadcrumb(&self) -> String {
        self.path().labels().join(" > ")
    }
}
