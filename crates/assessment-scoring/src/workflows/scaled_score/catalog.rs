use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use super::domain::{unassigned_sections, Section, Unit};

/// Read-only list of sections units may draw from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionCatalog {
    sections: Vec<Section>,
}

impl SectionCatalog {
    pub fn standard() -> Self {
        Self {
            sections: vec![
                Section::new("section 1", 1, 27),
                Section::new("section 2", 2, 27),
                Section::new("section 3", 3, 22),
                Section::new("section 4", 4, 22),
                Section::new("section 5", 5, 75),
                Section::new("section 6", 6, 60),
                Section::new("section 7", 7, 40),
                Section::new("section 8", 8, 40),
            ],
        }
    }

    /// Build a catalog, rejecting incomplete entries and repeated ids.
    pub fn new(sections: Vec<Section>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for section in &sections {
            let id = section.id.ok_or_else(|| CatalogError::MissingId {
                name: section.name.clone(),
            })?;
            if section.question_count.is_none() {
                return Err(CatalogError::MissingQuestionCount(id));
            }
            if !seen.insert(id) {
                return Err(CatalogError::DuplicateId(id));
            }
        }

        Ok(Self { sections })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let sections: Vec<Section> = serde_json::from_str(&raw)?;
        Self::new(sections)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get(&self, id: u32) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == Some(id))
    }

    pub fn unassigned(&self, units: &[Unit]) -> Vec<Section> {
        unassigned_sections(&self.sections, units)
            .into_iter()
            .cloned()
            .collect()
    }
}

impl Default for SectionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read section catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("section catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog section '{name}' has no id")]
    MissingId { name: String },
    #[error("catalog section {0} has no question count")]
    MissingQuestionCount(u32),
    #[error("catalog section id {0} appears more than once")]
    DuplicateId(u32),
}
