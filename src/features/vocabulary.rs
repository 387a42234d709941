//! Frozen categorical vocabularies (geo-location, device-id) built at training time.

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Out-of-vocabulary code.
pub const UNKNOWN_CODE: i64 = -1;

/// On-disk shape of a vocabulary: code = position in `classes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VocabularyFile {
    name: String,
    classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VocabularyFile", into = "VocabularyFile")]
pub struct CategoryVocabulary {
    name: String,
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl CategoryVocabulary {
    /// Fit from training values: deduplicated and sorted, like a label encoder.
    pub fn fit<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = values
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = build_index(&classes);
        Self {
            name: name.to_string(),
            classes,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn code(&self, value: &str) -> Option<i64> {
        self.index.get(value).copied()
    }

    pub fn code_or_unknown(&self, value: &str) -> i64 {
        self.code(value).unwrap_or(UNKNOWN_CODE)
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Missing {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
    }
}

fn build_index(classes: &[String]) -> HashMap<String, i64> {
    classes
        .iter()
        .enumerate()
        .map(|(i, c)| (c.clone(), i as i64))
        .collect()
}

impl TryFrom<VocabularyFile> for CategoryVocabulary {
    type Error = String;

    fn try_from(file: VocabularyFile) -> Result<Self, Self::Error> {
        let index = build_index(&file.classes);
        if index.len() != file.classes.len() {
            return Err(format!("vocabulary `{}` contains duplicate classes", file.name));
        }
        Ok(Self {
            name: file.name,
            classes: file.classes,
            index,
        })
    }
}

impl From<CategoryVocabulary> for VocabularyFile {
    fn from(v: CategoryVocabulary) -> Self {
        Self {
            name: v.name,
            classes: v.classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_sorts_and_dedups() {
        let v = CategoryVocabulary::fit("geo", ["Japan", "Canada", "Japan", "Brazil"]);
        assert_eq!(v.classes(), ["Brazil", "Canada", "Japan"]);
        assert_eq!(v.code("Canada"), Some(1));
        assert_eq!(v.code_or_unknown("Wakanda"), UNKNOWN_CODE);
    }

    #[test]
    fn json_preserves_mapping() {
        let v = CategoryVocabulary::fit("device", ["DF_2", "DF_1"]);
        let s = serde_json::to_string(&v).unwrap();
        let back: CategoryVocabulary = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);
        assert_eq!(back.code("DF_2"), Some(1));
    }

    #[test]
    fn loaded_order_is_kept_verbatim() {
        let back: CategoryVocabulary =
            serde_json::from_str(r#"{"name":"geo","classes":["b","a"]}"#).unwrap();
        assert_eq!(back.code("b"), Some(0));
    }

    #[test]
    fn duplicates_rejected() {
        let res: Result<CategoryVocabulary, _> =
            serde_json::from_str(r#"{"name":"geo","classes":["a","a"]}"#);
        assert!(res.is_err());
    }
}
