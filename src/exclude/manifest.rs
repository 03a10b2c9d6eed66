//! Snapshot, edit and restore `package.json`.
//!
//! Edits go through a JSON parse/mutate/serialize cycle so key order is kept
//! and no text patterns are involved. Restores write the snapshot bytes back
//! untouched.

use crate::core::{ExcludeError, ExcludeResult};
use crate::exclude::result::ManifestSnapshot;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Object-valued sections that declare dependencies by name
pub const DEPENDENCY_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "optionalDependencies",
    "peerDependencies",
];

/// Array-valued sections listing bundled dependency names
pub const BUNDLED_SECTIONS: &[&str] = &["bundleDependencies", "bundledDependencies"];

const DEFAULT_INDENT: &str = "  ";

/// What staging the manifest produced: the snapshot (if it could be read) and
/// the first error, if any
#[derive(Debug, Default)]
pub struct ManifestStaging {
    pub snapshot: Option<ManifestSnapshot>,
    pub error: Option<ExcludeError>,
}

pub struct ManifestEditor;

impl ManifestEditor {
    /// Read the manifest into memory
    pub async fn read(path: &Path) -> ExcludeResult<ManifestSnapshot> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ExcludeError::ManifestRead {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(ManifestSnapshot::new(path.to_path_buf(), content))
    }

    /// Write `content` over the manifest
    pub async fn write(path: &Path, content: &[u8]) -> ExcludeResult<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|source| ExcludeError::ManifestWrite {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write a snapshot back verbatim
    pub async fn restore(snapshot: &ManifestSnapshot) -> ExcludeResult<()> {
        Self::write(snapshot.path(), snapshot.content()).await
    }

    /// Return `content` with every entry named in `names` removed from the
    /// dependency sections. Names that are not declared are ignored.
    pub fn remove_entries(content: &[u8], names: &[String]) -> ExcludeResult<String> {
        let mut manifest: Value = serde_json::from_slice(content)?;

        if let Some(root) = manifest.as_object_mut() {
            for section in DEPENDENCY_SECTIONS {
                if let Some(Value::Object(deps)) = root.get_mut(*section) {
                    deps.retain(|dep, _| !names.iter().any(|name| name == dep));
                }
            }
            for section in BUNDLED_SECTIONS {
                if let Some(Value::Array(bundled)) = root.get_mut(*section) {
                    bundled.retain(|dep| {
                        dep.as_str()
                            .map_or(true, |dep| !names.iter().any(|name| name == dep))
                    });
                }
            }
        }

        let indent = detect_indent(content);
        let mut out = Vec::with_capacity(content.len());
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut out,
            PrettyFormatter::with_indent(indent.as_bytes()),
        );
        manifest.serialize(&mut serializer)?;

        let mut edited = String::from_utf8_lossy(&out).into_owned();
        if content.ends_with(b"\n") {
            edited.push('\n');
        }
        Ok(edited)
    }

    /// Snapshot the manifest, then write an edited copy without `names`.
    ///
    /// The snapshot is returned whenever the read succeeded, even if the edit
    /// or the write failed, so the caller can always restore.
    pub async fn stage(path: &Path, names: &[String]) -> ManifestStaging {
        match Self::read(path).await {
            Ok(snapshot) => Self::edit(snapshot, names).await,
            Err(err) => {
                warn!("{}", err);
                ManifestStaging {
                    snapshot: None,
                    error: Some(err),
                }
            }
        }
    }

    /// Write an edited copy of an already captured snapshot without `names`
    pub async fn edit(snapshot: ManifestSnapshot, names: &[String]) -> ManifestStaging {
        let path = snapshot.path().to_path_buf();
        info!("The original {} has been saved in memory.", path.display());

        let edited = match Self::remove_entries(snapshot.content(), names) {
            Ok(edited) => edited,
            Err(ExcludeError::Json(source)) => {
                let err = ExcludeError::ManifestParse {
                    path: path.clone(),
                    source,
                };
                warn!("{}", err);
                return ManifestStaging {
                    snapshot: Some(snapshot),
                    error: Some(err),
                };
            }
            Err(err) => {
                return ManifestStaging {
                    snapshot: Some(snapshot),
                    error: Some(err),
                }
            }
        };

        let error = Self::write(&path, edited.as_bytes()).await.err();
        match &error {
            Some(err) => warn!("{}", err),
            None => debug!("Finished writing the edited {}", path.display()),
        }

        ManifestStaging {
            snapshot: Some(snapshot),
            error,
        }
    }
}

/// Leading whitespace of the first indented line, or two spaces
fn detect_indent(content: &[u8]) -> String {
    let text = String::from_utf8_lossy(content);
    text.lines()
        .skip(1)
        .map(|line| {
            line.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect::<String>()
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "name": "demo",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.21",
    "express": "^4.18.0",
    "chalk": "^5.0.0"
  },
  "devDependencies": {
    "lodash": "^4.17.21",
    "jest": "^29.0.0"
  },
  "bundledDependencies": ["lodash", "express"]
}
"#;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_remove_entries_from_every_section() {
        let edited = ManifestEditor::remove_entries(MANIFEST.as_bytes(), &names(&["lodash"])).unwrap();
        let value: Value = serde_json::from_str(&edited).unwrap();

        assert!(value["dependencies"].get("lodash").is_none());
        assert!(value["devDependencies"].get("lodash").is_none());
        assert_eq!(value["dependencies"]["express"], "^4.18.0");
        assert_eq!(value["devDependencies"]["jest"], "^29.0.0");
        assert_eq!(value["bundledDependencies"], serde_json::json!(["express"]));
    }

    #[test]
    fn test_remove_entries_keeps_order_and_format() {
        let edited =
            ManifestEditor::remove_entries(MANIFEST.as_bytes(), &names(&["express"])).unwrap();

        let lodash = edited.find("\"lodash\"").unwrap();
        let chalk = edited.find("\"chalk\"").unwrap();
        assert!(lodash < chalk);
        assert!(edited.starts_with("{\n  \"name\": \"demo\""));
        assert!(edited.ends_with("}\n"));
    }

    #[test]
    fn test_remove_entries_last_entry_leaves_valid_json() {
        let edited = ManifestEditor::remove_entries(MANIFEST.as_bytes(), &names(&["chalk"])).unwrap();
        let value: Value = serde_json::from_str(&edited).unwrap();
        assert_eq!(value["dependencies"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_entries_unknown_name_is_ignored() {
        let edited =
            ManifestEditor::remove_entries(MANIFEST.as_bytes(), &names(&["not-there"])).unwrap();
        let before: Value = serde_json::from_str(MANIFEST).unwrap();
        let after: Value = serde_json::from_str(&edited).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_entries_respects_tab_indent() {
        let manifest = "{\n\t\"dependencies\": {\n\t\t\"a\": \"1\",\n\t\t\"b\": \"2\"\n\t}\n}";
        let edited = ManifestEditor::remove_entries(manifest.as_bytes(), &names(&["a"])).unwrap();
        assert_eq!(edited, "{\n\t\"dependencies\": {\n\t\t\"b\": \"2\"\n\t}\n}");
    }

    #[test]
    fn test_remove_entries_invalid_json() {
        let err = ManifestEditor::remove_entries(b"{ not json", &names(&["a"])).unwrap_err();
        assert!(matches!(err, ExcludeError::Json(_)));
    }

    #[test]
    fn test_detect_indent_default() {
        assert_eq!(detect_indent(b"{}"), "  ");
        assert_eq!(detect_indent(b"{\n    \"a\": 1\n}"), "    ");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ManifestEditor::read(&temp.path().join("package.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExcludeError::ManifestRead { .. }));
    }

    #[tokio::test]
    async fn test_stage_then_restore_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        // Odd spacing that a reserialize would not reproduce
        let original = "{ \"name\":\"demo\",\n   \"dependencies\": {\"lodash\": \"1\", \"chalk\":\"2\"} }";
        std::fs::write(&path, original).unwrap();

        let staging = ManifestEditor::stage(&path, &names(&["lodash"])).await;
        assert!(staging.error.is_none());
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("lodash"));
        assert!(on_disk.contains("chalk"));

        ManifestEditor::restore(&staging.snapshot.unwrap()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_stage_invalid_json_keeps_snapshot_and_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(&path, "{ broken").unwrap();

        let staging = ManifestEditor::stage(&path, &names(&["lodash"])).await;
        assert!(matches!(
            staging.error,
            Some(ExcludeError::ManifestParse { .. })
        ));
        assert_eq!(staging.snapshot.unwrap().content(), b"{ broken");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");
    }

    #[tokio::test]
    async fn test_stage_unreadable_manifest() {
        let temp = TempDir::new().unwrap();
        let staging = ManifestEditor::stage(&temp.path().join("missing.json"), &names(&["a"])).await;
        assert!(staging.snapshot.is_none());
        assert!(matches!(
            staging.error,
            Some(ExcludeError::ManifestRead { .. })
        ));
    }
}
