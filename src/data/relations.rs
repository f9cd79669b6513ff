use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Relation table shipped with the binary
const EMBEDDED_RELATIONS: &[u8] = include_bytes!("../../data/relations.json");

/// Code reported for lookups that fall back to the unknown-country entry
pub const UNKNOWN_CODE: &str = "UNK";

#[derive(Deserialize)]
struct RelationFile {
    unknown: RawRelation,
    countries: HashMap<String, RawRelation>,
}

#[derive(Deserialize)]
struct RawRelation {
    name: String,
    #[serde(default)]
    allies: Vec<String>,
    #[serde(default)]
    enemies: Vec<String>,
}

impl RawRelation {
    fn into_entry(self, code: &str) -> RelationEntry {
        RelationEntry {
            code: code.to_string(),
            name: self.name,
            allies: self.allies,
            enemies: self.enemies,
        }
    }
}

/// Declared allies and enemies of one country, as country codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEntry {
    pub code: String,
    pub name: String,
    pub allies: Vec<String>,
    pub enemies: Vec<String>,
}

/// Static country relations. Lookups never fail: unknown codes get the
/// "unknown country" entry with empty lists.
pub struct RelationTable {
    entries: HashMap<String, RelationEntry>,
    unknown: RelationEntry,
}

impl RelationTable {
    pub fn new(entries: impl IntoIterator<Item = RelationEntry>, unknown: RelationEntry) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.code.clone(), e)).collect(),
            unknown,
        }
    }

    /// Table with no countries; every lookup returns the fallback
    pub fn empty() -> Self {
        Self::new(
            Vec::<RelationEntry>::new(),
            RelationEntry {
                code: UNKNOWN_CODE.to_string(),
                name: "Unknown Country".to_string(),
                allies: Vec::new(),
                enemies: Vec::new(),
            },
        )
    }

    /// Parse the JSON relation format: `{"unknown": {...}, "countries": {"USA": {...}}}`
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        // simd-json parses in place
        let mut buf = bytes.to_vec();
        let file: RelationFile =
            simd_json::serde::from_slice(&mut buf).context("malformed relation table")?;
        let entries = file
            .countries
            .into_iter()
            .map(|(code, raw)| raw.into_entry(&code));
        Ok(Self::new(entries, file.unknown.into_entry(UNKNOWN_CODE)))
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(EMBEDDED_RELATIONS)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn lookup(&self, code: &str) -> &RelationEntry {
        self.entries.get(code).unwrap_or(&self.unknown)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Display name for a code, or the code itself when it is not listed
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.entries.get(code).map(|e| e.name.as_str()).unwrap_or(code)
    }

    pub fn resolve_names(&self, codes: &[String]) -> Vec<String> {
        codes.iter().map(|c| self.display_name(c).to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
