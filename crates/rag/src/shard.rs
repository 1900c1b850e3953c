//! Per-document vector shards
//!
//! Each ingested document gets its own shard: a flat L2 index, an ordered
//! id list parallel to the index rows, and a document map from id to Q/A
//! content. Sharding per document lets ingestion rebuild one shard without
//! recomputing a global structure; the retriever pays an O(shards) fan-out
//! per query, acceptable while shard counts stay in the tens.
//!
//! Artifacts for shard `name` inside the shard directory:
//! - `{name}.index`     flat index (dimension + row-major vectors), JSON
//! - `{name}.ids.json`  ordered id list, row i of the index -> ids[i]
//! - `{name}.docs.json` list of `{id, question, answer}` entries

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::RagError;

/// Flat (brute-force) vector index over squared L2 distance
///
/// Distances follow the flat-index convention: squared L2, lower = closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    pub fn add(&mut self, vector: Vec<f32>) -> Result<(), RagError> {
        if vector.len() != self.dim {
            return Err(RagError::Index(format!(
                "Vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dim
            )));
        }
        self.vectors.push(vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Nearest-neighbor search: up to `k` rows as (distance, row) pairs,
    /// ascending by distance
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>, RagError> {
        if query.len() != self.dim {
            return Err(RagError::Search(format!(
                "Query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, v)| {
                let dist: f32 = v
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (dist, row)
            })
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);
        Ok(scored)
    }
}

/// One Q/A fragment stored in a shard's document map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardDoc {
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// One retrieved candidate fragment
#[derive(Debug, Clone)]
pub struct Hit {
    /// Squared L2 distance, lower = more similar
    pub score: f32,
    /// Shard the fragment came from
    pub shard: String,
    pub question: String,
    pub answer: String,
    /// Source document title (the shard name)
    pub title: String,
    /// Fully-qualified source document URL
    pub url: String,
}

/// One loaded shard: index, row-id mapping and document content
///
/// Immutable once loaded; ingestion replaces the on-disk artifacts
/// atomically and the next query loads the new generation.
pub struct VectorShard {
    pub name: String,
    index: FlatIndex,
    ids: Vec<String>,
    docs: HashMap<String, ShardDoc>,
    url: String,
}

impl VectorShard {
    /// Search this shard for the `k` nearest fragments
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>, RagError> {
        let mut hits = Vec::new();
        for (dist, row) in self.index.search(query, k)? {
            let Some(id) = self.ids.get(row) else {
                tracing::warn!(shard = %self.name, row, "Index row has no id entry");
                continue;
            };
            let Some(doc) = self.docs.get(id) else {
                tracing::warn!(shard = %self.name, id = %id, "Id missing from doc map");
                continue;
            };
            hits.push(Hit {
                score: dist,
                shard: self.name.clone(),
                question: doc.question.clone(),
                answer: doc.answer.clone(),
                title: self.name.clone(),
                url: self.url.clone(),
            });
        }
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Shard discovery and loading
///
/// A shard is usable only when all three artifacts exist; partial artifact
/// sets are skipped with a warning, never fatal.
pub struct ShardCatalog {
    dir: PathBuf,
    url_base: String,
}

impl ShardCatalog {
    pub fn new(dir: impl Into<PathBuf>, url_base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_base: url_base.into(),
        }
    }

    /// List usable shard names, sorted for deterministic fan-out order
    pub fn list_shards(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Shard directory unreadable");
                return Vec::new();
            },
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("index") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !self.ids_path(name).exists() || !self.docs_path(name).exists() {
                tracing::warn!(shard = name, "Skipping shard with incomplete artifacts");
                continue;
            }
            names.push(name.to_string());
        }

        names.sort();
        names
    }

    /// Load one shard, failing only this shard on parse errors
    pub fn load_shard(&self, name: &str) -> Result<VectorShard, RagError> {
        let index: FlatIndex = read_json(&self.index_path(name))?;
        let ids: Vec<String> = read_json(&self.ids_path(name))?;
        let doc_list: Vec<ShardDoc> = read_json(&self.docs_path(name))?;

        if ids.len() != index.len() {
            return Err(RagError::Corrupt(format!(
                "Shard {}: id list length {} does not match index rows {}",
                name,
                ids.len(),
                index.len()
            )));
        }

        let docs: HashMap<String, ShardDoc> =
            doc_list.into_iter().map(|d| (d.id.clone(), d)).collect();

        Ok(VectorShard {
            name: name.to_string(),
            index,
            ids,
            docs,
            url: format!("{}/{}.pdf", self.url_base.trim_end_matches('/'), name),
        })
    }

    /// Load every usable shard, skipping (and logging) the ones that fail
    pub fn load_all(&self) -> Vec<Arc<VectorShard>> {
        self.list_shards()
            .iter()
            .filter_map(|name| match self.load_shard(name) {
                Ok(shard) => Some(Arc::new(shard)),
                Err(e) => {
                    tracing::warn!(shard = %name, error = %e, "Failed to load shard");
                    None
                },
            })
            .collect()
    }

    fn index_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.index"))
    }

    fn ids_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.ids.json"))
    }

    fn docs_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.docs.json"))
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, RagError> {
    let content = fs::read_to_string(path)
        .map_err(|e| RagError::MissingArtifact(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| RagError::Corrupt(format!("{}: {}", path.display(), e)))
}

/// Write a shard's three artifacts for the given documents and embeddings
///
/// Used by the ingestion workflow after chunking a document into Q/A pairs
/// and embedding them. Rows are written in document order, so ids[i] is the
/// id of the fragment embedded at index row i.
pub fn write_shard(
    dir: &Path,
    name: &str,
    docs: &[ShardDoc],
    embeddings: &[Vec<f32>],
) -> Result<(), RagError> {
    if docs.is_empty() {
        return Err(RagError::Index("Cannot write an empty shard".to_string()));
    }
    if docs.len() != embeddings.len() {
        return Err(RagError::Index(format!(
            "{} documents but {} embeddings",
            docs.len(),
            embeddings.len()
        )));
    }

    let mut index = FlatIndex::new(embeddings[0].len());
    for embedding in embeddings {
        index.add(embedding.clone())?;
    }
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();

    fs::create_dir_all(dir).map_err(|e| RagError::Index(e.to_string()))?;
    write_json(&dir.join(format!("{name}.index")), &index)?;
    write_json(&dir.join(format!("{name}.ids.json")), &ids)?;
    write_json(&dir.join(format!("{name}.docs.json")), &docs)?;

    tracing::info!(shard = name, fragments = docs.len(), "Shard written");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RagError> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| RagError::Index(e.to_string()))?;
    fs::write(path, content).map_err(|e| RagError::Index(e.to_string()))
}
