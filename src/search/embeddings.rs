//! Hash embeddings and the flat inner-product index.
//!
//! Feature hashing over tokens, token bigrams and character trigrams. Each
//! feature is hashed once (FNV-1a, then a murmur3 finalizer) and the mixed
//! hash picks one dimension and one sign. No model weights; fully
//! deterministic, so the index artifact and the query embedder agree as long
//! as backend and dimension agree.

use std::cmp::Ordering;

use crate::config::SearchConfig;
use crate::error::{FfError, Result};

const TOKEN_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;
/// Subword features keep misspelled queries close to the intended term.
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Pluggable embedding backend interface
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
    fn dims(&self) -> usize;
    fn name(&self) -> &str;
}

/// Build an embedder from search config.
pub fn build_embedder(config: &SearchConfig) -> Result<Box<dyn Embedder>> {
    let backend = config.embedding_backend.trim().to_lowercase();
    let dims = config.embedding_dims as usize;
    if dims == 0 {
        return Err(FfError::Config(
            "search.embedding_dims must be greater than 0".to_string(),
        ));
    }

    match backend.as_str() {
        "" | "hash" => Ok(Box::new(HashEmbedder::new(dims))),
        other => Err(FfError::Config(format!(
            "unknown embedding backend: {other}"
        ))),
    }
}

/// Signed feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: 384 }
    }
}

impl HashEmbedder {
    pub const fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Embed text into an L2-normalized vector.
    ///
    /// Text without usable tokens embeds to the zero vector.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        if self.dim == 0 {
            return Vec::new();
        }

        let tokens = tokenize(text);
        let mut embedding = vec![0.0; self.dim];

        if tokens.is_empty() {
            return embedding;
        }

        for token in &tokens {
            accumulate_feature(&mut embedding, token, TOKEN_WEIGHT);
            for trigram in char_trigrams(token) {
                accumulate_feature(&mut embedding, &trigram, TRIGRAM_WEIGHT);
            }
        }

        for window in tokens.windows(2) {
            let bigram = format!("{} {}", window[0], window[1]);
            accumulate_feature(&mut embedding, &bigram, BIGRAM_WEIGHT);
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        Self::embed(self, text)
    }

    fn dims(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// One nearest-neighbor hit.
///
/// `row` is `None` when the index had fewer rows than requested; callers
/// drop those entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub score: f32,
    pub row: Option<usize>,
}

/// Exhaustive inner-product index over row-major vectors.
///
/// Rows are addressed by insertion position, which is what ties them to the
/// metadata snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dims: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub const fn new(dims: usize) -> Self {
        Self {
            dims,
            data: Vec::new(),
        }
    }

    /// Build an index from rows; every row must have `dims` entries.
    pub fn from_rows(dims: usize, rows: impl IntoIterator<Item = Vec<f32>>) -> Result<Self> {
        let mut index = Self::new(dims);
        for row in rows {
            index.add(&row)?;
        }
        Ok(index)
    }

    pub const fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        if self.dims == 0 {
            0
        } else {
            self.data.len() / self.dims
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a row and return its position.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dims || self.dims == 0 {
            return Err(FfError::Index(format!(
                "vector dimension mismatch: index has {}, got {}",
                self.dims,
                vector.len()
            )));
        }
        self.data.extend_from_slice(vector);
        Ok(self.len() - 1)
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dims)?;
        self.data.get(start..start + self.dims)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dims.max(1))
    }

    /// Top-`k` rows by inner product, highest first; ties by row position.
    ///
    /// When `k` exceeds the row count the tail is padded with `row: None`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dims {
            return Err(FfError::Index(format!(
                "query dimension mismatch: index has {}, got {}",
                self.dims,
                query.len()
            )));
        }

        let mut scored: Vec<Neighbor> = self
            .rows()
            .enumerate()
            .map(|(row, vector)| Neighbor {
                score: dot_product(query, vector),
                row: Some(row),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.row.cmp(&b.row))
        });
        scored.truncate(k);
        while scored.len() < k {
            scored.push(Neighbor {
                score: f32::NEG_INFINITY,
                row: None,
            });
        }
        Ok(scored)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

fn char_trigrams(token: &str) -> Vec<String> {
    let padded: Vec<char> = std::iter::once('<')
        .chain(token.chars())
        .chain(std::iter::once('>'))
        .collect();
    padded
        .windows(3)
        .map(|window| window.iter().collect())
        .collect()
}

/// Add `weight` to the one dimension `feature` hashes to, with a hashed sign.
fn accumulate_feature(embedding: &mut [f32], feature: &str, weight: f32) {
    let hash = feature_hash(feature);
    let buckets = u64::try_from(embedding.len()).unwrap_or(u64::MAX);
    let Ok(dim) = usize::try_from(hash % buckets) else {
        return;
    };
    let sign = if hash >> 63 == 0 { weight } else { -weight };
    embedding[dim] += sign;
}

fn feature_hash(feature: &str) -> u64 {
    fmix64(fnv1a_hash(feature.as_bytes()))
}

/// murmur3 64-bit finalizer; spreads FNV's weak low bits across the word.
const fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

fn fnv1a_hash(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Scale a vector to unit length in place; zero vectors are left alone.
pub fn l2_normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vec.iter_mut() {
            *value /= norm;
        }
    }
}

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
