use crate::{Dictionary, DocId, DocStats, Posting, TermEntry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

/// File layout of one index directory: a resident dictionary, a postings
/// blob, a human-readable meta file, and a scratch area for build-time block
/// segments.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn dictionary(&self) -> PathBuf {
        self.root.join("dictionary.bin")
    }
    pub fn postings(&self) -> PathBuf {
        self.root.join("postings.bin")
    }
    pub fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }
    pub fn blocks_dir(&self) -> PathBuf {
        self.root.join("blocks")
    }
    /// Intermediate segment dictionary for merge generation `gen`, slot `slot`.
    pub fn block_dictionary(&self, gen: usize, slot: usize) -> PathBuf {
        self.blocks_dir().join(format!("dict_{gen}_{slot}.bin"))
    }
    /// Intermediate segment postings blob for merge generation `gen`, slot `slot`.
    pub fn block_postings(&self, gen: usize, slot: usize) -> PathBuf {
        self.blocks_dir().join(format!("post_{gen}_{slot}.bin"))
    }
}

/// In-memory form of a segment about to be written: full posting lists keyed
/// by term, plus the per-document auxiliary maps.
#[derive(Debug, Default)]
pub struct SegmentData {
    pub postings: BTreeMap<String, Vec<Posting>>,
    pub doc_stats: BTreeMap<DocId, DocStats>,
    pub important_words: BTreeMap<DocId, Vec<String>>,
}

/// Write a segment as a dictionary file plus an append-order postings blob.
/// Each posting list is serialized once; the dictionary records its byte
/// offset. Document frequency equals the posting list length, since every
/// document contributes at most one posting per term.
pub fn write_segment(dict_path: &Path, post_path: &Path, segment: SegmentData) -> Result<()> {
    let mut blob = BufWriter::new(
        File::create(post_path).with_context(|| format!("create {}", post_path.display()))?,
    );
    let mut dictionary = Dictionary::new();
    let mut offset: u64 = 0;

    for (term, postings) in segment.postings {
        let bytes = bincode::serialize(&postings)?;
        blob.write_all(&bytes)?;
        dictionary
            .terms
            .insert(term, TermEntry { doc_freq: postings.len() as u32, offset });
        offset += bytes.len() as u64;
    }
    blob.flush()?;

    dictionary.doc_stats = segment.doc_stats;
    dictionary.important_words = segment.important_words;

    let mut dict_file = BufWriter::new(
        File::create(dict_path).with_context(|| format!("create {}", dict_path.display()))?,
    );
    let bytes = bincode::serialize(&dictionary)?;
    dict_file.write_all(&bytes)?;
    dict_file.flush()?;
    Ok(())
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let dict = bincode::deserialize(&buf)
        .with_context(|| format!("corrupt dictionary {}", path.display()))?;
    Ok(dict)
}

/// Read one posting list out of a postings blob at a recorded offset.
pub fn read_postings(blob: &mut File, offset: u64) -> Result<Vec<Posting>> {
    blob.seek(SeekFrom::Start(offset))?;
    let postings = bincode::deserialize_from(blob).context("corrupt posting list")?;
    Ok(postings)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}
