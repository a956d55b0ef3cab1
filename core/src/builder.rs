//! SPIMI build driver: batch the incoming document stream into fixed-size
//! blocks, invert each block to a temporary segment, then fold the segments
//! into the final index with the external merger.

use crate::block::invert_block;
use crate::config::IndexConfig;
use crate::merge::merge_blocks;
use crate::persist::{write_segment, IndexPaths};
use crate::DocId;
use anyhow::{ensure, Result};
use std::fs;
use std::path::Path;

/// Build an index at `out_dir` from pre-normalized (docID, tokens) pairs.
/// Returns the number of documents indexed. Any I/O or input failure aborts
/// the build; there is no partial-index fallback. Zero documents still
/// produce a valid, empty index.
pub fn build_index<I>(docs: I, out_dir: &Path, config: &IndexConfig) -> Result<u32>
where
    I: IntoIterator<Item = (DocId, Vec<String>)>,
{
    let paths = IndexPaths::new(out_dir);
    fs::create_dir_all(&paths.root)?;
    if paths.blocks_dir().exists() {
        fs::remove_dir_all(paths.blocks_dir())?;
    }
    fs::create_dir_all(paths.blocks_dir())?;

    let mut num_blocks = 0usize;
    let mut num_docs = 0u32;
    let mut batch: Vec<(DocId, Vec<String>)> = Vec::with_capacity(config.block_size);

    for (doc_id, tokens) in docs {
        ensure!(doc_id > 0, "document id must be a positive integer, got {doc_id}");
        batch.push((doc_id, tokens));
        num_docs += 1;
        if batch.len() == config.block_size {
            flush_block(&paths, num_blocks, std::mem::take(&mut batch), config)?;
            num_blocks += 1;
        }
    }
    // The final partial block is still emitted.
    if !batch.is_empty() {
        flush_block(&paths, num_blocks, batch, config)?;
        num_blocks += 1;
    }

    tracing::info!(num_docs, num_blocks, "inverted all blocks, merging");
    merge_blocks(&paths, num_blocks)?;
    fs::remove_dir_all(paths.blocks_dir())?;
    tracing::info!(out_dir = %out_dir.display(), "index build complete");
    Ok(num_docs)
}

fn flush_block(
    paths: &IndexPaths,
    slot: usize,
    batch: Vec<(DocId, Vec<String>)>,
    config: &IndexConfig,
) -> Result<()> {
    tracing::debug!(slot, docs = batch.len(), "inverting block");
    let segment = invert_block(batch, config.important_words_per_doc);
    write_segment(
        &paths.block_dictionary(0, slot),
        &paths.block_postings(0, slot),
        segment,
    )
}
