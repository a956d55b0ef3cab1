//! External merge of index segments: pairwise merges arranged as a
//! binary-tree reduction over generations, until one segment remains.

use crate::algebra::union_sorted_by;
use crate::persist::{load_dictionary, read_postings, write_segment, IndexPaths, SegmentData};
use crate::{Dictionary, TermEntry};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Merge two segments into one. Terms are walked in sorted key order; a term
/// present in both sides gets its posting lists unioned by docID (the sides
/// are doc-disjoint, each document belongs to exactly one block) and its
/// document frequencies added. The per-document maps merge by plain key
/// union. Both input segments are deleted once the output is written.
pub fn merge_segment_pair(
    dict_a: &Path,
    post_a: &Path,
    dict_b: &Path,
    post_b: &Path,
    dict_out: &Path,
    post_out: &Path,
) -> Result<()> {
    let da = load_dictionary(dict_a)?;
    let db = load_dictionary(dict_b)?;
    let mut blob_a = File::open(post_a).with_context(|| format!("open {}", post_a.display()))?;
    let mut blob_b = File::open(post_b).with_context(|| format!("open {}", post_b.display()))?;

    let mut out_blob = BufWriter::new(
        File::create(post_out).with_context(|| format!("create {}", post_out.display()))?,
    );
    let mut out = Dictionary::new();
    let mut offset: u64 = 0;

    let keys: BTreeSet<&String> = da.terms.keys().chain(db.terms.keys()).collect();
    for term in keys {
        let (doc_freq, merged) = match (da.terms.get(term), db.terms.get(term)) {
            (Some(ea), Some(eb)) => {
                let pa = read_postings(&mut blob_a, ea.offset)?;
                let pb = read_postings(&mut blob_b, eb.offset)?;
                let merged = union_sorted_by(pa, pb, |p| p.doc_id, |x, _| x);
                (ea.doc_freq + eb.doc_freq, merged)
            }
            (Some(ea), None) => (ea.doc_freq, read_postings(&mut blob_a, ea.offset)?),
            (None, Some(eb)) => (eb.doc_freq, read_postings(&mut blob_b, eb.offset)?),
            (None, None) => unreachable!("key taken from one of the dictionaries"),
        };
        let bytes = bincode::serialize(&merged)?;
        out_blob.write_all(&bytes)?;
        out.terms.insert(term.clone(), TermEntry { doc_freq, offset });
        offset += bytes.len() as u64;
    }
    out_blob.flush()?;

    out.doc_stats = da.doc_stats;
    out.doc_stats.extend(db.doc_stats);
    out.important_words = da.important_words;
    out.important_words.extend(db.important_words);

    let bytes = bincode::serialize(&out)?;
    let mut dict_file = BufWriter::new(
        File::create(dict_out).with_context(|| format!("create {}", dict_out.display()))?,
    );
    dict_file.write_all(&bytes)?;
    dict_file.flush()?;

    // Inputs are intermediate artifacts; drop them.
    fs::remove_file(dict_a)?;
    fs::remove_file(dict_b)?;
    fs::remove_file(post_a)?;
    fs::remove_file(post_b)?;
    Ok(())
}

/// Fold `num_blocks` generation-0 segments under `paths.blocks_dir()` into
/// the final dictionary and postings blob at the index root. At each
/// generation, pairs (2j, 2j+1) merge into slot j of the next generation; an
/// odd leftover segment is promoted unchanged. Zero blocks yields a valid
/// empty index.
pub fn merge_blocks(paths: &IndexPaths, mut num_blocks: usize) -> Result<()> {
    if num_blocks == 0 {
        write_segment(&paths.dictionary(), &paths.postings(), SegmentData::default())?;
        return Ok(());
    }

    let mut gen = 0;
    while num_blocks > 1 {
        tracing::debug!(gen, num_blocks, "merging segment generation");
        let mut next = 0;
        let mut j = 0;
        while j < num_blocks {
            if j + 1 < num_blocks {
                merge_segment_pair(
                    &paths.block_dictionary(gen, j),
                    &paths.block_postings(gen, j),
                    &paths.block_dictionary(gen, j + 1),
                    &paths.block_postings(gen, j + 1),
                    &paths.block_dictionary(gen + 1, next),
                    &paths.block_postings(gen + 1, next),
                )?;
            } else {
                // Odd segment out: promote to the next generation unchanged.
                fs::rename(
                    paths.block_dictionary(gen, j),
                    paths.block_dictionary(gen + 1, next),
                )?;
                fs::rename(paths.block_postings(gen, j), paths.block_postings(gen + 1, next))?;
            }
            next += 1;
            j += 2;
        }
        num_blocks = next;
        gen += 1;
    }

    fs::rename(paths.block_dictionary(gen, 0), paths.dictionary())?;
    fs::rename(paths.block_postings(gen, 0), paths.postings())?;
    Ok(())
}
