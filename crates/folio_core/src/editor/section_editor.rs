//! Index-addressed operations over a draft's ordered section list.
//!
//! # Responsibility
//! - Append, remove and rewrite content blocks by position.
//!
//! # Invariants
//! - Every operation borrows its input and returns a new sequence; the input
//!   is never mutated, so a rollback snapshot can never alias a draft.
//! - Rejected operations report `SectionError` and produce no sequence.
//! - Relative order of untouched blocks is always preserved.

use crate::model::block::{parse_block_type, BlockType, ContentBlock, SectionError};

/// Result alias for section operations.
pub type SectionResult<T> = Result<T, SectionError>;

/// One recorded section operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOp {
    Append(BlockType),
    Remove(usize),
    SetContent { index: usize, content: String },
}

/// Returns `sections` with one empty block of `kind` appended.
pub fn append(sections: &[ContentBlock], kind: BlockType) -> Vec<ContentBlock> {
    let mut next = Vec::with_capacity(sections.len() + 1);
    next.extend_from_slice(sections);
    next.push(ContentBlock::empty(kind));
    next
}

/// Parses `kind` and appends an empty block of that type.
pub fn append_named(sections: &[ContentBlock], kind: &str) -> SectionResult<Vec<ContentBlock>> {
    let kind = parse_block_type(kind)?;
    Ok(append(sections, kind))
}

/// Returns `sections` without the block at `index`.
pub fn remove(sections: &[ContentBlock], index: usize) -> SectionResult<Vec<ContentBlock>> {
    ensure_index(sections, index)?;
    let mut next = sections.to_vec();
    next.remove(index);
    Ok(next)
}

/// Returns `sections` with the content of block `index` replaced.
pub fn set_content(
    sections: &[ContentBlock],
    index: usize,
    content: impl Into<String>,
) -> SectionResult<Vec<ContentBlock>> {
    ensure_index(sections, index)?;
    let content = content.into();
    Ok(sections
        .iter()
        .enumerate()
        .map(|(position, block)| {
            if position == index {
                block.with_content(content.clone())
            } else {
                block.clone()
            }
        })
        .collect())
}

/// Applies one recorded operation.
pub fn apply_op(sections: &[ContentBlock], op: &SectionOp) -> SectionResult<Vec<ContentBlock>> {
    match op {
        SectionOp::Append(kind) => Ok(append(sections, *kind)),
        SectionOp::Remove(index) => remove(sections, *index),
        SectionOp::SetContent { index, content } => set_content(sections, *index, content.as_str()),
    }
}

/// Applies operations in order, stopping at the first rejection.
pub fn apply_ops(sections: &[ContentBlock], ops: &[SectionOp]) -> SectionResult<Vec<ContentBlock>> {
    ops.iter()
        .try_fold(sections.to_vec(), |current, op| apply_op(&current, op))
}

/// Returns the block at `index` after checking it has the `expected` kind.
pub fn expect_kind(
    sections: &[ContentBlock],
    index: usize,
    expected: BlockType,
) -> SectionResult<&ContentBlock> {
    ensure_index(sections, index)?;
    let block = &sections[index];
    if block.kind() != expected {
        return Err(SectionError::UnexpectedBlockType {
            index,
            expected,
            actual: block.kind(),
        });
    }
    Ok(block)
}

fn ensure_index(sections: &[ContentBlock], index: usize) -> SectionResult<()> {
    if index >= sections.len() {
        return Err(SectionError::IndexOutOfBounds {
            index,
            len: sections.len(),
        });
    }
    Ok(())
}
