//! Dataset files
//!
//! Ratings use per-user blocks:
//!
//! ```text
//! <user_id>|<item_count>
//! <item_id> <value>
//! ...
//! ```
//!
//! Query files have the same layout without values. Item attributes are one
//! line per item, `<item_id>|<attr1>|<attr2>` (`:` is accepted after the id as
//! well), where an attribute is an integer id or `None`.

use crate::error::{PredictError, Result};
use crate::sparse_matrix::{AttributeMatrix, Entry, RatingMatrix};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Marker for a missing attribute
const NO_ATTRIBUTE: &str = "None";

/// One user block in file order
#[derive(Debug, Clone, PartialEq)]
pub struct UserBlock {
    pub user: usize,
    pub items: Vec<(usize, f64)>,
}

fn format_error(path: &Path, line: usize, message: impl Into<String>) -> PredictError {
    PredictError::Format {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| PredictError::io(path, e))
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let (user, count) = line.split_once('|')?;
    Some((user.trim().parse().ok()?, count.trim().parse().ok()?))
}

/// Parse rating blocks, keeping file order
///
/// Without `has_score` every value is 0. `path` is only used in error messages.
pub fn parse_blocks<R: BufRead>(reader: R, has_score: bool, path: &Path) -> Result<Vec<UserBlock>> {
    let mut blocks = Vec::new();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next() {
        line_no += 1;
        let line = line.map_err(|e| PredictError::io(path, e))?;
        let header = line.trim();
        if header.is_empty() {
            continue;
        }

        let (user, count) = parse_header(header).ok_or_else(|| {
            format_error(
                path,
                line_no,
                format!("expected `user_id|item_count`, found `{}`", header),
            )
        })?;

        // `count` is untrusted until the block's lines are actually read
        let mut items = Vec::new();
        while items.len() < count {
            let Some(line) = lines.next() else {
                return Err(format_error(
                    path,
                    line_no,
                    format!(
                        "block of user {} ends after {} of {} items",
                        user,
                        items.len(),
                        count
                    ),
                ));
            };
            line_no += 1;
            let line = line.map_err(|e| PredictError::io(path, e))?;

            let mut fields = line.split_whitespace();
            let Some(item) = fields.next() else {
                continue;
            };
            let item = item.parse::<usize>().map_err(|e| {
                format_error(path, line_no, format!("invalid item id `{}`: {}", item, e))
            })?;

            let value = if has_score {
                let raw = fields
                    .next()
                    .ok_or_else(|| format_error(path, line_no, "missing rating value"))?;
                raw.parse::<f64>().map_err(|e| {
                    format_error(path, line_no, format!("invalid rating `{}`: {}", raw, e))
                })?
            } else {
                0.0
            };
            items.push((item, value));
        }

        blocks.push(UserBlock { user, items });
    }

    Ok(blocks)
}

/// Parse rating blocks into a matrix
pub fn parse_ratings<R: BufRead>(reader: R, has_score: bool, path: &Path) -> Result<RatingMatrix> {
    let entries = parse_blocks(reader, has_score, path)?
        .into_iter()
        .flat_map(|block| {
            let user = block.user;
            block
                .items
                .into_iter()
                .map(move |(item, value)| Entry::new(user, item, value))
        })
        .collect::<Vec<_>>();
    Ok(RatingMatrix::new(entries))
}

fn read_dataset(path: &Path, has_score: bool) -> Result<RatingMatrix> {
    let matrix = parse_ratings(open(path)?, has_score, path)?;
    info!(
        path = %path.display(),
        users = matrix.row_indexes().len(),
        entries = matrix.len(),
        "Read dataset"
    );
    Ok(matrix)
}

/// Read a ratings file
pub fn read_train_dataset(path: impl AsRef<Path>) -> Result<RatingMatrix> {
    read_dataset(path.as_ref(), true)
}

/// Read a query file; values are set to 0
pub fn read_test_dataset(path: impl AsRef<Path>) -> Result<RatingMatrix> {
    read_dataset(path.as_ref(), false)
}

/// Parse item attribute lines into `(item, attribute, 1)` entries
pub fn parse_item_attributes<R: BufRead>(reader: R, path: &Path) -> Result<AttributeMatrix> {
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| PredictError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let id_end = line
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(line.len());
        let item = line[..id_end].parse::<usize>().map_err(|_| {
            format_error(path, line_no, format!("missing item id in `{}`", line))
        })?;

        let rest = line[id_end..].trim_start();
        let Some(rest) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('|')) else {
            if rest.is_empty() {
                debug!(item, line = line_no, "Item without attributes");
                continue;
            }
            return Err(format_error(
                path,
                line_no,
                format!("expected `:` or `|` after item id in `{}`", line),
            ));
        };

        let rest = rest.trim();
        if rest.is_empty() {
            continue;
        }
        let (first, second) = rest
            .split_once('|')
            .ok_or_else(|| format_error(path, line_no, "Item attribute file format error"))?;

        for field in [first, second] {
            let field = field.trim();
            if field == NO_ATTRIBUTE {
                continue;
            }
            let attribute = field.parse::<usize>().map_err(|e| {
                format_error(path, line_no, format!("invalid attribute `{}`: {}", field, e))
            })?;
            entries.push(Entry::new(item, attribute, 1u8));
        }
    }

    Ok(AttributeMatrix::new(entries))
}

/// Read an item attribute file
pub fn read_item_attribute(path: impl AsRef<Path>) -> Result<AttributeMatrix> {
    let path = path.as_ref();
    let matrix = parse_item_attributes(open(path)?, path)?;
    info!(
        path = %path.display(),
        items = matrix.row_indexes().len(),
        attributes = matrix.len(),
        "Read item attributes"
    );
    Ok(matrix)
}

/// Write `matrix` as rating blocks in ascending user order
pub fn write_blocks<W: Write>(writer: &mut W, matrix: &RatingMatrix) -> std::io::Result<()> {
    for (user, row) in matrix.rows() {
        writeln!(writer, "{}|{}", user, row.len())?;
        for entry in row {
            writeln!(writer, "{}  {}", entry.col, entry.value)?;
        }
    }
    Ok(())
}

/// Write `matrix` in the order of the user blocks of `reference`
///
/// # Errors
///
/// `MissingPrediction` if a reference entry has no value in `matrix`.
pub fn write_blocks_in_order<W: Write>(
    writer: &mut W,
    reference: &[UserBlock],
    matrix: &RatingMatrix,
    path: &Path,
) -> Result<()> {
    for block in reference {
        writeln!(writer, "{}|{}", block.user, block.items.len())
            .map_err(|e| PredictError::io(path, e))?;
        for &(item, _) in &block.items {
            let value = matrix
                .get(block.user, item)
                .ok_or(PredictError::MissingPrediction {
                    row: block.user,
                    col: item,
                })?;
            writeln!(writer, "{}  {}", item, value).map_err(|e| PredictError::io(path, e))?;
        }
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PredictError::io(path, e))
}

/// Write a result file in ascending user order
pub fn write_dataset(path: impl AsRef<Path>, matrix: &RatingMatrix) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    write_blocks(&mut writer, matrix)
        .and_then(|_| writer.flush())
        .map_err(|e| PredictError::io(path, e))?;
    info!(path = %path.display(), entries = matrix.len(), "Wrote dataset");
    Ok(())
}

/// Write a result file following the block and item order of the query file `reference`
pub fn write_dataset_in_order(
    reference: impl AsRef<Path>,
    path: impl AsRef<Path>,
    matrix: &RatingMatrix,
) -> Result<()> {
    let reference = reference.as_ref();
    let path = path.as_ref();

    let blocks = parse_blocks(open(reference)?, false, reference)?;
    let mut writer = create(path)?;
    write_blocks_in_order(&mut writer, &blocks, matrix, path)?;
    writer.flush().map_err(|e| PredictError::io(path, e))?;

    info!(
        path = %path.display(),
        reference = %reference.display(),
        entries = matrix.len(),
        "Wrote dataset in query order"
    );
    Ok(())
}
