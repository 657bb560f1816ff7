//! Scratch artifact: the write-once, append-many staging area owned by one
//! export run.
//!
//! Appends are staged as JSON lines carrying explicit row offsets, assigned
//! from a per-sheet next-row cursor that is persisted beside the staging
//! file after every mutation. Because every staged chunk names its absolute
//! start row, final row order depends only on plan order, not on when the
//! artifact is rendered. The store step replays the staged chunks through
//! the requested writer and hands the bytes to the disk adapter. The whole
//! artifact lives in a temporary directory removed on drop.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SheetError, SheetResult};
use crate::export::descriptor::SheetDescriptor;
use crate::export::disk::{Disk, DiskOptions};
use crate::types::{CellRow, CellValue};

/// Output format for the stored workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriterType {
    #[default]
    Xlsx,
    /// Csv has no sheet concept; only the first sheet is emitted.
    Csv,
}

impl WriterType {
    /// Infer the writer from the destination's extension; xlsx by default.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => WriterType::Csv,
            _ => WriterType::Xlsx,
        }
    }
}

/// Opaque handle to the scratch artifact's backing files. Owned by exactly
/// one export run; the temporary directory disappears with the handle.
#[derive(Debug)]
pub struct TemporaryFile {
    _dir: tempfile::TempDir,
    staging: PathBuf,
    state: PathBuf,
}

impl TemporaryFile {
    pub fn new() -> SheetResult<Self> {
        let dir = tempfile::Builder::new().prefix("sheetflow-export-").tempdir()?;
        let staging = dir.path().join("staging.jsonl");
        let state = dir.path().join("cursors.json");
        File::create(&staging)?;
        Ok(Self {
            _dir: dir,
            staging,
            state,
        })
    }

    pub fn path(&self) -> &Path {
        &self.staging
    }
}

/// One staged append: a sheet, the absolute start row it was assigned, and
/// the rows themselves.
#[derive(Debug, Serialize, Deserialize)]
struct StagedChunk {
    sheet: usize,
    start_row: u32,
    rows: Vec<CellRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetCursor {
    name: Option<String>,
    /// Heading row pending until the sheet's first append consumes it.
    headings: Option<Vec<String>>,
    next_row: u32,
    closed: bool,
}

/// The scratch artifact plus its per-sheet append cursors.
pub struct ScratchWorkbook {
    file: TemporaryFile,
    cursors: Vec<SheetCursor>,
}

impl ScratchWorkbook {
    pub fn new(file: TemporaryFile, sheets: &[SheetDescriptor]) -> SheetResult<Self> {
        let cursors = sheets
            .iter()
            .map(|sheet| SheetCursor {
                name: sheet.name.clone(),
                headings: sheet.headings.clone(),
                next_row: 0,
                closed: false,
            })
            .collect();
        let scratch = Self { file, cursors };
        scratch.persist_cursors()?;
        Ok(scratch)
    }

    pub fn temporary_file(&self) -> &TemporaryFile {
        &self.file
    }

    /// Append rows to a sheet, assigning them the sheet's current cursor
    /// position. Returns the assigned 0-based start row.
    pub fn append_rows(&mut self, sheet: usize, rows: &[CellRow]) -> SheetResult<u32> {
        let cursor = self
            .cursors
            .get_mut(sheet)
            .ok_or_else(|| SheetError::Export(format!("unknown sheet index {sheet}")))?;
        if cursor.closed {
            return Err(SheetError::Export(format!(
                "sheet {sheet} is closed; no further appends accepted"
            )));
        }

        let mut out = OpenOptions::new().append(true).open(&self.file.staging)?;

        if let Some(headings) = cursor.headings.take() {
            let heading_row: CellRow = headings.into_iter().map(CellValue::String).collect();
            write_chunk(
                &mut out,
                &StagedChunk {
                    sheet,
                    start_row: cursor.next_row,
                    rows: vec![heading_row],
                },
            )?;
            cursor.next_row += 1;
        }

        let start_row = cursor.next_row;
        write_chunk(
            &mut out,
            &StagedChunk {
                sheet,
                start_row,
                rows: rows.to_vec(),
            },
        )?;
        cursor.next_row += rows.len() as u32;
        self.persist_cursors()?;
        Ok(start_row)
    }

    /// Seal a sheet. Appending to a sealed sheet is an error.
    pub fn close_sheet(&mut self, sheet: usize) -> SheetResult<()> {
        let cursor = self
            .cursors
            .get_mut(sheet)
            .ok_or_else(|| SheetError::Export(format!("unknown sheet index {sheet}")))?;
        cursor.closed = true;
        self.persist_cursors()
    }

    /// Render the staged chunks with the requested writer and put the bytes
    /// on the disk at `destination`.
    pub fn store(
        &self,
        writer: WriterType,
        disk: &dyn Disk,
        destination: &Path,
        options: &DiskOptions,
    ) -> SheetResult<()> {
        let chunks = self.read_chunks()?;
        let bytes = match writer {
            WriterType::Xlsx => render_xlsx(&self.cursors, &chunks)?,
            WriterType::Csv => render_csv(&chunks)?,
        };
        disk.put(destination, &bytes, options)
            .map_err(|e| match e {
                err @ SheetError::Storage(_) => err,
                other => SheetError::Storage(other.to_string()),
            })
    }

    fn read_chunks(&self) -> SheetResult<Vec<StagedChunk>> {
        let reader = BufReader::new(File::open(&self.file.staging)?);
        let mut chunks = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            chunks.push(serde_json::from_str(&line)?);
        }
        Ok(chunks)
    }

    fn persist_cursors(&self) -> SheetResult<()> {
        let encoded = serde_json::to_vec(&self.cursors)?;
        std::fs::write(&self.file.state, encoded)?;
        Ok(())
    }
}

fn write_chunk(out: &mut File, chunk: &StagedChunk) -> SheetResult<()> {
    let mut line = serde_json::to_vec(chunk)?;
    line.push(b'\n');
    out.write_all(&line)?;
    Ok(())
}

fn render_xlsx(cursors: &[SheetCursor], chunks: &[StagedChunk]) -> SheetResult<Vec<u8>> {
    let mut workbook = rust_xlsxwriter::Workbook::new();

    for (index, cursor) in cursors.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        if let Some(name) = &cursor.name {
            worksheet
                .set_name(name)
                .map_err(|e| SheetError::Export(format!("failed to name sheet: {e}")))?;
        }

        for chunk in chunks.iter().filter(|c| c.sheet == index) {
            for (offset, row) in chunk.rows.iter().enumerate() {
                let row_index = chunk.start_row + offset as u32;
                for (col, value) in row.iter().enumerate() {
                    write_cell(worksheet, row_index, col as u16, value)?;
                }
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| SheetError::Export(format!("failed to render workbook: {e}")))
}

fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> SheetResult<()> {
    let result = match value {
        CellValue::Empty => return Ok(()),
        CellValue::String(s) => worksheet.write_string(row, col, s),
        CellValue::Number(n) => worksheet.write_number(row, col, *n),
        CellValue::Int(i) => worksheet.write_number(row, col, *i as f64),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
        CellValue::DateTime(_) | CellValue::Error(_) => {
            worksheet.write_string(row, col, &value.to_string())
        }
        CellValue::Formula { expr, .. } => {
            worksheet.write_formula(row, col, rust_xlsxwriter::Formula::new(expr))
        }
    };
    result.map_err(|e| SheetError::Export(format!("failed to write cell: {e}")))?;
    Ok(())
}

fn render_csv(chunks: &[StagedChunk]) -> SheetResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for chunk in chunks.iter().filter(|c| c.sheet == 0) {
        for row in &chunk.rows {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(|e| SheetError::Export(format!("failed to write csv row: {e}")))?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| SheetError::Export(format!("failed to finish csv: {e}")))
}
