//! 入力Excelの読み込み
//!
//! - シートが2枚以上あるとき、1枚目は案内用（処理対象外）
//! - 先頭10行のうち「Empresa」を含むセルがある最初の行をヘッダーとみなす
//! - 必須列: Empresa / Nome do arquivo salvo

use crate::error::{ImaniError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use imani_common::ProjectRow;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 会社名の列
pub const COMPANY_COLUMN: &str = "Empresa";
/// ファイル名の列
pub const FILENAME_COLUMN: &str = "Nome do arquivo salvo";
/// ヘッダーを探す行数
const HEADER_SEARCH_ROWS: usize = 10;

/// セル文字列の2次元表
pub type Grid = Vec<Vec<String>>;

pub struct Workbook {
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImaniError::FileNotFound(path.display().to_string()));
        }
        let sheets = open_workbook_auto(path)
            .map_err(|e| ImaniError::SpreadsheetRead(format!("{}: {}", path.display(), e)))?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// 処理対象のシート（2枚以上なら1枚目を除く）
    pub fn processable_sheets(&self) -> Vec<String> {
        processable(&self.sheet_names())
    }

    /// 案内シートの表示用の表（シートが1枚なら None）
    pub fn info_sheet(&mut self) -> Result<Option<Grid>> {
        let names = self.sheet_names();
        if names.len() < 2 {
            return Ok(None);
        }
        let grid = self.grid(&names[0])?;
        Ok(Some(informational_table(&grid)))
    }

    /// シートから処理対象の行を読む
    pub fn read_rows(&mut self, sheet: &str) -> Result<Vec<ProjectRow>> {
        let grid = self.grid(sheet)?;
        let rows = rows_from_grid(&grid, sheet)?;
        tracing::debug!(sheet, rows = rows.len(), "シート読み込み完了");
        Ok(rows)
    }

    fn grid(&mut self, sheet: &str) -> Result<Grid> {
        if !self.sheet_names().iter().any(|n| n == sheet) {
            return Err(ImaniError::SheetNotFound(sheet.to_string()));
        }
        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|e| ImaniError::SpreadsheetRead(format!("{}: {}", sheet, e)))?;
        Ok(range_to_grid(&range))
    }
}

fn processable(names: &[String]) -> Vec<String> {
    if names.len() > 1 {
        names[1..].to_vec()
    } else {
        names.to_vec()
    }
}

/// calamine の Range を文字列の表に変換
///
/// Range は最初の非空セルから始まるので、先頭の空行・空列を補って
/// シート上の位置と揃える。
fn range_to_grid(range: &Range<Data>) -> Grid {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }
    grid
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// ヘッダー行の位置
fn find_header_row(grid: &Grid) -> Option<usize> {
    grid.iter()
        .take(HEADER_SEARCH_ROWS)
        .position(|row| row.iter().any(|cell| cell.contains(COMPANY_COLUMN)))
}

/// 表から ProjectRow を取り出す
///
/// ヘッダーのセルは前後の空白を除去し、空のヘッダー列は捨てる。
/// 会社名かファイル名が空の行はスキップする。
pub fn rows_from_grid(grid: &Grid, sheet: &str) -> Result<Vec<ProjectRow>> {
    let header_idx =
        find_header_row(grid).ok_or_else(|| ImaniError::HeaderNotFound(sheet.to_string()))?;

    let columns: Vec<(usize, String)> = grid[header_idx]
        .iter()
        .enumerate()
        .map(|(i, h)| (i, h.trim().to_string()))
        .filter(|(_, h)| !h.is_empty())
        .collect();

    let column_of = |name: &str| -> Result<usize> {
        columns
            .iter()
            .find(|(_, h)| h == name)
            .map(|(i, _)| *i)
            .ok_or_else(|| ImaniError::MissingColumn(name.to_string()))
    };
    let company_col = column_of(COMPANY_COLUMN)?;
    let filename_col = column_of(FILENAME_COLUMN)?;

    let rows = grid[header_idx + 1..]
        .iter()
        .filter_map(|row| {
            let company = row.get(company_col).map(String::as_str).unwrap_or("");
            let filename = row.get(filename_col).map(String::as_str).unwrap_or("");
            ProjectRow::new(company, filename)
        })
        .collect();

    Ok(rows)
}

/// 案内シートの表示用整形
///
/// 空行・空列を除き、2列以上残れば最後の列を落とす。
pub fn informational_table(grid: &Grid) -> Grid {
    let is_blank = |s: &String| s.trim().is_empty();

    let rows: Grid = grid
        .iter()
        .filter(|row| !row.iter().all(is_blank))
        .cloned()
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut keep: Vec<usize> = (0..width)
        .filter(|&col| rows.iter().any(|row| row.get(col).is_some_and(|c| !is_blank(c))))
        .collect();
    if keep.len() > 1 {
        keep.pop();
    }

    rows.iter()
        .map(|row| {
            keep.iter()
                .map(|&col| row.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// 会社名一覧（ソート・重複除去）
pub fn companies(rows: &[ProjectRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.company.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 指定した会社の行だけを残す
pub fn filter_company(rows: &[ProjectRow], company: &str) -> Vec<ProjectRow> {
    rows.iter()
        .filter(|r| r.company == company)
        .cloned()
        .collect()
}
