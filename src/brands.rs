// src/brands.rs
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::core::sanitize::clean_brand;
use crate::error::BrandsError;

const BRAND_COLUMN: &str = "brand";

/// Load a brand list from a `.csv` or `.xlsx` (first sheet) with a `brand` column.
/// Values are trimmed, blanks dropped, repeats removed (first wins), capped at `max`.
pub fn read_brands(path: &Path, max: usize) -> Result<Vec<String>, BrandsError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let brands = match ext.as_deref() {
        Some("csv") => brands_from_reader(File::open(path)?, max)?,
        Some("xlsx") => brands_from_xlsx(path, max)?,
        _ => return Err(BrandsError::Unsupported(path.display().to_string())),
    };
    logf!("Brands: loaded {} from {}", brands.len(), path.display());
    Ok(brands)
}

pub fn brands_from_reader<R: Read>(reader: R, max: usize) -> Result<Vec<String>, BrandsError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let col = rdr
        .headers()?
        .iter()
        .position(is_brand_header)
        .ok_or(BrandsError::MissingBrandColumn)?;

    let mut list = BrandList::new(max);
    for record in rdr.records() {
        let record = record?;
        let Some(cell) = record.get(col) else { continue };
        if !list.push(cell) {
            break;
        }
    }
    Ok(list.out)
}

fn brands_from_xlsx(path: &Path, max: usize) -> Result<Vec<String>, BrandsError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(BrandsError::MissingBrandColumn)??;

    let mut rows = range.rows();
    let col = rows
        .next()
        .and_then(|header| header.iter().position(|c| is_brand_header(&cell_text(c))))
        .ok_or(BrandsError::MissingBrandColumn)?;

    let mut list = BrandList::new(max);
    for row in rows {
        let Some(cell) = row.get(col) else { continue };
        if !list.push(&cell_text(cell)) {
            break;
        }
    }
    Ok(list.out)
}

fn is_brand_header(h: &str) -> bool {
    h.trim_start_matches('\u{feff}').trim() == BRAND_COLUMN
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => s!(),
    }
}

/// Ordered, de-duplicated, capped.
struct BrandList {
    seen: HashSet<String>,
    out: Vec<String>,
    max: usize,
}

impl BrandList {
    fn new(max: usize) -> Self {
        Self { seen: HashSet::new(), out: Vec::new(), max }
    }

    /// False once the cap is reached.
    fn push(&mut self, raw: &str) -> bool {
        if self.out.len() >= self.max {
            return false;
        }
        if let Some(brand) = clean_brand(raw) {
            if self.seen.insert(brand.clone()) {
                self.out.push(brand);
            }
        }
        self.out.len() < self.max
    }
}
