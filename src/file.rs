// src/file.rs

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use crate::config::options::{ExportFormat, ExportOptions};
use crate::config::consts::{FINAL_OUTPUT_STEM, POLICY_SHEET_NAME};
use crate::policy::PolicyTable;
use crate::store::RunPaths;

/// Write the policy table with a header row, creating parent folders as needed.
pub fn write_policy_table(
    path: &Path,
    table: &PolicyTable,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    if format == ExportFormat::Xlsx {
        return write_policy_workbook(path, table);
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delim())
        .from_path(path)?;
    wtr.write_record(table.columns())?;
    for record in table.records() {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Single sheet, bold header, percentages as numbers.
fn write_policy_workbook(path: &Path, table: &PolicyTable) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(POLICY_SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    for (i, r) in table.rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &r.brand)?;
        sheet.write_string(row, 1, r.gender.as_str())?;
        sheet.write_string(row, 2, r.category.as_str())?;
        sheet.write_number(row, 3, r.public_sale_discount_pct as f64)?;
        sheet.write_number(row, 4, r.member_extra_pct as f64)?;
        sheet.write_number(row, 5, r.public_discount_cap_pct as f64)?;
        sheet.write_string(row, 6, r.discount_visibility.as_str())?;
        sheet.write_string(row, 7, r.msrp_strikethrough_rule.as_str())?;
        sheet.write_string(row, 8, r.coupon_eligibility.as_str())?;
        sheet.write_string(row, 9, r.evidence_level.as_str())?;
        sheet.write_string(row, 10, r.confidence.as_str())?;
        sheet.write_string(row, 11, &r.why)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Same content as an export file, for the clipboard. Xlsx copies as TSV.
pub fn to_export_string(table: &PolicyTable, format: ExportFormat) -> Result<String, Box<dyn std::error::Error>> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delim())
        .from_writer(Vec::new());
    wtr.write_record(table.columns())?;
    for record in table.records() {
        wtr.write_record(&record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.to_string())?;
    Ok(String::from_utf8(bytes)?)
}

/// Final + partial exports inside the run folder, plus a copy in
/// `export.out_dir` when one is configured. Returns every path written.
pub fn export_run_outputs(
    paths: &RunPaths,
    table: &PolicyTable,
    export: &ExportOptions,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut written = vec![
        paths.output_final(export.format),
        paths.output_partial(export.format),
    ];
    if let Some(dir) = &export.out_dir {
        written.push(dir.join(export.file_name(FINAL_OUTPUT_STEM)));
    }
    for path in &written {
        write_policy_table(path, table, export.format)?;
    }
    Ok(written)
}

/// `-o` handling: empty means the default name in the working dir,
/// a directory (or trailing separator) means the default name inside it.
pub fn resolve_single_out_path(user_o: &str, default_filename: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if user_o.is_empty() { return Ok(PathBuf::from(default_filename)); }
    let p = PathBuf::from(normalize_separators(user_o));
    if looks_like_dir_hint(&p) || p.is_dir() {
        ensure_directory(&p)?; Ok(p.join(default_filename))
    } else {
        Ok(p)
    }
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c=='/'||c=='\\' { sep } else { c }).collect()
}

pub fn ensure_directory(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if dir.exists() && !dir.is_dir() {
        return Err(format!("Path exists but is not a directory: {}", dir.display()).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_hints() {
        assert!(looks_like_dir_hint(Path::new("out/")));
        assert!(!looks_like_dir_hint(Path::new("out/policy.csv")));
    }

    #[test]
    fn xlsx_copy_is_tab_separated() {
        let table = crate::policy::build_policy_output(&["Gucci"], &Default::default());
        let txt = to_export_string(&table, ExportFormat::Xlsx).unwrap();
        assert!(txt.starts_with("brand\tgender\tcategory\t"));
        assert_eq!(txt.lines().count(), 14);
    }

    #[test]
    fn empty_out_uses_default_name() {
        let p = resolve_single_out_path("", "us_discount_policy.csv").unwrap();
        assert_eq!(p, PathBuf::from("us_discount_policy.csv"));
    }
}
