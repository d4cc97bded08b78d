// tests/export.rs
use calamine::{open_workbook, Data, Reader, Xlsx};

use discount_research::config::options::{ExportFormat, ExportOptions};
use discount_research::file::{export_run_outputs, write_policy_table};
use discount_research::observation::ObservationTable;
use discount_research::policy::{build_policy_output, POLICY_COLUMNS};
use discount_research::store::ensure_run_dir;

#[test]
fn xlsx_export_writes_typed_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/policy.xlsx");
    let table = build_policy_output(&["Coach", "Rolex"], &ObservationTable::default());
    write_policy_table(&path, &table, ExportFormat::Xlsx).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["us_discount_policy"]);
    let range = workbook.worksheet_range("us_discount_policy").unwrap();
    assert_eq!(range.height(), 1 + 26);

    let rows: Vec<&[Data]> = range.rows().collect();
    let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
    assert_eq!(header, POLICY_COLUMNS);

    let first = &table.rows[0];
    assert_eq!(rows[1][0], Data::String(first.brand.clone()));
    assert_eq!(rows[1][3], Data::Float(first.public_sale_discount_pct as f64));
    assert_eq!(rows[1][5], Data::Float(first.public_discount_cap_pct as f64));
    assert_eq!(rows[1][11], Data::String(first.why.clone()));
}

#[test]
fn run_outputs_follow_export_format() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ensure_run_dir(dir.path(), "r1").unwrap();
    let out_dir = dir.path().join("out");
    let export = ExportOptions { format: ExportFormat::Xlsx, out_dir: Some(out_dir.clone()) };
    let table = build_policy_output(&["Gucci"], &ObservationTable::default());

    let written = export_run_outputs(&paths, &table, &export).unwrap();
    assert_eq!(written.len(), 3);
    assert!(written[0].ends_with("r1/us_discount_policy.xlsx"));
    assert!(written[1].ends_with("r1/output_partial.xlsx"));
    assert_eq!(written[2], out_dir.join("us_discount_policy.xlsx"));
    for path in &written {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.height(), 14);
    }

    let export = ExportOptions { format: ExportFormat::Tsv, out_dir: None };
    let written = export_run_outputs(&paths, &table, &export).unwrap();
    assert_eq!(written.len(), 2);
    let text = std::fs::read_to_string(&written[0]).unwrap();
    assert!(text.starts_with("brand\tgender\tcategory\t"));
}
