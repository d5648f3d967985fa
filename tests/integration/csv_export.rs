// CSV export to disk

use onec_api_client::api::{ReportResponse, TopProduct};
use onec_api_client::report::export_to_csv;

fn report(rows: Vec<TopProduct>) -> ReportResponse {
    ReportResponse {
        success: true,
        data: rows,
        error: None,
        metadata: None,
        message: None,
    }
}

#[test]
fn test_export_writes_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("top_products.csv");

    let rows = vec![
        TopProduct {
            product: "Office chair".to_string(),
            sales_count: 340,
            sales_amount: 1530000.0,
            period: "2024-01".to_string(),
            extra: Default::default(),
        },
        TopProduct {
            product: "Desk, oak".to_string(),
            sales_count: 12,
            sales_amount: 96000.5,
            period: "2024-01".to_string(),
            extra: Default::default(),
        },
    ];

    let written = export_to_csv(&report(rows), &path).unwrap();
    assert_eq!(written, 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "product,sales_count,sales_amount,period");
    assert_eq!(lines[1], "Office chair,340,1530000.0,2024-01");
    assert_eq!(lines[2], "\"Desk, oak\",12,96000.5,2024-01");
}

#[test]
fn test_export_keeps_server_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("with_category.csv");

    let report: ReportResponse = serde_json::from_str(
        r#"{
            "success": true,
            "data": [
                {"product": "Office chair", "sales_count": 340, "sales_amount": 1530000.0, "period": "2024-01", "category": "Furniture"},
                {"product": "Desk lamp", "sales_count": 215, "sales_amount": 322500.0, "period": "2024-01", "category": "Lighting"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(export_to_csv(&report, &path).unwrap(), 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "product,sales_count,sales_amount,period,category");
    assert_eq!(lines[1], "Office chair,340,1530000.0,2024-01,Furniture");
    assert_eq!(lines[2], "Desk lamp,215,322500.0,2024-01,Lighting");
}

#[test]
fn test_export_skips_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let written = export_to_csv(&report(vec![]), &path).unwrap();

    assert_eq!(written, 0);
    assert!(!path.exists());
}
