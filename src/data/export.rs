use std::io::Write;

use anyhow::{Context, Result};

use super::filter::FilteredView;

/// Header row of the export: the seven source columns plus the derived ones.
pub const EXPORT_HEADERS: [&str; 12] = [
    "Invoice Date",
    "Sales Order Date",
    "Platform",
    "Brand",
    "Order Status",
    "Quantity",
    "Sales Amount",
    "Cost Price",
    "Year",
    "MonthNum",
    "MonthName",
    "Profit",
];

/// Write the filtered view as UTF-8 CSV, header first, rows in view order.
pub fn write_csv<W: Write>(view: &FilteredView, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)
        .context("writing CSV header")?;

    for rec in view.records() {
        wtr.write_record(&[
            rec.invoice_date.to_string(),
            rec.order_date.to_string(),
            rec.platform.clone(),
            rec.brand.clone(),
            rec.order_status.clone(),
            rec.quantity.to_string(),
            rec.sales_amount.to_string(),
            rec.cost_price.to_string(),
            rec.year.to_string(),
            rec.month_num.to_string(),
            rec.month_name.to_string(),
            rec.profit.to_string(),
        ])
        .context("writing CSV row")?;
    }

    wtr.flush().context("flushing CSV export")?;
    Ok(())
}

/// Render the export in memory, for handing to a download button.
pub fn to_csv_string(view: &FilteredView) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    String::from_utf8(buf).context("CSV export is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection};
    use crate::data::model::{Dataset, Record};
    use chrono::NaiveDate;

    fn sample_dataset() -> Dataset {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 2, 20).unwrap();
        Dataset::from_records(vec![
            Record::new(
                d1,
                d1,
                "Amazon".into(),
                "Nike".into(),
                "Completed".into(),
                2,
                100.0,
                60.0,
            ),
            Record::new(
                d2,
                d2,
                "eBay".into(),
                "Nike".into(),
                "Shipped".into(),
                1,
                200.0,
                150.0,
            ),
        ])
    }

    #[test]
    fn export_has_header_and_one_line_per_record() {
        let ds = sample_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        let csv = to_csv_string(&view).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], EXPORT_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "2023-01-10,2023-01-10,Amazon,Nike,Completed,2,100,60,2023,1,Jan,40"
        );
    }

    #[test]
    fn empty_view_exports_header_only() {
        let ds = sample_dataset();
        let view = filter(&ds, &FilterSelection::default());
        let csv = to_csv_string(&view).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
