use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use salesdash::data::{aggregate, export, loader::DatasetCache};
use salesdash::state::DashboardState;

/// Where the filtered-transactions export lands.
const EXPORT_PATH: &str = "filtered_sales.csv";

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_sales.csv"));

    let mut cache = DatasetCache::default();
    let dataset = cache
        .load(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    info!(
        "loaded {} records: {} years, {} platforms, {} brands",
        dataset.len(),
        dataset.years.len(),
        dataset.platforms.len(),
        dataset.brands.len()
    );

    // The shell starts from the full selection and the default goal; a real
    // page would feed user toggles through the same DashboardState calls.
    let mut state = DashboardState::default();
    state.set_dataset(dataset);

    let m = state.metrics;
    println!("Gross revenue:  ${:.2}", m.total_sales);
    println!("Net profit:     ${:.2}", m.total_profit);
    println!("Profit margin:  {:.1}%", m.margin_pct);
    println!(
        "Goal progress:  {:.1}% of ${:.0}",
        m.progress_ratio * 100.0,
        state.sales_target
    );
    if m.gap > 0.0 {
        println!("Gap to goal:    ${:.2}", m.gap);
    } else {
        println!("Surplus:        ${:.2}", m.surplus);
    }

    let view = state.view().context("no dataset in session state")?;

    println!("\nMonthly totals:");
    for month in aggregate::monthly_totals(&view) {
        println!(
            "  {:>3}  sales ${:>12.2}  profit ${:>12.2}",
            month.month_name, month.sales, month.profit
        );
    }

    println!("\nChannel mix:");
    for (platform, sales) in aggregate::platform_share(&view) {
        println!("  {platform:<12} ${sales:>12.2}");
    }

    let top = aggregate::top_brands(&view, 5);
    println!("\nTop brands: {}", top.join(", "));
    for ((brand, platform), sales) in aggregate::brand_platform_for_top_brands(&view, &top) {
        println!("  {brand:<12} via {platform:<12} ${sales:>12.2}");
    }

    let out = File::create(EXPORT_PATH)
        .with_context(|| format!("creating {EXPORT_PATH}"))?;
    export::write_csv(&view, out).context("writing filtered export")?;
    info!("wrote {} filtered rows to {EXPORT_PATH}", view.len());

    Ok(())
}
