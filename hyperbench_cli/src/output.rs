use hyperbench_core::LatencySummary;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct LatencyRow {
    operation: String,
    count: usize,
    #[tabled(rename = "min (us)")]
    min_us: u64,
    #[tabled(rename = "mean (us)")]
    mean_us: u64,
    #[tabled(rename = "p99 (us)")]
    p99_us: u64,
    #[tabled(rename = "max (us)")]
    max_us: u64,
    #[tabled(rename = "stddev (us)")]
    stddev_us: u64,
}

pub fn print_summaries(summaries: &[LatencySummary]) {
    if summaries.is_empty() {
        return;
    }
    let mut table = Table::new(summaries.iter().map(|summary| LatencyRow {
        operation: summary.kind.to_string(),
        count: summary.count,
        min_us: summary.min_us,
        mean_us: summary.mean_us,
        p99_us: summary.p99_us,
        max_us: summary.max_us,
        stddev_us: summary.stddev_us,
    }));
    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..), Alignment::right());
    println!("{}", table);
}
