//! Execution-time extraction from `EXPLAIN ANALYZE` output.

use tokio_postgres::Row;

/// Markers preceding the measured time. Newer PostgreSQL releases print
/// `Execution Time:`, older ones and openGauss print `Total runtime:`.
pub const EXECUTION_TIME_MARKERS: [&str; 2] = ["Execution Time:", "Total runtime:"];

/// Find the first line carrying a marker followed by a number and return that
/// number in milliseconds. Returns 0 when no such line exists.
pub fn execution_time_ms<'a>(lines: impl IntoIterator<Item = &'a str>) -> f64 {
    lines
        .into_iter()
        .find_map(parse_marker_line)
        .unwrap_or(0.0)
}

fn parse_marker_line(line: &str) -> Option<f64> {
    EXECUTION_TIME_MARKERS.iter().find_map(|marker| {
        let (_, rest) = line.split_once(marker)?;
        rest.split_whitespace().next()?.parse::<f64>().ok()
    })
}

/// Every text cell of every row, in row-major order.
pub fn plan_lines(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| {
            (0..row.len()).filter_map(move |i| row.try_get::<_, Option<String>>(i).ok().flatten())
        })
        .collect()
}
