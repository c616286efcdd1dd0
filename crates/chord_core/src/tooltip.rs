/// Total outbound flow per source entity (row sums).
pub fn row_totals(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix.iter().map(|row| row.iter().sum()).collect()
}

/// Share of `total` carried by `value`, in percent; zero when the total is empty.
pub fn share_percent(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

/// Formats with thousands separators and two decimals: `1234.5` → `"1,234.50"`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// Hover text for the ribbon `from → to`.
pub fn tooltip_text(from: &str, to: &str, value: f64, source_total: f64) -> String {
    format!(
        "{from} → {to}: {} ({:.1}%)",
        format_amount(value),
        share_percent(value, source_total)
    )
}
