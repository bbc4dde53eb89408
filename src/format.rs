/// Group an integer amount with `.` separators, the way vi-VN renders numbers.
/// e.g. `5000000` → `"5.000.000"`
pub(crate) fn format_amount(val: i64) -> String {
    let digits = val.unsigned_abs().to_string();
    let grouped: String = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(".");

    if val < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Amount with the đồng sign, for display.
pub(crate) fn format_vnd(val: i64) -> String {
    format!("{}đ", format_amount(val))
}
