/// Format a number for display.
///
/// Integral values print without a fractional part; everything else uses the
/// shortest representation that round-trips. Evaluation never stores a
/// non-finite number, so those have no special form.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}
