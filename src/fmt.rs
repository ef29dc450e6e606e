/// Format a float as a pound amount with thousands separators: £1,234.56
pub fn money(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    format!("{sign}£{grouped}.{dec_part}")
}
