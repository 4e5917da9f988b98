const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Formats `value` with `significant` digits and an SI prefix (`1.5k`,
/// `250m`, `3.0M`). Trailing zeros are kept, so every label of one axis has
/// the same number of digits.
#[must_use]
pub fn format_si(value: f64, significant: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let significant = significant.max(1);
    if value == 0.0 {
        return format!("{:.*}", significant - 1, 0.0);
    }

    let scientific = format!("{:.*e}", significant - 1, value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let prefix_exponent = (exponent.div_euclid(3)).clamp(-8, 8) * 3;
    let integer_digits = exponent - prefix_exponent + 1;
    let digit_count = digits.len() as i32;

    let body = if integer_digits == digit_count {
        digits
    } else if integer_digits > digit_count {
        format!("{digits}{}", "0".repeat((integer_digits - digit_count) as usize))
    } else if integer_digits > 0 {
        let (whole, fraction) = digits.split_at(integer_digits as usize);
        format!("{whole}.{fraction}")
    } else {
        format!("0.{}{digits}", "0".repeat((-integer_digits) as usize))
    };

    let sign = if value < 0.0 { "-" } else { "" };
    let prefix = SI_PREFIXES[(8 + prefix_exponent / 3) as usize];
    format!("{sign}{body}{prefix}")
}

/// Default y axis label: a dollar amount with two significant digits.
#[must_use]
pub fn format_currency_si(value: f64) -> String {
    format!("${}", format_si(value, 2))
}

/// Decimal places needed to tell ticks `step` apart.
#[must_use]
pub fn fixed_precision(step: Option<f64>) -> usize {
    match step {
        Some(step) if step.is_finite() && step != 0.0 => {
            let exponent = step.abs().log10().floor();
            if exponent < 0.0 {
                (-exponent) as usize
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Fixed-point label with thousands separators (`12,500.5`).
#[must_use]
pub fn format_grouped_fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", precision, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::{fixed_precision, format_currency_si, format_grouped_fixed, format_si};

    #[test]
    fn si_format_keeps_two_significant_digits() {
        assert_eq!(format_si(1_500.0, 2), "1.5k");
        assert_eq!(format_si(20.0, 2), "20");
        assert_eq!(format_si(5.0, 2), "5.0");
        assert_eq!(format_si(156.0, 2), "160");
        assert_eq!(format_si(999.6, 2), "1.0k");
        assert_eq!(format_si(0.25, 2), "250m");
        assert_eq!(format_si(-2_000_000.0, 2), "-2.0M");
        assert_eq!(format_si(0.0, 2), "0.0");
    }

    #[test]
    fn currency_labels_prefix_a_dollar_sign() {
        assert_eq!(format_currency_si(45_000.0), "$45k");
    }

    #[test]
    fn grouped_fixed_uses_step_precision() {
        assert_eq!(fixed_precision(Some(5.0)), 0);
        assert_eq!(fixed_precision(Some(0.5)), 1);
        assert_eq!(fixed_precision(Some(0.02)), 2);
        assert_eq!(format_grouped_fixed(12_500.0, 0), "12,500");
        assert_eq!(format_grouped_fixed(-1_234.56, 1), "-1,234.6");
        assert_eq!(format_grouped_fixed(-0.01, 1), "0.0");
        assert_eq!(format_grouped_fixed(100.0, 0), "100");
    }
}
