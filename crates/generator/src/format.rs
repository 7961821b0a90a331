use menusite_core::NumberOrText;

/// Format a menu price for display.
///
/// * absent, empty or non-finite → `$0.00`
/// * number or numeric string → `$` with two decimals
/// * string already containing `$` → unchanged
/// * any other string → prefixed with `$`
pub fn format_price(price: Option<&NumberOrText>) -> String {
    match price {
        None => "$0.00".to_string(),
        Some(NumberOrText::Number(n)) => dollars(*n),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return "$0.00".to_string();
            }
            if trimmed.contains('$') {
                return s.clone();
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => dollars(n),
                _ => format!("${}", trimmed),
            }
        }
    }
}

fn dollars(n: f64) -> String {
    if n.is_finite() {
        format!("${:.2}", n)
    } else {
        "$0.00".to_string()
    }
}

/// Numeric price for structured data, when the value has one
pub fn price_amount(price: Option<&NumberOrText>) -> Option<String> {
    let formatted = format_price(Some(price?));
    let amount = formatted.trim().trim_start_matches('$').replace(',', "");
    amount
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| format!("{:.2}", n))
}

/// Format a calorie value for the calorie badge.
///
/// Returns an empty string when the badge should be omitted (absent or `N/A`).
pub fn format_calories(calories: Option<&NumberOrText>) -> String {
    match calories {
        None => String::new(),
        Some(NumberOrText::Number(n)) if !n.is_finite() => String::new(),
        Some(NumberOrText::Number(n)) => {
            if n.fract() == 0.0 {
                format!("{} Cal", *n as i64)
            } else {
                format!("{} Cal", n)
            }
        }
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
                String::new()
            } else if trimmed.to_lowercase().contains("cal") {
                s.clone()
            } else if trimmed.parse::<f64>().is_ok_and(|n| n.is_finite()) {
                format!("{} Cal", trimmed)
            } else {
                s.clone()
            }
        }
    }
}

/// Shorten text to at most `max_chars` characters on a word boundary, appending an ellipsis
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end_matches([',', '.', ';', ':', ' ']))
}

/// Absolute URL for an asset path, leaving absolute URLs untouched
pub fn absolute_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), url)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), url)
    }
}
