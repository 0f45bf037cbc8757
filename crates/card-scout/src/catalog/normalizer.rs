pub(crate) fn normalize_key(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Lowercased issuer with `american express` folded into `amex`.
pub(crate) fn issuer_key(issuer: &str) -> String {
    let key = normalize_key(issuer);
    if key == "american express" {
        "amex".to_string()
    } else {
        key
    }
}

/// Case-insensitive substring test against an already-lowercased key.
pub(crate) fn contains_key(haystack: &str, key: &str) -> bool {
    !key.is_empty() && haystack.to_lowercase().contains(key)
}

/// Leading whole-dollar amount of a currency field.
///
/// `$` and `,` are stripped first, so `"$4,000 in 3 months"` reads as 4000.
/// Anything unparseable or negative reads as zero.
pub fn parse_whole_dollars(raw: &str) -> u32 {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let trimmed = cleaned.trim();
    if trimmed.starts_with('-') {
        return 0;
    }
    let digits: String = trimmed
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().map_or(0, |value| value.min(u64::from(u32::MAX)) as u32)
}

/// Leading decimal of a rate field such as `"1.5"` or `"3% on dining"`.
pub fn parse_rate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in trimmed.char_indices() {
        let accepted = match ch {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            '-' | '+' if idx == 0 => true,
            _ => false,
        };
        if !accepted {
            break;
        }
        end = idx + ch.len_utf8();
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_dollars_strip_currency_noise() {
        assert_eq!(parse_whole_dollars("$4,000"), 4000);
        assert_eq!(parse_whole_dollars(" 95.00 "), 95);
        assert_eq!(parse_whole_dollars("$4,000 in 3 months"), 4000);
        assert_eq!(parse_whole_dollars("n/a"), 0);
        assert_eq!(parse_whole_dollars("-50"), 0);
        assert_eq!(parse_whole_dollars(""), 0);
    }

    #[test]
    fn rates_take_the_leading_decimal() {
        assert_eq!(parse_rate("1.5"), Some(1.5));
        assert_eq!(parse_rate("3% on dining"), Some(3.0));
        assert_eq!(parse_rate("unlimited"), None);
        assert_eq!(parse_rate(""), None);
    }

    #[test]
    fn issuer_key_folds_american_express() {
        assert_eq!(issuer_key("American  Express"), "amex");
        assert_eq!(issuer_key(" Chase "), "chase");
    }
}
