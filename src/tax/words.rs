//! Invoice totals spelled out in words

use bigdecimal::{BigDecimal, ToPrimitive};

use super::gst::round2;

const UNITS: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];
const SCALES: [&str; 5] = ["", "Thousand", "Million", "Billion", "Trillion"];

/// Spell out a rupee amount, e.g. `1180.50` becomes
/// `One Thousand One Hundred and Eighty Rupees and Fifty Paise`
///
/// The sign is ignored. Amounts beyond the trillions are not supported and
/// render as digits.
pub fn amount_in_words(amount: &BigDecimal) -> String {
    let amount = round2(&amount.abs());
    let rupees_part = amount.with_scale(0);
    let paise_part = (&amount - &rupees_part) * BigDecimal::from(100);

    let (Some(mut rupees), Some(paise)) = (
        rupees_part.to_u64(),
        paise_part.with_scale(0).to_u64(),
    ) else {
        return amount.to_string();
    };

    if rupees == 0 && paise == 0 {
        return "Zero".to_string();
    }

    let mut words = Vec::new();
    if rupees > 0 {
        let mut parts = Vec::new();
        let mut scale = 0;
        while rupees > 0 {
            let chunk = rupees % 1000;
            if chunk != 0 {
                let Some(scale_word) = SCALES.get(scale) else {
                    return amount.to_string();
                };
                let mut part = chunk_to_words(chunk);
                if !scale_word.is_empty() {
                    part.push(' ');
                    part.push_str(scale_word);
                }
                parts.push(part);
            }
            rupees /= 1000;
            scale += 1;
        }
        parts.reverse();
        words.push(format!("{} Rupees", parts.join(" ")));
    }

    if paise > 0 {
        let paise_words = format!("{} Paise", chunk_to_words(paise));
        if words.is_empty() {
            words.push(paise_words);
        } else {
            words.push(format!("and {}", paise_words));
        }
    }

    words.join(" ")
}

// Words for 1..=999
fn chunk_to_words(chunk: u64) -> String {
    let mut words = String::new();
    let mut rest = chunk as usize;

    if rest >= 100 {
        words.push_str(UNITS[rest / 100]);
        words.push_str(" Hundred");
        rest %= 100;
        if rest > 0 {
            words.push_str(" and ");
        }
    }

    if (10..20).contains(&rest) {
        words.push_str(TEENS[rest - 10]);
    } else {
        if rest >= 20 {
            words.push_str(TENS[rest / 10]);
            rest %= 10;
            if rest > 0 {
                words.push(' ');
            }
        }
        if rest > 0 {
            words.push_str(UNITS[rest]);
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn words(value: &str) -> String {
        amount_in_words(&BigDecimal::from_str(value).unwrap())
    }

    #[test]
    fn test_whole_rupees() {
        assert_eq!(words("0"), "Zero");
        assert_eq!(words("7"), "Seven Rupees");
        assert_eq!(words("15"), "Fifteen Rupees");
        assert_eq!(words("40"), "Forty Rupees");
        assert_eq!(
            words("1180"),
            "One Thousand One Hundred and Eighty Rupees"
        );
        assert_eq!(words("2000000"), "Two Million Rupees");
        assert_eq!(
            words("1001001"),
            "One Million One Thousand One Rupees"
        );
    }

    #[test]
    fn test_paise() {
        assert_eq!(
            words("1180.50"),
            "One Thousand One Hundred and Eighty Rupees and Fifty Paise"
        );
        assert_eq!(words("0.05"), "Five Paise");
        assert_eq!(words("12.999"), "Thirteen Rupees");
    }
}
