//! Entry names: spelling numbers out and picking a free name on collision.

const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
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

const SCALES: [(u64, &str); 3] = [
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];

/// Spell `n` out in title-cased English words, e.g. `121` → `"One Hundred Twenty One"`.
pub fn number_to_words(n: u64) -> String {
    if n < 1_000 {
        return below_thousand(n as usize);
    }
    let mut words = vec![];
    let mut rest = n;
    for (scale, name) in SCALES {
        if rest >= scale {
            words.push(format!("{} {name}", number_to_words(rest / scale)));
            rest %= scale;
        }
    }
    if rest > 0 {
        words.push(below_thousand(rest as usize));
    }
    words.join(" ")
}

fn below_thousand(n: usize) -> String {
    let mut words = vec![];
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        words.push(format!("{} Hundred", ONES[hundreds]));
    }
    if rest >= 20 {
        words.push(TENS[rest / 10].to_string());
        if rest % 10 > 0 {
            words.push(ONES[rest % 10].to_string());
        }
    } else if rest > 0 || hundreds == 0 {
        words.push(ONES[rest].to_string());
    }
    words.join(" ")
}

/// First free name among `name`, `"{name} Two"`, `"{name} Three"`, ...
///
/// The unsuffixed name counts as the first one, so suffixes start at two.
pub fn disambiguate(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(name) {
        return name.to_owned();
    }
    (2..)
        .map(|i| format!("{name} {}", number_to_words(i)))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| unreachable!("infinite range ended"))
}
