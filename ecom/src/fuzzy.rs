//! String similarity scores on a 0-100 scale.
//!
//! Scores are built on the indel distance: `ratio` is the normalized longest
//! common subsequence, the other scorers combine it over windows or sorted
//! tokens. Every scorer preprocesses both sides with [`preprocess`] first.

/// Bengali full stop, used as a sentence separator in addresses.
const DANDA: char = '\u{0964}';

/// Lowercases and turns separators into spaces.
///
/// Only ASCII punctuation is replaced; Bengali vowel signs and other combining
/// marks are part of the word and are kept.
pub fn preprocess(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_whitespace() || c == DANDA || (c.is_ascii() && !c.is_ascii_alphanumeric()) {
                ' '
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

fn chars(text: &str) -> Vec<char> {
    preprocess(text).chars().collect()
}

pub fn ratio(a: &str, b: &str) -> f64 {
    indel_ratio(&chars(a), &chars(b))
}

/// Best `ratio` of the shorter string against every equally long window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    partial_chars(&chars(a), &chars(b))
}

fn partial_chars(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        best = best.max(indel_ratio(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    indel_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(text: &str) -> Vec<char> {
    let processed = preprocess(text);
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ").chars().collect()
}

/// Combined score used for district matching.
///
/// Strings of similar length compare whole and by sorted tokens. When one is
/// much longer, the best window of the longer string counts instead, scaled
/// down so a substring hit never outranks an exact match.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let left = chars(a);
    let right = chars(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let base = indel_ratio(&left, &right);
    let (shorter, longer) = if left.len() <= right.len() {
        (left.len(), right.len())
    } else {
        (right.len(), left.len())
    };
    let length_ratio = longer as f64 / shorter as f64;

    if length_ratio < 1.5 {
        return base.max(0.95 * token_sort_ratio(a, b));
    }

    let scale = if length_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(scale * partial_chars(&left, &right))
}
