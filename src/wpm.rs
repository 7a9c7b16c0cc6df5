// src/wpm.rs

/// Gross WPM using the 5-characters-per-word convention, rounded to the
/// nearest whole word. Counts every typed character, right or wrong.
///
/// Guard: with no time elapsed there is no meaningful rate, so this returns
/// 0 instead of dividing by zero.
pub fn live_wpm(typed_chars: usize, elapsed_ms: u128) -> u32 {
    if elapsed_ms == 0 {
        return 0;
    }
    let minutes = elapsed_ms as f64 / 60_000.0;
    ((typed_chars as f64 / 5.0) / minutes).round() as u32
}

/// Number of positions where the typed text matches the target text.
///
/// Comparison is index-aligned: a wrong character does not shift the
/// alignment of everything after it.
pub fn correct_chars(typed: &str, target: &str) -> usize {
    typed
        .chars()
        .zip(target.chars())
        .filter(|(t, expected)| t == expected)
        .count()
}

/// Accuracy percentage: correct characters over typed characters, rounded.
/// An empty input counts as 100% (nothing has been mistyped yet).
pub fn accuracy(correct: usize, typed_chars: usize) -> u32 {
    if typed_chars == 0 {
        return 100;
    }
    ((correct as f64 / typed_chars as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wpm_is_zero_with_no_elapsed_time() {
        assert_eq!(live_wpm(100, 0), 0);
    }

    #[test]
    fn wpm_standard_convention() {
        // 300 chars in one minute = 60 words
        assert_eq!(live_wpm(300, 60_000), 60);
        // 150 chars in 30 seconds = 60 words
        assert_eq!(live_wpm(150, 30_000), 60);
        // 25 chars in 6 seconds = 50 words
        assert_eq!(live_wpm(25, 6_000), 50);
    }

    #[test]
    fn wpm_rounds_to_nearest() {
        // 7 chars in 10s -> 1.4 words / (1/6 min) = 8.4 -> 8
        assert_eq!(live_wpm(7, 10_000), 8);
        // 8 chars in 10s -> 9.6 -> 10
        assert_eq!(live_wpm(8, 10_000), 10);
    }

    #[test]
    fn correct_chars_is_index_aligned() {
        assert_eq!(correct_chars("hello", "hello"), 5);
        // a single wrong char does not shift later comparisons
        assert_eq!(correct_chars("hxllo", "hello"), 4);
        // a missing char misaligns everything after it; only h/h and the
        // second l/l still line up
        assert_eq!(correct_chars("hllo", "hello"), 2);
        // typed beyond target contributes nothing
        assert_eq!(correct_chars("hey!!", "hey"), 3);
        assert_eq!(correct_chars("", "hello"), 0);
    }

    #[test]
    fn accuracy_bounds() {
        assert_eq!(accuracy(0, 0), 100);
        assert_eq!(accuracy(0, 10), 0);
        assert_eq!(accuracy(10, 10), 100);
        assert_eq!(accuracy(9, 10), 90);
        // rounds: 2/3 = 66.67 -> 67
        assert_eq!(accuracy(2, 3), 67);
    }
}
