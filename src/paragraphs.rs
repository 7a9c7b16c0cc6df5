// src/paragraphs.rs
//
// Static practice text pools, one per difficulty tier, plus the candidate
// list the daily challenge draws from. Pool picks are uniform random and
// keep no state; the daily pick is persisted by the store so everyone on
// the same calendar day types the same paragraph.

use rand::seq::SliceRandom;

use crate::db::Difficulty;

pub const EASY: [&str; 5] = [
    "The sun rises in the east and sets in the west every single day.",
    "A small brown dog ran across the quiet street to greet its owner.",
    "Learning to type fast is a useful skill for any student or worker.",
    "The cat sat on the mat and watched the mouse run across the floor.",
    "Rainy days are perfect for reading a good book and drinking tea.",
];

pub const MEDIUM: [&str; 5] = [
    "A good text editor stays out of the way and lets the words on the screen carry all of the attention they deserve.",
    "Compilers turn the source code a person can read into the machine code a processor can run, one translation pass at a time.",
    "Version control lets a team of people change the same files at the same time without quietly destroying each other's work.",
    "The keyboard is the oldest interface we still use daily, and touch typing remains the fastest way to move thought into text.",
    "The importance of regular exercise cannot be overstated for maintaining both physical and mental health over a lifetime.",
];

pub const HARD: [&str; 5] = [
    "In the realm of software engineering, the ability to write clean, maintainable code is often more valuable than the ability to write clever, complex algorithms that are difficult for others to understand or modify.",
    "The rapid advancement of artificial intelligence has sparked intense debates regarding its potential impact on the global job market, ethical considerations of autonomous systems, and the future of human-computer interaction.",
    "Quantum computing represents a paradigm shift in computational power, leveraging the principles of superposition and entanglement to solve problems that are currently intractable for classical computers.",
    "Sustainable development requires a holistic approach that balances economic growth, social equity, and environmental protection to ensure that future generations can meet their own needs without compromise.",
    "The intricate dance of celestial bodies in our solar system is governed by the laws of physics, which scientists have spent centuries uncovering through rigorous observation, experimentation, and mathematical modeling.",
];

/// Candidates for the once-per-day challenge paragraph.
pub const DAILY: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog.",
    "Success is not final, failure is not fatal.",
    "Programming is the art of telling another human what one wants the computer to do.",
    "In the middle of every difficulty lies opportunity.",
    "The only way to do great work is to love what you do.",
];

pub fn pool(difficulty: Difficulty) -> &'static [&'static str] {
    match difficulty {
        Difficulty::Easy => &EASY,
        Difficulty::Medium => &MEDIUM,
        Difficulty::Hard => &HARD,
    }
}

/// Uniform random pick from the static pool for a difficulty.
pub fn practice(difficulty: Difficulty) -> &'static str {
    let mut rng = rand::thread_rng();
    pool(difficulty).choose(&mut rng).copied().unwrap_or("")
}

/// Uniform random pick from the daily candidates. Only the first request of
/// a calendar day actually uses this; afterwards the stored row wins.
pub fn daily_candidate() -> &'static str {
    let mut rng = rand::thread_rng();
    DAILY.choose(&mut rng).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practice_pick_comes_from_the_right_pool() {
        for _ in 0..20 {
            assert!(EASY.contains(&practice(Difficulty::Easy)));
            assert!(MEDIUM.contains(&practice(Difficulty::Medium)));
            assert!(HARD.contains(&practice(Difficulty::Hard)));
        }
    }

    #[test]
    fn daily_candidate_comes_from_the_daily_pool() {
        for _ in 0..20 {
            assert!(DAILY.contains(&daily_candidate()));
        }
    }
}
