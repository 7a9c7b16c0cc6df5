// src/engine.rs

use std::time::Instant;

use crate::wpm;

/// Lifecycle of a single typing test. The clock starts on the first typed
/// character, not when the test screen opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Input events the engine reacts to. Everything else (navigation, redraws,
/// the cosmetic 1-second timer tick) happens outside the engine and never
/// touches the stats, which always derive from wall-clock deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(char),
    Backspace,
}

/// Frozen outcome of a finished test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestResult {
    pub wpm: u32,
    pub accuracy: u32,
    /// Whole seconds, floored, for display.
    pub seconds: u64,
}

/// State machine for one typing test against a fixed target paragraph.
///
/// All mutation goes through [`TypingTest::apply`]; callers pass the current
/// instant in so the engine stays deterministic under test.
pub struct TypingTest {
    target: String,
    target_chars: usize,
    typed: String,
    typed_chars: usize,
    started: Option<Instant>,
    ended: Option<Instant>,
    phase: Phase,
    live_wpm: u32,
    accuracy: u32,
}

impl TypingTest {
    pub fn new(target: String) -> Self {
        let target_chars = target.chars().count();
        TypingTest {
            target,
            target_chars,
            typed: String::new(),
            typed_chars: 0,
            started: None,
            ended: None,
            phase: Phase::Idle,
            live_wpm: 0,
            accuracy: 100,
        }
    }

    /// Feed one event into the machine.
    ///
    /// `Idle -> Running` on the first character; `Running -> Finished` the
    /// instant the typed length reaches the target length, freezing the end
    /// instant. Events after completion are ignored; there is no pause or
    /// resume, and abandoning the test simply drops the value.
    pub fn apply(&mut self, event: Event, now: Instant) {
        if self.phase == Phase::Finished {
            return;
        }
        match event {
            Event::Key(c) => {
                if self.phase == Phase::Idle {
                    self.started = Some(now);
                    self.phase = Phase::Running;
                }
                self.typed.push(c);
                self.typed_chars += 1;
                self.recompute(now);
                if self.typed_chars >= self.target_chars {
                    self.ended = Some(now);
                    self.phase = Phase::Finished;
                }
            }
            Event::Backspace => {
                if self.phase != Phase::Running {
                    return;
                }
                if self.typed.pop().is_some() {
                    self.typed_chars -= 1;
                }
                // The timer keeps running even if everything is erased.
                self.recompute(now);
            }
        }
    }

    fn recompute(&mut self, now: Instant) {
        let elapsed_ms = match self.started {
            Some(start) => now.duration_since(start).as_millis(),
            None => 0,
        };
        self.live_wpm = wpm::live_wpm(self.typed_chars, elapsed_ms);
        let correct = wpm::correct_chars(&self.typed, &self.target);
        self.accuracy = wpm::accuracy(correct, self.typed_chars);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn live_wpm(&self) -> u32 {
        self.live_wpm
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    /// Whole seconds since the first keystroke, for the visible timer.
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        match self.started {
            Some(start) => now.duration_since(start).as_secs(),
            None => 0,
        }
    }

    /// Final stats, available once the test is finished. WPM and accuracy
    /// are whatever the last keystroke computed against the frozen end
    /// instant; later calls always return the same numbers.
    pub fn result(&self) -> Option<TestResult> {
        let (start, end) = match (self.started, self.ended) {
            (Some(s), Some(e)) => (s, e),
            _ => return None,
        };
        Some(TestResult {
            wpm: self.live_wpm,
            accuracy: self.accuracy,
            seconds: end.duration_since(start).as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn type_str(test: &mut TypingTest, s: &str, at: Instant) {
        for c in s.chars() {
            test.apply(Event::Key(c), at);
        }
    }

    #[test]
    fn starts_on_first_keystroke_not_before() {
        let mut t = TypingTest::new("abc".into());
        assert_eq!(t.phase(), Phase::Idle);
        let now = Instant::now();
        t.apply(Event::Key('a'), now);
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.elapsed_secs(now), 0);
    }

    #[test]
    fn first_keystroke_has_zero_wpm_not_nan() {
        let mut t = TypingTest::new("abc".into());
        t.apply(Event::Key('a'), Instant::now());
        assert_eq!(t.live_wpm(), 0);
        assert_eq!(t.accuracy(), 100);
    }

    #[test]
    fn finishes_when_typed_length_reaches_target() {
        let start = Instant::now();
        let mut t = TypingTest::new("hi".into());
        t.apply(Event::Key('h'), start);
        assert_eq!(t.phase(), Phase::Running);
        t.apply(Event::Key('i'), start + Duration::from_secs(3));
        assert_eq!(t.phase(), Phase::Finished);
        let r = t.result().expect("finished test has a result");
        // 2 chars in 3s: (2/5) / (3/60 min) = 8 wpm
        assert_eq!(r.wpm, 8);
        assert_eq!(r.accuracy, 100);
        assert_eq!(r.seconds, 3);
    }

    #[test]
    fn wrong_chars_count_toward_speed_but_not_accuracy() {
        let start = Instant::now();
        let mut t = TypingTest::new("abcd".into());
        type_str(&mut t, "abxd", start + Duration::from_secs(6));
        // started and ended at the same instant as far as the engine saw,
        // but accuracy is 3/4
        assert_eq!(t.accuracy(), 75);
        assert_eq!(t.phase(), Phase::Finished);
    }

    #[test]
    fn result_is_frozen_after_completion() {
        let start = Instant::now();
        let mut t = TypingTest::new("ab".into());
        t.apply(Event::Key('a'), start);
        t.apply(Event::Key('b'), start + Duration::from_secs(2));
        let first = t.result().expect("result");
        // further events are ignored
        t.apply(Event::Key('x'), start + Duration::from_secs(50));
        t.apply(Event::Backspace, start + Duration::from_secs(51));
        assert_eq!(t.result(), Some(first));
        assert_eq!(t.typed(), "ab");
    }

    #[test]
    fn backspace_undoes_a_character() {
        let start = Instant::now();
        let mut t = TypingTest::new("abc".into());
        t.apply(Event::Key('a'), start);
        t.apply(Event::Key('x'), start + Duration::from_secs(1));
        assert_eq!(t.accuracy(), 50);
        t.apply(Event::Backspace, start + Duration::from_secs(2));
        assert_eq!(t.typed(), "a");
        assert_eq!(t.accuracy(), 100);
        // still running, timer never paused
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.elapsed_secs(start + Duration::from_secs(2)), 2);
    }

    #[test]
    fn backspace_before_start_is_a_no_op() {
        let mut t = TypingTest::new("abc".into());
        t.apply(Event::Backspace, Instant::now());
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.typed(), "");
    }

    #[test]
    fn empty_input_after_backspaces_keeps_running() {
        let start = Instant::now();
        let mut t = TypingTest::new("ab".into());
        t.apply(Event::Key('a'), start);
        t.apply(Event::Backspace, start + Duration::from_secs(1));
        assert_eq!(t.typed(), "");
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.accuracy(), 100);
    }
}
