//! Phrase clock: the shared 16-second grid every subsystem aligns to

/// Phrase length in seconds
pub const PHRASE_LENGTH: f64 = 16.0;

/// Index of the phrase containing `t`
pub fn phrase_index(t: f64) -> i64 {
    (t / PHRASE_LENGTH).floor() as i64
}

/// Start of the phrase containing `t`
pub fn current_phrase_boundary(t: f64) -> f64 {
    (t / PHRASE_LENGTH).floor() * PHRASE_LENGTH
}

/// Next boundary at or after `t` (a time exactly on a boundary is its own next boundary)
pub fn next_phrase_boundary(t: f64) -> f64 {
    (t / PHRASE_LENGTH).ceil() * PHRASE_LENGTH
}

pub fn time_until_next_phrase(t: f64) -> f64 {
    next_phrase_boundary(t) - t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_grid() {
        assert_eq!(phrase_index(0.0), 0);
        assert_eq!(phrase_index(15.99), 0);
        assert_eq!(phrase_index(16.0), 1);
        assert_eq!(phrase_index(100.0), 6);
        assert_eq!(phrase_index(-1.0), -1);

        assert_eq!(current_phrase_boundary(100.0), 96.0);
        assert_eq!(next_phrase_boundary(100.0), 112.0);
        assert_eq!(time_until_next_phrase(100.0), 12.0);
    }

    #[test]
    fn test_exact_boundary() {
        assert_eq!(next_phrase_boundary(32.0), 32.0);
        assert_eq!(current_phrase_boundary(32.0), 32.0);
        assert_eq!(time_until_next_phrase(32.0), 0.0);
    }
}
