//! Composite fitness used to rank genomes after a tournament.

use std::fmt;

use reversi_stats::accumulator::Accumulator;
use serde::{Deserialize, Deserializer, Serialize};

/// Weight of the timing bonus relative to the win ratio.
pub const TIMING_BONUS: f64 = 0.01;

/// Tournament statistics of one genome.
///
/// `time_dev` is the spread reported by [`Accumulator::std_dev`] over the genome's
/// decision times (seconds). It is infinite for a genome that never moved, which
/// JSON stores as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub win_ratio: f64,
    pub avg_time: f64,
    #[serde(deserialize_with = "deserialize_spread")]
    pub time_dev: f64,
}

fn deserialize_spread<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl Score {
    #[must_use]
    pub fn from_accumulators(wins: &Accumulator, times: &Accumulator) -> Self {
        Self {
            win_ratio: wins.avg(),
            avg_time: times.avg(),
            time_dev: times.std_dev(),
        }
    }

    /// Fitness relative to the tournament-wide average decision time.
    ///
    /// ```text
    /// fitness = win_ratio + 0.01 * min(win_ratio, total_avg_time / (avg_time + time_dev))
    /// ```
    ///
    /// Between equally strong genomes the faster and steadier one ranks higher, but
    /// the bonus never exceeds one hundredth of the win ratio. A genome whose timing
    /// denominator is zero gets the full bonus.
    ///
    /// ```
    /// use reversi_training::fitness::Score;
    ///
    /// let score = Score { win_ratio: 0.5, avg_time: 0.1, time_dev: 0.1 };
    /// assert_eq!(score.fitness(0.1), 0.5 + 0.01 * 0.5);
    /// assert_eq!(score.fitness(0.4), 0.5 + 0.01 * 0.5);
    /// ```
    #[must_use]
    pub fn fitness(&self, total_avg_time: f64) -> f64 {
        let denominator = self.avg_time + self.time_dev;
        let timing = if denominator > 0.0 {
            total_avg_time / denominator
        } else {
            f64::INFINITY
        };
        self.win_ratio + TIMING_BONUS * self.win_ratio.min(timing)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wins={:.2}, timing={:.2}±{:.2}",
            self.win_ratio, self.avg_time, self.time_dev
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let score = Score {
            win_ratio: 0.5,
            avg_time: 0.012,
            time_dev: 0.0001,
        };
        assert_eq!(score.to_string(), "wins=0.50, timing=0.01±0.00");
    }

    #[test]
    fn test_win_ratio_dominates() {
        let slow_winner = Score {
            win_ratio: 0.6,
            avg_time: 5.0,
            time_dev: 2.0,
        };
        let fast_loser = Score {
            win_ratio: 0.5,
            avg_time: 0.001,
            time_dev: 0.0,
        };
        assert!(slow_winner.fitness(1.0) > fast_loser.fitness(1.0));
    }

    #[test]
    fn test_timing_breaks_ties() {
        let fast = Score {
            win_ratio: 0.5,
            avg_time: 0.1,
            time_dev: 0.0,
        };
        let slow = Score {
            win_ratio: 0.5,
            avg_time: 1.0,
            time_dev: 1.0,
        };
        assert!(fast.fitness(0.2) > slow.fitness(0.2));
    }

    #[test]
    fn test_no_samples() {
        let score = Score::from_accumulators(&Accumulator::new(), &Accumulator::new());
        assert_eq!(score.win_ratio, 0.0);
        assert!(score.time_dev.is_infinite());
        assert_eq!(score.fitness(1.0), 0.0);
    }

    #[test]
    fn test_infinite_spread_survives_json() {
        let score = Score::from_accumulators(&Accumulator::new(), &Accumulator::new());
        let json = serde_json::to_string(&score).unwrap();
        assert!(json.contains(r#""time_dev":null"#));

        let back: Score = serde_json::from_str(&json).unwrap();
        assert_eq!(back.win_ratio, 0.0);
        assert!(back.time_dev.is_infinite());

        let finite: Score =
            serde_json::from_str(r#"{"win_ratio":0.5,"avg_time":0.1,"time_dev":0.02}"#).unwrap();
        assert_eq!(finite.time_dev, 0.02);
    }
}
