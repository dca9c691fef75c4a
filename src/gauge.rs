use serde::Serialize;

// Bounded scale fallback when no meaningful maximum is configured.
const FALLBACK_MAX: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GaugeReading {
    pub value: f64,
    pub max: f64,
    pub percentage: f64,
}

impl GaugeReading {
    pub fn new(value: f64, max: f64) -> Self {
        let max = if max > 0.0 { max } else { FALLBACK_MAX };

        GaugeReading {
            value,
            max,
            percentage: normalize(value, max),
        }
    }
}

/// Maps a value onto a 0-100 scale position, saturating at both ends.
pub fn normalize(value: f64, max: f64) -> f64 {
    let max = if max > 0.0 { max } else { FALLBACK_MAX };

    (value / max * 100.0).clamp(0.0, 100.0)
}

/// CMV gauges span twice the target ratio so the target sits at mid-scale.
pub fn cmv_reading(ratio: f64, cmv_target: f64) -> GaugeReading {
    GaugeReading::new(ratio, cmv_target * 2.0)
}

pub fn revenue_reading(total_sales: f64, sales_goal: f64) -> GaugeReading {
    GaugeReading::new(total_sales, sales_goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_value_to_percentage() {
        assert_eq!(normalize(25.0, 50.0), 50.0);
        assert_eq!(normalize(30.0, 60.0), 50.0);
    }

    #[test]
    fn normalize_saturates_at_both_ends() {
        assert_eq!(normalize(-10.0, 50.0), 0.0);
        assert_eq!(normalize(0.0, 50.0), 0.0);
        assert_eq!(normalize(50.0, 50.0), 100.0);
        assert_eq!(normalize(175.0, 50.0), 100.0);
    }

    #[test]
    fn normalize_is_monotonic_in_value() {
        let samples = [-5.0, 0.0, 10.0, 25.0, 49.0, 50.0, 80.0];
        let mut previous = f64::NEG_INFINITY;

        for value in samples {
            let percentage = normalize(value, 50.0);
            assert!(percentage >= previous);
            previous = percentage;
        }
    }

    #[test]
    fn normalize_falls_back_when_max_is_not_positive() {
        assert_eq!(normalize(50.0, 0.0), 50.0);
        assert_eq!(normalize(50.0, -10.0), 50.0);
        assert_eq!(normalize(200.0, 0.0), 100.0);
    }

    #[test]
    fn cmv_reading_spans_twice_the_target() {
        let reading = cmv_reading(30.0, 30.0);
        assert_eq!(reading.max, 60.0);
        assert_eq!(reading.percentage, 50.0);
    }

    #[test]
    fn cmv_reading_falls_back_when_target_is_zero() {
        let reading = cmv_reading(40.0, 0.0);
        assert_eq!(reading.max, 100.0);
        assert_eq!(reading.percentage, 40.0);
    }

    #[test]
    fn revenue_reading_tracks_goal_progress() {
        let reading = revenue_reading(60000.0, 50000.0);
        assert_eq!(reading.max, 50000.0);
        assert_eq!(reading.percentage, 100.0);
    }
}
