// Seek slider encoding

use serde::{Deserialize, Serialize};

/// How the position slider value maps to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeekEncoding {
    /// Slider value is the absolute position in seconds
    #[default]
    Seconds,
    /// Slider value is a 0-100 percentage of the duration
    Percent,
}

impl SeekEncoding {
    /// Decode a slider value into a position in seconds.
    ///
    /// Returns `None` when the value cannot be decoded: a percentage needs a
    /// known, positive duration.
    pub fn to_position(self, value: f64, duration: Option<f64>) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        match self {
            SeekEncoding::Seconds => Some(value.max(0.0)),
            SeekEncoding::Percent => {
                let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;
                Some(value.clamp(0.0, 100.0) / 100.0 * duration)
            }
        }
    }

    /// Map a position back onto the slider scale for rendering
    pub fn slider_value(self, position: f64, duration: Option<f64>) -> f64 {
        match self {
            SeekEncoding::Seconds => position,
            SeekEncoding::Percent => match duration.filter(|d| d.is_finite() && *d > 0.0) {
                Some(d) => (position / d * 100.0).clamp(0.0, 100.0),
                None => 0.0,
            },
        }
    }

    /// Upper bound of the slider for the given duration
    pub fn slider_max(self, duration: Option<f64>) -> f64 {
        match self {
            SeekEncoding::Seconds => duration.unwrap_or(0.0),
            SeekEncoding::Percent => 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_conversion() {
        assert_eq!(SeekEncoding::Percent.to_position(50.0, Some(200.0)), Some(100.0));
        assert_eq!(SeekEncoding::Percent.to_position(0.0, Some(200.0)), Some(0.0));
        assert_eq!(SeekEncoding::Percent.to_position(150.0, Some(200.0)), Some(200.0));
    }

    #[test]
    fn test_percent_needs_duration() {
        assert_eq!(SeekEncoding::Percent.to_position(50.0, None), None);
        assert_eq!(SeekEncoding::Percent.to_position(50.0, Some(f64::NAN)), None);
        assert_eq!(SeekEncoding::Percent.to_position(50.0, Some(0.0)), None);
    }

    #[test]
    fn test_seconds_passthrough() {
        assert_eq!(SeekEncoding::Seconds.to_position(42.5, None), Some(42.5));
        assert_eq!(SeekEncoding::Seconds.to_position(-1.0, Some(10.0)), Some(0.0));
        assert_eq!(SeekEncoding::Seconds.to_position(f64::NAN, Some(10.0)), None);
    }

    #[test]
    fn test_slider_value() {
        assert_eq!(SeekEncoding::Percent.slider_value(50.0, Some(200.0)), 25.0);
        assert_eq!(SeekEncoding::Percent.slider_value(50.0, None), 0.0);
        assert_eq!(SeekEncoding::Seconds.slider_value(50.0, Some(200.0)), 50.0);
        assert_eq!(SeekEncoding::Percent.slider_max(Some(200.0)), 100.0);
        assert_eq!(SeekEncoding::Seconds.slider_max(Some(200.0)), 200.0);
    }
}
