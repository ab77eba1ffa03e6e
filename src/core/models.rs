use reqwest::StatusCode;
use serde::Serialize;

/// Color classification of the open-ticket count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Off,
    Green,
    Blue,
    Red,
}

impl ColorTier {
    pub fn from_count(count: usize, thresholds: Thresholds) -> Self {
        if count > 0 && count <= thresholds.low {
            ColorTier::Green
        } else if count > thresholds.low && count <= thresholds.high {
            ColorTier::Blue
        } else if count > thresholds.high {
            ColorTier::Red
        } else {
            ColorTier::Off
        }
    }

    /// Six hex digit custom color sent to the relay.
    pub fn hex(&self) -> &'static str {
        match self {
            ColorTier::Off => "000000",
            ColorTier::Green => "00ff00",
            ColorTier::Blue => "0000ff",
            ColorTier::Red => "ff0000",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorTier::Off => "off",
            ColorTier::Green => "green",
            ColorTier::Blue => "blue",
            ColorTier::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low: usize,
    pub high: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { low: 1, high: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagAction {
    SolidColor,
    Blink,
}

impl FlagAction {
    /// Path segment appended to the relay base URL.
    pub fn path(&self) -> &'static str {
        match self {
            FlagAction::SolidColor => "solid_color",
            FlagAction::Blink => "blink",
        }
    }
}

/// Outcome of a queue read that reached the ticket source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueReading {
    Counted(usize),
    /// 401 or 403 from the ticket source.
    Unauthorized(StatusCode),
    /// Any other non-200 status.
    Unavailable(StatusCode),
}

impl QueueReading {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QueueReading::Unauthorized(status),
            _ => QueueReading::Unavailable(status),
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            QueueReading::Counted(count) => Some(*count),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Thresholds = Thresholds { low: 1, high: 2 };

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ColorTier::from_count(0, DEFAULT), ColorTier::Off);
        assert_eq!(ColorTier::from_count(1, DEFAULT), ColorTier::Green);
        assert_eq!(ColorTier::from_count(2, DEFAULT), ColorTier::Blue);
        assert_eq!(ColorTier::from_count(3, DEFAULT), ColorTier::Red);
        assert_eq!(ColorTier::from_count(200, DEFAULT), ColorTier::Red);
    }

    #[test]
    fn test_tiers_partition_counts() {
        let thresholds = Thresholds { low: 4, high: 9 };
        for count in 0..50 {
            let expected = match count {
                0 => ColorTier::Off,
                1..=4 => ColorTier::Green,
                5..=9 => ColorTier::Blue,
                _ => ColorTier::Red,
            };
            assert_eq!(ColorTier::from_count(count, thresholds), expected, "count {count}");
        }
    }

    #[test]
    fn test_equal_thresholds_skip_blue() {
        let thresholds = Thresholds { low: 3, high: 3 };
        assert_eq!(ColorTier::from_count(3, thresholds), ColorTier::Green);
        assert_eq!(ColorTier::from_count(4, thresholds), ColorTier::Red);
    }

    #[test]
    fn test_inverted_thresholds() {
        // low > high is tolerated; counts above low go straight to red
        let thresholds = Thresholds { low: 5, high: 2 };
        assert_eq!(ColorTier::from_count(2, thresholds), ColorTier::Green);
        assert_eq!(ColorTier::from_count(6, thresholds), ColorTier::Red);
    }

    #[test]
    fn test_tier_hex() {
        assert_eq!(ColorTier::Off.hex(), "000000");
        assert_eq!(ColorTier::Green.hex(), "00ff00");
        assert_eq!(ColorTier::Blue.hex(), "0000ff");
        assert_eq!(ColorTier::Red.hex(), "ff0000");
    }

    #[test]
    fn test_action_path() {
        assert_eq!(FlagAction::SolidColor.path(), "solid_color");
        assert_eq!(FlagAction::Blink.path(), "blink");
    }

    #[test]
    fn test_reading_from_status() {
        assert_eq!(
            QueueReading::from_status(StatusCode::UNAUTHORIZED),
            QueueReading::Unauthorized(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            QueueReading::from_status(StatusCode::FORBIDDEN),
            QueueReading::Unauthorized(StatusCode::FORBIDDEN)
        );
        assert_eq!(
            QueueReading::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            QueueReading::Unavailable(StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(QueueReading::Counted(4).count(), Some(4));
        assert_eq!(
            QueueReading::Unavailable(StatusCode::BAD_GATEWAY).count(),
            None
        );
    }
}
