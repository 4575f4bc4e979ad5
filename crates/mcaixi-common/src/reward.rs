//! Reward signal encodings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the reward suffix of a percept is decoded into a scalar reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardEncoding {
    /// Interpret the reward bits as an unsigned integer, MSB first.
    Base2,
    /// Count the number of set bits.
    BitCount,
}

impl fmt::Display for RewardEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardEncoding::Base2 => write!(f, "base2"),
            RewardEncoding::BitCount => write!(f, "bitcount"),
        }
    }
}

impl FromStr for RewardEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base2" => Ok(RewardEncoding::Base2),
            "bitcount" => Ok(RewardEncoding::BitCount),
            other => Err(format!("invalid reward encoding: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("base2".parse::<RewardEncoding>(), Ok(RewardEncoding::Base2));
        assert_eq!(
            "bitcount".parse::<RewardEncoding>(),
            Ok(RewardEncoding::BitCount)
        );
        assert!("unary".parse::<RewardEncoding>().is_err());
        assert_eq!(RewardEncoding::Base2.to_string(), "base2");
    }
}
