use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Market sectors available for comparison runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Tech,
    Retail,
    Financial,
    Healthcare,
    Energy,
    Telecom,
}

impl Sector {
    pub const ALL: [Sector; 6] = [
        Sector::Tech,
        Sector::Retail,
        Sector::Financial,
        Sector::Healthcare,
        Sector::Energy,
        Sector::Telecom,
    ];

    /// Representative large caps for the sector
    pub fn stocks(&self) -> &'static [&'static str] {
        match self {
            Sector::Tech => &["AAPL", "MSFT", "GOOGL", "META", "NVDA"],
            Sector::Retail => &["AMZN", "WMT", "TGT", "COST", "HD"],
            Sector::Financial => &["JPM", "BAC", "GS", "WFC", "C"],
            Sector::Healthcare => &["JNJ", "PFE", "UNH", "MRK", "ABBV"],
            Sector::Energy => &["XOM", "CVX", "COP", "EOG", "SLB"],
            Sector::Telecom => &["T", "VZ", "TMUS", "CMCSA", "CHTR"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Tech => "tech",
            Sector::Retail => "retail",
            Sector::Financial => "financial",
            Sector::Healthcare => "healthcare",
            Sector::Energy => "energy",
            Sector::Telecom => "telecom",
        }
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Sector::ALL
            .iter()
            .copied()
            .find(|sector| sector.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Sector::ALL.iter().map(|s| s.name()).collect();
                format!("Unknown sector '{}'. Available sectors: {}", s, known.join(", "))
            })
    }
}

/// Expand sector names into their stock lists.
/// Unknown names are logged and ignored.
pub fn stocks_for_sectors<S: AsRef<str>>(sectors: &[S]) -> Vec<String> {
    let mut stocks = Vec::new();
    for name in sectors {
        match name.as_ref().parse::<Sector>() {
            Ok(sector) => stocks.extend(sector.stocks().iter().map(|s| s.to_string())),
            Err(msg) => tracing::warn!("{}", msg),
        }
    }
    stocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Tech".parse::<Sector>(), Ok(Sector::Tech));
        assert_eq!(" ENERGY ".parse::<Sector>(), Ok(Sector::Energy));
        assert!("crypto".parse::<Sector>().is_err());
    }

    #[test]
    fn test_stocks_for_sectors_skips_unknown() {
        let stocks = stocks_for_sectors(&["retail", "crypto", "telecom"]);
        assert_eq!(stocks.len(), 10);
        assert_eq!(stocks[0], "AMZN");
        assert_eq!(stocks[9], "CHTR");
    }

    #[test]
    fn test_stocks_for_sectors_all_unknown() {
        assert!(stocks_for_sectors(&["metals"]).is_empty());
    }
}
