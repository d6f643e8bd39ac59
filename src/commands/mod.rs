pub mod timeline;

use anyhow::{anyhow, Result};

use crate::types::League;

/// Parse a league code from the command line
///
/// Accepts the codes and aliases in `League::from_code`, case-insensitively.
pub fn parse_league(code: &str) -> Result<League> {
    League::from_code(code).ok_or_else(|| {
        anyhow!(
            "Unknown league '{}'. Use one of: nba, wnba, ncaab, nhl",
            code
        )
    })
}
