use crate::error::TypeError;

/// Legal deliveries in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Formats a legal ball count in `overs.balls` notation (`19.4`).
pub fn format_overs(legal_balls: u32) -> String {
    format!(
        "{}.{}",
        legal_balls / BALLS_PER_OVER,
        legal_balls % BALLS_PER_OVER
    )
}

/// Parses `overs.balls` notation back into a legal ball count.
///
/// A bare integer is read as whole overs. The balls part must be below six.
pub fn parse_overs(notation: &str) -> Result<u32, TypeError> {
    let invalid = || TypeError::InvalidOvers(notation.to_string());
    let trimmed = notation.trim();
    let (overs, balls) = match trimmed.split_once('.') {
        Some((o, b)) => (o, b),
        None => (trimmed, "0"),
    };
    let overs: u32 = overs.parse().map_err(|_| invalid())?;
    let balls: u32 = balls.parse().map_err(|_| invalid())?;
    if balls >= BALLS_PER_OVER {
        return Err(invalid());
    }
    overs
        .checked_mul(BALLS_PER_OVER)
        .and_then(|b| b.checked_add(balls))
        .ok_or_else(invalid)
}
