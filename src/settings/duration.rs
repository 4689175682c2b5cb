use anyhow::{Result, anyhow, bail};
use chrono::TimeDelta;

/// Parses a lifetime such as `30s`, `15m`, `12h`, `7d` or `2w`.
pub fn parse_ttl(s: &str) -> Result<TimeDelta> {
    let unit_at = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow!("invalid duration format: {s:?}"))?;
    let (digits, unit) = s.split_at(unit_at);
    if digits.is_empty() {
        bail!("invalid duration format: {s:?}");
    }
    let value: i64 = digits
        .parse()
        .map_err(|_| anyhow!("invalid duration format: {s:?}"))?;

    let ttl = match unit {
        "s" => TimeDelta::try_seconds(value),
        "m" => TimeDelta::try_minutes(value),
        "h" => TimeDelta::try_hours(value),
        "d" => TimeDelta::try_days(value),
        "w" => TimeDelta::try_weeks(value),
        _ => bail!("unsupported duration unit in {s:?}"),
    };
    ttl.ok_or_else(|| anyhow!("duration out of range: {s:?}"))
}
