use regex::Regex;
use std::sync::OnceLock;

use crate::entry::InstallmentHint;

/// Tried in order; the first pattern whose captures pass the bounds
/// check wins. Order matters: the explicit "Parc"/"x" form beats the
/// generic "N/M" so "Parc. 2/6" is not read off some other digit pair.
fn patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)(?:Parc(?:ela)?\.?|x)\s*(\d{1,2})\s*[/-]\s*(\d{1,2})").unwrap(),
            Regex::new(r"(?i)(\d{1,2})\s+de\s+(\d{1,2})").unwrap(),
            Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").unwrap(),
        ]
    })
}

/// Scans a free-text description for an installment position like
/// "Parc 03/06", "x3/6", "3 de 6" or a bare "03/06".
pub fn detect(description: &str) -> Option<InstallmentHint> {
    for re in patterns() {
        let Some(caps) = re.captures(description) else {
            continue;
        };
        let current: u32 = caps[1].parse().ok()?;
        let total: u32 = caps[2].parse().ok()?;
        if current > 0 && current <= total && total <= 99 {
            return Some(InstallmentHint { current, total });
        }
    }
    None
}
