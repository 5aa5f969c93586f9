//! Per-metric severity level and deviation text.

use postpulse_rules::scoring_config::{Bands, SeverityBands};

use crate::types::AnomalyLevel;

/// Level from z-score, percentile and the IQR outlier flag.
///
/// `z > 0` uses the high-percentile bands, anything else the low ones. A
/// metric that is still NORMAL but sits outside the IQR fences with
/// `|z|` above the promotion threshold becomes MILD.
pub fn classify_level(z: f64, percentile: f64, iqr_outlier: bool, bands: &SeverityBands) -> AnomalyLevel {
    let abs_z = z.abs();
    let zb = &bands.z;

    let level = if z > 0.0 {
        let hp = &bands.high_percentile;
        if percentile >= hp.severe || abs_z > zb.severe {
            AnomalyLevel::Severe
        } else if percentile >= hp.moderate || abs_z > zb.moderate {
            AnomalyLevel::Moderate
        } else if percentile >= hp.mild || abs_z > zb.mild {
            AnomalyLevel::Mild
        } else {
            AnomalyLevel::Normal
        }
    } else {
        let lp = &bands.low_percentile;
        if percentile <= lp.severe || abs_z > zb.severe {
            AnomalyLevel::Severe
        } else if percentile <= lp.moderate || abs_z > zb.moderate {
            AnomalyLevel::Moderate
        } else if percentile <= lp.mild || abs_z > zb.mild {
            AnomalyLevel::Mild
        } else {
            AnomalyLevel::Normal
        }
    };

    if level == AnomalyLevel::Normal && iqr_outlier && abs_z > bands.iqr_promotion_z {
        AnomalyLevel::Mild
    } else {
        level
    }
}

/// Human-readable deviation of `value` from the batch mean.
///
/// e.g. `"significant 63.2% above average"`, `"4.0% below average"`.
pub fn deviation_text(value: f64, mean: f64, qualifiers: &Bands) -> String {
    if mean <= 0.0 {
        return "baseline is zero".to_string();
    }
    let pct = (value - mean) / mean * 100.0;
    let magnitude = pct.abs();
    let qualifier = if magnitude > qualifiers.severe {
        "large "
    } else if magnitude > qualifiers.moderate {
        "significant "
    } else if magnitude > qualifiers.mild {
        "noticeable "
    } else {
        ""
    };
    let direction = if pct > 0.0 { "above" } else { "below" };
    format!("{qualifier}{magnitude:.1}% {direction} average")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> SeverityBands {
        SeverityBands::default()
    }

    #[test]
    fn positive_branch_by_percentile() {
        let b = bands();
        assert_eq!(classify_level(0.1, 85.0, false, &b), AnomalyLevel::Severe);
        assert_eq!(classify_level(0.1, 70.0, false, &b), AnomalyLevel::Moderate);
        assert_eq!(classify_level(0.1, 60.0, false, &b), AnomalyLevel::Mild);
        assert_eq!(classify_level(0.1, 59.9, false, &b), AnomalyLevel::Normal);
    }

    #[test]
    fn positive_branch_by_z() {
        let b = bands();
        assert_eq!(classify_level(2.6, 50.0, false, &b), AnomalyLevel::Severe);
        assert_eq!(classify_level(1.9, 50.0, false, &b), AnomalyLevel::Moderate);
        assert_eq!(classify_level(1.3, 50.0, false, &b), AnomalyLevel::Mild);
        assert_eq!(classify_level(1.2, 50.0, false, &b), AnomalyLevel::Normal);
    }

    #[test]
    fn negative_branch_by_percentile_and_z() {
        let b = bands();
        assert_eq!(classify_level(-0.1, 15.0, false, &b), AnomalyLevel::Severe);
        assert_eq!(classify_level(-0.1, 30.0, false, &b), AnomalyLevel::Moderate);
        assert_eq!(classify_level(-0.1, 40.0, false, &b), AnomalyLevel::Mild);
        assert_eq!(classify_level(-0.1, 41.0, false, &b), AnomalyLevel::Normal);
        assert_eq!(classify_level(-2.6, 90.0, false, &b), AnomalyLevel::Severe);
    }

    #[test]
    fn zero_z_takes_negative_branch() {
        // A constant sample: percentile 100 but z 0.
        assert_eq!(classify_level(0.0, 100.0, false, &bands()), AnomalyLevel::Normal);
        assert_eq!(classify_level(0.0, 10.0, false, &bands()), AnomalyLevel::Severe);
    }

    #[test]
    fn iqr_promotion_needs_z_above_one() {
        let b = bands();
        assert_eq!(classify_level(-1.1, 45.0, true, &b), AnomalyLevel::Mild);
        assert_eq!(classify_level(-1.0, 45.0, true, &b), AnomalyLevel::Normal);
        assert_eq!(classify_level(-1.1, 45.0, false, &b), AnomalyLevel::Normal);
    }

    #[test]
    fn deviation_text_qualifiers() {
        let q = bands().deviation_pct;
        assert_eq!(deviation_text(300.0, 100.0, &q), "large 200.0% above average");
        assert_eq!(deviation_text(40.0, 100.0, &q), "significant 60.0% below average");
        assert_eq!(deviation_text(125.0, 100.0, &q), "noticeable 25.0% above average");
        assert_eq!(deviation_text(110.0, 100.0, &q), "10.0% above average");
        assert_eq!(deviation_text(100.0, 100.0, &q), "0.0% below average");
        assert_eq!(deviation_text(5.0, 0.0, &q), "baseline is zero");
    }
}
