// Safe operating range domain model and dynamic band derivation
use super::tank::StaticBand;

/// Where a band came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeSource {
    /// Preset band, unmodified
    Static,
    /// Derived from the 7-day baseline
    Dynamic { mean: f64, samples: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeBand {
    pub param: String,
    pub min: f64,
    pub max: f64,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub unit: String,
    pub source: RangeSource,
}

impl RangeBand {
    pub fn from_static(param: &str, band: &StaticBand) -> Self {
        Self {
            param: param.to_string(),
            min: band.min,
            max: band.max,
            ideal_min: band.ideal_min,
            ideal_max: band.ideal_max,
            unit: band.unit.clone(),
            source: RangeSource::Static,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.source, RangeSource::Dynamic { .. })
    }

    pub fn mean(&self) -> Option<f64> {
        match self.source {
            RangeSource::Dynamic { mean, .. } => Some(mean),
            RangeSource::Static => None,
        }
    }

    pub fn samples(&self) -> usize {
        match self.source {
            RangeSource::Dynamic { samples, .. } => samples,
            RangeSource::Static => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum IdealTolerance {
    /// Half-width in the parameter's own unit
    Offset(f64),
    /// Half-width as a fraction of the mean
    Fraction(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AbsoluteBounds {
    /// Hard limits independent of the baseline
    Fixed { min: f64, max: f64 },
    /// Multiples of the mean, never below zero
    Scaled { low: f64, high: f64 },
}

/// How a parameter's band follows its own baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicRule {
    ideal: IdealTolerance,
    bounds: AbsoluteBounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedBounds {
    pub min: f64,
    pub max: f64,
    pub ideal_min: f64,
    pub ideal_max: f64,
}

const RELATIVE_20: DynamicRule = DynamicRule {
    ideal: IdealTolerance::Fraction(0.20),
    bounds: AbsoluteBounds::Scaled { low: 0.5, high: 1.5 },
};

impl DynamicRule {
    /// Parameters without a rule keep their preset band.
    pub fn for_param(param: &str) -> Option<Self> {
        match param {
            "ph" => Some(DynamicRule {
                ideal: IdealTolerance::Offset(0.5),
                bounds: AbsoluteBounds::Fixed { min: 6.5, max: 8.5 },
            }),
            "ec" | "tds" | "salinity" => Some(RELATIVE_20),
            "orp" => Some(DynamicRule {
                ideal: IdealTolerance::Fraction(0.15),
                bounds: AbsoluteBounds::Scaled { low: 0.7, high: 1.3 },
            }),
            _ => None,
        }
    }

    /// Bounds around `mean`, or `None` when the mean cannot anchor a valid band
    /// (outside fixed limits, or negative for scaled rules).
    pub fn apply(&self, mean: f64) -> Option<DerivedBounds> {
        if !mean.is_finite() {
            return None;
        }

        let (ideal_min, ideal_max) = match self.ideal {
            IdealTolerance::Offset(half) => (mean - half, mean + half),
            IdealTolerance::Fraction(frac) => (mean * (1.0 - frac), mean * (1.0 + frac)),
        };

        match self.bounds {
            AbsoluteBounds::Fixed { min, max } => {
                if mean < min || mean > max {
                    return None;
                }
                Some(DerivedBounds {
                    min,
                    max,
                    ideal_min: ideal_min.max(min),
                    ideal_max: ideal_max.min(max),
                })
            }
            AbsoluteBounds::Scaled { low, high } => {
                if mean < 0.0 {
                    return None;
                }
                Some(DerivedBounds {
                    min: (mean * low).max(0.0),
                    max: mean * high,
                    ideal_min,
                    ideal_max,
                })
            }
        }
    }
}

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Band for `param` given its preset band and the 7-day samples.
/// Pure: identical inputs always give identical bands.
pub fn derive_band(param: &str, preset: &StaticBand, samples: &[f64]) -> RangeBand {
    let static_band = RangeBand::from_static(param, preset);

    let Some(rule) = DynamicRule::for_param(param) else {
        return static_band;
    };
    let Some(mean) = mean(samples) else {
        return static_band;
    };
    let Some(bounds) = rule.apply(mean) else {
        return static_band;
    };

    RangeBand {
        min: bounds.min,
        max: bounds.max,
        ideal_min: bounds.ideal_min,
        ideal_max: bounds.ideal_max,
        source: RangeSource::Dynamic {
            mean,
            samples: samples.len(),
        },
        ..static_band
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn band(min: f64, max: f64, ideal_min: f64, ideal_max: f64, unit: &str) -> StaticBand {
        StaticBand {
            min,
            max,
            ideal_min,
            ideal_max,
            unit: unit.to_string(),
        }
    }

    fn assert_band_invariants(b: &RangeBand) {
        let mean = b.mean().unwrap();
        assert!(b.min <= b.ideal_min + EPS, "{:?}", b);
        assert!(b.ideal_min <= mean + EPS, "{:?}", b);
        assert!(mean <= b.ideal_max + EPS, "{:?}", b);
        assert!(b.ideal_max <= b.max + EPS, "{:?}", b);
    }

    #[test]
    fn test_ph_band_from_baseline() {
        let preset = band(6.0, 8.0, 6.8, 7.5, "");
        let result = derive_band("ph", &preset, &[7.0, 7.1, 7.2, 7.3]);

        assert!(result.is_dynamic());
        assert!((result.mean().unwrap() - 7.15).abs() < EPS);
        assert_eq!(result.samples(), 4);
        assert_eq!(result.min, 6.5);
        assert_eq!(result.max, 8.5);
        assert!((result.ideal_min - 6.65).abs() < EPS);
        assert!((result.ideal_max - 7.65).abs() < EPS);
        assert_band_invariants(&result);
    }

    #[test]
    fn test_ph_ideal_clamped_to_physiological_bounds() {
        let preset = band(6.0, 8.0, 6.8, 7.5, "");
        let result = derive_band("ph", &preset, &[6.6, 6.7]);

        assert!(result.is_dynamic());
        assert_eq!(result.ideal_min, 6.5);
        assert!((result.ideal_max - 7.15).abs() < EPS);
        assert_band_invariants(&result);
    }

    #[test]
    fn test_ph_mean_outside_bounds_keeps_static() {
        let preset = band(7.6, 8.6, 8.0, 8.4, "");
        let result = derive_band("ph", &preset, &[8.9, 9.1]);
        assert_eq!(result, RangeBand::from_static("ph", &preset));
    }

    #[test]
    fn test_ec_relative_band() {
        let preset = band(100.0, 800.0, 200.0, 500.0, "µS/cm");
        let result = derive_band("ec", &preset, &[400.0, 600.0]);

        assert_eq!(result.mean(), Some(500.0));
        assert!((result.ideal_min - 400.0).abs() < EPS);
        assert!((result.ideal_max - 600.0).abs() < EPS);
        assert!((result.min - 250.0).abs() < EPS);
        assert!((result.max - 750.0).abs() < EPS);
        assert_eq!(result.unit, "µS/cm");
        assert_band_invariants(&result);
    }

    #[test]
    fn test_tds_and_salinity_share_ec_shape() {
        let preset = band(0.0, 1000.0, 100.0, 300.0, "ppm");
        let tds = derive_band("tds", &preset, &[200.0]);
        let salinity = derive_band("salinity", &preset, &[200.0]);
        assert_eq!(
            (tds.min, tds.ideal_min, tds.ideal_max, tds.max),
            (salinity.min, salinity.ideal_min, salinity.ideal_max, salinity.max)
        );
        assert!((tds.max - 300.0).abs() < EPS);
    }

    #[test]
    fn test_orp_relative_band() {
        let preset = band(150.0, 450.0, 250.0, 400.0, "mV");
        let result = derive_band("orp", &preset, &[300.0, 300.0, 300.0]);

        assert!((result.ideal_min - 255.0).abs() < EPS);
        assert!((result.ideal_max - 345.0).abs() < EPS);
        assert!((result.min - 210.0).abs() < EPS);
        assert!((result.max - 390.0).abs() < EPS);
        assert_band_invariants(&result);
    }

    #[test]
    fn test_negative_orp_mean_keeps_static() {
        let preset = band(150.0, 450.0, 250.0, 400.0, "mV");
        let result = derive_band("orp", &preset, &[-50.0, -40.0]);
        assert!(!result.is_dynamic());
    }

    #[test]
    fn test_zero_mean_floors_at_zero() {
        let preset = band(0.0, 1000.0, 100.0, 300.0, "ppm");
        let result = derive_band("tds", &preset, &[0.0, 0.0]);
        assert!(result.is_dynamic());
        assert_eq!((result.min, result.ideal_min, result.ideal_max, result.max), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_samples_keeps_static() {
        let preset = band(100.0, 800.0, 200.0, 500.0, "µS/cm");
        let result = derive_band("ec", &preset, &[]);
        assert_eq!(result.source, RangeSource::Static);
        assert_eq!(result.mean(), None);
        assert_eq!(result.ideal_min, 200.0);
    }

    #[test]
    fn test_param_without_rule_keeps_static() {
        let preset = band(22.0, 30.0, 24.0, 27.0, "°C");
        let result = derive_band("temperature", &preset, &[25.0, 25.5]);
        assert_eq!(result, RangeBand::from_static("temperature", &preset));
        assert!(DynamicRule::for_param("sg").is_none());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let preset = band(100.0, 800.0, 200.0, 500.0, "µS/cm");
        let samples = [312.0, 318.5, 320.25, 309.0];
        assert_eq!(
            derive_band("ec", &preset, &samples),
            derive_band("ec", &preset, &samples)
        );
    }

    #[test]
    fn test_invariants_hold_across_baselines() {
        let preset = band(0.0, 1.0, 0.0, 1.0, "");
        for param in ["ph", "ec", "tds", "salinity", "orp"] {
            for base in [0.0, 0.5, 6.5, 7.0, 8.49, 8.5, 42.0, 350.0, 12000.0] {
                let samples = [base * 0.98, base, base * 1.02];
                let result = derive_band(param, &preset, &samples);
                if result.is_dynamic() {
                    assert_band_invariants(&result);
                }
            }
        }
    }
}
