//! Feature derivation for the yield and mastitis models
//!
//! Turns raw observations into the engineered feature vectors shared by the
//! heuristic predictors, the trainer and the trained pipelines. The trainer
//! and the registry both rely on the column order defined here.

use crate::models::{DiseaseObservation, UdderSensors, YieldObservation};

/// Smoothing constant in the temperature/humidity ratio denominator
pub const HUMIDITY_SMOOTHING: f64 = 1.0;

/// Column names of the yield feature vector
pub const YIELD_FEATURES: [&str; 3] = ["feed_kg", "milking_time_min", "temp_humidity_ratio"];

/// Column names of the disease feature vector
pub const DISEASE_FEATURES: [&str; 17] = [
    "temperature_c",
    "previous_mastitis",
    "months_after_birth",
    "iufl",
    "eufl",
    "iufr",
    "eufr",
    "iurl",
    "eurl",
    "iurr",
    "eurr",
    "diff_fl",
    "diff_fr",
    "diff_rl",
    "diff_rr",
    "max_abs_diff",
    "avg_all_sensors",
];

/// Engineered yield features
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldFeatures {
    pub feed_kg: f64,
    pub milking_time_min: f64,
    pub temp_humidity_ratio: f64,
}

impl YieldFeatures {
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.feed_kg, self.milking_time_min, self.temp_humidity_ratio]
    }
}

/// Inflammation-asymmetry indicators derived from the udder sensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UdderFeatures {
    pub diff_fl: f64,
    pub diff_fr: f64,
    pub diff_rl: f64,
    pub diff_rr: f64,
    pub max_abs_diff: f64,
    pub avg_all_sensors: f64,
}

/// Derives feature vectors from raw observations
pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn temp_humidity_ratio(temperature_c: f64, humidity_pct: f64) -> f64 {
        temperature_c / (humidity_pct + HUMIDITY_SMOOTHING)
    }

    pub fn yield_features(obs: &YieldObservation) -> YieldFeatures {
        YieldFeatures {
            feed_kg: obs.feed_kg,
            milking_time_min: obs.milking_time_min,
            temp_humidity_ratio: Self::temp_humidity_ratio(obs.temperature_c, obs.humidity_pct),
        }
    }

    pub fn udder_features(sensors: &UdderSensors) -> UdderFeatures {
        let [fl, fr, rl, rr] = sensors.quadrants().map(|q| q.internal - q.external);
        let max_abs_diff = [fl, fr, rl, rr]
            .iter()
            .map(|d| d.abs())
            .fold(0.0_f64, f64::max);
        let raw = sensors.raw();
        let avg_all_sensors = raw.iter().sum::<f64>() / raw.len() as f64;

        UdderFeatures {
            diff_fl: fl,
            diff_fr: fr,
            diff_rl: rl,
            diff_rr: rr,
            max_abs_diff,
            avg_all_sensors,
        }
    }

    /// Full disease feature vector in `DISEASE_FEATURES` order
    pub fn disease_vector(obs: &DiseaseObservation) -> Vec<f64> {
        disease_vector_from_parts(
            obs.temperature_c,
            obs.previous_mastitis,
            obs.months_after_birth as f64,
            &obs.sensors,
        )
    }
}

pub(crate) fn disease_vector_from_parts(
    temperature_c: f64,
    previous_mastitis: bool,
    months_after_birth: f64,
    sensors: &UdderSensors,
) -> Vec<f64> {
    let udder = FeatureDeriver::udder_features(sensors);
    let mut row = Vec::with_capacity(DISEASE_FEATURES.len());
    row.push(temperature_c);
    row.push(if previous_mastitis { 1.0 } else { 0.0 });
    row.push(months_after_birth);
    row.extend_from_slice(&sensors.raw());
    row.extend_from_slice(&[
        udder.diff_fl,
        udder.diff_fr,
        udder.diff_rl,
        udder.diff_rr,
        udder.max_abs_diff,
        udder.avg_all_sensors,
    ]);
    row
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Clip every column of `rows` into `[q1 - 1.5*IQR, q3 + 1.5*IQR]`
pub fn clip_outliers_iqr(rows: &mut [Vec<f64>]) {
    let Some(width) = rows.first().map(|r| r.len()) else {
        return;
    };
    for col in 0..width {
        let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        let q1 = quantile(&column, 0.25);
        let q3 = quantile(&column, 0.75);
        let iqr = q3 - q1;
        let (lower, upper) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        for row in rows.iter_mut() {
            row[col] = row[col].clamp(lower, upper);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuadrantReading;

    fn sensors(pairs: [(f64, f64); 4]) -> UdderSensors {
        UdderSensors {
            front_left: QuadrantReading::new(pairs[0].0, pairs[0].1),
            front_right: QuadrantReading::new(pairs[1].0, pairs[1].1),
            rear_left: QuadrantReading::new(pairs[2].0, pairs[2].1),
            rear_right: QuadrantReading::new(pairs[3].0, pairs[3].1),
        }
    }

    #[test]
    fn test_temp_humidity_ratio_keeps_smoothing_constant() {
        let ratio = FeatureDeriver::temp_humidity_ratio(25.0, 60.0);
        assert!((ratio - 25.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_temp_humidity_ratio_finite_for_non_negative_humidity() {
        for humidity in [0.0, 0.5, 1.0, 50.0, 100.0, 1e9] {
            for temp in [-40.0, 0.0, 25.0, 60.0] {
                let ratio = FeatureDeriver::temp_humidity_ratio(temp, humidity);
                assert!(ratio.is_finite(), "ratio not finite for {temp}/{humidity}");
            }
        }
    }

    #[test]
    fn test_udder_features() {
        let s = sensors([(0.8, 0.4), (0.5, 0.6), (0.3, 0.3), (0.2, 0.4)]);
        let f = FeatureDeriver::udder_features(&s);
        assert!((f.diff_fl - 0.4).abs() < 1e-12);
        assert!((f.diff_fr + 0.1).abs() < 1e-12);
        assert!(f.diff_rl.abs() < 1e-12);
        assert!((f.diff_rr + 0.2).abs() < 1e-12);
        assert!((f.max_abs_diff - 0.4).abs() < 1e-12);
        assert!((f.avg_all_sensors - 3.5 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_abs_diff_uses_negative_differentials() {
        let s = sensors([(0.1, 0.9), (0.5, 0.5), (0.5, 0.5), (0.5, 0.5)]);
        let f = FeatureDeriver::udder_features(&s);
        assert!((f.max_abs_diff - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_disease_vector_layout() {
        let obs = DiseaseObservation {
            cow_id: "COW001".to_string(),
            day: 3,
            months_after_birth: 2,
            previous_mastitis: true,
            temperature_c: 39.0,
            breed: "Holstein".to_string(),
            sensors: sensors([(0.8, 0.4), (0.5, 0.6), (0.3, 0.3), (0.2, 0.4)]),
        };
        let row = FeatureDeriver::disease_vector(&obs);
        assert_eq!(row.len(), DISEASE_FEATURES.len());
        assert_eq!(row[0], 39.0);
        assert_eq!(row[1], 1.0);
        assert_eq!(row[2], 2.0);
        assert_eq!(row[3], 0.8);
        assert_eq!(row[4], 0.4);
        assert!((row[15] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&values, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&values, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_clip_outliers_iqr() {
        let mut rows: Vec<Vec<f64>> = (1..=8).map(|v| vec![v as f64, 1.0]).collect();
        rows.push(vec![1000.0, 1.0]);
        clip_outliers_iqr(&mut rows);
        // q1 = 3, q3 = 7, upper fence = 13
        assert_eq!(rows[8][0], 13.0);
        assert_eq!(rows[0][0], 1.0);
        assert!(rows.iter().all(|r| r[1] == 1.0));
    }
}
