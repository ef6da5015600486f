//! Historical CSV tables for training
//!
//! Column names follow the historical farm datasets. Every needed column is
//! required and every cell must parse as a number; anything else aborts the
//! training run.

use crate::error::TrainingError;
use crate::models::{QuadrantReading, UdderSensors};
use crate::predictor::{disease_vector_from_parts, FeatureDeriver};
use std::collections::HashMap;
use std::path::Path;

pub const YIELD_FEED: &str = "Feed_kg";
pub const YIELD_TEMPERATURE: &str = "Temp_C";
pub const YIELD_HUMIDITY: &str = "Humidity";
pub const YIELD_MILKING_TIME: &str = "Milking_Time_min";
pub const YIELD_TARGET: &str = "Milk_Liters";

pub const DISEASE_MONTHS: &str = "Months after giving birth";
pub const DISEASE_PREVIOUS: &str = "Previous_Mastits_status";
pub const DISEASE_TEMPERATURE: &str = "Temperature";
pub const DISEASE_SENSORS: [&str; 8] = ["IUFL", "EUFL", "IUFR", "EUFR", "IURL", "EURL", "IURR", "EURR"];
pub const DISEASE_TARGET: &str = "class1";

/// Feature rows with their targets
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the yield table and derive `[feed_kg, milking_time_min, temp_humidity_ratio]`
pub fn load_yield(path: &Path) -> Result<Dataset, TrainingError> {
    let columns = [
        YIELD_FEED,
        YIELD_TEMPERATURE,
        YIELD_HUMIDITY,
        YIELD_MILKING_TIME,
        YIELD_TARGET,
    ];
    let table = read_columns(path, &columns)?;

    let mut dataset = Dataset {
        rows: Vec::with_capacity(table.len()),
        targets: Vec::with_capacity(table.len()),
    };
    for record in table {
        let [feed, temp, humidity, milking, liters] = [0, 1, 2, 3, 4].map(|i| record[i]);
        dataset.rows.push(vec![
            feed,
            milking,
            FeatureDeriver::temp_humidity_ratio(temp, humidity),
        ]);
        dataset.targets.push(liters);
    }
    Ok(dataset)
}

/// Load the clinical table and derive the full disease feature vector
pub fn load_disease(path: &Path) -> Result<Dataset, TrainingError> {
    let mut columns = vec![DISEASE_TEMPERATURE, DISEASE_PREVIOUS, DISEASE_MONTHS];
    columns.extend_from_slice(&DISEASE_SENSORS);
    columns.push(DISEASE_TARGET);
    let table = read_columns(path, &columns)?;

    let mut dataset = Dataset {
        rows: Vec::with_capacity(table.len()),
        targets: Vec::with_capacity(table.len()),
    };
    for (i, record) in table.into_iter().enumerate() {
        let label = record[11];
        if label != 0.0 && label != 1.0 {
            return Err(TrainingError::InvalidLabel {
                row: i + 1,
                value: label,
            });
        }
        let s = &record[3..11];
        let sensors = UdderSensors {
            front_left: QuadrantReading::new(s[0], s[1]),
            front_right: QuadrantReading::new(s[2], s[3]),
            rear_left: QuadrantReading::new(s[4], s[5]),
            rear_right: QuadrantReading::new(s[6], s[7]),
        };
        dataset
            .rows
            .push(disease_vector_from_parts(record[0], record[1] != 0.0, record[2], &sensors));
        dataset.targets.push(label);
    }
    Ok(dataset)
}

/// Read the named numeric columns, in the order given, for every record
fn read_columns(path: &Path, columns: &[&str]) -> Result<Vec<Vec<f64>>, TrainingError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| TrainingError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_string(), i))
        .collect();
    let indices = columns
        .iter()
        .map(|name| {
            headers
                .get(*name)
                .copied()
                .ok_or_else(|| TrainingError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let values = indices
            .iter()
            .zip(columns)
            .map(|(&idx, name)| {
                let raw = record.get(idx).unwrap_or("");
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| TrainingError::Parse {
                        row: i + 1,
                        column: name.to_string(),
                        value: raw.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        table.push(values);
    }

    if table.is_empty() {
        return Err(TrainingError::EmptyDataset(path.to_path_buf()));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_yield_derives_ratio() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "milk.csv",
            "Cow_ID,Feed_kg,Temp_C,Humidity,Milking_Time_min,Milk_Liters\n\
             C1,12,25,60,15,21.5\n\
             C2,10,30,49,12,18.0\n",
        );
        let data = load_yield(&path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows[0][0], 12.0);
        assert_eq!(data.rows[0][1], 15.0);
        assert!((data.rows[0][2] - 25.0 / 61.0).abs() < 1e-12);
        assert_eq!(data.targets, vec![21.5, 18.0]);
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "milk.csv", "Feed_kg,Temp_C,Humidity,Milk_Liters\n1,2,3,4\n");
        let err = load_yield(&path).unwrap_err();
        assert!(matches!(err, TrainingError::MissingColumn { ref column, .. } if column == "Milking_Time_min"));
    }

    #[test]
    fn test_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "milk.csv", "Feed_kg,Temp_C,Humidity,Milking_Time_min,Milk_Liters\n");
        assert!(matches!(load_yield(&path).unwrap_err(), TrainingError::EmptyDataset(_)));
    }

    #[test]
    fn test_non_numeric_cell() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "milk.csv",
            "Feed_kg,Temp_C,Humidity,Milking_Time_min,Milk_Liters\n1,2,3,4,5\n1,hot,3,4,5\n",
        );
        let err = load_yield(&path).unwrap_err();
        assert!(matches!(err, TrainingError::Parse { row: 2, ref column, .. } if column == "Temp_C"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_yield(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, TrainingError::Open { .. }));
    }

    #[test]
    fn test_load_disease() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "mastitis.csv",
            "Cow_ID,Day,Breed,Months after giving birth,Previous_Mastits_status,IUFL,EUFL,IUFR,EUFR,IURL,EURL,IURR,EURR,Temperature,Hardness,Pain,Milk_visibility,class1\n\
             A,1,Jersey,2,1,0.8,0.4,0.5,0.5,0.5,0.5,0.5,0.5,39.6,1,1,1,1\n\
             B,1,Jersey,8,0,0.5,0.5,0.5,0.5,0.5,0.5,0.5,0.5,38.0,0,0,0,0\n",
        );
        let data = load_disease(&path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows[0].len(), crate::predictor::DISEASE_FEATURES.len());
        assert_eq!(data.rows[0][0], 39.6);
        assert_eq!(data.rows[0][1], 1.0);
        assert_eq!(data.rows[0][2], 2.0);
        assert!((data.rows[0][15] - 0.4).abs() < 1e-12);
        assert_eq!(data.targets, vec![1.0, 0.0]);
    }

    #[test]
    fn test_disease_label_must_be_binary() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "mastitis.csv",
            "Months after giving birth,Previous_Mastits_status,IUFL,EUFL,IUFR,EUFR,IURL,EURL,IURR,EURR,Temperature,class1\n\
             2,1,0.8,0.4,0.5,0.5,0.5,0.5,0.5,0.5,39.6,2\n",
        );
        assert!(matches!(
            load_disease(&path).unwrap_err(),
            TrainingError::InvalidLabel { row: 1, .. }
        ));
    }
}
