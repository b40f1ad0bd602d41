use crate::config::HeatThresholds;
use crate::model::{HeatLevel, HeatmapEntry, MatrixData};

/// Bucket a load rate. Every rate maps to exactly one level; rates at or below zero are empty.
pub fn classify_heat(load_rate: f64, thresholds: &HeatThresholds) -> HeatLevel {
    if load_rate <= 0.0 || load_rate.is_nan() {
        HeatLevel::Empty
    } else if load_rate < thresholds.low {
        HeatLevel::Low
    } else if load_rate < thresholds.normal {
        HeatLevel::Normal
    } else if load_rate < thresholds.high {
        HeatLevel::High
    } else {
        HeatLevel::Overload
    }
}

/// Heat level of every cell, in lane then checkpoint order
pub fn build_heatmap(matrix: &MatrixData, thresholds: &HeatThresholds) -> Vec<HeatmapEntry> {
    let mut entries = Vec::with_capacity(matrix.cells.len());
    for lane in &matrix.lanes {
        for checkpoint in &matrix.checkpoints {
            if let Some(cell) = matrix.cell(&lane.id, &checkpoint.id) {
                entries.push(HeatmapEntry {
                    lane_id: lane.id.clone(),
                    checkpoint_id: checkpoint.id.clone(),
                    load_rate: cell.load_rate,
                    level: classify_heat(cell.load_rate, thresholds),
                });
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        let thresholds = HeatThresholds::default();
        assert_eq!(classify_heat(0.0, &thresholds), HeatLevel::Empty);
        assert_eq!(classify_heat(0.29, &thresholds), HeatLevel::Low);
        assert_eq!(classify_heat(0.3, &thresholds), HeatLevel::Normal);
        assert_eq!(classify_heat(0.59, &thresholds), HeatLevel::Normal);
        assert_eq!(classify_heat(0.6, &thresholds), HeatLevel::High);
        assert_eq!(classify_heat(0.85, &thresholds), HeatLevel::Overload);
        assert_eq!(classify_heat(1.0, &thresholds), HeatLevel::Overload);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = HeatThresholds {
            low: 0.1,
            normal: 0.2,
            high: 0.3,
        };
        assert_eq!(classify_heat(0.15, &thresholds), HeatLevel::Normal);
        assert_eq!(classify_heat(0.5, &thresholds), HeatLevel::Overload);
    }
}
