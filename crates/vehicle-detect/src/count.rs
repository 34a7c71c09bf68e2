//! Per-frame vehicle counting

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classes::{ClassTable, VehicleClass};
use crate::detector::DetectionResult;

/// Vehicle counts for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCount {
    /// Counter per class, indexed like [`VehicleClass::ALL`]
    counts: [u32; 6],
}

impl VehicleCount {
    /// Count for one class
    pub fn get(&self, class: VehicleClass) -> u32 {
        self.counts[class.index()]
    }

    /// Add one vehicle of `class`
    pub fn increment(&mut self, class: VehicleClass) {
        self.counts[class.index()] += 1;
    }

    /// Sum over every vehicle class
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// True when an ambulance or fire engine is in view
    pub fn emergency_detected(&self) -> bool {
        VehicleClass::ALL
            .iter()
            .any(|class| class.is_emergency() && self.get(*class) > 0)
    }

    /// `(class, count)` pairs in reporting order, zero counts included
    pub fn iter(&self) -> impl Iterator<Item = (VehicleClass, u32)> + '_ {
        VehicleClass::ALL.into_iter().map(|class| (class, self.get(class)))
    }
}

impl FromIterator<(VehicleClass, u32)> for VehicleCount {
    fn from_iter<I: IntoIterator<Item = (VehicleClass, u32)>>(iter: I) -> Self {
        let mut count = VehicleCount::default();
        for (class, n) in iter {
            count.counts[class.index()] += n;
        }
        count
    }
}

/// Count vehicles among one frame's detections.
///
/// A detection counts when its best class is a vehicle and its score is
/// strictly above `threshold`. Class ids outside `classes` are skipped.
pub fn count_vehicles<I>(detections: I, classes: &ClassTable, threshold: f32) -> VehicleCount
where
    I: IntoIterator<Item = DetectionResult>,
{
    let mut count = VehicleCount::default();

    for detection in detections {
        let Some((class_id, confidence)) = detection.best_class() else {
            continue;
        };

        if class_id >= classes.len() {
            debug!("Skipping detection with unknown class id {}", class_id);
            continue;
        }

        if confidence <= threshold {
            continue;
        }

        if let Some(vehicle) = classes.vehicle(class_id) {
            count.increment(vehicle);
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Scores vector with `score` at `class_id` and zero elsewhere
    fn one_hot(len: usize, class_id: usize, score: f32) -> DetectionResult {
        let mut scores = vec![0.0; len];
        scores[class_id] = score;
        DetectionResult::new(scores)
    }

    #[test]
    fn test_counts_vehicles_above_threshold() {
        let table = ClassTable::default();
        let detections = vec![
            one_hot(82, 2, 0.9),  // car
            one_hot(82, 2, 0.51), // car
            one_hot(82, 3, 0.7),  // motorbike
            one_hot(82, 7, 0.5),  // truck, not above threshold
            one_hot(82, 0, 0.99), // person
        ];

        let count = count_vehicles(detections, &table, 0.5);
        assert_eq!(count.get(VehicleClass::Car), 2);
        assert_eq!(count.get(VehicleClass::Motorbike), 1);
        assert_eq!(count.get(VehicleClass::Truck), 0);
        assert_eq!(count.total(), 3);
        assert!(!count.emergency_detected());
    }

    #[test]
    fn test_every_class_present_when_empty() {
        let count = count_vehicles(Vec::new(), &ClassTable::default(), 0.5);
        assert_eq!(count.iter().count(), 6);
        assert!(count.iter().all(|(_, n)| n == 0));
        assert!(!count.emergency_detected());
    }

    #[test]
    fn test_emergency_flag() {
        let table = ClassTable::default();
        let ambulance = count_vehicles(vec![one_hot(82, 80, 0.8)], &table, 0.5);
        assert!(ambulance.emergency_detected());
        assert_eq!(ambulance.get(VehicleClass::Ambulance), 1);

        let fire = count_vehicles(vec![one_hot(82, 81, 0.8)], &table, 0.5);
        assert!(fire.emergency_detected());
    }

    #[test]
    fn test_out_of_table_class_is_skipped() {
        let table = ClassTable::default();
        // A model with more outputs than the table knows about
        let detections = vec![one_hot(90, 85, 0.95), one_hot(90, 2, 0.95)];
        let count = count_vehicles(detections, &table, 0.5);
        assert_eq!(count.total(), 1);
    }

    #[test]
    fn test_empty_scores_are_skipped() {
        let count = count_vehicles(
            vec![DetectionResult::new(Vec::new())],
            &ClassTable::default(),
            0.5,
        );
        assert_eq!(count.total(), 0);
    }

    #[test]
    fn test_count_from_pairs() {
        let count: VehicleCount = [(VehicleClass::Bus, 2), (VehicleClass::FireEngine, 1)]
            .into_iter()
            .collect();
        assert_eq!(count.get(VehicleClass::Bus), 2);
        assert_eq!(count.total(), 3);
        assert!(count.emergency_detected());
    }

    proptest! {
        #[test]
        fn prop_total_matches_qualifying_detections(
            picks in prop::collection::vec((0usize..82, 0.0f32..1.0), 0..64)
        ) {
            let table = ClassTable::default();
            let detections: Vec<_> = picks
                .iter()
                .map(|&(class_id, score)| one_hot(82, class_id, score))
                .collect();

            let expected = picks
                .iter()
                .filter(|&&(class_id, score)| score > 0.5 && table.vehicle(class_id).is_some())
                .count() as u32;

            let count = count_vehicles(detections, &table, 0.5);
            prop_assert_eq!(count.total(), expected);
        }

        #[test]
        fn prop_emergency_iff_ambulance_or_fire_engine(counts in prop::array::uniform6(0u32..4)) {
            let count: VehicleCount = VehicleClass::ALL.into_iter().zip(counts).collect();
            let expected = count.get(VehicleClass::Ambulance) > 0
                || count.get(VehicleClass::FireEngine) > 0;
            prop_assert_eq!(count.emergency_detected(), expected);
        }
    }
}
