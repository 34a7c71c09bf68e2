//! Detector class table and the vehicle subset

use serde::{Deserialize, Serialize};

/// The 80 COCO categories in model output order
const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorbike", "aeroplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "sofa",
    "pottedplant", "bed", "diningtable", "toilet", "tvmonitor", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Custom categories appended after COCO
const EMERGENCY_CLASSES: [&str; 2] = ["ambulance", "fire engine"];

/// Vehicle categories counted toward traffic volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    Car,
    Motorbike,
    Bus,
    Truck,
    Ambulance,
    FireEngine,
}

impl VehicleClass {
    /// All vehicle classes in reporting order
    pub const ALL: [VehicleClass; 6] = [
        VehicleClass::Car,
        VehicleClass::Motorbike,
        VehicleClass::Bus,
        VehicleClass::Truck,
        VehicleClass::Ambulance,
        VehicleClass::FireEngine,
    ];

    /// Class table label
    pub fn label(&self) -> &'static str {
        match self {
            VehicleClass::Car => "car",
            VehicleClass::Motorbike => "motorbike",
            VehicleClass::Bus => "bus",
            VehicleClass::Truck => "truck",
            VehicleClass::Ambulance => "ambulance",
            VehicleClass::FireEngine => "fire engine",
        }
    }

    /// Look up a vehicle class by its label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.label() == label)
    }

    /// Emergency vehicles trigger the priority flag
    pub fn is_emergency(&self) -> bool {
        matches!(self, VehicleClass::Ambulance | VehicleClass::FireEngine)
    }

    /// Position in [`VehicleClass::ALL`]
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

/// Ordered class names indexed by model class id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTable {
    names: Vec<String>,
    /// Vehicle class per table index, resolved once
    vehicles: Vec<Option<VehicleClass>>,
}

impl ClassTable {
    /// Build a table from explicit names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let vehicles = names.iter().map(|n| VehicleClass::from_label(n)).collect();
        Self { names, vehicles }
    }

    /// COCO categories followed by the emergency vehicle categories
    pub fn coco_with_emergency() -> Self {
        Self::new(COCO_CLASSES.iter().chain(EMERGENCY_CLASSES.iter()).copied())
    }

    /// Number of known classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name for a class id, `None` when outside the table
    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Vehicle class for a class id, `None` for non-vehicles and unknown ids
    pub fn vehicle(&self, class_id: usize) -> Option<VehicleClass> {
        self.vehicles.get(class_id).copied().flatten()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::coco_with_emergency()
    }
}
