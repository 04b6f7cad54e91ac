pub const MILES_PER_KILOMETER: f64 = 0.621371;

pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KILOMETER
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Miles,
    Kilometers,
}

impl Unit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "miles" => Some(Self::Miles),
            "kilometers" => Some(Self::Kilometers),
            _ => None,
        }
    }

    pub fn to_miles(self, distance: f64) -> f64 {
        match self {
            Self::Miles => distance,
            Self::Kilometers => km_to_miles(distance),
        }
    }
}
