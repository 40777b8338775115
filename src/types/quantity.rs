use std::fmt;

/// A measured weather quantity, named after its CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    MaximumTemperature,
    MinimumTemperature,
    Precipitation,
    RelativeHumidity,
    /// Only present in hourly tables.
    Temperature,
}

impl Quantity {
    pub const ALL: [Quantity; 5] = [
        Quantity::MaximumTemperature,
        Quantity::MinimumTemperature,
        Quantity::Precipitation,
        Quantity::RelativeHumidity,
        Quantity::Temperature,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Quantity::MaximumTemperature => "Maximum Temperature",
            Quantity::MinimumTemperature => "Minimum Temperature",
            Quantity::Precipitation => "Precipitation",
            Quantity::RelativeHumidity => "Relative Humidity",
            Quantity::Temperature => "Temperature",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
