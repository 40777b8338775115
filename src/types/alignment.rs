/// One forecast paired with the observation it predicted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentRecord {
    /// Observation day number minus the forecast run's issuance day number.
    /// Positive when the forecast was issued before the observed date.
    pub lead_time_days: f64,
    /// Forecast value minus observed value.
    pub error: f64,
}

impl AlignmentRecord {
    pub fn new(lead_time_days: f64, error: f64) -> Self {
        Self {
            lead_time_days,
            error,
        }
    }

    /// Lead time on the "days before actual" axis, which runs from negative
    /// values up to zero.
    pub fn days_before_actual(&self) -> f64 {
        -self.lead_time_days
    }
}
