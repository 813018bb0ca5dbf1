/// Consumption state of a single-use sequence (a part stream or a streamed
/// entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumptionState {
    /// Nothing has been pulled yet.
    #[default]
    NotStarted,

    /// At least one item has been pulled; the end was not reached.
    InProgress,

    /// The end (or a terminal error) was observed. Further reads fail.
    Exhausted,
}

impl ConsumptionState {
    /// Whether items may still be pulled.
    pub fn is_readable(self) -> bool {
        !matches!(self, ConsumptionState::Exhausted)
    }

    /// Whether anything has been pulled.
    pub fn is_started(self) -> bool {
        !matches!(self, ConsumptionState::NotStarted)
    }
}
