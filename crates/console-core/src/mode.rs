//! Calling modes and typed per-mode records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;

/// The calling mode an agent is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Guest-facing calls: reservations, menu questions.
    Customer,
    /// Internal calls: inventory, staffing, kitchen.
    Operations,
    /// Business calls: catering, partnerships.
    Sales,
}

impl Mode {
    /// Every mode, in display order.
    pub const ALL: [Mode; 3] = [Mode::Customer, Mode::Operations, Mode::Sales];

    /// Lowercase identifier used in URLs and stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Customer => "customer",
            Mode::Operations => "operations",
            Mode::Sales => "sales",
        }
    }

    /// Capitalized name for user-facing text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Customer => "Customer",
            Mode::Operations => "Operations",
            Mode::Sales => "Sales",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(Mode::Customer),
            "operations" => Ok(Mode::Operations),
            "sales" => Ok(Mode::Sales),
            other => Err(ConsoleError::Validation(format!(
                "unknown mode '{}'; expected customer, operations or sales",
                other
            ))),
        }
    }
}

/// One value per mode, stored as a plain struct so lookups cannot miss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ModeTable<T> {
    pub customer: T,
    pub operations: T,
    pub sales: T,
}

impl<T> ModeTable<T> {
    /// Borrow the value for a mode.
    pub fn get(&self, mode: Mode) -> &T {
        match mode {
            Mode::Customer => &self.customer,
            Mode::Operations => &self.operations,
            Mode::Sales => &self.sales,
        }
    }

    /// Mutably borrow the value for a mode.
    pub fn get_mut(&mut self, mode: Mode) -> &mut T {
        match mode {
            Mode::Customer => &mut self.customer,
            Mode::Operations => &mut self.operations,
            Mode::Sales => &mut self.sales,
        }
    }

    /// Iterate over `(mode, value)` pairs in [`Mode::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Mode, &T)> {
        Mode::ALL.into_iter().map(move |mode| (mode, self.get(mode)))
    }
}

/// Scalar settings stored per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeField {
    BotName,
    Tone,
    Model,
    BeginMessage,
    CallTransferNumber,
    GeneralPrompt,
}

impl ModeField {
    /// Key of this field inside a mode's stored record.
    pub fn key(&self) -> &'static str {
        match self {
            ModeField::BotName => "bot_name",
            ModeField::Tone => "tone",
            ModeField::Model => "model",
            ModeField::BeginMessage => "begin_message",
            ModeField::CallTransferNumber => "call_transfer_number",
            ModeField::GeneralPrompt => "general_prompt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(" Sales ".parse::<Mode>().unwrap(), Mode::Sales);
        assert!(matches!(
            "catering".parse::<Mode>(),
            Err(ConsoleError::Validation(_))
        ));
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Operations).unwrap(), "\"operations\"");
    }

    #[test]
    fn test_mode_table_lookup() {
        let mut table: ModeTable<u32> = ModeTable::default();
        *table.get_mut(Mode::Sales) = 7;

        assert_eq!(*table.get(Mode::Sales), 7);
        assert_eq!(*table.get(Mode::Customer), 0);
        let modes: Vec<Mode> = table.iter().map(|(mode, _)| mode).collect();
        assert_eq!(modes, Mode::ALL.to_vec());
    }

    #[test]
    fn test_mode_table_missing_entries_default() {
        let table: ModeTable<Option<String>> =
            serde_json::from_str(r#"{"sales": "x"}"#).unwrap();
        assert_eq!(table.sales.as_deref(), Some("x"));
        assert!(table.customer.is_none());
    }
}
