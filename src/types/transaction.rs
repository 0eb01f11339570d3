//! Transaction records screened for money laundering

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    CashIn,
    Transfer,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CashIn => "cash-in",
            ActionType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash-in" | "cashin" | "cash_in" => Ok(ActionType::CashIn),
            "transfer" => Ok(ActionType::Transfer),
            other => Err(InputError::UnknownVariant {
                kind: "action type",
                value: other.to_string(),
            }),
        }
    }
}

/// Fraud pattern previously attached to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudType {
    Type1,
    Type2,
    Type3,
    None,
}

impl FraudType {
    pub const ALL: [FraudType; 4] = [
        FraudType::Type1,
        FraudType::Type2,
        FraudType::Type3,
        FraudType::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FraudType::Type1 => "type1",
            FraudType::Type2 => "type2",
            FraudType::Type3 => "type3",
            FraudType::None => "none",
        }
    }
}

impl fmt::Display for FraudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FraudType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FraudType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or(InputError::UnknownVariant {
                kind: "fraud type",
                value: lowered,
            })
    }
}

/// A single transaction as entered on the form or read from a batch file.
///
/// Field names match the CSV column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Originating account
    pub sourceid: u64,
    /// Receiving account
    pub destinationid: u64,
    /// Amount moved, whole currency units
    pub amountofmoney: u64,
    /// Calendar month (1-12)
    pub month: u8,
    pub typeofaction: ActionType,
    pub typeoffraud: FraudType,
}

impl Transaction {
    pub fn new(
        sourceid: u64,
        destinationid: u64,
        amountofmoney: u64,
        month: u8,
        typeofaction: ActionType,
        typeoffraud: FraudType,
    ) -> Self {
        Self {
            sourceid,
            destinationid,
            amountofmoney,
            month,
            typeofaction,
            typeoffraud,
        }
    }

    /// Check the same bounds the entry form enforces.
    pub fn validate(&self) -> Result<(), InputError> {
        let minimums = [
            ("sourceid", self.sourceid),
            ("destinationid", self.destinationid),
            ("amountofmoney", self.amountofmoney),
        ];
        for (field, value) in minimums {
            if value < 1 {
                return Err(InputError::BelowMinimum {
                    field,
                    min: 1,
                    value,
                });
            }
        }
        if !(1..=12).contains(&self.month) {
            return Err(InputError::MonthOutOfRange(self.month));
        }
        Ok(())
    }
}

impl Default for Transaction {
    /// Values pre-filled on the entry form
    fn default() -> Self {
        Self::new(44604, 7869, 59999, 3, ActionType::CashIn, FraudType::Type1)
    }
}

/// A transaction with its known outcome, used for training.
///
/// Kept flat rather than wrapping `Transaction` because the CSV reader
/// cannot deserialize flattened structs reliably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTransaction {
    pub sourceid: u64,
    pub destinationid: u64,
    pub amountofmoney: u64,
    pub month: u8,
    pub typeofaction: ActionType,
    pub typeoffraud: FraudType,
    /// 1 = fraudulent, 0 = legitimate
    pub isfraud: u8,
}

impl LabeledTransaction {
    pub fn from_parts(tx: &Transaction, is_fraud: bool) -> Self {
        Self {
            sourceid: tx.sourceid,
            destinationid: tx.destinationid,
            amountofmoney: tx.amountofmoney,
            month: tx.month,
            typeofaction: tx.typeofaction,
            typeoffraud: tx.typeoffraud,
            isfraud: u8::from(is_fraud),
        }
    }

    pub fn transaction(&self) -> Transaction {
        Transaction::new(
            self.sourceid,
            self.destinationid,
            self.amountofmoney,
            self.month,
            self.typeofaction,
            self.typeoffraud,
        )
    }

    pub fn is_fraud(&self) -> bool {
        self.isfraud != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults_are_valid() {
        let tx = Transaction::default();
        assert_eq!(tx.sourceid, 44604);
        assert_eq!(tx.destinationid, 7869);
        assert_eq!(tx.amountofmoney, 59999);
        assert_eq!(tx.month, 3);
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_fields() {
        let mut tx = Transaction::default();
        tx.month = 13;
        assert_eq!(tx.validate(), Err(InputError::MonthOutOfRange(13)));

        let mut tx = Transaction::default();
        tx.amountofmoney = 0;
        assert!(matches!(
            tx.validate(),
            Err(InputError::BelowMinimum { field: "amountofmoney", .. })
        ));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("cash-in".parse::<ActionType>().unwrap(), ActionType::CashIn);
        assert_eq!("Transfer".parse::<ActionType>().unwrap(), ActionType::Transfer);
        assert_eq!("type2".parse::<FraudType>().unwrap(), FraudType::Type2);
        assert_eq!("NONE".parse::<FraudType>().unwrap(), FraudType::None);
        assert!("wire".parse::<ActionType>().is_err());
        assert!("type9".parse::<FraudType>().is_err());
    }

    #[test]
    fn test_transaction_json_uses_column_names() {
        let json = serde_json::to_value(Transaction::default()).unwrap();
        assert_eq!(json["typeofaction"], "cash-in");
        assert_eq!(json["typeoffraud"], "type1");
        assert_eq!(json["amountofmoney"], 59999);
    }

    #[test]
    fn test_labeled_round_trips_transaction() {
        let tx = Transaction::new(1, 2, 300, 7, ActionType::Transfer, FraudType::None);
        let labeled = LabeledTransaction::from_parts(&tx, true);
        assert!(labeled.is_fraud());
        assert_eq!(labeled.transaction(), tx);
    }
}
