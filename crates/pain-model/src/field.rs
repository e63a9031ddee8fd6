//! Canonical field catalog.
//!
//! Every schema revision maps its own column synonyms onto this one set of
//! names; the field's [`FieldKind`] decides how its raw text is checked and
//! normalized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of the document a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldScope {
    /// Group header and payment-information batch (first record).
    Header,
    /// One credit-transfer transaction per record.
    Transaction,
}

/// Syntactic kind of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Date,
    DateTime,
    Amount,
    Count,
    Boolean,
    Currency,
    Country,
    Iban,
    Bic,
    Code,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Amount => "amount",
            FieldKind::Count => "count",
            FieldKind::Boolean => "boolean",
            FieldKind::Currency => "currency",
            FieldKind::Country => "country",
            FieldKind::Iban => "iban",
            FieldKind::Bic => "bic",
            FieldKind::Code => "code",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! canonical_fields {
    ($($variant:ident => ($name:literal, $scope:ident, $kind:ident)),+ $(,)?) => {
        /// Schema-version-independent name of a data element.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum CanonicalField {
            $($variant),+
        }

        impl CanonicalField {
            pub const ALL: &'static [CanonicalField] = &[$(CanonicalField::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(CanonicalField::$variant => $name),+
                }
            }

            pub fn scope(&self) -> FieldScope {
                match self {
                    $(CanonicalField::$variant => FieldScope::$scope),+
                }
            }

            pub fn kind(&self) -> FieldKind {
                match self {
                    $(CanonicalField::$variant => FieldKind::$kind),+
                }
            }
        }

        impl FromStr for CanonicalField {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(CanonicalField::$variant),)+
                    _ => Err(format!("unknown canonical field: {s}")),
                }
            }
        }
    };
}

canonical_fields! {
    MessageId => ("message_id", Header, Text),
    CreationDateTime => ("creation_date_time", Header, DateTime),
    DeclaredTransactionCount => ("declared_transaction_count", Header, Count),
    DeclaredControlSum => ("declared_control_sum", Header, Amount),
    InitiatorName => ("initiator_name", Header, Text),
    InitiatorStreetName => ("initiator_street_name", Header, Text),
    InitiatorBuildingNumber => ("initiator_building_number", Header, Text),
    InitiatorPostalCode => ("initiator_postal_code", Header, Text),
    InitiatorTownName => ("initiator_town_name", Header, Text),
    InitiatorCountry => ("initiator_country", Header, Country),
    PaymentInformationId => ("payment_information_id", Header, Text),
    PaymentMethod => ("payment_method", Header, Code),
    BatchBooking => ("batch_booking", Header, Boolean),
    ServiceLevelCode => ("service_level_code", Header, Code),
    RequestedExecutionDate => ("requested_execution_date", Header, Date),
    DebtorName => ("debtor_name", Header, Text),
    DebtorStreetName => ("debtor_street_name", Header, Text),
    DebtorBuildingNumber => ("debtor_building_number", Header, Text),
    DebtorPostalCode => ("debtor_postal_code", Header, Text),
    DebtorTownName => ("debtor_town_name", Header, Text),
    DebtorCountry => ("debtor_country", Header, Country),
    DebtorAccountIban => ("debtor_account_iban", Header, Iban),
    DebtorAgentBic => ("debtor_agent_bic", Header, Bic),
    DefaultChargeBearer => ("default_charge_bearer", Header, Code),
    DefaultCurrency => ("default_currency", Header, Currency),
    InstructionId => ("instruction_id", Transaction, Text),
    EndToEndId => ("end_to_end_id", Transaction, Text),
    Currency => ("currency", Transaction, Currency),
    Amount => ("amount", Transaction, Amount),
    ChargeBearer => ("charge_bearer", Transaction, Code),
    CreditorAgentBic => ("creditor_agent_bic", Transaction, Bic),
    CreditorName => ("creditor_name", Transaction, Text),
    CreditorStreetName => ("creditor_street_name", Transaction, Text),
    CreditorBuildingNumber => ("creditor_building_number", Transaction, Text),
    CreditorPostalCode => ("creditor_postal_code", Transaction, Text),
    CreditorTownName => ("creditor_town_name", Transaction, Text),
    CreditorCountry => ("creditor_country", Transaction, Country),
    CreditorAccountIban => ("creditor_account_iban", Transaction, Iban),
    PurposeCode => ("purpose_code", Transaction, Code),
    RemittanceReference => ("remittance_reference", Transaction, Text),
    RemittanceDate => ("remittance_date", Transaction, Date),
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
