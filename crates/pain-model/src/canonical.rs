//! Canonical header and transaction records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street_name: Option<String>,
    pub building_number: Option<String>,
    pub postal_code: Option<String>,
    pub town_name: Option<String>,
    pub country: Option<String>,
}

/// Name and address of an initiating party, debtor, or creditor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: Option<String>,
    pub address: PostalAddress,
}

/// Batch-level values shared by every transaction in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalHeader {
    pub message_id: String,
    /// Normalized ISO 8601 date-time; `None` means the caller's generation
    /// timestamp is used.
    pub creation_date_time: Option<String>,
    /// Count as stated by the source. Never copied into the document.
    pub declared_transaction_count: Option<usize>,
    /// Control sum as stated by the source. Never copied into the document.
    pub declared_control_sum: Option<Decimal>,
    pub initiator: Party,
    pub payment_information_id: String,
    pub payment_method: String,
    pub batch_booking: Option<bool>,
    pub service_level_code: Option<String>,
    pub requested_execution_date: NaiveDate,
    pub debtor: Party,
    pub debtor_account_iban: String,
    pub debtor_agent_bic: Option<String>,
    pub default_charge_bearer: Option<String>,
    pub default_currency: String,
}

impl CanonicalHeader {
    /// Text form of a header field, as it is emitted into the document.
    pub fn value(&self, field: CanonicalField) -> Option<String> {
        use CanonicalField as F;
        match field {
            F::MessageId => Some(self.message_id.clone()),
            F::CreationDateTime => self.creation_date_time.clone(),
            F::DeclaredTransactionCount => {
                self.declared_transaction_count.map(|count| count.to_string())
            }
            F::DeclaredControlSum => self.declared_control_sum.map(|sum| sum.to_string()),
            F::InitiatorName => self.initiator.name.clone(),
            F::InitiatorStreetName => self.initiator.address.street_name.clone(),
            F::InitiatorBuildingNumber => self.initiator.address.building_number.clone(),
            F::InitiatorPostalCode => self.initiator.address.postal_code.clone(),
            F::InitiatorTownName => self.initiator.address.town_name.clone(),
            F::InitiatorCountry => self.initiator.address.country.clone(),
            F::PaymentInformationId => Some(self.payment_information_id.clone()),
            F::PaymentMethod => Some(self.payment_method.clone()),
            F::BatchBooking => self.batch_booking.map(|flag| flag.to_string()),
            F::ServiceLevelCode => self.service_level_code.clone(),
            F::RequestedExecutionDate => Some(
                self.requested_execution_date
                    .format(DATE_FORMAT)
                    .to_string(),
            ),
            F::DebtorName => self.debtor.name.clone(),
            F::DebtorStreetName => self.debtor.address.street_name.clone(),
            F::DebtorBuildingNumber => self.debtor.address.building_number.clone(),
            F::DebtorPostalCode => self.debtor.address.postal_code.clone(),
            F::DebtorTownName => self.debtor.address.town_name.clone(),
            F::DebtorCountry => self.debtor.address.country.clone(),
            F::DebtorAccountIban => Some(self.debtor_account_iban.clone()),
            F::DebtorAgentBic => self.debtor_agent_bic.clone(),
            F::DefaultChargeBearer => self.default_charge_bearer.clone(),
            F::DefaultCurrency => Some(self.default_currency.clone()),
            _ => None,
        }
    }
}

/// One payment line. Order within a batch is the source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub instruction_id: Option<String>,
    pub end_to_end_id: String,
    pub currency: String,
    /// Non-negative; checked before mapping.
    pub amount: Decimal,
    pub charge_bearer: Option<String>,
    pub creditor_agent_bic: Option<String>,
    pub creditor: Party,
    pub creditor_account_iban: String,
    pub purpose_code: Option<String>,
    pub remittance_reference: Option<String>,
    pub remittance_date: Option<NaiveDate>,
}

impl CanonicalTransaction {
    pub fn value(&self, field: CanonicalField) -> Option<String> {
        use CanonicalField as F;
        match field {
            F::InstructionId => self.instruction_id.clone(),
            F::EndToEndId => Some(self.end_to_end_id.clone()),
            F::Currency => Some(self.currency.clone()),
            F::Amount => Some(self.amount.to_string()),
            F::ChargeBearer => self.charge_bearer.clone(),
            F::CreditorAgentBic => self.creditor_agent_bic.clone(),
            F::CreditorName => self.creditor.name.clone(),
            F::CreditorStreetName => self.creditor.address.street_name.clone(),
            F::CreditorBuildingNumber => self.creditor.address.building_number.clone(),
            F::CreditorPostalCode => self.creditor.address.postal_code.clone(),
            F::CreditorTownName => self.creditor.address.town_name.clone(),
            F::CreditorCountry => self.creditor.address.country.clone(),
            F::CreditorAccountIban => Some(self.creditor_account_iban.clone()),
            F::PurposeCode => self.purpose_code.clone(),
            F::RemittanceReference => self.remittance_reference.clone(),
            F::RemittanceDate => self
                .remittance_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            _ => None,
        }
    }
}
