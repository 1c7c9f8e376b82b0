//! Digital-prescription widget port.
//!
//! The vendor widget is driven by its own script and event bus; this port
//! reduces it to a single call that prepares a prescription for a patient
//! and hands back whatever the client needs to open the widget.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

#[async_trait]
pub trait PrescriptionWidget: Send + Sync {
    async fn init_prescription(
        &self,
        prescriber: &UserId,
        patient: &PatientInfo,
    ) -> Result<PrescriptionHandle, PrescriptionError>;
}

/// Patient data the widget needs to pre-fill a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,

    /// National document number (CPF), digits only after normalisation.
    #[serde(default)]
    pub document: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub city: Option<String>,
}

impl PatientInfo {
    /// Checks the fields the widget rejects.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if let Some(document) = &self.document {
            let digits = digits_only(document);
            if digits.len() != 11 {
                return Err(ValidationError::invalid_format(
                    "document",
                    "must contain 11 digits",
                ));
            }
        }
        if let Some(phone) = &self.phone {
            let digits = digits_only(phone);
            if !(10..=11).contains(&digits.len()) {
                return Err(ValidationError::invalid_format(
                    "phone",
                    "must contain 10 or 11 digits including area code",
                ));
            }
        }
        Ok(())
    }

    /// Copy with document and phone reduced to digits.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            document: self.document.as_deref().map(digits_only),
            phone: self.phone.as_deref().map(digits_only),
            address: self.address.clone(),
            city: self.city.clone(),
        }
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Opaque handle to a prepared prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionHandle {
    pub id: String,

    /// Short-lived token the client passes to the vendor script.
    pub widget_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrescriptionError {
    #[error("invalid patient data: {0}")]
    InvalidPatient(#[from] ValidationError),

    #[error("prescription widget unavailable: {0}")]
    Unavailable(String),
}

impl From<PrescriptionError> for DomainError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::InvalidPatient(v) => v.into(),
            PrescriptionError::Unavailable(msg) => {
                DomainError::new(ErrorCode::PrescriptionWidgetError, msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientInfo {
        PatientInfo {
            name: "Maria Silva".to_string(),
            document: Some("123.456.789-09".to_string()),
            phone: Some("(11) 98765-4321".to_string()),
            address: None,
            city: Some("São Paulo".to_string()),
        }
    }

    #[test]
    fn prescription_widget_is_object_safe() {
        fn _accepts_dyn(_widget: &dyn PrescriptionWidget) {}
    }

    #[test]
    fn formatted_document_and_phone_are_valid() {
        assert!(patient().validate().is_ok());
    }

    #[test]
    fn normalized_strips_punctuation() {
        let p = patient().normalized();
        assert_eq!(p.document.as_deref(), Some("12345678909"));
        assert_eq!(p.phone.as_deref(), Some("11987654321"));
    }

    #[test]
    fn short_phone_is_rejected() {
        let mut p = patient();
        p.phone = Some("98765".to_string());
        assert_eq!(p.validate().unwrap_err().field(), "phone");
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = patient();
        p.name = " ".to_string();
        assert_eq!(p.validate().unwrap_err().field(), "name");
    }
}
