//! In-memory prescription widget.
//!
//! Stands in for the vendor widget in development and tests. It validates
//! the patient the same way and issues random handles.

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::foundation::UserId;
use crate::ports::{PatientInfo, PrescriptionError, PrescriptionHandle, PrescriptionWidget};

#[derive(Debug, Default)]
pub struct InMemoryPrescriptionWidget {
    issued: Mutex<Vec<(UserId, PatientInfo, PrescriptionHandle)>>,
}

impl InMemoryPrescriptionWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of prescriptions prepared so far.
    pub fn issued_count(&self) -> usize {
        self.issued.lock().map(|v| v.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PrescriptionWidget for InMemoryPrescriptionWidget {
    async fn init_prescription(
        &self,
        prescriber: &UserId,
        patient: &PatientInfo,
    ) -> Result<PrescriptionHandle, PrescriptionError> {
        patient.validate()?;

        let handle = PrescriptionHandle {
            id: Uuid::new_v4().to_string(),
            widget_token: Uuid::new_v4().simple().to_string(),
        };

        self.issued
            .lock()
            .map_err(|_| PrescriptionError::Unavailable("widget state poisoned".to_string()))?
            .push((prescriber.clone(), patient.normalized(), handle.clone()));

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(name: &str) -> PatientInfo {
        PatientInfo {
            name: name.to_string(),
            document: None,
            phone: None,
            address: None,
            city: None,
        }
    }

    #[tokio::test]
    async fn issues_distinct_handles() {
        let widget = InMemoryPrescriptionWidget::new();
        let doctor = UserId::new("doc-1").unwrap();

        let a = widget.init_prescription(&doctor, &patient("Ana")).await.unwrap();
        let b = widget.init_prescription(&doctor, &patient("Bia")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(widget.issued_count(), 2);
    }

    #[tokio::test]
    async fn rejects_invalid_patient() {
        let widget = InMemoryPrescriptionWidget::new();
        let doctor = UserId::new("doc-1").unwrap();

        let err = widget.init_prescription(&doctor, &patient("")).await.unwrap_err();
        assert!(matches!(err, PrescriptionError::InvalidPatient(_)));
        assert_eq!(widget.issued_count(), 0);
    }
}
