//! StartPrescriptionHandler - Prepares the prescription widget for a patient.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{PatientInfo, PrescriptionError, PrescriptionHandle, PrescriptionWidget};

#[derive(Debug, Clone)]
pub struct StartPrescriptionCommand {
    pub prescriber: UserId,
    pub patient: PatientInfo,
}

pub struct StartPrescriptionHandler {
    widget: Arc<dyn PrescriptionWidget>,
}

impl StartPrescriptionHandler {
    pub fn new(widget: Arc<dyn PrescriptionWidget>) -> Self {
        Self { widget }
    }

    pub async fn handle(
        &self,
        cmd: StartPrescriptionCommand,
    ) -> Result<PrescriptionHandle, SubscriptionError> {
        cmd.patient.validate()?;
        let patient = cmd.patient.normalized();

        let handle = self
            .widget
            .init_prescription(&cmd.prescriber, &patient)
            .await
            .map_err(|e| match e {
                PrescriptionError::InvalidPatient(v) => SubscriptionError::from(v),
                PrescriptionError::Unavailable(msg) => {
                    tracing::error!(prescriber = %cmd.prescriber, error = %msg, "prescription widget failed");
                    SubscriptionError::infrastructure(msg)
                }
            })?;

        tracing::info!(prescriber = %cmd.prescriber, prescription_id = %handle.id, "prescription started");
        Ok(handle)
    }
}
