use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::DatabaseError;
use crate::models::{Participant, Registration};
use crate::RegistrationStore;

/// Keeps the registrations in process memory, they are lost on restart.
#[derive(Default)]
pub struct MemoryRegistrationStore {
    records: RwLock<Vec<Registration>>,
}

impl MemoryRegistrationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn registrations(&self) -> Vec<Registration> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn count_for_workshop(&self, minicurso: i32) -> Result<i64, DatabaseError> {
        let records = self.records.read().await;
        let count = records
            .iter()
            .filter(|record| record.participant.minicurso == minicurso)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn participants_for_workshop(
        &self,
        minicurso: i32,
    ) -> Result<Vec<Participant>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.participant.minicurso == minicurso)
            .map(|record| record.participant.clone())
            .collect())
    }

    async fn add_participant(&self, participant: Participant) -> Result<(), DatabaseError> {
        let registration = Registration::new(participant);
        info!(
            minicurso = registration.participant.minicurso,
            pk = %registration.pk,
            "stored registration in memory"
        );
        self.records.write().await.push(registration);
        Ok(())
    }
}
