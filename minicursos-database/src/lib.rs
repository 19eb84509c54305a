pub mod error;
pub mod memory;
pub mod minicursos;
pub mod models;
pub mod schema;

use async_trait::async_trait;
use diesel::dsl;
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use error::DatabaseError;
use minicursos::MINICURSOS;
use models::{NewRegistration, Participant, Registration, WorkshopCount, WorkshopParticipants};
use schema::registrations;
use tracing::{debug, info};

pub type Pool = deadpool::Pool<AsyncPgConnection>;

/// Registrations are only ever appended. Every read scans the stored records,
/// there is no counter kept anywhere.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn count_for_workshop(&self, minicurso: i32) -> Result<i64, DatabaseError>;

    async fn participants_for_workshop(
        &self,
        minicurso: i32,
    ) -> Result<Vec<Participant>, DatabaseError>;

    async fn add_participant(&self, participant: Participant) -> Result<(), DatabaseError>;

    /// One count per minicurso, in catalog order.
    async fn count_all(&self) -> Result<Vec<WorkshopCount>, DatabaseError> {
        let mut counts = Vec::with_capacity(MINICURSOS.len());
        for minicurso in &MINICURSOS {
            counts.push(WorkshopCount {
                minicurso,
                count: self.count_for_workshop(minicurso.index).await?,
            });
        }
        Ok(counts)
    }

    /// All participants grouped by minicurso, in catalog order.
    async fn list_all(&self) -> Result<Vec<WorkshopParticipants>, DatabaseError> {
        let mut groups = Vec::with_capacity(MINICURSOS.len());
        for minicurso in &MINICURSOS {
            groups.push(WorkshopParticipants {
                minicurso,
                participants: self.participants_for_workshop(minicurso.index).await?,
            });
        }
        Ok(groups)
    }
}

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub fn get_database_connection(database_url: &str) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}

type ByMinicurso = dsl::Filter<registrations::table, dsl::Eq<registrations::minicurso, i32>>;

fn by_minicurso(minicurso: i32) -> ByMinicurso {
    registrations::table.filter(registrations::minicurso.eq(minicurso))
}

#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: Pool,
}

impl PgRegistrationStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        Ok(Self::new(get_database_connection(database_url)?))
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn count_for_workshop(&self, minicurso: i32) -> Result<i64, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let count = by_minicurso(minicurso)
            .count()
            .get_result::<i64>(&mut connection)
            .await?;
        debug!(minicurso, count, "counted registrations");
        Ok(count)
    }

    async fn participants_for_workshop(
        &self,
        minicurso: i32,
    ) -> Result<Vec<Participant>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(by_minicurso(minicurso)
            .select(Participant::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn add_participant(&self, participant: Participant) -> Result<(), DatabaseError> {
        let registration = Registration::new(participant);
        let mut connection = self.pool.get().await?;
        diesel::insert_into(registrations::table)
            .values(NewRegistration::from(&registration))
            .execute(&mut connection)
            .await?;
        info!(
            minicurso = registration.participant.minicurso,
            pk = %registration.pk,
            "stored registration"
        );
        Ok(())
    }
}
