use diesel::prelude::*;
use rand::{thread_rng, Rng as _};
use serde::Serialize;

use crate::minicursos::Minicurso;
use crate::schema::registrations;

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub minicurso: i32,
}

/// A stored participant. The two key parts are unrelated random values.
#[derive(Clone, Debug)]
pub struct Registration {
    pub pk: String,
    pub sk: String,
    pub participant: Participant,
}

impl Registration {
    #[must_use]
    pub fn new(participant: Participant) -> Self {
        Self {
            pk: random_key(),
            sk: random_key(),
            participant,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = registrations)]
pub struct NewRegistration<'a> {
    pub pk: &'a str,
    pub sk: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub cpf: &'a str,
    pub minicurso: i32,
}

impl<'a> From<&'a Registration> for NewRegistration<'a> {
    fn from(registration: &'a Registration) -> Self {
        Self {
            pk: &registration.pk,
            sk: &registration.sk,
            name: &registration.participant.name,
            email: &registration.participant.email,
            cpf: &registration.participant.cpf,
            minicurso: registration.participant.minicurso,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct WorkshopCount {
    pub minicurso: &'static Minicurso,
    pub count: i64,
}

#[derive(Serialize, Debug)]
pub struct WorkshopParticipants {
    pub minicurso: &'static Minicurso,
    pub participants: Vec<Participant>,
}

/// 128 random bits as 32 lowercase hex digits.
fn random_key() -> String {
    format!("{:032x}", thread_rng().gen::<u128>())
}
