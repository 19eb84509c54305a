use minicursos_database::minicursos::minicurso;
use minicursos_database::models::Participant;
use serde::{Deserialize, Serialize};

use crate::csrf_protection::CsrfToken;

pub const REQUIRED: &str = "Este campo é obrigatório.";
pub const INVALID_MINICURSO: &str = "Escolha um dos minicursos da lista.";

// every field defaults to empty so a missing field shows up as a validation
// error instead of a rejected request

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
#[serde(default)]
pub struct ParticipantForm {
    #[serde(skip_serializing)]
    pub csrf_token: String,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub minicurso: String,
}

#[derive(Serialize, Default, Debug, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub cpf: Option<&'static str>,
    pub minicurso: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.cpf.is_none()
            && self.minicurso.is_none()
    }
}

// values are stored exactly as submitted
fn required(value: &str) -> Result<String, &'static str> {
    if value.is_empty() {
        Err(REQUIRED)
    } else {
        Ok(value.to_owned())
    }
}

impl ParticipantForm {
    /// The chosen minicurso if the submitted value is exactly one of the
    /// option values of the select.
    #[must_use]
    pub fn selected_minicurso(&self) -> Option<i32> {
        self.minicurso
            .parse::<i32>()
            .ok()
            .filter(|index| index.to_string() == self.minicurso)
            .and_then(minicurso)
            .map(|minicurso| minicurso.index)
    }

    pub fn validate(&self) -> Result<Participant, FieldErrors> {
        let name = required(&self.name);
        let email = required(&self.email);
        let cpf = required(&self.cpf);
        let selected = if self.minicurso.is_empty() {
            Err(REQUIRED)
        } else {
            self.selected_minicurso().ok_or(INVALID_MINICURSO)
        };
        match (name, email, cpf, selected) {
            (Ok(name), Ok(email), Ok(cpf), Ok(minicurso)) => Ok(Participant {
                name,
                email,
                cpf,
                minicurso,
            }),
            (name, email, cpf, selected) => Err(FieldErrors {
                name: name.err(),
                email: email.err(),
                cpf: cpf.err(),
                minicurso: selected.err(),
            }),
        }
    }
}

impl CsrfToken for ParticipantForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct LoginForm {
    pub csrf_token: String,
    pub password: String,
}

impl CsrfToken for LoginForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct LogoutForm {
    pub csrf_token: String,
}

impl CsrfToken for LogoutForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}
