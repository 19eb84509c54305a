use serde::Serialize;

/// Maximum number of accepted registrations per minicurso.
pub const MAX_PARTICIPANTS: i64 = 14;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Minicurso {
    pub index: i32,
    pub title: &'static str,
}

pub static MINICURSOS: [Minicurso; 6] = [
    Minicurso {
        index: 0,
        title: "Primeiros socorros para terapia ocupacional",
    },
    Minicurso {
        index: 1,
        title: "Introdução a avaliação abrangente na terapia ocupacional infantil",
    },
    Minicurso {
        index: 2,
        title: "Terapia ocupacional na amamentação: Estratégias para facilitar o desempenho da \
                co-ocupação",
    },
    Minicurso {
        index: 3,
        title: "Intervenções terapêuticas ocupacionais no paciente neurológico adulto e idoso",
    },
    Minicurso {
        index: 4,
        title: "terapia ocupacional no domicilio da pessoa idosa",
    },
    Minicurso {
        index: 5,
        title: "experiências sensoriais do ambiente de internamento neonatal na construção do \
                processamento sensorial do RN",
    },
];

#[must_use]
pub fn minicurso(index: i32) -> Option<&'static Minicurso> {
    MINICURSOS.iter().find(|minicurso| minicurso.index == index)
}
