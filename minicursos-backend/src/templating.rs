use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::AppError;
use crate::routes::indexcss::index_css_version;
use crate::session::Session;

const PARTIALS: [(&str, &str); 2] = [
    ("main_pre", include_str!("../templates/main_pre.hbs")),
    ("main_post", include_str!("../templates/main_post.hbs")),
];

const TEMPLATES: [(&str, &str); 5] = [
    ("index", include_str!("../templates/index.hbs")),
    ("sucesso", include_str!("../templates/sucesso.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("inscritos", include_str!("../templates/inscritos.hbs")),
    ("error", include_str!("../templates/error.hbs")),
];

#[derive(Serialize)]
pub struct TemplateWrapper<'a, T> {
    pub csrf_token: &'a str,
    pub admin: bool,
    pub css_version: &'a str,
    #[serde(flatten)]
    pub inner: T,
}

pub struct Templates {
    handlebars: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, AppError> {
        let mut handlebars = Handlebars::new();
        for (name, partial) in PARTIALS {
            handlebars
                .register_partial(name, partial)
                .map_err(Box::new)?;
        }
        for (name, template) in TEMPLATES {
            handlebars
                .register_template_string(name, template)
                .map_err(Box::new)?;
        }
        Ok(Self { handlebars })
    }

    pub fn render<T: Serialize>(
        &self,
        session: &Session,
        template_name: &str,
        value: T,
    ) -> Result<Html<String>, AppError> {
        Ok(Html(
            self.handlebars
                .render(
                    template_name,
                    &TemplateWrapper {
                        csrf_token: session.csrf_token(),
                        admin: session.is_admin(),
                        css_version: index_css_version(),
                        inner: value,
                    },
                )
                .map_err(Box::new)?,
        ))
    }
}
