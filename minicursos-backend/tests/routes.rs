use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use axum_extra::extract::cookie::Key;
use http::header::{COOKIE, LOCATION, SET_COOKIE};
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt as _;
use minicursos_backend::routes::login::WRONG_PASSWORD;
use minicursos_backend::routes::registrations::create::CAPACITY_REACHED;
use minicursos_backend::{router, AdminConfig, AppState};
use minicursos_database::memory::MemoryRegistrationStore;
use minicursos_database::minicursos::{MAX_PARTICIPANTS, MINICURSOS};
use minicursos_database::models::Participant;
use minicursos_database::RegistrationStore as _;
use tower::ServiceExt as _;

const PASSWORD: &str = "segredo";
const CSRF_TOKEN: &str = "abcdefghijklmnopqrstuvwxyz0123";

fn csrf_cookie() -> String {
    format!("__Host_csrf_token={CSRF_TOKEN}")
}

fn app(public_listing: bool) -> (Router, Arc<MemoryRegistrationStore>) {
    let store = Arc::new(MemoryRegistrationStore::new());
    let state = AppState::new(
        store.clone(),
        Key::generate(),
        AdminConfig {
            password: PASSWORD.to_owned(),
            public_listing,
        },
    )
    .unwrap();
    (router(state), store)
}

async fn seed(store: &MemoryRegistrationStore, minicurso: i32, amount: i64) {
    for number in 0..amount {
        store
            .add_participant(Participant {
                name: format!("participante {number}"),
                email: format!("p{number}@example.com"),
                cpf: format!("{number:011}"),
                minicurso,
            })
            .await
            .unwrap();
    }
}

async fn get(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str, cookie: &str, form: &[(&str, &str)]) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(COOKIE, cookie)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(serde_urlencoded::to_string(form).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn register(app: &Router, name: &str, minicurso: &str) -> Response<Body> {
    post(
        app,
        "/",
        &csrf_cookie(),
        &[
            ("csrf_token", CSRF_TOKEN),
            ("name", name),
            ("email", "a@x.com"),
            ("cpf", "111"),
            ("minicurso", minicurso),
        ],
    )
    .await
}

async fn body(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

/// The `name=value` pairs of all Set-Cookie headers, ready for a Cookie header.
fn cookies(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().split(';').next().unwrap().to_owned())
        .collect::<Vec<_>>()
        .join("; ")
}

async fn admin_cookie(app: &Router) -> String {
    let response = post(
        app,
        "/login",
        &csrf_cookie(),
        &[("csrf_token", CSRF_TOKEN), ("password", PASSWORD)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    format!("{}; {}", csrf_cookie(), cookies(&response))
}

#[tokio::test]
async fn index_shows_form_and_counts() {
    let (app, store) = app(false);
    seed(&store, 2, 3).await;

    let response = get(&app, "/", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookies(&response).starts_with("__Host_csrf_token="));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let html = body(response).await;
    assert!(html.contains("name=\"csrf_token\""));
    assert!(html.contains("3 / 14"));
    assert_eq!(html.matches("0 / 14").count(), MINICURSOS.len() - 1);
    for minicurso in &MINICURSOS {
        assert!(html.contains(&format!("<option value=\"{}\"", minicurso.index)));
    }
}

#[tokio::test]
async fn fourteenth_registration_is_accepted_and_fifteenth_rejected() {
    let (app, store) = app(false);
    seed(&store, 0, 13).await;

    let response = register(&app, "Ana", "0").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sucesso");
    assert_eq!(store.count_for_workshop(0).await.unwrap(), 14);

    let response = register(&app, "Ana", "0").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body(response).await;
    assert!(html.contains(CAPACITY_REACHED));
    assert_eq!(store.count_for_workshop(0).await.unwrap(), 14);
}

#[tokio::test]
async fn every_full_minicurso_rejects_registrations() {
    let (app, store) = app(false);
    for minicurso in &MINICURSOS {
        seed(&store, minicurso.index, MAX_PARTICIPANTS).await;
    }
    for minicurso in &MINICURSOS {
        let response = register(&app, "Bia", &minicurso.index.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains(CAPACITY_REACHED));
        assert_eq!(
            store.count_for_workshop(minicurso.index).await.unwrap(),
            MAX_PARTICIPANTS
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_registrations_fill_only_the_last_seat() {
    let (app, store) = app(false);
    seed(&store, 0, MAX_PARTICIPANTS - 1).await;

    let handles: Vec<_> = (0..10)
        .map(|number| {
            let app = app.clone();
            tokio::spawn(async move {
                register(&app, &format!("simultaneo {number}"), "0")
                    .await
                    .status()
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        if status == StatusCode::SEE_OTHER {
            accepted += 1;
        } else {
            assert_eq!(status, StatusCode::OK);
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(
        store.count_for_workshop(0).await.unwrap(),
        MAX_PARTICIPANTS
    );
}

#[tokio::test]
async fn full_minicurso_does_not_block_the_others() {
    let (app, store) = app(false);
    seed(&store, 1, MAX_PARTICIPANTS).await;

    let response = register(&app, "Caio", "2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(store.count_for_workshop(2).await.unwrap(), 1);
}

#[tokio::test]
async fn empty_fields_redisplay_the_form() {
    let (app, store) = app(false);
    let complete = [
        ("name", "Ana"),
        ("email", "a@x.com"),
        ("cpf", "111"),
        ("minicurso", "3"),
    ];
    for empty in 0..complete.len() {
        let mut form = vec![("csrf_token", CSRF_TOKEN)];
        form.extend(
            complete
                .iter()
                .enumerate()
                .map(|(position, &(field, value))| (field, if position == empty { "" } else { value })),
        );
        let response = post(&app, "/", &csrf_cookie(), &form).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("Este campo é obrigatório."));
        assert!(html.contains("<form"));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn unknown_minicurso_is_rejected() {
    let (app, store) = app(false);
    let response = register(&app, "Ana", "6").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("Escolha um dos minicursos da lista."));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn minicurso_must_match_an_option_exactly() {
    let (app, store) = app(false);
    for minicurso in ["+3", " 3 ", "03"] {
        let response = register(&app, "Ana", minicurso).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("Escolha um dos minicursos da lista."));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn submitted_values_are_stored_untrimmed() {
    let (app, store) = app(false);
    let response = register(&app, "   ", "3").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = register(&app, " Ana ", "3").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let names: Vec<_> = store
        .registrations()
        .await
        .into_iter()
        .map(|registration| registration.participant.name)
        .collect();
    assert_eq!(names, ["   ", " Ana "]);
}

#[tokio::test]
async fn wrong_csrf_token_writes_nothing() {
    let (app, store) = app(false);
    let response = post(
        &app,
        "/",
        &csrf_cookie(),
        &[
            ("csrf_token", "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"),
            ("name", "Ana"),
            ("email", "a@x.com"),
            ("cpf", "111"),
            ("minicurso", "0"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(
        &app,
        "/",
        "",
        &[
            ("csrf_token", CSRF_TOKEN),
            ("name", "Ana"),
            ("email", "a@x.com"),
            ("cpf", "111"),
            ("minicurso", "0"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn success_page() {
    let (app, _store) = app(false);
    let response = get(&app, "/sucesso", &csrf_cookie()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("Inscrição realizada"));
}

#[tokio::test]
async fn login_with_correct_password_opens_the_listing() {
    let (app, store) = app(false);
    seed(&store, 4, 2).await;
    seed(&store, 5, 1).await;

    let cookie = admin_cookie(&app).await;
    let response = get(&app, "/inscritos", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body(response).await;
    assert!(html.contains("participante 1"));
    assert!(html.contains("p0@example.com"));
    assert!(html.contains("(2 / 14)"));
    assert!(html.contains("(1 / 14)"));
    assert!(html.contains("Nenhum inscrito."));
}

#[tokio::test]
async fn login_redirects_to_listing() {
    let (app, _store) = app(false);
    let response = post(
        &app,
        "/login",
        &csrf_cookie(),
        &[("csrf_token", CSRF_TOKEN), ("password", PASSWORD)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inscritos");
    assert!(cookies(&response).contains("__Host_admin_session="));
}

#[tokio::test]
async fn login_with_wrong_password_redisplays_the_form() {
    let (app, _store) = app(false);
    let response = post(
        &app,
        "/login",
        &csrf_cookie(),
        &[("csrf_token", CSRF_TOKEN), ("password", "errado")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!cookies(&response).contains("__Host_admin_session="));
    let html = body(response).await;
    assert!(html.contains(WRONG_PASSWORD));
    assert!(html.contains("name=\"password\""));

    let response = post(
        &app,
        "/login",
        &csrf_cookie(),
        &[("csrf_token", CSRF_TOKEN), ("password", "")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("Este campo é obrigatório."));
}

#[tokio::test]
async fn listing_requires_admin_session() {
    let (app, _store) = app(false);
    let response = get(&app, "/inscritos", &csrf_cookie()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn public_listing_skips_the_admin_session() {
    let (app, store) = app(true);
    seed(&store, 0, 1).await;
    let response = get(&app, "/inscritos", &csrf_cookie()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("participante 0"));
}

#[tokio::test]
async fn logout_ends_the_admin_session() {
    let (app, _store) = app(false);
    let cookie = admin_cookie(&app).await;

    let response = post(&app, "/logout", &cookie, &[("csrf_token", CSRF_TOKEN)]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let removal = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_owned())
        .find(|value| value.starts_with("__Host_admin_session="))
        .unwrap();
    assert!(removal.contains("Max-Age=0"));
}

#[tokio::test]
async fn stylesheet_supports_conditional_requests() {
    let (app, _store) = app(false);
    let response = get(&app, "/index.css", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/css; charset=utf-8"
    );
    let etag = response.headers().get("etag").unwrap().clone();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/index.css")
                .header("if-none-match", etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (app, _store) = app(false);
    let response = get(&app, "/does-not-exist", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body(response).await.contains("Página não encontrada."));
}
