mod common;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use serial_test::serial;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use common::TOKEN;

/// Server whose routes under test never reach the database.
fn offline_server() -> (TestServer, TempDir) {
    let dir = TempDir::new().unwrap();
    let server = common::test_server(common::lazy_pool(), dir.path());
    (server, dir)
}

/// Server on `DATABASE_URL`, or `None` to skip.
async fn db_server() -> Option<(TestServer, TempDir)> {
    let Some(pool) = common::create_test_pool().await else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };
    let dir = TempDir::new().unwrap();
    Some((common::test_server(pool, dir.path()), dir))
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn cookie_header() -> HeaderValue {
    HeaderValue::from_str(&common::admin_cookie()).unwrap()
}

fn unique(label: &str) -> String {
    format!("{} {}", label, &Uuid::new_v4().simple().to_string()[..8])
}

// ============================================================================
// Routes that answer without a database
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _dir) = offline_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (server, _dir) = offline_server();
    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let doc: Value = response.json();
    assert!(doc["paths"]["/api/research/{id}/teachers"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
}

#[tokio::test]
async fn test_admin_without_session_redirects_to_login() {
    let (server, _dir) = offline_server();

    let response = server.get("/admin").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fadmin");

    let response = server.get("/admin/entities/teachers").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fadmin%2Fentities%2Fteachers");
}

#[tokio::test]
async fn test_admin_unknown_resource_is_not_found() {
    let (server, _dir) = offline_server();
    let response = server
        .get("/admin/entities/conferencias")
        .add_header(header::COOKIE, cookie_header())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_write_with_forged_cookie_goes_back_to_login() {
    let (server, _dir) = offline_server();
    let form = MultipartForm::new().add_text("name", "Secretaría");

    let response = server
        .post("/admin/entities/offices")
        .add_header(header::COOKIE, HeaderValue::from_static("finesi_token=forged"))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/login?toast="), "{}", target);
    assert!(target.ends_with("toastKind=error"));
}

#[tokio::test]
async fn test_login_page_shows_redirect_message() {
    let (server, _dir) = offline_server();
    let response = server
        .get("/login")
        .add_query_param("toast", "Tu sesión no es válida")
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Tu sesión no es válida"));
    assert!(html.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let (server, _dir) = offline_server();

    let response = server
        .post("/login")
        .form(&[("username", "admin"), ("password", "finesi"), ("next", "/admin/entities/teachers")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/entities/teachers");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with(&format!("finesi_token={}", TOKEN)), "{}", cookie);
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let (server, _dir) = offline_server();

    let response = server
        .post("/login")
        .form(&[("username", "admin"), ("password", "incorrecta"), ("next", "https://evil.example")])
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = response.text();
    assert!(html.contains("Usuario o contraseña incorrectos"));
    assert!(!html.contains("evil.example"));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (server, _dir) = offline_server();
    let response = server.post("/logout").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_api_writes_require_token() {
    let (server, _dir) = offline_server();

    let response = server.post("/api/offices").json(&json!({ "name": "Secretaría" })).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["data"].is_null());
    assert_eq!(body["code"], "UNAUTHORIZED");

    let response = server
        .delete(&format!("/api/teachers/{}", Uuid::new_v4()))
        .authorization_bearer("short")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .put(&format!("/api/research/{}/teachers", Uuid::new_v4()))
        .authorization_bearer("wrong-token-0123456789abcdef0123456789")
        .json(&json!([]))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_middleware_with_oneshot() {
    let dir = TempDir::new().unwrap();
    let app = common::create_test_app(common::lazy_pool(), dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload?kind=image")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("Bearer"));
}

#[tokio::test]
async fn test_upload_reports_each_file() {
    let (server, dir) = offline_server();

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(vec![1u8; 2048]).file_name("foto.png").mime_type("image/png"))
        .add_part(
            "file",
            Part::bytes(vec![2u8; 4_500_000]).file_name("grande.jpg").mime_type("image/jpeg"),
        )
        .add_part(
            "file",
            Part::bytes(vec![3u8; 64]).file_name("setup.exe").mime_type("application/octet-stream"),
        );

    let response = server
        .post("/api/upload")
        .add_query_param("kind", "image")
        .add_query_param("multiple", "true")
        .authorization_bearer(TOKEN)
        .multipart(form)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let results = body["data"]["results"].as_array().unwrap();
    let statuses: Vec<&str> = results.iter().map(|r| r["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, vec!["valid", "warning", "error"]);
    assert_eq!(body["meta"]["count"], 2);

    let files = body["data"]["files"].as_array().unwrap();
    let key = files[0]["key"].as_str().unwrap();
    assert!(key.ends_with(".png"));
    assert!(dir.path().join(key).exists());

    let served = server.get(&format!("/uploads/{}", key)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().len(), 2048);
    assert_eq!(served.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
}

#[tokio::test]
async fn test_upload_single_mode_keeps_last_file() {
    let (server, _dir) = offline_server();

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(b"%PDF-1".to_vec()).file_name("a.pdf").mime_type("application/pdf"))
        .add_part("file", Part::bytes(b"%PDF-2".to_vec()).file_name("b.pdf").mime_type("application/pdf"));

    let response = server
        .post("/api/upload?kind=document")
        .authorization_bearer(TOKEN)
        .multipart(form)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["fileName"], "b.pdf");
}

#[tokio::test]
async fn test_upload_without_files_is_bad_request() {
    let (server, _dir) = offline_server();
    let form = MultipartForm::new().add_text("note", "sin archivo");

    let response = server
        .post("/api/upload?kind=image")
        .authorization_bearer(TOKEN)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_upload_is_not_found() {
    let (server, _dir) = offline_server();
    server.get("/uploads/nada.png").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_too_many_files() {
    let (server, dir) = offline_server();

    let mut form = MultipartForm::new();
    for i in 0..9 {
        form = form.add_part(
            "file",
            Part::bytes(vec![1u8; 16]).file_name(format!("foto{}.png", i)).mime_type("image/png"),
        );
    }

    let response = server
        .post("/api/upload?kind=image&multiple=true")
        .authorization_bearer(TOKEN)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].as_str().unwrap().contains("máximo"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_admin_document_form_rejects_unsupported_file() {
    let (server, dir) = offline_server();

    let form = MultipartForm::new()
        .add_text("title", "Reglamento de investigación")
        .add_part(
            "filePath",
            Part::bytes(b"solo texto".to_vec()).file_name("notas.txt").mime_type("text/plain"),
        );
    let response = server
        .post("/admin/entities/documents")
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text();
    assert!(html.contains("no soportado"), "{}", html);
    assert!(html.contains("Reglamento de investigación"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_admin_document_form_requires_file() {
    let (server, _dir) = offline_server();

    let form = MultipartForm::new()
        .add_text("title", "Plan anual")
        .add_part("filePath", Part::bytes(Vec::new()).file_name("").mime_type("application/octet-stream"));
    let response = server
        .post("/admin/entities/documents")
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("Selecciona un archivo"));
}

// ============================================================================
// Database-backed tests (skipped without DATABASE_URL)
// ============================================================================

#[tokio::test]
#[serial]
async fn test_office_crud() {
    let Some((server, _dir)) = db_server().await else { return };
    let name = unique("Secretaría Académica");

    let response = server
        .post("/api/offices")
        .authorization_bearer(TOKEN)
        .json(&json!({ "name": name, "location": "Pabellón A", "published": true, "order": 2 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["name"], name);
    assert_eq!(created["data"]["order"], 2);

    let response = server.get(&format!("/api/offices/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["location"], "Pabellón A");

    let response = server
        .put(&format!("/api/offices/{}", id))
        .authorization_bearer(TOKEN)
        .json(&json!({ "location": "Pabellón B", "published": false }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["data"]["location"], "Pabellón B");
    assert_eq!(updated["data"]["name"], name);

    let response = server.get("/api/offices").add_query_param("published", "true").await;
    response.assert_status_ok();
    let listed: Value = response.json();
    assert!(listed["data"].as_array().unwrap().iter().all(|o| o["id"] != id.as_str()));
    assert!(listed["meta"]["limit"].is_number());

    server
        .delete(&format!("/api/offices/{}", id))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/offices/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
#[serial]
async fn test_validation_errors() {
    let Some((server, _dir)) = db_server().await else { return };

    let response = server
        .post("/api/teachers")
        .authorization_bearer(TOKEN)
        .json(&json!({ "fullName": "   " }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");

    let response = server
        .post("/api/calendar")
        .authorization_bearer(TOKEN)
        .json(&json!({
            "title": "Seminario",
            "startsAt": "2026-05-10T15:00:00Z",
            "endsAt": "2026-05-10T09:00:00Z"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn test_teacher_search_ignores_accents() {
    let Some((server, _dir)) = db_server().await else { return };
    let marker = Uuid::new_v4().simple().to_string()[..6].to_string();
    let name = format!("José Ñahui {}", marker);

    let response = server
        .post("/api/teachers")
        .authorization_bearer(TOKEN)
        .json(&json!({ "fullName": name, "published": true }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .get("/api/teachers")
        .add_query_param("search", format!("jose nahui {}", marker))
        .await;
    response.assert_status_ok();
    let found: Value = response.json();
    assert!(found["data"].as_array().unwrap().iter().any(|t| t["id"] == id.as_str()));

    server
        .delete(&format!("/api/teachers/{}", id))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

async fn create_teacher(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/api/teachers")
        .authorization_bearer(TOKEN)
        .json(&json!({ "fullName": name, "published": true }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[serial]
async fn test_research_assignments() {
    let Some((server, _dir)) = db_server().await else { return };

    let response = server
        .post("/api/research")
        .authorization_bearer(TOKEN)
        .json(&json!({ "title": unique("Inteligencia Artificial"), "published": true }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let line = response.json::<Value>()["data"]["id"].as_str().unwrap().to_string();

    let ana = create_teacher(&server, &unique("Ana Quispe")).await;
    let luis = create_teacher(&server, &unique("Luis Mamani")).await;

    let response = server
        .post(&format!("/api/research/{}/teachers", line))
        .authorization_bearer(TOKEN)
        .json(&json!({ "teacherId": ana, "role": "coordinador" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert!(response.json::<Value>()["meta"].get("warnings").is_none());

    // Assigning twice is a conflict.
    let response = server
        .post(&format!("/api/research/{}/teachers", line))
        .authorization_bearer(TOKEN)
        .json(&json!({ "teacherId": ana, "role": "investigador" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // A second coordinator is accepted with a warning.
    let response = server
        .post(&format!("/api/research/{}/teachers", line))
        .authorization_bearer(TOKEN)
        .json(&json!({ "teacherId": luis, "role": "coordinador" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let warnings = response.json::<Value>()["meta"]["warnings"].clone();
    assert_eq!(warnings.as_array().unwrap().len(), 1);

    let response = server
        .put(&format!("/api/research/{}/teachers/{}", line, luis))
        .authorization_bearer(TOKEN)
        .json(&json!({ "role": "colaborador" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["role"], "colaborador");

    let response = server.get(&format!("/api/research/{}/teachers", line)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 2);

    let response = server.get(&format!("/api/teachers/{}/research-lines", luis)).await;
    response.assert_status_ok();
    let lines: Value = response.json();
    assert_eq!(lines["data"][0]["role"], "colaborador");

    // Replacing with nobody as coordinator warns but succeeds.
    let response = server
        .put(&format!("/api/research/{}/teachers", line))
        .authorization_bearer(TOKEN)
        .json(&json!([{ "teacherId": luis, "role": "investigador" }]))
        .await;
    response.assert_status_ok();
    let replaced: Value = response.json();
    assert_eq!(replaced["data"].as_array().unwrap().len(), 1);
    assert!(replaced["meta"]["warnings"][0].as_str().unwrap().contains("no tiene coordinador"));

    let response = server
        .put(&format!("/api/research/{}/teachers", line))
        .authorization_bearer(TOKEN)
        .json(&json!([{ "teacherId": Uuid::new_v4() }]))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let response = server
        .delete(&format!("/api/research/{}/teachers/{}", line, luis))
        .authorization_bearer(TOKEN)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["meta"]["count"], 0);

    server
        .delete(&format!("/api/research/{}/teachers/{}", line, luis))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    for id in [&ana, &luis] {
        server
            .delete(&format!("/api/teachers/{}", id))
            .authorization_bearer(TOKEN)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
    server
        .delete(&format!("/api/research/{}", line))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
#[serial]
async fn test_gallery_image_is_served_from_upload() {
    let Some((server, _dir)) = db_server().await else { return };

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![7u8; 1024]).file_name("acto.webp").mime_type("image/webp"),
    );
    let response = server
        .post("/api/upload?kind=image")
        .authorization_bearer(TOKEN)
        .multipart(form)
        .await;
    response.assert_status_ok();
    let stored = response.json::<Value>()["data"]["files"][0].clone();

    let category = unique("Ceremonias");
    let response = server
        .post("/api/gallery")
        .authorization_bearer(TOKEN)
        .json(&json!({
            "title": "Acto de apertura",
            "category": category,
            "imagePath": stored["key"],
            "imageMime": stored["mimeType"],
            "published": true
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["id"].as_str().unwrap().to_string();

    let image = server.get(&format!("/api/gallery/image/{}", id)).await;
    image.assert_status_ok();
    assert_eq!(image.headers().get(header::CONTENT_TYPE).unwrap(), "image/webp");
    assert_eq!(image.as_bytes().len(), 1024);

    let response = server.get("/api/gallery").add_query_param("category", category.to_lowercase()).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);

    let page = server.get("/galeria").add_query_param("categoria", &category).add_query_param("imagen", 0).await;
    page.assert_status_ok();
    assert!(page.text().contains("Acto de apertura"));

    server
        .delete(&format!("/api/gallery/{}", id))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server.get(&format!("/api/gallery/image/{}", id)).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_admin_creates_office_from_form() {
    let Some((server, _dir)) = db_server().await else { return };
    let name = unique("Oficina de Grados");

    let form = MultipartForm::new()
        .add_text("name", name.clone())
        .add_text("schedule", "Lunes a viernes")
        .add_text("published", "on")
        .add_text("order", "");

    let response = server
        .post("/admin/entities/offices")
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/admin/entities/offices?toast=Registro%20creado"), "{}", target);

    let listing = server
        .get("/admin/entities/offices")
        .add_header(header::COOKIE, cookie_header())
        .await;
    listing.assert_status_ok();
    assert!(listing.text().contains(&name));

    let offices: Value = server.get("/api/offices").add_query_param("limit", 500).await.json();
    let office = offices["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["name"] == name.as_str())
        .cloned()
        .unwrap();
    assert_eq!(office["published"], true);
    assert_eq!(office["schedule"], "Lunes a viernes");

    let response = server
        .post(&format!("/admin/entities/offices/{}/delete", office["id"].as_str().unwrap()))
        .add_header(header::COOKIE, cookie_header())
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert!(location(&response).contains("Registro%20eliminado"));
}

#[tokio::test]
#[serial]
async fn test_admin_form_rejects_missing_required_field() {
    let Some((server, _dir)) = db_server().await else { return };

    let form = MultipartForm::new().add_text("schedule", "Mañanas");
    let response = server
        .post("/admin/entities/offices")
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text();
    assert!(html.contains("es obligatorio"));
    assert!(html.contains("Mañanas"));
}

#[tokio::test]
#[serial]
async fn test_home_page_renders() {
    let Some((server, _dir)) = db_server().await else { return };
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("Contacto"));
}

#[tokio::test]
#[serial]
async fn test_updates_clear_optional_fields() {
    let Some((server, _dir)) = db_server().await else { return };
    let name = unique("Mesa de Partes");

    let response = server
        .post("/api/offices")
        .authorization_bearer(TOKEN)
        .json(&json!({ "name": name, "email": "partes@unap.edu.pe", "phone": "051-123456" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .put(&format!("/api/offices/{}", id))
        .authorization_bearer(TOKEN)
        .json(&json!({ "location": "Pabellón A" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["email"], "partes@unap.edu.pe");

    let response = server
        .put(&format!("/api/offices/{}", id))
        .authorization_bearer(TOKEN)
        .json(&json!({ "email": null }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["data"]["email"], Value::Null);
    assert_eq!(updated["data"]["phone"], "051-123456");
    assert_eq!(updated["data"]["location"], "Pabellón A");

    let form = MultipartForm::new()
        .add_text("name", name.clone())
        .add_text("location", "Pabellón C")
        .add_text("phone", "")
        .add_text("order", "");
    let response = server
        .post(&format!("/admin/entities/offices/{}", id))
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert!(location(&response).contains("Cambios%20guardados"));

    let office: Value = server.get(&format!("/api/offices/{}", id)).await.json();
    assert_eq!(office["data"]["phone"], Value::Null);
    assert_eq!(office["data"]["location"], "Pabellón C");
    assert_eq!(office["data"]["name"], name);

    server
        .delete(&format!("/api/offices/{}", id))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

async fn find_by(server: &TestServer, resource: &str, key: &str, value: &str) -> Value {
    let listed: Value = server
        .get(&format!("/api/{}", resource))
        .add_query_param("limit", 500)
        .await
        .json();
    listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r[key] == value)
        .cloned()
        .unwrap()
}

#[tokio::test]
#[serial]
async fn test_admin_document_file_lifecycle() {
    let Some((server, dir)) = db_server().await else { return };
    let title = unique("Reglamento");

    // 9 MiB sits between 80% and 100% of the 10 MB document limit.
    let form = MultipartForm::new().add_text("title", title.clone()).add_part(
        "filePath",
        Part::bytes(vec![0u8; 9 * 1024 * 1024]).file_name("reglamento.pdf").mime_type("application/pdf"),
    );
    let response = server
        .post("/admin/entities/documents")
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.contains("cerca%20del%20l%C3%ADmite"), "{}", target);
    assert!(target.ends_with("toastKind=warning"), "{}", target);

    let document = find_by(&server, "documents", "title", &title).await;
    let id = document["id"].as_str().unwrap().to_string();
    let first_key = document["filePath"].as_str().unwrap().to_string();
    assert!(dir.path().join(&first_key).exists());

    let form = MultipartForm::new().add_text("title", title.clone()).add_part(
        "filePath",
        Part::bytes(vec![1u8; 1024]).file_name("notas.txt").mime_type("text/plain"),
    );
    let response = server
        .post(&format!("/admin/entities/documents/{}", id))
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(dir.path().join(&first_key).exists());

    let form = MultipartForm::new().add_text("title", title.clone()).add_part(
        "filePath",
        Part::bytes(b"%PDF-1.7".to_vec()).file_name("reglamento-v2.pdf").mime_type("application/pdf"),
    );
    let response = server
        .post(&format!("/admin/entities/documents/{}", id))
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert!(location(&response).ends_with("toastKind=success"));

    let document: Value = server.get(&format!("/api/documents/{}", id)).await.json();
    let second_key = document["data"]["filePath"].as_str().unwrap().to_string();
    assert_ne!(second_key, first_key);
    assert_eq!(document["data"]["fileName"], "reglamento-v2.pdf");
    assert!(dir.path().join(&second_key).exists());
    assert!(!dir.path().join(&first_key).exists());

    let download = server.get(&format!("/api/download/{}", id)).await;
    download.assert_status_ok();
    assert_eq!(download.as_bytes().as_ref(), b"%PDF-1.7");

    server
        .delete(&format!("/api/documents/{}", id))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(!dir.path().join(&second_key).exists());
}

#[tokio::test]
#[serial]
async fn test_admin_removes_optional_photo() {
    let Some((server, dir)) = db_server().await else { return };
    let name = unique("Rosa Mamani");

    let form = MultipartForm::new()
        .add_text("fullName", name.clone())
        .add_part("photoPath", Part::bytes(vec![5u8; 512]).file_name("rosa.png").mime_type("image/png"));
    let response = server
        .post("/admin/entities/teachers")
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let teacher = find_by(&server, "teachers", "fullName", &name).await;
    let id = teacher["id"].as_str().unwrap().to_string();
    let photo = teacher["photoPath"].as_str().unwrap().to_string();
    assert!(dir.path().join(&photo).exists());

    let edit = server
        .get(&format!("/admin/entities/teachers/{}", id))
        .add_header(header::COOKIE, cookie_header())
        .await;
    edit.assert_status_ok();
    assert!(edit.text().contains("photoPath_remove"));

    let form = MultipartForm::new()
        .add_text("fullName", name.clone())
        .add_text("photoPath_remove", "on")
        .add_part("photoPath", Part::bytes(Vec::new()).file_name("").mime_type("application/octet-stream"));
    let response = server
        .post(&format!("/admin/entities/teachers/{}", id))
        .add_header(header::COOKIE, cookie_header())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let teacher: Value = server.get(&format!("/api/teachers/{}", id)).await.json();
    assert_eq!(teacher["data"]["photoPath"], Value::Null);
    assert!(!dir.path().join(&photo).exists());

    server
        .delete(&format!("/api/teachers/{}", id))
        .authorization_bearer(TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}
