use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use models::enums::Role;
use server::routes;
use server::state::{AuthSettings, ServerState};
use services::accounts::{self, AdminNewUser};

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = ServerState::new(
        db,
        AuthSettings {
            jwt_secret: "test-secret".into(),
            token_ttl_hours: 24,
        },
    );
    Ok(routes::build_router(state))
}

fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("build request")
}

fn bare_request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("build request")
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

/// Admins are provisioned, not self-registered; seed one straight
/// through the service layer and log in over HTTP.
async fn admin_token(app: &mut Router) -> anyhow::Result<String> {
    let db = models::db::connect().await?;
    let email = format!("admin_{}@example.com", Uuid::new_v4());
    accounts::create_user_by_admin(
        &db,
        AdminNewUser {
            full_name: "Ops Admin".into(),
            email: email.clone(),
            phone: None,
            password: "AdminPass123".into(),
            role: Role::Admin,
        },
    )
    .await?;
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": email, "password": "AdminPass123"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(read_json(resp).await["token"]
        .as_str()
        .expect("admin token")
        .to_string())
}

/// Register, verify and log in a customer; returns the bearer token.
async fn verified_customer(app: &mut Router, label: &str) -> anyhow::Result<String> {
    let email = format!("{}_{}@example.com", label, Uuid::new_v4());
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({"full_name": "Flow Customer", "email": email, "password": "CustPass123", "role": "Customer"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let token = read_json(resp).await["verification_token"]
        .as_str()
        .expect("verification token")
        .to_string();
    let resp = app
        .call(bare_request("GET", &format!("/api/auth/verify/{}", token), None))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": email, "password": "CustPass123"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(read_json(resp).await["token"]
        .as_str()
        .expect("customer token")
        .to_string())
}

/// Register a technician and walk it to login. Returns the bearer token
/// and the e-mail used, still unverified by the admin.
async fn pending_technician(app: &mut Router, label: &str) -> anyhow::Result<(String, String)> {
    let email = format!("{}_{}@example.com", label, Uuid::new_v4());
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({"full_name": "Flow Technician", "email": email, "password": "TechPass123", "role": "Technician"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let token = read_json(resp).await["verification_token"]
        .as_str()
        .expect("verification token")
        .to_string();
    let resp = app
        .call(bare_request("GET", &format!("/api/auth/verify/{}", token), None))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": email, "password": "TechPass123"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = read_json(resp).await;
    assert_eq!(session["verification_status"], "Pending");
    Ok((
        session["token"].as_str().expect("tech token").to_string(),
        email.to_lowercase(),
    ))
}

/// Upload both documents and have the admin approve the application.
async fn approve_technician(
    app: &mut Router,
    admin: &str,
    tech_bearer: &str,
    tech_email: &str,
) -> anyhow::Result<()> {
    let resp = app
        .call(json_request(
            "POST",
            "/api/technician/documents",
            Some(tech_bearer),
            &json!({"id_proof": "uploads/id.png", "certificate": "uploads/cert.pdf"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .call(bare_request("GET", "/api/admin/technicians/pending", Some(admin)))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let pending = read_json(resp).await;
    let technician_id = pending
        .as_array()
        .expect("pending list")
        .iter()
        .find(|p| p["email"] == tech_email)
        .and_then(|p| p["technician_id"].as_str())
        .expect("our technician in the pending queue")
        .to_string();

    let resp = app
        .call(json_request(
            "PUT",
            &format!("/api/admin/technicians/{}/verify", technician_id),
            Some(admin),
            &json!({"status": "Approved"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let approved = read_json(resp).await;
    assert_eq!(approved["verification_status"], "Approved");
    assert!(!approved["verified_at"].is_null());
    Ok(())
}

/// Seed a category and a priced service through the admin API; returns
/// (category_id, service_id).
async fn seed_offering(app: &mut Router, admin: &str) -> anyhow::Result<(String, String)> {
    let name = format!("Masonry {}", Uuid::new_v4());
    let resp = app
        .call(json_request(
            "POST",
            "/api/admin/categories",
            Some(admin),
            &json!({"name": name, "description": "Stonework"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category_id = read_json(resp).await["id"].as_str().expect("category id").to_string();

    let resp = app
        .call(json_request(
            "POST",
            "/api/admin/services",
            Some(admin),
            &json!({
                "category_id": category_id,
                "name": format!("Wall repair {}", Uuid::new_v4()),
                "description": "Repoint a brick wall",
                "fixed_rate": "4500.00",
                "estimated_duration_hours": "3.5"
            }),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let service_id = read_json(resp).await["id"].as_str().expect("service id").to_string();
    Ok((category_id, service_id))
}

async fn add_address(app: &mut Router, bearer: &str) -> anyhow::Result<String> {
    let resp = app
        .call(json_request(
            "POST",
            "/api/addresses",
            Some(bearer),
            &json!({"street": "12 Fort Road", "city": "Colombo", "state": "Western", "postal_code": "00100"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    Ok(read_json(resp).await["id"].as_str().expect("address id").to_string())
}

async fn create_booking(
    app: &mut Router,
    bearer: &str,
    service_id: &str,
    address_id: &str,
) -> anyhow::Result<Value> {
    let start = (Utc::now() + Duration::days(1)).to_rfc3339();
    let end = (Utc::now() + Duration::days(1) + Duration::hours(4)).to_rfc3339();
    let resp = app
        .call(json_request(
            "POST",
            "/api/bookings",
            Some(bearer),
            &json!({
                "service_id": service_id,
                "address_id": address_id,
                "description": "Crumbling mortar on the garden wall",
                "preferred_start": start,
                "preferred_end": end
            }),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    Ok(read_json(resp).await)
}

#[tokio::test]
async fn full_marketplace_walkthrough() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let admin = admin_token(&mut app).await?;
    let (_, service_id) = seed_offering(&mut app, &admin).await?;

    // Customer books at the service's fixed rate
    let customer = verified_customer(&mut app, "walk_cust").await?;
    let address_id = add_address(&mut app, &customer).await?;
    let booking = create_booking(&mut app, &customer, &service_id, &address_id).await?;
    assert_eq!(booking["status"], "Pending");
    assert_eq!(booking["total_amount"], "4500.00");
    let booking_id = booking["id"].as_str().expect("booking id").to_string();

    // Technician gets approved and finds the job in the feed
    let (tech, tech_email) = pending_technician(&mut app, "walk_tech").await?;
    approve_technician(&mut app, &admin, &tech, &tech_email).await?;
    let resp = app
        .call(bare_request("GET", "/api/technician/jobs", Some(&tech)))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let feed = read_json(resp).await;
    assert!(feed
        .as_array()
        .expect("job feed")
        .iter()
        .any(|j| j["id"] == booking_id.as_str()));

    // Claim it, then walk the job to completion
    let resp = app
        .call(bare_request(
            "POST",
            &format!("/api/technician/jobs/{}/accept", booking_id),
            Some(&tech),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["status"], "Accepted");

    // A second claim on the same booking loses
    let resp = app
        .call(bare_request(
            "POST",
            &format!("/api/technician/jobs/{}/accept", booking_id),
            Some(&tech),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .call(json_request(
            "PATCH",
            &format!("/api/technician/jobs/{}/status", booking_id),
            Some(&tech),
            &json!({"status": "InProgress"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .call(json_request(
            "PATCH",
            &format!("/api/technician/jobs/{}/status", booking_id),
            Some(&tech),
            &json!({"status": "Completed"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let done = read_json(resp).await;
    assert_eq!(done["status"], "Completed");
    assert!(!done["work_completed_at"].is_null());

    // Completed is terminal
    let resp = app
        .call(json_request(
            "PATCH",
            &format!("/api/technician/jobs/{}/status", booking_id),
            Some(&tech),
            &json!({"status": "InProgress"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The customer sees the finished booking with the technician's name
    let resp = app
        .call(bare_request("GET", "/api/bookings/my", Some(&customer)))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let mine = read_json(resp).await;
    let row = mine
        .as_array()
        .expect("bookings list")
        .iter()
        .find(|b| b["id"] == booking_id.as_str())
        .expect("booking visible to its customer")
        .clone();
    assert_eq!(row["status"], "Completed");
    assert_eq!(row["technician_name"], "Flow Technician");

    // And cancelling it now is refused
    let resp = app
        .call(bare_request(
            "POST",
            &format!("/api/bookings/{}/cancel", booking_id),
            Some(&customer),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Admin board and dashboard reflect the walk
    let resp = app
        .call(bare_request("GET", "/api/admin/bookings?per_page=5", Some(&admin)))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let board = read_json(resp).await;
    assert!(board["total"].as_u64().expect("total") >= 1);
    assert!(board["items"].as_array().expect("items").len() <= 5);

    let resp = app
        .call(bare_request("GET", "/api/admin/dashboard", Some(&admin)))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = read_json(resp).await;
    assert!(stats["total_bookings"].as_u64().expect("bookings") >= 1);
    let revenue: rust_decimal::Decimal = stats["total_revenue"]
        .as_str()
        .expect("revenue is a decimal string")
        .parse()?;
    assert!(revenue >= rust_decimal::Decimal::new(450000, 2));
    Ok(())
}

#[tokio::test]
async fn unverified_technician_cannot_accept() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let admin = admin_token(&mut app).await?;
    let (_, service_id) = seed_offering(&mut app, &admin).await?;

    let customer = verified_customer(&mut app, "gate_cust").await?;
    let address_id = add_address(&mut app, &customer).await?;
    let booking = create_booking(&mut app, &customer, &service_id, &address_id).await?;
    let booking_id = booking["id"].as_str().expect("booking id");

    let (tech, _) = pending_technician(&mut app, "gate_tech").await?;
    let resp = app
        .call(bare_request(
            "POST",
            &format!("/api/technician/jobs/{}/accept", booking_id),
            Some(&tech),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn approval_without_documents_is_refused_over_http() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let admin = admin_token(&mut app).await?;

    let (_, tech_email) = pending_technician(&mut app, "nodocs_tech").await?;
    let resp = app
        .call(bare_request("GET", "/api/admin/technicians/pending", Some(&admin)))
        .await?;
    let pending = read_json(resp).await;
    let technician_id = pending
        .as_array()
        .expect("pending list")
        .iter()
        .find(|p| p["email"] == tech_email)
        .and_then(|p| p["technician_id"].as_str())
        .expect("technician queued")
        .to_string();

    let resp = app
        .call(json_request(
            "PUT",
            &format!("/api/admin/technicians/{}/verify", technician_id),
            Some(&admin),
            &json!({"status": "Approved"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Rejection needs no documents
    let resp = app
        .call(json_request(
            "PUT",
            &format!("/api/admin/technicians/{}/verify", technician_id),
            Some(&admin),
            &json!({"status": "Rejected"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["verification_status"], "Rejected");
    Ok(())
}

#[tokio::test]
async fn customer_cancels_pending_booking() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let admin = admin_token(&mut app).await?;
    let (_, service_id) = seed_offering(&mut app, &admin).await?;

    let customer = verified_customer(&mut app, "cancel_cust").await?;
    let address_id = add_address(&mut app, &customer).await?;
    let booking = create_booking(&mut app, &customer, &service_id, &address_id).await?;
    let booking_id = booking["id"].as_str().expect("booking id");

    let resp = app
        .call(bare_request(
            "POST",
            &format!("/api/bookings/{}/cancel", booking_id),
            Some(&customer),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["status"], "Cancelled");

    // Cancelled is terminal too
    let resp = app
        .call(bare_request(
            "POST",
            &format!("/api/bookings/{}/cancel", booking_id),
            Some(&customer),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn role_guards_separate_the_routers() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let customer = verified_customer(&mut app, "guard_cust").await?;
    let (tech, _) = pending_technician(&mut app, "guard_tech").await?;

    // Customer on a technician route
    let resp = app
        .call(bare_request("GET", "/api/technician/jobs", Some(&customer)))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Technician on an admin route
    let resp = app
        .call(bare_request("GET", "/api/admin/dashboard", Some(&tech)))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Technician on a customer route
    let resp = app
        .call(bare_request("GET", "/api/bookings/my", Some(&tech)))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // No token at all
    let resp = app.call(bare_request("GET", "/api/admin/dashboard", None)).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let resp = app
        .call(bare_request("GET", "/api/profile", Some("not-a-jwt")))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn category_names_conflict_over_http() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let admin = admin_token(&mut app).await?;

    let name = format!("Roofing {}", Uuid::new_v4());
    let resp = app
        .call(json_request(
            "POST",
            "/api/admin/categories",
            Some(&admin),
            &json!({"name": name}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same name, different case
    let resp = app
        .call(json_request(
            "POST",
            "/api/admin/categories",
            Some(&admin),
            &json!({"name": name.to_uppercase()}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn category_with_services_cannot_be_deleted() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut app = build_app().await?;
    let admin = admin_token(&mut app).await?;
    let (category_id, service_id) = seed_offering(&mut app, &admin).await?;

    let resp = app
        .call(bare_request(
            "DELETE",
            &format!("/api/admin/categories/{}", category_id),
            Some(&admin),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Removing the service first unblocks the category
    let resp = app
        .call(bare_request(
            "DELETE",
            &format!("/api/admin/services/{}", service_id),
            Some(&admin),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = app
        .call(bare_request(
            "DELETE",
            &format!("/api/admin/categories/{}", category_id),
            Some(&admin),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    Ok(())
}
