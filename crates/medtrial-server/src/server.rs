use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, demo_auth, handlers, state::AppState};

pub struct MedtrialServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        // Demo auth
        .route("/login", post(demo_auth::login))
        .route("/logout", post(demo_auth::logout))
        // Dashboard
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/dashboard/top-doctors", get(handlers::dashboard::top_doctors))
        // Patients
        .route(
            "/patients",
            get(handlers::patients::list).post(handlers::patients::create),
        )
        .route(
            "/patients/{id}",
            axum::routing::put(handlers::patients::update).delete(handlers::patients::delete),
        )
        .route(
            "/patients/filter-by-address",
            get(handlers::patients::filter_by_address),
        )
        .route(
            "/patients/filter-by-sex",
            get(handlers::patients::filter_by_sex),
        )
        // Doctors
        .route("/medici", get(handlers::doctors::list))
        .route(
            "/medici/procent-experienta",
            get(handlers::doctors::experience_percent),
        )
        // Drugs
        .route("/medicamente", get(handlers::drugs::list))
        .route(
            "/medicamente/avansate",
            get(handlers::drugs::priced_above_average),
        )
        // Manufacturers
        .route("/producatori", get(handlers::manufacturers::search))
        .route("/producatori/tari", get(handlers::manufacturers::countries))
        .route(
            "/producatori/medicamente",
            get(handlers::manufacturers::with_drug_flag),
        )
        // Clinics
        .route(
            "/cabinets",
            get(handlers::clinics::list).post(handlers::clinics::create),
        )
        .route(
            "/cabinets/{id}",
            axum::routing::put(handlers::clinics::update).delete(handlers::clinics::delete),
        )
        .route("/cabinets/above-average", get(handlers::clinics::above_average))
        // Doctor-to-clinic assignments
        .route(
            "/medic-cabinete",
            get(handlers::assignments::list).post(handlers::assignments::create),
        )
        .route(
            "/medic-cabinete/{id}",
            axum::routing::put(handlers::assignments::update)
                .delete(handlers::assignments::delete),
        )
        .route("/medic-cabinete-join", get(handlers::assignments::detailed))
        .route(
            "/medici-cabinete-durata-max",
            get(handlers::assignments::longest_activity),
        )
        .route(
            "/medici-multiple-roluri",
            get(handlers::assignments::multiple_roles),
        )
        .route("/medici-activi", get(handlers::assignments::active))
        // Medical history
        .route(
            "/istoric-medical",
            get(handlers::medical_history::list).post(handlers::medical_history::create),
        )
        .route(
            "/istoric-medical/{id}",
            axum::routing::put(handlers::medical_history::update)
                .delete(handlers::medical_history::delete),
        )
        .route(
            "/istoric-medical/filter",
            get(handlers::medical_history::filter),
        )
        // Clinical trials
        .route(
            "/testare-clinica",
            get(handlers::trials::list).post(handlers::trials::create),
        )
        .route(
            "/testare-clinica/{id}",
            axum::routing::put(handlers::trials::update).delete(handlers::trials::delete),
        )
        .route(
            "/testari-clinice-in-progres",
            get(handlers::trials::in_progress),
        )
        .route(
            "/testari-clinice-pacienti",
            get(handlers::trials::patient_counts),
        )
        .route(
            "/testari-clinice-filtrate",
            get(handlers::trials::started_before),
        )
        // Trial results
        .route(
            "/rezultate-testare",
            get(handlers::trial_results::list).post(handlers::trial_results::create),
        )
        .route(
            "/rezultate-testare/{id}",
            axum::routing::put(handlers::trial_results::update)
                .delete(handlers::trial_results::delete),
        )
        .route(
            "/rezultate-testare/filter-reactii-adverse",
            get(handlers::trial_results::filter_by_adverse_reaction),
        )
        .route(
            "/rezultate-testare/statistici-testare",
            get(handlers::trial_results::statistics),
        )
        // Middleware stack
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    pool: Option<medtrial_db::PgPool>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            pool: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn with_pool(mut self, pool: medtrial_db::PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub async fn build(self) -> anyhow::Result<MedtrialServer> {
        let pool = match self.pool {
            Some(pool) => pool,
            None => {
                medtrial_db::create_pool(&self.config.storage.postgres.to_pool_config()).await?
            }
        };

        let state = AppState::new(pool, self.config.auth.clone());
        let app = build_app(state);

        Ok(MedtrialServer {
            addr: self.addr,
            app,
        })
    }
}

impl MedtrialServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    // A lazy pool never connects, so every route that stops before its
    // first query (validation failures, auth) can be exercised without
    // a database.
    fn test_app() -> Router {
        let pool = sqlx_core::pool::PoolOptions::<sqlx_postgres::Postgres>::new()
            .connect_lazy("postgres://localhost/medtrial_test")
            .unwrap();
        build_app(AppState::new(pool, crate::config::AuthSettings::default()))
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn json_put(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(resp: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_responds() {
        let resp = test_app().oneshot(get_req("/healthz")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_accepts_admin_credentials() {
        let resp = test_app()
            .oneshot(json_post(
                "/login",
                r#"{"email":"ana_fedeles10@yahoo.com","password":"Parola1234"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Success");
        assert_eq!(json["isAdmin"], true);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let resp = test_app()
            .oneshot(json_post(
                "/login",
                r#"{"email":"ana_fedeles10@yahoo.com","password":"wrong"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn login_rejects_missing_fields() {
        let resp = test_app().oneshot(json_post("/login", "{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_confirms() {
        let resp = test_app()
            .oneshot(json_post("/logout", ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "User logged out successfully");
    }

    #[tokio::test]
    async fn create_patient_rejects_missing_fields() {
        let resp = test_app()
            .oneshot(json_post("/patients", r#"{"Nume":"Popescu"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(
            json["message"],
            "Toate câmpurile obligatorii trebuie completate."
        );
    }

    #[tokio::test]
    async fn create_patient_rejects_bad_sex_code() {
        let body = r#"{
            "Nume":"Popescu","Prenume":"Ion","Sex":"X",
            "DataNasterii":"1990-04-12","CNP":"1900412123456","NrTelefon":"0722000000"
        }"#;
        let resp = test_app().oneshot(json_post("/patients", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Sexul trebuie să fie 'M' sau 'F'.");
    }

    #[tokio::test]
    async fn update_patient_rejects_short_cnp() {
        let body = r#"{
            "Nume":"Popescu","Prenume":"Ion","Sex":"F",
            "DataNasterii":"1990-04-12","CNP":"123","NrTelefon":"0722000000"
        }"#;
        let resp = test_app()
            .oneshot(json_put("/patients/7", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "CNP-ul trebuie să conțină exact 13 caractere.");
    }

    #[tokio::test]
    async fn create_clinic_rejects_missing_fields() {
        let resp = test_app()
            .oneshot(json_post("/cabinets", r#"{"NumeCabinet":"Central"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Toate câmpurile sunt obligatorii");
    }

    #[tokio::test]
    async fn address_filter_requires_param() {
        let resp = test_app()
            .oneshot(get_req("/patients/filter-by-address"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Adresa este necesară pentru filtrare.");
    }

    #[tokio::test]
    async fn blood_type_filter_requires_param() {
        let resp = test_app()
            .oneshot(get_req("/istoric-medical/filter"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Parametrul 'GrupaSanguina' este obligatoriu.");
    }

    #[tokio::test]
    async fn trial_date_filter_requires_param() {
        let resp = test_app()
            .oneshot(get_req("/testari-clinice-filtrate"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Parametrul 'data' este obligatoriu.");
    }

    #[tokio::test]
    async fn adverse_reaction_filter_rejects_blank_search() {
        let resp = test_app()
            .oneshot(get_req(
                "/rezultate-testare/filter-reactii-adverse?search=%20%20",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Textul de căutare este obligatoriu.");
    }

    #[tokio::test]
    async fn manufacturer_sort_is_allow_listed() {
        let resp = test_app()
            .oneshot(get_req("/producatori?sort=DROP%20TABLE"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let resp = test_app().oneshot(get_req("/no-such-route")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
