//! Router assembly: one nested router per portal behind shared layers.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{config, Environment};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_roles};
use crate::state::AppState;
use crate::types::Portal;

type Roles = &'static [&'static str];

const ADMIN: Roles = &["admin"];
const STUDENT: Roles = &["student"];
const TUTOR: Roles = &["tutor"];
const CLIENT: Roles = &["client"];
const FREELANCER: Roles = &["freelancer"];
const CUSTOMER: Roles = &["customer"];
const SALESMAN: Roles = &["salesman"];

/// Restrict every route of `router` to the given roles.
fn only(roles: Roles, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(roles, require_roles))
}

/// Require a token issued by `portal` on every route of `router`.
fn authenticated(portal: Portal, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(portal, jwt_auth_middleware))
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/registration", registration_routes())
        .nest("/tutoring", tutoring_routes())
        .nest("/freelance", freelance_routes())
        .nest("/store", store_routes())
        .fallback(fallback)
        .layer(cors_layer());

    let router = if config().api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };
    router.with_state(state)
}

fn cors_layer() -> CorsLayer {
    let security = &config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if config().environment == Environment::Development || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn registration_routes() -> Router<AppState> {
    use elevated::registration as admin;
    use protected::registration as student;

    let student_routes = only(
        STUDENT,
        Router::new()
            .route("/api/courses", get(student::list_courses))
            .route("/api/enrollments", post(student::register))
            .route("/api/enrollments/:course_id", delete(student::drop_course))
            .route("/api/schedule", get(student::schedule))
            .route("/api/prerequisites", get(student::prerequisites)),
    );

    let admin_routes = only(
        ADMIN,
        Router::new()
            .route("/api/admin/courses", get(admin::list_courses).post(admin::create_course))
            .route(
                "/api/admin/courses/:id",
                get(admin::get_course).put(admin::update_course).delete(admin::delete_course),
            )
            .route("/api/admin/courses/:id/seats", put(admin::set_seats))
            .route("/api/admin/students", get(admin::list_students).post(admin::create_student))
            .route("/api/admin/students/:id/register", post(admin::register_student))
            .route("/api/admin/students/:id/drop", post(admin::drop_student))
            .route("/api/admin/reports/courses/available", get(admin::report_available_courses))
            .route("/api/admin/reports/courses/prerequisites", get(admin::report_prerequisites))
            .route("/api/admin/reports/courses/:id/students", get(admin::report_course_students)),
    );

    Router::new()
        .route("/auth/login", post(public::registration::login))
        .merge(authenticated(Portal::Registration, student_routes.merge(admin_routes)))
}

fn tutoring_routes() -> Router<AppState> {
    use elevated::tutoring as admin;
    use protected::tutoring as member;

    let tutor_routes = only(
        TUTOR,
        Router::new()
            .route("/api/tutor/profile", get(member::tutor_profile).put(member::update_tutor_profile))
            .route("/api/sessions/tutor", get(member::tutor_sessions))
            .route("/api/sessions/earnings", get(member::earnings))
            .route("/api/sessions/:id/accept", post(member::accept_session))
            .route("/api/sessions/:id/decline", post(member::decline_session))
            .route("/api/sessions/:id/complete", post(member::complete_session)),
    );

    let student_routes = only(
        STUDENT,
        Router::new()
            .route("/api/sessions", post(member::book_session))
            .route("/api/sessions/student", get(member::student_sessions))
            .route("/api/wishlist", get(member::wishlist).post(member::add_to_wishlist))
            .route("/api/wishlist/:tutor_id", delete(member::remove_from_wishlist))
            .route("/api/reviews", post(member::create_review)),
    );

    let admin_routes = only(
        ADMIN,
        Router::new()
            .route("/api/admin/tutors", get(admin::list_tutors))
            .route("/api/admin/tutors/:id/verify", post(admin::verify_tutor))
            .route("/api/admin/reports/popular-subjects", get(admin::popular_subjects))
            .route("/api/admin/reports/session-completion-rate", get(admin::session_completion_rate))
            .route("/api/admin/reports/usage-by-city", get(admin::usage_by_city))
            .route("/api/admin/reports/user-growth", get(admin::user_growth)),
    );

    Router::new()
        .route("/auth/signup", post(public::tutoring::signup))
        .route("/auth/login", post(public::tutoring::login))
        .route("/tutors", get(public::tutoring::search_tutors))
        .route("/tutors/:id/reviews", get(public::tutoring::tutor_reviews))
        .merge(authenticated(
            Portal::Tutoring,
            tutor_routes.merge(student_routes).merge(admin_routes),
        ))
}

fn freelance_routes() -> Router<AppState> {
    use elevated::freelance as admin;
    use protected::freelance as member;

    // Ownership of projects, bids and reviews is checked in the service.
    let member_routes = Router::new()
        .route("/api/me", get(member::me))
        .route("/api/users/me", put(member::update_profile))
        .route("/api/users/me/portfolio", post(member::add_portfolio_item))
        .route("/api/users/me/portfolio/:item_id", delete(member::delete_portfolio_item))
        .route("/api/verifications", post(member::request_verification))
        .route("/api/projects", get(member::list_projects))
        .route(
            "/api/projects/:id",
            get(member::get_project).put(member::update_project).delete(member::delete_project),
        )
        .route("/api/projects/:id/milestones/:milestone_id", put(member::update_milestone))
        .route("/api/projects/:id/time-logs", post(member::log_time))
        .route("/api/bids/project/:project_id", get(member::project_bids))
        .route("/api/notifications", get(member::notifications))
        .route("/api/notifications/:id/read", put(member::mark_notification_read));

    let client_routes = only(
        CLIENT,
        Router::new()
            .route("/api/projects", post(member::create_project))
            .route("/api/projects/:id/assign", put(member::assign_freelancer))
            .route("/api/projects/:id/milestones", post(member::add_milestone))
            .route("/api/bids/:id/counter", put(member::counter_bid))
            .route("/api/bids/:id/status", put(member::decide_bid))
            .route("/api/reviews", post(member::create_review)),
    );

    let freelancer_routes = only(
        FREELANCER,
        Router::new()
            .route("/api/bids", post(member::place_bid))
            .route("/api/bids/my", get(member::my_bids))
            .route("/api/bids/:id", put(member::update_bid))
            .route("/api/reviews/:id/respond", put(member::respond_to_review)),
    );

    let admin_routes = only(
        ADMIN,
        Router::new()
            .route("/api/admin/users", get(admin::list_users))
            .route("/api/admin/users/:id/role", put(admin::set_user_role))
            .route("/api/admin/users/:id/suspend", put(admin::suspend_user))
            .route("/api/admin/verifications", get(admin::verification_requests))
            .route("/api/admin/verifications/:id/approve", put(admin::approve_verification))
            .route("/api/admin/verifications/:id/reject", put(admin::reject_verification))
            .route("/api/admin/dashboard", get(admin::dashboard))
            .route("/api/admin/reviews", get(admin::all_reviews))
            .route("/api/admin/action-logs", get(admin::action_logs))
            .route("/api/admin/analytics/platform", get(admin::platform_stats))
            .route("/api/admin/analytics/skills", get(admin::skill_popularity))
            .route("/api/admin/analytics/revenue", get(admin::revenue_stats))
            .route("/api/admin/analytics/signup-trends", get(admin::signup_trends))
            .route("/api/admin/analytics/project-trends", get(admin::project_trends)),
    );

    Router::new()
        .route("/auth/signup", post(public::freelance::signup))
        .route("/auth/login", post(public::freelance::login))
        .route("/users/:id", get(public::freelance::public_profile))
        .route("/reviews/freelancer/:id", get(public::freelance::freelancer_reviews))
        .merge(authenticated(
            Portal::Freelance,
            member_routes
                .merge(client_routes)
                .merge(freelancer_routes)
                .merge(admin_routes),
        ))
}

fn store_routes() -> Router<AppState> {
    use elevated::storefront as admin;
    use protected::storefront as member;

    let account_routes = Router::new()
        .route("/api/users/profile", get(member::profile).put(member::update_profile))
        .route("/api/users/verify-token", get(member::verify_token))
        .route("/api/orders/track/:id", get(member::track_order));

    let customer_routes = only(
        CUSTOMER,
        Router::new()
            .route("/api/cart", get(member::cart))
            .route("/api/cart/add", post(member::add_to_cart))
            .route("/api/cart/update", put(member::update_cart))
            .route("/api/cart/remove/:product_code", delete(member::remove_from_cart))
            .route("/api/wishlist", get(member::wishlist))
            .route("/api/wishlist/add", post(member::add_to_wishlist))
            .route("/api/wishlist/remove", delete(member::remove_from_wishlist))
            .route("/api/orders/place", post(member::place_order))
            .route("/api/orders/history", get(member::order_history))
            .route("/api/orders/cancel/:id", put(member::cancel_order)),
    );

    let salesman_routes = only(
        SALESMAN,
        Router::new()
            .route("/api/salesman/dashboard", get(member::salesman_dashboard))
            .route("/api/salesman/orders", get(member::salesman_orders))
            .route("/api/salesman/sales-report", get(member::salesman_sales_report))
            .route("/api/salesman/orders/:id/status", put(member::salesman_set_status)),
    );

    let admin_routes = only(
        ADMIN,
        Router::new()
            .route("/api/admin/users", get(admin::list_users).post(admin::create_user))
            .route(
                "/api/admin/users/:id",
                get(admin::get_user).put(admin::update_user).delete(admin::delete_user),
            )
            .route("/api/admin/roles", get(admin::roles))
            .route("/api/admin/products", get(admin::list_products).post(admin::create_product))
            .route("/api/admin/products/low-stock", get(admin::low_stock))
            .route("/api/admin/products/top", get(admin::top_products))
            .route("/api/admin/products/category-sales", get(admin::category_sales))
            .route(
                "/api/admin/products/:id",
                get(admin::get_product).put(admin::update_product).delete(admin::delete_product),
            )
            .route("/api/admin/products/:id/restock", post(admin::restock))
            .route("/api/admin/orders", get(admin::list_orders).post(admin::create_order))
            .route("/api/admin/orders/recent", get(admin::recent_orders))
            .route(
                "/api/admin/orders/:id",
                get(admin::get_order).put(admin::set_order_status).delete(admin::delete_order),
            )
            .route("/api/admin/orders/:id/assign", put(admin::assign_salesman))
            .route("/api/admin/dashboard", get(admin::dashboard))
            .route("/api/admin/sales-report", get(admin::sales_report))
            .route("/api/admin/metrics/summary", get(admin::summary_metrics))
            .route("/api/admin/metrics/orders", get(admin::order_metrics))
            .route("/api/admin/metrics/customers", get(admin::customer_metrics))
            .route("/api/admin/metrics/sales-analytics", get(admin::sales_analytics))
            .route("/api/admin/settings/change-password", post(admin::change_password))
            .route("/api/admin/settings/reset-user-password/:id", post(admin::reset_user_password))
            .route("/api/admin/settings/generate-password/:id", post(admin::generate_password)),
    );

    Router::new()
        .route("/auth/signup", post(public::storefront::signup))
        .route("/auth/login", post(public::storefront::login))
        .route("/products", get(public::storefront::list_products))
        .route("/products/id/:id", get(public::storefront::product_by_id))
        .route("/products/:product_code", get(public::storefront::product_by_code))
        .merge(authenticated(
            Portal::Store,
            account_routes
                .merge(customer_routes)
                .merge(salesman_routes)
                .merge(admin_routes),
        ))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Portal Suite",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Course registration, tutoring, freelancing and storefront portals",
            "portals": {
                "registration": "/registration/auth/*, /registration/api/*",
                "tutoring": "/tutoring/auth/*, /tutoring/tutors, /tutoring/api/*",
                "freelance": "/freelance/auth/*, /freelance/users/:id, /freelance/api/*",
                "store": "/store/auth/*, /store/products, /store/api/*",
            },
            "admin": "/<portal>/api/admin/* (admin role)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}

async fn fallback() -> ApiError {
    ApiError::not_found("Route not found")
}
