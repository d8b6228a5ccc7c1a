use crate::{
    api::{attendance, payroll, qrcode, report, shift},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("rate limit period and burst are non-zero");
        Governor::new(&cfg)
    }

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let qr_limiter = Arc::new(build_limiter(config.rate_qr_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/shift")
                    // /shift
                    .service(
                        web::resource("")
                            .route(web::post().to(shift::create_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    // /shift/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(shift::get_shift))
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::deactivate_shift)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::put().to(attendance::check_out))
                            .route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/qr
                    .service(
                        web::resource("/qr")
                            .wrap(qr_limiter)
                            .route(web::post().to(attendance::qr_scan)),
                    )
                    // /attendance/classify
                    .service(
                        web::resource("/classify")
                            .route(web::post().to(report::classify_records)),
                    )
                    // /attendance/summary
                    .service(
                        web::resource("/summary")
                            .route(web::post().to(report::summarize_records))
                            .route(web::get().to(report::monthly_summary)),
                    )
                    // /attendance/records
                    .service(
                        web::resource("/records").route(web::get().to(report::list_records)),
                    ),
            )
            .service(
                // /qrcode
                web::resource("/qrcode").route(web::post().to(qrcode::issue_qr_code)),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
                    // /payroll/calculate
                    .service(
                        web::resource("/calculate")
                            .route(web::post().to(payroll::calculate_payroll)),
                    )
                    // /payroll/{id}
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll))),
            ),
    );
}

// QR ATTENDANCE
//  ├─ HR/Admin: POST /qrcode { shift_id, kind } -> signed token (5 min)
//  └─ Employee: POST /attendance/qr { token } -> check-in / check-out
