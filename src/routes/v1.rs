use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/advisors", advisor_routes())
        .nest("/projects", project_routes())
        .nest("/project-types", project_type_routes())
        .nest("/competitions", competition_routes())
        .nest("/notifications", notification_routes())
        .nest("/system", system_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::user::list_users,
            handlers::user::create_user
        ))
        .routes(routes!(handlers::user::user_stats))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user,
            handlers::user::delete_user
        ))
        .routes(routes!(handlers::user::toggle_user_status))
        .routes(routes!(handlers::user::reset_password))
}

fn advisor_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::advisor::list_teachers))
        .routes(routes!(handlers::advisor::bind_student))
        .routes(routes!(handlers::advisor::choose_advisor))
        .routes(routes!(handlers::advisor::unbind_student))
        .routes(routes!(handlers::advisor::list_my_students))
        .routes(routes!(handlers::advisor::list_my_advisors))
}

fn project_type_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::project_type::list_project_types,
            handlers::project_type::create_project_type
        ))
        .routes(routes!(handlers::project_type::project_type_stats))
        .routes(routes!(
            handlers::project_type::get_project_type,
            handlers::project_type::update_project_type,
            handlers::project_type::delete_project_type
        ))
}

fn project_routes() -> OpenApiRouter<AppState> {
    let core = OpenApiRouter::new()
        .routes(routes!(
            handlers::project::list_projects,
            handlers::project::create_project
        ))
        .routes(routes!(handlers::project::project_stats))
        .routes(routes!(
            handlers::project::get_project,
            handlers::project::update_project,
            handlers::project::delete_project
        ))
        .routes(routes!(handlers::project::restore_project))
        .routes(routes!(handlers::project::submit_project))
        .routes(routes!(handlers::project::review_project))
        .routes(routes!(handlers::project::list_project_reviews))
        .routes(routes!(handlers::project::list_status_history))
        .routes(routes!(handlers::project::force_status))
        .routes(routes!(handlers::project::update_progress));

    let milestones = OpenApiRouter::new()
        .routes(routes!(
            handlers::milestone::create_milestone,
            handlers::milestone::list_milestones
        ))
        .routes(routes!(
            handlers::milestone::update_milestone,
            handlers::milestone::delete_milestone
        ));

    let extensions = OpenApiRouter::new()
        .routes(routes!(
            handlers::extension::apply_for_extension,
            handlers::extension::list_extensions
        ))
        .routes(routes!(handlers::extension::list_pending_extensions))
        .routes(routes!(handlers::extension::review_extension));

    let files = OpenApiRouter::new()
        .routes(routes!(
            handlers::file::upload_project_file,
            handlers::file::list_project_files
        ))
        .routes(routes!(handlers::file::download_project_file))
        .routes(routes!(handlers::file::review_project_file))
        .routes(routes!(handlers::file::delete_project_file))
        .layer(handlers::file::upload_body_limit());

    core.merge(milestones).merge(extensions).merge(files)
}

fn competition_routes() -> OpenApiRouter<AppState> {
    let core = OpenApiRouter::new()
        .routes(routes!(
            handlers::competition::list_competitions,
            handlers::competition::create_competition
        ))
        .routes(routes!(handlers::competition::competition_stats))
        .routes(routes!(
            handlers::competition::get_competition,
            handlers::competition::update_competition,
            handlers::competition::delete_competition
        ))
        .routes(routes!(handlers::competition::toggle_open));

    let registrations = OpenApiRouter::new()
        .routes(routes!(
            handlers::registration::register,
            handlers::registration::list_registrations
        ))
        .routes(routes!(handlers::registration::withdraw))
        .routes(routes!(handlers::registration::list_my_registrations))
        .routes(routes!(handlers::registration::list_pending_reviews))
        .routes(routes!(handlers::registration::teacher_review))
        .routes(routes!(handlers::registration::verify_registration));

    let judging = OpenApiRouter::new()
        .routes(routes!(
            handlers::judging::submit_entry,
            handlers::judging::list_submissions
        ))
        .routes(routes!(handlers::judging::list_my_submissions))
        .routes(routes!(
            handlers::judging::assign_judge,
            handlers::judging::list_judges
        ))
        .routes(routes!(handlers::judging::deactivate_judge))
        .routes(routes!(
            handlers::judging::submit_score,
            handlers::judging::list_scores
        ))
        .routes(routes!(handlers::judging::judging_progress))
        .routes(routes!(
            handlers::judging::register_result,
            handlers::judging::list_results
        ))
        .routes(routes!(handlers::judging::finalize_results))
        .layer(handlers::file::upload_body_limit());

    core.merge(registrations).merge(judging)
}

fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::notification::list_notifications))
        .routes(routes!(handlers::notification::unread_count))
        .routes(routes!(handlers::notification::mark_read))
        .routes(routes!(handlers::notification::mark_all_read))
        .routes(routes!(handlers::notification::delete_notification))
        .routes(routes!(handlers::notification::send_notification))
}

fn system_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::system::list_logs))
        .routes(routes!(handlers::system::log_summary))
        .routes(routes!(handlers::system::cleanup_logs))
        .routes(routes!(handlers::system::record_health))
        .routes(routes!(handlers::system::list_health_logs))
        .routes(routes!(handlers::system::health_summary))
        .routes(routes!(handlers::system::list_settings))
        .routes(routes!(
            handlers::system::get_setting,
            handlers::system::upsert_setting
        ))
        .routes(routes!(handlers::system::set_maintenance_mode))
        .routes(routes!(handlers::system::list_alerts))
        .routes(routes!(handlers::system::acknowledge_alert))
        .routes(routes!(handlers::system::resolve_alert))
        .routes(routes!(handlers::system::list_diagnostics))
        .routes(routes!(handlers::system::run_diagnostics))
        .routes(routes!(handlers::system::dashboard_stats))
}
