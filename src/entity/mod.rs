pub mod competition;
pub mod competition_judge;
pub mod competition_registration;
pub mod competition_result;
pub mod competition_score;
pub mod competition_submission;
pub mod login_log;
pub mod notification;
pub mod project;
pub mod project_extension;
pub mod project_file;
pub mod project_milestone;
pub mod project_review;
pub mod project_status_history;
pub mod project_type;
pub mod role;
pub mod student_teacher;
pub mod system_alert;
pub mod system_diagnostic;
pub mod system_health_log;
pub mod system_log;
pub mod system_setting;
pub mod user;
pub mod user_profile;
pub mod user_role;
