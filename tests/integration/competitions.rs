use serde_json::json;

use crate::common::{TestApp, routes};

mod management {
    use super::*;

    #[tokio::test]
    async fn teacher_can_create_a_draft_competition() {
        let app = TestApp::spawn().await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Provincial Data Challenge",
                    "description": "Annual data mining contest",
                    "level": "provincial",
                    "registration_start": "2020-01-01T00:00:00Z",
                    "registration_end": "2099-01-01T00:00:00Z",
                    "submission_start": "2020-01-02T00:00:00Z",
                    "submission_end": "2099-01-02T00:00:00Z",
                }),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["is_open"], false);
        assert_eq!(res.body["current_participants"], 0);
    }

    #[tokio::test]
    async fn student_cannot_create_a_competition() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Rogue Contest",
                    "description": "desc",
                    "level": "school",
                    "registration_start": "2020-01-01T00:00:00Z",
                    "registration_end": "2099-01-01T00:00:00Z",
                    "submission_start": "2020-01-02T00:00:00Z",
                    "submission_end": "2099-01-02T00:00:00Z",
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn inverted_registration_window_is_rejected() {
        let app = TestApp::spawn().await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Backwards",
                    "description": "desc",
                    "level": "school",
                    "registration_start": "2099-01-01T00:00:00Z",
                    "registration_end": "2020-01-01T00:00:00Z",
                    "submission_start": "2099-01-02T00:00:00Z",
                    "submission_end": "2099-02-02T00:00:00Z",
                }),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn drafts_are_hidden_from_students() {
        let app = TestApp::spawn().await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;
        let id = app.create_competition(&teacher, "Hidden Draft").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let list = app.get_with_token(routes::COMPETITIONS, &student).await;
        assert_eq!(list.status, 200);
        assert!(list.body["data"].as_array().unwrap().is_empty());

        let detail = app.get_with_token(&routes::competition(id), &student).await;
        assert_eq!(detail.status, 404);
    }

    #[tokio::test]
    async fn opening_a_draft_moves_it_to_registration() {
        let app = TestApp::spawn().await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;
        let id = app.create_competition(&teacher, "Openable").await;

        let res = app
            .post_with_token(&routes::competition_toggle_open(id), &json!({}), &teacher)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_open"], true);
        assert_eq!(res.body["status"], "registration");
    }

    #[tokio::test]
    async fn only_the_creator_or_an_admin_can_edit() {
        let app = TestApp::spawn().await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;
        let other = app.create_user_with_role("other_prof", "securepass", "teacher").await;
        let id = app.create_competition(&teacher, "Guarded Contest").await;

        let res = app
            .patch_with_token(&routes::competition(id), &json!({"title": "Hijacked"}), &other)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_can_delete_a_competition_with_its_registrations() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "Doomed Contest").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let reg = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = app.delete_with_token(&routes::competition(id), &admin).await;
        assert_eq!(res.status, 204);

        let gone = app.get_with_token(&routes::competition(id), &admin).await;
        assert_eq!(gone.status, 404);
    }
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn student_can_register_for_an_open_competition() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "Open Contest").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .post_with_token(
                &routes::competition_registrations(id),
                &json!({"team_name": "Team Rocket"}),
                &student,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "registered");
        assert_eq!(res.body["teacher_review_status"], "pending");

        let detail = app.get_with_token(&routes::competition(id), &student).await;
        assert_eq!(detail.body["current_participants"], 1);
    }

    #[tokio::test]
    async fn cannot_register_when_registration_is_closed() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_competition(&admin, "Closed Contest").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "Once Only").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let first = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        assert_eq!(first.status, 201, "First registration failed: {}", first.text);

        let res = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn capacity_is_enforced() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Tiny Contest",
                    "description": "One seat",
                    "level": "school",
                    "registration_start": "2020-01-01T00:00:00Z",
                    "registration_end": "2099-01-01T00:00:00Z",
                    "submission_start": "2020-01-02T00:00:00Z",
                    "submission_end": "2099-01-02T00:00:00Z",
                    "max_participants": 1,
                }),
                &admin,
            )
            .await;
        let id = res.id();
        app.post_with_token(&routes::competition_toggle_open(id), &json!({}), &admin)
            .await;

        let alice = app.create_authenticated_user("alice", "securepass").await;
        let taken = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &alice)
            .await;
        assert_eq!(taken.status, 201, "First registration failed: {}", taken.text);

        let bob = app.create_authenticated_user("bob", "securepass").await;
        let full = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &bob)
            .await;

        assert_eq!(full.status, 409);
        assert_eq!(full.body["message"], "Competition is full");
    }

    #[tokio::test]
    async fn withdrawing_frees_the_seat() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "Revolving Door").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let reg = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = app
            .delete_with_token(&routes::competition_withdraw(id), &student)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "withdrawn");

        let detail = app.get_with_token(&routes::competition(id), &student).await;
        assert_eq!(detail.body["current_participants"], 0);

        // A withdrawn student may register again.
        let again = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        assert_eq!(again.status, 201);
    }

    #[tokio::test]
    async fn advisor_can_sign_off_on_a_registration() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let teacher_id = app.user_id("prof").await;
        let student_id = app.user_id("alice").await;
        app.bind_advisor(student_id, teacher_id).await;

        let id = app.create_open_competition(&admin, "Signed Contest").await;
        let reg = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        let reg_id = reg.id();

        let pending = app
            .get_with_token(routes::REGISTRATIONS_PENDING_REVIEW, &teacher)
            .await;
        assert_eq!(pending.status, 200);
        assert_eq!(pending.body.as_array().unwrap().len(), 1);

        let res = app
            .post_with_token(
                &routes::registration_teacher_review(id, reg_id),
                &json!({"verdict": "approved", "comment": "Good luck"}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["teacher_review_status"], "approved");
    }

    #[tokio::test]
    async fn non_advisor_teacher_cannot_sign_off() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let outsider = app.create_user_with_role("other_prof", "securepass", "teacher").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let id = app.create_open_competition(&admin, "Unadvised Contest").await;
        let reg = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        let reg_id = reg.id();

        let res = app
            .post_with_token(
                &routes::registration_teacher_review(id, reg_id),
                &json!({"verdict": "approved"}),
                &outsider,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_verification_of_a_rejected_registration_frees_the_seat() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "Verified Contest").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let reg = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        let reg_id = reg.id();

        let res = app
            .post_with_token(
                &routes::registration_verify(id, reg_id),
                &json!({"verdict": "rejected"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "rejected");

        let detail = app.get_with_token(&routes::competition(id), &admin).await;
        assert_eq!(detail.body["current_participants"], 0);
    }

    #[tokio::test]
    async fn student_sees_their_own_registrations() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "Mine Contest").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        app.post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;

        let res = app.get_with_token(routes::MY_REGISTRATIONS, &student).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }
}

mod judging {
    use super::*;

    /// Open competition with a registered student and an assigned judge.
    /// Returns (admin, student, judge_token, competition_id).
    async fn judged_competition(app: &TestApp) -> (String, String, String, i32) {
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let judge = app.create_user_with_role("judge_prof", "securepass", "teacher").await;
        let judge_id = app.user_id("judge_prof").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let id = app.create_open_competition(&admin, "Judged Contest").await;
        let reg = app
            .post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let assigned = app
            .post_with_token(
                &routes::competition_judges(id),
                &json!({"teacher_id": judge_id}),
                &admin,
            )
            .await;
        assert_eq!(assigned.status, 201, "Judge assignment failed: {}", assigned.text);

        (admin, student, judge, id)
    }

    async fn submit_entry(app: &TestApp, id: i32, student: &str) -> i32 {
        let res = app
            .upload_with_token(
                &routes::competition_submissions(id),
                "entry.zip",
                b"entry bytes".to_vec(),
                &[("description", "Our solution")],
                student,
            )
            .await;
        assert_eq!(res.status, 201, "Submission failed: {}", res.text);
        res.id()
    }

    #[tokio::test]
    async fn registered_student_can_submit_an_entry() {
        let app = TestApp::spawn().await;
        let (_, student, _, id) = judged_competition(&app).await;

        let res = app
            .upload_with_token(
                &routes::competition_submissions(id),
                "entry.zip",
                b"entry bytes".to_vec(),
                &[("description", "Our solution")],
                &student,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["version"], 1);
        assert_eq!(res.body["locked"], false);
    }

    #[tokio::test]
    async fn resubmission_bumps_the_version() {
        let app = TestApp::spawn().await;
        let (_, student, _, id) = judged_competition(&app).await;
        submit_entry(&app, id, &student).await;

        let res = app
            .upload_with_token(
                &routes::competition_submissions(id),
                "entry_v2.zip",
                b"improved entry".to_vec(),
                &[],
                &student,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["version"], 2);
    }

    #[tokio::test]
    async fn unregistered_student_cannot_submit() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let id = app.create_open_competition(&admin, "No Entry").await;
        let stranger = app.create_authenticated_user("mallory", "securepass").await;

        let res = app
            .upload_with_token(
                &routes::competition_submissions(id),
                "entry.zip",
                b"sneaky".to_vec(),
                &[],
                &stranger,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn assigned_judge_can_score_a_submission() {
        let app = TestApp::spawn().await;
        let (_, student, judge, id) = judged_competition(&app).await;
        let submission_id = submit_entry(&app, id, &student).await;

        let res = app
            .post_with_token(
                &routes::submission_scores(id, submission_id),
                &json!({"score": 87.5, "comment": "Strong methodology"}),
                &judge,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["score"], 87.5);
    }

    #[tokio::test]
    async fn rescoring_overwrites_the_previous_score() {
        let app = TestApp::spawn().await;
        let (_, student, judge, id) = judged_competition(&app).await;
        let submission_id = submit_entry(&app, id, &student).await;

        app.post_with_token(
            &routes::submission_scores(id, submission_id),
            &json!({"score": 70.0}),
            &judge,
        )
        .await;

        let res = app
            .post_with_token(
                &routes::submission_scores(id, submission_id),
                &json!({"score": 92.0}),
                &judge,
            )
            .await;
        assert_eq!(res.status, 200);

        let scores = app
            .get_with_token(&routes::submission_scores(id, submission_id), &judge)
            .await;
        let list = scores.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["score"], 92.0);
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, student, judge, id) = judged_competition(&app).await;
        let submission_id = submit_entry(&app, id, &student).await;

        let res = app
            .post_with_token(
                &routes::submission_scores(id, submission_id),
                &json!({"score": 101.0}),
                &judge,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unassigned_teacher_cannot_score() {
        let app = TestApp::spawn().await;
        let (_, student, _, id) = judged_competition(&app).await;
        let submission_id = submit_entry(&app, id, &student).await;
        let outsider = app.create_user_with_role("other_prof", "securepass", "teacher").await;

        let res = app
            .post_with_token(
                &routes::submission_scores(id, submission_id),
                &json!({"score": 50.0}),
                &outsider,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn judging_progress_counts_scored_submissions() {
        let app = TestApp::spawn().await;
        let (admin, student, judge, id) = judged_competition(&app).await;
        let submission_id = submit_entry(&app, id, &student).await;

        let before = app.get_with_token(&routes::judging_progress(id), &admin).await;
        assert_eq!(before.body["total_submissions"], 1);
        assert_eq!(before.body["scored_submissions"], 0);

        app.post_with_token(
            &routes::submission_scores(id, submission_id),
            &json!({"score": 80.0}),
            &judge,
        )
        .await;

        let after = app.get_with_token(&routes::judging_progress(id), &admin).await;
        assert_eq!(after.body["scored_submissions"], 1);
    }

    #[tokio::test]
    async fn deactivated_judge_loses_scoring_access() {
        let app = TestApp::spawn().await;
        let (admin, student, judge, id) = judged_competition(&app).await;
        let submission_id = submit_entry(&app, id, &student).await;
        let judge_id = app.user_id("judge_prof").await;

        let removed = app
            .delete_with_token(&routes::competition_judge(id, judge_id), &admin)
            .await;
        assert_eq!(removed.status, 200);
        assert_eq!(removed.body["status"], "inactive");

        let res = app
            .post_with_token(
                &routes::submission_scores(id, submission_id),
                &json!({"score": 60.0}),
                &judge,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

mod results {
    use super::*;

    /// Full pipeline up to a scored submission. Returns
    /// (admin, student, competition_id, submission_id).
    async fn scored_competition(app: &TestApp) -> (String, String, i32, i32) {
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let judge = app.create_user_with_role("judge_prof", "securepass", "teacher").await;
        let judge_id = app.user_id("judge_prof").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let id = app.create_open_competition(&admin, "Scored Contest").await;
        app.post_with_token(&routes::competition_registrations(id), &json!({}), &student)
            .await;
        app.post_with_token(
            &routes::competition_judges(id),
            &json!({"teacher_id": judge_id}),
            &admin,
        )
        .await;

        let submission = app
            .upload_with_token(
                &routes::competition_submissions(id),
                "entry.zip",
                b"entry bytes".to_vec(),
                &[],
                &student,
            )
            .await;
        let submission_id = submission.id();

        app.post_with_token(
            &routes::submission_scores(id, submission_id),
            &json!({"score": 91.0}),
            &judge,
        )
        .await;

        (admin, student, id, submission_id)
    }

    #[tokio::test]
    async fn admin_can_register_an_award() {
        let app = TestApp::spawn().await;
        let (admin, _, id, submission_id) = scored_competition(&app).await;

        let res = app
            .post_with_token(
                &routes::competition_results(id),
                &json!({
                    "submission_id": submission_id,
                    "award_level": "first_prize",
                    "final_score": 91.0,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["award_level"], "first_prize");
        assert!(res.body["finalized_at"].is_null());
    }

    #[tokio::test]
    async fn duplicate_award_for_a_submission_conflicts() {
        let app = TestApp::spawn().await;
        let (admin, _, id, submission_id) = scored_competition(&app).await;
        let body = json!({"submission_id": submission_id, "award_level": "second_prize"});

        let first = app
            .post_with_token(&routes::competition_results(id), &body, &admin)
            .await;
        assert_eq!(first.status, 201, "First award failed: {}", first.text);

        let res = app
            .post_with_token(&routes::competition_results(id), &body, &admin)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn finalize_stamps_results_closes_the_competition_and_notifies() {
        let app = TestApp::spawn().await;
        let (admin, student, id, submission_id) = scored_competition(&app).await;
        app.post_with_token(
            &routes::competition_results(id),
            &json!({"submission_id": submission_id, "award_level": "first_prize"}),
            &admin,
        )
        .await;

        let res = app
            .post_with_token(&routes::competition_finalize(id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200);
        let results = res.body.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0]["finalized_at"].is_string());

        let detail = app.get_with_token(&routes::competition(id), &admin).await;
        assert_eq!(detail.body["status"], "completed");
        assert_eq!(detail.body["is_open"], false);

        let unread = app.get_with_token(routes::UNREAD_COUNT, &student).await;
        assert!(unread.body["unread"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn students_only_see_their_own_awards_before_finalization() {
        let app = TestApp::spawn().await;
        let (admin, student, id, submission_id) = scored_competition(&app).await;
        app.post_with_token(
            &routes::competition_results(id),
            &json!({"submission_id": submission_id, "award_level": "first_prize"}),
            &admin,
        )
        .await;

        let own = app.get_with_token(&routes::competition_results(id), &student).await;
        assert_eq!(own.status, 200);
        assert_eq!(own.body.as_array().unwrap().len(), 1);

        let other = app.create_authenticated_user("bob", "securepass").await;
        let hidden = app
            .get_with_token(&routes::competition_results(id), &other)
            .await;
        assert_eq!(hidden.status, 200);
        assert!(hidden.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn finalize_is_idempotent() {
        let app = TestApp::spawn().await;
        let (admin, _, id, submission_id) = scored_competition(&app).await;
        app.post_with_token(
            &routes::competition_results(id),
            &json!({"submission_id": submission_id, "award_level": "third_prize"}),
            &admin,
        )
        .await;

        let first = app
            .post_with_token(&routes::competition_finalize(id), &json!({}), &admin)
            .await;
        assert_eq!(first.status, 200, "First finalize failed: {}", first.text);
        let stamp = first.body[0]["finalized_at"].clone();

        let res = app
            .post_with_token(&routes::competition_finalize(id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body[0]["finalized_at"], stamp);
    }
}

mod stats {
    use super::*;

    #[tokio::test]
    async fn stats_count_competitions_by_status_and_level() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        app.create_competition(&admin, "Draft One").await;
        app.create_open_competition(&admin, "Open One").await;

        let res = app.get_with_token(routes::COMPETITION_STATS, &admin).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 2);
        assert_eq!(res.body["open"], 1);
        assert_eq!(res.body["by_status"]["draft"], 1);
        assert_eq!(res.body["by_status"]["registration"], 1);
    }

    #[tokio::test]
    async fn students_cannot_view_competition_stats() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app.get_with_token(routes::COMPETITION_STATS, &student).await;

        assert_eq!(res.status, 403);
    }
}
