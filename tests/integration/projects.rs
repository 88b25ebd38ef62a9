use serde_json::json;

use crate::common::{TestApp, routes};

/// Registers a student and a teacher, binds them, and returns
/// (student_token, teacher_token, teacher_id).
async fn student_with_advisor(app: &TestApp) -> (String, String, i32) {
    let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let teacher_id = app.user_id("prof").await;
    let student_id = app.user_id("alice").await;
    app.bind_advisor(student_id, teacher_id).await;
    (student, teacher, teacher_id)
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn student_can_create_a_draft_project() {
        let app = TestApp::spawn().await;
        let (student, _, teacher_id) = student_with_advisor(&app).await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({
                    "title": "Graph Neural Networks for Citation Analysis",
                    "description": "Exploring GNN architectures on citation graphs",
                    "project_type": "innovation",
                    "teacher_id": teacher_id,
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["teacher_id"], teacher_id);
        assert_eq!(res.body["progress"], 0);
    }

    #[tokio::test]
    async fn omitted_teacher_defaults_to_the_bound_advisor() {
        let app = TestApp::spawn().await;
        let (student, _, teacher_id) = student_with_advisor(&app).await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({
                    "title": "Compiler Optimization Study",
                    "description": "Loop transformations in MLIR",
                    "project_type": "graduation",
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 201, "create failed: {}", res.text);
        assert_eq!(res.body["teacher_id"], teacher_id);
    }

    #[tokio::test]
    async fn student_without_an_advisor_must_name_a_teacher() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("loner", "securepass").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({
                    "title": "Unadvised Work",
                    "description": "No advisor bound",
                    "project_type": "other",
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_project_type_is_rejected() {
        let app = TestApp::spawn().await;
        let (student, _, teacher_id) = student_with_advisor(&app).await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({
                    "title": "Typed Wrong",
                    "description": "desc",
                    "project_type": "moonshot",
                    "teacher_id": teacher_id,
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn teacher_cannot_create_a_project() {
        let app = TestApp::spawn().await;
        let teacher = app.create_user_with_role("prof", "securepass", "teacher").await;

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({
                    "title": "Not a student",
                    "description": "desc",
                    "project_type": "lab",
                }),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn students_only_see_their_own_projects() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        app.create_project(&alice, "Alice's Project", teacher_id).await;

        let bob = app.create_authenticated_user("bob", "securepass").await;
        let bob_id = app.user_id("bob").await;
        app.bind_advisor(bob_id, teacher_id).await;
        app.create_project(&bob, "Bob's Project", teacher_id).await;

        let res = app.get_with_token(routes::PROJECTS, &alice).await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "Alice's Project");
    }

    #[tokio::test]
    async fn teacher_sees_advised_projects() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        app.create_project(&alice, "Advised Project", teacher_id).await;

        let res = app.get_with_token(routes::PROJECTS, &teacher).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unrelated_user_gets_not_found_for_a_project_detail() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Private Project", teacher_id).await;

        let stranger = app.create_authenticated_user("mallory", "securepass").await;
        let res = app.get_with_token(&routes::project(id), &stranger).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn detail_includes_participants_files_and_reviews() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Detailed Project", teacher_id).await;

        let res = app.get_with_token(&routes::project(id), &alice).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["student_username"], "alice");
        assert_eq!(res.body["teacher_username"], "prof");
        assert!(res.body["files"].is_array());
        assert!(res.body["reviews"].is_array());
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn draft_can_be_submitted_and_teacher_is_notified() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Submittable", teacher_id).await;

        let res = app
            .post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "submitted");
        assert!(res.body["submitted_at"].is_string());

        let count = app.get_with_token(routes::UNREAD_COUNT, &teacher).await;
        assert_eq!(count.body["unread"], 1);
    }

    #[tokio::test]
    async fn submitting_twice_conflicts() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Twice Submitted", teacher_id).await;

        let first = app
            .post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;
        assert_eq!(first.status, 200, "First submit failed: {}", first.text);

        let res = app
            .post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn advisor_can_approve_a_submitted_project() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Approvable", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        let res = app
            .post_with_token(
                &routes::project_review(id),
                &json!({"verdict": "approved", "comments": "Solid plan"}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "approved");
        assert!(res.body["approved_at"].is_string());
    }

    #[tokio::test]
    async fn rejection_requires_comments_and_stores_the_reason() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Rejectable", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        let missing = app
            .post_with_token(
                &routes::project_review(id),
                &json!({"verdict": "rejected"}),
                &teacher,
            )
            .await;
        assert_eq!(missing.status, 400);

        let res = app
            .post_with_token(
                &routes::project_review(id),
                &json!({"verdict": "rejected", "comments": "Scope too broad"}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "rejected");
        assert_eq!(res.body["rejection_reason"], "Scope too broad");
    }

    #[tokio::test]
    async fn rejected_project_can_be_revised_and_resubmitted() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Resubmittable", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;
        app.post_with_token(
            &routes::project_review(id),
            &json!({"verdict": "rejected", "comments": "Needs a plan"}),
            &teacher,
        )
        .await;

        let edited = app
            .patch_with_token(
                &routes::project(id),
                &json!({"plan": "Detailed three-phase plan"}),
                &alice,
            )
            .await;
        assert_eq!(edited.status, 200, "Edit failed: {}", edited.text);

        let res = app
            .post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "submitted");
        assert!(res.body["rejection_reason"].is_null());
    }

    #[tokio::test]
    async fn unassigned_teacher_cannot_review() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Guarded", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        let outsider = app
            .create_user_with_role("other_prof", "securepass", "teacher")
            .await;
        let res = app
            .post_with_token(
                &routes::project_review(id),
                &json!({"verdict": "approved"}),
                &outsider,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn approved_project_cannot_be_edited() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Frozen", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;
        app.post_with_token(
            &routes::project_review(id),
            &json!({"verdict": "approved"}),
            &teacher,
        )
        .await;

        let res = app
            .patch_with_token(&routes::project(id), &json!({"title": "Renamed"}), &alice)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn progress_100_completes_the_project() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Finishable", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;
        app.post_with_token(
            &routes::project_review(id),
            &json!({"verdict": "approved"}),
            &teacher,
        )
        .await;

        let halfway = app
            .post_with_token(&routes::project_progress(id), &json!({"progress": 50}), &alice)
            .await;
        assert_eq!(halfway.status, 200);
        assert_eq!(halfway.body["status"], "in_progress");

        let res = app
            .post_with_token(&routes::project_progress(id), &json!({"progress": 100}), &alice)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "completed");
        assert!(res.body["finish_time"].is_string());
    }

    #[tokio::test]
    async fn status_history_records_each_transition() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Audited", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;
        app.post_with_token(
            &routes::project_review(id),
            &json!({"verdict": "approved"}),
            &teacher,
        )
        .await;

        let res = app.get_with_token(&routes::project_history(id), &alice).await;

        assert_eq!(res.status, 200);
        // Newest transition first.
        let history = res.body.as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["new_status"], "approved");
        assert_eq!(history[1]["new_status"], "submitted");
    }
}

mod admin_controls {
    use super::*;

    #[tokio::test]
    async fn admin_can_force_any_status_with_a_reason() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Forced", teacher_id).await;

        let res = app
            .post_with_token(
                &routes::project_force_status(id),
                &json!({"status": "archived", "reason": "Superseded by new project"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "archived");

        let reviews = app
            .get_with_token(&routes::project_reviews(id), &admin)
            .await;
        let items = reviews.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["is_force"], true);
    }

    #[tokio::test]
    async fn force_status_without_a_reason_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Unforced", teacher_id).await;

        let res = app
            .post_with_token(
                &routes::project_force_status(id),
                &json!({"status": "archived", "reason": "  "}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn deleted_draft_can_be_restored_by_an_admin() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Restorable", teacher_id).await;

        let deleted = app.delete_with_token(&routes::project(id), &alice).await;
        assert_eq!(deleted.status, 204);

        let hidden = app.get_with_token(&routes::project(id), &alice).await;
        assert_eq!(hidden.status, 404);

        let res = app
            .post_with_token(&routes::project_restore(id), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200);

        let visible = app.get_with_token(&routes::project(id), &alice).await;
        assert_eq!(visible.status, 200);
    }

    #[tokio::test]
    async fn only_drafts_can_be_deleted() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Undeletable", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;

        let res = app.delete_with_token(&routes::project(id), &alice).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn stats_are_admin_only_and_count_by_status() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        app.create_project(&alice, "Counted One", teacher_id).await;
        app.create_project(&alice, "Counted Two", teacher_id).await;

        let res = app.get_with_token(routes::PROJECT_STATS, &admin).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 2);
        assert_eq!(res.body["by_status"]["draft"], 2);

        let denied = app.get_with_token(routes::PROJECT_STATS, &alice).await;
        assert_eq!(denied.status, 403);
    }
}

mod milestones {
    use super::*;

    #[tokio::test]
    async fn owner_can_create_and_list_milestones() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "With Milestones", teacher_id).await;

        let res = app
            .post_with_token(
                &routes::project_milestones(id),
                &json!({
                    "title": "Literature review",
                    "due_date": "2099-06-01T00:00:00Z",
                }),
                &alice,
            )
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "pending");

        let list = app
            .get_with_token(&routes::project_milestones(id), &alice)
            .await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn past_due_pending_milestone_is_listed_as_overdue() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Overdue Holder", teacher_id).await;

        app.post_with_token(
            &routes::project_milestones(id),
            &json!({
                "title": "Missed deadline",
                "due_date": "2020-01-01T00:00:00Z",
            }),
            &alice,
        )
        .await;

        let list = app
            .get_with_token(&routes::project_milestones(id), &alice)
            .await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body[0]["status"], "overdue");
    }

    #[tokio::test]
    async fn milestone_progress_100_marks_it_completed() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Milestone Done", teacher_id).await;

        let created = app
            .post_with_token(
                &routes::project_milestones(id),
                &json!({
                    "title": "Prototype",
                    "due_date": "2099-06-01T00:00:00Z",
                }),
                &alice,
            )
            .await;
        let mid = created.id();

        let res = app
            .patch_with_token(
                &routes::project_milestone(id, mid),
                &json!({"progress": 100}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "completed");
        assert!(res.body["completed_date"].is_string());
    }

    #[tokio::test]
    async fn non_owner_cannot_create_milestones() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Owner Only", teacher_id).await;

        let res = app
            .post_with_token(
                &routes::project_milestones(id),
                &json!({
                    "title": "Not yours",
                    "due_date": "2099-06-01T00:00:00Z",
                }),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod extensions {
    use super::*;

    /// Sets up an approved project owned by alice and returns
    /// (student_token, teacher_token, project_id).
    async fn approved_project(app: &TestApp) -> (String, String, i32) {
        let (alice, teacher, teacher_id) = student_with_advisor(app).await;
        let id = app.create_project(&alice, "Extendable", teacher_id).await;
        app.post_with_token(&routes::project_submit(id), &json!({}), &alice)
            .await;
        app.post_with_token(
            &routes::project_review(id),
            &json!({"verdict": "approved"}),
            &teacher,
        )
        .await;
        (alice, teacher, id)
    }

    #[tokio::test]
    async fn owner_can_apply_for_an_extension() {
        let app = TestApp::spawn().await;
        let (alice, _, id) = approved_project(&app).await;

        let res = app
            .post_with_token(
                &routes::project_extensions(id),
                &json!({
                    "reason": "Data collection delayed by a semester",
                    "requested_end_date": "2099-09-01T00:00:00Z",
                }),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "pending");
    }

    #[tokio::test]
    async fn only_one_pending_extension_per_project() {
        let app = TestApp::spawn().await;
        let (alice, _, id) = approved_project(&app).await;
        let body = json!({
            "reason": "More time needed",
            "requested_end_date": "2099-09-01T00:00:00Z",
        });

        let first = app
            .post_with_token(&routes::project_extensions(id), &body, &alice)
            .await;
        assert_eq!(first.status, 201, "First application failed: {}", first.text);

        let res = app
            .post_with_token(&routes::project_extensions(id), &body, &alice)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn cannot_apply_on_a_draft_project() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Still a Draft", teacher_id).await;

        let res = app
            .post_with_token(
                &routes::project_extensions(id),
                &json!({
                    "reason": "Premature",
                    "requested_end_date": "2099-09-01T00:00:00Z",
                }),
                &alice,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn advisor_can_approve_a_pending_extension() {
        let app = TestApp::spawn().await;
        let (alice, teacher, id) = approved_project(&app).await;

        let created = app
            .post_with_token(
                &routes::project_extensions(id),
                &json!({
                    "reason": "Hardware shipment delayed",
                    "requested_end_date": "2099-09-01T00:00:00Z",
                }),
                &alice,
            )
            .await;
        let ext_id = created.id();

        let res = app
            .post_with_token(
                &routes::project_extension_review(id, ext_id),
                &json!({"verdict": "approved", "comments": "Granted"}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "approved");
        assert!(res.body["reviewed_at"].is_string());
    }

    #[tokio::test]
    async fn reviewing_the_same_extension_twice_conflicts() {
        let app = TestApp::spawn().await;
        let (alice, teacher, id) = approved_project(&app).await;

        let created = app
            .post_with_token(
                &routes::project_extensions(id),
                &json!({
                    "reason": "One-time request",
                    "requested_end_date": "2099-09-01T00:00:00Z",
                }),
                &alice,
            )
            .await;
        let ext_id = created.id();
        let verdict = json!({"verdict": "rejected", "comments": "No"});

        let first = app
            .post_with_token(&routes::project_extension_review(id, ext_id), &verdict, &teacher)
            .await;
        assert_eq!(first.status, 200, "First review failed: {}", first.text);

        let res = app
            .post_with_token(&routes::project_extension_review(id, ext_id), &verdict, &teacher)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn teacher_sees_pending_extensions_for_advised_projects() {
        let app = TestApp::spawn().await;
        let (alice, teacher, id) = approved_project(&app).await;

        app.post_with_token(
            &routes::project_extensions(id),
            &json!({
                "reason": "Waiting on ethics approval",
                "requested_end_date": "2099-09-01T00:00:00Z",
            }),
            &alice,
        )
        .await;

        let res = app.get_with_token(routes::PENDING_EXTENSIONS, &teacher).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn owner_can_upload_and_download_a_file() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "File Holder", teacher_id).await;

        let res = app
            .upload_with_token(
                &routes::project_files(id),
                "proposal.pdf",
                b"%PDF-1.4 fake proposal".to_vec(),
                &[("file_type", "proposal")],
                &alice,
            )
            .await;
        assert_eq!(res.status, 201, "Upload failed: {}", res.text);
        assert_eq!(res.body["file_type"], "proposal");
        assert_eq!(res.body["file_version"], 1);
        assert_eq!(res.body["review_status"], "pending");
        let file_id = res.id();

        let download = app
            .client
            .get(format!(
                "http://{}{}",
                app.addr,
                routes::project_file_download(id, file_id)
            ))
            .header("Authorization", format!("Bearer {alice}"))
            .send()
            .await
            .expect("Failed to send download request");
        assert_eq!(download.status().as_u16(), 200);
        let bytes = download.bytes().await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4 fake proposal");
    }

    #[tokio::test]
    async fn reupload_of_the_same_type_bumps_the_version() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Versioned", teacher_id).await;

        app.upload_with_token(
            &routes::project_files(id),
            "v1.pdf",
            b"first draft".to_vec(),
            &[("file_type", "midterm")],
            &alice,
        )
        .await;

        let res = app
            .upload_with_token(
                &routes::project_files(id),
                "v2.pdf",
                b"second draft".to_vec(),
                &[("file_type", "midterm")],
                &alice,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["file_version"], 2);
    }

    #[tokio::test]
    async fn advisor_can_review_an_uploaded_file() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Reviewed Files", teacher_id).await;

        let uploaded = app
            .upload_with_token(
                &routes::project_files(id),
                "final.pdf",
                b"draft final report".to_vec(),
                &[("file_type", "final")],
                &alice,
            )
            .await;
        let file_id = uploaded.id();

        let res = app
            .post_with_token(
                &routes::project_file_review(id, file_id),
                &json!({"verdict": "approved", "comments": "Well structured"}),
                &teacher,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["review_status"], "approved");
    }

    #[tokio::test]
    async fn uploader_can_delete_a_pending_file_but_not_a_reviewed_one() {
        let app = TestApp::spawn().await;
        let (alice, teacher, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Delete Rules", teacher_id).await;

        let first = app
            .upload_with_token(
                &routes::project_files(id),
                "scratch.txt",
                b"scratch".to_vec(),
                &[("file_type", "other")],
                &alice,
            )
            .await;
        let res = app
            .delete_with_token(&routes::project_file(id, first.id()), &alice)
            .await;
        assert_eq!(res.status, 204);

        let second = app
            .upload_with_token(
                &routes::project_files(id),
                "final.txt",
                b"final".to_vec(),
                &[("file_type", "other")],
                &alice,
            )
            .await;
        let file_id = second.id();
        app.post_with_token(
            &routes::project_file_review(id, file_id),
            &json!({"verdict": "approved"}),
            &teacher,
        )
        .await;

        let res = app
            .delete_with_token(&routes::project_file(id, file_id), &alice)
            .await;
        assert_eq!(res.status, 409);
    }

    /// Files on disk anywhere under `dir`.
    fn stored_file_count(dir: &std::path::Path) -> usize {
        let mut count = 0;
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    count += stored_file_count(&path);
                } else {
                    count += 1;
                }
            }
        }
        count
    }

    #[tokio::test]
    async fn rejected_upload_leaves_no_file_on_disk() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Orphan Check", teacher_id).await;

        let res = app
            .upload_with_token(
                &routes::project_files(id),
                "weird.bin",
                b"some bytes".to_vec(),
                &[("file_type", "bogus-kind")],
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(stored_file_count(app.uploads_dir()), 0);
    }

    #[tokio::test]
    async fn upload_without_a_file_type_leaves_no_file_on_disk() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Orphan Check Two", teacher_id).await;

        let res = app
            .upload_with_token(
                &routes::project_files(id),
                "untyped.bin",
                b"some bytes".to_vec(),
                &[],
                &alice,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(stored_file_count(app.uploads_dir()), 0);
    }

    #[tokio::test]
    async fn stranger_cannot_download_a_private_file() {
        let app = TestApp::spawn().await;
        let (alice, _, teacher_id) = student_with_advisor(&app).await;
        let id = app.create_project(&alice, "Private Files", teacher_id).await;

        let uploaded = app
            .upload_with_token(
                &routes::project_files(id),
                "secret.txt",
                b"confidential".to_vec(),
                &[("file_type", "other")],
                &alice,
            )
            .await;
        let file_id = uploaded.id();

        let stranger = app.create_authenticated_user("mallory", "securepass").await;
        let res = app
            .get_with_token(&routes::project_file_download(id, file_id), &stranger)
            .await;

        assert_eq!(res.status, 404);
    }
}
