use serde_json::json;

use crate::common::{TestApp, routes};

/// Registers a student with a bound advisor, for tests that need a project
/// referencing a catalog entry. Returns (student_token, teacher_id).
async fn student_with_advisor(app: &TestApp) -> (String, i32) {
    let _teacher = app.create_user_with_role("prof", "securepass", "teacher").await;
    let student = app.create_authenticated_user("alice", "securepass").await;
    let teacher_id = app.user_id("prof").await;
    let student_id = app.user_id("alice").await;
    app.bind_advisor(student_id, teacher_id).await;
    (student, teacher_id)
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn seeded_defaults_are_listed_in_sort_order() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app.get_with_token(routes::PROJECT_TYPES, &student).await;

        assert_eq!(res.status, 200);
        let keys: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["key"].as_str())
            .collect();
        assert_eq!(keys, vec!["innovation", "graduation", "lab", "other"]);
    }

    #[tokio::test]
    async fn children_are_nested_under_their_parent() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let parent = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "hardware", "name": "Hardware", "sort_order": 5}),
                &admin,
            )
            .await;
        assert_eq!(parent.status, 201, "create failed: {}", parent.text);
        let parent_id = parent.id();

        let child = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "robotics", "name": "Robotics", "parent_id": parent_id}),
                &admin,
            )
            .await;
        assert_eq!(child.status, 201, "create failed: {}", child.text);

        let res = app.get_with_token(routes::PROJECT_TYPES, &admin).await;
        assert_eq!(res.status, 200);

        let hardware = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["key"] == "hardware")
            .expect("parent should be a top-level entry");
        let children = hardware["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0]["key"], "robotics");

        let top_level_keys: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["key"].as_str())
            .collect();
        assert!(!top_level_keys.contains(&"robotics"));
    }

    #[tokio::test]
    async fn entry_carries_the_count_of_referencing_projects() {
        let app = TestApp::spawn().await;
        let (student, teacher_id) = student_with_advisor(&app).await;
        app.create_project(&student, "GNN Study", teacher_id).await;

        let res = app.get_with_token(routes::PROJECT_TYPES, &student).await;
        assert_eq!(res.status, 200);

        let innovation = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["key"] == "innovation")
            .expect("innovation should be seeded");
        assert_eq!(innovation["project_count"], 1);
    }

    #[tokio::test]
    async fn listing_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::PROJECT_TYPES).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn single_entry_can_be_fetched_by_id() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let created = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "survey", "name": "Survey", "description": "Literature surveys"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201, "create failed: {}", created.text);

        let res = app
            .get_with_token(&routes::project_type(created.id()), &admin)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["key"], "survey");
        assert_eq!(res.body["description"], "Literature surveys");
        assert_eq!(res.body["project_count"], 0);
    }

    #[tokio::test]
    async fn missing_entry_returns_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let res = app.get_with_token(&routes::project_type(99999), &admin).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod stats {
    use super::*;

    #[tokio::test]
    async fn stats_report_per_type_project_counts() {
        let app = TestApp::spawn().await;
        let (student, teacher_id) = student_with_advisor(&app).await;
        app.create_project(&student, "First", teacher_id).await;
        app.create_project(&student, "Second", teacher_id).await;

        let res = app.get_with_token(routes::PROJECT_TYPE_STATS, &student).await;

        assert_eq!(res.status, 200);
        let stats = res.body.as_array().unwrap();
        let innovation = stats.iter().find(|s| s["key"] == "innovation").unwrap();
        assert_eq!(innovation["project_count"], 2);
        let lab = stats.iter().find(|s| s["key"] == "lab").unwrap();
        assert_eq!(lab["project_count"], 0);
    }
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_an_entry() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let res = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "hardware", "name": "Hardware", "sort_order": 5}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["key"], "hardware");
        assert_eq!(res.body["name"], "Hardware");
        assert_eq!(res.body["sort_order"], 5);
        assert_eq!(res.body["is_active"], true);
        assert_eq!(res.body["project_count"], 0);
    }

    #[tokio::test]
    async fn duplicate_key_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let res = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "innovation", "name": "Innovation again"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn key_with_uppercase_or_spaces_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let res = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "Not A Slug", "name": "Bad key"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn nonexistent_parent_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let res = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "orphan", "name": "Orphan", "parent_id": 99999}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn nesting_deeper_than_one_level_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let parent = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "hardware", "name": "Hardware"}),
                &admin,
            )
            .await;
        assert_eq!(parent.status, 201, "create failed: {}", parent.text);
        let child = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "robotics", "name": "Robotics", "parent_id": parent.id()}),
                &admin,
            )
            .await;
        assert_eq!(child.status, 201, "create failed: {}", child.text);

        let res = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "drones", "name": "Drones", "parent_id": child.id()}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_admin_cannot_create_entries() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "hardware", "name": "Hardware"}),
                &student,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod updates {
    use super::*;

    #[tokio::test]
    async fn admin_can_rename_and_reorder_an_entry() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let created = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "survey", "name": "Survey"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201, "create failed: {}", created.text);

        let res = app
            .patch_with_token(
                &routes::project_type(created.id()),
                &json!({"name": "Literature survey", "sort_order": 42}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["key"], "survey");
        assert_eq!(res.body["name"], "Literature survey");
        assert_eq!(res.body["sort_order"], 42);
    }

    #[tokio::test]
    async fn deactivated_entry_is_rejected_on_new_projects() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let (student, teacher_id) = student_with_advisor(&app).await;

        let listed = app.get_with_token(routes::PROJECT_TYPE_STATS, &admin).await;
        let lab_id = listed
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["key"] == "lab")
            .and_then(|s| s["id"].as_i64())
            .expect("lab should be seeded") as i32;

        let res = app
            .patch_with_token(
                &routes::project_type(lab_id),
                &json!({"is_active": false}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "deactivate failed: {}", res.text);
        assert_eq!(res.body["is_active"], false);

        let res = app
            .post_with_token(
                routes::PROJECTS,
                &json!({
                    "title": "Late Lab Work",
                    "description": "Should be rejected",
                    "project_type": "lab",
                    "teacher_id": teacher_id,
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_admin_cannot_update_entries() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let created = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "survey", "name": "Survey"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201, "create failed: {}", created.text);

        let res = app
            .patch_with_token(
                &routes::project_type(created.id()),
                &json!({"name": "Hijacked"}),
                &student,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn unused_entry_can_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let created = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "survey", "name": "Survey"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201, "create failed: {}", created.text);

        let res = app
            .delete_with_token(&routes::project_type(created.id()), &admin)
            .await;
        assert_eq!(res.status, 204);

        let res = app
            .get_with_token(&routes::project_type(created.id()), &admin)
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn entry_with_referencing_projects_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let (student, teacher_id) = student_with_advisor(&app).await;
        app.create_project(&student, "GNN Study", teacher_id).await;

        let listed = app.get_with_token(routes::PROJECT_TYPE_STATS, &admin).await;
        let innovation_id = listed
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["key"] == "innovation")
            .and_then(|s| s["id"].as_i64())
            .expect("innovation should be seeded") as i32;

        let res = app
            .delete_with_token(&routes::project_type(innovation_id), &admin)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn entry_with_children_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let parent = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "hardware", "name": "Hardware"}),
                &admin,
            )
            .await;
        assert_eq!(parent.status, 201, "create failed: {}", parent.text);
        let child = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "robotics", "name": "Robotics", "parent_id": parent.id()}),
                &admin,
            )
            .await;
        assert_eq!(child.status, 201, "create failed: {}", child.text);

        let res = app
            .delete_with_token(&routes::project_type(parent.id()), &admin)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn non_admin_cannot_delete_entries() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let created = app
            .post_with_token(
                routes::PROJECT_TYPES,
                &json!({"key": "survey", "name": "Survey"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201, "create failed: {}", created.text);

        let res = app
            .delete_with_token(&routes::project_type(created.id()), &student)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
