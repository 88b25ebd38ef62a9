use serde_json::json;

use crate::common::{TestApp, routes};

/// Sends a system notification from `admin` to every user in `user_ids`.
async fn send(app: &TestApp, admin: &str, user_ids: &[i32], title: &str, priority: Option<&str>) {
    let mut body = json!({
        "user_ids": user_ids,
        "title": title,
        "content": format!("{title} details"),
    });
    if let Some(priority) = priority {
        body["priority"] = json!(priority);
    }

    let res = app
        .post_with_token(routes::SEND_NOTIFICATION, &body, admin)
        .await;
    assert_eq!(res.status, 201, "Send failed: {}", res.text);
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn notifications_are_listed_newest_first() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "First", None).await;
        send(&app, &admin, &[alice_id], "Second", None).await;

        let res = app.get_with_token(routes::NOTIFICATIONS, &student).await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["kind"], "system");
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn unread_only_filter_hides_read_notifications() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "First", None).await;
        send(&app, &admin, &[alice_id], "Second", None).await;

        let all = app.get_with_token(routes::NOTIFICATIONS, &student).await;
        let first_id = all.body["data"][0]["id"].as_i64().unwrap() as i32;
        let read = app
            .post_with_token(&routes::notification_read(first_id), &json!({}), &student)
            .await;
        assert_eq!(read.status, 200, "Mark read failed: {}", read.text);

        let res = app
            .get_with_token(
                &format!("{}?unread_only=true", routes::NOTIFICATIONS),
                &student,
            )
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "First");
    }

    #[tokio::test]
    async fn priority_filter_restricts_results() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "Routine", Some("normal")).await;
        send(&app, &admin, &[alice_id], "Deadline", Some("urgent")).await;

        let res = app
            .get_with_token(
                &format!("{}?priority=urgent", routes::NOTIFICATIONS),
                &student,
            )
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "Deadline");
    }

    #[tokio::test]
    async fn unknown_priority_filter_is_rejected() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .get_with_token(
                &format!("{}?priority=shrieking", routes::NOTIFICATIONS),
                &student,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn users_never_see_each_others_notifications() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "For alice", None).await;

        let res = app.get_with_token(routes::NOTIFICATIONS, &bob).await;

        assert_eq!(res.status, 200);
        assert!(res.body["data"].as_array().unwrap().is_empty());
    }
}

mod read_state {
    use super::*;

    #[tokio::test]
    async fn unread_count_tracks_sends_and_reads() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        let before = app.get_with_token(routes::UNREAD_COUNT, &student).await;
        assert_eq!(before.body["unread"], 0);

        send(&app, &admin, &[alice_id], "First", None).await;
        send(&app, &admin, &[alice_id], "Second", None).await;

        let after = app.get_with_token(routes::UNREAD_COUNT, &student).await;
        assert_eq!(after.body["unread"], 2);
    }

    #[tokio::test]
    async fn marking_read_is_idempotent() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "Hello", None).await;
        let list = app.get_with_token(routes::NOTIFICATIONS, &student).await;
        let id = list.body["data"][0]["id"].as_i64().unwrap() as i32;

        let first = app
            .post_with_token(&routes::notification_read(id), &json!({}), &student)
            .await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["is_read"], true);
        assert!(first.body["read_at"].is_string());

        let second = app
            .post_with_token(&routes::notification_read(id), &json!({}), &student)
            .await;
        assert_eq!(second.status, 200);
        assert_eq!(second.body["read_at"], first.body["read_at"]);
    }

    #[tokio::test]
    async fn cannot_mark_someone_elses_notification_read() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "Private", None).await;
        let list = app.get_with_token(routes::NOTIFICATIONS, &student).await;
        let id = list.body["data"][0]["id"].as_i64().unwrap() as i32;

        let res = app
            .post_with_token(&routes::notification_read(id), &json!({}), &bob)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn read_all_clears_the_unread_count() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "First", None).await;
        send(&app, &admin, &[alice_id], "Second", None).await;

        let res = app
            .post_with_token(routes::READ_ALL, &json!({}), &student)
            .await;
        assert_eq!(res.status, 204);

        let count = app.get_with_token(routes::UNREAD_COUNT, &student).await;
        assert_eq!(count.body["unread"], 0);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn user_can_delete_their_own_notification() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "Ephemeral", None).await;
        let list = app.get_with_token(routes::NOTIFICATIONS, &student).await;
        let id = list.body["data"][0]["id"].as_i64().unwrap() as i32;

        let res = app
            .delete_with_token(&routes::notification(id), &student)
            .await;
        assert_eq!(res.status, 204);

        let after = app.get_with_token(routes::NOTIFICATIONS, &student).await;
        assert!(after.body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cannot_delete_someone_elses_notification() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id], "Private", None).await;
        let list = app.get_with_token(routes::NOTIFICATIONS, &student).await;
        let id = list.body["data"][0]["id"].as_i64().unwrap() as i32;

        let res = app.delete_with_token(&routes::notification(id), &bob).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod sending {
    use super::*;

    #[tokio::test]
    async fn duplicate_recipient_ids_are_collapsed() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        send(&app, &admin, &[alice_id, alice_id], "Once", None).await;

        let count = app.get_with_token(routes::UNREAD_COUNT, &student).await;
        assert_eq!(count.body["unread"], 1);
    }

    #[tokio::test]
    async fn empty_recipient_list_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;

        let res = app
            .post_with_token(
                routes::SEND_NOTIFICATION,
                &json!({"user_ids": [], "title": "Nobody", "content": "Empty"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_recipient_fails_the_whole_send() {
        let app = TestApp::spawn().await;
        let admin = app.create_user_with_role("admin", "securepass", "admin").await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        let res = app
            .post_with_token(
                routes::SEND_NOTIFICATION,
                &json!({"user_ids": [alice_id, 999999], "title": "Mixed", "content": "Batch"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let count = app.get_with_token(routes::UNREAD_COUNT, &student).await;
        assert_eq!(count.body["unread"], 0);
    }

    #[tokio::test]
    async fn non_admin_cannot_send_notifications() {
        let app = TestApp::spawn().await;
        let student = app.create_authenticated_user("alice", "securepass").await;
        let alice_id = app.user_id("alice").await;

        let res = app
            .post_with_token(
                routes::SEND_NOTIFICATION,
                &json!({"user_ids": [alice_id], "title": "Nope", "content": "Denied"}),
                &student,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
