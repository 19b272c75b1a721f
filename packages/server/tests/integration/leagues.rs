use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

use server::entity::season_prediction;

use crate::common::*;

mod membership {
    use super::*;

    #[tokio::test]
    async fn creator_is_the_first_member() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let alice_id = app.user_id(&alice).await;

        let res = app
            .post_with_token(
                routes::LEAGUES,
                &json!({"name": "Office Paddock Club"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["owner_id"], alice_id);
        assert_eq!(res.body["members"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["members"][0]["username"], "alice");
    }

    #[tokio::test]
    async fn joining_twice_keeps_a_single_membership() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;

        let first = app
            .post_with_token(&routes::league_join(league), &json!({}), &bob)
            .await;
        let second = app
            .post_with_token(&routes::league_join(league), &json!({}), &bob)
            .await;

        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(second.body["members"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_league_name_is_rejected() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;

        let res = app
            .post_with_token(routes::LEAGUES, &json!({"name": "   "}), &alice)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn outsiders_cannot_see_a_league() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let carol = app.create_authenticated_user("carol", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;

        let res = app.get_with_token(&routes::league(league), &carol).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod leaderboard {
    use super::*;

    #[tokio::test]
    async fn members_are_ranked_by_season_and_race_points() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;

        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let dave = app.create_authenticated_user("dave", "password123").await;
        let carol = app.create_authenticated_user("carol", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;
        for token in [&bob, &dave] {
            let res = app
                .post_with_token(&routes::league_join(league), &json!({}), token)
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        // alice: 6 season points, bob: 4 season + 2 race points.
        app.submit_season_prediction(&alice, 2026, &json!({"drivers_order": DRIVERS}))
            .await;
        app.submit_season_prediction(
            &bob,
            2026,
            &json!({"drivers_order": ["PIA", "NOR", "VER", "LEC", "HAM", "ALB"]}),
        )
        .await;
        app.submit_race_prediction(&bob, race, &json!({"first": "NOR", "second": "PIA"}))
            .await;
        // carol is not a member and must not appear.
        app.submit_season_prediction(&carol, 2026, &json!({"drivers_order": DRIVERS}))
            .await;

        app.put_with_token(
            &routes::season_result(2026),
            &season_result_body(&[]),
            &admin,
        )
        .await;
        app.put_with_token(
            &routes::race_result(race),
            &race_result_body(["NOR", "PIA", "VER"], &[]),
            &admin,
        )
        .await;

        let res = app
            .get_with_token(&routes::leaderboard(league, 2026), &alice)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let entries = res.body["entries"].as_array().unwrap();
        let names: Vec<&str> = entries
            .iter()
            .map(|e| e["display_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alice", "bob", "dave"]);

        assert_eq!(entries[0]["total"], 6);
        assert_eq!(entries[0]["season_points"], 6);
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[1]["total"], 6);
        assert_eq!(entries[1]["race_points"], 2);
        assert_eq!(entries[1]["rank"], 1);
        assert_eq!(entries[2]["total"], 0);
        assert_eq!(entries[2]["rank"], 3);
    }

    #[tokio::test]
    async fn unjudged_predictions_contribute_nothing() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;
        app.submit_season_prediction(&alice, 2026, &json!({"drivers_order": DRIVERS}))
            .await;

        let res = app
            .get_with_token(&routes::leaderboard(league, 2026), &alice)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["entries"][0]["total"], 0);
        assert_eq!(res.body["entries"][0]["rank"], 1);
    }

    #[tokio::test]
    async fn unreadable_prediction_is_skipped_not_fatal() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;
        app.post_with_token(&routes::league_join(league), &json!({}), &bob)
            .await;
        app.submit_season_prediction(&alice, 2026, &json!({"drivers_order": DRIVERS}))
            .await;
        let broken = app
            .submit_season_prediction(&bob, 2026, &json!({"drivers_order": DRIVERS}))
            .await;
        app.put_with_token(
            &routes::season_result(2026),
            &season_result_body(&[]),
            &admin,
        )
        .await;

        let stored = season_prediction::Entity::find_by_id(broken)
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("prediction should exist");
        let mut corrupted: season_prediction::ActiveModel = stored.into();
        corrupted.drivers_order = Set(json!(42));
        corrupted.update(&app.db).await.expect("Failed to corrupt prediction");

        let res = app
            .get_with_token(&routes::leaderboard(league, 2026), &alice)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["display_name"], "alice");
        assert_eq!(entries[0]["total"], 6);
        assert_eq!(entries[1]["display_name"], "bob");
        assert_eq!(entries[1]["total"], 0);
    }

    #[tokio::test]
    async fn league_managers_can_read_any_leaderboard() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let carol = app.create_authenticated_user("carol", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;

        let outsider = app
            .get_with_token(&routes::leaderboard(league, 2026), &carol)
            .await;
        let manager = app
            .get_with_token(&routes::leaderboard(league, 2026), &admin)
            .await;

        assert_eq!(outsider.status, 404);
        assert_eq!(manager.status, 200, "{}", manager.text);
    }

    #[tokio::test]
    async fn unknown_season_is_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let league = app.create_league(&alice, "Office Paddock Club").await;

        let res = app
            .get_with_token(&routes::leaderboard(league, 1999), &alice)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
