use serde_json::json;

use crate::common::*;

mod season_setup {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_and_read_a_season() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let res = app.get_with_token(&routes::season(2026), &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["year"], 2026);
        assert_eq!(res.body["drivers"].as_array().unwrap().len(), DRIVERS.len());
        assert_eq!(res.body["new_teams"], json!(NEW_TEAMS));
    }

    #[tokio::test]
    async fn player_cannot_create_a_season() {
        let app = TestApp::spawn().await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .post_with_token(
                routes::SEASONS,
                &json!({
                    "year": 2026,
                    "drivers": DRIVERS,
                    "constructors": CONSTRUCTORS,
                    "new_teams": NEW_TEAMS,
                    "prediction_deadline": OPEN_DEADLINE,
                }),
                &player,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn duplicate_season_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;

        let res = app
            .post_with_token(
                routes::SEASONS,
                &json!({
                    "year": 2026,
                    "drivers": DRIVERS,
                    "constructors": CONSTRUCTORS,
                    "new_teams": NEW_TEAMS,
                    "prediction_deadline": OPEN_DEADLINE,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn new_team_question_needs_two_distinct_options() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post_with_token(
                routes::SEASONS,
                &json!({
                    "year": 2026,
                    "drivers": DRIVERS,
                    "constructors": CONSTRUCTORS,
                    "new_teams": ["cadillac"],
                    "prediction_deadline": OPEN_DEADLINE,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_season_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app.get_with_token(&routes::season(1999), &admin).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod race_calendar {
    use super::*;

    #[tokio::test]
    async fn races_are_listed_in_round_order() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;

        app.create_race(&admin, 2026, 2, true, OPEN_DEADLINE).await;
        app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;

        let res = app.get_with_token(&routes::races(2026), &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let rounds: Vec<i64> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["round"].as_i64().unwrap())
            .collect();
        assert_eq!(rounds, vec![1, 2]);
        assert_eq!(res.body[1]["has_sprint"], true);
    }

    #[tokio::test]
    async fn a_round_can_only_be_scheduled_once() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;

        let res = app
            .post_with_token(
                &routes::races(2026),
                &json!({
                    "round": 1,
                    "name": "Again",
                    "prediction_deadline": OPEN_DEADLINE,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}
