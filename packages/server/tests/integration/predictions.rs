use serde_json::json;

use crate::common::*;

fn full_season_prediction() -> serde_json::Value {
    json!({
        "drivers_order": DRIVERS,
        "constructors_order": CONSTRUCTORS,
        "sackings": ["horner"],
        "new_team_pick": "cadillac",
        "first_winners": {"kind": "no_new_winners"},
        "grid_next": [{"driver": "HAM", "constructor": "ferrari"}],
        "crazy": "Albon finishes on the podium",
    })
}

mod season_predictions {
    use super::*;

    #[tokio::test]
    async fn player_can_submit_and_read_back_a_season_prediction() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let id = app
            .submit_season_prediction(&player, 2026, &full_season_prediction())
            .await;
        let res = app
            .get_with_token(&routes::season_prediction(2026), &player)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.id(), id);
        assert_eq!(res.body["drivers_order"], json!(DRIVERS));
        assert_eq!(res.body["first_winners"]["kind"], "no_new_winners");
        assert!(res.body["points"].is_null());
    }

    #[tokio::test]
    async fn resubmitting_replaces_the_same_prediction() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let first = app
            .submit_season_prediction(&player, 2026, &full_season_prediction())
            .await;
        let second = app
            .submit_season_prediction(&player, 2026, &json!({"new_team_pick": "audi"}))
            .await;
        let res = app
            .get_with_token(&routes::season_prediction(2026), &player)
            .await;

        assert_eq!(first, second);
        assert_eq!(res.body["new_team_pick"], "audi");
        assert_eq!(res.body["drivers_order"], json!([]));
        assert!(res.body["crazy"].is_null());
    }

    #[tokio::test]
    async fn submission_after_the_deadline_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, CLOSED_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::season_prediction(2026),
                &full_season_prediction(),
                &player,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn championship_order_must_cover_every_entrant() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::season_prediction(2026),
                &json!({"drivers_order": ["NOR", "PIA"]}),
                &player,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn new_team_pick_must_be_one_of_the_two_options() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::season_prediction(2026),
                &json!({"new_team_pick": "williams"}),
                &player,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn submission_after_the_result_is_entered_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        app.submit_season_prediction(&player, 2026, &full_season_prediction())
            .await;

        let res = app
            .put_with_token(
                &routes::season_result(2026),
                &season_result_body(&[]),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .put_with_token(
                &routes::season_prediction(2026),
                &full_season_prediction(),
                &player,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn reading_without_a_submission_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .get_with_token(&routes::season_prediction(2026), &player)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn score_is_not_found_until_the_result_exists() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        app.submit_season_prediction(&player, 2026, &full_season_prediction())
            .await;

        let res = app
            .get_with_token(&routes::season_score(2026), &player)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod race_predictions {
    use super::*;

    #[tokio::test]
    async fn sprint_picks_need_a_sprint_weekend() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::race_prediction(race),
                &json!({"first": "NOR", "sprint": {"winner": "PIA"}}),
                &player,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn sprint_picks_are_stored_on_sprint_weekends() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, true, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        app.submit_race_prediction(
            &player,
            race,
            &json!({"pole": "VER", "first": "NOR", "sprint": {"winner": "PIA"}}),
        )
        .await;
        let res = app
            .get_with_token(&routes::race_prediction(race), &player)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["sprint"]["winner"], "PIA");
        assert!(res.body["sprint"]["pole"].is_null());
    }

    #[tokio::test]
    async fn a_driver_cannot_fill_two_podium_places() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::race_prediction(race),
                &json!({"first": "NOR", "second": "NOR"}),
                &player,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn race_deadline_is_enforced() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app
            .create_race(&admin, 2026, 1, false, CLOSED_DEADLINE)
            .await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::race_prediction(race),
                &json!({"first": "NOR"}),
                &player,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
