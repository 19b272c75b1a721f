use serde_json::json;

use crate::common::*;

fn award(body: &serde_json::Value, category: &str) -> i64 {
    body["awards"]
        .as_array()
        .expect("awards should be an array")
        .iter()
        .find(|a| a["category"] == category)
        .and_then(|a| a["points"].as_i64())
        .unwrap_or_else(|| panic!("no award for {category}"))
}

mod season_results {
    use super::*;

    #[tokio::test]
    async fn entering_the_result_scores_stored_predictions() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        let id = app
            .submit_season_prediction(
                &player,
                2026,
                &json!({
                    "drivers_order": DRIVERS,
                    "constructors_order": CONSTRUCTORS,
                    "sackings": ["horner", "vasseur"],
                    "new_team_pick": "cadillac",
                    "first_winners": {"kind": "no_new_winners"},
                    "grid_next": [{"driver": "HAM", "constructor": "ferrari"}],
                    "crazy": "Albon finishes on the podium",
                }),
            )
            .await;

        let res = app
            .put_with_token(
                &routes::season_result(2026),
                &season_result_body(&[id]),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .get_with_token(&routes::season_score(2026), &player)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(award(&res.body, "drivers_championship"), 6);
        assert_eq!(award(&res.body, "constructors_championship"), 4);
        assert_eq!(award(&res.body, "sackings"), 1);
        assert_eq!(award(&res.body, "new_team"), 1);
        assert_eq!(award(&res.body, "first_winners"), 1);
        assert_eq!(award(&res.body, "future_grid"), 0);
        assert_eq!(award(&res.body, "crazy"), 1);
        assert_eq!(res.body["total"], 14);

        let stored = app
            .get_with_token(&routes::season_prediction(2026), &player)
            .await;
        assert_eq!(stored.body["points"], 14);
        assert!(stored.body["scored_at"].is_string());
    }

    #[tokio::test]
    async fn swapped_leaders_only_score_the_positions_that_match() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        app.submit_season_prediction(
            &player,
            2026,
            &json!({"drivers_order": ["PIA", "NOR", "VER", "LEC", "HAM", "ALB"]}),
        )
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
            .get_with_token(&routes::season_score(2026), &player)
            .await;
        assert_eq!(award(&res.body, "drivers_championship"), 4);
        assert_eq!(res.body["total"], 4);
    }

    #[tokio::test]
    async fn happened_ids_must_be_crazy_predictions_of_the_season() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        let plain = app
            .submit_season_prediction(&player, 2026, &json!({"new_team_pick": "audi"}))
            .await;

        let res = app
            .put_with_token(
                &routes::season_result(2026),
                &season_result_body(&[plain]),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn players_cannot_enter_results() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;

        let res = app
            .put_with_token(
                &routes::season_result(2026),
                &season_result_body(&[]),
                &player,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod race_results {
    use super::*;

    #[tokio::test]
    async fn podium_scores_exact_positions_only() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        app.submit_race_prediction(
            &player,
            race,
            &json!({
                "pole": "VER",
                "first": "NOR",
                "second": "PIA",
                "third": "VER",
                "midfield_hero": "ALB",
            }),
        )
        .await;

        let res = app
            .put_with_token(
                &routes::race_result(race),
                &race_result_body(["NOR", "VER", "PIA"], &[]),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(&routes::race_score(race), &player).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(award(&res.body, "pole"), 1);
        assert_eq!(award(&res.body, "podium"), 1);
        assert_eq!(award(&res.body, "midfield_hero"), 1);
        assert_eq!(res.body["total"], 3);
    }

    #[tokio::test]
    async fn correcting_a_result_rescores_its_predictions() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;
        let player = app
            .create_authenticated_user("tifosi_77", "password123")
            .await;
        app.submit_race_prediction(
            &player,
            race,
            &json!({"first": "NOR", "second": "PIA", "third": "VER"}),
        )
        .await;

        app.put_with_token(
            &routes::race_result(race),
            &race_result_body(["LEC", "HAM", "ALB"], &[]),
            &admin,
        )
        .await;
        let before = app
            .get_with_token(&routes::race_prediction(race), &player)
            .await;
        assert_eq!(before.body["points"], 0);

        let res = app
            .put_with_token(
                &routes::race_result(race),
                &race_result_body(["NOR", "PIA", "VER"], &[]),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let after = app
            .get_with_token(&routes::race_prediction(race), &player)
            .await;
        assert_eq!(after.body["points"], 3);
    }

    #[tokio::test]
    async fn dropped_sprint_judges_the_race_and_sprint_picks_score_nothing() {
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
            &json!({"first": "NOR", "sprint": {"winner": "PIA", "pole": "VER"}}),
        )
        .await;

        let res = app
            .put_with_token(
                &routes::race_result(race),
                &race_result_body(["NOR", "PIA", "VER"], &[]),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["sprint"].is_null());

        let res = app.get_with_token(&routes::race_score(race), &player).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(award(&res.body, "podium"), 1);
        assert_eq!(award(&res.body, "sprint_pole"), 0);
        assert_eq!(award(&res.body, "sprint_winner"), 0);
        assert_eq!(res.body["total"], 1);

        let stored = app
            .get_with_token(&routes::race_prediction(race), &player)
            .await;
        assert_eq!(stored.body["points"], 1);
    }

    #[tokio::test]
    async fn sprint_outcome_needs_a_sprint_weekend() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, false, OPEN_DEADLINE).await;
        let mut body = race_result_body(["NOR", "PIA", "VER"], &[]);
        body["sprint"] = json!({"pole": "PIA", "winner": "NOR", "midfield_hero": "HUL"});

        let res = app
            .put_with_token(&routes::race_result(race), &body, &admin)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn stored_result_can_be_read_back() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        app.create_season(&admin, 2026, OPEN_DEADLINE).await;
        let race = app.create_race(&admin, 2026, 1, true, OPEN_DEADLINE).await;
        let mut body = race_result_body(["NOR", "PIA", "VER"], &[]);
        body["sprint"] = json!({"pole": "PIA", "winner": "NOR", "midfield_hero": "HUL"});

        let res = app
            .put_with_token(&routes::race_result(race), &body, &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(&routes::race_result(race), &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["first"], "NOR");
        assert_eq!(res.body["sprint"]["winner"], "NOR");
    }
}
