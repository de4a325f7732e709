use anyhow::Result;
use serde_json::json;
use vidasync::foods::{build_foods_string, Ingredient, MealDraft, WeightUnit};
use vidasync::meals::MealType;
use vidasync::AppState;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MARMITA: &str = "Marmita — 100g de arroz, 200ml de leite";

fn nutrition() -> serde_json::Value {
    json!({"calories": "254 kcal", "protein": "9.1 g", "carbs": "37.6 g", "fat": "6.8 g"})
}

fn marmita_meal() -> serde_json::Value {
    json!({
        "id": "m1",
        "foods": MARMITA,
        "mealType": "lunch",
        "date": "2026-02-02",
        "time": "12:30",
        "nutrition": nutrition(),
        "createdAt": "2026-02-02T12:31:00Z",
    })
}

#[tokio::test]
async fn marmita_round_trips_through_the_backend() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nutrition/calories"))
        .and(body_json(json!({"foods": "100g de arroz, 200ml de leite"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nutrition": nutrition(), "error": null})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/meals"))
        .and(body_partial_json(json!({
            "foods": MARMITA,
            "mealType": "lunch",
            "date": "2026-02-02",
            "time": "12:30",
            "nutrition": nutrition(),
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"meal": marmita_meal()})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meals/summary"))
        .and(query_param("date", "2026-02-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "date": "2026-02-02",
            "totalMeals": 1,
            "meals": [marmita_meal()],
            "totals": nutrition(),
        })))
        .mount(&server)
        .await;

    let state = AppState::fake(&server.uri());

    let mut draft = MealDraft::new();
    draft.dish_name = "Marmita".into();
    draft.add_ingredient("arroz", "100", WeightUnit::G).await?;
    draft.add_ingredient("leite", "200", WeightUnit::Ml).await?;
    draft.meal_type = Some(MealType::Lunch);
    draft.date = Some("2026-02-02".into());
    draft.time = Some("12:30".into());
    assert!(draft.calculate(&state.api).await.is_some());
    assert_eq!(
        draft.foods_string()?,
        build_foods_string(Some("Marmita"), "100g de arroz, 200ml de leite")
    );

    let store = state.meals_store("2026-02-02");
    let created = store.add(draft.to_new_meal().await?, None).await;
    assert!(created.is_some());

    let snap = store.snapshot().await;
    assert_eq!(snap.meals.len(), 1);
    let totals = snap.macro_totals();
    assert_eq!((totals.calories, totals.protein, totals.carbs, totals.fat), (254, 9, 38, 7));

    let edit = MealDraft::from_meal(&snap.meals[0]).await;
    assert_eq!(edit.dish_name, "Marmita");
    assert_eq!(
        edit.ingredients,
        vec![
            Ingredient::new("arroz", "100", WeightUnit::G),
            Ingredient::new("leite", "200", WeightUnit::Ml),
        ]
    );
    assert!(edit.nutrition.data().await.is_some());
    Ok(())
}

#[tokio::test]
async fn edit_with_new_photo_caches_it_until_server_sends_a_url() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/meals/m1"))
        .and(body_partial_json(json!({"image": "data:image/png;base64,iVBORw0KGgo="})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meal": marmita_meal()})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meals/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meals": [marmita_meal()]})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let mut hosted = marmita_meal();
    hosted["imageUrl"] = json!("https://cdn.example/m1.png");
    Mock::given(method("GET"))
        .and(path("/meals/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meals": [hosted]})))
        .mount(&server)
        .await;

    let state = AppState::fake(&server.uri());
    let store = state.meals_store("2026-02-02");
    let update = vidasync::meals::MealUpdate::default().with_image(Some(
        &vidasync::images::ImageSource::from_value("data:image/png;base64,iVBORw0KGgo="),
    ));
    assert!(store.edit("m1", &update, Some("file:///photos/m1.png")).await.is_some());

    let snap = store.snapshot().await;
    assert_eq!(snap.meals[0].image_url.as_deref(), Some("file:///photos/m1.png"));

    store.refresh().await;
    let snap = store.snapshot().await;
    assert_eq!(snap.meals[0].image_url.as_deref(), Some("https://cdn.example/m1.png"));

    assert_eq!(state.images.cleanup_cache(&["m2"][..]).await, 1);
    assert!(state.images.is_empty().await);
    Ok(())
}
