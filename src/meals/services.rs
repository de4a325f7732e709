use tracing::{info, instrument};

use crate::api::{path_segment, ApiClient};
use crate::error::ClientResult;
use crate::meals::dto::{
    DaySummary, DeleteResponse, Meal, MealResponse, MealUpdate, MealsListResponse, NewMeal,
};

/// Meals of one day ordered by time, plus backend-computed totals.
#[instrument(skip(api))]
pub async fn get_day_summary(api: &ApiClient, date: &str) -> ClientResult<DaySummary> {
    api.get_json_query("/meals/summary", &[("date", date)]).await
}

/// Meals in an inclusive date range, used to mark calendar days.
#[instrument(skip(api))]
pub async fn get_meals_by_range(
    api: &ApiClient,
    start_date: &str,
    end_date: &str,
) -> ClientResult<Vec<Meal>> {
    let data: MealsListResponse = api
        .get_json_query(
            "/meals/range",
            &[("startDate", start_date), ("endDate", end_date)],
        )
        .await?;
    Ok(data.meals)
}

#[instrument(skip(api, meal), fields(meal_type = %meal.meal_type))]
pub async fn create_meal(api: &ApiClient, meal: &NewMeal) -> ClientResult<Meal> {
    let data: MealResponse = api.post_json("/meals", meal).await?;
    info!(meal_id = %data.meal.id, "meal created");
    Ok(data.meal)
}

#[instrument(skip(api, params))]
pub async fn update_meal(api: &ApiClient, id: &str, params: &MealUpdate) -> ClientResult<Meal> {
    let data: MealResponse = api
        .put_json(&format!("/meals/{}", path_segment(id)), params)
        .await?;
    info!(meal_id = %id, "meal updated");
    Ok(data.meal)
}

#[instrument(skip(api))]
pub async fn delete_meal(api: &ApiClient, id: &str) -> ClientResult<bool> {
    let data: DeleteResponse = api.delete_json(&format!("/meals/{}", path_segment(id))).await?;
    info!(meal_id = %id, success = data.success, "meal deleted");
    Ok(data.success)
}

/// The backend copies the meal, image included.
#[instrument(skip(api))]
pub async fn duplicate_meal(api: &ApiClient, id: &str) -> ClientResult<Meal> {
    let data: MealResponse = api
        .post_json(&format!("/meals/{}/duplicate", path_segment(id)), &serde_json::json!({}))
        .await?;
    info!(meal_id = %id, copy_id = %data.meal.id, "meal duplicated");
    Ok(data.meal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ids_with_reserved_characters_stay_in_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/meals/a%2Fb%3Fc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/favorites/x%23y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::fake(&server.uri());
        assert!(delete_meal(&state.api, "a/b?c").await.unwrap());
        assert!(crate::favorites::delete_favorite(&state.api, "x#y").await.unwrap());
    }

    #[tokio::test]
    async fn query_values_are_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meals/summary"))
            .and(query_param("date", "2026-02-01&x=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meals": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/meals/range"))
            .and(query_param("startDate", "2026-02-01"))
            .and(query_param("endDate", "2026-02-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meals": []})))
            .expect(1)
            .mount(&server)
            .await;

        let state = AppState::fake(&server.uri());
        let summary = get_day_summary(&state.api, "2026-02-01&x=1").await.unwrap();
        assert!(summary.meals.is_empty());
        assert!(get_meals_by_range(&state.api, "2026-02-01", "2026-02-28")
            .await
            .unwrap()
            .is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("date=2026-02-01%26x%3D1"));
    }
}
