use tracing::instrument;

use super::dto::{NutritionData, NutritionRequest, NutritionResponse};
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

pub const INVALID_RESPONSE_MESSAGE: &str = "Resposta inválida do servidor";

/// Estimates macros for a free-text or composite foods string.
#[instrument(skip(api))]
pub async fn get_nutrition(api: &ApiClient, foods: &str) -> ClientResult<NutritionData> {
    let data: NutritionResponse = api
        .post_json("/nutrition/calories", &NutritionRequest { foods })
        .await?;
    if let Some(err) = data.error.filter(|e| !e.is_empty()) {
        return Err(ClientError::Backend(err));
    }
    data.nutrition
        .ok_or_else(|| ClientError::InvalidResponse(INVALID_RESPONSE_MESSAGE.into()))
}
