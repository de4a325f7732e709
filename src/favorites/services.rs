use tracing::{info, instrument};

use crate::api::{path_segment, ApiClient};
use crate::error::ClientResult;
use crate::favorites::dto::{Favorite, FavoriteResponse, FavoritesListResponse, NewFavorite};
use crate::meals::dto::DeleteResponse;

#[instrument(skip(api))]
pub async fn get_favorites(api: &ApiClient) -> ClientResult<Vec<Favorite>> {
    let data: FavoritesListResponse = api.get_json("/favorites").await?;
    Ok(data.favorites)
}

#[instrument(skip(api, favorite))]
pub async fn create_favorite(api: &ApiClient, favorite: &NewFavorite) -> ClientResult<Favorite> {
    let data: FavoriteResponse = api.post_json("/favorites", favorite).await?;
    info!(favorite_id = %data.favorite.id, "favorite created");
    Ok(data.favorite)
}

#[instrument(skip(api))]
pub async fn delete_favorite(api: &ApiClient, id: &str) -> ClientResult<bool> {
    let data: DeleteResponse = api
        .delete_json(&format!("/favorites/{}", path_segment(id)))
        .await?;
    info!(favorite_id = %id, success = data.success, "favorite deleted");
    Ok(data.success)
}
