use crate::{
    error::EnrichmentError,
    models::{CatalogId, Image, ImageSet, MovieImages},
    services::catalog::Catalog,
};

/// Posters and backdrops kept per film, each
pub const MAX_IMAGES_PER_KIND: usize = 4;

/// Fetches artwork for `id` and turns the first few paths of each kind into
/// absolute URLs under `image_base_url`
pub async fn fetch_images(
    catalog: &dyn Catalog,
    id: CatalogId,
    image_base_url: &str,
) -> Result<ImageSet, EnrichmentError> {
    let images = catalog.movie_images(id).await?;
    Ok(select_images(images, image_base_url))
}

fn select_images(images: MovieImages, image_base_url: &str) -> ImageSet {
    ImageSet {
        posters: absolute(images.posters, image_base_url),
        backdrops: absolute(images.backdrops, image_base_url),
    }
}

fn absolute(images: Vec<Image>, image_base_url: &str) -> Vec<Image> {
    images
        .into_iter()
        .take(MAX_IMAGES_PER_KIND)
        .map(|image| Image {
            file_path: format!("{}{}", image_base_url, image.file_path),
        })
        .collect()
}
