pub mod catalog;
pub mod enrichment;
pub mod identity;
pub mod recommender;

pub use catalog::{Catalog, TmdbCatalog};
pub use enrichment::FilmEnricher;
pub use identity::{IdentityProvider, StaticIdentity, UserInfoIdentity};
pub use recommender::{OpenAiRecommender, RecommendationModel};
