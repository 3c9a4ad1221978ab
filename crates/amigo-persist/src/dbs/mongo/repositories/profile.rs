#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson::doc};

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoUserProfile;
#[cfg(feature = "mongodb")]
use crate::error::Result;

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoProfileRepository {
    collection: Collection<MongoUserProfile>,
}

#[cfg(feature = "mongodb")]
impl MongoProfileRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("user_profiles");
        Self { collection }
    }

    /// Replace the stored profile, keeping its original `created_at`
    pub async fn upsert(&self, mut profile: MongoUserProfile) -> Result<()> {
        let filter = doc! { "_id": &profile.user_id };
        if let Some(existing) = self.collection.find_one(filter.clone()).await? {
            profile.created_at = existing.created_at;
        }
        profile.updated_at = chrono::Utc::now();

        self.collection
            .replace_one(filter, &profile)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<MongoUserProfile>> {
        let filter = doc! { "_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }
}
