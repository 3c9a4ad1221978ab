#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson::doc};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoChat;
#[cfg(feature = "mongodb")]
use crate::error::Result;
#[cfg(feature = "mongodb")]
use crate::models::Visibility;

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoChatRepository {
    collection: Collection<MongoChat>,
}

#[cfg(feature = "mongodb")]
impl MongoChatRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("chats");
        Self { collection }
    }

    /// Insert the chat unless one with the same id exists
    pub async fn save_chat(&self, chat: MongoChat) -> Result<()> {
        let filter = doc! { "_id": &chat.id };
        if self.collection.find_one(filter).await?.is_none() {
            self.collection.insert_one(&chat).await?;
        }
        Ok(())
    }

    pub async fn get_chat(&self, chat_id: &str) -> Result<Option<MongoChat>> {
        let filter = doc! { "_id": chat_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn list_chats(&self, user_id: &str) -> Result<Vec<MongoChat>> {
        let filter = doc! { "user_id": user_id };
        let chats = self.collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(chats)
    }

    /// Returns how many chats matched
    pub async fn update_visibility(&self, chat_id: &str, visibility: Visibility) -> Result<u64> {
        let filter = doc! { "_id": chat_id };
        let update = doc! { "$set": { "visibility": mongodb::bson::to_bson(&visibility)? } };
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count)
    }

    pub async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        let filter = doc! { "_id": chat_id };
        self.collection.delete_one(filter).await?;
        Ok(())
    }
}
