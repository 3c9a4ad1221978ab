#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson::doc};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoMessage;
#[cfg(feature = "mongodb")]
use crate::error::Result;

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

#[cfg(feature = "mongodb")]
impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    pub async fn save_messages(&self, messages: Vec<MongoMessage>) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        self.collection.insert_many(messages).await?;
        Ok(())
    }

    /// Get all messages for a chat
    pub async fn get_messages(&self, chat_id: &str) -> Result<Vec<MongoMessage>> {
        let filter = doc! { "chat_id": chat_id };
        let messages = self.collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn delete_for_chat(&self, chat_id: &str) -> Result<u64> {
        let filter = doc! { "chat_id": chat_id };
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }
}
