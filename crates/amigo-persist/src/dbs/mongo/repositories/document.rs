#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson::doc};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::{MongoDocument, MongoSuggestion};
#[cfg(feature = "mongodb")]
use crate::error::Result;

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoDocumentRepository {
    collection: Collection<MongoDocument>,
}

#[cfg(feature = "mongodb")]
impl MongoDocumentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("documents");
        Self { collection }
    }

    pub async fn save_version(&self, document: MongoDocument) -> Result<()> {
        self.collection.insert_one(&document).await?;
        Ok(())
    }

    pub async fn get_latest(&self, document_id: &str) -> Result<Option<MongoDocument>> {
        let filter = doc! { "document_id": document_id };
        Ok(self.collection
            .find_one(filter)
            .sort(doc! { "created_at": -1 })
            .await?)
    }

    pub async fn get_versions(&self, document_id: &str) -> Result<Vec<MongoDocument>> {
        let filter = doc! { "document_id": document_id };
        let versions = self.collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(versions)
    }
}

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoSuggestionRepository {
    collection: Collection<MongoSuggestion>,
}

#[cfg(feature = "mongodb")]
impl MongoSuggestionRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("suggestions");
        Self { collection }
    }

    pub async fn save_suggestions(&self, suggestions: Vec<MongoSuggestion>) -> Result<()> {
        if suggestions.is_empty() {
            return Ok(());
        }
        self.collection.insert_many(suggestions).await?;
        Ok(())
    }

    pub async fn get_suggestions(&self, document_id: &str) -> Result<Vec<MongoSuggestion>> {
        let filter = doc! { "document_id": document_id };
        let suggestions = self.collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(suggestions)
    }
}
