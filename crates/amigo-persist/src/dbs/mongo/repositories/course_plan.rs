#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, bson, bson::doc};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;
#[cfg(feature = "mongodb")]
use chrono::Utc;

#[cfg(feature = "mongodb")]
use amigo_types::{CourseModule, CoursePlanContent};

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::models::MongoCoursePlan;
#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoCoursePlanRepository {
    collection: Collection<MongoCoursePlan>,
}

#[cfg(feature = "mongodb")]
impl MongoCoursePlanRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("course_plans");
        Self { collection }
    }

    pub async fn latest_for_user(&self, user_id: &str) -> Result<Option<MongoCoursePlan>> {
        let filter = doc! { "user_id": user_id };
        Ok(self.collection
            .find_one(filter)
            .sort(doc! { "updated_at": -1 })
            .await?)
    }

    /// Overwrite the latest plan of the user or insert the first one
    pub async fn save(&self, user_id: &str, plan: CoursePlanContent) -> Result<MongoCoursePlan> {
        let now = Utc::now();
        match self.latest_for_user(user_id).await? {
            Some(mut existing) => {
                existing.plan = plan;
                existing.updated_at = now;
                let filter = doc! { "_id": &existing.id };
                self.collection.replace_one(filter, &existing).await?;
                Ok(existing)
            }
            None => {
                let created = MongoCoursePlan {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    plan,
                    created_at: now,
                    updated_at: now,
                };
                self.collection.insert_one(&created).await?;
                Ok(created)
            }
        }
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MongoCoursePlan>> {
        let filter = doc! { "user_id": user_id };
        let plans = self.collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(plans)
    }

    pub async fn get(&self, plan_id: &str) -> Result<Option<MongoCoursePlan>> {
        let filter = doc! { "_id": plan_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn update_modules(
        &self,
        plan_id: &str,
        modules: Vec<CourseModule>,
    ) -> Result<MongoCoursePlan> {
        let filter = doc! { "_id": plan_id };
        let update = doc! {
            "$set": {
                "plan.modules": bson::to_bson(&modules)?,
                "updated_at": bson::DateTime::now(),
            }
        };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::not_found("course plan", plan_id));
        }
        self.get(plan_id)
            .await?
            .ok_or_else(|| PersistError::not_found("course plan", plan_id))
    }
}
