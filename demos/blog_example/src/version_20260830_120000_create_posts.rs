use mongodb::{IndexModel, bson::doc};
use mongomigrate::{Context, MigrationError, MigrationTrait};

const NAME: &str = "version_20260830_120000_create_posts";

#[derive(Debug)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    fn name(&self) -> &str {
        NAME
    }

    async fn apply(&self, ctx: &Context) -> Result<(), MigrationError> {
        let database = ctx.database()?;

        database.create_collection("posts", None).await?;
        database
            .collection::<mongodb::bson::Document>("posts")
            .create_index(
                IndexModel::builder().keys(doc! { "slug": 1 }).build(),
                None,
            )
            .await?;

        Ok(())
    }

    async fn revert(&self, ctx: &Context) -> Result<(), MigrationError> {
        let database = ctx.database()?;

        database
            .collection::<mongodb::bson::Document>("posts")
            .drop(None)
            .await?;

        Ok(())
    }
}
