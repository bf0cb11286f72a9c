//! MongoDB Index Initialization
//!
//! Creates the indexes the directory relies on. Run once at startup.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

use crate::directory::mongo::{STORES, TEAM_MEMBERS, USERS};

pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_store_indexes(db).await?;
    create_user_indexes(db).await?;
    create_team_member_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_store_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let stores = db.collection::<mongodb::bson::Document>(STORES);

    stores.create_index(
        IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build(),
    ).await?;

    info!("Created indexes on {}", STORES);
    Ok(())
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let users = db.collection::<mongodb::bson::Document>(USERS);

    users.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build(),
    ).await?;

    info!("Created indexes on {}", USERS);
    Ok(())
}

async fn create_team_member_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let members = db.collection::<mongodb::bson::Document>(TEAM_MEMBERS);

    // One membership per (principal, store)
    members.create_index(
        IndexModel::builder()
            .keys(doc! { "principalId": 1, "storeId": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("principal_store_unique".to_string())
                .build())
            .build(),
    ).await?;

    // Team listing
    members.create_index(
        IndexModel::builder()
            .keys(doc! { "storeId": 1, "status": 1 })
            .build(),
    ).await?;

    // Invitation lookup
    members.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .build(),
    ).await?;

    info!("Created indexes on {}", TEAM_MEMBERS);
    Ok(())
}
