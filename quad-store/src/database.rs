use mongodb::{Client, Collection, Database};
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    db: Database,
}

impl DbClient {
    pub async fn connect(url: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(url).await?;
        info!("Connected to MongoDB database '{}'", db_name);
        Ok(Self {
            db: client.database(db_name),
        })
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
