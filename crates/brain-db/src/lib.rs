//! # brain-db
//!
//! PostgreSQL database layer for second-brain.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for cards, topics, profiles and sessions
//! - Embedded migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use brain_db::{CardInput, CardRepository, Category, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/second_brain").await?;
//!
//!     let card = db.cards.insert(user_id, CardInput {
//!         title: "Grace".to_string(),
//!         category: Category::Studies,
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created card: {}", card.id);
//!     Ok(())
//! }
//! ```

pub mod cards;
pub mod pool;
pub mod profiles;
pub mod sessions;
pub mod topics;

// Test fixtures for integration tests
pub mod test_fixtures;

// Re-export core types
pub use brain_core::*;

pub use cards::PgCardRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use profiles::PgProfileRepository;
pub use sessions::PgSessionRepository;
pub use topics::PgTopicRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub cards: PgCardRepository,
    pub topics: PgTopicRepository,
    pub profiles: PgProfileRepository,
    pub sessions: PgSessionRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            cards: PgCardRepository::new(pool.clone()),
            topics: PgTopicRepository::new(pool.clone()),
            profiles: PgProfileRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
