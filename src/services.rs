use crate::config::Config;
use crate::database::Database;
use crate::error::{AppError, Result};
use crate::models::{Item, ItemKind, MessageView};
use chrono::{DateTime, Duration, Utc};

#[derive(Clone)]
pub struct ClipboardService {
    config: Config,
    db: Database,
}

impl ClipboardService {
    pub fn new(config: Config, db: Database) -> Self {
        Self { config, db }
    }

    /// Oldest creation time still considered live.
    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now() - Duration::hours(self.config.retention_hours)
    }

    /// Store a text snippet for `owner_id`. The text is trimmed before
    /// storage; an empty or whitespace-only message is rejected.
    pub async fn append_text(&self, owner_id: &str, message: &str) -> Result<Item> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Message content required".to_string()));
        }

        let item = Item::new(owner_id.to_string(), ItemKind::Text, trimmed.to_string());
        self.db.insert_item(&item).await?;

        tracing::info!("Stored text item {} for owner {}", item.id, owner_id);
        Ok(item)
    }

    /// Record a file reference for `owner_id`. The upload handler has
    /// already written the bytes under the owner's upload directory; only
    /// the filename is stored here.
    pub async fn append_file(&self, owner_id: &str, filename: &str) -> Result<Item> {
        let item = Item::new(owner_id.to_string(), ItemKind::File, filename.to_string());
        self.db.insert_item(&item).await?;

        tracing::info!("Stored file item {} ({}) for owner {}", item.id, filename, owner_id);
        Ok(item)
    }

    /// Non-expired items for `owner_id`, newest first, rendered for the
    /// client: literal content for text, `<owner>/<filename>` for files.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<MessageView>> {
        let items = self.db.list_by_owner(owner_id, self.cutoff()).await?;

        let views = items
            .into_iter()
            .map(|item| {
                let kind = item.kind;
                let (content, filename) = match kind {
                    ItemKind::Text => (Some(item.payload), None),
                    ItemKind::File => {
                        (None, Some(format!("{}/{}", item.owner_id, item.payload)))
                    }
                };
                MessageView {
                    kind,
                    content,
                    filename,
                    timestamp: item.created_at.timestamp(),
                }
            })
            .collect();

        Ok(views)
    }

    /// Delete everything `owner_id` has stored, expired items included.
    pub async fn clear(&self, owner_id: &str) -> Result<u64> {
        let count = self.db.clear_owner(owner_id).await?;

        if count > 0 {
            tracing::info!("Cleared {} items for owner {}", count, owner_id);
        }
        Ok(count)
    }

    /// Physically remove items past the retention window (run periodically).
    pub async fn purge_expired(&self) -> Result<u64> {
        self.db.purge_expired(self.cutoff()).await
    }

    /// When an item created at `created_at` expires.
    pub fn expiry_of(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::hours(self.config.retention_hours)
    }
}
