use std::{collections::HashMap, sync::Arc};

use assistant::{Assistant, Conversation};
use db::DBService;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod store;

/// One open chat surface. The owner id sits outside the mutex so ownership
/// checks and teardown never wait on an in-flight resolve.
pub struct ConversationEntry {
    pub user_id: Uuid,
    pub conversation: Mutex<Conversation>,
}

impl ConversationEntry {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            user_id: conversation.user_id,
            conversation: Mutex::new(conversation),
        }
    }
}

/// Open conversations, keyed by conversation id. Each conversation sits
/// behind its own mutex so one slow resolve never blocks other users, and a
/// second message to the same conversation can be rejected while the first
/// is still in flight.
pub type ConversationMap = Arc<RwLock<HashMap<Uuid, Arc<ConversationEntry>>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub assistant: Arc<Assistant>,
    pub conversations: ConversationMap,
}

impl AppState {
    pub fn new(db: DBService, assistant: Assistant) -> Self {
        Self {
            db,
            assistant: Arc::new(assistant),
            conversations: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
