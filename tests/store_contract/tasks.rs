use serde::{Deserialize, Serialize};
use store_contract::{
    capabilities, CodecError, Encoding, Factory, IdSetter, Item, Serializable, TimeTracker,
};

pub const TASKS: &str = "tasks";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub namespace: String,
    pub id: String,
    pub title: String,
    pub priority: u8,
    pub done: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn new(id: &str, title: &str, priority: u8) -> Self {
        Task {
            namespace: TASKS.into(),
            id: id.into(),
            title: title.into(),
            priority,
            ..Task::default()
        }
    }
}

impl Item for Task {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn id(&self) -> &str {
        &self.id
    }

    capabilities!(Serializable, TimeTracker, IdSetter);
}

impl Serializable for Task {
    fn marshal(&self) -> Result<Vec<u8>, CodecError> {
        Encoding::Bitcode.encode(self)
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        *self = Encoding::Bitcode.decode(bytes)?;
        Ok(())
    }
}

impl TimeTracker for Task {
    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn set_created_at(&mut self, unix: i64) {
        self.created_at = unix;
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, unix: i64) {
        self.updated_at = unix;
    }
}

impl IdSetter for Task {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

pub struct TaskFactory;

impl Factory for TaskFactory {
    type Item = Task;

    fn create(&self) -> Task {
        Task::new("", "", 0)
    }
}

/// Identity only. Stores keep it without content or timestamps.
pub struct Marker {
    pub namespace: String,
    pub id: String,
}

impl Marker {
    pub fn new(id: &str) -> Self {
        Marker {
            namespace: "markers".into(),
            id: id.into(),
        }
    }
}

impl Item for Marker {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Encodes fine, refuses to decode.
#[derive(Default, Serialize)]
pub struct Unreadable {
    pub id: String,
}

impl Item for Unreadable {
    fn namespace(&self) -> &str {
        "unreadable"
    }

    fn id(&self) -> &str {
        &self.id
    }

    capabilities!(Serializable);
}

impl Serializable for Unreadable {
    fn marshal(&self) -> Result<Vec<u8>, CodecError> {
        Encoding::Json.encode(self)
    }

    fn unmarshal(&mut self, _bytes: &[u8]) -> Result<(), CodecError> {
        Err(CodecError::new("unreadable on purpose"))
    }
}
