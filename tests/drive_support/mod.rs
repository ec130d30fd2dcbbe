#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use meetai::drive::{CreateFolderRequest, DriveApi, DriveItem, FolderId, GraphError};

/// One recorded drive call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetByPath(String),
    List(String),
    Create { name: String, conflict: String },
    Put { path: String, content_type: String, bytes: usize },
}

/// In-memory drive root that records every call.
#[derive(Default)]
pub struct FakeDrive {
    root: Mutex<Vec<DriveItem>>,
    calls: Mutex<Vec<Call>>,
    lookup_errors: Mutex<Vec<GraphError>>,
    create_errors: Mutex<Vec<GraphError>>,
    put_errors: Mutex<Vec<GraphError>>,
    next_id: Mutex<u32>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(self, id: &str, name: &str) -> Self {
        self.root.lock().expect("lock").push(folder(id, name));
        self
    }

    pub fn with_file(self, id: &str, name: &str) -> Self {
        self.root.lock().expect("lock").push(file(id, name));
        self
    }

    pub fn fail_lookup(self, err: GraphError) -> Self {
        self.lookup_errors.lock().expect("lock").push(err);
        self
    }

    pub fn fail_create(self, err: GraphError) -> Self {
        self.create_errors.lock().expect("lock").push(err);
        self
    }

    pub fn fail_put(self, err: GraphError) -> Self {
        self.put_errors.lock().expect("lock").push(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn puts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Put { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn folders_named(&self, prefix: &str) -> usize {
        self.root
            .lock()
            .expect("lock")
            .iter()
            .filter(|i| i.is_folder() && i.name.starts_with(prefix))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }

    fn take(queue: &Mutex<Vec<GraphError>>) -> Option<GraphError> {
        let mut queue = queue.lock().expect("lock");
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }
}

pub fn folder(id: &str, name: &str) -> DriveItem {
    serde_json::from_value(serde_json::json!({ "id": id, "name": name, "folder": {} }))
        .expect("folder item")
}

pub fn file(id: &str, name: &str) -> DriveItem {
    serde_json::from_value(serde_json::json!({ "id": id, "name": name, "file": {} }))
        .expect("file item")
}

pub fn not_found() -> GraphError {
    GraphError::api(404, Some("itemNotFound"), "The resource could not be found.")
}

#[async_trait]
impl DriveApi for FakeDrive {
    async fn get_item_by_path(&self, path: &str) -> Result<DriveItem, GraphError> {
        self.record(Call::GetByPath(path.to_string()));
        if let Some(err) = Self::take(&self.lookup_errors) {
            return Err(err);
        }
        self.root
            .lock()
            .expect("lock")
            .iter()
            .find(|i| i.name == path)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn list_root_children(&self, filter: &str) -> Result<Vec<DriveItem>, GraphError> {
        self.record(Call::List(filter.to_string()));
        if let Some(err) = Self::take(&self.lookup_errors) {
            return Err(err);
        }
        let wanted = filter
            .strip_prefix("name eq '")
            .and_then(|s| s.strip_suffix('\''))
            .map(|s| s.replace("''", "'"))
            .unwrap_or_default();
        Ok(self
            .root
            .lock()
            .expect("lock")
            .iter()
            .filter(|i| i.name == wanted)
            .cloned()
            .collect())
    }

    async fn create_root_folder(
        &self,
        request: &CreateFolderRequest,
    ) -> Result<DriveItem, GraphError> {
        let conflict = serde_json::to_value(request.conflict_behavior)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        self.record(Call::Create {
            name: request.name.clone(),
            conflict,
        });
        if let Some(err) = Self::take(&self.create_errors) {
            return Err(err);
        }
        let mut root = self.root.lock().expect("lock");
        let mut name = request.name.clone();
        let mut n = 1;
        while root.iter().any(|i| i.name == name) {
            name = format!("{} {n}", request.name);
            n += 1;
        }
        let mut next_id = self.next_id.lock().expect("lock");
        *next_id += 1;
        let created = folder(&format!("NEW{next_id}"), &name);
        root.push(created.clone());
        Ok(created)
    }

    async fn put_content(
        &self,
        folder: &FolderId,
        file_name: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<DriveItem, GraphError> {
        self.record(Call::Put {
            path: format!("items/{folder}:/{file_name}:/content"),
            content_type: content_type.to_string(),
            bytes: body.len(),
        });
        if let Some(err) = Self::take(&self.put_errors) {
            return Err(err);
        }
        Ok(file(&format!("FILE-{file_name}"), file_name))
    }
}
