use crate::part::{Folder, Part, DEFAULT_FOLDER_ID};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Folders guaranteed to exist in every store. Reseeding never
/// overwrites a folder the user has edited.
const DEFAULT_FOLDERS: [(&str, &str, &str, &str); 4] = [
    (DEFAULT_FOLDER_ID, "Unsorted", "Parts not filed anywhere yet", "#6b7280"),
    ("vectors", "Vectors", "Vector backbones", "#3b82f6"),
    ("parts", "Parts", "Basic building parts", "#10b981"),
    ("assemblies", "Assemblies", "Finished assemblies", "#8b5cf6"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: usize,
    pub failed: usize,
}

/// In-memory part library with folder grouping. Listing order is
/// newest first; lookups that find nothing return absent values rather
/// than failing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartStore {
    parts: HashMap<String, Part>,
    folders: HashMap<String, Folder>,
}

fn library_order(a: &Part, b: &Part) -> Ordering {
    b.added_at
        .cmp(&a.added_at)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

impl PartStore {
    pub fn new() -> Self {
        let mut store = PartStore::default();
        store.seed_default_folders();
        store
    }

    /// Ensures the four stock folders exist. Runs on every open, so a
    /// deleted stock folder comes back while edits to one survive.
    pub fn seed_default_folders(&mut self) {
        for (id, name, description, color) in DEFAULT_FOLDERS {
            self.folders.entry(id.to_string()).or_insert_with(|| Folder {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                color: color.to_string(),
                created_at: 0,
            });
        }
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn get_all(&self) -> Vec<Part> {
        let mut parts: Vec<Part> = self.parts.values().cloned().collect();
        parts.sort_by(library_order);
        parts
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Part> {
        self.parts.get(id)
    }

    /// Exact-name lookup. Ambiguous names resolve to the smallest id so
    /// repeated calls agree.
    pub fn get_by_name(&self, name: &str) -> Option<&Part> {
        self.parts
            .values()
            .filter(|part| part.name == name)
            .min_by(|a, b| a.id.cmp(&b.id))
    }

    /// Case-insensitive substring search over name, description and
    /// declared part type.
    pub fn search(&self, query: &str) -> Vec<Part> {
        let needle = query.to_lowercase();
        let mut hits: Vec<Part> = self
            .parts
            .values()
            .filter(|part| {
                part.name.to_lowercase().contains(&needle)
                    || part.description.to_lowercase().contains(&needle)
                    || part.part_type.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(library_order);
        hits
    }

    pub fn upsert(&mut self, part: Part) -> bool {
        self.parts.insert(part.id.clone(), part);
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.parts.remove(id).is_some()
    }

    pub fn delete_many(&mut self, ids: &[String]) -> DeleteOutcome {
        let mut outcome = DeleteOutcome { success: 0, failed: 0 };
        for id in ids {
            if self.delete(id) {
                outcome.success += 1;
            } else {
                outcome.failed += 1;
            }
        }
        outcome
    }

    pub fn list_folders(&self) -> Vec<Folder> {
        let mut folders: Vec<Folder> = self.folders.values().cloned().collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        folders
    }

    pub fn get_folder(&self, id: &str) -> Option<&Folder> {
        self.folders.get(id)
    }

    /// Rejects id and name collisions so two folders never look alike
    /// in a picker.
    pub fn create_folder(&mut self, folder: Folder) -> bool {
        if self.folders.contains_key(&folder.id) {
            return false;
        }
        if self.folders.values().any(|existing| existing.name == folder.name) {
            return false;
        }
        self.folders.insert(folder.id.clone(), folder);
        true
    }

    /// Updates name, description and color. Creation time is kept from
    /// the stored folder.
    pub fn update_folder(&mut self, folder: Folder) -> bool {
        match self.folders.get_mut(&folder.id) {
            Some(existing) => {
                existing.name = folder.name;
                existing.description = folder.description;
                existing.color = folder.color;
                true
            }
            None => false,
        }
    }

    /// Deletes a folder, first moving its parts to `move_to` (the
    /// default folder when unset). The default folder itself cannot be
    /// deleted.
    pub fn delete_folder(&mut self, folder_id: &str, move_to: Option<&str>) -> bool {
        if folder_id == DEFAULT_FOLDER_ID || !self.folders.contains_key(folder_id) {
            return false;
        }
        let target = move_to.unwrap_or(DEFAULT_FOLDER_ID).to_string();
        for part in self.parts.values_mut() {
            if part.folder.as_deref() == Some(folder_id) {
                part.folder = Some(target.clone());
            }
        }
        self.folders.remove(folder_id).is_some()
    }

    /// Reassigns the named parts to a folder, skipping unknown ids.
    /// Returns how many actually moved.
    pub fn move_records(&mut self, ids: &[String], folder_id: &str) -> usize {
        let mut moved = 0;
        for id in ids {
            if let Some(part) = self.parts.get_mut(id) {
                part.folder = Some(folder_id.to_string());
                moved += 1;
            }
        }
        moved
    }

    /// Lists one folder's parts, or every part when no folder is
    /// given. Parts without a folder belong to the default folder.
    pub fn list_by_folder(&self, folder_id: Option<&str>) -> Vec<Part> {
        match folder_id {
            None => self.get_all(),
            Some(folder) => {
                let mut parts: Vec<Part> = self
                    .parts
                    .values()
                    .filter(|part| part.folder_or_default() == folder)
                    .cloned()
                    .collect();
                parts.sort_by(library_order);
                parts
            }
        }
    }
}
