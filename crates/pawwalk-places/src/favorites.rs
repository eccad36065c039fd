//! Favorite places, persisted as a JSON list.
//!
//! Every change is written through immediately. The in-memory list only
//! changes once the write succeeded.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::PlacesError;
use crate::types::Place;

#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    places: Mutex<Vec<Place>>,
}

impl FavoritesStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let places = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    "Favorites file {} is corrupt, starting empty: {}",
                    path.display(),
                    e
                );
                Vec::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read favorites: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} favorites", places.len());

        Self {
            path,
            places: Mutex::new(places),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add `place` if absent, remove it if present.
    /// Returns whether the place is a favorite afterwards.
    pub fn toggle(&self, place: &Place) -> Result<bool, PlacesError> {
        let mut places = self.places.lock();

        let mut updated = places.clone();
        let now_favorite = match updated.iter().position(|p| p.place_id == place.place_id) {
            Some(index) => {
                updated.remove(index);
                false
            }
            None => {
                updated.push(place.clone());
                true
            }
        };

        self.persist(&updated)?;
        *places = updated;

        tracing::info!(
            "{} {} favorites",
            if now_favorite { "Added" } else { "Removed" },
            place.name
        );
        Ok(now_favorite)
    }

    pub fn contains(&self, place_id: &str) -> bool {
        self.places.lock().iter().any(|p| p.place_id == place_id)
    }

    /// Snapshot in insertion order
    pub fn list(&self) -> Vec<Place> {
        self.places.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.places.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.lock().is_empty()
    }

    fn persist(&self, places: &[Place]) -> Result<(), PlacesError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PlacesError::Storage(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(places).map_err(|e| PlacesError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| PlacesError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Geometry, LatLng};
    use tempfile::TempDir;

    fn place(id: &str) -> Place {
        Place {
            place_id: id.to_string(),
            name: format!("Place {}", id),
            vicinity: None,
            geometry: Geometry {
                location: LatLng { lat: 37.5, lng: 127.0 },
            },
            rating: Some(4.5),
            opening_hours: None,
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let temp = TempDir::new().unwrap();
        let store = FavoritesStore::load(temp.path().join("favorites.json"));

        assert!(store.toggle(&place("a")).unwrap());
        assert!(store.contains("a"));
        assert!(!store.toggle(&place("a")).unwrap());
        assert!(!store.contains("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_changes_survive_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.json");

        let store = FavoritesStore::load(&path);
        store.toggle(&place("a")).unwrap();
        store.toggle(&place("b")).unwrap();

        let reloaded = FavoritesStore::load(&path);
        let ids: Vec<_> = reloaded.list().into_iter().map(|p| p.place_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.json");
        std::fs::write(&path, "[{\"place_id\":").unwrap();

        let store = FavoritesStore::load(&path);
        assert_eq!(store.len(), 0);

        // The next change overwrites the corrupt file
        store.toggle(&place("c")).unwrap();
        assert_eq!(FavoritesStore::load(&path).len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let temp = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail
        let path = temp.path().join("favorites.json");
        std::fs::create_dir(&path).unwrap();

        let store = FavoritesStore::load(&path);
        assert!(matches!(store.toggle(&place("a")), Err(PlacesError::Storage(_))));
        assert!(!store.contains("a"));
    }
}
