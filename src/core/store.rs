//! Area persistence
//!
//! The engine never touches storage; hosts inject an `AreaStore` into
//! whatever service loads and saves areas.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

use crate::error::{GeofenceError, Result};
use crate::types::{Area, AreaFilter, AreaPage, AreaUpdate, NewArea};

/// Storage for area definitions
pub trait AreaStore: Send + Sync {
    /// All areas, newest first
    fn all(&self) -> Result<Vec<Area>>;

    fn get(&self, id: &str) -> Result<Area>;

    fn create(&self, new_area: NewArea) -> Result<Area>;

    fn update(&self, id: &str, update: AreaUpdate) -> Result<Area>;

    fn delete(&self, id: &str) -> Result<()>;

    /// Filtered, paginated listing
    fn list(&self, filter: AreaFilter) -> Result<AreaPage> {
        let matching: Vec<Area> = self
            .all()?
            .into_iter()
            .filter(|a| !filter.active_only || a.is_active)
            .collect();
        let total = matching.len();
        let areas: Vec<Area> = matching
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        Ok(AreaPage {
            areas,
            total,
            limit: filter.limit,
            offset: filter.offset,
            has_more: total > filter.offset.saturating_add(filter.limit),
        })
    }
}

fn lock_error<T>(_: T) -> GeofenceError {
    GeofenceError::Storage("area store lock poisoned".to_string())
}

/// Areas held in memory
#[derive(Debug, Default)]
pub struct InMemoryAreaStore {
    areas: RwLock<Vec<Area>>,
}

impl InMemoryAreaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing areas (invalid ones are rejected)
    pub fn with_areas(areas: Vec<Area>) -> Result<Self> {
        for area in &areas {
            area.validate()?;
        }
        Ok(Self {
            areas: RwLock::new(areas),
        })
    }

    fn snapshot(&self) -> Result<Vec<Area>> {
        Ok(self.areas.read().map_err(lock_error)?.clone())
    }

    /// Apply `change` to a copy, `persist` it, then publish it.
    /// The write lock is held across all three steps; on error nothing changes.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut Vec<Area>) -> Result<T>,
        persist: impl FnOnce(&[Area]) -> Result<()>,
    ) -> Result<T> {
        let mut areas = self.areas.write().map_err(lock_error)?;
        let mut next = areas.clone();
        let out = change(&mut next)?;
        persist(&next)?;
        *areas = next;
        Ok(out)
    }
}

fn insert_area(areas: &mut Vec<Area>, new_area: NewArea) -> Result<Area> {
    let area = new_area.into_area()?;
    areas.push(area.clone());
    info!(id = %area.id, name = %area.name, "created area");
    Ok(area)
}

fn replace_area(areas: &mut [Area], id: &str, update: AreaUpdate) -> Result<Area> {
    let slot = areas
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| GeofenceError::AreaNotFound(id.to_string()))?;
    let updated = update.apply(slot)?;
    *slot = updated.clone();
    info!(id = %updated.id, name = %updated.name, "updated area");
    Ok(updated)
}

fn remove_area(areas: &mut Vec<Area>, id: &str) -> Result<()> {
    let before = areas.len();
    areas.retain(|a| a.id != id);
    if areas.len() == before {
        return Err(GeofenceError::AreaNotFound(id.to_string()));
    }
    info!(id, "deleted area");
    Ok(())
}

fn in_memory_only(_: &[Area]) -> Result<()> {
    Ok(())
}

impl AreaStore for InMemoryAreaStore {
    fn all(&self) -> Result<Vec<Area>> {
        let mut areas = self.snapshot()?;
        areas.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(areas)
    }

    fn get(&self, id: &str) -> Result<Area> {
        self.areas
            .read()
            .map_err(lock_error)?
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| GeofenceError::AreaNotFound(id.to_string()))
    }

    fn create(&self, new_area: NewArea) -> Result<Area> {
        self.commit(|areas| insert_area(areas, new_area), in_memory_only)
    }

    fn update(&self, id: &str, update: AreaUpdate) -> Result<Area> {
        self.commit(|areas| replace_area(areas, id, update), in_memory_only)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.commit(|areas| remove_area(areas, id), in_memory_only)
    }
}

/// Areas persisted as a pretty-printed JSON array, rewritten on every change
#[derive(Debug)]
pub struct JsonFileAreaStore {
    path: PathBuf,
    inner: InMemoryAreaStore,
}

impl JsonFileAreaStore {
    /// Open the file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let areas = if path.exists() {
            load_areas(&path)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), count = areas.len(), "opened area store");
        Ok(Self {
            path,
            inner: InMemoryAreaStore::with_areas(areas)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_through(&self, areas: &[Area]) -> Result<()> {
        save_areas(areas, &self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to persist areas");
            e
        })
    }
}

impl AreaStore for JsonFileAreaStore {
    fn all(&self) -> Result<Vec<Area>> {
        self.inner.all()
    }

    fn get(&self, id: &str) -> Result<Area> {
        self.inner.get(id)
    }

    fn create(&self, new_area: NewArea) -> Result<Area> {
        self.inner
            .commit(|areas| insert_area(areas, new_area), |areas| self.write_through(areas))
    }

    fn update(&self, id: &str, update: AreaUpdate) -> Result<Area> {
        self.inner
            .commit(|areas| replace_area(areas, id, update), |areas| self.write_through(areas))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner
            .commit(|areas| remove_area(areas, id), |areas| self.write_through(areas))
    }
}

/// Save areas to a JSON file, creating parent directories
///
/// Writes a sibling temp file and renames it over `path`, so readers see
/// either the old or the new array, never a partial one.
pub fn save_areas(areas: &[Area], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(areas)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load areas from a JSON file
pub fn load_areas(path: &Path) -> Result<Vec<Area>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

// =============================================================================
// TESTS
// =============================================================================
