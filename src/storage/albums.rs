//! Local albums
//!
//! Albums group gallery photos by id. All albums live in one JSON index file
//! at the gallery root; photos themselves are never moved or copied.

use crate::core::error::{CameraError, Result};
use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// File name of the album index inside the gallery root
pub const ALBUM_INDEX_FILE: &str = "albums.json";

/// A named collection of photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo_id: Option<String>,
    /// Member photo ids, most recently added first
    #[serde(default)]
    pub photo_ids: Vec<String>,
    /// Position in the album list (ascending)
    #[serde(default)]
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Album {
    pub fn photo_count(&self) -> usize {
        self.photo_ids.len()
    }

    pub fn contains(&self, photo_id: &str) -> bool {
        self.photo_ids.iter().any(|id| id == photo_id)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Every album in a gallery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumIndex {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    albums: Vec<Album>,
}

impl AlbumIndex {
    /// Load the index, or start an empty one if the file does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            trace!("No album index at {}", path.display());
            return Ok(Self::default());
        }
        let file = File::open(path).map_err(|e| {
            CameraError::PersistenceError(format!("Failed to open album index: {}", e))
        })?;
        let index: AlbumIndex = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            CameraError::PersistenceError(format!("Failed to parse album index: {}", e))
        })?;
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path).map_err(|e| {
            CameraError::PersistenceError(format!("Failed to create album index: {}", e))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            CameraError::PersistenceError(format!("Failed to write album index: {}", e))
        })?;
        debug!("Saved {} album(s) to {}", self.albums.len(), path.display());
        Ok(())
    }

    /// Albums by sort order, newest first among equals
    pub fn sorted(&self) -> Vec<Album> {
        let mut albums = self.albums.clone();
        albums.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        albums
    }

    pub fn get(&self, id: &str) -> Result<&Album> {
        self.albums
            .iter()
            .find(|album| album.id == id)
            .ok_or_else(|| CameraError::AlbumNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Album> {
        self.albums
            .iter_mut()
            .find(|album| album.id == id)
            .ok_or_else(|| CameraError::AlbumNotFound(id.to_string()))
    }

    /// Add an empty album at the end of the list
    pub fn create(&mut self, name: &str, description: Option<&str>) -> Result<Album> {
        let name = clean_name(name)?;
        self.next_id += 1;
        let now = Utc::now();
        let album = Album {
            id: format!("album-{}", self.next_id),
            name,
            description: clean_description(description),
            cover_photo_id: None,
            photo_ids: Vec::new(),
            sort_order: self.albums.len() as u32,
            created_at: now,
            updated_at: now,
        };
        self.albums.push(album.clone());
        Ok(album)
    }

    /// Change the name and/or description. `Some("")` clears the description.
    pub fn update(&mut self, id: &str, name: Option<&str>, description: Option<&str>) -> Result<Album> {
        let name = name.map(clean_name).transpose()?;
        let album = self.get_mut(id)?;
        if let Some(name) = name {
            album.name = name;
        }
        if description.is_some() {
            album.description = clean_description(description);
        }
        album.touch();
        Ok(album.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Album> {
        let position = self
            .albums
            .iter()
            .position(|album| album.id == id)
            .ok_or_else(|| CameraError::AlbumNotFound(id.to_string()))?;
        Ok(self.albums.remove(position))
    }

    /// Add photos to an album. Members already present are skipped.
    ///
    /// Returns how many were added.
    pub fn add_photos(&mut self, id: &str, photo_ids: &[String]) -> Result<usize> {
        let album = self.get_mut(id)?;
        let mut added = 0;
        for photo_id in photo_ids {
            if !album.contains(photo_id) {
                album.photo_ids.insert(0, photo_id.clone());
                added += 1;
            }
        }
        if added > 0 {
            album.touch();
        }
        Ok(added)
    }

    /// Take a photo out of an album, dropping it as cover too
    pub fn remove_photo(&mut self, id: &str, photo_id: &str) -> Result<bool> {
        let album = self.get_mut(id)?;
        let before = album.photo_ids.len();
        album.photo_ids.retain(|member| member != photo_id);
        if album.cover_photo_id.as_deref() == Some(photo_id) {
            album.cover_photo_id = None;
        }
        let removed = album.photo_ids.len() != before;
        if removed {
            album.touch();
        }
        Ok(removed)
    }

    /// Use a member photo as the album cover
    pub fn set_cover(&mut self, id: &str, photo_id: &str) -> Result<()> {
        let album = self.get_mut(id)?;
        if !album.contains(photo_id) {
            return Err(CameraError::InvalidAlbum(format!(
                "photo {} is not in album {}",
                photo_id, id
            )));
        }
        album.cover_photo_id = Some(photo_id.to_string());
        album.touch();
        Ok(())
    }

    /// Put the listed albums first, in the given order; the rest keep their
    /// relative order after them
    pub fn reorder(&mut self, ids: &[String]) -> Result<()> {
        for id in ids {
            self.get(id)?;
        }
        let rest: Vec<String> = self
            .sorted()
            .into_iter()
            .map(|album| album.id)
            .filter(|id| !ids.contains(id))
            .collect();
        for (position, id) in ids.iter().chain(rest.iter()).enumerate() {
            self.get_mut(id)?.sort_order = position as u32;
        }
        Ok(())
    }

    /// Drop a permanently deleted photo from every album.
    ///
    /// Returns whether any album changed.
    pub fn forget_photo(&mut self, photo_id: &str) -> bool {
        let mut changed = false;
        for album in self.albums.iter_mut() {
            let before = album.photo_ids.len();
            album.photo_ids.retain(|member| member != photo_id);
            let was_cover = album.cover_photo_id.as_deref() == Some(photo_id);
            if was_cover {
                album.cover_photo_id = None;
            }
            if was_cover || album.photo_ids.len() != before {
                album.touch();
                changed = true;
            }
        }
        changed
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CameraError::InvalidAlbum("album name is empty".to_string()));
    }
    Ok(name.to_string())
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
