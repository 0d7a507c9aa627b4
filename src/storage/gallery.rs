//! Local photo gallery
//!
//! Stores captured stills under a date-partitioned tree with a JSON sidecar
//! per photo:
//!
//! ```text
//! <root>/2026/10/19/1781870400123-SceneCam_1781870400123.jpg
//! <root>/2026/10/19/1781870400123-SceneCam_1781870400123.jpg.json
//! <root>/albums.json
//! ```
//!
//! The sidecar is written after the image; if that fails the image is
//! removed again so the tree never holds a photo without metadata.
//!
//! Deleting is two-step: `trash` only stamps the sidecar and hides the photo,
//! `delete` removes the files and drops the photo from every album.

use crate::core::error::{CameraError, Result};
use crate::device::traits::FacingMode;
use crate::scene::catalog::SceneId;
use crate::scene::params::CaptureParameters;
use crate::session::capture::{CapturedPhoto, GeoLocation, PhotoSink};
use crate::storage::albums::{Album, AlbumIndex, ALBUM_INDEX_FILE};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use walkdir::WalkDir;

/// Sidecar extension appended to the image file name
const SIDECAR_EXTENSION: &str = "json";

/// Default storage quota (1 GiB)
pub const DEFAULT_QUOTA_BYTES: u64 = 1024 * 1024 * 1024;

/// Metadata stored next to every photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// `<millis>-<first 12 hex digits of the SHA-256>`
    pub id: String,
    /// SHA-256 of the image bytes, hex encoded
    pub sha256: String,
    /// Path relative to the gallery root, `/`-separated
    pub storage_path: String,
    pub file_size_bytes: u64,
    pub mime_type: String,
    pub scene: SceneId,
    pub params: CaptureParameters,
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
    pub taken_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    /// Set while the photo sits in the trash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PhotoRecord {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Editable photo metadata. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoUpdate {
    pub scene: Option<SceneId>,
    /// `Some(None)` removes the location
    pub location: Option<Option<GeoLocation>>,
}

/// Disk use of a gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    /// Bytes of every stored photo, trashed ones included
    pub used_bytes: u64,
    /// `0` means unlimited
    pub quota_bytes: u64,
    pub photo_count: usize,
    pub trashed_count: usize,
    pub trashed_bytes: u64,
}

impl StorageUsage {
    /// Bytes left before the quota is reached (`None` when unlimited)
    pub fn remaining(&self) -> Option<u64> {
        (self.quota_bytes > 0).then(|| self.quota_bytes.saturating_sub(self.used_bytes))
    }

    /// Fraction of the quota in use, 0.0..=1.0 (0.0 when unlimited)
    pub fn fraction_used(&self) -> f64 {
        if self.quota_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.quota_bytes as f64).min(1.0)
    }
}

/// An album with the photos it currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumContents {
    pub album: Album,
    /// Members not in the trash, most recently added first
    pub photos: Vec<PhotoRecord>,
}

/// Filesystem-backed gallery
#[derive(Debug, Clone)]
pub struct FileGallery {
    root: PathBuf,
    quota_bytes: u64,
    /// Serializes read-modify-write of sidecars and the album index
    write_lock: Arc<Mutex<()>>,
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

impl FileGallery {
    /// Open (and create if needed) a gallery rooted at `root`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            CameraError::PersistenceError(format!(
                "Cannot create gallery at {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self {
            root,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Limit the bytes the gallery may hold; `0` disables the limit
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative storage path for a photo: `yyyy/mm/dd/<millis>-<name>`
    pub fn storage_path_for(taken_at: &DateTime<Utc>, millis: i64, file_name: &str) -> String {
        format!("{}/{}-{}", taken_at.format("%Y/%m/%d"), millis, file_name)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn album_index_path(&self) -> PathBuf {
        self.root.join(ALBUM_INDEX_FILE)
    }

    fn absolute(&self, storage_path: &str) -> PathBuf {
        storage_path
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    // -------------------------------------------------------------------------
    // Photos
    // -------------------------------------------------------------------------

    /// Every record, trashed ones included, in no particular order
    fn records(&self) -> Result<Vec<PhotoRecord>> {
        let index_path = self.album_index_path();
        let mut records = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path == index_path
                || path.extension().and_then(|e| e.to_str()) != Some(SIDECAR_EXTENSION)
            {
                continue;
            }
            match Self::read_record(path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable sidecar {}: {}", path.display(), e),
            }
        }
        Ok(records)
    }

    /// Photos outside the trash, newest first
    pub fn list(&self) -> Result<Vec<PhotoRecord>> {
        let mut records: Vec<PhotoRecord> = self
            .records()?
            .into_iter()
            .filter(|record| !record.is_trashed())
            .collect();
        records.sort_by(|a, b| b.taken_at.cmp(&a.taken_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Photos in the trash, most recently trashed first
    pub fn trashed(&self) -> Result<Vec<PhotoRecord>> {
        let mut records: Vec<PhotoRecord> = self
            .records()?
            .into_iter()
            .filter(PhotoRecord::is_trashed)
            .collect();
        records.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Look up a photo by id. Trashed photos are not found.
    pub fn get(&self, id: &str) -> Result<PhotoRecord> {
        self.find(id)
            .and_then(|record| (!record.is_trashed()).then_some(record))
            .ok_or_else(|| CameraError::PhotoNotFound(id.to_string()))
    }

    fn find(&self, id: &str) -> Option<PhotoRecord> {
        self.records()
            .ok()?
            .into_iter()
            .find(|record| record.id == id)
    }

    /// Absolute path of a record's image
    pub fn image_path(&self, record: &PhotoRecord) -> PathBuf {
        self.absolute(&record.storage_path)
    }

    /// Change a photo's editable metadata
    pub fn update(&self, id: &str, update: PhotoUpdate) -> Result<PhotoRecord> {
        let _guard = self.lock();
        let mut record = self.get(id)?;
        if let Some(scene) = update.scene {
            record.scene = scene;
        }
        if let Some(location) = update.location {
            record.location = location;
        }
        self.rewrite_sidecar(&record)?;
        debug!("Updated photo {}", record.id);
        Ok(record)
    }

    /// Move a photo to the trash. It keeps its files and album memberships.
    pub fn trash(&self, id: &str) -> Result<PhotoRecord> {
        let _guard = self.lock();
        let mut record = self.get(id)?;
        record.deleted_at = Some(Utc::now());
        self.rewrite_sidecar(&record)?;
        info!("Moved photo {} to the trash", record.id);
        Ok(record)
    }

    /// Take a photo back out of the trash
    pub fn restore(&self, id: &str) -> Result<PhotoRecord> {
        let _guard = self.lock();
        let mut record = self
            .find(id)
            .filter(PhotoRecord::is_trashed)
            .ok_or_else(|| CameraError::PhotoNotFound(id.to_string()))?;
        record.deleted_at = None;
        self.rewrite_sidecar(&record)?;
        info!("Restored photo {}", record.id);
        Ok(record)
    }

    /// Remove a photo's files for good, trashed or not, and drop it from
    /// every album
    pub fn delete(&self, id: &str) -> Result<PhotoRecord> {
        let _guard = self.lock();
        let record = self
            .find(id)
            .ok_or_else(|| CameraError::PhotoNotFound(id.to_string()))?;
        self.remove_files(&record)?;
        self.forget_in_albums(&[record.id.as_str()])?;
        info!("Deleted photo {}", record.id);
        Ok(record)
    }

    /// Permanently delete everything in the trash. Returns how many went.
    pub fn empty_trash(&self) -> Result<usize> {
        let _guard = self.lock();
        let trashed: Vec<PhotoRecord> = self
            .records()?
            .into_iter()
            .filter(PhotoRecord::is_trashed)
            .collect();
        for record in &trashed {
            self.remove_files(record)?;
        }
        let ids: Vec<&str> = trashed.iter().map(|record| record.id.as_str()).collect();
        self.forget_in_albums(&ids)?;
        info!("Emptied trash ({} photos)", trashed.len());
        Ok(trashed.len())
    }

    /// Bytes in use against the quota
    pub fn usage(&self) -> Result<StorageUsage> {
        let records = self.records()?;
        let mut usage = StorageUsage {
            used_bytes: 0,
            quota_bytes: self.quota_bytes,
            photo_count: 0,
            trashed_count: 0,
            trashed_bytes: 0,
        };
        for record in &records {
            usage.used_bytes += record.file_size_bytes;
            if record.is_trashed() {
                usage.trashed_count += 1;
                usage.trashed_bytes += record.file_size_bytes;
            } else {
                usage.photo_count += 1;
            }
        }
        Ok(usage)
    }

    fn remove_files(&self, record: &PhotoRecord) -> Result<()> {
        let image = self.image_path(record);
        if image.exists() {
            fs::remove_file(&image)?;
        }
        fs::remove_file(sidecar_path(&image))?;
        Ok(())
    }

    fn rewrite_sidecar(&self, record: &PhotoRecord) -> Result<()> {
        Self::write_sidecar(&sidecar_path(&self.image_path(record)), record)
    }

    fn read_record(path: &Path) -> Result<PhotoRecord> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_sidecar(path: &Path, record: &PhotoRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        fs::write(path, content)
            .map_err(|e| CameraError::PersistenceError(format!("{}: {}", path.display(), e)))
    }

    // -------------------------------------------------------------------------
    // Albums
    // -------------------------------------------------------------------------

    /// Run `f` on the album index and save it if `f` succeeds
    fn edit_albums<T>(&self, f: impl FnOnce(&mut AlbumIndex) -> Result<T>) -> Result<T> {
        let path = self.album_index_path();
        let mut index = AlbumIndex::load(&path)?;
        let result = f(&mut index)?;
        index.save(&path)?;
        Ok(result)
    }

    fn forget_in_albums(&self, photo_ids: &[&str]) -> Result<()> {
        let path = self.album_index_path();
        let mut index = AlbumIndex::load(&path)?;
        let mut changed = false;
        for id in photo_ids {
            changed |= index.forget_photo(id);
        }
        if changed {
            index.save(&path)?;
        }
        Ok(())
    }

    /// All albums in display order
    pub fn albums(&self) -> Result<Vec<Album>> {
        Ok(AlbumIndex::load(&self.album_index_path())?.sorted())
    }

    /// One album with its visible photos
    pub fn album(&self, id: &str) -> Result<AlbumContents> {
        let album = AlbumIndex::load(&self.album_index_path())?
            .get(id)?
            .clone();
        let mut records = self.list()?;
        let photos = album
            .photo_ids
            .iter()
            .filter_map(|photo_id| {
                let position = records.iter().position(|record| &record.id == photo_id)?;
                Some(records.swap_remove(position))
            })
            .collect();
        Ok(AlbumContents { album, photos })
    }

    pub fn create_album(&self, name: &str, description: Option<&str>) -> Result<Album> {
        let _guard = self.lock();
        let album = self.edit_albums(|index| index.create(name, description))?;
        info!("Created album {} ({})", album.name, album.id);
        Ok(album)
    }

    /// Rename an album and/or change its description (`Some("")` clears it)
    pub fn update_album(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Album> {
        let _guard = self.lock();
        self.edit_albums(|index| index.update(id, name, description))
    }

    /// Delete an album. Its photos stay in the gallery.
    pub fn delete_album(&self, id: &str) -> Result<Album> {
        let _guard = self.lock();
        let album = self.edit_albums(|index| index.remove(id))?;
        info!("Deleted album {} ({})", album.name, album.id);
        Ok(album)
    }

    /// Add gallery photos to an album. Returns how many were new members.
    pub fn add_to_album(&self, album_id: &str, photo_ids: &[String]) -> Result<usize> {
        let _guard = self.lock();
        for photo_id in photo_ids {
            self.get(photo_id)?;
        }
        self.edit_albums(|index| index.add_photos(album_id, photo_ids))
    }

    pub fn remove_from_album(&self, album_id: &str, photo_id: &str) -> Result<bool> {
        let _guard = self.lock();
        self.edit_albums(|index| index.remove_photo(album_id, photo_id))
    }

    pub fn set_album_cover(&self, album_id: &str, photo_id: &str) -> Result<()> {
        let _guard = self.lock();
        self.get(photo_id)?;
        self.edit_albums(|index| index.set_cover(album_id, photo_id))
    }

    /// Show the given albums first, in this order
    pub fn reorder_albums(&self, ids: &[String]) -> Result<()> {
        let _guard = self.lock();
        self.edit_albums(|index| index.reorder(ids))
    }
}

impl PhotoSink for FileGallery {
    fn persist(&self, photo: &CapturedPhoto) -> Result<PhotoRecord> {
        let _guard = self.lock();
        if self.quota_bytes > 0 {
            let used = self.usage()?.used_bytes;
            if used.saturating_add(photo.size()) > self.quota_bytes {
                return Err(CameraError::QuotaExceeded {
                    used,
                    quota: self.quota_bytes,
                });
            }
        }

        let sha256 = hex_digest(&photo.jpeg);

        // Two captures in the same millisecond get consecutive stamps
        let mut millis = photo.taken_at.timestamp_millis();
        let (storage_path, image_path) = loop {
            let storage_path = Self::storage_path_for(&photo.taken_at, millis, &photo.file_name);
            let image_path = self.absolute(&storage_path);
            if !image_path.exists() {
                break (storage_path, image_path);
            }
            millis += 1;
        };

        if let Some(parent) = image_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::PersistenceError(format!("{}: {}", parent.display(), e))
            })?;
        }
        fs::write(&image_path, &photo.jpeg).map_err(|e| {
            CameraError::PersistenceError(format!("{}: {}", image_path.display(), e))
        })?;

        let record = PhotoRecord {
            id: format!("{}-{}", millis, &sha256[..12]),
            sha256,
            storage_path,
            file_size_bytes: photo.size(),
            mime_type: photo.mime_type().to_string(),
            scene: photo.scene,
            params: photo.params.clone(),
            width: photo.width,
            height: photo.height,
            facing: photo.facing,
            taken_at: photo.taken_at,
            location: photo.location,
            deleted_at: None,
        };

        if let Err(e) = Self::write_sidecar(&sidecar_path(&image_path), &record) {
            if let Err(remove_err) = fs::remove_file(&image_path) {
                warn!(
                    "Could not remove {} after failed metadata write: {}",
                    image_path.display(),
                    remove_err
                );
            }
            return Err(e);
        }

        debug!("Stored {} ({} bytes)", record.storage_path, record.file_size_bytes);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn photo(bytes: &[u8], millis: i64) -> CapturedPhoto {
        CapturedPhoto {
            jpeg: bytes.to_vec(),
            width: 4,
            height: 3,
            file_name: "shot.jpg".to_string(),
            scene: SceneId::Landscape,
            params: SceneId::Landscape.descriptor().default_params(),
            facing: FacingMode::Environment,
            taken_at: Utc.timestamp_millis_opt(millis).unwrap(),
            location: None,
        }
    }

    #[test]
    fn test_storage_path_is_date_partitioned() {
        let taken = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(
            FileGallery::storage_path_for(&taken, 42, "a.jpg"),
            "2024/03/07/42-a.jpg"
        );
    }

    #[test]
    fn test_persist_list_get_delete() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();

        let older = gallery.persist(&photo(b"first", 1_700_000_000_000)).unwrap();
        let newer = gallery.persist(&photo(b"second", 1_700_000_100_000)).unwrap();
        assert!(gallery.image_path(&older).exists());
        assert_eq!(older.file_size_bytes, 5);
        assert_eq!(older.mime_type, "image/jpeg");
        assert_eq!(older.sha256.len(), 64);

        let listed = gallery.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);

        assert_eq!(gallery.get(&older.id).unwrap(), older);

        gallery.delete(&older.id).unwrap();
        assert!(!gallery.image_path(&older).exists());
        assert!(matches!(
            gallery.get(&older.id),
            Err(CameraError::PhotoNotFound(_))
        ));
        assert_eq!(gallery.list().unwrap().len(), 1);
    }

    #[test]
    fn test_same_millisecond_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let a = gallery.persist(&photo(b"same", 1_700_000_000_000)).unwrap();
        let b = gallery.persist(&photo(b"same", 1_700_000_000_000)).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.storage_path, b.storage_path);
        assert_eq!(gallery.list().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_sidecar_removes_image() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let shot = photo(b"orphan?", 1_700_000_000_000);

        // A directory where the sidecar should go makes the write fail
        let storage = FileGallery::storage_path_for(
            &shot.taken_at,
            shot.taken_at.timestamp_millis(),
            &shot.file_name,
        );
        let image_path = gallery.root().join(&storage);
        fs::create_dir_all(sidecar_path(&image_path)).unwrap();

        let result = gallery.persist(&shot);
        assert!(matches!(result, Err(CameraError::PersistenceError(_))));
        assert!(!image_path.exists());
    }

    #[test]
    fn test_trash_hides_and_restore_returns() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let shot = gallery.persist(&photo(b"keep me", 1_700_000_000_000)).unwrap();

        let trashed = gallery.trash(&shot.id).unwrap();
        assert!(trashed.is_trashed());
        assert!(gallery.image_path(&shot).exists());
        assert!(gallery.list().unwrap().is_empty());
        assert!(matches!(
            gallery.get(&shot.id),
            Err(CameraError::PhotoNotFound(_))
        ));
        assert_eq!(gallery.trashed().unwrap().len(), 1);

        // Trashing twice is a miss, restoring a live photo too
        assert!(gallery.trash(&shot.id).is_err());
        let restored = gallery.restore(&shot.id).unwrap();
        assert_eq!(restored, shot);
        assert!(gallery.restore(&shot.id).is_err());
        assert_eq!(gallery.list().unwrap(), vec![shot]);
    }

    #[test]
    fn test_empty_trash_deletes_only_trashed() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let a = gallery.persist(&photo(b"a", 1_700_000_000_000)).unwrap();
        let b = gallery.persist(&photo(b"b", 1_700_000_001_000)).unwrap();
        let c = gallery.persist(&photo(b"c", 1_700_000_002_000)).unwrap();
        gallery.trash(&a.id).unwrap();
        gallery.trash(&b.id).unwrap();

        assert_eq!(gallery.empty_trash().unwrap(), 2);
        assert!(!gallery.image_path(&a).exists());
        assert!(!gallery.image_path(&b).exists());
        assert!(gallery.trashed().unwrap().is_empty());
        assert_eq!(gallery.list().unwrap(), vec![c]);
        assert_eq!(gallery.empty_trash().unwrap(), 0);
    }

    #[test]
    fn test_update_scene_and_location() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let shot = gallery.persist(&photo(b"edit", 1_700_000_000_000)).unwrap();
        let here = GeoLocation {
            latitude: 48.85,
            longitude: 2.35,
        };

        let updated = gallery
            .update(
                &shot.id,
                PhotoUpdate {
                    scene: Some(SceneId::Food),
                    location: Some(Some(here)),
                },
            )
            .unwrap();
        assert_eq!(updated.scene, SceneId::Food);
        assert_eq!(gallery.get(&shot.id).unwrap().location, Some(here));
        // Capture parameters describe the exposure and are not retagged
        assert_eq!(updated.params, shot.params);

        let cleared = gallery
            .update(
                &shot.id,
                PhotoUpdate {
                    location: Some(None),
                    ..PhotoUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.location, None);
        assert_eq!(cleared.scene, SceneId::Food);
    }

    #[test]
    fn test_usage_counts_trash() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap().with_quota(100);
        gallery.persist(&photo(&[0u8; 30], 1_700_000_000_000)).unwrap();
        let old = gallery.persist(&photo(&[1u8; 20], 1_700_000_001_000)).unwrap();
        gallery.trash(&old.id).unwrap();

        let usage = gallery.usage().unwrap();
        assert_eq!(usage.used_bytes, 50);
        assert_eq!(usage.photo_count, 1);
        assert_eq!(usage.trashed_count, 1);
        assert_eq!(usage.trashed_bytes, 20);
        assert_eq!(usage.remaining(), Some(50));
        assert!((usage.fraction_used() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quota_rejects_capture_until_trash_is_emptied() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap().with_quota(50);
        let first = gallery.persist(&photo(&[0u8; 40], 1_700_000_000_000)).unwrap();
        gallery.trash(&first.id).unwrap();

        let result = gallery.persist(&photo(&[1u8; 20], 1_700_000_001_000));
        assert!(matches!(
            result,
            Err(CameraError::QuotaExceeded { used: 40, quota: 50 })
        ));
        assert_eq!(gallery.usage().unwrap().used_bytes, 40);

        gallery.empty_trash().unwrap();
        gallery.persist(&photo(&[1u8; 20], 1_700_000_001_000)).unwrap();

        let unlimited = FileGallery::open(dir.path()).unwrap().with_quota(0);
        unlimited.persist(&photo(&[2u8; 500], 1_700_000_002_000)).unwrap();
        assert_eq!(unlimited.usage().unwrap().remaining(), None);
    }

    #[test]
    fn test_album_shows_live_members_and_forgets_deleted() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let a = gallery.persist(&photo(b"a", 1_700_000_000_000)).unwrap();
        let b = gallery.persist(&photo(b"b", 1_700_000_001_000)).unwrap();
        let album = gallery.create_album("Trips", None).unwrap();

        assert_eq!(
            gallery
                .add_to_album(&album.id, &[a.id.clone(), b.id.clone()])
                .unwrap(),
            2
        );
        assert!(matches!(
            gallery.add_to_album(&album.id, &["nope".to_string()]),
            Err(CameraError::PhotoNotFound(_))
        ));
        gallery.set_album_cover(&album.id, &a.id).unwrap();

        // Trashed members stay in the album but are not shown
        gallery.trash(&a.id).unwrap();
        let contents = gallery.album(&album.id).unwrap();
        assert_eq!(contents.album.photo_count(), 2);
        assert_eq!(contents.photos, vec![b.clone()]);

        gallery.delete(&a.id).unwrap();
        let contents = gallery.album(&album.id).unwrap();
        assert_eq!(contents.album.photo_ids, vec![b.id.clone()]);
        assert_eq!(contents.album.cover_photo_id, None);
        // The index file is not mistaken for a photo sidecar
        assert_eq!(gallery.list().unwrap(), vec![b]);
    }

    #[test]
    fn test_album_rename_reorder_delete() {
        let dir = TempDir::new().unwrap();
        let gallery = FileGallery::open(dir.path()).unwrap();
        let shot = gallery.persist(&photo(b"x", 1_700_000_000_000)).unwrap();
        let first = gallery.create_album("First", None).unwrap();
        let second = gallery.create_album("Second", Some("notes")).unwrap();
        gallery.add_to_album(&first.id, &[shot.id.clone()]).unwrap();

        let renamed = gallery
            .update_album(&second.id, Some("Later"), Some(""))
            .unwrap();
        assert_eq!(renamed.name, "Later");
        assert_eq!(renamed.description, None);

        gallery.reorder_albums(&[second.id.clone()]).unwrap();
        let names: Vec<String> = gallery
            .albums()
            .unwrap()
            .into_iter()
            .map(|album| album.name)
            .collect();
        assert_eq!(names, vec!["Later".to_string(), "First".to_string()]);

        gallery.delete_album(&first.id).unwrap();
        assert!(matches!(
            gallery.album(&first.id),
            Err(CameraError::AlbumNotFound(_))
        ));
        assert!(gallery.get(&shot.id).is_ok());
    }
}
