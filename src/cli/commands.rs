//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::cli::progress::{
    format_bytes, print_error, print_header, print_info, print_success, print_warning,
    ClassifySpinner,
};
use crate::cli::{AlbumCommands, Args, Commands, GalleryCommands};
use crate::core::config::{init_config, ClassifierProvider, Config};
use crate::device::{CameraDevice, FacingMode, Frame, ReplayCamera};
use crate::resolver::sampler::encode_for_classification;
use crate::resolver::{Classification, ClassifyError, GeminiClassifier, SceneClassifier};
use crate::scene::catalog::{SceneId, SCENES};
use crate::session::capture::GeoLocation;
use crate::session::{CameraEvent, CameraMode, CaptureSession};
use crate::storage::{FileGallery, PhotoRecord, PhotoUpdate};
use crate::testdb::{MockCamera, ScriptedClassifier};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Source value that selects the synthetic camera
const MOCK_SOURCE: &str = "mock";

/// How often the live loop drains session events
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Options for the live session loop
#[derive(Debug, Clone, Copy, Default)]
struct RunOptions {
    manual: bool,
    duration: Option<Duration>,
    capture_every: Option<Duration>,
}

/// Run the appropriate command based on CLI arguments
///
/// With no subcommand a live session runs until Ctrl+C.
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    match &args.command {
        Some(Commands::Config { path, reset }) => {
            handle_config_command(*path, *reset)?;
        }
        Some(Commands::GenerateConfig { output }) => {
            generate_config_file(output.clone())?;
        }
        Some(Commands::ShowConfig) => {
            show_config(config)?;
        }
        Some(Commands::Scenes) => {
            list_scenes();
        }
        Some(Commands::Gallery { gallery_command }) => {
            handle_gallery_command(config, gallery_command.as_ref())?;
        }
        Some(Commands::Album { album_command }) => {
            handle_album_command(config, album_command)?;
        }
        Some(Commands::Classify { image }) => {
            classify_image(config, image)?;
        }
        Some(Commands::Capture { scene, front }) => {
            capture_once(config, scene, *front)?;
        }
        Some(Commands::Run {
            manual,
            duration,
            capture_every,
        }) => {
            let options = RunOptions {
                manual: *manual,
                duration: duration.map(Duration::from_secs),
                capture_every: capture_every
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
            };
            run_session(config, options, shutdown_flag)?;
        }
        None => {
            run_session(config, RunOptions::default(), shutdown_flag)?;
        }
    }

    Ok(())
}

// ============================================================================
// Building blocks
// ============================================================================

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

/// Open the configured camera source
fn open_camera(config: &Config) -> Result<Arc<dyn CameraDevice>> {
    match &config.camera.source {
        Some(source) if source.as_os_str() != MOCK_SOURCE => {
            let camera = ReplayCamera::new(source)?;
            info!(
                "Replaying {} frame(s) from {}",
                camera.frame_count(),
                source.display()
            );
            Ok(Arc::new(camera))
        }
        Some(_) => Ok(Arc::new(MockCamera::new())),
        None => {
            warn!("No camera source configured; using the synthetic camera");
            Ok(Arc::new(MockCamera::new()))
        }
    }
}

/// Build the configured classifier.
///
/// Returns `None` when the Gemini API key is missing.
fn build_classifier(config: &Config) -> Result<Option<Arc<dyn SceneClassifier>>> {
    let settings = &config.classifier;
    match settings.provider {
        ClassifierProvider::Offline => Ok(Some(Arc::new(ScriptedClassifier::new()))),
        ClassifierProvider::Gemini => {
            match GeminiClassifier::from_env(&settings.api_key_env, settings.timeout()) {
                Ok(mut classifier) => {
                    if let Some(endpoint) = &settings.endpoint {
                        classifier = classifier.with_endpoint(endpoint.clone());
                    }
                    if let Some(model) = &settings.model {
                        classifier = classifier.with_model(model.clone());
                    }
                    debug!("Using Gemini model {}", classifier.model());
                    Ok(Some(Arc::new(classifier)))
                }
                Err(e @ ClassifyError::MissingApiKey(_)) => {
                    warn!("{}", e);
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn open_gallery(config: &Config) -> Result<FileGallery> {
    let gallery = FileGallery::open(&config.capture.gallery_dir).with_context(|| {
        format!(
            "Failed to open gallery at {}",
            config.capture.gallery_dir.display()
        )
    })?;
    Ok(gallery.with_quota(config.capture.storage_quota_bytes))
}

fn parse_scene(name: &str) -> Result<SceneId> {
    name.parse().map_err(|e: String| anyhow!(e))
}

fn print_event(event: &CameraEvent) {
    match event {
        CameraEvent::PermissionDenied { .. }
        | CameraEvent::CaptureFailed(_)
        | CameraEvent::StreamLost => print_error(&event.describe()),
        CameraEvent::ClassificationFailed(_) => print_warning(&event.describe()),
        CameraEvent::PhotoCaptured(_) => print_success(&event.describe()),
        CameraEvent::FlashStarted | CameraEvent::FlashEnded => {
            debug!("{}", event.describe())
        }
        _ => println!("  → {}", event.describe()),
    }
}

// ============================================================================
// Live session
// ============================================================================

fn run_session(config: &Config, options: RunOptions, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    let runtime = build_runtime()?;
    let camera = open_camera(config)?;
    let gallery = Arc::new(open_gallery(config)?);

    let (classifier, resolver_enabled): (Arc<dyn SceneClassifier>, bool) =
        match build_classifier(config)? {
            Some(classifier) => (classifier, config.resolver.enabled),
            None => {
                print_warning("Scene detection disabled: no API key");
                (Arc::new(ScriptedClassifier::new()), false)
            }
        };

    let session = CaptureSession::builder(camera, classifier)
        .with_sink(gallery)
        .with_facing(config.camera.facing)
        .with_scene(config.session.default_scene)
        .with_grid(config.session.default_grid)
        .with_ideal_size(config.camera.ideal_width, config.camera.ideal_height)
        .with_resolver_enabled(resolver_enabled)
        .with_resolver_config(config.resolver.to_resolver_config())
        .with_capture_action(config.capture.to_capture_action())
        .with_handle(runtime.handle().clone())
        .build()?;

    print_header("Scene Cam");
    if options.manual {
        session.set_mode(CameraMode::Manual);
    }
    session.start()?;
    print_info(&session.snapshot().status_line);

    let photos = runtime.block_on(live_loop(&session, options, &shutdown_flag));

    session.shutdown();
    for event in session.drain_events() {
        print_event(&event);
    }

    let snapshot = session.snapshot();
    println!();
    print_info(&format!("Final scene: {}", snapshot.scene_name));
    print_info(&snapshot.params.summary());
    print_info(&format!("Photos saved: {}", photos));
    Ok(())
}

/// Drain events until shutdown, the time limit, or stream loss.
/// Returns the number of photos saved.
async fn live_loop(session: &CaptureSession, options: RunOptions, shutdown: &AtomicBool) -> usize {
    let started = tokio::time::Instant::now();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut next_capture = options.capture_every.map(|every| started + every);
    let mut photos = 0;

    loop {
        ticker.tick().await;

        let mut lost = false;
        for event in session.drain_events() {
            lost |= matches!(event, CameraEvent::StreamLost);
            print_event(&event);
        }
        if lost {
            warn!("Camera stream lost; stopping");
            break;
        }
        if shutdown.load(Ordering::SeqCst) {
            info!("Shutdown requested");
            break;
        }
        if let Some(limit) = options.duration {
            if started.elapsed() >= limit {
                break;
            }
        }

        if let (Some(at), Some(every)) = (next_capture, options.capture_every) {
            if tokio::time::Instant::now() >= at {
                if session.capture().await.is_ok() {
                    photos += 1;
                }
                next_capture = Some(at + every);
            }
        }
    }

    photos
}

// ============================================================================
// One-shot commands
// ============================================================================

/// Take a single photo with a scene's settings
fn capture_once(config: &Config, scene: &str, front: bool) -> Result<()> {
    let scene = parse_scene(scene)?;
    let runtime = build_runtime()?;
    let camera = open_camera(config)?;
    let gallery = Arc::new(open_gallery(config)?);
    let facing = if front {
        FacingMode::User
    } else {
        config.camera.facing
    };

    let session = CaptureSession::builder(camera, Arc::new(ScriptedClassifier::new()))
        .with_sink(gallery)
        .with_facing(facing)
        .with_ideal_size(config.camera.ideal_width, config.camera.ideal_height)
        .with_resolver_enabled(false)
        .with_capture_action(config.capture.to_capture_action())
        .with_handle(runtime.handle().clone())
        .build()?;

    session.start()?;
    session.select_scene(scene);
    let record = runtime.block_on(session.capture())?;
    session.shutdown();

    print_success(&format!("Saved {}", record.storage_path));
    print_info(&format!("Id: {}", record.id));
    print_info(&format!(
        "{} · {}x{} · {}",
        record.scene.descriptor().name,
        record.width,
        record.height,
        format_bytes(record.file_size_bytes)
    ));
    print_info(&record.params.summary());
    Ok(())
}

/// Classify one image file and show what the scene would change
fn classify_image(config: &Config, image_path: &Path) -> Result<()> {
    let classifier = build_classifier(config)?.ok_or_else(|| {
        anyhow!(
            "Set ${} to classify images",
            config.classifier.api_key_env
        )
    })?;

    let image = image::open(image_path)
        .with_context(|| format!("Failed to open {}", image_path.display()))?
        .to_rgb8();
    let frame = Frame::new(image);
    let sample = encode_for_classification(
        &frame,
        config.resolver.sample_width,
        config.resolver.sample_quality,
    )?;
    debug!("Classification sample: {}", format_bytes(sample.len() as u64));

    let runtime = build_runtime()?;
    let spinner = ClassifySpinner::new(classifier.name());
    let response = runtime.block_on(classifier.classify(&sample));
    let label = response.as_deref().unwrap_or("").trim().to_lowercase();
    let classification = Classification::from_response(response);

    let scene = match classification {
        Classification::Recognized(scene) => {
            spinner.finish(&label);
            scene
        }
        Classification::Inconclusive => {
            spinner.finish(if label.is_empty() { "auto" } else { &label });
            print_info("No specific scene; standard settings apply");
            SceneId::Auto
        }
        Classification::Failed(e) => {
            spinner.abandon();
            return Err(anyhow!("Classification failed: {}", e));
        }
    };

    let descriptor = scene.descriptor();
    print_header(descriptor.name);
    println!("  {}", descriptor.description);
    println!();
    print_info(&descriptor.default_params().summary());
    for guide in descriptor.guides.all() {
        println!("    - {}", guide);
    }
    Ok(())
}

/// Print the scene catalog
fn list_scenes() {
    print_header("Scenes");
    for scene in SCENES.iter() {
        println!("  {:<10} {}", scene.id.as_str(), scene.name);
        println!("             {}", scene.description);
        println!("             {}", scene.default_params().summary());
        if let Some(guide) = scene.primary_guide() {
            println!("             Tip: {}", guide);
        }
        println!();
    }
}

// ============================================================================
// Gallery commands
// ============================================================================

/// Handle gallery subcommands; no subcommand lists the newest photos
fn handle_gallery_command(config: &Config, command: Option<&GalleryCommands>) -> Result<()> {
    let gallery = open_gallery(config)?;
    let default_list = GalleryCommands::List {
        limit: 20,
        scene: None,
        trash: false,
    };

    match command.unwrap_or(&default_list) {
        GalleryCommands::List {
            limit,
            scene,
            trash,
        } => {
            let scene = scene.as_deref().map(parse_scene).transpose()?;
            list_photos(&gallery, *limit, scene, *trash)?;
        }
        GalleryCommands::Trash { ids } => {
            for id in ids {
                let record = gallery.trash(id)?;
                print_success(&format!("Moved {} to the trash", record.id));
            }
        }
        GalleryCommands::Restore { ids } => {
            for id in ids {
                let record = gallery.restore(id)?;
                print_success(&format!("Restored {}", record.id));
            }
        }
        GalleryCommands::Delete { ids } => {
            for id in ids {
                let record = gallery.delete(id)?;
                print_success(&format!("Deleted {}", record.storage_path));
            }
        }
        GalleryCommands::EmptyTrash => {
            let removed = gallery.empty_trash()?;
            print_success(&format!("Emptied trash ({} photos)", removed));
        }
        GalleryCommands::Retag {
            id,
            scene,
            location,
            clear_location,
        } => {
            let update = PhotoUpdate {
                scene: scene.as_deref().map(parse_scene).transpose()?,
                location: if *clear_location {
                    Some(None)
                } else {
                    location.as_deref().map(parse_location).transpose()?.map(Some)
                },
            };
            if update == PhotoUpdate::default() {
                return Err(anyhow!("Nothing to change: pass --scene, --location or --clear-location"));
            }
            let record = gallery.update(id, update)?;
            print_success(&format!(
                "{} is now tagged {}",
                record.id,
                record.scene.descriptor().name
            ));
        }
        GalleryCommands::Usage => {
            let usage = gallery.usage()?;
            print_header("Storage");
            print_info(&format!(
                "{} photos, {}",
                usage.photo_count,
                format_bytes(usage.used_bytes - usage.trashed_bytes)
            ));
            print_info(&format!(
                "{} in the trash, {}",
                usage.trashed_count,
                format_bytes(usage.trashed_bytes)
            ));
            match usage.remaining() {
                Some(remaining) => print_info(&format!(
                    "{} of {} used ({:.0}%), {} free",
                    format_bytes(usage.used_bytes),
                    format_bytes(usage.quota_bytes),
                    usage.fraction_used() * 100.0,
                    format_bytes(remaining)
                )),
                None => print_info(&format!("{} used, no quota", format_bytes(usage.used_bytes))),
            }
        }
    }
    Ok(())
}

/// `LAT,LON` in decimal degrees
fn parse_location(raw: &str) -> Result<GeoLocation> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("Location must look like LAT,LON: {}", raw))?;
    let latitude: f64 = lat.trim().parse().context("Invalid latitude")?;
    let longitude: f64 = lon.trim().parse().context("Invalid longitude")?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!("Location out of range: {}", raw));
    }
    Ok(GeoLocation {
        latitude,
        longitude,
    })
}

fn print_photo_line(gallery: &FileGallery, record: &PhotoRecord) {
    println!(
        "  {}  {}  {:<10} {:>9}  {}",
        record.id,
        record.taken_at.format("%Y-%m-%d %H:%M:%S"),
        record.scene.as_str(),
        format_bytes(record.file_size_bytes),
        gallery.image_path(record).display()
    );
}

fn list_photos(
    gallery: &FileGallery,
    limit: usize,
    scene: Option<SceneId>,
    trash: bool,
) -> Result<()> {
    let records: Vec<PhotoRecord> = if trash {
        gallery.trashed()?
    } else {
        gallery.list()?
    }
    .into_iter()
    .filter(|record| scene.map_or(true, |scene| record.scene == scene))
    .collect();

    let title = if trash { "Trash" } else { "Gallery" };
    if records.is_empty() {
        print_info(&format!("{} is empty ({})", title, gallery.root().display()));
        return Ok(());
    }

    print_header(&format!("{} ({} photos)", title, records.len()));
    for record in records.iter().take(limit) {
        print_photo_line(gallery, record);
    }
    if records.len() > limit {
        print_info(&format!("... and {} more", records.len() - limit));
    }
    Ok(())
}

// ============================================================================
// Album commands
// ============================================================================

fn handle_album_command(config: &Config, command: &AlbumCommands) -> Result<()> {
    let gallery = open_gallery(config)?;

    match command {
        AlbumCommands::List => {
            let albums = gallery.albums()?;
            if albums.is_empty() {
                print_info("No albums yet");
                return Ok(());
            }
            print_header(&format!("Albums ({})", albums.len()));
            for album in &albums {
                println!(
                    "  {:<10} {:<24} {:>4} photos",
                    album.id,
                    album.name,
                    album.photo_count()
                );
                if let Some(description) = &album.description {
                    println!("             {}", description);
                }
            }
        }
        AlbumCommands::Create { name, description } => {
            let album = gallery.create_album(name, description.as_deref())?;
            print_success(&format!("Created album {} ({})", album.name, album.id));
        }
        AlbumCommands::Show { album } => {
            let contents = gallery.album(album)?;
            print_header(&format!(
                "{} ({} photos)",
                contents.album.name,
                contents.photos.len()
            ));
            if let Some(description) = &contents.album.description {
                println!("  {}", description);
            }
            if let Some(cover) = &contents.album.cover_photo_id {
                print_info(&format!("Cover: {}", cover));
            }
            for record in &contents.photos {
                print_photo_line(&gallery, record);
            }
        }
        AlbumCommands::Add { album, photos } => {
            let added = gallery.add_to_album(album, photos)?;
            print_success(&format!("Added {} photo(s) to {}", added, album));
        }
        AlbumCommands::Remove { album, photo } => {
            if gallery.remove_from_album(album, photo)? {
                print_success(&format!("Removed {} from {}", photo, album));
            } else {
                print_warning(&format!("{} is not in {}", photo, album));
            }
        }
        AlbumCommands::Cover { album, photo } => {
            gallery.set_album_cover(album, photo)?;
            print_success(&format!("{} is now the cover of {}", photo, album));
        }
        AlbumCommands::Edit {
            album,
            name,
            description,
        } => {
            if name.is_none() && description.is_none() {
                return Err(anyhow!("Nothing to change: pass --name or --description"));
            }
            let album = gallery.update_album(album, name.as_deref(), description.as_deref())?;
            print_success(&format!("Updated album {} ({})", album.name, album.id));
        }
        AlbumCommands::Delete { album } => {
            let album = gallery.delete_album(album)?;
            print_success(&format!("Deleted album {}", album.name));
        }
        AlbumCommands::Order { albums } => {
            gallery.reorder_albums(albums)?;
            print_success("Album order saved");
        }
    }
    Ok(())
}

// ============================================================================
// Configuration commands
// ============================================================================

pub fn handle_config_command(show_path: bool, reset: bool) -> Result<()> {
    if reset {
        let path = init_config(true)?;
        info!("Created fresh config file at: {}", path.display());
        return Ok(());
    }

    if show_path {
        let path = Config::get_active_config_path();
        println!("{}", path.display());
        if path.exists() {
            info!("Config file exists at: {}", path.display());
        } else {
            info!("Config file would be created at: {}", path.display());
        }
        return Ok(());
    }

    let path = init_config(false)?;
    info!("Config file: {}", path.display());
    info!("Edit this file and run 'scene-cam show-config' to verify your settings.");
    Ok(())
}

/// Generate a configuration file at the specified or default location
pub fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let output_path = match output {
        Some(path) => {
            std::fs::write(&path, Config::generate_default_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
        None => init_config(false)?,
    };

    info!("Configuration file: {}", output_path.display());
    info!("Edit this file to customize camera, detection and gallery settings.");
    Ok(())
}

/// Show the current configuration settings
pub fn show_config(config: &Config) -> Result<()> {
    let config_path = Config::get_active_config_path();
    info!("Configuration file: {}", config_path.display());
    if !config_path.exists() {
        info!("(Using default settings - no config file found)");
    }
    info!("");

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    for line in rendered.lines() {
        info!("  {}", line);
    }

    if config.classifier.provider == ClassifierProvider::Gemini
        && std::env::var(&config.classifier.api_key_env).is_err()
    {
        warn!(
            "${} is not set; scene detection will be disabled",
            config.classifier.api_key_env
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn offline_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.camera.source = Some(PathBuf::from(MOCK_SOURCE));
        config.capture.gallery_dir = dir.path().join("gallery");
        config.classifier.provider = ClassifierProvider::Offline;
        config
    }

    #[test]
    fn test_capture_once_saves_to_gallery() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);

        capture_once(&config, "night", false).unwrap();

        let records = open_gallery(&config).unwrap().list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scene, SceneId::Night);
        assert_eq!(records[0].facing, FacingMode::Environment);
    }

    #[test]
    fn test_capture_once_rejects_unknown_scene() {
        let dir = TempDir::new().unwrap();
        assert!(capture_once(&offline_config(&dir), "underwater", false).is_err());
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_gallery_delete_unknown_id() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);
        let delete = GalleryCommands::Delete {
            ids: ids(&["missing"]),
        };
        assert!(handle_gallery_command(&config, Some(&delete)).is_err());
        handle_gallery_command(&config, None).unwrap();
    }

    #[test]
    fn test_gallery_trash_restore_and_empty() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);
        capture_once(&config, "food", false).unwrap();
        let gallery = open_gallery(&config).unwrap();
        let id = gallery.list().unwrap()[0].id.clone();

        let trash = GalleryCommands::Trash { ids: vec![id.clone()] };
        handle_gallery_command(&config, Some(&trash)).unwrap();
        assert!(gallery.list().unwrap().is_empty());
        let list_trash = GalleryCommands::List {
            limit: 5,
            scene: Some("food".to_string()),
            trash: true,
        };
        handle_gallery_command(&config, Some(&list_trash)).unwrap();

        let restore = GalleryCommands::Restore { ids: vec![id.clone()] };
        handle_gallery_command(&config, Some(&restore)).unwrap();
        assert_eq!(gallery.list().unwrap().len(), 1);

        handle_gallery_command(&config, Some(&trash)).unwrap();
        handle_gallery_command(&config, Some(&GalleryCommands::EmptyTrash)).unwrap();
        assert_eq!(gallery.usage().unwrap().used_bytes, 0);
        handle_gallery_command(&config, Some(&GalleryCommands::Usage)).unwrap();
    }

    #[test]
    fn test_gallery_retag() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);
        capture_once(&config, "auto", false).unwrap();
        let gallery = open_gallery(&config).unwrap();
        let id = gallery.list().unwrap()[0].id.clone();

        let nothing = GalleryCommands::Retag {
            id: id.clone(),
            scene: None,
            location: None,
            clear_location: false,
        };
        assert!(handle_gallery_command(&config, Some(&nothing)).is_err());

        let retag = GalleryCommands::Retag {
            id: id.clone(),
            scene: Some("document".to_string()),
            location: Some("51.5, -0.12".to_string()),
            clear_location: false,
        };
        handle_gallery_command(&config, Some(&retag)).unwrap();
        let record = gallery.get(&id).unwrap();
        assert_eq!(record.scene, SceneId::Document);
        assert_eq!(
            record.location,
            Some(GeoLocation {
                latitude: 51.5,
                longitude: -0.12
            })
        );
    }

    #[test]
    fn test_parse_location_bounds() {
        assert!(parse_location("10,20").is_ok());
        assert!(parse_location("10;20").is_err());
        assert!(parse_location("91,0").is_err());
        assert!(parse_location("0,abc").is_err());
    }

    #[test]
    fn test_capture_respects_quota() {
        let dir = TempDir::new().unwrap();
        let mut config = offline_config(&dir);
        config.capture.storage_quota_bytes = 1;
        assert!(capture_once(&config, "auto", false).is_err());
        assert!(open_gallery(&config).unwrap().list().unwrap().is_empty());
    }

    #[test]
    fn test_album_commands() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);
        capture_once(&config, "portrait", false).unwrap();
        let gallery = open_gallery(&config).unwrap();
        let photo = gallery.list().unwrap()[0].id.clone();

        let create = AlbumCommands::Create {
            name: "Family".to_string(),
            description: None,
        };
        handle_album_command(&config, &create).unwrap();
        let album = gallery.albums().unwrap()[0].id.clone();

        let steps = [
            AlbumCommands::Add {
                album: album.clone(),
                photos: vec![photo.clone()],
            },
            AlbumCommands::Cover {
                album: album.clone(),
                photo: photo.clone(),
            },
            AlbumCommands::Edit {
                album: album.clone(),
                name: Some("Kin".to_string()),
                description: Some("Sundays".to_string()),
            },
            AlbumCommands::Show {
                album: album.clone(),
            },
            AlbumCommands::List,
            AlbumCommands::Order {
                albums: vec![album.clone()],
            },
        ];
        for step in &steps {
            handle_album_command(&config, step).unwrap();
        }
        let contents = gallery.album(&album).unwrap();
        assert_eq!(contents.album.name, "Kin");
        assert_eq!(contents.album.cover_photo_id, Some(photo.clone()));
        assert_eq!(contents.photos.len(), 1);

        let empty_edit = AlbumCommands::Edit {
            album: album.clone(),
            name: None,
            description: None,
        };
        assert!(handle_album_command(&config, &empty_edit).is_err());

        handle_album_command(&config, &AlbumCommands::Delete { album }).unwrap();
        assert!(gallery.albums().unwrap().is_empty());
        assert_eq!(gallery.list().unwrap().len(), 1);
    }

    #[test]
    fn test_session_starts_with_configured_defaults() {
        let dir = TempDir::new().unwrap();
        let mut config = offline_config(&dir);
        config.session.default_scene = SceneId::Night;
        config.resolver.enabled = false;
        let options = RunOptions {
            duration: Some(Duration::from_millis(500)),
            capture_every: Some(Duration::from_millis(100)),
            ..RunOptions::default()
        };

        run_session(&config, options, Arc::new(AtomicBool::new(false))).unwrap();

        let records = open_gallery(&config).unwrap().list().unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|record| record.scene == SceneId::Night));
    }

    #[test]
    fn test_offline_classifier_always_available() {
        let dir = TempDir::new().unwrap();
        let classifier = build_classifier(&offline_config(&dir)).unwrap().unwrap();
        assert_eq!(classifier.name(), "scripted");
    }

    #[test]
    fn test_missing_replay_source_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = offline_config(&dir);
        config.camera.source = Some(dir.path().join("no-frames"));
        assert!(open_camera(&config).is_err());
    }

    #[test]
    fn test_generate_config_to_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene_cam.toml");
        generate_config_file(Some(path.clone())).unwrap();
        assert!(Config::load(&path).is_ok());
    }
}
