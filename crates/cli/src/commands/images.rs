use anyhow::{Context, Result};
use image::DynamicImage;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use menusite_core::config::load_manifest;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// URL prefix for processed images, relative to the static directory root
pub const UPLOAD_URL_PREFIX: &str = "/static/image/upload/";

/// Largest WebP file written before the image is scaled down
pub const MAX_IMAGE_BYTES: usize = 300 * 1024;

/// Images are never scaled below this edge length, even if still over the size limit
const MIN_EDGE_PX: u32 = 64;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Default, PartialEq)]
pub struct ImageSummary {
    pub processed: usize,
    pub failed: usize,
    pub total: usize,
}

/// One menu item whose image should be fetched and converted
#[derive(Debug, Clone)]
struct ImageJob {
    category: String,
    index: usize,
    source_url: String,
}

#[derive(Debug)]
struct ProcessedImage {
    url: String,
    width: u32,
    height: u32,
}

/// Download remote menu item images into the static directory as WebP
pub async fn run(path: PathBuf, data_file: String, concurrency: usize) -> Result<()> {
    println!("🖼  Processing menu images...");
    println!("   Project: {}", path.display());
    println!("   Data:    {}", data_file);
    println!();

    let summary = process_images(&path, &data_file, concurrency).await?;

    println!();
    println!("✅ Images processed");
    println!("   Updated: {}", summary.processed);
    println!("   Failed:  {}", summary.failed);
    println!("   Total:   {}", summary.total);
    Ok(())
}

pub async fn process_images(
    project: &Path,
    data_file: &str,
    concurrency: usize,
) -> Result<ImageSummary> {
    let manifest = load_manifest(project).context("Failed to read menusite.toml")?;
    let data_path = project.join(&manifest.data).join(data_file);
    let upload_dir = project.join(&manifest.static_dir).join("image").join("upload");
    fs::create_dir_all(&upload_dir)
        .with_context(|| format!("Failed to create {}", upload_dir.display()))?;

    let text = fs::read_to_string(&data_path)
        .with_context(|| format!("Failed to read {}", data_path.display()))?;
    let mut data: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", data_path.display()))?;

    let jobs = collect_jobs(&data);
    let mut summary = ImageSummary {
        total: jobs.len(),
        ..Default::default()
    };
    if jobs.is_empty() {
        println!("   No remote item images found");
        return Ok(summary);
    }
    println!("   {} images, {} at a time", jobs.len(), concurrency.max(1));

    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let upload_dir = Arc::new(upload_dir);

    let mut tasks = JoinSet::new();
    for job in jobs {
        let client = client.clone();
        let permits = permits.clone();
        let upload_dir = upload_dir.clone();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = process_one(&client, &upload_dir, &job.source_url).await;
            (job, result)
        });
    }

    let mut processed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (job, result) = joined.context("Image task panicked")?;
        match result {
            Ok(image) => {
                println!("   ✓ {} ({}x{})", image.url, image.width, image.height);
                processed.push((job, image));
            }
            Err(e) => {
                log::warn!("{}: {:#}", job.source_url, e);
                println!("   ✗ {}: {:#}", job.source_url, e);
                summary.failed += 1;
            }
        }
    }

    if processed.is_empty() {
        println!("   Nothing updated; {} left unchanged", data_path.display());
        return Ok(summary);
    }

    for (job, image) in &processed {
        if let Some(item) = data
            .get_mut(&job.category)
            .and_then(|c| c.get_mut("items"))
            .and_then(|items| items.get_mut(job.index))
            .and_then(Value::as_object_mut)
        {
            rewrite_item(item, image);
        }
    }
    summary.processed = processed.len();

    fs::write(&data_path, serde_json::to_string_pretty(&data)?)
        .with_context(|| format!("Failed to write {}", data_path.display()))?;
    Ok(summary)
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Items with a remote image. A previous run's `raw_image_url` is the source when present.
fn collect_jobs(data: &Value) -> Vec<ImageJob> {
    let Some(categories) = data.as_object() else {
        return Vec::new();
    };

    let mut jobs = Vec::new();
    for (category, content) in categories {
        let Some(items) = content.get("items").and_then(Value::as_array) else {
            continue;
        };
        for (index, item) in items.iter().enumerate() {
            let source = item
                .get("raw_image_url")
                .or_else(|| item.get("image_url"))
                .and_then(Value::as_str);
            if let Some(source) = source.filter(|s| is_remote(s)) {
                jobs.push(ImageJob {
                    category: category.clone(),
                    index,
                    source_url: source.to_string(),
                });
            }
        }
    }
    jobs
}

/// Percent-decoded last path segment of an image URL
fn local_file_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let decoded = urlencoding::decode(parsed.path()).ok()?;
    let name = decoded.rsplit('/').next()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }
    Some(name.to_string())
}

fn webp_file_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    format!("{}.webp", stem)
}

async fn process_one(
    client: &reqwest::Client,
    upload_dir: &Path,
    source_url: &str,
) -> Result<ProcessedImage> {
    let file_name = local_file_name(source_url).context("No file name in image URL")?;
    let original = upload_dir.join(&file_name);

    if !original.exists() {
        log::info!("downloading {}", source_url);
        let bytes = client
            .get(source_url)
            .send()
            .await
            .context("Download failed")?
            .error_for_status()
            .context("Download failed")?
            .bytes()
            .await
            .context("Download failed")?;
        tokio::fs::write(&original, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", original.display()))?;
    }

    let webp_name = webp_file_name(&file_name);
    let target = upload_dir.join(&webp_name);
    let (width, height) = tokio::task::spawn_blocking(move || convert_to_webp(&original, &target))
        .await
        .context("Image conversion task panicked")??;

    Ok(ProcessedImage {
        url: format!("{}{}", UPLOAD_URL_PREFIX, webp_name),
        width,
        height,
    })
}

fn convert_to_webp(source: &Path, target: &Path) -> Result<(u32, u32)> {
    let img = image::open(source).with_context(|| format!("Cannot decode {}", source.display()))?;
    let (bytes, width, height) = encode_webp_within(img, MAX_IMAGE_BYTES)?;
    fs::write(target, bytes).with_context(|| format!("Failed to write {}", target.display()))?;
    Ok((width, height))
}

/// Encode as WebP, scaling down by a fifth at a time until the file fits in `max_bytes`
fn encode_webp_within(img: DynamicImage, max_bytes: usize) -> Result<(Vec<u8>, u32, u32)> {
    let mut img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    loop {
        let mut buf = Vec::new();
        img.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
            .context("WebP encoding failed")?;

        let (width, height) = (img.width(), img.height());
        if buf.len() <= max_bytes || width.min(height) <= MIN_EDGE_PX {
            if buf.len() > max_bytes {
                log::warn!(
                    "image still {} KB at {}x{}",
                    buf.len() / 1024,
                    width,
                    height
                );
            }
            return Ok((buf, width, height));
        }

        img = img.resize_exact(
            (width * 4 / 5).max(1),
            (height * 4 / 5).max(1),
            FilterType::Lanczos3,
        );
    }
}

/// Point the item at the processed file, keeping the original URL in `raw_image_url`
fn rewrite_item(item: &mut Map<String, Value>, image: &ProcessedImage) {
    if !item.contains_key("raw_image_url")
        && let Some(original) = item.remove("image_url")
    {
        item.insert("raw_image_url".to_string(), original);
    }
    item.insert("width".to_string(), image.width.into());
    item.insert("height".to_string(), image.height.into());
    item.insert("image_url".to_string(), Value::from(image.url.clone()));
}
