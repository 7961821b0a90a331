use anyhow::{Context, Result};
use chrono::NaiveDate;
use menusite_core::{Site, is_valid_index_now_key, load_site};
use menusite_generator::{RenderContext, render_not_found, render_page, robots_txt, sitemap_xml};
use menusite_validator::validate_site;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::validate::print_report;

#[derive(Debug, Default, PartialEq)]
pub struct BuildSummary {
    pub pages: usize,
    pub static_files: usize,
}

/// Build the site as static files
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let site = load_site(&path).context("Failed to load site")?;
    println!("✓ Loaded: {}", site.config.site_name);
    println!("  Routes: {}", site.routes.len());
    println!();

    let report = validate_site(&site);
    print_report(&report);
    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    let today = chrono::Utc::now().date_naive();
    let summary = build_static_site(&site, &output, today)?;

    println!();
    println!("✅ Build complete!");
    println!("   {} pages, {} static files", summary.pages, summary.static_files);
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}

/// Write every page plus crawler files and static assets under `output`
pub fn build_static_site(site: &Site, output: &Path, today: NaiveDate) -> Result<BuildSummary> {
    let ctx = RenderContext::from_site(site);
    let mut summary = BuildSummary::default();

    fs::create_dir_all(output).context("Failed to create output directory")?;

    println!("📄 Rendering pages...");
    for (route, doc) in site.routes.iter() {
        let target = page_file(output, route);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, render_page(doc, &ctx, route))
            .with_context(|| format!("Failed to write {}", target.display()))?;
        summary.pages += 1;
    }
    fs::write(output.join("404.html"), render_not_found(&ctx))
        .context("Failed to write 404.html")?;
    println!("   ✓ Rendered {} pages", summary.pages);

    println!("🤖 Writing crawler files...");
    write_file(output, "robots.txt", &robots_txt(&site.config))?;
    write_file(
        output,
        "sitemap.xml",
        &sitemap_xml(&site.config, &site.routes, today),
    )?;
    if let Some(ads) = site.config.ads_txt.as_deref() {
        write_file(output, "ads.txt", ads)?;
    }
    match site.config.metadata.index_now_key.as_deref() {
        Some(key) if is_valid_index_now_key(key) => {
            write_file(output, &format!("{}.txt", key), key)?;
        }
        Some(key) if !key.is_empty() => {
            log::warn!("not writing IndexNow key file: invalid key '{}'", key);
        }
        _ => {}
    }
    println!("   ✓ robots.txt, sitemap.xml");

    println!("🖼  Copying static files...");
    summary.static_files = copy_dir(&site.static_dir(), &output.join("static"))?;
    println!("   ✓ Copied {} static files", summary.static_files);

    Ok(summary)
}

/// `/` → `index.html`, `/desserts` → `desserts/index.html`
fn page_file(output: &Path, route: &str) -> PathBuf {
    let relative = route.trim_matches('/');
    if relative.is_empty() {
        output.join("index.html")
    } else {
        output.join(relative).join("index.html")
    }
}

fn write_file(output: &Path, name: &str, contents: &str) -> Result<()> {
    fs::write(output.join(name), contents).with_context(|| format!("Failed to write {}", name))
}

fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    if !src.exists() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.context("Failed to read static directory")?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .context("Static file outside static directory")?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}
