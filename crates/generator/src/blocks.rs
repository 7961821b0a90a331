//! One renderer per content block variant.
//!
//! Every renderer is a pure function of the block payload and the render
//! context and never fails: missing optional fields fall back to empty
//! output, and a broken data reference renders a visible error fragment.

use crate::RenderContext;
use crate::assets::PLACEHOLDER_IMAGE;
use crate::escape::html_escape;
use crate::format::{format_calories, format_price, truncate_words};
use menusite_core::{
    Category, CategoryJumpLinksBlock, ContentBlock, ContentDocument, DataTableBlock, FaqBlock,
    GoogleMapBlock, HeroBlock, ImageGalleryBlock, LocationBlock, MenuItem, RichTextBlock,
    TableOfContentsBlock, resolve_categories, slugify,
};
use pulldown_cmark::{Options, Parser, html};

/// Item descriptions longer than this are truncated behind a read-more click
const DESCRIPTION_PREVIEW_CHARS: usize = 140;

const DEFAULT_MAP_HEIGHT: u32 = 450;

/// Render every block of a document, in order
pub fn render_blocks(doc: &ContentDocument, ctx: &RenderContext) -> String {
    doc.content_blocks
        .iter()
        .map(|block| render_block(block, doc, ctx))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dispatch a single block to its renderer
pub fn render_block(block: &ContentBlock, doc: &ContentDocument, ctx: &RenderContext) -> String {
    match block {
        ContentBlock::Hero(b) => render_hero(b, &doc.metadata.h1),
        ContentBlock::RichText(b) => render_rich_text(b),
        ContentBlock::TableOfContents(b) => render_table_of_contents(b, &doc.content_blocks),
        ContentBlock::CategoryJumpLinks(b) => {
            render_category_jump_links(b, &doc.content_blocks, ctx)
        }
        ContentBlock::ImageGallery(b) => render_image_gallery(b),
        ContentBlock::DataTable(b) => render_data_table(b, ctx),
        ContentBlock::Faq(b) => render_faq(b),
        ContentBlock::GoogleMap(b) => render_google_map(b, ctx),
        ContentBlock::LocationBlock(b) => render_location(b, ctx),
        ContentBlock::Unsupported { kind, .. } => {
            format!("<!-- unsupported block: {} -->", comment_safe(kind))
        }
    }
}

/// Anchor id for a titled section
pub fn section_id(title: &str) -> String {
    slugify(title)
}

fn id_attr(title: Option<&str>) -> String {
    match title.map(section_id).filter(|id| !id.is_empty()) {
        Some(id) => format!(r#" id="{}""#, html_escape(&id)),
        None => String::new(),
    }
}

fn heading(title: Option<&str>) -> String {
    match title.filter(|t| !t.trim().is_empty()) {
        Some(t) => format!("<h2>{}</h2>", html_escape(t)),
        None => String::new(),
    }
}

/// Text that can sit inside an HTML comment
fn comment_safe(s: &str) -> String {
    s.replace("--", "").replace('>', "")
}

pub fn render_hero(block: &HeroBlock, page_h1: &str) -> String {
    let title = if block.title.trim().is_empty() {
        page_h1
    } else {
        block.title.as_str()
    };

    let style = block
        .image_url
        .as_deref()
        .map(|url| format!(r#" style="background-image: url('{}')""#, html_escape(url)))
        .unwrap_or_default();

    let subtitle = block
        .subtitle
        .as_deref()
        .map(|s| format!(r#"<p class="hero-subtitle">{}</p>"#, html_escape(s)))
        .unwrap_or_default();

    let cta = match (&block.cta_text, &block.cta_url) {
        (Some(label), Some(url)) => format!(
            r#"<a class="hero-cta" href="{}">{}</a>"#,
            html_escape(url),
            html_escape(label)
        ),
        _ => String::new(),
    };

    format!(
        r#"<section class="hero"{}>
    <div class="hero-inner">
        <h1>{}</h1>
        {}
        {}
    </div>
</section>"#,
        style,
        html_escape(title),
        subtitle,
        cta
    )
}

/// `content` is trusted, pre-sanitized HTML and is emitted as-is
pub fn render_rich_text(block: &RichTextBlock) -> String {
    let body = match (&block.content, &block.markdown) {
        (Some(content), _) => content.clone(),
        (None, Some(markdown)) => markdown_to_html(markdown),
        (None, None) => String::new(),
    };

    format!(
        r#"<section class="rich-text"{}>
    {}
    <div class="rich-text-content">{}</div>
</section>"#,
        id_attr(block.title.as_deref()),
        heading(block.title.as_deref()),
        body
    )
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

pub fn render_table_of_contents(block: &TableOfContentsBlock, siblings: &[ContentBlock]) -> String {
    let entries: String = siblings
        .iter()
        .filter_map(ContentBlock::toc_title)
        .map(|title| {
            format!(
                r##"<li><a href="#{}">{}</a></li>"##,
                html_escape(&section_id(title)),
                html_escape(title)
            )
        })
        .collect();

    if entries.is_empty() {
        return String::new();
    }

    let title = block.title.as_deref().unwrap_or("Table of Contents");
    format!(
        r#"<nav class="toc" aria-label="Table of contents">
    <h2>{}</h2>
    <ol>{}</ol>
</nav>"#,
        html_escape(title),
        entries
    )
}

pub fn render_category_jump_links(
    block: &CategoryJumpLinksBlock,
    siblings: &[ContentBlock],
    ctx: &RenderContext,
) -> String {
    let names: Vec<String> = match &block.categories {
        Some(explicit) => explicit.clone(),
        None => siblings
            .iter()
            .filter_map(|b| match b {
                ContentBlock::DataTable(table) => resolve_categories(table, ctx.data).ok(),
                _ => None,
            })
            .flatten()
            .map(|(name, _)| name.to_string())
            .collect(),
    };

    if names.is_empty() {
        return String::new();
    }

    let links: String = names
        .iter()
        .map(|name| {
            format!(
                r##"<li><a class="jump-pill" href="#{}">{}</a></li>"##,
                html_escape(&section_id(name)),
                html_escape(name)
            )
        })
        .collect();

    format!(
        r#"<nav class="category-jump-links" aria-label="Menu categories">
    {}
    <ul>{}</ul>
</nav>"#,
        heading(block.title.as_deref()),
        links
    )
}

pub fn render_image_gallery(block: &ImageGalleryBlock) -> String {
    let figures: String = block
        .images
        .iter()
        .map(|image| {
            let alt = image
                .alt
                .as_deref()
                .or(image.caption.as_deref())
                .unwrap_or("");
            let caption = image
                .caption
                .as_deref()
                .map(|c| format!("<figcaption>{}</figcaption>", html_escape(c)))
                .unwrap_or_default();
            format!(
                r#"<figure class="gallery-item">
            <img src="{}" alt="{}" loading="lazy" decoding="async" data-lightbox data-caption="{}">
            {}
        </figure>"#,
                html_escape(&image.url),
                html_escape(alt),
                html_escape(image.caption.as_deref().unwrap_or("")),
                caption
            )
        })
        .collect();

    format!(
        r#"<section class="image-gallery"{}>
    {}
    <div class="gallery-grid">
        {}
    </div>
</section>"#,
        id_attr(block.title.as_deref()),
        heading(block.title.as_deref()),
        figures
    )
}

pub fn render_data_table(block: &DataTableBlock, ctx: &RenderContext) -> String {
    let categories = match resolve_categories(block, ctx.data) {
        Ok(categories) => categories,
        Err(e) => {
            log::warn!("dataTable '{}': {}", block.title.as_deref().unwrap_or(""), e);
            return format!(
                r#"<div class="block-error" role="alert">Menu data unavailable: {}</div>"#,
                html_escape(&e.to_string())
            );
        }
    };

    let sections: String = categories
        .iter()
        .map(|(name, category)| render_category(name, category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<section class="data-table"{}>
    {}
    {}
</section>"#,
        id_attr(block.title.as_deref()),
        heading(block.title.as_deref()),
        sections
    )
}

fn render_category(name: &str, category: &Category) -> String {
    let description = category
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!(r#"<p class="category-description">{}</p>"#, html_escape(d)))
        .unwrap_or_default();

    let recommended = category
        .recommended
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| {
            format!(
                r#"<p class="category-recommended"><strong>Recommended:</strong> {}</p>"#,
                html_escape(r)
            )
        })
        .unwrap_or_default();

    let rows: String = category.items.iter().map(render_menu_item).collect();

    format!(
        r#"<div class="menu-category" id="{}">
        <h3>{}</h3>
        {}
        {}
        <div class="table-wrap">
            <table class="menu-table">
                <thead><tr><th scope="col">Item</th><th scope="col">Price</th></tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>
    </div>"#,
        html_escape(&section_id(name)),
        html_escape(name),
        description,
        recommended,
        rows
    )
}

fn render_menu_item(item: &MenuItem) -> String {
    let image = item
        .image_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(PLACEHOLDER_IMAGE);

    let calories = format_calories(item.calories.as_ref());
    let badge = if calories.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="calorie-badge">{}</span>"#, html_escape(&calories))
    };

    let description = item
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            let preview = truncate_words(d, DESCRIPTION_PREVIEW_CHARS);
            if preview == d {
                format!(r#"<p class="item-description">{}</p>"#, html_escape(d))
            } else {
                format!(
                    r#"<p class="item-description" data-full-text="{}">{}</p>"#,
                    html_escape(d),
                    html_escape(&preview)
                )
            }
        })
        .unwrap_or_default();

    let review = item
        .review
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| format!(r#"<p class="item-review">{}</p>"#, html_escape(r)))
        .unwrap_or_default();

    format!(
        r#"
                    <tr>
                        <td class="item-cell">
                            <img src="{}" alt="{}" loading="lazy" decoding="async" width="64" height="64" data-lightbox>
                            <div class="item-info">
                                <span class="item-name">{}</span>{}
                                {}
                                {}
                            </div>
                        </td>
                        <td class="item-price">{}</td>
                    </tr>"#,
        html_escape(image),
        html_escape(&item.name),
        html_escape(&item.name),
        badge,
        description,
        review,
        html_escape(&format_price(item.price.as_ref()))
    )
}

pub fn render_faq(block: &FaqBlock) -> String {
    let items: String = block
        .items
        .iter()
        .map(|item| {
            format!(
                r#"<details class="faq-item">
        <summary>{}</summary>
        <div class="faq-answer"><p>{}</p></div>
    </details>"#,
                html_escape(&item.question),
                html_escape(&item.answer)
            )
        })
        .collect();

    format!(
        r#"<section class="faq"{}>
    {}
    {}
</section>"#,
        id_attr(block.title.as_deref()),
        heading(block.title.as_deref()),
        items
    )
}

/// Embed URL for a map block: explicit `embedUrl`, else the configured maps URL with a query
fn map_embed_url(block: &GoogleMapBlock, ctx: &RenderContext) -> Option<String> {
    if let Some(url) = block.embed_url.as_deref().filter(|u| !u.trim().is_empty()) {
        return Some(url.to_string());
    }
    let base = ctx.config.maps.url.as_deref()?;
    let query = block
        .query
        .as_deref()
        .unwrap_or(&ctx.config.site_name);
    Some(format!(
        "{}?q={}&output=embed",
        base,
        urlencoding::encode(query)
    ))
}

pub fn render_google_map(block: &GoogleMapBlock, ctx: &RenderContext) -> String {
    let Some(src) = map_embed_url(block, ctx) else {
        return "<!-- googleMap: no map source configured -->".to_string();
    };

    let title = block.title.as_deref().unwrap_or("Map");
    format!(
        r#"<section class="map-embed"{}>
    {}
    <iframe src="{}" height="{}" loading="lazy" allowfullscreen referrerpolicy="no-referrer-when-downgrade" title="{}"></iframe>
</section>"#,
        id_attr(block.title.as_deref()),
        heading(block.title.as_deref()),
        html_escape(&src),
        block.height.unwrap_or(DEFAULT_MAP_HEIGHT),
        html_escape(title)
    )
}

pub fn render_location(block: &LocationBlock, ctx: &RenderContext) -> String {
    let phone = block
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            let dial: String = p
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            format!(
                r#"<p class="location-phone"><a href="tel:{}">{}</a></p>"#,
                html_escape(&dial),
                html_escape(p)
            )
        })
        .unwrap_or_default();

    let hours = if block.hours.is_empty() {
        String::new()
    } else {
        let rows: String = block
            .hours
            .iter()
            .map(|h| {
                format!(
                    r#"<tr><th scope="row">{}</th><td>{}</td></tr>"#,
                    html_escape(&h.day),
                    html_escape(&h.hours)
                )
            })
            .collect();
        format!(r#"<table class="hours-table"><tbody>{}</tbody></table>"#, rows)
    };

    let directions = match (ctx.config.maps.url.as_deref(), block.map_query.as_deref()) {
        (Some(base), Some(query)) => format!(
            r#"<a class="directions-link" href="{}?q={}" target="_blank" rel="noopener">Get directions</a>"#,
            html_escape(base),
            urlencoding::encode(query)
        ),
        _ => String::new(),
    };

    format!(
        r#"<section class="location-block"{}>
    {}
    <div class="location-card">
        <h3>{}</h3>
        <address>{}</address>
        {}
        {}
        {}
    </div>
</section>"#,
        id_attr(block.title.as_deref()),
        heading(block.title.as_deref()),
        html_escape(&block.name),
        html_escape(&block.address),
        phone,
        hours,
        directions
    )
}
