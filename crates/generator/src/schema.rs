//! JSON-LD structured data for a page.
//!
//! The graph always carries WebSite, Organization, WebPage and Person nodes.
//! FAQPage, Restaurant, ImageGallery and Menu nodes are added when the page
//! has blocks of the matching type.

use crate::RenderContext;
use crate::format::{absolute_url, format_calories, price_amount};
use menusite_core::{
    ContentBlock, ContentDocument, DataTableBlock, ImageGalleryBlock, LocationBlock,
    resolve_categories, slugify,
};
use serde_json::{Value, json};

/// Build the `@graph` document for a page at `path`
pub fn structured_data(doc: &ContentDocument, ctx: &RenderContext, path: &str) -> Value {
    let config = ctx.config;
    let base = config.base();
    let page_url = config.canonical_url(path);
    let website_id = format!("{}/#website", base);
    let organization_id = format!("{}/#organization", base);
    let author_name = if doc.metadata.author.name.trim().is_empty() {
        config.site_name.as_str()
    } else {
        doc.metadata.author.name.as_str()
    };
    let person_id = format!("{}/#author-{}", base, slugify(author_name));

    let mut organization = json!({
        "@type": "Organization",
        "@id": organization_id,
        "name": config.site_name,
        "url": format!("{}/", base),
    });
    if let Some(logo) = config.logo_url.as_deref() {
        organization["logo"] = json!(absolute_url(base, logo));
    }

    let mut webpage = json!({
        "@type": "WebPage",
        "@id": format!("{}#webpage", page_url),
        "url": page_url,
        "name": page_name(doc, ctx),
        "description": doc.metadata.description,
        "isPartOf": {"@id": website_id},
        "publisher": {"@id": organization_id},
        "author": {"@id": person_id},
        "inLanguage": "en-US",
    });
    if let Some(date) = doc.metadata.published_date() {
        webpage["datePublished"] = json!(date.format("%Y-%m-%d").to_string());
    }
    if let Some(keyword) = doc.metadata.core_keyword.as_deref() {
        webpage["about"] = json!({"@type": "Thing", "name": keyword});
    }

    let mut person = json!({
        "@type": "Person",
        "@id": person_id,
        "name": author_name,
    });
    if !doc.metadata.author.email.trim().is_empty() {
        person["email"] = json!(doc.metadata.author.email);
    }

    let mut graph = vec![
        json!({
            "@type": "WebSite",
            "@id": website_id,
            "url": format!("{}/", base),
            "name": config.site_name,
            "publisher": {"@id": organization_id},
        }),
        organization,
        webpage,
        person,
    ];

    if let Some(faq) = faq_page(doc, &page_url) {
        graph.push(faq);
    }

    for block in &doc.content_blocks {
        match block {
            ContentBlock::LocationBlock(location) => {
                graph.push(restaurant(location, ctx, &page_url));
            }
            ContentBlock::ImageGallery(gallery) if !gallery.images.is_empty() => {
                graph.push(image_gallery(gallery, ctx, &page_url));
            }
            ContentBlock::DataTable(table) => {
                if let Some(menu) = menu(table, doc, ctx, &page_url) {
                    graph.push(menu);
                }
            }
            _ => {}
        }
    }

    json!({
        "@context": "https://schema.org",
        "@graph": graph,
    })
}

/// Serialize structured data into a script tag, safe to embed in HTML
pub fn structured_data_script(data: &Value) -> String {
    format!(
        r#"<script type="application/ld+json">{}</script>"#,
        data.to_string().replace("</", r"<\/")
    )
}

fn page_name(doc: &ContentDocument, ctx: &RenderContext) -> String {
    let title = doc.metadata.page_title();
    if title.trim().is_empty() {
        ctx.config.site_name.clone()
    } else {
        title.to_string()
    }
}

/// All FAQ blocks of a page merge into one FAQPage node
fn faq_page(doc: &ContentDocument, page_url: &str) -> Option<Value> {
    let questions: Vec<Value> = doc
        .content_blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Faq(faq) => Some(&faq.items),
            _ => None,
        })
        .flatten()
        .map(|item| {
            json!({
                "@type": "Question",
                "name": item.question,
                "acceptedAnswer": {"@type": "Answer", "text": item.answer},
            })
        })
        .collect();

    if questions.is_empty() {
        return None;
    }

    Some(json!({
        "@type": "FAQPage",
        "@id": format!("{}#faq", page_url),
        "mainEntity": questions,
    }))
}

fn restaurant(location: &LocationBlock, ctx: &RenderContext, page_url: &str) -> Value {
    let name = if location.name.trim().is_empty() {
        ctx.config.site_name.as_str()
    } else {
        location.name.as_str()
    };

    let mut node = json!({
        "@type": "Restaurant",
        "@id": format!("{}#restaurant-{}", page_url, slugify(name)),
        "name": name,
        "url": page_url,
        "hasMenu": page_url,
    });
    if !location.address.trim().is_empty() {
        node["address"] = json!({"@type": "PostalAddress", "streetAddress": location.address});
    }
    if let Some(phone) = location.phone.as_deref() {
        node["telephone"] = json!(phone);
    }
    if let Some(range) = location.price_range.as_deref() {
        node["priceRange"] = json!(range);
    }
    if !location.hours.is_empty() {
        let hours: Vec<String> = location
            .hours
            .iter()
            .map(|h| format!("{} {}", h.day, h.hours))
            .collect();
        node["openingHours"] = json!(hours);
    }
    if let Some(logo) = ctx.config.logo_url.as_deref() {
        node["image"] = json!(absolute_url(ctx.config.base(), logo));
    }
    node
}

fn image_gallery(gallery: &ImageGalleryBlock, ctx: &RenderContext, page_url: &str) -> Value {
    let images: Vec<Value> = gallery
        .images
        .iter()
        .map(|image| {
            let mut node = json!({
                "@type": "ImageObject",
                "contentUrl": absolute_url(ctx.config.base(), &image.url),
            });
            if let Some(caption) = image.caption.as_deref() {
                node["caption"] = json!(caption);
            }
            node
        })
        .collect();

    let name = gallery.title.as_deref().unwrap_or("Gallery");
    json!({
        "@type": "ImageGallery",
        "@id": format!("{}#gallery-{}", page_url, slugify(name)),
        "name": name,
        "image": images,
    })
}

fn menu(
    table: &DataTableBlock,
    doc: &ContentDocument,
    ctx: &RenderContext,
    page_url: &str,
) -> Option<Value> {
    let categories = resolve_categories(table, ctx.data).ok()?;
    if categories.is_empty() {
        return None;
    }

    let sections: Vec<Value> = categories
        .iter()
        .map(|(name, category)| {
            let items: Vec<Value> = category
                .items
                .iter()
                .map(|item| {
                    let mut node = json!({"@type": "MenuItem", "name": item.name});
                    if let Some(description) = item.description.as_deref() {
                        node["description"] = json!(description);
                    }
                    if let Some(image) = item.image_url.as_deref() {
                        node["image"] = json!(absolute_url(ctx.config.base(), image));
                    }
                    if let Some(amount) = price_amount(item.price.as_ref()) {
                        node["offers"] = json!({
                            "@type": "Offer",
                            "price": amount,
                            "priceCurrency": "USD",
                        });
                    }
                    let calories = format_calories(item.calories.as_ref());
                    if !calories.is_empty() {
                        node["nutrition"] = json!({
                            "@type": "NutritionInformation",
                            "calories": calories,
                        });
                    }
                    node
                })
                .collect();

            let mut section = json!({
                "@type": "MenuSection",
                "name": name,
                "hasMenuItem": items,
            });
            if let Some(description) = category.description.as_deref() {
                section["description"] = json!(description);
            }
            section
        })
        .collect();

    let name = table
        .title
        .clone()
        .unwrap_or_else(|| page_name(doc, ctx));
    Some(json!({
        "@type": "Menu",
        "@id": format!("{}#menu-{}", page_url, slugify(&name)),
        "name": name,
        "hasMenuSection": sections,
    }))
}
