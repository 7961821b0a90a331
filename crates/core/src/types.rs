use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Site-wide configuration, loaded once from `site.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub site_name: String,
    #[serde(rename = "baseURL", alias = "baseUrl")]
    pub base_url: String,
    #[serde(default)]
    pub colors: Colors,
    #[serde(default)]
    pub navigation: Navigation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_analytics_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_adsense_id: Option<String>,
    /// Body served at `/ads.txt`; the route 404s when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads_txt: Option<String>,
    #[serde(default)]
    pub maps: MapsConfig,
    #[serde(default)]
    pub metadata: SiteMetadata,
}

impl SiteConfig {
    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Absolute URL for a normalized route path
    pub fn canonical_url(&self, path: &str) -> String {
        if path == "/" {
            format!("{}/", self.base())
        } else {
            format!("{}{}", self.base(), path)
        }
    }

    /// Host component of the base URL (used for IndexNow payloads)
    pub fn host(&self) -> &str {
        let without_scheme = self
            .base()
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(self.base());
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }
}

/// Theme colors injected into the inline stylesheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub text: String,
    pub background: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            primary: "#b91c1c".to_string(),
            secondary: "#1f2937".to_string(),
            accent: "#f59e0b".to_string(),
            text: "#1f2937".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(default)]
    pub header: Vec<NavItem>,
    #[serde(default)]
    pub footer: Vec<FooterEntry>,
}

/// Header navigation entry. Only one level of `children` is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub text: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterKind {
    Copyright,
    Disclaimer,
    #[default]
    Link,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FooterEntry {
    #[serde(default)]
    pub kind: FooterKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Secrets and verification keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_now_key: Option<String>,
}

/// IndexNow keys are 8 to 128 characters of `a-z`, `A-Z`, `0-9` and `-`
pub fn is_valid_index_now_key(key: &str) -> bool {
    (8..=128).contains(&key.len()) && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// One page of content; identity is the route path it was loaded for
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub metadata: PageMetadata,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

impl ContentDocument {
    pub fn has_hero(&self) -> bool {
        self.content_blocks
            .iter()
            .any(|b| matches!(b, ContentBlock::Hero(_)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default)]
    pub h1: String,
    /// Explicit `<title>`; falls back to `h1`
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub core_keyword: Option<String>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub date_published: Option<String>,
}

impl PageMetadata {
    pub fn page_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.h1)
    }

    /// Date portion of `datePublished`, accepting `YYYY-MM-DD` or a full RFC 3339 timestamp
    pub fn published_date(&self) -> Option<NaiveDate> {
        let raw = self.date_published.as_deref()?.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A section of a page.
///
/// Blocks arrive from JSON as `{"type": "...", "data": {...}}`. Tags that are
/// not recognized, or whose payload does not match the expected shape, become
/// [`ContentBlock::Unsupported`] so one bad entry never fails the page.
#[derive(Debug, Clone)]
pub enum ContentBlock {
    Hero(HeroBlock),
    RichText(RichTextBlock),
    TableOfContents(TableOfContentsBlock),
    CategoryJumpLinks(CategoryJumpLinksBlock),
    ImageGallery(ImageGalleryBlock),
    DataTable(DataTableBlock),
    Faq(FaqBlock),
    GoogleMap(GoogleMapBlock),
    LocationBlock(LocationBlock),
    Unsupported { kind: String, reason: String },
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawBlock::deserialize(deserializer)?;
        Ok(ContentBlock::from_parts(raw.kind, raw.data))
    }
}

impl ContentBlock {
    /// Build a block from its tag and payload, degrading to `Unsupported` on mismatch
    pub fn from_parts(kind: String, data: Value) -> Self {
        let data = if data.is_null() {
            Value::Object(Default::default())
        } else {
            data
        };

        let parsed = match kind.as_str() {
            "hero" => serde_json::from_value(data).map(ContentBlock::Hero),
            "richText" => serde_json::from_value(data).map(ContentBlock::RichText),
            "tableOfContents" => serde_json::from_value(data).map(ContentBlock::TableOfContents),
            "categoryJumpLinks" => {
                serde_json::from_value(data).map(ContentBlock::CategoryJumpLinks)
            }
            "imageGallery" => serde_json::from_value(data).map(ContentBlock::ImageGallery),
            "dataTable" => serde_json::from_value(data).map(ContentBlock::DataTable),
            "faq" => serde_json::from_value(data).map(ContentBlock::Faq),
            "googleMap" => serde_json::from_value(data).map(ContentBlock::GoogleMap),
            "locationBlock" => serde_json::from_value(data).map(ContentBlock::LocationBlock),
            _ => {
                log::warn!("unknown content block type '{}'", kind);
                return ContentBlock::Unsupported {
                    kind,
                    reason: "unknown block type".to_string(),
                };
            }
        };

        parsed.unwrap_or_else(|e| {
            log::warn!("malformed '{}' block: {}", kind, e);
            ContentBlock::Unsupported {
                kind,
                reason: e.to_string(),
            }
        })
    }

    /// The JSON tag this block was declared with
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::Hero(_) => "hero",
            ContentBlock::RichText(_) => "richText",
            ContentBlock::TableOfContents(_) => "tableOfContents",
            ContentBlock::CategoryJumpLinks(_) => "categoryJumpLinks",
            ContentBlock::ImageGallery(_) => "imageGallery",
            ContentBlock::DataTable(_) => "dataTable",
            ContentBlock::Faq(_) => "faq",
            ContentBlock::GoogleMap(_) => "googleMap",
            ContentBlock::LocationBlock(_) => "locationBlock",
            ContentBlock::Unsupported { kind, .. } => kind,
        }
    }

    /// Section title, for blocks that can be listed in a table of contents
    pub fn toc_title(&self) -> Option<&str> {
        let title = match self {
            ContentBlock::DataTable(b) => b.title.as_deref(),
            ContentBlock::Faq(b) => b.title.as_deref(),
            ContentBlock::ImageGallery(b) => b.title.as_deref(),
            ContentBlock::RichText(b) => b.title.as_deref(),
            ContentBlock::GoogleMap(b) => b.title.as_deref(),
            ContentBlock::LocationBlock(b) => b.title.as_deref(),
            _ => None,
        };
        title.filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroBlock {
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(alias = "image_url")]
    pub image_url: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
}

/// Raw HTML section. `content` must already be sanitized; it is emitted verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RichTextBlock {
    pub title: Option<String>,
    pub content: Option<String>,
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableOfContentsBlock {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryJumpLinksBlock {
    pub title: Option<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageGalleryBlock {
    pub title: Option<String>,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryImage {
    #[serde(alias = "src")]
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Ordered category name → category mapping
pub type Categories = IndexMap<String, Category>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataTableBlock {
    pub title: Option<String>,
    pub categories: Option<Categories>,
    pub categories_data_url: Option<String>,
    pub categories_filter: Option<CategoryFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Category {
    pub description: Option<String>,
    pub recommended: Option<String>,
    #[serde(alias = "menuItems", deserialize_with = "lenient_items")]
    pub items: Vec<MenuItem>,
}

/// Parse items one at a time so a single malformed entry is dropped, not the whole category
fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<MenuItem>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<MenuItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("skipping menu item: {}", e);
                None
            }
        })
        .collect())
}

/// One dish. Upstream exports spell some fields differently (`title`,
/// `imageUrl`, `unitPrice`); when both spellings are present the first wins.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub name: String,
    pub image_url: Option<String>,
    pub price: Option<NumberOrText>,
    pub calories: Option<NumberOrText>,
    pub review: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct RawMenuItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default, rename = "imageUrl")]
    image_url_camel: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default, rename = "unitPrice")]
    unit_price: Option<Value>,
    #[serde(default)]
    calories: Option<Value>,
    #[serde(default)]
    review: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl<'de> Deserialize<'de> for MenuItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawMenuItem::deserialize(deserializer)?;
        let name = raw
            .name
            .or(raw.title)
            .ok_or_else(|| <D::Error as serde::de::Error>::missing_field("name"))?;

        Ok(MenuItem {
            price: number_or_text(&name, "price", raw.price.or(raw.unit_price)),
            calories: number_or_text(&name, "calories", raw.calories),
            image_url: raw.image_url.or(raw.image_url_camel),
            review: raw.review,
            description: raw.description,
            name,
        })
    }
}

fn number_or_text(item: &str, field: &str, value: Option<Value>) -> Option<NumberOrText> {
    match value? {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(NumberOrText::Number),
        Value::String(s) => Some(NumberOrText::Text(s)),
        other => {
            log::warn!("menu item '{}': ignoring {} {}", item, field, other);
            None
        }
    }
}

/// A value that upstream data supplies either as a JSON number or a preformatted string
#[derive(Debug, Clone, PartialEq)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Selection of categories from an external data source
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFilter {
    /// `"*"`: every category, in source order
    All,
    /// Named categories, in the order listed
    Only(Vec<String>),
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) if s == "*" => CategoryFilter::All,
            Raw::One(s) => CategoryFilter::Only(vec![s]),
            Raw::Many(list) if list.len() == 1 && list[0] == "*" => CategoryFilter::All,
            Raw::Many(list) => CategoryFilter::Only(list),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FaqBlock {
    pub title: Option<String>,
    #[serde(alias = "faqs")]
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleMapBlock {
    pub title: Option<String>,
    pub query: Option<String>,
    pub embed_url: Option<String>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationBlock {
    pub title: Option<String>,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub hours: Vec<OpeningHours>,
    pub map_query: Option<String>,
    pub price_range: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    pub day: String,
    pub hours: String,
}

/// Lowercase, hyphen-separated anchor id
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Desserts"), "desserts");
        assert_eq!(slugify("Soups, Salad & Breadsticks"), "soups-salad-breadsticks");
        assert_eq!(slugify("  Kids Menu  "), "kids-menu");
        assert_eq!(slugify("CLASSIC ENTRÉES 2025"), "classic-entrées-2025");
    }

    #[test]
    fn test_index_now_key_format() {
        assert!(is_valid_index_now_key("0f3c9d2b7a6e4c1d8b5a"));
        assert!(is_valid_index_now_key("abc-1234"));
        assert!(!is_valid_index_now_key("abc123"));
        assert!(!is_valid_index_now_key("../../etc/passwd"));
        assert!(!is_valid_index_now_key("nested/key1234"));
        assert!(!is_valid_index_now_key(&"a".repeat(129)));
    }

    #[test]
    fn test_unknown_block_type_is_unsupported() {
        let block: ContentBlock =
            serde_json::from_value(json!({"type": "carousel", "data": {}})).unwrap();
        match block {
            ContentBlock::Unsupported { kind, .. } => assert_eq!(kind, "carousel"),
            other => panic!("expected Unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload_is_unsupported() {
        let block: ContentBlock =
            serde_json::from_value(json!({"type": "faq", "data": {"items": "nope"}})).unwrap();
        assert!(matches!(block, ContentBlock::Unsupported { .. }));
        assert_eq!(block.kind(), "faq");
    }

    #[test]
    fn test_block_without_data_uses_defaults() {
        let block: ContentBlock =
            serde_json::from_value(json!({"type": "tableOfContents"})).unwrap();
        assert!(matches!(block, ContentBlock::TableOfContents(_)));
    }

    #[test]
    fn test_category_filter_forms() {
        let all: CategoryFilter = serde_json::from_value(json!("*")).unwrap();
        assert_eq!(all, CategoryFilter::All);

        let all_list: CategoryFilter = serde_json::from_value(json!(["*"])).unwrap();
        assert_eq!(all_list, CategoryFilter::All);

        let some: CategoryFilter =
            serde_json::from_value(json!(["Desserts", "Kids Menu"])).unwrap();
        assert_eq!(
            some,
            CategoryFilter::Only(vec!["Desserts".to_string(), "Kids Menu".to_string()])
        );
    }

    #[test]
    fn test_menu_item_accepts_upstream_aliases() {
        let item: MenuItem = serde_json::from_value(json!({
            "title": "Tiramisu",
            "unitPrice": 8.99,
            "calories": "470",
            "imageUrl": "/static/tiramisu.webp"
        }))
        .unwrap();
        assert_eq!(item.name, "Tiramisu");
        assert_eq!(item.price, Some(NumberOrText::Number(8.99)));
        assert_eq!(item.calories, Some(NumberOrText::Text("470".to_string())));
        assert_eq!(item.image_url.as_deref(), Some("/static/tiramisu.webp"));
    }

    #[test]
    fn test_menu_item_with_both_spellings() {
        let item: MenuItem = serde_json::from_value(json!({
            "name": "Tiramisu",
            "title": "Tiramisu (Slice)",
            "price": "8.99",
            "unitPrice": 9.5
        }))
        .unwrap();
        assert_eq!(item.name, "Tiramisu");
        assert_eq!(item.price, Some(NumberOrText::Text("8.99".to_string())));
    }

    #[test]
    fn test_bad_menu_items_are_skipped() {
        let category: Category = serde_json::from_value(json!({
            "items": [
                {"name": "Cheesecake", "price": 7.5},
                {"price": 3},
                {"name": "Gelato", "price": {"amount": 4}},
                "not an item",
                {"title": "Cannoli", "calories": [1, 2]}
            ]
        }))
        .unwrap();

        let names: Vec<_> = category.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cheesecake", "Gelato", "Cannoli"]);
        assert_eq!(category.items[1].price, None);
        assert_eq!(category.items[2].calories, None);
    }

    #[test]
    fn test_inline_categories_preserve_order() {
        let block: DataTableBlock = serde_json::from_value(json!({
            "title": "Menu",
            "categories": {
                "Zucchini": {"items": []},
                "Appetizers": {"items": []},
                "Mains": {"items": []}
            }
        }))
        .unwrap();
        let names: Vec<_> = block.categories.unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["Zucchini", "Appetizers", "Mains"]);
    }

    #[test]
    fn test_footer_kind_defaults_to_link() {
        let entry: FooterEntry =
            serde_json::from_value(json!({"text": "Privacy", "url": "/privacy"})).unwrap();
        assert_eq!(entry.kind, FooterKind::Link);

        let entry: FooterEntry =
            serde_json::from_value(json!({"kind": "copyright", "text": "© 2025 Menu Prices"}))
                .unwrap();
        assert_eq!(entry.kind, FooterKind::Copyright);
    }

    #[test]
    fn test_canonical_url_and_host() {
        let config: SiteConfig = serde_json::from_value(json!({
            "siteName": "Menu Prices",
            "baseURL": "https://menu.example.com/"
        }))
        .unwrap();
        assert_eq!(config.canonical_url("/"), "https://menu.example.com/");
        assert_eq!(config.canonical_url("/desserts"), "https://menu.example.com/desserts");
        assert_eq!(config.host(), "menu.example.com");
    }

    #[test]
    fn test_published_date_accepts_timestamps() {
        let meta = PageMetadata {
            date_published: Some("2025-03-14T09:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.published_date(), NaiveDate::from_ymd_opt(2025, 3, 14));

        let meta = PageMetadata {
            date_published: Some("not a date".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.published_date(), None);
    }
}
