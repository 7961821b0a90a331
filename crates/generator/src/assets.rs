use menusite_core::Colors;

/// Scroll distance (px) after which the scroll-to-top button appears
pub const SCROLL_TOP_THRESHOLD_PX: u32 = 200;

/// Image shown for menu items without an `image_url`
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.webp";

/// Generate the inline stylesheet with the site's theme colors
pub fn stylesheet(colors: &Colors) -> String {
    format!(
        r#"<style>
        :root {{
            --primary: {};
            --secondary: {};
            --accent: {};
            --text: {};
            --background: {};
        }}
{}
    </style>"#,
        css_value(&colors.primary),
        css_value(&colors.secondary),
        css_value(&colors.accent),
        css_value(&colors.text),
        css_value(&colors.background),
        BASE_CSS
    )
}

/// Keep only characters that can appear in a CSS color value
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' '))
        .collect()
}

const BASE_CSS: &str = r#"        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            color: var(--text);
            background: var(--background);
        }
        a { color: var(--primary); }
        main { max-width: 1080px; margin: 0 auto; padding: 1.5rem 1rem 4rem; }
        main > section, main > nav { margin-bottom: 2.5rem; }
        h1 { font-size: 2.1rem; line-height: 1.2; margin-bottom: 1rem; }
        h2 { font-size: 1.6rem; margin-bottom: 1rem; color: var(--secondary); }
        h3 { font-size: 1.25rem; margin: 1.5rem 0 0.5rem; }

        .site-header { background: var(--secondary); color: #fff; position: sticky; top: 0; z-index: 50; }
        .header-inner { max-width: 1080px; margin: 0 auto; padding: 0.75rem 1rem; display: flex; align-items: center; justify-content: space-between; }
        .brand { display: flex; align-items: center; gap: 0.5rem; color: #fff; text-decoration: none; font-weight: 700; }
        .nav-toggle { display: none; background: none; border: 0; color: #fff; font-size: 1.5rem; cursor: pointer; }
        .nav-list { list-style: none; display: flex; gap: 1.25rem; }
        .nav-item { position: relative; }
        .nav-item > a { color: #fff; text-decoration: none; }
        .nav-item > a[aria-current="page"] { border-bottom: 2px solid var(--accent); }
        .submenu-toggle { background: none; border: 0; color: #fff; cursor: pointer; }
        .submenu { display: none; position: absolute; top: 100%; left: 0; min-width: 200px; list-style: none; background: #fff; box-shadow: 0 4px 12px rgba(0,0,0,0.15); border-radius: 4px; padding: 0.5rem 0; }
        .submenu a { display: block; padding: 0.35rem 1rem; color: var(--text); text-decoration: none; }
        .has-submenu.open > .submenu, .has-submenu:hover > .submenu { display: block; }

        .hero { background: var(--secondary) center / cover no-repeat; color: #fff; border-radius: 8px; padding: 3rem 2rem; }
        .hero h1 { color: #fff; }
        .hero-subtitle { font-size: 1.15rem; opacity: 0.9; }
        .hero-cta { display: inline-block; margin-top: 1.25rem; background: var(--primary); color: #fff; padding: 0.65rem 1.4rem; border-radius: 4px; text-decoration: none; font-weight: 600; }

        .toc { background: #f8f8f8; border-left: 4px solid var(--primary); padding: 1rem 1.5rem; border-radius: 4px; }
        .toc ol { margin-left: 1.25rem; }
        .category-jump-links ul { list-style: none; display: flex; flex-wrap: wrap; gap: 0.5rem; }
        .jump-pill { display: inline-block; padding: 0.3rem 0.9rem; border: 1px solid var(--primary); border-radius: 999px; text-decoration: none; font-size: 0.9rem; }

        .table-wrap { overflow-x: auto; }
        .menu-table { width: 100%; border-collapse: collapse; }
        .menu-table th { text-align: left; background: var(--secondary); color: #fff; padding: 0.6rem; }
        .menu-table td { padding: 0.75rem 0.6rem; border-bottom: 1px solid #eee; vertical-align: top; }
        .item-cell { display: flex; gap: 0.75rem; }
        .item-cell img { width: 64px; height: 64px; object-fit: cover; border-radius: 4px; cursor: zoom-in; }
        .item-name { font-weight: 600; }
        .calorie-badge { display: inline-block; margin-left: 0.5rem; background: #f3f4f6; border-radius: 999px; padding: 0 0.5rem; font-size: 0.75rem; color: #555; }
        .item-description { font-size: 0.9rem; color: #555; }
        .item-description.truncated { cursor: pointer; }
        .item-review { font-size: 0.85rem; font-style: italic; color: #666; }
        .item-price { font-weight: 700; white-space: nowrap; color: var(--primary); }
        .category-description { color: #555; }
        .category-recommended { background: #fff8e6; border-left: 3px solid var(--accent); padding: 0.5rem 0.75rem; margin: 0.5rem 0; }
        .block-error { border: 1px dashed #dc2626; color: #b91c1c; padding: 1rem; border-radius: 4px; }

        .gallery-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem; }
        .gallery-item img { width: 100%; height: 180px; object-fit: cover; border-radius: 4px; cursor: zoom-in; }
        .gallery-item figcaption { font-size: 0.85rem; color: #555; margin-top: 0.25rem; }

        .faq-item { border-bottom: 1px solid #eee; padding: 0.75rem 0; }
        .faq-item summary { font-weight: 600; cursor: pointer; }
        .faq-answer { margin-top: 0.5rem; color: #444; }

        .map-embed iframe { width: 100%; border: 0; border-radius: 8px; }
        .location-card { border: 1px solid #eee; border-radius: 8px; padding: 1.25rem; }
        .location-card address { font-style: normal; margin-bottom: 0.5rem; }
        .hours-table th { text-align: left; padding-right: 1rem; font-weight: 500; }
        .directions-link { display: inline-block; margin-top: 0.75rem; }

        .video-facade, .tweet-embed { min-height: 200px; background: #f3f4f6; border-radius: 8px; }

        .site-footer { background: var(--secondary); color: #d1d5db; padding: 2rem 1rem; font-size: 0.9rem; }
        .footer-inner { max-width: 1080px; margin: 0 auto; }
        .footer-links ul { list-style: none; display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 1rem; }
        .footer-links a { color: #fff; }
        .footer-disclaimer { font-size: 0.8rem; opacity: 0.8; margin-bottom: 0.5rem; }

        .scroll-to-top { position: fixed; right: 1rem; bottom: 1rem; width: 44px; height: 44px; border-radius: 50%; border: 0; background: var(--primary); color: #fff; font-size: 1.25rem; cursor: pointer; opacity: 0; pointer-events: none; transition: opacity 0.2s; }
        .scroll-to-top.visible { opacity: 1; pointer-events: auto; }
        .lightbox { position: fixed; inset: 0; background: rgba(0,0,0,0.85); display: flex; align-items: center; justify-content: center; flex-direction: column; z-index: 100; }
        .lightbox[hidden] { display: none; }
        .lightbox img { max-width: 92vw; max-height: 80vh; border-radius: 4px; }
        .lightbox-caption { color: #fff; margin-top: 0.75rem; }
        .lightbox-close { position: absolute; top: 1rem; right: 1.25rem; background: none; border: 0; color: #fff; font-size: 2rem; cursor: pointer; }

        @media (max-width: 768px) {
            .nav-toggle { display: block; }
            .site-nav { display: none; position: absolute; top: 100%; left: 0; right: 0; background: var(--secondary); }
            .site-nav.open { display: block; }
            .nav-list { flex-direction: column; gap: 0; padding: 0.5rem 1rem; }
            .nav-item { padding: 0.4rem 0; }
            .submenu { position: static; box-shadow: none; background: transparent; }
            .submenu a { color: #fff; }
            .has-submenu:hover > .submenu { display: none; }
            .has-submenu.open > .submenu { display: block; }
            h1 { font-size: 1.7rem; }
        }"#;

/// Generate the shared client-side behavior for every page
pub fn site_script() -> String {
    format!(
        r#"<script>
    document.addEventListener('DOMContentLoaded', () => {{
        // Mobile navigation
        const navToggle = document.querySelector('.nav-toggle');
        const siteNav = document.getElementById('site-nav');
        if (navToggle && siteNav) {{
            navToggle.addEventListener('click', () => {{
                const open = siteNav.classList.toggle('open');
                navToggle.setAttribute('aria-expanded', String(open));
            }});
        }}

        // Submenus
        document.querySelectorAll('.submenu-toggle').forEach(button => {{
            button.addEventListener('click', event => {{
                event.preventDefault();
                const item = button.closest('.has-submenu');
                const open = item.classList.toggle('open');
                button.setAttribute('aria-expanded', String(open));
            }});
        }});

        // Scroll to top
        const scrollButton = document.getElementById('scroll-to-top');
        if (scrollButton) {{
            const update = () => scrollButton.classList.toggle('visible', window.scrollY > {threshold});
            window.addEventListener('scroll', update, {{ passive: true }});
            update();
            scrollButton.addEventListener('click', () => window.scrollTo({{ top: 0, behavior: 'smooth' }}));
        }}

        // Read more
        document.querySelectorAll('[data-full-text]').forEach(el => {{
            el.classList.add('truncated');
            el.addEventListener('click', () => {{
                el.textContent = el.dataset.fullText;
                el.classList.remove('truncated');
                el.removeAttribute('data-full-text');
            }}, {{ once: true }});
        }});

        const idle = window.requestIdleCallback || (cb => setTimeout(cb, 200));

        // Lightbox, wired after first paint
        idle(() => {{
            const lightbox = document.getElementById('lightbox');
            if (!lightbox) return;
            const image = lightbox.querySelector('img');
            const caption = lightbox.querySelector('.lightbox-caption');
            const close = () => {{ lightbox.hidden = true; image.src = ''; }};
            document.querySelectorAll('img[data-lightbox]').forEach(img => {{
                img.addEventListener('click', () => {{
                    image.src = img.dataset.full || img.currentSrc || img.src;
                    image.alt = img.alt;
                    caption.textContent = img.dataset.caption || img.alt || '';
                    lightbox.hidden = false;
                }});
            }});
            lightbox.addEventListener('click', event => {{
                if (event.target === lightbox || event.target.classList.contains('lightbox-close')) close();
            }});
            document.addEventListener('keydown', event => {{
                if (event.key === 'Escape' && !lightbox.hidden) close();
            }});
        }});

        // Third-party embeds load only when scrolled into view
        const loadScript = src => {{
            if (document.querySelector(`script[src="${{src}}"]`)) return;
            const script = document.createElement('script');
            script.src = src;
            script.async = true;
            document.body.appendChild(script);
        }};
        const activate = el => {{
            if (el.classList.contains('video-facade')) {{
                const iframe = document.createElement('iframe');
                iframe.src = `https://www.youtube-nocookie.com/embed/${{el.dataset.videoId}}?autoplay=0`;
                iframe.title = el.dataset.title || 'Video';
                iframe.allow = 'accelerometer; encrypted-media; gyroscope; picture-in-picture';
                iframe.allowFullscreen = true;
                iframe.loading = 'lazy';
                iframe.style.width = '100%';
                iframe.style.aspectRatio = '16 / 9';
                iframe.style.border = '0';
                el.replaceChildren(iframe);
            }} else if (el.classList.contains('tweet-embed')) {{
                loadScript('https://platform.twitter.com/widgets.js');
            }}
        }};
        const lazyEmbeds = document.querySelectorAll('.video-facade, .tweet-embed');
        if ('IntersectionObserver' in window) {{
            const observer = new IntersectionObserver(entries => {{
                entries.forEach(entry => {{
                    if (entry.isIntersecting) {{
                        observer.unobserve(entry.target);
                        activate(entry.target);
                    }}
                }});
            }}, {{ rootMargin: '200px' }});
            lazyEmbeds.forEach(el => observer.observe(el));
        }} else {{
            lazyEmbeds.forEach(activate);
        }}
    }});
    </script>"#,
        threshold = SCROLL_TOP_THRESHOLD_PX
    )
}
