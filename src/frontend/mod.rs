mod browser;
mod docs;
mod landing;

use crate::theme::{apply_initial_theme, initial_theme, toggle_theme, Theme};
use browser::{current_path, document, system_prefers_dark, WebThemeHost};
use docs::DocsPage;
use landing::Landing;
use yew::prelude::*;

const ANNOUNCEMENT: &str = "Tokio 1.x is a long-term support release line.";
const ANNOUNCEMENT_HREF: &str = "/blog";

struct NavItem {
    label: &'static str,
    href: &'static str,
    external: bool,
}

const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Learn",
        href: "/tokio/tutorial",
        external: false,
    },
    NavItem {
        label: "API Docs",
        href: "https://docs.rs/tokio",
        external: true,
    },
    NavItem {
        label: "Blog",
        href: "/blog",
        external: false,
    },
    NavItem {
        label: "GitHub",
        href: "https://github.com/tokio-rs/tokio",
        external: true,
    },
];

struct FooterColumn {
    title: &'static str,
    links: &'static [(&'static str, &'static str)],
}

const FOOTER_COLUMNS: &[FooterColumn] = &[
    FooterColumn {
        title: "Get started",
        links: &[
            ("Tutorial", "/tokio/tutorial"),
            ("Topics", "/tokio/topics"),
            ("Glossary", "/tokio/glossary"),
        ],
    },
    FooterColumn {
        title: "Resources",
        links: &[
            ("API documentation", "https://docs.rs/tokio"),
            ("Examples", "https://github.com/tokio-rs/tokio/tree/master/examples"),
            ("Discord", "https://discord.gg/tokio"),
        ],
    },
    FooterColumn {
        title: "Libraries",
        links: &[
            ("Hyper", "https://github.com/hyperium/hyper"),
            ("Tonic", "https://github.com/hyperium/tonic"),
            ("Tower", "https://github.com/tower-rs/tower"),
            ("Tracing", "https://github.com/tokio-rs/tracing"),
        ],
    },
];

#[derive(Properties, PartialEq)]
struct ThemeToggleProps {
    theme: Theme,
    on_toggle: Callback<MouseEvent>,
}

#[function_component(ThemeToggle)]
fn theme_toggle(props: &ThemeToggleProps) -> Html {
    html! {
        <button
            class="theme-toggle"
            type="button"
            aria-label={props.theme.toggle_label()}
            aria-pressed={props.theme.pressed().to_string()}
            onclick={props.on_toggle.clone()}
        >
            <span aria-hidden="true">{props.theme.icon()}</span>
        </button>
    }
}

#[derive(Properties, PartialEq)]
struct SiteHeaderProps {
    path: AttrValue,
    theme: Theme,
    on_toggle_theme: Callback<MouseEvent>,
}

#[function_component(SiteHeader)]
fn site_header(props: &SiteHeaderProps) -> Html {
    let expanded = use_state(|| false);
    let on_toggle_menu = {
        let expanded = expanded.clone();
        Callback::from(move |_| expanded.set(!*expanded))
    };

    html! {
        <header class={classes!("site-header", (*expanded).then_some("is-open"))}>
            <a class="site-logo" href="/">{"tokio"}</a>
            <button
                class="site-menu-toggle"
                type="button"
                aria-label="Toggle navigation"
                aria-expanded={(*expanded).to_string()}
                onclick={on_toggle_menu}
            >
                <span aria-hidden="true">{"☰"}</span>
            </button>
            <nav class="site-nav" aria-label="Main">
                <ul>
                    { for NAV_ITEMS.iter().map(|item| {
                        let active = !item.external
                            && crate::menu::is_path_prefix(item.href, &props.path);
                        html! {
                            <li key={item.label} class={classes!(active.then_some("active"))}>
                                if item.external {
                                    <a href={item.href} target="_blank" rel="noopener noreferrer">{item.label}</a>
                                } else {
                                    <a href={item.href}>{item.label}</a>
                                }
                            </li>
                        }
                    }) }
                </ul>
            </nav>
            <ThemeToggle theme={props.theme} on_toggle={props.on_toggle_theme.clone()} />
        </header>
    }
}

#[function_component(AnnouncementBanner)]
fn announcement_banner() -> Html {
    html! {
        <div class="announcement" role="note">
            <a href={ANNOUNCEMENT_HREF}>{ANNOUNCEMENT}</a>
        </div>
    }
}

#[function_component(Footer)]
fn footer() -> Html {
    html! {
        <footer class="site-footer">
            <div class="footer-columns">
                { for FOOTER_COLUMNS.iter().map(|column| html! {
                    <div key={column.title} class="footer-column">
                        <p class="footer-title">{column.title}</p>
                        <ul>
                            { for column.links.iter().map(|(label, href)| html! {
                                <li key={*label}><a href={*href}>{*label}</a></li>
                            }) }
                        </ul>
                    </div>
                }) }
            </div>
            <p class="muted">{"Built with ❤ by the Tokio contributors."}</p>
        </footer>
    }
}

#[function_component(App)]
fn app() -> Html {
    let path = use_memo((), |_| AttrValue::from(current_path()));
    let theme = use_state(|| initial_theme(&WebThemeHost::new(false), system_prefers_dark()));

    use_effect_with((), |_| {
        apply_initial_theme(&WebThemeHost::new(false), system_prefers_dark());
        || ()
    });

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_| {
            theme.set(toggle_theme(&WebThemeHost::new(true)));
        })
    };

    let is_landing = path.trim_end_matches('/').is_empty();

    html! {
        <>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <AnnouncementBanner />
            <SiteHeader path={(*path).clone()} theme={*theme} on_toggle_theme={on_toggle_theme} />
            <main id="content">
                if is_landing {
                    <Landing />
                } else {
                    <DocsPage path={(*path).clone()} />
                }
            </main>
            <Footer />
        </>
    }
}

pub fn run() {
    let Some(root) = document().and_then(|d| d.get_element_by_id("app")) else {
        return;
    };

    yew::Renderer::<App>::with_root(root).render();
}
